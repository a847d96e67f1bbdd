pub mod audit;
pub mod classification;
pub mod fcm;
pub mod health;
pub mod message;
pub mod outbound;
pub mod record;
pub mod response;
pub mod role;
pub mod status;
pub mod user;
pub mod validation;
