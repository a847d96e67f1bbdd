pub mod admin;
pub mod api;
pub mod builder;
pub mod clients;
pub mod config;
pub mod device;
pub mod dispatcher;
pub mod error;
pub mod models;
pub mod publisher;
pub mod store;
pub mod worker;
