use std::collections::{BTreeMap, HashMap};

use tracing::warn;

use crate::models::outbound::Visibility;

pub mod bridge;
pub mod platform;
pub mod trigger;

pub use bridge::{EmergencyBridge, MethodResult};
pub use platform::{PlatformProfile, TracingDevice};
pub use trigger::LocalOverrideTrigger;

pub const RED: u32 = 0xFF0000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeviceError {
    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),

    #[error("Platform call failed: {0}")]
    Platform(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioStream {
    Alarm,
    Notification,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waveform {
    pub timings_ms: Vec<u64>,
    pub repeat: Option<usize>,
}

impl Waveform {
    pub fn once(timings_ms: &[u64]) -> Self {
        Self {
            timings_ms: timings_ms.to_vec(),
            repeat: None,
        }
    }

    pub fn total_ms(&self) -> u64 {
        self.timings_ms.iter().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Importance {
    Default,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelSound {
    PlatformDefault,
    Alarm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSpec {
    pub id: String,
    pub name: String,
    pub description: String,
    pub importance: Importance,
    pub light_color: Option<u32>,
    pub vibration: Option<Waveform>,
    pub lockscreen_visibility: Visibility,
    pub sound: ChannelSound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalPriority {
    Default,
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalNotification {
    pub channel_id: String,
    pub title: String,
    pub body: String,
    pub priority: LocalPriority,
    pub category: Option<String>,
    pub visibility: Visibility,
    pub ongoing: bool,
    pub auto_cancel: bool,
    pub color: Option<u32>,
    pub colorized: bool,
    pub vibration: Option<Waveform>,
    pub sound: ChannelSound,
    pub extras: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    pub title: Option<String>,
    pub body: Option<String>,
    pub data: HashMap<String, String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait AudioOverride: Send + Sync {
    fn set_alarm_volume_to_max(&self) -> Result<(), DeviceError>;

    fn request_transient_focus(&self, stream: AudioStream) -> Result<(), DeviceError>;

    fn play_asset(&self, path: &str, stream: AudioStream) -> Result<(), DeviceError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait VibrationDriver: Send + Sync {
    fn has_vibrator(&self) -> bool;

    fn vibrate(&self, waveform: &Waveform) -> Result<(), DeviceError>;
}

#[cfg_attr(test, mockall::automock)]
pub trait NotificationPresenter: Send + Sync {
    fn ensure_channel(&self, spec: &ChannelSpec) -> Result<(), DeviceError>;

    fn present(&self, notification: &LocalNotification) -> Result<(), DeviceError>;
}

pub(crate) fn best_effort(action: &str, result: Result<(), DeviceError>) {
    if let Err(e) = result {
        warn!(action, error = %e, "Device capability call failed");
    }
}
