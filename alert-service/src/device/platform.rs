use tracing::{info, warn};

use crate::device::{
    AudioOverride, AudioStream, ChannelSpec, DeviceError, LocalNotification,
    NotificationPresenter, VibrationDriver, Waveform,
};

const CHANNELS_API: u32 = 26;
const WAVEFORM_API: u32 = 26;
const IMMUTABLE_INTENT_API: u32 = 23;
const VIBRATOR_MANAGER_API: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformProfile {
    pub api_level: u32,
}

impl PlatformProfile {
    pub fn new(api_level: u32) -> Self {
        Self { api_level }
    }

    pub fn supports_channels(&self) -> bool {
        self.api_level >= CHANNELS_API
    }

    pub fn supports_waveform_effects(&self) -> bool {
        self.api_level >= WAVEFORM_API
    }

    pub fn requires_immutable_intents(&self) -> bool {
        self.api_level >= IMMUTABLE_INTENT_API
    }

    pub fn uses_vibrator_manager(&self) -> bool {
        self.api_level >= VIBRATOR_MANAGER_API
    }
}

pub struct TracingDevice {
    profile: PlatformProfile,
    has_vibrator: bool,
}

impl TracingDevice {
    pub fn new(profile: PlatformProfile) -> Self {
        Self {
            profile,
            has_vibrator: true,
        }
    }

    pub fn without_vibrator(mut self) -> Self {
        self.has_vibrator = false;
        self
    }
}

impl AudioOverride for TracingDevice {
    fn set_alarm_volume_to_max(&self) -> Result<(), DeviceError> {
        info!(stream = ?AudioStream::Alarm, "Alarm volume set to max");
        Ok(())
    }

    fn request_transient_focus(&self, stream: AudioStream) -> Result<(), DeviceError> {
        info!(stream = ?stream, "Transient audio focus requested");
        Ok(())
    }

    fn play_asset(&self, path: &str, stream: AudioStream) -> Result<(), DeviceError> {
        info!(path, stream = ?stream, "Playing sound asset");
        Ok(())
    }
}

impl VibrationDriver for TracingDevice {
    fn has_vibrator(&self) -> bool {
        self.has_vibrator
    }

    fn vibrate(&self, waveform: &Waveform) -> Result<(), DeviceError> {
        if !self.has_vibrator {
            return Err(DeviceError::Unsupported("no vibrator".to_string()));
        }

        info!(
            timings_ms = ?waveform.timings_ms,
            total_ms = waveform.total_ms(),
            waveform_effect = self.profile.supports_waveform_effects(),
            vibrator_manager = self.profile.uses_vibrator_manager(),
            "Vibrating"
        );
        Ok(())
    }
}

impl NotificationPresenter for TracingDevice {
    fn ensure_channel(&self, spec: &ChannelSpec) -> Result<(), DeviceError> {
        if !self.profile.supports_channels() {
            warn!(channel_id = %spec.id, api_level = self.profile.api_level, "Channels not supported");
            return Err(DeviceError::Unsupported(format!(
                "notification channels need API {}",
                CHANNELS_API
            )));
        }

        info!(channel_id = %spec.id, importance = ?spec.importance, "Notification channel ensured");
        Ok(())
    }

    fn present(&self, notification: &LocalNotification) -> Result<(), DeviceError> {
        info!(
            channel_id = %notification.channel_id,
            title = %notification.title,
            priority = ?notification.priority,
            ongoing = notification.ongoing,
            immutable_intent = self.profile.requires_immutable_intents(),
            extras = ?notification.extras,
            "Notification presented"
        );
        Ok(())
    }
}
