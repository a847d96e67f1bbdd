use std::sync::Arc;

use tracing::{debug, info};

use crate::device::{AudioOverride, AudioStream, VibrationDriver, Waveform, best_effort};

pub const EMERGENCY_AUDIO_CHANNEL: &str = "emergency_audio";
pub const EMERGENCY_VIBRATION_CHANNEL: &str = "emergency_vibration";

pub const SET_EMERGENCY_AUDIO: &str = "setEmergencyAudio";
pub const PLAY_EMERGENCY_SOUND: &str = "playEmergencySound";
pub const EMERGENCY_VIBRATE: &str = "emergencyVibrate";

pub const EMERGENCY_SOUND_ASSET: &str = "sounds/emergency_alert.mp3";
pub const MANUAL_VIBRATION_MS: [u64; 8] = [0, 1000, 300, 1000, 300, 1000, 300, 1000];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodResult {
    Success(bool),
    NotImplemented,
}

// Calls answer `Success(true)` as soon as the side effect has been started,
// whether or not it worked.
pub struct EmergencyBridge {
    audio: Arc<dyn AudioOverride>,
    vibration: Arc<dyn VibrationDriver>,
}

impl EmergencyBridge {
    pub fn new(audio: Arc<dyn AudioOverride>, vibration: Arc<dyn VibrationDriver>) -> Self {
        Self { audio, vibration }
    }

    pub fn handle_call(&self, channel: &str, method: &str) -> MethodResult {
        debug!(channel, method, "Bridge call received");

        match (channel, method) {
            (EMERGENCY_AUDIO_CHANNEL, SET_EMERGENCY_AUDIO) => {
                self.set_emergency_audio();
                MethodResult::Success(true)
            }
            (EMERGENCY_AUDIO_CHANNEL, PLAY_EMERGENCY_SOUND) => {
                self.play_emergency_sound();
                MethodResult::Success(true)
            }
            (EMERGENCY_VIBRATION_CHANNEL, EMERGENCY_VIBRATE) => {
                self.emergency_vibrate();
                MethodResult::Success(true)
            }
            _ => MethodResult::NotImplemented,
        }
    }

    pub fn set_emergency_audio(&self) {
        best_effort("set_alarm_volume_to_max", self.audio.set_alarm_volume_to_max());
        best_effort(
            "request_transient_focus",
            self.audio.request_transient_focus(AudioStream::Alarm),
        );
    }

    pub fn play_emergency_sound(&self) {
        best_effort(
            "play_asset",
            self.audio.play_asset(EMERGENCY_SOUND_ASSET, AudioStream::Alarm),
        );
    }

    pub fn emergency_vibrate(&self) {
        if !self.vibration.has_vibrator() {
            info!("Device does not support vibration");
            return;
        }

        best_effort(
            "vibrate",
            self.vibration.vibrate(&Waveform::once(&MANUAL_VIBRATION_MS)),
        );
    }
}
