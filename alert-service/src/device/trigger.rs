use std::{collections::BTreeMap, sync::Arc};

use tracing::{debug, info};

use crate::{
    builder::{EMERGENCY_CHANNEL_ID, EMERGENCY_VIBRATION_MS, NORMAL_CHANNEL_ID},
    device::{
        AudioOverride, AudioStream, ChannelSound, ChannelSpec, Importance, InboundMessage,
        LocalNotification, LocalPriority, NotificationPresenter, PlatformProfile, RED,
        VibrationDriver, Waveform, best_effort,
    },
    models::{classification::Classification, outbound::Visibility},
};

pub const EMERGENCY_FALLBACK_TITLE: &str = "EMERGENCY ALERT";
pub const EMERGENCY_FALLBACK_BODY: &str = "Emergency notification";
pub const NORMAL_FALLBACK_TITLE: &str = "Notification";

pub const EMERGENCY_EXTRA: &str = "emergency_notification";
pub const ALARM_CATEGORY: &str = "alarm";

pub struct LocalOverrideTrigger {
    audio: Arc<dyn AudioOverride>,
    vibration: Arc<dyn VibrationDriver>,
    presenter: Arc<dyn NotificationPresenter>,
    platform: PlatformProfile,
}

impl LocalOverrideTrigger {
    pub fn new(
        audio: Arc<dyn AudioOverride>,
        vibration: Arc<dyn VibrationDriver>,
        presenter: Arc<dyn NotificationPresenter>,
        platform: PlatformProfile,
    ) -> Self {
        Self {
            audio,
            vibration,
            presenter,
            platform,
        }
    }

    pub fn handle(&self, message: &InboundMessage) -> Classification {
        let classification = Classification::from_data(&message.data);

        debug!(classification = %classification, "Push message received");

        match classification {
            Classification::Emergency => self.handle_emergency(message),
            Classification::Normal => self.handle_normal(message),
        }

        classification
    }

    fn handle_emergency(&self, message: &InboundMessage) {
        info!("Handling emergency notification");

        best_effort("set_alarm_volume_to_max", self.audio.set_alarm_volume_to_max());
        best_effort(
            "request_transient_focus",
            self.audio.request_transient_focus(AudioStream::Alarm),
        );

        let waveform = Waveform::once(&EMERGENCY_VIBRATION_MS);

        if self.vibration.has_vibrator() {
            best_effort("vibrate", self.vibration.vibrate(&waveform));
        } else {
            debug!("No vibrator present, skipping emergency vibration");
        }

        if self.platform.supports_channels() {
            best_effort(
                "ensure_channel",
                self.presenter.ensure_channel(&emergency_channel()),
            );
        }

        let mut extras = BTreeMap::new();
        extras.insert(EMERGENCY_EXTRA.to_string(), "true".to_string());

        let notification = LocalNotification {
            channel_id: EMERGENCY_CHANNEL_ID.to_string(),
            title: text_or(&message.title, EMERGENCY_FALLBACK_TITLE),
            body: text_or(&message.body, EMERGENCY_FALLBACK_BODY),
            priority: LocalPriority::Max,
            category: Some(ALARM_CATEGORY.to_string()),
            visibility: Visibility::Public,
            ongoing: true,
            auto_cancel: false,
            color: Some(RED),
            colorized: true,
            vibration: Some(waveform),
            sound: ChannelSound::Alarm,
            extras,
        };

        best_effort("present", self.presenter.present(&notification));
    }

    fn handle_normal(&self, message: &InboundMessage) {
        if self.platform.supports_channels() {
            best_effort(
                "ensure_channel",
                self.presenter.ensure_channel(&normal_channel()),
            );
        }

        let notification = LocalNotification {
            channel_id: NORMAL_CHANNEL_ID.to_string(),
            title: text_or(&message.title, NORMAL_FALLBACK_TITLE),
            body: text_or(&message.body, ""),
            priority: LocalPriority::Default,
            category: None,
            visibility: Visibility::Private,
            ongoing: false,
            auto_cancel: true,
            color: None,
            colorized: false,
            vibration: None,
            sound: ChannelSound::PlatformDefault,
            extras: BTreeMap::new(),
        };

        best_effort("present", self.presenter.present(&notification));
    }
}

pub fn emergency_channel() -> ChannelSpec {
    ChannelSpec {
        id: EMERGENCY_CHANNEL_ID.to_string(),
        name: "Emergency Notifications".to_string(),
        description: "Critical emergency notifications".to_string(),
        importance: Importance::High,
        light_color: Some(RED),
        vibration: Some(Waveform::once(&EMERGENCY_VIBRATION_MS)),
        lockscreen_visibility: Visibility::Public,
        sound: ChannelSound::Alarm,
    }
}

pub fn normal_channel() -> ChannelSpec {
    ChannelSpec {
        id: NORMAL_CHANNEL_ID.to_string(),
        name: "Normal Notifications".to_string(),
        description: "Regular notifications".to_string(),
        importance: Importance::Default,
        light_color: None,
        vibration: None,
        lockscreen_visibility: Visibility::Private,
        sound: ChannelSound::PlatformDefault,
    }
}

fn text_or(value: &Option<String>, fallback: &str) -> String {
    value
        .as_deref()
        .filter(|text| !text.is_empty())
        .unwrap_or(fallback)
        .to_string()
}
