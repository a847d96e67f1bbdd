use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

use crate::models::{
    classification::Classification,
    outbound::{
        AndroidConfig, AndroidNotification, AndroidPriority, ApnsConfig, ApnsFcmOptions,
        ApnsPayload, Aps, ApsAlert, ApsSound, CriticalSound, DeliveryPriority,
        GenericNotification, LightSettings, OutboundMessage, Visibility,
    },
    record::{ANNOUNCEMENT_TYPE, NotificationRecord},
};

pub const EMERGENCY_CHANNEL_ID: &str = "emergency_channel";
pub const URGENT_CHANNEL_ID: &str = "urgent_channel";
pub const NORMAL_CHANNEL_ID: &str = "normal_channel";

pub const EMERGENCY_TITLE_PREFIX: &str = "🚨 ";
pub const EMERGENCY_SOUND: &str = "emergency_alert";
pub const DEFAULT_SOUND: &str = "default";
pub const EMERGENCY_VIBRATION_MS: [u64; 6] = [0, 1000, 500, 1000, 500, 1000];
pub const EMERGENCY_LIGHT_COLOR: &str = "#FF0000";
pub const EMERGENCY_APNS_CATEGORY: &str = "EMERGENCY_ALERT";

pub const EMERGENCY_SENDER: &str = "Emergency System";
pub const DEFAULT_SENDER: &str = "Admin";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundPolicy {
    #[default]
    Explicit,
    PlatformDefault,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadBuilder {
    sound_policy: SoundPolicy,
}

impl PayloadBuilder {
    pub fn new(sound_policy: SoundPolicy) -> Self {
        Self { sound_policy }
    }

    pub fn build(&self, record: &NotificationRecord, topic: &str) -> OutboundMessage {
        self.build_at(record, topic, Utc::now())
    }

    pub fn build_at(
        &self,
        record: &NotificationRecord,
        topic: &str,
        now: DateTime<Utc>,
    ) -> OutboundMessage {
        let classification = record.classification();

        let title = match classification {
            Classification::Emergency => format!("{}{}", EMERGENCY_TITLE_PREFIX, record.title()),
            Classification::Normal => record.title().to_string(),
        };
        let body = record.message().to_string();

        OutboundMessage {
            topic: topic.to_string(),
            notification: GenericNotification {
                title: title.clone(),
                body: body.clone(),
                image_url: record.image_url().map(str::to_string),
            },
            data: self.data_fields(record, classification, now),
            android: self.android_config(record, classification),
            apns: self.apns_config(record, classification, title, body),
        }
    }

    fn data_fields(
        &self,
        record: &NotificationRecord,
        classification: Classification,
        now: DateTime<Utc>,
    ) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();

        let default_sender = match classification {
            Classification::Emergency => EMERGENCY_SENDER,
            Classification::Normal => DEFAULT_SENDER,
        };

        data.insert(
            "priority".to_string(),
            classification.priority_value().to_string(),
        );
        data.insert("type".to_string(), record.kind_or_default().to_string());
        data.insert(
            "senderName".to_string(),
            record.sender_name().unwrap_or(default_sender).to_string(),
        );
        data.insert(
            "timestamp".to_string(),
            now.to_rfc3339_opts(SecondsFormat::Millis, true),
        );

        if classification.is_emergency() {
            data.insert("requireAcknowledgment".to_string(), "true".to_string());
        }

        if let Some(action_data) = record.action_data() {
            data.insert("actionData".to_string(), action_data.to_string());
        }

        data
    }

    fn android_config(
        &self,
        record: &NotificationRecord,
        classification: Classification,
    ) -> AndroidConfig {
        let image_url = record.image_url().map(str::to_string);

        if classification.is_emergency() {
            let (sound, default_sound) = self.android_sound(EMERGENCY_SOUND);

            return AndroidConfig {
                priority: DeliveryPriority::High,
                notification: AndroidNotification {
                    channel_id: EMERGENCY_CHANNEL_ID.to_string(),
                    priority: AndroidPriority::Max,
                    sound,
                    default_sound,
                    vibration_pattern: Some(EMERGENCY_VIBRATION_MS.to_vec()),
                    bypass_dnd: true,
                    category: Some("alarm".to_string()),
                    visibility: Visibility::Public,
                    sticky: true,
                    full_screen_intent: true,
                    light_settings: Some(LightSettings {
                        color: EMERGENCY_LIGHT_COLOR.to_string(),
                        on_ms: 1000,
                        off_ms: 500,
                    }),
                    image_url,
                },
            };
        }

        let announcement = record.kind() == Some(ANNOUNCEMENT_TYPE);
        let (sound, default_sound) = self.android_sound(DEFAULT_SOUND);

        AndroidConfig {
            priority: if announcement {
                DeliveryPriority::High
            } else {
                DeliveryPriority::Normal
            },
            notification: AndroidNotification {
                channel_id: if announcement {
                    URGENT_CHANNEL_ID
                } else {
                    NORMAL_CHANNEL_ID
                }
                .to_string(),
                priority: if announcement {
                    AndroidPriority::High
                } else {
                    AndroidPriority::Default
                },
                sound,
                default_sound,
                vibration_pattern: None,
                bypass_dnd: false,
                category: None,
                visibility: Visibility::Private,
                sticky: false,
                full_screen_intent: false,
                light_settings: None,
                image_url,
            },
        }
    }

    fn android_sound(&self, name: &str) -> (Option<String>, bool) {
        match self.sound_policy {
            SoundPolicy::Explicit => (Some(name.to_string()), false),
            SoundPolicy::PlatformDefault => (None, true),
        }
    }

    fn apns_config(
        &self,
        record: &NotificationRecord,
        classification: Classification,
        title: String,
        body: String,
    ) -> ApnsConfig {
        let mut headers = BTreeMap::new();
        let alert = ApsAlert { title, body };
        let has_image = record.image_url().is_some();

        let aps = if classification.is_emergency() {
            headers.insert("apns-priority".to_string(), "10".to_string());

            let name = match self.sound_policy {
                SoundPolicy::Explicit => EMERGENCY_SOUND,
                SoundPolicy::PlatformDefault => DEFAULT_SOUND,
            };

            Aps {
                alert,
                sound: ApsSound::Critical(CriticalSound {
                    critical: 1,
                    name: name.to_string(),
                    volume: 1.0,
                }),
                badge: None,
                interruption_level: Some("critical".to_string()),
                category: Some(EMERGENCY_APNS_CATEGORY.to_string()),
                mutable_content: has_image,
            }
        } else {
            headers.insert("apns-priority".to_string(), "5".to_string());

            Aps {
                alert,
                sound: ApsSound::Named(DEFAULT_SOUND.to_string()),
                badge: Some(1),
                interruption_level: None,
                category: None,
                mutable_content: has_image,
            }
        };

        ApnsConfig {
            headers,
            payload: ApnsPayload { aps },
            fcm_options: record.image_url().map(|url| ApnsFcmOptions {
                image_url: url.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, message: &str, kind: &str) -> NotificationRecord {
        NotificationRecord::new(title, message).unwrap().with_kind(kind)
    }

    #[test]
    fn platform_default_policy_drops_named_android_sounds() {
        let builder = PayloadBuilder::new(SoundPolicy::PlatformDefault);
        let message = builder.build(&record("Fire", "Evacuate", "urgent"), "all_users");

        assert_eq!(message.android.notification.sound, None);
        assert!(message.android.notification.default_sound);
        match &message.apns.payload.aps.sound {
            ApsSound::Critical(sound) => {
                assert_eq!(sound.critical, 1);
                assert_eq!(sound.name, "default");
            }
            other => panic!("expected critical sound, got {other:?}"),
        }
    }

    #[test]
    fn explicit_policy_names_sounds() {
        let builder = PayloadBuilder::default();
        let message = builder.build(&record("Meeting", "3pm", "general"), "all_users");

        assert_eq!(message.android.notification.sound.as_deref(), Some("default"));
        assert!(!message.android.notification.default_sound);
    }

    #[test]
    fn serialized_android_block_uses_contract_keys() {
        let builder = PayloadBuilder::default();
        let message = builder.build(&record("Fire", "Evacuate", "urgent"), "all_users");
        let value = serde_json::to_value(&message).unwrap();
        let notification = &value["android"]["notification"];

        assert_eq!(notification["channelId"], "emergency_channel");
        assert_eq!(notification["priority"], "max");
        assert_eq!(notification["bypassDnd"], true);
        assert_eq!(notification["fullScreenIntent"], true);
        assert_eq!(notification["vibrationPattern"][1], 1000);
        assert_eq!(notification["lightSettings"]["onMs"], 1000);
        assert_eq!(value["apns"]["headers"]["apns-priority"], "10");
        assert_eq!(value["apns"]["payload"]["aps"]["interruptionLevel"], "critical");
        assert_eq!(value["data"]["requireAcknowledgment"], "true");
    }

    #[test]
    fn normal_serialization_omits_emergency_only_keys() {
        let builder = PayloadBuilder::default();
        let message = builder.build(&record("Meeting", "3pm", "general"), "all_users");
        let value = serde_json::to_value(&message).unwrap();
        let notification = &value["android"]["notification"];

        assert!(notification.get("bypassDnd").is_none());
        assert!(notification.get("sticky").is_none());
        assert!(notification.get("lightSettings").is_none());
        assert!(value["data"].get("requireAcknowledgment").is_none());
        assert_eq!(value["apns"]["payload"]["aps"]["badge"], 1);
    }
}
