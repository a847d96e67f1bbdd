use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::outbound::{
    AndroidPriority, ApsAlert, ApsSound, DeliveryPriority, LightSettings, OutboundMessage,
    Visibility,
};

// Wire shapes for the FCM HTTP v1 `messages:send` endpoint. Android hints the
// v1 API has no field for (bypassDnd, category, fullScreenIntent) stay on the
// domain message only; the device derives them from the classification.

#[derive(Debug, Clone, Serialize)]
pub struct FcmRequest {
    pub message: FcmMessage,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmMessage {
    pub topic: String,
    pub notification: FcmNotification,
    pub data: BTreeMap<String, String>,
    pub android: FcmAndroidConfig,
    pub apns: FcmApnsConfig,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmNotification {
    pub title: String,
    pub body: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmAndroidConfig {
    pub priority: &'static str,
    pub notification: FcmAndroidNotification,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmAndroidNotification {
    pub channel_id: String,
    pub notification_priority: &'static str,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub default_sound: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vibrate_timings: Option<Vec<String>>,

    pub visibility: &'static str,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sticky: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub light_settings: Option<FcmLightSettings>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmLightSettings {
    pub color: FcmColor,
    pub light_on_duration: String,
    pub light_off_duration: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmColor {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmApnsConfig {
    pub headers: BTreeMap<String, String>,
    pub payload: FcmApnsPayload,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fcm_options: Option<FcmApnsOptions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmApnsPayload {
    pub aps: FcmAps,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmAps {
    pub alert: ApsAlert,
    pub sound: ApsSound,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,

    #[serde(rename = "interruption-level", skip_serializing_if = "Option::is_none")]
    pub interruption_level: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(rename = "mutable-content", skip_serializing_if = "Option::is_none")]
    pub mutable_content: Option<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FcmApnsOptions {
    pub image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmResponse {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmErrorResponse {
    pub error: FcmErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FcmErrorBody {
    pub code: u16,
    pub message: String,

    #[serde(default)]
    pub status: Option<String>,
}

// Protobuf JSON duration, e.g. `1.500s`.
pub fn duration_from_millis(ms: u64) -> String {
    format!("{}.{:03}s", ms / 1000, ms % 1000)
}

impl From<&LightSettings> for FcmLightSettings {
    fn from(lights: &LightSettings) -> Self {
        let (red, green, blue) = lights.rgb().unwrap_or((255, 255, 255));

        Self {
            color: FcmColor {
                red: f32::from(red) / 255.0,
                green: f32::from(green) / 255.0,
                blue: f32::from(blue) / 255.0,
                alpha: 1.0,
            },
            light_on_duration: duration_from_millis(lights.on_ms),
            light_off_duration: duration_from_millis(lights.off_ms),
        }
    }
}

impl From<&OutboundMessage> for FcmRequest {
    fn from(outbound: &OutboundMessage) -> Self {
        let android = &outbound.android.notification;
        let aps = &outbound.apns.payload.aps;

        let message = FcmMessage {
            topic: outbound.topic.clone(),
            notification: FcmNotification {
                title: outbound.notification.title.clone(),
                body: outbound.notification.body.clone(),
                image: outbound.notification.image_url.clone(),
            },
            data: outbound.data.clone(),
            android: FcmAndroidConfig {
                priority: match outbound.android.priority {
                    DeliveryPriority::High => "HIGH",
                    DeliveryPriority::Normal => "NORMAL",
                },
                notification: FcmAndroidNotification {
                    channel_id: android.channel_id.clone(),
                    notification_priority: match android.priority {
                        AndroidPriority::Max => "PRIORITY_MAX",
                        AndroidPriority::High => "PRIORITY_HIGH",
                        AndroidPriority::Default => "PRIORITY_DEFAULT",
                    },
                    sound: android.sound.clone(),
                    default_sound: android.default_sound,
                    vibrate_timings: android
                        .vibration_pattern
                        .as_ref()
                        .map(|pattern| pattern.iter().copied().map(duration_from_millis).collect()),
                    visibility: match android.visibility {
                        Visibility::Public => "PUBLIC",
                        Visibility::Private => "PRIVATE",
                    },
                    sticky: android.sticky,
                    light_settings: android.light_settings.as_ref().map(FcmLightSettings::from),
                    image: android.image_url.clone(),
                },
            },
            apns: FcmApnsConfig {
                headers: outbound.apns.headers.clone(),
                payload: FcmApnsPayload {
                    aps: FcmAps {
                        alert: aps.alert.clone(),
                        sound: aps.sound.clone(),
                        badge: aps.badge,
                        interruption_level: aps.interruption_level.clone(),
                        category: aps.category.clone(),
                        mutable_content: aps.mutable_content.then_some(1),
                    },
                },
                fcm_options: outbound.apns.fcm_options.as_ref().map(|options| FcmApnsOptions {
                    image: options.image_url.clone(),
                }),
            },
        };

        FcmRequest { message }
    }
}
