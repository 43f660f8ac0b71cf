//! Push and notification-click handling.
//!
//! Stateless and uncorrelated with the cache: push payloads are parsed
//! into notification descriptions, clicks become an open-window
//! command. Malformed payloads are silently ignored.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;
use url::Url;

/// Icon used for both the notification icon and badge.
const ICON_PATH: &str = "/icon-192.svg";
/// Short-long-short vibration pattern, in milliseconds.
const VIBRATION_PATTERN: [u32; 3] = [100, 50, 100];
/// Fixed identifier embedded in every notification's data.
const PRIMARY_KEY: u32 = 1;

#[derive(Debug, Deserialize)]
struct PushPayload {
    title: String,
    body: String,
}

/// A local notification to display, described as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibration: Vec<u32>,
    pub data: NotificationData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationData {
    /// Arrival time as epoch milliseconds.
    pub date_of_arrival: i64,
    pub primary_key: u32,
}

/// Turns push events into notifications and clicks into navigation.
pub struct NotificationHandler {
    site_root: Url,
}

impl NotificationHandler {
    pub fn new(origin: Url) -> Self {
        let site_root = origin.join("/").unwrap_or(origin);
        Self { site_root }
    }

    /// Parse a push payload into a notification description.
    ///
    /// Absent or malformed payloads produce no notification.
    pub fn handle_push(&self, payload: Option<&[u8]>) -> Option<Notification> {
        let payload = payload?;
        let parsed: PushPayload = match serde_json::from_slice(payload) {
            Ok(parsed) => parsed,
            Err(error) => {
                debug!(error = %error, "ignoring malformed push payload");
                return None;
            }
        };

        Some(Notification {
            title: parsed.title,
            body: parsed.body,
            icon: ICON_PATH.to_string(),
            badge: ICON_PATH.to_string(),
            vibration: VIBRATION_PATTERN.to_vec(),
            data: NotificationData {
                date_of_arrival: epoch_millis(),
                primary_key: PRIMARY_KEY,
            },
        })
    }

    /// A click dismisses the notification and opens the site root.
    pub fn handle_click(&self) -> Url {
        self.site_root.clone()
    }
}

fn epoch_millis() -> i64 {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000) as i64
}
