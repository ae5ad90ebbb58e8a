//! Notification records as captured from the session bus.

use chrono::{DateTime, Local};

/// Application identity used for everything this recorder posts itself.
/// Notifications carrying this app name are never recorded.
pub const APP_ID: &str = "LibNotifyHistoryApplet";

/// Capture timestamp format, second resolution.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One observed desktop notification. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub timestamp: String,
    pub app_name: String,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    pub expire_timeout: String,
}

impl NotificationRecord {
    /// Whether this notification was posted by the recorder itself.
    pub fn is_own(&self) -> bool {
        self.app_name == APP_ID
    }

    /// Display text: summary and body joined by a newline, or whichever is
    /// non-empty. `None` when both are empty.
    pub fn text(&self) -> Option<String> {
        match (self.summary.is_empty(), self.body.is_empty()) {
            (false, false) => Some(format!("{}\n{}", self.summary, self.body)),
            (false, true) => Some(self.summary.clone()),
            (true, false) => Some(self.body.clone()),
            (true, true) => None,
        }
    }
}

/// The arguments of one `org.freedesktop.Notifications.Notify` call,
/// in wire order. `actions` and `hints` are not retained.
#[derive(Debug, Clone)]
pub struct PostedNotification {
    pub app_name: String,
    pub replaces_id: u32,
    pub app_icon: String,
    pub summary: String,
    pub body: String,
    pub actions: Vec<String>,
    pub expire_timeout: i32,
}

impl PostedNotification {
    /// Stamp the notification with its capture time.
    pub fn capture(self, at: DateTime<Local>) -> NotificationRecord {
        NotificationRecord {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            app_name: self.app_name,
            app_icon: self.app_icon,
            summary: self.summary,
            body: self.body,
            expire_timeout: self.expire_timeout.to_string(),
        }
    }
}

/// How many of the most recent records an operation touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(usize),
    All,
}

impl Limit {
    /// Number of records selected out of `len` available.
    pub fn take(self, len: usize) -> usize {
        match self {
            Limit::Count(n) => n.min(len),
            Limit::All => len,
        }
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Count(n) => write!(f, "last {n}"),
            Self::All => write!(f, "all"),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample(app_name: &str, summary: &str, body: &str) -> NotificationRecord {
    NotificationRecord {
        timestamp: "2024-03-01 12:00:00".into(),
        app_name: app_name.into(),
        app_icon: String::new(),
        summary: summary.into(),
        body: body.into(),
        expire_timeout: "-1".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn capture_formats_timestamp_and_timeout() {
        let posted = PostedNotification {
            app_name: "Firefox".into(),
            replaces_id: 0,
            app_icon: "firefox".into(),
            summary: "Download complete".into(),
            body: "report.pdf".into(),
            actions: vec!["default".into(), "Open".into()],
            expire_timeout: -1,
        };
        let at = Local.with_ymd_and_hms(2024, 3, 1, 9, 5, 7).unwrap();
        let record = posted.capture(at);

        assert_eq!(record.timestamp, "2024-03-01 09:05:07");
        assert_eq!(record.app_name, "Firefox");
        assert_eq!(record.app_icon, "firefox");
        assert_eq!(record.expire_timeout, "-1");
    }

    #[test]
    fn text_joins_non_empty_parts() {
        assert_eq!(sample("a", "s", "b").text().as_deref(), Some("s\nb"));
        assert_eq!(sample("a", "s", "").text().as_deref(), Some("s"));
        assert_eq!(sample("a", "", "b").text().as_deref(), Some("b"));
        assert_eq!(sample("a", "", "").text(), None);
    }

    #[test]
    fn own_notifications_are_recognized() {
        assert!(sample(APP_ID, "x", "").is_own());
        assert!(!sample("Foo", "x", "").is_own());
    }

    #[test]
    fn limit_clamps_to_available() {
        assert_eq!(Limit::Count(10).take(3), 3);
        assert_eq!(Limit::Count(2).take(3), 2);
        assert_eq!(Limit::Count(0).take(3), 0);
        assert_eq!(Limit::All.take(3), 3);
        assert_eq!(Limit::All.take(0), 0);
    }
}
