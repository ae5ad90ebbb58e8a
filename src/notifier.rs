//! Posting history back to the desktop.
//!
//! The primary path spawns an external notifier program (`notify-send`).
//! If that program cannot be started, the same notification goes out
//! in-process through notify-rust (D-Bus).

use std::io;
use std::process::Stdio;

use notify_rust::{Notification, Timeout, Urgency};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::config::NotifierConfig;
use crate::record::{NotificationRecord, APP_ID};
use crate::report::TITLE;

pub trait Notifier {
    /// Show a rendered history text as one notification.
    fn display(&self, text: &str);

    /// Re-post a stored notification as a new one.
    fn replay(&self, record: &NotificationRecord);
}

/// Expire timeout as the notification protocol expects it; anything
/// unparseable means "server default".
fn timeout_ms(record: &NotificationRecord) -> i32 {
    record.expire_timeout.trim().parse().unwrap_or(-1)
}

fn replay_icon<'a>(record: &'a NotificationRecord, fallback: &'a str) -> &'a str {
    if record.app_icon.is_empty() {
        fallback
    } else {
        &record.app_icon
    }
}

/// Spawns the configured notifier program detached from the recorder.
pub struct CommandNotifier {
    program: String,
    urgency: String,
    icon: String,
}

impl CommandNotifier {
    pub fn new(config: &NotifierConfig, icon: &str) -> Self {
        Self {
            program: config.program.clone(),
            urgency: config.urgency.clone(),
            icon: icon.to_string(),
        }
    }

    fn display_args(&self, text: &str) -> Vec<String> {
        vec![
            "-u".into(),
            self.urgency.clone(),
            "-i".into(),
            self.icon.clone(),
            "-a".into(),
            APP_ID.into(),
            TITLE.into(),
            text.into(),
        ]
    }

    fn replay_args(&self, record: &NotificationRecord) -> Vec<String> {
        let mut args = vec![
            "-i".into(),
            replay_icon(record, &self.icon).to_string(),
            "-a".into(),
            APP_ID.into(),
        ];
        if !record.expire_timeout.is_empty() {
            args.push("-t".into());
            args.push(record.expire_timeout.clone());
        }
        // Stored text may itself look like an option.
        args.push("--".into());
        args.push(record.summary.clone());
        args.push(record.body.clone());
        args
    }

    /// Start the program without waiting for it. Errors only if the
    /// process could not be started.
    fn spawn(&self, args: &[String]) -> io::Result<()> {
        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;
        debug!("Started {} (pid {:?})", self.program, child.id());
        Ok(())
    }

    pub fn try_display(&self, text: &str) -> io::Result<()> {
        self.spawn(&self.display_args(text))
    }

    pub fn try_replay(&self, record: &NotificationRecord) -> io::Result<()> {
        self.spawn(&self.replay_args(record))
    }
}

/// In-process notifications via notify-rust (D-Bus).
pub struct DesktopNotifier {
    urgency: Urgency,
    icon: String,
}

impl DesktopNotifier {
    pub fn new(config: &NotifierConfig, icon: &str) -> Self {
        let urgency = match config.urgency.to_lowercase().as_str() {
            "low" => Urgency::Low,
            "critical" => Urgency::Critical,
            _ => Urgency::Normal,
        };
        Self {
            urgency,
            icon: icon.to_string(),
        }
    }
}

impl Notifier for DesktopNotifier {
    fn display(&self, text: &str) {
        debug!("Notification: {TITLE}");

        if let Err(e) = Notification::new()
            .appname(APP_ID)
            .summary(TITLE)
            .body(text)
            .icon(&self.icon)
            .urgency(self.urgency)
            .show()
        {
            warn!("Failed to show notification: {e}");
        }
    }

    fn replay(&self, record: &NotificationRecord) {
        debug!("Replaying: {}", record.summary);

        if let Err(e) = Notification::new()
            .appname(APP_ID)
            .summary(&record.summary)
            .body(&record.body)
            .icon(replay_icon(record, &self.icon))
            .timeout(Timeout::from(timeout_ms(record)))
            .show()
        {
            warn!("Failed to replay notification: {e}");
        }
    }
}

/// External program first; in-process only when the program did not start.
pub struct FallbackNotifier {
    command: CommandNotifier,
    desktop: DesktopNotifier,
}

impl FallbackNotifier {
    pub fn new(config: &NotifierConfig, icon: &str) -> Self {
        Self {
            command: CommandNotifier::new(config, icon),
            desktop: DesktopNotifier::new(config, icon),
        }
    }
}

impl Notifier for FallbackNotifier {
    fn display(&self, text: &str) {
        if let Err(e) = self.command.try_display(text) {
            warn!("{} unavailable ({e}), notifying in-process", self.command.program);
            self.desktop.display(text);
        }
    }

    fn replay(&self, record: &NotificationRecord) {
        if let Err(e) = self.command.try_replay(record) {
            warn!("{} unavailable ({e}), replaying in-process", self.command.program);
            self.desktop.replay(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::sample;

    fn command() -> CommandNotifier {
        CommandNotifier::new(&NotifierConfig::default(), "notify-history")
    }

    #[test]
    fn display_args_match_notify_send() {
        assert_eq!(
            command().display_args("text"),
            [
                "-u",
                "critical",
                "-i",
                "notify-history",
                "-a",
                APP_ID,
                "Notifications History",
                "text"
            ]
        );
    }

    #[test]
    fn replay_args_fall_back_to_own_icon() {
        let record = sample("Foo", "Hello", "");
        assert_eq!(
            command().replay_args(&record),
            ["-i", "notify-history", "-a", APP_ID, "-t", "-1", "--", "Hello", ""]
        );

        let mut record = sample("Foo", "Hello", "world");
        record.app_icon = "mail-unread".into();
        record.expire_timeout = "5000".into();
        assert_eq!(
            command().replay_args(&record),
            ["-i", "mail-unread", "-a", APP_ID, "-t", "5000", "--", "Hello", "world"]
        );
    }

    #[test]
    fn replay_args_omit_missing_timeout() {
        let mut record = sample("Foo", "Hello", "");
        record.expire_timeout.clear();
        assert!(!command().replay_args(&record).contains(&"-t".to_string()));
    }

    #[test]
    fn replay_args_keep_option_like_text_positional() {
        let record = sample("Foo", "-u", "low");
        assert_eq!(
            command().replay_args(&record),
            ["-i", "notify-history", "-a", APP_ID, "-t", "-1", "--", "-u", "low"]
        );
    }

    #[test]
    fn unparseable_timeout_is_default() {
        let mut record = sample("Foo", "x", "");
        assert_eq!(timeout_ms(&record), -1);
        record.expire_timeout = "3000".into();
        assert_eq!(timeout_ms(&record), 3000);
        record.expire_timeout = "soon".into();
        assert_eq!(timeout_ms(&record), -1);
    }

    #[tokio::test]
    async fn missing_program_reports_start_failure() {
        let config = NotifierConfig {
            program: "/nonexistent/notify-send-missing".into(),
            ..NotifierConfig::default()
        };
        let notifier = CommandNotifier::new(&config, "icon");

        assert!(notifier.try_display("text").is_err());
        assert!(notifier.try_replay(&sample("Foo", "x", "")).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn started_program_is_success() {
        let config = NotifierConfig {
            program: "true".into(),
            ..NotifierConfig::default()
        };
        let notifier = CommandNotifier::new(&config, "icon");

        assert!(notifier.try_display("text").is_ok());
    }
}
