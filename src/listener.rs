//! Session bus observer for desktop notifications.
//!
//! Turns a dedicated session-bus connection into a monitor for
//! `org.freedesktop.Notifications.Notify` calls. A monitor only sees
//! traffic; it never replies. Each call is captured and sent to the
//! history service via a tokio channel.

use std::collections::HashMap;

use anyhow::{Context, Result};
use chrono::Local;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use zbus::message::Type as MessageType;
use zbus::zvariant::OwnedValue;
use zbus::{Connection, Message, MessageStream};

use crate::record::{NotificationRecord, PostedNotification};

pub const NOTIFICATIONS_INTERFACE: &str = "org.freedesktop.Notifications";

/// Match rule handed to `BecomeMonitor`.
pub const NOTIFY_MATCH_RULE: &str =
    "type='method_call',interface='org.freedesktop.Notifications',member='Notify'";

/// Body of a `Notify` call: app_name, replaces_id, app_icon, summary, body,
/// actions, hints, expire_timeout.
type NotifyArgs = (
    String,
    u32,
    String,
    String,
    String,
    Vec<String>,
    HashMap<String, OwnedValue>,
    i32,
);

/// Decode a monitored message into a posted notification.
///
/// Anything that is not a `Notify` call with exactly the eight expected
/// arguments yields `None`.
pub fn decode_notify(msg: &Message) -> Option<PostedNotification> {
    let header = msg.header();
    if header.message_type() != MessageType::MethodCall {
        return None;
    }
    if header.member().map(|m| m.as_str()) != Some("Notify") {
        return None;
    }
    if header.interface().map(|i| i.as_str()) != Some(NOTIFICATIONS_INTERFACE) {
        return None;
    }

    let (app_name, replaces_id, app_icon, summary, body, actions, _hints, expire_timeout) =
        match msg.body().deserialize::<NotifyArgs>() {
            Ok(args) => args,
            Err(e) => {
                debug!("Dropping malformed Notify call: {e}");
                return None;
            }
        };

    Some(PostedNotification {
        app_name,
        replaces_id,
        app_icon,
        summary,
        body,
        actions,
        expire_timeout,
    })
}

pub struct BusListener {
    tx: mpsc::Sender<NotificationRecord>,
}

impl BusListener {
    pub fn new(tx: mpsc::Sender<NotificationRecord>) -> Self {
        Self { tx }
    }

    async fn become_monitor() -> Result<Connection> {
        let conn = Connection::session()
            .await
            .context("Failed to connect to the session bus")?;

        conn.call_method(
            Some("org.freedesktop.DBus"),
            "/org/freedesktop/DBus",
            Some("org.freedesktop.DBus.Monitoring"),
            "BecomeMonitor",
            &(&[NOTIFY_MATCH_RULE][..], 0u32),
        )
        .await
        .context("Session bus refused BecomeMonitor")?;

        Ok(conn)
    }

    /// Observe notifications until the bus connection ends or the history
    /// service stops listening.
    pub async fn run(self) -> Result<()> {
        let conn = Self::become_monitor().await?;
        info!("Watching session bus for notifications");

        let mut stream = MessageStream::from(&conn);
        while let Some(msg) = stream.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    warn!("Bad message on session bus: {e}");
                    continue;
                }
            };

            let Some(posted) = decode_notify(&msg) else {
                continue;
            };
            debug!(
                "Notify from {} (replaces {}, {} action(s))",
                posted.app_name,
                posted.replaces_id,
                posted.actions.len() / 2
            );

            if self.tx.send(posted.capture(Local::now())).await.is_err() {
                debug!("History service stopped, leaving the bus");
                break;
            }
        }

        info!("Session bus monitor ended");
        Ok(())
    }
}
