//! History service: owns the store, the notifier and the tray, and runs the
//! one event loop that handles both captured notifications and menu actions.

use std::ops::ControlFlow;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::history::History;
use crate::notifier::Notifier;
use crate::record::{Limit, NotificationRecord};
use crate::report::render_history;
use crate::tray::{MenuAction, TrayHandle};

pub struct HistoryService {
    history: History,
    notifier: Box<dyn Notifier>,
    tray: Option<TrayHandle>,
}

impl HistoryService {
    pub fn new(history: History, notifier: Box<dyn Notifier>) -> Self {
        Self {
            history,
            notifier,
            tray: None,
        }
    }

    pub fn attach_tray(&mut self, tray: TrayHandle) {
        self.tray = Some(tray);
        self.refresh_tray();
    }

    fn refresh_tray(&self) {
        let Some(tray) = &self.tray else {
            return;
        };
        match self.history.len() {
            Ok(stored) => tray.set_stored(stored),
            Err(e) => warn!("Failed to count notifications: {e:#}"),
        }
    }

    pub fn on_notification(&mut self, record: NotificationRecord) {
        if let Err(e) = self.history.record(record) {
            error!("Failed to record notification: {e:#}");
            return;
        }
        self.refresh_tray();
    }

    /// Run one menu action. `Break` means the user asked to exit.
    pub fn handle_action(&mut self, action: MenuAction) -> ControlFlow<()> {
        info!("Menu: {action:?}");
        let result = match action {
            MenuAction::Show(limit) => self.show(limit),
            MenuAction::Replay(limit) => self.replay(limit),
            MenuAction::Forget(limit) => self.history.purge(limit),
            MenuAction::ForgetAll => self.history.clear(),
            MenuAction::Exit => return ControlFlow::Break(()),
        };
        if let Err(e) = result {
            error!("{action:?} failed: {e:#}");
        }
        self.refresh_tray();
        ControlFlow::Continue(())
    }

    fn show(&self, limit: Limit) -> Result<()> {
        let records = self.history.query(limit)?;
        self.notifier.display(&render_history(&records));
        Ok(())
    }

    fn replay(&self, limit: Limit) -> Result<()> {
        let records = self.history.query(limit)?;
        info!("Replaying {} notification(s)", records.len());
        for record in &records {
            self.notifier.replay(record);
        }
        Ok(())
    }

    /// Dispatch captured notifications and menu actions until the user
    /// exits or the process is asked to terminate.
    pub async fn run(
        &mut self,
        mut records: mpsc::Receiver<NotificationRecord>,
        mut actions: mpsc::UnboundedReceiver<MenuAction>,
    ) {
        let mut listening = true;
        let mut menu_open = true;

        let ctrl_c = tokio::signal::ctrl_c();
        let terminated = terminated();
        tokio::pin!(ctrl_c, terminated);

        info!("Service ready, recording notifications");

        loop {
            tokio::select! {
                biased;

                _ = &mut ctrl_c => {
                    info!("Interrupted");
                    break;
                }
                _ = &mut terminated => {
                    info!("Terminated");
                    break;
                }
                record = records.recv(), if listening => match record {
                    Some(record) => self.on_notification(record),
                    None => {
                        warn!("Notification listener stopped; history is no longer recorded");
                        listening = false;
                    }
                },
                action = actions.recv(), if menu_open => match action {
                    Some(action) => {
                        if self.handle_action(action).is_break() {
                            break;
                        }
                    }
                    None => menu_open = false,
                },
            }
        }
    }

    /// Remove the tray icon and release the store.
    pub fn shutdown(self) -> Result<()> {
        if let Some(tray) = &self.tray {
            tray.hide();
        }
        self.history.close()?;
        info!("History closed");
        Ok(())
    }
}

#[cfg(unix)]
async fn terminated() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            warn!("Cannot listen for SIGTERM: {e}");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminated() {
    std::future::pending::<()>().await;
}
