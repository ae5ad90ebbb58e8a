//! Status-bar icon and menu (StatusNotifierItem via ksni).
//!
//! ksni runs the tray on its own thread. Menu callbacks never touch the
//! history; they only send a [`MenuAction`] to the service loop.

use ksni::menu::StandardItem;
use ksni::{MenuItem, ToolTip, Tray, TrayService};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::TrayConfig;
use crate::record::{Limit, APP_ID};
use crate::report::TITLE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Show(Limit),
    Replay(Limit),
    Forget(Limit),
    ForgetAll,
    Exit,
}

pub struct HistoryTray {
    recent_count: usize,
    icon: String,
    stored: usize,
    tx: mpsc::UnboundedSender<MenuAction>,
}

impl HistoryTray {
    pub fn new(config: &TrayConfig, tx: mpsc::UnboundedSender<MenuAction>) -> Self {
        Self {
            recent_count: config.recent_count,
            icon: config.icon.clone(),
            stored: 0,
            tx,
        }
    }

    fn send(&self, action: MenuAction) {
        debug!("Menu action: {action:?}");
        if self.tx.send(action).is_err() {
            debug!("History service gone, dropping {action:?}");
        }
    }

    fn recent(&self) -> Limit {
        Limit::Count(self.recent_count)
    }

    fn item(label: String, action: MenuAction) -> MenuItem<Self> {
        StandardItem {
            label,
            activate: Box::new(move |tray: &mut Self| tray.send(action)),
            ..Default::default()
        }
        .into()
    }

    /// Put the icon on the status bar.
    pub fn spawn(self) -> TrayHandle {
        let service = TrayService::new(self);
        let handle = service.handle();
        service.spawn();
        info!("Tray icon shown");
        TrayHandle { inner: handle }
    }
}

impl Tray for HistoryTray {
    fn id(&self) -> String {
        APP_ID.into()
    }

    fn title(&self) -> String {
        TITLE.into()
    }

    fn icon_name(&self) -> String {
        self.icon.clone()
    }

    fn tool_tip(&self) -> ToolTip {
        ToolTip {
            title: TITLE.into(),
            description: format!("{} notification(s) stored", self.stored),
            ..Default::default()
        }
    }

    fn activate(&mut self, _x: i32, _y: i32) {
        self.send(MenuAction::Show(self.recent()));
    }

    fn secondary_activate(&mut self, _x: i32, _y: i32) {
        self.send(MenuAction::Show(self.recent()));
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        let n = self.recent_count;
        let recent = self.recent();
        vec![
            Self::item(format!("Show Last {n} Notifications"), MenuAction::Show(recent)),
            Self::item("Show All Notifications".into(), MenuAction::Show(Limit::All)),
            MenuItem::Separator,
            Self::item(format!("Replay Last {n} Notifications"), MenuAction::Replay(recent)),
            Self::item("Replay All Notifications".into(), MenuAction::Replay(Limit::All)),
            MenuItem::Separator,
            Self::item(format!("Forget Last {n} Notifications"), MenuAction::Forget(recent)),
            Self::item("Forget All Notifications".into(), MenuAction::ForgetAll),
            MenuItem::Separator,
            Self::item("Exit".into(), MenuAction::Exit),
        ]
    }
}

/// Owner side of a running tray.
pub struct TrayHandle {
    inner: ksni::Handle<HistoryTray>,
}

impl TrayHandle {
    /// Refresh the stored-count tooltip.
    pub fn set_stored(&self, stored: usize) {
        self.inner.update(|tray| tray.stored = stored);
    }

    /// Remove the icon from the status bar.
    pub fn hide(&self) {
        self.inner.shutdown();
        info!("Tray icon removed");
    }
}
