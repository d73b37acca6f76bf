// SPDX-License-Identifier: GPL-3.0-only
//! Tray icon and menu
//!
//! The tray runs on ksni's own thread. Menu entries never touch the display
//! controller: each one sends an [`AppMsg`] to the event loop.

use ksni::menu::{MenuItem, StandardItem, SubMenu};
use tokio::sync::mpsc::UnboundedSender;

use super::{APPID, AppMsg};
use crate::config::Config;
use crate::display::{Layout, Output, ScaleFactor};
use crate::fl;

const ICON: &str = "video-display";

pub struct HdmiTray {
    sender: UnboundedSender<AppMsg>,
    external_scales: Vec<ScaleFactor>,
    laptop_scales: Vec<ScaleFactor>,
    /// Last polled connector status, `None` until the first poll
    connected: Option<bool>,
}

impl HdmiTray {
    pub fn new(sender: UnboundedSender<AppMsg>, config: &Config) -> Self {
        Self {
            sender,
            external_scales: config.scales.external_factors(),
            laptop_scales: config.scales.laptop_factors(),
            connected: None,
        }
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = Some(connected);
    }

    pub fn status_label(&self) -> String {
        match self.connected {
            None => fl!("status-checking"),
            Some(true) => fl!("status-connected"),
            Some(false) => fl!("status-disconnected"),
        }
    }

    fn send(&self, message: AppMsg) {
        if self.sender.send(message).is_err() {
            warn!("event loop is gone, dropping menu action");
        }
    }

    fn action(label: String, message: AppMsg) -> MenuItem<Self> {
        MenuItem::Standard(StandardItem {
            label,
            activate: Box::new(move |this: &mut Self| this.send(message.clone())),
            ..Default::default()
        })
    }

    fn scale_menu(label: String, output: Output, scales: &[ScaleFactor]) -> MenuItem<Self> {
        let submenu = scales
            .iter()
            .map(|factor| {
                Self::action(
                    fl!("scale-item", percent = factor.percent().to_string()),
                    AppMsg::SetScale(output, factor.clone()),
                )
            })
            .collect();

        MenuItem::SubMenu(SubMenu {
            label,
            submenu,
            ..Default::default()
        })
    }
}

impl ksni::Tray for HdmiTray {
    fn id(&self) -> String {
        APPID.into()
    }

    fn title(&self) -> String {
        fl!("app-title")
    }

    fn icon_name(&self) -> String {
        ICON.into()
    }

    fn tool_tip(&self) -> ksni::ToolTip {
        ksni::ToolTip {
            icon_name: ICON.into(),
            title: fl!("app-title"),
            description: self.status_label(),
            ..Default::default()
        }
    }

    fn menu(&self) -> Vec<MenuItem<Self>> {
        let positions = Layout::ALL
            .into_iter()
            .map(|layout| {
                let label = match layout {
                    Layout::Right => fl!("position-right"),
                    Layout::Left => fl!("position-left"),
                    Layout::Above => fl!("position-above"),
                };
                Self::action(label, AppMsg::SetLayout(layout))
            })
            .collect();

        vec![
            Self::action(fl!("fix-external"), AppMsg::FixExternal),
            MenuItem::Separator,
            MenuItem::SubMenu(SubMenu {
                label: fl!("position-menu"),
                submenu: positions,
                ..Default::default()
            }),
            MenuItem::Separator,
            Self::scale_menu(
                fl!("scale-external-menu"),
                Output::External,
                &self.external_scales,
            ),
            Self::scale_menu(fl!("scale-laptop-menu"), Output::Laptop, &self.laptop_scales),
            MenuItem::Separator,
            Self::action(fl!("enable-external"), AppMsg::EnableExternal),
            Self::action(fl!("disable-external"), AppMsg::DisableExternal),
            MenuItem::Separator,
            MenuItem::Standard(StandardItem {
                label: self.status_label(),
                enabled: false,
                ..Default::default()
            }),
            MenuItem::Separator,
            Self::action(fl!("quit"), AppMsg::Quit),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksni::Tray;
    use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

    fn tray() -> (HdmiTray, UnboundedReceiver<AppMsg>) {
        let (sender, receiver) = unbounded_channel();
        (HdmiTray::new(sender, &Config::default()), receiver)
    }

    fn labels(items: &[MenuItem<HdmiTray>]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| match item {
                MenuItem::Standard(item) => Some(item.label.clone()),
                MenuItem::SubMenu(menu) => Some(menu.label.clone()),
                _ => None,
            })
            .collect()
    }

    /// Click the entry reached by following `path` through the submenus
    fn click(tray: &mut HdmiTray, path: &[String]) {
        let mut items = tray.menu();
        for (depth, label) in path.iter().enumerate() {
            let position = items
                .iter()
                .position(|item| match item {
                    MenuItem::Standard(item) => &item.label == label,
                    MenuItem::SubMenu(menu) => &menu.label == label,
                    _ => false,
                })
                .unwrap_or_else(|| panic!("no menu entry {label:?}"));

            match items.swap_remove(position) {
                MenuItem::SubMenu(menu) => items = menu.submenu,
                MenuItem::Standard(item) => {
                    assert_eq!(depth, path.len() - 1, "{label:?} is not a submenu");
                    (item.activate)(tray);
                    return;
                }
                _ => unreachable!(),
            }
        }
        panic!("{path:?} is a submenu, not an entry");
    }

    #[test]
    fn test_top_level_menu() {
        let (tray, _rx) = tray();
        assert_eq!(
            labels(&tray.menu()),
            [
                fl!("fix-external"),
                fl!("position-menu"),
                fl!("scale-external-menu"),
                fl!("scale-laptop-menu"),
                fl!("enable-external"),
                fl!("disable-external"),
                fl!("status-checking"),
                fl!("quit"),
            ]
        );
    }

    #[test]
    fn test_scale_submenus_show_percentages() {
        let (tray, _rx) = tray();
        let menu = tray.menu();
        let submenus: Vec<_> = menu
            .iter()
            .filter_map(|item| match item {
                MenuItem::SubMenu(menu) => Some(labels(&menu.submenu)),
                _ => None,
            })
            .collect();

        assert_eq!(submenus[1], ["100%", "125%", "150%", "175%", "200%"]);
        assert_eq!(submenus[2], ["100%", "125%", "150%", "175%", "200%", "225%"]);
    }

    #[test]
    fn test_clicks_send_messages() {
        let (mut tray, mut rx) = tray();

        click(&mut tray, &[fl!("fix-external")]);
        assert_eq!(rx.try_recv().unwrap(), AppMsg::FixExternal);

        click(&mut tray, &[fl!("position-menu"), fl!("position-above")]);
        assert_eq!(rx.try_recv().unwrap(), AppMsg::SetLayout(Layout::Above));

        click(&mut tray, &[fl!("scale-laptop-menu"), "225%".to_string()]);
        assert_eq!(
            rx.try_recv().unwrap(),
            AppMsg::SetScale(Output::Laptop, "2.25".parse().unwrap())
        );

        click(&mut tray, &[fl!("disable-external")]);
        assert_eq!(rx.try_recv().unwrap(), AppMsg::DisableExternal);

        click(&mut tray, &[fl!("quit")]);
        assert_eq!(rx.try_recv().unwrap(), AppMsg::Quit);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_status_label_follows_polls() {
        let (mut tray, _rx) = tray();
        assert_eq!(tray.tool_tip().description, fl!("status-checking"));

        tray.set_connected(true);
        assert!(labels(&tray.menu()).contains(&fl!("status-connected")));

        tray.set_connected(false);
        assert_eq!(tray.tool_tip().description, fl!("status-disconnected"));
    }

    #[test]
    fn test_click_after_event_loop_stopped_is_harmless() {
        let (mut tray, rx) = tray();
        drop(rx);
        click(&mut tray, &[fl!("enable-external")]);
    }
}
