//! Target disk selection

use crate::disks::Disk;
use crate::session::Session;
use crate::tui::components::menu_lines;
use crate::tui::event::TuiEvent;
use crate::tui::page::{Command, Message, Page};
use crate::tui::state::SelectionState;
use crate::tui::theme::theme;
use ratatui::text::{Line, Text};
use rust_i18n::t;
use std::borrow::Cow;

pub const ID: &str = "disk_selection";

pub struct DiskPage {
    disks: Vec<Disk>,
    selection: SelectionState,
}

impl DiskPage {
    pub fn new(disks: Vec<Disk>) -> Self {
        let selection = SelectionState::with_count(disks.len());
        Self { disks, selection }
    }
}

impl Page for DiskPage {
    fn id(&self) -> &str {
        ID
    }

    fn title(&self) -> Cow<'static, str> {
        t!("disk.title").to_string().into()
    }

    fn help(&self) -> Cow<'static, str> {
        t!("help.menu").to_string().into()
    }

    fn init(&mut self, session: &mut Session) -> Vec<Command> {
        if let Some(index) = self.disks.iter().position(|d| d.device() == session.device()) {
            self.selection.select(index);
        }
        Vec::new()
    }

    fn handle(&mut self, session: &mut Session, message: &Message) -> Vec<Command> {
        let Message::Key(event) = message else {
            return Vec::new();
        };
        if self.selection.handle(event) {
            return Vec::new();
        }
        if *event == TuiEvent::Enter {
            if let Some(disk) = self.disks.get(self.selection.selected()) {
                session.set_device(disk.device());
                return vec![Command::goto(super::confirm::ID)];
            }
        }
        Vec::new()
    }

    fn render(&self, _session: &Session) -> Text<'static> {
        if self.disks.is_empty() {
            return Text::from(vec![Line::styled(t!("disk.none").to_string(), theme().error())]);
        }
        let labels: Vec<String> = self.disks.iter().map(Disk::label).collect();
        let mut lines = vec![
            Line::styled(t!("disk.prompt").to_string(), theme().normal()),
            Line::default(),
        ];
        lines.extend(menu_lines(&labels, self.selection.selected()));
        Text::from(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disks() -> Vec<Disk> {
        vec![
            Disk {
                name: "sda".to_string(),
                size: 128 << 30,
            },
            Disk {
                name: "vdb".to_string(),
                size: 32 << 30,
            },
        ]
    }

    #[test]
    fn test_enter_stores_device() {
        let mut page = DiskPage::new(disks());
        let mut session = Session::new();
        page.init(&mut session);

        page.handle(&mut session, &Message::Key(TuiEvent::Down));
        let commands = page.handle(&mut session, &Message::Key(TuiEvent::Enter));
        assert_eq!(session.device(), "/dev/vdb");
        assert!(matches!(&commands[..], [Command::Goto(id)] if id == "confirmation"));
    }

    #[test]
    fn test_no_disks_enter_does_nothing() {
        let mut page = DiskPage::new(Vec::new());
        let mut session = Session::new();
        let commands = page.handle(&mut session, &Message::Key(TuiEvent::Enter));
        assert!(commands.is_empty());
        assert_eq!(session.device(), "");
    }

    #[test]
    fn test_reselects_current_device() {
        let mut page = DiskPage::new(disks());
        let mut session = Session::new();
        session.set_device("/dev/vdb");
        page.init(&mut session);
        assert_eq!(page.selection.selected(), 1);
    }
}
