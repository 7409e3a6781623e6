//! Page registry and back-navigation stack

use crate::session::Session;
use crate::tui::page::{Command, Message, Page};
use std::collections::VecDeque;
use tracing::{debug, info, warn};

/// Owns every page, in registration order, and the path taken through them
#[derive(Default)]
pub struct Navigator {
    pages: Vec<Box<dyn Page>>,
    current: String,
    history: Vec<String>,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `page` unless its identifier is already registered
    pub fn register(&mut self, page: Box<dyn Page>) -> bool {
        if self.contains(page.id()) {
            debug!(page = page.id(), "Page already registered");
            return false;
        }
        debug!(page = page.id(), "Page registered");
        self.pages.push(page);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.pages.iter().any(|p| p.id() == id)
    }

    /// Registered identifiers in order
    pub fn page_ids(&self) -> Vec<&str> {
        self.pages.iter().map(|p| p.id()).collect()
    }

    pub fn current_id(&self) -> &str {
        &self.current
    }

    pub fn current(&self) -> Option<&dyn Page> {
        self.pages
            .iter()
            .find(|p| p.id() == self.current)
            .map(|p| p.as_ref())
    }

    pub fn current_mut(&mut self) -> Option<&mut Box<dyn Page>> {
        let current = &self.current;
        self.pages.iter_mut().find(|p| p.id() == current)
    }

    /// Number of pages on the back stack
    pub fn depth(&self) -> usize {
        self.history.len()
    }

    /// Activate the first registered page
    pub fn start(&mut self, session: &mut Session) -> Vec<Command> {
        let Some(first) = self.pages.first().map(|p| p.id().to_string()) else {
            warn!("No pages registered");
            return Vec::new();
        };
        match self.activate(&first, session) {
            Some(commands) => self.apply(session, commands),
            None => Vec::new(),
        }
    }

    /// Make `id` current and run its init step.
    ///
    /// Returns `None` and leaves everything untouched for an unknown id.
    pub fn activate(&mut self, id: &str, session: &mut Session) -> Option<Vec<Command>> {
        let Some(page) = self.pages.iter_mut().find(|p| p.id() == id) else {
            warn!(page = id, "Cannot activate unknown page");
            return None;
        };
        let commands = page.init(session);
        self.current = id.to_string();
        info!(page = id, depth = self.history.len(), "Page activated");
        Some(commands)
    }

    /// Hand `message` to the current page and process what it asks for.
    ///
    /// Commands the navigator does not handle are returned.
    pub fn dispatch(&mut self, session: &mut Session, message: &Message) -> Vec<Command> {
        let commands = match self.current_mut() {
            Some(page) => page.handle(session, message),
            None => {
                warn!(page = %self.current, "No current page");
                return Vec::new();
            }
        };
        self.apply(session, commands)
    }

    /// Return to the previous page. No-op on an empty stack.
    pub fn back(&mut self, session: &mut Session) -> Vec<Command> {
        let Some(previous) = self.history.last().cloned() else {
            debug!("Back on empty stack ignored");
            return Vec::new();
        };
        if !self.contains(&previous) {
            warn!(page = %previous, "Previous page missing");
            return Vec::new();
        }
        self.history.pop();
        match self.activate(&previous, session) {
            Some(commands) => self.apply(session, commands),
            None => Vec::new(),
        }
    }

    /// Process navigation commands in order, including those produced by
    /// the init steps of pages activated along the way
    pub fn apply(&mut self, session: &mut Session, commands: Vec<Command>) -> Vec<Command> {
        let mut queue: VecDeque<Command> = commands.into();
        let mut leftover = Vec::new();

        while let Some(command) = queue.pop_front() {
            match command {
                Command::Register(page) => {
                    self.register(page);
                }
                Command::Advance => match self.next_id() {
                    Some(next) => self.forward(&next, session, &mut queue),
                    None => debug!(page = %self.current, "No page after current"),
                },
                Command::Goto(id) => self.forward(&id, session, &mut queue),
                other => leftover.push(other),
            }
        }
        leftover
    }

    fn next_id(&self) -> Option<String> {
        let index = self.pages.iter().position(|p| p.id() == self.current)?;
        self.pages.get(index + 1).map(|p| p.id().to_string())
    }

    fn forward(&mut self, id: &str, session: &mut Session, queue: &mut VecDeque<Command>) {
        if !self.contains(id) {
            warn!(page = id, "Navigation to unknown page ignored");
            return;
        }
        let from = std::mem::take(&mut self.current);
        self.history.push(from.clone());
        match self.activate(id, session) {
            Some(commands) => queue.extend(commands),
            None => {
                self.history.pop();
                self.current = from;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::event::TuiEvent;
    use ratatui::text::Text;
    use std::borrow::Cow;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::time::Duration;

    /// Page whose Enter key yields a fixed command list
    struct StubPage {
        id: String,
        on_enter: fn() -> Vec<Command>,
        inits: Rc<Cell<usize>>,
    }

    impl StubPage {
        fn boxed(id: &str, on_enter: fn() -> Vec<Command>) -> Box<dyn Page> {
            Box::new(Self {
                id: id.to_string(),
                on_enter,
                inits: Rc::new(Cell::new(0)),
            })
        }
    }

    impl Page for StubPage {
        fn id(&self) -> &str {
            &self.id
        }

        fn title(&self) -> Cow<'static, str> {
            Cow::Owned(self.id.clone())
        }

        fn help(&self) -> Cow<'static, str> {
            Cow::Borrowed("")
        }

        fn init(&mut self, _session: &mut Session) -> Vec<Command> {
            self.inits.set(self.inits.get() + 1);
            Vec::new()
        }

        fn handle(&mut self, _session: &mut Session, message: &Message) -> Vec<Command> {
            match message {
                Message::Key(TuiEvent::Enter) => (self.on_enter)(),
                _ => Vec::new(),
            }
        }

        fn render(&self, _session: &Session) -> Text<'static> {
            Text::raw(self.id.clone())
        }
    }

    fn advance() -> Vec<Command> {
        vec![Command::Advance]
    }

    fn nothing() -> Vec<Command> {
        Vec::new()
    }

    fn navigator() -> (Navigator, Session) {
        let mut nav = Navigator::new();
        nav.register(StubPage::boxed("one", advance));
        nav.register(StubPage::boxed("two", advance));
        nav.register(StubPage::boxed("three", || vec![Command::goto("one")]));
        let mut session = Session::new();
        nav.start(&mut session);
        (nav, session)
    }

    fn enter(nav: &mut Navigator, session: &mut Session) -> Vec<Command> {
        nav.dispatch(session, &Message::Key(TuiEvent::Enter))
    }

    #[test]
    fn test_advance_and_back() {
        let (mut nav, mut session) = navigator();
        assert_eq!(nav.current_id(), "one");

        enter(&mut nav, &mut session);
        enter(&mut nav, &mut session);
        assert_eq!(nav.current_id(), "three");
        assert_eq!(nav.depth(), 2);

        nav.back(&mut session);
        assert_eq!(nav.current_id(), "two");
        assert_eq!(nav.depth(), 1);
    }

    #[test]
    fn test_back_reruns_init() {
        let mut nav = Navigator::new();
        let inits = Rc::new(Cell::new(0));
        nav.register(Box::new(StubPage {
            id: "first".to_string(),
            on_enter: advance,
            inits: Rc::clone(&inits),
        }));
        nav.register(StubPage::boxed("second", nothing));
        let mut session = Session::new();
        nav.start(&mut session);
        assert_eq!(inits.get(), 1);

        enter(&mut nav, &mut session);
        nav.back(&mut session);
        assert_eq!(nav.current_id(), "first");
        assert_eq!(inits.get(), 2);
    }

    #[test]
    fn test_back_on_empty_stack_is_noop() {
        let (mut nav, mut session) = navigator();
        assert!(nav.back(&mut session).is_empty());
        assert_eq!(nav.current_id(), "one");
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_depth_counts_forward_minus_back() {
        let (mut nav, mut session) = navigator();
        let mut forwards = 0usize;
        let mut backs = 0usize;
        // Pattern of Enter (true) and Escape (false) presses
        for press_enter in [true, true, true, false, true, false, false, false, false, true] {
            if press_enter {
                enter(&mut nav, &mut session);
                forwards += 1;
            } else if nav.depth() > 0 {
                nav.back(&mut session);
                backs += 1;
            } else {
                nav.back(&mut session);
            }
            assert_eq!(nav.depth(), forwards - backs);
        }
    }

    #[test]
    fn test_goto_unknown_page_stays_put() {
        let mut nav = Navigator::new();
        nav.register(StubPage::boxed("only", || vec![Command::goto("missing")]));
        let mut session = Session::new();
        nav.start(&mut session);

        enter(&mut nav, &mut session);
        assert_eq!(nav.current_id(), "only");
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_advance_on_last_page_is_noop() {
        let mut nav = Navigator::new();
        nav.register(StubPage::boxed("last", advance));
        let mut session = Session::new();
        nav.start(&mut session);
        enter(&mut nav, &mut session);
        assert_eq!(nav.current_id(), "last");
        assert_eq!(nav.depth(), 0);
    }

    #[test]
    fn test_register_is_idempotent() {
        let mut nav = Navigator::new();
        assert!(nav.register(StubPage::boxed("a", nothing)));
        assert!(!nav.register(StubPage::boxed("a", advance)));
        assert!(nav.register(StubPage::boxed("b", nothing)));
        assert_eq!(nav.page_ids(), ["a", "b"]);
    }

    #[test]
    fn test_unhandled_commands_are_returned() {
        let mut nav = Navigator::new();
        nav.register(StubPage::boxed("timer", || {
            vec![
                Command::Schedule {
                    message: Message::CheckInstaller,
                    after: Duration::from_millis(100),
                },
                Command::Quit,
            ]
        }));
        let mut session = Session::new();
        nav.start(&mut session);

        let leftover = enter(&mut nav, &mut session);
        assert_eq!(leftover.len(), 2);
        assert!(matches!(leftover[0], Command::Schedule { .. }));
        assert!(matches!(leftover[1], Command::Quit));
    }

    #[test]
    fn test_register_then_goto_in_one_batch() {
        let mut nav = Navigator::new();
        nav.register(StubPage::boxed("menu", || {
            vec![
                Command::Register(StubPage::boxed("prompt:hostname", nothing)),
                Command::goto("prompt:hostname"),
            ]
        }));
        let mut session = Session::new();
        nav.start(&mut session);

        enter(&mut nav, &mut session);
        assert_eq!(nav.current_id(), "prompt:hostname");
        assert_eq!(nav.depth(), 1);
    }
}
