use crossterm::event::KeyEvent;
use ratatui::widgets::ListState;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::clipboard::Clipboard;
use crate::domain::email::{MessageCard, count_label};
use crate::notifier::Notifier;
use crate::session::render::{AddressStatus, InboxContent, Renderer};
use crate::session::timer::Timer;

pub const COPY_LABEL: &str = "Copy";
pub const COPIED_LABEL: &str = "Copied!";
pub const COPY_FAILED_LABEL: &str = "Copy failed";
pub const LABEL_RESET_DELAY: Duration = Duration::from_millis(2000);

/// Input for the UI loop that does not come from the session.
#[derive(Debug)]
pub enum UiEvent {
    Key(KeyEvent),
    Redraw,
    CopyLabelReset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    List,
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    ListOnly,
    Split,
}

/// The copy button: shows the outcome of the last copy for a moment.
#[derive(Debug)]
pub struct CopyButton {
    label: &'static str,
    reset: Timer,
}

impl CopyButton {
    pub fn new() -> Self {
        Self {
            label: COPY_LABEL,
            reset: Timer::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Copies `address` and schedules the label to revert.
    pub fn press(
        &mut self,
        address: Option<&str>,
        clipboard: &mut dyn Clipboard,
        tx: &UnboundedSender<UiEvent>,
    ) {
        let Some(address) = address else {
            log::info!("no address to copy");
            return;
        };
        self.label = match clipboard.copy(address) {
            Ok(()) => COPIED_LABEL,
            Err(e) => {
                log::error!("failed to copy: {e}");
                COPY_FAILED_LABEL
            }
        };
        self.reset
            .arm_once(LABEL_RESET_DELAY, tx.clone(), UiEvent::CopyLabelReset);
    }

    pub fn reset(&mut self) {
        self.label = COPY_LABEL;
    }
}

impl Default for CopyButton {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the TUI draws. Fed by the session through [`Renderer`].
pub struct InboxView {
    pub address_line: String,
    pub address_ready: bool,
    pub counter: String,
    pub inbox: InboxContent,
    pub list_state: ListState,
    pub body_scroll: u16,
    pub focus: Focus,
    pub mode: ViewMode,
    pub refreshing: bool,
    pub copy_button: CopyButton,
    notifier: Option<Notifier>,
}

impl InboxView {
    pub fn new(notifier: Option<Notifier>) -> Self {
        Self {
            address_line: String::new(),
            address_ready: false,
            counter: count_label(0),
            inbox: InboxContent::default(),
            list_state: ListState::default(),
            body_scroll: 0,
            focus: Focus::List,
            mode: ViewMode::ListOnly,
            refreshing: false,
            copy_button: CopyButton::new(),
            notifier,
        }
    }

    pub fn cards(&self) -> &[MessageCard] {
        match &self.inbox {
            InboxContent::Messages(cards) => cards,
            InboxContent::Notice(_) => &[],
        }
    }

    pub fn selected_card(&self) -> Option<&MessageCard> {
        let idx = self.list_state.selected()?;
        self.cards().get(idx)
    }

    pub fn move_selection(&mut self, delta: i32) {
        let len = self.cards().len();
        if len == 0 {
            self.list_state.select(None);
            return;
        }
        let cur = self.list_state.selected().unwrap_or(0) as i32;
        let next = (cur + delta).clamp(0, len as i32 - 1) as usize;
        self.list_state.select(Some(next));
    }

    pub fn select_first(&mut self) {
        if !self.cards().is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        let len = self.cards().len();
        if len > 0 {
            self.list_state.select(Some(len - 1));
        }
    }

    pub fn open_selected(&mut self) {
        if self.selected_card().is_none() {
            return;
        }
        self.mode = ViewMode::Split;
        self.focus = Focus::Body;
        self.body_scroll = 0;
    }

    pub fn close_message(&mut self) {
        self.mode = ViewMode::ListOnly;
        self.focus = Focus::List;
        self.body_scroll = 0;
    }

    pub fn toggle_focus(&mut self) {
        if self.mode != ViewMode::Split {
            return;
        }
        self.focus = match self.focus {
            Focus::List => Focus::Body,
            Focus::Body => Focus::List,
        };
    }

    pub fn scroll_body(&mut self, delta: i32) {
        if self.mode != ViewMode::Split {
            return;
        }
        if delta < 0 {
            self.body_scroll = self.body_scroll.saturating_sub(delta.unsigned_abs() as u16);
        } else {
            self.body_scroll = self.body_scroll.saturating_add(delta as u16);
        }
    }
}

impl Renderer for InboxView {
    fn render_address(&mut self, status: AddressStatus<'_>) {
        self.address_ready = matches!(status, AddressStatus::Ready(_));
        self.address_line = status.text().to_string();
    }

    fn render_count(&mut self, count: usize) {
        self.counter = count_label(count);
    }

    fn render_inbox(&mut self, content: InboxContent) {
        self.refreshing = false;
        self.inbox = content;

        let len = self.cards().len();
        match self.list_state.selected() {
            _ if len == 0 => {
                self.list_state.select(None);
                self.close_message();
            }
            Some(idx) if idx >= len => self.list_state.select(Some(len - 1)),
            None => self.list_state.select(Some(0)),
            Some(_) => {}
        }
    }

    fn announce_new(&mut self, fresh: &[MessageCard]) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        for card in fresh.iter().take(3) {
            if let Err(e) = notifier.notify_message(card) {
                log::warn!("notification error: {e}");
            }
        }
    }
}
