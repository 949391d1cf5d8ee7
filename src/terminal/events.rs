use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc::UnboundedSender;

use crate::clipboard::Clipboard;
use crate::session::Session;
use crate::terminal::state::{Focus, InboxView, UiEvent, ViewMode};

/// Returns `true` when the user asked to quit.
pub fn handle_key(
    key: KeyEvent,
    session: &mut Session<InboxView>,
    clipboard: &mut dyn Clipboard,
    ui_tx: &UnboundedSender<UiEvent>,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match key.code {
        KeyCode::Char('q') => return true,

        KeyCode::Esc => {
            let view = session.renderer_mut();
            if view.mode == ViewMode::Split {
                view.close_message();
                return false;
            }
            return true;
        }

        KeyCode::Char('g') => {
            session.generate();
            return false;
        }

        KeyCode::Char('c') => {
            let address = session.current_address().map(str::to_owned);
            session
                .renderer_mut()
                .copy_button
                .press(address.as_deref(), clipboard, ui_tx);
            return false;
        }

        KeyCode::Char('r') => {
            if session.current_address().is_some() {
                session.renderer_mut().refreshing = true;
                session.fetch_once();
            }
            return false;
        }

        KeyCode::Enter => {
            session.renderer_mut().open_selected();
            return false;
        }

        KeyCode::Tab => {
            session.renderer_mut().toggle_focus();
            return false;
        }

        _ => {}
    }

    let view = session.renderer_mut();
    match view.focus {
        Focus::List => handle_list_keys(key, view),
        Focus::Body => handle_body_keys(key, view),
    }
    false
}

fn handle_list_keys(key: KeyEvent, view: &mut InboxView) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            view.move_selection(1);
            view.body_scroll = 0;
        }
        KeyCode::Up | KeyCode::Char('k') => {
            view.move_selection(-1);
            view.body_scroll = 0;
        }
        KeyCode::Home => view.select_first(),
        KeyCode::End => view.select_last(),
        _ => {}
    }
}

fn handle_body_keys(key: KeyEvent, view: &mut InboxView) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => view.scroll_body(1),
        KeyCode::Up | KeyCode::Char('k') => view.scroll_body(-1),
        KeyCode::PageDown => view.scroll_body(10),
        KeyCode::PageUp => view.scroll_body(-10),
        KeyCode::Home => view.body_scroll = 0,
        _ => {}
    }
}
