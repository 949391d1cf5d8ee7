pub mod events;
pub mod state;
pub mod ui;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};

use crate::clipboard::SystemClipboard;
use crate::session::{Session, SessionEvent};
use crate::terminal::state::{InboxView, UiEvent};

const KEY_POLL: Duration = Duration::from_millis(200);

/// Runs the interactive client until the user quits. Timers are cancelled on the way out.
pub async fn run_tui(
    mut session: Session<InboxView>,
    mut session_rx: UnboundedReceiver<SessionEvent>,
) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut session, &mut session_rx).await;
    session.shutdown();
    ratatui::restore();
    result
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    session: &mut Session<InboxView>,
    session_rx: &mut UnboundedReceiver<SessionEvent>,
) -> Result<()> {
    let (ui_tx, mut ui_rx) = unbounded_channel();
    let running = Arc::new(AtomicBool::new(true));
    let reader = spawn_key_reader(ui_tx.clone(), running.clone());
    let mut clipboard = SystemClipboard::new();

    if !session.restore() {
        session.generate();
    }

    let outcome = loop {
        if let Err(e) = terminal.draw(|f| ui::render(f, session.renderer())) {
            break Err(e.into());
        }

        tokio::select! {
            Some(ev) = session_rx.recv() => session.handle(ev),
            Some(ev) = ui_rx.recv() => match ev {
                UiEvent::Key(key) => {
                    if events::handle_key(key, session, &mut clipboard, &ui_tx) {
                        break Ok(());
                    }
                }
                UiEvent::Redraw => {}
                UiEvent::CopyLabelReset => session.renderer_mut().copy_button.reset(),
            },
            else => break Ok(()),
        }
    };

    running.store(false, Ordering::SeqCst);
    if reader.join().is_err() {
        log::warn!("key reader thread panicked");
    }
    outcome
}

// crossterm reads block, so they live on their own thread and feed the UI channel.
fn spawn_key_reader(
    tx: UnboundedSender<UiEvent>,
    running: Arc<AtomicBool>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        while running.load(Ordering::SeqCst) {
            match event::poll(KEY_POLL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    log::error!("terminal input error: {e}");
                    break;
                }
            }
            match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    if tx.send(UiEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(Event::Resize(..)) => {
                    if tx.send(UiEvent::Redraw).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    log::error!("terminal input error: {e}");
                    break;
                }
            }
        }
    })
}
