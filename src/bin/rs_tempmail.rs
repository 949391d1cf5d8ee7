use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::sync::Arc;

use rs_tempmail::config::{Config, load_config, resolve_db_path, resolve_log_path};
use rs_tempmail::console::{ConsoleRenderer, print_card};
use rs_tempmail::domain::email::{MessageCard, count_label};
use rs_tempmail::mail::api_client::{HttpMailApi, MailApi};
use rs_tempmail::notifier::Notifier;
use rs_tempmail::session::render::Renderer;
use rs_tempmail::session::{Session, SessionConfig, SessionEvent, SystemClock};
use rs_tempmail::store::sqlite::SqliteStore;
use rs_tempmail::store::state::StateStore;
use rs_tempmail::terminal::run_tui;
use rs_tempmail::terminal::state::InboxView;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Parser)]
#[command(name = "rs_tempmail")]
#[command(about = "Disposable email address client (TUI + headless)", long_about = None)]
struct Cli {
    /// Base URL of the temp-mail API (overrides config and RS_TEMPMAIL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the interactive client (default)
    Tui,

    /// Print the current address, generating one if none is saved or it expired
    Address,

    /// Print the inbox of the current address once
    Inbox,

    /// Poll and rotate without a UI, printing new mail until Ctrl-C
    Watch,

    /// Delete the saved address so the next run starts with a new one
    Forget,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.cmd.unwrap_or(Command::Tui);

    let cfg = load_config()
        .map_err(|e| anyhow!("Configuration error: {e}"))?
        .with_overrides(cli.api_url.as_deref());

    match cmd {
        Command::Tui => {
            init_file_logging(&cfg)?;
            let notifier = cfg.notify_new_mail().then(Notifier::new);
            let (session, rx) = build_session(&cfg, InboxView::new(notifier))?;
            run_tui(session, rx).await
        }

        Command::Address => {
            env_logger::init();
            let (mut session, mut rx) = build_session(&cfg, ConsoleRenderer::quiet())?;
            let address = establish_address(&mut session, &mut rx).await?;
            session.shutdown();
            println!("{address}");
            Ok(())
        }

        Command::Inbox => {
            env_logger::init();
            let (mut session, mut rx) = build_session(&cfg, ConsoleRenderer::quiet())?;
            let address = establish_address(&mut session, &mut rx).await?;
            session.shutdown();

            let api = HttpMailApi::new(cfg.api_url()?)?;
            let messages = api.list_messages(&address.to_lowercase()).await?;
            println!("{address}  [{}]", count_label(messages.len()));
            println!("{}", "=".repeat(60));
            for m in &messages {
                print_card(&MessageCard::from_message(m));
            }
            Ok(())
        }

        Command::Watch => {
            env_logger::init();
            let (mut session, mut rx) = build_session(&cfg, ConsoleRenderer::verbose())?;
            if !session.restore() {
                session.generate();
            }
            let ctrl_c = tokio::signal::ctrl_c();
            tokio::pin!(ctrl_c);
            loop {
                tokio::select! {
                    Some(ev) = rx.recv() => session.handle(ev),
                    _ = &mut ctrl_c => break,
                }
            }
            session.shutdown();
            Ok(())
        }

        Command::Forget => {
            env_logger::init();
            let db_path = resolve_db_path(&cfg)?;
            StateStore::new(Box::new(SqliteStore::open(&db_path)?)).clear()?;
            println!("Saved address removed from {}", db_path.display());
            Ok(())
        }
    }
}

fn build_session<R: Renderer>(
    cfg: &Config,
    renderer: R,
) -> Result<(Session<R>, UnboundedReceiver<SessionEvent>)> {
    let api = HttpMailApi::new(cfg.api_url()?)?;
    let db_path = resolve_db_path(cfg)?;
    let store = StateStore::new(Box::new(SqliteStore::open(&db_path)?));
    Ok(Session::new(
        Arc::new(api),
        store,
        renderer,
        Box::new(SystemClock),
        SessionConfig::from(cfg),
    ))
}

/// Restores the saved address or waits for a freshly generated one.
async fn establish_address<R: Renderer>(
    session: &mut Session<R>,
    rx: &mut UnboundedReceiver<SessionEvent>,
) -> Result<String> {
    if !session.restore() {
        session.generate();
        while session.is_generating() {
            match rx.recv().await {
                Some(ev) => session.handle(ev),
                None => break,
            }
        }
    }
    session
        .current_address()
        .map(str::to_owned)
        .ok_or_else(|| anyhow!("could not obtain an address from the temp-mail API"))
}

// The TUI owns the terminal, so logs go to a file instead of stderr.
fn init_file_logging(cfg: &Config) -> Result<()> {
    let path = resolve_log_path(cfg)?;
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}
