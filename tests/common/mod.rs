//! Shared fakes for the session tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use rs_tempmail::domain::email::{Message, MessageCard, count_label};
use rs_tempmail::error::ClientError;
use rs_tempmail::mail::api_client::MailApi;
use rs_tempmail::session::render::{AddressStatus, InboxContent, Renderer};
use rs_tempmail::session::{Clock, Session, SessionConfig, SessionEvent};
use rs_tempmail::store::memory::MemoryStore;
use rs_tempmail::store::state::StateStore;
use tokio::sync::mpsc::UnboundedReceiver;

pub const NOW: i64 = 1_760_436_000_000;

/// In-memory stand-in for the remote API.
#[derive(Default)]
pub struct FakeApi {
    addresses: Mutex<VecDeque<Result<String, ClientError>>>,
    inboxes: Mutex<HashMap<String, Vec<Message>>>,
    fail_fetch: AtomicBool,
    lookups: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn queue_address(&self, address: &str) {
        self.addresses
            .lock()
            .unwrap()
            .push_back(Ok(address.to_string()));
    }

    pub fn queue_generation_failure(&self) {
        self.addresses
            .lock()
            .unwrap()
            .push_back(Err(ClientError::Generation("503".into())));
    }

    pub fn set_inbox(&self, address: &str, messages: Vec<Message>) {
        self.inboxes
            .lock()
            .unwrap()
            .insert(address.to_string(), messages);
    }

    pub fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailApi for FakeApi {
    async fn issue_address(&self) -> Result<String, ClientError> {
        self.addresses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ClientError::Generation("no address queued".into())))
    }

    async fn list_messages(&self, address: &str) -> Result<Vec<Message>, ClientError> {
        self.lookups.lock().unwrap().push(address.to_string());
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(ClientError::Fetch("connection refused".into()));
        }
        Ok(self
            .inboxes
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .unwrap_or_default())
    }
}

#[derive(Clone)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn at(now_ms: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now_ms)))
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Keeps the last thing each render call produced.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub address: Option<String>,
    pub counter: Option<String>,
    pub inbox: Option<InboxContent>,
    pub announced: Vec<MessageCard>,
}

impl RecordingRenderer {
    pub fn notice(&self) -> Option<&'static str> {
        match self.inbox {
            Some(InboxContent::Notice(text)) => Some(text),
            _ => None,
        }
    }

    pub fn cards(&self) -> &[MessageCard] {
        match &self.inbox {
            Some(InboxContent::Messages(cards)) => cards,
            _ => &[],
        }
    }
}

impl Renderer for RecordingRenderer {
    fn render_address(&mut self, status: AddressStatus<'_>) {
        self.address = Some(status.text().to_string());
    }

    fn render_count(&mut self, count: usize) {
        self.counter = Some(count_label(count));
    }

    fn render_inbox(&mut self, content: InboxContent) {
        self.inbox = Some(content);
    }

    fn announce_new(&mut self, fresh: &[MessageCard]) {
        self.announced.extend_from_slice(fresh);
    }
}

pub struct Harness {
    pub session: Session<RecordingRenderer>,
    pub rx: UnboundedReceiver<SessionEvent>,
    pub api: Arc<FakeApi>,
    pub kv: MemoryStore,
}

impl Harness {
    pub fn new(now_ms: i64) -> Self {
        Self::with_config(now_ms, SessionConfig::default())
    }

    pub fn with_config(now_ms: i64, config: SessionConfig) -> Self {
        let api = FakeApi::new();
        let kv = MemoryStore::new();
        let (session, rx) = Session::new(
            api.clone(),
            StateStore::new(Box::new(kv.clone())),
            RecordingRenderer::default(),
            Box::new(ManualClock::at(now_ms)),
            config,
        );
        Self {
            session,
            rx,
            api,
            kv,
        }
    }

    pub fn state(&self) -> StateStore {
        StateStore::new(Box::new(self.kv.clone()))
    }

    pub fn view(&self) -> &RecordingRenderer {
        self.session.renderer()
    }

    /// Receives the next event and applies it, returning what it was.
    pub async fn step(&mut self) -> SessionEventKind {
        let ev = self.rx.recv().await.expect("session channel closed");
        let kind = SessionEventKind::of(&ev);
        self.session.handle(ev);
        kind
    }

    /// Applies events until one of `kind` has been handled.
    pub async fn run_until(&mut self, kind: SessionEventKind) {
        while self.step().await != kind {}
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEventKind {
    PollTick,
    RotationDue,
    Generated,
    Fetched,
}

impl SessionEventKind {
    pub fn of(ev: &SessionEvent) -> Self {
        match ev {
            SessionEvent::PollTick { .. } => Self::PollTick,
            SessionEvent::RotationDue { .. } => Self::RotationDue,
            SessionEvent::Generated(_) => Self::Generated,
            SessionEvent::Fetched { .. } => Self::Fetched,
        }
    }
}

pub fn message(from: &str, subject: &str) -> Message {
    Message {
        from: from.to_string(),
        subject: Some(subject.to_string()),
        date: "2025-10-14T10:00:00Z".to_string(),
        body: format!("Body of {subject}"),
    }
}
