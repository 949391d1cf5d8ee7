use crate::domain::email::MessageCard;

pub const EMPTY_INBOX_TEXT: &str = "No messages yet";
pub const FETCH_ERROR_TEXT: &str = "Error fetching emails";
pub const GENERATING_TEXT: &str = "Generating...";
pub const GENERATION_ERROR_TEXT: &str = "Error generating email. Try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressStatus<'a> {
    Generating,
    Ready(&'a str),
    Failed,
}

impl AddressStatus<'_> {
    pub fn text(&self) -> &str {
        match self {
            AddressStatus::Generating => GENERATING_TEXT,
            AddressStatus::Ready(address) => address,
            AddressStatus::Failed => GENERATION_ERROR_TEXT,
        }
    }
}

/// What the message list area shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxContent {
    Messages(Vec<MessageCard>),
    Notice(&'static str),
}

impl Default for InboxContent {
    fn default() -> Self {
        InboxContent::Notice(EMPTY_INBOX_TEXT)
    }
}

/// Where session state ends up on screen.
pub trait Renderer {
    fn render_address(&mut self, status: AddressStatus<'_>);
    fn render_count(&mut self, count: usize);
    fn render_inbox(&mut self, content: InboxContent);

    /// Messages that were not in the previous listing of the same address, newest first.
    fn announce_new(&mut self, _fresh: &[MessageCard]) {}
}
