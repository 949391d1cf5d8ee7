use crate::domain::email::{MessageCard, count_label};
use crate::session::render::{AddressStatus, EMPTY_INBOX_TEXT, InboxContent, Renderer};

/// Prints session output as plain lines for the headless commands.
#[derive(Debug, Default)]
pub struct ConsoleRenderer {
    verbose: bool,
    // Cards of the current address already printed
    printed: usize,
}

impl ConsoleRenderer {
    /// Prints nothing; the caller reads state off the session instead.
    pub fn quiet() -> Self {
        Self::default()
    }

    pub fn verbose() -> Self {
        Self {
            verbose: true,
            printed: 0,
        }
    }
}

pub fn print_card(card: &MessageCard) {
    println!("From:    {}", card.from);
    println!("Date:    {}", card.date);
    println!("Subject: {}", card.subject);
    println!();
    println!("{}", card.body);
    println!("{}", "-".repeat(60));
}

impl Renderer for ConsoleRenderer {
    fn render_address(&mut self, status: AddressStatus<'_>) {
        if let AddressStatus::Ready(_) = status {
            self.printed = 0;
        }
        if !self.verbose {
            return;
        }
        match status {
            AddressStatus::Ready(address) => println!("Address: {address}"),
            other => println!("{}", other.text()),
        }
    }

    fn render_count(&mut self, count: usize) {
        if self.verbose {
            println!("[{}]", count_label(count));
        }
    }

    fn render_inbox(&mut self, content: InboxContent) {
        match content {
            InboxContent::Notice(text) => {
                if text == EMPTY_INBOX_TEXT {
                    self.printed = 0;
                }
                if self.verbose {
                    println!("{text}");
                }
            }
            InboxContent::Messages(cards) => {
                let fresh = self.unprinted(&cards);
                if self.verbose {
                    // Oldest of the unseen first
                    for card in fresh.iter().rev() {
                        print_card(card);
                    }
                }
            }
        }
    }
}

impl ConsoleRenderer {
    /// The newest cards not yet printed for this address; marks them printed.
    fn unprinted<'a>(&mut self, cards: &'a [MessageCard]) -> &'a [MessageCard] {
        let fresh = cards.len().saturating_sub(self.printed);
        self.printed = cards.len();
        &cards[..fresh]
    }
}
