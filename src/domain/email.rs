use chrono::{DateTime, FixedOffset, Local};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::mail::decoders::decode_header_words;
use crate::mail::formatter::format_body;

pub const NO_SUBJECT: &str = "No Subject";

static SENDER_ADDRESS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^<\s]+@[^>\s]+)").expect("static regex"));

/// The saved record of the address in use. `timestamp` is epoch milliseconds at issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailState {
    pub email: String,
    pub timestamp: i64,
}

impl EmailState {
    pub fn new(email: impl Into<String>, timestamp: i64) -> Self {
        Self {
            email: email.into(),
            timestamp,
        }
    }

    /// Milliseconds since issue. Negative if the record is stamped in the future.
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }
}

/// A message as listed by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "From", default)]
    pub from: String,
    #[serde(rename = "Subject", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "Date", default, deserialize_with = "date_as_string")]
    pub date: String,
    #[serde(rename = "Body", default)]
    pub body: String,
}

// Servers send the date either as a string or as epoch millis.
fn date_as_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

impl Message {
    /// First `local@domain` token in the From header, or the header itself.
    pub fn sender_address(&self) -> &str {
        SENDER_ADDRESS
            .captures(&self.from)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(&self.from)
    }

    pub fn display_subject(&self) -> String {
        match self.subject.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => decode_header_words(s),
            _ => NO_SUBJECT.to_string(),
        }
    }

    /// Accepts RFC 3339, RFC 2822 and epoch milliseconds.
    pub fn received_at(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.date.trim();
        if raw.is_empty() {
            return None;
        }
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_rfc2822(raw))
            .ok()
            .or_else(|| {
                raw.parse::<i64>()
                    .ok()
                    .and_then(DateTime::from_timestamp_millis)
                    .map(|dt| dt.fixed_offset())
            })
    }

    pub fn display_date(&self) -> String {
        match self.received_at() {
            Some(dt) => dt.with_timezone(&Local).format("%b %-d, %I:%M %p").to_string(),
            None => self.date.clone(),
        }
    }
}

/// Display-ready fields of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageCard {
    pub from: String,
    pub date: String,
    pub subject: String,
    pub body: String,
}

impl MessageCard {
    pub fn from_message(msg: &Message) -> Self {
        Self {
            from: msg.sender_address().to_string(),
            date: msg.display_date(),
            subject: msg.display_subject(),
            body: format_body(&msg.body),
        }
    }
}

/// `"1 message"`, otherwise `"{n} messages"`.
pub fn count_label(count: usize) -> String {
    format!("{count} message{}", if count == 1 { "" } else { "s" })
}
