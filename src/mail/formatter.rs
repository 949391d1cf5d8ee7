//! Cleanup of raw message bodies into display text.
//!
//! Bodies arrive as whatever the server stored: sometimes a MIME multipart blob,
//! sometimes plain text with a few headers left at the top. [`format_body`] picks
//! the most readable part it can find and never fails; on any parse problem the
//! raw body is handed back unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static regex")
}

static BOUNDARY: Lazy<Regex> = Lazy::new(|| re(r"--[a-zA-Z0-9]+"));
static HTML_PART: Lazy<Regex> = Lazy::new(|| re(r"(?i)content-type:\s*text/html"));
static TEXT_PART: Lazy<Regex> = Lazy::new(|| re(r"(?i)content-type:\s*text/plain"));
static BLANK_LINE: Lazy<Regex> = Lazy::new(|| re(r"\r?\n\r?\n"));
static LINE_BREAK_TAG: Lazy<Regex> = Lazy::new(|| re(r"(?i)<br\s*/?>"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| re(r"<[^>]+>"));
static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| re(r"\n{3,}"));
static LEADING_HEADER: Lazy<Regex> = Lazy::new(|| re(r"(?m)^(?:From|To|Subject|Body):[^\n]*\n"));
static CONTENT_HEADER: Lazy<Regex> = Lazy::new(|| re(r"(?mi)^content-[a-z-]*:[^\n]*\n"));

#[derive(Debug)]
enum FormatError {
    MissingSeparator,
}

/// Turns a raw body into display text. Total: never panics, never errors.
pub fn format_body(body: &str) -> String {
    if body.is_empty() {
        return String::new();
    }
    match try_format(body) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("Failed to parse email body ({e:?}); showing it raw");
            body.to_string()
        }
    }
}

fn try_format(body: &str) -> Result<String, FormatError> {
    let parts: Vec<&str> = BOUNDARY.split(body).collect();

    if let Some(part) = parts.iter().find(|p| HTML_PART.is_match(p)) {
        return Ok(html_to_text(part_content(part)?));
    }

    if let Some(part) = parts.iter().find(|p| TEXT_PART.is_match(p)) {
        return Ok(tidy(part_content(part)?));
    }

    let stripped = LEADING_HEADER.replace_all(body, "");
    let stripped = CONTENT_HEADER.replace_all(&stripped, "");
    let cleaned = tidy(&stripped);
    if cleaned.is_empty() {
        Ok(body.to_string())
    } else {
        Ok(cleaned)
    }
}

/// Everything after the first blank line of a part.
fn part_content(part: &str) -> Result<&str, FormatError> {
    BLANK_LINE
        .find(part)
        .map(|m| &part[m.end()..])
        .ok_or(FormatError::MissingSeparator)
}

fn html_to_text(html: &str) -> String {
    let text = normalize_newlines(html);
    let text = LINE_BREAK_TAG.replace_all(&text, "\n");
    let text = ANY_TAG.replace_all(&text, "");
    let text = decode_entities(&text);
    EXCESS_NEWLINES.replace_all(&text, "\n\n").trim().to_string()
}

fn tidy(text: &str) -> String {
    let text = normalize_newlines(text);
    EXCESS_NEWLINES.replace_all(&text, "\n\n").trim().to_string()
}

fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n")
}

fn decode_entities(text: &str) -> String {
    // &amp; last so "&amp;lt;" stays "&lt;"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
