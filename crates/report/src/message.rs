use crate::error::{ErrorKind, Result};
use std::fmt::Write;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;

/// An HTML email, ready to hand to a [`Notifier`](crate::Notifier).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub subject: String,
    pub sender: String,
    pub recipients: Vec<String>,
    pub body: String,
}
impl Message {
    pub fn new(
        subject: impl Into<String>,
        sender: impl Into<String>,
        recipients: impl IntoIterator<Item = impl Into<String>>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            sender: sender.into(),
            recipients: recipients.into_iter().map(Into::into).collect(),
            body: body.into(),
        }
    }

    /// Internet Message Format (RFC 5322) rendition: headers, a blank line,
    /// then the HTML body sent as 8-bit UTF-8.
    pub fn to_rfc5322(&self) -> Result<String> {
        for (header, value) in [("From", &self.sender), ("Subject", &self.subject)]
            .into_iter()
            .chain(self.recipients.iter().map(|r| ("To", r)))
        {
            if value.contains(['\r', '\n']) {
                exn::bail!(ErrorKind::InvalidHeader(header));
            }
        }
        let date = OffsetDateTime::now_utc().format(&Rfc2822).ok();
        let mut out = String::with_capacity(self.body.len() + 512);
        // Writing to a String cannot fail.
        let _ = writeln!(out, "From: {}", self.sender);
        let _ = writeln!(out, "To: {}", self.recipients.join(", "));
        let _ = writeln!(out, "Subject: {}", encode_header(&self.subject));
        if let Some(date) = date {
            let _ = writeln!(out, "Date: {date}");
        }
        out.push_str("MIME-Version: 1.0\n");
        out.push_str("Content-Type: text/html; charset=utf-8\n");
        out.push_str("Content-Transfer-Encoding: 8bit\n\n");
        out.push_str(&self.body);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        Ok(out)
    }
}

/// Q-encode (RFC 2047) a header value unless it is plain printable ASCII.
///
/// Encoded words are kept within 75 characters and never split a UTF-8
/// sequence; consecutive words are folded onto continuation lines.
pub(crate) fn encode_header(value: &str) -> String {
    const PREFIX: &str = "=?UTF-8?Q?";
    const SUFFIX: &str = "?=";
    const MAX_WORD: usize = 75;
    if value.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return value.to_string();
    }
    let mut words = Vec::new();
    let mut word = String::new();
    for c in value.chars() {
        let mut token = String::new();
        match c {
            ' ' => token.push('_'),
            c if c.is_ascii_alphanumeric() || "!*+-/".contains(c) => token.push(c),
            c => {
                let mut buf = [0; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    let _ = write!(token, "={byte:02X}");
                }
            },
        }
        if PREFIX.len() + word.len() + token.len() + SUFFIX.len() > MAX_WORD {
            words.push(std::mem::take(&mut word));
        }
        word.push_str(&token);
    }
    if !word.is_empty() {
        words.push(word);
    }
    words.iter().map(|w| format!("{PREFIX}{w}{SUFFIX}")).collect::<Vec<_>>().join("\n ")
}
