//! Filename parsing: symbol extraction and title normalization.

use std::borrow::Cow;
use std::path::Path;

use ::regex::{Regex, escape as regex_escape};
use tracing::instrument;

use crate::consts;
use crate::error::{ErrorKind, Result};
use crate::models::{Document, Symbol};

/// Derives a [`Document`] from a filename.
///
/// Any leading directories are ignored. The final extension is stripped
/// before parsing unless it is purely numeric (`Report 4.11.1.3` has no
/// extension, its last component belongs to the symbol).
///
/// Returns [`ErrorKind::NotADocument`] when the filename carries no symbol, or
/// when a symbol component does not fit into a `u32`. Callers are expected to
/// treat that as "skip this file" rather than as a failure.
///
/// # Examples
///
/// ```
/// use docwatch_document::identify;
///
/// let document = identify("nr 4.11.1.3 Quarterly Report.pdf").unwrap();
/// assert_eq!(document.title(), "quarterly report");
/// assert_eq!(document.symbol().to_string(), "4.11.1.3");
///
/// assert!(identify("meeting notes.pdf").is_err());
/// ```
#[instrument(level = "trace", skip_all, fields(filename = %filename.as_ref().display()))]
pub fn identify(filename: impl AsRef<Path>) -> Result<Document> {
    let path = filename.as_ref();
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_else(|| path.to_string_lossy());
    let stem = self::stem(&name);
    let Some(raw) = self::find_symbol(stem) else {
        exn::bail!(ErrorKind::NotADocument(name.to_string()));
    };
    // An absurdly long component still means "no usable symbol here".
    let Ok(symbol) = raw.parse::<Symbol>() else {
        exn::bail!(ErrorKind::NotADocument(name.to_string()));
    };
    Ok(Document::new(self::normalize_title(stem, raw), symbol))
}

/// Strips the final extension from a filename, unless that extension is
/// numeric and therefore most likely the tail of a symbol.
pub(crate) fn stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => filename,
        Some(dot) => {
            let extension = &filename[dot + 1..];
            if !extension.is_empty() && extension.bytes().all(|b| b.is_ascii_digit()) {
                filename
            } else {
                &filename[..dot]
            }
        },
    }
}

/// Finds the first `a.b.c.d` symbol that is not preceded by another digit.
pub(crate) fn find_symbol(stem: &str) -> Option<&str> {
    consts::SYMBOL_REGEX.captures(stem).and_then(|captures| captures.get(1)).map(|m| m.as_str())
}

/// Normalizes a document title so that filenames naming the same logical
/// document compare equal:
///
/// - removes the symbol together with an optional `nr `, `v` or `v ` prefix,
/// - turns punctuation into spaces,
/// - drops purely numeric tokens,
/// - lower-cases and joins the remaining tokens with single spaces.
pub(crate) fn normalize_title(stem: &str, symbol: &str) -> String {
    let pattern = format!(r"(?i)\b{}{}\b", consts::SYMBOL_PREFIX, regex_escape(symbol));
    let without_symbol = match Regex::new(&pattern) {
        Ok(re) => re.replace_all(stem, " "),
        Err(_) => Cow::Owned(stem.replace(symbol, " ")),
    };
    let spaced = consts::NON_WORD_REGEX.replace_all(&without_symbol, " ");
    spaced
        .split_whitespace()
        .filter(|token| !token.chars().all(char::is_numeric))
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
