//! Comment markers
//!
//! A managed comment ends with one machine-readable line:
//!
//! ```text
//! Package looks good.
//!
//! <!-- check-source result=accepted state=done -->
//! ```
//!
//! The bot identity comes first, followed by `key=value` pairs sorted by key.
//! The characters `%`, space, tab, CR, LF, `=` and `>` are percent-encoded in
//! the identity, keys and values so arbitrary strings survive a round trip.
//!
//! # Examples
//!
//! ```
//! use reviewbot::core::services::marker::{self, MarkerInfo};
//!
//! let info = MarkerInfo::new("done", Some("accepted"));
//! let body = marker::encode("Looks good.\n", "check-source", &info);
//! let decoded = marker::decode(&body).unwrap();
//! assert_eq!(decoded.bot, "check-source");
//! assert_eq!(decoded.info, info);
//! assert_eq!(marker::strip(&body), "Looks good.");
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Longest comment body the platforms accept
pub const MAX_COMMENT_LENGTH: usize = 65535;

const TRUNCATION_SUFFIX: &str = "...";

const STATE_KEY: &str = "state";
const RESULT_KEY: &str = "result";

static MARKER_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<!-- ([^ ]+)((?: [^ ]+)*) -->$").expect("marker pattern is valid"));

/// Key/value content of a marker
///
/// `state` and `result` are ordinary keys; the remaining keys are extra
/// information supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MarkerInfo(BTreeMap<String, String>);

impl MarkerInfo {
    /// Info with a state and an optional result
    #[must_use]
    pub fn new(state: &str, result: Option<&str>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(STATE_KEY.to_string(), state.to_string());
        if let Some(result) = result {
            map.insert(RESULT_KEY.to_string(), result.to_string());
        }
        Self(map)
    }

    /// Set one key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Merge extra keys, overwriting existing ones
    pub fn extend(&mut self, extra: &BTreeMap<String, String>) {
        self.0.extend(extra.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Value of a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// The `state` value
    #[must_use]
    pub fn state(&self) -> Option<&str> {
        self.get(STATE_KEY)
    }

    /// The `result` value
    #[must_use]
    pub fn result(&self) -> Option<&str> {
        self.get(RESULT_KEY)
    }

    /// Whether a stored marker counts as the same kind of comment
    ///
    /// `state` and `result` must agree exactly (absent equals absent); every
    /// other key of `self` must be present in `stored` with the same value.
    #[must_use]
    pub fn matches(&self, stored: &Self) -> bool {
        self.state() == stored.state()
            && self.result() == stored.result()
            && self
                .0
                .iter()
                .filter(|(k, _)| k.as_str() != STATE_KEY && k.as_str() != RESULT_KEY)
                .all(|(k, v)| stored.get(k) == Some(v.as_str()))
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }
}

impl From<BTreeMap<String, String>> for MarkerInfo {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

/// A decoded marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    /// Identity of the bot that wrote the comment
    pub bot: String,
    /// Marker content
    pub info: MarkerInfo,
}

/// Render the marker line for `bot` and `info`
#[must_use]
pub fn marker_line(bot: &str, info: &MarkerInfo) -> String {
    let mut line = format!("<!-- {}", escape(bot));
    for (key, value) in info.iter() {
        line.push(' ');
        line.push_str(&escape(key));
        line.push('=');
        line.push_str(&escape(value));
    }
    line.push_str(" -->");
    line
}

/// Append a marker line to `message`
///
/// The message is trimmed and separated from the marker by a blank line.
#[must_use]
pub fn encode(message: &str, bot: &str, info: &MarkerInfo) -> String {
    let message = message.trim();
    let line = marker_line(bot, info);
    if message.is_empty() {
        line
    } else {
        format!("{message}\n\n{line}")
    }
}

/// Extract the marker from a comment body
///
/// Returns `None` when the last non-empty line is not a well-formed marker.
/// That is the normal case for comments written by people.
#[must_use]
pub fn decode(body: &str) -> Option<Marker> {
    let (_, line) = split_last_line(body);
    parse_line(line)
}

/// Extract the marker only if it belongs to `bot`
#[must_use]
pub fn decode_for(body: &str, bot: &str) -> Option<Marker> {
    decode(body).filter(|m| m.bot == bot)
}

/// Remove a trailing marker line and trim the remainder
#[must_use]
pub fn strip(body: &str) -> &str {
    let (rest, line) = split_last_line(body);
    if parse_line(line).is_some() {
        rest.trim()
    } else {
        body.trim()
    }
}

/// Shorten a marked body to at most `max` characters
///
/// Only the message part is cut (ending in `...`); the marker line always
/// survives intact.
#[must_use]
pub fn truncate(body: &str, max: usize) -> String {
    if body.chars().count() <= max {
        return body.to_string();
    }

    let (rest, line) = split_last_line(body);
    let (message, marker) = if parse_line(line).is_some() {
        (rest.trim_end(), Some(line))
    } else {
        (body, None)
    };

    let reserved = marker.map_or(0, |m| m.chars().count() + 2) + TRUNCATION_SUFFIX.len();
    let keep = max.saturating_sub(reserved);
    let mut out: String = message.chars().take(keep).collect();
    out.push_str(TRUNCATION_SUFFIX);
    if let Some(marker) = marker {
        out.push_str("\n\n");
        out.push_str(marker);
    }
    out
}

fn split_last_line(body: &str) -> (&str, &str) {
    let trimmed = body.trim_end();
    match trimmed.rfind('\n') {
        Some(idx) => (&trimmed[..idx], trimmed[idx + 1..].trim_end_matches('\r')),
        None => ("", trimmed),
    }
}

fn parse_line(line: &str) -> Option<Marker> {
    let caps = MARKER_LINE.captures(line)?;
    let bot = unescape(caps.get(1)?.as_str())?;

    let mut info = BTreeMap::new();
    if let Some(pairs) = caps.get(2) {
        for token in pairs.as_str().split(' ').filter(|t| !t.is_empty()) {
            let (key, value) = token.split_once('=')?;
            info.insert(unescape(key)?, unescape(value)?);
        }
    }

    Some(Marker {
        bot,
        info: MarkerInfo(info),
    })
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' | ' ' | '\t' | '\r' | '\n' | '=' | '>' => out.push_str(&format!("%{:02X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

fn unescape(escaped: &str) -> Option<String> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if hex.len() != 2 {
                return None;
            }
            let byte = u8::from_str_radix(&hex, 16).ok()?;
            if !byte.is_ascii() {
                return None;
            }
            out.push(char::from(byte));
        } else {
            out.push(c);
        }
    }
    Some(out)
}
