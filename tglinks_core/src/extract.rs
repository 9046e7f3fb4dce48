//! Candidate extraction from free-form message text.
//!
//! Five surface syntaxes are recognized, all sharing the Telegram username
//! grammar: a letter, 3-30 word characters, then a letter or digit.

use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use std::sync::OnceLock;

/// Username grammar shared by every syntax (5-32 characters in total).
const IDENTIFIER: &str = r"[a-zA-Z]\w{3,30}[a-zA-Z\d]";

/// Surface syntaxes a reference can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkSyntax {
    /// `@name`
    Mention,
    /// `t.me/name`
    TMe,
    /// `telegram.me/name`
    TelegramMe,
    /// `https://t.me/name`
    HttpsTMe,
    /// `https://telegram.me/name`
    HttpsTelegramMe,
}

struct CompiledSyntax {
    syntax: LinkSyntax,
    search: Regex,
    exact: Regex,
}

static COMPILED: OnceLock<Vec<CompiledSyntax>> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex patterns validated at compile time"
)]
fn compiled() -> &'static [CompiledSyntax] {
    COMPILED.get_or_init(|| {
        LinkSyntax::ALL
            .iter()
            .map(|&syntax| {
                let prefix = syntax.prefix_pattern();
                CompiledSyntax {
                    syntax,
                    search: Regex::new(&format!("{prefix}({IDENTIFIER})"))
                        .expect("Static regex pattern is guaranteed to be valid"),
                    exact: Regex::new(&format!("^{prefix}({IDENTIFIER})$"))
                        .expect("Static regex pattern is guaranteed to be valid"),
                }
            })
            .collect()
    })
}

impl LinkSyntax {
    pub const ALL: [Self; 5] = [
        Self::Mention,
        Self::TMe,
        Self::TelegramMe,
        Self::HttpsTMe,
        Self::HttpsTelegramMe,
    ];

    const fn prefix_pattern(self) -> &'static str {
        match self {
            Self::Mention => "@",
            Self::TMe => r"t\.me/",
            Self::TelegramMe => r"telegram\.me/",
            Self::HttpsTMe => r"https://t\.me/",
            Self::HttpsTelegramMe => r"https://telegram\.me/",
        }
    }

    /// Split a candidate that is exactly one reference, and nothing else,
    /// into its syntax and bare identifier.
    #[must_use]
    pub fn parse(candidate: &str) -> Option<(Self, &str)> {
        compiled().iter().find_map(|c| {
            c.exact
                .captures(candidate)
                .and_then(|caps| caps.get(1))
                .map(|m| (c.syntax, m.as_str()))
        })
    }

    /// Bare identifier of a candidate that fully matches one of the syntaxes.
    #[must_use]
    pub fn identifier(candidate: &str) -> Option<&str> {
        Self::parse(candidate).map(|(_, name)| name)
    }
}

/// Keep a candidate self-describing: anything that does not start with one
/// of the known prefix markers is treated as a mention.
fn with_marker(raw: &str) -> String {
    if raw.starts_with(['@', 't', 'h']) {
        raw.to_string()
    } else {
        format!("@{raw}")
    }
}

/// Scan `text` for candidate references.
///
/// A match that lies entirely inside a longer match (`t.me/foo` within
/// `https://t.me/foo`) belongs to the same occurrence and is dropped.
#[must_use]
pub fn extract(text: &str) -> BTreeSet<String> {
    let mut spans: Vec<(usize, usize)> = compiled()
        .iter()
        .flat_map(|c| c.search.find_iter(text).map(|m| (m.start(), m.end())))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    // Longest first so an enclosing span is always seen before its parts.
    spans.sort_by(|a, b| (b.1 - b.0).cmp(&(a.1 - a.0)).then(a.0.cmp(&b.0)));

    let mut kept: Vec<(usize, usize)> = Vec::with_capacity(spans.len());
    for (start, end) in spans {
        let enclosed = kept.iter().any(|&(s, e)| s <= start && end <= e);
        if !enclosed {
            kept.push((start, end));
        }
    }

    kept.into_iter()
        .map(|(start, end)| with_marker(&text[start..end]))
        .collect()
}
