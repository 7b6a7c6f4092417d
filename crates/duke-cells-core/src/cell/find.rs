//! Text search and replacement over cell values

use std::borrow::Cow;
use std::fmt;

use regex::{Captures, NoExpand, Regex, RegexBuilder};

use crate::error::{Error, Result};

/// What to look for in a cell's text
#[derive(Clone)]
pub enum FindPattern {
    /// Literal text, matched case-insensitively everywhere it occurs
    Text(String),
    /// Regular expression; without `global` only the first match is replaced
    Regex { regex: Regex, global: bool },
}

impl FindPattern {
    pub fn text<S: Into<String>>(text: S) -> Self {
        FindPattern::Text(text.into())
    }

    /// A regex that replaces its first match only
    pub fn regex(regex: Regex) -> Self {
        FindPattern::Regex {
            regex,
            global: false,
        }
    }

    /// A regex that replaces every match
    pub fn regex_global(regex: Regex) -> Self {
        FindPattern::Regex {
            regex,
            global: true,
        }
    }

    /// Compile a regex pattern
    pub fn compile(pattern: &str, global: bool) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::other(format!("invalid pattern '{}': {}", pattern, e)))?;
        Ok(FindPattern::Regex { regex, global })
    }

    fn is_global(&self) -> bool {
        match self {
            FindPattern::Text(_) => true,
            FindPattern::Regex { global, .. } => *global,
        }
    }

    fn to_regex(&self) -> Result<Cow<'_, Regex>> {
        match self {
            FindPattern::Text(text) => RegexBuilder::new(&regex::escape(text))
                .case_insensitive(true)
                .multi_line(true)
                .build()
                .map(Cow::Owned)
                .map_err(|e| Error::other(format!("invalid search text '{}': {}", text, e))),
            FindPattern::Regex { regex, .. } => Ok(Cow::Borrowed(regex)),
        }
    }
}

impl fmt::Debug for FindPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindPattern::Text(text) => f.debug_tuple("Text").field(text).finish(),
            FindPattern::Regex { regex, global } => f
                .debug_struct("Regex")
                .field("regex", &regex.as_str())
                .field("global", global)
                .finish(),
        }
    }
}

impl From<&str> for FindPattern {
    fn from(text: &str) -> Self {
        FindPattern::text(text)
    }
}

impl From<Regex> for FindPattern {
    fn from(regex: Regex) -> Self {
        FindPattern::regex(regex)
    }
}

/// One match handed to a replacement function
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindMatch<'t> {
    /// The matched text
    pub matched: &'t str,
    /// Capture groups 1..n; groups that did not participate are `None`
    pub groups: Vec<Option<&'t str>>,
    /// Byte offset of the match in `input`
    pub offset: usize,
    /// The whole text being searched
    pub input: &'t str,
}

/// Replacement for matches of a [`FindPattern`]
pub enum Replacement<'a> {
    /// Fixed text; with a regex pattern `$1`/`${name}` expand to capture
    /// groups, with a text pattern it is inserted literally
    Text(String),
    /// Computed per match
    Function(Box<dyn FnMut(&FindMatch<'_>) -> String + 'a>),
}

impl<'a> Replacement<'a> {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Replacement::Text(text.into())
    }

    pub fn function<F>(f: F) -> Self
    where
        F: FnMut(&FindMatch<'_>) -> String + 'a,
    {
        Replacement::Function(Box::new(f))
    }
}

impl From<&str> for Replacement<'_> {
    fn from(text: &str) -> Self {
        Replacement::text(text)
    }
}

/// Check whether `pattern` matches anywhere in `text`
pub fn find_in(text: &str, pattern: &FindPattern) -> Result<bool> {
    Ok(pattern.to_regex()?.is_match(text))
}

/// Replace matches of `pattern` in `text`
///
/// Returns the new text, or `None` when nothing changed.
pub fn replace_in(
    text: &str,
    pattern: &FindPattern,
    replacement: Replacement<'_>,
) -> Result<Option<String>> {
    let regex = pattern.to_regex()?;
    let limit = if pattern.is_global() { 0 } else { 1 };

    let replaced = match replacement {
        Replacement::Text(with) => match pattern {
            FindPattern::Text(_) => regex.replacen(text, limit, NoExpand(&with)),
            FindPattern::Regex { .. } => regex.replacen(text, limit, |caps: &Captures<'_>| {
                expand_groups(&regex, caps, &with)
            }),
        },
        Replacement::Function(mut f) => regex.replacen(text, limit, |caps: &Captures<'_>| {
            let whole = caps.get(0).expect("group 0 is always present");
            let found = FindMatch {
                matched: whole.as_str(),
                groups: (1..caps.len())
                    .map(|i| caps.get(i).map(|m| m.as_str()))
                    .collect(),
                offset: whole.start(),
                input: text,
            };
            f(&found)
        }),
    };

    if replaced == text {
        Ok(None)
    } else {
        Ok(Some(replaced.into_owned()))
    }
}

/// Expand `$N`, `${N}`, `$name`, `${name}` and `$$` in a replacement
///
/// A reference to a group the regex does not have is left in the output as
/// written; a group that did not participate in the match expands to nothing.
fn expand_groups(regex: &Regex, caps: &Captures<'_>, template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + 1..];

        if let Some(after) = rest.strip_prefix('$') {
            out.push('$');
            rest = after;
            continue;
        }

        let (name, len) = match rest.strip_prefix('{') {
            Some(braced) => match braced.find('}') {
                Some(end) => (&braced[..end], end + 2),
                None => ("", 0),
            },
            None => {
                let end = rest
                    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                    .unwrap_or(rest.len());
                (&rest[..end], end)
            }
        };

        let group = match name.parse::<usize>() {
            Ok(index) if index < caps.len() => Some(caps.get(index)),
            Ok(_) => None,
            Err(_) if regex.capture_names().flatten().any(|n| n == name) => {
                Some(caps.name(name))
            }
            Err(_) => None,
        };

        match group {
            Some(found) => {
                out.push_str(found.map_or("", |m| m.as_str()));
                rest = &rest[len..];
            }
            None => out.push('$'),
        }
    }

    out.push_str(rest);
    out
}
