//! Command templates with named placeholders.
//!
//! Debug tool invocations are stored as ordered argument lists. Tokens that
//! are only known when a debug session starts (the program to load) are kept
//! as named placeholders instead of magic strings, so binding can tell
//! "no occurrence" and "several occurrences" apart from a normal match.
//!
//! On the manifest boundary a placeholder named `ELF_FILE` is written as
//! the token `__ELF_FILE__`.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Placeholder for the program image passed to a simulator.
pub const ELF_FILE: &str = "ELF_FILE";

/// One element of a [`CommandTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TemplateArg {
    /// Token passed through unchanged.
    Literal(String),
    /// Named slot filled in at bind time.
    Placeholder(String),
}

impl TemplateArg {
    /// Create a literal argument.
    #[must_use]
    pub fn literal(token: impl Into<String>) -> Self {
        Self::Literal(token.into())
    }

    /// Create a placeholder argument.
    #[must_use]
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::Placeholder(name.into())
    }

    /// Parse a manifest token. `__NAME__` becomes a placeholder, anything else a literal.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        match placeholder_name(token) {
            Some(name) => Self::Placeholder(name.to_string()),
            None => Self::Literal(token.to_string()),
        }
    }

    /// Render as a manifest token.
    #[must_use]
    pub fn to_token(&self) -> String {
        match self {
            Self::Literal(token) => token.clone(),
            Self::Placeholder(name) => format!("__{name}__"),
        }
    }

    /// Whether this is the placeholder called `name`.
    #[must_use]
    pub fn is_placeholder(&self, name: &str) -> bool {
        matches!(self, Self::Placeholder(n) if n == name)
    }
}

impl fmt::Display for TemplateArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

impl Serialize for TemplateArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_token())
    }
}

impl<'de> Deserialize<'de> for TemplateArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let token = String::deserialize(deserializer)?;
        Ok(Self::parse(&token))
    }
}

fn placeholder_name(token: &str) -> Option<&str> {
    let name = token.strip_prefix("__")?.strip_suffix("__")?;
    let valid = !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_');
    valid.then_some(name)
}

/// Result of looking up a placeholder in a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderMatch {
    /// The placeholder does not occur.
    Missing,
    /// The placeholder occurs exactly once, at this index.
    Unique(usize),
    /// The placeholder occurs this many times.
    Duplicated(usize),
}

/// Ordered argument list with named placeholders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommandTemplate(Vec<TemplateArg>);

impl CommandTemplate {
    /// Create an empty template.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a template from manifest tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            tokens
                .into_iter()
                .map(|t| TemplateArg::parse(t.as_ref()))
                .collect(),
        )
    }

    /// Append literal tokens in order.
    #[must_use]
    pub fn literals<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .extend(tokens.into_iter().map(|t| TemplateArg::Literal(t.into())));
        self
    }

    /// Append one placeholder.
    #[must_use]
    pub fn placeholder(mut self, name: impl Into<String>) -> Self {
        self.0.push(TemplateArg::Placeholder(name.into()));
        self
    }

    /// The template elements in order.
    #[must_use]
    pub fn args(&self) -> &[TemplateArg] {
        &self.0
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the template has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render every element as a manifest token.
    #[must_use]
    pub fn to_tokens(&self) -> Vec<String> {
        self.0.iter().map(TemplateArg::to_token).collect()
    }

    /// Locate the placeholder called `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> PlaceholderMatch {
        let mut positions = self
            .0
            .iter()
            .enumerate()
            .filter(|(_, arg)| arg.is_placeholder(name))
            .map(|(i, _)| i);
        match (positions.next(), positions.count()) {
            (None, _) => PlaceholderMatch::Missing,
            (Some(index), 0) => PlaceholderMatch::Unique(index),
            (Some(_), rest) => PlaceholderMatch::Duplicated(rest + 1),
        }
    }

    /// Replace the element at `index` with a literal.
    ///
    /// Returns `false` when `index` is out of range.
    pub fn set_literal(&mut self, index: usize, value: impl Into<String>) -> bool {
        match self.0.get_mut(index) {
            Some(slot) => {
                *slot = TemplateArg::Literal(value.into());
                true
            }
            None => false,
        }
    }
}

impl FromIterator<TemplateArg> for CommandTemplate {
    fn from_iter<T: IntoIterator<Item = TemplateArg>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
