//! Pattern compiler for storage paths and call-chain identifiers
//!
//! Two source grammars compile into the same [`Matcher`]:
//!
//! - **Path globs**: `?`, `*` and `**` wildcards (see [`glob`])
//! - **Regular expressions**: used as written
//!
//! Both forms require a full match of the candidate, ignore case, and
//! strip leading separators from the pattern and the candidate alike, so
//! `/data/**` and `data/**` are the same rule.
//!
//! # Example
//!
//! ```rust
//! use cretoai_rbac::pattern::{compile, PatternKind};
//!
//! let matcher = compile("/data/*/foo", PatternKind::Path).unwrap();
//! assert!(matcher.is_match("data/x/foo"));
//! assert!(matcher.is_match("/DATA/x/FOO"));
//! assert!(!matcher.is_match("data/x/y/foo"));
//! ```

pub mod error;
pub mod glob;

pub use error::{PatternError, Result};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;

use self::glob::SEPARATOR;

/// Pattern source grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    /// Path glob (`?`, `*`, `**`)
    Path,
    /// Regular expression
    Regex,
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternKind::Path => write!(f, "path"),
            PatternKind::Regex => write!(f, "regex"),
        }
    }
}

/// Uncompiled pattern: grammar plus source text
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatternSource {
    pub kind: PatternKind,
    pub text: String,
}

impl PatternSource {
    /// Creates a path glob source
    pub fn path(text: impl Into<String>) -> Self {
        Self {
            kind: PatternKind::Path,
            text: text.into(),
        }
    }

    /// Creates a regular expression source
    pub fn regex(text: impl Into<String>) -> Self {
        Self {
            kind: PatternKind::Regex,
            text: text.into(),
        }
    }

    /// Compiles this source
    pub fn compile(&self) -> Result<Matcher> {
        compile(&self.text, self.kind)
    }
}

impl fmt::Display for PatternSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.text)
    }
}

/// Compiled full-match, case-insensitive matcher
#[derive(Debug, Clone)]
pub struct Matcher {
    kind: PatternKind,
    source: String,
    regex: Regex,
    negated: bool,
}

impl Matcher {
    /// Tests a candidate path or identifier
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(strip_separators(candidate)) != self.negated
    }

    /// Returns a matcher accepting exactly what this one rejects
    pub fn negate(mut self) -> Self {
        self.negated = !self.negated;
        self
    }

    /// Source grammar
    pub fn kind(&self) -> PatternKind {
        self.kind
    }

    /// Original source text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the matcher is negated
    pub fn is_negated(&self) -> bool {
        self.negated
    }
}

/// Compiles a pattern source of the given grammar
///
/// # Errors
///
/// Returns [`PatternError::Empty`] for blank sources and
/// [`PatternError::InvalidRegex`] when the (translated) expression does
/// not parse.
pub fn compile(source: &str, kind: PatternKind) -> Result<Matcher> {
    if source.trim().is_empty() {
        return Err(PatternError::Empty);
    }

    let body = match kind {
        PatternKind::Path => glob::glob_to_regex(strip_separators(source)),
        PatternKind::Regex => {
            let expr = source.strip_prefix('^').unwrap_or(source);
            strip_regex_separators(expr).to_string()
        }
    };

    let regex = RegexBuilder::new(&format!("^(?:{})$", body))
        .case_insensitive(true)
        .build()
        .map_err(|e| PatternError::InvalidRegex {
            source_text: source.to_string(),
            message: e.to_string(),
        })?;

    Ok(Matcher {
        kind,
        source: source.to_string(),
        regex,
        negated: false,
    })
}

/// Strips leading path separators
fn strip_separators(s: &str) -> &str {
    s.trim_start_matches(SEPARATOR)
}

/// Strips leading separators from a regular expression, together with any
/// quantifier applied to the last of them
///
/// Candidates never start with a separator, so `/?`, `/+` or `/{0,1}` at
/// the front of an expression can only ever match the empty string.
fn strip_regex_separators(mut expr: &str) -> &str {
    loop {
        let rest = strip_separators(expr);
        if rest.len() == expr.len() {
            return expr;
        }
        expr = skip_quantifier(rest).unwrap_or(rest);
    }
}

/// Returns the text after a leading quantifier (`?`, `*`, `+`, `{m,n}`)
/// and its optional lazy suffix, `None` if there is no quantifier
fn skip_quantifier(s: &str) -> Option<&str> {
    let rest = match s.chars().next()? {
        '?' | '*' | '+' => &s[1..],
        '{' => &s[s.find('}')? + 1..],
        _ => return None,
    };
    Some(rest.strip_prefix('?').unwrap_or(rest))
}
