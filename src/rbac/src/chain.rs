//! Call-chain snapshots and via-gate matching
//!
//! A call chain is the ordered list of nested execution contexts active
//! when an access check runs, innermost call first (for example
//! `["procedure/system/storage/read", "procedure/reports/list"]`). The
//! engine only ever reads a snapshot; it has no idea what the
//! identifiers mean.

use serde::{Deserialize, Serialize};

use crate::pattern::{self, Matcher, PatternKind};

/// Prefix negating a via pattern
pub const NEGATION: char = '!';

/// Read-only snapshot of the active execution-context chain
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallChain(Vec<String>);

impl CallChain {
    /// Creates a chain from identifiers, innermost first
    pub fn new<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(frames.into_iter().map(Into::into).collect())
    }

    /// Empty chain (a top-level call)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Innermost frame
    pub fn innermost(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Outermost frame
    pub fn outermost(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn frames(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<S: Into<String>> FromIterator<S> for CallChain {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Provider of the current call-chain snapshot
///
/// The engine takes the chain as an explicit argument; this trait lets a
/// dispatch layer hand over whatever tracks its execution contexts.
pub trait ContextSource {
    /// Returns a snapshot of the active chain
    fn call_chain(&self) -> CallChain;
}

impl ContextSource for CallChain {
    fn call_chain(&self) -> CallChain {
        self.clone()
    }
}

impl<F> ContextSource for F
where
    F: Fn() -> CallChain,
{
    fn call_chain(&self) -> CallChain {
        self()
    }
}

/// Returns `true` if any identifier in the chain satisfies the matcher
///
/// An empty chain never matches.
pub fn matches(pattern: &Matcher, chain: &CallChain) -> bool {
    chain.frames().any(|frame| pattern.is_match(frame))
}

/// Compiles a via-gate source
///
/// A leading `!` negates the pattern: a frame satisfies it when it does
/// not match the remainder.
pub fn compile_via(source: &str, kind: PatternKind) -> pattern::Result<Matcher> {
    match source.trim_start().strip_prefix(NEGATION) {
        Some(rest) => Ok(pattern::compile(rest, kind)?.negate()),
        None => pattern::compile(source, kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn via(source: &str) -> Matcher {
        compile_via(source, PatternKind::Path).unwrap()
    }

    #[test]
    fn test_any_frame_matches() {
        let pattern = via("procedure/reports/**");
        let chain = CallChain::new([
            "procedure/system/storage/read",
            "procedure/reports/list",
            "procedure/system/procedure/call",
        ]);
        assert!(matches(&pattern, &chain));
    }

    #[test]
    fn test_no_frame_matches() {
        let pattern = via("procedure/reports/**");
        let chain = CallChain::new(["procedure/system/procedure/call"]);
        assert!(!matches(&pattern, &chain));
    }

    #[test]
    fn test_empty_chain_never_matches() {
        assert!(!matches(&via("**"), &CallChain::empty()));
        assert!(!matches(&via("!procedure/system/**"), &CallChain::empty()));
    }

    #[test]
    fn test_negated_via() {
        let pattern = via("!procedure/system/**");
        assert!(!matches(
            &pattern,
            &CallChain::new(["procedure/system/procedure/call"])
        ));
        assert!(matches(
            &pattern,
            &CallChain::new(["procedure/system/storage/read", "procedure/app/list"])
        ));
    }

    #[test]
    fn test_regex_via() {
        let pattern = compile_via("procedure/(reports|audit)/.*", PatternKind::Regex).unwrap();
        assert!(matches(&pattern, &CallChain::new(["procedure/audit/export"])));
        assert!(!matches(&pattern, &CallChain::new(["procedure/other/export"])));
    }

    #[test]
    fn test_chain_accessors() {
        let chain: CallChain = ["inner", "middle", "outer"].into_iter().collect();
        assert_eq!(chain.innermost(), Some("inner"));
        assert_eq!(chain.outermost(), Some("outer"));
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn test_closure_source() {
        let source = || CallChain::new(["procedure/reports/list"]);
        assert_eq!(source.call_chain().len(), 1);
    }
}
