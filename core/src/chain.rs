//! Cycle detection for nested verb-set delegation.
//!
//! A verb that owns a sub-verb service may hand the rest of the command line
//! to another [`VerbSet`](crate::VerbSet). Every delegation extends an
//! immutable [`VerbChain`]; entering a verb that is already on the chain is a
//! [`ChainError::Cycle`].

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::types::Verb;

/// Re-entrant delegation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The verb is already part of the chain.
    #[error("cyclic verb delegation: {path}")]
    Cycle {
        /// Chain path including the repeated verb.
        path: String,
    },
}

/// Ordered, immutable list of verbs entered while delegating.
///
/// Verbs are compared by identity, so two distinct verbs with the same name
/// (for example `list` in two different nested sets) do not collide.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use verb_dispatch_core::{ChainError, Verb, VerbChain};
///
/// let remote = Arc::new(Verb::builder("remote").build());
/// let chain = VerbChain::new().push(&remote).unwrap();
/// assert_eq!(chain.path(), "remote");
///
/// let err = chain.push(&remote).unwrap_err();
/// assert_eq!(err, ChainError::Cycle { path: "remote remote".into() });
/// ```
#[derive(Clone, Default)]
pub struct VerbChain {
    verbs: Vec<Arc<Verb>>,
}

impl VerbChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new chain with `verb` appended.
    pub fn push(&self, verb: &Arc<Verb>) -> Result<Self, ChainError> {
        if self.contains(verb) {
            let path = self
                .names()
                .into_iter()
                .chain(std::iter::once(verb.name.as_str()))
                .collect::<Vec<_>>()
                .join(" ");
            return Err(ChainError::Cycle { path });
        }
        let mut verbs = self.verbs.clone();
        verbs.push(Arc::clone(verb));
        Ok(Self { verbs })
    }

    /// Returns `true` if this exact verb was already entered.
    pub fn contains(&self, verb: &Arc<Verb>) -> bool {
        self.verbs.iter().any(|v| Arc::ptr_eq(v, verb))
    }

    /// Names of the entered verbs, outermost first.
    pub fn names(&self) -> Vec<&str> {
        self.verbs.iter().map(|v| v.name.as_str()).collect()
    }

    /// Space-separated chain path.
    pub fn path(&self) -> String {
        self.names().join(" ")
    }

    /// The innermost entered verb.
    pub fn last(&self) -> Option<&Arc<Verb>> {
        self.verbs.last()
    }

    /// Number of entered verbs.
    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    /// Returns `true` at the root.
    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
}

impl fmt::Debug for VerbChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_leaves_original_untouched() {
        let a = Arc::new(Verb::builder("a").build());
        let b = Arc::new(Verb::builder("b").build());
        let root = VerbChain::new();
        let one = root.push(&a).unwrap();
        let two = one.push(&b).unwrap();

        assert!(root.is_empty());
        assert_eq!(one.len(), 1);
        assert_eq!(two.path(), "a b");
        assert!(Arc::ptr_eq(two.last().unwrap(), &b));
    }

    #[test]
    fn test_same_name_different_verb_is_not_a_cycle() {
        let outer = Arc::new(Verb::builder("list").build());
        let inner = Arc::new(Verb::builder("list").build());
        let chain = VerbChain::new().push(&outer).unwrap();
        assert!(chain.push(&inner).is_ok());
    }

    #[test]
    fn test_cycle_reports_full_path() {
        let a = Arc::new(Verb::builder("a").build());
        let b = Arc::new(Verb::builder("b").build());
        let chain = VerbChain::new().push(&a).unwrap().push(&b).unwrap();
        assert_eq!(
            chain.push(&a).unwrap_err(),
            ChainError::Cycle {
                path: "a b a".to_string()
            }
        );
    }
}
