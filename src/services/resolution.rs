//! Base-model pattern resolution.
//!
//! Presets store base-model entries as patterns: a trailing `*` makes a
//! prefix wildcard, anything else is an exact label. Resolution turns the
//! patterns into concrete labels using the live catalog.

use std::collections::BTreeSet;

use crate::constants::{NO_MATCH_SENTINEL, WILDCARD_SUFFIX};

/// Base-model patterns split into exact labels and wildcard prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseModelPatterns {
    literals: Vec<String>,
    prefixes: Vec<String>,
}

impl BaseModelPatterns {
    /// Splits patterns into literals and prefixes. Empty patterns are ignored.
    pub fn parse<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::default();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            if pattern.is_empty() {
                continue;
            }
            match pattern.strip_suffix(WILDCARD_SUFFIX) {
                Some(prefix) => parsed.prefixes.push(prefix.to_string()),
                None => parsed.literals.push(pattern.to_string()),
            }
        }
        parsed
    }

    /// Returns true if there is nothing to resolve.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.prefixes.is_empty()
    }

    /// Returns true if at least one pattern is a wildcard.
    #[must_use]
    pub fn has_wildcards(&self) -> bool {
        !self.prefixes.is_empty()
    }

    /// Resolves the patterns against the catalog labels.
    ///
    /// Literals are kept only if the catalog contains them; prefixes expand
    /// to every catalog label that starts with them. If wildcards were
    /// present and nothing matched, the result is the no-match sentinel so
    /// the selection shows zero items rather than all of them.
    pub fn resolve<'a, I>(&self, catalog: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut resolved = BTreeSet::new();
        for label in catalog {
            let exact = self.literals.iter().any(|l| l == label);
            let prefixed = self.prefixes.iter().any(|p| label.starts_with(p.as_str()));
            if exact || prefixed {
                resolved.insert(label.to_string());
            }
        }
        self.or_sentinel(resolved)
    }

    /// Result used when the catalog could not be consulted: the literal
    /// patterns as-is, or the sentinel if only wildcards were given.
    #[must_use]
    pub fn fallback(&self) -> BTreeSet<String> {
        self.or_sentinel(self.literals.iter().cloned().collect())
    }

    fn or_sentinel(&self, resolved: BTreeSet<String>) -> BTreeSet<String> {
        if resolved.is_empty() && self.has_wildcards() {
            BTreeSet::from([NO_MATCH_SENTINEL.to_string()])
        } else {
            resolved
        }
    }
}

/// Returns true if a resolved selection is the no-match sentinel.
#[must_use]
pub fn is_no_match(resolved: &BTreeSet<String>) -> bool {
    resolved.len() == 1 && resolved.contains(NO_MATCH_SENTINEL)
}
