//! Search criteria: expected values keyed by capability or kind name

use std::fmt;
use std::sync::Arc;

use async_recursion::async_recursion;
use element_transport::Value;
use regex::Regex;
use tracing::debug;

use crate::errors::AxError;
use crate::naming::is_plural;
use crate::node::Node;
use crate::resolver::Lookup;
use crate::search::SearchResult;

pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Expected outcome for one criterion
#[derive(Clone)]
pub enum Expectation {
    /// Resolved value must equal this one.
    ///
    /// Against a plural search key, an integer compares with the number of
    /// matches.
    Equals(Value),
    /// Resolved value, as text, must contain a match
    Pattern(Regex),
    /// Predicate must accept the resolved value
    Predicate(Predicate),
    /// Key is a kind; a descendant of that kind must satisfy these criteria
    Nested(Criteria),
}

impl Expectation {
    fn accepts_value(&self, value: &Value) -> bool {
        match self {
            Expectation::Equals(expected) => value == expected,
            Expectation::Pattern(pattern) => pattern.is_match(&value.to_text()),
            Expectation::Predicate(predicate) => predicate(value),
            Expectation::Nested(_) => false,
        }
    }

    /// Search results only satisfy nested criteria, or a count for a plural key.
    fn accepts_search(&self, result: &SearchResult, plural_key: bool) -> bool {
        match self {
            Expectation::Nested(_) => result.is_found(),
            Expectation::Equals(Value::Integer(count)) if plural_key => {
                i64::try_from(result.count()).map_or(false, |n| n == *count)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expectation::Equals(value) => f.debug_tuple("Equals").field(value).finish(),
            Expectation::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Expectation::Predicate(_) => f.write_str("Predicate(..)"),
            Expectation::Nested(criteria) => f.debug_tuple("Nested").field(criteria).finish(),
        }
    }
}

impl From<Value> for Expectation {
    fn from(value: Value) -> Self {
        Expectation::Equals(value)
    }
}

impl From<&str> for Expectation {
    fn from(value: &str) -> Self {
        Expectation::Equals(value.into())
    }
}

impl From<bool> for Expectation {
    fn from(value: bool) -> Self {
        Expectation::Equals(value.into())
    }
}

impl From<i64> for Expectation {
    fn from(value: i64) -> Self {
        Expectation::Equals(value.into())
    }
}

impl From<Regex> for Expectation {
    fn from(pattern: Regex) -> Self {
        Expectation::Pattern(pattern)
    }
}

impl From<Criteria> for Expectation {
    fn from(criteria: Criteria) -> Self {
        Expectation::Nested(criteria)
    }
}

/// Order-irrelevant mapping from key to expectation; a candidate matches
/// iff every key resolves (read-only) to an accepted value.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    entries: Vec<(String, Expectation)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expectation for `key`, replacing any earlier one.
    pub fn with(mut self, key: &str, expectation: impl Into<Expectation>) -> Self {
        let expectation = expectation.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(slot) => slot.1 = expectation,
            None => self.entries.push((key.to_string(), expectation)),
        }
        self
    }

    pub fn equals(self, key: &str, value: impl Into<Value>) -> Self {
        self.with(key, Expectation::Equals(value.into()))
    }

    pub fn matching(self, key: &str, pattern: Regex) -> Self {
        self.with(key, Expectation::Pattern(pattern))
    }

    pub fn satisfying<F>(self, key: &str, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.with(key, Expectation::Predicate(Arc::new(predicate)))
    }

    pub fn nested(self, key: &str, criteria: Criteria) -> Self {
        self.with(key, Expectation::Nested(criteria))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expectation)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Whether `node` satisfies every criterion.
    ///
    /// Keys that resolve to nothing on the node count as unmet; transport
    /// failures propagate.
    #[async_recursion]
    pub async fn matched_by(&self, node: &Node) -> Result<bool, AxError> {
        for (key, expectation) in &self.entries {
            let nested = match expectation {
                Expectation::Nested(criteria) => criteria.clone(),
                _ => Criteria::default(),
            };
            let satisfied = match node.lookup(key, nested).await? {
                Some(Lookup::Value(value)) => expectation.accepts_value(&value),
                Some(Lookup::Search(result)) => {
                    expectation.accepts_search(&result, is_plural(key))
                }
                None => {
                    debug!(element = %node.element(), key = %key, "criterion key not resolvable");
                    false
                }
            };
            if !satisfied {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
