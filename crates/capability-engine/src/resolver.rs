//! Interpretation of symbolic calls against a node
//!
//! A symbolic name is tried, in order, as:
//! 1. attribute write (`name=`)
//! 2. attribute read
//! 3. action
//! 4. descendant search, when the node has children
//!
//! The first interpretation that matches is the only one attempted.

use element_transport::Value;
use tracing::debug;

use crate::criteria::Criteria;
use crate::errors::{AxError, Namespace};
use crate::naming::{is_plural, singularize};
use crate::node::Node;
use crate::search::SearchResult;

/// Argument to a symbolic call
#[derive(Debug, Clone)]
pub enum Arg {
    Value(Value),
    Criteria(Criteria),
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Value(value)
    }
}

impl From<Criteria> for Arg {
    fn from(criteria: Criteria) -> Self {
        Arg::Criteria(criteria)
    }
}

/// What a symbolic call turned out to be, with its result
#[derive(Debug)]
pub enum Resolution {
    /// Attribute read
    Value(Value),
    /// Attribute write; carries the written value
    Written(Value),
    /// Action invocation; carries the transport's success flag
    Performed(bool),
    /// Singular search
    Found(Option<Node>),
    /// Plural search
    FoundAll(Vec<Node>),
}

impl Resolution {
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolution::Value(value) | Resolution::Written(value) => Some(value),
            _ => None,
        }
    }

    /// Nodes produced by a search; empty for any other interpretation.
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            Resolution::Found(node) => node.into_iter().collect(),
            Resolution::FoundAll(nodes) => nodes,
            _ => Vec::new(),
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Resolution::Found(_) | Resolution::FoundAll(_))
    }
}

impl From<SearchResult> for Resolution {
    fn from(result: SearchResult) -> Self {
        match result {
            SearchResult::One(node) => Resolution::Found(node),
            SearchResult::Many(nodes) => Resolution::FoundAll(nodes),
        }
    }
}

/// Outcome of a read-only lookup
#[derive(Debug)]
pub enum Lookup {
    Value(Value),
    Search(SearchResult),
}

impl Node {
    /// Resolve a symbolic call and carry it out.
    ///
    /// Setter names (`name=`) take a value argument and never fall through to
    /// actions or search. Search names take an optional criteria argument;
    /// plural names search for every match, singular names for the first.
    pub async fn resolve(&self, name: &str, args: Vec<Arg>) -> Result<Resolution, AxError> {
        let mut args = args.into_iter();

        if let Some(base) = name.strip_suffix('=') {
            let value = match args.next() {
                Some(Arg::Value(value)) => value,
                Some(Arg::Criteria(_)) => {
                    return Err(AxError::invalid_argument(name, "expected a value, got criteria"))
                }
                None => return Err(AxError::invalid_argument(name, "missing value to write")),
            };
            return self.set_attribute(base, value).await.map(Resolution::Written);
        }

        if let Some(attribute) = self.attribute_for(name).await? {
            debug!(name, attribute = %attribute, "resolved as attribute");
            let value = self
                .transport()
                .read_attribute(self.element(), &attribute)
                .await?;
            return Ok(Resolution::Value(value));
        }

        if let Some(action) = self.action_for(name).await? {
            debug!(name, action = %action, "resolved as action");
            let performed = self.transport().invoke_action(self.element(), &action).await?;
            return Ok(Resolution::Performed(performed));
        }

        if self.has_children().await? {
            let criteria = match args.next() {
                Some(Arg::Criteria(criteria)) => criteria,
                Some(Arg::Value(_)) => {
                    return Err(AxError::invalid_argument(name, "search expects criteria"))
                }
                None => Criteria::default(),
            };
            let (kind, single_result) = search_form(name);
            debug!(name, kind = %kind, single_result, "resolved as search");
            return self
                .search(&kind, criteria, single_result)
                .await
                .map(Resolution::from);
        }

        Err(self.not_found(name, Namespace::Call).await)
    }

    /// Read-only resolution: attribute read, else descendant search.
    ///
    /// Never writes and never invokes actions. `None` when the name matches
    /// no attribute and the node has no children.
    pub async fn lookup(&self, name: &str, criteria: Criteria) -> Result<Option<Lookup>, AxError> {
        if let Some(attribute) = self.attribute_for(name).await? {
            let value = self
                .transport()
                .read_attribute(self.element(), &attribute)
                .await?;
            return Ok(Some(Lookup::Value(value)));
        }
        if self.has_children().await? {
            let (kind, single_result) = search_form(name);
            let result = self.search(&kind, criteria, single_result).await?;
            return Ok(Some(Lookup::Search(result)));
        }
        Ok(None)
    }
}

/// Kind to search for and whether only the first match is wanted.
fn search_form(name: &str) -> (String, bool) {
    let name = name.strip_suffix('?').unwrap_or(name);
    if is_plural(name) {
        (singularize(name), false)
    } else {
        (name.to_string(), true)
    }
}
