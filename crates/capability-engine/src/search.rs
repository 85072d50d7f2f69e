//! Descendant search over the live tree
//!
//! Traversal is depth-first pre-order over the children of the starting
//! node (the node itself is never a candidate). Every node exposing children
//! is descended into, matching or not, so intermediate grouping elements
//! never hide the kind being searched for. Children are fetched fresh on
//! every visit.

use std::sync::atomic::{AtomicBool, Ordering};

use async_recursion::async_recursion;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use wait_gate::{wait_for, WaitOptions};

use crate::criteria::Criteria;
use crate::errors::AxError;
use crate::naming::{kind_matches, normalize_kind};
use crate::node::Node;

/// Traversal limits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Deepest level visited, children of the start node being level 1.
    /// `None` walks the whole subtree.
    pub max_depth: Option<usize>,
}

impl SearchOptions {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}

/// Result of a search, shaped by the requested mode
#[derive(Debug)]
pub enum SearchResult {
    One(Option<Node>),
    Many(Vec<Node>),
}

impl SearchResult {
    pub fn is_found(&self) -> bool {
        match self {
            SearchResult::One(node) => node.is_some(),
            SearchResult::Many(nodes) => !nodes.is_empty(),
        }
    }

    pub fn count(&self) -> usize {
        match self {
            SearchResult::One(node) => usize::from(node.is_some()),
            SearchResult::Many(nodes) => nodes.len(),
        }
    }

    pub fn into_first(self) -> Option<Node> {
        match self {
            SearchResult::One(node) => node,
            SearchResult::Many(nodes) => nodes.into_iter().next(),
        }
    }

    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            SearchResult::One(node) => node.into_iter().collect(),
            SearchResult::Many(nodes) => nodes,
        }
    }
}

struct Query {
    kind: String,
    criteria: Criteria,
    max_depth: Option<usize>,
    truncated: AtomicBool,
}

impl Query {
    fn new(kind: &str, criteria: Criteria, options: SearchOptions) -> Self {
        Self {
            kind: normalize_kind(kind),
            criteria,
            max_depth: options.max_depth,
            truncated: AtomicBool::new(false),
        }
    }

    async fn accepts(&self, node: &Node) -> Result<bool, AxError> {
        let role = node.role().await?;
        let subrole = node.subrole().await?;
        if !kind_matches(&self.kind, role.as_deref(), subrole.as_deref()) {
            return Ok(false);
        }
        self.criteria.matched_by(node).await
    }

    /// Whether children of a node at `depth` may be visited.
    fn can_descend(&self, depth: usize) -> bool {
        match self.max_depth {
            Some(max) if depth >= max => {
                if !self.truncated.swap(true, Ordering::Relaxed) {
                    warn!(kind = %self.kind, max_depth = max, "search depth limit reached");
                }
                false
            }
            _ => true,
        }
    }
}

impl Node {
    /// Search the subtree below this node for nodes of `kind` meeting `criteria`.
    ///
    /// With `single_result` the first match in traversal order is returned
    /// and the walk stops there; otherwise every match is collected, parents
    /// before their descendants and siblings in transport order.
    pub async fn search(
        &self,
        kind: &str,
        criteria: Criteria,
        single_result: bool,
    ) -> Result<SearchResult, AxError> {
        let query = Query::new(kind, criteria, self.search_options());
        debug!(
            element = %self.element(),
            kind = %query.kind,
            criteria = query.criteria.len(),
            single_result,
            "searching descendants"
        );
        if single_result {
            Ok(SearchResult::One(find_first(self, &query, 0).await?))
        } else {
            let mut found = Vec::new();
            find_all(self, &query, 0, &mut found).await?;
            Ok(SearchResult::Many(found))
        }
    }

    /// First descendant of `kind` meeting the criteria, if any.
    pub async fn find(&self, kind: &str, criteria: Criteria) -> Result<Option<Node>, AxError> {
        Ok(self.search(kind, criteria, true).await?.into_first())
    }

    /// Every descendant of `kind` meeting the criteria.
    pub async fn find_all(&self, kind: &str, criteria: Criteria) -> Result<Vec<Node>, AxError> {
        Ok(self.search(kind, criteria, false).await?.into_nodes())
    }

    /// Poll a single-result search until it finds something.
    ///
    /// `criteria` is rebuilt for every poll. `Ok(None)` once the wait times out.
    pub async fn wait_for_descendant<F>(
        &self,
        kind: &str,
        options: WaitOptions,
        criteria: F,
    ) -> Result<Option<Node>, AxError>
    where
        F: Fn() -> Criteria,
    {
        wait_for(options, move || self.find(kind, criteria())).await
    }
}

#[async_recursion]
async fn find_first(node: &Node, query: &Query, depth: usize) -> Result<Option<Node>, AxError> {
    for child in node.children().await? {
        if query.accepts(&child).await? {
            return Ok(Some(child));
        }
        if child.has_children().await? && query.can_descend(depth + 1) {
            if let Some(found) = find_first(&child, query, depth + 1).await? {
                return Ok(Some(found));
            }
        }
    }
    Ok(None)
}

#[async_recursion]
async fn find_all(
    node: &Node,
    query: &Query,
    depth: usize,
    found: &mut Vec<Node>,
) -> Result<(), AxError> {
    for child in node.children().await? {
        let accepted = query.accepts(&child).await?;
        let mut below = Vec::new();
        if child.has_children().await? && query.can_descend(depth + 1) {
            find_all(&child, query, depth + 1, &mut below).await?;
        }
        if accepted {
            found.push(child);
        }
        found.append(&mut below);
    }
    Ok(())
}
