//! Member-wise lookups over search results

use capability_engine::naming::singularize;
use capability_engine::{AxError, Criteria, Lookup, Node, Value};

/// Look up `name` (read-only) on every node, in order.
///
/// A node that does not respond to `name` is asked for the singular form
/// instead, so `titles` over a list of buttons reads each button's title.
pub async fn map_members(nodes: &[Node], name: &str) -> Result<Vec<Option<Lookup>>, AxError> {
    let singular = singularize(name);
    let mut results = Vec::with_capacity(nodes.len());
    for node in nodes {
        let key = if node.responds_to(name).await? {
            name
        } else {
            singular.as_str()
        };
        results.push(node.lookup(key, Criteria::new()).await?);
    }
    Ok(results)
}

/// Values of `map_members`, skipping search results and unresolved names.
pub async fn member_values(nodes: &[Node], name: &str) -> Result<Vec<Value>, AxError> {
    Ok(map_members(nodes, name)
        .await?
        .into_iter()
        .filter_map(|lookup| match lookup {
            Some(Lookup::Value(value)) => Some(value),
            _ => None,
        })
        .collect())
}
