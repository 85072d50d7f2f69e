//! Capability engine - dynamic resolution and search over a live element tree
//!
//! A `Node` wraps one remote element. Because the remote side describes its
//! own capabilities, nothing here is typed statically:
//! - Capability lists are fetched once per node and memoized (`cache`)
//! - Symbolic names resolve by case-insensitive suffix match (`matcher`)
//! - `Node::resolve` decides between attribute write, attribute read,
//!   action and descendant search (`resolver`)
//! - Descendant search filters by kind and `Criteria` (`search`, `criteria`)

pub mod cache;
pub mod constants;
pub mod criteria;
pub mod errors;
pub mod matcher;
pub mod naming;
pub mod node;
pub mod resolver;
pub mod search;

pub use cache::CapabilityCache;
pub use criteria::{Criteria, Expectation};
pub use errors::{AxError, Namespace};
pub use matcher::{constant_for, pattern_for};
pub use node::Node;
pub use resolver::{Arg, Lookup, Resolution};
pub use search::{SearchOptions, SearchResult};

pub use element_transport::{ElementRef, ElementTransport, TransportError, Value};
pub use wait_gate::WaitOptions;
