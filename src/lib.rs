//! axkit - accessibility-tree automation
//!
//! The heavy lifting lives in the workspace crates:
//! - `element-transport`: the raw platform boundary and in-memory mocks
//! - `capability-engine`: `Node`, symbolic resolution and descendant search
//! - `wait-gate`: bounded polling for asynchronous effects
//!
//! This crate adds application handles, configuration and logging setup.

pub mod application;
pub mod collection;
pub mod config;
pub mod errors;
pub mod runtime;

pub use application::{AppIdent, Application, Desktop, MenuPath};
pub use collection::{map_members, member_values};
pub use config::AxConfig;
pub use errors::AppError;
pub use runtime::{init_logging, init_logging_from, load_config, LoadedConfig};

pub use capability_engine::{
    Arg, AxError, Criteria, Expectation, Lookup, Namespace, Node, Resolution, SearchOptions,
    SearchResult,
};
pub use element_transport::{
    ElementRef, ElementTransport, Pid, ProcessControl, TransportError, Value,
};
pub use wait_gate::{wait_for, wait_until, WaitOptions};
