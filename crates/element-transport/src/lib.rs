//! Element Transport - the raw boundary to a remote accessibility tree
//!
//! This crate defines what the capability engine needs from the platform:
//! - Enumeration of attribute, action and parameterized-attribute names
//! - Attribute reads/writes, writability checks and action invocation
//! - Child enumeration and process ownership of elements
//! - Process discovery and application lifecycle control
//!
//! The `mock` module provides in-memory collaborators that count every call,
//! which is what the engine tests run against.

pub mod error;
pub mod mock;
pub mod process;
pub mod transport;
pub mod value;

pub use error::*;
pub use process::*;
pub use transport::*;
pub use value::*;
