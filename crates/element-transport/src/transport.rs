use async_trait::async_trait;

use crate::error::TransportError;
use crate::value::{ElementRef, Value};

/// Raw primitives against the remote tree.
///
/// Every method is one blocking round-trip from the caller's point of view;
/// implementations fail with `TransportError::InvalidReference` once `element`
/// no longer denotes a live remote object.
#[async_trait]
pub trait ElementTransport: Send + Sync {
    async fn list_attributes(&self, element: &ElementRef) -> Result<Vec<String>, TransportError>;

    async fn list_actions(&self, element: &ElementRef) -> Result<Vec<String>, TransportError>;

    async fn list_parameterized_attributes(
        &self,
        element: &ElementRef,
    ) -> Result<Vec<String>, TransportError>;

    async fn read_attribute(&self, element: &ElementRef, name: &str)
        -> Result<Value, TransportError>;

    async fn write_attribute(
        &self,
        element: &ElementRef,
        name: &str,
        value: Value,
    ) -> Result<Value, TransportError>;

    async fn is_attribute_writable(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<bool, TransportError>;

    async fn invoke_action(&self, element: &ElementRef, name: &str) -> Result<bool, TransportError>;

    async fn read_parameterized_attribute(
        &self,
        element: &ElementRef,
        name: &str,
        param: Value,
    ) -> Result<Value, TransportError>;

    async fn children_of(&self, element: &ElementRef) -> Result<Vec<ElementRef>, TransportError>;

    /// Process that owns the element.
    async fn pid_of(&self, element: &ElementRef) -> Result<i32, TransportError>;
}

/// Transport used when no platform backend is wired in; every call fails.
#[derive(Default)]
pub struct NoopTransport;

impl NoopTransport {
    fn unavailable<T>(operation: &str) -> Result<T, TransportError> {
        Err(TransportError::Unavailable(format!(
            "no element transport for {operation}"
        )))
    }
}

#[async_trait]
impl ElementTransport for NoopTransport {
    async fn list_attributes(&self, _element: &ElementRef) -> Result<Vec<String>, TransportError> {
        Self::unavailable("list_attributes")
    }

    async fn list_actions(&self, _element: &ElementRef) -> Result<Vec<String>, TransportError> {
        Self::unavailable("list_actions")
    }

    async fn list_parameterized_attributes(
        &self,
        _element: &ElementRef,
    ) -> Result<Vec<String>, TransportError> {
        Self::unavailable("list_parameterized_attributes")
    }

    async fn read_attribute(
        &self,
        _element: &ElementRef,
        _name: &str,
    ) -> Result<Value, TransportError> {
        Self::unavailable("read_attribute")
    }

    async fn write_attribute(
        &self,
        _element: &ElementRef,
        _name: &str,
        _value: Value,
    ) -> Result<Value, TransportError> {
        Self::unavailable("write_attribute")
    }

    async fn is_attribute_writable(
        &self,
        _element: &ElementRef,
        _name: &str,
    ) -> Result<bool, TransportError> {
        Self::unavailable("is_attribute_writable")
    }

    async fn invoke_action(
        &self,
        _element: &ElementRef,
        _name: &str,
    ) -> Result<bool, TransportError> {
        Self::unavailable("invoke_action")
    }

    async fn read_parameterized_attribute(
        &self,
        _element: &ElementRef,
        _name: &str,
        _param: Value,
    ) -> Result<Value, TransportError> {
        Self::unavailable("read_parameterized_attribute")
    }

    async fn children_of(&self, _element: &ElementRef) -> Result<Vec<ElementRef>, TransportError> {
        Self::unavailable("children_of")
    }

    async fn pid_of(&self, _element: &ElementRef) -> Result<i32, TransportError> {
        Self::unavailable("pid_of")
    }
}
