//! Per-node memoized capability lists

use std::sync::Arc;

use element_transport::{ElementRef, ElementTransport, TransportError};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::errors::Namespace;

type Names = Arc<Vec<String>>;

/// Capability lists for one node.
///
/// Each namespace is fetched with a single transport query on first demand
/// and never invalidated. Reusing a node after the remote element changed its
/// capability set is the caller's problem.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    attributes: OnceCell<Names>,
    actions: OnceCell<Names>,
    parameterized: OnceCell<Names>,
}

impl CapabilityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn attributes(
        &self,
        transport: &dyn ElementTransport,
        element: &ElementRef,
    ) -> Result<Names, TransportError> {
        self.attributes
            .get_or_try_init(|| async {
                let names = transport.list_attributes(element).await?;
                debug!(%element, count = names.len(), "cached attribute names");
                Ok::<_, TransportError>(Arc::new(names))
            })
            .await
            .map(Arc::clone)
    }

    pub async fn actions(
        &self,
        transport: &dyn ElementTransport,
        element: &ElementRef,
    ) -> Result<Names, TransportError> {
        self.actions
            .get_or_try_init(|| async {
                let names = transport.list_actions(element).await?;
                debug!(%element, count = names.len(), "cached action names");
                Ok::<_, TransportError>(Arc::new(names))
            })
            .await
            .map(Arc::clone)
    }

    pub async fn parameterized_attributes(
        &self,
        transport: &dyn ElementTransport,
        element: &ElementRef,
    ) -> Result<Names, TransportError> {
        self.parameterized
            .get_or_try_init(|| async {
                let names = transport.list_parameterized_attributes(element).await?;
                debug!(%element, count = names.len(), "cached parameterized attribute names");
                Ok::<_, TransportError>(Arc::new(names))
            })
            .await
            .map(Arc::clone)
    }

    /// Whether the namespace has been fetched already.
    pub fn is_populated(&self, namespace: Namespace) -> bool {
        match namespace {
            Namespace::Attribute => self.attributes.initialized(),
            Namespace::Action => self.actions.initialized(),
            Namespace::ParameterizedAttribute => self.parameterized.initialized(),
            Namespace::Call => false,
        }
    }
}
