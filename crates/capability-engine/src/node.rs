//! Client-side handle to one remote element

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use element_transport::{ElementRef, ElementTransport, Value};
use tokio::sync::OnceCell;
use tracing::debug;

use crate::cache::CapabilityCache;
use crate::constants::{
    CHILDREN_ATTRIBUTE, FOCUSED_ATTRIBUTE, ROLE_ATTRIBUTE, SUBROLE_ATTRIBUTE,
};
use crate::errors::{AxError, Namespace};
use crate::matcher::constant_for;
use crate::search::SearchOptions;

/// Handle to one element of the remote tree.
///
/// A node owns its element reference and its capability cache. It never
/// holds child nodes: every traversal asks the transport again, so search
/// results reflect the live tree. Two nodes are equal iff they refer to the
/// same remote element.
///
/// Nodes are not meant to be driven from several tasks at once.
pub struct Node {
    transport: Arc<dyn ElementTransport>,
    element: ElementRef,
    cache: CapabilityCache,
    pid: OnceCell<i32>,
    options: SearchOptions,
}

impl Node {
    pub fn new(transport: Arc<dyn ElementTransport>, element: ElementRef) -> Self {
        Self {
            transport,
            element,
            cache: CapabilityCache::new(),
            pid: OnceCell::new(),
            options: SearchOptions::default(),
        }
    }

    pub fn with_search_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    /// Wrap another element reached through this node (same transport and options).
    pub fn adopt(&self, element: ElementRef) -> Node {
        Node::new(self.transport.clone(), element).with_search_options(self.options)
    }

    /// Wrap an element-valued attribute value; `None` for any other value.
    pub fn adopt_value(&self, value: Value) -> Option<Node> {
        value.into_element().map(|element| self.adopt(element))
    }

    pub fn element(&self) -> &ElementRef {
        &self.element
    }

    pub fn transport(&self) -> &Arc<dyn ElementTransport> {
        &self.transport
    }

    pub fn cache(&self) -> &CapabilityCache {
        &self.cache
    }

    pub fn search_options(&self) -> SearchOptions {
        self.options
    }

    pub async fn attributes(&self) -> Result<Arc<Vec<String>>, AxError> {
        Ok(self
            .cache
            .attributes(self.transport.as_ref(), &self.element)
            .await?)
    }

    pub async fn actions(&self) -> Result<Arc<Vec<String>>, AxError> {
        Ok(self
            .cache
            .actions(self.transport.as_ref(), &self.element)
            .await?)
    }

    pub async fn parameterized_attributes(&self) -> Result<Arc<Vec<String>>, AxError> {
        Ok(self
            .cache
            .parameterized_attributes(self.transport.as_ref(), &self.element)
            .await?)
    }

    pub async fn attribute_for(&self, name: &str) -> Result<Option<String>, AxError> {
        Ok(constant_for(name, &self.attributes().await?))
    }

    pub async fn action_for(&self, name: &str) -> Result<Option<String>, AxError> {
        Ok(constant_for(name, &self.actions().await?))
    }

    pub async fn param_attribute_for(&self, name: &str) -> Result<Option<String>, AxError> {
        Ok(constant_for(name, &self.parameterized_attributes().await?))
    }

    pub async fn get_attribute(&self, name: &str) -> Result<Value, AxError> {
        let Some(attribute) = self.attribute_for(name).await? else {
            return Err(self.not_found(name, Namespace::Attribute).await);
        };
        Ok(self
            .transport
            .read_attribute(&self.element, &attribute)
            .await?)
    }

    /// Whether the attribute matching `name` accepts writes; `false` if there is none.
    pub async fn is_writable(&self, name: &str) -> Result<bool, AxError> {
        match self.attribute_for(name).await? {
            Some(attribute) => Ok(self
                .transport
                .is_attribute_writable(&self.element, &attribute)
                .await?),
            None => Ok(false),
        }
    }

    /// Write an attribute and return the value the transport reports written.
    ///
    /// Nothing can be assumed about the remote state afterwards.
    pub async fn set_attribute(&self, name: &str, value: Value) -> Result<Value, AxError> {
        let Some(attribute) = self.attribute_for(name).await? else {
            return Err(self.not_found(name, Namespace::Attribute).await);
        };
        if !self
            .transport
            .is_attribute_writable(&self.element, &attribute)
            .await?
        {
            return Err(AxError::AttributeNotWritable { name: attribute });
        }
        debug!(element = %self.element, attribute = %attribute, "writing attribute");
        Ok(self
            .transport
            .write_attribute(&self.element, &attribute, value)
            .await?)
    }

    /// Invoke an action.
    ///
    /// The action may destroy the element (closing a window, for one); this
    /// node is then stale and further calls fail with a transport error.
    pub async fn perform_action(&self, name: &str) -> Result<bool, AxError> {
        let Some(action) = self.action_for(name).await? else {
            return Err(self.not_found(name, Namespace::Action).await);
        };
        debug!(element = %self.element, action = %action, "performing action");
        Ok(self.transport.invoke_action(&self.element, &action).await?)
    }

    pub async fn get_param_attribute(&self, name: &str, param: Value) -> Result<Value, AxError> {
        let Some(attribute) = self.param_attribute_for(name).await? else {
            return Err(self.not_found(name, Namespace::ParameterizedAttribute).await);
        };
        Ok(self
            .transport
            .read_parameterized_attribute(&self.element, &attribute, param)
            .await?)
    }

    /// Whether the element advertises the children attribute.
    pub async fn has_children(&self) -> Result<bool, AxError> {
        Ok(self
            .attributes()
            .await?
            .iter()
            .any(|name| name == CHILDREN_ATTRIBUTE))
    }

    /// Fresh handles for the current children, in transport order.
    pub async fn children(&self) -> Result<Vec<Node>, AxError> {
        if !self.has_children().await? {
            return Ok(Vec::new());
        }
        let children = self.transport.children_of(&self.element).await?;
        Ok(children.into_iter().map(|child| self.adopt(child)).collect())
    }

    pub async fn role(&self) -> Result<Option<String>, AxError> {
        self.read_text(ROLE_ATTRIBUTE).await
    }

    pub async fn subrole(&self) -> Result<Option<String>, AxError> {
        self.read_text(SUBROLE_ATTRIBUTE).await
    }

    pub async fn pid(&self) -> Result<i32, AxError> {
        let pid = self
            .pid
            .get_or_try_init(|| self.transport.pid_of(&self.element))
            .await?;
        Ok(*pid)
    }

    /// Whether `name` denotes an attribute or action of this element.
    ///
    /// Search names are not considered.
    pub async fn responds_to(&self, name: &str) -> Result<bool, AxError> {
        if name == "set_focus" {
            return Ok(self
                .attributes()
                .await?
                .iter()
                .any(|attr| attr == FOCUSED_ATTRIBUTE));
        }
        Ok(self.attribute_for(name).await?.is_some() || self.action_for(name).await?.is_some())
    }

    /// Read an exact attribute constant as text, if the element has it.
    async fn read_text(&self, constant: &str) -> Result<Option<String>, AxError> {
        if !self.attributes().await?.iter().any(|name| name == constant) {
            return Ok(None);
        }
        let value = self.transport.read_attribute(&self.element, constant).await?;
        Ok(value.as_str().map(str::to_string))
    }

    /// Not-found error carrying the role; a failing role read wins instead.
    pub(crate) async fn not_found(&self, name: &str, namespace: Namespace) -> AxError {
        match self.role().await {
            Ok(role) => AxError::not_found(name, namespace, role),
            Err(err) => err,
        }
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.element == other.element
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.element.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("element", &self.element)
            .finish_non_exhaustive()
    }
}
