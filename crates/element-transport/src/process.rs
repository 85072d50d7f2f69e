use async_trait::async_trait;

use crate::error::TransportError;
use crate::value::ElementRef;

pub type Pid = i32;

/// Process discovery and application lifecycle control.
///
/// State requests (`hide`, `activate`, ...) are usually asynchronous on the
/// platform side: a `true` return only means the request was accepted.
#[async_trait]
pub trait ProcessControl: Send + Sync {
    async fn running_with_bundle_id(&self, bundle_id: &str) -> Result<Option<Pid>, TransportError>;

    async fn running_with_name(&self, name: &str) -> Result<Option<Pid>, TransportError>;

    /// Ask the platform to launch the bundle; `false` if it is not registered.
    async fn launch(&self, bundle_id: &str) -> Result<bool, TransportError>;

    /// The application receiving key events, if any.
    async fn frontmost(&self) -> Result<Option<Pid>, TransportError>;

    /// The application owning the menu bar; usually, not always, the frontmost one.
    async fn menu_bar_owner(&self) -> Result<Option<Pid>, TransportError>;

    async fn application_element(&self, pid: Pid) -> Result<ElementRef, TransportError>;

    async fn bundle_identifier(&self, pid: Pid) -> Result<Option<String>, TransportError>;

    async fn is_active(&self, pid: Pid) -> Result<bool, TransportError>;

    async fn is_hidden(&self, pid: Pid) -> Result<bool, TransportError>;

    async fn is_terminated(&self, pid: Pid) -> Result<bool, TransportError>;

    async fn activate(&self, pid: Pid) -> Result<bool, TransportError>;

    async fn hide(&self, pid: Pid) -> Result<bool, TransportError>;

    async fn terminate(&self, pid: Pid) -> Result<bool, TransportError>;

    async fn force_terminate(&self, pid: Pid) -> Result<bool, TransportError>;
}
