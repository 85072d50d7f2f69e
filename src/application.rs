//! Running applications: discovery, launch, lifecycle state, menus and windows
//!
//! An `Application` wraps the application's root element in a `Node` and
//! keeps a handle on the process controller. State changes are requested
//! through the controller and then confirmed by polling, since the platform
//! applies them asynchronously.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use capability_engine::{Arg, AxError, Criteria, Node, Resolution, Value};
use element_transport::{ElementTransport, Pid, ProcessControl};
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use wait_gate::{wait_for, wait_for_state};

use crate::config::AxConfig;
use crate::errors::AppError;

pub const DOCK_BUNDLE_ID: &str = "com.apple.dock";
pub const FINDER_BUNDLE_ID: &str = "com.apple.finder";
pub const NOTIFICATION_CENTER_BUNDLE_ID: &str = "com.apple.notificationcenterui";

const WINDOW_ROLE: &str = "AXWindow";

/// How to find an application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppIdent {
    Pid(Pid),
    /// Bundle identifier or localized name
    Named(String),
}

impl From<Pid> for AppIdent {
    fn from(pid: Pid) -> Self {
        AppIdent::Pid(pid)
    }
}

impl From<&str> for AppIdent {
    fn from(name: &str) -> Self {
        AppIdent::Named(name.to_string())
    }
}

impl From<String> for AppIdent {
    fn from(name: String) -> Self {
        AppIdent::Named(name)
    }
}

/// Platform collaborators shared by every application handle
#[derive(Clone)]
pub struct Desktop {
    transport: Arc<dyn ElementTransport>,
    processes: Arc<dyn ProcessControl>,
    config: AxConfig,
}

impl Desktop {
    pub fn new(
        transport: Arc<dyn ElementTransport>,
        processes: Arc<dyn ProcessControl>,
        config: AxConfig,
    ) -> Self {
        Self {
            transport,
            processes,
            config,
        }
    }

    pub fn config(&self) -> &AxConfig {
        &self.config
    }

    pub async fn application(&self, ident: impl Into<AppIdent>) -> Result<Application, AppError> {
        Application::connect(self, ident.into()).await
    }
}

/// One element of a menu path
#[derive(Debug, Clone)]
pub enum MenuPath {
    /// Exact title
    Title(String),
    /// Title must contain a match
    Pattern(Regex),
}

impl MenuPath {
    fn criteria(&self) -> Criteria {
        match self {
            MenuPath::Title(title) => Criteria::new().equals("title", title.as_str()),
            MenuPath::Pattern(pattern) => Criteria::new().matching("title", pattern.clone()),
        }
    }
}

impl fmt::Display for MenuPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MenuPath::Title(title) => f.write_str(title),
            MenuPath::Pattern(pattern) => write!(f, "/{}/", pattern.as_str()),
        }
    }
}

impl From<&str> for MenuPath {
    fn from(title: &str) -> Self {
        MenuPath::Title(title.to_string())
    }
}

impl From<String> for MenuPath {
    fn from(title: String) -> Self {
        MenuPath::Title(title)
    }
}

impl From<Regex> for MenuPath {
    fn from(pattern: Regex) -> Self {
        MenuPath::Pattern(pattern)
    }
}

#[derive(Debug, Clone, Copy)]
enum AppState {
    Active,
    Hidden,
    Terminated,
}

#[derive(Debug, Clone, Copy)]
enum StateRequest {
    Terminate,
    ForceTerminate,
    Hide,
    Unhide,
}

impl StateRequest {
    fn target(self) -> (AppState, bool) {
        match self {
            StateRequest::Terminate | StateRequest::ForceTerminate => (AppState::Terminated, true),
            StateRequest::Hide => (AppState::Hidden, true),
            StateRequest::Unhide => (AppState::Active, true),
        }
    }
}

/// A running application
pub struct Application {
    node: Node,
    pid: Pid,
    processes: Arc<dyn ProcessControl>,
    config: AxConfig,
}

impl Application {
    /// Attach to a running application, launching it by bundle identifier
    /// when a name matches nothing that is running.
    pub async fn connect(desktop: &Desktop, ident: AppIdent) -> Result<Self, AppError> {
        let processes = &desktop.processes;
        let pid = match ident {
            AppIdent::Pid(pid) => pid,
            AppIdent::Named(name) => {
                if let Some(pid) = processes.running_with_bundle_id(&name).await? {
                    pid
                } else if let Some(pid) = processes.running_with_name(&name).await? {
                    pid
                } else {
                    Self::try_launch(desktop, &name).await?
                }
            }
        };

        let element = processes.application_element(pid).await?;
        let node = Node::new(desktop.transport.clone(), element)
            .with_search_options(desktop.config.search_options());
        info!(pid, element = %node.element(), "Connected to application");

        Ok(Self {
            node,
            pid,
            processes: processes.clone(),
            config: desktop.config.clone(),
        })
    }

    pub async fn dock(desktop: &Desktop) -> Result<Self, AppError> {
        desktop.application(DOCK_BUNDLE_ID).await
    }

    pub async fn finder(desktop: &Desktop) -> Result<Self, AppError> {
        desktop.application(FINDER_BUNDLE_ID).await
    }

    pub async fn notification_center(desktop: &Desktop) -> Result<Self, AppError> {
        desktop.application(NOTIFICATION_CENTER_BUNDLE_ID).await
    }

    /// The application currently receiving key events.
    pub async fn frontmost_application(desktop: &Desktop) -> Result<Self, AppError> {
        let pid = desktop
            .processes
            .frontmost()
            .await?
            .ok_or_else(|| AppError::NotFound("frontmost application".to_string()))?;
        desktop.application(pid).await
    }

    /// The application owning the menu bar, which need not be the frontmost one.
    pub async fn menu_bar_owner(desktop: &Desktop) -> Result<Self, AppError> {
        let pid = desktop
            .processes
            .menu_bar_owner()
            .await?
            .ok_or_else(|| AppError::NotFound("menu bar owner".to_string()))?;
        desktop.application(pid).await
    }

    async fn try_launch(desktop: &Desktop, bundle: &str) -> Result<Pid, AppError> {
        let attempts = desktop.config.app.launch_attempts;
        let delay = Duration::from_millis(desktop.config.app.launch_retry_delay_ms);

        for attempt in 1..=attempts {
            if let Some(pid) = desktop.processes.running_with_bundle_id(bundle).await? {
                return Ok(pid);
            }
            if !desktop.processes.launch(bundle).await? {
                return Err(AppError::UnknownBundle(bundle.to_string()));
            }
            debug!(bundle, attempt, attempts, "Launch requested");
            sleep(delay).await;
        }

        if let Some(pid) = desktop.processes.running_with_bundle_id(bundle).await? {
            return Ok(pid);
        }
        warn!(bundle, attempts, "Application did not start");
        Err(AppError::LaunchTimeout {
            bundle: bundle.to_string(),
            attempts,
        })
    }

    pub fn node(&self) -> &Node {
        &self.node
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub async fn bundle_identifier(&self) -> Result<Option<String>, AppError> {
        Ok(self.processes.bundle_identifier(self.pid).await?)
    }

    pub async fn title(&self) -> Result<String, AppError> {
        Ok(self.node.get_attribute("title").await?.to_text())
    }

    pub async fn is_active(&self) -> Result<bool, AppError> {
        Ok(self.read_state(AppState::Active).await?)
    }

    pub async fn is_hidden(&self) -> Result<bool, AppError> {
        Ok(self.read_state(AppState::Hidden).await?)
    }

    pub async fn is_terminated(&self) -> Result<bool, AppError> {
        Ok(self.read_state(AppState::Terminated).await?)
    }

    pub async fn terminate(&self) -> Result<bool, AppError> {
        self.change_state(StateRequest::Terminate).await
    }

    pub async fn force_terminate(&self) -> Result<bool, AppError> {
        self.change_state(StateRequest::ForceTerminate).await
    }

    pub async fn hide(&self) -> Result<bool, AppError> {
        self.change_state(StateRequest::Hide).await
    }

    pub async fn unhide(&self) -> Result<bool, AppError> {
        self.change_state(StateRequest::Unhide).await
    }

    /// Focus and visibility are always writable through the process controller.
    pub async fn is_writable(&self, name: &str) -> Result<bool, AppError> {
        match name.trim_end_matches('=') {
            "focused" | "focused?" | "hidden" | "hidden?" => Ok(true),
            _ => Ok(self.node.is_writable(name).await?),
        }
    }

    async fn read_state(&self, state: AppState) -> Result<bool, element_transport::TransportError> {
        match state {
            AppState::Active => self.processes.is_active(self.pid).await,
            AppState::Hidden => self.processes.is_hidden(self.pid).await,
            AppState::Terminated => self.processes.is_terminated(self.pid).await,
        }
    }

    /// Request a state change and wait for it; `true` once the state holds.
    async fn change_state(&self, request: StateRequest) -> Result<bool, AppError> {
        let (state, target) = request.target();
        if self.read_state(state).await? == target {
            return Ok(true);
        }

        let accepted = match request {
            StateRequest::Terminate => self.processes.terminate(self.pid).await?,
            StateRequest::ForceTerminate => self.processes.force_terminate(self.pid).await?,
            StateRequest::Hide => self.processes.hide(self.pid).await?,
            StateRequest::Unhide => self.processes.activate(self.pid).await?,
        };
        debug!(pid = self.pid, ?request, accepted, "State change requested");

        let reached = wait_for_state(self.config.state_change_options(), target, || {
            self.read_state(state)
        })
        .await?;
        if reached != target {
            warn!(pid = self.pid, ?request, "Application did not reach requested state");
        }
        Ok(reached == target)
    }

    /// Resolve a symbolic call, handling lifecycle names at the process level.
    ///
    /// State setters and actions report whether the state was reached as
    /// `Resolution::Performed`.
    pub async fn resolve(&self, name: &str, args: Vec<Arg>) -> Result<Resolution, AppError> {
        let resolution = match name {
            "focused" | "focused?" | "active" | "active?" => {
                Resolution::Value(Value::Bool(self.is_active().await?))
            }
            "hidden" | "hidden?" => Resolution::Value(Value::Bool(self.is_hidden().await?)),
            "terminated" | "terminated?" => {
                Resolution::Value(Value::Bool(self.is_terminated().await?))
            }
            "focused=" => {
                let reached = if bool_argument(name, &args)? {
                    self.unhide().await?
                } else {
                    self.hide().await?
                };
                Resolution::Performed(reached)
            }
            "hidden=" => {
                let reached = if bool_argument(name, &args)? {
                    self.hide().await?
                } else {
                    self.unhide().await?
                };
                Resolution::Performed(reached)
            }
            "terminate" => Resolution::Performed(self.terminate().await?),
            "force_terminate" => Resolution::Performed(self.force_terminate().await?),
            "hide" => Resolution::Performed(self.hide().await?),
            "unhide" => Resolution::Performed(self.unhide().await?),
            _ => self.node.resolve(name, args).await?,
        };
        Ok(resolution)
    }

    /// Open the menus along `path` and return the last item, unpressed.
    ///
    /// If a part cannot be found once the first menu is open, that menu is
    /// cancelled before the error is returned.
    pub async fn navigate_menu(&self, path: &[MenuPath]) -> Result<Node, AppError> {
        let (first, rest) = path.split_first().ok_or(AppError::EmptyMenuPath)?;
        self.unhide().await?;

        let bar = self
            .node
            .get_attribute("menu_bar")
            .await
            .map(|value| self.node.adopt_value(value))?
            .ok_or_else(|| AppError::NotFound("menu bar".to_string()))?;
        let bar_item = bar
            .find("menu_bar_item", first.criteria())
            .await?
            .ok_or_else(|| AppError::MenuItemNotFound {
                item: first.to_string(),
                parent: "menu bar".to_string(),
            })?;

        match walk_menu(&bar_item, first, rest).await {
            Ok(item) => Ok(item),
            Err(err) => {
                if let Err(cancel_err) = bar_item.perform_action("cancel").await {
                    warn!(error = %cancel_err, "Failed to close menu");
                }
                Err(err)
            }
        }
    }

    /// Navigate to a menu item and press it.
    pub async fn select_menu_item(&self, path: &[MenuPath]) -> Result<Node, AppError> {
        let item = self.navigate_menu(path).await?;
        item.perform_action("press").await?;
        info!(path = %display_path(path), "Selected menu item");
        Ok(item)
    }

    /// Current top-level windows.
    pub async fn windows(&self) -> Result<Vec<Node>, AppError> {
        if self.node.attribute_for("windows").await?.is_some() {
            let value = self.node.get_attribute("windows").await?;
            return Ok(value
                .into_elements()
                .into_iter()
                .map(|element| self.node.adopt(element))
                .collect());
        }
        let mut windows = Vec::new();
        for child in self.node.children().await? {
            if child.role().await?.as_deref() == Some(WINDOW_ROLE) {
                windows.push(child);
            }
        }
        Ok(windows)
    }

    /// Wait for a window that is not in `before`; `None` on timeout.
    pub async fn wait_for_new_window(&self, before: &[Node]) -> Result<Option<Node>, AppError> {
        wait_for(self.config.window_options(), move || async move {
            let current = self.windows().await?;
            Ok::<_, AppError>(current.into_iter().find(|window| !before.contains(window)))
        })
        .await
    }

    /// Open the application's About window and return it.
    pub async fn show_about_window(&self) -> Result<Option<Node>, AppError> {
        let before = self.windows().await?;
        let title = self.title().await?;
        let about = Regex::new("^About ")?;
        self.select_menu_item(&[MenuPath::Title(title), MenuPath::Pattern(about)])
            .await?;
        self.wait_for_new_window(&before).await
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("pid", &self.pid)
            .field("element", self.node.element())
            .finish()
    }
}

async fn walk_menu(bar_item: &Node, first: &MenuPath, rest: &[MenuPath]) -> Result<Node, AppError> {
    let mut item = bar_item.adopt(bar_item.element().clone());
    let mut parent = first.to_string();
    for part in rest {
        item.perform_action("press").await?;
        item = item
            .find("menu_item", part.criteria())
            .await?
            .ok_or_else(|| AppError::MenuItemNotFound {
                item: part.to_string(),
                parent: parent.clone(),
            })?;
        parent = part.to_string();
    }
    Ok(item)
}

fn bool_argument(name: &str, args: &[Arg]) -> Result<bool, AxError> {
    match args.first() {
        Some(Arg::Value(Value::Bool(value))) => Ok(*value),
        Some(_) => Err(AxError::invalid_argument(name, "expected a boolean")),
        None => Err(AxError::invalid_argument(name, "missing boolean argument")),
    }
}

fn display_path(path: &[MenuPath]) -> String {
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_path_display() {
        let path = [
            MenuPath::from("File"),
            MenuPath::from(Regex::new("^Export").unwrap()),
        ];
        assert_eq!(display_path(&path), "File > /^Export/");
    }

    #[test]
    fn test_bool_argument() {
        assert!(bool_argument("hidden=", &[Arg::Value(Value::Bool(true))]).unwrap());
        assert!(bool_argument("hidden=", &[Arg::Value(Value::from("yes"))]).is_err());
        assert!(bool_argument("hidden=", &[]).is_err());
    }

    #[test]
    fn test_state_requests_target() {
        assert!(matches!(
            StateRequest::Unhide.target(),
            (AppState::Active, true)
        ));
        assert!(matches!(
            StateRequest::ForceTerminate.target(),
            (AppState::Terminated, true)
        ));
    }
}
