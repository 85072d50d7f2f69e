//! In-memory collaborators for tests and demos
//!
//! `MockTree` is a mutable accessibility tree that counts every transport call
//! per operation; `MockProcesses` tracks application lifecycle state.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::error::TransportError;
use crate::process::{Pid, ProcessControl};
use crate::transport::ElementTransport;
use crate::value::{ElementRef, Value};

const CHILDREN: &str = "AXChildren";
const ROLE: &str = "AXRole";

pub type ParamHandler = Arc<dyn Fn(&Value) -> Value + Send + Sync>;
pub type ActionEffect = Arc<dyn Fn(&MockTree) + Send + Sync>;

/// Blueprint for one element in a `MockTree`
#[derive(Clone, Default)]
pub struct MockElement {
    attributes: Vec<(String, Value)>,
    writable: HashSet<String>,
    actions: Vec<String>,
    parameterized: Vec<(String, ParamHandler)>,
    pid: Pid,
}

impl MockElement {
    /// Element with an `AXRole` attribute.
    pub fn new(role: &str) -> Self {
        Self::default().attribute(ROLE, role)
    }

    pub fn attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
        self
    }

    pub fn writable_attribute(self, name: &str, value: impl Into<Value>) -> Self {
        let mut element = self.attribute(name, value);
        element.writable.insert(name.to_string());
        element
    }

    pub fn action(mut self, name: &str) -> Self {
        if !self.actions.iter().any(|a| a == name) {
            self.actions.push(name.to_string());
        }
        self
    }

    pub fn parameterized<F>(mut self, name: &str, handler: F) -> Self
    where
        F: Fn(&Value) -> Value + Send + Sync + 'static,
    {
        self.parameterized.push((name.to_string(), Arc::new(handler)));
        self
    }

    /// Advertise the children attribute even while no children exist.
    pub fn container(self) -> Self {
        self.attribute(CHILDREN, Value::Array(Vec::new()))
    }

    pub fn pid(mut self, pid: Pid) -> Self {
        self.pid = pid;
        self
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|(n, _)| n == name)
    }
}

struct Entry {
    element: MockElement,
    parent: Option<u64>,
    children: Vec<u64>,
}

/// Snapshot of per-operation call counts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list_attributes: usize,
    pub list_actions: usize,
    pub list_parameterized_attributes: usize,
    pub read_attribute: usize,
    pub write_attribute: usize,
    pub is_attribute_writable: usize,
    pub invoke_action: usize,
    pub read_parameterized_attribute: usize,
    pub children_of: usize,
}

#[derive(Default)]
struct CallCounters {
    list_attributes: AtomicUsize,
    list_actions: AtomicUsize,
    list_parameterized_attributes: AtomicUsize,
    read_attribute: AtomicUsize,
    write_attribute: AtomicUsize,
    is_attribute_writable: AtomicUsize,
    invoke_action: AtomicUsize,
    read_parameterized_attribute: AtomicUsize,
    children_of: AtomicUsize,
}

fn bump(counter: &AtomicUsize) {
    counter.fetch_add(1, Ordering::SeqCst);
}

/// Mutable in-memory accessibility tree implementing `ElementTransport`
#[derive(Default)]
pub struct MockTree {
    entries: RwLock<HashMap<u64, Entry>>,
    effects: RwLock<HashMap<(u64, String), ActionEffect>>,
    invocations: Mutex<Vec<(ElementRef, String)>>,
    next_id: AtomicU64,
    counters: CallCounters,
}

impl MockTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_root(&self, element: MockElement) -> ElementRef {
        self.insert(None, element)
    }

    /// Append `element` as the last child of `parent`.
    pub fn add_child(&self, parent: &ElementRef, element: MockElement) -> ElementRef {
        self.insert(Some(parent.id()), element)
    }

    fn insert(&self, parent: Option<u64>, element: MockElement) -> ElementRef {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let mut entries = self.entries.write();
        let parent = parent.filter(|p| entries.contains_key(p));
        if let Some(parent_id) = parent {
            if let Some(entry) = entries.get_mut(&parent_id) {
                entry.children.push(id);
                if !entry.element.has_attribute(CHILDREN) {
                    entry
                        .element
                        .attributes
                        .push((CHILDREN.to_string(), Value::Array(Vec::new())));
                }
            }
        }
        entries.insert(
            id,
            Entry {
                element,
                parent,
                children: Vec::new(),
            },
        );
        ElementRef::new(id)
    }

    /// Destroy `element` and its subtree; later calls against them fail.
    pub fn remove(&self, element: &ElementRef) {
        let mut entries = self.entries.write();
        let parent = entries.get(&element.id()).and_then(|e| e.parent);
        if let Some(parent_entry) = parent.and_then(|p| entries.get_mut(&p)) {
            parent_entry.children.retain(|c| *c != element.id());
        }
        let mut pending = vec![element.id()];
        while let Some(id) = pending.pop() {
            if let Some(entry) = entries.remove(&id) {
                pending.extend(entry.children);
            }
        }
    }

    /// Change an attribute value behind the engine's back.
    pub fn set_value(&self, element: &ElementRef, name: &str, value: impl Into<Value>) {
        let value = value.into();
        if let Some(entry) = self.entries.write().get_mut(&element.id()) {
            let current = std::mem::take(&mut entry.element);
            entry.element = current.attribute(name, value);
        }
    }

    /// Run `effect` whenever `action` is invoked on `element`.
    pub fn on_action<F>(&self, element: &ElementRef, action: &str, effect: F)
    where
        F: Fn(&MockTree) + Send + Sync + 'static,
    {
        self.effects
            .write()
            .insert((element.id(), action.to_string()), Arc::new(effect));
    }

    pub fn contains(&self, element: &ElementRef) -> bool {
        self.entries.read().contains_key(&element.id())
    }

    pub fn calls(&self) -> CallCounts {
        let c = &self.counters;
        let load = |counter: &AtomicUsize| counter.load(Ordering::SeqCst);
        CallCounts {
            list_attributes: load(&c.list_attributes),
            list_actions: load(&c.list_actions),
            list_parameterized_attributes: load(&c.list_parameterized_attributes),
            read_attribute: load(&c.read_attribute),
            write_attribute: load(&c.write_attribute),
            is_attribute_writable: load(&c.is_attribute_writable),
            invoke_action: load(&c.invoke_action),
            read_parameterized_attribute: load(&c.read_parameterized_attribute),
            children_of: load(&c.children_of),
        }
    }

    /// Actions invoked so far, in order.
    pub fn invocations(&self) -> Vec<(ElementRef, String)> {
        self.invocations.lock().clone()
    }

    fn with_entry<T>(
        &self,
        element: &ElementRef,
        f: impl FnOnce(&Entry) -> Result<T, TransportError>,
    ) -> Result<T, TransportError> {
        let entries = self.entries.read();
        let entry = entries
            .get(&element.id())
            .ok_or_else(|| TransportError::invalid(element))?;
        f(entry)
    }
}

#[async_trait]
impl ElementTransport for MockTree {
    async fn list_attributes(&self, element: &ElementRef) -> Result<Vec<String>, TransportError> {
        bump(&self.counters.list_attributes);
        self.with_entry(element, |entry| {
            Ok(entry
                .element
                .attributes
                .iter()
                .map(|(name, _)| name.clone())
                .collect())
        })
    }

    async fn list_actions(&self, element: &ElementRef) -> Result<Vec<String>, TransportError> {
        bump(&self.counters.list_actions);
        self.with_entry(element, |entry| Ok(entry.element.actions.clone()))
    }

    async fn list_parameterized_attributes(
        &self,
        element: &ElementRef,
    ) -> Result<Vec<String>, TransportError> {
        bump(&self.counters.list_parameterized_attributes);
        self.with_entry(element, |entry| {
            Ok(entry
                .element
                .parameterized
                .iter()
                .map(|(name, _)| name.clone())
                .collect())
        })
    }

    async fn read_attribute(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<Value, TransportError> {
        bump(&self.counters.read_attribute);
        self.with_entry(element, |entry| {
            if name == CHILDREN && entry.element.has_attribute(CHILDREN) {
                let children = entry
                    .children
                    .iter()
                    .map(|id| Value::Element(ElementRef::new(*id)))
                    .collect();
                return Ok(Value::Array(children));
            }
            entry
                .element
                .attributes
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, value)| value.clone())
                .ok_or_else(|| TransportError::unsupported(element, name))
        })
    }

    async fn write_attribute(
        &self,
        element: &ElementRef,
        name: &str,
        value: Value,
    ) -> Result<Value, TransportError> {
        bump(&self.counters.write_attribute);
        let mut entries = self.entries.write();
        let entry = entries
            .get_mut(&element.id())
            .ok_or_else(|| TransportError::invalid(element))?;
        if !entry.element.writable.contains(name) {
            return Err(TransportError::PermissionDenied(format!(
                "{name} is read-only on {element}"
            )));
        }
        let current = std::mem::take(&mut entry.element);
        entry.element = current.attribute(name, value.clone());
        debug!(%element, name, "mock attribute written");
        Ok(value)
    }

    async fn is_attribute_writable(
        &self,
        element: &ElementRef,
        name: &str,
    ) -> Result<bool, TransportError> {
        bump(&self.counters.is_attribute_writable);
        self.with_entry(element, |entry| {
            if !entry.element.has_attribute(name) {
                return Err(TransportError::unsupported(element, name));
            }
            Ok(entry.element.writable.contains(name))
        })
    }

    async fn invoke_action(&self, element: &ElementRef, name: &str) -> Result<bool, TransportError> {
        bump(&self.counters.invoke_action);
        self.with_entry(element, |entry| {
            if entry.element.actions.iter().any(|a| a == name) {
                Ok(())
            } else {
                Err(TransportError::unsupported(element, name))
            }
        })?;
        self.invocations
            .lock()
            .push((element.clone(), name.to_string()));
        let effect = self
            .effects
            .read()
            .get(&(element.id(), name.to_string()))
            .cloned();
        if let Some(effect) = effect {
            effect(self);
        }
        Ok(true)
    }

    async fn read_parameterized_attribute(
        &self,
        element: &ElementRef,
        name: &str,
        param: Value,
    ) -> Result<Value, TransportError> {
        bump(&self.counters.read_parameterized_attribute);
        let handler = self.with_entry(element, |entry| {
            entry
                .element
                .parameterized
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, handler)| handler.clone())
                .ok_or_else(|| TransportError::unsupported(element, name))
        })?;
        Ok(handler(&param))
    }

    async fn children_of(&self, element: &ElementRef) -> Result<Vec<ElementRef>, TransportError> {
        bump(&self.counters.children_of);
        self.with_entry(element, |entry| {
            Ok(entry.children.iter().map(|id| ElementRef::new(*id)).collect())
        })
    }

    async fn pid_of(&self, element: &ElementRef) -> Result<i32, TransportError> {
        self.with_entry(element, |entry| Ok(entry.element.pid))
    }
}

/// Lifecycle state of one mock application
#[derive(Clone, Debug)]
pub struct MockApp {
    pub bundle_id: String,
    pub name: String,
    pub element: ElementRef,
    pub active: bool,
    pub hidden: bool,
    pub terminated: bool,
    /// When false, state requests are accepted but never take effect.
    pub responsive: bool,
}

impl MockApp {
    pub fn new(bundle_id: &str, name: &str, element: ElementRef) -> Self {
        Self {
            bundle_id: bundle_id.to_string(),
            name: name.to_string(),
            element,
            active: false,
            hidden: false,
            terminated: false,
            responsive: true,
        }
    }

    pub fn unresponsive(mut self) -> Self {
        self.responsive = false;
        self
    }
}

struct Installed {
    app: MockApp,
    launches_needed: u32,
}

/// In-memory process table implementing `ProcessControl`
#[derive(Default)]
pub struct MockProcesses {
    apps: RwLock<BTreeMap<Pid, MockApp>>,
    installed: RwLock<HashMap<String, Installed>>,
    next_pid: AtomicI32,
    launches: AtomicUsize,
    menu_bar_owner: RwLock<Option<Pid>>,
}

impl MockProcesses {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_running(&self, app: MockApp) -> Pid {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst) + 100;
        self.apps.write().insert(pid, app);
        pid
    }

    /// Hand the menu bar to `pid` regardless of which app is frontmost.
    pub fn set_menu_bar_owner(&self, pid: Pid) {
        *self.menu_bar_owner.write() = Some(pid);
    }

    /// Register a launchable bundle that starts running after
    /// `launches_needed` launch requests.
    pub fn install(&self, app: MockApp, launches_needed: u32) {
        self.installed.write().insert(
            app.bundle_id.clone(),
            Installed {
                app,
                launches_needed,
            },
        );
    }

    pub fn app(&self, pid: Pid) -> Option<MockApp> {
        self.apps.read().get(&pid).cloned()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    fn state<T>(&self, pid: Pid, f: impl FnOnce(&MockApp) -> T) -> Result<T, TransportError> {
        self.apps
            .read()
            .get(&pid)
            .map(f)
            .ok_or_else(|| TransportError::InvalidReference(format!("pid {pid}")))
    }

    fn request(&self, pid: Pid, f: impl FnOnce(&mut MockApp)) -> Result<bool, TransportError> {
        let mut apps = self.apps.write();
        let app = apps
            .get_mut(&pid)
            .ok_or_else(|| TransportError::InvalidReference(format!("pid {pid}")))?;
        if app.responsive {
            f(app);
        }
        Ok(true)
    }
}

#[async_trait]
impl ProcessControl for MockProcesses {
    async fn running_with_bundle_id(&self, bundle_id: &str) -> Result<Option<Pid>, TransportError> {
        Ok(self
            .apps
            .read()
            .iter()
            .find(|(_, app)| app.bundle_id == bundle_id && !app.terminated)
            .map(|(pid, _)| *pid))
    }

    async fn running_with_name(&self, name: &str) -> Result<Option<Pid>, TransportError> {
        Ok(self
            .apps
            .read()
            .iter()
            .find(|(_, app)| app.name == name && !app.terminated)
            .map(|(pid, _)| *pid))
    }

    async fn launch(&self, bundle_id: &str) -> Result<bool, TransportError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        let ready = {
            let mut installed = self.installed.write();
            let Some(entry) = installed.get_mut(bundle_id) else {
                return Ok(false);
            };
            entry.launches_needed = entry.launches_needed.saturating_sub(1);
            if entry.launches_needed == 0 {
                installed.remove(bundle_id).map(|entry| entry.app)
            } else {
                None
            }
        };
        if let Some(app) = ready {
            self.add_running(app);
        }
        Ok(true)
    }

    async fn frontmost(&self) -> Result<Option<Pid>, TransportError> {
        Ok(self
            .apps
            .read()
            .iter()
            .find(|(_, app)| app.active && !app.terminated)
            .map(|(pid, _)| *pid))
    }

    async fn menu_bar_owner(&self) -> Result<Option<Pid>, TransportError> {
        let owner = *self.menu_bar_owner.read();
        let running = owner.filter(|pid| {
            self.apps
                .read()
                .get(pid)
                .map_or(false, |app| !app.terminated)
        });
        match running {
            Some(pid) => Ok(Some(pid)),
            None => self.frontmost().await,
        }
    }

    async fn application_element(&self, pid: Pid) -> Result<ElementRef, TransportError> {
        self.state(pid, |app| app.element.clone())
    }

    async fn bundle_identifier(&self, pid: Pid) -> Result<Option<String>, TransportError> {
        self.state(pid, |app| Some(app.bundle_id.clone()))
    }

    async fn is_active(&self, pid: Pid) -> Result<bool, TransportError> {
        self.state(pid, |app| app.active)
    }

    async fn is_hidden(&self, pid: Pid) -> Result<bool, TransportError> {
        self.state(pid, |app| app.hidden)
    }

    async fn is_terminated(&self, pid: Pid) -> Result<bool, TransportError> {
        self.state(pid, |app| app.terminated)
    }

    async fn activate(&self, pid: Pid) -> Result<bool, TransportError> {
        let accepted = self.request(pid, |app| {
            app.active = true;
            app.hidden = false;
        })?;
        if self.apps.read().get(&pid).map_or(false, |app| app.active) {
            for (other, app) in self.apps.write().iter_mut() {
                if *other != pid {
                    app.active = false;
                }
            }
        }
        Ok(accepted)
    }

    async fn hide(&self, pid: Pid) -> Result<bool, TransportError> {
        self.request(pid, |app| {
            app.hidden = true;
            app.active = false;
        })
    }

    async fn terminate(&self, pid: Pid) -> Result<bool, TransportError> {
        self.request(pid, |app| {
            app.terminated = true;
            app.active = false;
        })
    }

    async fn force_terminate(&self, pid: Pid) -> Result<bool, TransportError> {
        let mut apps = self.apps.write();
        let app = apps
            .get_mut(&pid)
            .ok_or_else(|| TransportError::InvalidReference(format!("pid {pid}")))?;
        app.terminated = true;
        app.active = false;
        Ok(true)
    }
}
