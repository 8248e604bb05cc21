//! # Filter Registry
//!
//! [`ManagerState`] owns every filter of a module. It is shared between the
//! [`GraphicsFilterModule`](crate::api::GraphicsFilterModule) facade (strong
//! `Rc`) and the filters themselves (`Weak` back-reference), so a filter can
//! report its own changes without the caller threading the module around.
//!
//! ## Name Index
//!
//! Filters are indexed by name in a `BTreeMap`, which also gives listings a
//! stable, sorted order. The index holds one strong reference per filter. An
//! unmanaged filter leaves the index as soon as the index holds the last
//! reference to it (see `GraphicsFilter`'s `Drop`).
//!
//! ## Change Caching
//!
//! Every change marks the filter's pending [`ChangeFlags`] and, the first time,
//! queues it on the changed list. While the cache depth is zero the queue is
//! flushed immediately; otherwise it waits for the outermost `end_cache`.
//!
//! A flush builds one [`ChangeMessage`]:
//!
//! 1. composites depending on a filter whose result changed get `DEPENDENCY`
//! 2. each queued filter contributes one `FilterChange`, and its flags reset
//! 3. filters removed since the last flush are appended
//!
//! Listeners then run with further flushing suppressed. Anything they change is
//! collected and delivered in a follow-up message once they all returned.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use crate::change::{ChangeFlags, ChangeMessage, FilterChange, ListenerId};
use crate::config::FilterModuleConfig;
use crate::error::{FilterError, Result};
use crate::filter::{Criterion, FilterDefinition, FilterObject, GraphicsFilter};
use crate::validation::validate_filter_name;

pub(crate) type Listener = Box<dyn FnMut(&ChangeMessage)>;

pub(crate) struct ManagerState {
    config: FilterModuleConfig,
    objects: RefCell<BTreeMap<String, Rc<FilterObject>>>,
    cache_depth: Cell<u32>,
    changed: RefCell<Vec<Weak<FilterObject>>>,
    removed: RefCell<Vec<FilterChange>>,
    dispatching: Cell<bool>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    // Listeners currently taken out for dispatch, and those removed meanwhile.
    dispatch_ids: RefCell<Vec<ListenerId>>,
    unsubscribed: RefCell<Vec<ListenerId>>,
    next_listener: Cell<u64>,
    default_filter: RefCell<Option<GraphicsFilter>>,
}

impl ManagerState {
    pub(crate) fn new(config: FilterModuleConfig) -> Self {
        Self {
            config,
            objects: RefCell::new(BTreeMap::new()),
            cache_depth: Cell::new(0),
            changed: RefCell::new(Vec::new()),
            removed: RefCell::new(Vec::new()),
            dispatching: Cell::new(false),
            listeners: RefCell::new(Vec::new()),
            dispatch_ids: RefCell::new(Vec::new()),
            unsubscribed: RefCell::new(Vec::new()),
            next_listener: Cell::new(1),
            default_filter: RefCell::new(None),
        }
    }

    pub(crate) fn config(&self) -> &FilterModuleConfig {
        &self.config
    }

    pub(crate) fn len(&self) -> usize {
        self.objects.borrow().len()
    }

    pub(crate) fn holds(&self, object: &Rc<FilterObject>) -> bool {
        let name = object.name.borrow();
        self.objects
            .borrow()
            .get(name.as_str())
            .is_some_and(|held| Rc::ptr_eq(held, object))
    }

    pub(crate) fn contains_name(&self, name: &str) -> bool {
        self.objects.borrow().contains_key(name)
    }

    /// First unused `<prefix><N>`, counting up from the number of filters + 1.
    pub(crate) fn temp_name(&self) -> String {
        let prefix = &self.config.temp_name_prefix;
        let mut number = self.len() + 1;
        loop {
            let candidate = format!("{}{}", prefix, number);
            if !self.contains_name(&candidate) {
                return candidate;
            }
            number += 1;
        }
    }

    /// Create a filter under a validated, unused `name`, or a temporary name.
    pub(crate) fn create(
        self: &Rc<Self>,
        name: Option<&str>,
        definition: FilterDefinition,
    ) -> Result<GraphicsFilter> {
        let name = match name {
            Some(name) => {
                validate_filter_name(name)?;
                if self.contains_name(name) {
                    return Err(FilterError::DuplicateName(name.to_string()));
                }
                name.to_string()
            }
            None => self.temp_name(),
        };
        Ok(self.insert(name, definition))
    }

    pub(crate) fn create_temporary(
        self: &Rc<Self>,
        definition: FilterDefinition,
    ) -> GraphicsFilter {
        let name = self.temp_name();
        self.insert(name, definition)
    }

    fn insert(self: &Rc<Self>, name: String, definition: FilterDefinition) -> GraphicsFilter {
        let object = Rc::new(FilterObject::new(name.clone(), definition, Rc::downgrade(self)));
        log::debug!("adding graphics filter '{}' ({})", name, object.kind());
        self.objects.borrow_mut().insert(name, Rc::clone(&object));
        self.object_changed(&object, ChangeFlags::ADD);
        GraphicsFilter::from_object(object)
    }

    pub(crate) fn find(&self, name: &str) -> Option<GraphicsFilter> {
        self.objects
            .borrow()
            .get(name)
            .map(|object| GraphicsFilter::from_object(Rc::clone(object)))
    }

    pub(crate) fn names(&self) -> Vec<String> {
        self.objects.borrow().keys().cloned().collect()
    }

    pub(crate) fn filters(&self) -> Vec<GraphicsFilter> {
        self.objects
            .borrow()
            .values()
            .map(|object| GraphicsFilter::from_object(Rc::clone(object)))
            .collect()
    }

    /// Rename `object`, keeping the index consistent.
    ///
    /// The object leaves the index, the new name is checked against the rest,
    /// and the object goes back in under whichever name survived.
    pub(crate) fn rename(&self, object: &Rc<FilterObject>, new_name: &str) -> Result<()> {
        validate_filter_name(new_name)?;
        let old_name = object.name();
        if old_name == new_name {
            return Ok(());
        }
        if !self.holds(object) {
            *object.name.borrow_mut() = new_name.to_string();
            return Ok(());
        }

        {
            let mut objects = self.objects.borrow_mut();
            let held = objects.remove(&old_name);
            if objects.contains_key(new_name) {
                if let Some(held) = held {
                    objects.insert(old_name, held);
                }
                return Err(FilterError::DuplicateName(new_name.to_string()));
            }
            *object.name.borrow_mut() = new_name.to_string();
            if let Some(held) = held {
                objects.insert(new_name.to_string(), held);
            }
        }

        log::debug!("renamed graphics filter '{}' to '{}'", old_name, new_name);
        self.object_changed(object, ChangeFlags::IDENTIFIER);
        Ok(())
    }

    pub(crate) fn object_changed(&self, object: &Rc<FilterObject>, change: ChangeFlags) {
        let status = object.change_status.get();
        if status.is_empty() {
            self.changed.borrow_mut().push(Rc::downgrade(object));
        }
        object.change_status.set(status | change);
        if self.cache_depth.get() == 0 {
            self.flush();
        }
    }

    /// Drop an unmanaged filter nobody outside the index holds anymore.
    pub(crate) fn release_unused(&self, object: &Rc<FilterObject>) {
        if object.is_managed() || !self.holds(object) {
            return;
        }
        let name = object.name();
        let removed = self.objects.borrow_mut().remove(&name);
        log::debug!("removing unused graphics filter '{}'", name);

        let status = object.change_status.replace(ChangeFlags::empty());
        self.changed
            .borrow_mut()
            .retain(|pending| !std::ptr::eq(pending.as_ptr(), Rc::as_ptr(object)));
        // Added and removed before anyone heard about it.
        if !status.contains(ChangeFlags::ADD) {
            self.removed.borrow_mut().push(FilterChange {
                name,
                kind: object.kind(),
                flags: status | ChangeFlags::REMOVE,
            });
            if self.cache_depth.get() == 0 {
                self.flush();
            }
        }
        drop(removed);
    }

    pub(crate) fn is_caching(&self) -> bool {
        self.cache_depth.get() > 0
    }

    pub(crate) fn begin_cache(&self) {
        self.cache_depth.set(self.cache_depth.get() + 1);
    }

    pub(crate) fn end_cache(&self) -> Result<()> {
        match self.cache_depth.get() {
            0 => {
                log::warn!("end_change called without a matching begin_change");
                Err(FilterError::CacheNotActive)
            }
            depth => {
                self.cache_depth.set(depth - 1);
                if depth == 1 {
                    self.flush();
                }
                Ok(())
            }
        }
    }

    fn flush(&self) {
        if self.dispatching.get() {
            return;
        }
        loop {
            let message = self.collect_changes();
            if message.is_empty() {
                return;
            }
            log::debug!(
                "delivering {} graphics filter change(s): {:?}",
                message.changes.len(),
                message.summary
            );
            self.dispatching.set(true);
            self.dispatch(&message);
            self.dispatching.set(false);
        }
    }

    fn collect_changes(&self) -> ChangeMessage {
        let mut pending: Vec<Rc<FilterObject>> = self
            .changed
            .take()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        let removed = self.removed.take();

        let result_changed: Vec<Rc<FilterObject>> = pending
            .iter()
            .filter(|object| object.change_status.get().contains(ChangeFlags::RESULT))
            .cloned()
            .collect();
        if !result_changed.is_empty() {
            let all: Vec<Rc<FilterObject>> = self.objects.borrow().values().cloned().collect();
            for object in all {
                let status = object.change_status.get();
                if !object.kind().is_operator() || status.contains(ChangeFlags::RESULT) {
                    continue;
                }
                let depends = result_changed.iter().any(|changed| {
                    !Rc::ptr_eq(changed, &object) && object.depends_on(changed)
                });
                if depends {
                    if status.is_empty() {
                        pending.push(Rc::clone(&object));
                    }
                    object.change_status.set(status | ChangeFlags::DEPENDENCY);
                }
            }
        }

        let mut message = ChangeMessage::default();
        for object in &pending {
            let flags = object.change_status.replace(ChangeFlags::empty());
            if flags.is_empty() {
                continue;
            }
            message.push(FilterChange {
                name: object.name(),
                kind: object.kind(),
                flags,
            });
        }
        for change in removed {
            message.push(change);
        }
        message
    }

    fn dispatch(&self, message: &ChangeMessage) {
        let mut listeners = self.listeners.take();
        *self.dispatch_ids.borrow_mut() = listeners.iter().map(|(id, _)| *id).collect();

        for (id, listener) in listeners.iter_mut() {
            if self.unsubscribed.borrow().contains(id) {
                continue;
            }
            log::trace!("notifying graphics filter listener {:?}", id);
            listener(message);
        }

        self.dispatch_ids.borrow_mut().clear();
        let unsubscribed = self.unsubscribed.take();
        // Listeners registered during dispatch go after the existing ones.
        listeners.extend(self.listeners.take());
        let (kept, dropped): (Vec<_>, Vec<_>) = listeners
            .into_iter()
            .partition(|(id, _)| !unsubscribed.contains(id));
        *self.listeners.borrow_mut() = kept;
        // Dropping a listener may release the filters it captured.
        drop(dropped);
    }

    pub(crate) fn add_listener(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, listener));
        id
    }

    pub(crate) fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = {
            let mut listeners = self.listeners.borrow_mut();
            let pos = listeners
                .iter()
                .position(|(listener_id, _)| *listener_id == id);
            pos.map(|pos| listeners.remove(pos))
        };
        if removed.is_some() {
            return true;
        }
        if self.dispatch_ids.borrow().contains(&id) && !self.unsubscribed.borrow().contains(&id) {
            self.unsubscribed.borrow_mut().push(id);
            return true;
        }
        false
    }

    /// The module's default filter, created on first use.
    pub(crate) fn default_filter(self: &Rc<Self>) -> GraphicsFilter {
        let current = self.default_filter.borrow().clone();
        if let Some(filter) = current {
            return filter;
        }
        let name = self.config.default_filter_name.clone();
        let filter = match self.find(&name) {
            Some(existing) => existing,
            None => self.insert(name, FilterDefinition::Leaf(Criterion::VisibilityFlags)),
        };
        filter.set_managed(true);
        *self.default_filter.borrow_mut() = Some(filter.clone());
        filter
    }

    pub(crate) fn set_default_filter(&self, filter: Option<&GraphicsFilter>) {
        let previous = self.default_filter.replace(filter.cloned());
        drop(previous);
    }
}
