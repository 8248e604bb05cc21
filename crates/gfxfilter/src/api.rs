//! # API Facade
//!
//! [`GraphicsFilterModule`] is the single entry point for everything outside
//! the crate: the scene pipeline that evaluates filters, and any command or
//! scripting front end that defines them.
//!
//! ## Role and Responsibilities
//!
//! The facade:
//! - **Creates** filters (one factory per kind, each returning a fresh handle)
//! - **Looks up** filters by name
//! - **Brackets** changes so listeners see one coalesced message
//! - **Dispatches** to the command layer (`define`, `list`)
//!
//! Filter behaviour itself (evaluation, operands, flags) lives on
//! [`GraphicsFilter`] and [`OperatorFilter`](crate::filter::OperatorFilter).
//!
//! ## Change Brackets
//!
//! ```
//! use gfxfilter::api::GraphicsFilterModule;
//!
//! let module = GraphicsFilterModule::new();
//! let filter = module.create_visibility_flags_filter();
//! {
//!     let _cache = module.change_cache();
//!     filter.set_inverse(true);
//!     filter.set_name("hidden").unwrap();
//! } // one message, carrying RESULT | IDENTIFIER for "hidden"
//! ```
//!
//! `begin_change`/`end_change` do the same without a guard; brackets nest and
//! only the outermost `end_change` delivers.
//!
//! ## Cloning
//!
//! A module is a cheap handle; clones share the same filters.

use std::rc::Rc;

use crate::attributes::FilterAttribute;
use crate::change::{ChangeMessage, ListenerId};
use crate::commands::{self, CmdResult, DefineRequest};
use crate::config::FilterModuleConfig;
use crate::error::{FilterError, Result};
use crate::filter::{Criterion, FilterDefinition, GraphicsFilter, Operator};
use crate::manager::ManagerState;
use crate::model::{DomainType, GraphicType, RegionPath};

#[derive(Clone)]
pub struct GraphicsFilterModule {
    state: Rc<ManagerState>,
}

impl Default for GraphicsFilterModule {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsFilterModule {
    pub fn new() -> Self {
        Self::with_config(FilterModuleConfig::default())
    }

    pub fn with_config(config: FilterModuleConfig) -> Self {
        Self {
            state: Rc::new(ManagerState::new(config)),
        }
    }

    pub fn config(&self) -> &FilterModuleConfig {
        self.state.config()
    }

    pub fn create_graphic_name_filter(&self, match_name: &str) -> GraphicsFilter {
        self.create_temporary(FilterDefinition::Leaf(Criterion::GraphicName(
            match_name.to_string(),
        )))
    }

    pub fn create_visibility_flags_filter(&self) -> GraphicsFilter {
        self.create_temporary(FilterDefinition::Leaf(Criterion::VisibilityFlags))
    }

    pub fn create_region_filter(&self, region: impl Into<RegionPath>) -> GraphicsFilter {
        self.create_temporary(FilterDefinition::Leaf(Criterion::Region(region.into())))
    }

    pub fn create_graphic_type_filter(&self, graphic_type: GraphicType) -> GraphicsFilter {
        self.create_temporary(FilterDefinition::Leaf(Criterion::GraphicType(graphic_type)))
    }

    pub fn create_domain_type_filter(&self, domain_type: DomainType) -> GraphicsFilter {
        self.create_temporary(FilterDefinition::Leaf(Criterion::DomainType(domain_type)))
    }

    pub fn create_and_filter(&self) -> GraphicsFilter {
        self.create_temporary(FilterDefinition::Operator(Operator::And))
    }

    pub fn create_or_filter(&self) -> GraphicsFilter {
        self.create_temporary(FilterDefinition::Operator(Operator::Or))
    }

    /// Create a filter of any kind, under `name` or a generated `temp<N>`.
    pub fn create_filter(
        &self,
        name: Option<&str>,
        definition: FilterDefinition,
    ) -> Result<GraphicsFilter> {
        self.state.create(name, definition)
    }

    fn create_temporary(&self, definition: FilterDefinition) -> GraphicsFilter {
        self.state.create_temporary(definition)
    }

    pub fn find_by_name(&self, name: &str) -> Option<GraphicsFilter> {
        self.state.find(name)
    }

    /// Like [`find_by_name`](Self::find_by_name), failing with `NotFound`.
    pub fn find_filter(&self, name: &str) -> Result<GraphicsFilter> {
        self.find_by_name(name)
            .ok_or_else(|| FilterError::NotFound(name.to_string()))
    }

    pub fn filter_names(&self) -> Vec<String> {
        self.state.names()
    }

    /// Every filter, in name order.
    pub fn filters(&self) -> Vec<GraphicsFilter> {
        self.state.filters()
    }

    pub fn len(&self) -> usize {
        self.state.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn rename(&self, filter: &GraphicsFilter, new_name: &str) -> Result<()> {
        filter.set_name(new_name)
    }

    pub fn set_managed(&self, filter: &GraphicsFilter, managed: bool) {
        filter.set_managed(managed);
    }

    pub fn begin_change(&self) {
        self.state.begin_cache();
    }

    pub fn end_change(&self) -> Result<()> {
        self.state.end_cache()
    }

    pub fn is_caching(&self) -> bool {
        self.state.is_caching()
    }

    /// Begin a change bracket that ends when the guard is dropped.
    pub fn change_cache(&self) -> ChangeCache<'_> {
        self.begin_change();
        ChangeCache { module: self }
    }

    /// The default filter, created on first use as a managed visibility
    /// flags filter named by `default_filter_name`.
    pub fn default_filter(&self) -> GraphicsFilter {
        self.state.default_filter()
    }

    /// Replace the default filter; `None` resets to the configured one.
    pub fn set_default_filter(&self, filter: Option<&GraphicsFilter>) {
        self.state.set_default_filter(filter);
    }

    pub fn get_attribute_integer(
        &self,
        filter: &GraphicsFilter,
        attribute: FilterAttribute,
    ) -> i32 {
        attribute.get_integer(filter)
    }

    pub fn set_attribute_integer(
        &self,
        filter: &GraphicsFilter,
        attribute: FilterAttribute,
        value: i32,
    ) {
        attribute.set_integer(filter, value);
    }

    /// Register `listener` for every change message from now on.
    pub fn add_listener<F>(&self, listener: F) -> ListenerId
    where
        F: FnMut(&ChangeMessage) + 'static,
    {
        self.state.add_listener(Box::new(listener))
    }

    /// Returns `false` if `id` was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.state.remove_listener(id)
    }

    pub fn define(&self, request: &DefineRequest) -> Result<CmdResult> {
        commands::define::run(self, request)
    }

    pub fn list(&self, name: Option<&str>) -> Result<CmdResult> {
        commands::list::run(self, name)
    }
}

/// Guard returned by [`GraphicsFilterModule::change_cache`].
#[must_use = "the change bracket ends as soon as the guard is dropped"]
pub struct ChangeCache<'a> {
    module: &'a GraphicsFilterModule,
}

impl Drop for ChangeCache<'_> {
    fn drop(&mut self) {
        // Cannot fail: the guard's own begin_change is still open.
        let _ = self.module.end_change();
    }
}
