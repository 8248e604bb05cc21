//! # Graphics Filters
//!
//! A graphics filter is a named predicate over a [`Graphic`]: given a graphic it
//! answers "show it" or "don't". Filters come in two flavours:
//!
//! - **Leaf filters** test one property of the graphic, described by a
//!   [`Criterion`] (its name, visibility flags, region, graphic type or domain
//!   type).
//! - **Operator filters** combine an ordered list of operand filters with AND or
//!   OR semantics. See [`operator`].
//!
//! Every filter also carries an `inverse` flag which negates its final result:
//!
//! ```text
//! evaluate(graphic) = inverse XOR raw_match(graphic)
//! ```
//!
//! ## Ownership
//!
//! A [`GraphicsFilter`] is a shared handle. Cloning it retains the filter,
//! dropping it releases it. The owning module keeps its own slot in the name
//! index, so a filter lives as long as anyone holds a handle to it, or forever
//! while it is *managed*. When the last outside handle of an unmanaged filter
//! goes away the module drops the filter from its index.
//!
//! Operator filters hold handles to their operands, so an operand stays alive
//! for as long as any operator uses it.
//!
//! ## Fixed Kind
//!
//! The [`FilterKind`] of a filter is decided when it is created and never
//! changes. Leaf criteria are likewise immutable; only the name, the inverse
//! flag, the managed flag and (for operators) the operand list can change.

use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::change::ChangeFlags;
use crate::error::Result;
use crate::manager::ManagerState;
use crate::model::{DomainType, Graphic, GraphicType, RegionPath};

mod describe;
pub mod operator;

pub use describe::{FilterDescription, OperandSummary};
pub use operator::{Operator, OperatorFilter};

pub(crate) use operator::Operand;

/// The fixed kind of a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    GraphicName,
    VisibilityFlags,
    Region,
    GraphicType,
    DomainType,
    And,
    Or,
}

impl FilterKind {
    pub fn is_operator(&self) -> bool {
        matches!(self, FilterKind::And | FilterKind::Or)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::GraphicName => "graphic_name",
            FilterKind::VisibilityFlags => "visibility_flags",
            FilterKind::Region => "region",
            FilterKind::GraphicType => "graphic_type",
            FilterKind::DomainType => "domain_type",
            FilterKind::And => "operator_and",
            FilterKind::Or => "operator_or",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The test performed by a leaf filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Criterion {
    /// Graphic name equals the given name.
    GraphicName(String),
    /// Graphic and all its containing scenes have their visibility flags set.
    VisibilityFlags,
    /// Graphic belongs to the region or one of its descendants.
    Region(RegionPath),
    GraphicType(GraphicType),
    DomainType(DomainType),
}

impl Criterion {
    pub fn kind(&self) -> FilterKind {
        match self {
            Criterion::GraphicName(_) => FilterKind::GraphicName,
            Criterion::VisibilityFlags => FilterKind::VisibilityFlags,
            Criterion::Region(_) => FilterKind::Region,
            Criterion::GraphicType(_) => FilterKind::GraphicType,
            Criterion::DomainType(_) => FilterKind::DomainType,
        }
    }

    pub fn matches<G: Graphic + ?Sized>(&self, graphic: &G) -> bool {
        match self {
            Criterion::GraphicName(name) => graphic.name() == name,
            Criterion::VisibilityFlags => graphic.visibility_flags_set(),
            Criterion::Region(region) => region.contains(graphic.region()),
            Criterion::GraphicType(graphic_type) => graphic.graphic_type() == *graphic_type,
            Criterion::DomainType(domain_type) => graphic.domain_type() == *domain_type,
        }
    }
}

impl fmt::Display for Criterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Criterion::GraphicName(name) => write!(f, "match_graphic_name {}", name),
            Criterion::VisibilityFlags => write!(f, "match_visibility_flags"),
            Criterion::Region(region) => write!(f, "match_region_path {}", region),
            Criterion::GraphicType(graphic_type) => {
                write!(f, "match_graphic_type {}", graphic_type)
            }
            Criterion::DomainType(domain_type) => write!(f, "match_domain_type {}", domain_type),
        }
    }
}

/// What a filter is built from: a leaf criterion or an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDefinition {
    Leaf(Criterion),
    Operator(Operator),
}

impl FilterDefinition {
    pub fn kind(&self) -> FilterKind {
        match self {
            FilterDefinition::Leaf(criterion) => criterion.kind(),
            FilterDefinition::Operator(operator) => operator.kind(),
        }
    }
}

pub(crate) enum FilterBody {
    Leaf(Criterion),
    Operator {
        operator: Operator,
        operands: RefCell<Vec<Operand>>,
    },
}

pub(crate) struct FilterObject {
    pub(crate) name: RefCell<String>,
    inverse: Cell<bool>,
    managed: Cell<bool>,
    pub(crate) change_status: Cell<ChangeFlags>,
    pub(crate) body: FilterBody,
    manager: Weak<ManagerState>,
}

impl FilterObject {
    pub(crate) fn new(
        name: String,
        definition: FilterDefinition,
        manager: Weak<ManagerState>,
    ) -> Self {
        let body = match definition {
            FilterDefinition::Leaf(criterion) => FilterBody::Leaf(criterion),
            FilterDefinition::Operator(operator) => FilterBody::Operator {
                operator,
                operands: RefCell::new(Vec::new()),
            },
        };
        Self {
            name: RefCell::new(name),
            inverse: Cell::new(false),
            managed: Cell::new(false),
            change_status: Cell::new(ChangeFlags::empty()),
            body,
            manager,
        }
    }

    pub(crate) fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub(crate) fn kind(&self) -> FilterKind {
        match &self.body {
            FilterBody::Leaf(criterion) => criterion.kind(),
            FilterBody::Operator { operator, .. } => operator.kind(),
        }
    }

    pub(crate) fn is_managed(&self) -> bool {
        self.managed.get()
    }

    fn raw_match<G: Graphic + ?Sized>(&self, graphic: &G) -> bool {
        match &self.body {
            FilterBody::Leaf(criterion) => criterion.matches(graphic),
            FilterBody::Operator { operator, operands } => {
                operator.combine(&operands.borrow(), graphic)
            }
        }
    }

    pub(crate) fn depends_on(&self, other: &FilterObject) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        match &self.body {
            FilterBody::Leaf(_) => false,
            FilterBody::Operator { operands, .. } => operands
                .borrow()
                .iter()
                .any(|operand| operand.filter.object.depends_on(other)),
        }
    }
}

/// Shared handle to a graphics filter.
///
/// Cloning retains the filter, dropping releases it. Two handles are equal when
/// they refer to the same filter.
#[derive(Clone)]
pub struct GraphicsFilter {
    pub(crate) object: Rc<FilterObject>,
}

impl GraphicsFilter {
    pub(crate) fn from_object(object: Rc<FilterObject>) -> Self {
        Self { object }
    }

    pub fn name(&self) -> String {
        self.object.name()
    }

    /// Rename the filter, keeping names unique within its module.
    ///
    /// Fails with `DuplicateName` if another filter already uses `name`; the
    /// filter keeps its old name in that case.
    pub fn set_name(&self, name: &str) -> Result<()> {
        match self.object.manager.upgrade() {
            Some(manager) => manager.rename(&self.object, name),
            None => {
                crate::validation::validate_filter_name(name)?;
                *self.object.name.borrow_mut() = name.to_string();
                Ok(())
            }
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.object.kind()
    }

    pub fn is_operator(&self) -> bool {
        self.kind().is_operator()
    }

    /// The leaf criterion, or `None` for operator filters.
    pub fn criterion(&self) -> Option<&Criterion> {
        match &self.object.body {
            FilterBody::Leaf(criterion) => Some(criterion),
            FilterBody::Operator { .. } => None,
        }
    }

    pub fn definition(&self) -> FilterDefinition {
        match &self.object.body {
            FilterBody::Leaf(criterion) => FilterDefinition::Leaf(criterion.clone()),
            FilterBody::Operator { operator, .. } => FilterDefinition::Operator(*operator),
        }
    }

    /// View this filter as an operator, if it is one.
    pub fn as_operator(&self) -> Option<OperatorFilter<'_>> {
        match &self.object.body {
            FilterBody::Operator { operator, operands } => {
                Some(OperatorFilter::new(self, *operator, operands))
            }
            FilterBody::Leaf(_) => None,
        }
    }

    pub fn is_inverse(&self) -> bool {
        self.object.inverse.get()
    }

    /// Set the inverse flag. Only an actual change is reported to listeners.
    pub fn set_inverse(&self, inverse: bool) {
        if self.object.inverse.replace(inverse) != inverse {
            self.changed(ChangeFlags::RESULT);
        }
    }

    pub fn is_managed(&self) -> bool {
        self.object.is_managed()
    }

    /// Pin (or unpin) the filter in its module.
    ///
    /// A managed filter stays registered even when nobody else holds it.
    pub fn set_managed(&self, managed: bool) {
        if self.object.managed.replace(managed) != managed {
            self.changed(ChangeFlags::NOT_RESULT);
        }
    }

    /// Decide whether `graphic` passes this filter.
    pub fn evaluate<G: Graphic + ?Sized>(&self, graphic: &G) -> bool {
        self.is_inverse() != self.object.raw_match(graphic)
    }

    /// True if `other` is this filter or is reachable through its operands.
    pub fn depends_on(&self, other: &GraphicsFilter) -> bool {
        self.object.depends_on(&other.object)
    }

    /// Number of outstanding handles, not counting the module's own slot.
    pub fn reference_count(&self) -> usize {
        let count = Rc::strong_count(&self.object);
        match self.object.manager.upgrade() {
            Some(manager) if manager.holds(&self.object) => count - 1,
            _ => count,
        }
    }

    pub fn describe(&self) -> FilterDescription {
        FilterDescription::of(self)
    }

    pub(crate) fn changed(&self, change: ChangeFlags) {
        if let Some(manager) = self.object.manager.upgrade() {
            manager.object_changed(&self.object, change);
        }
    }
}

impl Drop for GraphicsFilter {
    fn drop(&mut self) {
        if self.object.is_managed() {
            return;
        }
        // The module's slot plus this handle: nobody else is left.
        if Rc::strong_count(&self.object) == 2 {
            if let Some(manager) = self.object.manager.upgrade() {
                manager.release_unused(&self.object);
            }
        }
    }
}

impl PartialEq for GraphicsFilter {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.object, &other.object)
    }
}

impl Eq for GraphicsFilter {}

impl fmt::Debug for GraphicsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphicsFilter")
            .field("name", &self.name())
            .field("kind", &self.kind())
            .field("inverse", &self.is_inverse())
            .field("managed", &self.is_managed())
            .finish()
    }
}

impl fmt::Display for GraphicsFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.describe())
    }
}
