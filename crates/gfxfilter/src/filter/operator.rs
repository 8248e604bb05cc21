//! Operator (composite) filters.
//!
//! An operator filter keeps an ordered list of operands, each with its own
//! active flag. Only active operands take part in evaluation:
//!
//! | Operator | Active operands | Result |
//! |----------|-----------------|--------|
//! | AND | none | `true` |
//! | AND | some | all of them match |
//! | OR | none | `false` |
//! | OR | some | any of them matches |
//!
//! Operands are unique within one list. Adding an operand that is already
//! present moves it instead of inserting a second entry.
//!
//! The operand graph must stay acyclic. Before an operand is added the
//! operator checks that the new edge cannot close a loop, and refuses with
//! `CycleRejected` if it could; the list is untouched in that case.

use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

use super::{FilterKind, GraphicsFilter};
use crate::change::ChangeFlags;
use crate::error::{FilterError, Result};
use crate::model::Graphic;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    pub fn kind(&self) -> FilterKind {
        match self {
            Operator::And => FilterKind::And,
            Operator::Or => FilterKind::Or,
        }
    }

    pub(crate) fn combine<G: Graphic + ?Sized>(&self, operands: &[Operand], graphic: &G) -> bool {
        let mut active = operands.iter().filter(|operand| operand.active);
        match self {
            Operator::And => active.all(|operand| operand.filter.evaluate(graphic)),
            Operator::Or => active.any(|operand| operand.filter.evaluate(graphic)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind().as_str())
    }
}

#[derive(Clone)]
pub(crate) struct Operand {
    pub(crate) filter: GraphicsFilter,
    pub(crate) active: bool,
}

impl Operand {
    fn new(filter: &GraphicsFilter) -> Self {
        Self {
            filter: filter.clone(),
            active: true,
        }
    }
}

pub(crate) struct OperandSnapshot {
    operands: Vec<Operand>,
    change_status: ChangeFlags,
}

/// Operator view of a [`GraphicsFilter`], obtained from
/// [`GraphicsFilter::as_operator`].
pub struct OperatorFilter<'a> {
    filter: &'a GraphicsFilter,
    operator: Operator,
    operands: &'a RefCell<Vec<Operand>>,
}

impl<'a> OperatorFilter<'a> {
    pub(crate) fn new(
        filter: &'a GraphicsFilter,
        operator: Operator,
        operands: &'a RefCell<Vec<Operand>>,
    ) -> Self {
        Self {
            filter,
            operator,
            operands,
        }
    }

    pub fn filter(&self) -> &GraphicsFilter {
        self.filter
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn len(&self) -> usize {
        self.operands.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.operands.borrow().is_empty()
    }

    pub fn contains(&self, operand: &GraphicsFilter) -> bool {
        self.position(operand).is_some()
    }

    /// Add `operand` at the end of the list, or move it there if present.
    pub fn append_operand(&self, operand: &GraphicsFilter) -> Result<()> {
        match self.position(operand) {
            Some(pos) if pos + 1 == self.len() => return Ok(()),
            Some(pos) => {
                let mut operands = self.operands.borrow_mut();
                let entry = operands.remove(pos);
                operands.push(entry);
            }
            None => {
                self.check_cycle(operand)?;
                self.operands.borrow_mut().push(Operand::new(operand));
            }
        }
        self.filter.changed(ChangeFlags::RESULT);
        Ok(())
    }

    /// Place `operand` immediately before `reference`, moving it if present.
    pub fn insert_operand_before(
        &self,
        operand: &GraphicsFilter,
        reference: &GraphicsFilter,
    ) -> Result<()> {
        if !self.contains(reference) {
            return Err(self.operand_not_found(reference));
        }
        if operand == reference {
            return Ok(());
        }
        match self.position(operand) {
            Some(pos) if self.position(reference) == Some(pos + 1) => return Ok(()),
            Some(pos) => {
                let mut operands = self.operands.borrow_mut();
                let entry = operands.remove(pos);
                let ref_pos = operands
                    .iter()
                    .position(|entry| entry.filter == *reference)
                    .unwrap_or(operands.len());
                operands.insert(ref_pos, entry);
            }
            None => {
                self.check_cycle(operand)?;
                let mut operands = self.operands.borrow_mut();
                let ref_pos = operands
                    .iter()
                    .position(|entry| entry.filter == *reference)
                    .unwrap_or(operands.len());
                operands.insert(ref_pos, Operand::new(operand));
            }
        }
        self.filter.changed(ChangeFlags::RESULT);
        Ok(())
    }

    /// Remove `operand` from the list, releasing the operator's handle to it.
    pub fn remove_operand(&self, operand: &GraphicsFilter) -> Result<()> {
        let pos = self
            .position(operand)
            .ok_or_else(|| self.operand_not_found(operand))?;
        let removed = self.operands.borrow_mut().remove(pos);
        self.filter.changed(ChangeFlags::RESULT);
        // Releasing may unregister the operand; no borrow may be held here.
        drop(removed);
        Ok(())
    }

    pub fn first_operand(&self) -> Option<GraphicsFilter> {
        self.operands
            .borrow()
            .first()
            .map(|operand| operand.filter.clone())
    }

    /// The operand after `reference`, or `None` at the end of the list or if
    /// `reference` is not an operand.
    pub fn next_operand(&self, reference: &GraphicsFilter) -> Option<GraphicsFilter> {
        let pos = self.position(reference)?;
        self.operands
            .borrow()
            .get(pos + 1)
            .map(|operand| operand.filter.clone())
    }

    pub fn operands(&self) -> Vec<GraphicsFilter> {
        self.operands
            .borrow()
            .iter()
            .map(|operand| operand.filter.clone())
            .collect()
    }

    /// Operands paired with their active flags, in evaluation order.
    pub fn operand_entries(&self) -> Vec<(GraphicsFilter, bool)> {
        self.operands
            .borrow()
            .iter()
            .map(|operand| (operand.filter.clone(), operand.active))
            .collect()
    }

    pub fn operand_is_active(&self, operand: &GraphicsFilter) -> Result<bool> {
        self.operands
            .borrow()
            .iter()
            .find(|entry| entry.filter == *operand)
            .map(|entry| entry.active)
            .ok_or_else(|| self.operand_not_found(operand))
    }

    pub fn set_operand_active(&self, operand: &GraphicsFilter, active: bool) -> Result<()> {
        let changed = {
            let mut operands = self.operands.borrow_mut();
            let entry = operands
                .iter_mut()
                .find(|entry| entry.filter == *operand)
                .ok_or_else(|| self.operand_not_found(operand))?;
            std::mem::replace(&mut entry.active, active) != active
        };
        if changed {
            self.filter.changed(ChangeFlags::RESULT);
        }
        Ok(())
    }

    pub(crate) fn snapshot(&self) -> OperandSnapshot {
        OperandSnapshot {
            operands: self.operands.borrow().clone(),
            change_status: self.filter.object.change_status.get(),
        }
    }

    /// Put the operand list back, along with the changes pending before it
    /// was touched.
    pub(crate) fn restore(&self, snapshot: OperandSnapshot) {
        let replaced = self.operands.replace(snapshot.operands);
        drop(replaced);
        self.filter.object.change_status.set(snapshot.change_status);
    }

    fn position(&self, operand: &GraphicsFilter) -> Option<usize> {
        self.operands
            .borrow()
            .iter()
            .position(|entry| entry.filter == *operand)
    }

    // Rejects both a real cycle (operand already reaches this filter) and an
    // operand this filter already reaches through a nested operator.
    fn check_cycle(&self, operand: &GraphicsFilter) -> Result<()> {
        if self.filter.depends_on(operand) || operand.depends_on(self.filter) {
            log::warn!(
                "rejected operand '{}' for '{}': would create a dependency loop",
                operand.name(),
                self.filter.name()
            );
            return Err(FilterError::CycleRejected {
                filter: self.filter.name(),
                operand: operand.name(),
            });
        }
        Ok(())
    }

    fn operand_not_found(&self, operand: &GraphicsFilter) -> FilterError {
        FilterError::OperandNotFound {
            filter: self.filter.name(),
            operand: operand.name(),
        }
    }
}
