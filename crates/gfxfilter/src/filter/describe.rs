use serde::Serialize;
use std::fmt;

use super::{FilterKind, GraphicsFilter};

/// One operand of an operator filter, as listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperandSummary {
    pub name: String,
    pub active: bool,
}

/// Snapshot of a filter for listing and logging.
///
/// `Display` renders the filter in command form, e.g.
/// `or1 normal_match operator_or add_filters f1 f2`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterDescription {
    pub name: String,
    pub kind: FilterKind,
    pub inverse: bool,
    pub managed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub criterion: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operands: Vec<OperandSummary>,
}

impl FilterDescription {
    pub fn of(filter: &GraphicsFilter) -> Self {
        let operands = filter
            .as_operator()
            .map(|op| {
                op.operand_entries()
                    .into_iter()
                    .map(|(operand, active)| OperandSummary {
                        name: operand.name(),
                        active,
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self {
            name: filter.name(),
            kind: filter.kind(),
            inverse: filter.is_inverse(),
            managed: filter.is_managed(),
            criterion: filter.criterion().map(ToString::to_string),
            operands,
        }
    }
}

impl fmt::Display for FilterDescription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let polarity = if self.inverse {
            "inverse_match"
        } else {
            "normal_match"
        };
        write!(f, "{} {}", self.name, polarity)?;
        match &self.criterion {
            Some(criterion) => write!(f, " {}", criterion),
            None => {
                write!(f, " {}", self.kind)?;
                if !self.operands.is_empty() {
                    write!(f, " add_filters")?;
                    for operand in &self.operands {
                        write!(f, " {}", operand.name)?;
                    }
                }
                Ok(())
            }
        }
    }
}
