//! Integer attributes of a filter.
//!
//! Scripting front ends address filter flags by name and treat them as
//! integers (`0`/`1`). [`FilterAttribute`] is the closed set of such names.

use std::fmt;
use std::str::FromStr;

use crate::error::FilterError;
use crate::filter::GraphicsFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterAttribute {
    IsInverse,
    IsManaged,
}

impl FilterAttribute {
    pub const ALL: [FilterAttribute; 2] = [FilterAttribute::IsInverse, FilterAttribute::IsManaged];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterAttribute::IsInverse => "IS_INVERSE",
            FilterAttribute::IsManaged => "IS_MANAGED",
        }
    }

    pub fn get_integer(&self, filter: &GraphicsFilter) -> i32 {
        let value = match self {
            FilterAttribute::IsInverse => filter.is_inverse(),
            FilterAttribute::IsManaged => filter.is_managed(),
        };
        i32::from(value)
    }

    /// Any non-zero value sets the flag.
    pub fn set_integer(&self, filter: &GraphicsFilter, value: i32) {
        match self {
            FilterAttribute::IsInverse => filter.set_inverse(value != 0),
            FilterAttribute::IsManaged => filter.set_managed(value != 0),
        }
    }
}

impl fmt::Display for FilterAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterAttribute {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|attribute| attribute.as_str() == s)
            .ok_or_else(|| FilterError::InvalidAttribute(s.to_string()))
    }
}
