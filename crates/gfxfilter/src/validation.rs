//! Graphics filter name validation.
//!
//! Valid names:
//! - Are not empty
//! - Contain no whitespace (names are separated by spaces in command form)
//! - Contain no `/` (reserved for region paths)
//! - Are not the word `none`, in any case

use crate::error::{FilterError, Result};

/// Validates a filter name, as used by renames and defines.
///
/// # Examples
/// ```
/// use gfxfilter::validation::validate_filter_name;
///
/// assert!(validate_filter_name("visible").is_ok());
/// assert!(validate_filter_name("temp12").is_ok());
/// assert!(validate_filter_name("heart-left_2").is_ok());
///
/// assert!(validate_filter_name("").is_err());
/// assert!(validate_filter_name("two words").is_err());
/// assert!(validate_filter_name("heart/left").is_err());
/// assert!(validate_filter_name("None").is_err());
/// ```
pub fn validate_filter_name(name: &str) -> Result<()> {
    check_filter_name(name).map_err(|e| FilterError::InvalidName {
        name: name.to_string(),
        reason: e.to_string(),
    })
}

pub fn check_filter_name(name: &str) -> std::result::Result<(), NameValidationError> {
    if name.is_empty() {
        return Err(NameValidationError::Empty);
    }
    if name.eq_ignore_ascii_case("none") {
        return Err(NameValidationError::Reserved);
    }
    for ch in name.chars() {
        if ch.is_whitespace() {
            return Err(NameValidationError::Whitespace);
        }
        if ch == '/' {
            return Err(NameValidationError::PathSeparator);
        }
    }
    Ok(())
}

/// Reason a filter name was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameValidationError {
    Empty,
    Whitespace,
    PathSeparator,
    /// `none` means "no filter" wherever a filter can be named.
    Reserved,
}

impl std::fmt::Display for NameValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NameValidationError::Empty => write!(f, "name cannot be empty"),
            NameValidationError::Whitespace => write!(f, "name cannot contain whitespace"),
            NameValidationError::PathSeparator => write!(f, "name cannot contain '/'"),
            NameValidationError::Reserved => write!(f, "'none' is a reserved word"),
        }
    }
}

impl std::error::Error for NameValidationError {}
