use thiserror::Error;

use crate::filter::FilterKind;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Graphics filter not found: {0}")]
    NotFound(String),

    #[error("Graphics filter named '{0}' already exists")]
    DuplicateName(String),

    #[error("Graphics filter '{name}' is {actual}, cannot be used as {requested}")]
    KindMismatch {
        name: String,
        actual: FilterKind,
        requested: FilterKind,
    },

    #[error("Graphics filter '{name}' is {actual}, which takes no operands")]
    NotAnOperator { name: String, actual: FilterKind },

    #[error("Only one match criterion can be specified per filter ({0})")]
    AmbiguousSpecification(String),

    #[error("Adding '{operand}' to '{filter}' would make the filter depend on itself")]
    CycleRejected { filter: String, operand: String },

    #[error("'{operand}' is not an operand of '{filter}'")]
    OperandNotFound { filter: String, operand: String },

    #[error("Invalid graphics filter name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    #[error("Invalid graphics filter attribute: {0}")]
    InvalidAttribute(String),

    #[error("Graphics filter '{0}' needs a match criterion or an operator")]
    IncompleteDefinition(String),

    #[error("end_change called without a matching begin_change")]
    CacheNotActive,

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FilterError>;
