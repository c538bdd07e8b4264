use crate::unit::Unit;

/// Failures raised by unit, dimension and converter operations.
///
/// Every variant is local and synchronous: the library never retries or
/// substitutes a fallback, and no partially built value escapes.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    /// A value was rejected at construction time (for example a converter
    /// that would behave as the identity, or a transform over a non-system
    /// parent unit).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The inputs are individually valid but cannot be combined.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// No converter exists between the two units, even after the active
    /// dimensional model reduced their dimensions.
    #[error("Cannot convert {from} to {to}: units are incommensurable")]
    Incommensurable { from: Box<Unit>, to: Box<Unit> },

    /// A numeric precondition failed.
    #[error("Arithmetic error: {0}")]
    Arithmetic(String),
}

impl UnitError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        UnitError::InvalidArgument(msg.into())
    }

    pub(crate) fn unsupported(msg: impl Into<String>) -> Self {
        UnitError::UnsupportedOperation(msg.into())
    }

    pub(crate) fn arithmetic(msg: impl Into<String>) -> Self {
        UnitError::Arithmetic(msg.into())
    }

    pub(crate) fn incommensurable(from: &Unit, to: &Unit) -> Self {
        UnitError::Incommensurable {
            from: Box::new(from.clone()),
            to: Box::new(to.clone()),
        }
    }
}

pub type Result<T> = std::result::Result<T, UnitError>;
