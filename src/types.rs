use std::error::Error;
use std::fmt::Display;

use aws_sdk_elasticloadbalancingv2::Error as ElbError;

/// Errors surfaced by the copy run. Nothing here is recovered from - the
/// first failure aborts the run and already-created resources stay in place.
#[derive(Debug)]
pub enum CopyError {
    /// A described source resource does not exist, or the lookup was ambiguous.
    NotFound { resource: String },
    /// The source listener's default action is of a type we cannot reproduce.
    UnsupportedAction { action_type: String },
    /// A resource field did not have the shape we require (bad ARN, non-numeric
    /// rule priority).
    Malformed { msg: String },
    /// Any failure reported by the ELBv2 control plane.
    Remote(ElbError),
}

impl Display for CopyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CopyError::NotFound { resource } => {
                write!(f, "resource not found: {}", resource)
            }
            CopyError::UnsupportedAction { action_type } => {
                write!(f, "unsupported default action type: {}", action_type)
            }
            CopyError::Malformed { msg } => write!(f, "malformed resource: {}", msg),
            CopyError::Remote(err) => write!(f, "ELBv2 request failed: {}", err),
        }
    }
}

impl Error for CopyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CopyError::Remote(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ElbError> for CopyError {
    fn from(value: ElbError) -> Self {
        CopyError::Remote(value)
    }
}
