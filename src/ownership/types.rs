//! Ownership client contract and error definitions.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;

/// Errors reported by an [`OwnershipClient`].
///
/// Both variants are recoverable: the controller logs them and retries on
/// its next scheduled cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnershipError {
    /// The authority (or the node identity lookup) could not be reached or
    /// answered with something we could not understand.
    #[error("ownership authority unreachable: {0}")]
    AuthorityUnreachable(String),

    /// The authority refused or failed the transfer request.
    #[error("failed to acquire resource: {0}")]
    AcquireFailed(String),
}

impl OwnershipError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OwnershipError::AuthorityUnreachable(_) => "authority_unreachable",
            OwnershipError::AcquireFailed(_) => "acquire_failed",
        }
    }
}

/// Result type for ownership operations.
pub type OwnershipResult<T> = Result<T, OwnershipError>;

/// Queries and transfers ownership of the shared resource.
///
/// Implementations resolve "this node" themselves; a failed identity lookup
/// surfaces as [`OwnershipError::AuthorityUnreachable`].
pub trait OwnershipClient: Send + Sync {
    /// Whether this node currently holds `resource_id`. Never cached.
    fn is_owned_by_this_node(
        &self,
        resource_id: &str,
    ) -> impl Future<Output = OwnershipResult<bool>> + Send;

    /// Ask the authority to move `resource_id` to this node.
    ///
    /// Must be safe to call while already holding the resource.
    fn acquire(&self, resource_id: &str) -> impl Future<Output = OwnershipResult<()>> + Send;
}

impl<T: OwnershipClient> OwnershipClient for Arc<T> {
    fn is_owned_by_this_node(
        &self,
        resource_id: &str,
    ) -> impl Future<Output = OwnershipResult<bool>> + Send {
        (**self).is_owned_by_this_node(resource_id)
    }

    fn acquire(&self, resource_id: &str) -> impl Future<Output = OwnershipResult<()>> + Send {
        (**self).acquire(resource_id)
    }
}
