//! Device tracking-permission prompt, reduced to its decision.

use async_trait::async_trait;

/// Host-provided access to the platform tracking-authorization prompt.
///
/// The SDK only needs the outcome; presentation and platform plumbing stay
/// with the host.
#[async_trait]
pub trait TrackingAuthorization: Send + Sync {
    /// Requests tracking authorization and resolves to whether it was
    /// granted.
    async fn request(&self) -> bool;
}

/// Fallback for platforms without a tracking prompt: always granted.
pub struct AlwaysAuthorized;

#[async_trait]
impl TrackingAuthorization for AlwaysAuthorized {
    async fn request(&self) -> bool {
        true
    }
}
