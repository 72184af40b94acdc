//! Repository trait for the session store.
//!
//! The domain layer defines the trait; the infrastructure layer implements
//! it (dependency inversion). UseCases depend only on this trait.

use async_trait::async_trait;
use tokio::sync::OwnedMutexGuard;

use super::SessionState;

/// Exclusive handle on the session state.
///
/// Holding the guard is one run-to-completion step: nothing else reads or
/// writes the session until it is dropped.
pub type SessionGuard = OwnedMutexGuard<SessionState>;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Lock the session for a read-modify-publish step
    async fn lock(&self) -> SessionGuard;

    /// Copy of the current session state
    async fn snapshot(&self) -> SessionState;
}
