//! JSON API for Coalesce.
//!
//! Exposes an axum [`Router`] backed by any
//! [`coalesce_core::store::IdentityStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .merge(coalesce_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod identify;

use std::sync::Arc;

use axum::{Router, routing::post};
use coalesce_core::store::IdentityStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router
/// regardless of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: IdentityStore + Send + Sync + 'static,
{
  Router::new()
    .route("/identify", post(identify::handler::<S>))
    .with_state(store)
}
