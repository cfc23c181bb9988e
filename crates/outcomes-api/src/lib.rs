//! JSON HTTP API for patient outcome uploads.
//!
//! Exposes an axum [`Router`] backed by any [`OutcomeStore`]. TLS, body
//! limits and request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", outcomes_api::api_router(ApiState::new(store, encodings)))
//! ```

pub mod error;
pub mod outcomes;
pub mod patients;
pub mod uploads;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use outcomes_core::store::OutcomeStore;
use outcomes_csv::EncodingChain;

pub use error::ApiError;
pub use uploads::ingest_upload;

// ─── State ────────────────────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct ApiState<S> {
  pub store:     Arc<S>,
  /// Candidate encodings tried on every upload, in order.
  pub encodings: Arc<EncodingChain>,
}

impl<S> ApiState<S> {
  pub fn new(store: Arc<S>, encodings: EncodingChain) -> Self {
    Self { store, encodings: Arc::new(encodings) }
  }
}

impl<S> Clone for ApiState<S> {
  fn clone(&self) -> Self {
    Self {
      store:     Arc::clone(&self.store),
      encodings: Arc::clone(&self.encodings),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: ApiState<S>) -> Router<()>
where
  S: OutcomeStore + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/uploads", post(uploads::create::<S>))
    .route("/outcomes", get(outcomes::list::<S>))
    .route("/outcomes/current", get(outcomes::current::<S>))
    .route("/patients/{id}", get(patients::get_one::<S>))
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────
