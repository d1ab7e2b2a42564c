//! Error types for `coalesce-core`.

use thiserror::Error;

use crate::contact::ContactId;

#[derive(Debug, Error)]
pub enum Error {
  /// Neither email nor phone number was supplied.
  #[error("email or phoneNumber is required")]
  MissingIdentifier,

  /// An expanded cluster contained no primary contact. Structurally
  /// impossible under the link invariants; indicates prior data
  /// corruption and is fatal for the request.
  #[error("cluster containing contact {0} has no primary")]
  MissingPrimary(ContactId),

  /// The backing store failed mid-resolution. The ambient transaction
  /// is rolled back; nothing partial is persisted.
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
