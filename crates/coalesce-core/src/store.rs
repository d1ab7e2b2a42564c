//! Store contracts implemented by storage backends
//! (e.g. `coalesce-store-sqlite`).
//!
//! Two layers:
//!
//! - [`ContactStore`] — the four low-level operations the resolver needs,
//!   scoped to one resolution's ambient transaction. Methods are
//!   synchronous; a backend hands the resolver a handle that is only
//!   valid inside an open transaction.
//! - [`IdentityStore`] — the async facade higher layers (the API crate)
//!   depend on. One call resolves one observation inside one
//!   transaction: commit on success, rollback on any error.

use std::{collections::BTreeSet, future::Future};

use crate::{
  contact::{Contact, ContactId, NewContact, Observation},
  response::ConsolidatedContact,
};

/// The transactional store contract consumed by
/// [`resolve`](crate::resolver::resolve).
///
/// All lookups exclude soft-deleted rows and return contacts ordered by
/// ascending `(created_at, id)` — the id tie-break keeps primary
/// election deterministic when timestamps collide.
pub trait ContactStore {
  type Error: std::error::Error + Send + Sync + 'static;

  /// All contacts whose email equals `email` or whose phone number
  /// equals `phone_number`, skipping the clause for an absent field.
  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone_number: Option<&str>,
  ) -> Result<Vec<Contact>, Self::Error>;

  /// All contacts belonging to any of the given primary ids: rows with
  /// `id ∈ ids` or `linked_id ∈ ids`.
  fn find_by_primary_ids(
    &mut self,
    ids: &BTreeSet<ContactId>,
  ) -> Result<Vec<Contact>, Self::Error>;

  /// Insert a new contact; the store assigns its id and timestamps.
  fn create(&mut self, input: NewContact) -> Result<Contact, Self::Error>;

  /// Demote formerly-independent primaries under `new_primary_id` in one
  /// atomic update: every row whose id is in `demoted` *or* whose
  /// `linked_id` is in `demoted` gets `link_precedence = secondary`,
  /// `linked_id = new_primary_id`, `updated_at = now`. The second clause
  /// flattens link chains so no secondary ever references a secondary.
  fn batch_demote(
    &mut self,
    demoted: &[ContactId],
    new_primary_id: ContactId,
  ) -> Result<(), Self::Error>;
}

/// Async entry point implemented by backends that can wrap a
/// [`ContactStore`] in a transaction.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait IdentityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Resolve one observation to its consolidated identity, applying any
  /// creations and demotions it implies. The whole resolution executes
  /// inside a single transaction; on error nothing is persisted.
  fn identify(
    &self,
    observation: Observation,
  ) -> impl Future<Output = Result<ConsolidatedContact, Self::Error>> + Send + '_;
}
