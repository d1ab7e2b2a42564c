//! The identity-linking algorithm.
//!
//! Given one observation (email and/or phone number) and the store's
//! current contact set, [`resolve`] decides whether the observation
//! belongs to an existing identity, whether previously-separate
//! identities must be merged under one primary, and whether a new
//! record must be created — all without ever deleting or renumbering a
//! contact.
//!
//! The function is pure with respect to the backend: it speaks only
//! through the [`ContactStore`] contract and must be run inside the
//! backend's ambient transaction (see `coalesce-store-sqlite`).

use std::collections::BTreeSet;

use chrono::Utc;

use crate::{
  contact::{Contact, ContactId, LinkPrecedence, NewContact, Observation},
  response::{ConsolidatedContact, consolidate},
  store::ContactStore,
  Error, Result,
};

/// Resolve one observation to its consolidated identity.
///
/// Performs at most one insert (a brand-new primary, or one new
/// secondary for a novel email/phone pairing) and at most one batch
/// demotion (when the observation joins formerly-independent clusters).
pub fn resolve<S: ContactStore>(
  store: &mut S,
  observation: &Observation,
) -> Result<ConsolidatedContact> {
  let email = observation.email();
  let phone_number = observation.phone_number();

  let candidates = store
    .find_by_email_or_phone(email, phone_number)
    .map_err(store_err)?;

  // Nothing matches either field: this observation starts a new identity.
  if candidates.is_empty() {
    let created = store
      .create(NewContact {
        email:           email.map(str::to_owned),
        phone_number:    phone_number.map(str::to_owned),
        linked_id:       None,
        link_precedence: LinkPrecedence::Primary,
      })
      .map_err(store_err)?;
    return Ok(consolidate(&created, &[]));
  }

  // Every candidate resolves to its owning primary; the observation may
  // touch several previously-independent clusters at once.
  let primary_ids: BTreeSet<ContactId> =
    candidates.iter().map(Contact::primary_id).collect();

  let cluster = store.find_by_primary_ids(&primary_ids).map_err(store_err)?;

  if !cluster.iter().any(Contact::is_primary) {
    let witness = cluster.first().or(candidates.first()).map_or(0, |c| c.id);
    return Err(Error::MissingPrimary(witness));
  }

  // Ascending (created_at, id) order makes index 0 the elected primary.
  let mut ordered = cluster.into_iter();
  let primary = ordered.next().expect("cluster verified non-empty");
  let mut secondaries: Vec<Contact> = ordered.collect();

  // Join clusters: demote every competing primary under the elected one,
  // and re-point their secondaries so no link chain survives.
  let demoted: Vec<ContactId> = secondaries
    .iter()
    .filter(|c| c.is_primary())
    .map(|c| c.id)
    .collect();

  if !demoted.is_empty() {
    store.batch_demote(&demoted, primary.id).map_err(store_err)?;

    let now = Utc::now();
    for contact in &mut secondaries {
      let repointed = contact
        .linked_id
        .is_some_and(|linked| demoted.contains(&linked));
      if contact.is_primary() || repointed {
        contact.link_precedence = LinkPrecedence::Secondary;
        contact.linked_id = Some(primary.id);
        contact.updated_at = now;
      }
    }
  }

  // The observation is novel if either supplied field is not yet
  // recorded anywhere in the cluster (absent fields match vacuously).
  let members = || std::iter::once(&primary).chain(secondaries.iter());
  let has_email = email
    .is_none_or(|e| members().any(|c| c.email.as_deref() == Some(e)));
  let has_phone = phone_number
    .is_none_or(|p| members().any(|c| c.phone_number.as_deref() == Some(p)));

  if !has_email || !has_phone {
    let created = store
      .create(NewContact {
        email:           email.map(str::to_owned),
        phone_number:    phone_number.map(str::to_owned),
        linked_id:       Some(primary.id),
        link_precedence: LinkPrecedence::Secondary,
      })
      .map_err(store_err)?;
    secondaries.push(created);
  }

  Ok(consolidate(&primary, &secondaries))
}

fn store_err<E>(e: E) -> Error
where
  E: std::error::Error + Send + Sync + 'static,
{
  Error::Store(Box::new(e))
}
