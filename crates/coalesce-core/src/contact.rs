//! Contact — the sole persisted entity.
//!
//! A contact is created exactly once, either as a brand-new primary (no
//! match found) or as a new secondary (matched, but the exact email/phone
//! pair was not yet recorded). It is mutated only by demotion and never
//! physically deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Row identifier. Assigned monotonically by the store, never reused,
/// never mutated.
pub type ContactId = i64;

/// Whether a contact is the canonical representative of its cluster or
/// subsumed under another contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPrecedence {
  Primary,
  Secondary,
}

/// A single contact record.
///
/// Exactly one contact per identity cluster is `Primary` with
/// `linked_id = None`; every `Secondary` points at that primary directly
/// (link chains are flattened on merge, a secondary never references
/// another secondary).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
  pub id:              ContactId,
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  pub linked_id:       Option<ContactId>,
  pub link_precedence: LinkPrecedence,
  pub created_at:      DateTime<Utc>,
  pub updated_at:      DateTime<Utc>,
  /// Reserved soft-delete marker. Matching treats soft-deleted rows as
  /// absent; nothing else reads or writes it.
  pub deleted_at:      Option<DateTime<Utc>>,
}

impl Contact {
  /// The id of this contact's owning primary: itself when primary, its
  /// `linked_id` when secondary.
  pub fn primary_id(&self) -> ContactId {
    match self.link_precedence {
      LinkPrecedence::Primary => self.id,
      LinkPrecedence::Secondary => self.linked_id.unwrap_or(self.id),
    }
  }

  pub fn is_primary(&self) -> bool {
    self.link_precedence == LinkPrecedence::Primary
  }
}

/// Insert payload for [`crate::store::ContactStore::create`]. The store
/// assigns the id and both timestamps.
#[derive(Debug, Clone)]
pub struct NewContact {
  pub email:           Option<String>,
  pub phone_number:    Option<String>,
  pub linked_id:       Option<ContactId>,
  pub link_precedence: LinkPrecedence,
}

/// A validated identity observation: at least one of email and phone
/// number is present and non-empty.
#[derive(Debug, Clone)]
pub struct Observation {
  email:        Option<String>,
  phone_number: Option<String>,
}

impl Observation {
  /// Build an observation, normalising empty strings to absent fields.
  ///
  /// Returns [`Error::MissingIdentifier`] when neither field carries a
  /// value — callers must never hand the resolver an empty observation.
  pub fn new(
    email: Option<String>,
    phone_number: Option<String>,
  ) -> Result<Self> {
    let email = email.filter(|e| !e.is_empty());
    let phone_number = phone_number.filter(|p| !p.is_empty());

    if email.is_none() && phone_number.is_none() {
      return Err(Error::MissingIdentifier);
    }

    Ok(Self { email, phone_number })
  }

  pub fn email(&self) -> Option<&str> { self.email.as_deref() }

  pub fn phone_number(&self) -> Option<&str> { self.phone_number.as_deref() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn observation_rejects_empty_input() {
    assert!(matches!(
      Observation::new(None, None),
      Err(Error::MissingIdentifier)
    ));
    assert!(matches!(
      Observation::new(Some(String::new()), Some(String::new())),
      Err(Error::MissingIdentifier)
    ));
  }

  #[test]
  fn observation_normalises_empty_strings() {
    let obs =
      Observation::new(Some("a@x.com".into()), Some(String::new())).unwrap();
    assert_eq!(obs.email(), Some("a@x.com"));
    assert_eq!(obs.phone_number(), None);
  }

  #[test]
  fn primary_id_of_secondary_is_its_link() {
    let now = Utc::now();
    let contact = Contact {
      id:              7,
      email:           None,
      phone_number:    Some("111".into()),
      linked_id:       Some(3),
      link_precedence: LinkPrecedence::Secondary,
      created_at:      now,
      updated_at:      now,
      deleted_at:      None,
    };
    assert_eq!(contact.primary_id(), 3);
  }
}
