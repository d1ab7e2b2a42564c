//! The consolidated-identity view returned to callers.

use serde::{Deserialize, Serialize};

use crate::contact::{Contact, ContactId};

/// One logical identity: its primary contact id plus every email, phone
/// number, and secondary contact id in the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedContact {
  /// Wire name carries a historical typo; preserved verbatim for
  /// compatibility with existing consumers.
  #[serde(rename = "primaryContatctId")]
  pub primary_contact_id:    ContactId,
  pub emails:                Vec<String>,
  pub phone_numbers:         Vec<String>,
  pub secondary_contact_ids: Vec<ContactId>,
}

/// Derive the externally visible identity shape from a primary contact
/// and its secondaries.
///
/// Emails and phone numbers are deduplicated with the primary's value
/// first and insertion order preserved — no reordering by recency.
/// Pure; never fails for well-formed input.
pub fn consolidate(
  primary: &Contact,
  secondaries: &[Contact],
) -> ConsolidatedContact {
  let mut emails = Vec::new();
  let mut phone_numbers = Vec::new();
  let mut secondary_contact_ids = Vec::new();

  push_unique(&mut emails, primary.email.as_deref());
  push_unique(&mut phone_numbers, primary.phone_number.as_deref());

  for contact in secondaries {
    push_unique(&mut emails, contact.email.as_deref());
    push_unique(&mut phone_numbers, contact.phone_number.as_deref());
    if contact.id != primary.id {
      secondary_contact_ids.push(contact.id);
    }
  }

  ConsolidatedContact {
    primary_contact_id: primary.id,
    emails,
    phone_numbers,
    secondary_contact_ids,
  }
}

fn push_unique(values: &mut Vec<String>, value: Option<&str>) {
  if let Some(v) = value
    && !values.iter().any(|existing| existing == v)
  {
    values.push(v.to_owned());
  }
}
