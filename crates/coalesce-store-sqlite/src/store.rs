//! [`SqliteStore`] — the SQLite implementation of [`IdentityStore`].

use std::{collections::BTreeSet, path::Path};

use chrono::Utc;
use rusqlite::{Transaction, TransactionBehavior, types::Value};

use coalesce_core::{
  contact::{Contact, ContactId, NewContact, Observation},
  resolver,
  response::ConsolidatedContact,
  store::{ContactStore, IdentityStore},
};

use crate::{
  encode::{RawContact, encode_dt, encode_link_precedence},
  schema::SCHEMA,
  Error, Result,
};

const CONTACT_COLUMNS: &str = "id, email, phone_number, linked_id, \
                               link_precedence, created_at, updated_at, \
                               deleted_at";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Coalesce identity store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── IdentityStore impl ──────────────────────────────────────────────────────

impl IdentityStore for SqliteStore {
  type Error = Error;

  /// Run the full resolution inside one immediate transaction on the
  /// database thread. Concurrent resolutions for overlapping inputs
  /// serialise on the write lock, so two requests can never race into
  /// duplicate primaries or torn demote/insert pairs.
  async fn identify(
    &self,
    observation: Observation,
  ) -> Result<ConsolidatedContact> {
    let outcome: std::result::Result<ConsolidatedContact, coalesce_core::Error> =
      self
        .conn
        .call(move |conn| {
          let tx =
            conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

          let resolved = {
            let mut store = TxStore { tx: &tx };
            resolver::resolve(&mut store, &observation)
          };

          match resolved {
            Ok(contact) => {
              tx.commit()?;
              Ok(Ok(contact))
            }
            // Dropping `tx` rolls the transaction back; nothing partial
            // is ever visible to other resolutions.
            Err(err) => Ok(Err(err)),
          }
        })
        .await?;

    outcome.map_err(Error::Core)
  }
}

// ─── Transactional contract ──────────────────────────────────────────────────

/// [`ContactStore`] over a borrowed open transaction. Only constructed
/// inside [`SqliteStore::identify`]; every operation it performs commits
/// or rolls back as one unit.
struct TxStore<'a> {
  tx: &'a Transaction<'a>,
}

impl TxStore<'_> {
  fn select_contacts(
    &self,
    where_clause: &str,
    params: impl rusqlite::Params,
  ) -> Result<Vec<Contact>> {
    let sql = format!(
      "SELECT {CONTACT_COLUMNS} FROM contacts
        WHERE deleted_at IS NULL AND ({where_clause})
        ORDER BY created_at ASC, id ASC"
    );

    let mut stmt = self.tx.prepare(&sql)?;
    let raws = stmt
      .query_map(params, RawContact::from_row)?
      .collect::<rusqlite::Result<Vec<_>>>()?;

    raws.into_iter().map(RawContact::into_contact).collect()
  }
}

impl ContactStore for TxStore<'_> {
  type Error = Error;

  fn find_by_email_or_phone(
    &mut self,
    email: Option<&str>,
    phone_number: Option<&str>,
  ) -> Result<Vec<Contact>> {
    self.select_contacts(
      "(?1 IS NOT NULL AND email = ?1)
         OR (?2 IS NOT NULL AND phone_number = ?2)",
      rusqlite::params![email, phone_number],
    )
  }

  fn find_by_primary_ids(
    &mut self,
    ids: &BTreeSet<ContactId>,
  ) -> Result<Vec<Contact>> {
    if ids.is_empty() {
      return Ok(Vec::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let where_clause =
      format!("id IN ({placeholders}) OR linked_id IN ({placeholders})");

    self.select_contacts(
      &where_clause,
      rusqlite::params_from_iter(ids.iter().chain(ids.iter())),
    )
  }

  fn create(&mut self, input: NewContact) -> Result<Contact> {
    let now = Utc::now();
    let now_str = encode_dt(now);

    self.tx.execute(
      "INSERT INTO contacts
         (email, phone_number, linked_id, link_precedence,
          created_at, updated_at)
       VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
      rusqlite::params![
        input.email,
        input.phone_number,
        input.linked_id,
        encode_link_precedence(input.link_precedence),
        now_str,
        now_str,
      ],
    )?;

    Ok(Contact {
      id:              self.tx.last_insert_rowid(),
      email:           input.email,
      phone_number:    input.phone_number,
      linked_id:       input.linked_id,
      link_precedence: input.link_precedence,
      created_at:      now,
      updated_at:      now,
      deleted_at:      None,
    })
  }

  fn batch_demote(
    &mut self,
    demoted: &[ContactId],
    new_primary_id: ContactId,
  ) -> Result<()> {
    if demoted.is_empty() {
      return Ok(());
    }

    let placeholders = vec!["?"; demoted.len()].join(", ");
    // One statement: demoted primaries flip to secondary and their
    // secondaries are re-pointed, so no link chain survives the merge.
    let sql = format!(
      "UPDATE contacts
          SET link_precedence = 'secondary', linked_id = ?, updated_at = ?
        WHERE id IN ({placeholders}) OR linked_id IN ({placeholders})"
    );

    let mut params: Vec<Value> = vec![
      Value::Integer(new_primary_id),
      Value::Text(encode_dt(Utc::now())),
    ];
    params.extend(demoted.iter().map(|id| Value::Integer(*id)));
    params.extend(demoted.iter().map(|id| Value::Integer(*id)));

    self.tx.execute(&sql, rusqlite::params_from_iter(params))?;
    Ok(())
  }
}
