//! [`SqliteStore`] — the SQLite implementation of [`DisturbanceStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use disturbance_core::{
  disturbance::{Affected, Category, Disturbance, NewDisturbance, Status},
  store::DisturbanceStore,
  subscription::{GlobalSubscription, Subscription},
};

use crate::{
  Error, Result,
  encode::{
    RawAffected, RawDisturbance, RawGlobalSubscription, RawSubscription,
    encode_category, encode_dt, encode_status, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A disturbance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// Read the affected list of one disturbance row, in insertion order.
fn load_affected(
  conn: &rusqlite::Connection,
  disturbance_pk: i64,
) -> rusqlite::Result<Vec<RawAffected>> {
  let mut stmt = conn.prepare(
    "SELECT party_id, reference FROM affected
     WHERE disturbance_pk = ?1 ORDER BY id",
  )?;
  stmt
    .query_map(rusqlite::params![disturbance_pk], |row| {
      Ok(RawAffected { party_id: row.get(0)?, reference: row.get(1)? })
    })?
    .collect()
}

fn insert_affected(
  conn: &rusqlite::Connection,
  disturbance_pk: i64,
  affected: &[(String, String)],
) -> rusqlite::Result<()> {
  let mut stmt = conn.prepare(
    "INSERT INTO affected (disturbance_pk, party_id, reference)
     VALUES (?1, ?2, ?3)",
  )?;
  for (party_id, reference) in affected {
    stmt.execute(rusqlite::params![disturbance_pk, party_id, reference])?;
  }
  Ok(())
}

fn decode_affected(raws: Vec<RawAffected>) -> Result<Vec<Affected>> {
  raws.into_iter().map(RawAffected::into_affected).collect()
}

const DISTURBANCE_COLUMNS: &str = "id, category, disturbance_id, title, \
  description, status, planned_start_date, planned_stop_date, created, updated";

fn read_disturbance_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawDisturbance> {
  Ok(RawDisturbance {
    id:                 row.get(0)?,
    category:           row.get(1)?,
    disturbance_id:     row.get(2)?,
    title:              row.get(3)?,
    description:        row.get(4)?,
    status:             row.get(5)?,
    planned_start_date: row.get(6)?,
    planned_stop_date:  row.get(7)?,
    created:            row.get(8)?,
    updated:            row.get(9)?,
  })
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

  #[cfg(test)]
  pub(crate) async fn sent_history_count(
    &self,
    category: Category,
    disturbance_id: &str,
  ) -> Result<u64> {
    let category_str = encode_category(category).to_owned();
    let id = disturbance_id.to_owned();
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM sent_history
           WHERE category = ?1 AND disturbance_id = ?2",
          rusqlite::params![category_str, id],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(count as u64)
  }
}

// ─── DisturbanceStore impl ───────────────────────────────────────────────────

impl DisturbanceStore for SqliteStore {
  type Error = Error;

  // ── Disturbances ──────────────────────────────────────────────────────────

  async fn find_active(
    &self,
    category: Category,
    disturbance_id: &str,
  ) -> Result<Option<Disturbance>> {
    let category_str = encode_category(category).to_owned();
    let id = disturbance_id.to_owned();

    let raw: Option<(RawDisturbance, Vec<RawAffected>)> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {DISTURBANCE_COLUMNS} FROM disturbances
           WHERE category = ?1 AND disturbance_id = ?2 AND deleted = 0"
        );
        let raw = conn
          .query_row(&sql, rusqlite::params![category_str, id], read_disturbance_row)
          .optional()?;

        match raw {
          Some(raw) => {
            let affected = load_affected(conn, raw.id)?;
            Ok(Some((raw, affected)))
          }
          None => Ok(None),
        }
      })
      .await?;

    raw
      .map(|(raw, affected)| raw.into_disturbance(decode_affected(affected)?))
      .transpose()
  }

  async fn find_by_party(
    &self,
    party_id: Uuid,
    categories: &[Category],
    statuses: &[Status],
  ) -> Result<Vec<Disturbance>> {
    let party_str = encode_uuid(party_id);
    let category_strs: Vec<String> =
      categories.iter().map(|c| encode_category(*c).to_owned()).collect();
    let status_strs: Vec<String> =
      statuses.iter().map(|s| encode_status(*s).to_owned()).collect();

    let raws: Vec<(RawDisturbance, Vec<RawAffected>)> = self
      .conn
      .call(move |conn| {
        // Build the optional IN clauses dynamically; empty filter
        // slices mean no clause at all.
        let mut sql = String::from(
          "SELECT DISTINCT
             d.id, d.category, d.disturbance_id, d.title, d.description,
             d.status, d.planned_start_date, d.planned_stop_date,
             d.created, d.updated
           FROM disturbances d
           JOIN affected a ON a.disturbance_pk = d.id
           WHERE d.deleted = 0 AND a.party_id = ?",
        );
        let mut params: Vec<String> = vec![party_str];

        if !category_strs.is_empty() {
          let marks = vec!["?"; category_strs.len()].join(", ");
          sql.push_str(&format!(" AND d.category IN ({marks})"));
          params.extend(category_strs);
        }
        if !status_strs.is_empty() {
          let marks = vec!["?"; status_strs.len()].join(", ");
          sql.push_str(&format!(" AND d.status IN ({marks})"));
          params.extend(status_strs);
        }
        sql.push_str(" ORDER BY d.id");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), read_disturbance_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut out = Vec::with_capacity(rows.len());
        for raw in rows {
          let affected = load_affected(conn, raw.id)?;
          out.push((raw, affected));
        }
        Ok(out)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, affected)| raw.into_disturbance(decode_affected(affected)?))
      .collect()
  }

  async fn insert_disturbance(
    &self,
    new: NewDisturbance,
  ) -> Result<Option<Disturbance>> {
    let disturbance = Disturbance {
      category:           new.category,
      disturbance_id:     new.disturbance_id,
      title:              new.title,
      description:        new.description,
      status:             new.status,
      planned_start_date: new.planned_start_date,
      planned_stop_date:  new.planned_stop_date,
      affected:           new.affected,
      created:            Utc::now(),
      updated:            None,
    };

    let category_str = encode_category(disturbance.category).to_owned();
    let id           = disturbance.disturbance_id.clone();
    let title        = disturbance.title.clone();
    let description  = disturbance.description.clone();
    let status_str   = encode_status(disturbance.status).to_owned();
    let start_str    = disturbance.planned_start_date.map(encode_dt);
    let stop_str     = disturbance.planned_stop_date.map(encode_dt);
    let created_str  = encode_dt(disturbance.created);
    let affected: Vec<(String, String)> = disturbance
      .affected
      .iter()
      .map(|a| (encode_uuid(a.party_id), a.reference.clone()))
      .collect();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // OR IGNORE lets the partial unique index over live rows
        // decide; the losing insert of a race reports zero changes.
        let inserted = tx.execute(
          "INSERT OR IGNORE INTO disturbances (
             category, disturbance_id, title, description, status,
             planned_start_date, planned_stop_date, created
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            category_str,
            id,
            title,
            description,
            status_str,
            start_str,
            stop_str,
            created_str,
          ],
        )?;
        if inserted == 0 {
          return Ok(false);
        }
        let pk = tx.last_insert_rowid();
        insert_affected(&tx, pk, &affected)?;
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(inserted.then_some(disturbance))
  }

  async fn update_disturbance(&self, disturbance: &Disturbance) -> Result<Disturbance> {
    let mut updated = disturbance.clone();
    updated.updated = Some(Utc::now());

    let category_str = encode_category(updated.category).to_owned();
    let id           = updated.disturbance_id.clone();
    let title        = updated.title.clone();
    let description  = updated.description.clone();
    let status_str   = encode_status(updated.status).to_owned();
    let start_str    = updated.planned_start_date.map(encode_dt);
    let stop_str     = updated.planned_stop_date.map(encode_dt);
    let updated_str  = encode_dt(updated.updated.unwrap_or_else(Utc::now));
    let affected: Vec<(String, String)> = updated
      .affected
      .iter()
      .map(|a| (encode_uuid(a.party_id), a.reference.clone()))
      .collect();

    let found: Option<()> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let pk: Option<i64> = tx
          .query_row(
            "SELECT id FROM disturbances
             WHERE category = ?1 AND disturbance_id = ?2 AND deleted = 0",
            rusqlite::params![category_str, id],
            |r| r.get(0),
          )
          .optional()?;
        let Some(pk) = pk else {
          return Ok(None);
        };

        tx.execute(
          "UPDATE disturbances SET
             title = ?1, description = ?2, status = ?3,
             planned_start_date = ?4, planned_stop_date = ?5, updated = ?6
           WHERE id = ?7",
          rusqlite::params![
            title,
            description,
            status_str,
            start_str,
            stop_str,
            updated_str,
            pk,
          ],
        )?;

        // The affected list is replaced wholesale.
        tx.execute("DELETE FROM affected WHERE disturbance_pk = ?1", rusqlite::params![pk])?;
        insert_affected(&tx, pk, &affected)?;

        tx.commit()?;
        Ok(Some(()))
      })
      .await?;

    match found {
      Some(()) => Ok(updated),
      None => Err(Error::RowNotFound {
        category:       disturbance.category,
        disturbance_id: disturbance.disturbance_id.clone(),
      }),
    }
  }

  async fn soft_delete(&self, category: Category, disturbance_id: &str) -> Result<()> {
    let category_str = encode_category(category).to_owned();
    let id = disturbance_id.to_owned();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE disturbances SET deleted = 1
           WHERE category = ?1 AND disturbance_id = ?2 AND deleted = 0",
          rusqlite::params![category_str, id],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Per-disturbance subscriptions ─────────────────────────────────────────

  async fn find_subscriptions(
    &self,
    category: Category,
    disturbance_id: &str,
  ) -> Result<Vec<Subscription>> {
    let category_str = encode_category(category).to_owned();
    let id = disturbance_id.to_owned();

    let raws: Vec<RawSubscription> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT category, disturbance_id, party_id, created FROM subscriptions
           WHERE category = ?1 AND disturbance_id = ?2 ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![category_str, id], |row| {
            Ok(RawSubscription {
              category:       row.get(0)?,
              disturbance_id: row.get(1)?,
              party_id:       row.get(2)?,
              created:        row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscription::into_subscription).collect()
  }

  async fn insert_subscription(
    &self,
    category: Category,
    disturbance_id: &str,
    party_id: Uuid,
  ) -> Result<bool> {
    let category_str = encode_category(category).to_owned();
    let id           = disturbance_id.to_owned();
    let party_str    = encode_uuid(party_id);
    let created_str  = encode_dt(Utc::now());

    let inserted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO subscriptions
             (category, disturbance_id, party_id, created)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![category_str, id, party_str, created_str],
        )?)
      })
      .await?;

    Ok(inserted > 0)
  }

  async fn delete_subscriptions(
    &self,
    category: Category,
    disturbance_id: &str,
  ) -> Result<u64> {
    let category_str = encode_category(category).to_owned();
    let id = disturbance_id.to_owned();

    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM subscriptions WHERE category = ?1 AND disturbance_id = ?2",
          rusqlite::params![category_str, id],
        )?)
      })
      .await?;

    Ok(removed as u64)
  }

  // ── Global subscriptions ──────────────────────────────────────────────────

  async fn find_global_subscription(
    &self,
    party_id: Uuid,
  ) -> Result<Option<GlobalSubscription>> {
    let party_str = encode_uuid(party_id);

    let raw: Option<RawGlobalSubscription> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT party_id, created FROM global_subscriptions WHERE party_id = ?1",
              rusqlite::params![party_str],
              |row| {
                Ok(RawGlobalSubscription {
                  party_id: row.get(0)?,
                  created:  row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawGlobalSubscription::into_global_subscription).transpose()
  }

  async fn insert_global_subscription(&self, party_id: Uuid) -> Result<bool> {
    let party_str   = encode_uuid(party_id);
    let created_str = encode_dt(Utc::now());

    let inserted: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO global_subscriptions (party_id, created)
           VALUES (?1, ?2)",
          rusqlite::params![party_str, created_str],
        )?)
      })
      .await?;

    Ok(inserted > 0)
  }

  async fn delete_global_subscription(&self, party_id: Uuid) -> Result<bool> {
    let party_str = encode_uuid(party_id);

    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM global_subscriptions WHERE party_id = ?1",
          rusqlite::params![party_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  // ── Sent-message history ──────────────────────────────────────────────────

  async fn record_sent(
    &self,
    category: Category,
    disturbance_id: &str,
    party_id: Uuid,
  ) -> Result<()> {
    let category_str = encode_category(category).to_owned();
    let id           = disturbance_id.to_owned();
    let party_str    = encode_uuid(party_id);
    let created_str  = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sent_history (category, disturbance_id, party_id, created)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![category_str, id, party_str, created_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
