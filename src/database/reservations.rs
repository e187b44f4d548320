use rand::Rng;
use sqlx::{SqliteConnection, SqlitePool};

use crate::access::ReservationScope;
use crate::database::manager::StoreError;
use crate::database::models::{NewReservation, Reservation, ReservationPatch};
use crate::database::now_utc_iso;

/// Reservation CRUD over the shared pool. Row visibility is whatever
/// [`ReservationScope`] the access engine produced; the scope predicates are
/// resolved against the account table here, server-side.
pub struct ReservationStore {
    pool: SqlitePool,
}

const ORDERING: &str = "ORDER BY date ASC, time ASC, createdAt ASC";

impl ReservationStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        draft: NewReservation,
        owner_id: i64,
    ) -> Result<Reservation, StoreError> {
        let reservation = Reservation {
            id: generate_reservation_id(),
            name: draft.name,
            phone: draft.phone,
            from: draft.from,
            to: draft.to,
            date: draft.date,
            time: draft.time,
            notes: draft.notes,
            created_by: owner_id,
            created_at: now_utc_iso(),
        };

        sqlx::query(
            r#"
            INSERT INTO reservations (id, name, phone, "from", "to", date, time, notes, createdBy, createdAt)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&reservation.id)
        .bind(&reservation.name)
        .bind(&reservation.phone)
        .bind(&reservation.from)
        .bind(&reservation.to)
        .bind(&reservation.date)
        .bind(&reservation.time)
        .bind(&reservation.notes)
        .bind(reservation.created_by)
        .bind(&reservation.created_at)
        .execute(&self.pool)
        .await?;

        Ok(reservation)
    }

    pub async fn get(&self, id: &str, scope: &ReservationScope) -> Result<Reservation, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("reservation {} does not exist", id)))?;

        if !created_by_in_scope(&mut conn, reservation.created_by, scope).await? {
            return Err(StoreError::ScopeDenied("reservation is outside your scope"));
        }

        Ok(reservation)
    }

    /// All visible rows, always in display order: date, then time, then
    /// creation timestamp, ascending.
    pub async fn list(&self, scope: &ReservationScope) -> Result<Vec<Reservation>, StoreError> {
        let rows = match scope {
            ReservationScope::All => {
                sqlx::query_as::<_, Reservation>(&format!(
                    "SELECT * FROM reservations {ORDERING}"
                ))
                .fetch_all(&self.pool)
                .await?
            }
            ReservationScope::Subtree(admin_id) => {
                sqlx::query_as::<_, Reservation>(&format!(
                    r#"
                    SELECT * FROM reservations
                    WHERE createdBy = ?
                       OR createdBy IN (SELECT id FROM accounts WHERE parent_admin_id = ?)
                    {ORDERING}
                    "#
                ))
                .bind(admin_id)
                .bind(admin_id)
                .fetch_all(&self.pool)
                .await?
            }
            ReservationScope::SelfAndParent(user_id) => {
                sqlx::query_as::<_, Reservation>(&format!(
                    r#"
                    SELECT * FROM reservations
                    WHERE createdBy = ?
                       OR createdBy = (SELECT parent_admin_id FROM accounts WHERE id = ?)
                    {ORDERING}
                    "#
                ))
                .bind(user_id)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }

    /// Merge patch inside one transaction: unspecified fields keep their
    /// stored value, and concurrent updates to the same row cannot interleave
    /// field-by-field.
    pub async fn update(
        &self,
        id: &str,
        patch: &ReservationPatch,
        scope: &ReservationScope,
    ) -> Result<Reservation, StoreError> {
        let mut tx = self.pool.begin().await?;

        let mut reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("reservation {} does not exist", id)))?;

        if !created_by_in_scope(&mut tx, reservation.created_by, scope).await? {
            return Err(StoreError::ScopeDenied("reservation is outside your scope"));
        }

        reservation.apply(patch);

        sqlx::query(
            r#"
            UPDATE reservations SET
                name = ?, phone = ?, "from" = ?, "to" = ?, date = ?, time = ?, notes = ?
            WHERE id = ?
            "#,
        )
        .bind(&reservation.name)
        .bind(&reservation.phone)
        .bind(&reservation.from)
        .bind(&reservation.to)
        .bind(&reservation.date)
        .bind(&reservation.time)
        .bind(&reservation.notes)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(reservation)
    }

    pub async fn delete(&self, id: &str, scope: &ReservationScope) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let reservation =
            sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = ?")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| StoreError::NotFound(format!("reservation {} does not exist", id)))?;

        if !created_by_in_scope(&mut tx, reservation.created_by, scope).await? {
            return Err(StoreError::ScopeDenied("reservation is outside your scope"));
        }

        sqlx::query("DELETE FROM reservations WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

/// Resolve a scope predicate for one row. The parent/child linkage is read
/// from the account table on the same connection as the surrounding
/// operation.
async fn created_by_in_scope(
    conn: &mut SqliteConnection,
    created_by: i64,
    scope: &ReservationScope,
) -> Result<bool, StoreError> {
    match scope {
        ReservationScope::All => Ok(true),
        ReservationScope::Subtree(admin_id) => {
            if created_by == *admin_id {
                return Ok(true);
            }
            let is_child: i64 = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ? AND parent_admin_id = ?)",
            )
            .bind(created_by)
            .bind(admin_id)
            .fetch_one(conn)
            .await?;
            Ok(is_child != 0)
        }
        ReservationScope::SelfAndParent(user_id) => {
            if created_by == *user_id {
                return Ok(true);
            }
            let parent: Option<i64> =
                sqlx::query_scalar("SELECT parent_admin_id FROM accounts WHERE id = ?")
                    .bind(user_id)
                    .fetch_optional(conn)
                    .await?
                    .flatten();
            Ok(parent == Some(created_by))
        }
    }
}

/// Reservation ids follow the original scheme: an ISO timestamp with `:` and
/// `.` flattened to `-`, then a short random base36 suffix.
fn generate_reservation_id() -> String {
    const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let suffix: String = (0..6)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    let iso = now_utc_iso().replace(':', "-").replace('.', "-");
    format!("{}--{}", iso, suffix)
}
