//! Repository for the `alerts` table.

use chrono::Utc;
use potwatch_core::context::{ActingUser, ListOptions};
use potwatch_core::filter::{EntitySchema, ListQuery};
use potwatch_core::import::staggered_created_at;
use potwatch_core::types::DbId;
use sqlx::{Connection, PgConnection};

use crate::models::alert::{Alert, CreateAlert, UpdateAlert};
use crate::models::common::{AutocompleteItem, ListPage};
use crate::query::{self, values_tuples, INSERT_CHUNK_ROWS};

/// Column list for alerts queries.
const COLUMNS: &str = "\
    id, message, triggered_at, active, import_hash, \
    created_by_id, updated_by_id, deleted_by, created_at, updated_at";

/// Filterable shape of the `alerts` table.
pub const SCHEMA: EntitySchema = EntitySchema {
    entity: "Alert",
    table: "alerts",
    columns: COLUMNS,
    label_column: "message",
    text_filters: &["message"],
    range_filters: &["triggered_at"],
    reference_filters: &[],
    sortable: &["message", "triggered_at"],
};

/// Provides CRUD and filtered-list operations for alerts.
pub struct AlertRepo;

impl AlertRepo {
    /// Filtered, paginated list plus total count.
    pub async fn list(
        conn: &mut PgConnection,
        query: &ListQuery,
        options: ListOptions,
    ) -> Result<ListPage<Alert>, sqlx::Error> {
        query::find_and_count(conn, &SCHEMA, query, options).await
    }

    /// `{id, label}` suggestions labelled by `message`.
    pub async fn autocomplete(
        conn: &mut PgConnection,
        query: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<Vec<AutocompleteItem>, sqlx::Error> {
        query::autocomplete(conn, &SCHEMA, query, limit, offset).await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<Alert>, sqlx::Error> {
        query::find_by_id(conn, &SCHEMA, id).await
    }

    pub async fn find_by_import_hash(
        conn: &mut PgConnection,
        import_hash: &str,
    ) -> Result<Option<Alert>, sqlx::Error> {
        query::find_by_import_hash(conn, &SCHEMA, import_hash).await
    }

    /// Insert a new alert, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateAlert,
        actor: ActingUser,
    ) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts \
                (id, message, triggered_at, active, import_hash, created_by_id, updated_by_id) \
             VALUES (COALESCE($1, gen_random_uuid()), $2, $3, COALESCE($4, TRUE), $5, $6, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.id)
            .bind(&input.message)
            .bind(input.triggered_at)
            .bind(input.active)
            .bind(&input.import_hash)
            .bind(actor.id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert many alerts atomically.
    ///
    /// `created_at` is staggered one second per input index so that sorting
    /// by creation time reproduces input order. Rows come back in that order.
    pub async fn bulk_import(
        conn: &mut PgConnection,
        items: &[CreateAlert],
        actor: ActingUser,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let base = Utc::now();
        let mut tx = conn.begin().await?;
        let mut imported = Vec::with_capacity(items.len());

        for (chunk_idx, chunk) in items.chunks(INSERT_CHUNK_ROWS).enumerate() {
            let query = format!(
                "INSERT INTO alerts \
                    (id, message, triggered_at, active, import_hash, \
                     created_by_id, updated_by_id, created_at) \
                 VALUES {} RETURNING {COLUMNS}",
                values_tuples(
                    chunk.len(),
                    &[
                        "COALESCE({}, gen_random_uuid())",
                        "{}",
                        "{}",
                        "COALESCE({}, TRUE)",
                        "{}",
                        "{}",
                        "{}",
                        "{}",
                    ],
                ),
            );

            let mut q = sqlx::query_as::<_, Alert>(&query);
            for (i, item) in chunk.iter().enumerate() {
                let index = chunk_idx * INSERT_CHUNK_ROWS + i;
                q = q
                    .bind(item.id)
                    .bind(&item.message)
                    .bind(item.triggered_at)
                    .bind(item.active)
                    .bind(&item.import_hash)
                    .bind(actor.id)
                    .bind(actor.id)
                    .bind(staggered_created_at(base, index));
            }
            imported.extend(q.fetch_all(&mut *tx).await?);
        }

        tx.commit().await?;
        imported.sort_by_key(|a| a.created_at);
        Ok(imported)
    }

    /// Partially update an alert. Absent fields are left unchanged; explicit
    /// nulls clear the column. Returns `None` if no row with `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateAlert,
        actor: ActingUser,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET \
                 message       = CASE WHEN $2 THEN $3 ELSE message END, \
                 triggered_at  = CASE WHEN $4 THEN $5 ELSE triggered_at END, \
                 active        = COALESCE($6, active), \
                 updated_by_id = $7 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .bind(input.message.is_some())
            .bind(input.message.clone().flatten())
            .bind(input.triggered_at.is_some())
            .bind(input.triggered_at.flatten())
            .bind(input.active)
            .bind(actor.id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Stamp `deleted_by` then delete one alert. Returns the stamped row, or
    /// `None` if it did not exist.
    pub async fn remove(
        conn: &mut PgConnection,
        id: DbId,
        actor: ActingUser,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let mut removed = query::stamp_then_destroy(conn, &SCHEMA, &[id], actor).await?;
        Ok(removed.pop())
    }

    /// Stamp-then-delete every listed alert in one transaction.
    pub async fn delete_by_ids(
        conn: &mut PgConnection,
        ids: &[DbId],
        actor: ActingUser,
    ) -> Result<Vec<Alert>, sqlx::Error> {
        query::stamp_then_destroy(conn, &SCHEMA, ids, actor).await
    }
}
