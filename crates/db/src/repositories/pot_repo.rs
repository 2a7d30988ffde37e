//! Repository for the `pots` table.

use chrono::Utc;
use potwatch_core::context::{ActingUser, ListOptions};
use potwatch_core::filter::{EntitySchema, ListQuery};
use potwatch_core::import::staggered_created_at;
use potwatch_core::types::DbId;
use sqlx::{Connection, PgConnection};

use crate::models::common::{AutocompleteItem, ListPage};
use crate::models::pot::{CreatePot, Pot, UpdatePot};
use crate::query::{self, values_tuples, INSERT_CHUNK_ROWS};

/// Column list for pots queries.
const COLUMNS: &str = "\
    id, name, active, import_hash, \
    created_by_id, updated_by_id, deleted_by, created_at, updated_at";

/// Filterable shape of the `pots` table.
pub const SCHEMA: EntitySchema = EntitySchema {
    entity: "Pot",
    table: "pots",
    columns: COLUMNS,
    label_column: "name",
    text_filters: &["name"],
    range_filters: &[],
    reference_filters: &[],
    sortable: &["name"],
};

/// Provides CRUD and filtered-list operations for pots.
pub struct PotRepo;

impl PotRepo {
    /// Filtered, paginated list plus total count.
    pub async fn list(
        conn: &mut PgConnection,
        query: &ListQuery,
        options: ListOptions,
    ) -> Result<ListPage<Pot>, sqlx::Error> {
        query::find_and_count(conn, &SCHEMA, query, options).await
    }

    /// `{id, label}` suggestions labelled by `name`.
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
    ) -> Result<Option<Pot>, sqlx::Error> {
        query::find_by_id(conn, &SCHEMA, id).await
    }

    pub async fn find_by_import_hash(
        conn: &mut PgConnection,
        import_hash: &str,
    ) -> Result<Option<Pot>, sqlx::Error> {
        query::find_by_import_hash(conn, &SCHEMA, import_hash).await
    }

    /// Insert a new pot, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreatePot,
        actor: ActingUser,
    ) -> Result<Pot, sqlx::Error> {
        let query = format!(
            "INSERT INTO pots (id, name, active, import_hash, created_by_id, updated_by_id) \
             VALUES (COALESCE($1, gen_random_uuid()), $2, COALESCE($3, TRUE), $4, $5, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pot>(&query)
            .bind(input.id)
            .bind(&input.name)
            .bind(input.active)
            .bind(&input.import_hash)
            .bind(actor.id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert many pots atomically.
    ///
    /// `created_at` is staggered one second per input index so that sorting
    /// by creation time reproduces input order. Rows come back in that order.
    pub async fn bulk_import(
        conn: &mut PgConnection,
        items: &[CreatePot],
        actor: ActingUser,
    ) -> Result<Vec<Pot>, sqlx::Error> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let base = Utc::now();
        let mut tx = conn.begin().await?;
        let mut imported = Vec::with_capacity(items.len());

        for (chunk_idx, chunk) in items.chunks(INSERT_CHUNK_ROWS).enumerate() {
            let query = format!(
                "INSERT INTO pots \
                    (id, name, active, import_hash, created_by_id, updated_by_id, created_at) \
                 VALUES {} RETURNING {COLUMNS}",
                values_tuples(
                    chunk.len(),
                    &[
                        "COALESCE({}, gen_random_uuid())",
                        "{}",
                        "COALESCE({}, TRUE)",
                        "{}",
                        "{}",
                        "{}",
                        "{}",
                    ],
                ),
            );

            let mut q = sqlx::query_as::<_, Pot>(&query);
            for (i, item) in chunk.iter().enumerate() {
                let index = chunk_idx * INSERT_CHUNK_ROWS + i;
                q = q
                    .bind(item.id)
                    .bind(&item.name)
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

    /// Partially update a pot. Absent fields are left unchanged; explicit
    /// nulls clear the column. Returns `None` if no row with `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdatePot,
        actor: ActingUser,
    ) -> Result<Option<Pot>, sqlx::Error> {
        let query = format!(
            "UPDATE pots SET \
                 name          = CASE WHEN $2 THEN $3 ELSE name END, \
                 active        = COALESCE($4, active), \
                 updated_by_id = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Pot>(&query)
            .bind(id)
            .bind(input.name.is_some())
            .bind(input.name.clone().flatten())
            .bind(input.active)
            .bind(actor.id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Stamp `deleted_by` then delete one pot. Returns the stamped row, or
    /// `None` if it did not exist.
    pub async fn remove(
        conn: &mut PgConnection,
        id: DbId,
        actor: ActingUser,
    ) -> Result<Option<Pot>, sqlx::Error> {
        let mut removed = query::stamp_then_destroy(conn, &SCHEMA, &[id], actor).await?;
        Ok(removed.pop())
    }

    /// Stamp-then-delete every listed pot in one transaction.
    ///
    /// Data sources and anomalies referencing a deleted pot have the
    /// reference cleared.
    pub async fn delete_by_ids(
        conn: &mut PgConnection,
        ids: &[DbId],
        actor: ActingUser,
    ) -> Result<Vec<Pot>, sqlx::Error> {
        query::stamp_then_destroy(conn, &SCHEMA, ids, actor).await
    }
}
