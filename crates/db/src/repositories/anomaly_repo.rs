//! Repository for the `anomalies` table.

use chrono::Utc;
use potwatch_core::context::{ActingUser, ListOptions};
use potwatch_core::filter::{EntitySchema, ListQuery, ReferenceFilter};
use potwatch_core::import::staggered_created_at;
use potwatch_core::types::DbId;
use sqlx::{Connection, PgConnection};

use crate::models::anomaly::{Anomaly, CreateAnomaly, UpdateAnomaly};
use crate::models::common::{AutocompleteItem, ListPage};
use crate::query::{self, values_tuples, INSERT_CHUNK_ROWS};

/// Column list for anomalies queries.
const COLUMNS: &str = "\
    id, description, detected_at, data_source_id, pots_id, active, import_hash, \
    created_by_id, updated_by_id, deleted_by, created_at, updated_at";

/// Filterable shape of the `anomalies` table.
pub const SCHEMA: EntitySchema = EntitySchema {
    entity: "Anomaly",
    table: "anomalies",
    columns: COLUMNS,
    label_column: "description",
    text_filters: &["description"],
    range_filters: &["detected_at"],
    reference_filters: &[
        ReferenceFilter {
            key: "data_source",
            column: "data_source_id",
        },
        ReferenceFilter {
            key: "pots",
            column: "pots_id",
        },
    ],
    sortable: &["description", "detected_at"],
};

/// Provides CRUD and filtered-list operations for anomalies.
pub struct AnomalyRepo;

impl AnomalyRepo {
    /// Filtered, paginated list plus total count.
    pub async fn list(
        conn: &mut PgConnection,
        query: &ListQuery,
        options: ListOptions,
    ) -> Result<ListPage<Anomaly>, sqlx::Error> {
        query::find_and_count(conn, &SCHEMA, query, options).await
    }

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
    ) -> Result<Option<Anomaly>, sqlx::Error> {
        query::find_by_id(conn, &SCHEMA, id).await
    }

    pub async fn find_by_import_hash(
        conn: &mut PgConnection,
        import_hash: &str,
    ) -> Result<Option<Anomaly>, sqlx::Error> {
        query::find_by_import_hash(conn, &SCHEMA, import_hash).await
    }

    /// Insert a new anomaly, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateAnomaly,
        actor: ActingUser,
    ) -> Result<Anomaly, sqlx::Error> {
        let query = format!(
            "INSERT INTO anomalies \
                (id, description, detected_at, data_source_id, pots_id, active, import_hash, \
                 created_by_id, updated_by_id) \
             VALUES (COALESCE($1, gen_random_uuid()), $2, $3, $4, $5, \
                     COALESCE($6, TRUE), $7, $8, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Anomaly>(&query)
            .bind(input.id)
            .bind(&input.description)
            .bind(input.detected_at)
            .bind(input.data_source_id)
            .bind(input.pots_id)
            .bind(input.active)
            .bind(&input.import_hash)
            .bind(actor.id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert many anomalies atomically, returned in input order.
    pub async fn bulk_import(
        conn: &mut PgConnection,
        items: &[CreateAnomaly],
        actor: ActingUser,
    ) -> Result<Vec<Anomaly>, sqlx::Error> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let base = Utc::now();
        let mut tx = conn.begin().await?;
        let mut imported = Vec::with_capacity(items.len());

        for (chunk_idx, chunk) in items.chunks(INSERT_CHUNK_ROWS).enumerate() {
            let query = format!(
                "INSERT INTO anomalies \
                    (id, description, detected_at, data_source_id, pots_id, active, import_hash, \
                     created_by_id, updated_by_id, created_at) \
                 VALUES {} RETURNING {COLUMNS}",
                values_tuples(
                    chunk.len(),
                    &[
                        "COALESCE({}, gen_random_uuid())",
                        "{}",
                        "{}",
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

            let mut q = sqlx::query_as::<_, Anomaly>(&query);
            for (i, item) in chunk.iter().enumerate() {
                let index = chunk_idx * INSERT_CHUNK_ROWS + i;
                q = q
                    .bind(item.id)
                    .bind(&item.description)
                    .bind(item.detected_at)
                    .bind(item.data_source_id)
                    .bind(item.pots_id)
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

    /// Partially update an anomaly. Absent fields are left unchanged;
    /// explicit nulls clear the column.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateAnomaly,
        actor: ActingUser,
    ) -> Result<Option<Anomaly>, sqlx::Error> {
        let query = format!(
            "UPDATE anomalies SET \
                 description    = CASE WHEN $2 THEN $3 ELSE description END, \
                 detected_at    = CASE WHEN $4 THEN $5 ELSE detected_at END, \
                 data_source_id = CASE WHEN $6 THEN $7 ELSE data_source_id END, \
                 pots_id        = CASE WHEN $8 THEN $9 ELSE pots_id END, \
                 active         = COALESCE($10, active), \
                 updated_by_id  = $11 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Anomaly>(&query)
            .bind(id)
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(input.detected_at.is_some())
            .bind(input.detected_at.flatten())
            .bind(input.data_source_id.is_some())
            .bind(input.data_source_id.flatten())
            .bind(input.pots_id.is_some())
            .bind(input.pots_id.flatten())
            .bind(input.active)
            .bind(actor.id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Stamp `deleted_by` then delete one anomaly.
    pub async fn remove(
        conn: &mut PgConnection,
        id: DbId,
        actor: ActingUser,
    ) -> Result<Option<Anomaly>, sqlx::Error> {
        let mut removed = query::stamp_then_destroy(conn, &SCHEMA, &[id], actor).await?;
        Ok(removed.pop())
    }

    pub async fn delete_by_ids(
        conn: &mut PgConnection,
        ids: &[DbId],
        actor: ActingUser,
    ) -> Result<Vec<Anomaly>, sqlx::Error> {
        query::stamp_then_destroy(conn, &SCHEMA, ids, actor).await
    }
}
