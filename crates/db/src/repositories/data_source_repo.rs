//! Repository for the `data_sources` table.

use chrono::Utc;
use potwatch_core::context::{ActingUser, ListOptions};
use potwatch_core::filter::{EntitySchema, ListQuery, ReferenceFilter};
use potwatch_core::import::staggered_created_at;
use potwatch_core::types::DbId;
use sqlx::{Connection, PgConnection};

use crate::models::common::{AutocompleteItem, ListPage};
use crate::models::data_source::{CreateDataSource, DataSource, UpdateDataSource};
use crate::query::{self, values_tuples, INSERT_CHUNK_ROWS};

/// Column list for data_sources queries.
const COLUMNS: &str = "\
    id, url, description, pot_id, pots_id, active, import_hash, \
    created_by_id, updated_by_id, deleted_by, created_at, updated_at";

/// Filterable shape of the `data_sources` table.
pub const SCHEMA: EntitySchema = EntitySchema {
    entity: "DataSource",
    table: "data_sources",
    columns: COLUMNS,
    label_column: "url",
    text_filters: &["url", "description"],
    range_filters: &[],
    reference_filters: &[
        ReferenceFilter {
            key: "pot",
            column: "pot_id",
        },
        ReferenceFilter {
            key: "pots",
            column: "pots_id",
        },
    ],
    sortable: &["url", "description"],
};

/// Provides CRUD and filtered-list operations for data sources.
pub struct DataSourceRepo;

impl DataSourceRepo {
    pub async fn list(
        conn: &mut PgConnection,
        query: &ListQuery,
        options: ListOptions,
    ) -> Result<ListPage<DataSource>, sqlx::Error> {
        query::find_and_count(conn, &SCHEMA, query, options).await
    }

    /// Suggestions labelled by `url`.
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
    ) -> Result<Option<DataSource>, sqlx::Error> {
        query::find_by_id(conn, &SCHEMA, id).await
    }

    pub async fn find_by_import_hash(
        conn: &mut PgConnection,
        import_hash: &str,
    ) -> Result<Option<DataSource>, sqlx::Error> {
        query::find_by_import_hash(conn, &SCHEMA, import_hash).await
    }

    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateDataSource,
        actor: ActingUser,
    ) -> Result<DataSource, sqlx::Error> {
        let query = format!(
            "INSERT INTO data_sources \
                (id, url, description, pot_id, pots_id, active, import_hash, \
                 created_by_id, updated_by_id) \
             VALUES (COALESCE($1, gen_random_uuid()), $2, $3, $4, $5, \
                     COALESCE($6, TRUE), $7, $8, $8) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DataSource>(&query)
            .bind(input.id)
            .bind(&input.url)
            .bind(&input.description)
            .bind(input.pot_id)
            .bind(input.pots_id)
            .bind(input.active)
            .bind(&input.import_hash)
            .bind(actor.id)
            .fetch_one(&mut *conn)
            .await
    }

    /// Insert many data sources in one transaction, staggering `created_at`
    /// by input index.
    pub async fn bulk_import(
        conn: &mut PgConnection,
        items: &[CreateDataSource],
        actor: ActingUser,
    ) -> Result<Vec<DataSource>, sqlx::Error> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let base = Utc::now();
        let mut tx = conn.begin().await?;
        let mut imported = Vec::with_capacity(items.len());

        for (chunk_idx, chunk) in items.chunks(INSERT_CHUNK_ROWS).enumerate() {
            let query = format!(
                "INSERT INTO data_sources \
                    (id, url, description, pot_id, pots_id, active, import_hash, \
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

            let mut q = sqlx::query_as::<_, DataSource>(&query);
            for (i, item) in chunk.iter().enumerate() {
                q = q
                    .bind(item.id)
                    .bind(&item.url)
                    .bind(&item.description)
                    .bind(item.pot_id)
                    .bind(item.pots_id)
                    .bind(item.active)
                    .bind(&item.import_hash)
                    .bind(actor.id)
                    .bind(actor.id)
                    .bind(staggered_created_at(base, chunk_idx * INSERT_CHUNK_ROWS + i));
            }
            imported.extend(q.fetch_all(&mut *tx).await?);
        }

        tx.commit().await?;
        imported.sort_by_key(|d| d.created_at);
        Ok(imported)
    }

    /// Partially update a data source. `None` if the id does not exist.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &UpdateDataSource,
        actor: ActingUser,
    ) -> Result<Option<DataSource>, sqlx::Error> {
        let query = format!(
            "UPDATE data_sources SET \
                 url           = CASE WHEN $2 THEN $3 ELSE url END, \
                 description   = CASE WHEN $4 THEN $5 ELSE description END, \
                 pot_id        = CASE WHEN $6 THEN $7 ELSE pot_id END, \
                 pots_id       = CASE WHEN $8 THEN $9 ELSE pots_id END, \
                 active        = COALESCE($10, active), \
                 updated_by_id = $11 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DataSource>(&query)
            .bind(id)
            .bind(input.url.is_some())
            .bind(input.url.clone().flatten())
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(input.pot_id.is_some())
            .bind(input.pot_id.flatten())
            .bind(input.pots_id.is_some())
            .bind(input.pots_id.flatten())
            .bind(input.active)
            .bind(actor.id)
            .fetch_optional(&mut *conn)
            .await
    }

    pub async fn remove(
        conn: &mut PgConnection,
        id: DbId,
        actor: ActingUser,
    ) -> Result<Option<DataSource>, sqlx::Error> {
        let mut removed = query::stamp_then_destroy(conn, &SCHEMA, &[id], actor).await?;
        Ok(removed.pop())
    }

    /// Stamp-then-delete every listed data source in one transaction.
    /// Anomalies pointing at a deleted source keep their row with the
    /// reference cleared.
    pub async fn delete_by_ids(
        conn: &mut PgConnection,
        ids: &[DbId],
        actor: ActingUser,
    ) -> Result<Vec<DataSource>, sqlx::Error> {
        query::stamp_then_destroy(conn, &SCHEMA, ids, actor).await
    }
}
