//! Generic execution of filtered list, autocomplete and delete queries.
//!
//! Entity repositories describe their table with an [`EntitySchema`] and
//! delegate here for everything that does not depend on the entity's own
//! columns.

use potwatch_core::context::{ActingUser, ListOptions};
use potwatch_core::filter::{EntitySchema, FilterValue, ListQuery, Predicate};
use potwatch_core::types::DbId;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Connection, FromRow, PgConnection, Postgres};

use crate::models::common::{AutocompleteItem, ListPage};

// ---------------------------------------------------------------------------
// Dynamic WHERE rendering
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built queries.
#[derive(Debug, Clone)]
enum BindValue {
    Id(DbId),
    Text(String),
    Timestamp(potwatch_core::types::Timestamp),
    Bool(bool),
}

impl From<&FilterValue> for BindValue {
    fn from(value: &FilterValue) -> Self {
        match value {
            FilterValue::Id(v) => BindValue::Id(*v),
            FilterValue::Timestamp(v) => BindValue::Timestamp(*v),
            FilterValue::Bool(v) => BindValue::Bool(*v),
        }
    }
}

/// Rendered WHERE clause plus the values to bind, in placeholder order.
#[derive(Debug, Default)]
struct WhereClause {
    sql: String,
    binds: Vec<BindValue>,
}

impl WhereClause {
    /// Index of the next free `$n` placeholder.
    fn next_idx(&self) -> usize {
        self.binds.len() + 1
    }
}

/// Render AND-ed predicates. Empty input renders an empty clause.
fn build_where(predicates: &[Predicate]) -> WhereClause {
    let mut clause = WhereClause::default();
    let conditions: Vec<String> = predicates
        .iter()
        .map(|p| render_predicate(p, &mut clause.binds))
        .collect();
    if !conditions.is_empty() {
        clause.sql = format!("WHERE {}", conditions.join(" AND "));
    }
    clause
}

fn render_predicate(predicate: &Predicate, binds: &mut Vec<BindValue>) -> String {
    match predicate {
        Predicate::Eq { column, value } => {
            format!("{column} = {}", push_bind(binds, value.into()))
        }
        Predicate::Contains { column, pattern } => format!(
            "{column} ILIKE {}",
            push_bind(binds, BindValue::Text(pattern.clone()))
        ),
        Predicate::Gte { column, value } => {
            format!("{column} >= {}", push_bind(binds, value.into()))
        }
        Predicate::Lte { column, value } => {
            format!("{column} <= {}", push_bind(binds, value.into()))
        }
        Predicate::Any(alternatives) if alternatives.is_empty() => "FALSE".to_string(),
        Predicate::Any(alternatives) => {
            let parts: Vec<String> = alternatives
                .iter()
                .map(|p| render_predicate(p, binds))
                .collect();
            format!("({})", parts.join(" OR "))
        }
        Predicate::MatchNone => "FALSE".to_string(),
    }
}

/// Queue a bind value and return its `$n` placeholder.
fn push_bind(binds: &mut Vec<BindValue>, value: BindValue) -> String {
    binds.push(value);
    format!("${}", binds.len())
}

/// Bind a slice of `BindValue` to a sqlx `QueryAs`.
fn bind_values<'q, O>(
    mut q: sqlx::query::QueryAs<'q, Postgres, O, PgArguments>,
    binds: &'q [BindValue],
) -> sqlx::query::QueryAs<'q, Postgres, O, PgArguments> {
    for val in binds {
        q = match val {
            BindValue::Id(v) => q.bind(*v),
            BindValue::Text(v) => q.bind(v.as_str()),
            BindValue::Timestamp(v) => q.bind(*v),
            BindValue::Bool(v) => q.bind(*v),
        };
    }
    q
}

/// Bind a slice of `BindValue` to a sqlx `QueryScalar`.
fn bind_values_scalar<'q>(
    mut q: sqlx::query::QueryScalar<'q, Postgres, i64, PgArguments>,
    binds: &'q [BindValue],
) -> sqlx::query::QueryScalar<'q, Postgres, i64, PgArguments> {
    for val in binds {
        q = match val {
            BindValue::Id(v) => q.bind(*v),
            BindValue::Text(v) => q.bind(v.as_str()),
            BindValue::Timestamp(v) => q.bind(*v),
            BindValue::Bool(v) => q.bind(*v),
        };
    }
    q
}

// ---------------------------------------------------------------------------
// Multi-row INSERT
// ---------------------------------------------------------------------------

/// Rows per INSERT statement in a bulk import, keeping the bind count well
/// under Postgres' 65535-parameter limit.
pub const INSERT_CHUNK_ROWS: usize = 1000;

/// Render `(..), (..)` VALUES tuples for a multi-row INSERT.
///
/// Each `{}` in `row_template` becomes the next `$n` placeholder, numbered
/// row by row from `$1`.
pub(crate) fn values_tuples(row_count: usize, row_template: &[&str]) -> String {
    let mut idx = 1usize;
    let mut rows = Vec::with_capacity(row_count);
    for _ in 0..row_count {
        let mut cells = Vec::with_capacity(row_template.len());
        for cell in row_template {
            cells.push(cell.replace("{}", &format!("${idx}")));
            idx += 1;
        }
        rows.push(format!("({})", cells.join(", ")));
    }
    rows.join(", ")
}

// ---------------------------------------------------------------------------
// Filtered list
// ---------------------------------------------------------------------------

/// Run a filtered list query and its distinct count.
///
/// With `options.count_only` the row query is skipped entirely, so no
/// limit/offset applies and `rows` is empty. Failures are logged here and
/// returned unchanged.
pub async fn find_and_count<T>(
    conn: &mut PgConnection,
    schema: &EntitySchema,
    query: &ListQuery,
    options: ListOptions,
) -> Result<ListPage<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let result = find_and_count_inner(conn, schema, query, options).await;
    if let Err(ref err) = result {
        tracing::error!(table = schema.table, error = %err, "Filtered list query failed");
    }
    result
}

async fn find_and_count_inner<T>(
    conn: &mut PgConnection,
    schema: &EntitySchema,
    query: &ListQuery,
    options: ListOptions,
) -> Result<ListPage<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let table = schema.table;
    let clause = build_where(&query.predicates);

    let count_sql = format!(
        "SELECT COUNT(DISTINCT {table}.id)::BIGINT FROM {table} {where_sql}",
        where_sql = clause.sql,
    );
    let count = bind_values_scalar(sqlx::query_scalar::<_, i64>(&count_sql), &clause.binds)
        .fetch_one(&mut *conn)
        .await?;

    if options.count_only {
        return Ok(ListPage {
            rows: Vec::new(),
            count,
        });
    }

    let mut rows_sql = format!(
        "SELECT {columns} FROM {table} {where_sql} ORDER BY {column} {direction}, id ASC",
        columns = schema.columns,
        where_sql = clause.sql,
        column = query.ordering.column,
        direction = query.ordering.direction.as_sql(),
    );
    if query.pagination.is_some() {
        let idx = clause.next_idx();
        rows_sql.push_str(&format!(" LIMIT ${idx} OFFSET ${}", idx + 1));
    }

    let mut q = bind_values(sqlx::query_as::<_, T>(&rows_sql), &clause.binds);
    if let Some(page) = query.pagination {
        q = q.bind(page.limit).bind(page.offset);
    }
    let rows = q.fetch_all(&mut *conn).await?;

    Ok(ListPage { rows, count })
}

// ---------------------------------------------------------------------------
// Autocomplete
// ---------------------------------------------------------------------------

/// `{id, label}` pairs whose id equals the query or whose label contains it,
/// ordered by label (nulls last) then id.
pub async fn autocomplete(
    conn: &mut PgConnection,
    schema: &EntitySchema,
    query: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> Result<Vec<AutocompleteItem>, sqlx::Error> {
    let predicates: Vec<Predicate> = query
        .and_then(|q| potwatch_core::filter::autocomplete_predicate(schema, q))
        .into_iter()
        .collect();
    let clause = build_where(&predicates);

    let mut sql = format!(
        "SELECT id, {label} AS label FROM {table} {where_sql} \
         ORDER BY {label} ASC NULLS LAST, id ASC",
        label = schema.label_column,
        table = schema.table,
        where_sql = clause.sql,
    );
    let limit = limit.filter(|l| *l > 0);
    let offset = offset.filter(|o| *o > 0);
    let mut idx = clause.next_idx();
    if limit.is_some() {
        sql.push_str(&format!(" LIMIT ${idx}"));
        idx += 1;
    }
    if offset.is_some() {
        sql.push_str(&format!(" OFFSET ${idx}"));
    }

    let mut q = bind_values(sqlx::query_as::<_, AutocompleteItem>(&sql), &clause.binds);
    if let Some(limit) = limit {
        q = q.bind(limit);
    }
    if let Some(offset) = offset {
        q = q.bind(offset);
    }
    q.fetch_all(&mut *conn).await
}

// ---------------------------------------------------------------------------
// Lookup
// ---------------------------------------------------------------------------

/// Find a single row by primary key.
pub async fn find_by_id<T>(
    conn: &mut PgConnection,
    schema: &EntitySchema,
    id: DbId,
) -> Result<Option<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE id = $1",
        columns = schema.columns,
        table = schema.table,
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
}

/// Find a single row by its bulk-import deduplication token.
pub async fn find_by_import_hash<T>(
    conn: &mut PgConnection,
    schema: &EntitySchema,
    import_hash: &str,
) -> Result<Option<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let sql = format!(
        "SELECT {columns} FROM {table} WHERE import_hash = $1",
        columns = schema.columns,
        table = schema.table,
    );
    sqlx::query_as::<_, T>(&sql)
        .bind(import_hash)
        .fetch_optional(&mut *conn)
        .await
}

// ---------------------------------------------------------------------------
// Stamp-then-delete
// ---------------------------------------------------------------------------

/// Stamp `deleted_by` on every targeted row, then delete them, inside one
/// transaction (a savepoint when `conn` is already in a transaction).
///
/// Only rows the stamp actually touched are deleted, so a row committed by
/// another session between the two statements is never removed unstamped.
/// Returns the removed rows as they were just before removal. Ids that do not
/// exist are skipped. On any failure nothing is stamped or removed.
pub async fn stamp_then_destroy<T>(
    conn: &mut PgConnection,
    schema: &EntitySchema,
    ids: &[DbId],
    actor: ActingUser,
) -> Result<Vec<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let table = schema.table;
    let mut tx = conn.begin().await?;

    let stamped: Vec<DbId> = sqlx::query_scalar(&format!(
        "UPDATE {table} SET deleted_by = $2 WHERE id = ANY($1) RETURNING id"
    ))
    .bind(ids)
    .bind(actor.id)
    .fetch_all(&mut *tx)
    .await?;

    if stamped.is_empty() {
        tx.commit().await?;
        return Ok(Vec::new());
    }

    let destroy_sql = format!(
        "DELETE FROM {table} WHERE id = ANY($1) RETURNING {columns}",
        columns = schema.columns,
    );
    let removed = sqlx::query_as::<_, T>(&destroy_sql)
        .bind(&stamped)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(removed)
}
