use sqlx::{
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    Postgres,
};
use uuid::Uuid;

#[derive(Clone, Debug)]
pub enum SqlxBinds {
    String(String),
    Uuid(Uuid),
}

pub fn binds_query_as<'a, T: for<'r> sqlx::FromRow<'r, PgRow>>(
    stmt: &'a str,
    binds: Vec<SqlxBinds>,
) -> QueryAs<'a, Postgres, T, PgArguments> {
    let mut q: QueryAs<'_, Postgres, T, PgArguments> = sqlx::query_as(stmt);
    for bind in binds {
        q = match bind {
            SqlxBinds::String(val) => q.bind(val),
            SqlxBinds::Uuid(val) => q.bind(val),
        };
    }
    q
}

/// Build a `SELECT` statement. `wheres` are joined with `AND`, placeholders
/// inside them must already be numbered to match the binds.
pub fn query_builder(
    select: Option<&str>,
    table_name: &str,
    wheres: &[String],
    order_by: &[&str],
    limit: Option<u32>,
) -> String {
    let mut stmt = format!("SELECT {} FROM {}", select.unwrap_or("*"), table_name);

    if !wheres.is_empty() {
        stmt.push_str(" WHERE ");
        stmt.push_str(&wheres.join(" AND "));
    }

    if !order_by.is_empty() {
        stmt.push_str(" ORDER BY ");
        stmt.push_str(&order_by.join(", "));
    }

    if let Some(limit) = limit {
        stmt.push_str(&format!(" LIMIT {limit}"));
    }
    stmt
}
