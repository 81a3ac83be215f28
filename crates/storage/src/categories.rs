use crate::db::DbPool;

/// Look up a category id by parent + localized name. A missing or empty name
/// short-circuits to `None` without touching the store; an unresolved name is
/// also `None` — never an error, since unclassifiable is a valid business
/// state surfaced downstream as a null category id.
pub async fn resolve_category_id(
    pool: &DbPool,
    parent_id: Option<i64>,
    name_th: Option<&str>,
) -> Result<Option<i64>, sqlx::Error> {
    let name = match name_th {
        Some(n) if !n.is_empty() => n,
        _ => return Ok(None),
    };

    let row: Option<(i64,)> = match parent_id {
        Some(parent) => {
            sqlx::query_as("SELECT id FROM categories WHERE parent_id = ? AND name_th = ? LIMIT 1")
                .bind(parent)
                .bind(name)
                .fetch_optional(pool)
                .await?
        }
        None => {
            sqlx::query_as("SELECT id FROM categories WHERE parent_id IS NULL AND name_th = ? LIMIT 1")
                .bind(name)
                .fetch_optional(pool)
                .await?
        }
    };

    Ok(row.map(|r| r.0))
}

/// Fetch-or-insert a category row, returning its id either way.
pub async fn ensure_category(
    pool: &DbPool,
    parent_id: Option<i64>,
    name_th: &str,
    category_type: Option<&str>,
) -> Result<i64, sqlx::Error> {
    if let Some(id) = resolve_category_id(pool, parent_id, Some(name_th)).await? {
        return Ok(id);
    }

    let result = sqlx::query("INSERT INTO categories (parent_id, name_th, type) VALUES (?, ?, ?)")
        .bind(parent_id)
        .bind(name_th)
        .bind(category_type)
        .execute(pool)
        .await?;

    Ok(result.last_insert_rowid())
}
