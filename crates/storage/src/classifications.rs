use banchi_core::{ClassificationSource, Money};
use chrono::NaiveDate;
use serde::Serialize;
use std::str::FromStr;

use crate::db::DbPool;

/// One classification write, keyed by transaction id. Every field is
/// overwritten on conflict — classification is a full recompute.
#[derive(Debug, Clone)]
pub struct ClassificationUpsert {
    pub transaction_id: i64,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub vendor: Option<String>,
    pub tax_tag: Option<String>,
    pub confidence: f64,
    pub source: ClassificationSource,
}

pub async fn upsert_classification(
    pool: &DbPool,
    upsert: &ClassificationUpsert,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO classifications
            (transaction_id, category_id, subcategory_id, vendor, tax_tag, confidence, source)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(transaction_id) DO UPDATE SET
            category_id = excluded.category_id,
            subcategory_id = excluded.subcategory_id,
            vendor = excluded.vendor,
            tax_tag = excluded.tax_tag,
            confidence = excluded.confidence,
            source = excluded.source,
            updated_at = datetime('now')
        "#,
    )
    .bind(upsert.transaction_id)
    .bind(upsert.category_id)
    .bind(upsert.subcategory_id)
    .bind(&upsert.vendor)
    .bind(&upsert.tax_tag)
    .bind(upsert.confidence)
    .bind(upsert.source.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// A transaction outer-joined to its (possibly absent) classification and
/// resolved category names.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedRow {
    pub transaction_id: i64,
    pub txn_date: NaiveDate,
    pub amount: Money,
    pub currency: String,
    pub description: String,
    pub classification_id: Option<i64>,
    pub vendor: Option<String>,
    pub tax_tag: Option<String>,
    pub confidence: Option<f64>,
    pub source: Option<ClassificationSource>,
    pub category_name_th: Option<String>,
    pub subcategory_name_th: Option<String>,
}

pub async fn rows_for_upload(
    pool: &DbPool,
    upload_id: i64,
) -> Result<Vec<ClassifiedRow>, sqlx::Error> {
    type RowTuple = (
        i64,
        NaiveDate,
        i64,
        String,
        String,
        Option<i64>,
        Option<String>,
        Option<String>,
        Option<f64>,
        Option<String>,
        Option<String>,
        Option<String>,
    );

    let rows = sqlx::query_as::<_, RowTuple>(
        r#"
        SELECT
            t.id,
            t.txn_date,
            t.amount_cents,
            t.currency,
            t.description,
            c.id,
            c.vendor,
            c.tax_tag,
            c.confidence,
            c.source,
            cat.name_th,
            sub.name_th
        FROM transactions t
        LEFT JOIN classifications c ON c.transaction_id = t.id
        LEFT JOIN categories cat ON cat.id = c.category_id
        LEFT JOIN categories sub ON sub.id = c.subcategory_id
        WHERE t.upload_id = ?
        ORDER BY t.txn_date, t.id
        "#,
    )
    .bind(upload_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ClassifiedRow {
            transaction_id: r.0,
            txn_date: r.1,
            amount: Money::from_cents(r.2),
            currency: r.3,
            description: r.4,
            classification_id: r.5,
            vendor: r.6,
            tax_tag: r.7,
            confidence: r.8,
            source: r.9.as_deref().and_then(|s| ClassificationSource::from_str(s).ok()),
            category_name_th: r.10,
            subcategory_name_th: r.11,
        })
        .collect())
}

pub async fn classification_count_for_upload(
    pool: &DbPool,
    upload_id: i64,
) -> Result<i64, sqlx::Error> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM classifications c \
         JOIN transactions t ON t.id = c.transaction_id WHERE t.upload_id = ?",
    )
    .bind(upload_id)
    .fetch_one(pool)
    .await?;

    Ok(count)
}
