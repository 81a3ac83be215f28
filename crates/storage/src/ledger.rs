use banchi_core::{normalize_text, DateRange, Money};
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::DbPool;

#[derive(Debug, Clone, Serialize)]
pub struct TransactionRecord {
    pub id: i64,
    pub upload_id: i64,
    pub txn_date: NaiveDate,
    pub amount: Money,
    pub currency: String,
    pub description: String,
    pub account: String,
    pub counterparty: Option<String>,
    pub source_ref: String,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub upload_id: i64,
    pub txn_date: NaiveDate,
    pub amount: Money,
    pub currency: String,
    pub description: String,
    pub account: String,
    pub counterparty: Option<String>,
    /// Unique within an upload; ties the row to its position in the source.
    pub source_ref: String,
}

type TxnTuple = (
    i64,
    i64,
    NaiveDate,
    i64,
    String,
    String,
    String,
    Option<String>,
    String,
);

fn from_tuple(r: TxnTuple) -> TransactionRecord {
    TransactionRecord {
        id: r.0,
        upload_id: r.1,
        txn_date: r.2,
        amount: Money::from_cents(r.3),
        currency: r.4,
        description: r.5,
        account: r.6,
        counterparty: r.7,
        source_ref: r.8,
    }
}

const SELECT_COLUMNS: &str = "id, upload_id, txn_date, amount_cents, currency, description, \
                              account, counterparty, source_ref";

pub async fn insert_transaction(pool: &DbPool, new: &NewTransaction) -> Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO transactions
            (upload_id, txn_date, amount_cents, currency, description, account, counterparty,
             source_ref, normalized_description, normalized_counterparty, normalized_account)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.upload_id)
    .bind(new.txn_date)
    .bind(new.amount.to_cents())
    .bind(&new.currency)
    .bind(&new.description)
    .bind(&new.account)
    .bind(&new.counterparty)
    .bind(&new.source_ref)
    .bind(normalize_text(&new.description))
    .bind(new.counterparty.as_deref().map(normalize_text))
    .bind(normalize_text(&new.account))
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

pub async fn transactions_for_upload(
    pool: &DbPool,
    upload_id: i64,
) -> Result<Vec<TransactionRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TxnTuple>(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions WHERE upload_id = ? ORDER BY txn_date, id"
    ))
    .bind(upload_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(from_tuple).collect())
}

pub async fn transactions_in_period(
    pool: &DbPool,
    period: DateRange,
) -> Result<Vec<TransactionRecord>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TxnTuple>(&format!(
        "SELECT {SELECT_COLUMNS} FROM transactions WHERE txn_date BETWEEN ? AND ? \
         ORDER BY txn_date, id"
    ))
    .bind(period.start)
    .bind(period.end)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(from_tuple).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::testutil::{seeded_pool, statement_upload, txn};

    #[tokio::test]
    async fn insert_and_list_ordered_by_date_then_id() {
        let (_dir, pool) = seeded_pool().await;
        let upload = statement_upload(&pool).await;

        // Inserted out of date order; two rows share a date.
        insert_transaction(&pool, &txn(upload, "2025-01-07", 1500000, "c", 1)).await.unwrap();
        insert_transaction(&pool, &txn(upload, "2025-01-05", -25000, "a", 2)).await.unwrap();
        insert_transaction(&pool, &txn(upload, "2025-01-05", -1000, "b", 3)).await.unwrap();

        let rows = transactions_for_upload(&pool, upload).await.unwrap();
        let descs: Vec<&str> = rows.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(descs, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn normalized_columns_are_populated() {
        let (_dir, pool) = seeded_pool().await;
        let upload = statement_upload(&pool).await;
        let mut t = txn(upload, "2025-01-05", -25000, "  7-ELEVEN  ถนนสุขุมวิท ", 1);
        t.counterparty = Some("7-ELEVEN".to_string());
        let id = insert_transaction(&pool, &t).await.unwrap();

        let (norm_desc, norm_cp): (String, Option<String>) = sqlx::query_as(
            "SELECT normalized_description, normalized_counterparty FROM transactions WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(norm_desc, "7-eleven ถนนสุขุมวิท");
        assert_eq!(norm_cp.as_deref(), Some("7-eleven"));
    }

    #[tokio::test]
    async fn source_ref_is_unique_per_upload() {
        let (_dir, pool) = seeded_pool().await;
        let upload = statement_upload(&pool).await;
        insert_transaction(&pool, &txn(upload, "2025-01-05", -25000, "a", 1)).await.unwrap();
        let dup = insert_transaction(&pool, &txn(upload, "2025-01-06", -100, "b", 1)).await;
        assert!(dup.is_err());
    }

    #[tokio::test]
    async fn period_listing_is_inclusive() {
        let (_dir, pool) = seeded_pool().await;
        let upload = statement_upload(&pool).await;
        insert_transaction(&pool, &txn(upload, "2025-01-01", 100, "start", 1)).await.unwrap();
        insert_transaction(&pool, &txn(upload, "2025-01-31", 100, "end", 2)).await.unwrap();
        insert_transaction(&pool, &txn(upload, "2025-02-01", 100, "outside", 3)).await.unwrap();

        let period = DateRange::parse("2025-01-01", "2025-01-31").unwrap();
        let rows = transactions_in_period(&pool, period).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].description, "start");
        assert_eq!(rows[1].description, "end");
    }

    #[tokio::test]
    async fn amount_survives_cents_round_trip() {
        let (_dir, pool) = seeded_pool().await;
        let upload = statement_upload(&pool).await;
        insert_transaction(&pool, &txn(upload, "2025-01-05", -180050, "rent", 1)).await.unwrap();
        let rows = transactions_for_upload(&pool, upload).await.unwrap();
        assert_eq!(rows[0].amount, Money::from_cents(-180050));
    }
}
