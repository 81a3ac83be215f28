use banchi_core::{MatchStatus, Money, RunStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::str::FromStr;

use crate::db::DbPool;

#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub id: i64,
    pub status: RunStatus,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub notes: Option<String>,
}

/// Insert a new run in `running` state and return its id.
pub async fn create_run(pool: &DbPool, notes: &str) -> Result<i64, sqlx::Error> {
    let result = sqlx::query("INSERT INTO reconciliation_runs (status, notes) VALUES ('running', ?)")
        .bind(notes)
        .execute(pool)
        .await?;
    Ok(result.last_insert_rowid())
}

/// Transition a run to `completed` with a finish timestamp.
pub async fn finish_run(pool: &DbPool, run_id: i64) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE reconciliation_runs SET status = 'completed', finished_at = datetime('now') \
         WHERE id = ?",
    )
    .bind(run_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Transition a run to `failed`, recording the error in its notes.
pub async fn fail_run(pool: &DbPool, run_id: i64, error_notes: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE reconciliation_runs SET status = 'failed', finished_at = datetime('now'), \
         notes = ? WHERE id = ?",
    )
    .bind(error_notes)
    .bind(run_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn get_run(pool: &DbPool, run_id: i64) -> Result<Option<RunRecord>, sqlx::Error> {
    let row: Option<(i64, String, String, Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT id, status, started_at, finished_at, notes FROM reconciliation_runs WHERE id = ?",
    )
    .bind(run_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| RunRecord {
        id: r.0,
        status: RunStatus::from_str(&r.1).unwrap_or(RunStatus::Failed),
        started_at: r.2,
        finished_at: r.3,
        notes: r.4,
    }))
}

#[derive(Debug, Clone)]
pub struct ResultUpsert {
    pub run_id: i64,
    pub transaction_id: i64,
    pub receipt_upload_id: Option<i64>,
    pub match_status: MatchStatus,
    pub confidence: f64,
    pub notes: Option<String>,
}

pub async fn upsert_result(pool: &DbPool, upsert: &ResultUpsert) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO reconciliation_results
            (run_id, transaction_id, receipt_upload_id, match_status, confidence, notes)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(run_id, transaction_id) DO UPDATE SET
            receipt_upload_id = excluded.receipt_upload_id,
            match_status = excluded.match_status,
            confidence = excluded.confidence,
            notes = excluded.notes
        "#,
    )
    .bind(upsert.run_id)
    .bind(upsert.transaction_id)
    .bind(upsert.receipt_upload_id)
    .bind(upsert.match_status.to_string())
    .bind(upsert.confidence)
    .bind(&upsert.notes)
    .execute(pool)
    .await?;

    Ok(())
}

/// A result row joined to its transaction's date/amount/description.
#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationResultRow {
    pub id: i64,
    pub transaction_id: i64,
    pub receipt_upload_id: Option<i64>,
    pub match_status: MatchStatus,
    pub confidence: f64,
    pub notes: Option<String>,
    pub txn_date: NaiveDate,
    pub amount: Money,
    pub description: String,
}

pub async fn results_for_run(
    pool: &DbPool,
    run_id: i64,
) -> Result<Vec<ReconciliationResultRow>, sqlx::Error> {
    type RowTuple = (
        i64,
        i64,
        Option<i64>,
        String,
        f64,
        Option<String>,
        NaiveDate,
        i64,
        String,
    );

    let rows = sqlx::query_as::<_, RowTuple>(
        r#"
        SELECT rr.id, rr.transaction_id, rr.receipt_upload_id, rr.match_status,
               rr.confidence, rr.notes, t.txn_date, t.amount_cents, t.description
        FROM reconciliation_results rr
        JOIN transactions t ON t.id = rr.transaction_id
        WHERE rr.run_id = ?
        ORDER BY t.txn_date, t.id
        "#,
    )
    .bind(run_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| ReconciliationResultRow {
            id: r.0,
            transaction_id: r.1,
            receipt_upload_id: r.2,
            match_status: MatchStatus::from_str(&r.3).unwrap_or(MatchStatus::Unmatched),
            confidence: r.4,
            notes: r.5,
            txn_date: r.6,
            amount: Money::from_cents(r.7),
            description: r.8,
        })
        .collect())
}
