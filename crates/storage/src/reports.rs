use banchi_core::{CategoryType, DateRange, Money, PnlLine, ReportType};
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::DbPool;

/// Aggregate totals straight off the transactions table. Zero matching rows
/// yield zero totals, never NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTotals {
    pub txn_count: i64,
    pub total_income: Money,
    pub total_expense: Money,
}

pub async fn summary_totals(pool: &DbPool, period: DateRange) -> Result<SummaryTotals, sqlx::Error> {
    let (count, income_cents, expense_cents): (i64, i64, i64) = sqlx::query_as(
        r#"
        SELECT
            COUNT(*),
            COALESCE(SUM(CASE WHEN amount_cents > 0 THEN amount_cents ELSE 0 END), 0),
            COALESCE(SUM(CASE WHEN amount_cents < 0 THEN -amount_cents ELSE 0 END), 0)
        FROM transactions
        WHERE txn_date BETWEEN ? AND ?
        "#,
    )
    .bind(period.start)
    .bind(period.end)
    .fetch_one(pool)
    .await?;

    Ok(SummaryTotals {
        txn_count: count,
        total_income: Money::from_cents(income_cents),
        total_expense: Money::from_cents(expense_cents),
    })
}

/// Signed per-group sums for the P&L: transactions outer-joined through their
/// classification to the category carrying the type tag. Unclassified rows
/// land in the ("other", "Unclassified") group.
pub async fn pnl_groups(pool: &DbPool, period: DateRange) -> Result<Vec<PnlLine>, sqlx::Error> {
    let rows: Vec<(String, String, i64)> = sqlx::query_as(
        r#"
        SELECT
            COALESCE(cat.type, 'other') AS category_type,
            COALESCE(cat.name_th, 'Unclassified') AS category_name_th,
            SUM(t.amount_cents) AS sum_cents
        FROM transactions t
        LEFT JOIN classifications c ON c.transaction_id = t.id
        LEFT JOIN categories cat ON cat.id = c.category_id
        WHERE t.txn_date BETWEEN ? AND ?
        GROUP BY COALESCE(cat.type, 'other'), COALESCE(cat.name_th, 'Unclassified')
        ORDER BY category_type, category_name_th
        "#,
    )
    .bind(period.start)
    .bind(period.end)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(type_label, name, cents)| PnlLine {
            category_type: CategoryType::from_label(&type_label),
            category_name_th: name,
            sum_amount: Money::from_cents(cents),
        })
        .collect())
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotRecord {
    pub id: i64,
    pub report_type: ReportType,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub generated_at: String,
    pub payload: serde_json::Value,
}

/// One live snapshot per (type, period): insert or fully overwrite.
pub async fn upsert_snapshot(
    pool: &DbPool,
    report_type: ReportType,
    period: DateRange,
    payload_json: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO report_snapshots (report_type, period_start, period_end, payload_json)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(report_type, period_start, period_end) DO UPDATE SET
            payload_json = excluded.payload_json,
            generated_at = datetime('now')
        "#,
    )
    .bind(report_type.as_str())
    .bind(period.start)
    .bind(period.end)
    .bind(payload_json)
    .execute(pool)
    .await?;

    Ok(())
}

/// Append-only trail: one row per generation, regardless of overwrites.
pub async fn append_report_history(
    pool: &DbPool,
    report_type: ReportType,
    period: DateRange,
    payload_json: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO report_history (report_type, period_start, period_end, payload_json) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(report_type.as_str())
    .bind(period.start)
    .bind(period.end)
    .bind(payload_json)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn get_snapshot(
    pool: &DbPool,
    report_type: ReportType,
    period: DateRange,
) -> Result<Option<SnapshotRecord>, sqlx::Error> {
    let row: Option<(i64, NaiveDate, NaiveDate, String, String)> = sqlx::query_as(
        "SELECT id, period_start, period_end, generated_at, payload_json \
         FROM report_snapshots \
         WHERE report_type = ? AND period_start = ? AND period_end = ? LIMIT 1",
    )
    .bind(report_type.as_str())
    .bind(period.start)
    .bind(period.end)
    .fetch_optional(pool)
    .await?;

    row.map(|r| {
        let payload = serde_json::from_str(&r.4).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(SnapshotRecord {
            id: r.0,
            report_type,
            period_start: r.1,
            period_end: r.2,
            generated_at: r.3,
            payload,
        })
    })
    .transpose()
}
