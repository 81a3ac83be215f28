use banchi_core::{normalize_text, truncate_chars, DateRange, MatchStatus, RunStatus};
use banchi_storage::{
    self as storage, DbPool, ReconciliationResultRow, ResultUpsert, RunRecord,
};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ReconciliationOutcome {
    pub run_id: i64,
    pub status: RunStatus,
    pub transactions_processed: usize,
}

#[derive(Debug, Serialize)]
pub struct RunWithResults {
    pub run: RunRecord,
    pub results: Vec<ReconciliationResultRow>,
}

#[derive(Clone)]
pub struct ReconciliationService {
    pool: DbPool,
}

impl ReconciliationService {
    pub fn new(pool: DbPool) -> Self {
        ReconciliationService { pool }
    }

    /// Run reconciliation over a period. The run row is created `running` and
    /// always reaches a terminal state before this returns: `completed` on
    /// success, `failed` (with the error recorded in its notes) when any step
    /// fails — in which case the error carries the run id, since the steps
    /// are not one atomic transaction and partial results may exist.
    pub async fn run(&self, period_start: &str, period_end: &str) -> Result<ReconciliationOutcome, ApiError> {
        let period = DateRange::parse(period_start, period_end)?;

        let run_id = storage::create_run(&self.pool, "auto-run").await?;

        match self.run_steps(run_id, period).await {
            Ok(processed) => {
                storage::finish_run(&self.pool, run_id).await?;
                tracing::info!("Reconciliation run {run_id} completed ({processed} transactions)");
                Ok(ReconciliationOutcome {
                    run_id,
                    status: RunStatus::Completed,
                    transactions_processed: processed,
                })
            }
            Err(e) => {
                tracing::warn!("Reconciliation run {run_id} failed: {e}");
                storage::fail_run(&self.pool, run_id, &e.to_string()).await?;
                Err(ApiError::ReconciliationFailed { run_id })
            }
        }
    }

    async fn run_steps(&self, run_id: i64, period: DateRange) -> Result<usize, sqlx::Error> {
        let txns = storage::transactions_in_period(&self.pool, period).await?;

        // Placeholder matching: the single newest receipt upload is assigned
        // to every expense transaction in the period.
        let receipt_id = storage::latest_receipt_upload(&self.pool).await?;

        for txn in &txns {
            let (match_status, confidence, notes) = if txn.amount.is_negative() && receipt_id.is_some() {
                let desc = truncate_chars(&normalize_text(&txn.description), 50);
                (
                    MatchStatus::Partial,
                    0.35,
                    Some(format!(
                        "Heuristic: assigned latest receipt upload to expense txn; desc={desc}"
                    )),
                )
            } else {
                (MatchStatus::Unmatched, 0.0, None)
            };

            storage::upsert_result(
                &self.pool,
                &ResultUpsert {
                    run_id,
                    transaction_id: txn.id,
                    receipt_upload_id: receipt_id,
                    match_status,
                    confidence,
                    notes,
                },
            )
            .await?;
        }

        Ok(txns.len())
    }

    pub async fn get_run(&self, run_id: i64) -> Result<RunWithResults, ApiError> {
        let run = storage::get_run(&self.pool, run_id)
            .await?
            .ok_or_else(|| ApiError::not_found("RUN_NOT_FOUND", "Reconciliation run not found"))?;

        let results = storage::results_for_run(&self.pool, run_id).await?;
        Ok(RunWithResults { run, results })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::extraction::ExtractionService;
    use crate::services::testutil::{registered_upload, service_pool};
    use banchi_core::UploadType;

    const PERIOD: (&str, &str) = ("2025-01-01", "2025-01-31");

    async fn extracted_upload(pool: &DbPool) -> i64 {
        let upload_id = registered_upload(pool, UploadType::BankStatement).await;
        ExtractionService::new(pool.clone())
            .extract_transactions(upload_id)
            .await
            .unwrap();
        upload_id
    }

    #[tokio::test]
    async fn no_receipts_means_everything_unmatched() {
        let (_dir, pool) = service_pool().await;
        extracted_upload(&pool).await;
        let service = ReconciliationService::new(pool);

        let outcome = service.run(PERIOD.0, PERIOD.1).await.unwrap();
        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.transactions_processed, 3);

        let details = service.get_run(outcome.run_id).await.unwrap();
        assert_eq!(details.run.status, RunStatus::Completed);
        assert!(details.run.finished_at.is_some());
        for result in &details.results {
            assert_eq!(result.match_status, MatchStatus::Unmatched);
            assert_eq!(result.confidence, 0.0);
            assert!(result.notes.is_none());
        }
    }

    #[tokio::test]
    async fn newest_receipt_is_assigned_to_every_expense() {
        let (_dir, pool) = service_pool().await;
        extracted_upload(&pool).await;
        registered_upload(&pool, UploadType::Receipt).await;
        let newest_receipt = registered_upload(&pool, UploadType::Receipt).await;

        let service = ReconciliationService::new(pool);
        let outcome = service.run(PERIOD.0, PERIOD.1).await.unwrap();
        let details = service.get_run(outcome.run_id).await.unwrap();

        // Results follow (txn_date, id): expense, expense, income.
        let expenses: Vec<_> = details
            .results
            .iter()
            .filter(|r| r.amount.is_negative())
            .collect();
        assert_eq!(expenses.len(), 2);
        for expense in &expenses {
            assert_eq!(expense.match_status, MatchStatus::Partial);
            assert_eq!(expense.confidence, 0.35);
            assert_eq!(expense.receipt_upload_id, Some(newest_receipt));
            let notes = expense.notes.as_deref().unwrap();
            assert!(notes.starts_with("Heuristic: assigned latest receipt upload"));
        }

        let income = details.results.last().unwrap();
        assert!(income.amount.is_positive());
        assert_eq!(income.match_status, MatchStatus::Unmatched);
        assert_eq!(income.confidence, 0.0);
    }

    #[tokio::test]
    async fn notes_embed_truncated_normalized_description() {
        let (_dir, pool) = service_pool().await;
        extracted_upload(&pool).await;
        registered_upload(&pool, UploadType::Receipt).await;

        let service = ReconciliationService::new(pool);
        let outcome = service.run(PERIOD.0, PERIOD.1).await.unwrap();
        let details = service.get_run(outcome.run_id).await.unwrap();

        let notes = details.results[0].notes.as_deref().unwrap();
        // "7-ELEVEN ถนนสุขุมวิท" normalized: lowercased, whitespace collapsed.
        assert!(notes.ends_with("desc=7-eleven ถนนสุขุมวิท"));
    }

    #[tokio::test]
    async fn timestamps_are_normalized_to_date_only() {
        let (_dir, pool) = service_pool().await;
        extracted_upload(&pool).await;

        let outcome = ReconciliationService::new(pool)
            .run("2025-01-01T00:00:00Z", "2025-01-31T23:59:59Z")
            .await
            .unwrap();
        assert_eq!(outcome.transactions_processed, 3);
    }

    #[tokio::test]
    async fn invalid_period_is_rejected_before_creating_a_run() {
        let (_dir, pool) = service_pool().await;
        let service = ReconciliationService::new(pool.clone());

        let err = service.run("garbage", "2025-01-31").await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { code: "VALIDATION_ERROR", .. }));

        let (runs,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM reconciliation_runs")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(runs, 0);
    }

    #[tokio::test]
    async fn empty_period_still_completes() {
        let (_dir, pool) = service_pool().await;
        let service = ReconciliationService::new(pool);

        let outcome = service.run("2030-01-01", "2030-01-31").await.unwrap();
        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.transactions_processed, 0);
        assert!(service.get_run(outcome.run_id).await.unwrap().results.is_empty());
    }

    #[tokio::test]
    async fn unknown_run_is_not_found() {
        let (_dir, pool) = service_pool().await;
        let err = ReconciliationService::new(pool).get_run(999).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { code: "RUN_NOT_FOUND", .. }));
    }

    #[tokio::test]
    async fn step_failure_marks_the_run_failed() {
        let (_dir, pool) = service_pool().await;
        extracted_upload(&pool).await;

        // Sabotage the results table so the per-transaction writes fail.
        sqlx::query("DROP TABLE reconciliation_results")
            .execute(&pool)
            .await
            .unwrap();

        let service = ReconciliationService::new(pool.clone());
        let err = service.run(PERIOD.0, PERIOD.1).await.unwrap_err();

        let run_id = match err {
            ApiError::ReconciliationFailed { run_id } => run_id,
            other => panic!("expected ReconciliationFailed, got {other:?}"),
        };

        let run = storage::get_run(&pool, run_id).await.unwrap().unwrap();
        assert_eq!(run.status, RunStatus::Failed);
        assert!(run.finished_at.is_some());
        assert!(run.notes.is_some());
    }
}
