use banchi_core::{Money, UploadStatus, UploadType};
use banchi_storage::{self as storage, DbPool, NewTransaction, TransactionRecord};
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ExtractionOutcome {
    pub inserted: i64,
    pub transactions: Vec<TransactionRecord>,
}

#[derive(Clone)]
pub struct ExtractionService {
    pool: DbPool,
}

impl ExtractionService {
    pub fn new(pool: DbPool) -> Self {
        ExtractionService { pool }
    }

    /// Placeholder statement extraction: marks the upload processing, inserts
    /// a fixed set of demo transactions (none if rows already exist), and
    /// marks it processed. Real statement parsing happens elsewhere.
    pub async fn extract_transactions(&self, upload_id: i64) -> Result<ExtractionOutcome, ApiError> {
        let upload = storage::get_upload(&self.pool, upload_id)
            .await?
            .ok_or_else(|| ApiError::not_found("UPLOAD_NOT_FOUND", "Upload not found"))?;

        if upload.upload_type != UploadType::BankStatement {
            return Err(ApiError::precondition(
                "INVALID_UPLOAD_TYPE",
                "Extraction currently supports bank_statement uploads only",
            ));
        }

        storage::set_upload_status(&self.pool, upload_id, UploadStatus::Processing, None).await?;

        // Re-running extraction is a no-op once transactions exist.
        let existing = storage::transactions_for_upload(&self.pool, upload_id).await?;
        if !existing.is_empty() {
            storage::set_upload_status(&self.pool, upload_id, UploadStatus::Processed, None).await?;
            return Ok(ExtractionOutcome { inserted: 0, transactions: existing });
        }

        let mut inserted = 0;
        for demo in demo_transactions(upload_id) {
            storage::insert_transaction(&self.pool, &demo).await?;
            inserted += 1;
        }
        tracing::info!("Extracted {inserted} demo transactions for upload {upload_id}");

        storage::set_upload_status(&self.pool, upload_id, UploadStatus::Processed, None).await?;

        let transactions = storage::transactions_for_upload(&self.pool, upload_id).await?;
        Ok(ExtractionOutcome { inserted, transactions })
    }
}

fn demo_date(m: u32, d: u32) -> NaiveDate {
    // The demo statement is pinned to January 2025.
    NaiveDate::from_ymd_opt(2025, m, d).expect("valid demo date")
}

fn demo_transactions(upload_id: i64) -> Vec<NewTransaction> {
    vec![
        NewTransaction {
            upload_id,
            txn_date: demo_date(1, 5),
            amount: Money::from_cents(-25000),
            currency: "THB".to_string(),
            description: "7-ELEVEN ถนนสุขุมวิท".to_string(),
            account: "Main".to_string(),
            counterparty: Some("7-ELEVEN".to_string()),
            source_ref: format!("upload:{upload_id}:1"),
        },
        NewTransaction {
            upload_id,
            txn_date: demo_date(1, 6),
            amount: Money::from_cents(-180000),
            currency: "THB".to_string(),
            description: "ค่าเช่าออฟฟิศ เดือนมกราคม".to_string(),
            account: "Main".to_string(),
            counterparty: Some("Landlord".to_string()),
            source_ref: format!("upload:{upload_id}:2"),
        },
        NewTransaction {
            upload_id,
            txn_date: demo_date(1, 7),
            amount: Money::from_cents(1500000),
            currency: "THB".to_string(),
            description: "เงินโอนเข้าจากลูกค้า A".to_string(),
            account: "Main".to_string(),
            counterparty: Some("Customer A".to_string()),
            source_ref: format!("upload:{upload_id}:3"),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testutil::{registered_upload, service_pool};

    #[tokio::test]
    async fn extracts_demo_transactions_in_date_order() {
        let (_dir, pool) = service_pool().await;
        let upload_id = registered_upload(&pool, UploadType::BankStatement).await;

        let outcome = ExtractionService::new(pool.clone())
            .extract_transactions(upload_id)
            .await
            .unwrap();

        assert_eq!(outcome.inserted, 3);
        let amounts: Vec<i64> = outcome.transactions.iter().map(|t| t.amount.to_cents()).collect();
        assert_eq!(amounts, vec![-25000, -180000, 1500000]);
        assert_eq!(outcome.transactions[0].source_ref, format!("upload:{upload_id}:1"));

        let upload = storage::get_upload(&pool, upload_id).await.unwrap().unwrap();
        assert_eq!(upload.status, UploadStatus::Processed);
    }

    #[tokio::test]
    async fn extraction_is_idempotent() {
        let (_dir, pool) = service_pool().await;
        let upload_id = registered_upload(&pool, UploadType::BankStatement).await;
        let service = ExtractionService::new(pool);

        let first = service.extract_transactions(upload_id).await.unwrap();
        let second = service.extract_transactions(upload_id).await.unwrap();

        assert_eq!(first.inserted, 3);
        assert_eq!(second.inserted, 0);
        assert_eq!(second.transactions.len(), 3);
    }

    #[tokio::test]
    async fn rejects_non_statement_uploads() {
        let (_dir, pool) = service_pool().await;
        let upload_id = registered_upload(&pool, UploadType::Receipt).await;

        let err = ExtractionService::new(pool)
            .extract_transactions(upload_id)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::PreconditionFailed { code: "INVALID_UPLOAD_TYPE", .. }
        ));
    }

    #[tokio::test]
    async fn unknown_upload_is_not_found() {
        let (_dir, pool) = service_pool().await;
        let err = ExtractionService::new(pool)
            .extract_transactions(12345)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { code: "UPLOAD_NOT_FOUND", .. }));
    }
}
