use std::str::FromStr;

use banchi_core::{DateRange, PnlReport, ReportType, SummaryReport};
use banchi_storage::{self as storage, DbPool, SnapshotRecord};

use crate::error::ApiError;

#[derive(Clone)]
pub struct ReportsService {
    pool: DbPool,
}

impl ReportsService {
    pub fn new(pool: DbPool) -> Self {
        ReportsService { pool }
    }

    /// Compute period totals, persist the snapshot (upsert by period), append
    /// a history record, and return the payload. An empty period yields
    /// all-zero totals, never an error.
    pub async fn generate_summary(
        &self,
        period_start: &str,
        period_end: &str,
    ) -> Result<SummaryReport, ApiError> {
        let period = DateRange::parse(period_start, period_end)?;

        let totals = storage::summary_totals(&self.pool, period).await?;
        let payload = SummaryReport::new(
            period,
            totals.txn_count,
            totals.total_income,
            totals.total_expense,
        );

        self.persist(ReportType::Summary, period, &serde_json::to_string(&payload)?)
            .await?;
        Ok(payload)
    }

    /// Group the period's transactions by resolved category type and name,
    /// derive the totals and profit figures, and persist like the summary.
    pub async fn generate_pnl(
        &self,
        period_start: &str,
        period_end: &str,
    ) -> Result<PnlReport, ApiError> {
        let period = DateRange::parse(period_start, period_end)?;

        let lines = storage::pnl_groups(&self.pool, period).await?;
        let payload = PnlReport::from_lines(period, lines);

        self.persist(ReportType::Pnl, period, &serde_json::to_string(&payload)?)
            .await?;
        Ok(payload)
    }

    async fn persist(
        &self,
        report_type: ReportType,
        period: DateRange,
        payload_json: &str,
    ) -> Result<(), ApiError> {
        storage::upsert_snapshot(&self.pool, report_type, period, payload_json).await?;
        storage::append_report_history(&self.pool, report_type, period, payload_json).await?;
        tracing::info!("Generated {report_type} report for {period}");
        Ok(())
    }

    /// Fetch the live snapshot for an exact (type, period) key.
    pub async fn get_snapshot(
        &self,
        report_type: &str,
        period_start: &str,
        period_end: &str,
    ) -> Result<SnapshotRecord, ApiError> {
        let report_type = ReportType::from_str(report_type)
            .map_err(|_| ApiError::invalid("INVALID_REPORT_TYPE", "Invalid report type"))?;
        let period = DateRange::parse(period_start, period_end)?;

        storage::get_snapshot(&self.pool, report_type, period)
            .await?
            .ok_or_else(|| ApiError::not_found("REPORT_NOT_FOUND", "Report snapshot not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::classification::ClassificationService;
    use crate::services::extraction::ExtractionService;
    use crate::services::testutil::{registered_upload, service_pool};
    use banchi_core::category::COGS_TH;
    use banchi_core::{CategoryType, ClassificationSource, Money, UploadType};
    use banchi_storage::{ClassificationUpsert, NewTransaction};

    const PERIOD: (&str, &str) = ("2025-01-01", "2025-01-31");

    async fn extracted_and_classified(pool: &DbPool) -> i64 {
        let upload_id = registered_upload(pool, UploadType::BankStatement).await;
        ExtractionService::new(pool.clone())
            .extract_transactions(upload_id)
            .await
            .unwrap();
        ClassificationService::new(pool.clone(), false)
            .classify_upload(upload_id)
            .await
            .unwrap();
        upload_id
    }

    #[tokio::test]
    async fn summary_over_empty_period_is_all_zeros() {
        let (_dir, pool) = service_pool().await;
        let report = ReportsService::new(pool)
            .generate_summary(PERIOD.0, PERIOD.1)
            .await
            .unwrap();

        assert_eq!(report.txn_count, 0);
        assert!(report.total_income.is_zero());
        assert!(report.total_expense.is_zero());
        assert!(report.net.is_zero());
    }

    #[tokio::test]
    async fn summary_of_demo_upload() {
        let (_dir, pool) = service_pool().await;
        extracted_and_classified(&pool).await;

        let report = ReportsService::new(pool)
            .generate_summary(PERIOD.0, PERIOD.1)
            .await
            .unwrap();
        assert_eq!(report.txn_count, 3);
        assert_eq!(report.total_income, Money::from_cents(1500000));
        assert_eq!(report.total_expense, Money::from_cents(205000));
        assert_eq!(report.net, Money::from_cents(1295000));
    }

    #[tokio::test]
    async fn pnl_gross_profit_is_income_plus_cogs() {
        let (_dir, pool) = service_pool().await;
        let upload_id = registered_upload(&pool, UploadType::BankStatement).await;

        // One income txn of 1000.00 and one cogs-classified txn of -400.00.
        let sale = storage::insert_transaction(
            &pool,
            &NewTransaction {
                upload_id,
                txn_date: "2025-01-10".parse().unwrap(),
                amount: Money::from_cents(100000),
                currency: "THB".to_string(),
                description: "เงินโอนเข้าจากลูกค้า B".to_string(),
                account: "Main".to_string(),
                counterparty: None,
                source_ref: format!("upload:{upload_id}:1"),
            },
        )
        .await
        .unwrap();
        let materials = storage::insert_transaction(
            &pool,
            &NewTransaction {
                upload_id,
                txn_date: "2025-01-11".parse().unwrap(),
                amount: Money::from_cents(-40000),
                currency: "THB".to_string(),
                description: "วัตถุดิบ".to_string(),
                account: "Main".to_string(),
                counterparty: None,
                source_ref: format!("upload:{upload_id}:2"),
            },
        )
        .await
        .unwrap();

        let income_cat = storage::resolve_category_id(&pool, None, Some(banchi_core::category::INCOME_TH))
            .await
            .unwrap();
        let cogs_cat = storage::resolve_category_id(&pool, None, Some(COGS_TH)).await.unwrap();
        for (txn_id, category_id) in [(sale, income_cat), (materials, cogs_cat)] {
            storage::upsert_classification(
                &pool,
                &ClassificationUpsert {
                    transaction_id: txn_id,
                    category_id,
                    subcategory_id: None,
                    vendor: None,
                    tax_tag: None,
                    confidence: 0.65,
                    source: ClassificationSource::Rule,
                },
            )
            .await
            .unwrap();
        }

        let report = ReportsService::new(pool)
            .generate_pnl(PERIOD.0, PERIOD.1)
            .await
            .unwrap();

        assert_eq!(report.totals.income, Money::from_cents(100000));
        assert_eq!(report.totals.cogs, Money::from_cents(-40000));
        assert_eq!(report.gross_profit, Money::from_cents(60000));
        assert_eq!(report.net_profit, Money::from_cents(60000));
    }

    #[tokio::test]
    async fn pnl_buckets_unclassified_as_other() {
        let (_dir, pool) = service_pool().await;
        let upload_id = registered_upload(&pool, UploadType::BankStatement).await;
        ExtractionService::new(pool.clone())
            .extract_transactions(upload_id)
            .await
            .unwrap();
        // No classification run: everything lands in ("other", "Unclassified").

        let report = ReportsService::new(pool)
            .generate_pnl(PERIOD.0, PERIOD.1)
            .await
            .unwrap();
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].category_type, CategoryType::Other);
        assert_eq!(report.lines[0].category_name_th, "Unclassified");
        assert_eq!(report.totals.other, Money::from_cents(1295000));
        assert!(report.gross_profit.is_zero());
    }

    #[tokio::test]
    async fn snapshot_round_trip_is_deep_equal() {
        let (_dir, pool) = service_pool().await;
        extracted_and_classified(&pool).await;
        let service = ReportsService::new(pool);

        let generated = service.generate_pnl(PERIOD.0, PERIOD.1).await.unwrap();
        // Fetch with a timestamped period: normalization makes it the same key.
        let snapshot = service
            .get_snapshot("pnl", "2025-01-01T00:00:00Z", "2025-01-31T12:00:00Z")
            .await
            .unwrap();

        assert_eq!(snapshot.payload, serde_json::to_value(&generated).unwrap());
    }

    #[tokio::test]
    async fn regeneration_overwrites_snapshot_and_appends_history() {
        let (_dir, pool) = service_pool().await;
        let service = ReportsService::new(pool.clone());

        service.generate_summary(PERIOD.0, PERIOD.1).await.unwrap();
        extracted_and_classified(&pool).await;
        let second = service.generate_summary(PERIOD.0, PERIOD.1).await.unwrap();

        let snapshot = service.get_snapshot("summary", PERIOD.0, PERIOD.1).await.unwrap();
        assert_eq!(snapshot.payload, serde_json::to_value(&second).unwrap());

        let (history,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM report_history")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(history, 2);
    }

    #[tokio::test]
    async fn invalid_report_type_is_rejected() {
        let (_dir, pool) = service_pool().await;
        let err = ReportsService::new(pool)
            .get_snapshot("balance_sheet", PERIOD.0, PERIOD.1)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput { code: "INVALID_REPORT_TYPE", .. }));
    }

    #[tokio::test]
    async fn missing_snapshot_is_not_found() {
        let (_dir, pool) = service_pool().await;
        let err = ReportsService::new(pool)
            .get_snapshot("summary", PERIOD.0, PERIOD.1)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound { code: "REPORT_NOT_FOUND", .. }));
    }
}
