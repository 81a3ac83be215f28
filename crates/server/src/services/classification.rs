use banchi_classify::{classify, ClassifiableTransaction};
use banchi_core::ClassificationSource;
use banchi_storage::{self as storage, ClassificationUpsert, ClassifiedRow, DbPool};
use serde::Serialize;

use crate::error::ApiError;

#[derive(Debug, Serialize)]
pub struct ClassificationEntry {
    pub transaction_id: i64,
    pub category_id: Option<i64>,
    pub subcategory_id: Option<i64>,
    pub vendor: Option<String>,
    pub tax_tag: Option<String>,
    pub confidence: f64,
    pub source: ClassificationSource,
}

#[derive(Debug, Serialize)]
pub struct ClassifyOutcome {
    pub upload_id: i64,
    pub classified_count: usize,
    pub classifications: Vec<ClassificationEntry>,
    pub ai_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct ClassificationListing {
    pub upload_id: i64,
    pub rows: Vec<ClassifiedRow>,
}

#[derive(Clone)]
pub struct ClassificationService {
    pool: DbPool,
    /// Injected at construction; when set, the rule decision is re-tagged as
    /// AI output with its confidence floored at 0.7.
    ai_enabled: bool,
}

impl ClassificationService {
    pub fn new(pool: DbPool, ai_enabled: bool) -> Self {
        ClassificationService { pool, ai_enabled }
    }

    /// Classify every transaction of an upload and upsert one classification
    /// row per transaction. Always a full recompute: re-running overwrites
    /// each row in place.
    pub async fn classify_upload(&self, upload_id: i64) -> Result<ClassifyOutcome, ApiError> {
        let txns = storage::transactions_for_upload(&self.pool, upload_id).await?;
        if txns.is_empty() {
            return Err(ApiError::precondition(
                "NO_TRANSACTIONS",
                "No transactions found for this upload. Run extraction first.",
            ));
        }

        let mut classifications = Vec::with_capacity(txns.len());
        for txn in &txns {
            let decision = classify(
                &ClassifiableTransaction {
                    amount_cents: txn.amount.to_cents(),
                    description: txn.description.clone(),
                    counterparty: txn.counterparty.clone(),
                },
                self.ai_enabled,
            );

            let category_id =
                storage::resolve_category_id(&self.pool, None, Some(decision.category_hint))
                    .await?;
            let subcategory_id = match decision.subcategory_hint {
                Some(hint) => {
                    storage::resolve_category_id(&self.pool, category_id, Some(hint)).await?
                }
                None => None,
            };

            storage::upsert_classification(
                &self.pool,
                &ClassificationUpsert {
                    transaction_id: txn.id,
                    category_id,
                    subcategory_id,
                    vendor: decision.vendor.clone(),
                    tax_tag: decision.tax_tag.clone(),
                    confidence: decision.confidence,
                    source: decision.source,
                },
            )
            .await?;

            classifications.push(ClassificationEntry {
                transaction_id: txn.id,
                category_id,
                subcategory_id,
                vendor: decision.vendor,
                tax_tag: decision.tax_tag,
                confidence: decision.confidence,
                source: decision.source,
            });
        }

        tracing::info!(
            "Classified {} transactions for upload {upload_id} (ai_enabled={})",
            classifications.len(),
            self.ai_enabled
        );

        Ok(ClassifyOutcome {
            upload_id,
            classified_count: classifications.len(),
            classifications,
            ai_enabled: self.ai_enabled,
        })
    }

    /// Transactions outer-joined to their classification and resolved
    /// category names. An upload with no transactions yields an empty list.
    pub async fn list_by_upload(&self, upload_id: i64) -> Result<ClassificationListing, ApiError> {
        let rows = storage::rows_for_upload(&self.pool, upload_id).await?;
        Ok(ClassificationListing { upload_id, rows })
    }
}
