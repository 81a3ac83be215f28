use banchi_storage::DbPool;

use crate::config::Config;
use crate::services::{
    ClassificationService, ExtractionService, ReconciliationService, ReportsService,
    UploadsService,
};

/// One instance of each pipeline service, constructed at startup and shared
/// by reference through the router. Services hold no mutable state — the
/// store is the only shared resource.
#[derive(Clone)]
pub struct AppState {
    pub uploads: UploadsService,
    pub extraction: ExtractionService,
    pub classification: ClassificationService,
    pub reconciliation: ReconciliationService,
    pub reports: ReportsService,
}

impl AppState {
    pub fn new(pool: DbPool, config: &Config) -> Self {
        AppState {
            uploads: UploadsService::new(pool.clone()),
            extraction: ExtractionService::new(pool.clone()),
            classification: ClassificationService::new(pool.clone(), config.ai_enabled),
            reconciliation: ReconciliationService::new(pool.clone()),
            reports: ReportsService::new(pool),
        }
    }
}
