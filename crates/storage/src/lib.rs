pub mod categories;
pub mod classifications;
pub mod db;
pub mod ledger;
pub mod reconciliation;
pub mod reports;
pub mod uploads;

pub use categories::{ensure_category, resolve_category_id};
pub use classifications::{
    classification_count_for_upload, rows_for_upload, upsert_classification, ClassificationUpsert,
    ClassifiedRow,
};
pub use db::{create_db, seed_default_categories, DbPool};
pub use ledger::{
    insert_transaction, transactions_for_upload, transactions_in_period, NewTransaction,
    TransactionRecord,
};
pub use reconciliation::{
    create_run, fail_run, finish_run, get_run, results_for_run, upsert_result,
    ReconciliationResultRow, ResultUpsert, RunRecord,
};
pub use reports::{
    append_report_history, get_snapshot, pnl_groups, summary_totals, upsert_snapshot,
    SnapshotRecord, SummaryTotals,
};
pub use uploads::{
    get_upload, insert_upload, latest_receipt_upload, list_uploads, set_upload_status, NewUpload,
    UploadRecord,
};
