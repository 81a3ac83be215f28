pub mod classification;
pub mod extraction;
pub mod reconciliation;
pub mod reports;
pub mod uploads;


pub use classification::ClassificationService;
pub use extraction::ExtractionService;
pub use reconciliation::ReconciliationService;
pub use reports::ReportsService;
pub use uploads::UploadsService;
