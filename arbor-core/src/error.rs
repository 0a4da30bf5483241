use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Invalid audit type: {0}. Must be one of: design, code")]
    InvalidAuditType(String),

    #[error("Crawl failed: {0}")]
    Crawl(#[from] arbor_scanner::CrawlError),

    #[error("Evaluation failed: {0}")]
    Evaluate(String),

    #[error("Invalid evaluation report: {0}")]
    Report(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AuditError>;
