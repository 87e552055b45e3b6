use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocError {
    #[error("Config directory not found at {0}. Run 'jobdocs init' to create it.")]
    ConfigNotFound(PathBuf),

    #[error("Config file not found: {0}")]
    ConfigFileNotFound(PathBuf),

    #[error("Failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to parse draft {path}: {reason}")]
    DraftParse { path: PathBuf, reason: String },

    #[error("Customer '{0}' not found in customers.toml")]
    CustomerNotFound(String),

    #[error("Draft has no customer name. Set 'customer' or 'customer_name' before generating.")]
    MissingCustomerName,

    #[error("Invalid date '{0}'. Expected YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("Payment amount must be greater than zero")]
    InvalidPaymentAmount,

    #[error("Check payments require --check-number")]
    CheckNumberRequired,

    #[error("Document '{0}' not found in history")]
    DocumentNotFound(String),

    #[error("Invalid document index '{0}'. Use 'jobdocs list' to see generated documents.")]
    InvalidDocumentIndex(String),

    #[error("No payments recorded for {0}")]
    NoPayments(String),

    #[error("Invalid payment index {index} for {document} (only {count} payment(s) recorded)")]
    InvalidPaymentIndex {
        document: String,
        index: usize,
        count: usize,
    },

    #[error("Failed to generate document: {0}")]
    PdfRender(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config directory already exists at {0}")]
    AlreadyInitialized(PathBuf),
}

pub type Result<T> = std::result::Result<T, DocError>;
