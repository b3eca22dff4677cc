use rust_decimal::Decimal;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Database(DatabaseError::QueryFailed(err))
    }
}

impl From<r2d2::Error> for Error {
    fn from(err: r2d2::Error) -> Self {
        Error::Database(DatabaseError::PoolFailed(err))
    }
}

#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    PoolFailed(#[from] r2d2::Error),

    #[error("Query failed: {0}")]
    QueryFailed(#[from] diesel::result::Error),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rule set '{0}' already exists")]
    DuplicateRuleSetName(String),
}

/// Deterministic input-validation failures raised by the glidepath rule
/// importer. Every variant aborts the import with no partial persistence.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    #[error("Age band coverage error: {0}")]
    Coverage(String),

    #[error(
        "Row {row}: category allocations for '{class_name}' sum to {category_total}%, \
         but the class allocation is {class_total}%"
    )]
    AllocationMismatch {
        row: usize,
        class_name: String,
        category_total: Decimal,
        class_total: Decimal,
    },

    #[error("Row {row}: class allocations total {total}%, expected 100%")]
    TotalAllocation { row: usize, total: Decimal },
}
