//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading snapshot data.
#[derive(Debug, Error)]
pub enum DataError {
    /// CSV reading error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Sheet has no header or no data rows
    #[error("Sheet '{sheet}' is empty")]
    EmptySheet {
        /// Which sheet was empty
        sheet: String,
    },

    /// Sheet header has no contract column
    #[error("Sheet '{sheet}' has no header row")]
    MissingHeader {
        /// Which sheet was missing a header
        sheet: String,
    },

    /// Not enough date columns shared by both sheets
    #[error(
        "Need at least 2 date columns common to prices and quantities, found {found} \
         (price columns: [{price_columns}], quantity columns: [{quantity_columns}])"
    )]
    InsufficientDateColumns {
        /// Number of common columns found
        found: usize,
        /// Usable columns in the price sheet
        price_columns: String,
        /// Usable columns in the quantity sheet
        quantity_columns: String,
    },

    /// A requested date column does not exist in both sheets
    #[error("Column '{0}' is not present in both sheets")]
    UnknownColumn(String),

    /// Only a start column was given and no common column comes after it
    #[error("No date column after start column '{0}'")]
    NoLaterColumn(String),

    /// Only an end column was given and no common column comes before it
    #[error("No date column before end column '{0}'")]
    NoEarlierColumn(String),

    /// Start and end columns are the same
    #[error("Start and end columns are both '{0}'")]
    SameColumn(String),
}
