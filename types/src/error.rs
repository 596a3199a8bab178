//! Error type for constructing domain values.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid transaction reference: {0}")]
    InvalidReference(String),

    #[error("invalid account identifier: {0}")]
    InvalidAccount(String),

    #[error("unknown cluster: {0}")]
    UnknownCluster(String),
}
