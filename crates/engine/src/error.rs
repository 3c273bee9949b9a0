//! The module contains the errors the engine can throw.
//!
//! Lookups scoped to the caller report [`NotFound`] for records that exist
//! but belong to somebody else, so ownership never leaks.
//!
//!  [`NotFound`]: EngineError::NotFound
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    #[error("invalid name: {0}")]
    InvalidName(String),
    #[error("invalid range: {0}")]
    InvalidRange(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::NotFound(a), Self::NotFound(b)) => a == b,
            (Self::InvalidReference(a), Self::InvalidReference(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidName(a), Self::InvalidName(b)) => a == b,
            (Self::InvalidRange(a), Self::InvalidRange(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
