use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("5 arguments are required, got {found}")]
    InvalidArgumentCount { found: usize },

    #[error("vendor data file cannot be found: {}", path.display())]
    CatalogueFileNotFound { path: PathBuf },

    #[error("day parameter is not a valid dd/mm/yy date: {value:?}")]
    InvalidDeliveryDate { value: String },

    #[error("time parameter is not a valid hh:mm time: {value:?}")]
    InvalidDeliveryTime { value: String },

    #[error("location postcode parameter is not valid: {value:?}")]
    InvalidPostcode { value: String },

    #[error("cover count parameter is not valid: {value:?}")]
    InvalidCoverCount { value: String },

    #[error("line {line}: vendor name invalid: {value:?}")]
    InvalidVendorName { line: usize, value: String },

    #[error("line {line}: vendor postcode invalid: {value:?}")]
    InvalidVendorPostcode { line: usize, value: String },

    #[error("line {line}: vendor max covers invalid: {value:?}")]
    InvalidVendorMaxCovers { line: usize, value: String },

    #[error("line {line}: expected name;postcode;max_covers, found {fields} field(s)")]
    MalformedVendorLine { line: usize, fields: usize },

    #[error("line {line}: expected name;allergens;lead_time, found {fields} field(s)")]
    MalformedMealLine { line: usize, fields: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
