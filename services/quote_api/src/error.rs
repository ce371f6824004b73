//! Error types for the quote endpoint

use sluice_amm::QuoteError;
use thiserror::Error;
use warp::http::StatusCode;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("Missing query parameter '{0}'")]
    MissingParam(&'static str),

    #[error("Invalid value '{value}' for '{name}'")]
    InvalidParam { name: &'static str, value: String },

    /// `sell_a` and `buy_b` describe opposite directions
    #[error("sell_a and buy_b disagree on the trade direction")]
    InconsistentDirection,

    #[error(transparent)]
    Quote(#[from] QuoteError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
