//! Mapping of core and storage failures onto HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use lbl_core::LabelError;
use lbl_data::DataError;
use thiserror::Error;
use tracing::{error, warn};

use crate::routes::with_notice;

/// Errors surfaced by request handlers
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Label(#[from] LabelError),
    
    #[error(transparent)]
    Data(#[from] DataError),
    
    #[error("Invalid request: {0}")]
    BadRequest(String),
    
    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Message shown to the user, or `None` for server-side failures
    pub fn notice(&self) -> Option<String> {
        match self {
            AppError::Label(e) => label_notice(e),
            AppError::Data(DataError::Label(e)) => label_notice(e),
            AppError::Data(DataError::Csv(msg)) => Some(format!("CSV could not be loaded: {}", msg)),
            AppError::BadRequest(_) => Some("Invalid request.".to_string()),
            AppError::Data(_) | AppError::Join(_) => None,
        }
    }
}

fn label_notice(error: &LabelError) -> Option<String> {
    match error {
        LabelError::NoTableLoaded => Some("Please upload a CSV first.".to_string()),
        LabelError::EmptyTable => Some("The CSV contains no rows.".to_string()),
        LabelError::InvalidAnnotator(_) => Some("Invalid coder.".to_string()),
        LabelError::InvalidLabel(_) => Some("Invalid label.".to_string()),
        LabelError::InvalidSchema(msg) => Some(format!("CSV could not be loaded: {}", msg)),
        LabelError::Storage(_) => None,
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.notice() {
            Some(notice) => {
                warn!("Request rejected: {}", self);
                Redirect::to(&with_notice("/", &[], &notice)).into_response()
            }
            None => {
                error!("Request failed: {:#}", self);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Internal error: {}", self)).into_response()
            }
        }
    }
}
