// src/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson;
use serde::Serialize;
use thiserror::Error;
//
use crate::{db::StoreError, export::ExportError, period::PeriodError};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("invalid sale record: {0}")]
    Decode(#[from] bson::de::Error),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

impl From<PeriodError> for AppError {
    fn from(err: PeriodError) -> Self {
        Self::NotFound(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    detail: &'a str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            Self::NotFound(detail) => (StatusCode::NOT_FOUND, detail.as_str()),
            Self::Store(_) | Self::Decode(_) | Self::Export(_) => {
                tracing::error!(error = %self, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
