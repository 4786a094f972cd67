/*

SPDX-License-Identifier: AGPL-3.0-only
Copyright (c) 2025 Augustus Rizza

*/

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{DataStoreError, InvalidPeriodError};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    pub detail: String,
    /// Machine-readable code, e.g. "invalid_period"
    pub code: String,
}

/// Everything a handler can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidPeriod(#[from] InvalidPeriodError),

    #[error("invalid query parameters: {0}")]
    InvalidParams(String),

    #[error(transparent)]
    DataStore(#[from] DataStoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidPeriod(_) | ApiError::InvalidParams(_) => StatusCode::BAD_REQUEST,
            ApiError::DataStore(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidPeriod(_) => "invalid_period",
            ApiError::InvalidParams(_) => "invalid_params",
            ApiError::DataStore(_) => "datastore_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("request failed: {self}");
        } else {
            log::warn!("rejected request: {self}");
        }
        let body = ErrorBody {
            detail: self.to_string(),
            code: self.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
