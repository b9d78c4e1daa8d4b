use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::serde::json::{self, Json};
use rocket::{catch, Request};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

use std::sync::PoisonError;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    QuotaExceeded(String),

    #[error("Generic internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn validation(what: impl Into<String>) -> ApiError {
        ApiError::Validation(what.into())
    }

    pub fn not_found(what: impl Into<String>) -> ApiError {
        ApiError::NotFound(what.into())
    }

    pub fn status(&self) -> Status {
        match self {
            ApiError::Validation(_) => Status::BadRequest,
            ApiError::Unauthorized => Status::Unauthorized,
            ApiError::NotFound(_) => Status::NotFound,
            ApiError::QuotaExceeded(_) => Status::Conflict,
            ApiError::Internal(_) => Status::InternalServerError,
        }
    }
}

impl<T> From<PoisonError<T>> for ApiError {
    fn from(e: PoisonError<T>) -> ApiError {
        ApiError::Internal(e.to_string())
    }
}

impl From<rusqlite::Error> for ApiError {
    fn from(e: rusqlite::Error) -> ApiError {
        ApiError::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> ApiError {
        ApiError::Internal(e.to_string())
    }
}

#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub message: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> ErrorBody {
        ErrorBody {
            message: message.into(),
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, request: &'r Request<'_>) -> response::Result<'static> {
        let message = match &self {
            ApiError::Internal(what) => {
                error!(method = %request.method(), path = %request.uri().path(), "{}", what);
                String::from("Server error")
            }
            other => other.to_string(),
        };

        (self.status(), Json(ErrorBody::new(message))).respond_to(request)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

pub fn json_body<T>(body: Result<Json<T>, json::Error<'_>>, message: &str) -> ApiResult<T> {
    match body {
        Ok(body) => Ok(body.into_inner()),
        Err(e) => {
            debug!("rejected request body: {:?}", e);
            Err(ApiError::validation(message))
        }
    }
}

#[catch(default)]
pub fn default_catcher(status: Status, _request: &Request<'_>) -> (Status, Json<ErrorBody>) {
    let message = match status.code {
        400 | 422 => "Invalid payload",
        401 => "Unauthorized",
        404 => "Not found",
        500 => "Server error",
        _ => status.reason().unwrap_or("Request failed"),
    };

    (status, Json(ErrorBody::new(message)))
}
