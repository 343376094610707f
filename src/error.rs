use log::{error, warn};
use mongodb::error::Error as DbError;
use rocket::{
    http::Status,
    response::{self, Responder},
    serde::json::{json, Json},
    Request, Response,
};
use rust_xlsxwriter::XlsxError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Malformed or missing request fields.
    #[error("Invalid request: {0}")]
    Validation(String),
    /// The named entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] DbError),
    #[error(transparent)]
    Export(#[from] XlsxError),
}

impl Error {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation(reason.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// The HTTP status this error is surfaced as.
    pub fn status(&self) -> Status {
        match self {
            Self::Validation(_) => Status::BadRequest,
            Self::NotFound(_) => Status::NotFound,
            Self::Storage(_) | Self::Export(_) => Status::InternalServerError,
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for Error {
    fn respond_to(self, req: &'r Request<'_>) -> response::Result<'o> {
        let status = self.status();
        if status.class().is_server_error() {
            error!("{self}");
        } else {
            warn!("{self}");
        }
        let body = Json(json!({ "detail": self.to_string() }));
        Response::build_from(body.respond_to(req)?)
            .status(status)
            .ok()
    }
}
