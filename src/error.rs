//! Error types and transforms

use std::fmt;
use std::io;

use actix_web::{
    dev::ServiceResponse, http::StatusCode, middleware::ErrorHandlerResponse, HttpResponse,
    HttpResponseBuilder, ResponseError,
};
use backtrace::Backtrace;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use thiserror::Error;

use crate::routers::RouterError;

/// Common `Result` type
pub type ApiResult<T> = Result<T, ApiError>;

/// Top-level relay error
#[derive(Debug)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub backtrace: Box<Backtrace>,
}

#[derive(Debug, Error)]
pub enum ApiErrorKind {
    #[error("Invalid URL path")]
    MalformedPath,

    #[error("Unsupported Content-Encoding: {0}")]
    UnsupportedEncoding(String),

    /// A required aesgcm crypto parameter is missing or unreadable. The
    /// message names the offending header and key.
    #[error("{0}")]
    MissingCryptoParameter(String),

    #[error(transparent)]
    Router(#[from] RouterError),

    #[error("Error while reading the request payload: {0}")]
    PayloadError(actix_web::Error),

    #[error(transparent)]
    Metrics(#[from] cadence::MetricError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiErrorKind {
    /// Get the associated HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorKind::UnsupportedEncoding(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,

            ApiErrorKind::PayloadError(_) => StatusCode::BAD_REQUEST,

            ApiErrorKind::Router(e) => e.status(),

            ApiErrorKind::MalformedPath
            | ApiErrorKind::MissingCryptoParameter(_)
            | ApiErrorKind::Metrics(_)
            | ApiErrorKind::Io(_)
            | ApiErrorKind::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.kind.source()
    }
}

// Forward From impls to ApiError from ApiErrorKind. Because From is
// reflexive, this impl also takes care of From<ApiErrorKind>.
impl<T> From<T> for ApiError
where
    ApiErrorKind: From<T>,
{
    fn from(item: T) -> Self {
        ApiError {
            kind: ApiErrorKind::from(item),
            backtrace: Box::new(Backtrace::new()),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.kind.status()
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

impl Serialize for ApiError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let status = self.kind.status();
        let mut map = serializer.serialize_map(Some(3))?;

        map.serialize_entry("code", &status.as_u16())?;
        map.serialize_entry("error", &status.canonical_reason().unwrap_or(""))?;
        map.serialize_entry("message", &self.kind.to_string())?;
        map.end()
    }
}

/// Render a 404 response
pub fn render_404<B>(
    res: ServiceResponse<B>,
) -> std::result::Result<ErrorHandlerResponse<B>, actix_web::Error> {
    // Replace the outbound error message with our own.
    let resp = HttpResponseBuilder::new(StatusCode::NOT_FOUND).finish();
    Ok(ErrorHandlerResponse::Response(
        res.into_response(resp).map_into_right_body(),
    ))
}
