use std::io;

use actix_web::http::StatusCode;

use crate::error::ApiErrorKind;
use crate::routers::RouterError;

/// Errors that may occur in the Apple Push Notification Service router
#[derive(thiserror::Error, Debug)]
pub enum ApnsError {
    #[error("IO Error: {0}")]
    Io(#[from] io::Error),

    #[error("Error while setting up the APNS client: {0}")]
    ApnsClient(#[source] a2::Error),

    #[error("Error while checking the message size limit: {0}")]
    SizeLimit(#[source] a2::Error),

    /// Transport-level failure talking to APNS
    #[error("APNS error, {0}")]
    ApnsUpstream(#[source] a2::Error),

    /// Protocol-level rejection; the upstream status is echoed to the caller
    #[error("{reason}")]
    Rejected { status: u16, reason: String },

    #[error("Invalid collapse id: {0}")]
    InvalidCollapseId(#[source] a2::Error),
}

impl ApnsError {
    /// Get the associated HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            ApnsError::SizeLimit(_) | ApnsError::InvalidCollapseId(_) => StatusCode::BAD_REQUEST,

            ApnsError::Rejected { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }

            ApnsError::Io(_) | ApnsError::ApnsClient(_) | ApnsError::ApnsUpstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<ApnsError> for ApiErrorKind {
    fn from(e: ApnsError) -> Self {
        ApiErrorKind::Router(RouterError::Apns(e))
    }
}
