//! Routers dispatch translated messages to the receiving push network

use std::collections::HashMap;

use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use thiserror::Error;

use crate::routers::apns::error::ApnsError;

pub mod apns;
pub mod common;

/// The response returned when a router delivers a message
#[derive(Debug, Eq, PartialEq)]
pub struct RouterResponse {
    pub status: StatusCode,
    pub headers: HashMap<&'static str, String>,
    pub body: Option<String>,
}

impl RouterResponse {
    /// Build a successful (201 Created) router response
    pub fn sent(location: String) -> Self {
        RouterResponse {
            status: StatusCode::CREATED,
            headers: {
                let mut map = HashMap::new();
                map.insert("Location", location);
                map
            },
            body: None,
        }
    }
}

impl From<RouterResponse> for HttpResponse {
    fn from(router_response: RouterResponse) -> Self {
        let mut builder = HttpResponse::build(router_response.status);

        for (key, value) in router_response.headers {
            builder.insert_header((key, value));
        }

        builder.body(router_response.body.unwrap_or_default())
    }
}

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Apns(#[from] ApnsError),

    #[error("Message payload too large by {0} bytes")]
    TooMuchData(usize),
}

impl RouterError {
    /// Get the associated HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            RouterError::Apns(e) => e.status(),
            RouterError::TooMuchData(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }
}
