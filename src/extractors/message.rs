use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::{future, FutureExt};

use crate::error::{ApiError, ApiErrorKind};
use crate::extractors::notification_headers::NotificationHeaders;
use crate::util::sec_since_epoch;

/// Extracts the inbound relay request: target device, auxiliary routing
/// path, raw encrypted body and the Web Push headers
#[derive(Clone, Debug)]
pub struct RelayMessage {
    /// Destination device token, from the first path segment
    pub device_token: String,
    /// Remaining path segments, passed through verbatim to the receiving app
    pub route_suffix: Option<String>,
    /// The encrypted (possibly empty) Web Push payload
    pub data: Vec<u8>,
    /// Parsed Web Push headers
    pub headers: NotificationHeaders,
    /// UNIX timestamp in seconds at extraction
    pub timestamp: u64,
}

impl FromRequest for RelayMessage {
    type Error = ApiError;
    type Future = future::LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let req = req.clone();
        let mut payload = payload.take();

        async move {
            // Fail before any encoding work if no usable target is present
            let device_token = req
                .match_info()
                .get("token")
                .filter(|token| !token.is_empty())
                .ok_or(ApiErrorKind::MalformedPath)?
                .to_string();
            let route_suffix = req
                .match_info()
                .get("suffix")
                .filter(|suffix| !suffix.is_empty())
                .map(str::to_string);

            let data = web::Bytes::from_request(&req, &mut payload)
                .await
                .map_err(ApiErrorKind::PayloadError)?;
            let headers = NotificationHeaders::from_request(&req)?;

            Ok(RelayMessage {
                device_token,
                route_suffix,
                data: data.to_vec(),
                headers,
                timestamp: sec_since_epoch(),
            })
        }
        .boxed_local()
    }
}
