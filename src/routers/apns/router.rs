use std::io::Cursor;
use std::sync::Arc;

use a2::request::payload::{Payload, PayloadLike};
use a2::{
    self, CollapseId, DefaultNotificationBuilder, Endpoint, NotificationBuilder,
    NotificationOptions, Priority,
};
use actix_web::http::StatusCode;
use async_trait::async_trait;
use cadence::StatsdClient;
use serde_json::Value;

use crate::error::{ApiError, ApiResult};
use crate::extractors::message::RelayMessage;
use crate::extractors::notification_headers::Urgency;
use crate::routers::apns::error::ApnsError;
use crate::routers::apns::settings::ApnsSettings;
use crate::routers::common::{
    build_message_data, incr_error_metric, incr_success_metrics, message_size_check,
};
use crate::routers::RouterResponse;

/// The fixed alert shown by the OS; the receiving app replaces it after
/// decrypting the custom data, so it is purely decorative
const NOTIFICATION_ALERT: &str = "🎺";

/// APNS ids are not retrievable resources, so accepted messages get a
/// placeholder Location of this form
const LOCATION_PREFIX: &str = "https://not-supported";

/// Apple Push Notification Service router
pub struct ApnsRouter {
    client: Box<dyn ApnsClient>,
    settings: ApnsSettings,
    metrics: Arc<StatsdClient>,
}

#[async_trait]
trait ApnsClient: Send + Sync {
    async fn send(&self, payload: Payload<'_>) -> Result<a2::Response, a2::Error>;
}

#[async_trait]
impl ApnsClient for a2::Client {
    async fn send(&self, payload: Payload<'_>) -> Result<a2::Response, a2::Error> {
        self.send(payload).await
    }
}

impl ApnsRouter {
    /// Create a new APNS router with a token-authenticated client
    pub async fn new(
        settings: ApnsSettings,
        metrics: Arc<StatsdClient>,
    ) -> Result<Self, ApnsError> {
        let endpoint = if settings.sandbox {
            Endpoint::Sandbox
        } else {
            Endpoint::Production
        };
        let key = if !settings.key.starts_with('-') {
            tokio::fs::read(&settings.key).await?
        } else {
            settings.key.as_bytes().to_vec()
        };
        let client = a2::Client::token(
            &mut Cursor::new(key),
            settings.key_id.clone(),
            settings.team_id.clone(),
            endpoint,
        )
        .map_err(ApnsError::ApnsClient)?;

        Ok(Self {
            client: Box::new(client),
            settings,
            metrics,
        })
    }

    /// The default APS data for a relayed notification. Mutable-content and
    /// content-available are always set: the receiving app rebuilds the real
    /// notification from the custom data fields.
    fn default_aps<'a>() -> DefaultNotificationBuilder<'a> {
        DefaultNotificationBuilder::new()
            .set_body(NOTIFICATION_ALERT)
            .set_mutable_content()
            .set_content_available()
    }

    /// Route a translated Web Push message to APNS
    pub async fn route_message(&self, message: &RelayMessage) -> ApiResult<RouterResponse> {
        debug!("Sending APNS notification to {}", message.device_token);
        trace!("Message = {:?}", message);

        let message_data = build_message_data(message)?;
        let collapse_id = message
            .headers
            .topic
            .as_deref()
            .map(CollapseId::new)
            .transpose()
            .map_err(ApnsError::InvalidCollapseId)?;
        // APNS calls low priority (5) "normal"
        let priority = match message.headers.urgency {
            Urgency::VeryLow | Urgency::Low => Priority::Normal,
            Urgency::Normal | Urgency::High => Priority::High,
        };
        let priority_label = format!("{priority:?}");
        let expiration = message.headers.ttl.map(|ttl| message.timestamp + ttl);

        let mut payload = Self::default_aps().build(
            &message.device_token,
            NotificationOptions {
                apns_priority: Some(priority),
                apns_topic: Some(&self.settings.topic),
                apns_collapse_id: collapse_id,
                apns_expiration: expiration,
                ..Default::default()
            },
        );
        payload.data = message_data
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();

        // Check size limit
        let payload_json = payload
            .clone()
            .to_json_string()
            .map_err(ApnsError::SizeLimit)?;
        message_size_check(payload_json.as_bytes(), self.settings.max_data)?;

        // Send to APNS
        trace!("Sending message to APNS: {:?}", payload);
        let response = match self.client.send(payload).await {
            Ok(response) => response,
            Err(e) => return Err(self.handle_error(e)),
        };

        let apns_id = response.apns_id.clone().unwrap_or_default();
        info!(
            "Sent notification";
            "device_token" => &message.device_token,
            "status" => response.code,
            "apns_id" => &apns_id,
            "expiration" => expiration,
            "priority" => priority_label,
            "collapse_id" => message.headers.topic.as_deref().unwrap_or_default(),
        );
        incr_success_metrics(&self.metrics);

        Ok(RouterResponse::sent(format!("{LOCATION_PREFIX}/{apns_id}")))
    }

    /// Handle a delivery failure by logging, updating metrics and mapping it
    /// to the caller-visible error
    fn handle_error(&self, error: a2::Error) -> ApiError {
        match &error {
            a2::Error::ResponseError(response) => {
                let reason = response
                    .error
                    .as_ref()
                    .map(|e| format!("{:?}", e.reason))
                    .unwrap_or_else(|| "Unknown".to_owned());
                let status = StatusCode::from_u16(response.code).unwrap_or(StatusCode::BAD_GATEWAY);
                warn!("APNS rejection: {} {}", response.code, reason);
                incr_error_metric(&self.metrics, &reason, status);

                return ApiError::from(ApnsError::Rejected {
                    status: response.code,
                    reason,
                });
            }
            a2::Error::ConnectionError(e) => {
                error!("APNS connection error: {:?}", e);
                incr_error_metric(
                    &self.metrics,
                    "connection_unavailable",
                    StatusCode::INTERNAL_SERVER_ERROR,
                );
            }
            _ => {
                warn!("Unknown error while sending APNS request: {}", error);
                incr_error_metric(&self.metrics, "unknown", StatusCode::INTERNAL_SERVER_ERROR);
            }
        }

        ApiError::from(ApnsError::ApnsUpstream(error))
    }

    /// Whether this router has a usable upstream configuration
    pub fn active(&self) -> bool {
        !self.settings.topic.is_empty()
    }
}
