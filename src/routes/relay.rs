use actix_web::{web::Data, HttpResponse};

use crate::error::ApiResult;
use crate::extractors::message::RelayMessage;
use crate::server::AppState;

/// Handle the `POST /relay-to/{token}` and `POST /relay-to/{token}/{suffix}`
/// routes. This is the endpoint for all incoming Web Push delivery requests.
pub async fn relay_route(
    message: RelayMessage,
    app_state: Data<AppState>,
) -> ApiResult<HttpResponse> {
    Ok(app_state.apns_router.route_message(&message).await?.into())
}
