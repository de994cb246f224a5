//! Health and Dockerflow routes
use std::collections::HashMap;

use actix_web::{
    web::{Data, Json},
    HttpResponse,
};
use serde_json::json;

use crate::server::AppState;

/// Handle the `/health` and `/__heartbeat__` routes
pub async fn health_route(state: Data<AppState>) -> Json<serde_json::Value> {
    let mut routers: HashMap<&str, bool> = HashMap::new();
    routers.insert("apns", state.apns_router.active());

    Json(json!({
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION"),
        "routers": routers,
    }))
}

/// Handle the `/status` route
pub async fn status_route() -> Json<serde_json::Value> {
    Json(json!({
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Handle the `/ping` liveness probe
pub async fn ping_route() -> HttpResponse {
    HttpResponse::Ok().body("pong")
}

/// Handle the `/__lbheartbeat__` route
pub async fn lb_heartbeat_route() -> HttpResponse {
    // Used by the load balancers, just return OK.
    HttpResponse::Ok().finish()
}
