//! Main application server

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{
    dev, http::StatusCode, middleware::ErrorHandlers, web, web::Data, App, HttpServer,
};

use crate::error::{render_404, ApiResult};
use crate::metrics;
use crate::routers::apns::router::ApnsRouter;
use crate::routes::health::{health_route, lb_heartbeat_route, ping_route, status_route};
use crate::routes::relay::relay_route;
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub apns_router: Arc<ApnsRouter>,
}

pub struct Server;

impl Server {
    pub async fn with_settings(settings: Settings) -> ApiResult<dev::Server> {
        let metrics = Arc::new(metrics::metrics_from_opts(&settings)?);
        let bind_address = format!("{}:{}", settings.host, settings.port);
        let apns_router = Arc::new(ApnsRouter::new(settings.apns.clone(), metrics).await?);
        let state = AppState {
            settings,
            apns_router,
        };

        let server = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(state.clone()))
                .wrap(ErrorHandlers::new().handler(StatusCode::NOT_FOUND, render_404))
                .wrap(Cors::default())
                .app_data(web::PayloadConfig::new(state.settings.max_data_bytes))
                // Endpoints
                .service(
                    web::resource(["/relay-to/{token}", "/relay-to/{token}/{suffix:.*}"])
                        .route(web::post().to(relay_route)),
                )
                // Health checks
                .service(web::resource("/ping").route(web::get().to(ping_route)))
                .service(web::resource("/status").route(web::get().to(status_route)))
                .service(web::resource("/health").route(web::get().to(health_route)))
                // Dockerflow
                .service(web::resource("/__heartbeat__").route(web::get().to(health_route)))
                .service(web::resource("/__lbheartbeat__").route(web::get().to(lb_heartbeat_route)))
        })
        .bind(bind_address)?
        .run();

        Ok(server)
    }
}
