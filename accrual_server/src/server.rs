use accrual_engine::{OrderApi, PgStore, RewardApi};
use actix_web::{dev::Server, middleware, web, App, HttpServer};
use log::info;

use crate::{config::ServerConfig, errors::ServerError, routes};

const SHUTDOWN_TIMEOUT_SECS: u64 = 5;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = PgStore::connect(&config.database_uri).await.map_err(|e| ServerError::Startup(e.to_string()))?;
    let srv = create_server_instance(&config, store)?;
    info!("🚀️ Accrual server listening on {}", config.run_address);
    srv.await.map_err(|e| ServerError::Internal(e.to_string()))
}

pub fn create_server_instance(config: &ServerConfig, store: PgStore) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let order_api = OrderApi::new(store.clone());
        let reward_api = RewardApi::new(store.clone());
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(order_api))
            .app_data(web::Data::new(reward_api))
            .service(
                web::scope("/api")
                    .route("/orders/{number}", web::get().to(routes::get_order_info::<PgStore>))
                    .route("/orders", web::post().to(routes::register_order::<PgStore>))
                    .route("/goods", web::post().to(routes::register_reward::<PgStore>)),
            )
    })
    .shutdown_timeout(SHUTDOWN_TIMEOUT_SECS)
    .bind(&config.run_address)
    .map_err(|e| ServerError::Startup(format!("could not bind {}: {e}", config.run_address)))?
    .run();
    Ok(srv)
}
