use std::time::Duration;

use actix_web::{dev::Server, middleware, web, App, HttpServer};
use log::{info, warn};
use loyalty_engine::{
    accrual::{HttpAccrualClient, WorkerPool, DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS},
    BalanceApi, OrderApi, PgStore,
};
use tokio_util::sync::CancellationToken;

use crate::{
    auth::TokenIssuer,
    config::ServerConfig,
    errors::ServerError,
    middleware::AuthMiddlewareFactory,
    routes,
};

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Connects the store, starts the accrual poller and serves the HTTP surface until shutdown.
///
/// On shutdown the HTTP server drains first, then the poller is cancelled and awaited within the shutdown
/// window so no worker is left mid-transition.
pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = PgStore::connect(&config.database_uri).await.map_err(|e| ServerError::Startup(e.to_string()))?;
    let client =
        HttpAccrualClient::new(&config.accrual_address).map_err(|e| ServerError::Startup(e.to_string()))?;
    let pool = WorkerPool::new(store.clone(), client, DEFAULT_POLL_INTERVAL, DEFAULT_WORKERS);
    let shutdown = CancellationToken::new();
    let poller = pool.start(shutdown.clone());

    let srv = create_server_instance(&config, store)?;
    info!("🚀️ Loyalty server listening on {}", config.run_address);
    let result = srv.await;

    shutdown.cancel();
    if tokio::time::timeout(SHUTDOWN_TIMEOUT, poller.wait()).await.is_err() {
        warn!("🛑️ The poller did not stop within {SHUTDOWN_TIMEOUT:?}");
    }
    result.map_err(|e| ServerError::Internal(e.to_string()))
}

pub fn create_server_instance(config: &ServerConfig, store: PgStore) -> Result<Server, ServerError> {
    let issuer = TokenIssuer::new(&config.jwt_secret);
    let srv = HttpServer::new(move || {
        let order_api = OrderApi::new(store.clone());
        let balance_api = BalanceApi::new(store.clone());
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .app_data(web::Data::new(store.clone()))
            .app_data(web::Data::new(order_api))
            .app_data(web::Data::new(balance_api))
            .app_data(web::Data::new(issuer.clone()))
            .service(
                web::scope("/api/user")
                    .route("/register", web::post().to(routes::register::<PgStore>))
                    .route("/login", web::post().to(routes::login::<PgStore>))
                    .service(
                        web::scope("")
                            .wrap(AuthMiddlewareFactory::new(issuer.clone()))
                            .route("/orders", web::post().to(routes::upload_order::<PgStore>))
                            .route("/orders", web::get().to(routes::list_orders::<PgStore>))
                            .route("/balance", web::get().to(routes::get_balance::<PgStore>))
                            .route("/balance/withdraw", web::post().to(routes::withdraw::<PgStore>))
                            .route("/withdrawals", web::get().to(routes::list_withdrawals::<PgStore>)),
                    ),
            )
    })
    .shutdown_timeout(SHUTDOWN_TIMEOUT.as_secs())
    .bind(&config.run_address)
    .map_err(|e| ServerError::Startup(format!("could not bind {}: {e}", config.run_address)))?
    .run();
    Ok(srv)
}
