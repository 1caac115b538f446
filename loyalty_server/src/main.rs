use dotenvy::dotenv;
use log::{error, info};
use loyalty_server::{config::ServerConfig, logging, server::run_server};

#[actix_web::main]
async fn main() {
    dotenv().ok();
    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("🚦️ {e}");
            std::process::exit(1);
        },
    };
    logging::init(&config.log_level);
    info!("🚀️ Starting the loyalty server on {}", config.run_address);
    if let Err(e) = run_server(config).await {
        error!("🛑️ {e}");
        std::process::exit(1);
    }
    info!("Bye!");
}
