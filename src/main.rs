// A small HTTP gateway in front of the Aladhan prayer times API that also
// works out which prayer is next and how long until it starts.
mod aladhan;
mod clock;
mod config;
mod error;
mod geolocation;
mod models;
mod routes;
mod timing;
mod types;
mod util;

use actix_web::{middleware::Logger, web::Data, App, HttpServer};
use dotenv::dotenv;
use log::info;
use std::{process::exit, sync::Arc};

use aladhan::AladhanClient;
use clock::{Clock, SystemClock};
use config::AppConfig;
use geolocation::GeolocationClient;

pub const LOG_CONFIG_PATH: &str = "log4rs.yaml";

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            eprintln!("Recognized environment variables: {}", util::ALL_VARS.join(" "));
            exit(1)
        }
    };
    util::init_logging(config.log_level);

    let http = match reqwest::Client::builder().timeout(config.upstream_timeout).build() {
        Ok(http) => http,
        Err(e) => {
            eprintln!("Failed to build HTTP client: {e}");
            exit(1)
        }
    };

    let aladhan_data = Data::new(AladhanClient::new(http.clone(), config.aladhan_base_url.clone()));
    let geolocation_data = Data::new(GeolocationClient::new(http, config.geolocation_base_url.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let clock_data: Data<dyn Clock> = Data::from(clock);

    let bind = (config.host.clone(), config.port);
    info!("Fallback timezone: {}, default method: {}", config.fallback_timezone.name(), config.default_method);
    info!("Server is running on {}:{}", bind.0, bind.1);
    let config_data = Data::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(routes::cors())
            .wrap(Logger::default())
            .app_data(Data::clone(&config_data))
            .app_data(Data::clone(&aladhan_data))
            .app_data(Data::clone(&geolocation_data))
            .app_data(Data::clone(&clock_data))
            .configure(routes::configure)
    })
        .bind(bind)?
        .run()
        .await
}
