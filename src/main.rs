use actix_web::{web, App, HttpServer};
use clap::Parser;
use log::info;

use tictactoe_server::config::Config;
use tictactoe_server::models::AppState;
use tictactoe_server::{routes, websocket};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::parse();

    // Create shared application state
    let app_state = web::Data::new(AppState::new());

    if let Some(ttl) = config.waiting_ttl() {
        websocket::sweeper::spawn(app_state.clone(), ttl, config.sweep_interval());
    }

    info!(
        "Starting tic-tac-toe server at http://{}",
        config.bind_address()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(routes::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
