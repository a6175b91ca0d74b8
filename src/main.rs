use crate::responses::error_response;
use crate::router::handle;
use crate::settings::Settings;
use crate::state::App;
use astra::Server;
use std::net::SocketAddr;
use tracing::{error, info};

mod auth;
mod config_api;
mod domain;
mod errors;
mod forms;
mod responses;
mod router;
mod settings;
mod state;
mod store;
mod templates;


fn main() {
    // 1️⃣ Settings and logging
    let settings = match Settings::from_env() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Configuration error: {e}");
            std::process::exit(1);
        }
    };
    settings.logging.init();

    // 2️⃣ Shared services: data store, configuration API, identity
    let app = match App::from_settings(&settings) {
        Ok(app) => app,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    // 3️⃣ Start the server
    let addr: SocketAddr = match settings.bind.parse() {
        Ok(addr) => addr,
        Err(e) => {
            error!(bind = %settings.bind, error = %e, "invalid bind address");
            std::process::exit(1);
        }
    };
    info!(%addr, config_api = %settings.config_api_url, "starting server");

    let server = Server::bind(&addr).max_workers(settings.max_workers);

    // 4️⃣ Serve requests, passing the app handle into the closure
    let result = server.serve(move |req, _info| match handle(req, &app) {
        Ok(resp) => resp,
        Err(err) => error_response(err),
    });

    if let Err(e) = result {
        error!(error = %e, "server ended with error");
    }

    info!("server shut down cleanly");
}
