use actix_cors::Cors;
use actix_files::{Files, NamedFile};
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod chatbot;
mod config;
mod controllers;
mod db;
mod error;
mod models;
#[cfg(test)]
mod test_support;

use chatbot::Chatbot;
use config::Config;
use db::Database;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub chatbot: Arc<Chatbot>,
}

fn load_chatbot(config: &Config) -> std::io::Result<Chatbot> {
    match &config.chatbot_rules_path {
        Some(path) => {
            let bot = Chatbot::from_json_file(Path::new(path))
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            log::info!("Loaded {} chatbot rules from {}", bot.rule_count(), path);
            Ok(bot)
        }
        None => Ok(Chatbot::default()),
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url, config.db_pool_size).map_err(|e| {
        log::error!("Failed to initialize database: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let db = Arc::new(db);

    let chatbot = Arc::new(load_chatbot(&config)?);
    log::info!("Chatbot ready with {} rules", chatbot.rule_count());

    if config.admin_api_token.is_none() {
        log::warn!(
            "{} is not set - operator routes are open to anyone",
            config::env_vars::ADMIN_API_TOKEN
        );
    }

    log::info!("Starting agency backend on port {}", port);
    if let Some(dir) = &config.frontend_dist {
        log::info!("Serving frontend from: {}", dir);
    }

    let state = web::Data::new(AppState {
        db,
        config: config.clone(),
        chatbot,
    });

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(config.cors_max_age_secs);

        let mut app = App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::configure);

        // Serve static files only if frontend dist exists
        if let Some(dir) = &config.frontend_dist {
            let index: PathBuf = Path::new(dir).join("index.html");
            app = app.service(
                Files::new("/", dir.clone())
                    .index_file("index.html")
                    // SPA fallback - unknown paths get index.html for client-side routing
                    .default_handler(web::to(move || {
                        let index = index.clone();
                        async move { NamedFile::open_async(index).await }
                    })),
            );
        }

        app
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
