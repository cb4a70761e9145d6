use std::env;
use std::path::Path;

/// Environment variable names - single source of truth
pub mod env_vars {
    pub const PORT: &str = "PORT";
    pub const DATABASE_URL: &str = "DATABASE_URL";
    pub const DB_POOL_SIZE: &str = "DB_POOL_SIZE";
    /// Bearer token for operator routes (milestone completion, settings writes)
    pub const ADMIN_API_TOKEN: &str = "ADMIN_API_TOKEN";
    pub const FRONTEND_DIST: &str = "FRONTEND_DIST";
    pub const DISABLE_FRONTEND: &str = "DISABLE_FRONTEND";
    pub const CORS_MAX_AGE_SECS: &str = "CORS_MAX_AGE_SECS";
    /// Optional JSON file replacing the built-in chatbot rule table
    pub const CHATBOT_RULES_PATH: &str = "CHATBOT_RULES_PATH";
}

/// Default values
pub mod defaults {
    pub const PORT: u16 = 8080;
    pub const DATABASE_URL: &str = "./.db/agency.db";
    pub const DB_POOL_SIZE: u32 = 8;
    pub const CORS_MAX_AGE_SECS: usize = 3600;
    /// Checked in order when FRONTEND_DIST is not set
    pub const FRONTEND_DIST_CANDIDATES: [&str; 2] = ["./frontend/dist", "../frontend/dist"];
}

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub db_pool_size: u32,
    pub admin_api_token: Option<String>,
    /// Resolved SPA bundle directory, None when static serving is off
    pub frontend_dist: Option<String>,
    pub cors_max_age_secs: usize,
    pub chatbot_rules_path: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        let admin_api_token = env::var(env_vars::ADMIN_API_TOKEN)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());

        Self {
            port: parse_or(env_vars::PORT, defaults::PORT),
            database_url: env::var(env_vars::DATABASE_URL)
                .unwrap_or_else(|_| defaults::DATABASE_URL.to_string()),
            db_pool_size: parse_or(env_vars::DB_POOL_SIZE, defaults::DB_POOL_SIZE).max(1),
            admin_api_token,
            frontend_dist: resolve_frontend_dist(),
            cors_max_age_secs: parse_or(env_vars::CORS_MAX_AGE_SECS, defaults::CORS_MAX_AGE_SECS),
            chatbot_rules_path: env::var(env_vars::CHATBOT_RULES_PATH).ok().filter(|p| !p.is_empty()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: defaults::PORT,
            database_url: defaults::DATABASE_URL.to_string(),
            db_pool_size: defaults::DB_POOL_SIZE,
            admin_api_token: None,
            frontend_dist: None,
            cors_max_age_secs: defaults::CORS_MAX_AGE_SECS,
            chatbot_rules_path: None,
        }
    }
}

/// Read a numeric env var, logging and falling back to the default when it does not parse.
fn parse_or<T>(var: &str, default: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("{} has invalid value {:?}, using default {}", var, raw, default);
            default
        }),
        Err(_) => default,
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Work out where the built SPA lives.
/// Set DISABLE_FRONTEND=1 to turn off static file serving (for a separate dev server).
fn resolve_frontend_dist() -> Option<String> {
    if env::var(env_vars::DISABLE_FRONTEND).map(|v| is_truthy(&v)).unwrap_or(false) {
        log::info!("Frontend serving disabled via {} env var", env_vars::DISABLE_FRONTEND);
        return None;
    }

    if let Ok(dir) = env::var(env_vars::FRONTEND_DIST) {
        if Path::new(&dir).join("index.html").exists() {
            return Some(dir);
        }
        log::warn!("{} points at {} but no index.html was found there", env_vars::FRONTEND_DIST, dir);
        return None;
    }

    let found = defaults::FRONTEND_DIST_CANDIDATES
        .iter()
        .find(|dir| Path::new(dir).join("index.html").exists())
        .map(|dir| dir.to_string());

    if found.is_none() {
        log::warn!(
            "Frontend dist not found in {} - static file serving disabled",
            defaults::FRONTEND_DIST_CANDIDATES.join(" or ")
        );
    }
    found
}
