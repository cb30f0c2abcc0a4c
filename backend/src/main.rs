use axum::{
    middleware,
    routing::{delete, get},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

mod auth;
mod config;
mod db;
mod error;
mod favorites;
mod models;
mod params;
mod property;
mod response;
mod schema;
mod store;

use crate::config::{AppConfig, StoreBackend};
use store::{FavoriteStore, MemoryStore, PgStore, PropertyStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub properties: Arc<dyn PropertyStore>,
    pub favorites: Arc<dyn FavoriteStore>,
}

impl AppState {
    pub fn new(config: AppConfig, properties: Arc<dyn PropertyStore>, favorites: Arc<dyn FavoriteStore>) -> Self {
        Self {
            config: Arc::new(config),
            properties,
            favorites,
        }
    }
}

pub fn router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/favorites", get(favorites::list_favorites).post(favorites::create_favorite))
        .route("/favorites/property/:property_id", delete(favorites::delete_favorite_by_property))
        .layer(middleware::from_fn_with_state(state.clone(), auth::authenticate));

    let api = Router::new()
        .route("/properties", get(property::list_properties))
        .route("/properties/:document_id", get(property::get_property))
        .route("/categories", get(property::list_categories))
        .route("/locations", get(property::list_locations))
        .merge(protected_routes);

    Router::new()
        .route("/health", get(|| async { Json(json!({"status": "ok"})) }))
        .nest("/api", api)
        .with_state(state)
}

fn build_state(config: AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config.database_url.clone().ok_or("DATABASE_URL is not set")?;
            let pool = db::establish_pool(&database_url, config.database_pool_max)?;
            let store = Arc::new(PgStore::new(pool));
            Ok(AppState::new(config, store.clone(), store))
        }
        StoreBackend::Memory => {
            log::warn!("Using the in-memory store; favorites are lost on restart");
            let store = Arc::new(MemoryStore::seeded());
            Ok(AppState::new(config, store.clone(), store))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = AppConfig::load()?;
    log::info!("Loaded config: {:?}", config);

    // `listings-backend token <user-id>` prints a bearer token for local testing.
    let mut args = std::env::args().skip(1);
    if let Some(command) = args.next() {
        if command != "token" {
            return Err(format!("unknown command '{}'", command).into());
        }
        let user_id: i32 = args.next().ok_or("usage: listings-backend token <user-id>")?.parse()?;
        println!("{}", auth::create_token(user_id, &config.jwt_secret)?);
        return Ok(());
    }

    let addr = SocketAddr::new(config.host, config.port);
    let state = build_state(config)?;

    log::info!("Starting server on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state).into_make_service()).await?;

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testing::{app, request, send};
    use axum::http::StatusCode;
    use std::sync::Arc;

    use crate::store::MemoryStore;

    #[tokio::test]
    async fn health_is_public() {
        let app = app(Arc::new(MemoryStore::new()));
        let (status, body) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn protected_routes_reject_garbage_tokens() {
        let app = app(Arc::new(MemoryStore::new()));
        let mut req = request("GET", "/api/favorites", None, None);
        req.headers_mut()
            .insert(axum::http::header::AUTHORIZATION, "Bearer not-a-jwt".parse().unwrap());
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Invalid or expired token");
    }
}
