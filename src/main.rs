use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use candidate_discovery::config::{Settings, StoreBackend};
use candidate_discovery::core::DiscoveryEngine;
use candidate_discovery::routes::{
    self,
    discovery::{AppState, RequestLimits},
    errors::{handle_json_payload_error, handle_query_payload_error},
};
use candidate_discovery::services::{FeedRegistry, PgProfileStore, ProfileStore, SupabaseClient, ViewerCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn io_error(message: String) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, message)
}

/// Build the configured profile store backend
async fn build_store(settings: &Settings) -> std::io::Result<Arc<dyn ProfileStore>> {
    match settings.store.backend {
        StoreBackend::Supabase => {
            let supabase = settings
                .supabase
                .as_ref()
                .ok_or_else(|| io_error("store.backend = \"supabase\" requires a [supabase] section".into()))?;

            let client = SupabaseClient::new(
                supabase.url.clone(),
                supabase.service_key.clone(),
                settings.store.profiles_table.clone(),
                Duration::from_secs(supabase.request_timeout_secs),
            )
            .map_err(|e| io_error(format!("Failed to create Supabase client: {}", e)))?;

            info!("Supabase client initialized ({})", supabase.url);
            Ok(Arc::new(client))
        }
        StoreBackend::Postgres => {
            let database = settings
                .database
                .as_ref()
                .ok_or_else(|| io_error("store.backend = \"postgres\" requires a [database] section".into()))?;

            let db_max_conn = database.max_connections.unwrap_or(10);
            let store = PgProfileStore::new(
                &database.url,
                &settings.store.profiles_table,
                db_max_conn,
                database.min_connections.unwrap_or(1),
                Duration::from_secs(database.acquire_timeout_secs.unwrap_or(5)),
                Duration::from_secs(database.idle_timeout_secs.unwrap_or(600)),
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                io_error(format!("PostgreSQL connection error: {}", e))
            })?;

            info!("PostgreSQL store initialized (max: {} connections)", db_max_conn);
            Ok(Arc::new(store))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Configuration first, so the logging section can apply
    let settings = Settings::load();

    // Initialize logging (LOG_LEVEL / LOG_FORMAT override the config file)
    let (default_level, default_format) = match &settings {
        Ok(s) => (s.logging.level.clone(), s.logging.format.clone()),
        Err(_) => ("info".to_string(), "compact".to_string()),
    };
    let log_level = std::env::var("LOG_LEVEL").unwrap_or(default_level);
    let log_format = std::env::var("LOG_FORMAT").unwrap_or(default_format);

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }

    info!("Starting candidate discovery service...");

    let settings = settings.map_err(|e| {
        error!("Failed to load configuration: {}", e);
        io_error(format!("Configuration error: {}", e))
    })?;

    info!("Configuration loaded successfully");

    let store = build_store(&settings).await?;

    let options = settings.discovery.engine_options();
    let engine = DiscoveryEngine::new(store.clone(), options);

    info!("Discovery engine initialized with options: {:?}", options);

    let app_state = AppState {
        store,
        engine,
        viewers: ViewerCache::new(settings.cache.viewer_capacity, settings.cache.ttl_secs),
        feeds: FeedRegistry::new(settings.cache.feed_capacity, settings.cache.ttl_secs),
        limits: RequestLimits {
            max_radius_km: settings.discovery.max_radius_km,
            max_candidate_cap: settings.discovery.max_candidate_cap,
        },
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
