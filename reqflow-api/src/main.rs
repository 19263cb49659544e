use actix::Actor;
use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use clap::Parser;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use reqflow_api::config::ApiConfig;
use reqflow_api::handlers::{self, AppState};
use reqflow_api::helpers::llm::create_prompt_client;
use reqflow_api::storage::{run_migrations, SqliteRequirementStore};
use reqflow_api::websocket::{websocket_handler, WebSocketBroadcaster, WebSocketServer};
use reqflow_api::DbConnection;
use reqflow_workbench::LlmPromptService;

#[derive(Parser)]
#[command(name = "reqflow-api", about = "Requirement review workflow service")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (config, config_path) = ApiConfig::load(cli.config)?;
    tracing::info!("Loaded configuration from {}", config_path.display());

    // Initialize database
    if let Some(parent) = config.database.path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut conn = Connection::open(&config.database.path)?;
    run_migrations(&mut conn)?;
    let connection: DbConnection = Arc::new(Mutex::new(conn));
    tracing::info!("Database initialized at {:?}", config.database.path);

    let store = Arc::new(SqliteRequirementStore::new(connection));
    let client = create_prompt_client(&config)?;
    let prompts = Arc::new(LlmPromptService::new(client));

    // Start WebSocket server for record-change fan-out
    let ws_server = WebSocketServer::default().start();
    let ws_server_data = web::Data::new(ws_server.clone());
    let broadcaster = Arc::new(WebSocketBroadcaster::new(ws_server));
    tracing::info!("WebSocket server started");

    let app_state = web::Data::new(AppState {
        store,
        prompts,
        notifier: broadcaster,
        start_time: SystemTime::now(),
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!("Starting reqflow-api server at http://{}", bind_addr);

    let cors_config = config.cors.clone();
    HttpServer::new(move || {
        let cors = match &cors_config {
            Some(cors_config) => {
                let mut cors = Cors::default().allow_any_method().allow_any_header();
                for origin in &cors_config.allowed_origins {
                    cors = cors.allowed_origin(origin);
                }
                cors
            }
            None => Cors::permissive(),
        };

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(app_state.clone())
            .app_data(ws_server_data.clone())
            .service(handlers::main_handlers::health_check)
            .service(handlers::requirement_handlers::create_requirement)
            .service(handlers::requirement_handlers::list_requirements)
            .service(handlers::requirement_handlers::get_requirement)
            .service(handlers::architect_handlers::load_architect)
            .service(handlers::architect_handlers::ask_clarifying_question)
            .service(handlers::architect_handlers::approve_design)
            .service(handlers::ba_handlers::load_ba)
            .service(handlers::ba_handlers::ask_ai)
            .service(handlers::ba_handlers::approve_ba_content)
            .route("/ws", web::get().to(websocket_handler))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
