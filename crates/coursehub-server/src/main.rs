//! `CourseHub` Server
//!
//! HTTP API for course authoring, enrollment and chapter playback.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};

use coursehub_core::config::{self, Config};
use coursehub_core::tracing_init::{LogFormat, init_tracing};
use coursehub_server::access::{SessionVerifier, TeacherAllowList};
use coursehub_server::catalog::Catalog;
use coursehub_server::routes::{AppState, build_router, serve};
use coursehub_server::storage::CourseDatabase;

const DEV_SESSION_SECRET: &str = "dev-secret-change-me";

#[derive(Parser, Debug)]
#[command(name = "coursehub-server")]
#[command(version, about = "CourseHub server - courses, chapters and enrollment API")]
struct Args {
    /// Address to listen on.
    #[arg(long)]
    addr: Option<SocketAddr>,

    /// Path to SQLite database file.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Path to a JSON config file layered over the global one.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Identity allowed to author courses. May be repeated.
    #[arg(long = "teacher-id")]
    teacher_ids: Vec<String>,

    /// HMAC secret for session bearer tokens.
    #[arg(long)]
    session_secret: Option<String>,

    /// Secret expected from the payment provider's purchase callback.
    #[arg(long)]
    webhook_secret: Option<String>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// CLI flags take priority over every config layer.
    fn apply(self, config: &mut Config) {
        if let Some(addr) = self.addr {
            config.server.addr = addr;
        }
        if let Some(path) = self.db_path {
            config.server.database_path = Some(path);
        }
        config::merge_teachers(&mut config.teachers.allow_list, self.teacher_ids);
        if let Some(secret) = self.session_secret {
            config.auth.session_secret = Some(secret);
        }
        if let Some(secret) = self.webhook_secret {
            config.auth.webhook_secret = Some(secret);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let log_json = args.log_json;

    let mut config = config::load_config(args.config.as_deref())?;
    args.apply(&mut config);

    init_tracing(
        &format!("coursehub_server={}", config.server.log_level),
        LogFormat::from_json_flag(log_json),
    )?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.addr,
        "Starting coursehub-server"
    );

    let db_path = match config.server.database_path.clone() {
        Some(path) => path,
        None => default_db_path()?,
    };
    info!(path = %db_path.display(), "Opening course database");
    let db = CourseDatabase::open(&db_path).await?;

    let session_secret = config.auth.session_secret.clone().unwrap_or_else(|| {
        warn!("No session secret configured, using the development default");
        DEV_SESSION_SECRET.to_string()
    });
    if config.auth.webhook_secret.is_none() {
        warn!("No webhook secret configured, purchase callbacks will be refused");
    }

    let teachers = Arc::new(TeacherAllowList::new(config.teachers.allow_list.clone()));
    if teachers.is_empty() {
        warn!("Teacher allow-list is empty, course authoring is disabled");
    } else {
        info!(count = teachers.len(), "Teacher allow-list loaded");
    }

    let state = AppState {
        catalog: Catalog::new(db, teachers),
        sessions: Arc::new(SessionVerifier::new(session_secret.as_bytes())),
        webhook_secret: config.auth.webhook_secret.as_deref().map(Arc::from),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.server.addr).await?;
    info!(addr = %config.server.addr, "Server listening");

    serve(listener, app, shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on ctrl-c.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    if let Some(path) = config::database_path() {
        return Ok(path);
    }
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".coursehub").join("coursehub.db"))
}
