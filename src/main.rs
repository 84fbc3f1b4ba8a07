pub mod config;
pub mod db {
    pub mod models;
}
pub mod errors;
pub mod models {
    pub mod telemetry;
}
pub mod schema;
pub mod server;
pub mod services {
    pub mod aggregate;
    pub mod fake_data;
    pub mod ingest;
    pub mod insights;
    pub mod intervals;
    pub mod retention;
    pub mod scores;
    pub mod scoring;
    pub mod validate;
}
pub mod utils;

use std::path::{Path, PathBuf};
use std::thread;

use diesel::prelude::*;
use diesel::PgConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::{error, info};

use crate::config::Config;
use crate::services::scoring::ScoringEngine;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

fn apply_database_migrations(conn: &mut PgConnection) -> Result<(), String> {
    match conn.run_pending_migrations(MIGRATIONS) {
        Ok(applied) => {
            if applied.is_empty() {
                info!("Database schema is up to date; no migrations were applied");
            } else {
                let names = applied.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
                info!("Applied {} database migration(s): {}", applied.len(), names);
            }
            Ok(())
        }
        Err(e) => Err(format!("Applying database migrations failed: {}", e)),
    }
}

pub fn run() -> Result<(), String> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (http_bind={}, window_secs={}, retention_days={}, sweep_interval={}s, fake_data={})",
        cfg.http_bind,
        cfg.window_secs,
        cfg.retention_days,
        cfg.retention_sweep_interval.as_secs(),
        cfg.fake_data_enabled
    );

    // 2) Connect DB
    let mut conn = PgConnection::establish(&cfg.database_url).map_err(|e| format!("DB connection failed: {}", e))?;
    info!("Connected to database");

    // 3) Apply pending database migrations
    apply_database_migrations(&mut conn)?;

    // 4) Optional synthetic history for demo/dev deployments
    if cfg.fake_data_enabled {
        let engine = ScoringEngine::new(cfg.scoring);
        services::fake_data::run(&mut conn, &engine, cfg.window_secs)
            .map_err(|e| format!("fake data seeding failed: {}", e))?;
    }

    // 5) Retention sweep on its own connection, out of the request path
    {
        let database_url = cfg.database_url.clone();
        let retention_days = cfg.retention_days;
        let sweep_interval = cfg.retention_sweep_interval;
        thread::spawn(move || match PgConnection::establish(&database_url) {
            Ok(mut sweep_conn) => {
                info!(
                    "Retention: sweeping every {}s, keeping {} day(s)",
                    sweep_interval.as_secs(),
                    retention_days
                );
                services::retention::run_loop(&mut sweep_conn, retention_days, sweep_interval)
            }
            Err(e) => error!("Retention: connection failed, sweep disabled: {}", e),
        });
    }

    // 6) Serve ingestion and query endpoints until killed
    server::serve(&mut conn, &cfg)
}

fn configure_env_from_cli() -> Result<Option<PathBuf>, String> {
    let mut args = std::env::args_os();
    args.next(); // skip program name

    let mut env_file: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.to_str() {
            Some("--env-file") => {
                if env_file.is_some() {
                    return Err("`--env-file` provided more than once".to_string());
                }
                let value = args
                    .next()
                    .ok_or_else(|| "`--env-file` requires a path argument".to_string())?;
                env_file = Some(PathBuf::from(value));
            }
            Some(s) if s.starts_with("--env-file=") => {
                if env_file.is_some() {
                    return Err("`--env-file` provided more than once".to_string());
                }
                let path_str = &s["--env-file=".len()..];
                if path_str.is_empty() {
                    return Err("`--env-file` requires a path argument".to_string());
                }
                env_file = Some(PathBuf::from(path_str));
            }
            Some("--") => break,
            Some(other) => return Err(format!("unrecognised argument: {}", other)),
            None => return Err("argument contains invalid UTF-8".to_string()),
        }
    }

    if let Some(path) = env_file {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        load_env_file(&path)?;
        Ok(Some(path))
    } else {
        let default_path = std::env::current_dir()
            .map_err(|e| format!("unable to read current directory: {}", e))?
            .join(".env");
        if default_path.is_file() {
            load_env_file(&default_path)?;
            Ok(Some(default_path))
        } else {
            Ok(None)
        }
    }
}

/// Load `KEY=VALUE` lines (blank lines, `#` comments and an optional
/// `export ` prefix allowed; surrounding quotes stripped). Values already
/// present in the process environment win.
fn load_env_file(path: &Path) -> Result<(), String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))?;

    for (index, line) in contents.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let assignment = trimmed.strip_prefix("export ").map(str::trim_start).unwrap_or(trimmed);

        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| format!("{}:{}: missing '=' in assignment", path.display(), index + 1))?;
        let key = key.trim();
        if key.is_empty() || key.chars().any(|c| c.is_whitespace()) {
            return Err(format!(
                "{}:{}: invalid environment variable name '{}'",
                path.display(),
                index + 1,
                key
            ));
        }

        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);

        if std::env::var_os(key).is_none() {
            // Updating process-level environment variables is unsafe on some targets.
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }

    Ok(())
}

fn main() {
    let loaded_env = match configure_env_from_cli() {
        Ok(info) => info,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(path) = loaded_env.as_ref() {
        info!("Environment loaded from .env file: {}", path.display());
    }

    info!(
        "workpulse {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    if let Err(e) = run() {
        error!("fatal: {}", e);
        std::process::exit(1);
    }
}
