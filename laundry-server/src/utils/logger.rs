//! Logging Infrastructure
//!
//! - Console output (pretty for development, JSON for production)
//! - Daily rotating application logs (deleted after 14 days)
//! - Audit logs: status transitions, payments, refunds, role changes (kept)
//! - Security logs: authentication and permission failures (kept)

use std::fs;
use std::path::{Path, PathBuf};

use tokio_util::sync::CancellationToken;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, Registry, filter::filter_fn, fmt, prelude::*};

/// Application logs older than this are removed by [`cleanup_old_logs`].
pub const APP_LOG_RETENTION_DAYS: i64 = 14;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn daily_appender(dir: &Path, prefix: &str) -> anyhow::Result<RollingFileAppender> {
    fs::create_dir_all(dir)?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(dir)?;
    Ok(appender)
}

fn file_layer<F>(appender: RollingFileAppender, json: bool, keep: F) -> BoxedLayer
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    let filter = filter_fn(move |meta| keep(meta.target()));
    if json {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(appender))
            .with_filter(filter)
            .boxed()
    }
}

/// Initialize the logging system
///
/// # Arguments
/// * `level` - Log level (e.g., "info", "debug"); `RUST_LOG` takes precedence
/// * `json_format` - JSON console/file output (production)
/// * `log_dir` - Optional directory for file logging (`{log_dir}/app|audit|security`)
///
/// Old app logs are removed by [`periodic_cleanup`], registered as a background task.
pub fn init_logger(level: &str, json_format: bool, log_dir: Option<&Path>) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let mut layers: Vec<BoxedLayer> = Vec::new();

    if json_format {
        layers.push(
            fmt::layer()
                .json()
                .with_target(true)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    } else {
        layers.push(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .boxed(),
        );
    }

    if let Some(dir) = log_dir {
        let app = daily_appender(&dir.join("app"), "app")?;
        let audit = daily_appender(&dir.join("audit"), "audit")?;
        let security = daily_appender(&dir.join("security"), "security")?;

        layers.push(file_layer(app, json_format, |target| {
            target != "audit" && target != "security"
        }));
        layers.push(file_layer(audit, json_format, |target| target == "audit"));
        layers.push(file_layer(security, json_format, |target| {
            target == "security"
        }));
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()?;
    Ok(())
}

/// Clean up application log files (`app.YYYY-MM-DD.log`) older than 14 days
///
/// Audit and security logs are never touched. Returns the number of deleted files.
pub fn cleanup_old_logs(log_dir: &Path) -> anyhow::Result<usize> {
    let app_log_dir = log_dir.join("app");
    if !app_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = chrono::Utc::now().date_naive() - chrono::Duration::days(APP_LOG_RETENTION_DAYS);
    let mut deleted = 0;

    for entry in fs::read_dir(app_log_dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(date_part) = name
            .strip_prefix("app.")
            .and_then(|d| d.strip_suffix(".log"))
        else {
            continue;
        };
        if let Ok(date) = chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
            && date < cutoff
        {
            fs::remove_file(&path)?;
            tracing::info!(file = %name, "Deleted old log file");
            deleted += 1;
        }
    }

    Ok(deleted)
}

/// Periodic cleanup task - runs every hour until shutdown
pub async fn periodic_cleanup(log_dir: PathBuf, shutdown: CancellationToken) {
    use tokio::time::{Duration, sleep};

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = sleep(Duration::from_secs(3600)) => {
                if let Err(e) = cleanup_old_logs(&log_dir) {
                    tracing::error!(error = %e, "Failed to cleanup old logs");
                }
            }
        }
    }
}

/// Audit log helper - records business-critical operations
///
/// ```no_run
/// laundry_server::audit_log!("user-1", "transition", "order:LD240501000123", "pending -> picked_up");
/// laundry_server::audit_log!("system", "payment_confirmed", "order:LD240501000123");
/// ```
#[macro_export]
macro_rules! audit_log {
    ($user_id:expr, $action:expr, $resource:expr) => {
        tracing::info!(
            target: "audit",
            user_id = %$user_id,
            action = $action,
            resource = %$resource,
            timestamp = chrono::Utc::now().to_rfc3339(),
            "AUDIT"
        );
    };
    ($user_id:expr, $action:expr, $resource:expr, $details:expr) => {
        tracing::info!(
            target: "audit",
            user_id = %$user_id,
            action = $action,
            resource = %$resource,
            details = %$details,
            timestamp = chrono::Utc::now().to_rfc3339(),
            "AUDIT"
        );
    };
}

/// Security log helper - records authentication and authorization events
///
/// ```no_run
/// laundry_server::security_log!(WARN, "permission_denied", user_id = "u1", capability = "view_analytics");
/// laundry_server::security_log!(WARN, "webhook_signature_invalid", remote = "unknown");
/// ```
#[macro_export]
macro_rules! security_log {
    (WARN, $event:expr, $($arg:tt)*) => {
        tracing::warn!(
            target: "security",
            event = $event,
            timestamp = chrono::Utc::now().to_rfc3339(),
            $($arg)*
        );
    };
    (ERROR, $event:expr, $($arg:tt)*) => {
        tracing::error!(
            target: "security",
            event = $event,
            timestamp = chrono::Utc::now().to_rfc3339(),
            $($arg)*
        );
    };
    (INFO, $event:expr, $($arg:tt)*) => {
        tracing::info!(
            target: "security",
            event = $event,
            timestamp = chrono::Utc::now().to_rfc3339(),
            $($arg)*
        );
    };
}
