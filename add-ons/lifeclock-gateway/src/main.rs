//! Axum gateway for the Life Clock product: report computation and persistence,
//! PDF-export contract enforcement, rate-limited checkout-session creation,
//! social-proof count, and funnel event tracking.
//!
//! The report pipeline itself is pure (lifeclock-core); everything here is glue
//! between it and its collaborators. Collaborator failures are logged and never
//! take the report away from the user.

mod handlers;
mod limiter;
mod nurture;
mod social_proof;
mod store;

use handlers::{build_app, AppState};
use lifeclock_core::ReportConfig;
use lifeclock_mailer::{Mailer, MailerConfig, SmtpMailer};
use limiter::CheckoutLimiter;
use nurture::{run_nurture_worker, NurtureConfig};
use social_proof::{CachedSocialProof, SOCIAL_PROOF_TTL};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use store::ReportStore;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Gateway configuration loaded from environment.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | LIFECLOCK_BIND | 127.0.0.1:8080 | Listen address. |
/// | LIFECLOCK_DATA_DIR | ./lifeclock-data | sled directory for reports and events. |
/// | LIFECLOCK_CHECKOUT_BURST | 5 | Token-bucket capacity per identifier. |
/// | LIFECLOCK_CHECKOUT_PER_MINUTE | 3 | Token refill per minute. |
/// | LIFECLOCK_PDF_RENDERER_URL | (unset) | External PDF renderer; export replies 503 when unset. |
/// | LIFECLOCK_CHECKOUT_URL | (unset) | External checkout-session creator. |
/// | LIFECLOCK_NURTURE_ENABLED | false | Background nurture email passes. |
/// | LIFECLOCK_NURTURE_INTERVAL_SECS | 3600 | Time between nurture passes. |
#[derive(Debug, Clone)]
struct GatewayConfig {
    bind: String,
    data_dir: PathBuf,
    checkout_burst: u32,
    checkout_per_minute: f64,
    pdf_renderer_url: Option<String>,
    checkout_url: Option<String>,
    nurture_enabled: bool,
    nurture_interval: Duration,
}

impl GatewayConfig {
    fn from_env() -> Self {
        Self {
            bind: env_string("LIFECLOCK_BIND").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            data_dir: env_string("LIFECLOCK_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./lifeclock-data")),
            checkout_burst: env_parse("LIFECLOCK_CHECKOUT_BURST").unwrap_or(5),
            checkout_per_minute: env_parse("LIFECLOCK_CHECKOUT_PER_MINUTE").unwrap_or(3.0),
            pdf_renderer_url: env_string("LIFECLOCK_PDF_RENDERER_URL"),
            checkout_url: env_string("LIFECLOCK_CHECKOUT_URL"),
            nurture_enabled: env_bool("LIFECLOCK_NURTURE_ENABLED", false),
            nurture_interval: Duration::from_secs(
                env_parse("LIFECLOCK_NURTURE_INTERVAL_SECS").unwrap_or(3600),
            ),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[lifeclock-gateway] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = GatewayConfig::from_env();
    let report_config = ReportConfig::from_env();

    let store = match ReportStore::open(&config.data_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            eprintln!(
                "[lifeclock-gateway] cannot open data dir {}: {}",
                config.data_dir.display(),
                e
            );
            std::process::exit(1);
        }
    };

    // Nurture worker: only when enabled and an SMTP transport is configured.
    let mailer_config = MailerConfig::from_env();
    if config.nurture_enabled {
        match SmtpMailer::from_config(&mailer_config) {
            Ok(Some(smtp)) => {
                let mailer: Arc<dyn Mailer> = Arc::new(smtp);
                tokio::spawn(run_nurture_worker(
                    store.clone(),
                    mailer,
                    NurtureConfig {
                        pass_interval: config.nurture_interval,
                        inter_send_delay: mailer_config.inter_send_delay,
                    },
                ));
                info!("nurture worker enabled");
            }
            Ok(None) => info!("nurture enabled but LIFECLOCK_SMTP_URL unset; email disabled"),
            Err(e) => warn!("mailer config invalid, email disabled: {}", e),
        }
    }

    let http = match reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
    {
        Ok(client) => client,
        Err(e) => {
            eprintln!("[lifeclock-gateway] http client build failed: {}", e);
            std::process::exit(1);
        }
    };

    let state = Arc::new(AppState {
        limiter: CheckoutLimiter::new(config.checkout_burst, config.checkout_per_minute),
        social_proof: CachedSocialProof::new(Box::new(store.clone()), SOCIAL_PROOF_TTL),
        store: store.clone(),
        report_config,
        http,
        pdf_renderer_url: config.pdf_renderer_url.clone(),
        checkout_url: config.checkout_url.clone(),
    });

    let app = build_app(state);

    info!("lifeclock-gateway listening on {}", config.bind);
    let listener = match tokio::net::TcpListener::bind(&config.bind).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("[lifeclock-gateway] cannot bind {}: {}", config.bind, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("[lifeclock-gateway] server error: {}", e);
    }
    if let Err(e) = store.flush() {
        warn!("final store flush failed: {}", e);
    }
}
