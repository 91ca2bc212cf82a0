pub mod config;
pub mod db;
pub mod domain;
pub mod models;
pub mod seed;
pub mod services;

pub use config::Config;
pub use db::init_db;
pub use domain::DomainError;

/// Initialize tracing for embedding programs. Call once at startup.
pub fn init_tracing() {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "librarium=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
