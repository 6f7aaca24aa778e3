use once_cell::sync::Lazy;
use tracing::Level;
use tracing_core::LevelFilter;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;
use tracing_subscriber::Layer;
use tracing_subscriber::{fmt, Registry};

static FORMFLOW_LOG: Lazy<Level> = Lazy::new(|| match std::env::var("FORMFLOW_LOG") {
    Ok(level) => level.parse::<Level>().unwrap_or(Level::INFO),
    Err(_) => Level::INFO,
});

pub fn get_log_level() -> Level {
    *FORMFLOW_LOG
}

/// Installs the fmt subscriber on stderr and routes `log` records from the
/// engine through it. Stdout is left to the report.
pub fn init_tracing() {
    let subscriber = Registry::default().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(LevelFilter::from_level(get_log_level())),
    );

    if let Err(err) = LogTracer::init() {
        eprintln!("Log bridge already installed: {}", err);
    }

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Tracing subscriber already installed: {}", err);
    }
}
