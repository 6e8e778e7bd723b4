use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a JSON tracing subscriber for applications embedding the engine.
///
/// Filtering follows `RUST_LOG` when set.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "info,hyper=warn,reqwest=warn,household_energy_analytics=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
