//! Tracing subscriber setup shared by the binaries

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directives for the given level
pub fn default_filter(level: &str) -> String {
    format!(
        "apiservice_server={level},apiservice_client={level},apiservice={level},tower_http={level}"
    )
}

/// Install the global subscriber; `RUST_LOG` overrides the configured level
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(level).into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = default_filter("info");
        assert!(filter.starts_with("apiservice_server=info"));
        assert!(EnvFilter::try_new(filter).is_ok());
    }
}
