use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_tree::HierarchicalLayer;

pub const DEFAULT_FILTER: &str = "zone_layout=info";

/// `RUST_LOG` when set and parseable, `default` otherwise.
pub fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Installs the global subscriber. Fails, without panicking, if one is
/// already installed.
pub fn init() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(DEFAULT_FILTER))
        .with(
            HierarchicalLayer::default()
                .with_indent_amount(2)
                .with_targets(true)
                .with_indent_lines(true),
        )
        .try_init()?;
    Ok(())
}
