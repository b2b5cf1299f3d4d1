use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "SNAPSHOTTOOL_LOG";
const DEFAULT_FILTER: &str = "info";

fn build_env_filter_from(tool_log: Option<&str>, rust_log: Option<&str>) -> EnvFilter {
    let default = || EnvFilter::new(DEFAULT_FILTER);

    if let Some(v) = tool_log {
        return EnvFilter::try_new(v).unwrap_or_else(|_| default());
    }
    if let Some(v) = rust_log {
        return EnvFilter::try_new(v).unwrap_or_else(|_| default());
    }
    default()
}

fn build_env_filter() -> EnvFilter {
    build_env_filter_from(
        std::env::var(LOG_ENV).ok().as_deref(),
        std::env::var("RUST_LOG").ok().as_deref(),
    )
}

/// Operator console logging on stderr. Safe to call more than once.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(build_env_filter())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_filter_wins_over_rust_log() {
        let filter = build_env_filter_from(Some("debug"), Some("warn"));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn test_rust_log_used_when_tool_filter_absent() {
        let filter = build_env_filter_from(None, Some("warn"));
        assert_eq!(filter.to_string(), "warn");
    }
}
