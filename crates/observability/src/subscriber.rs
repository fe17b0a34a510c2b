use tracing_subscriber::EnvFilter;

/// Output shape of log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event; what the store's structured fields are written for.
    #[default]
    Json,
    /// Human-readable lines for local runs.
    Pretty,
}

/// Install a global subscriber. `RUST_LOG` wins over `default_directive`
/// when set and parseable.
///
/// Returns `false` if a subscriber was already installed.
pub fn init_with(format: LogFormat, default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match format {
        LogFormat::Json => builder.json().with_current_span(true).try_init().is_ok(),
        LogFormat::Pretty => builder.pretty().try_init().is_ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_a_no_op() {
        crate::init();
        assert!(!init_with(LogFormat::Pretty, "debug"));
        crate::init();
        tracing::info!(component = "observability", "still logging");
    }

    #[test]
    fn json_is_the_default_format() {
        assert_eq!(LogFormat::default(), LogFormat::Json);
    }
}
