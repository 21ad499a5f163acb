use tracing_subscriber::EnvFilter;

/// Quiet third-party HTTP stacks unless asked for by name
const NOISY_CRATES: &str = "hyper=warn,reqwest=warn,rustls=warn";

/// Filter precedence: `--verbose` > `RUST_LOG` > configured level
pub fn filter(verbose: bool, log_level: &str) -> anyhow::Result<EnvFilter> {
    if verbose {
        return Ok(EnvFilter::new(format!("debug,{NOISY_CRATES}")));
    }

    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(format!("{log_level},{NOISY_CRATES}")).map_err(|e| {
            anyhow::anyhow!("invalid log level/filter '{}': {}", log_level, e)
        }),
    }
}

/// Logs go to stderr so the gauge owns stdout
pub fn init(verbose: bool, log_level: &str) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(verbose, log_level)?)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("telemetry error: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_verbose_wins() {
        let filter = filter(true, "error").unwrap();
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_rejects_garbage_level() {
        if std::env::var("RUST_LOG").is_err() {
            assert!(filter(false, "scoreguard=loudest").is_err());
        }
    }
}
