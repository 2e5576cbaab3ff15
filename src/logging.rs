use eyre::{Result, eyre};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Installs the global fmt subscriber at INFO, or DEBUG when `verbose`.
///
/// Also installs a `log` bridge: teloxide reports polling and handler errors
/// through the `log` crate, and those records are dropped without it.
pub fn init(verbose: bool) -> Result<()> {
    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .try_init()
        .map_err(|e| eyre!("Failed to set tracing subscriber: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_records_reach_the_subscriber() {
        init(false).unwrap();

        assert!(log::log_enabled!(target: "teloxide::error_handlers", log::Level::Error));
        assert!(log::log_enabled!(target: "teloxide::dispatching", log::Level::Info));
        assert!(!log::log_enabled!(target: "teloxide::dispatching", log::Level::Debug));
    }
}
