//! Logging setup

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system
///
/// `default_level` applies when `RUST_LOG` is unset; directives from
/// `RUST_LOG` take precedence. Returns `false` if a logger was already
/// installed, which is harmless.
pub fn init(default_level: log::LevelFilter) -> bool {
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init(log::LevelFilter::Warn);
        assert!(!init(log::LevelFilter::Debug));
    }
}
