//! Log output on stderr, filtered by `INTERPOSE_LOG` or `-v`.

use tracing_subscriber::EnvFilter;

pub const LOG_VAR: &str = "INTERPOSE_LOG";

/// Directive for a `-v` count; `None` defers to the environment.
pub fn level_for(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        2 => Some("debug"),
        _ => Some("trace"),
    }
}

pub fn init(verbosity: u8) {
    let filter = match level_for(verbosity) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::level_for;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), None);
        assert_eq!(level_for(1), Some("info"));
        assert_eq!(level_for(2), Some("debug"));
        assert_eq!(level_for(7), Some("trace"));
    }
}
