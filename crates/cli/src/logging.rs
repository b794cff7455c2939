// Logger setup
//
// Precedence: -v flags, then RUST_LOG, then the settings file's log.level.

use std::io::Write;

use log::LevelFilter;

pub(crate) fn level_for_verbosity(verbose: u8) -> Option<LevelFilter> {
    match verbose {
        0 => None,
        1 => Some(LevelFilter::Info),
        2 => Some(LevelFilter::Debug),
        _ => Some(LevelFilter::Trace),
    }
}

/// Parse a settings level name; unknown names fall back to `warn`.
pub(crate) fn parse_level(name: &str) -> LevelFilter {
    name.trim().parse().unwrap_or(LevelFilter::Warn)
}

pub(crate) fn configure_logging(verbose: u8, settings_level: &str) {
    let mut builder = env_logger::Builder::from_default_env();
    match level_for_verbosity(verbose) {
        Some(level) => {
            builder.filter_level(level);
        }
        None if std::env::var_os("RUST_LOG").is_none() => {
            builder.filter_level(parse_level(settings_level));
        }
        None => {}
    }
    builder.format(|buf, record| {
        writeln!(buf, "{}: {}", record.level().as_str().to_lowercase(), record.args())
    });
    // A logger may already be installed when run under a test harness
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for_verbosity(0), None);
        assert_eq!(level_for_verbosity(1), Some(LevelFilter::Info));
        assert_eq!(level_for_verbosity(2), Some(LevelFilter::Debug));
        assert_eq!(level_for_verbosity(9), Some(LevelFilter::Trace));
    }

    #[test]
    fn settings_level_names() {
        assert_eq!(parse_level("debug"), LevelFilter::Debug);
        assert_eq!(parse_level(" ERROR "), LevelFilter::Error);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("loud"), LevelFilter::Warn);
    }
}
