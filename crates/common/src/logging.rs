use std::cmp;

use tracing_core::{Level, LevelFilter};
use tracing_subscriber::{filter::Targets, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

/// Noisy dependency targets along with the most verbose level they may log at.
const DEPENDENCY_CAPS: [(&str, Level); 3] = [
    ("sqlx", Level::WARN),
    ("sea_orm", Level::INFO),
    ("hyper", Level::INFO),
];

/// Per-target filters for the configured level.
///
/// Dependencies never log louder than the configured level either.
fn targets(level: LevelFilter) -> Targets {
    DEPENDENCY_CAPS
        .into_iter()
        .fold(Targets::new().with_default(level), |targets, (target, cap)| {
            targets.with_target(target, cmp::min(level, LevelFilter::from_level(cap)))
        })
}

/// Install the global subscriber that prints compact lines without targets.
pub fn init(config: &Config) {
    let format = fmt::format().with_target(false).compact();

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(targets(config.logging.level))
        .init();
}

#[cfg(test)]
mod tests {
    use tracing_core::{Level, LevelFilter};

    use super::targets;

    #[test]
    fn dependency_caps() {
        let verbose = targets(LevelFilter::TRACE);

        assert!(verbose.would_enable("server::handlers", &Level::TRACE));
        assert!(verbose.would_enable("sea_orm::driver", &Level::INFO));
        assert!(!verbose.would_enable("sea_orm::driver", &Level::DEBUG));
        assert!(!verbose.would_enable("sqlx::query", &Level::INFO));

        let quiet = targets(LevelFilter::ERROR);

        assert!(!quiet.would_enable("sqlx::query", &Level::WARN));
        assert!(!quiet.would_enable("server::handlers", &Level::INFO));
        assert!(quiet.would_enable("server::handlers", &Level::ERROR));
    }
}
