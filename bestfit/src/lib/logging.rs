use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use crate::io::{Error, Result};
use crate::utils::Level;

/// Parses a verbosity name (`error`, `warn`, `info`, `debug` or `trace`,
/// in any case). Meant as a clap `value_parser`, so a typo is reported
/// at the command line instead of silently changing the verbosity.
pub fn parse_level(s: &str) -> Result<Level> {
    s.trim()
        .parse::<Level>()
        .map_err(|_| Error::msg(format!(
            "Unknown log level {s:?}; expected one of error, warn, info, debug, trace"
        )))
}

/// Installs the global `tracing` subscriber used by the binaries.
///
/// Events go to stderr, leaving stdout to the console UI. `level` is the
/// default verbosity; `RUST_LOG` directives take precedence over it.
pub fn init(level: Level) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
