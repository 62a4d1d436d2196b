use serde_derive::Deserialize;
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

#[derive(Debug, Deserialize)]
pub struct Log {
    pub level: String,
    #[serde(default)]
    pub structured: bool,
}

/// setup log from an optional environment filter and the config file
///
/// if the environment filter is present, then the configured level is not used.
/// Output goes to stderr so it never interleaves with the rendered screen.
pub fn setup(
    env_filter: Result<EnvFilter, tracing_subscriber::filter::FromEnvError>,
    config: &Option<Log>,
) -> anyhow::Result<()> {
    let env_filter = match (env_filter, config) {
        (Ok(env_filter), _) => env_filter,
        (Err(_), Some(log)) => EnvFilter::try_new(&log.level)?,
        (Err(_), None) => EnvFilter::new("warn"),
    };
    let structured = config.as_ref().map(|l| l.structured).unwrap_or(false);

    let sbuilder = Subscriber::builder()
        .with_timer(tracing_subscriber::fmt::time::ChronoUtc::rfc3339())
        .with_level(true)
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter);
    if structured {
        tracing::subscriber::set_global_default(sbuilder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(sbuilder.with_ansi(true).finish())?;
    }
    Ok(())
}
