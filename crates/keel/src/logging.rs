use tracing_subscriber::EnvFilter;

/// Install the global subscriber and route `log` records into it.
///
/// `RUST_LOG` wins when set; otherwise the level is `info`, or `debug` with
/// `--verbose`. Output goes to stderr so stdout only carries command output.
pub fn init(verbose: bool) -> Result<(), String> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| format!("Invalid log filter: {}", e))?;

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| format!("Failed to install tracing subscriber: {}", e))?;
    tracing_log::LogTracer::init().map_err(|e| format!("Failed to bridge log records: {}", e))?;
    Ok(())
}
