use log::LevelFilter;

/// Initialises the global logger from the configured level. `fatal` collapses to `error`, the most severe
/// level the `log` facade has; unknown values fall back to `info`.
pub fn init(level: &str) {
    let filter = match level.to_ascii_lowercase().as_str() {
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" | "fatal" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };
    let _ = env_logger::Builder::from_default_env().filter_level(filter).try_init();
}
