//! Configuration: `settings.conf` parsing and config/log directory resolution.

mod paths;
mod settings;

pub use paths::{config_dir, logs_dir, resolve_settings_path};
pub use settings::{Settings, load_settings, parse_settings};

#[cfg(test)]
static TEST_MUTEX: std::sync::OnceLock<std::sync::Mutex<()>> = std::sync::OnceLock::new();

#[cfg(test)]
/// Serializes tests that mutate `HOME`/`XDG_CONFIG_HOME`.
pub(crate) fn test_mutex() -> &'static std::sync::Mutex<()> {
    TEST_MUTEX.get_or_init(|| std::sync::Mutex::new(()))
}
