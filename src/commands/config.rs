use crate::models::build::BuildConfiguration;
use crate::models::config::AppConfig;
use crate::models::stat::StatKey;
use crate::services::config::ConfigManager;
use parking_lot::Mutex;

/// State wrapper for configuration manager
pub type ConfigManagerState = Mutex<ConfigManager>;

/// Initialize config manager state
pub fn init_config_manager() -> Result<ConfigManagerState, String> {
    let manager = ConfigManager::new().map_err(|e| e.to_string())?;
    Ok(Mutex::new(manager))
}

/// Save application configuration
pub fn save_config(state: &ConfigManagerState, config: &AppConfig) -> Result<(), String> {
    state
        .lock()
        .save(config)
        .map_err(|e| format!("Failed to save config: {}", e))
}

/// Load application configuration
pub fn load_config(state: &ConfigManagerState) -> Result<AppConfig, String> {
    state
        .lock()
        .load()
        .map_err(|e| format!("Failed to load config: {}", e))
}

/// Get config file path
pub fn get_config_path(state: &ConfigManagerState) -> String {
    state
        .lock()
        .config_file_path()
        .to_string_lossy()
        .into_owned()
}

/// Change one benchmark and persist it. Non-finite values are rejected.
pub fn save_benchmark(state: &ConfigManagerState, key: StatKey, value: f64) -> Result<AppConfig, String> {
    let manager = state.lock();
    let mut config = manager.load().map_err(|e| format!("Failed to load config: {}", e))?;

    if !config.benchmarks.set(key, value) {
        return Err(format!("Invalid benchmark for {}: {}", key, value));
    }

    manager
        .save(&config)
        .map_err(|e| format!("Failed to save config: {}", e))?;
    Ok(config)
}

/// Restore one benchmark to its default and persist it
pub fn reset_benchmark(state: &ConfigManagerState, key: StatKey) -> Result<AppConfig, String> {
    let manager = state.lock();
    let mut config = manager.load().map_err(|e| format!("Failed to load config: {}", e))?;

    config.benchmarks.reset(key);

    manager
        .save(&config)
        .map_err(|e| format!("Failed to save config: {}", e))?;
    Ok(config)
}

/// Persist the default build
pub fn save_build(state: &ConfigManagerState, build: BuildConfiguration) -> Result<AppConfig, String> {
    let manager = state.lock();
    let mut config = manager.load().map_err(|e| format!("Failed to load config: {}", e))?;

    config.build = build;

    manager
        .save(&config)
        .map_err(|e| format!("Failed to save config: {}", e))?;
    Ok(config)
}
