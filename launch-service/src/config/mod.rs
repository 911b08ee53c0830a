// Configuration
// Live settings stores and the effective-configuration resolver

pub mod resolver;
pub mod store;

pub use resolver::{CallerSettings, ConfigResolver, EffectiveConfig, LogLevel};
pub use store::{keys, EnvStore, MapStore, SettingsStore};
