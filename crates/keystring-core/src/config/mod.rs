// Keystring Config API
// TOML configuration for layouts, character overrides and custom named keys

#[cfg(feature = "toml-config")]
pub mod parser;

#[cfg(feature = "toml-config")]
pub use parser::{
    default_config_content, CharacterEntry, Config, ConfigError, ConfigToml, KeySpec,
    LayoutConfig,
};
