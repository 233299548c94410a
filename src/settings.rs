use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub db_path: String,
    pub bind_addr: String,
}

impl Settings {
    /// Reads `DB_PATH` and `BIND_ADDR`, picking up a `.env` file first if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::load(Config::builder().add_source(Environment::default()))
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder
            .set_default("bind_addr", DEFAULT_BIND_ADDR)?
            .build()?
            .try_deserialize()
    }
}
