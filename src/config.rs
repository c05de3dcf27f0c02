use config::Environment;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(Environment::default())
    }

    fn from_environment(env: Environment) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .set_default("server_port", 8000)?
            .set_default("max_connections", 8)?
            .add_source(env)
            .build()?;
        config.try_deserialize()
    }
}
