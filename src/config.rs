use rocket::figment::Figment;
use serde::Deserialize;

use std::collections::HashMap;
use std::path::PathBuf;

fn default_database_path() -> PathBuf {
    PathBuf::from("rroutine.db")
}

/// Application settings read from the same figment Rocket uses, so they can
/// live in `Rocket.toml` or come from `ROCKET_*` environment variables.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct AppConfig {
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Bearer token to user id.
    #[serde(default)]
    pub auth_tokens: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_figment(figment: &Figment) -> Result<AppConfig, rocket::figment::Error> {
        figment.extract()
    }
}
