//! # Configuración
//!
//! La conexión a MongoDB se configura mediante variables de entorno (archivo
//! `.env` opcional):
//!
//! ```env
//! MONGODB_URI=mongodb://localhost:27017
//! MONGODB_DATABASE=pispas_availability
//! RUST_LOG=debug,mongodb=info
//! ```

use std::env;

use crate::{AppError, AppResult};

pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
pub const DEFAULT_MONGODB_DATABASE: &str = "pispas_availability";

/// Parámetros de conexión a MongoDB
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: DEFAULT_MONGODB_URI.to_string(),
            database: DEFAULT_MONGODB_DATABASE.to_string(),
        }
    }
}

impl MongoConfig {
    /// Carga `.env` si existe y lee `MONGODB_URI` y `MONGODB_DATABASE`
    ///
    /// Las variables ausentes toman el valor por defecto; las presentes pero
    /// vacías son un error de configuración.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = lookup("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string());
        let database =
            lookup("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_MONGODB_DATABASE.to_string());

        let config = Self { uri, database };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.uri.trim().is_empty() {
            return Err(AppError::Config("MONGODB_URI está vacío".to_string()));
        }
        if self.database.trim().is_empty() {
            return Err(AppError::Config("MONGODB_DATABASE está vacío".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = MongoConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, MongoConfig::default());
    }

    #[test]
    fn reads_overrides() {
        let config = MongoConfig::from_lookup(lookup(&[
            ("MONGODB_URI", "mongodb://remote:27017"),
            ("MONGODB_DATABASE", "sala"),
        ]))
        .unwrap();
        assert_eq!(config.uri, "mongodb://remote:27017");
        assert_eq!(config.database, "sala");
    }

    #[test]
    fn empty_database_is_rejected() {
        let err = MongoConfig::from_lookup(lookup(&[("MONGODB_DATABASE", "  ")])).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }
}
