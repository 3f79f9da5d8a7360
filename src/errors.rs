//! # Errores de la librería
//!
//! Jerarquía de errores construida con thiserror. Todas las operaciones de los
//! repositorios y de la consulta de disponibilidad devuelven [`AppResult`].

use thiserror::Error;

/// Tipos de error de la librería
#[derive(Error, Debug)]
pub enum AppError {
    /// Error de base de datos con la operación que lo produjo
    ///
    /// Conserva el error original de mongodb como `source` para poder
    /// recorrer la cadena completa al registrarlo.
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Database {
        operation: String,
        #[source]
        source: mongodb::error::Error,
    },

    /// Error de validación en un campo concreto
    #[error("Error de validación en campo '{field}': {message}")]
    ValidationWithField {
        field: String,
        message: String,
    },

    /// Recurso no encontrado
    #[error("No encontrado: {resource_type} con ID '{id}'")]
    NotFoundWithId {
        resource_type: String,
        id: String,
    },

    /// Configuración inutilizable
    #[error("Error de configuración: {0}")]
    Config(String),

    /// Error interno con código de rastreo
    #[error("Error interno (trace: {trace_id}): {message}")]
    InternalWithTrace {
        trace_id: String,
        message: String,
    },
}

impl AppError {
    /// Crea un error de base de datos con contexto de operación
    pub fn database(operation: &str, source: mongodb::error::Error) -> Self {
        Self::Database {
            operation: operation.to_string(),
            source,
        }
    }

    /// Crea un error de validación con campo específico
    pub fn validation_field(field: &str, message: &str) -> Self {
        Self::ValidationWithField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }

    /// Crea un error de no encontrado con ID
    pub fn not_found_id(resource_type: &str, id: &str) -> Self {
        Self::NotFoundWithId {
            resource_type: resource_type.to_string(),
            id: id.to_string(),
        }
    }

    /// Crea un error interno con trace ID (se genera uno si no se indica)
    pub fn internal_trace(message: &str, trace_id: Option<String>) -> Self {
        Self::InternalWithTrace {
            trace_id: trace_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            message: message.to_string(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::ValidationWithField { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFoundWithId { .. })
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Conversión de errores ajenos a las variantes de [`AppError`]
pub trait ResultExt<T> {
    fn map_err_internal(self, message: &str) -> AppResult<T>;
    fn map_err_config(self, message: &str) -> AppResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::error::Error + Send + 'static,
{
    fn map_err_internal(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::internal_trace(&format!("{}: {}", message, e), None))
    }

    fn map_err_config(self, message: &str) -> AppResult<T> {
        self.map_err(|e| AppError::Config(format!("{}: {}", message, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_field() {
        let err = AppError::validation_field("name", "no puede estar vacío");
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "Error de validación en campo 'name': no puede estar vacío"
        );
    }

    #[test]
    fn internal_trace_generates_id_when_missing() {
        match AppError::internal_trace("fallo", None) {
            AppError::InternalWithTrace { trace_id, message } => {
                assert_eq!(message, "fallo");
                assert!(uuid::Uuid::parse_str(&trace_id).is_ok());
            }
            other => panic!("variante inesperada: {other:?}"),
        }
    }

    #[test]
    fn result_ext_maps_into_config() {
        let parsed: Result<i32, std::num::ParseIntError> = "x".parse();
        let err = parsed.map_err_config("MONGODB_PORT").unwrap_err();
        assert!(matches!(err, AppError::Config(msg) if msg.starts_with("MONGODB_PORT")));
    }
}
