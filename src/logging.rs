//! # Utilidades de logging
//!
//! Inicialización del subscriber de tracing y registro de cadenas de errores.

use std::error::Error as StdError;

/// Instala el subscriber de tracing para la aplicación que embebe la librería
///
/// El filtro se toma de `RUST_LOG` y se completa con `pispas_availability=debug`
/// y `mongodb=info`. Si ya hay un subscriber global instalado no hace nada.
///
/// # Ejemplo
/// ```no_run
/// pispas_availability::logging::init_tracing();
/// tracing::info!("arrancando");
/// ```
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("pispas_availability=debug".parse().expect("directiva constante"))
        .add_directive("mongodb=info".parse().expect("directiva constante"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Recorre `source()` y devuelve los mensajes de toda la cadena de errores
pub fn error_chain<E>(error: &E) -> Vec<String>
where
    E: StdError + 'static,
{
    let mut chain = Vec::new();
    let mut current: Option<&dyn StdError> = Some(error);

    while let Some(err) = current {
        chain.push(err.to_string());
        current = err.source();
    }

    chain
}

/// Registra la cadena completa de errores
///
/// # Parámetros
/// - `error`: Error a analizar y registrar
/// - `context`: Contexto opcional para añadir información
pub fn log_error_chain<E>(error: &E, context: Option<&str>)
where
    E: StdError + 'static,
{
    let chain = error_chain(error);

    if let Some(ctx) = context {
        tracing::error!(
            context = %ctx,
            error_chain = ?chain,
            "Error with full chain (with context)"
        );
    } else {
        tracing::error!(error_chain = ?chain, "Error with full chain");
    }
}

/// Extension trait para Results que añade logging de la cadena de errores
///
/// # Ejemplo de uso
/// ```ignore
/// collection
///     .insert_one(restaurant)
///     .await
///     .log_error_context("inserting restaurant")
///     .map_err(|e| AppError::database("insert_restaurant", e))?;
/// ```
pub trait ErrorLogExt<T, E> {
    /// Loggea la cadena de errores con contexto adicional
    fn log_error_context(self, context: &str) -> Result<T, E>;
}

impl<T, E> ErrorLogExt<T, E> for Result<T, E>
where
    E: StdError + 'static,
{
    fn log_error_context(self, context: &str) -> Result<T, E> {
        if let Err(ref error) = self {
            log_error_chain(error, Some(context));
        }
        self
    }
}
