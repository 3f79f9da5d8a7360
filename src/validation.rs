//! Validaciones explícitas que los repositorios ejecutan antes de cada escritura.

use crate::{AppError, AppResult};

/// Longitud máxima de los nombres, en caracteres
pub const MAX_NAME_LEN: usize = 100;

/// El nombre no puede quedar vacío tras `trim` ni superar [`MAX_NAME_LEN`] caracteres
pub fn validate_name(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation_field(field, "no puede estar vacío"));
    }

    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation_field(
            field,
            &format!("no puede superar {} caracteres", MAX_NAME_LEN),
        ));
    }

    Ok(())
}

pub fn validate_min(field: &str, value: i32, min: i32) -> AppResult<()> {
    if value < min {
        return Err(AppError::validation_field(
            field,
            &format!("debe ser al menos {}", min),
        ));
    }
    Ok(())
}
