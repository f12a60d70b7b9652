use thiserror::Error;

pub const NETWORK_MESSAGE: &str = "No se pudo conectar con el servidor";
pub const LOGIN_FAILED_MESSAGE: &str = "Usuario o PIN incorrectos";
pub const OPERATION_FAILED_MESSAGE: &str = "No se pudo completar la operación";

/// Rejected before any request is issued.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Rellena el campo {0}")]
    MissingField(&'static str),

    #[error("El importe debe ser un número mayor que cero")]
    InvalidAmount,

    #[error("No hay cambios que guardar")]
    EmptyPatch,
}

impl ValidationError {
    /// Name of the form control the message belongs next to.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField(field) => Some(*field),
            ValidationError::InvalidAmount => Some("importe"),
            ValidationError::EmptyPatch => None,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    Network { message: String },

    #[error("{message}")]
    Backend { status: u16, message: String },
}
