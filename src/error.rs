use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde_json::json;

/// Errores del servicio. Los errores por fila de la importación NO pasan por
/// aquí: se devuelven como datos dentro del `ImportReport`.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// No hubo conexión libre dentro del timeout.
    #[error("database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// El archivo no se pudo abrir o leer como planilla.
    #[error("spreadsheet error: {0}")]
    Spreadsheet(String),

    #[error("unsupported file: {0}")]
    UnsupportedFile(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing or invalid credentials")]
    Unauthorized,

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Spreadsheet(_) | AppError::UnsupportedFile(_) | AppError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Pool(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Io(_) | AppError::Database(_) | AppError::Config(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Respuesta JSON `{"error": ...}` con el status correspondiente.
    pub fn to_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({"error": self.to_string()}))
    }
}

impl From<calamine::Error> for AppError {
    fn from(e: calamine::Error) -> Self {
        AppError::Spreadsheet(e.to_string())
    }
}

impl actix_web::ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        AppError::status_code(self)
    }

    fn error_response(&self) -> HttpResponse {
        self.to_response()
    }
}
