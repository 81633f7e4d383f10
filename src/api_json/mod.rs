//! Capa HTTP JSON: identificación del llamador y utilidades comunes a los handlers.

pub mod handlers;

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse};
use futures_util::future::{ready, Ready};
use rusqlite::Connection;
use serde::Serialize;

use crate::error::AppError;
use crate::server::AppState;

/// Usuario que hace la petición.
///
/// Con `CALENDARIO_API_TOKENS` vacío el servidor es abierto y el llamador es
/// `anonymous`; si no, se exige `Authorization: Bearer <token>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user: String,
}

pub const ANONYMOUS: &str = "anonymous";

impl FromRequest for Caller {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(identify(req))
    }
}

fn identify(req: &HttpRequest) -> Result<Caller, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("application state not configured".into()))?;
    let tokens = &state.config.api_tokens;
    if tokens.is_empty() {
        return Ok(Caller { user: ANONYMOUS.to_string() });
    }
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    let token = header.strip_prefix("Bearer ").map(str::trim).ok_or(AppError::Unauthorized)?;
    tokens
        .get(token)
        .map(|user| Caller { user: user.clone() })
        .ok_or(AppError::Unauthorized)
}

/// Ejecuta `f` con una conexión del pool fuera del runtime async.
pub async fn with_conn<T, F>(state: web::Data<AppState>, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Connection) -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || {
        let conn = state.pool.get()?;
        f(&conn)
    })
    .await
    .map_err(|e| AppError::Internal(format!("task join error: {}", e)))?
}

/// `Ok` -> JSON con `status`; `Err` -> `{"error": ...}` con el status del error.
pub fn respond<T: Serialize>(result: Result<T, AppError>, status: StatusCode) -> HttpResponse {
    match result {
        Ok(v) => HttpResponse::build(status).json(v),
        Err(e) => e.to_response(),
    }
}
