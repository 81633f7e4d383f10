use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use crate::error::AppError;

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_DB_PATH: &str = "data/calendario.db";
const DEFAULT_UPLOAD_DIR: &str = "data/uploads";

/// Configuración del servidor, leída de variables de entorno (y `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub db_path: PathBuf,
    pub pool_size: usize,
    /// Cota de espera por bloqueo de cada slot (SQLite busy_timeout).
    pub slot_timeout_ms: u64,
    pub upload_dir: PathBuf,
    /// Hoja a leer dentro del workbook; `None` = primera hoja.
    pub sheet: Option<String>,
    /// token -> usuario. Vacío = servidor abierto.
    pub api_tokens: HashMap<String, String>,
    pub cors_origin: Option<String>,
    pub log_level: tracing::Level,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind: DEFAULT_BIND.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            pool_size: 4,
            slot_timeout_ms: 5000,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            sheet: None,
            api_tokens: HashMap::new(),
            cors_origin: None,
            log_level: tracing::Level::INFO,
        }
    }
}

impl AppConfig {
    /// Carga `.env` si existe y luego lee `CALENDARIO_*` del entorno.
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenv::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Igual que `from_env` pero con una función de búsqueda inyectada (tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = AppConfig::default();

        if let Some(bind) = get("CALENDARIO_BIND") {
            cfg.bind = bind;
        }
        if let Some(p) = get("CALENDARIO_DB_PATH") {
            cfg.db_path = db_path_from_url(&p);
        }
        if let Some(n) = get("CALENDARIO_DB_POOL_SIZE") {
            cfg.pool_size = parse_number("CALENDARIO_DB_POOL_SIZE", &n)?;
            if cfg.pool_size == 0 {
                return Err(AppError::Config("CALENDARIO_DB_POOL_SIZE must be at least 1".into()));
            }
        }
        if let Some(n) = get("CALENDARIO_SLOT_TIMEOUT_MS") {
            cfg.slot_timeout_ms = parse_number("CALENDARIO_SLOT_TIMEOUT_MS", &n)?;
        }
        if let Some(d) = get("CALENDARIO_UPLOAD_DIR") {
            cfg.upload_dir = PathBuf::from(d);
        }
        cfg.sheet = get("CALENDARIO_SHEET");
        cfg.cors_origin = get("CALENDARIO_CORS_ORIGIN");
        if let Some(tokens) = get("CALENDARIO_API_TOKENS") {
            cfg.api_tokens = parse_tokens(&tokens)?;
        }
        if let Some(level) = get("CALENDARIO_LOG") {
            cfg.log_level = level
                .parse::<tracing::Level>()
                .map_err(|_| AppError::Config(format!("CALENDARIO_LOG has invalid level '{}'", level)))?;
        }
        Ok(cfg)
    }
}

// Acepta sqlite:// y file:// además de rutas planas.
fn db_path_from_url(raw: &str) -> PathBuf {
    if let Some(rest) = raw.strip_prefix("sqlite://") {
        PathBuf::from(rest)
    } else if let Some(rest) = raw.strip_prefix("file://") {
        PathBuf::from(rest)
    } else {
        PathBuf::from(raw)
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value
        .parse::<T>()
        .map_err(|_| AppError::Config(format!("{} must be a number, got '{}'", key, value)))
}

/// `user:token,user2:token2` -> {token: user}
fn parse_tokens(raw: &str) -> Result<HashMap<String, String>, AppError> {
    let mut out = HashMap::new();
    for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match pair.split_once(':') {
            Some((user, token)) if !user.trim().is_empty() && !token.trim().is_empty() => {
                out.insert(token.trim().to_string(), user.trim().to_string());
            }
            _ => {
                return Err(AppError::Config(format!(
                    "CALENDARIO_API_TOKENS entry '{}' is not in user:token form",
                    pair
                )))
            }
        }
    }
    Ok(out)
}
