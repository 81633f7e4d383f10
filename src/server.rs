use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Responder};
use serde_json::json;
use tokio::sync::Semaphore;
use tracing::info;

use crate::api_json::handlers::*;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::AppError;

/// Estado compartido por todos los workers de actix.
pub struct AppState {
    pub pool: DbPool,
    pub config: AppConfig,
    /// Un único permiso: las importaciones se ejecutan de a una.
    pub import_permit: Arc<Semaphore>,
}

impl AppState {
    /// Abre (y crea si hace falta) la base configurada.
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let pool = DbPool::open(&config.db_path, config.pool_size, config.slot_timeout_ms)?;
        Ok(AppState {
            pool,
            config,
            import_permit: Arc::new(Semaphore::new(1)),
        })
    }
}

async fn health_handler() -> impl Responder {
    HttpResponse::Ok().json(json!({"status": "ok"}))
}

/// Registra todas las rutas. Se usa tanto en `run_server` como en los tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_handler))
        .route("/import/agenda", web::post().to(import_agenda_handler))
        .route("/courses", web::get().to(list_courses_handler))
        .route("/courses", web::post().to(create_course_handler))
        .route("/courses/{id}", web::put().to(update_course_handler))
        .route("/courses/{id}", web::delete().to(delete_course_handler))
        .route("/classes", web::get().to(list_classes_handler))
        .route("/classes", web::post().to(create_class_handler))
        .route("/classes/{id}", web::put().to(update_class_handler))
        .route("/classes/{id}", web::delete().to(delete_class_handler))
        .route("/ucs", web::get().to(list_ucs_handler))
        .route("/ucs", web::post().to(create_uc_handler))
        .route("/ucs/{id}", web::put().to(update_uc_handler))
        .route("/ucs/{id}", web::delete().to(delete_uc_handler))
        .route("/lessons", web::get().to(list_lessons_handler))
        .route("/lessons", web::post().to(create_lesson_handler))
        .route("/lessons/{id}", web::get().to(get_lesson_handler))
        .route("/lessons/{id}", web::put().to(update_lesson_handler))
        .route("/lessons/{id}", web::delete().to(delete_lesson_handler))
        .route("/events", web::get().to(list_events_handler))
        .route("/events", web::post().to(create_event_handler))
        .route("/events/{id}", web::put().to(update_event_handler))
        .route("/events/{id}", web::delete().to(delete_event_handler))
        .route("/dashboard", web::get().to(dashboard_handler));
}

fn cors_for(origin: Option<&str>) -> Cors {
    match origin {
        Some("*") => Cors::permissive(),
        Some(o) => Cors::default()
            .allowed_origin(o)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600),
        None => Cors::default(),
    }
}

pub async fn run_server(config: AppConfig) -> std::io::Result<()> {
    let bind_addr = config.bind.clone();
    let state = AppState::new(config).map_err(|e| std::io::Error::other(e.to_string()))?;
    let state = web::Data::new(state);
    info!(bind = %bind_addr, db = %state.pool.path().display(), "servidor iniciado");

    HttpServer::new(move || {
        App::new()
            .wrap(cors_for(state.config.cors_origin.as_deref()))
            .app_data(state.clone())
            .configure(configure)
    })
    .bind(bind_addr)?
    .run()
    .await
}
