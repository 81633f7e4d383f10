use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use tracing::info;

use crate::api_json::{respond, with_conn, Caller};
use crate::db::lessons;
use crate::models::{LessonFilter, NewLesson};
use crate::server::AppState;

/// GET /lessons?from=2026-03-01&to=2026-03-31&turma=TI27&course_id=1&period=Tarde
pub async fn list_lessons_handler(_caller: Caller, state: web::Data<AppState>, query: web::Query<LessonFilter>) -> impl Responder {
    let filter = query.into_inner();
    respond(with_conn(state, move |c| lessons::list_lessons(c, &filter)).await, StatusCode::OK)
}

pub async fn get_lesson_handler(_caller: Caller, state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    respond(with_conn(state, move |c| lessons::get_lesson(c, id)).await, StatusCode::OK)
}

pub async fn create_lesson_handler(caller: Caller, state: web::Data<AppState>, body: web::Json<NewLesson>) -> impl Responder {
    let input = body.into_inner();
    let res = with_conn(state, move |c| lessons::insert_lesson(c, &input)).await;
    if let Ok(l) = &res {
        info!(user = %caller.user, lesson_id = l.id, date = %l.date, period = %l.period, turma = %l.turma, "aula creada");
    }
    respond(res, StatusCode::CREATED)
}

pub async fn update_lesson_handler(
    _caller: Caller,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewLesson>,
) -> impl Responder {
    let id = path.into_inner();
    let input = body.into_inner();
    respond(with_conn(state, move |c| lessons::update_lesson(c, id, &input)).await, StatusCode::OK)
}

pub async fn delete_lesson_handler(caller: Caller, state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match with_conn(state, move |c| lessons::delete_lesson(c, id)).await {
        Ok(()) => {
            info!(user = %caller.user, lesson_id = id, "aula eliminada");
            HttpResponse::NoContent().finish()
        }
        Err(e) => e.to_response(),
    }
}
