//! CRUD de configuración: cursos, turmas y UCs.

use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use tracing::info;

use crate::api_json::{respond, with_conn, Caller};
use crate::db::catalog;
use crate::models::{NewCourse, NewTurma, NewUc};
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CourseQuery {
    pub course_id: Option<i64>,
}

// --- cursos ---

pub async fn list_courses_handler(_caller: Caller, state: web::Data<AppState>) -> impl Responder {
    respond(with_conn(state, catalog::list_courses).await, StatusCode::OK)
}

pub async fn create_course_handler(caller: Caller, state: web::Data<AppState>, body: web::Json<NewCourse>) -> impl Responder {
    let input = body.into_inner();
    let res = with_conn(state, move |c| catalog::insert_course(c, &input)).await;
    if let Ok(course) = &res {
        info!(user = %caller.user, course_id = course.id, acronym = %course.acronym, "curso creado");
    }
    respond(res, StatusCode::CREATED)
}

pub async fn update_course_handler(
    _caller: Caller,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewCourse>,
) -> impl Responder {
    let id = path.into_inner();
    let input = body.into_inner();
    respond(with_conn(state, move |c| catalog::update_course(c, id, &input)).await, StatusCode::OK)
}

pub async fn delete_course_handler(caller: Caller, state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match with_conn(state, move |c| catalog::delete_course(c, id)).await {
        Ok(()) => {
            info!(user = %caller.user, course_id = id, "curso eliminado");
            HttpResponse::NoContent().finish()
        }
        Err(e) => e.to_response(),
    }
}

// --- turmas ---

pub async fn list_classes_handler(_caller: Caller, state: web::Data<AppState>, query: web::Query<CourseQuery>) -> impl Responder {
    let course_id = query.into_inner().course_id;
    respond(with_conn(state, move |c| catalog::list_turmas(c, course_id)).await, StatusCode::OK)
}

pub async fn create_class_handler(caller: Caller, state: web::Data<AppState>, body: web::Json<NewTurma>) -> impl Responder {
    let input = body.into_inner();
    let res = with_conn(state, move |c| catalog::insert_turma(c, &input)).await;
    if let Ok(t) = &res {
        info!(user = %caller.user, turma_id = t.id, turma = %t.name, "turma creada");
    }
    respond(res, StatusCode::CREATED)
}

pub async fn update_class_handler(
    _caller: Caller,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewTurma>,
) -> impl Responder {
    let id = path.into_inner();
    let input = body.into_inner();
    respond(with_conn(state, move |c| catalog::update_turma(c, id, &input)).await, StatusCode::OK)
}

pub async fn delete_class_handler(_caller: Caller, state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match with_conn(state, move |c| catalog::delete_turma(c, id)).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_response(),
    }
}

// --- UCs ---

pub async fn list_ucs_handler(_caller: Caller, state: web::Data<AppState>, query: web::Query<CourseQuery>) -> impl Responder {
    let course_id = query.into_inner().course_id;
    respond(with_conn(state, move |c| catalog::list_ucs(c, course_id)).await, StatusCode::OK)
}

pub async fn create_uc_handler(_caller: Caller, state: web::Data<AppState>, body: web::Json<NewUc>) -> impl Responder {
    let input = body.into_inner();
    respond(with_conn(state, move |c| catalog::insert_uc(c, &input)).await, StatusCode::CREATED)
}

pub async fn update_uc_handler(
    _caller: Caller,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewUc>,
) -> impl Responder {
    let id = path.into_inner();
    let input = body.into_inner();
    respond(with_conn(state, move |c| catalog::update_uc(c, id, &input)).await, StatusCode::OK)
}

pub async fn delete_uc_handler(_caller: Caller, state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match with_conn(state, move |c| catalog::delete_uc(c, id)).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_response(),
    }
}
