use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};

use crate::api_json::{respond, with_conn, Caller};
use crate::db::events;
use crate::models::{DateRange, NewEvent};
use crate::server::AppState;

pub async fn list_events_handler(_caller: Caller, state: web::Data<AppState>, query: web::Query<DateRange>) -> impl Responder {
    let range = query.into_inner();
    respond(with_conn(state, move |c| events::list_events(c, &range)).await, StatusCode::OK)
}

pub async fn create_event_handler(_caller: Caller, state: web::Data<AppState>, body: web::Json<NewEvent>) -> impl Responder {
    let input = body.into_inner();
    respond(with_conn(state, move |c| events::insert_event(c, &input)).await, StatusCode::CREATED)
}

pub async fn update_event_handler(
    _caller: Caller,
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<NewEvent>,
) -> impl Responder {
    let id = path.into_inner();
    let input = body.into_inner();
    respond(with_conn(state, move |c| events::update_event(c, id, &input)).await, StatusCode::OK)
}

pub async fn delete_event_handler(_caller: Caller, state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match with_conn(state, move |c| events::delete_event(c, id)).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => e.to_response(),
    }
}
