use actix_web::http::StatusCode;
use actix_web::{web, Responder};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::api_json::{respond, with_conn, Caller};
use crate::db::dashboard::dashboard_summary;
use crate::error::AppError;
use crate::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    /// `YYYY-MM-DD`; por defecto, hoy (hora local).
    pub today: Option<String>,
}

/// GET /dashboard
pub async fn dashboard_handler(_caller: Caller, state: web::Data<AppState>, query: web::Query<DashboardQuery>) -> impl Responder {
    let today = match query.into_inner().today {
        Some(s) => match NaiveDate::parse_from_str(&s, "%Y-%m-%d") {
            Ok(d) => d,
            Err(_) => return AppError::Validation(format!("invalid today '{}'", s)).to_response(),
        },
        None => chrono::Local::now().date_naive(),
    };
    respond(with_conn(state, move |c| dashboard_summary(c, today)).await, StatusCode::OK)
}
