use actix_web::{HttpResponse, get};

pub mod cron;

#[get("/health_check")]
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().finish()
}
