use crate::publish_job::PublishJob;
use crate::utils::e500;
use actix_web::http::header::ContentType;
use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

#[derive(Serialize, Deserialize, Debug)]
pub struct PublishRunResponse {
    pub message: String,
    pub total: usize,
}

#[get("/cron")]
#[tracing::instrument(name = "Manually triggering a publish run", skip_all)]
pub async fn get(job: web::Data<PublishJob<PgPool>>) -> Result<HttpResponse, actix_web::Error> {
    let report = job.run().await.map_err(e500)?;
    let total = report.total();

    Ok(HttpResponse::Ok()
        .content_type(ContentType::json())
        .json(PublishRunResponse {
            message: format!("{} messages processed.", total),
            total,
        }))
}
