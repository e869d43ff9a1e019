use actix_web::{HttpRequest, HttpResponse, Responder};

/// Liveness probe, answers 200 with an empty body
#[tracing::instrument(name = "Health check handler", skip(_req))]
pub async fn health_check(_req: HttpRequest) -> impl Responder {
    HttpResponse::Ok().finish()
}
