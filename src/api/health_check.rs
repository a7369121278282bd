use actix_web::{HttpResponse, Responder, get};

#[utoipa::path(
    get,
    path = "/health-check",
    responses(
        (status = 200, description = "Service is up", body = String)
    )
)]
#[get("/health-check")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

#[cfg(test)]
mod tests {
    use actix_web::{App, test};

    #[actix_web::test]
    async fn health_check_responds_ok() {
        let app = test::init_service(App::new().service(crate::api::health_check)).await;
        let req = test::TestRequest::get().uri("/health-check").to_request();
        let res = test::call_service(&app, req).await;

        assert!(res.status().is_success());
    }
}
