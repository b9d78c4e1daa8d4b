use rocket::get;
use rocket::serde::json::Json;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[get("/health")]
pub fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        message: "Backend server is running",
    })
}
