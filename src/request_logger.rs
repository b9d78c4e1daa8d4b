use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Request, Response};
use tracing::info;

pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request logger",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        info!(
            method = %request.method(),
            path = %request.uri().path(),
            status = response.status().code,
            "request handled"
        );
    }
}
