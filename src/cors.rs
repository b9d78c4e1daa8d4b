use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{options, Request, Response};

pub const ALLOWED_METHODS: &str = "GET, HEAD, PUT, PATCH, POST, DELETE";
pub const ALLOWED_HEADERS: &str = "Authorization, Content-Type";

/// Lets the browser front end on another origin call every route.
pub struct Cors;

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS headers",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, _request: &'r Request<'_>, response: &mut Response<'r>) {
        response.set_header(Header::new("Access-Control-Allow-Origin", "*"));
        response.set_header(Header::new("Access-Control-Allow-Methods", ALLOWED_METHODS));
        response.set_header(Header::new("Access-Control-Allow-Headers", ALLOWED_HEADERS));
    }
}

#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
