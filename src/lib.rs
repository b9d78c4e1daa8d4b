pub mod auth;
pub mod clock;
pub mod config;
pub mod cors;
pub mod data;
pub mod date_key;
pub mod error;
pub mod health;
pub mod progress;
pub mod request_logger;
pub mod routine;

use rocket::figment::Figment;
use rocket::{catchers, routes, Build, Rocket};

use auth::SharedVerifier;
use clock::SharedClock;
use cors::Cors;
use data::DBConnection;
use progress::endpoints as progress_endpoints;
use request_logger::RequestLogger;
use routine::endpoints as routine_endpoints;

pub fn build_rocket(
    figment: Figment,
    db_connection: DBConnection,
    verifier: SharedVerifier,
    clock: SharedClock,
) -> Rocket<Build> {
    rocket::custom(figment)
        .manage(db_connection)
        .manage(verifier)
        .manage(clock)
        .attach(Cors)
        .attach(RequestLogger)
        .mount(
            "/progress",
            routes![
                progress_endpoints::get_today,
                progress_endpoints::save_today,
                progress_endpoints::save_final,
                progress_endpoints::get_month,
                progress_endpoints::get_streaks,
            ],
        )
        .mount(
            "/routine",
            routes![
                routine_endpoints::get_templates,
                routine_endpoints::seed_default,
                routine_endpoints::get_public_default,
                routine_endpoints::get_active,
                routine_endpoints::create_custom,
                routine_endpoints::update_template,
                routine_endpoints::activate_template,
                routine_endpoints::delete_template,
            ],
        )
        .mount("/", routes![health::health, cors::preflight])
        .register("/", catchers![error::default_catcher])
}
