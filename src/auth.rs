use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest, Request};
use tracing::{debug, error};

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::UserId;
use crate::error::ApiError;

/// Resolves a presented credential to the user it belongs to.
pub trait CredentialVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Option<UserId>;
}

pub type SharedVerifier = Arc<dyn CredentialVerifier>;

pub struct TokenTableVerifier {
    tokens: HashMap<String, UserId>,
}

impl TokenTableVerifier {
    pub fn new(tokens: HashMap<String, String>) -> TokenTableVerifier {
        TokenTableVerifier {
            tokens: tokens
                .into_iter()
                .filter(|(token, user)| !token.is_empty() && !user.is_empty())
                .map(|(token, user)| (token, UserId::new(user)))
                .collect(),
        }
    }
}

impl CredentialVerifier for TokenTableVerifier {
    fn verify(&self, credential: &str) -> Option<UserId> {
        self.tokens.get(credential).cloned()
    }
}

pub fn bearer_credential(header: &str) -> Option<&str> {
    let credential = header.strip_prefix("Bearer ")?.trim();

    if credential.is_empty() {
        None
    } else {
        Some(credential)
    }
}

pub struct AuthenticatedUser(pub UserId);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ApiError;

    async fn from_request(request: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let verifier = match request.rocket().state::<SharedVerifier>() {
            Some(verifier) => verifier,
            None => {
                error!("no credential verifier is managed");
                return Outcome::Error((
                    Status::InternalServerError,
                    ApiError::Internal(String::from("credential verifier missing")),
                ));
            }
        };

        let user = request
            .headers()
            .get_one("Authorization")
            .and_then(bearer_credential)
            .and_then(|credential| verifier.verify(credential));

        match user {
            Some(user) => Outcome::Success(AuthenticatedUser(user)),
            None => {
                debug!(path = %request.uri().path(), "rejected request without valid credential");
                Outcome::Error((Status::Unauthorized, ApiError::Unauthorized))
            }
        }
    }
}
