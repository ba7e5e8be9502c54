use actix_web::{web, Either, HttpResponse, HttpRequest};
use actix_web::http::header::AUTHORIZATION;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::{info, warn};

use crate::auth::{AuthRequest, AuthStrategy, IdentityView, Outcome};
use crate::error::{AppError, AuthError};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: IdentityView,
}

fn log_outcome(route: &str, outcome: &Outcome) {
    match outcome {
        Outcome::Success(view) => info!(route, id = view.id().unwrap_or_default(), "Authenticated"),
        Outcome::Failure(reason) => info!(route, %reason, "Authentication rejected"),
        Outcome::Error(e) => warn!(route, error = %e, "Authentication failed"),
    }
}

type LoginBody = Either<web::Json<Value>, web::Form<HashMap<String, String>>>;

fn login_body(body: LoginBody) -> Value {
    match body {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => Value::Object(
            form.into_inner()
                .into_iter()
                .map(|(key, value)| (key, Value::String(value)))
                .collect::<Map<String, Value>>(),
        ),
    }
}

/// `POST /auth/login` with `email` and `password` as a JSON or
/// form-urlencoded body.
pub async fn login(
    body: Option<LoginBody>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let body = body.map(login_body);
    let request = AuthRequest {
        authorization: None,
        body: body.as_ref(),
    };

    let outcome = state.auth.password().authenticate_request(&request).await;
    log_outcome("login", &outcome);
    let user = outcome.into_result()?;

    let subject = user
        .id()
        .ok_or_else(|| AppError::InternalError("projected identity has no id".into()))?;
    let token = state.auth.tokens().issue(subject)?;

    Ok(HttpResponse::Ok().json(AuthResponse { token, user }))
}

/// `GET /auth/me`, guarded by the bearer-token strategy.
pub async fn me(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let authorization = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(
            value
                .to_str()
                .map_err(|_| AppError::AuthError(AuthError::MissingToken))?,
        ),
        None => None,
    };

    let outcome = state
        .auth
        .bearer()
        .authenticate_request(&AuthRequest { authorization, body: None })
        .await;
    log_outcome("me", &outcome);

    Ok(HttpResponse::Ok().json(outcome.into_result()?))
}
