//! HTTP request handlers.

use super::templates;
use super::AppState;
use crate::error::PriceError;
use crate::observability::record_prediction_error;
use crate::predict::PriceForm;
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use tracing::{error, info, warn};

fn plain(status: u16, message: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, message).into_response()
}

/// `GET /`
pub async fn index() -> Html<String> {
    Html(templates::index())
}

/// Decode the submitted form.
///
/// A body without a form content type is read as an empty form, so it gets
/// the usual missing-field message. Any other undecodable body is a 400.
fn decode_form(body: Result<Form<PriceForm>, FormRejection>) -> Result<PriceForm, Response> {
    match body {
        Ok(Form(form)) => Ok(form),
        Err(FormRejection::InvalidFormContentType(_)) => Ok(PriceForm::default()),
        Err(rejection) => {
            let e = PriceError::Validation("Error: Invalid form submission".into());
            warn!(error = %rejection.body_text(), "Rejected form body");
            record_prediction_error(&e);
            Err(plain(e.status_code(), e.to_string()))
        }
    }
}

/// `POST /submit`
pub async fn submit(
    State(state): State<AppState>,
    body: Result<Form<PriceForm>, FormRejection>,
) -> Response {
    info!("Submit route called");

    let form = match decode_form(body) {
        Ok(form) => form,
        Err(response) => return response,
    };

    let query = match form.validate() {
        Ok(query) => query,
        Err(e) => {
            warn!(error = %e, "Rejected form input");
            record_prediction_error(&e);
            return plain(e.status_code(), e.to_string());
        }
    };

    let bundle = match state.loader.load().await {
        Ok(bundle) => bundle,
        Err(e) => {
            error!(error = %e, "Error in submit route");
            record_prediction_error(&e);
            return plain(500, format!("Error processing request: {}", e));
        }
    };

    match state.predictor.predict(&bundle, &query) {
        Ok(prediction) => {
            info!(price = prediction.price, "Prediction");
            Html(templates::output(&query, &prediction)).into_response()
        }
        Err(e) if e.is_client_error() => {
            warn!(error = %e, "Rejected prediction input");
            record_prediction_error(&e);
            plain(e.status_code(), e.to_string())
        }
        Err(e) => {
            error!(error = %e, "Error in submit route");
            record_prediction_error(&e);
            plain(500, format!("Error processing request: {}", e))
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Response {
    let response = state.health.check(&state.loader).await;
    let status = StatusCode::from_u16(response.status.to_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response)).into_response()
}

/// `GET /metrics`
pub async fn metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => not_found().await.into_response(),
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Page not found")
}
