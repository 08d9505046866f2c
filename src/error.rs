use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Ошибка обращения к внешнему API (JotForm, OMDb).
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("{service}: request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service}: unexpected status {status} -> {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{service}: could not decode response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl UpstreamError {
    pub(crate) fn transport(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self::Transport { service, source }
    }

    pub(crate) fn decode(service: &'static str) -> impl FnOnce(serde_json::Error) -> Self {
        move |source| Self::Decode { service, source }
    }
}

/// GET + проверка статуса + разбор JSON. Тело читаем целиком, чтобы при ошибке
/// разбора или статуса отдать его в сообщении.
pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
    http: &reqwest::Client,
    service: &'static str,
    url: &str,
) -> Result<T, UpstreamError> {
    let resp = http.get(url).send().await.map_err(UpstreamError::transport(service))?;
    let status = resp.status();
    let body = resp.text().await.map_err(UpstreamError::transport(service))?;
    if !status.is_success() {
        return Err(UpstreamError::Status { service, status, body });
    }
    serde_json::from_str(&body).map_err(UpstreamError::decode(service))
}

/// Ошибка HTTP-обработчика.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
        };
        tracing::error!(error = %self, "request failed");
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
