use crate::catalog::Catalog;
use crate::error::AppError;
use crate::movie::MovieRecord;
use crate::tg::{self, TelegramNotifier, Update};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Catalog,
    pub notifier: TelegramNotifier,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/all", get(all_movies))
        .route("/telegram", post(telegram_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home() -> &'static str {
    "Welcome to the Homepage!"
}

async fn all_movies(State(state): State<AppState>) -> Result<Json<Vec<MovieRecord>>, AppError> {
    let movies = state.catalog.all().await?;
    tracing::info!(count = movies.len(), "serving movie list");
    Ok(Json(movies))
}

/// Telegram ждёт только 2xx; что бы ни случилось внутри, отвечаем 204.
async fn telegram_webhook(State(state): State<AppState>, body: Bytes) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(u) => u,
        Err(err) => {
            tracing::warn!(error = %err, "could not decode webhook payload");
            return StatusCode::NO_CONTENT;
        }
    };
    tracing::debug!(?update, "webhook update");

    if tg::wants_movie(update.text()) {
        reply_with_random_movie(&state, &update).await;
    }
    StatusCode::NO_CONTENT
}

async fn reply_with_random_movie(state: &AppState, update: &Update) {
    let Some(chat_id) = update.chat_id() else {
        tracing::warn!(update_id = update.update_id, "message without chat, nowhere to reply");
        return;
    };

    let movie = match state.catalog.random().await {
        Ok(Some(m)) => m,
        Ok(None) => {
            tracing::info!(chat_id = chat_id.0, "no submissions to pick from");
            return;
        }
        Err(err) => {
            tracing::error!(chat_id = chat_id.0, error = %err, "could not pick a movie");
            return;
        }
    };

    match state.notifier.send_movie(chat_id, &movie).await {
        Ok(()) => tracing::info!(chat_id = chat_id.0, title = %movie.title, "reply sent"),
        Err(err) => tracing::error!(chat_id = chat_id.0, error = %err, "error in sending reply"),
    }
}
