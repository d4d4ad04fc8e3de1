use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::response::{ok, AppError};
use crate::services::session::{InitRequest, ProfileUpdate};
use crate::services::vocabulary::VocabEntry;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/status", get(status))
        .route("/profile", put(update_profile))
        .route("/init", post(init_cycle))
        .route("/replace-known", post(replace_known))
        .route("/select-batch", post(select_batch))
        .route("/quiz/current", get(current_word))
        .route("/quiz/answer", post(submit_answer))
        .route("/advance-day", post(advance_day))
        .route("/learned", get(learned_words))
        .route("/words/:word", get(lookup_word))
        .route("/search", get(search_words))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplaceKnownBody {
    batch_id: Uuid,
    #[serde(alias = "remove")]
    words: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectBatchBody {
    batch_index: usize,
}

#[derive(Debug, Deserialize)]
struct AnswerBody {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
struct SearchResultsDto {
    query: String,
    count: usize,
    results: Vec<VocabEntry>,
}

#[derive(Debug, Serialize)]
struct LearnedWordsDto {
    count: usize,
    words: Vec<String>,
}

async fn status(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let report = state.service().status(&user.id).await?;
    Ok(ok(report))
}

async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ProfileUpdate>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state.service().update_profile(&user.id, body).await?;
    Ok(ok(profile))
}

async fn init_cycle(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<InitRequest>,
) -> Result<impl IntoResponse, AppError> {
    let cycle = state.service().init_cycle(&user.id, body).await?;
    Ok(ok(cycle))
}

async fn replace_known(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<ReplaceKnownBody>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state
        .service()
        .replace_known(&user.id, body.batch_id, body.words)
        .await?;
    Ok(ok(outcome))
}

async fn select_batch(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<SelectBatchBody>,
) -> Result<impl IntoResponse, AppError> {
    let word = state
        .service()
        .select_batch(&user.id, body.batch_index)
        .await?;
    Ok(ok(word))
}

async fn current_word(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let word = state.service().current_word(&user.id).await?;
    Ok(ok(word))
}

async fn submit_answer(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<AnswerBody>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.service().submit_answer(&user.id, &body.answer).await?;
    Ok(ok(outcome))
}

async fn advance_day(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.service().advance_day(&user.id).await?;
    Ok(ok(outcome))
}

async fn learned_words(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl IntoResponse, AppError> {
    let words = state.service().learned_words(&user.id).await?;
    Ok(ok(LearnedWordsDto {
        count: words.len(),
        words,
    }))
}

async fn lookup_word(
    State(state): State<AppState>,
    Path(word): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let entry = state.service().lookup(&word)?;
    Ok(ok(entry))
}

async fn search_words(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<impl IntoResponse, AppError> {
    let results = state.service().search(&params.q)?;
    Ok(ok(SearchResultsDto {
        query: params.q.trim().to_string(),
        count: results.len(),
        results,
    }))
}
