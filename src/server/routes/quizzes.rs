use axum::{extract::State, routing::post, Json, Router};
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::questions::{get_quiz_candidates, CategoryFilter},
        Question,
    },
    server::{app::AppState, deserializers::LooseId, error::ApiError, extractors::ApiJson},
    telemetry::QUIZ_DRAWS,
};

use super::ApiResponse;

/// Id 0 stands for "all categories".
const ALL_CATEGORIES: i64 = 0;

#[derive(Deserialize)]
struct QuizCategory {
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    id: Option<i64>,
}

#[derive(Deserialize)]
struct QuizRequest {
    #[serde(default)]
    previous_questions: Vec<LooseId>,
    quiz_category: Option<QuizCategory>,
}

#[derive(Serialize)]
struct QuizResponse {
    success: bool,
    question: Option<Question>,
}

// Quiz sessions live on the client: it resends every id it has already been
// given, and a `null` question means the quiz is over.
async fn next_question(
    State(pool): State<SqlitePool>,
    ApiJson(request): ApiJson<QuizRequest>,
) -> ApiResponse<QuizResponse> {
    let category = request
        .quiz_category
        .ok_or_else(|| ApiError::BadRequest("quiz_category is required".to_owned()))?;
    let previous: Vec<i64> = request.previous_questions.into_iter().map(|id| id.0).collect();

    // a category object without an id draws from uncategorised questions
    let filter = match category.id {
        Some(ALL_CATEGORIES) => CategoryFilter::Any,
        Some(id) => CategoryFilter::Category(id),
        None => CategoryFilter::Uncategorised,
    };
    let candidates = get_quiz_candidates(&pool, &previous, filter).await?;
    let question = candidates.choose(&mut rand::thread_rng()).cloned();

    let outcome = if question.is_some() { "question" } else { "exhausted" };
    QUIZ_DRAWS.with_label_values(&[outcome]).inc();
    tracing::debug!(
        ?filter,
        candidates = candidates.len(),
        outcome,
        "Quiz draw"
    );

    Ok(Json(QuizResponse {
        success: true,
        question,
    }))
}

pub fn quizzes_router(state: AppState) -> Router {
    Router::new()
        .route("/quizzes", post(next_question))
        .with_state(state)
}
