use axum::{
    extract::State,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_aux::field_attributes::deserialize_option_number_from_string;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{
            categories::get_all_categories,
            questions::{self, get_all_questions, get_question_by_id, search_questions},
        },
        Category, Question,
    },
    server::{
        app::AppState,
        error::ApiError,
        extractors::{ApiJson, ApiPath},
        pagination::{Page, PageQuery},
    },
    telemetry::{QUESTIONS_CREATED, QUESTIONS_DELETED},
};

use super::ApiResponse;

#[derive(Deserialize)]
struct NewQuestion {
    question: String,
    answer: String,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    category: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_option_number_from_string")]
    difficulty: Option<i64>,
}

#[derive(Deserialize)]
struct SearchBody {
    #[serde(rename = "searchTerm")]
    search_term: String,
}

#[derive(Serialize)]
struct QuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
    current_category: Option<i64>,
    categories: Vec<Category>,
}

#[derive(Serialize)]
struct CreatedResponse {
    success: bool,
    created: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct DeletedResponse {
    success: bool,
    deleted: i64,
    questions: Vec<Question>,
    total_questions: usize,
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

async fn list_questions(
    State(pool): State<SqlitePool>,
    PageQuery { page }: PageQuery,
) -> ApiResponse<QuestionsResponse> {
    let page = Page::of(get_all_questions(&pool).await?, page);
    let categories = get_all_categories(&pool).await?;
    Ok(Json(QuestionsResponse {
        success: true,
        questions: page.items,
        total_questions: page.total,
        current_category: None,
        categories,
    }))
}

async fn create_question(
    State(pool): State<SqlitePool>,
    PageQuery { page }: PageQuery,
    ApiJson(new_question): ApiJson<NewQuestion>,
) -> ApiResponse<CreatedResponse> {
    let id = questions::create_question(
        &pool,
        &new_question.question,
        &new_question.answer,
        new_question.category,
        new_question.difficulty,
    )
    .await?;
    QUESTIONS_CREATED.inc();
    tracing::info!(id, "Question created");

    let page = Page::of(get_all_questions(&pool).await?, page);
    Ok(Json(CreatedResponse {
        success: true,
        created: id,
        questions: page.items,
        total_questions: page.total,
    }))
}

async fn delete_question(
    State(pool): State<SqlitePool>,
    ApiPath(id): ApiPath<i64>,
    PageQuery { page }: PageQuery,
) -> ApiResponse<DeletedResponse> {
    if get_question_by_id(&pool, id).await?.is_none() {
        tracing::info!(id, "No question to delete");
        return Err(ApiError::NotFound);
    }
    questions::delete_question(&pool, id).await?;
    QUESTIONS_DELETED.inc();
    tracing::info!(id, "Question deleted");

    let page = Page::of(get_all_questions(&pool).await?, page);
    Ok(Json(DeletedResponse {
        success: true,
        deleted: id,
        questions: page.items,
        total_questions: page.total,
    }))
}

async fn search(
    State(pool): State<SqlitePool>,
    PageQuery { page }: PageQuery,
    ApiJson(body): ApiJson<SearchBody>,
) -> ApiResponse<SearchResponse> {
    let found = search_questions(&pool, &body.search_term).await?;
    if found.is_empty() {
        tracing::info!("Nothing matches {:?}", body.search_term);
        return Err(ApiError::NotFound);
    }
    let page = Page::of(found, page);
    Ok(Json(SearchResponse {
        success: true,
        questions: page.items,
        total_questions: page.total,
    }))
}

pub fn questions_router(state: AppState) -> Router {
    Router::new()
        .route("/questions", get(list_questions).post(create_question))
        .route("/questions/search", post(search))
        .route("/questions/{id}", delete(delete_question))
        .with_state(state)
}
