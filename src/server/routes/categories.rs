use std::collections::BTreeMap;

use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{
        queries::{categories::get_all_categories, questions::get_questions_by_category_pattern},
        Question,
    },
    server::{
        app::AppState,
        error::ApiError,
        extractors::ApiPath,
        pagination::{Page, PageQuery},
    },
};

use super::ApiResponse;

#[derive(Serialize)]
struct CategoriesResponse {
    success: bool,
    // serde_json writes integer keys as strings
    categories: BTreeMap<i64, String>,
}

#[derive(Serialize)]
struct CategoryQuestionsResponse {
    success: bool,
    questions: Vec<Question>,
    total_questions: usize,
}

async fn get_categories(State(pool): State<SqlitePool>) -> ApiResponse<CategoriesResponse> {
    let categories = get_all_categories(&pool).await?;
    Ok(Json(CategoriesResponse {
        success: true,
        categories: categories.into_iter().map(|c| (c.id, c.kind)).collect(),
    }))
}

// The segment is matched against the stored category id rendered as text, so
// `/categories/1/questions` lists category 1 and a category name finds nothing.
async fn questions_for_category(
    State(pool): State<SqlitePool>,
    ApiPath(category): ApiPath<String>,
    PageQuery { page }: PageQuery,
) -> ApiResponse<CategoryQuestionsResponse> {
    let questions = get_questions_by_category_pattern(&pool, &category).await?;
    if questions.is_empty() {
        tracing::info!("No questions for category {category:?}");
        return Err(ApiError::NotFound);
    }
    let page = Page::of(questions, page);
    Ok(Json(CategoryQuestionsResponse {
        success: true,
        questions: page.items,
        total_questions: page.total,
    }))
}

pub fn category_router(state: AppState) -> Router {
    Router::new()
        .route("/categories", get(get_categories))
        .route(
            "/categories/{category}/questions",
            get(questions_for_category),
        )
        .with_state(state)
}
