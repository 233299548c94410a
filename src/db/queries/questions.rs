use serde::{Deserialize, Serialize};
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: Option<i64>,
    pub difficulty: Option<i64>,
}

const SELECT_QUESTIONS: &str = "SELECT id, question, answer, category, difficulty FROM questions";

pub async fn get_all_questions(pool: &SqlitePool) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!("{SELECT_QUESTIONS} ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub async fn get_question_by_id(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Question>> {
    sqlx::query_as::<_, Question>(&format!("{SELECT_QUESTIONS} WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn create_question(
    pool: &SqlitePool,
    question: &str,
    answer: &str,
    category: Option<i64>,
    difficulty: Option<i64>,
) -> sqlx::Result<i64> {
    let id = sqlx::query(
        r#"
INSERT INTO questions (question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(question)
    .bind(answer)
    .bind(category)
    .bind(difficulty)
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn delete_question(pool: &SqlitePool, id: i64) -> sqlx::Result<()> {
    sqlx::query(
        r#"
DELETE FROM questions WHERE questions.id = ?1
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Case-insensitive substring match on the question text. SQLite's `LIKE`
/// only folds ASCII, so the comparison runs here on lowercased text and the
/// term is taken literally.
pub async fn search_questions(pool: &SqlitePool, term: &str) -> sqlx::Result<Vec<Question>> {
    let term = term.to_lowercase();
    Ok(get_all_questions(pool)
        .await?
        .into_iter()
        .filter(|q| q.question.to_lowercase().contains(&term))
        .collect())
}

/// Matches `pattern` against the textual form of the category column, so
/// `"3"` selects category 3 while a category name selects nothing.
pub async fn get_questions_by_category_pattern(
    pool: &SqlitePool,
    pattern: &str,
) -> sqlx::Result<Vec<Question>> {
    sqlx::query_as::<_, Question>(&format!(
        "{SELECT_QUESTIONS} WHERE CAST(category AS TEXT) LIKE ?1 ORDER BY id"
    ))
    .bind(pattern)
    .fetch_all(pool)
    .await
}

/// Which categories a quiz draws from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CategoryFilter {
    Any,
    Uncategorised,
    Category(i64),
}

/// Questions not listed in `previous` that pass `filter`.
pub async fn get_quiz_candidates(
    pool: &SqlitePool,
    previous: &[i64],
    filter: CategoryFilter,
) -> sqlx::Result<Vec<Question>> {
    let mut query = QueryBuilder::<Sqlite>::new(SELECT_QUESTIONS);
    query.push(" WHERE 1 = 1");
    if !previous.is_empty() {
        query.push(" AND id NOT IN (");
        let mut ids = query.separated(", ");
        for id in previous {
            ids.push_bind(*id);
        }
        ids.push_unseparated(")");
    }
    match filter {
        CategoryFilter::Any => {}
        CategoryFilter::Uncategorised => {
            query.push(" AND category IS NULL");
        }
        CategoryFilter::Category(category) => {
            query.push(" AND category = ").push_bind(category);
        }
    }
    query.push(" ORDER BY id");

    query.build_query_as::<Question>().fetch_all(pool).await
}

/// Inserts questions keeping their ids, all or nothing.
pub async fn import_questions(pool: &SqlitePool, questions: Vec<Question>) -> sqlx::Result<()> {
    let mut tx = pool.begin().await?;
    for question in questions {
        sqlx::query(
            r#"
INSERT INTO questions (id, question, answer, category, difficulty) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(question.id)
        .bind(question.question)
        .bind(question.answer)
        .bind(question.category)
        .bind(question.difficulty)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_in_memory, run_migrations};

    async fn pool() -> SqlitePool {
        let pool = establish_in_memory().await.unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    async fn seed(pool: &SqlitePool) -> Vec<i64> {
        let mut ids = Vec::new();
        for (question, answer, category) in [
            ("What is the boiling point of water?", "100C", Some(1)),
            ("Who painted the Mona Lisa?", "Leonardo", Some(2)),
            ("What is the chemical symbol for gold?", "Au", Some(1)),
            ("Which WATER body is largest?", "Pacific", None),
        ] {
            ids.push(
                create_question(pool, question, answer, category, Some(2))
                    .await
                    .unwrap(),
            );
        }
        ids
    }

    #[tokio::test]
    async fn create_then_fetch_by_id() {
        let pool = pool().await;
        let id = create_question(&pool, "Q", "A", Some(3), None).await.unwrap();

        let question = get_question_by_id(&pool, id).await.unwrap().unwrap();
        assert_eq!(
            question,
            Question {
                id,
                question: "Q".to_owned(),
                answer: "A".to_owned(),
                category: Some(3),
                difficulty: None,
            }
        );
        assert!(get_question_by_id(&pool, id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let pool = pool().await;
        let ids = seed(&pool).await;
        delete_question(&pool, ids[1]).await.unwrap();

        let remaining: Vec<i64> = get_all_questions(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(remaining, vec![ids[0], ids[2], ids[3]]);
    }

    #[tokio::test]
    async fn search_ignores_case() {
        let pool = pool().await;
        let ids = seed(&pool).await;

        let found: Vec<i64> = search_questions(&pool, "water")
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(found, vec![ids[0], ids[3]]);
        assert!(search_questions(&pool, "zebra").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_folds_non_ascii_case() {
        let pool = pool().await;
        let id = create_question(&pool, "Quelle est la capitale de l'ÉTAT?", "Paris", None, None)
            .await
            .unwrap();
        create_question(&pool, "Wie lang ist die Straße?", "Kurz", None, None)
            .await
            .unwrap();

        let found: Vec<i64> = search_questions(&pool, "état")
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(found, vec![id]);
        assert_eq!(search_questions(&pool, "STRASSE").await.unwrap().len(), 0);
        assert_eq!(search_questions(&pool, "STRAßE").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_takes_wildcards_literally() {
        let pool = pool().await;
        seed(&pool).await;
        assert!(search_questions(&pool, "%").await.unwrap().is_empty());
        assert!(search_questions(&pool, "w_ter").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn category_pattern_compares_against_the_id_text() {
        let pool = pool().await;
        let ids = seed(&pool).await;

        let by_id: Vec<i64> = get_questions_by_category_pattern(&pool, "1")
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(by_id, vec![ids[0], ids[2]]);
        assert!(get_questions_by_category_pattern(&pool, "Science")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn quiz_candidates_skip_previous_questions() {
        let pool = pool().await;
        let ids = seed(&pool).await;

        let all: Vec<i64> = get_quiz_candidates(&pool, &[ids[0], ids[3]], CategoryFilter::Any)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(all, vec![ids[1], ids[2]]);

        let science: Vec<i64> = get_quiz_candidates(&pool, &[ids[0]], CategoryFilter::Category(1))
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(science, vec![ids[2]]);

        assert_eq!(
            get_quiz_candidates(&pool, &[], CategoryFilter::Any)
                .await
                .unwrap()
                .len(),
            ids.len()
        );
    }

    #[tokio::test]
    async fn uncategorised_candidates_have_no_category() {
        let pool = pool().await;
        let ids = seed(&pool).await;

        let loose: Vec<i64> = get_quiz_candidates(&pool, &[], CategoryFilter::Uncategorised)
            .await
            .unwrap()
            .into_iter()
            .map(|q| q.id)
            .collect();
        assert_eq!(loose, vec![ids[3]]);
        assert!(
            get_quiz_candidates(&pool, &[ids[3]], CategoryFilter::Uncategorised)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn import_keeps_ids() {
        let pool = pool().await;
        import_questions(
            &pool,
            vec![Question {
                id: 42,
                question: "Q".to_owned(),
                answer: "A".to_owned(),
                category: Some(1),
                difficulty: Some(5),
            }],
        )
        .await
        .unwrap();

        assert!(get_question_by_id(&pool, 42).await.unwrap().is_some());
    }
}
