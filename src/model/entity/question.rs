use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, prelude::FromRow};
use uuid::Uuid;

use crate::{
    model::{ModelManager, ResourceType, error::DatabaseResult, repo::ResourceTyped},
    quiz::AnswerKey,
};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Question {
    id: Uuid,
    module_id: Uuid,
    #[sqlx(rename = "question_order")]
    order: i32,
    text: String,
    #[serde(skip_serializing)]
    explanation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionCreate {
    pub module_id: Uuid,
    pub order: i32,
    pub text: String,
    pub explanation: String,
}

impl ResourceTyped for Question {
    fn get_resource_type() -> ResourceType {
        ResourceType::Question
    }
}

impl Question {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub async fn find_by_order(
        mm: &ModelManager,
        module_id: Uuid,
        order: i32,
    ) -> DatabaseResult<Option<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM questions WHERE module_id = $1 AND question_order = $2")
                .bind(module_id)
                .bind(order)
                .fetch_optional(mm.executor())
                .await?;
        Ok(result)
    }

    pub async fn find_in_module(
        mm: &ModelManager,
        module_id: Uuid,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM questions WHERE id = $1 AND module_id = $2")
            .bind(id)
            .bind(module_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_for_module(mm: &ModelManager, module_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM questions WHERE module_id = $1 ORDER BY question_order")
                .bind(module_id)
                .fetch_all(mm.executor())
                .await?;
        Ok(result)
    }

    /// One key per question of the module, with its correct choice if any.
    pub async fn answer_keys<'e, E: PgExecutor<'e>>(
        executor: E,
        module_id: Uuid,
    ) -> DatabaseResult<Vec<AnswerKey>> {
        let rows: Vec<(Uuid, Option<Uuid>)> = sqlx::query_as(
            "SELECT q.id, (SELECT c.id FROM choices c WHERE c.question_id = q.id AND c.is_correct \
             ORDER BY c.label LIMIT 1) \
             FROM questions q WHERE q.module_id = $1 ORDER BY q.question_order",
        )
        .bind(module_id)
        .fetch_all(executor)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(question_id, correct_choice_id)| AnswerKey {
                question_id,
                correct_choice_id,
            })
            .collect())
    }

    /// Inserts or updates the question at `(module_id, order)`.
    pub async fn upsert<'e, E: PgExecutor<'e>>(
        executor: E,
        data: &QuestionCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO questions (id, module_id, question_order, text, explanation) \
             VALUES ($1,$2,$3,$4,$5) \
             ON CONFLICT (module_id, question_order) DO UPDATE SET text = EXCLUDED.text, \
             explanation = EXCLUDED.explanation RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.module_id)
        .bind(data.order)
        .bind(&data.text)
        .bind(&data.explanation)
        .fetch_one(executor)
        .await?;
        Ok(result)
    }

    pub async fn delete_for_module<'e, E: PgExecutor<'e>>(
        executor: E,
        module_id: Uuid,
    ) -> DatabaseResult<u64> {
        let result = sqlx::query("DELETE FROM questions WHERE module_id = $1")
            .bind(module_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
