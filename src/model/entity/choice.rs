use serde::{Deserialize, Serialize};
use sqlx::{PgExecutor, prelude::FromRow};
use uuid::Uuid;

use crate::model::{ModelManager, ResourceType, error::DatabaseResult, repo::ResourceTyped};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Choice {
    id: Uuid,
    question_id: Uuid,
    label: String,
    text: String,
    #[serde(skip_serializing)]
    is_correct: bool,
    #[serde(skip_serializing)]
    explanation_if_chosen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChoiceCreate {
    pub question_id: Uuid,
    pub label: String,
    pub text: String,
    pub is_correct: bool,
    pub explanation_if_chosen: String,
}

impl ResourceTyped for Choice {
    fn get_resource_type() -> ResourceType {
        ResourceType::Choice
    }
}

impl Choice {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn question_id(&self) -> Uuid {
        self.question_id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn explanation_if_chosen(&self) -> &str {
        &self.explanation_if_chosen
    }

    pub async fn find_for_question(
        mm: &ModelManager,
        question_id: Uuid,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM choices WHERE id = $1 AND question_id = $2")
            .bind(id)
            .bind(question_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_for_question(
        mm: &ModelManager,
        question_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM choices WHERE question_id = $1 ORDER BY label")
            .bind(question_id)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    /// All choices of a module's questions, ordered by question then label.
    pub async fn list_for_module(mm: &ModelManager, module_id: Uuid) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT c.* FROM choices c JOIN questions q ON q.id = c.question_id \
             WHERE q.module_id = $1 ORDER BY q.question_order, c.label",
        )
        .bind(module_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Inserts or updates the choice at `(question_id, label)`.
    pub async fn upsert<'e, E: PgExecutor<'e>>(
        executor: E,
        data: &ChoiceCreate,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO choices (id, question_id, label, text, is_correct, explanation_if_chosen) \
             VALUES ($1,$2,$3,$4,$5,$6) \
             ON CONFLICT (question_id, label) DO UPDATE SET text = EXCLUDED.text, \
             is_correct = EXCLUDED.is_correct, \
             explanation_if_chosen = EXCLUDED.explanation_if_chosen RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.question_id)
        .bind(&data.label)
        .bind(&data.text)
        .bind(data.is_correct)
        .bind(&data.explanation_if_chosen)
        .fetch_one(executor)
        .await?;
        Ok(result)
    }
}
