use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// A classroom delivery of a module run by a professional.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct PresencialSession {
    id: Uuid,
    module_id: Uuid,
    professional_id: Uuid,
    session_date: NaiveDate,
    location: String,
    participants_count: i32,
    quiz_score: Option<i32>,
    quiz_passed: Option<bool>,
    notes: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PresencialSessionCreate {
    pub module_id: Uuid,
    pub session_date: NaiveDate,
    pub location: String,
    pub participants_count: i32,
    pub quiz_score: Option<i32>,
    pub quiz_passed: Option<bool>,
    pub notes: String,
}

/// Session joined with its module, for the history view.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct PresencialSessionRow {
    pub id: Uuid,
    pub module_id: Uuid,
    pub module_slug: String,
    pub module_title: String,
    pub session_date: NaiveDate,
    pub location: String,
    pub participants_count: i32,
    pub quiz_score: Option<i32>,
    pub quiz_passed: Option<bool>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl ResourceTyped for PresencialSession {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::PresencialSession
    }
}

impl PresencialSession {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn professional_id(&self) -> Uuid {
        self.professional_id
    }

    pub fn session_date(&self) -> NaiveDate {
        self.session_date
    }

    pub fn quiz_score(&self) -> Option<i32> {
        self.quiz_score
    }

    pub fn quiz_passed(&self) -> Option<bool> {
        self.quiz_passed
    }
}

#[async_trait]
impl CrudRepository<PresencialSession, PresencialSessionCreate, Uuid> for PresencialSession {
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: PresencialSessionCreate,
    ) -> DatabaseResult<Self> {
        let created = sqlx::query_as(
            "INSERT INTO presencial_sessions (id, module_id, professional_id, session_date, \
             location, participants_count, quiz_score, quiz_passed, notes) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.module_id)
        .bind(actor.user_id())
        .bind(data.session_date)
        .bind(data.location.trim())
        .bind(data.participants_count.max(0))
        .bind(data.quiz_score)
        .bind(data.quiz_passed)
        .bind(data.notes.trim())
        .fetch_one(mm.executor())
        .await?;
        Ok(created)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: PresencialSessionCreate,
    ) -> DatabaseResult<Self> {
        let updated = sqlx::query_as(
            "UPDATE presencial_sessions SET session_date = $1, location = $2, \
             participants_count = $3, quiz_score = $4, quiz_passed = $5, notes = $6 \
             WHERE id = $7 RETURNING *",
        )
        .bind(data.session_date)
        .bind(data.location.trim())
        .bind(data.participants_count.max(0))
        .bind(data.quiz_score)
        .bind(data.quiz_passed)
        .bind(data.notes.trim())
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(updated)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM presencial_sessions WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        Ok(())
    }

    async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM presencial_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM presencial_sessions WHERE professional_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(actor.user_id())
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM presencial_sessions WHERE professional_id = $1",
        )
        .bind(actor.user_id())
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }
}

impl_paginatable_for!(PresencialSession, PresencialSessionCreate, Uuid);

#[async_trait]
impl HasOwner for PresencialSession {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.professional_id)
    }
}

impl PresencialSession {
    /// The actor's sessions joined with module data, newest first.
    pub async fn history(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<PresencialSessionRow>> {
        let result = sqlx::query_as(
            "SELECT s.id, s.module_id, m.slug AS module_slug, m.title AS module_title, \
             s.session_date, s.location, s.participants_count, s.quiz_score, s.quiz_passed, \
             s.notes, s.created_at \
             FROM presencial_sessions s JOIN training_modules m ON m.id = s.module_id \
             WHERE s.professional_id = $1 ORDER BY s.created_at DESC",
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }
}
