use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// A shareable entry point into a training module, created by a professional.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CapacitacionLink {
    id: Uuid,
    module_id: Uuid,
    created_by: Uuid,
    label: String,
    is_active: bool,
    expires_at: Option<DateTime<Utc>>,
    access_count: i32,
    created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CapacitacionLinkCreate {
    pub module_id: Uuid,
    pub label: String,
    pub expires_at: Option<DateTime<Utc>>,
}

impl ResourceTyped for CapacitacionLink {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::CapacitacionLink
    }
}

impl CapacitacionLink {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn created_by(&self) -> Uuid {
        self.created_by
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn access_count(&self) -> i32 {
        self.access_count
    }

    /// Active and not past `expires_at`.
    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at.is_none_or(|expires| now < expires)
    }
}

#[async_trait]
impl CrudRepository<CapacitacionLink, CapacitacionLinkCreate, Uuid> for CapacitacionLink {
    async fn create(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        data: CapacitacionLinkCreate,
    ) -> DatabaseResult<Self> {
        let created = sqlx::query_as(
            "INSERT INTO capacitacion_links (id, module_id, created_by, label, expires_at) \
             VALUES ($1,$2,$3,$4,$5) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.module_id)
        .bind(actor.user_id())
        .bind(data.label.trim())
        .bind(data.expires_at)
        .fetch_one(mm.executor())
        .await?;
        Ok(created)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CapacitacionLinkCreate,
    ) -> DatabaseResult<Self> {
        let updated = sqlx::query_as(
            "UPDATE capacitacion_links SET label = $1, expires_at = $2 WHERE id = $3 RETURNING *",
        )
        .bind(data.label.trim())
        .bind(data.expires_at)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(updated)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM capacitacion_links WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM capacitacion_links WHERE id = $1")
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
            "SELECT * FROM capacitacion_links WHERE created_by = $1 \
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
        let result: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM capacitacion_links WHERE created_by = $1")
                .bind(actor.user_id())
                .fetch_one(mm.executor())
                .await?;

        Ok(result)
    }
}

impl_paginatable_for!(CapacitacionLink, CapacitacionLinkCreate, Uuid);

#[async_trait]
impl HasOwner for CapacitacionLink {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.created_by)
    }
}

impl CapacitacionLink {
    pub async fn list_for_module(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
        module_id: Uuid,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM capacitacion_links WHERE created_by = $1 AND module_id = $2 \
             ORDER BY created_at DESC",
        )
        .bind(actor.user_id())
        .bind(module_id)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Counts a visit if the link belongs to `module_id` and is usable.
    /// The increment happens in the database so concurrent visits all count.
    pub async fn register_access(
        mm: &ModelManager,
        id: Uuid,
        module_id: Uuid,
    ) -> DatabaseResult<bool> {
        let result = sqlx::query(
            "UPDATE capacitacion_links SET access_count = access_count + 1 \
             WHERE id = $1 AND module_id = $2 AND is_active \
             AND (expires_at IS NULL OR expires_at > now())",
        )
        .bind(id)
        .bind(module_id)
        .execute(mm.executor())
        .await?;
        Ok(result.rows_affected() == 1)
    }

    pub async fn deactivate(mut self, mm: &ModelManager) -> DatabaseResult<Self> {
        sqlx::query("UPDATE capacitacion_links SET is_active = FALSE WHERE id = $1")
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        self.is_active = false;
        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use chrono::Duration;

    use super::*;

    fn link(is_active: bool, expires_at: Option<DateTime<Utc>>) -> CapacitacionLink {
        CapacitacionLink {
            id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            created_by: Uuid::new_v4(),
            label: String::from("Obra norte"),
            is_active,
            expires_at,
            access_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn usable_links() {
        let now = Utc::now();
        assert!(link(true, None).is_usable(now));
        assert!(link(true, Some(now + Duration::days(1))).is_usable(now));
    }

    #[test]
    fn expired_or_inactive_links_are_not_usable() {
        let now = Utc::now();
        assert!(!link(false, None).is_usable(now));
        assert!(!link(true, Some(now - Duration::seconds(1))).is_usable(now));
        assert!(!link(true, Some(now)).is_usable(now));
    }
}
