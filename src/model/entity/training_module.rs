use crate::impl_paginatable_for;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct TrainingModule {
    id: Uuid,
    slug: String,
    title: String,
    description: String,
    youtube_id: String,
    intro_md: String,
    material_md: String,
    transcript_md: String,
    icon: String,
    color: String,
    menu_order: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn default_icon() -> String {
    String::from("bi-journal-text")
}

fn default_color() -> String {
    String::from("#0d6efd")
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct TrainingModuleCreate {
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub youtube_id: String,
    #[serde(default)]
    pub intro_md: String,
    #[serde(default)]
    pub material_md: String,
    #[serde(default)]
    pub transcript_md: String,
    #[serde(default = "default_icon")]
    pub icon: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub menu_order: i32,
    #[serde(default)]
    pub is_active: bool,
}

impl TrainingModuleCreate {
    pub fn new(slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            title: title.into(),
            description: String::new(),
            youtube_id: String::new(),
            intro_md: String::new(),
            material_md: String::new(),
            transcript_md: String::new(),
            icon: default_icon(),
            color: default_color(),
            menu_order: 0,
            is_active: false,
        }
    }
}

impl ResourceTyped for TrainingModule {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::TrainingModule
    }
}

impl TrainingModule {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn youtube_id(&self) -> &str {
        &self.youtube_id
    }

    pub fn intro_md(&self) -> &str {
        &self.intro_md
    }

    pub fn material_md(&self) -> &str {
        &self.material_md
    }

    pub fn transcript_md(&self) -> &str {
        &self.transcript_md
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn menu_order(&self) -> i32 {
        self.menu_order
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[async_trait]
impl CrudRepository<TrainingModule, TrainingModuleCreate, Uuid> for TrainingModule {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: TrainingModuleCreate,
    ) -> DatabaseResult<Self> {
        let created = sqlx::query_as(
            "INSERT INTO training_modules (id, slug, title, description, youtube_id, intro_md, \
             material_md, transcript_md, icon, color, menu_order, is_active) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.youtube_id)
        .bind(&data.intro_md)
        .bind(&data.material_md)
        .bind(&data.transcript_md)
        .bind(&data.icon)
        .bind(&data.color)
        .bind(data.menu_order)
        .bind(data.is_active)
        .fetch_one(mm.executor())
        .await?;

        Ok(created)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: TrainingModuleCreate,
    ) -> DatabaseResult<Self> {
        let updated = sqlx::query_as(
            "UPDATE training_modules SET slug = $1, title = $2, description = $3, \
             youtube_id = $4, intro_md = $5, material_md = $6, transcript_md = $7, icon = $8, \
             color = $9, menu_order = $10, is_active = $11, updated_at = now() \
             WHERE id = $12 RETURNING *",
        )
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.youtube_id)
        .bind(&data.intro_md)
        .bind(&data.material_md)
        .bind(&data.transcript_md)
        .bind(&data.icon)
        .bind(&data.color)
        .bind(data.menu_order)
        .bind(data.is_active)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;

        Ok(updated)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM training_modules WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM training_modules WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    async fn list(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM training_modules ORDER BY menu_order, title LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM training_modules")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(TrainingModule, TrainingModuleCreate, Uuid);

impl TrainingModule {
    pub async fn find_by_slug(mm: &ModelManager, slug: &str) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM training_modules WHERE slug = $1")
            .bind(slug)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_active_by_slug(
        mm: &ModelManager,
        slug: &str,
    ) -> DatabaseResult<Option<Self>> {
        let result =
            sqlx::query_as("SELECT * FROM training_modules WHERE slug = $1 AND is_active")
                .bind(slug)
                .fetch_optional(mm.executor())
                .await?;
        Ok(result)
    }

    /// Every module in menu order, active or not.
    pub async fn list_menu(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as("SELECT * FROM training_modules ORDER BY menu_order, title")
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn list_active(mm: &ModelManager) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM training_modules WHERE is_active ORDER BY menu_order, title",
        )
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// The most recently updated active module.
    pub async fn latest_active(mm: &ModelManager) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as(
            "SELECT * FROM training_modules WHERE is_active ORDER BY updated_at DESC LIMIT 1",
        )
        .fetch_optional(mm.executor())
        .await?;
        Ok(result)
    }

    /// Creates or refreshes a module by slug. An existing module keeps its
    /// `is_active` flag unless `force_active` is set.
    pub async fn upsert_by_slug(
        mm: &ModelManager,
        data: &TrainingModuleCreate,
        force_active: bool,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "INSERT INTO training_modules (id, slug, title, description, youtube_id, icon, color, \
             menu_order, is_active) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9) \
             ON CONFLICT (slug) DO UPDATE SET title = EXCLUDED.title, \
             description = EXCLUDED.description, youtube_id = EXCLUDED.youtube_id, \
             icon = EXCLUDED.icon, color = EXCLUDED.color, menu_order = EXCLUDED.menu_order, \
             is_active = CASE WHEN $10 THEN EXCLUDED.is_active ELSE training_modules.is_active END, \
             updated_at = now() \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(&data.slug)
        .bind(&data.title)
        .bind(&data.description)
        .bind(&data.youtube_id)
        .bind(&data.icon)
        .bind(&data.color)
        .bind(data.menu_order)
        .bind(data.is_active)
        .bind(force_active)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }

    /// Replaces the three reading texts shown next to the video.
    pub async fn set_content(
        self,
        mm: &ModelManager,
        intro_md: &str,
        material_md: &str,
        transcript_md: &str,
    ) -> DatabaseResult<Self> {
        let result = sqlx::query_as(
            "UPDATE training_modules SET intro_md = $1, material_md = $2, transcript_md = $3, \
             updated_at = now() WHERE id = $4 RETURNING *",
        )
        .bind(intro_md)
        .bind(material_md)
        .bind(transcript_md)
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(result)
    }
}
