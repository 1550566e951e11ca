use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};
use crate::web::AuthenticatedUser;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Certificate {
    id: Uuid,
    user_id: Uuid,
    module_id: Uuid,
    attempt_id: Uuid,
    #[serde(skip_serializing)]
    pdf_path: Option<String>,
    issued_at: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    email_sent: bool,
    email_sent_at: Option<DateTime<Utc>>,
    email_error: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CertificateCreate {
    pub user_id: Uuid,
    pub module_id: Uuid,
    pub attempt_id: Uuid,
    pub issued_at: DateTime<Utc>,
    pub validity_days: i64,
}

/// Certificate joined with its module and holder, for listings.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct CertificateRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub holder_name: String,
    pub holder_email: String,
    pub module_id: Uuid,
    pub module_slug: String,
    pub module_title: String,
    pub issued_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub email_sent: bool,
    pub email_error: String,
}

const ROW_SELECT: &str = "SELECT c.id, c.user_id, \
    COALESCE(NULLIF(u.full_name, ''), u.email) AS holder_name, u.email AS holder_email, \
    c.module_id, m.slug AS module_slug, m.title AS module_title, c.issued_at, c.valid_until, \
    c.email_sent, c.email_error \
    FROM certificates c JOIN users u ON u.id = c.user_id \
    JOIN training_modules m ON m.id = c.module_id";

impl ResourceTyped for Certificate {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Certificate
    }
}

impl Certificate {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn module_id(&self) -> Uuid {
        self.module_id
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn pdf_path(&self) -> Option<&str> {
        self.pdf_path.as_deref()
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        self.issued_at
    }

    pub fn valid_until(&self) -> DateTime<Utc> {
        self.valid_until
    }

    pub fn email_sent(&self) -> bool {
        self.email_sent
    }

    pub fn email_error(&self) -> &str {
        &self.email_error
    }

    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        now < self.valid_until
    }

    /// Whole days left, never negative.
    pub fn days_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        (self.valid_until - now).num_days().max(0)
    }

    /// Creates the certificate of an attempt. Returns the existing one and
    /// `false` when the attempt already has a certificate.
    pub async fn issue(mm: &ModelManager, data: &CertificateCreate) -> DatabaseResult<(Self, bool)> {
        let created: Option<Self> = sqlx::query_as(
            "INSERT INTO certificates (id, user_id, module_id, attempt_id, issued_at, valid_until) \
             VALUES ($1,$2,$3,$4,$5,$6) ON CONFLICT (attempt_id) DO NOTHING RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(data.user_id)
        .bind(data.module_id)
        .bind(data.attempt_id)
        .bind(data.issued_at)
        .bind(data.issued_at + Duration::days(data.validity_days))
        .fetch_optional(mm.executor())
        .await?;

        if let Some(created) = created {
            return Ok((created, true));
        }

        let existing = sqlx::query_as("SELECT * FROM certificates WHERE attempt_id = $1")
            .bind(data.attempt_id)
            .fetch_one(mm.executor())
            .await?;
        Ok((existing, false))
    }

    pub async fn find_by_attempt(
        mm: &ModelManager,
        attempt_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM certificates WHERE attempt_id = $1")
            .bind(attempt_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn set_pdf_path(&mut self, mm: &ModelManager, path: &str) -> DatabaseResult<()> {
        sqlx::query("UPDATE certificates SET pdf_path = $1 WHERE id = $2")
            .bind(path)
            .bind(self.id)
            .execute(mm.executor())
            .await?;
        self.pdf_path = Some(path.to_string());
        Ok(())
    }

    /// `error` is empty when the mail went out.
    pub async fn record_delivery(
        &mut self,
        mm: &ModelManager,
        sent: bool,
        error: &str,
        now: DateTime<Utc>,
    ) -> DatabaseResult<()> {
        let sent_at = sent.then_some(now);
        sqlx::query(
            "UPDATE certificates SET email_sent = $1, email_sent_at = $2, email_error = $3 \
             WHERE id = $4",
        )
        .bind(sent)
        .bind(sent_at)
        .bind(error)
        .bind(self.id)
        .execute(mm.executor())
        .await?;

        self.email_sent = sent;
        self.email_sent_at = sent_at;
        self.email_error = error.to_string();
        Ok(())
    }

    /// Listing rows, restricted to `user_id` when given, newest first.
    pub async fn list_rows(
        mm: &ModelManager,
        user_id: Option<Uuid>,
        limit: i64,
        offset: i64,
    ) -> DatabaseResult<Vec<CertificateRow>> {
        let query = format!(
            "{ROW_SELECT} WHERE ($1::uuid IS NULL OR c.user_id = $1) \
             ORDER BY c.issued_at DESC LIMIT $2 OFFSET $3"
        );
        let result = sqlx::query_as(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }
}

#[async_trait]
impl CrudRepository<Certificate, CertificateCreate, Uuid> for Certificate {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CertificateCreate,
    ) -> DatabaseResult<Self> {
        let (certificate, _) = Certificate::issue(mm, &data).await?;
        Ok(certificate)
    }

    /// Re-dates the certificate; the owner, module and attempt never change.
    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        data: CertificateCreate,
    ) -> DatabaseResult<Self> {
        let updated = sqlx::query_as(
            "UPDATE certificates SET issued_at = $1, valid_until = $2 WHERE id = $3 RETURNING *",
        )
        .bind(data.issued_at)
        .bind(data.issued_at + Duration::days(data.validity_days))
        .bind(self.id)
        .fetch_one(mm.executor())
        .await?;
        Ok(updated)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM certificates WHERE id = $1")
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
        let result = sqlx::query_as("SELECT * FROM certificates WHERE id = $1")
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
        let owner = (!actor.is_staff()).then_some(actor.user_id());
        let result = sqlx::query_as(
            "SELECT * FROM certificates WHERE ($1::uuid IS NULL OR user_id = $1) \
             ORDER BY issued_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(owner)
        .bind(limit)
        .bind(offset)
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let owner = (!actor.is_staff()).then_some(actor.user_id());
        let result: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM certificates WHERE ($1::uuid IS NULL OR user_id = $1)",
        )
        .bind(owner)
        .fetch_one(mm.executor())
        .await?;

        Ok(result)
    }
}

impl_paginatable_for!(Certificate, CertificateCreate, Uuid);

#[async_trait]
impl HasOwner for Certificate {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.user_id)
    }
}

#[cfg(test)]
mod test {
    use chrono::TimeZone;

    use super::*;

    fn certificate(issued_at: DateTime<Utc>) -> Certificate {
        Certificate {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            attempt_id: Uuid::new_v4(),
            pdf_path: None,
            issued_at,
            valid_until: issued_at + Duration::days(365),
            email_sent: false,
            email_sent_at: None,
            email_error: String::new(),
        }
    }

    #[test]
    fn validity_window() {
        let issued = Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap();
        let cert = certificate(issued);

        assert!(cert.is_valid(issued));
        assert_eq!(cert.days_until_expiry(issued), 365);
        assert_eq!(cert.days_until_expiry(issued + Duration::days(300)), 65);
        assert!(!cert.is_valid(issued + Duration::days(365)));
    }

    #[test]
    fn expired_certificate_has_zero_days_left() {
        let issued = Utc.with_ymd_and_hms(2023, 1, 1, 9, 0, 0).unwrap();
        let cert = certificate(issued);
        assert_eq!(cert.days_until_expiry(issued + Duration::days(500)), 0);
    }
}
