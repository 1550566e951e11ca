use crate::impl_paginatable_for;
use crate::model::access::HasOwner;
use crate::model::repo::ResourceTyped;
use crate::web::AuthenticatedUser;
use crate::web::UserType;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

use crate::model::{ModelManager, error::DatabaseResult, repo::CrudRepository};

const USER_COLUMNS: &str = "id, email, username, password_hash, user_type, first_name, last_name, \
    full_name, dni, profession, license_number, cuil, job_title, company_name, employer_email, \
    safety_responsible_email, is_active, is_staff, date_joined";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct UserEntity {
    id: Uuid,
    email: String,
    username: Option<String>,
    #[serde(skip)]
    password_hash: Option<String>,
    user_type: String,
    first_name: String,
    last_name: String,
    full_name: String,
    dni: Option<String>,
    profession: Option<String>,
    license_number: Option<String>,
    cuil: Option<String>,
    job_title: Option<String>,
    company_name: Option<String>,
    employer_email: Option<String>,
    safety_responsible_email: Option<String>,
    is_active: bool,
    is_staff: bool,
    date_joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UserEntityCreateUpdate {
    pub email: String,
    pub username: Option<String>,
    #[serde(skip)]
    pub password_hash: Option<String>,
    pub user_type: UserType,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub dni: Option<String>,
    pub profession: Option<String>,
    pub license_number: Option<String>,
    pub cuil: Option<String>,
    pub job_title: Option<String>,
    pub company_name: Option<String>,
    pub employer_email: Option<String>,
    pub safety_responsible_email: Option<String>,
    pub is_active: bool,
}

impl UserEntityCreateUpdate {
    fn blank(user_type: UserType, email: String) -> Self {
        Self {
            email,
            username: None,
            password_hash: None,
            user_type,
            first_name: String::new(),
            last_name: String::new(),
            full_name: String::new(),
            dni: None,
            profession: None,
            license_number: None,
            cuil: None,
            job_title: None,
            company_name: None,
            employer_email: None,
            safety_responsible_email: None,
            is_active: true,
        }
    }

    pub fn trainee(full_name: String, cuil: String, email: String) -> Self {
        let mut data = Self::blank(UserType::Trainee, email);
        data.full_name = full_name;
        data.cuil = Some(cuil);
        data
    }

    pub fn professional(
        first_name: String,
        last_name: String,
        email: String,
        username: String,
        password_hash: String,
    ) -> Self {
        let mut data = Self::blank(UserType::Professional, email);
        data.first_name = first_name;
        data.last_name = last_name;
        data.username = Some(username);
        data.password_hash = Some(password_hash);
        data
    }

    /// Fills whichever side of full name / first + last name is missing.
    pub fn sync_names(&mut self) {
        let first = self.first_name.trim().to_string();
        let last = self.last_name.trim().to_string();
        let full = self.full_name.trim().to_string();

        if full.is_empty() && !(first.is_empty() && last.is_empty()) {
            self.full_name = format!("{first} {last}").trim().to_string();
        }

        if first.is_empty() && last.is_empty() && !full.is_empty() {
            let mut parts = full.splitn(2, char::is_whitespace);
            self.first_name = parts.next().unwrap_or_default().to_string();
            self.last_name = parts.next().unwrap_or_default().trim().to_string();
        }
    }
}

impl From<&UserEntity> for UserEntityCreateUpdate {
    fn from(user: &UserEntity) -> Self {
        Self {
            email: user.email.clone(),
            username: user.username.clone(),
            password_hash: None,
            user_type: user.user_type(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            full_name: user.full_name.clone(),
            dni: user.dni.clone(),
            profession: user.profession.clone(),
            license_number: user.license_number.clone(),
            cuil: user.cuil.clone(),
            job_title: user.job_title.clone(),
            company_name: user.company_name.clone(),
            employer_email: user.employer_email.clone(),
            safety_responsible_email: user.safety_responsible_email.clone(),
            is_active: user.is_active,
        }
    }
}

impl ResourceTyped for UserEntity {
    fn get_resource_type() -> crate::model::repo::ResourceType {
        crate::model::repo::ResourceType::User
    }
}

impl UserEntity {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn hash(&self) -> Option<&str> {
        self.password_hash.as_deref()
    }

    pub fn user_type(&self) -> UserType {
        UserType::from(self.user_type.as_str())
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn dni(&self) -> Option<&str> {
        self.dni.as_deref()
    }

    pub fn profession(&self) -> Option<&str> {
        self.profession.as_deref()
    }

    pub fn license_number(&self) -> Option<&str> {
        self.license_number.as_deref()
    }

    pub fn cuil(&self) -> Option<&str> {
        self.cuil.as_deref()
    }

    pub fn job_title(&self) -> Option<&str> {
        self.job_title.as_deref()
    }

    pub fn company_name(&self) -> Option<&str> {
        self.company_name.as_deref()
    }

    pub fn employer_email(&self) -> Option<&str> {
        self.employer_email.as_deref()
    }

    pub fn safety_responsible_email(&self) -> Option<&str> {
        self.safety_responsible_email.as_deref()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn is_staff(&self) -> bool {
        self.is_staff
    }

    pub fn date_joined(&self) -> DateTime<Utc> {
        self.date_joined
    }

    /// Full name, else "first last", else the local part of the e-mail.
    pub fn display_name(&self) -> String {
        let full = self.full_name.trim();
        if !full.is_empty() {
            return full.to_string();
        }

        let joined = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let joined = joined.trim();
        if !joined.is_empty() {
            return joined.to_string();
        }

        self.email
            .split('@')
            .next()
            .unwrap_or_default()
            .to_string()
    }

    pub fn as_actor(&self) -> AuthenticatedUser {
        AuthenticatedUser::new(self.id, self.user_type(), self.is_staff)
    }
}

#[async_trait::async_trait]
impl CrudRepository<UserEntity, UserEntityCreateUpdate, Uuid> for UserEntity {
    async fn create(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        mut data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        data.sync_names();

        let query = format!(
            "INSERT INTO users (id, email, username, password_hash, user_type, first_name, \
             last_name, full_name, dni, profession, license_number, cuil, job_title, company_name, \
             employer_email, safety_responsible_email, is_active) \
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13,$14,$15,$16,$17) \
             RETURNING {USER_COLUMNS}"
        );
        let created = sqlx::query_as(&query)
            .bind(Uuid::new_v4())
            .bind(&data.email)
            .bind(&data.username)
            .bind(&data.password_hash)
            .bind(data.user_type.to_string())
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.full_name)
            .bind(&data.dni)
            .bind(&data.profession)
            .bind(&data.license_number)
            .bind(&data.cuil)
            .bind(&data.job_title)
            .bind(&data.company_name)
            .bind(&data.employer_email)
            .bind(&data.safety_responsible_email)
            .bind(data.is_active)
            .fetch_one(mm.executor())
            .await?;

        Ok(created)
    }

    async fn update(
        self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        mut data: UserEntityCreateUpdate,
    ) -> DatabaseResult<Self> {
        data.sync_names();

        let query = format!(
            "UPDATE users SET email = $1, username = $2, \
             password_hash = COALESCE($3, password_hash), first_name = $4, last_name = $5, \
             full_name = $6, dni = $7, profession = $8, license_number = $9, cuil = $10, \
             job_title = $11, company_name = $12, employer_email = $13, \
             safety_responsible_email = $14, is_active = $15 \
             WHERE id = $16 RETURNING {USER_COLUMNS}"
        );
        let updated = sqlx::query_as(&query)
            .bind(&data.email)
            .bind(&data.username)
            .bind(&data.password_hash)
            .bind(&data.first_name)
            .bind(&data.last_name)
            .bind(&data.full_name)
            .bind(&data.dni)
            .bind(&data.profession)
            .bind(&data.license_number)
            .bind(&data.cuil)
            .bind(&data.job_title)
            .bind(&data.company_name)
            .bind(&data.employer_email)
            .bind(&data.safety_responsible_email)
            .bind(data.is_active)
            .bind(self.id)
            .fetch_one(mm.executor())
            .await?;

        Ok(updated)
    }

    async fn delete(self, mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<()> {
        sqlx::query("DELETE FROM users WHERE id = $1")
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
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let result = sqlx::query_as(&query)
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
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY date_joined DESC LIMIT $1 OFFSET $2"
        );
        let result = sqlx::query_as(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(mm.executor())
            .await?;
        Ok(result)
    }

    async fn count(mm: &ModelManager, _actor: &AuthenticatedUser) -> DatabaseResult<i64> {
        let result: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(mm.executor())
            .await?;

        Ok(result)
    }
}

impl_paginatable_for!(UserEntity, UserEntityCreateUpdate, Uuid);

#[async_trait]
impl HasOwner for UserEntity {
    type OwnerId = Uuid;

    async fn get_owner_id(
        &self,
        _mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Self::OwnerId> {
        Ok(self.id) // owners of users are themselves
    }
}

impl UserEntity {
    pub async fn find_by_email(mm: &ModelManager, email: &str) -> DatabaseResult<Option<Self>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)");
        let result = sqlx::query_as(&query)
            .bind(email.trim())
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    /// Professional by username or e-mail, both case-insensitive.
    pub async fn find_professional_by_login(
        mm: &ModelManager,
        login: &str,
    ) -> DatabaseResult<Option<Self>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_type = 'professional' \
             AND (lower(username) = lower($1) OR lower(email) = lower($1)) \
             ORDER BY date_joined LIMIT 1"
        );
        let result = sqlx::query_as(&query)
            .bind(login.trim())
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_trainee(
        mm: &ModelManager,
        cuil: &str,
        email: &str,
    ) -> DatabaseResult<Option<Self>> {
        let query = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_type = 'trainee' \
             AND cuil = $1 AND lower(email) = lower($2)"
        );
        let result = sqlx::query_as(&query)
            .bind(cuil)
            .bind(email.trim())
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn email_taken(mm: &ModelManager, email: &str) -> DatabaseResult<bool> {
        let taken = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE lower(email) = lower($1))",
        )
        .bind(email.trim())
        .fetch_one(mm.executor())
        .await?;
        Ok(taken)
    }

    pub async fn username_taken(mm: &ModelManager, username: &str) -> DatabaseResult<bool> {
        let taken = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE lower(username) = lower($1))",
        )
        .bind(username.trim())
        .fetch_one(mm.executor())
        .await?;
        Ok(taken)
    }

    pub async fn cuil_taken(mm: &ModelManager, cuil: &str) -> DatabaseResult<bool> {
        let taken = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE cuil = $1)")
            .bind(cuil)
            .fetch_one(mm.executor())
            .await?;
        Ok(taken)
    }

    pub async fn set_staff(mut self, mm: &ModelManager, is_staff: bool) -> DatabaseResult<Self> {
        sqlx::query("UPDATE users SET is_staff = $1 WHERE id = $2")
            .bind(is_staff)
            .bind(self.id)
            .execute(mm.executor())
            .await?;

        self.is_staff = is_staff;
        Ok(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn user(first: &str, last: &str, full: &str, email: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            username: None,
            password_hash: None,
            user_type: UserType::Trainee.to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            full_name: full.to_string(),
            dni: None,
            profession: None,
            license_number: None,
            cuil: None,
            job_title: None,
            company_name: None,
            employer_email: None,
            safety_responsible_email: None,
            is_active: true,
            is_staff: false,
            date_joined: Utc::now(),
        }
    }

    #[test]
    fn display_name_fallbacks() {
        assert_eq!(user("Ana", "Gómez", "Ana María Gómez", "a@x.com").display_name(), "Ana María Gómez");
        assert_eq!(user("Ana", "Gómez", "", "a@x.com").display_name(), "Ana Gómez");
        assert_eq!(user("", "", "  ", "ana.gomez@x.com").display_name(), "ana.gomez");
    }

    #[test]
    fn full_name_is_derived_from_parts() {
        let mut data = UserEntityCreateUpdate::professional(
            "Laura".into(),
            "Díaz".into(),
            "laura@x.com".into(),
            "laura".into(),
            "hash".into(),
        );
        data.sync_names();
        assert_eq!(data.full_name, "Laura Díaz");
    }

    #[test]
    fn parts_are_split_from_full_name() {
        let mut data =
            UserEntityCreateUpdate::trainee("Juan Carlos Pérez".into(), "20123456789".into(), "j@x.com".into());
        data.sync_names();
        assert_eq!(data.first_name, "Juan");
        assert_eq!(data.last_name, "Carlos Pérez");
        assert_eq!(data.full_name, "Juan Carlos Pérez");
    }

    #[test]
    fn single_word_full_name() {
        let mut data = UserEntityCreateUpdate::trainee("Madonna".into(), "20123456789".into(), "m@x.com".into());
        data.sync_names();
        assert_eq!(data.first_name, "Madonna");
        assert_eq!(data.last_name, "");
    }
}
