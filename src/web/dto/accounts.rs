use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::{
    auth::{normalize_cuil, normalize_dni, normalize_email},
    model::entity::{UserEntity, UserEntityCreateUpdate},
    web::WebResult,
};

fn validate_cuil(value: &str) -> Result<(), ValidationError> {
    match normalize_cuil(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("cuil")
            .with_message("El CUIL debe tener 11 dígitos (se aceptan guiones).".into())),
    }
}

fn validate_dni(value: &str) -> Result<(), ValidationError> {
    match normalize_dni(value) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("dni")
            .with_message("El DNI debe tener 7 u 8 dígitos, sin puntos.".into())),
    }
}

fn trimmed(value: String) -> String {
    value.trim().to_string()
}

fn optional_email(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_email(&v))
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct TraineeRegisterBody {
    #[validate(length(min = 1, max = 150, message = "Ingresá tu nombre completo."))]
    pub full_name: String,
    #[validate(custom(function = "validate_cuil"))]
    pub cuil: String,
    #[validate(email(message = "Ingresá un e-mail válido."))]
    pub email: String,
    #[validate(length(min = 1, max = 150, message = "Ingresá tu puesto de trabajo."))]
    pub job_title: String,
    #[validate(length(min = 1, max = 200, message = "Ingresá el nombre de la empresa."))]
    pub company_name: String,
    #[serde(default)]
    #[validate(email(message = "Ingresá un e-mail válido."))]
    pub employer_email: Option<String>,
    #[serde(default)]
    #[validate(email(message = "Ingresá un e-mail válido."))]
    pub safety_responsible_email: Option<String>,
}

/// Trainee data waiting for confirmation, kept in a signed cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PendingRegistration {
    pub full_name: String,
    pub cuil: String,
    pub email: String,
    pub job_title: String,
    pub company_name: String,
    pub employer_email: Option<String>,
    pub safety_responsible_email: Option<String>,
}

impl TraineeRegisterBody {
    /// Trims, lower-cases e-mails, validates and normalises the CUIL.
    pub fn into_pending(self) -> WebResult<PendingRegistration> {
        let body = Self {
            full_name: trimmed(self.full_name),
            cuil: trimmed(self.cuil),
            email: normalize_email(&self.email),
            job_title: trimmed(self.job_title),
            company_name: trimmed(self.company_name),
            employer_email: optional_email(self.employer_email),
            safety_responsible_email: optional_email(self.safety_responsible_email),
        };
        body.validate()?;

        Ok(PendingRegistration {
            cuil: normalize_cuil(&body.cuil).unwrap_or_default(),
            full_name: body.full_name,
            email: body.email,
            job_title: body.job_title,
            company_name: body.company_name,
            employer_email: body.employer_email,
            safety_responsible_email: body.safety_responsible_email,
        })
    }
}

impl From<PendingRegistration> for UserEntityCreateUpdate {
    fn from(value: PendingRegistration) -> Self {
        let mut data = UserEntityCreateUpdate::trainee(value.full_name, value.cuil, value.email);
        data.job_title = Some(value.job_title);
        data.company_name = Some(value.company_name);
        data.employer_email = value.employer_email;
        data.safety_responsible_email = value.safety_responsible_email;
        data
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct TraineeLoginBody {
    pub cuil: String,
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct ProfessionalRegisterBody {
    #[validate(length(min = 1, max = 150, message = "Ingresá tu nombre."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 150, message = "Ingresá tu apellido."))]
    pub last_name: String,
    #[validate(custom(function = "validate_dni"))]
    pub dni: String,
    #[validate(email(message = "Ingresá un e-mail válido."))]
    pub email: String,
    #[validate(length(min = 1, max = 150, message = "Ingresá tu profesión."))]
    pub profession: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub license_number: Option<String>,
    #[validate(length(min = 3, max = 150, message = "El usuario debe tener al menos 3 caracteres."))]
    pub username: String,
    #[validate(
        length(min = 8, message = "La contraseña debe tener al menos 8 caracteres."),
        must_match(other = "password2", message = "Las contraseñas no coinciden.")
    )]
    pub password1: String,
    pub password2: String,
}

impl ProfessionalRegisterBody {
    pub fn normalized(self) -> WebResult<Self> {
        let body = Self {
            first_name: trimmed(self.first_name),
            last_name: trimmed(self.last_name),
            dni: trimmed(self.dni),
            email: normalize_email(&self.email),
            profession: trimmed(self.profession),
            license_number: self
                .license_number
                .map(trimmed)
                .filter(|v| !v.is_empty()),
            username: trimmed(self.username),
            password1: self.password1,
            password2: self.password2,
        };
        body.validate()?;
        Ok(body)
    }

    pub fn into_create(self, password_hash: String) -> UserEntityCreateUpdate {
        let mut data = UserEntityCreateUpdate::professional(
            self.first_name,
            self.last_name,
            self.email,
            self.username,
            password_hash,
        );
        data.dni = Some(self.dni);
        data.profession = Some(self.profession);
        data.license_number = self.license_number;
        data
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProfessionalLoginBody {
    /// Username or e-mail
    #[serde(alias = "username")]
    pub login: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LoginResponse {
    pub user: UserEntity,
    pub redirect: String,
}

/// `next` only when it is a path on this site.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.map(str::trim).filter(|n| {
        n.starts_with('/') && !n.starts_with("//") && !n.contains("://") && !n.contains('\\')
    })
}
