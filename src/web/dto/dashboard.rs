use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

use crate::{
    auth::normalize_email,
    model::entity::{CapacitacionLink, TrainingModule, UserEntity},
    web::{WebError, WebResult},
};

use super::training::public_link_path;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DashboardHome {
    pub profile: UserEntity,
    pub links: i64,
    pub presencial_sessions: i64,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ModalitySelector {
    pub module: TrainingModule,
    pub presencial_url: String,
    pub online_url: String,
}

impl ModalitySelector {
    pub fn new(module: TrainingModule) -> Self {
        Self {
            presencial_url: format!("/api/v1/dashboard/presencial/{}", module.slug()),
            online_url: format!("/api/v1/dashboard/capacitaciones/{}/links", module.slug()),
            module,
        }
    }
}

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct LinkCreateBody {
    #[serde(default)]
    #[validate(length(max = 120, message = "La etiqueta admite hasta 120 caracteres."))]
    pub label: String,
    #[serde(default)]
    #[validate(range(min = 1, max = 365, message = "La vigencia debe ser de 1 a 365 días."))]
    pub expires_in_days: Option<i64>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct LinkView {
    #[serde(flatten)]
    pub link: CapacitacionLink,
    pub is_usable: bool,
    pub public_url: String,
}

impl LinkView {
    pub fn new(link: CapacitacionLink, module_slug: &str, now: chrono::DateTime<chrono::Utc>) -> Self {
        Self {
            is_usable: link.is_usable(now),
            public_url: public_link_path(module_slug, link.id()),
            link,
        }
    }
}

fn validate_recipient(value: &str) -> Result<(), ValidationError> {
    if value.validate_email() {
        Ok(())
    } else {
        Err(ValidationError::new("email")
            .with_message(format!("E-mail inválido: {value}").into()))
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ShareBody {
    /// Comma or semicolon separated e-mails
    pub emails: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl ShareBody {
    /// Lower-cased, de-duplicated recipients; at least one, all valid.
    pub fn recipients(&self) -> WebResult<Vec<String>> {
        let mut recipients: Vec<String> = Vec::new();
        for raw in self.emails.split([',', ';']) {
            let email = normalize_email(raw);
            if email.is_empty() || recipients.contains(&email) {
                continue;
            }
            if let Err(e) = validate_recipient(&email) {
                let message = e.message.map(|m| m.to_string()).unwrap_or_default();
                return Err(WebError::validation("emails", message));
            }
            recipients.push(email);
        }

        if recipients.is_empty() {
            return Err(WebError::validation("emails", "Ingresá al menos un e-mail."));
        }
        Ok(recipients)
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ShareResponse {
    pub sent_to: Vec<String>,
    pub public_url: String,
}

#[cfg(test)]
mod test {
    use super::*;

    fn share(emails: &str) -> ShareBody {
        ShareBody {
            emails: emails.into(),
            message: None,
        }
    }

    #[test]
    fn recipients_are_split_and_lowercased() {
        let recipients = share("Ana@X.com; bob@x.com , ana@x.com,").recipients().unwrap();
        assert_eq!(recipients, vec!["ana@x.com", "bob@x.com"]);
    }

    #[test]
    fn recipients_need_one_valid_address() {
        assert!(share(" ; , ").recipients().is_err());
        assert!(share("ana@x.com, nope").recipients().is_err());
    }

    #[test]
    fn link_body_limits() {
        let body = LinkCreateBody {
            label: "Turno mañana".into(),
            expires_in_days: Some(0),
        };
        assert!(body.validate().is_err());
    }
}
