use serde::Deserialize;
use validator::Validate;

use crate::model::entity::TrainingModuleCreate;

#[derive(Debug, Deserialize, Validate, utoipa::ToSchema)]
pub struct AdminModuleBody {
    #[validate(length(min = 1, max = 80), regex(path = *SLUG, message = "Slug inválido."))]
    pub slug: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub youtube_id: String,
    #[serde(default)]
    pub intro_md: String,
    #[serde(default)]
    pub material_md: String,
    #[serde(default)]
    pub transcript_md: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub menu_order: i32,
    #[serde(default)]
    pub is_active: bool,
}

static SLUG: std::sync::LazyLock<regex::Regex> = std::sync::LazyLock::new(|| {
    regex::Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").expect("valid slug regex")
});

impl From<AdminModuleBody> for TrainingModuleCreate {
    fn from(body: AdminModuleBody) -> Self {
        let mut data = TrainingModuleCreate::new(body.slug, body.title);
        data.description = body.description;
        data.youtube_id = body.youtube_id;
        data.intro_md = body.intro_md;
        data.material_md = body.material_md;
        data.transcript_md = body.transcript_md;
        if let Some(icon) = body.icon.filter(|v| !v.trim().is_empty()) {
            data.icon = icon;
        }
        if let Some(color) = body.color.filter(|v| !v.trim().is_empty()) {
            data.color = color;
        }
        data.menu_order = body.menu_order;
        data.is_active = body.is_active;
        data
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct StaffBody {
    pub is_staff: bool,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn slug_format() {
        let mut body: AdminModuleBody =
            serde_json::from_str(r#"{"slug": "trabajo-en-altura", "title": "Altura"}"#).unwrap();
        assert!(body.validate().is_ok());

        body.slug = "Trabajo en altura".into();
        assert!(body.validate().is_err());
    }
}
