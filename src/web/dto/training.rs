use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::TrainingModule;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct TrainingHome {
    pub module: Option<TrainingModule>,
}

/// Entry of the capacitaciones menu.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ModuleMenuEntry {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub order: i32,
    pub is_active: bool,
}

impl From<&TrainingModule> for ModuleMenuEntry {
    fn from(module: &TrainingModule) -> Self {
        Self {
            id: module.id(),
            slug: module.slug().to_string(),
            title: module.title().to_string(),
            description: module.description().to_string(),
            icon: module.icon().to_string(),
            color: module.color().to_string(),
            order: module.menu_order(),
            is_active: module.is_active(),
        }
    }
}

pub fn training_path(slug: Option<&str>) -> String {
    match slug {
        Some(slug) => format!("/capacitacion/{slug}/"),
        None => String::from("/capacitacion/"),
    }
}

pub fn public_link_path(slug: &str, link_id: Uuid) -> String {
    format!("/c/{slug}/?ref={link_id}")
}
