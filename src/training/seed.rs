use crate::model::{
    DatabaseResult, ModelManager,
    entity::{TrainingModule, TrainingModuleCreate},
};

pub struct ModuleSeed {
    pub slug: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub youtube_id: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
    pub order: i32,
    pub is_active: bool,
}

pub const CANONICAL_MODULES: [ModuleSeed; 6] = [
    ModuleSeed {
        slug: "ergonomia",
        title: "Ergonomía",
        description: "Capacitación ergonómica para prevenir lesiones musculoesqueléticas y promover hábitos de trabajo saludables.",
        youtube_id: "IIgZp_NbsAE",
        icon: "bi-body-text",
        color: "#28a745",
        order: 1,
        is_active: true,
    },
    ModuleSeed {
        slug: "ruido",
        title: "Ruido",
        description: "Identificación y control del riesgo por exposición a ruido ocupacional. Medidas preventivas y protección auditiva.",
        youtube_id: "",
        icon: "bi-volume-up",
        color: "#f59e0b",
        order: 2,
        is_active: false,
    },
    ModuleSeed {
        slug: "riesgo-electrico",
        title: "Riesgo Eléctrico",
        description: "Prevención de accidentes por contacto eléctrico directo e indirecto. Normas de seguridad y procedimientos de bloqueo/etiquetado.",
        youtube_id: "",
        icon: "bi-lightning-charge",
        color: "#ffc107",
        order: 3,
        is_active: false,
    },
    ModuleSeed {
        slug: "trabajo-en-altura",
        title: "Trabajo en Altura",
        description: "Medidas de prevención para tareas en altura. Uso de arnés, líneas de vida y sistemas de protección contra caídas.",
        youtube_id: "",
        icon: "bi-building-up",
        color: "#17a2b8",
        order: 4,
        is_active: false,
    },
    ModuleSeed {
        slug: "prevencion-incendios",
        title: "Prevención de Incendios",
        description: "Prevención, detección y combate de incendios. Uso de extintores, evacuación y plan de emergencia.",
        youtube_id: "",
        icon: "bi-fire",
        color: "#dc3545",
        order: 5,
        is_active: false,
    },
    ModuleSeed {
        slug: "elementos-proteccion-personal",
        title: "Elementos de Protección Personal",
        description: "Selección, uso correcto y mantenimiento de EPP según el tipo de riesgo laboral.",
        youtube_id: "",
        icon: "bi-shield-check",
        color: "#6f42c1",
        order: 6,
        is_active: false,
    },
];

impl ModuleSeed {
    fn to_create(&self) -> TrainingModuleCreate {
        let mut data = TrainingModuleCreate::new(self.slug, self.title);
        data.description = self.description.to_string();
        data.youtube_id = self.youtube_id.to_string();
        data.icon = self.icon.to_string();
        data.color = self.color.to_string();
        data.menu_order = self.order;
        data.is_active = self.is_active;
        data
    }

    /// Whether applying this seed would change `existing`.
    fn differs(&self, existing: &TrainingModule, force_active: bool) -> bool {
        existing.title() != self.title
            || existing.description() != self.description
            || existing.youtube_id() != self.youtube_id
            || existing.icon() != self.icon
            || existing.color() != self.color
            || existing.menu_order() != self.order
            || (force_active && existing.is_active() != self.is_active)
    }
}

#[derive(Debug, Default)]
pub struct SeedReport {
    pub created: Vec<String>,
    pub updated: Vec<String>,
    pub unchanged: Vec<String>,
    pub active: Vec<String>,
}

/// Creates or refreshes the canonical modules. Existing modules keep their
/// `is_active` flag unless `force_active` is set.
#[tracing::instrument(skip(mm))]
pub async fn seed_modules(mm: &ModelManager, force_active: bool) -> DatabaseResult<SeedReport> {
    let mut report = SeedReport::default();

    for seed in &CANONICAL_MODULES {
        let existing = TrainingModule::find_by_slug(mm, seed.slug).await?;
        let title = seed.title.to_string();

        match existing {
            None => {
                TrainingModule::upsert_by_slug(mm, &seed.to_create(), true).await?;
                report.created.push(title);
            }
            Some(existing) if seed.differs(&existing, force_active) => {
                TrainingModule::upsert_by_slug(mm, &seed.to_create(), force_active).await?;
                report.updated.push(title);
            }
            Some(_) => report.unchanged.push(title),
        }
    }

    report.active = TrainingModule::list_active(mm)
        .await?
        .into_iter()
        .map(|m| m.slug().to_string())
        .collect();

    tracing::info!(
        created = report.created.len(),
        updated = report.updated.len(),
        unchanged = report.unchanged.len(),
        "modules seeded"
    );
    Ok(report)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn only_ergonomia_is_active_by_default() {
        let active: Vec<_> = CANONICAL_MODULES
            .iter()
            .filter(|m| m.is_active)
            .map(|m| m.slug)
            .collect();
        assert_eq!(active, vec!["ergonomia"]);
    }

    #[test]
    fn seeds_are_in_menu_order_with_unique_slugs() {
        let mut slugs: Vec<_> = CANONICAL_MODULES.iter().map(|m| m.slug).collect();
        let orders: Vec<_> = CANONICAL_MODULES.iter().map(|m| m.order).collect();
        assert_eq!(orders, vec![1, 2, 3, 4, 5, 6]);

        slugs.sort();
        slugs.dedup();
        assert_eq!(slugs.len(), CANONICAL_MODULES.len());
    }
}
