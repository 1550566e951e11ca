//! Reading material of a module loaded from plain files on disk.
//!
//! A content directory holds `intro.md`, `material.md` and `transcript.txt`.

use std::path::{Path, PathBuf};

use super::{TrainingError, TrainingResult};
use crate::model::{ModelManager, entity::TrainingModule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentField {
    Intro,
    Material,
    Transcript,
}

impl ContentField {
    pub const ALL: [ContentField; 3] = [Self::Intro, Self::Material, Self::Transcript];

    pub fn name(self) -> &'static str {
        match self {
            Self::Intro => "intro_md",
            Self::Material => "material_md",
            Self::Transcript => "transcript_md",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Self::Intro => "intro.md",
            Self::Material => "material.md",
            Self::Transcript => "transcript.txt",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModuleContent {
    pub intro_md: String,
    pub material_md: String,
    pub transcript_md: String,
}

impl ModuleContent {
    pub fn of(module: &TrainingModule) -> Self {
        Self {
            intro_md: module.intro_md().to_string(),
            material_md: module.material_md().to_string(),
            transcript_md: module.transcript_md().to_string(),
        }
    }

    /// Reads every content file of `dir`. All three must exist.
    pub async fn read_dir(dir: &Path) -> TrainingResult<Self> {
        let mut content = Self::default();
        for field in ContentField::ALL {
            let path = dir.join(field.file_name());
            if !tokio::fs::try_exists(&path).await? {
                return Err(TrainingError::ContentFileMissing(path));
            }
            *content.field_mut(field) = tokio::fs::read_to_string(&path).await?;
        }
        Ok(content)
    }

    pub fn field(&self, field: ContentField) -> &str {
        match field {
            ContentField::Intro => &self.intro_md,
            ContentField::Material => &self.material_md,
            ContentField::Transcript => &self.transcript_md,
        }
    }

    fn field_mut(&mut self, field: ContentField) -> &mut String {
        match field {
            ContentField::Intro => &mut self.intro_md,
            ContentField::Material => &mut self.material_md,
            ContentField::Transcript => &mut self.transcript_md,
        }
    }

    /// Copies `canonical` over `self`. Without `force` only blank fields are
    /// filled; with it every differing field is overwritten.
    pub fn merge(&mut self, canonical: &ModuleContent, force: bool) -> ContentReport {
        let mut report = ContentReport::default();
        for field in ContentField::ALL {
            let current = self.field(field);
            let wanted = canonical.field(field);
            let replace = if force {
                current != wanted
            } else {
                current.trim().is_empty()
            };

            if replace {
                *self.field_mut(field) = wanted.to_string();
                report.updated.push(field.name());
            } else {
                report.omitted.push(field.name());
            }
        }
        report
    }
}

#[derive(Debug, Default, PartialEq)]
pub struct ContentReport {
    pub updated: Vec<&'static str>,
    pub omitted: Vec<&'static str>,
}

/// Character count of each field after seeding, in file order.
pub fn content_lengths(content: &ModuleContent) -> Vec<(&'static str, usize)> {
    ContentField::ALL
        .iter()
        .map(|&f| (f.name(), content.field(f).chars().count()))
        .collect()
}

/// Fills the module's reading texts from `content_dir`. Existing text is
/// kept unless `force` is set.
#[tracing::instrument(skip(mm))]
pub async fn seed_module_content(
    mm: &ModelManager,
    slug: &str,
    content_dir: &Path,
    force: bool,
) -> TrainingResult<(ContentReport, ModuleContent)> {
    let module = TrainingModule::find_by_slug(mm, slug)
        .await?
        .ok_or_else(|| TrainingError::ModuleNotFound(slug.to_string()))?;
    let canonical = ModuleContent::read_dir(content_dir).await?;

    let mut content = ModuleContent::of(&module);
    let report = content.merge(&canonical, force);

    if !report.updated.is_empty() {
        module
            .set_content(
                mm,
                &content.intro_md,
                &content.material_md,
                &content.transcript_md,
            )
            .await?;
    }

    tracing::info!(
        updated = report.updated.len(),
        omitted = report.omitted.len(),
        "content seeded into {slug}"
    );
    Ok((report, content))
}

/// `<root>/<slug>`, where the files of one module live.
pub fn module_content_dir(root: &Path, slug: &str) -> PathBuf {
    root.join(slug)
}
