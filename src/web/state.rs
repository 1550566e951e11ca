use std::sync::Arc;

use crate::{Config, mail::Mailer, model::ModelManager};

#[derive(Debug, Clone)]
pub struct AppState {
    mm: ModelManager,
    mailer: Arc<dyn Mailer>,
    config: &'static Config,
}

impl AppState {
    pub fn new(mm: ModelManager, mailer: Arc<dyn Mailer>, config: &'static Config) -> Self {
        Self { mm, mailer, config }
    }

    pub fn pool(&self) -> &ModelManager {
        &self.mm
    }

    pub fn mailer(&self) -> &dyn Mailer {
        self.mailer.as_ref()
    }

    pub fn config(&self) -> &'static Config {
        self.config
    }
}
