//! Catalogue maintenance: canonical modules, their reading content and quiz
//! questions.

mod error;
pub use error::{TrainingError, TrainingResult};

pub mod content;
pub mod fixture;
pub mod quiz_bank;
pub mod seed;
