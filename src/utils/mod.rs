pub mod media;
pub mod signal;
pub mod text;
