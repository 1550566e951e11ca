pub mod accounts;
pub mod admin;
pub mod certificates;
pub mod dashboard;
pub mod presencial;
pub mod quiz;
pub mod training;
