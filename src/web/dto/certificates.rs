use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::model::entity::CertificateRow;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CertificateItem {
    pub id: Uuid,
    pub module_id: Uuid,
    pub module_slug: String,
    pub module_title: String,
    pub issued_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_valid: bool,
    pub days_until_expiry: i64,
    pub email_sent: bool,
    pub download_url: String,
    pub view_url: String,
}

impl CertificateItem {
    pub fn new(row: CertificateRow, now: DateTime<Utc>) -> Self {
        Self {
            is_valid: now < row.valid_until,
            days_until_expiry: (row.valid_until - now).num_days().max(0),
            download_url: format!("/api/v1/certificates/{}/download", row.id),
            view_url: format!("/api/v1/certificates/{}/view", row.id),
            id: row.id,
            module_id: row.module_id,
            module_slug: row.module_slug,
            module_title: row.module_title,
            issued_at: row.issued_at,
            valid_until: row.valid_until,
            email_sent: row.email_sent,
        }
    }
}
