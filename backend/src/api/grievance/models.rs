use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{Grievance, GrievanceCategory, GrievanceStatus, GrievanceUpdate, Priority};

#[derive(Debug, Deserialize)]
pub struct GrievanceCreate {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub location: String,
    #[serde(default)]
    pub is_anonymous: bool,
}

#[derive(Debug, Deserialize)]
pub struct GrievanceUpdateCreate {
    pub status: String,
    pub remark: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct GrievanceQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UpdatedBy {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct GrievanceUpdateResponse {
    pub id: String,
    pub status: GrievanceStatus,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    pub updated_by: UpdatedBy,
}

impl From<GrievanceUpdate> for GrievanceUpdateResponse {
    fn from(update: GrievanceUpdate) -> Self {
        Self {
            id: update.id,
            status: update.status,
            remark: update.remark,
            created_at: update.created_at,
            updated_by: UpdatedBy {
                id: update.updated_by,
                name: update.updater_name.unwrap_or_else(|| "Unknown".to_string()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GrievanceResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: GrievanceCategory,
    pub priority: Priority,
    pub location: String,
    pub status: GrievanceStatus,
    pub is_anonymous: bool,
    pub submitter_id: Option<String>,
    pub submitter_name: Option<String>,
    pub assigned_to: Option<String>,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub updates: Vec<GrievanceUpdateResponse>,
}

impl GrievanceResponse {
    pub fn new(grievance: Grievance, updates: Vec<GrievanceUpdate>) -> Self {
        let submitter_name = if grievance.is_anonymous {
            None
        } else {
            grievance.submitter_name
        };
        Self {
            id: grievance.id,
            title: grievance.title,
            description: grievance.description,
            category: grievance.category,
            priority: grievance.priority,
            location: grievance.location,
            status: grievance.status,
            is_anonymous: grievance.is_anonymous,
            submitter_id: grievance.submitter_id,
            submitter_name,
            assigned_to: grievance.assigned_to,
            photos: grievance.photos,
            created_at: grievance.created_at,
            updated_at: grievance.updated_at,
            updates: updates.into_iter().map(Into::into).collect(),
        }
    }
}
