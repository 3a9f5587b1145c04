use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::database::models::{
    Application, ApplicationStatus, Opportunity, OpportunityType, Task, TaskStatus,
};

fn default_open() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct OpportunityQuery {
    /// Comma-separated skill names; an opportunity matches if it lists any.
    pub skills: Option<String>,
    #[serde(default = "default_open")]
    pub is_open: bool,
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl OpportunityQuery {
    pub fn skill_list(&self) -> Vec<String> {
        self.skills
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|skill| !skill.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Deserialize)]
pub struct OpportunityCreate {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub opportunity_type: String,
    pub skills: Vec<String>,
    pub duration: String,
    pub stipend: Option<String>,
    pub deadline: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct OpportunityResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub opportunity_type: OpportunityType,
    pub faculty_id: String,
    pub faculty_name: String,
    pub skills: Vec<String>,
    pub duration: String,
    pub stipend: Option<String>,
    pub deadline: NaiveDate,
    pub is_open: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Opportunity> for OpportunityResponse {
    fn from(opportunity: Opportunity) -> Self {
        Self {
            id: opportunity.id,
            title: opportunity.title,
            description: opportunity.description,
            opportunity_type: opportunity.opportunity_type,
            faculty_id: opportunity.faculty_id,
            faculty_name: opportunity.faculty_name.unwrap_or_else(|| "Unknown".to_string()),
            skills: opportunity.skills,
            duration: opportunity.duration,
            stipend: opportunity.stipend,
            deadline: opportunity.deadline,
            is_open: opportunity.is_open,
            created_at: opportunity.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplicationCreate {
    pub cover_letter: String,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationStatusUpdate {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub id: String,
    pub opportunity_id: String,
    pub opportunity_title: String,
    pub student_id: String,
    pub student_name: String,
    pub status: ApplicationStatus,
    pub cover_letter: String,
    pub resume_path: Option<String>,
    pub applied_at: DateTime<Utc>,
}

impl From<Application> for ApplicationResponse {
    fn from(application: Application) -> Self {
        Self {
            id: application.id,
            opportunity_id: application.opportunity_id,
            opportunity_title: application.opportunity_title,
            student_id: application.student_id,
            student_name: application.student_name.unwrap_or_else(|| "Unknown".to_string()),
            status: application.status,
            cover_letter: application.cover_letter,
            resume_path: application.resume_path,
            applied_at: application.applied_at,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub progress: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub student_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub deadline: Option<NaiveDate>,
    pub status: TaskStatus,
    pub progress: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            student_id: task.student_id,
            title: task.title,
            description: task.description,
            category: task.category,
            deadline: task.deadline,
            status: task.status,
            progress: task.progress,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_list_splits_and_trims() {
        let query = OpportunityQuery {
            skills: Some(" Rust, ,python ".to_string()),
            is_open: true,
            skip: None,
            limit: None,
        };
        assert_eq!(query.skill_list(), vec!["Rust".to_string(), "python".to_string()]);
    }
}
