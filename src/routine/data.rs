use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::data::UserId;

pub type TemplateID = i64;

pub const MAX_TASKS_PER_TEMPLATE: usize = 15;
pub const MAX_TEMPLATES_PER_USER: i64 = 3;

pub const SYSTEM_DEFAULT_TITLE: &str = "System Default Routine";
pub const CUSTOM_TITLE: &str = "Custom Routine";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl Task {
    pub fn new(title: &str, description: &str) -> Task {
        Task {
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoutineTemplate {
    pub id: TemplateID,
    pub user_id: Option<UserId>,
    pub title: String,
    pub tasks: Vec<Task>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewRoutineTemplate {
    pub owner: Option<UserId>,
    pub title: String,
    pub tasks: Vec<Task>,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(RoutineTemplate),
    AlreadyExists(RoutineTemplate),
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRequest {
    pub tasks: Option<Vec<Task>>,
    #[serde(default)]
    pub set_as_default: bool,
}

#[derive(Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Debug)]
pub struct RoutineResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routine: Option<RoutineTemplate>,
}

#[derive(Serialize, Debug)]
pub struct TemplateResponse {
    pub message: String,
    pub template: RoutineTemplate,
}

pub fn system_default_tasks() -> Vec<Task> {
    vec![
        Task::new("Wake up on time", "Before 7:00 AM"),
        Task::new("Plan the day", "Top 3 priorities"),
        Task::new("Deep focus session", "30–60 mins distraction-free"),
        Task::new("Learn something", "Skill, book, or course"),
        Task::new("Move your body", "Walk, stretch, or workout"),
        Task::new("Control spending", "No impulse buys"),
        Task::new("Reflect & shutdown", "Review the day, plan tomorrow"),
    ]
}
