use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Category {
    pub id: i64,
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategoriesResponse {
    #[serde(rename = "categorias", default)]
    pub categories: Vec<Category>,
}

/// Workflow state of a task. Sent to the server as its numeric id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TaskStatus {
    #[default]
    New,
    InProgress,
    Done,
    Blocked,
    Cancelled,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::New,
        TaskStatus::InProgress,
        TaskStatus::Done,
        TaskStatus::Blocked,
        TaskStatus::Cancelled,
    ];

    pub fn id(self) -> u8 {
        match self {
            TaskStatus::New => 1,
            TaskStatus::InProgress => 2,
            TaskStatus::Done => 3,
            TaskStatus::Blocked => 4,
            TaskStatus::Cancelled => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::New => "New",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
            TaskStatus::Blocked => "Blocked",
            TaskStatus::Cancelled => "Cancelled",
        }
    }
}

impl From<TaskStatus> for u8 {
    fn from(status: TaskStatus) -> u8 {
        status.id()
    }
}

impl TryFrom<u8> for TaskStatus {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        TaskStatus::ALL
            .into_iter()
            .find(|s| s.id() == id)
            .ok_or_else(|| format!("unknown task status id {}", id))
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub const ALL: [TaskPriority; 4] = [
        TaskPriority::Low,
        TaskPriority::Medium,
        TaskPriority::High,
        TaskPriority::Urgent,
    ];

    pub fn id(self) -> u8 {
        match self {
            TaskPriority::Low => 1,
            TaskPriority::Medium => 2,
            TaskPriority::High => 3,
            TaskPriority::Urgent => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskPriority::Low => "Low",
            TaskPriority::Medium => "Medium",
            TaskPriority::High => "High",
            TaskPriority::Urgent => "Urgent",
        }
    }
}

impl From<TaskPriority> for u8 {
    fn from(priority: TaskPriority) -> u8 {
        priority.id()
    }
}

impl TryFrom<u8> for TaskPriority {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        TaskPriority::ALL
            .into_iter()
            .find(|p| p.id() == id)
            .ok_or_else(|| format!("unknown task priority id {}", id))
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Body of `POST /task`
#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "statusId")]
    pub status: TaskStatus,
    #[serde(rename = "prioridadeId")]
    pub priority: TaskPriority,
    #[serde(rename = "prazo")]
    pub due: Option<DateTime<Utc>>,
    #[serde(rename = "categoriaId")]
    pub category_id: Option<i64>,
}

impl NewTask {
    /// A task with default status and priority and no deadline or category
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due: None,
            category_id: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        Ok(())
    }
}

/// Task as echoed back by the server. Only the id is guaranteed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS))]
#[cfg_attr(feature = "ts", ts(export))]
pub struct Task {
    pub id: i64,
    #[serde(rename = "titulo", default)]
    pub title: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "statusId", default)]
    pub status_id: Option<u8>,
    #[serde(rename = "prioridadeId", default)]
    pub priority_id: Option<u8>,
    #[serde(rename = "prazo", default)]
    pub due: Option<String>,
    #[serde(rename = "categoriaId", default)]
    pub category_id: Option<i64>,
}

impl Task {
    pub fn status(&self) -> Option<TaskStatus> {
        self.status_id.and_then(|id| TaskStatus::try_from(id).ok())
    }

    pub fn priority(&self) -> Option<TaskPriority> {
        self.priority_id.and_then(|id| TaskPriority::try_from(id).ok())
    }
}
