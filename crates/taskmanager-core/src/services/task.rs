use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::error::{Result, ServiceError, ValidationError, INVALID_DATA_MESSAGE};
use crate::models::{CategoriesResponse, Category, NewTask, Task};

const CATEGORIES_PATH: &str = "/category";
const TASKS_PATH: &str = "/task";

/// Category listing and task creation
#[derive(Clone)]
pub struct TaskService {
    client: ApiClient,
}

impl TaskService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn categories(&self) -> Result<Vec<Category>> {
        let response: CategoriesResponse = self.client.get(CATEGORIES_PATH).await.map_err(|e| {
            warn!(error = %e, "Failed to fetch categories");
            ServiceError::fetch("categories", e)
        })?;
        Ok(response.categories)
    }

    /// Create a task. A blank title is rejected without a request.
    pub async fn create_task(&self, task: &NewTask) -> Result<Task> {
        task.validate()?;

        let created: Task = self
            .client
            .post(TASKS_PATH, task)
            .await
            .map_err(|e| match e {
                ApiError::BadRequest(_) => ServiceError::from(ValidationError::InvalidData(
                    e.server_message()
                        .unwrap_or_else(|| INVALID_DATA_MESSAGE.to_string()),
                )),
                other => ServiceError::from_api(other),
            })?;
        info!(task_id = created.id, status = %task.status, priority = %task.priority, "Created task");
        Ok(created)
    }
}
