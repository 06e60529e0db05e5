//! Data behind the home view.

use futures::future;

use crate::error::Result;
use crate::models::{Category, UserProfile};
use crate::services::{TaskService, UserService};

#[derive(Debug, Clone)]
pub struct Dashboard {
    pub user: UserProfile,
    pub categories: Vec<Category>,
}

impl Dashboard {
    /// Load the profile and category list concurrently. Fails as soon as
    /// either request does.
    pub async fn load(users: &UserService, tasks: &TaskService) -> Result<Self> {
        let (user, categories) = future::try_join(users.get_profile(), tasks.categories()).await?;
        Ok(Self { user, categories })
    }

    pub fn greeting(&self) -> String {
        format!("Hello, {}", self.user.display_name())
    }

    pub fn category_name(&self, id: i64) -> Option<&str> {
        self.categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.as_str())
    }
}
