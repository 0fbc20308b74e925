//! Typed client for the taskbook REST API.
//!
//! ```no_run
//! use taskbook_rest_client::TaskApiClientBuilder;
//!
//! # async fn demo() -> Result<(), taskbook_rest_client::ApiError> {
//! let client = TaskApiClientBuilder::new("https://apmob.myfirnanda.my.id/api").build()?;
//! let tasks = client.list_tasks(Some("token")).await?;
//! println!("{} tasks", tasks.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{TaskApiClient, TaskApiClientBuilder};
pub use error::{ApiError, ApiResult};
pub use types::{LoginData, LoginRequest, RegisterRequest};
