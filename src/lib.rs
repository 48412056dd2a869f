//! WheelTracker Client Library
//!
//! API access and session management for the WheelTracker position tracker.

pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod models;
pub mod navigation;
pub mod storage;

pub use api::ApiClient;
pub use auth::{AuthSession, AuthStore};
pub use config::ClientConfig;
pub use error::{ApiError, ErrorBody, FieldError};
pub use gateway::{Gateway, Request};
pub use navigation::{LogNavigator, Navigator, LOGIN_ROUTE};
pub use storage::{MemoryStorage, SecureStorage, StorageError, TokenStorage};
