pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod http_client;
pub mod logger;
pub mod models;
pub mod token_store;
pub mod utils;

pub use auth::{AuthApi, Session};
pub use errors::{ApiError, AppError, AuthError, ConfigError, StorageError};
pub use http_client::HttpClient;
pub use models::{AuthResponse, Credentials, Profile, ProfileUpdate, RefreshResponse, Role};
pub use token_store::TokenStore;
