pub mod api;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod models;
pub mod session;
pub mod storage;
pub mod transport;
pub mod views;

pub use api::{ApiClient, ApiResult};
pub use error::{ClientError, ValidationError};
pub use session::{Session, SessionStore};
pub use views::App;
