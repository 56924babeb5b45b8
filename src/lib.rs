//! Devhub: REST backend for developers, their profile details, projects and project technologies.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod settings;
pub mod shutdown;
pub mod sql;
pub mod state;
pub mod store;

pub use error::{AppError, ConfigError};
pub use routes::{app, developer_routes, project_routes, service_routes};
pub use settings::Settings;
pub use state::AppState;
pub use store::{ensure_schema, MemoryStore, PgStore, Store};
