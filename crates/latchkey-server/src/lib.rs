pub mod config;
pub mod handlers;
pub mod observability;
pub mod server;
pub mod subject;

pub use config::AppConfig;
pub use observability::init_tracing;
pub use server::{AppState, LatchkeyServer, ServerBuilder, build_app, spawn_cleanup};
pub use subject::{HeaderSubjectResolver, SubjectResolver};
