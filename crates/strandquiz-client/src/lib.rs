//! strandquiz-client: Question and grading service integrations.
//!
//! Implements the core collaborator traits over HTTP, over question bank
//! files on disk, and in memory for tests.

pub mod config;
pub mod file;
pub mod http;
pub mod mock;

pub use config::{create_services, load_config, load_config_from, QuizConfig, QuizServices};
pub use file::FileQuestionSource;
pub use http::HttpQuizClient;
pub use mock::MockQuizService;
