pub mod cache;
pub mod config;
pub mod error;
pub mod fanout;
pub mod github;
pub mod reference;
pub mod service;

pub use config::ServerConfig;
pub use error::LookupError;
pub use service::TidymodelsService;
