pub mod config_service;
pub mod http_api;
pub mod paths;
pub mod photo_file;
pub mod session_id_repository;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::http_api::HttpSessionApi;
pub use crate::paths::CalculaPaths;
pub use crate::session_id_repository::TomlSessionIdRepository;
