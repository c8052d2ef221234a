//! Filesystem-facing services: paths, configuration, secrets, image files.

pub mod export;
pub mod image_file;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::export::ImageExporter;
pub use crate::image_file::FileImageDecoder;
pub use crate::paths::PostcraftPaths;
pub use crate::secret_service::SecretServiceImpl;
pub use crate::storage::ConfigStorage;
