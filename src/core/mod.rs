// Public modules
pub mod defaults;
pub mod dist_info;
pub mod error;
pub mod executor;
pub mod install;
pub mod manifest;
pub mod metadata;
pub mod package;
pub mod paths;
pub mod pipeline;
pub mod prebuild;
pub mod project;
pub mod requirement;
pub mod tool;
pub mod version_file;
pub mod wheel;

// Re-export common types for convenience
pub use error::{Error, ErrorCode, Result};
pub use pipeline::TopLevelCommand;
pub use project::Project;
