//! Filesystem edge of the blueprint pipeline: the blueprint folder, the
//! `notify` watch for new files, atomic writes of captured blueprints and
//! settings persistence.

pub mod atomic_write;
pub mod blueprint_dir;
pub mod file_error;
pub mod file_watch;
pub mod save_plugin;
pub mod settings_file;

pub use blueprint_dir::BlueprintFolder;
pub use file_error::BlueprintFileError;
pub use save_plugin::BlueprintFilesPlugin;
