//! Helpers shared by the picker engine and its command-line harness.
//!
//! - `deadline`: bounds adapter futures with an optional timeout.
//! - `settings`: loads picker configuration and fixture documents from disk.

mod deadline;
mod settings;

pub use deadline::{DeadlineError, with_deadline};
pub use settings::{
    SETTINGS_FILE_NAME, SETTINGS_PATH_ENV, SettingsError, default_settings_path, load_settings, load_settings_from_path, read_document,
};
