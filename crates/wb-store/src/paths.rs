use std::env;
use std::path::PathBuf;

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "workbench.db";

/// Default base directory for all workbench storage.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".nlp-workbench")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
