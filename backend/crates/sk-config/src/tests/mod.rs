mod config_tree;
mod validation;

use std::env;
use std::path::PathBuf;

use tempfile::TempDir;

/// Minimal document carrying the two required keys.
pub(crate) const MINIMAL_CONFIG: &str = r#"
[servers.api]
addr = "127.0.0.1:8080"

[database]
path = "app.db"
"#;

/// RAII guard for environment variables - automatically restores on drop
pub(crate) struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    pub(crate) fn set(key: &'static str, value: &str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::set_var(key, value);
            Self { key, original }
        }
    }

    pub(crate) fn remove(key: &'static str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::remove_var(key);
            Self { key, original }
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original {
                Some(val) => env::set_var(self.key, val),
                None => env::remove_var(self.key),
            }
        }
    }
}

/// Write `contents` to `config.conf` inside a fresh temp directory.
pub(crate) fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.conf");
    std::fs::write(&path, contents).unwrap();
    (temp, path)
}
