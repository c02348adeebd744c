//! Temporary workspace fixtures for e2e tests.

use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static WORKSPACE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Config that keeps user settings inside the workspace.
const WORKSPACE_CONFIG: &str = "[settings]\nuser_path = \"user/settings.json\"\n";

pub struct TempWorkspace {
    pub root: PathBuf,
}

impl TempWorkspace {
    pub fn new() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let counter = WORKSPACE_COUNTER.fetch_add(1, Ordering::SeqCst);

        let root =
            std::env::temp_dir().join(format!("fontshortcuts_e2e_{}_{}", timestamp, counter));

        fs::create_dir_all(&root).expect("Failed to create temp workspace");

        let workspace = Self { root };
        workspace.create_file("fontshortcuts.toml", WORKSPACE_CONFIG);
        workspace
    }

    /// Workspace whose user settings file starts with `settings`.
    pub fn with_user_settings(settings: &str) -> Self {
        let workspace = Self::new();
        workspace.create_file("user/settings.json", settings);
        workspace
    }

    pub fn create_file(&self, relative_path: &str, content: &str) -> PathBuf {
        let path = self.root.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).ok();
        }
        fs::write(&path, content).unwrap();
        path
    }

    pub fn read_file(&self, relative_path: &str) -> Option<String> {
        fs::read_to_string(self.root.join(relative_path)).ok()
    }

    pub fn read_json(&self, relative_path: &str) -> Option<Value> {
        self.read_file(relative_path)
            .and_then(|content| serde_json::from_str(&content).ok())
    }
}

impl Drop for TempWorkspace {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}
