//! Operator choices collected across the wizard
//!
//! A single [`Session`] is created at startup and handed by `&mut` to
//! every page. Each field has one owning page; writes happen on confirmed
//! submission only. Once the installer is launched the session is frozen
//! and further writes are refused.

use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Operator choices and shared infrastructure
#[derive(Debug, Default)]
pub struct Session {
    device: String,
    username: String,
    password: String,
    ssh_keys: Vec<String>,
    extra_fields: Map<String, Value>,
    log_path: Option<PathBuf>,
    frozen: bool,
}

impl Session {
    /// Create an empty session
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session that records where its log goes
    pub fn with_log_path(log_path: PathBuf) -> Self {
        Self {
            log_path: Some(log_path),
            ..Self::default()
        }
    }

    /// Persistent log location, if any
    pub fn log_path(&self) -> Option<&PathBuf> {
        self.log_path.as_ref()
    }

    /// Target device, empty until chosen
    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn ssh_keys(&self) -> &[String] {
        &self.ssh_keys
    }

    /// Plugin-contributed values as a nested mapping
    pub fn extra_fields(&self) -> &Map<String, Value> {
        &self.extra_fields
    }

    /// Both username and password are set
    pub fn has_credentials(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }

    pub fn has_ssh_keys(&self) -> bool {
        !self.ssh_keys.is_empty()
    }

    /// Whether the installer has taken ownership of the session
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Make the session read-only for the rest of the run
    pub fn freeze(&mut self) {
        if !self.frozen {
            info!(device = %self.device, user = %self.username, "Session frozen for installation");
        }
        self.frozen = true;
    }

    fn writable(&self, field: &str) -> bool {
        if self.frozen {
            warn!(field, "Ignoring write to frozen session");
        }
        !self.frozen
    }

    /// Set (or clear, with an empty string) the target device
    pub fn set_device(&mut self, device: impl Into<String>) {
        if self.writable("device") {
            self.device = device.into();
            info!(device = %self.device, "Selected disk");
        }
    }

    /// Store the credential pair. Both values must be non-empty.
    pub fn set_credentials(&mut self, username: impl Into<String>, password: impl Into<String>) -> bool {
        let (username, password) = (username.into(), password.into());
        if username.is_empty() || password.is_empty() {
            warn!("Refusing partial credentials");
            return false;
        }
        if !self.writable("credentials") {
            return false;
        }
        info!(user = %username, "User configured");
        self.username = username;
        self.password = password;
        true
    }

    pub fn add_ssh_key(&mut self, key: impl Into<String>) {
        if self.writable("ssh_keys") {
            self.ssh_keys.push(key.into());
            debug!(count = self.ssh_keys.len(), "SSH key added");
        }
    }

    /// Remove the key at `index`, returning it
    pub fn remove_ssh_key(&mut self, index: usize) -> Option<String> {
        if index >= self.ssh_keys.len() || !self.writable("ssh_keys") {
            return None;
        }
        Some(self.ssh_keys.remove(index))
    }

    /// Store `value` under a dot-separated key path.
    ///
    /// `a.b` ends up as `{a: {b: value}}`. Non-mapping values found on the
    /// way are replaced by mappings.
    pub fn set_path(&mut self, path: &str, value: Value) {
        if !self.writable(path) {
            return;
        }
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(last) = segments.pop() else {
            return;
        };

        let mut current = &mut self.extra_fields;
        for segment in segments {
            let entry = current
                .entry(segment.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            current = match entry {
                Value::Object(map) => map,
                _ => return,
            };
        }
        current.insert(last.to_string(), value);
        debug!(path, fields = %serde_json::Value::Object(self.extra_fields.clone()), "Extra field stored");
    }

    /// Look up a dot-separated key path
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.extra_fields.get(first)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_path() {
        let mut session = Session::new();
        session.set_path("network.token", json!("abc"));
        session.set_path("network.enabled", json!(true));
        session.set_path("hostname", json!("node-1"));

        assert_eq!(
            Value::Object(session.extra_fields().clone()),
            json!({"network": {"token": "abc", "enabled": true}, "hostname": "node-1"})
        );
        assert_eq!(session.get_path("network.token"), Some(&json!("abc")));
        assert_eq!(session.get_path("network.missing"), None);
    }

    #[test]
    fn test_scalar_replaced_by_mapping() {
        let mut session = Session::new();
        session.set_path("k3s", json!("yes"));
        session.set_path("k3s.enabled", json!(true));
        assert_eq!(session.get_path("k3s"), Some(&json!({"enabled": true})));
    }

    #[test]
    fn test_credentials_both_or_nothing() {
        let mut session = Session::new();
        assert!(!session.set_credentials("admin", ""));
        assert!(!session.has_credentials());
        assert!(session.set_credentials("admin", "secret"));
        assert!(session.has_credentials());
    }

    #[test]
    fn test_frozen_session_rejects_writes() {
        let mut session = Session::new();
        session.set_device("/dev/sda");
        session.freeze();

        session.set_device("/dev/sdb");
        session.add_ssh_key("github:someone");
        session.set_path("a.b", json!(1));
        assert!(!session.set_credentials("admin", "secret"));

        assert_eq!(session.device(), "/dev/sda");
        assert!(session.ssh_keys().is_empty());
        assert!(session.extra_fields().is_empty());
    }

    #[test]
    fn test_ssh_keys_keep_order_and_duplicates() {
        let mut session = Session::new();
        session.add_ssh_key("github:a");
        session.add_ssh_key("github:b");
        session.add_ssh_key("github:a");
        assert_eq!(session.ssh_keys(), ["github:a", "github:b", "github:a"]);

        assert_eq!(session.remove_ssh_key(1).as_deref(), Some("github:b"));
        assert_eq!(session.remove_ssh_key(5), None);
        assert_eq!(session.ssh_keys(), ["github:a", "github:a"]);
    }
}
