//! Install configuration document
//!
//! Turns the final [`Session`] into the cloud-config document consumed by
//! the installer.

use crate::error::Result;
use crate::session::Session;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;
use tracing::info;

/// Header expected by the installer on the first line of the document
pub const CLOUD_CONFIG_HEADER: &str = "#cloud-config";

/// Stage running before networking is available
pub const STAGE_INITRAMFS: &str = "initramfs";

/// Stage running once networking is up, needed to fetch remote keys
pub const STAGE_NETWORK: &str = "network";

/// Stage that creates the user account.
///
/// Keys such as `github:user` are resolved over the network, so the user
/// block moves to the network stage as soon as any key is present.
pub fn user_stage(session: &Session) -> &'static str {
    if session.has_ssh_keys() {
        STAGE_NETWORK
    } else {
        STAGE_INITRAMFS
    }
}

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn user_block(session: &Session) -> Value {
    let mut user = Mapping::new();
    user.insert(key("passwd"), key(session.password()));
    user.insert(
        key("groups"),
        Value::Sequence(vec![key("admin")]),
    );
    user.insert(
        key("ssh_authorized_keys"),
        Value::Sequence(session.ssh_keys().iter().map(|k| key(k)).collect()),
    );

    let mut users = Mapping::new();
    users.insert(key(session.username()), Value::Mapping(user));

    let mut step = Mapping::new();
    step.insert(key("name"), key("Set user and password"));
    step.insert(key("users"), Value::Mapping(users));
    Value::Sequence(vec![Value::Mapping(step)])
}

/// Recursively merge `overlay` into `base`; overlay leaves win
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base), Value::Mapping(overlay)) => {
            for (k, v) in overlay {
                match base.get_mut(&k) {
                    Some(existing) => merge(existing, v),
                    None => {
                        base.insert(k, v);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Build the configuration document for `session`
pub fn build_document(session: &Session) -> Result<Value> {
    let mut install = Mapping::new();
    install.insert(key("device"), key(session.device()));

    let mut root = Mapping::new();
    if session.has_credentials() {
        let mut stages = Mapping::new();
        stages.insert(key(user_stage(session)), user_block(session));
        root.insert(key("install"), Value::Mapping(install));
        root.insert(key("stages"), Value::Mapping(stages));
    } else {
        install.insert(key("skip_user_validation"), Value::Bool(true));
        root.insert(key("install"), Value::Mapping(install));
    }

    let mut document = Value::Mapping(root);
    let extra = serde_yaml::to_value(session.extra_fields())?;
    merge(&mut document, extra);
    Ok(document)
}

/// Render the document with its cloud-config header
pub fn render_document(session: &Session) -> Result<String> {
    let body = serde_yaml::to_string(&build_document(session)?)?;
    Ok(format!(
        "{}\n# Generated by interactive-installer on {}\n{}",
        CLOUD_CONFIG_HEADER,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        body
    ))
}

/// Write the configuration document to `path`
pub fn write_document(session: &Session, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, render_document(session)?)?;
    info!(path = %path.display(), "Install configuration written");
    Ok(())
}
