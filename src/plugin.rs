//! Customization prompts supplied by provider plugins
//!
//! Providers are external executables named `agent-provider*`. Each one is
//! asked for prompts by publishing the `agent.interactive-install` event;
//! the reply carries a JSON list of [`PromptDescriptor`]s which is
//! validated into [`Prompt`]s before any page is built from it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Event published to providers when the customization menu opens
pub const INTERACTIVE_INSTALL_EVENT: &str = "agent.interactive-install";

/// File name prefix identifying provider executables
pub const PROVIDER_PREFIX: &str = "agent-provider";

/// Prompt descriptor as sent by providers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptDescriptor {
    /// Dot-separated key path the answer is stored under
    #[serde(rename = "YAMLSection")]
    pub yaml_section: String,
    /// Yes/no prompt instead of free text
    #[serde(rename = "Bool")]
    pub boolean: bool,
    #[serde(rename = "Prompt")]
    pub prompt: String,
    #[serde(rename = "Default")]
    pub default: String,
    #[serde(rename = "AskFirst")]
    pub ask_first: bool,
    #[serde(rename = "AskPrompt")]
    pub ask_prompt: String,
    /// Value used when the operator submits an empty answer
    #[serde(rename = "IfEmpty")]
    pub if_empty: String,
    #[serde(rename = "PlaceHolder")]
    pub placeholder: String,
}

/// Free-text prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPrompt {
    pub key_path: String,
    pub prompt: String,
    pub default: String,
    pub placeholder: String,
    pub if_empty: String,
}

/// Yes/no prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoolPrompt {
    pub key_path: String,
    pub prompt: String,
    pub default: bool,
}

/// Validated prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Text(TextPrompt),
    YesNo(BoolPrompt),
}

impl Prompt {
    /// Key path the answer is stored under
    pub fn key_path(&self) -> &str {
        match self {
            Prompt::Text(p) => &p.key_path,
            Prompt::YesNo(p) => &p.key_path,
        }
    }

    /// Identifier of the page asking this prompt
    pub fn page_id(&self) -> String {
        page_id_for(self.key_path())
    }
}

/// Page identifier for a prompt key path
pub fn page_id_for(key_path: &str) -> String {
    format!("prompt:{}", key_path)
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "yes" | "y" | "1" | "on"
    )
}

impl TryFrom<PromptDescriptor> for Prompt {
    type Error = Error;

    fn try_from(descriptor: PromptDescriptor) -> Result<Self> {
        let key_path = descriptor.yaml_section.trim().to_string();
        if key_path.is_empty() {
            return Err(Error::InvalidPrompt("empty key path".to_string()));
        }
        if key_path.split('.').any(|segment| segment.trim().is_empty()) {
            return Err(Error::InvalidPrompt(format!(
                "key path '{}' has an empty segment",
                key_path
            )));
        }

        let prompt = if descriptor.prompt.is_empty() {
            key_path.clone()
        } else {
            descriptor.prompt
        };

        Ok(if descriptor.boolean {
            Prompt::YesNo(BoolPrompt {
                key_path,
                prompt,
                default: parse_bool(&descriptor.default),
            })
        } else {
            Prompt::Text(TextPrompt {
                key_path,
                prompt,
                default: descriptor.default,
                placeholder: descriptor.placeholder,
                if_empty: descriptor.if_empty,
            })
        })
    }
}

/// Source of customization prompts
pub trait PromptSource {
    /// Ask for the current prompt list
    fn prompts(&self) -> Result<Vec<PromptDescriptor>>;
}

/// Source with no prompts
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPrompts;

impl PromptSource for NoPrompts {
    fn prompts(&self) -> Result<Vec<PromptDescriptor>> {
        Ok(Vec::new())
    }
}

/// Fixed prompt list
#[derive(Debug, Default, Clone)]
pub struct StaticPrompts(pub Vec<PromptDescriptor>);

impl PromptSource for StaticPrompts {
    fn prompts(&self) -> Result<Vec<PromptDescriptor>> {
        Ok(self.0.clone())
    }
}

/// Event handed to providers
#[derive(Debug, Serialize)]
struct ProviderEvent<'a> {
    name: &'a str,
    data: String,
    file: &'a str,
}

/// Payload of the interactive-install event
#[derive(Debug, Default, Serialize)]
struct EventPayload {
    config: String,
}

/// Provider reply
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProviderResponse {
    state: String,
    data: String,
    error: String,
    logs: String,
}

/// Runs provider executables found in a set of directories
#[derive(Debug, Clone)]
pub struct ProviderPrompts {
    dirs: Vec<PathBuf>,
}

impl ProviderPrompts {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Provider executables, sorted by path
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for dir in self.dirs.iter().filter(|d| d.is_dir()) {
            for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(dir = %dir.display(), error = %e, "Cannot read provider directory");
                        continue;
                    }
                };
                let is_provider = entry
                    .file_name()
                    .to_string_lossy()
                    .starts_with(PROVIDER_PREFIX);
                if is_provider && is_executable(entry.path()) {
                    found.push(entry.into_path());
                }
            }
        }
        found.sort();
        found
    }

    /// Publish the event to one provider and decode its prompts
    pub fn ask(&self, provider: &Path) -> Result<Vec<PromptDescriptor>> {
        let event = ProviderEvent {
            name: INTERACTIVE_INSTALL_EVENT,
            data: serde_json::to_string(&EventPayload::default())?,
            file: "",
        };
        let output = Command::new(provider)
            .arg(INTERACTIVE_INSTALL_EVENT)
            .arg(serde_json::to_string(&event)?)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| Error::Plugin {
                plugin: provider.to_path_buf(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(Error::Plugin {
                plugin: provider.to_path_buf(),
                message: format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        let response: ProviderResponse = serde_json::from_slice(&output.stdout)?;
        if !response.logs.is_empty() {
            debug!(provider = %provider.display(), logs = %response.logs, "Provider logs");
        }
        if !response.error.is_empty() {
            return Err(Error::Plugin {
                plugin: provider.to_path_buf(),
                message: response.error,
            });
        }
        debug!(provider = %provider.display(), state = %response.state, "Provider replied");
        decode_prompts(&response.data)
    }
}

impl PromptSource for ProviderPrompts {
    fn prompts(&self) -> Result<Vec<PromptDescriptor>> {
        let mut prompts = Vec::new();
        for provider in self.discover() {
            match self.ask(&provider) {
                Ok(mut found) => {
                    info!(provider = %provider.display(), count = found.len(), "Provider returned prompts");
                    prompts.append(&mut found);
                }
                Err(e) => warn!(provider = %provider.display(), error = %e, "Provider failed"),
            }
        }
        Ok(prompts)
    }
}

/// Decode the `data` field of a provider reply
pub fn decode_prompts(data: &str) -> Result<Vec<PromptDescriptor>> {
    if data.trim().is_empty() || data.trim() == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(data)?)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
