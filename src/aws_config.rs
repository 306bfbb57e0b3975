// AWS credentials and config file writer
use crate::config::restrict_permissions;
use crate::error::{AuthError, Result};
use crate::models::CloudCredentials;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// `~/.aws/credentials` and `~/.aws/config` for one directory
pub struct AwsFiles {
    dir: PathBuf,
}

impl AwsFiles {
    pub fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
        }
    }

    pub fn credentials_file_path(&self) -> PathBuf {
        self.dir.join("credentials")
    }

    pub fn config_file_path(&self) -> PathBuf {
        self.dir.join("config")
    }

    /// Write the key triple under `[profile]`, leaving other sections alone
    pub fn write_credentials(&self, profile: &str, creds: &CloudCredentials) -> Result<()> {
        let path = self.credentials_file_path();
        update_file(
            &path,
            profile,
            &[
                ("aws_access_key_id", creds.access_key_id.as_str()),
                ("aws_secret_access_key", creds.secret_access_key.as_str()),
                ("aws_session_token", creds.session_token.as_str()),
            ],
        )?;
        restrict_permissions(&path)?;

        tracing::debug!("Wrote credentials for [{}] to {}", profile, path.display());
        Ok(())
    }

    /// Set `region` for the profile in the config file
    pub fn write_region(&self, profile: &str, region: &str) -> Result<()> {
        let path = self.config_file_path();
        update_file(&path, &config_section_name(profile), &[("region", region)])?;

        tracing::debug!("Wrote region {} for {} to {}", region, profile, path.display());
        Ok(())
    }
}

/// The config file names non-default profiles `[profile NAME]`
fn config_section_name(profile: &str) -> String {
    if profile == "default" {
        profile.to_string()
    } else {
        format!("profile {}", profile)
    }
}

fn update_file(path: &Path, section: &str, entries: &[(&str, &str)]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| {
                AuthError::ConfigError(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }
    }

    let existing = if path.exists() {
        fs::read_to_string(path).map_err(|e| {
            AuthError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?
    } else {
        String::new()
    };

    fs::write(path, upsert_section(&existing, section, entries)).map_err(|e| {
        AuthError::ConfigError(format!("Failed to write {}: {}", path.display(), e))
    })
}

fn section_header(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    trimmed
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .map(str::trim)
}

fn line_key(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.starts_with('#') || trimmed.starts_with(';') {
        return None;
    }
    trimmed.split_once('=').map(|(key, _)| key.trim())
}

/// Replace or append `entries` inside `[section]`; the section is appended if absent.
/// Keys already present keep their position, new keys go at the end of the section.
fn upsert_section(content: &str, section: &str, entries: &[(&str, &str)]) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut written: HashSet<&str> = HashSet::new();
    let mut in_section = false;
    let mut section_found = false;

    let flush_missing = |lines: &mut Vec<String>, written: &HashSet<&str>| {
        // keep trailing blank lines after the new keys
        let blanks = lines.iter().rev().take_while(|l| l.trim().is_empty()).count();
        let at = lines.len() - blanks;
        let missing: Vec<String> = entries
            .iter()
            .filter(|(key, _)| !written.contains(key))
            .map(|(key, value)| format!("{} = {}", key, value))
            .collect();
        lines.splice(at..at, missing);
    };

    for line in content.lines() {
        if let Some(name) = section_header(line) {
            if in_section {
                flush_missing(&mut lines, &written);
            }
            in_section = name == section;
            section_found |= in_section;
            lines.push(line.to_string());
            continue;
        }

        if in_section {
            if let Some((key, value)) = line_key(line)
                .and_then(|key| entries.iter().find(|(k, _)| *k == key))
                .copied()
            {
                if written.insert(key) {
                    lines.push(format!("{} = {}", key, value));
                }
                continue;
            }
        }

        lines.push(line.to_string());
    }

    if in_section {
        flush_missing(&mut lines, &written);
    }

    if !section_found {
        if lines.last().is_some_and(|l| !l.trim().is_empty()) {
            lines.push(String::new());
        }
        lines.push(format!("[{}]", section));
        lines.extend(
            entries
                .iter()
                .map(|(key, value)| format!("{} = {}", key, value)),
        );
    }

    let mut result = lines.join("\n");
    result.push('\n');
    result
}
