//! Input files: the comment batch and the attribute list, both JSON.

use std::fs;
use std::path::Path;

use anyhow::Context;
use revrate_core::{Attribute, Comment};

/// Load comments from a JSON array of `{id, title, body}` records.
pub fn load_comments(path: &Path) -> anyhow::Result<Vec<Comment>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading comments file {}", path.display()))?;
    let comments: Vec<Comment> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing comments file {}", path.display()))?;
    Ok(comments)
}

/// Load the attribute list from a JSON array of `{name, category}` records.
pub fn load_attributes(path: &Path) -> anyhow::Result<Vec<Attribute>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading attributes file {}", path.display()))?;
    let attributes: Vec<Attribute> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing attributes file {}", path.display()))?;
    Ok(attributes)
}
