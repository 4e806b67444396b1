//! Validation of uploads against a field's `rules` option.
//!
//! Rules are written pipe-delimited (`"required|image|max:2048"`) or as a
//! list. [`RuleValidator`] is the default [`Validator`]; hosts with their own
//! validation layer plug it in through the trait instead.

use std::path::Path;

use imageup_common::paths::{is_image_file, same_extension};
use imageup_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::request::UploadedFile;

/// A field's validation rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rules {
    Piped(String),
    List(Vec<String>),
}

impl Rules {
    /// Individual rule strings, trimmed, empties dropped.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let parts: Vec<&str> = match self {
            Self::Piped(rules) => rules.split('|').collect(),
            Self::List(rules) => rules.iter().map(String::as_str).collect(),
        };
        parts.into_iter().map(str::trim).filter(|r| !r.is_empty())
    }
}

impl From<&str> for Rules {
    fn from(rules: &str) -> Self {
        Self::Piped(rules.to_string())
    }
}

impl From<String> for Rules {
    fn from(rules: String) -> Self {
        Self::Piped(rules)
    }
}

impl From<Vec<String>> for Rules {
    fn from(rules: Vec<String>) -> Self {
        Self::List(rules)
    }
}

/// Checks an upload against a field's rules.
pub trait Validator: Send + Sync {
    /// Fails with [`Error::Validation`] when any rule is violated.
    fn validate(&self, field: &str, file: &UploadedFile, rules: &Rules) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct DimensionBounds {
    min_width: Option<u32>,
    max_width: Option<u32>,
    min_height: Option<u32>,
    max_height: Option<u32>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Rule {
    Required,
    File,
    Image,
    Mimes(Vec<String>),
    Max(u64),
    Min(u64),
    Size(u64),
    Dimensions(DimensionBounds),
}

impl std::str::FromStr for Rule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (s.trim(), None),
        };

        let kilobytes = |arg: Option<&str>| -> Result<u64> {
            arg.and_then(|a| a.parse().ok())
                .ok_or_else(|| Error::config(format!("rule `{s}` needs a size in kilobytes")))
        };

        match name.to_lowercase().as_str() {
            "required" => Ok(Self::Required),
            "file" => Ok(Self::File),
            "image" => Ok(Self::Image),
            "mimes" => {
                let exts: Vec<String> = arg
                    .unwrap_or_default()
                    .split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect();
                if exts.is_empty() {
                    return Err(Error::config(format!("rule `{s}` lists no extensions")));
                }
                Ok(Self::Mimes(exts))
            }
            "max" => Ok(Self::Max(kilobytes(arg)?)),
            "min" => Ok(Self::Min(kilobytes(arg)?)),
            "size" => Ok(Self::Size(kilobytes(arg)?)),
            "dimensions" => parse_dimensions(s, arg.unwrap_or_default()).map(Self::Dimensions),
            _ => Err(Error::config(format!("unknown validation rule `{s}`"))),
        }
    }
}

fn parse_dimensions(rule: &str, arg: &str) -> Result<DimensionBounds> {
    let mut bounds = DimensionBounds::default();

    for pair in arg.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::config(format!("malformed constraint `{pair}` in `{rule}`")))?;
        let value: u32 = value
            .trim()
            .parse()
            .map_err(|_| Error::config(format!("constraint `{pair}` in `{rule}` is not a number")))?;

        let slot = match key.trim() {
            "min_width" => &mut bounds.min_width,
            "max_width" => &mut bounds.max_width,
            "min_height" => &mut bounds.min_height,
            "max_height" => &mut bounds.max_height,
            "width" => &mut bounds.width,
            "height" => &mut bounds.height,
            other => {
                return Err(Error::config(format!(
                    "unknown dimension constraint `{other}` in `{rule}`"
                )))
            }
        };
        *slot = Some(value);
    }

    Ok(bounds)
}

/// Default validator understanding a small, common rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleValidator;

impl RuleValidator {
    pub fn new() -> Self {
        Self
    }

    fn check(&self, field: &str, file: &UploadedFile, rule: &Rule) -> Option<String> {
        let bytes = file.size() as u64;

        match rule {
            Rule::Required if file.size() == 0 => Some(format!("The {field} field is required.")),
            Rule::Required | Rule::File => None,
            Rule::Image if !is_image(file) => Some(format!("The {field} must be an image.")),
            Rule::Image => None,
            Rule::Mimes(exts) => {
                let ext = file.extension().unwrap_or_default();
                if exts.iter().any(|allowed| same_extension(allowed, &ext)) {
                    None
                } else {
                    Some(format!(
                        "The {field} must be a file of type: {}.",
                        exts.join(", ")
                    ))
                }
            }
            Rule::Max(max) if bytes > max.saturating_mul(1024) => Some(format!(
                "The {field} may not be greater than {max} kilobytes."
            )),
            Rule::Min(min) if bytes < min.saturating_mul(1024) => {
                Some(format!("The {field} must be at least {min} kilobytes."))
            }
            Rule::Size(size) if bytes != size.saturating_mul(1024) => {
                Some(format!("The {field} must be {size} kilobytes."))
            }
            Rule::Max(_) | Rule::Min(_) | Rule::Size(_) => None,
            Rule::Dimensions(bounds) => match image::load_from_memory(file.data()) {
                Ok(img) if within(bounds, img.width(), img.height()) => None,
                _ => Some(format!("The {field} has invalid image dimensions.")),
            },
        }
    }
}

fn is_image(file: &UploadedFile) -> bool {
    if image::guess_format(file.data()).is_ok() {
        return true;
    }
    is_image_file(Path::new(file.original_name()))
}

fn within(bounds: &DimensionBounds, width: u32, height: u32) -> bool {
    bounds.min_width.map_or(true, |v| width >= v)
        && bounds.max_width.map_or(true, |v| width <= v)
        && bounds.min_height.map_or(true, |v| height >= v)
        && bounds.max_height.map_or(true, |v| height <= v)
        && bounds.width.map_or(true, |v| width == v)
        && bounds.height.map_or(true, |v| height == v)
}

impl Validator for RuleValidator {
    fn validate(&self, field: &str, file: &UploadedFile, rules: &Rules) -> Result<()> {
        let parsed = rules
            .iter()
            .map(str::parse::<Rule>)
            .collect::<Result<Vec<_>>>()?;

        let messages: Vec<String> = parsed
            .iter()
            .filter_map(|rule| self.check(field, file, rule))
            .collect();

        if messages.is_empty() {
            Ok(())
        } else {
            tracing::debug!(field, violations = messages.len(), "upload failed validation");
            Err(Error::validation(field, messages))
        }
    }
}
