//! Theme values: the base theme supplied before overrides and the resolved
//! theme produced after them share one JSON-shaped representation.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::Path;

use crate::errors::{Result, ThemeError};

/// A theme: ordered top-level sections (`colors`, `fontFamily`, ...) mapped
/// to arbitrary JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Theme {
    sections: Map<String, Value>,
}

/// Theme supplied by the style tool before project overrides are applied
pub type BaseTheme = Theme;

/// Theme after project overrides have been applied
pub type ResolvedTheme = Theme;

impl Theme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a theme from a JSON object
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(sections) => Ok(Self { sections }),
            other => Err(ThemeError::Config {
                message: format!("theme must be an object, found {}", kind_of(&other)),
            }),
        }
    }

    pub fn from_json_str(source: &str) -> Result<Self> {
        Self::from_value(serde_json::from_str(source)?)
    }

    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Self::from_value(serde_yaml::from_str(source)?)
    }

    /// Load a base theme from a JSON or YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ThemeError::Config {
            message: format!("Failed to read theme file {}: {}", path.display(), e),
        })?;

        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(ThemeError::Config {
                message: format!(
                    "Unsupported theme file format: {}. Use .json, .yaml or .yml",
                    path.display()
                ),
            }),
        }
    }

    /// The subset of Tailwind's default theme that project configs usually
    /// touch.
    pub fn tailwind_default() -> Self {
        let value = json!({
            "fontFamily": {
                "sans": [
                    "ui-sans-serif", "system-ui", "sans-serif",
                    "\"Apple Color Emoji\"", "\"Segoe UI Emoji\"",
                    "\"Segoe UI Symbol\"", "\"Noto Color Emoji\""
                ],
                "serif": ["ui-serif", "Georgia", "Cambria", "\"Times New Roman\"", "Times", "serif"],
                "mono": [
                    "ui-monospace", "SFMono-Regular", "Menlo", "Monaco", "Consolas",
                    "\"Liberation Mono\"", "\"Courier New\"", "monospace"
                ]
            },
            "colors": {
                "inherit": "inherit",
                "current": "currentColor",
                "transparent": "transparent",
                "black": "#000000",
                "white": "#ffffff",
                "gray": {
                    "50": "#f9fafb", "100": "#f3f4f6", "200": "#e5e7eb", "300": "#d1d5db",
                    "400": "#9ca3af", "500": "#6b7280", "600": "#4b5563", "700": "#374151",
                    "800": "#1f2937", "900": "#111827", "950": "#030712"
                },
                "red": {
                    "50": "#fef2f2", "100": "#fee2e2", "200": "#fecaca", "300": "#fca5a5",
                    "400": "#f87171", "500": "#ef4444", "600": "#dc2626", "700": "#b91c1c",
                    "800": "#991b1b", "900": "#7f1d1d", "950": "#450a0a"
                },
                "blue": {
                    "50": "#eff6ff", "100": "#dbeafe", "200": "#bfdbfe", "300": "#93c5fd",
                    "400": "#60a5fa", "500": "#3b82f6", "600": "#2563eb", "700": "#1d4ed8",
                    "800": "#1e40af", "900": "#1e3a8a", "950": "#172554"
                }
            },
            "lineHeight": {
                "none": "1",
                "tight": "1.25",
                "snug": "1.375",
                "normal": "1.5",
                "relaxed": "1.625",
                "loose": "2",
                "3": ".75rem",
                "4": "1rem",
                "5": "1.25rem",
                "6": "1.5rem",
                "7": "1.75rem",
                "8": "2rem",
                "9": "2.25rem",
                "10": "2.5rem"
            },
            "spacing": {
                "px": "1px",
                "0": "0px",
                "0.5": "0.125rem",
                "1": "0.25rem",
                "2": "0.5rem",
                "4": "1rem",
                "8": "2rem",
                "16": "4rem"
            }
        });

        match value {
            Value::Object(sections) => Self { sections },
            _ => Self::default(),
        }
    }

    pub fn sections(&self) -> &Map<String, Value> {
        &self.sections
    }

    pub(crate) fn sections_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.sections
    }

    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    pub fn insert_section(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
        self.sections.insert(name.into(), value)
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Look up a value by path segments, e.g. `["spacing", "0.5"]`
    pub fn get_in(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.sections.get(*first)?, |value, key| value.get(*key))
    }

    /// Look up a dotted path such as `colors.primary`. Keys that themselves
    /// contain dots need [`Theme::get_in`].
    pub fn get(&self, path: &str) -> Option<&Value> {
        let segments: Vec<&str> = path.split('.').collect();
        self.get_in(&segments)
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.sections.clone())
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.sections)
    }

    pub fn to_pretty_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_compact_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Recursively merge `other` into `target`. Objects merge key by key with
/// `other` winning; everything else (arrays included) is replaced.
pub(crate) fn deep_merge(target: &mut Value, other: Value) {
    match (target, other) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                match base.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, other) => *slot = other,
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
