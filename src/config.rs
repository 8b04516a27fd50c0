use indexmap::IndexMap;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::errors::{Result, ThemeError};
use crate::theme::deep_merge;

static HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("hex color pattern is valid")
});

/// Project-level Tailwind configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Content globs the external tool scans for class usage
    pub content: Vec<String>,

    /// Theme overrides
    pub theme: ThemeSpec,

    /// Plugin identifiers, recorded but never loaded
    pub plugins: Vec<String>,
}

/// Theme section of a config
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeSpec {
    /// Font stacks by role; each entry replaces the base stack for that role
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub font_family: IndexMap<String, Vec<String>>,

    /// Additive extensions merged into the base theme
    pub extend: ExtendSpec,

    /// Any other top-level section (colors, screens, ...); each entry
    /// replaces the base entry of the same name
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

/// Theme extensions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtendSpec {
    /// Custom colors
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub colors: IndexMap<String, ColorValue>,

    /// Sparse line-height tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_height: Option<IndexMap<String, String>>,

    /// Any other extension section (spacing, borderRadius, ...)
    #[serde(flatten)]
    pub other: IndexMap<String, Value>,
}

/// A color token: a hex string or a nested palette of shades
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Hex(String),
    Palette(IndexMap<String, ColorValue>),
}

impl From<&str> for ColorValue {
    fn from(hex: &str) -> Self {
        ColorValue::Hex(hex.to_string())
    }
}

impl ColorValue {
    fn validate(&self, field: &str) -> Result<()> {
        match self {
            ColorValue::Hex(hex) if is_hex_color(hex) => Ok(()),
            ColorValue::Hex(hex) => Err(ThemeError::shape(
                field,
                format!("`{}` is not a hex color (#RRGGBB)", hex),
            )),
            ColorValue::Palette(shades) => {
                for (shade, value) in shades {
                    value.validate(&format!("{}.{}", field, shade))?;
                }
                Ok(())
            }
        }
    }

    fn merge(&mut self, other: ColorValue) {
        match (self, other) {
            (ColorValue::Palette(base), ColorValue::Palette(shades)) => {
                for (shade, value) in shades {
                    match base.get_mut(&shade) {
                        Some(existing) => existing.merge(value),
                        None => {
                            base.insert(shade, value);
                        }
                    }
                }
            }
            (slot, other) => *slot = other,
        }
    }
}

/// Whether `value` is a `#RGB` or `#RRGGBB` hex color
pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

impl ThemeConfig {
    /// Check the shape invariants: non-empty valid content globs, non-empty
    /// font stacks and hex color leaves.
    pub fn validate(&self) -> Result<()> {
        if self.content.is_empty() {
            return Err(ThemeError::shape(
                "content",
                "at least one content glob is required",
            ));
        }

        for (index, pattern) in self.content.iter().enumerate() {
            let field = format!("content[{}]", index);
            if pattern.trim().is_empty() {
                return Err(ThemeError::shape(field, "glob pattern is blank"));
            }
            glob::Pattern::new(pattern)
                .map_err(|e| ThemeError::shape(field, format!("`{}`: {}", pattern, e)))?;
        }

        for (role, fonts) in &self.theme.font_family {
            let field = format!("theme.fontFamily.{}", role);
            if fonts.is_empty() {
                return Err(ThemeError::shape(field, "font list must not be empty"));
            }
            if fonts.iter().any(|font| font.trim().is_empty()) {
                return Err(ThemeError::shape(field, "font names must not be blank"));
            }
        }

        for (name, color) in &self.theme.extend.colors {
            color.validate(&format!("theme.extend.colors.{}", name))?;
        }

        if let Some(colors) = self.theme.other.get("colors") {
            let colors: IndexMap<String, ColorValue> = serde_json::from_value(colors.clone())
                .map_err(|_| {
                    ThemeError::shape(
                        "theme.colors",
                        "colors must map names to hex strings or palettes",
                    )
                })?;
            for (name, color) in &colors {
                color.validate(&format!("theme.colors.{}", name))?;
            }
        }

        Ok(())
    }

    /// Preferred (first) font for a role, if the config sets one
    pub fn preferred_font(&self, role: &str) -> Option<&str> {
        self.theme
            .font_family
            .get(role)
            .and_then(|fonts| fonts.first())
            .map(String::as_str)
    }

    /// Parse a configuration from a JSON string
    pub fn from_json_str(source: &str) -> Result<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Parse a configuration from a YAML string
    pub fn from_yaml_str(source: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Statically evaluate a `tailwind.config.js` source
    #[cfg(feature = "js")]
    pub fn from_js_str(source: &str, source_name: &str) -> Result<Self> {
        let value = crate::js_config::evaluate_config_source(source, source_name)?;
        Self::from_js_value(value, source_name)
    }

    #[cfg(feature = "js")]
    fn from_js_value(value: Value, source_name: &str) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| ThemeError::JsConfig {
            path: source_name.to_string(),
            message: format!("config object has the wrong shape: {}", e),
        })
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = read_config(path)?;
        serde_yaml::from_str(&content).map_err(|e| ThemeError::Config {
            message: format!("Failed to parse YAML config {}: {}", path.display(), e),
        })
    }

    /// Load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = read_config(path)?;
        serde_json::from_str(&content).map_err(|e| ThemeError::Config {
            message: format!("Failed to parse JSON config {}: {}", path.display(), e),
        })
    }

    /// Load configuration from a `tailwind.config.js` style file
    #[cfg(feature = "js")]
    pub fn from_js_file(path: &Path) -> Result<Self> {
        let value = crate::js_config::evaluate_config_file(path)?;
        Self::from_js_value(value, &path.display().to_string())
    }

    /// Load configuration from a file (auto-detect format)
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config");
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            #[cfg(feature = "js")]
            Some("js") | Some("cjs") | Some("mjs") => Self::from_js_file(path),
            _ => Err(ThemeError::Config {
                message: format!(
                    "Unsupported config file format: {}. Use .js, .cjs, .mjs, .json, .yaml or .yml",
                    path.display()
                ),
            }),
        }
    }

    /// Load a configuration file and check its shape
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Layer `other` on top of this configuration (presets first, project last)
    pub fn merge(mut self, other: Self) -> Self {
        for path in other.content {
            if !self.content.contains(&path) {
                self.content.push(path);
            }
        }

        self.theme.font_family.extend(other.theme.font_family);

        for (section, value) in other.theme.other {
            match (self.theme.other.get_mut(&section), value) {
                (Some(Value::Object(existing)), Value::Object(entries)) => existing.extend(entries),
                (_, value) => {
                    self.theme.other.insert(section, value);
                }
            }
        }

        let extend = &mut self.theme.extend;
        for (name, color) in other.theme.extend.colors {
            match extend.colors.get_mut(&name) {
                Some(existing) => existing.merge(color),
                None => {
                    extend.colors.insert(name, color);
                }
            }
        }

        if let Some(line_height) = other.theme.extend.line_height {
            extend
                .line_height
                .get_or_insert_with(IndexMap::new)
                .extend(line_height);
        }

        for (section, value) in other.theme.extend.other {
            match extend.other.get_mut(&section) {
                Some(existing) => deep_merge(existing, value),
                None => {
                    extend.other.insert(section, value);
                }
            }
        }

        for plugin in other.plugins {
            if !self.plugins.contains(&plugin) {
                self.plugins.push(plugin);
            }
        }

        self
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| ThemeError::Config {
        message: format!("Failed to read config file {}: {}", path.display(), e),
    })
}
