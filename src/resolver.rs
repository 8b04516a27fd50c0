use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::config::ThemeConfig;
use crate::errors::Result;
use crate::theme::{BaseTheme, ResolvedTheme, Theme};

/// How a leaf of the resolved theme relates to the base theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// The path did not exist in the base theme
    Added,
    /// The path existed with a different value
    Overridden,
    /// The override wrote the value the base already had
    Unchanged,
}

/// One leaf written by the resolver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeChange {
    pub path: Vec<String>,
    pub kind: ChangeKind,
}

impl ThemeChange {
    /// Dotted form of the path, e.g. `colors.primary`
    pub fn path_string(&self) -> String {
        self.path.join(".")
    }

    pub fn section(&self) -> &str {
        self.path.first().map(String::as_str).unwrap_or_default()
    }
}

/// Output of a resolution: the theme plus the leaves that were written
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub theme: ResolvedTheme,
    pub changes: Vec<ThemeChange>,
}

impl Resolution {
    pub fn count(&self, kind: ChangeKind) -> usize {
        self.changes.iter().filter(|c| c.kind == kind).count()
    }

    /// Paths whose value differs from the base theme
    pub fn changed_paths(&self) -> Vec<String> {
        self.changes
            .iter()
            .filter(|c| c.kind != ChangeKind::Unchanged)
            .map(ThemeChange::path_string)
            .collect()
    }
}

/// Resolves project configs against a fixed base theme
#[derive(Debug, Clone, Default)]
pub struct ThemeResolver {
    base: BaseTheme,
}

impl ThemeResolver {
    pub fn new(base: BaseTheme) -> Self {
        Self { base }
    }

    /// Resolver over the bundled Tailwind defaults
    pub fn tailwind_default() -> Self {
        Self::new(Theme::tailwind_default())
    }

    pub fn base(&self) -> &BaseTheme {
        &self.base
    }

    /// Validate `config` and apply it on top of the base theme
    pub fn resolve(&self, config: &ThemeConfig) -> Result<Resolution> {
        resolve_with_changes(&self.base, config)
    }
}

/// Apply `config` to `base` and return only the resolved theme
pub fn resolve_theme(base: &BaseTheme, config: &ThemeConfig) -> Result<ResolvedTheme> {
    Ok(resolve_with_changes(base, config)?.theme)
}

/// Apply `config` to `base`.
///
/// Top-level theme sections (`fontFamily`, `colors`, `screens`, ...) replace
/// the base entry of the same name wholesale. Extension sections merge
/// recursively: objects key by key with the override winning, arrays and
/// scalars replaced. Keys the config does not mention keep their base value.
pub fn resolve_with_changes(base: &BaseTheme, config: &ThemeConfig) -> Result<Resolution> {
    config.validate()?;

    let mut theme = base.clone();
    let mut changes = Vec::new();

    for (name, overrides, mode) in override_sections(config)? {
        debug!(section = %name, ?mode, "applying theme section");
        apply_section(theme.sections_mut(), &name, overrides, mode, &mut changes);
    }

    debug!(
        changes = changes.len(),
        sections = theme.len(),
        "theme resolved"
    );

    Ok(Resolution { theme, changes })
}

/// How a section's entries are written over the base section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MergeMode {
    /// Each entry replaces the base entry of the same name
    Replace,
    /// Entries merge recursively into the base entry
    Extend,
}

/// Sections to apply, in order: top-level sections first, then extensions.
fn override_sections(config: &ThemeConfig) -> Result<Vec<(String, Value, MergeMode)>> {
    let mut sections = Vec::new();
    let spec = &config.theme;

    if !spec.font_family.is_empty() {
        sections.push((
            "fontFamily".to_string(),
            serde_json::to_value(&spec.font_family)?,
            MergeMode::Replace,
        ));
    }
    for (name, value) in &spec.other {
        sections.push((name.clone(), value.clone(), MergeMode::Replace));
    }

    let extend = &spec.extend;
    if !extend.colors.is_empty() {
        sections.push((
            "colors".to_string(),
            serde_json::to_value(&extend.colors)?,
            MergeMode::Extend,
        ));
    }
    if let Some(line_height) = &extend.line_height {
        sections.push((
            "lineHeight".to_string(),
            serde_json::to_value(line_height)?,
            MergeMode::Extend,
        ));
    }
    for (name, value) in &extend.other {
        sections.push((name.clone(), value.clone(), MergeMode::Extend));
    }

    Ok(sections)
}

fn apply_section(
    sections: &mut Map<String, Value>,
    name: &str,
    overrides: Value,
    mode: MergeMode,
    changes: &mut Vec<ThemeChange>,
) {
    let mut path = vec![name.to_string()];
    match sections.get_mut(name) {
        Some(existing) => match mode {
            MergeMode::Extend => merge_tracked(existing, overrides, &mut path, changes),
            MergeMode::Replace => replace_entries(existing, overrides, &mut path, changes),
        },
        None => {
            record_leaves(&overrides, &mut path, ChangeKind::Added, changes);
            sections.insert(name.to_string(), overrides);
        }
    }
}

fn replace_entries(
    target: &mut Value,
    overrides: Value,
    path: &mut Vec<String>,
    changes: &mut Vec<ThemeChange>,
) {
    match (target, overrides) {
        (Value::Object(base), Value::Object(entries)) => {
            for (key, value) in entries {
                path.push(key.clone());
                match base.get_mut(&key) {
                    Some(existing) => write_leaf(existing, value, path, changes),
                    None => {
                        record_leaves(&value, path, ChangeKind::Added, changes);
                        base.insert(key, value);
                    }
                }
                path.pop();
            }
        }
        (slot, value) => write_leaf(slot, value, path, changes),
    }
}

fn merge_tracked(
    target: &mut Value,
    overrides: Value,
    path: &mut Vec<String>,
    changes: &mut Vec<ThemeChange>,
) {
    match (target, overrides) {
        (Value::Object(base), Value::Object(overrides)) => {
            for (key, value) in overrides {
                path.push(key.clone());
                match base.get_mut(&key) {
                    Some(existing) => merge_tracked(existing, value, path, changes),
                    None => {
                        record_leaves(&value, path, ChangeKind::Added, changes);
                        base.insert(key, value);
                    }
                }
                path.pop();
            }
        }
        (slot, value) => write_leaf(slot, value, path, changes),
    }
}

fn write_leaf(slot: &mut Value, value: Value, path: &[String], changes: &mut Vec<ThemeChange>) {
    let kind = if *slot == value {
        ChangeKind::Unchanged
    } else {
        ChangeKind::Overridden
    };
    trace!(path = ?path, ?kind, "leaf written");
    changes.push(ThemeChange {
        path: path.to_vec(),
        kind,
    });
    *slot = value;
}

fn record_leaves(
    value: &Value,
    path: &mut Vec<String>,
    kind: ChangeKind,
    changes: &mut Vec<ThemeChange>,
) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (key, child) in map {
                path.push(key.clone());
                record_leaves(child, path, kind, changes);
                path.pop();
            }
        }
        _ => changes.push(ThemeChange {
            path: path.clone(),
            kind,
        }),
    }
}
