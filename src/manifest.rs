use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resolver::{ChangeKind, Resolution, ThemeChange};

/// Metadata for the resolution manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Version of the manifest format
    pub version: String,

    /// Timestamp when the manifest was generated
    pub generated_at: DateTime<Utc>,

    /// Config file the theme was resolved from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_source: Option<String>,

    /// Preset configs layered underneath, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub presets: Vec<String>,

    /// Base theme file, or `None` for the bundled defaults
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_theme: Option<String>,

    /// Content globs handed to the style tool
    pub content: Vec<String>,

    /// Plugin identifiers declared by the config
    pub plugins: Vec<String>,

    /// Resolver version
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolver_version: Option<String>,
}

/// Complete manifest structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionManifest {
    /// Metadata about the resolution
    pub metadata: ManifestMetadata,

    /// Every leaf written by the resolver, in write order. Paths are kept as
    /// segment arrays since theme keys may contain dots (`spacing."0.5"`).
    pub changes: Vec<ThemeChange>,

    /// Statistics about the resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ManifestStatistics>,
}

/// Statistics about the resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestStatistics {
    /// Number of top-level sections in the resolved theme
    pub sections: usize,

    pub added: usize,

    pub overridden: usize,

    pub unchanged: usize,

    /// Sections ordered by how many leaves the config wrote into them
    pub touched_sections: Vec<SectionSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionSummary {
    pub name: String,
    pub changes: usize,
}

impl ResolutionManifest {
    /// Create a new manifest with default metadata
    pub fn new() -> Self {
        Self {
            metadata: ManifestMetadata {
                version: "1.0.0".to_string(),
                generated_at: Utc::now(),
                config_source: None,
                presets: Vec::new(),
                base_theme: None,
                content: Vec::new(),
                plugins: Vec::new(),
                resolver_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            },
            changes: Vec::new(),
            statistics: None,
        }
    }

    /// Record a change; a later write to the same path replaces the earlier one
    pub fn record_change(&mut self, path: Vec<String>, kind: ChangeKind) {
        match self.changes.iter_mut().find(|change| change.path == path) {
            Some(change) => change.kind = kind,
            None => self.changes.push(ThemeChange { path, kind }),
        }
    }

    /// Kind recorded for a path given as segments
    pub fn change(&self, path: &[&str]) -> Option<ChangeKind> {
        self.changes
            .iter()
            .find(|change| change.path.iter().map(String::as_str).eq(path.iter().copied()))
            .map(|change| change.kind)
    }

    /// Calculate and set statistics
    pub fn calculate_statistics(&mut self, section_count: usize) {
        let mut per_section: IndexMap<String, usize> = IndexMap::new();
        for change in &self.changes {
            *per_section.entry(change.section().to_string()).or_insert(0) += 1;
        }

        let mut touched_sections: Vec<_> = per_section
            .into_iter()
            .map(|(name, changes)| SectionSummary { name, changes })
            .collect();
        // Stable sort keeps first-touched order among equal counts
        touched_sections.sort_by(|a, b| b.changes.cmp(&a.changes));

        let count = |kind| self.changes.iter().filter(|c| c.kind == kind).count();

        self.statistics = Some(ManifestStatistics {
            sections: section_count,
            added: count(ChangeKind::Added),
            overridden: count(ChangeKind::Overridden),
            unchanged: count(ChangeKind::Unchanged),
            touched_sections,
        });
    }

    /// Convert manifest to JSON value
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::json!({}))
    }

    /// Convert manifest to pretty JSON string
    pub fn to_pretty_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Convert manifest to compact JSON string
    pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Default for ResolutionManifest {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder pattern for creating manifests
pub struct ManifestBuilder {
    manifest: ResolutionManifest,
    section_count: usize,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self {
            manifest: ResolutionManifest::new(),
            section_count: 0,
        }
    }

    pub fn with_config_source(mut self, source: impl Into<String>) -> Self {
        self.manifest.metadata.config_source = Some(source.into());
        self
    }

    pub fn with_presets(mut self, presets: Vec<String>) -> Self {
        self.manifest.metadata.presets = presets;
        self
    }

    pub fn with_base_theme(mut self, base: impl Into<String>) -> Self {
        self.manifest.metadata.base_theme = Some(base.into());
        self
    }

    /// Copy content globs and plugins from the applied config
    pub fn with_config(mut self, config: &crate::config::ThemeConfig) -> Self {
        self.manifest.metadata.content = config.content.clone();
        self.manifest.metadata.plugins = config.plugins.clone();
        self
    }

    /// Record every change of a resolution
    pub fn with_resolution(mut self, resolution: &Resolution) -> Self {
        for change in &resolution.changes {
            self.manifest.record_change(change.path.clone(), change.kind);
        }
        self.section_count = resolution.theme.len();
        self
    }

    /// Build the final manifest with statistics
    pub fn build(mut self) -> ResolutionManifest {
        self.manifest.calculate_statistics(self.section_count);
        self.manifest
    }
}

impl Default for ManifestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ThemeConfig;
    use crate::resolver::ThemeResolver;

    #[test]
    fn test_manifest_creation() {
        let manifest = ResolutionManifest::new();
        assert_eq!(manifest.metadata.version, "1.0.0");
        assert!(manifest.changes.is_empty());
        assert!(manifest.statistics.is_none());
    }

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_record_change_keeps_last_kind() {
        let mut manifest = ResolutionManifest::new();
        manifest.record_change(path(&["colors", "primary"]), ChangeKind::Added);
        manifest.record_change(path(&["colors", "primary"]), ChangeKind::Overridden);
        assert_eq!(manifest.changes.len(), 1);
        assert_eq!(manifest.change(&["colors", "primary"]), Some(ChangeKind::Overridden));
    }

    #[test]
    fn test_dotted_keys_do_not_collide_with_nested_paths() {
        let mut manifest = ResolutionManifest::new();
        manifest.record_change(path(&["spacing", "0.5"]), ChangeKind::Overridden);
        manifest.record_change(path(&["spacing", "0", "5"]), ChangeKind::Added);
        manifest.calculate_statistics(1);

        assert_eq!(manifest.changes.len(), 2);
        assert_eq!(manifest.change(&["spacing", "0.5"]), Some(ChangeKind::Overridden));
        assert_eq!(manifest.change(&["spacing", "0", "5"]), Some(ChangeKind::Added));
        let stats = manifest.statistics.as_ref().unwrap();
        assert_eq!(stats.touched_sections[0].name, "spacing");
        assert_eq!(stats.touched_sections[0].changes, 2);

        let json = manifest.to_json();
        assert_eq!(json["changes"][0]["path"], serde_json::json!(["spacing", "0.5"]));
        assert_eq!(json["changes"][1]["path"], serde_json::json!(["spacing", "0", "5"]));
    }

    #[test]
    fn test_manifest_builder() {
        let config = ThemeConfig::from_json_str(
            r##"{
                "content": ["*.html"],
                "theme": {
                    "fontFamily": { "sans": ["Rock Salt"] },
                    "extend": {
                        "colors": { "primary": "#FCA5A5", "red": { "300": "#fca5a5" } },
                        "lineHeight": { "0": "0", "4": "1rem" }
                    }
                },
                "plugins": ["forms"]
            }"##,
        )
        .unwrap();
        let resolution = ThemeResolver::tailwind_default().resolve(&config).unwrap();

        let manifest = ManifestBuilder::new()
            .with_config_source("tailwind.config.json")
            .with_config(&config)
            .with_resolution(&resolution)
            .build();

        assert_eq!(manifest.metadata.config_source.as_deref(), Some("tailwind.config.json"));
        assert_eq!(manifest.metadata.plugins, vec!["forms"]);
        assert_eq!(manifest.change(&["fontFamily", "sans"]), Some(ChangeKind::Overridden));
        assert_eq!(manifest.change(&["colors", "primary"]), Some(ChangeKind::Added));
        assert_eq!(manifest.change(&["colors", "red", "300"]), Some(ChangeKind::Unchanged));
        assert_eq!(manifest.change(&["lineHeight", "4"]), Some(ChangeKind::Unchanged));

        let stats = manifest.statistics.unwrap();
        assert_eq!(stats.sections, 4);
        assert_eq!(stats.added, 2);
        assert_eq!(stats.overridden, 1);
        assert_eq!(stats.unchanged, 2);
        assert_eq!(stats.touched_sections[0].name, "colors");
        assert_eq!(stats.touched_sections[0].changes, 2);
        assert_eq!(stats.touched_sections[1].name, "lineHeight");
    }

    #[test]
    fn test_json_serialization() {
        let mut manifest = ResolutionManifest::new();
        manifest.record_change(path(&["colors", "primary"]), ChangeKind::Added);
        let json = manifest.to_json();

        assert!(json["metadata"].is_object());
        assert_eq!(json["metadata"]["version"], "1.0.0");
        assert_eq!(
            json["changes"],
            serde_json::json!([{ "path": ["colors", "primary"], "kind": "added" }])
        );
        assert!(json.get("statistics").is_none());
    }
}
