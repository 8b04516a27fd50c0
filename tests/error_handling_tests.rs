use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tailwind_theme::{resolve, ResolveArgs, Theme, ThemeConfig, ThemeError};

fn args_for(config: PathBuf) -> ResolveArgs {
    ResolveArgs {
        config,
        presets: vec![],
        base: None,
        output: None,
        manifest: None,
        minify: false,
        verbose: false,
    }
}

#[test]
fn test_empty_content_is_config_shape_error() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("tailwind.config.json");
    fs::write(
        &config,
        r##"{"content": [], "theme": {"extend": {"colors": {"primary": "#FCA5A5"}}}}"##,
    )
    .unwrap();

    let err = resolve(&args_for(config)).unwrap_err();
    assert!(matches!(err, ThemeError::ConfigShape { ref field, .. } if field == "content"));
}

#[test]
fn test_missing_content_is_config_shape_error() {
    let config = ThemeConfig::from_yaml_str("theme:\n  fontFamily:\n    sans: [\"Itim\"]\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.is_config_shape());
}

#[test]
fn test_empty_font_list_message_names_role() {
    let config = ThemeConfig::from_json_str(
        r#"{"content": ["*.html"], "theme": {"fontFamily": {"sans": []}}}"#,
    )
    .unwrap();

    let error_msg = config.validate().unwrap_err().to_string();
    assert!(
        error_msg.contains("theme.fontFamily.sans"),
        "Error should name the offending role: {}",
        error_msg
    );
}

#[test]
fn test_wrong_shape_is_parse_error() {
    // fontFamily entries must be lists
    let err = ThemeConfig::from_json_str(
        r#"{"content": ["*.html"], "theme": {"fontFamily": {"sans": "Itim"}}}"#,
    )
    .unwrap_err();
    assert!(matches!(err, ThemeError::Json(_)));
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.json");

    let err = resolve(&args_for(missing)).unwrap_err();
    let error_msg = err.to_string();
    assert!(error_msg.contains("Failed to read config file"), "{}", error_msg);
    assert!(error_msg.contains("nope.json"), "{}", error_msg);
}

#[test]
fn test_base_theme_must_be_object() {
    let temp_dir = TempDir::new().unwrap();
    let base = temp_dir.path().join("base.json");
    fs::write(&base, r#"["colors"]"#).unwrap();

    let err = Theme::from_file(&base).unwrap_err();
    assert!(err.to_string().contains("theme must be an object"));
}

#[test]
fn test_invalid_args_are_rejected_before_io() {
    let mut args = args_for("does-not-exist.json".into());
    args.output = Some("same.json".into());
    args.manifest = Some("same.json".into());

    let err = resolve(&args).unwrap_err();
    assert!(matches!(err, ThemeError::InvalidInput(_)));
}

#[cfg(feature = "js")]
#[test]
fn test_dynamic_js_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = temp_dir.path().join("tailwind.config.js");
    fs::write(
        &config,
        r#"
const colors = require("tailwindcss/colors");
module.exports = {
  content: ["*.html"],
  theme: { extend: { colors: { primary: colors.red[300] } } },
};
"#,
    )
    .unwrap();

    let err = resolve(&args_for(config)).unwrap_err();
    let error_msg = err.to_string();
    assert!(error_msg.contains("tailwind.config.js"), "{}", error_msg);
    assert!(error_msg.contains("member access"), "{}", error_msg);
}
