//! Integration tests for loading and saving compiler configs

use pipeline_codegen::{
    CompilerConfig, Error, ImportDirective, ImportRequirements, NodeConfig, PipelineCompiler,
    PipelineDescription,
};
use tempfile::TempDir;

#[test]
fn test_load_toml() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codegen.toml");
    std::fs::write(
        &path,
        r#"
entrypoint = "run_pipeline"
device_setup = false

[imports]
defaults = [{ module = "torch" }, { module = "numpy", alias = "np" }]
"#,
    )
    .unwrap();

    let config = CompilerConfig::load(&path).unwrap();
    assert_eq!(config.entrypoint, "run_pipeline");
    assert!(!config.device_setup);
    assert_eq!(config.indent, "    ");
    assert_eq!(config.imports.defaults.len(), 2);
    // Per-type table was not given, so the built-in one applies
    assert!(!config.imports.for_node_type("KMeans").is_empty());

    let script = PipelineCompiler::new(config)
        .compile(&PipelineDescription::new())
        .unwrap();
    assert!(script.text.starts_with("import torch\nimport numpy as np\n\ndef run_pipeline():\n"));
    assert!(script.text.ends_with("    run_pipeline()\n"));
}

#[test]
fn test_load_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codegen.json");
    std::fs::write(
        &path,
        r#"{"strict_models": true, "imports": {"node_types": {"Plot": [{"module": "matplotlib.pyplot", "as_name": "plt"}]}}}"#,
    )
    .unwrap();

    let config = CompilerConfig::load(&path).unwrap();
    assert!(config.strict_models);
    assert_eq!(
        config.imports.for_node_type("Plot"),
        &[ImportDirective::aliased("matplotlib.pyplot", "plt")]
    );
    assert!(config.imports.for_node_type("KMeans").is_empty());

    let desc = PipelineDescription::new().node("p1", "Plot", NodeConfig::new());
    let script = PipelineCompiler::new(config).compile(&desc).unwrap();
    assert!(script.text.contains("import matplotlib.pyplot as plt\n"));
}

#[test]
fn test_save_and_reload() {
    let dir = TempDir::new().unwrap();
    let config = CompilerConfig {
        indent: "\t".to_string(),
        ..Default::default()
    }
    .with_imports(
        ImportRequirements::default()
            .with_node_type("Plot", ImportDirective::aliased("matplotlib.pyplot", "plt")),
    );

    for name in ["nested/codegen.toml", "nested/codegen.json"] {
        let path = dir.path().join(name);
        config.save(&path).unwrap();
        assert_eq!(CompilerConfig::load(&path).unwrap(), config);
    }
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("codegen.toml");
    std::fs::write(&path, "entrypoint = \"not valid\"").unwrap();
    assert!(matches!(CompilerConfig::load(&path), Err(Error::Config(_))));

    std::fs::write(&path, "indent = [").unwrap();
    assert!(matches!(CompilerConfig::load(&path), Err(Error::Config(_))));
}

#[test]
fn test_load_or_default_falls_back() {
    let dir = TempDir::new().unwrap();
    let config = CompilerConfig::load_or_default(dir.path().join("missing.toml"));
    assert_eq!(config, CompilerConfig::default());
}
