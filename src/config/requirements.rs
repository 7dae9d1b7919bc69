//! Import requirements table.
//!
//! Default imports every script receives, plus imports required by nodes of a
//! given type tag on top of what that type's generator asks for. The table is
//! a plain value owned by `CompilerConfig`; compiles never share mutable
//! import state.

use crate::compiler::imports::ImportDirective;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRequirements {
    /// Imports seeded into every script, in order.
    #[serde(default = "default_imports")]
    pub defaults: Vec<ImportDirective>,

    /// Type tag → extra imports for nodes of that type.
    #[serde(default = "default_node_type_imports")]
    pub node_types: IndexMap<String, Vec<ImportDirective>>,
}

fn default_imports() -> Vec<ImportDirective> {
    vec![ImportDirective::module("torch")]
}

fn default_node_type_imports() -> IndexMap<String, Vec<ImportDirective>> {
    let mut table = IndexMap::new();
    table.insert(
        "KMeans".to_string(),
        vec![ImportDirective::aliased("sklearn.cluster", "cluster")],
    );
    table.insert(
        "LinearRegression".to_string(),
        vec![ImportDirective::aliased("sklearn.linear_model", "linear_model")],
    );
    table
}

impl Default for ImportRequirements {
    fn default() -> Self {
        Self {
            defaults: default_imports(),
            node_types: default_node_type_imports(),
        }
    }
}

impl ImportRequirements {
    /// Table with no defaults and no per-type entries.
    pub fn empty() -> Self {
        Self {
            defaults: Vec::new(),
            node_types: IndexMap::new(),
        }
    }

    pub fn with_default(mut self, directive: ImportDirective) -> Self {
        self.defaults.push(directive);
        self
    }

    pub fn with_node_type(mut self, tag: impl Into<String>, directive: ImportDirective) -> Self {
        self.node_types.entry(tag.into()).or_default().push(directive);
        self
    }

    /// Extra imports for `tag` (exact match), empty if none.
    pub fn for_node_type(&self, tag: &str) -> &[ImportDirective] {
        self.node_types.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every top-level package the table can request, defaults first.
    pub fn all_packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = Vec::new();
        let directives = self
            .defaults
            .iter()
            .chain(self.node_types.values().flatten());
        for directive in directives {
            let package = directive.package();
            if !package.is_empty() && !packages.iter().any(|p| p == package) {
                packages.push(package.to_string());
            }
        }
        packages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let reqs = ImportRequirements::default();
        assert_eq!(reqs.defaults, vec![ImportDirective::module("torch")]);
        assert_eq!(
            reqs.for_node_type("KMeans"),
            &[ImportDirective::aliased("sklearn.cluster", "cluster")]
        );
        assert!(reqs.for_node_type("DataLoader").is_empty());
        assert!(reqs.for_node_type("kmeans").is_empty());
    }

    #[test]
    fn test_all_packages_is_distinct_and_ordered() {
        let reqs = ImportRequirements::default()
            .with_node_type("Plot", ImportDirective::aliased("matplotlib.pyplot", "plt"));
        assert_eq!(reqs.all_packages(), vec!["torch", "sklearn", "matplotlib"]);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let reqs: ImportRequirements = serde_json::from_str("{}").unwrap();
        assert_eq!(reqs, ImportRequirements::default());

        let reqs: ImportRequirements = serde_json::from_str(r#"{"defaults": []}"#).unwrap();
        assert!(reqs.defaults.is_empty());
        assert_eq!(reqs.node_types.len(), 2);
    }

    #[test]
    fn test_builder_appends_to_existing_tag() {
        let reqs = ImportRequirements::empty()
            .with_node_type("KMeans", ImportDirective::module("numpy"))
            .with_node_type("KMeans", ImportDirective::aliased("sklearn.cluster", "cluster"));
        assert_eq!(reqs.for_node_type("KMeans").len(), 2);
    }
}
