//! # Import Aggregation
//!
//! Collects the import directives that generated code depends on, keyed by
//! module, and renders them as the script's import block.
//!
//! A module can be imported once. Requesting it again with the same alias and
//! specifier is a no-op; requesting it with anything different is an
//! `ImportConflict`, since keeping either request would leave the script
//! referring to a name that is never bound.
//!
//! This includes a request with the same alias but a different specifier:
//! `from torch.utils.data import DataLoader` followed by
//! `from torch.utils.data import Dataset` is a conflict, not a silent keep of
//! the first one. Both requests would be needed, and one line per module can
//! carry only one of them.
//!
//! ## Rendered shapes
//!
//! ```text
//! import torch                              module
//! import torch.nn as nn                     module + alias
//! from torch.utils.data import DataLoader   module + specifier
//! from numpy import array as arr            module + specifier + alias
//! ```

use super::error::{CompileError, CompileResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Request to bring a module, or one member of it, into scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportDirective {
    pub module: String,
    #[serde(default, alias = "as_name", skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifier: Option<String>,
}

impl ImportDirective {
    /// `import module`
    pub fn module(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            alias: None,
            specifier: None,
        }
    }

    /// `import module as alias`
    pub fn aliased(module: impl Into<String>, alias: impl Into<String>) -> Self {
        Self::module(module).with_alias(alias)
    }

    /// `from module import specifier`
    pub fn member(module: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            specifier: Some(specifier.into()),
            ..Self::module(module)
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Collapse path separators into the dotted module form.
    pub fn normalize_module(module: &str) -> String {
        module.trim().replace(['/', '\\'], ".")
    }

    fn normalized(mut self) -> Self {
        self.module = Self::normalize_module(&self.module);
        self.alias = self.alias.filter(|a| !a.trim().is_empty());
        self.specifier = self.specifier.filter(|s| !s.trim().is_empty());
        self
    }

    /// Top-level package, e.g. `torch` for `torch.utils.data`.
    pub fn package(&self) -> &str {
        self.module.split('.').next().unwrap_or(&self.module)
    }

    /// The import statement for this directive.
    pub fn render(&self) -> String {
        match (&self.alias, &self.specifier) {
            (Some(alias), Some(spec)) => format!("from {} import {} as {}", self.module, spec, alias),
            (Some(alias), None) => format!("import {} as {}", self.module, alias),
            (None, Some(spec)) => format!("from {} import {}", self.module, spec),
            (None, None) => format!("import {}", self.module),
        }
    }
}

impl fmt::Display for ImportDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Insertion-ordered set of import directives, one per module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportAggregator {
    entries: IndexMap<String, ImportDirective>,
}

impl ImportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregator pre-seeded with `directives`, in order.
    pub fn with_directives<'a>(
        directives: impl IntoIterator<Item = &'a ImportDirective>,
    ) -> CompileResult<Self> {
        let mut aggregator = Self::new();
        aggregator.extend(directives)?;
        Ok(aggregator)
    }

    /// Record an import. Idempotent for an identical request.
    pub fn add_import(
        &mut self,
        module: &str,
        alias: Option<&str>,
        specifier: Option<&str>,
    ) -> CompileResult<()> {
        self.add(ImportDirective {
            module: module.to_string(),
            alias: alias.map(str::to_string),
            specifier: specifier.map(str::to_string),
        })
    }

    pub fn add(&mut self, directive: ImportDirective) -> CompileResult<()> {
        let directive = directive.normalized();
        if directive.module.is_empty() {
            return Err(CompileError::Validation(
                "Import directive has an empty module name".to_string(),
            ));
        }

        match self.entries.get(&directive.module) {
            None => {
                self.entries.insert(directive.module.clone(), directive);
                Ok(())
            }
            Some(existing) if *existing == directive => Ok(()),
            Some(existing) => Err(CompileError::ImportConflict {
                module: directive.module.clone(),
                existing: format!("'{}'", existing.render()),
                requested: format!("'{}'", directive.render()),
            }),
        }
    }

    pub fn extend<'a>(
        &mut self,
        directives: impl IntoIterator<Item = &'a ImportDirective>,
    ) -> CompileResult<()> {
        for directive in directives {
            self.add(directive.clone())?;
        }
        Ok(())
    }

    /// Union of `self` and `other`; entries of `self` come first.
    ///
    /// The conflict rule is symmetric, so `a.merge(b)` fails exactly when
    /// `b.merge(a)` does.
    pub fn merge(&self, other: &ImportAggregator) -> CompileResult<ImportAggregator> {
        let mut merged = self.clone();
        merged.extend(other.entries.values())?;
        Ok(merged)
    }

    pub fn get(&self, module: &str) -> Option<&ImportDirective> {
        self.entries.get(&ImportDirective::normalize_module(module))
    }

    pub fn contains(&self, module: &str) -> bool {
        self.get(module).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImportDirective> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One import statement per module, in insertion order.
    pub fn lines(&self) -> Vec<String> {
        self.entries.values().map(ImportDirective::render).collect()
    }

    /// The import block, each statement newline-terminated.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for line in self.lines() {
            out.push_str(&line);
            out.push('\n');
        }
        out
    }

    /// Distinct top-level packages, in insertion order.
    pub fn packages(&self) -> Vec<String> {
        let mut packages: Vec<String> = Vec::new();
        for directive in self.entries.values() {
            let package = directive.package();
            if !packages.iter().any(|p| p == package) {
                packages.push(package.to_string());
            }
        }
        packages
    }
}
