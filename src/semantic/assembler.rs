//! Model assembler coordinating the resolution phases.

mod model_building;
mod model_validation;

use crate::diag::Diag;
use crate::ir::{DataModel, DigestOutcome, DigestResult, SymbolTable};
use crate::metadata::MetadataTree;
use crate::semantic::diag::DigestError;
use crate::semantic::inheritance::run_inheritance_resolution;
use crate::semantic::naming::{
    NamingConfig, NamingResolver, run_naming_resolution, unused_override_warnings,
};
use crate::semantic::navigation::run_navigation_resolution;
use crate::semantic::overrides::NamingOverrides;
use crate::semantic::type_resolver::run_type_resolution;
use serde::Deserialize;
use smol_str::SmolStr;
use std::fmt;
use tracing::{debug, info};

/// Configuration for model assembly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Case conversion and identifier rules.
    pub naming: NamingConfig,

    /// Require a key on every entity type exposed by an entity set or singleton.
    pub require_keys_for_sets: bool,

    /// Report overrides that match no type or property as warnings.
    pub warn_on_unused_overrides: bool,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            naming: NamingConfig::default(),
            require_keys_for_sets: true,
            warn_on_unused_overrides: true,
        }
    }
}

impl DigestConfig {
    /// Parses a configuration from TOML. Missing keys take their defaults.
    ///
    /// ```
    /// use edm_digest::semantic::{DigestConfig, NameCase};
    ///
    /// let config = DigestConfig::from_toml_str(r#"
    ///     require_keys_for_sets = false
    ///
    ///     [naming]
    ///     property_case = "snake"
    /// "#).unwrap();
    ///
    /// assert!(!config.require_keys_for_sets);
    /// assert_eq!(config.naming.property_case, NameCase::Snake);
    /// assert_eq!(config.naming.type_case, NameCase::Pascal);
    /// ```
    pub fn from_toml_str(toml: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml)
    }
}

/// Resolution phases, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestPhase {
    Declarations,
    Types,
    Inheritance,
    Navigation,
    Naming,
    Validation,
}

impl DigestPhase {
    pub fn name(self) -> &'static str {
        match self {
            DigestPhase::Declarations => "declarations",
            DigestPhase::Types => "types",
            DigestPhase::Inheritance => "inheritance",
            DigestPhase::Navigation => "navigation",
            DigestPhase::Naming => "naming",
            DigestPhase::Validation => "validation",
        }
    }
}

impl fmt::Display for DigestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Turns a metadata tree into a [`DataModel`].
#[derive(Debug, Clone, Default)]
pub struct ModelAssembler {
    config: DigestConfig,
}

impl ModelAssembler {
    /// Creates an assembler with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an assembler with custom configuration.
    pub fn with_config(config: DigestConfig) -> Self {
        Self { config }
    }

    /// Sets the naming configuration.
    pub fn with_naming(mut self, naming: NamingConfig) -> Self {
        self.config.naming = naming;
        self
    }

    /// Enables or disables the key requirement for set and singleton targets.
    pub fn with_required_keys(mut self, required: bool) -> Self {
        self.config.require_keys_for_sets = required;
        self
    }

    pub fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Assembles a model, discarding warnings.
    pub fn assemble(&self, tree: &MetadataTree, overrides: &NamingOverrides) -> DigestResult {
        self.digest(tree, overrides).into_result()
    }

    /// Assembles a model and reports warnings alongside the result.
    ///
    /// # Phases
    ///
    /// 1. Declarations - index types, associations and endpoints
    /// 2. Types - resolve every type reference
    /// 3. Inheritance - derivation graphs and closures
    /// 4. Navigation - normalize relationships of both dialects
    /// 5. Naming - canonical identifiers and per-type collisions
    /// 6. Validation - keys and function/service namespaces on the built model
    ///
    /// All errors of a phase are collected; a failed phase stops assembly.
    pub fn digest(&self, tree: &MetadataTree, overrides: &NamingOverrides) -> DigestOutcome {
        info!(
            dialect = %tree.dialect,
            schemas = tree.schemas.len(),
            "assembling data model"
        );

        // Phase 1: Declarations
        let (symbols, errors) = SymbolTable::build(tree);
        if !errors.is_empty() {
            return failed(DigestPhase::Declarations, errors, Vec::new());
        }
        info!(
            entity_types = symbols.entity_types().len(),
            complex_types = symbols.complex_types().len(),
            enum_types = symbols.enum_types().len(),
            operations = symbols
                .containers()
                .iter()
                .map(|container| container.decl.operations.len())
                .sum::<usize>(),
            "declarations indexed"
        );

        let warnings = if self.config.warn_on_unused_overrides {
            unused_override_warnings(&symbols, overrides)
        } else {
            Vec::new()
        };

        // Phase 2: Types
        let mut errors = Vec::new();
        let types = run_type_resolution(&symbols, &mut errors);
        if !errors.is_empty() {
            return failed(DigestPhase::Types, errors, warnings);
        }

        // Phase 3: Inheritance
        let entity_names: Vec<SmolStr> = symbols
            .entity_types()
            .iter()
            .map(|entity| entity.qualified_name.clone())
            .collect();
        let complex_names: Vec<SmolStr> = symbols
            .complex_types()
            .iter()
            .map(|complex| complex.qualified_name.clone())
            .collect();
        let Some(inheritance) = run_inheritance_resolution(
            &entity_names,
            &types.entity_bases,
            &complex_names,
            &types.complex_bases,
            &mut errors,
        ) else {
            return failed(DigestPhase::Inheritance, errors, warnings);
        };

        // Phase 4: Navigation
        let navigations = run_navigation_resolution(&symbols, &inheritance.entities, &mut errors);
        if !errors.is_empty() {
            return failed(DigestPhase::Navigation, errors, warnings);
        }

        // Phase 5: Naming
        let naming = NamingResolver::new(&self.config.naming, overrides);
        let names = run_naming_resolution(
            &symbols,
            &types,
            &inheritance,
            &navigations,
            &naming,
            &mut errors,
        );
        if !errors.is_empty() {
            return failed(DigestPhase::Naming, errors, warnings);
        }

        let model = model_building::build_model(&symbols, types, &inheritance, navigations, names);

        // Phase 6: Validation
        model_validation::run_model_validation(&model, &self.config, &naming, &mut errors);
        if !errors.is_empty() {
            return failed(DigestPhase::Validation, errors, warnings);
        }

        info!(
            entity_types = model.entity_types().len(),
            entity_sets = model.entity_sets().len(),
            warnings = warnings.len(),
            "data model assembled"
        );
        DigestOutcome::success(model, warnings)
    }
}

fn failed(phase: DigestPhase, errors: Vec<DigestError>, warnings: Vec<Diag>) -> DigestOutcome {
    debug!(phase = %phase, errors = errors.len(), "phase failed, stopping assembly");
    DigestOutcome::failure(errors, warnings)
}

/// Assembles a model with default configuration.
pub fn assemble(
    tree: &MetadataTree,
    overrides: &NamingOverrides,
) -> Result<DataModel, Vec<DigestError>> {
    ModelAssembler::new().assemble(tree, overrides)
}
