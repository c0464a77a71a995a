//! Named processing units.
//!
//! A host looks recipes up by capability name in a [`RecipeRegistry`] and runs
//! them through a narrow contract: a declared input schema and
//! `run(inputs) -> outputs`. The host never sees the concrete recipe types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::domain::DetectorGeometry;
use crate::error::AppError;

pub mod select;

pub use select::SelectSlitletsRecipe;

/// Type of a recipe input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Path,
    Text,
    Flag,
    Integer,
}

/// One entry of a recipe's declared input schema.
#[derive(Debug, Clone, Copy)]
pub struct InputSpec {
    pub name: &'static str,
    pub kind: InputKind,
    pub required: bool,
    pub description: &'static str,
}

/// A recipe input or output value.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipeValue {
    Path(PathBuf),
    Text(String),
    Flag(bool),
    Integer(i64),
}

impl RecipeValue {
    pub fn kind(&self) -> InputKind {
        match self {
            RecipeValue::Path(_) => InputKind::Path,
            RecipeValue::Text(_) => InputKind::Text,
            RecipeValue::Flag(_) => InputKind::Flag,
            RecipeValue::Integer(_) => InputKind::Integer,
        }
    }
}

pub type RecipeValues = BTreeMap<String, RecipeValue>;

/// Environment handed to recipe factories.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeContext {
    pub geometry: DetectorGeometry,
}

pub trait Recipe {
    fn capability(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn input_schema(&self) -> &'static [InputSpec];

    /// Run with inputs already checked against [`Recipe::input_schema`].
    fn run(&self, inputs: &RecipeValues) -> Result<RecipeValues, AppError>;
}

pub type RecipeFactory = fn(&RecipeContext) -> Box<dyn Recipe>;

/// Capability name → recipe factory.
pub struct RecipeRegistry {
    context: RecipeContext,
    factories: BTreeMap<&'static str, RecipeFactory>,
}

impl RecipeRegistry {
    pub fn new(context: RecipeContext) -> Self {
        Self {
            context,
            factories: BTreeMap::new(),
        }
    }

    /// Registry with every recipe shipped by this crate.
    pub fn with_builtin(context: RecipeContext) -> Self {
        let mut registry = Self::new(context);
        registry.factories.insert(select::CAPABILITY, |ctx| Box::new(SelectSlitletsRecipe::new(ctx)));
        registry
    }

    pub fn register(&mut self, capability: &'static str, factory: RecipeFactory) -> Result<(), AppError> {
        if self.factories.contains_key(capability) {
            return Err(AppError::usage(format!("Recipe '{capability}' is already registered.")));
        }
        self.factories.insert(capability, factory);
        Ok(())
    }

    pub fn capabilities(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    pub fn create(&self, capability: &str) -> Result<Box<dyn Recipe>, AppError> {
        let factory = self.factories.get(capability).ok_or_else(|| {
            AppError::usage(format!(
                "Unknown recipe '{capability}'; available: {}.",
                self.capabilities().join(", ")
            ))
        })?;
        Ok(factory(&self.context))
    }

    /// Look up, validate inputs against the schema, and run.
    pub fn run(&self, capability: &str, inputs: &RecipeValues) -> Result<RecipeValues, AppError> {
        let recipe = self.create(capability)?;
        validate_inputs(recipe.input_schema(), inputs)?;
        log::debug!("running recipe {capability}");
        recipe.run(inputs)
    }
}

/// Check presence, kind and names of `inputs` against `schema`.
pub fn validate_inputs(schema: &[InputSpec], inputs: &RecipeValues) -> Result<(), AppError> {
    for spec in schema {
        match inputs.get(spec.name) {
            Some(value) if value.kind() != spec.kind => {
                return Err(AppError::usage(format!(
                    "Input '{}' must be {:?}, got {:?}.",
                    spec.name,
                    spec.kind,
                    value.kind()
                )));
            }
            None if spec.required => {
                return Err(AppError::usage(format!("Missing required input '{}'.", spec.name)));
            }
            _ => {}
        }
    }
    if let Some(name) = inputs.keys().find(|k| !schema.iter().any(|s| s.name == k.as_str())) {
        return Err(AppError::usage(format!("Unexpected input '{name}'.")));
    }
    Ok(())
}
