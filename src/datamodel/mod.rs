//! Scoped data model: hierarchical variables with parent-chain inheritance.
//!
//! A [`DataModel`] is a shared registry of `scope path → fields`. A
//! [`ScopedDataModel`] is a live view rooted at one scope path: lookups walk
//! from that path up to the root and stop at the nearest scope that declares
//! the field. Writes always land in the declaring scope, so descendants see
//! them immediately while sibling scopes with their own same-named field are
//! untouched.
//!
//! Every scope frame carries its own lock, so concurrent writes serialize per
//! declaring scope and never contend across scopes.

pub mod field;
pub mod scope;
pub(crate) mod validate;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use jsonschema::Validator;
use parking_lot::RwLock;
use serde_json::{Map, Value};

pub use field::{FieldDefinition, FieldType};
pub use scope::ScopePath;

/// `scope path → field name → definition`, as produced by the transformer.
pub type DataModelMap = IndexMap<ScopePath, IndexMap<String, FieldDefinition>>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataModelError {
    #[error("field '{field}' is readonly (declared in scope '{scope}')")]
    ReadonlyViolation { field: String, scope: ScopePath },
    #[error("field '{field}' is not defined in scope '{scope}' or any ancestor")]
    FieldNotFound { field: String, scope: ScopePath },
    #[error("invalid value for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },
    #[error("invalid schema for field '{field}': {reason}")]
    InvalidSchema { field: String, reason: String },
}

struct FieldSlot {
    definition: FieldDefinition,
    value: Value,
    validator: Option<Arc<Validator>>,
}

impl std::fmt::Debug for FieldSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSlot")
            .field("definition", &self.definition)
            .field("value", &self.value)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct ScopeFrame {
    fields: RwLock<IndexMap<String, FieldSlot>>,
}

#[derive(Debug, Default)]
struct Registry {
    scopes: RwLock<HashMap<ScopePath, Arc<ScopeFrame>>>,
}

/// Shared registry of scoped field definitions and their current values.
#[derive(Debug, Clone, Default)]
pub struct DataModel {
    registry: Arc<Registry>,
}

impl DataModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from transformer output.
    pub fn from_definitions(definitions: &DataModelMap) -> Result<Self, DataModelError> {
        let model = DataModel::new();
        for (scope, fields) in definitions {
            model.add_data_model(scope.clone(), fields.clone())?;
        }
        Ok(model)
    }

    /// Register or merge fields at `scope`. For a given `(scope, name)` the
    /// last call wins and the value resets to the new default.
    pub fn add_data_model(
        &self,
        scope: impl Into<ScopePath>,
        fields: IndexMap<String, FieldDefinition>,
    ) -> Result<(), DataModelError> {
        let scope = scope.into();
        let mut slots = Vec::with_capacity(fields.len());
        for (name, definition) in fields {
            let validator = validate::compile_schema(&name, &definition)?.map(Arc::new);
            let value = definition.default_value.clone().unwrap_or(Value::Null);
            slots.push((name, FieldSlot { definition, value, validator }));
        }

        let frame = self.frame_or_insert(&scope);
        let mut frame_fields = frame.fields.write();
        for (name, slot) in slots {
            log::trace!(scope:% = scope, field = name.as_str(); "Registering data model field");
            frame_fields.insert(name, slot);
        }
        Ok(())
    }

    /// A live view rooted at `scope`.
    pub fn get_scoped_data_model(&self, scope: impl Into<ScopePath>) -> ScopedDataModel {
        ScopedDataModel {
            model: self.clone(),
            scope: scope.into(),
        }
    }

    /// Snapshot of every registered definition.
    pub fn definitions(&self) -> DataModelMap {
        let scopes = self.registry.scopes.read();
        let mut paths: Vec<&ScopePath> = scopes.keys().collect();
        paths.sort();
        paths
            .into_iter()
            .map(|path| {
                let fields = scopes[path]
                    .fields
                    .read()
                    .iter()
                    .map(|(name, slot)| (name.clone(), slot.definition.clone()))
                    .collect();
                (path.clone(), fields)
            })
            .collect()
    }

    /// Initialize every `fromRequest` field present in `request`. Readonly
    /// fields are written too; this is their initialization.
    pub fn seed_from_request(&self, request: &Map<String, Value>) -> Vec<DataModelError> {
        let frames: Vec<Arc<ScopeFrame>> = self.registry.scopes.read().values().cloned().collect();
        let mut errors = Vec::new();
        for frame in frames {
            let mut fields = frame.fields.write();
            for (name, slot) in fields.iter_mut() {
                if !slot.definition.from_request {
                    continue;
                }
                let Some(value) = request.get(name) else {
                    continue;
                };
                match validate::validate_value(name, &slot.definition, slot.validator.as_deref(), value) {
                    Ok(()) => slot.value = value.clone(),
                    Err(e) => errors.push(e),
                }
            }
        }
        errors
    }

    fn frame(&self, scope: &ScopePath) -> Option<Arc<ScopeFrame>> {
        self.registry.scopes.read().get(scope).cloned()
    }

    fn frame_or_insert(&self, scope: &ScopePath) -> Arc<ScopeFrame> {
        if let Some(frame) = self.frame(scope) {
            return frame;
        }
        self.registry
            .scopes
            .write()
            .entry(scope.clone())
            .or_default()
            .clone()
    }

    /// Nearest scope, starting at `scope` itself, that declares `name`.
    fn resolve(&self, scope: &ScopePath, name: &str) -> Option<(ScopePath, Arc<ScopeFrame>)> {
        scope.ancestors().find_map(|path| {
            let frame = self.frame(&path)?;
            let declares = frame.fields.read().contains_key(name);
            declares.then_some((path, frame))
        })
    }
}

/// Per-scope view over a [`DataModel`]. Holds no data of its own.
#[derive(Debug, Clone)]
pub struct ScopedDataModel {
    model: DataModel,
    scope: ScopePath,
}

impl ScopedDataModel {
    pub fn scope(&self) -> &ScopePath {
        &self.scope
    }

    pub fn has(&self, name: &str) -> bool {
        self.model.resolve(&self.scope, name).is_some()
    }

    /// Current value from the nearest declaring scope.
    pub fn get(&self, name: &str) -> Option<Value> {
        let (_, frame) = self.model.resolve(&self.scope, name)?;
        let fields = frame.fields.read();
        fields.get(name).map(|slot| slot.value.clone())
    }

    /// Definition from the nearest declaring scope.
    pub fn definition(&self, name: &str) -> Option<FieldDefinition> {
        let (_, frame) = self.model.resolve(&self.scope, name)?;
        let fields = frame.fields.read();
        fields.get(name).map(|slot| slot.definition.clone())
    }

    /// Validate and write `value` into the scope that declares `name`.
    pub fn set(&self, name: &str, value: Value) -> Result<(), DataModelError> {
        let (definer, frame) =
            self.model
                .resolve(&self.scope, name)
                .ok_or_else(|| DataModelError::FieldNotFound {
                    field: name.to_string(),
                    scope: self.scope.clone(),
                })?;

        let mut fields = frame.fields.write();
        let slot = fields.get_mut(name).ok_or_else(|| DataModelError::FieldNotFound {
            field: name.to_string(),
            scope: self.scope.clone(),
        })?;

        if slot.definition.readonly {
            return Err(DataModelError::ReadonlyViolation {
                field: name.to_string(),
                scope: definer,
            });
        }
        validate::validate_value(name, &slot.definition, slot.validator.as_deref(), &value)?;

        log::trace!(scope:% = definer, field = name; "Data model write");
        slot.value = value;
        Ok(())
    }

    /// Every visible field and its current value; closer scopes shadow.
    pub fn to_json(&self) -> Map<String, Value> {
        let chain: Vec<ScopePath> = self.scope.ancestors().collect();
        let mut out = Map::new();
        for path in chain.iter().rev() {
            let Some(frame) = self.model.frame(path) else {
                continue;
            };
            for (name, slot) in frame.fields.read().iter() {
                out.insert(name.clone(), slot.value.clone());
            }
        }
        out
    }
}
