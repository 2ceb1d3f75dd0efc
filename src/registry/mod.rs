//! 工具注册表：向模型会话公布的不可变工具目录，并按声明的参数模式校验调用参数
//!
//! Tool registry: the immutable catalog of [`ToolDefinition`]s advertised to
//! the model session, plus argument validation against each tool's declared
//! parameter schema.
//!
//! Schemas are compiled once, when the registry is built. Validation is a pure
//! function of `(name, arguments)`: no I/O, no interior mutability, safe to
//! share behind an `Arc` across concurrent calls.

pub mod catalog;
pub mod error;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::JSONSchema;
use serde_json::{Map, Value};

use crate::error::{Error, ErrorContext};
use crate::types::ToolDefinition;
use crate::Result;

pub use error::{FieldIssue, ValidationError};

/// Immutable tool catalog with compiled parameter schemas.
#[derive(Clone)]
pub struct ToolRegistry {
    /// Catalog in advertisement order.
    definitions: Vec<ToolDefinition>,
    /// Tool name -> (index into `definitions`, compiled schema).
    index: HashMap<String, (usize, Arc<JSONSchema>)>,
}

impl ToolRegistry {
    /// Build a registry from a fixed list of definitions.
    ///
    /// Fails on duplicate names, empty names, or a parameter schema that does
    /// not compile.
    pub fn new(definitions: Vec<ToolDefinition>) -> Result<Self> {
        let mut index = HashMap::with_capacity(definitions.len());

        for (pos, def) in definitions.iter().enumerate() {
            if def.name.trim().is_empty() {
                return Err(Error::configuration_with_context(
                    "tool name must not be empty",
                    ErrorContext::new()
                        .with_field_path(format!("tools[{pos}].name"))
                        .with_source("tool_registry"),
                ));
            }

            let compiled = JSONSchema::compile(&def.parameters).map_err(|e| {
                Error::configuration_with_context(
                    "tool parameter schema does not compile",
                    ErrorContext::new()
                        .with_field_path(format!("tools.{}.parameters", def.name))
                        .with_details(e.to_string())
                        .with_source("tool_registry"),
                )
            })?;

            if index
                .insert(def.name.clone(), (pos, Arc::new(compiled)))
                .is_some()
            {
                return Err(Error::configuration_with_context(
                    "duplicate tool name",
                    ErrorContext::new()
                        .with_field_path(format!("tools.{}", def.name))
                        .with_source("tool_registry"),
                ));
            }
        }

        Ok(Self { definitions, index })
    }

    /// The assistant's built-in catalog (see [`catalog::standard_tools`]).
    pub fn standard() -> Result<Self> {
        Self::new(catalog::standard_tools().to_vec())
    }

    /// Full catalog in stable order, used to configure the model session.
    pub fn list(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|(pos, _)| &self.definitions[*pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.definitions.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Check `arguments` against the parameter schema of `name`.
    ///
    /// Unknown names validate Ok: routing unknown tools is the dispatcher's job.
    pub fn validate(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
    ) -> std::result::Result<(), ValidationError> {
        let Some((_, schema)) = self.index.get(name) else {
            return Ok(());
        };

        let instance = Value::Object(arguments.clone());
        let issues: Vec<FieldIssue> = match schema.validate(&instance) {
            Ok(()) => return Ok(()),
            Err(errors) => errors.map(|e| issue_from_schema_error(&e)).collect(),
        };

        Err(ValidationError::new(name, issues))
    }
}

fn issue_from_schema_error(err: &jsonschema::ValidationError<'_>) -> FieldIssue {
    if let ValidationErrorKind::Required { property } = &err.kind {
        let field = property
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| property.to_string());
        return FieldIssue::missing(field);
    }

    let path = err.instance_path.to_string();
    FieldIssue::new(path.trim_start_matches('/'), err.to_string())
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.names().collect::<Vec<_>>())
            .finish()
    }
}
