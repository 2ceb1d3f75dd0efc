//! Static tool-name → backend-operation table.

use std::collections::HashMap;

use serde_json::{json, Value};

use crate::backend::{BackendOperation, Filter, ReadQuery};
use crate::error::{Error, ErrorContext};
use crate::registry::catalog::{
    BOOK_APPOINTMENT, FIND_AVAILABLE_SLOTS, GET_APPOINTMENTS, GET_PRACTICE_STATUS, GET_USER_INFO,
};
use crate::registry::ToolRegistry;
use crate::Result;

/// One projected output field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldMap {
    /// `name` takes the row's `column` value (`null` when the column is absent).
    Column { name: String, column: String },
    /// `name` is always `value`.
    Constant { name: String, value: Value },
}

impl FieldMap {
    pub fn column(name: impl Into<String>, column: impl Into<String>) -> Self {
        Self::Column {
            name: name.into(),
            column: column.into(),
        }
    }

    /// Same name in the row and in the output.
    pub fn same(name: &str) -> Self {
        Self::column(name, name)
    }

    pub fn constant(name: impl Into<String>, value: Value) -> Self {
        Self::Constant {
            name: name.into(),
            value,
        }
    }
}

/// How a successful backend payload is presented to the model.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseShape {
    /// First row, projected, under `key`. No row → `{success:false, message:not_found}`.
    Record {
        key: String,
        fields: Vec<FieldMap>,
        not_found: String,
    },
    /// Every row, projected, as a list under `key`.
    Rows { key: String, fields: Vec<FieldMap> },
    /// JSON objects returned untouched; `null` becomes `{success: true}` and
    /// other payloads are wrapped as `{success: true, data}`.
    Verbatim,
}

/// A tool's backend operation and result shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolRoute {
    pub tool: String,
    pub operation: BackendOperation,
    pub shape: ResponseShape,
}

impl ToolRoute {
    pub fn new(tool: impl Into<String>, operation: BackendOperation, shape: ResponseShape) -> Self {
        Self {
            tool: tool.into(),
            operation,
            shape,
        }
    }
}

/// Immutable lookup table, built once at startup.
#[derive(Debug, Clone)]
pub struct OperationTable {
    routes: HashMap<String, ToolRoute>,
}

impl OperationTable {
    pub fn new(routes: Vec<ToolRoute>) -> Result<Self> {
        let mut table = HashMap::with_capacity(routes.len());
        for route in routes {
            let name = route.tool.clone();
            if table.insert(name.clone(), route).is_some() {
                return Err(Error::configuration_with_context(
                    "duplicate route for tool",
                    ErrorContext::new()
                        .with_field_path(format!("routes.{name}"))
                        .with_source("operation_table"),
                ));
            }
        }
        Ok(Self { routes: table })
    }

    /// Routes of the built-in catalog.
    pub fn standard() -> Result<Self> {
        Self::new(standard_routes())
    }

    pub fn get(&self, tool: &str) -> Option<&ToolRoute> {
        self.routes.get(tool)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Every advertised tool must have a route and every route an advertised tool.
    pub fn verify_against(&self, registry: &ToolRegistry) -> Result<()> {
        if let Some(unrouted) = registry.names().find(|n| !self.routes.contains_key(*n)) {
            return Err(Error::configuration_with_context(
                "advertised tool has no backend route",
                ErrorContext::new()
                    .with_field_path(format!("routes.{unrouted}"))
                    .with_source("operation_table"),
            ));
        }

        let mut unadvertised: Vec<_> = self
            .routes
            .keys()
            .filter(|n| !registry.contains(n))
            .collect();
        unadvertised.sort();
        if let Some(name) = unadvertised.first() {
            return Err(Error::configuration_with_context(
                "route has no tool definition",
                ErrorContext::new()
                    .with_field_path(format!("routes.{name}"))
                    .with_source("operation_table"),
            ));
        }
        Ok(())
    }
}

fn available_slots() -> (BackendOperation, ResponseShape) {
    (
        BackendOperation::read(
            ReadQuery::new("bookings")
                .filter(Filter::eq("date", "date"))
                .filter(Filter::fixed("status", "available")),
        ),
        ResponseShape::Rows {
            key: "appuntamenti".to_string(),
            fields: vec![
                FieldMap::column("ora", "time"),
                FieldMap::constant("disponibile", json!(true)),
            ],
        },
    )
}

/// Routes for [`crate::registry::catalog::standard_tools`].
pub fn standard_routes() -> Vec<ToolRoute> {
    let (slots_op, slots_shape) = available_slots();

    vec![
        ToolRoute::new(
            GET_USER_INFO,
            BackendOperation::read(
                ReadQuery::new("clienti")
                    .filter(Filter::any_of(vec![
                        Filter::eq("telefono", "phone"),
                        Filter::ilike("nome", "name"),
                    ]))
                    .limit(1),
            ),
            ResponseShape::Record {
                key: "cliente".to_string(),
                fields: ["nome", "cognome", "telefono", "email"]
                    .into_iter()
                    .map(FieldMap::same)
                    .collect(),
                not_found: "Cliente non trovato".to_string(),
            },
        ),
        ToolRoute::new(GET_APPOINTMENTS, slots_op.clone(), slots_shape.clone()),
        ToolRoute::new(FIND_AVAILABLE_SLOTS, slots_op, slots_shape),
        ToolRoute::new(
            GET_PRACTICE_STATUS,
            BackendOperation::read(
                ReadQuery::new("practices")
                    .filter(Filter::eq("id", "practice_id"))
                    .limit(1),
            ),
            ResponseShape::Record {
                key: "pratica".to_string(),
                fields: vec![
                    FieldMap::same("id"),
                    FieldMap::column("stato", "status"),
                    FieldMap::column("descrizione", "description"),
                ],
                not_found: "Pratica non trovata".to_string(),
            },
        ),
        ToolRoute::new(
            BOOK_APPOINTMENT,
            BackendOperation::edge_function("book-appointment"),
            ResponseShape::Verbatim,
        ),
    ]
}
