//! Built-in tools of the voice assistant.
//!
//! Descriptions are Italian because the model session converses in Italian and
//! reads them verbatim.

use once_cell::sync::Lazy;
use serde_json::json;

use crate::types::ToolDefinition;

pub const GET_USER_INFO: &str = "get_user_info";
pub const GET_APPOINTMENTS: &str = "get_appointments";
pub const FIND_AVAILABLE_SLOTS: &str = "find_available_slots";
pub const GET_PRACTICE_STATUS: &str = "get_practice_status";
pub const BOOK_APPOINTMENT: &str = "book_appointment";

const DATE_PATTERN: &str = r"^\d{4}-\d{2}-\d{2}$";

static STANDARD_TOOLS: Lazy<Vec<ToolDefinition>> = Lazy::new(|| {
    vec![
        ToolDefinition::function(
            GET_USER_INFO,
            "Ottiene informazioni su un cliente dal database. Fornire il telefono, il nome o entrambi.",
            json!({
                "type": "object",
                "properties": {
                    "phone": {
                        "type": "string",
                        "description": "Numero di telefono del cliente"
                    },
                    "name": {
                        "type": "string",
                        "description": "Nome del cliente"
                    }
                }
            }),
        ),
        ToolDefinition::function(
            GET_APPOINTMENTS,
            "Verifica gli appuntamenti disponibili",
            date_only_schema(),
        ),
        ToolDefinition::function(
            FIND_AVAILABLE_SLOTS,
            "Cerca gli orari liberi per una data",
            date_only_schema(),
        ),
        ToolDefinition::function(
            GET_PRACTICE_STATUS,
            "Controlla lo stato di una pratica",
            json!({
                "type": "object",
                "properties": {
                    "practice_id": {
                        "type": "string",
                        "description": "ID della pratica"
                    }
                },
                "required": ["practice_id"]
            }),
        ),
        ToolDefinition::function(
            BOOK_APPOINTMENT,
            "Prenota un appuntamento in uno degli orari liberi",
            json!({
                "type": "object",
                "properties": {
                    "slot_id": {
                        "type": "string",
                        "description": "ID dell'orario scelto"
                    },
                    "customer_name": {
                        "type": "string",
                        "description": "Nome e cognome del cliente"
                    },
                    "customer_phone": {
                        "type": "string",
                        "description": "Numero di telefono del cliente"
                    },
                    "notes": {
                        "type": "string",
                        "description": "Note facoltative per l'appuntamento"
                    }
                },
                "required": ["slot_id", "customer_name", "customer_phone"]
            }),
        ),
    ]
});

fn date_only_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "date": {
                "type": "string",
                "description": "Data richiesta in formato YYYY-MM-DD",
                "pattern": DATE_PATTERN
            }
        },
        "required": ["date"]
    })
}

/// Catalog in the order it is advertised to the session.
pub fn standard_tools() -> &'static [ToolDefinition] {
    &STANDARD_TOOLS
}
