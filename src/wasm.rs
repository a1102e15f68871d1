//! WASM bindings for calsgrid
//!
//! This module provides JavaScript-accessible functions for normalizing and
//! inspecting CALS tables.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "wasm")]
use crate::{CalsTableDefinition, GridModel};

/// Table options (exposed to WASM)
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize, Default)]
pub struct TableOptions {
    /// Namespace URI of the table elements
    #[serde(default)]
    pub namespace: Option<String>,
    /// Rename every column to `column-<index>`
    #[serde(default)]
    pub normalize_column_names: bool,
    /// Full definition in TOML, overriding the fields above
    #[serde(default)]
    pub definition: Option<String>,
}

#[cfg(feature = "wasm")]
impl TableOptions {
    fn definition(&self) -> Result<CalsTableDefinition, String> {
        let mut definition = match &self.definition {
            Some(toml) => CalsTableDefinition::from_toml_str(toml).map_err(|e| e.to_string())?,
            None => CalsTableDefinition::default(),
        };
        if self.definition.is_none() {
            definition.namespace = self.namespace.clone();
            definition.normalize_column_names = self.normalize_column_names;
        }
        Ok(definition)
    }
}

/// Normalization result
#[cfg(feature = "wasm")]
#[derive(Serialize, Deserialize)]
pub struct NormalizeResult {
    /// The rewritten document
    pub output: String,
    /// Whether the conversion was successful
    pub success: bool,
    /// Error message if conversion failed
    pub error: Option<String>,
}

/// Inspection result
#[cfg(feature = "wasm")]
#[derive(Serialize)]
pub struct InspectResult {
    /// Grid model of each table in document order
    pub tables: Vec<GridModel>,
    /// Text picture of each grid
    pub pictures: Vec<String>,
    pub success: bool,
    pub error: Option<String>,
}

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Rewrite every CALS table in an XML document through the grid model
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "normalizeCalsTable")]
pub fn normalize_cals_table_wasm(input: &str, options: JsValue) -> JsValue {
    let opts: TableOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    let result = match opts
        .definition()
        .and_then(|def| crate::normalize_cals_xml(input, &def).map_err(|e| e.to_string()))
    {
        Ok(output) => NormalizeResult {
            output,
            success: true,
            error: None,
        },
        Err(error) => NormalizeResult {
            output: String::new(),
            success: false,
            error: Some(error),
        },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Build the grid model of every CALS table in an XML document
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "inspectCalsTable")]
pub fn inspect_cals_table_wasm(input: &str, options: JsValue) -> JsValue {
    let opts: TableOptions = serde_wasm_bindgen::from_value(options).unwrap_or_default();
    let result = match opts
        .definition()
        .and_then(|def| crate::inspect_cals_xml(input, &def).map_err(|e| e.to_string()))
    {
        Ok(tables) => InspectResult {
            pictures: tables.iter().map(GridModel::render_ascii).collect(),
            tables,
            success: true,
            error: None,
        },
        Err(error) => InspectResult {
            tables: Vec::new(),
            pictures: Vec::new(),
            success: false,
            error: Some(error),
        },
    };
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

/// Get version information
#[cfg(feature = "wasm")]
#[wasm_bindgen(js_name = "getVersion")]
pub fn get_version() -> String {
    crate::version().to_string()
}
