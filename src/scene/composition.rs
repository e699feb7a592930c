use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::error::{LaminateError, LaminateResult};
use crate::scene::model::Composition;
use crate::schema::validate::validate_composition;

impl Composition {
    /// Parse a composition from a JSON reader.
    ///
    /// Parsing is strict (unknown fields are rejected) and fills in defaults; call
    /// [`Composition::validate`] to check value ranges.
    pub fn from_reader<R: std::io::Read>(r: R) -> LaminateResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LaminateError::validation(format!("parse composition JSON: {e}")))
    }

    /// Parse a composition from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> LaminateResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LaminateError::validation(format!("open composition JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Parse a composition from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> LaminateResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| LaminateError::validation(format!("parse composition JSON: {e}")))
    }

    /// Convert an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> LaminateResult<Self> {
        serde_json::from_value(value)
            .map_err(|e| LaminateError::validation(format!("composition JSON: {e}")))
    }

    /// Check every field range and reference; all violations are reported together.
    pub fn validate(&self) -> LaminateResult<()> {
        validate_composition(self)
            .map_err(|e| LaminateError::validation(format!("composition is invalid:\n{e}")))
    }

    /// Serialize back to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> LaminateResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LaminateError::Other(anyhow::Error::new(e).context("serialize composition")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composition.rs"]
mod tests;
