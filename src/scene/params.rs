//! Typed overrides applied to a composition before rendering.
//!
//! A [`Parameter`] names a layer and one of a fixed set of properties. Its value is a string that
//! is parsed according to the targeted property, so a template can expose e.g. a background
//! colour or an image location without callers editing the document by hand.

use serde::{Deserialize, Serialize};

use crate::foundation::error::{LaminateError, LaminateResult};
use crate::scene::model::{
    Composition, Layer, LayerContent, OriginDescriptor, Placement, Position, Rgba, Scale,
};

/// One override entry.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Parameter {
    /// Parameter identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Human-readable name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `id` of the layer to modify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_layer: Option<String>,
    /// Property to modify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_property: Option<TargetProperty>,
    /// New value, parsed according to `target_property`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Layer properties a [`Parameter`] may target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetProperty {
    /// `{"x": .., "y": ..}`
    #[serde(rename = "position")]
    Position,
    /// Origin descriptor string.
    #[serde(rename = "origin")]
    Origin,
    /// Alignment descriptor string.
    #[serde(rename = "alignment")]
    Alignment,
    /// `custom`, `cover`, `fit` or `stretch`.
    #[serde(rename = "placement")]
    Placement,
    /// `{"x": .., "y": ..}`
    #[serde(rename = "scale")]
    Scale,
    /// Number in `0..=100`.
    #[serde(rename = "opacity")]
    Opacity,
    /// Image location; only valid on image layers.
    #[serde(rename = "content.location")]
    ContentLocation,
    /// `{"r": .., "g": .., "b": .., "a": ..}`; only valid on solid layers.
    #[serde(rename = "content.color")]
    ContentColor,
}

impl TargetProperty {
    /// Document name of the property.
    pub fn as_str(self) -> &'static str {
        match self {
            TargetProperty::Position => "position",
            TargetProperty::Origin => "origin",
            TargetProperty::Alignment => "alignment",
            TargetProperty::Placement => "placement",
            TargetProperty::Scale => "scale",
            TargetProperty::Opacity => "opacity",
            TargetProperty::ContentLocation => "content.location",
            TargetProperty::ContentColor => "content.color",
        }
    }

    /// Inverse of [`TargetProperty::as_str`].
    pub fn parse(s: &str) -> LaminateResult<Self> {
        Ok(match s {
            "position" => TargetProperty::Position,
            "origin" => TargetProperty::Origin,
            "alignment" => TargetProperty::Alignment,
            "placement" => TargetProperty::Placement,
            "scale" => TargetProperty::Scale,
            "opacity" => TargetProperty::Opacity,
            "content.location" => TargetProperty::ContentLocation,
            "content.color" => TargetProperty::ContentColor,
            other => {
                return Err(LaminateError::validation(format!(
                    "unknown parameter target property '{other}'"
                )));
            }
        })
    }
}

impl Parameter {
    /// A complete parameter targeting `layer`.
    pub fn new(layer: impl Into<String>, property: TargetProperty, value: impl Into<String>) -> Self {
        Self {
            id: None,
            name: None,
            target_layer: Some(layer.into()),
            target_property: Some(property),
            value: Some(value.into()),
        }
    }

    /// Parse `LAYER.PROPERTY=VALUE`, e.g. `background.content.color={"r":255}`.
    pub fn from_assignment(s: &str) -> LaminateResult<Self> {
        let (target, value) = s.split_once('=').ok_or_else(|| {
            LaminateError::validation(format!("parameter '{s}' must look like LAYER.PROPERTY=VALUE"))
        })?;
        let (layer, property) = target.split_once('.').ok_or_else(|| {
            LaminateError::validation(format!("parameter target '{target}' must look like LAYER.PROPERTY"))
        })?;
        if layer.is_empty() {
            return Err(LaminateError::validation(format!(
                "parameter '{s}' has an empty layer id"
            )));
        }
        Ok(Self::new(layer, TargetProperty::parse(property)?, value))
    }
}

/// Return a copy of `composition` with every complete parameter applied and `parameters` cleared.
///
/// Parameters missing a target or value, and parameters naming an unknown layer, are skipped.
/// Values that do not parse for their target fail with [`LaminateError::Validation`].
pub fn apply_parameters(composition: &Composition) -> LaminateResult<Composition> {
    let mut out = composition.clone();
    let params = std::mem::take(&mut out.parameters);

    for param in &params {
        let (Some(layer_id), Some(property), Some(value)) = (
            param.target_layer.as_deref(),
            param.target_property,
            param.value.as_deref(),
        ) else {
            tracing::debug!(param_id = ?param.id, "skipping incomplete parameter");
            continue;
        };

        let Some(layer) = out
            .layers
            .iter_mut()
            .find(|l| l.id.as_deref() == Some(layer_id))
        else {
            tracing::debug!(layer_id, "parameter targets unknown layer, skipping");
            continue;
        };

        apply_one(layer, property, value).map_err(|e| {
            LaminateError::validation(format!(
                "parameter {}.{}: {e}",
                layer_id,
                property.as_str()
            ))
        })?;
    }

    Ok(out)
}

fn apply_one(layer: &mut Layer, property: TargetProperty, value: &str) -> Result<(), String> {
    match property {
        TargetProperty::Position => layer.position = parse_json::<Position>(value)?,
        TargetProperty::Scale => layer.scale = parse_json::<Scale>(value)?,
        TargetProperty::Origin => layer.origin = OriginDescriptor::new(value),
        TargetProperty::Alignment => layer.alignment = OriginDescriptor::new(value),
        TargetProperty::Placement => {
            layer.placement = serde_json::from_value::<Placement>(serde_json::Value::String(
                value.to_owned(),
            ))
            .map_err(|e| e.to_string())?;
        }
        TargetProperty::Opacity => {
            let v: f64 = value
                .trim()
                .parse()
                .map_err(|_| format!("'{value}' is not a number"))?;
            layer.opacity = v;
        }
        TargetProperty::ContentLocation => match &mut layer.content {
            LayerContent::Image(img) => img.location = Some(value.to_owned()),
            other => return Err(format!("expects an image layer, found {}", other.kind())),
        },
        TargetProperty::ContentColor => match &mut layer.content {
            LayerContent::Solid(solid) => solid.color = Some(parse_json::<Rgba>(value)?),
            other => return Err(format!("expects a solid layer, found {}", other.kind())),
        },
    }
    Ok(())
}

fn parse_json<T: serde::de::DeserializeOwned>(value: &str) -> Result<T, String> {
    serde_json::from_str(value).map_err(|e| format!("'{value}': {e}"))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/params.rs"]
mod tests;
