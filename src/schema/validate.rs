use std::collections::HashSet;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::scene::model::{Composition, GradientPoint, LayerContent, LayerFrame, Rgba};

static REFERENCE_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9/-]+(:[a-z0-9.]+)?$"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaError {
    pub(crate) path: Vec<SchemaPathElem>,
    pub(crate) message: String,
}

impl SchemaError {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: path.to_vec(),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            return write!(f, "{}", self.message);
        }
        write!(f, "{}: {}", format_path(&self.path), self.message)
    }
}

fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

#[derive(Debug, Clone)]
pub(crate) struct SchemaErrors {
    pub(crate) errors: Vec<SchemaError>,
}

impl fmt::Display for SchemaErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaErrors {}

/// `true` when `reference` is a well-formed `name` or `name:tag`.
pub(crate) fn is_valid_reference(reference: &str) -> bool {
    match REFERENCE_RE.as_ref() {
        Ok(re) => re.is_match(reference),
        Err(_) => false,
    }
}

pub(crate) fn validate_composition(def: &Composition) -> Result<(), SchemaErrors> {
    let mut errors = Vec::new();
    let mut path = vec![SchemaPathElem::Field("size")];

    if def.size.width == 0 {
        path.push(SchemaPathElem::Field("width"));
        errors.push(SchemaError::at(&path, "must be > 0"));
        path.pop();
    }
    if def.size.height == 0 {
        path.push(SchemaPathElem::Field("height"));
        errors.push(SchemaError::at(&path, "must be > 0"));
        path.pop();
    }
    path.pop();

    let mut ids = HashSet::<&str>::new();
    path.push(SchemaPathElem::Field("layers"));
    for (i, layer) in def.layers.iter().enumerate() {
        path.push(SchemaPathElem::Index(i));

        if let Some(id) = layer.id.as_deref() {
            if id.is_empty() {
                path.push(SchemaPathElem::Field("id"));
                errors.push(SchemaError::at(&path, "must not be empty"));
                path.pop();
            } else if !ids.insert(id) {
                path.push(SchemaPathElem::Field("id"));
                errors.push(SchemaError::at(&path, format!("duplicate layer id '{id}'")));
                path.pop();
            }
        }

        if !layer.opacity.is_finite() || !(0.0..=100.0).contains(&layer.opacity) {
            path.push(SchemaPathElem::Field("opacity"));
            errors.push(SchemaError::at(&path, "must be a number in 0..=100"));
            path.pop();
        }

        validate_frame(&layer.frame(), &mut path, &mut errors);

        if let Some(mask) = &layer.mask {
            path.push(SchemaPathElem::Field("mask"));
            validate_frame(&mask.frame(), &mut path, &mut errors);
            path.pop();
        }

        path.pop();
    }
    path.pop();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(SchemaErrors { errors })
    }
}

fn validate_frame(
    frame: &LayerFrame<'_>,
    path: &mut Vec<SchemaPathElem>,
    errors: &mut Vec<SchemaError>,
) {
    if !frame.position.x.is_finite() || !frame.position.y.is_finite() {
        path.push(SchemaPathElem::Field("position"));
        errors.push(SchemaError::at(path, "x and y must be finite"));
        path.pop();
    }

    let s = frame.scale;
    if !s.x.is_finite() || !s.y.is_finite() || s.x <= 0.0 || s.y <= 0.0 {
        path.push(SchemaPathElem::Field("scale"));
        errors.push(SchemaError::at(path, "x and y must be finite and > 0"));
        path.pop();
    }

    path.push(SchemaPathElem::Field("content"));
    match frame.content {
        LayerContent::Solid(solid) => {
            if let Some(color) = &solid.color {
                path.push(SchemaPathElem::Field("color"));
                validate_color(color, path, errors);
                path.pop();
            }
        }
        LayerContent::Gradient(gradient) => {
            path.push(SchemaPathElem::Field("color"));
            for (name, color) in [("from", &gradient.color.from), ("to", &gradient.color.to)] {
                path.push(SchemaPathElem::Field(name));
                validate_color(color, path, errors);
                path.pop();
            }
            path.pop();

            path.push(SchemaPathElem::Field("pos"));
            for (name, point) in [("from", &gradient.pos.from), ("to", &gradient.pos.to)] {
                path.push(SchemaPathElem::Field(name));
                validate_point(point, path, errors);
                path.pop();
            }
            path.pop();
        }
        LayerContent::Image(image) => {
            if image.location.as_deref().is_some_and(|l| l.trim().is_empty()) {
                path.push(SchemaPathElem::Field("location"));
                errors.push(SchemaError::at(path, "must not be empty"));
                path.pop();
            }
        }
        LayerContent::Composition(nested) => {
            if let Some(reference) = nested.reference.as_deref()
                && !is_valid_reference(reference)
            {
                path.push(SchemaPathElem::Field("ref"));
                errors.push(SchemaError::at(
                    path,
                    format!("'{reference}' must look like name or name:tag"),
                ));
                path.pop();
            }
        }
    }
    path.pop();
}

fn validate_color(color: &Rgba, path: &mut Vec<SchemaPathElem>, errors: &mut Vec<SchemaError>) {
    if !color.a.is_finite() || !(0.0..=1.0).contains(&color.a) {
        path.push(SchemaPathElem::Field("a"));
        errors.push(SchemaError::at(path, "must be a number in 0..=1"));
        path.pop();
    }
}

fn validate_point(
    point: &GradientPoint,
    path: &mut Vec<SchemaPathElem>,
    errors: &mut Vec<SchemaError>,
) {
    for (name, v) in [("x", point.x), ("y", point.y)] {
        if v.is_some_and(|v| !v.is_finite()) {
            path.push(SchemaPathElem::Field(name));
            errors.push(SchemaError::at(path, "must be finite"));
            path.pop();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
