//! Declarative mapping from Canvas models to request payloads.
//!
//! # Design
//! Canvas is inconsistent about parameter names: some endpoints take flat
//! `field=value` pairs, others `object[field]=value`, and create/edit
//! endpoints take a JSON body wrapped in a named container. Rather than one
//! serializer per resource, every model declares static metadata once per
//! type (`CanvasModel::OBJECT` and `CanvasModel::FIELDS`) and the generic
//! routines here derive both payload shapes from it.
//!
//! Field values come from a single serde pass over the model, looked up by
//! the field's serialized name. Models therefore only need `Serialize` plus
//! their metadata tables.

pub mod assignment;
pub mod conversation;
pub mod login;
pub mod quiz;

use std::any::type_name;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::MappingError;
use crate::form::PostMap;

pub use assignment::Assignment;
pub use conversation::Conversation;
pub use login::Login;
pub use quiz::{QuizSubmissionQuestion, QuizSubmissionQuestionWrapper};

/// Type-level metadata: the key wrapping the model in JSON and array-style
/// form payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasObject {
    pub post_key: Option<&'static str>,
}

impl CanvasObject {
    pub const fn keyed(post_key: &'static str) -> Self {
        Self {
            post_key: Some(post_key),
        }
    }

    pub const fn unkeyed() -> Self {
        Self { post_key: None }
    }
}

/// Per-field metadata for form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasField {
    /// Member name in the model's serde representation.
    pub name: &'static str,
    /// Parameter name Canvas expects.
    pub post_key: &'static str,
    /// Nest the key as `object[post_key]`.
    pub array: bool,
    /// Object name to nest under instead of the model's own key.
    pub override_object_key: Option<&'static str>,
    /// Append `[]` so Canvas reads repeated values as a list.
    pub list: bool,
}

impl CanvasField {
    /// A field posted as `post_key=value`.
    pub const fn flat(name: &'static str, post_key: &'static str) -> Self {
        Self {
            name,
            post_key,
            array: false,
            override_object_key: None,
            list: false,
        }
    }

    /// A field posted as `<object key>[post_key]=value`.
    pub const fn nested(name: &'static str, post_key: &'static str) -> Self {
        Self {
            name,
            post_key,
            array: true,
            override_object_key: None,
            list: false,
        }
    }

    /// A field posted as `<object_key>[post_key]=value` regardless of the
    /// model's own key.
    pub const fn nested_under(
        name: &'static str,
        object_key: &'static str,
        post_key: &'static str,
    ) -> Self {
        Self {
            name,
            post_key,
            array: true,
            override_object_key: Some(object_key),
            list: false,
        }
    }

    /// Mark the field as list-valued: `key[]=a&key[]=b`.
    pub const fn list(self) -> Self {
        Self { list: true, ..self }
    }

    /// Resolve the form key for this field on a model declaring `object`.
    pub fn form_key(&self, object: CanvasObject, model: &'static str) -> Result<String, MappingError> {
        let mut key = if self.array {
            let wrapper = match self.override_object_key.filter(|key| !key.is_empty()) {
                Some(key) => key,
                None => object
                    .post_key
                    .ok_or(MappingError::MissingObjectKey { model })?,
            };
            format!("{wrapper}[{}]", self.post_key)
        } else {
            self.post_key.to_string()
        };
        if self.list {
            key.push_str("[]");
        }
        Ok(key)
    }
}

/// A Canvas resource that can be submitted as form parameters or JSON.
pub trait CanvasModel: Serialize {
    const OBJECT: CanvasObject;
    const FIELDS: &'static [CanvasField];

    /// Map every declared field to its Canvas form key.
    fn to_post_map(&self) -> Result<PostMap, MappingError> {
        let model = short_type_name::<Self>();
        let values = field_values(self, model)?;
        let mut post_map = PostMap::new();
        for field in Self::FIELDS {
            let key = field.form_key(Self::OBJECT, model)?;
            let value = values
                .get(field.name)
                .cloned()
                .ok_or_else(|| MappingError::FieldAccess {
                    model,
                    reason: format!("no serialized member `{}`", field.name),
                })?;
            post_map.insert(key, value);
        }
        Ok(post_map)
    }

    /// Wrap the model under its object key, e.g.
    /// `{"assignment": {"name": "Assignment 1"}}`.
    fn to_json_object(&self) -> Result<Value, MappingError> {
        let model = short_type_name::<Self>();
        let post_key = Self::OBJECT
            .post_key
            .ok_or(MappingError::MissingObjectKey { model })?;
        let mut element = Value::Object(field_values(self, model)?);
        strip_nulls(&mut element);
        let mut wrapped = Map::new();
        wrapped.insert(post_key.to_string(), element);
        Ok(Value::Object(wrapped))
    }
}

fn field_values<M: Serialize + ?Sized>(
    model: &M,
    name: &'static str,
) -> Result<Map<String, Value>, MappingError> {
    match serde_json::to_value(model) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(MappingError::FieldAccess {
            model: name,
            reason: format!("expected a JSON object, got {other}"),
        }),
        Err(e) => {
            tracing::error!(model = name, error = %e, "could not access Canvas model fields");
            Err(MappingError::FieldAccess {
                model: name,
                reason: e.to_string(),
            })
        }
    }
}

/// Drop `null` object members at every depth.
fn strip_nulls(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.retain(|_, v| !v.is_null());
            map.values_mut().for_each(strip_nulls);
        }
        Value::Array(items) => items.iter_mut().for_each(strip_nulls),
        _ => {}
    }
}

fn short_type_name<T: ?Sized>() -> &'static str {
    let full = type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}
