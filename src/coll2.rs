//! Typed view of the Decked Builder `*.coll2` format.
//!
//! A `*.coll2` file is YAML. Parsed, it looks like:
//!
//! ```text
//! doc:
//! - version: 1
//! - items:
//!   - - id: 12345
//!     - r: 2
//!   - - id: 54321
//!     - r: 4
//!     - f: 1
//! ```
//!
//! [`decode`] turns that generic tree into a [`Coll2`] and [`encode`] builds
//! the tree back from typed items.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

const DOC_KEY: &str = "doc";
const VERSION_KEY: &str = "version";
const ITEMS_KEY: &str = "items";
const ID_TAG: &str = "id";
const REGULAR_TAG: &str = "r";
const FOIL_TAG: &str = "f";

/// One card line: identifier plus regular and foil quantities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Item {
    pub id: i64,
    pub regular: u64,
    pub foil: u64,
}

/// A decoded collection file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coll2 {
    pub version: i64,
    pub items: Vec<Item>,
}

/// The tree does not have the `*.coll2` shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ShapeError(String);

impl ShapeError {
    fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Decode a parsed `*.coll2` document.
pub fn decode(document: &Value) -> Result<Coll2, ShapeError> {
    let sections = document
        .get(DOC_KEY)
        .and_then(Value::as_sequence)
        .ok_or_else(|| ShapeError::new("expected a top-level `doc` sequence"))?;

    let version = sections
        .first()
        .and_then(|section| section.get(VERSION_KEY))
        .ok_or_else(|| ShapeError::new("first `doc` section must hold `version`"))?;
    let version = version.as_i64().ok_or_else(|| {
        ShapeError::new(format!(
            "`version` must be an integer, found {}",
            kind(version)
        ))
    })?;

    let items = match sections.get(1).and_then(|section| section.get(ITEMS_KEY)) {
        Some(Value::Sequence(items)) => items
            .iter()
            .enumerate()
            .map(|(position, item)| decode_item(position, item))
            .collect::<Result<Vec<_>, _>>()?,
        // a bare `items:` key
        Some(Value::Null) => Vec::new(),
        Some(other) => {
            return Err(ShapeError::new(format!(
                "`items` must be a sequence, found {}",
                kind(other)
            )));
        }
        None => return Err(ShapeError::new("second `doc` section must hold `items`")),
    };

    Ok(Coll2 { version, items })
}

fn decode_item(position: usize, item: &Value) -> Result<Item, ShapeError> {
    let fields = item.as_sequence().ok_or_else(|| {
        ShapeError::new(format!(
            "item {position}: expected a sequence, found {}",
            kind(item)
        ))
    })?;
    let (head, rest) = fields
        .split_first()
        .ok_or_else(|| ShapeError::new(format!("item {position}: empty item")))?;
    let id = head
        .get(ID_TAG)
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            ShapeError::new(format!(
                "item {position}: first element must be an integer `id`"
            ))
        })?;

    let mut decoded = Item {
        id,
        regular: 0,
        foil: 0,
    };
    for field in rest {
        let tags = field.as_mapping().ok_or_else(|| {
            ShapeError::new(format!(
                "item {position} (id {id}): expected a mapping, found {}",
                kind(field)
            ))
        })?;
        // Later tags overwrite earlier ones; anything but `r` or `f` is skipped.
        if let Some(quantity) = tags.get(REGULAR_TAG) {
            decoded.regular = decode_quantity(id, REGULAR_TAG, quantity)?;
        } else if let Some(quantity) = tags.get(FOIL_TAG) {
            decoded.foil = decode_quantity(id, FOIL_TAG, quantity)?;
        }
    }
    Ok(decoded)
}

fn decode_quantity(id: i64, tag: &str, value: &Value) -> Result<u64, ShapeError> {
    value.as_u64().ok_or_else(|| {
        ShapeError::new(format!(
            "id {id}: `{tag}` must be a non-negative integer, found {}",
            describe(value)
        ))
    })
}

/// Build a `*.coll2` document from a version and items, in item order.
///
/// A missing version is written as `null`. Zero quantities are left out, so
/// an item with neither regular nor foil copies is written as its `id` alone.
pub fn encode(version: Option<i64>, items: impl IntoIterator<Item = Item>) -> Value {
    let items = items.into_iter().map(encode_item).collect();
    let sections = vec![
        single(VERSION_KEY, version.map_or(Value::Null, Value::from)),
        single(ITEMS_KEY, Value::Sequence(items)),
    ];
    single(DOC_KEY, Value::Sequence(sections))
}

fn encode_item(item: Item) -> Value {
    let mut fields = vec![single(ID_TAG, Value::from(item.id))];
    if item.regular != 0 {
        fields.push(single(REGULAR_TAG, Value::from(item.regular)));
    }
    if item.foil != 0 {
        fields.push(single(FOIL_TAG, Value::from(item.foil)));
    }
    Value::Sequence(fields)
}

fn single(key: &str, value: Value) -> Value {
    let mut mapping = Mapping::new();
    mapping.insert(Value::from(key), value);
    Value::Mapping(mapping)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
        other => kind(other).to_string(),
    }
}
