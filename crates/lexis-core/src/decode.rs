//! Raw property string -> typed `Property`.
//!
//! Each widget type has one encoding:
//!
//! | widget       | raw                      | decoded                 |
//! |--------------|--------------------------|-------------------------|
//! | PLAIN        | text                     | `Plain`                 |
//! | KEY_VALUE    | text                     | `Simple`                |
//! | MORPHOLOGY   | `a\|b\|c`                | `Morphology`            |
//! | AUDIO        | `name;;;resource`        | `Audio`                 |
//! | EXAMPLE      | `name;;;content`         | `Example`               |
//! | URL          | `name;;;url`             | `Url`                   |
//! | WORDNET      | `name;;;reference`       | `Wordnet`               |
//! | REFERENCE    | `name;;;target lexeme`   | `Reference` (pending)   |
//!
//! A composite without the separator is skipped, not an error. Reference
//! targets are filled in by the assembler.

use serde::Serialize;

use crate::entry::DictionaryEntry;
use crate::model::{LexemeId, WidgetType};

pub const COMPOSITE_SEPARATOR: &str = ";;;";
pub const LIST_SEPARATOR: char = '|';

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Property {
    Plain(String),
    Simple(String),
    Morphology(Vec<String>),
    Audio { name: String, resource: String },
    Example { name: String, content: String },
    Url { name: String, url: String },
    Wordnet { name: String, reference: String },
    Reference { name: String, target: ReferenceTarget },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ReferenceTarget {
    /// Target id, not yet looked up. Left as-is in shallow snapshots.
    Pending(LexemeId),
    Resolved(Box<DictionaryEntry>),
}

impl ReferenceTarget {
    pub fn id(&self) -> &str {
        match self {
            ReferenceTarget::Pending(id) => id,
            ReferenceTarget::Resolved(entry) => &entry.id,
        }
    }
}

/// Why a raw value was left out of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSkip {
    MissingSegment,
    MissingReferenceTarget,
}

pub fn decode(widget: WidgetType, raw: &str) -> Result<Property, DecodeSkip> {
    match widget {
        WidgetType::Plain => Ok(Property::Plain(raw.to_string())),
        WidgetType::KeyValue => Ok(Property::Simple(raw.to_string())),
        WidgetType::Morphology => Ok(Property::Morphology(
            raw.split(LIST_SEPARATOR).map(str::to_string).collect(),
        )),
        WidgetType::Audio => composite(raw).map(|(name, resource)| Property::Audio { name, resource }),
        WidgetType::Example => composite(raw).map(|(name, content)| Property::Example { name, content }),
        WidgetType::Url => composite(raw).map(|(name, url)| Property::Url { name, url }),
        WidgetType::Wordnet => {
            composite(raw).map(|(name, reference)| Property::Wordnet { name, reference })
        }
        WidgetType::Reference => {
            let (name, target) = composite(raw)?;
            let target = target.trim();
            if target.is_empty() {
                return Err(DecodeSkip::MissingReferenceTarget);
            }
            Ok(Property::Reference {
                name,
                target: ReferenceTarget::Pending(target.to_string()),
            })
        }
    }
}

fn composite(raw: &str) -> Result<(String, String), DecodeSkip> {
    raw.split_once(COMPOSITE_SEPARATOR)
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or(DecodeSkip::MissingSegment)
}
