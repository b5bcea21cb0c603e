//! Revisions, their editors, and revision input.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
  entity::Bbid,
  sets::{NewAlias, NewIdentifier, NewRelationship, NewReleaseEvent},
};

/// An immutable marker for one change to one entity.
///
/// Revision ids are allocated from a monotonic sequence, so a larger id is
/// always a later revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Revision {
  pub id:         i64,
  pub author_id:  i64,
  pub note:       Option<String>,
  pub created_at: DateTime<Utc>,
  /// The revision this one replaced as master, if any.
  pub parent_id:  Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Editor {
  pub id:         i64,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::store::EntityModel::insert_revision`].
///
/// Describes the complete new state of the entity. Sets whose content equals
/// the previous revision's are shared rather than rewritten. Any field not
/// listed here is treated as a type-specific attribute and projected with
/// [`crate::attributes::EntityAttributes::project`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRevision {
  pub editor_id:      i64,
  #[serde(default)]
  pub note:           Option<String>,
  #[serde(default)]
  pub aliases:        Vec<NewAlias>,
  #[serde(default)]
  pub identifiers:    Vec<NewIdentifier>,
  #[serde(default)]
  pub relationships:  Vec<NewRelationship>,
  #[serde(default)]
  pub annotation:     Option<String>,
  #[serde(default)]
  pub disambiguation: Option<String>,
  #[serde(default)]
  pub languages:      Vec<i64>,
  #[serde(default)]
  pub publishers:     Vec<Bbid>,
  #[serde(default)]
  pub release_events: Vec<NewReleaseEvent>,
  #[serde(flatten)]
  pub attributes:     Map<String, Value>,
}

impl NewRevision {
  /// Convenience constructor with every set empty.
  pub fn new(editor_id: i64) -> Self {
    Self { editor_id, ..Self::default() }
  }

  pub fn with_alias(mut self, alias: NewAlias) -> Self {
    self.aliases.push(alias);
    self
  }

  pub fn with_attribute(mut self, key: &str, value: impl Into<Value>) -> Self {
    self.attributes.insert(key.to_owned(), value.into());
    self
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn deserialises_sets_and_flattened_attributes() {
    let input: NewRevision = serde_json::from_value(json!({
      "editorId": 1,
      "note": "initial import",
      "aliases": [{ "name": "Bob Marley", "sortName": "Marley, Bob", "primary": true }],
      "languages": [1, 2],
      "beginDate": "1945-02-06",
      "typeId": 1
    }))
    .unwrap();

    assert_eq!(input.editor_id, 1);
    assert_eq!(input.aliases.len(), 1);
    assert!(input.aliases[0].primary);
    assert_eq!(input.languages, [1, 2]);
    assert_eq!(input.attributes.get("beginDate"), Some(&json!("1945-02-06")));
    assert!(!input.attributes.contains_key("aliases"));
  }
}
