//! Derived-set metadata.
//!
//! Some entity types own secondary collections beyond the shared alias,
//! identifier and relationship sets. The descriptors below are static
//! configuration; their field names are part of the wire format.

use serde::Serialize;

use crate::{case::snake_case, entity::EntityType};

/// Which derived collection a descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DerivedSetKind {
  Language,
  Publisher,
  ReleaseEvent,
}

/// Describes one derived set attached to an entity row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedSet {
  /// Foreign-key field on the entity row.
  pub entity_id_field: &'static str,
  /// Primary-key field of the set's items.
  pub id_field:        &'static str,
  /// Item fields whose change yields a new item rather than a new identity.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub mutable_fields:  Option<&'static [&'static str]>,
  pub name:            &'static str,
  /// Property under which the items are exposed.
  pub prop_name:       &'static str,
  #[serde(skip)]
  pub kind:            DerivedSetKind,
}

impl DerivedSet {
  /// The storage column holding this set's id on the entity row.
  pub fn entity_id_column(&self) -> String { snake_case(self.entity_id_field) }

  /// Fields compared when deciding whether an item changed.
  pub fn comparison_fields(&self) -> Vec<&'static str> {
    let mut fields = vec![self.id_field];
    fields.extend(self.mutable_fields.unwrap_or_default());
    fields
  }
}

const LANGUAGE_SET: DerivedSet = DerivedSet {
  entity_id_field: "languageSetId",
  id_field:        "id",
  mutable_fields:  None,
  name:            "languageSet",
  prop_name:       "languages",
  kind:            DerivedSetKind::Language,
};

const PUBLISHER_SET: DerivedSet = DerivedSet {
  entity_id_field: "publisherSetId",
  id_field:        "bbid",
  mutable_fields:  None,
  name:            "publisherSet",
  prop_name:       "publishers",
  kind:            DerivedSetKind::Publisher,
};

const RELEASE_EVENT_SET: DerivedSet = DerivedSet {
  entity_id_field: "releaseEventSetId",
  id_field:        "id",
  mutable_fields:  Some(&["date", "areaId"]),
  name:            "releaseEventSet",
  prop_name:       "releaseEvents",
  kind:            DerivedSetKind::ReleaseEvent,
};

static EDITION_SETS: [DerivedSet; 3] = [LANGUAGE_SET, PUBLISHER_SET, RELEASE_EVENT_SET];
static WORK_SETS: [DerivedSet; 1] = [LANGUAGE_SET];

impl EntityType {
  /// The derived sets attached to this type, in a fixed order.
  pub fn derived_sets(self) -> &'static [DerivedSet] {
    match self {
      Self::Edition => &EDITION_SETS,
      Self::Work => &WORK_SETS,
      Self::Author | Self::EditionGroup | Self::Publisher => &[],
    }
  }
}

/// Derived-set metadata for the type named `entity_type`; empty when the type
/// has none or is not recognized.
pub fn entity_set_metadata_by_type(entity_type: &str) -> Vec<DerivedSet> {
  EntityType::parse(entity_type)
    .map(|t| t.derived_sets().to_vec())
    .unwrap_or_default()
}
