//! Entity identity, entity types, and the decoded row/snapshot read models.
//!
//! Every entity type is stored in its own table, one row per revision. The
//! row flagged `master` is the current state; the others are history.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  attributes::EntityAttributes,
  derived_set::{DerivedSet, DerivedSetKind},
  revision::Revision,
  sets::{
    Alias, AliasSet, Annotation, Disambiguation, IdentifierSet, LanguageSet,
    PublisherSet, RelationshipSet, ReleaseEventSet,
  },
  Error, Result,
};

// ─── Bbid ────────────────────────────────────────────────────────────────────

/// The business identifier of an entity, stable across all its revisions.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Bbid(pub Uuid);

impl Bbid {
  pub fn new_v4() -> Self { Self(Uuid::new_v4()) }
}

impl fmt::Display for Bbid {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0.hyphenated())
  }
}

impl FromStr for Bbid {
  type Err = uuid::Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> { Ok(Self(Uuid::parse_str(s)?)) }
}

// ─── EntityType ──────────────────────────────────────────────────────────────

/// The closed set of versioned entity types.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
  IntoStaticStr,
)]
pub enum EntityType {
  Author,
  Edition,
  EditionGroup,
  Publisher,
  Work,
}

impl EntityType {
  /// Parse an entity type name (`"Author"`, `"EditionGroup"`, ...).
  pub fn parse(name: &str) -> Result<Self> {
    name
      .parse()
      .map_err(|_| Error::UnrecognizedEntityType(name.to_owned()))
  }

  /// The table holding this type's revision rows.
  ///
  /// This is the only source of table names interpolated into SQL.
  pub fn table_name(self) -> &'static str {
    match self {
      Self::Author => "author",
      Self::Edition => "edition",
      Self::EditionGroup => "edition_group",
      Self::Publisher => "publisher",
      Self::Work => "work",
    }
  }

  /// Whether this type can load `relation`.
  pub fn supports(self, relation: Relation) -> bool {
    match relation.derived_set_kind() {
      Some(kind) => self.derived_set(kind).is_some(),
      None => true,
    }
  }

  /// Look up one of this type's derived sets by kind.
  pub fn derived_set(self, kind: DerivedSetKind) -> Option<&'static DerivedSet> {
    self.derived_sets().iter().find(|set| set.kind == kind)
  }
}

// ─── Relation ────────────────────────────────────────────────────────────────

/// A relation that can be eagerly loaded alongside an entity row.
///
/// The camelCase names double as the keys of [`EntitySnapshot`] JSON.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  AsRefStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Relation {
  AliasSet,
  DefaultAlias,
  IdentifierSet,
  RelationshipSet,
  Annotation,
  Disambiguation,
  Revision,
  LanguageSet,
  PublisherSet,
  ReleaseEventSet,
}

impl Relation {
  pub fn parse(name: &str) -> Result<Self> {
    name
      .parse()
      .map_err(|_| Error::UnknownRelation(name.to_owned()))
  }

  /// The derived set this relation loads, if it is one.
  pub fn derived_set_kind(self) -> Option<DerivedSetKind> {
    match self {
      Self::LanguageSet => Some(DerivedSetKind::Language),
      Self::PublisherSet => Some(DerivedSetKind::Publisher),
      Self::ReleaseEventSet => Some(DerivedSetKind::ReleaseEvent),
      _ => None,
    }
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One revision row of an entity, decoded from its type-specific table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRow {
  pub bbid:                 Bbid,
  #[serde(rename = "type")]
  pub entity_type:          EntityType,
  pub revision_id:          i64,
  pub master:               bool,
  /// Set on the master row of a logically deleted entity.
  pub deleted:              bool,
  pub alias_set_id:         Option<i64>,
  pub default_alias_id:     Option<i64>,
  pub identifier_set_id:    Option<i64>,
  pub relationship_set_id:  Option<i64>,
  pub annotation_id:        Option<i64>,
  pub disambiguation_id:    Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub language_set_id:      Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub publisher_set_id:     Option<i64>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub release_event_set_id: Option<i64>,
  /// `None` for deleted rows, which carry no data.
  #[serde(flatten)]
  pub attributes:           Option<EntityAttributes>,
}

impl EntityRow {
  /// The foreign key of one of this row's derived sets.
  pub fn derived_set_id(&self, kind: DerivedSetKind) -> Option<i64> {
    match kind {
      DerivedSetKind::Language => self.language_set_id,
      DerivedSetKind::Publisher => self.publisher_set_id,
      DerivedSetKind::ReleaseEvent => self.release_event_set_id,
    }
  }
}

/// Relations loaded alongside a row. Only requested relations are populated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedData {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub alias_set:         Option<AliasSet>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub default_alias:     Option<Alias>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub identifier_set:    Option<IdentifierSet>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub relationship_set:  Option<RelationshipSet>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub annotation:        Option<Annotation>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub disambiguation:    Option<Disambiguation>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub revision:          Option<Revision>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub language_set:      Option<LanguageSet>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub publisher_set:     Option<PublisherSet>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub release_event_set: Option<ReleaseEventSet>,
}

/// A fully-resolved, plain-data view of an entity row and its relations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
  #[serde(flatten)]
  pub row:     EntityRow,
  #[serde(flatten)]
  pub related: RelatedData,
}
