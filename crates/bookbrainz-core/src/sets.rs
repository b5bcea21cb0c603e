//! Shared and derived child collections referenced by entity rows.
//!
//! Sets are immutable once written. A new revision either points at the
//! previous revision's set (content unchanged) or at a freshly written one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{derived_set::DerivedSet, entity::Bbid, Result};

// ─── Aliases ─────────────────────────────────────────────────────────────────

/// A name for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
  pub id:          i64,
  pub name:        String,
  pub sort_name:   String,
  pub language_id: Option<i64>,
  #[serde(default, deserialize_with = "crate::flag::deserialize")]
  pub primary:     bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasSet {
  pub id:               i64,
  pub default_alias_id: Option<i64>,
  pub aliases:          Vec<Alias>,
}

impl AliasSet {
  pub fn default_alias(&self) -> Option<&Alias> {
    let id = self.default_alias_id?;
    self.aliases.iter().find(|a| a.id == id)
  }
}

/// An alias as submitted with a revision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlias {
  pub name:        String,
  pub sort_name:   String,
  #[serde(default)]
  pub language_id: Option<i64>,
  #[serde(default)]
  pub primary:     bool,
  /// Requests this alias as the set's default.
  #[serde(default)]
  pub default:     bool,
}

impl NewAlias {
  pub fn matches(&self, alias: &Alias) -> bool {
    self.name == alias.name
      && self.sort_name == alias.sort_name
      && self.language_id == alias.language_id
      && self.primary == alias.primary
  }
}

/// Choose the default alias: the first flagged `default`, else the first
/// primary alias, else the first alias.
pub fn default_alias_index(aliases: &[NewAlias]) -> Option<usize> {
  aliases
    .iter()
    .position(|a| a.default)
    .or_else(|| aliases.iter().position(|a| a.primary))
    .or(if aliases.is_empty() { None } else { Some(0) })
}

/// Whether `incoming` describes exactly the content of `previous`, including
/// which alias is the default.
pub fn alias_set_unchanged(previous: &AliasSet, incoming: &[NewAlias]) -> bool {
  if previous.aliases.len() != incoming.len() {
    return false;
  }
  let same_aliases = previous
    .aliases
    .iter()
    .zip(incoming)
    .all(|(old, new)| new.matches(old));
  let old_default = previous
    .default_alias_id
    .and_then(|id| previous.aliases.iter().position(|a| a.id == id));
  same_aliases && old_default == default_alias_index(incoming)
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// An external identifier (ISBN, Wikidata id, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
  pub id:      i64,
  pub type_id: i64,
  pub value:   String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierSet {
  pub id:          i64,
  pub identifiers: Vec<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewIdentifier {
  pub type_id: i64,
  pub value:   String,
}

pub fn identifier_set_unchanged(
  previous: &IdentifierSet,
  incoming: &[NewIdentifier],
) -> bool {
  previous.identifiers.len() == incoming.len()
    && previous
      .identifiers
      .iter()
      .zip(incoming)
      .all(|(old, new)| old.type_id == new.type_id && old.value == new.value)
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
  pub id:          i64,
  pub type_id:     i64,
  pub source_bbid: Bbid,
  pub target_bbid: Bbid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipSet {
  pub id:            i64,
  pub relationships: Vec<Relationship>,
}

/// A relationship from the revised entity to `target_bbid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelationship {
  pub type_id:     i64,
  pub target_bbid: Bbid,
}

pub fn relationship_set_unchanged(
  previous: &RelationshipSet,
  incoming: &[NewRelationship],
) -> bool {
  previous.relationships.len() == incoming.len()
    && previous
      .relationships
      .iter()
      .zip(incoming)
      .all(|(old, new)| old.type_id == new.type_id && old.target_bbid == new.target_bbid)
}

// ─── Annotation & disambiguation ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
  pub id:               i64,
  pub content:          String,
  /// The revision that last changed the content.
  pub last_revision_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disambiguation {
  pub id:      i64,
  pub comment: String,
}

// ─── Derived sets ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
  pub id:       i64,
  pub name:     String,
  pub iso_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageSet {
  pub id:        i64,
  pub languages: Vec<Language>,
}

/// A publisher referenced from an edition, with its current default name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherRef {
  pub bbid: Bbid,
  pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherSet {
  pub id:         i64,
  pub publishers: Vec<PublisherRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEvent {
  pub id:      i64,
  pub date:    Option<String>,
  pub area_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseEventSet {
  pub id:             i64,
  pub release_events: Vec<ReleaseEvent>,
}

/// A release event as submitted with a revision. `id` refers to an event of
/// the previous revision's set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReleaseEvent {
  #[serde(default)]
  pub id:      Option<i64>,
  #[serde(default)]
  pub date:    Option<String>,
  #[serde(default)]
  pub area_id: Option<i64>,
}

/// What to do with one incoming item of a derived set with owned item rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPlan<T> {
  /// Link the existing item row with this id.
  Keep(i64),
  /// Write a new item row.
  Insert(T),
}

/// Match incoming items against the previous set's items using the set's
/// comparison fields.
///
/// An incoming item carrying an id keeps that previous item only when all of
/// the set's mutable fields are unchanged. An item without an id keeps any
/// not-yet-matched previous item with identical mutable fields. Everything
/// else becomes a new row; previous rows are never modified.
pub fn plan_items<Old, New>(
  set: &DerivedSet,
  previous: &[Old],
  incoming: Vec<New>,
) -> Result<Vec<ItemPlan<New>>>
where
  Old: Serialize,
  New: Serialize,
{
  let mutable = set.mutable_fields.unwrap_or_default();
  let previous: Vec<Value> = previous
    .iter()
    .map(serde_json::to_value)
    .collect::<Result<_, _>>()?;
  let mut used = vec![false; previous.len()];

  let mut plans = Vec::with_capacity(incoming.len());
  for item in incoming {
    let value = serde_json::to_value(&item)?;
    let id = value.get(set.id_field).filter(|v| !v.is_null());
    let same_fields =
      |old: &Value| mutable.iter().all(|f| old.get(*f) == value.get(*f));

    let found = previous.iter().enumerate().position(|(i, old)| {
      !used[i]
        && match id {
          Some(id) => old.get(set.id_field) == Some(id) && same_fields(old),
          None => same_fields(old),
        }
    });

    let kept = found.and_then(|i| {
      used[i] = true;
      previous[i].get(set.id_field).and_then(Value::as_i64)
    });
    plans.push(match kept {
      Some(id) => ItemPlan::Keep(id),
      None => ItemPlan::Insert(item),
    });
  }
  Ok(plans)
}
