//! Per-type attribute projection.
//!
//! Each entity type carries a fixed set of type-specific attributes on top of
//! the shared sets. Projection picks those fields out of a generic payload
//! (form data, or a storage row after case translation) and computes the
//! derived date components inline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
  date::PartialDate,
  entity::{Bbid, EntityType},
  Result,
};

// ─── Life span ───────────────────────────────────────────────────────────────

/// Begin/end dates shared by authors and publishers.
///
/// The `*_year`, `*_month` and `*_day` fields are always derived from the date
/// strings and never read from input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "LifeSpanInput")]
pub struct LifeSpan {
  pub begin_date:  Option<String>,
  pub begin_year:  Option<i32>,
  pub begin_month: Option<i32>,
  pub begin_day:   Option<i32>,
  pub end_date:    Option<String>,
  pub end_year:    Option<i32>,
  pub end_month:   Option<i32>,
  pub end_day:     Option<i32>,
  pub ended:       bool,
}

impl LifeSpan {
  pub fn new(begin_date: Option<String>, end_date: Option<String>, ended: bool) -> Self {
    let begin = PartialDate::parse(begin_date.as_deref());
    let end = PartialDate::parse(end_date.as_deref());
    Self {
      begin_date,
      begin_year: begin.year,
      begin_month: begin.month,
      begin_day: begin.day,
      end_date,
      end_year: end.year,
      end_month: end.month,
      end_day: end.day,
      ended,
    }
  }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LifeSpanInput {
  begin_date: Option<String>,
  end_date:   Option<String>,
  #[serde(default, deserialize_with = "crate::flag::deserialize")]
  ended:      bool,
}

impl From<LifeSpanInput> for LifeSpan {
  fn from(input: LifeSpanInput) -> Self {
    Self::new(input.begin_date, input.end_date, input.ended)
  }
}

// ─── Per-type attributes ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorAttributes {
  pub type_id:       Option<i64>,
  pub gender_id:     Option<i64>,
  pub begin_area_id: Option<i64>,
  pub end_area_id:   Option<i64>,
  #[serde(flatten)]
  pub life_span:     LifeSpan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublisherAttributes {
  pub type_id:   Option<i64>,
  pub area_id:   Option<i64>,
  #[serde(flatten)]
  pub life_span: LifeSpan,
}

/// Physical and bibliographic attributes of an edition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditionAttributes {
  pub edition_group_bbid: Option<Bbid>,
  pub width:              Option<i64>,
  pub height:             Option<i64>,
  pub depth:              Option<i64>,
  pub weight:             Option<i64>,
  pub pages:              Option<i64>,
  pub format_id:          Option<i64>,
  pub status_id:          Option<i64>,
}

/// Edition groups and works carry nothing but a type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeAttributes {
  pub type_id: Option<i64>,
}

// ─── EntityAttributes ────────────────────────────────────────────────────────

/// The type-specific attributes of one entity row.
///
/// Serialises as a flat object without a tag; the entity type is carried by
/// the enclosing row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntityAttributes {
  Author(AuthorAttributes),
  Edition(EditionAttributes),
  EditionGroup(TypeAttributes),
  Publisher(PublisherAttributes),
  Work(TypeAttributes),
}

impl EntityAttributes {
  /// Pick the attributes relevant to `entity_type` out of `payload`.
  ///
  /// Unrelated fields are ignored. A relevant field holding the wrong JSON
  /// type is an error.
  pub fn project(entity_type: EntityType, payload: &Value) -> Result<Self> {
    Ok(match entity_type {
      EntityType::Author => Self::Author(AuthorAttributes::deserialize(payload)?),
      EntityType::Edition => Self::Edition(EditionAttributes::deserialize(payload)?),
      EntityType::EditionGroup => {
        Self::EditionGroup(TypeAttributes::deserialize(payload)?)
      }
      EntityType::Publisher => {
        Self::Publisher(PublisherAttributes::deserialize(payload)?)
      }
      EntityType::Work => Self::Work(TypeAttributes::deserialize(payload)?),
    })
  }

  pub fn entity_type(&self) -> EntityType {
    match self {
      Self::Author(_) => EntityType::Author,
      Self::Edition(_) => EntityType::Edition,
      Self::EditionGroup(_) => EntityType::EditionGroup,
      Self::Publisher(_) => EntityType::Publisher,
      Self::Work(_) => EntityType::Work,
    }
  }
}

/// Project `entity_data` for the type named `entity_type`.
///
/// Returns `Ok(None)` for an unrecognized type name: the caller has no
/// type-specific data, which is not an error.
pub fn additional_entity_props(
  entity_data: &Value,
  entity_type: &str,
) -> Result<Option<Value>> {
  let Ok(entity_type) = EntityType::parse(entity_type) else {
    return Ok(None);
  };
  let attributes = EntityAttributes::project(entity_type, entity_data)?;
  Ok(Some(serde_json::to_value(attributes)?))
}
