//! Encoding and decoding helpers between domain types and SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, bbids as hyphenated lowercase
//! UUID strings, flags as `0`/`1`. Entity rows are read generically: every
//! column becomes a JSON value, keys are translated to camelCase, and the
//! result is decoded with serde and the attribute projector.

use chrono::{DateTime, Utc};
use rusqlite::{
  Connection, Params, Row,
  types::{Type, Value as SqlValue, ValueRef},
};
use serde::Deserialize;
use serde_json::{Map, Number, Value};

use bookbrainz_core::{
  attributes::EntityAttributes,
  case::camelize_keys,
  entity::{Bbid, EntityRow, EntityType},
};

use crate::{Error, Result};

// ─── Bbid ─────────────────────────────────────────────────────────────────────

pub fn encode_bbid(bbid: Bbid) -> String { bbid.0.hyphenated().to_string() }

/// Read a bbid column inside a query closure.
pub fn get_bbid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Bbid> {
  let s: String = row.get(idx)?;
  s.parse()
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// Read a timestamp column inside a query closure.
pub fn get_dt(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
  let s: String = row.get(idx)?;
  DateTime::parse_from_rfc3339(&s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

// ─── Generic rows ────────────────────────────────────────────────────────────

fn column_to_json(value: ValueRef<'_>) -> Value {
  match value {
    ValueRef::Null => Value::Null,
    ValueRef::Integer(i) => Value::from(i),
    ValueRef::Real(f) => Number::from_f64(f).map_or(Value::Null, Value::Number),
    ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
    ValueRef::Blob(b) => Value::from(b.to_vec()),
  }
}

fn row_to_json(row: &Row<'_>, names: &[String]) -> rusqlite::Result<Map<String, Value>> {
  let mut map = Map::with_capacity(names.len());
  for (idx, name) in names.iter().enumerate() {
    map.insert(name.clone(), column_to_json(row.get_ref(idx)?));
  }
  Ok(map)
}

/// Run `sql` and return every row as a column-name → value map, with the
/// storage column names untouched.
///
/// Returns `None` when the statement produces no result columns (it is not a
/// query), without executing it.
pub fn raw_query<P: Params>(
  conn: &Connection,
  sql: &str,
  params: P,
) -> rusqlite::Result<Option<Vec<Map<String, Value>>>> {
  let mut stmt = conn.prepare(sql)?;
  if stmt.column_count() == 0 {
    return Ok(None);
  }
  let names: Vec<String> = stmt
    .column_names()
    .into_iter()
    .map(str::to_owned)
    .collect();
  let rows = stmt
    .query_map(params, |row| row_to_json(row, &names))?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(Some(rows))
}

/// Read a nullable integer column from a raw row.
pub fn id_column(row: &Map<String, Value>, column: &str) -> Option<i64> {
  row.get(column).and_then(Value::as_i64)
}

// ─── Entity rows ─────────────────────────────────────────────────────────────

/// SELECT for entity rows: every table column plus the alias set's default.
pub fn entity_select(entity_type: EntityType, filter: &str) -> String {
  format!(
    "SELECT e.*, alias_set.default_alias_id
     FROM {table} AS e
     LEFT JOIN alias_set ON alias_set.id = e.alias_set_id
     WHERE {filter}",
    table = entity_type.table_name(),
  )
}

/// The shared columns of an entity row, after case translation.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEntityRow {
  bbid:                 Bbid,
  revision_id:          i64,
  #[serde(deserialize_with = "bookbrainz_core::flag::deserialize")]
  master:               bool,
  #[serde(deserialize_with = "bookbrainz_core::flag::deserialize")]
  deleted:              bool,
  alias_set_id:         Option<i64>,
  default_alias_id:     Option<i64>,
  identifier_set_id:    Option<i64>,
  relationship_set_id:  Option<i64>,
  annotation_id:        Option<i64>,
  disambiguation_id:    Option<i64>,
  #[serde(default)]
  language_set_id:      Option<i64>,
  #[serde(default)]
  publisher_set_id:     Option<i64>,
  #[serde(default)]
  release_event_set_id: Option<i64>,
}

/// Decode a raw entity row read with [`entity_select`].
pub fn decode_entity_row(
  entity_type: EntityType,
  raw: Map<String, Value>,
) -> Result<EntityRow> {
  let row = Value::Object(camelize_keys(raw));
  let shared = RawEntityRow::deserialize(&row)?;
  let attributes = if shared.deleted {
    None
  } else {
    Some(EntityAttributes::project(entity_type, &row)?)
  };

  Ok(EntityRow {
    bbid: shared.bbid,
    entity_type,
    revision_id: shared.revision_id,
    master: shared.master,
    deleted: shared.deleted,
    alias_set_id: shared.alias_set_id,
    default_alias_id: shared.default_alias_id,
    identifier_set_id: shared.identifier_set_id,
    relationship_set_id: shared.relationship_set_id,
    annotation_id: shared.annotation_id,
    disambiguation_id: shared.disambiguation_id,
    language_set_id: shared.language_set_id,
    publisher_set_id: shared.publisher_set_id,
    release_event_set_id: shared.release_event_set_id,
    attributes,
  })
}

// ─── Attribute columns ───────────────────────────────────────────────────────

fn int(v: Option<i64>) -> SqlValue { v.map_or(SqlValue::Null, SqlValue::Integer) }

fn text(v: Option<&str>) -> SqlValue {
  v.map_or(SqlValue::Null, |s| SqlValue::Text(s.to_owned()))
}

fn flag(v: bool) -> SqlValue { SqlValue::Integer(i64::from(v)) }

/// The stored attribute columns of a projected row. Derived date components
/// are not stored; they are recomputed on read.
pub fn attribute_columns(attributes: &EntityAttributes) -> Vec<(&'static str, SqlValue)> {
  match attributes {
    EntityAttributes::Author(a) => vec![
      ("type_id", int(a.type_id)),
      ("gender_id", int(a.gender_id)),
      ("begin_area_id", int(a.begin_area_id)),
      ("begin_date", text(a.life_span.begin_date.as_deref())),
      ("end_area_id", int(a.end_area_id)),
      ("end_date", text(a.life_span.end_date.as_deref())),
      ("ended", flag(a.life_span.ended)),
    ],
    EntityAttributes::Edition(e) => vec![
      (
        "edition_group_bbid",
        e.edition_group_bbid
          .map_or(SqlValue::Null, |b| SqlValue::Text(encode_bbid(b))),
      ),
      ("width", int(e.width)),
      ("height", int(e.height)),
      ("depth", int(e.depth)),
      ("weight", int(e.weight)),
      ("pages", int(e.pages)),
      ("format_id", int(e.format_id)),
      ("status_id", int(e.status_id)),
    ],
    EntityAttributes::Publisher(p) => vec![
      ("type_id", int(p.type_id)),
      ("area_id", int(p.area_id)),
      ("begin_date", text(p.life_span.begin_date.as_deref())),
      ("end_date", text(p.life_span.end_date.as_deref())),
      ("ended", flag(p.life_span.ended)),
    ],
    EntityAttributes::EditionGroup(t) | EntityAttributes::Work(t) => {
      vec![("type_id", int(t.type_id))]
    }
  }
}
