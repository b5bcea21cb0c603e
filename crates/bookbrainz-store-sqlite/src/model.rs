//! [`SqliteEntityModel`]: the SQLite implementation of [`EntityModel`] for one
//! entity type.

use chrono::Utc;
use rusqlite::{
  Connection, OptionalExtension as _, TransactionBehavior, params, params_from_iter,
  types::Value as SqlValue,
};
use serde::Deserialize as _;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use bookbrainz_core::{
  attributes::{EditionAttributes, EntityAttributes},
  case::camelize_keys,
  derived_set::DerivedSetKind,
  entity::{Bbid, EntityRow, EntitySnapshot, EntityType, RelatedData, Relation},
  revision::NewRevision,
  sets::Alias,
  store::EntityModel,
};

use crate::{
  Error, Result,
  encode::{
    attribute_columns, decode_entity_row, encode_bbid, encode_dt, entity_select, id_column,
    raw_query,
  },
  sets,
};

/// Storage for the revision rows of one entity type.
///
/// Cloning is cheap; all models of a store share one connection.
#[derive(Clone)]
pub struct SqliteEntityModel {
  entity_type: EntityType,
  conn:        tokio_rusqlite::Connection,
}

impl SqliteEntityModel {
  pub(crate) fn new(entity_type: EntityType, conn: tokio_rusqlite::Connection) -> Self {
    Self { entity_type, conn }
  }
}

// ─── Helpers run inside a connection closure ─────────────────────────────────

type RawRow = Map<String, Value>;

fn master_row(conn: &Connection, entity_type: EntityType, bbid: &str) -> rusqlite::Result<Option<RawRow>> {
  let sql = entity_select(entity_type, "e.bbid = ?1 AND e.master = 1");
  Ok(raw_query(conn, &sql, params![bbid])?.and_then(|rows| rows.into_iter().next()))
}

fn is_deleted(row: &RawRow) -> bool { id_column(row, "deleted").is_some_and(|d| d != 0) }

/// Resolve the current master row of an existing entity, refusing deleted ones.
fn live_master(
  conn: &Connection,
  entity_type: EntityType,
  bbid: Bbid,
) -> rusqlite::Result<Result<RawRow, bookbrainz_core::Error>> {
  Ok(match master_row(conn, entity_type, &encode_bbid(bbid))? {
    None => Err(bookbrainz_core::Error::EntityNotFound { entity_type, bbid }),
    Some(row) if is_deleted(&row) => Err(bookbrainz_core::Error::EntityDeleted { entity_type, bbid }),
    Some(row) => Ok(row),
  })
}

/// Check that each referenced bbid is an entity of the expected type.
fn check_references(
  conn: &Connection,
  references: &[(Bbid, EntityType)],
) -> rusqlite::Result<Result<(), bookbrainz_core::Error>> {
  for &(bbid, expected) in references {
    let found: Option<String> = conn
      .query_row(
        "SELECT type FROM entity WHERE bbid = ?1",
        params![encode_bbid(bbid)],
        |r| r.get(0),
      )
      .optional()?;
    let expected_name: &'static str = expected.into();
    if found.as_deref() != Some(expected_name) {
      return Ok(Err(bookbrainz_core::Error::WrongEntityType { bbid, expected }));
    }
  }
  Ok(Ok(()))
}

/// Insert a revision and link it to the revision it replaces.
fn insert_revision_row(
  conn: &Connection,
  editor_id: i64,
  note: Option<&str>,
  parent_id: Option<i64>,
) -> rusqlite::Result<i64> {
  conn.execute(
    "INSERT INTO revision (author_id, note, created_at) VALUES (?1, ?2, ?3)",
    params![editor_id, note, encode_dt(Utc::now())],
  )?;
  let revision_id = conn.last_insert_rowid();
  if let Some(parent_id) = parent_id {
    conn.execute(
      "INSERT INTO revision_parent (parent_id, child_id) VALUES (?1, ?2)",
      params![parent_id, revision_id],
    )?;
  }
  Ok(revision_id)
}

/// Demote the current master row and insert the new one.
fn insert_master_row(
  conn: &Connection,
  entity_type: EntityType,
  bbid: &str,
  revision_id: i64,
  deleted: bool,
  columns: Vec<(String, SqlValue)>,
) -> rusqlite::Result<()> {
  let table = entity_type.table_name();
  conn.execute(
    &format!("UPDATE {table} SET master = 0 WHERE bbid = ?1 AND master = 1"),
    params![bbid],
  )?;

  let mut names = vec!["bbid".to_owned(), "revision_id".to_owned(), "deleted".to_owned()];
  let mut values = vec![
    SqlValue::Text(bbid.to_owned()),
    SqlValue::Integer(revision_id),
    SqlValue::Integer(i64::from(deleted)),
  ];
  for (name, value) in columns {
    names.push(name);
    values.push(value);
  }
  let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{i}")).collect();
  conn.execute(
    &format!(
      "INSERT INTO {table} ({}, master) VALUES ({}, 1)",
      names.join(", "),
      placeholders.join(", "),
    ),
    params_from_iter(values),
  )?;
  Ok(())
}

fn load_related(
  conn: &Connection,
  row: &RawRow,
  relations: &[Relation],
) -> tokio_rusqlite::Result<RelatedData> {
  let mut related = RelatedData::default();
  for relation in relations {
    match relation {
      Relation::AliasSet => {
        if let Some(id) = id_column(row, "alias_set_id") {
          related.alias_set = sets::load_alias_set(conn, id)?;
        }
      }
      Relation::DefaultAlias => {
        if let Some(id) = id_column(row, "default_alias_id") {
          related.default_alias = sets::load_alias(conn, id)?;
        }
      }
      Relation::IdentifierSet => {
        if let Some(id) = id_column(row, "identifier_set_id") {
          related.identifier_set = Some(sets::load_identifier_set(conn, id)?);
        }
      }
      Relation::RelationshipSet => {
        if let Some(id) = id_column(row, "relationship_set_id") {
          related.relationship_set = Some(sets::load_relationship_set(conn, id)?);
        }
      }
      Relation::Annotation => {
        if let Some(id) = id_column(row, "annotation_id") {
          related.annotation = sets::load_annotation(conn, id)?;
        }
      }
      Relation::Disambiguation => {
        if let Some(id) = id_column(row, "disambiguation_id") {
          related.disambiguation = sets::load_disambiguation(conn, id)?;
        }
      }
      Relation::Revision => {
        if let Some(id) = id_column(row, "revision_id") {
          related.revision = sets::load_revision(conn, id)?;
        }
      }
      Relation::LanguageSet => {
        if let Some(id) = id_column(row, "language_set_id") {
          related.language_set = Some(sets::load_language_set(conn, id)?);
        }
      }
      Relation::PublisherSet => {
        if let Some(id) = id_column(row, "publisher_set_id") {
          related.publisher_set = Some(sets::load_publisher_set(conn, id)?);
        }
      }
      Relation::ReleaseEventSet => {
        if let Some(id) = id_column(row, "release_event_set_id") {
          related.release_event_set = Some(sets::load_release_event_set(conn, id)?);
        }
      }
    }
  }
  Ok(related)
}

/// Write every set of a revision and return the entity-row columns that
/// reference them.
fn write_sets(
  conn: &Connection,
  entity_type: EntityType,
  bbid: Bbid,
  previous: Option<&RawRow>,
  revision_id: i64,
  input: NewRevision,
) -> tokio_rusqlite::Result<Vec<(String, SqlValue)>> {
  let prev = |column: &str| previous.and_then(|row| id_column(row, column));

  let old_aliases = prev("alias_set_id")
    .map(|id| sets::load_alias_set(conn, id))
    .transpose()?
    .flatten();
  let old_identifiers = prev("identifier_set_id")
    .map(|id| sets::load_identifier_set(conn, id))
    .transpose()?;
  let old_relationships = prev("relationship_set_id")
    .map(|id| sets::load_relationship_set(conn, id))
    .transpose()?;
  let old_annotation = prev("annotation_id")
    .map(|id| sets::load_annotation(conn, id))
    .transpose()?
    .flatten();
  let old_disambiguation = prev("disambiguation_id")
    .map(|id| sets::load_disambiguation(conn, id))
    .transpose()?
    .flatten();

  let id = |v: Option<i64>| v.map_or(SqlValue::Null, SqlValue::Integer);
  let mut columns = vec![
    (
      "alias_set_id".to_owned(),
      id(sets::write_alias_set(conn, old_aliases.as_ref(), &input.aliases)?),
    ),
    (
      "identifier_set_id".to_owned(),
      id(sets::write_identifier_set(conn, old_identifiers.as_ref(), &input.identifiers)?),
    ),
    (
      "relationship_set_id".to_owned(),
      id(sets::write_relationship_set(
        conn,
        bbid,
        old_relationships.as_ref(),
        &input.relationships,
      )?),
    ),
    (
      "annotation_id".to_owned(),
      id(sets::write_annotation(
        conn,
        old_annotation.as_ref(),
        input.annotation.as_deref(),
        revision_id,
      )?),
    ),
    (
      "disambiguation_id".to_owned(),
      id(sets::write_disambiguation(
        conn,
        old_disambiguation.as_ref(),
        input.disambiguation.as_deref(),
      )?),
    ),
  ];

  let mut release_events = Some(input.release_events);
  for set in entity_type.derived_sets() {
    let column = set.entity_id_column();
    let old_id = prev(column.as_str());
    let set_id = match set.kind {
      DerivedSetKind::Language => {
        let old = old_id.map(|id| sets::load_language_set(conn, id)).transpose()?;
        sets::write_language_set(conn, old.as_ref(), &input.languages)?
      }
      DerivedSetKind::Publisher => {
        let old = old_id.map(|id| sets::load_publisher_set(conn, id)).transpose()?;
        sets::write_publisher_set(conn, old.as_ref(), &input.publishers)?
      }
      DerivedSetKind::ReleaseEvent => {
        let old = old_id.map(|id| sets::load_release_event_set(conn, id)).transpose()?;
        let events = release_events.take().unwrap_or_default();
        sets::write_release_event_set(conn, set, old.as_ref(), events)?
      }
    };
    columns.push((column, id(set_id)));
  }
  Ok(columns)
}

/// Refuse derived items for sets this entity type does not have.
fn check_derived_items(entity_type: EntityType, input: &NewRevision) -> Result<()> {
  let supplied = [
    (Relation::LanguageSet, !input.languages.is_empty()),
    (Relation::PublisherSet, !input.publishers.is_empty()),
    (Relation::ReleaseEventSet, !input.release_events.is_empty()),
  ];
  for (relation, present) in supplied {
    if present && !entity_type.supports(relation) {
      return Err(bookbrainz_core::Error::UnsupportedRelation { entity_type, relation }.into());
    }
  }
  Ok(())
}

// ─── EntityModel impl ────────────────────────────────────────────────────────

impl EntityModel for SqliteEntityModel {
  type Error = Error;

  fn entity_type(&self) -> EntityType { self.entity_type }

  async fn fetch_by_id<'a>(
    &'a self,
    bbid: Bbid,
    relations: &'a [Relation],
  ) -> Result<Option<EntitySnapshot>> {
    let entity_type = self.entity_type;
    if let Some(&relation) = relations.iter().find(|r| !entity_type.supports(**r)) {
      return Err(bookbrainz_core::Error::UnsupportedRelation { entity_type, relation }.into());
    }

    let relations = relations.to_vec();
    let bbid_str = encode_bbid(bbid);
    let fetched: Option<(RawRow, RelatedData)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(row) = master_row(&tx, entity_type, &bbid_str)? else {
          return Ok(None);
        };
        let related = load_related(&tx, &row, &relations)?;
        tx.commit()?;
        Ok(Some((row, related)))
      })
      .await?;

    fetched
      .map(|(row, related)| {
        Ok(EntitySnapshot { row: decode_entity_row(entity_type, row)?, related })
      })
      .transpose()
  }

  async fn history(&self, bbid: Bbid) -> Result<Vec<EntityRow>> {
    let entity_type = self.entity_type;
    let bbid_str = encode_bbid(bbid);
    let rows: Vec<RawRow> = self
      .conn
      .call(move |conn| {
        let sql = entity_select(entity_type, "e.bbid = ?1 ORDER BY e.revision_id ASC");
        Ok(raw_query(conn, &sql, params![bbid_str])?.unwrap_or_default())
      })
      .await?;

    rows
      .into_iter()
      .map(|row| decode_entity_row(entity_type, row))
      .collect()
  }

  async fn insert_revision(&self, bbid: Option<Bbid>, input: NewRevision) -> Result<EntityRow> {
    let entity_type = self.entity_type;
    let attributes =
      EntityAttributes::project(entity_type, &Value::Object(input.attributes.clone()))?;
    check_derived_items(entity_type, &input)?;
    let attribute_columns: Vec<(String, SqlValue)> = attribute_columns(&attributes)
      .into_iter()
      .map(|(name, value)| (name.to_owned(), value))
      .collect();

    let mut references: Vec<(Bbid, EntityType)> = input
      .publishers
      .iter()
      .map(|&publisher| (publisher, EntityType::Publisher))
      .collect();
    if let EntityAttributes::Edition(EditionAttributes {
      edition_group_bbid: Some(group),
      ..
    }) = &attributes
    {
      references.push((*group, EntityType::EditionGroup));
    }

    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (bbid, previous) = match bbid {
          Some(bbid) => match live_master(&tx, entity_type, bbid)? {
            Ok(row) => (bbid, Some(row)),
            Err(e) => return Ok(Err(e)),
          },
          None => {
            let bbid = Bbid::new_v4();
            tx.execute(
              "INSERT INTO entity (bbid, type) VALUES (?1, ?2)",
              params![encode_bbid(bbid), entity_type.as_ref()],
            )?;
            (bbid, None)
          }
        };
        if let Err(e) = check_references(&tx, &references)? {
          return Ok(Err(e));
        }
        let bbid_str = encode_bbid(bbid);

        let parent_id = previous.as_ref().and_then(|row| id_column(row, "revision_id"));
        let revision_id =
          insert_revision_row(&tx, input.editor_id, input.note.as_deref(), parent_id)?;

        let mut columns = write_sets(&tx, entity_type, bbid, previous.as_ref(), revision_id, input)?;
        columns.extend(attribute_columns);
        insert_master_row(&tx, entity_type, &bbid_str, revision_id, false, columns)?;

        let row = master_row(&tx, entity_type, &bbid_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(row))
      })
      .await?;

    let row = decode_entity_row(entity_type, written?)?;
    debug!(
      entity_type = %entity_type,
      bbid = %row.bbid,
      revision_id = row.revision_id,
      "revision written"
    );
    Ok(row)
  }

  async fn delete(&self, bbid: Bbid, editor_id: i64, note: Option<String>) -> Result<EntityRow> {
    let entity_type = self.entity_type;
    let written = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let previous = match live_master(&tx, entity_type, bbid)? {
          Ok(row) => row,
          Err(e) => return Ok(Err(e)),
        };
        let bbid_str = encode_bbid(bbid);

        let parent_id = id_column(&previous, "revision_id");
        let revision_id = insert_revision_row(&tx, editor_id, note.as_deref(), parent_id)?;
        insert_master_row(&tx, entity_type, &bbid_str, revision_id, true, Vec::new())?;

        let row = master_row(&tx, entity_type, &bbid_str)?
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        tx.commit()?;
        Ok(Ok(row))
      })
      .await?;

    let row = decode_entity_row(entity_type, written?)?;
    debug!(
      entity_type = %entity_type,
      bbid = %row.bbid,
      revision_id = row.revision_id,
      "entity deleted"
    );
    Ok(row)
  }

  async fn parent_alias(&self, bbid: Bbid) -> Result<Option<Alias>> {
    let entity_type = self.entity_type;
    let bbid_str = encode_bbid(bbid);
    let rows = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT alias.name, alias.sort_name, alias.id, alias.language_id, alias.\"primary\"
           FROM {table} AS e
           LEFT JOIN alias_set ON alias_set.id = e.alias_set_id
           LEFT JOIN alias ON alias.id = alias_set.default_alias_id
           WHERE e.bbid = ?1 AND e.master = 0
           ORDER BY e.revision_id DESC
           LIMIT 1",
          table = entity_type.table_name(),
        );
        Ok(raw_query(conn, &sql, params![bbid_str])?)
      })
      .await?;

    let Some(rows) = rows else {
      warn!(entity_type = %entity_type, %bbid, "parent alias query returned no result set");
      return Ok(None);
    };
    let Some(row) = rows.into_iter().next() else { return Ok(None) };

    let alias = Value::Object(camelize_keys(row));
    if alias.get("id").is_none_or(Value::is_null) {
      return Ok(None);
    }
    Ok(Some(Alias::deserialize(alias)?))
  }
}
