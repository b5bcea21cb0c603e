//! Reading and writing the sets referenced by entity rows.
//!
//! These run inside a connection closure, usually within the transaction of a
//! fetch or a revision insert. Writers return the set id the new row should
//! reference: the previous id when the content is unchanged, a fresh one
//! otherwise, and `None` for an empty set.

use rusqlite::{Connection, OptionalExtension as _, params};

use bookbrainz_core::{
  derived_set::DerivedSet,
  entity::Bbid,
  revision::Revision,
  sets::{
    Alias, AliasSet, Annotation, Disambiguation, Identifier, IdentifierSet, ItemPlan, Language,
    LanguageSet, NewAlias, NewIdentifier, NewRelationship, NewReleaseEvent, PublisherRef,
    PublisherSet, Relationship, RelationshipSet, ReleaseEvent, ReleaseEventSet,
    alias_set_unchanged, default_alias_index, identifier_set_unchanged, plan_items,
    relationship_set_unchanged,
  },
};

use crate::encode::{encode_bbid, get_bbid, get_dt};

type SetResult<T> = tokio_rusqlite::Result<T>;

// ─── Loading ─────────────────────────────────────────────────────────────────

fn alias_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Alias> {
  Ok(Alias {
    id:          row.get(0)?,
    name:        row.get(1)?,
    sort_name:   row.get(2)?,
    language_id: row.get(3)?,
    primary:     row.get(4)?,
  })
}

pub fn load_alias(conn: &Connection, id: i64) -> SetResult<Option<Alias>> {
  Ok(
    conn
      .query_row(
        "SELECT id, name, sort_name, language_id, \"primary\" FROM alias WHERE id = ?1",
        params![id],
        alias_from_row,
      )
      .optional()?,
  )
}

pub fn load_alias_set(conn: &Connection, id: i64) -> SetResult<Option<AliasSet>> {
  let Some(default_alias_id) = conn
    .query_row(
      "SELECT default_alias_id FROM alias_set WHERE id = ?1",
      params![id],
      |r| r.get::<_, Option<i64>>(0),
    )
    .optional()?
  else {
    return Ok(None);
  };

  let mut stmt = conn.prepare(
    "SELECT a.id, a.name, a.sort_name, a.language_id, a.\"primary\"
     FROM alias_set__alias l
     JOIN alias a ON a.id = l.alias_id
     WHERE l.set_id = ?1
     ORDER BY a.id",
  )?;
  let aliases = stmt
    .query_map(params![id], alias_from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  Ok(Some(AliasSet { id, default_alias_id, aliases }))
}

pub fn load_identifier_set(conn: &Connection, id: i64) -> SetResult<IdentifierSet> {
  let mut stmt = conn.prepare(
    "SELECT i.id, i.type_id, i.value
     FROM identifier_set__identifier l
     JOIN identifier i ON i.id = l.identifier_id
     WHERE l.set_id = ?1
     ORDER BY i.id",
  )?;
  let identifiers = stmt
    .query_map(params![id], |row| {
      Ok(Identifier { id: row.get(0)?, type_id: row.get(1)?, value: row.get(2)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(IdentifierSet { id, identifiers })
}

pub fn load_relationship_set(conn: &Connection, id: i64) -> SetResult<RelationshipSet> {
  let mut stmt = conn.prepare(
    "SELECT r.id, r.type_id, r.source_bbid, r.target_bbid
     FROM relationship_set__relationship l
     JOIN relationship r ON r.id = l.relationship_id
     WHERE l.set_id = ?1
     ORDER BY r.id",
  )?;
  let relationships = stmt
    .query_map(params![id], |row| {
      Ok(Relationship {
        id:          row.get(0)?,
        type_id:     row.get(1)?,
        source_bbid: get_bbid(row, 2)?,
        target_bbid: get_bbid(row, 3)?,
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(RelationshipSet { id, relationships })
}

pub fn load_annotation(conn: &Connection, id: i64) -> SetResult<Option<Annotation>> {
  Ok(
    conn
      .query_row(
        "SELECT id, content, last_revision_id FROM annotation WHERE id = ?1",
        params![id],
        |row| {
          Ok(Annotation {
            id:               row.get(0)?,
            content:          row.get(1)?,
            last_revision_id: row.get(2)?,
          })
        },
      )
      .optional()?,
  )
}

pub fn load_disambiguation(conn: &Connection, id: i64) -> SetResult<Option<Disambiguation>> {
  Ok(
    conn
      .query_row(
        "SELECT id, comment FROM disambiguation WHERE id = ?1",
        params![id],
        |row| Ok(Disambiguation { id: row.get(0)?, comment: row.get(1)? }),
      )
      .optional()?,
  )
}

pub fn load_revision(conn: &Connection, id: i64) -> SetResult<Option<Revision>> {
  Ok(
    conn
      .query_row(
        "SELECT r.id, r.author_id, r.note, r.created_at,
                (SELECT parent_id FROM revision_parent WHERE child_id = r.id)
         FROM revision r
         WHERE r.id = ?1",
        params![id],
        |row| {
          Ok(Revision {
            id:         row.get(0)?,
            author_id:  row.get(1)?,
            note:       row.get(2)?,
            created_at: get_dt(row, 3)?,
            parent_id:  row.get(4)?,
          })
        },
      )
      .optional()?,
  )
}

pub fn load_language_set(conn: &Connection, id: i64) -> SetResult<LanguageSet> {
  let mut stmt = conn.prepare(
    "SELECT lang.id, lang.name, lang.iso_code
     FROM language_set__language l
     JOIN language lang ON lang.id = l.language_id
     WHERE l.set_id = ?1
     ORDER BY l.rowid",
  )?;
  let languages = stmt
    .query_map(params![id], |row| {
      Ok(Language { id: row.get(0)?, name: row.get(1)?, iso_code: row.get(2)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(LanguageSet { id, languages })
}

/// Publishers are named by the default alias of their current master row.
pub fn load_publisher_set(conn: &Connection, id: i64) -> SetResult<PublisherSet> {
  let mut stmt = conn.prepare(
    "SELECT l.bbid, alias.name
     FROM publisher_set__publisher l
     LEFT JOIN publisher p ON p.bbid = l.bbid AND p.master = 1
     LEFT JOIN alias_set ON alias_set.id = p.alias_set_id
     LEFT JOIN alias ON alias.id = alias_set.default_alias_id
     WHERE l.set_id = ?1
     ORDER BY l.rowid",
  )?;
  let publishers = stmt
    .query_map(params![id], |row| {
      Ok(PublisherRef { bbid: get_bbid(row, 0)?, name: row.get(1)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(PublisherSet { id, publishers })
}

pub fn load_release_event_set(conn: &Connection, id: i64) -> SetResult<ReleaseEventSet> {
  let mut stmt = conn.prepare(
    "SELECT e.id, e.date, e.area_id
     FROM release_event_set__release_event l
     JOIN release_event e ON e.id = l.release_event_id
     WHERE l.set_id = ?1
     ORDER BY l.rowid",
  )?;
  let release_events = stmt
    .query_map(params![id], |row| {
      Ok(ReleaseEvent { id: row.get(0)?, date: row.get(1)?, area_id: row.get(2)? })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(ReleaseEventSet { id, release_events })
}

// ─── Writing ─────────────────────────────────────────────────────────────────

pub fn write_alias_set(
  conn: &Connection,
  previous: Option<&AliasSet>,
  aliases: &[NewAlias],
) -> SetResult<Option<i64>> {
  if aliases.is_empty() {
    return Ok(None);
  }
  if let Some(previous) = previous.filter(|p| alias_set_unchanged(p, aliases)) {
    return Ok(Some(previous.id));
  }

  let mut alias_ids = Vec::with_capacity(aliases.len());
  for alias in aliases {
    conn.execute(
      "INSERT INTO alias (name, sort_name, language_id, \"primary\") VALUES (?1, ?2, ?3, ?4)",
      params![alias.name, alias.sort_name, alias.language_id, alias.primary],
    )?;
    alias_ids.push(conn.last_insert_rowid());
  }

  let default_alias_id = default_alias_index(aliases).map(|i| alias_ids[i]);
  conn.execute(
    "INSERT INTO alias_set (default_alias_id) VALUES (?1)",
    params![default_alias_id],
  )?;
  let set_id = conn.last_insert_rowid();
  for alias_id in alias_ids {
    conn.execute(
      "INSERT INTO alias_set__alias (set_id, alias_id) VALUES (?1, ?2)",
      params![set_id, alias_id],
    )?;
  }
  Ok(Some(set_id))
}

pub fn write_identifier_set(
  conn: &Connection,
  previous: Option<&IdentifierSet>,
  identifiers: &[NewIdentifier],
) -> SetResult<Option<i64>> {
  if identifiers.is_empty() {
    return Ok(None);
  }
  if let Some(previous) = previous.filter(|p| identifier_set_unchanged(p, identifiers)) {
    return Ok(Some(previous.id));
  }

  conn.execute("INSERT INTO identifier_set DEFAULT VALUES", [])?;
  let set_id = conn.last_insert_rowid();
  for identifier in identifiers {
    conn.execute(
      "INSERT INTO identifier (type_id, value) VALUES (?1, ?2)",
      params![identifier.type_id, identifier.value],
    )?;
    conn.execute(
      "INSERT INTO identifier_set__identifier (set_id, identifier_id) VALUES (?1, ?2)",
      params![set_id, conn.last_insert_rowid()],
    )?;
  }
  Ok(Some(set_id))
}

pub fn write_relationship_set(
  conn: &Connection,
  source: Bbid,
  previous: Option<&RelationshipSet>,
  relationships: &[NewRelationship],
) -> SetResult<Option<i64>> {
  if relationships.is_empty() {
    return Ok(None);
  }
  if let Some(previous) = previous.filter(|p| relationship_set_unchanged(p, relationships)) {
    return Ok(Some(previous.id));
  }

  conn.execute("INSERT INTO relationship_set DEFAULT VALUES", [])?;
  let set_id = conn.last_insert_rowid();
  for relationship in relationships {
    conn.execute(
      "INSERT INTO relationship (type_id, source_bbid, target_bbid) VALUES (?1, ?2, ?3)",
      params![
        relationship.type_id,
        encode_bbid(source),
        encode_bbid(relationship.target_bbid),
      ],
    )?;
    conn.execute(
      "INSERT INTO relationship_set__relationship (set_id, relationship_id) VALUES (?1, ?2)",
      params![set_id, conn.last_insert_rowid()],
    )?;
  }
  Ok(Some(set_id))
}

/// A changed annotation records `revision_id` as its last revision.
pub fn write_annotation(
  conn: &Connection,
  previous: Option<&Annotation>,
  content: Option<&str>,
  revision_id: i64,
) -> SetResult<Option<i64>> {
  let Some(content) = content else { return Ok(None) };
  if let Some(previous) = previous.filter(|p| p.content == content) {
    return Ok(Some(previous.id));
  }
  conn.execute(
    "INSERT INTO annotation (content, last_revision_id) VALUES (?1, ?2)",
    params![content, revision_id],
  )?;
  Ok(Some(conn.last_insert_rowid()))
}

pub fn write_disambiguation(
  conn: &Connection,
  previous: Option<&Disambiguation>,
  comment: Option<&str>,
) -> SetResult<Option<i64>> {
  let Some(comment) = comment else { return Ok(None) };
  if let Some(previous) = previous.filter(|p| p.comment == comment) {
    return Ok(Some(previous.id));
  }
  conn.execute("INSERT INTO disambiguation (comment) VALUES (?1)", params![comment])?;
  Ok(Some(conn.last_insert_rowid()))
}

/// Drop repeated members, keeping first occurrences in order.
fn dedup<T: PartialEq + Copy>(items: &[T]) -> Vec<T> {
  let mut out: Vec<T> = Vec::with_capacity(items.len());
  for item in items {
    if !out.contains(item) {
      out.push(*item);
    }
  }
  out
}

pub fn write_language_set(
  conn: &Connection,
  previous: Option<&LanguageSet>,
  language_ids: &[i64],
) -> SetResult<Option<i64>> {
  let language_ids = dedup(language_ids);
  if language_ids.is_empty() {
    return Ok(None);
  }
  if let Some(previous) = previous {
    let old: Vec<i64> = previous.languages.iter().map(|l| l.id).collect();
    if old == language_ids {
      return Ok(Some(previous.id));
    }
  }

  conn.execute("INSERT INTO language_set DEFAULT VALUES", [])?;
  let set_id = conn.last_insert_rowid();
  for language_id in language_ids {
    conn.execute(
      "INSERT INTO language_set__language (set_id, language_id) VALUES (?1, ?2)",
      params![set_id, language_id],
    )?;
  }
  Ok(Some(set_id))
}

pub fn write_publisher_set(
  conn: &Connection,
  previous: Option<&PublisherSet>,
  publishers: &[Bbid],
) -> SetResult<Option<i64>> {
  let publishers = dedup(publishers);
  if publishers.is_empty() {
    return Ok(None);
  }
  if let Some(previous) = previous {
    let old: Vec<Bbid> = previous.publishers.iter().map(|p| p.bbid).collect();
    if old == publishers {
      return Ok(Some(previous.id));
    }
  }

  conn.execute("INSERT INTO publisher_set DEFAULT VALUES", [])?;
  let set_id = conn.last_insert_rowid();
  for bbid in publishers {
    conn.execute(
      "INSERT INTO publisher_set__publisher (set_id, bbid) VALUES (?1, ?2)",
      params![set_id, encode_bbid(bbid)],
    )?;
  }
  Ok(Some(set_id))
}

/// Release events are matched against the previous set on the set's
/// comparison fields. Matching rows are linked again; everything else is a
/// new row.
pub fn write_release_event_set(
  conn: &Connection,
  set: &DerivedSet,
  previous: Option<&ReleaseEventSet>,
  events: Vec<NewReleaseEvent>,
) -> SetResult<Option<i64>> {
  if events.is_empty() {
    return Ok(None);
  }
  let old = previous.map_or(&[][..], |p| p.release_events.as_slice());
  let plans = plan_items(set, old, events)
    .map_err(|e| tokio_rusqlite::Error::Other(Box::new(e)))?;

  // Reuse only when every previous item is kept in its previous position.
  let unchanged = plans.len() == old.len()
    && plans
      .iter()
      .zip(old)
      .all(|(plan, event)| matches!(plan, ItemPlan::Keep(id) if *id == event.id));
  if let Some(previous) = previous.filter(|_| unchanged) {
    return Ok(Some(previous.id));
  }

  conn.execute("INSERT INTO release_event_set DEFAULT VALUES", [])?;
  let set_id = conn.last_insert_rowid();
  for plan in plans {
    let event_id = match plan {
      ItemPlan::Keep(id) => id,
      ItemPlan::Insert(event) => {
        conn.execute(
          "INSERT INTO release_event (date, area_id) VALUES (?1, ?2)",
          params![event.date, event.area_id],
        )?;
        conn.last_insert_rowid()
      }
    };
    conn.execute(
      "INSERT INTO release_event_set__release_event (set_id, release_event_id) VALUES (?1, ?2)",
      params![set_id, event_id],
    )?;
  }
  Ok(Some(set_id))
}
