//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, Utc};
use rusqlite::params;
use serde_json::json;

use bookbrainz_core::{
  achievement::{AchievementKind, process_fun_runner},
  attributes::EntityAttributes,
  entity::{Bbid, EntityType, Relation},
  registry::{Fetch, get_entity, get_entity_parent_alias},
  revision::NewRevision,
  sets::{NewAlias, NewIdentifier, NewReleaseEvent},
  store::EntityModel,
};

use crate::{Error, SqliteStore, encode::encode_dt};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn alias(name: &str) -> NewAlias {
  NewAlias {
    name:        name.into(),
    sort_name:   name.into(),
    language_id: None,
    primary:     true,
    default:     false,
  }
}

async fn editor(s: &SqliteStore) -> i64 { s.add_editor("alice").await.unwrap().id }

// ─── Revisions & master flag ─────────────────────────────────────────────────

#[tokio::test]
async fn create_and_fetch_author() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let authors = s.model(EntityType::Author);

  let input = NewRevision::new(editor_id)
    .with_alias(alias("Ursula K. Le Guin"))
    .with_attribute("beginDate", "1929-10-21")
    .with_attribute("genderId", 2);
  let row = authors.insert_revision(None, input).await.unwrap();
  assert!(row.master);
  assert!(!row.deleted);

  let snapshot = authors
    .fetch_by_id(row.bbid, &[Relation::AliasSet, Relation::DefaultAlias, Relation::Revision])
    .await
    .unwrap()
    .expect("entity exists");

  assert_eq!(snapshot.row.revision_id, row.revision_id);
  let aliases = snapshot.related.alias_set.unwrap();
  assert_eq!(aliases.aliases.len(), 1);
  assert_eq!(snapshot.related.default_alias.unwrap().name, "Ursula K. Le Guin");
  let revision = snapshot.related.revision.unwrap();
  assert_eq!(revision.author_id, editor_id);
  assert_eq!(revision.parent_id, None);

  let Some(EntityAttributes::Author(attrs)) = snapshot.row.attributes else {
    panic!("expected author attributes");
  };
  assert_eq!(attrs.gender_id, Some(2));
  assert_eq!(attrs.life_span.begin_year, Some(1929));
  assert_eq!(attrs.life_span.begin_month, Some(10));
  assert_eq!(attrs.life_span.begin_day, Some(21));
  assert!(!attrs.life_span.ended);
}

#[tokio::test]
async fn fetch_of_missing_entity_is_none() {
  let s = store().await;
  let result = s
    .model(EntityType::Work)
    .fetch_by_id(Bbid::new_v4(), &[])
    .await
    .unwrap();
  assert!(result.is_none());
}

#[tokio::test]
async fn new_revision_moves_the_master_flag() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let works = s.model(EntityType::Work);

  let first = works
    .insert_revision(None, NewRevision::new(editor_id).with_alias(alias("Earthsea")))
    .await
    .unwrap();
  let second = works
    .insert_revision(
      Some(first.bbid),
      NewRevision::new(editor_id).with_alias(alias("A Wizard of Earthsea")),
    )
    .await
    .unwrap();

  assert_eq!(second.bbid, first.bbid);
  assert!(second.revision_id > first.revision_id);

  let history = works.history(first.bbid).await.unwrap();
  assert_eq!(history.len(), 2);
  assert_eq!(history.iter().filter(|r| r.master).count(), 1);
  assert_eq!(history[0].revision_id, first.revision_id);
  assert!(!history[0].master);
  assert!(history[1].master);

  let snapshot = works
    .fetch_by_id(first.bbid, &[Relation::Revision])
    .await
    .unwrap()
    .unwrap();
  assert_eq!(snapshot.related.revision.unwrap().parent_id, Some(first.revision_id));
}

#[tokio::test]
async fn revising_a_missing_entity_fails() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let err = s
    .model(EntityType::Work)
    .insert_revision(Some(Bbid::new_v4()), NewRevision::new(editor_id))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(bookbrainz_core::Error::EntityNotFound { .. })));
}

// ─── Set sharing ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn unchanged_sets_are_shared_between_revisions() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let works = s.model(EntityType::Work);

  let input = || {
    let mut input = NewRevision::new(editor_id).with_alias(alias("The Dispossessed"));
    input.identifiers = vec![NewIdentifier { type_id: 1, value: "Q1076588".into() }];
    input.annotation = Some("An ambiguous utopia.".into());
    input.disambiguation = Some("novel".into());
    input
  };

  let first = works.insert_revision(None, input()).await.unwrap();
  let second = works.insert_revision(Some(first.bbid), input()).await.unwrap();

  assert!(first.alias_set_id.is_some());
  assert_eq!(second.alias_set_id, first.alias_set_id);
  assert_eq!(second.identifier_set_id, first.identifier_set_id);
  assert_eq!(second.annotation_id, first.annotation_id);
  assert_eq!(second.disambiguation_id, first.disambiguation_id);
  assert_eq!(second.default_alias_id, first.default_alias_id);

  let snapshot = works
    .fetch_by_id(first.bbid, &[Relation::Annotation])
    .await
    .unwrap()
    .unwrap();
  assert_eq!(snapshot.related.annotation.unwrap().last_revision_id, first.revision_id);
}

#[tokio::test]
async fn changed_sets_are_written_anew() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let works = s.model(EntityType::Work);

  let mut input = NewRevision::new(editor_id).with_alias(alias("Lavinia"));
  input.annotation = Some("first".into());
  let first = works.insert_revision(None, input).await.unwrap();

  let mut input = NewRevision::new(editor_id).with_alias(alias("Lavinia (novel)"));
  input.annotation = Some("second".into());
  let second = works.insert_revision(Some(first.bbid), input).await.unwrap();

  assert_ne!(second.alias_set_id, first.alias_set_id);
  assert_ne!(second.annotation_id, first.annotation_id);

  let snapshot = works
    .fetch_by_id(first.bbid, &[Relation::Annotation, Relation::AliasSet])
    .await
    .unwrap()
    .unwrap();
  assert_eq!(snapshot.related.annotation.unwrap().last_revision_id, second.revision_id);
  assert_eq!(snapshot.related.alias_set.unwrap().aliases[0].name, "Lavinia (novel)");
}

#[tokio::test]
async fn empty_sets_are_not_stored() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let row = s
    .model(EntityType::EditionGroup)
    .insert_revision(None, NewRevision::new(editor_id).with_attribute("typeId", 3))
    .await
    .unwrap();
  assert_eq!(row.alias_set_id, None);
  assert_eq!(row.default_alias_id, None);
  assert_eq!(row.identifier_set_id, None);
  assert_eq!(row.annotation_id, None);
  assert_eq!(
    row.attributes,
    Some(EntityAttributes::EditionGroup(bookbrainz_core::attributes::TypeAttributes {
      type_id: Some(3),
    }))
  );
}

#[tokio::test]
async fn default_alias_follows_the_default_flag() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let mut pen_name = alias("James Tiptree Jr.");
  pen_name.default = true;
  let input = NewRevision::new(editor_id)
    .with_alias(alias("Alice Sheldon"))
    .with_alias(pen_name);

  let authors = s.model(EntityType::Author);
  let row = authors.insert_revision(None, input).await.unwrap();
  let snapshot = authors
    .fetch_by_id(row.bbid, &[Relation::DefaultAlias])
    .await
    .unwrap()
    .unwrap();
  assert_eq!(snapshot.related.default_alias.unwrap().name, "James Tiptree Jr.");
}

// ─── Derived sets ────────────────────────────────────────────────────────────

#[tokio::test]
async fn edition_derived_sets() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let english = s.add_language("English", Some("eng")).await.unwrap();

  let publisher = s
    .model(EntityType::Publisher)
    .insert_revision(None, NewRevision::new(editor_id).with_alias(alias("Ace Books")))
    .await
    .unwrap();
  let group = s
    .model(EntityType::EditionGroup)
    .insert_revision(None, NewRevision::new(editor_id))
    .await
    .unwrap();

  let editions = s.model(EntityType::Edition);
  let mut input = NewRevision::new(editor_id)
    .with_alias(alias("The Left Hand of Darkness"))
    .with_attribute("editionGroupBbid", group.bbid.to_string())
    .with_attribute("pages", 286);
  input.languages = vec![english.id];
  input.publishers = vec![publisher.bbid];
  input.release_events =
    vec![NewReleaseEvent { id: None, date: Some("1969-03".into()), area_id: Some(222) }];
  let first = editions.insert_revision(None, input).await.unwrap();

  let relations = [Relation::LanguageSet, Relation::PublisherSet, Relation::ReleaseEventSet];
  let snapshot = editions
    .fetch_by_id(first.bbid, &relations)
    .await
    .unwrap()
    .unwrap();

  let Some(EntityAttributes::Edition(attrs)) = &snapshot.row.attributes else {
    panic!("expected edition attributes");
  };
  assert_eq!(attrs.edition_group_bbid, Some(group.bbid));
  assert_eq!(attrs.pages, Some(286));

  let languages = snapshot.related.language_set.unwrap();
  assert_eq!(languages.languages, [english.clone()]);
  let publishers = snapshot.related.publisher_set.unwrap();
  assert_eq!(publishers.publishers.len(), 1);
  assert_eq!(publishers.publishers[0].bbid, publisher.bbid);
  assert_eq!(publishers.publishers[0].name.as_deref(), Some("Ace Books"));
  let events = snapshot.related.release_event_set.unwrap();
  let event_id = events.release_events[0].id;

  // Same items: every derived set is shared.
  let mut input = NewRevision::new(editor_id).with_alias(alias("The Left Hand of Darkness"));
  input.languages = vec![english.id];
  input.publishers = vec![publisher.bbid];
  input.release_events = vec![NewReleaseEvent {
    id:      Some(event_id),
    date:    Some("1969-03".into()),
    area_id: Some(222),
  }];
  let second = editions.insert_revision(Some(first.bbid), input).await.unwrap();
  assert_eq!(second.language_set_id, first.language_set_id);
  assert_eq!(second.publisher_set_id, first.publisher_set_id);
  assert_eq!(second.release_event_set_id, first.release_event_set_id);

  // A changed mutable field writes a new event row and a new set.
  let mut input = NewRevision::new(editor_id);
  input.release_events = vec![NewReleaseEvent {
    id:      Some(event_id),
    date:    Some("1969-03-01".into()),
    area_id: Some(222),
  }];
  let third = editions.insert_revision(Some(first.bbid), input).await.unwrap();
  assert_ne!(third.release_event_set_id, second.release_event_set_id);
  assert_eq!(third.language_set_id, None);

  let snapshot = editions
    .fetch_by_id(first.bbid, &[Relation::ReleaseEventSet])
    .await
    .unwrap()
    .unwrap();
  let events = snapshot.related.release_event_set.unwrap().release_events;
  assert_eq!(events.len(), 1);
  assert_ne!(events[0].id, event_id);
  assert_eq!(events[0].date.as_deref(), Some("1969-03-01"));
}

#[tokio::test]
async fn reordered_release_events_write_a_new_set() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let editions = s.model(EntityType::Edition);

  let event = |id, date: &str| NewReleaseEvent { id, date: Some(date.into()), area_id: None };
  let mut input = NewRevision::new(editor_id);
  input.release_events = vec![event(None, "2001"), event(None, "2002")];
  let first = editions.insert_revision(None, input).await.unwrap();

  let snapshot = editions
    .fetch_by_id(first.bbid, &[Relation::ReleaseEventSet])
    .await
    .unwrap()
    .unwrap();
  let old = snapshot.related.release_event_set.unwrap().release_events;
  assert_eq!(old.len(), 2);

  let mut input = NewRevision::new(editor_id);
  input.release_events = vec![event(Some(old[1].id), "2002"), event(Some(old[0].id), "2001")];
  let second = editions.insert_revision(Some(first.bbid), input).await.unwrap();
  assert_ne!(second.release_event_set_id, first.release_event_set_id);

  let snapshot = editions
    .fetch_by_id(first.bbid, &[Relation::ReleaseEventSet])
    .await
    .unwrap()
    .unwrap();
  let events = snapshot.related.release_event_set.unwrap().release_events;
  let dates: Vec<_> = events.iter().map(|e| e.date.as_deref()).collect();
  assert_eq!(dates, [Some("2002"), Some("2001")]);
  // The event rows themselves are unchanged and reused.
  assert_eq!(events[0].id, old[1].id);
  assert_eq!(events[1].id, old[0].id);
}

#[tokio::test]
async fn references_must_name_the_right_entity_type() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let work = s
    .model(EntityType::Work)
    .insert_revision(None, NewRevision::new(editor_id))
    .await
    .unwrap();
  let editions = s.model(EntityType::Edition);

  let mut input = NewRevision::new(editor_id);
  input.publishers = vec![work.bbid];
  let err = editions.insert_revision(None, input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(bookbrainz_core::Error::WrongEntityType {
      bbid,
      expected: EntityType::Publisher,
    }) if bbid == work.bbid
  ));

  let input =
    NewRevision::new(editor_id).with_attribute("editionGroupBbid", work.bbid.to_string());
  let err = editions.insert_revision(None, input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(bookbrainz_core::Error::WrongEntityType {
      expected: EntityType::EditionGroup,
      ..
    })
  ));

  // Nothing from the refused writes was kept.
  let count: i64 = s
    .conn
    .call(|conn| Ok(conn.query_row("SELECT count(*) FROM entity", [], |r| r.get(0))?))
    .await
    .unwrap();
  assert_eq!(count, 1);
}

#[tokio::test]
async fn work_language_set() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let english = s.add_language("English", Some("eng")).await.unwrap();
  let french = s.add_language("French", Some("fra")).await.unwrap();

  let mut input = NewRevision::new(editor_id);
  input.languages = vec![english.id, french.id, english.id];
  let works = s.model(EntityType::Work);
  let row = works.insert_revision(None, input).await.unwrap();

  let snapshot = works
    .fetch_by_id(row.bbid, &[Relation::LanguageSet])
    .await
    .unwrap()
    .unwrap();
  let ids: Vec<i64> = snapshot
    .related
    .language_set
    .unwrap()
    .languages
    .iter()
    .map(|l| l.id)
    .collect();
  assert_eq!(ids, [english.id, french.id]);
}

#[tokio::test]
async fn derived_relations_are_refused_for_other_types() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let authors = s.model(EntityType::Author);
  let row = authors
    .insert_revision(None, NewRevision::new(editor_id))
    .await
    .unwrap();

  let err = authors
    .fetch_by_id(row.bbid, &[Relation::LanguageSet])
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(bookbrainz_core::Error::UnsupportedRelation {
      entity_type: EntityType::Author,
      relation:    Relation::LanguageSet,
    })
  ));

  let mut input = NewRevision::new(editor_id);
  input.publishers = vec![Bbid::new_v4()];
  let err = authors.insert_revision(Some(row.bbid), input).await.unwrap_err();
  assert!(matches!(
    err,
    Error::Core(bookbrainz_core::Error::UnsupportedRelation {
      relation: Relation::PublisherSet,
      ..
    })
  ));
}

// ─── Deletion & parent alias ─────────────────────────────────────────────────

#[tokio::test]
async fn parent_alias_names_deleted_entities() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let publishers = s.model(EntityType::Publisher);

  let row = publishers
    .insert_revision(None, NewRevision::new(editor_id).with_alias(alias("Gollancz")))
    .await
    .unwrap();

  // Only the master row exists.
  assert!(publishers.parent_alias(row.bbid).await.unwrap().is_none());

  let deleted = publishers
    .delete(row.bbid, editor_id, Some("duplicate".into()))
    .await
    .unwrap();
  assert!(deleted.master && deleted.deleted);
  assert_eq!(deleted.alias_set_id, None);
  assert!(deleted.attributes.is_none());

  let parent = publishers.parent_alias(row.bbid).await.unwrap().unwrap();
  assert_eq!(parent.name, "Gollancz");
  assert_eq!(parent.sort_name, "Gollancz");
  assert!(parent.primary);

  let registry = s.registry();
  let via_registry = get_entity_parent_alias(&registry, "Publisher", row.bbid)
    .await
    .unwrap();
  assert_eq!(via_registry, Some(parent));
}

#[tokio::test]
async fn parent_alias_uses_the_latest_revision() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let publishers = s.model(EntityType::Publisher);

  let row = publishers
    .insert_revision(None, NewRevision::new(editor_id).with_alias(alias("One")))
    .await
    .unwrap();
  for name in ["Two", "Three"] {
    publishers
      .insert_revision(Some(row.bbid), NewRevision::new(editor_id).with_alias(alias(name)))
      .await
      .unwrap();
  }
  publishers.delete(row.bbid, editor_id, None).await.unwrap();

  let parent = publishers.parent_alias(row.bbid).await.unwrap().unwrap();
  assert_eq!(parent.name, "Three");
}

#[tokio::test]
async fn parent_alias_without_alias_is_none() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let works = s.model(EntityType::Work);
  let row = works
    .insert_revision(None, NewRevision::new(editor_id))
    .await
    .unwrap();
  works.delete(row.bbid, editor_id, None).await.unwrap();
  assert!(works.parent_alias(row.bbid).await.unwrap().is_none());
}

#[tokio::test]
async fn deleted_entities_cannot_be_revised() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let works = s.model(EntityType::Work);
  let row = works
    .insert_revision(None, NewRevision::new(editor_id))
    .await
    .unwrap();
  works.delete(row.bbid, editor_id, None).await.unwrap();

  let err = works
    .insert_revision(Some(row.bbid), NewRevision::new(editor_id))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(bookbrainz_core::Error::EntityDeleted { .. })));

  let err = works.delete(row.bbid, editor_id, None).await.unwrap_err();
  assert!(matches!(err, Error::Core(bookbrainz_core::Error::EntityDeleted { .. })));

  let snapshot = works.fetch_by_id(row.bbid, &[]).await.unwrap().unwrap();
  assert!(snapshot.row.deleted);
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn registry_fetches_by_type_name() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let registry = s.registry();
  let row = registry
    .resolve("Work")
    .unwrap()
    .insert_revision(None, NewRevision::new(editor_id).with_alias(alias("Always Coming Home")))
    .await
    .unwrap();

  let found = get_entity(&registry, "Work", row.bbid, &[Relation::AliasSet], Fetch::Required)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(found.row.bbid, row.bbid);

  let err = get_entity(&registry, "Author", row.bbid, &[], Fetch::Required)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(bookbrainz_core::Error::EntityNotFound { .. })));

  let missing = get_entity(&registry, "Author", row.bbid, &[], Fetch::Optional)
    .await
    .unwrap();
  assert!(missing.is_none());

  let err = get_entity(&registry, "Band", row.bbid, &[], Fetch::Optional)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(bookbrainz_core::Error::UnrecognizedEntityType(name)) if name == "Band"
  ));
}

#[tokio::test]
async fn list_related_returns_plain_json() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let works = s.model(EntityType::Work);
  let row = works
    .insert_revision(None, NewRevision::new(editor_id).with_alias(alias("The Word for World")))
    .await
    .unwrap();

  let aliases = works
    .list_related(row.bbid, Relation::AliasSet)
    .await
    .unwrap()
    .unwrap();
  assert_eq!(aliases["aliases"][0]["sortName"], json!("The Word for World"));

  let none = works.list_related(row.bbid, Relation::Annotation).await.unwrap();
  assert!(none.is_none());
}

// ─── Immutability ────────────────────────────────────────────────────────────

#[tokio::test]
async fn revisions_cannot_be_updated_or_deleted() {
  let s = store().await;
  let editor_id = editor(&s).await;
  s.model(EntityType::Work)
    .insert_revision(None, NewRevision::new(editor_id))
    .await
    .unwrap();

  let update = s
    .conn
    .call(|conn| Ok(conn.execute("UPDATE revision SET note = 'changed'", [])?))
    .await;
  assert!(update.is_err());

  let delete = s
    .conn
    .call(|conn| Ok(conn.execute("DELETE FROM revision", [])?))
    .await;
  assert!(delete.is_err());
}

#[tokio::test]
async fn a_second_master_row_is_rejected() {
  let s = store().await;
  let editor_id = editor(&s).await;
  let row = s
    .model(EntityType::Work)
    .insert_revision(None, NewRevision::new(editor_id))
    .await
    .unwrap();

  let bbid = row.bbid.to_string();
  let result = s
    .conn
    .call(move |conn| {
      conn.execute(
        "INSERT INTO revision (author_id, created_at) VALUES (?1, ?2)",
        params![editor_id, encode_dt(Utc::now())],
      )?;
      let revision_id = conn.last_insert_rowid();
      Ok(conn.execute(
        "INSERT INTO work (bbid, revision_id, master) VALUES (?1, ?2, 1)",
        params![bbid, revision_id],
      )?)
    })
    .await;
  assert!(result.is_err());
}

#[test]
fn every_store_error_has_a_message() {
  let errors = [
    Error::from(bookbrainz_core::Error::UnrecognizedEntityType("Book".into())),
    Error::from(tokio_rusqlite::Error::ConnectionClosed),
    Error::from(serde_json::from_str::<i64>("x").unwrap_err()),
    Error::DateParse("yesterday".into()),
  ];
  for err in errors {
    // Exhaustive, so a new variant has to be constructed above.
    let prefix = match &err {
      Error::Core(_) => "core error",
      Error::Database(_) => "database error",
      Error::Json(_) => "json error",
      Error::DateParse(_) => "date/time parse error",
    };
    assert!(err.to_string().starts_with(prefix), "{err}");
  }
}

// ─── Achievements ────────────────────────────────────────────────────────────

/// Write revisions dated today and each of the previous `days - 1` days.
async fn backdated_revisions(s: &SqliteStore, editor_id: i64, days: i64) {
  s.conn
    .call(move |conn| {
      for back in 0..days {
        conn.execute(
          "INSERT INTO revision (author_id, created_at) VALUES (?1, ?2)",
          params![editor_id, encode_dt(Utc::now() - Duration::days(back))],
        )?;
      }
      Ok(())
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn fun_runner_after_a_week_of_edits() {
  let s = store().await;
  let editor_id = editor(&s).await;
  backdated_revisions(&s, editor_id, 7).await;

  let unlock = process_fun_runner(&s, editor_id).await.unwrap().unwrap();
  assert_eq!(unlock.editor_id, editor_id);
  assert_eq!(unlock.achievement, AchievementKind::FunRunner);

  assert!(process_fun_runner(&s, editor_id).await.unwrap().is_none());
}

#[tokio::test]
async fn no_fun_runner_for_six_days() {
  let s = store().await;
  let editor_id = editor(&s).await;
  backdated_revisions(&s, editor_id, 6).await;
  assert!(process_fun_runner(&s, editor_id).await.unwrap().is_none());
}

#[tokio::test]
async fn streak_stops_at_a_gap() {
  use bookbrainz_core::store::EditorActivity as _;

  let s = store().await;
  let editor_id = editor(&s).await;
  s.conn
    .call(move |conn| {
      for back in [0, 1, 3, 4] {
        conn.execute(
          "INSERT INTO revision (author_id, created_at) VALUES (?1, ?2)",
          params![editor_id, encode_dt(Utc::now() - Duration::days(back))],
        )?;
      }
      Ok(())
    })
    .await
    .unwrap();

  assert_eq!(s.consecutive_days_with_edits(editor_id, 6).await.unwrap(), 2);
}
