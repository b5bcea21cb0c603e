//! [`SqliteStore`]: connection owner, model factory, and the SQLite
//! implementation of [`EditorActivity`].

use std::{collections::HashSet, path::Path};

use chrono::{Days, Utc};
use rusqlite::params;
use strum::IntoEnumIterator as _;

use bookbrainz_core::{
  achievement::{AchievementKind, AchievementUnlock},
  entity::EntityType,
  registry::ModelRegistry,
  revision::Editor,
  sets::Language,
  store::EditorActivity,
};

use crate::{
  Error, Result,
  encode::{decode_dt, encode_dt},
  model::SqliteEntityModel,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A BookBrainz data store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// The model for one entity type, sharing this store's connection.
  pub fn model(&self, entity_type: EntityType) -> SqliteEntityModel {
    SqliteEntityModel::new(entity_type, self.conn.clone())
  }

  /// A registry with a model wired for every entity type.
  pub fn registry(&self) -> ModelRegistry<SqliteEntityModel> {
    ModelRegistry::new(EntityType::iter().map(|t| self.model(t)))
  }

  pub async fn add_editor(&self, name: &str) -> Result<Editor> {
    let name = name.to_owned();
    let created_at = Utc::now();
    let at_str = encode_dt(created_at);

    let (id, name) = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO editor (name, created_at) VALUES (?1, ?2)",
          params![name, at_str],
        )?;
        Ok((conn.last_insert_rowid(), name))
      })
      .await?;

    Ok(Editor { id, name, created_at })
  }

  pub async fn add_language(&self, name: &str, iso_code: Option<&str>) -> Result<Language> {
    let name = name.to_owned();
    let iso_code = iso_code.map(str::to_owned);

    Ok(
      self
        .conn
        .call(move |conn| {
          conn.execute(
            "INSERT INTO language (name, iso_code) VALUES (?1, ?2)",
            params![name, iso_code],
          )?;
          Ok(Language { id: conn.last_insert_rowid(), name, iso_code })
        })
        .await?,
    )
  }
}

// ─── EditorActivity impl ─────────────────────────────────────────────────────

impl EditorActivity for SqliteStore {
  type Error = Error;

  async fn consecutive_days_with_edits(&self, editor_id: i64, days: u32) -> Result<u32> {
    let today = Utc::now().date_naive();
    let since = today
      .checked_sub_days(Days::new(u64::from(days)))
      .unwrap_or(today)
      .format("%Y-%m-%d")
      .to_string();

    let active: HashSet<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT substr(created_at, 1, 10)
           FROM revision
           WHERE author_id = ?1 AND created_at >= ?2",
        )?;
        let rows = stmt
          .query_map(params![editor_id, since], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<HashSet<_>>>()?;
        Ok(rows)
      })
      .await?;

    let streak = (0..=days)
      .map_while(|back| today.checked_sub_days(Days::new(u64::from(back))))
      .take_while(|day| active.contains(&day.format("%Y-%m-%d").to_string()))
      .count();
    Ok(u32::try_from(streak).unwrap_or(u32::MAX))
  }

  async fn unlock_achievement(
    &self,
    editor_id: i64,
    achievement: AchievementKind,
  ) -> Result<Option<AchievementUnlock>> {
    let name = achievement.as_ref().to_owned();
    let at_str = encode_dt(Utc::now());

    let stored: Option<String> = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          "INSERT OR IGNORE INTO achievement_unlock (editor_id, achievement, unlocked_at)
           VALUES (?1, ?2, ?3)",
          params![editor_id, name, at_str],
        )?;
        Ok((inserted > 0).then_some(at_str))
      })
      .await?;

    stored
      .map(|at| {
        Ok::<_, Error>(AchievementUnlock {
          editor_id,
          achievement,
          unlocked_at: decode_dt(&at)?,
        })
      })
      .transpose()
  }
}
