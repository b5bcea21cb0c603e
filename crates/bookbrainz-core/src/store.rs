//! Storage traits.
//!
//! Backends (e.g. `bookbrainz-store-sqlite`) implement these; the registry and
//! fetch helpers in [`crate::registry`] depend only on the abstraction.

use std::future::Future;

use serde_json::Value;

use crate::{
  achievement::{AchievementKind, AchievementUnlock},
  entity::{Bbid, EntityRow, EntitySnapshot, EntityType, Relation},
  revision::NewRevision,
  sets::Alias,
};

// ─── EntityModel ─────────────────────────────────────────────────────────────

/// Storage access for the revision rows of one entity type.
///
/// Revision rows are append-only. Every write inserts a new revision and a new
/// row, then moves the `master` flag onto it inside a single transaction.
///
/// All methods return `Send` futures so models can be shared across tasks.
pub trait EntityModel: Send + Sync {
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  fn entity_type(&self) -> EntityType;

  /// Load the master row for `bbid` with the requested relations eagerly
  /// resolved. Returns `None` if no such entity exists.
  ///
  /// The snapshot is read atomically; a failure part-way yields an error,
  /// never a partial snapshot.
  fn fetch_by_id<'a>(
    &'a self,
    bbid: Bbid,
    relations: &'a [Relation],
  ) -> impl Future<Output = Result<Option<EntitySnapshot>, Self::Error>> + Send + 'a;

  /// Every row for `bbid`, oldest revision first.
  fn history(
    &self,
    bbid: Bbid,
  ) -> impl Future<Output = Result<Vec<EntityRow>, Self::Error>> + Send + '_;

  /// Record a new revision. `bbid = None` creates a new entity.
  ///
  /// Returns the new master row.
  fn insert_revision(
    &self,
    bbid: Option<Bbid>,
    input: NewRevision,
  ) -> impl Future<Output = Result<EntityRow, Self::Error>> + Send + '_;

  /// Logically delete an entity: the new master row carries no data.
  fn delete(
    &self,
    bbid: Bbid,
    editor_id: i64,
    note: Option<String>,
  ) -> impl Future<Output = Result<EntityRow, Self::Error>> + Send + '_;

  /// The default alias of the most recent non-master row for `bbid`.
  ///
  /// This is the "last known name" of a deleted entity. Returns `None` when
  /// the entity has no earlier revision or that revision had no alias.
  fn parent_alias(
    &self,
    bbid: Bbid,
  ) -> impl Future<Output = Result<Option<Alias>, Self::Error>> + Send + '_;

  /// One relation of the master row as plain JSON, keyed as in
  /// [`EntitySnapshot`]. `None` if the entity or the relation is absent.
  fn list_related(
    &self,
    bbid: Bbid,
    relation: Relation,
  ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send + '_ {
    async move {
      let relations = [relation];
      let Some(snapshot) = self.fetch_by_id(bbid, &relations).await? else {
        return Ok(None);
      };
      let mut related =
        serde_json::to_value(&snapshot.related).map_err(crate::Error::from)?;
      Ok(related.get_mut(relation.as_ref()).map(Value::take))
    }
  }
}

// ─── EditorActivity ──────────────────────────────────────────────────────────

/// Editor activity queries used by achievement processing.
pub trait EditorActivity: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Length of the run of consecutive days, ending today, on which the editor
  /// made at least one revision. Only the last `days + 1` days are counted.
  fn consecutive_days_with_edits(
    &self,
    editor_id: i64,
    days: u32,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  /// Record an unlock. Returns `None` if the editor already holds it.
  fn unlock_achievement(
    &self,
    editor_id: i64,
    achievement: AchievementKind,
  ) -> impl Future<Output = Result<Option<AchievementUnlock>, Self::Error>> + Send + '_;
}
