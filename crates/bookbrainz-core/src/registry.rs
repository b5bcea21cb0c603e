//! Entity model registry and the type-name–driven entry points.
//!
//! Callers address entities by type name (`"Author"`) and bbid. The registry
//! validates the name against the closed set of entity types and hands back
//! the storage model wired for it.

use std::collections::BTreeMap;

use crate::{
  entity::{Bbid, EntitySnapshot, EntityType, Relation},
  sets::Alias,
  store::EntityModel,
  Error, Result,
};

/// Maps each entity type to its storage model.
#[derive(Debug, Clone)]
pub struct ModelRegistry<M> {
  models: BTreeMap<EntityType, M>,
}

impl<M: EntityModel> ModelRegistry<M> {
  /// Build a registry from models; each is keyed by its own entity type.
  pub fn new(models: impl IntoIterator<Item = M>) -> Self {
    Self {
      models: models
        .into_iter()
        .map(|m| (m.entity_type(), m))
        .collect(),
    }
  }

  /// The model for `entity_type`, if wired.
  pub fn model(&self, entity_type: EntityType) -> Result<&M> {
    self
      .models
      .get(&entity_type)
      .ok_or_else(|| Error::UnrecognizedEntityType(entity_type.to_string()))
  }

  /// Resolve a type name to its model. Unknown names and types without a
  /// wired model are both rejected; there is no fallback.
  pub fn resolve(&self, type_name: &str) -> Result<&M> {
    self.model(EntityType::parse(type_name)?)
  }

  /// All wired models, in entity-type order.
  pub fn models(&self) -> impl Iterator<Item = (EntityType, &M)> {
    self.models.iter().map(|(t, m)| (*t, m))
  }
}

/// Whether a fetch must find its entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fetch {
  /// A missing entity is an [`Error::EntityNotFound`].
  #[default]
  Required,
  /// A missing entity is `Ok(None)`.
  Optional,
}

/// Fetch an entity snapshot by type name and bbid.
///
/// With [`Fetch::Required`] the result is never `Ok(None)`.
pub async fn get_entity<M: EntityModel>(
  registry: &ModelRegistry<M>,
  type_name: &str,
  bbid: Bbid,
  relations: &[Relation],
  fetch: Fetch,
) -> Result<Option<EntitySnapshot>, M::Error> {
  let model = registry.resolve(type_name)?;
  let snapshot = model.fetch_by_id(bbid, relations).await?;
  if snapshot.is_none() && fetch == Fetch::Required {
    return Err(
      Error::EntityNotFound { entity_type: model.entity_type(), bbid }.into(),
    );
  }
  Ok(snapshot)
}

/// The last known default alias of an entity, from its most recent
/// non-master revision. Used to name deleted entities.
pub async fn get_entity_parent_alias<M: EntityModel>(
  registry: &ModelRegistry<M>,
  type_name: &str,
  bbid: Bbid,
) -> Result<Option<Alias>, M::Error> {
  registry.resolve(type_name)?.parent_alias(bbid).await
}
