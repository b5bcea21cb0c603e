//! Error types for `bookbrainz-core`.

use thiserror::Error;

use crate::entity::{Bbid, EntityType, Relation};

#[derive(Debug, Error)]
pub enum Error {
  #[error("unrecognized entity type: {0:?}")]
  UnrecognizedEntityType(String),

  #[error("unknown relation: {0:?}")]
  UnknownRelation(String),

  #[error("{relation} is not a relation of {entity_type}")]
  UnsupportedRelation {
    entity_type: EntityType,
    relation:    Relation,
  },

  #[error("{entity_type} not found: {bbid}")]
  EntityNotFound { entity_type: EntityType, bbid: Bbid },

  #[error("{entity_type} {bbid} has been deleted")]
  EntityDeleted { entity_type: EntityType, bbid: Bbid },

  /// A reference to another entity names a bbid of the wrong type.
  #[error("{bbid} is not a {expected}")]
  WrongEntityType { bbid: Bbid, expected: EntityType },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
