//! Serde helper for boolean flags that may arrive as `0`/`1`.
//!
//! SQLite has no boolean type, so rows read back through the generic column
//! translation carry integers where payloads carry booleans.

use serde::{Deserialize, Deserializer, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
  Bool(bool),
  Int(i64),
}

/// Use with `#[serde(deserialize_with = "crate::flag::deserialize")]`.
pub fn deserialize<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
  D: Deserializer<'de>,
{
  match Option::<Flag>::deserialize(deserializer)? {
    None => Ok(false),
    Some(Flag::Bool(b)) => Ok(b),
    Some(Flag::Int(0)) => Ok(false),
    Some(Flag::Int(1)) => Ok(true),
    Some(Flag::Int(other)) => {
      Err(D::Error::custom(format!("invalid flag value: {other}")))
    }
  }
}
