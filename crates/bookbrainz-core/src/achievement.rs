//! Achievement evaluation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::store::EditorActivity;

/// Streak window passed to the activity query for "Fun Runner".
pub const FUN_RUNNER_DAYS: u32 = 6;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
pub enum AchievementKind {
  /// A revision every day for a week.
  #[strum(serialize = "Fun Runner")]
  #[serde(rename = "Fun Runner")]
  FunRunner,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementUnlock {
  pub editor_id:   i64,
  pub achievement: AchievementKind,
  pub unlocked_at: DateTime<Utc>,
}

/// Unlock "Fun Runner" if the editor has edited on each of the last seven
/// days. Returns the new unlock, or `None` if not earned or already held.
pub async fn process_fun_runner<A>(
  activity: &A,
  editor_id: i64,
) -> Result<Option<AchievementUnlock>, A::Error>
where
  A: EditorActivity + ?Sized,
{
  let streak = activity
    .consecutive_days_with_edits(editor_id, FUN_RUNNER_DAYS)
    .await?;
  if streak > FUN_RUNNER_DAYS {
    activity
      .unlock_achievement(editor_id, AchievementKind::FunRunner)
      .await
  } else {
    Ok(None)
  }
}
