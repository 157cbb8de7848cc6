use serde::{Deserialize, Serialize};
use uuid::Uuid;

use luna_store::{Entity, NoPatch};

/// An immutable interest edge from `rater_id` to `rated_id`. Scores run
/// 1..=10; a super-like is recorded with [`crate::SUPER_LIKE_SCORE`] and the
/// flag set. The log is append-only and its insertion order is what
/// `likers_of` reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    #[serde(default)]
    pub id: String,
    pub rater_id: i64,
    pub rated_id: i64,
    pub score: i32,
    #[serde(default)]
    pub is_super_like: bool,
    /// Unix millis at submission.
    pub timestamp: i64,
}

impl Entity for Rating {
    type Id = String;
    type Patch = NoPatch;

    const COLLECTION: &'static str = "ratings";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn ensure_id(&mut self) {
        if self.id.is_empty() {
            self.id = Uuid::new_v4().to_string();
        }
    }
}
