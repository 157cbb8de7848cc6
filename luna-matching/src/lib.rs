pub mod distance;
pub mod engine;
pub mod models;

pub use engine::{
    discovery_queue, is_match, likers_of, submit_rating, visible_liker_count, LIKER_PREVIEW_LIMIT,
    LIKE_THRESHOLD, SUPER_LIKE_SCORE,
};
pub use models::Rating;
