pub mod collection;
pub mod config;

pub use collection::{Collection, Entity, NoPatch};
pub use config::StoreConfig;

use luna_shared::types::{User, UserPatch};

impl Entity for User {
    type Id = i64;
    type Patch = UserPatch;

    const COLLECTION: &'static str = "users";

    fn id(&self) -> i64 {
        self.id
    }

    // User ids come from the external identity provider; never synthesized.
}
