//! Request extractors and middleware.

pub mod actor;

pub use actor::{ACTOR_CAPABILITIES_HEADER, ACTOR_ID_HEADER, ACTOR_ROLE_HEADER, CurrentActor};
