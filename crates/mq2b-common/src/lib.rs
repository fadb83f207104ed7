#![allow(clippy::too_many_arguments, clippy::float_cmp, clippy::needless_range_loop,
         clippy::manual_range_contains, clippy::field_reassign_with_default)]
// Shared definitions for the mq2b game module and the engine that hosts it.

pub mod q_shared;
pub mod cvar;
pub mod pmove;
