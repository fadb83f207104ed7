#![allow(clippy::too_many_arguments, clippy::collapsible_if, clippy::collapsible_else_if,
         clippy::field_reassign_with_default, clippy::manual_range_contains,
         clippy::comparison_chain, clippy::float_cmp, clippy::needless_range_loop,
         clippy::manual_clamp)]
// Game module: the per-frame entity simulation and player movement loop.

pub mod error;
pub mod dispatch;
pub mod game_import;
pub mod game;
pub mod g_local;
pub mod m_player_frames;
pub mod g_utils;
pub mod g_combat;
pub mod g_target;
pub mod g_phys;
pub mod g_main;
pub mod p_view;
pub mod p_client;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::GameError;
pub use g_local::{GameContext, GameCtx};
pub use game_import::{GameImport, StubGameImport};
