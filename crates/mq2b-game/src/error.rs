// error.rs — unrecoverable game errors
//
// Only contract violations end up here. Bad map data and empty lookups are
// logged and the entity involved is neutralized instead.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("no free edicts (max {max})")]
    NoFreeEdicts { max: usize },

    #[error("entity {index} is not a client slot")]
    NotAClient { index: usize },

    #[error("entity index {index} is outside the edict arena")]
    InvalidEntity { index: usize },
}

pub type GameResult<T> = Result<T, GameError>;
