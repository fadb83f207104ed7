// game.rs — game module types visible to the host

pub use mq2b_common::q_shared::Multicast;
use mq2b_common::q_shared::Vec3;

// edict->svflags
pub const SVF_NOCLIENT: i32 = 0x00000001; // don't send entity to clients
pub const SVF_DEADMONSTER: i32 = 0x00000002; // treat as CONTENTS_DEADMONSTER for collision
pub const SVF_MONSTER: i32 = 0x00000004; // treat as CONTENTS_MONSTER for collision

// edict->solid values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Solid {
    #[default]
    Not = 0,
    Trigger,
    Bbox,
    Bsp,
}

/// A broadcast event queued for the replication layer.
///
/// The host owns the wire encoding; the game only says what happened, where,
/// and (through [`Multicast`]) who should hear about it.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// Muzzle flash style effect attached to an entity (login/logout puffs).
    MuzzleFlash { entity: i32, flash: i32 },
    /// Point effect at a world position, `kind` is one of the `TE_*` values.
    TempEntity { kind: i32, origin: Vec3 },
    /// `TE_SPLASH` with its particle count, direction and color.
    Splash { count: i32, origin: Vec3, dir: Vec3, color: i32 },
}
