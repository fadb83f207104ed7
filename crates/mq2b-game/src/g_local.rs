// g_local.rs — local definitions for the game module

pub use mq2b_common::q_shared::*;
pub use crate::game::{Multicast, ServerMessage, Solid, SVF_DEADMONSTER, SVF_MONSTER, SVF_NOCLIENT};

use crate::dispatch::Dispatch;
use crate::error::{GameError, GameResult};
use crate::game_import::GameImport;

/// Simulation step length in seconds. Fixed: the whole game runs at 10 Hz.
pub const FRAMETIME: f32 = 0.1;

// View pitching times
pub const DAMAGE_TIME: f32 = 0.5;
pub const FALL_TIME: f32 = 0.3;

// edict->flags
bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EntityFlags: i32 {
        const FLY          = 0x00000001;
        const SWIM         = 0x00000002;
        const INWATER      = 0x00000008;
        const GODMODE      = 0x00000010;
        const NOTARGET     = 0x00000020;
        const TEAMSLAVE    = 0x00000400;
        const NO_KNOCKBACK = 0x00000800;
    }
}
pub const FL_NOTARGET: EntityFlags = EntityFlags::NOTARGET;
pub const FL_NO_KNOCKBACK: EntityFlags = EntityFlags::NO_KNOCKBACK;

// ============================================================
// Enums
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum Damage {
    #[default]
    No = 0,
    Yes, // will take damage if hit
    Aim, // auto targeting recognizes this
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum MoveType {
    #[default]
    None = 0, // never moves
    Noclip,   // origin and angles change with no interaction
    Walk,     // gravity, driven by the movement integrator
    Step,     // gravity, special edge handling
    Toss,     // gravity
}

// animation priorities, lowest first
pub const ANIM_BASIC: i32 = 0; // stand / run
pub const ANIM_WAVE: i32 = 1;
pub const ANIM_JUMP: i32 = 2;
pub const ANIM_PAIN: i32 = 3;
pub const ANIM_ATTACK: i32 = 4;
pub const ANIM_DEATH: i32 = 5;
pub const ANIM_REVERSE: i32 = 6;

// noise types for player_noise
pub const PNOISE_SELF: i32 = 0;
pub const PNOISE_WEAPON: i32 = 1;
pub const PNOISE_IMPACT: i32 = 2;

// means of death
pub const MOD_UNKNOWN: i32 = 0;
pub const MOD_TELEFRAG: i32 = 21;

// handedness values
pub const RIGHT_HANDED: i32 = 0;
pub const LEFT_HANDED: i32 = 1;
pub const CENTER_HANDED: i32 = 2;

// ============================================================
// Entity references
// ============================================================

/// Generation-checked handle to an edict slot.
///
/// A slot's generation is bumped every time it is freed, so a handle taken
/// before the free no longer resolves once the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct EntityRef {
    pub index: usize,
    pub generation: u32,
}

// ============================================================
// Level and game state
// ============================================================

/// State that survives level changes.
#[derive(Debug, Clone, Default)]
pub struct GameLocals {
    /// Spawn marker name requested by the last level change, "" = any.
    pub spawnpoint: String,
    pub maxclients: usize,
    pub maxentities: usize,
}

/// Level state (cleared on each map change).
#[derive(Debug, Clone, Default)]
pub struct LevelLocals {
    pub framenum: i32,
    pub time: f32,

    pub level_name: String,
    pub mapname: String,
    pub nextmap: String,

    // most recent interesting entities, tagged with the frame they were set
    pub sight_client: Option<EntityRef>,
    pub sight_entity: Option<EntityRef>,
    pub sight_entity_framenum: i32,
    pub sound_entity: Option<EntityRef>,
    pub sound_entity_framenum: i32,
    pub sound2_entity: Option<EntityRef>,
    pub sound2_entity_framenum: i32,

    pub current_entity: usize,

    pub gibs_this_frame: i32,
    pub debris_this_frame: i32,
}

// ============================================================
// Client records
// ============================================================

/// Client data that survives level changes and the per-life reset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientPersistant {
    pub userinfo: String,
    pub netname: String,
    pub hand: i32,
    /// A loadgame will leave valid entities that just don't have a connection yet.
    pub connected: bool,
}

/// Client data that stays across deathmatch respawns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientRespawn {
    pub enterframe: i32, // level.framenum the client entered the game
    pub cmd_angles: Vec3, // angles sent over in the last command
    pub id_state: bool,
}

/// Full game client structure.
#[derive(Debug, Clone, Default)]
pub struct GClient {
    // known to the host
    pub ps: PlayerState,
    pub ping: i32,

    // private to game
    pub pers: ClientPersistant,
    pub resp: ClientRespawn,
    pub old_pmove: PmoveState, // for detecting out-of-pmove changes

    pub buttons: u8,
    pub oldbuttons: u8,
    pub latched_buttons: u8,

    // sum up damage over an entire frame, so shotgun blasts give a single
    // big kick instead of many small ones
    pub kick_angles: Vec3, // weapon kicks
    pub kick_origin: Vec3,
    pub v_dmg_roll: f32, // damage kicks
    pub v_dmg_pitch: f32,
    pub v_dmg_time: f32,
    pub fall_time: f32, // for view drop on fall
    pub fall_value: f32,
    pub damage_alpha: f32,
    pub bonus_alpha: f32,
    pub damage_blend: Vec3,
    pub v_angle: Vec3, // aiming direction
    pub bobtime: f32, // so off-ground doesn't change it
    pub bobmove: f32,
    pub old_bobcycle: i32,
    pub oldviewangles: Vec3,
    pub oldvelocity: Vec3,

    // animation vars
    pub anim_end: i32,
    pub anim_priority: i32,
    pub anim_duck: bool,
    pub anim_run: bool,

    pub flood_locktill: f32, // locked from talking
    pub flood_when: [f32; 10], // when messages were said
    pub flood_whenhead: usize, // head pointer for when said

    pub respawn_time: f32, // can respawn when time > this
}

// ============================================================
// Edict
// ============================================================

#[derive(Debug, Clone, Default)]
pub struct Edict {
    // host-visible fields
    pub s: EntityState,
    pub client: Option<usize>, // index into clients, None if not a player
    pub inuse: bool,
    pub linkcount: i32,
    pub svflags: i32,
    pub mins: Vec3,
    pub maxs: Vec3,
    pub absmin: Vec3,
    pub absmax: Vec3,
    pub size: Vec3,
    pub solid: Solid,
    pub clipmask: i32,
    pub owner: Option<EntityRef>,

    // game-private fields
    pub generation: u32,
    pub movetype: MoveType,
    pub flags: EntityFlags,
    pub model: String,
    pub freetime: f32, // sv.time when the object was freed
    pub classname: String,
    pub targetname: String,
    pub target: String,
    pub killtarget: String,
    pub spawnflags: i32,

    pub velocity: Vec3,
    pub avelocity: Vec3,
    pub mass: i32,
    pub gravity: f32, // per entity gravity multiplier (1.0 is normal)
    pub client_local_gravity: i32, // absolute gravity for this player, 0 = use sv_gravity

    pub nextthink: f32,
    // callbacks, stored as indices into the world's dispatch tables
    pub prethink_fn: Option<usize>,
    pub think_fn: Option<usize>,
    pub touch_fn: Option<usize>,
    pub use_fn: Option<usize>,
    pub pain_fn: Option<usize>,
    pub die_fn: Option<usize>,

    pub health: i32,
    pub max_health: i32,
    pub viewheight: i32, // height above origin where eyesight is determined
    pub takedamage: Damage,
    pub count: i32,
    pub style: i32, // temp entity kind for target_temp_entity
    pub sounds: i32,
    pub dmg: i32,
    pub delay: f32, // seconds before targets fire
    pub movedir: Vec3,
    pub activator: Option<EntityRef>,

    pub groundentity: Option<EntityRef>,
    pub groundentity_linkcount: i32,
    pub teamchain: Option<EntityRef>,
    pub teammaster: Option<EntityRef>,

    pub mynoise: Option<EntityRef>, // can go in client only
    pub mynoise2: Option<EntityRef>,
    pub last_sound_time: f32,

    pub watertype: i32,
    pub waterlevel: i32,

    pub light_level: i32,
}

// ============================================================
// Configuration
// ============================================================

/// Console variables the game reads at init.
#[derive(Debug, Clone, PartialEq)]
pub struct GameCvars {
    pub sv_gravity: f32,
    pub sv_maxvelocity: f32,
    pub sv_rollspeed: f32,
    pub sv_rollangle: f32,
    pub gun_x: f32,
    pub gun_y: f32,
    pub gun_z: f32,
    pub run_pitch: f32,
    pub run_roll: f32,
    pub bob_up: f32,
    pub bob_pitch: f32,
    pub bob_roll: f32,
    pub maxclients: f32,
    pub maxentities: f32,
    pub deathmatch: f32,
    pub dmflags: f32,
    pub password: String,
}

impl Default for GameCvars {
    fn default() -> Self {
        Self {
            sv_gravity: 800.0,
            sv_maxvelocity: 2000.0,
            sv_rollspeed: 200.0,
            sv_rollangle: 2.0,
            gun_x: 0.0,
            gun_y: 0.0,
            gun_z: 0.0,
            run_pitch: 0.002,
            run_roll: 0.005,
            bob_up: 0.005,
            bob_pitch: 0.002,
            bob_roll: 0.002,
            maxclients: 4.0,
            maxentities: 1024.0,
            deathmatch: 0.0,
            dmflags: 0.0,
            password: String::new(),
        }
    }
}

// ============================================================
// Game context
// ============================================================

/// The simulation world: every entity, every client record, the level and
/// the host services. Built at map load and dropped at map unload.
pub struct GameCtx {
    pub gi: Box<dyn GameImport + Send + Sync>,
    pub dispatch: Dispatch,

    pub edicts: Vec<Edict>,
    pub clients: Vec<GClient>,
    pub game: GameLocals,
    pub level: LevelLocals,
    pub cvars: GameCvars,

    /// Slots `0..num_edicts` are the ones the frame loop walks.
    pub num_edicts: usize,

    // precache indices
    pub snd_fry: i32,
}

/// Convenience alias so every game module can refer to the context as `GameContext`.
pub type GameContext = GameCtx;

impl GameCtx {
    /// Build a world sized from `cvars`: slot 0 is the world entity, slots
    /// `1..=maxclients` are reserved for players.
    pub fn new(gi: Box<dyn GameImport + Send + Sync>, cvars: GameCvars) -> Self {
        let maxclients = (cvars.maxclients as usize).clamp(1, MAX_CLIENTS);
        let maxentities = (cvars.maxentities as usize).clamp(maxclients + 1, MAX_EDICTS);

        let mut edicts = vec![Edict::default(); maxentities];
        for (i, ent) in edicts.iter_mut().enumerate() {
            ent.s.number = i as i32;
        }
        for i in 1..=maxclients {
            edicts[i].client = Some(i - 1);
        }

        let world = &mut edicts[0];
        world.inuse = true;
        world.classname = "worldspawn".to_string();
        world.solid = Solid::Bsp;
        world.movetype = MoveType::None;
        world.gravity = 1.0;

        Self {
            gi,
            dispatch: Dispatch::default(),
            edicts,
            clients: vec![GClient::default(); maxclients],
            game: GameLocals {
                spawnpoint: String::new(),
                maxclients,
                maxentities,
            },
            level: LevelLocals::default(),
            cvars,
            num_edicts: maxclients + 1,
            snd_fry: 0,
        }
    }

    pub fn deathmatch(&self) -> bool {
        self.cvars.deathmatch != 0.0
    }

    /// True for the reserved player slots `1..=maxclients`.
    pub fn is_client_slot(&self, index: usize) -> bool {
        index >= 1 && index <= self.game.maxclients
    }

    /// Client record index of a player slot.
    pub fn client_index(&self, ent_idx: usize) -> GameResult<usize> {
        if ent_idx >= self.edicts.len() {
            return Err(GameError::InvalidEntity { index: ent_idx });
        }
        if !self.is_client_slot(ent_idx) {
            return Err(GameError::NotAClient { index: ent_idx });
        }
        Ok(ent_idx - 1)
    }

    /// Handle to the current occupant of a slot.
    pub fn entity_ref(&self, index: usize) -> EntityRef {
        EntityRef {
            index,
            generation: self.edicts.get(index).map_or(0, |e| e.generation),
        }
    }

    /// Index behind a handle, as long as the slot still holds the same
    /// occupant and is in use.
    pub fn resolve(&self, r: Option<EntityRef>) -> Option<usize> {
        let r = r?;
        let ent = self.edicts.get(r.index)?;
        (ent.inuse && ent.generation == r.generation).then_some(r.index)
    }
}
