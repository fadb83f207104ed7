// q_shared.rs — foundational types and functions shared by the game module and its host

// ============================================================
// Basic types
// ============================================================

pub type Vec3 = [f32; 3];

pub const PITCH: usize = 0; // up / down
pub const YAW: usize = 1; // left / right
pub const ROLL: usize = 2; // fall over

pub const VEC3_ORIGIN: Vec3 = [0.0; 3];

// ============================================================
// Limits
// ============================================================

pub const MAX_CLIENTS: usize = 256;
pub const MAX_EDICTS: usize = 1024;
pub const MAX_LIGHTSTYLES: usize = 256;
pub const MAX_MODELS: usize = 256;
pub const MAX_SOUNDS: usize = 256;
pub const MAX_IMAGES: usize = 256;
pub const MAX_ITEMS: usize = 256;

pub const MAX_INFO_KEY: usize = 64;
pub const MAX_INFO_STRING: usize = 512;

// ============================================================
// Print levels
// ============================================================

pub const PRINT_HIGH: i32 = 2;

// ============================================================
// Multicast
// ============================================================

/// Which clients receive a broadcast event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Multicast {
    All = 0,
    Phs = 1,
    Pvs = 2,
    AllR = 3,
    PhsR = 4,
    PvsR = 5,
}

// ============================================================
// Temp entity events
// ============================================================

// world-origin effects, sent with an explicit position
pub const TE_EXPLOSION1: i32 = 5;
pub const TE_SPLASH: i32 = 10;

// TE_SPLASH colors
pub const SPLASH_BLUE_WATER: i32 = 2;

// ============================================================
// Content flags
// ============================================================

pub const CONTENTS_SOLID: i32 = 1;
pub const CONTENTS_WINDOW: i32 = 2;
pub const CONTENTS_LAVA: i32 = 8;
pub const CONTENTS_SLIME: i32 = 16;
pub const CONTENTS_WATER: i32 = 32;
pub const CONTENTS_PLAYERCLIP: i32 = 0x10000;
pub const CONTENTS_MONSTER: i32 = 0x2000000;
pub const CONTENTS_DEADMONSTER: i32 = 0x4000000;

pub const MASK_SOLID: i32 = CONTENTS_SOLID | CONTENTS_WINDOW;
pub const MASK_PLAYERSOLID: i32 =
    CONTENTS_SOLID | CONTENTS_PLAYERCLIP | CONTENTS_WINDOW | CONTENTS_MONSTER;
pub const MASK_WATER: i32 = CONTENTS_WATER | CONTENTS_LAVA | CONTENTS_SLIME;

// box_edicts area types
pub const AREA_SOLID: i32 = 1;
pub const AREA_TRIGGERS: i32 = 2;

// ============================================================
// Plane / surface
// ============================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CPlane {
    pub normal: Vec3,
    pub dist: f32,
    pub plane_type: u8,
    pub signbits: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CSurface {
    pub name: String,
    pub flags: i32,
    pub value: i32,
}

// ============================================================
// Trace
// ============================================================

/// Result of sweeping a box through the world.
#[derive(Debug, Clone)]
pub struct Trace {
    pub allsolid: bool,
    pub startsolid: bool,
    pub fraction: f32,
    pub endpos: Vec3,
    pub plane: CPlane,
    pub surface: Option<CSurface>,
    pub contents: i32,
    /// Entity index that was hit, -1 = none.
    pub ent_index: i32,
}

impl Default for Trace {
    fn default() -> Self {
        Self {
            allsolid: false,
            startsolid: false,
            fraction: 1.0,
            endpos: [0.0; 3],
            plane: CPlane::default(),
            surface: None,
            contents: 0,
            ent_index: -1,
        }
    }
}

// ============================================================
// Player movement types
// ============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum PmType {
    #[default]
    Normal = 0,
    Spectator = 1,
    Dead = 2,
    Gib = 3,
    Freeze = 4,
}

pub const PMF_DUCKED: u8 = 1;
pub const PMF_ON_GROUND: u8 = 4;
pub const PMF_TIME_TELEPORT: u8 = 32;

/// Fixed-point scale of the integrator's origin and velocity (1/8 unit).
pub const PMOVE_SCALE: f32 = 8.0;
pub const PMOVE_INV_SCALE: f32 = 0.125;

/// Raw movement state, replicated bit-exact to clients for prediction.
/// Origin and velocity are 12.3 fixed point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PmoveState {
    pub pm_type: PmType,
    pub origin: [i16; 3],
    pub velocity: [i16; 3],
    pub pm_flags: u8,
    pub pm_time: u8,
    pub gravity: i16,
    pub delta_angles: [i16; 3],
}

// ============================================================
// Button bits
// ============================================================

pub const BUTTON_ATTACK: u8 = 1;
pub const BUTTON_USE: u8 = 2;

/// One tick of client input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserCmd {
    pub msec: u8,
    pub buttons: u8,
    pub angles: [i16; 3],
    pub forwardmove: i16,
    pub sidemove: i16,
    pub upmove: i16,
    pub impulse: u8,
    pub lightlevel: u8,
}

pub const MAXTOUCH: usize = 32;

/// In/out record handed to the movement integrator.
///
/// Collision callbacks are supplied separately at call time through
/// [`crate::pmove::PmoveCallbacks`].
#[derive(Debug, Clone)]
pub struct PmoveData {
    // in/out
    pub s: PmoveState,

    // in
    pub cmd: UserCmd,
    pub snapinitial: bool,

    // out
    pub numtouch: i32,
    pub touchents: [i32; MAXTOUCH],
    pub viewangles: Vec3,
    pub viewheight: f32,
    pub mins: Vec3,
    pub maxs: Vec3,
    pub groundentity: i32, // entity index, -1 = none
    pub watertype: i32,
    pub waterlevel: i32,
}

impl Default for PmoveData {
    fn default() -> Self {
        Self {
            s: PmoveState::default(),
            cmd: UserCmd::default(),
            snapinitial: false,
            numtouch: 0,
            touchents: [-1; MAXTOUCH],
            viewangles: [0.0; 3],
            viewheight: 0.0,
            mins: [0.0; 3],
            maxs: [0.0; 3],
            groundentity: -1,
            watertype: 0,
            waterlevel: 0,
        }
    }
}

impl PmoveData {
    /// The contacted entity indices the integrator reported this step.
    pub fn touched(&self) -> &[i32] {
        let n = (self.numtouch.max(0) as usize).min(MAXTOUCH);
        &self.touchents[..n]
    }
}

// ============================================================
// Sound channels / attenuation
// ============================================================

pub const CHAN_VOICE: i32 = 2;

pub const ATTN_NORM: f32 = 1.0;

// ============================================================
// Muzzle flashes used as login/logout effects
// ============================================================

pub const MZ_LOGIN: i32 = 9;
pub const MZ_LOGOUT: i32 = 10;

// ============================================================
// Refdef flags
// ============================================================

pub const RDF_UNDERWATER: i32 = 1;

// ============================================================
// Angle/short conversion
// ============================================================

#[inline]
pub fn angle2short(x: f32) -> i32 {
    ((x * 65536.0 / 360.0) as i32) & 65535
}

#[inline]
pub fn short2angle(x: i16) -> f32 {
    (x as f32) * (360.0 / 65536.0)
}

// ============================================================
// Config strings
// ============================================================

pub const CS_MODELS: usize = 32;
pub const CS_SOUNDS: usize = CS_MODELS + MAX_MODELS;
pub const CS_IMAGES: usize = CS_SOUNDS + MAX_SOUNDS;
pub const CS_LIGHTS: usize = CS_IMAGES + MAX_IMAGES;
pub const CS_ITEMS: usize = CS_LIGHTS + MAX_LIGHTSTYLES;
pub const CS_PLAYERSKINS: usize = CS_ITEMS + MAX_ITEMS;

// ============================================================
// Entity events
// ============================================================

/// One-shot event attached to an entity for a single replicated frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum EntityEvent {
    None = 0,
    ItemRespawn = 1,
    Footstep = 2,
    FallShort = 3,
    Fall = 4,
    FallFar = 5,
    PlayerTeleport = 6,
    OtherTeleport = 7,
}

pub const EV_FOOTSTEP: i32 = EntityEvent::Footstep as i32;
pub const EV_PLAYER_TELEPORT: i32 = EntityEvent::PlayerTeleport as i32;
pub const EV_OTHER_TELEPORT: i32 = EntityEvent::OtherTeleport as i32;

// ============================================================
// Entity state
// ============================================================

/// The replicated part of an entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityState {
    pub number: i32,
    pub origin: Vec3,
    pub angles: Vec3,
    pub old_origin: Vec3,
    pub modelindex: i32,
    pub modelindex2: i32,
    pub frame: i32,
    pub skinnum: i32,
    pub effects: u32,
    pub renderfx: i32,
    pub solid: i32,
    pub sound: i32,
    pub event: i32,
}

// ============================================================
// Player state
// ============================================================

/// Per-player view data sent to the owning client every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub pmove: PmoveState,
    pub viewangles: Vec3,
    pub viewoffset: Vec3,
    pub kick_angles: Vec3,
    pub blend: [f32; 4],
    pub fov: f32,
    pub rdflags: i32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            pmove: PmoveState::default(),
            viewangles: [0.0; 3],
            viewoffset: [0.0; 3],
            kick_angles: [0.0; 3],
            blend: [0.0; 4],
            fov: 90.0,
            rdflags: 0,
        }
    }
}

// ============================================================
// Cvar flags
// ============================================================

pub const CVAR_ZERO: i32 = 0;
pub const CVAR_USERINFO: i32 = 2;
pub const CVAR_SERVERINFO: i32 = 4;
pub const CVAR_NOSET: i32 = 8;
pub const CVAR_LATCH: i32 = 16;

// ============================================================
// Vector operations
// ============================================================

#[inline]
pub fn dot_product(a: &Vec3, b: &Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn vector_subtract(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn vector_add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn vector_scale(v: &Vec3, scale: f32) -> Vec3 {
    [v[0] * scale, v[1] * scale, v[2] * scale]
}

#[inline]
pub fn vector_ma(veca: &Vec3, scale: f32, vecb: &Vec3) -> Vec3 {
    [
        veca[0] + scale * vecb[0],
        veca[1] + scale * vecb[1],
        veca[2] + scale * vecb[2],
    ]
}

#[inline]
pub fn vector_length(v: &Vec3) -> f32 {
    dot_product(v, v).sqrt()
}

pub fn vector_normalize(v: &mut Vec3) -> f32 {
    let length = vector_length(v);
    if length != 0.0 {
        let ilength = 1.0 / length;
        v[0] *= ilength;
        v[1] *= ilength;
        v[2] *= ilength;
    }
    length
}

/// Forward, right and up basis vectors for a set of Euler angles in degrees.
pub fn angle_vectors(angles: &Vec3) -> (Vec3, Vec3, Vec3) {
    let (sy, cy) = angles[YAW].to_radians().sin_cos();
    let (sp, cp) = angles[PITCH].to_radians().sin_cos();
    let (sr, cr) = angles[ROLL].to_radians().sin_cos();

    let forward = [cp * cy, cp * sy, -sp];
    let right = [
        -sr * sp * cy + -cr * -sy,
        -sr * sp * sy + -cr * cy,
        -sr * cp,
    ];
    let up = [
        cr * sp * cy + -sr * -sy,
        cr * sp * sy + -sr * cy,
        cr * cp,
    ];
    (forward, right, up)
}

pub fn vtos(v: &Vec3) -> String {
    format!("({} {} {})", v[0] as i32, v[1] as i32, v[2] as i32)
}

// ============================================================
// Info strings
// ============================================================

/// Iterates the `\key\value` pairs of an info string.
fn info_pairs(s: &str) -> impl Iterator<Item = (&str, &str)> {
    let body = s.strip_prefix('\\').unwrap_or(s);
    let mut parts = body.split('\\');
    std::iter::from_fn(move || {
        let key = parts.next()?;
        let value = parts.next()?;
        Some((key, value))
    })
}

/// Search info string `s` for `key`, return value or empty string.
pub fn info_value_for_key(s: &str, key: &str) -> String {
    info_pairs(s)
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.to_string())
        .unwrap_or_default()
}

/// Remove a key (and its value) from an info string.
pub fn info_remove_key(s: &mut String, key: &str) {
    if key.contains('\\') {
        return;
    }

    let mut result = String::with_capacity(s.len());
    for (k, v) in info_pairs(s) {
        if k != key {
            result.push('\\');
            result.push_str(k);
            result.push('\\');
            result.push_str(v);
        }
    }
    *s = result;
}

/// Check that an info string contains no illegal characters.
pub fn info_validate(s: &str) -> bool {
    !s.contains('"') && !s.contains(';')
}

/// Set a key/value pair in an info string, replacing any earlier value.
pub fn info_set_value_for_key(s: &mut String, key: &str, value: &str) {
    if key.contains('\\') || value.contains('\\') {
        return;
    }
    if key.contains(';') || key.contains('"') || value.contains('"') {
        return;
    }
    if key.len() >= MAX_INFO_KEY || value.len() >= MAX_INFO_KEY {
        return;
    }

    info_remove_key(s, key);

    if value.is_empty() {
        return;
    }

    let newi = format!("\\{}\\{}", key, value);
    if newi.len() + s.len() > MAX_INFO_STRING {
        return;
    }

    // only printable ASCII survives
    s.extend(newi.bytes().map(|c| c & 127).filter(|c| (32..127).contains(c)).map(char::from));
}

// ============================================================
// Tests
// ============================================================
