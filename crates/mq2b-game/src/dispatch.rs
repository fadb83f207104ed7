// dispatch.rs — callback dispatch for entity behaviours
//
// Entity callbacks are stored as `Option<usize>` indices into dispatch tables
// owned by the world. This avoids the simultaneous mutable borrow problem that
// storing closures or references in Edict fields would cause, and keeps the
// callback fields plain data for anything that needs to enumerate them.
//
// `None` on an edict means "no callback" and is the common case.

use crate::g_local::{CPlane, CSurface, GameContext, Vec3};
use crate::g_target;

// ============================================================
// Type aliases for callback signatures
// ============================================================

pub type ThinkFn = fn(ctx: &mut GameContext, self_idx: usize);
pub type TouchFn = fn(
    ctx: &mut GameContext,
    self_idx: usize,
    other_idx: usize,
    plane: Option<&CPlane>,
    surf: Option<&CSurface>,
);
pub type UseFn = fn(ctx: &mut GameContext, self_idx: usize, other_idx: usize, activator_idx: usize);
pub type PainFn = fn(ctx: &mut GameContext, self_idx: usize, attacker_idx: usize, kick: f32, damage: i32);
pub type DieFn = fn(
    ctx: &mut GameContext,
    self_idx: usize,
    inflictor_idx: usize,
    attacker_idx: usize,
    damage: i32,
    point: Vec3,
);

// ============================================================
// Built-in callback indices
// ============================================================

pub const THINK_FREE_EDICT: usize = 0;
pub const THINK_PLAYER_START: usize = 1;
pub const THINK_DELAY: usize = 2;
pub const THINK_TARGET_EXPLOSION: usize = 3;

pub const TOUCH_TRIGGER_GRAVITY: usize = 0;

pub const USE_TARGET_TENT: usize = 0;
pub const USE_TARGET_EXPLOSION: usize = 1;
pub const USE_TARGET_SPLASH: usize = 2;

// ============================================================
// Dispatch tables
// ============================================================

/// Per-world callback tables. Built-ins sit at the fixed indices above;
/// the spawner appends its own behaviours with the `register_*` methods.
#[derive(Clone)]
pub struct Dispatch {
    think: Vec<ThinkFn>,
    touch: Vec<TouchFn>,
    use_: Vec<UseFn>,
    pain: Vec<PainFn>,
    die: Vec<DieFn>,
}

impl Default for Dispatch {
    fn default() -> Self {
        let mut think: Vec<ThinkFn> = Vec::new();
        think.insert(THINK_FREE_EDICT, w_free_edict);
        think.insert(THINK_PLAYER_START, w_player_start_think);
        think.insert(THINK_DELAY, crate::g_utils::think_delay);
        think.insert(THINK_TARGET_EXPLOSION, g_target::target_explosion_explode);

        let mut touch: Vec<TouchFn> = Vec::new();
        touch.insert(TOUCH_TRIGGER_GRAVITY, w_trigger_gravity_touch);

        let mut use_: Vec<UseFn> = Vec::new();
        use_.insert(USE_TARGET_TENT, g_target::use_target_tent);
        use_.insert(USE_TARGET_EXPLOSION, g_target::use_target_explosion);
        use_.insert(USE_TARGET_SPLASH, g_target::use_target_splash);

        Self {
            think,
            touch,
            use_,
            pain: Vec::new(),
            die: Vec::new(),
        }
    }
}

impl std::fmt::Debug for Dispatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatch")
            .field("think", &self.think.len())
            .field("touch", &self.touch.len())
            .field("use", &self.use_.len())
            .field("pain", &self.pain.len())
            .field("die", &self.die.len())
            .finish()
    }
}

impl Dispatch {
    pub fn register_think(&mut self, f: ThinkFn) -> usize {
        self.think.push(f);
        self.think.len() - 1
    }

    pub fn register_touch(&mut self, f: TouchFn) -> usize {
        self.touch.push(f);
        self.touch.len() - 1
    }

    pub fn register_use(&mut self, f: UseFn) -> usize {
        self.use_.push(f);
        self.use_.len() - 1
    }

    pub fn register_pain(&mut self, f: PainFn) -> usize {
        self.pain.push(f);
        self.pain.len() - 1
    }

    pub fn register_die(&mut self, f: DieFn) -> usize {
        self.die.push(f);
        self.die.len() - 1
    }
}

fn lookup<F: Copy>(table: &[F], idx: usize, kind: &str, self_idx: usize) -> Option<F> {
    let f = table.get(idx).copied();
    if f.is_none() {
        tracing::warn!(entity = self_idx, callback = idx, "unknown {} callback", kind);
    }
    f
}

// ============================================================
// Convenience helpers for calling from edict fields
// ============================================================

/// Call the think_fn on an edict if set.
pub fn call_think(ctx: &mut GameContext, self_idx: usize) {
    let Some(idx) = ctx.edicts[self_idx].think_fn else {
        return;
    };
    if let Some(f) = lookup(&ctx.dispatch.think, idx, "think", self_idx) {
        f(ctx, self_idx);
    }
}

/// Call the prethink_fn on an edict if set. Prethinks share the think table.
pub fn call_prethink(ctx: &mut GameContext, self_idx: usize) {
    let Some(idx) = ctx.edicts[self_idx].prethink_fn else {
        return;
    };
    if let Some(f) = lookup(&ctx.dispatch.think, idx, "prethink", self_idx) {
        f(ctx, self_idx);
    }
}

/// Call the touch_fn on an edict if set.
pub fn call_touch(
    ctx: &mut GameContext,
    self_idx: usize,
    other_idx: usize,
    plane: Option<&CPlane>,
    surf: Option<&CSurface>,
) {
    let Some(idx) = ctx.edicts[self_idx].touch_fn else {
        return;
    };
    if let Some(f) = lookup(&ctx.dispatch.touch, idx, "touch", self_idx) {
        f(ctx, self_idx, other_idx, plane, surf);
    }
}

/// Call the use_fn on an edict if set.
pub fn call_use(ctx: &mut GameContext, self_idx: usize, other_idx: usize, activator_idx: usize) {
    let Some(idx) = ctx.edicts[self_idx].use_fn else {
        return;
    };
    if let Some(f) = lookup(&ctx.dispatch.use_, idx, "use", self_idx) {
        f(ctx, self_idx, other_idx, activator_idx);
    }
}

/// Call the pain_fn on an edict if set.
pub fn call_pain(ctx: &mut GameContext, self_idx: usize, attacker_idx: usize, kick: f32, damage: i32) {
    let Some(idx) = ctx.edicts[self_idx].pain_fn else {
        return;
    };
    if let Some(f) = lookup(&ctx.dispatch.pain, idx, "pain", self_idx) {
        f(ctx, self_idx, attacker_idx, kick, damage);
    }
}

/// Call the die_fn on an edict if set.
pub fn call_die(
    ctx: &mut GameContext,
    self_idx: usize,
    inflictor_idx: usize,
    attacker_idx: usize,
    damage: i32,
    point: Vec3,
) {
    let Some(idx) = ctx.edicts[self_idx].die_fn else {
        return;
    };
    if let Some(f) = lookup(&ctx.dispatch.die, idx, "die", self_idx) {
        f(ctx, self_idx, inflictor_idx, attacker_idx, damage, point);
    }
}

// ============================================================
// Built-in callbacks
// ============================================================

fn w_free_edict(ctx: &mut GameContext, self_idx: usize) {
    crate::g_utils::g_free_edict(ctx, self_idx);
}

fn w_player_start_think(ctx: &mut GameContext, self_idx: usize) {
    // spawn markers only need to exist; nothing to do once placed
    ctx.edicts[self_idx].think_fn = None;
}

fn w_trigger_gravity_touch(
    ctx: &mut GameContext,
    self_idx: usize,
    other_idx: usize,
    _plane: Option<&CPlane>,
    _surf: Option<&CSurface>,
) {
    let gravity = ctx.edicts[self_idx].gravity;
    let local = ctx.edicts[self_idx].client_local_gravity;
    let other = &mut ctx.edicts[other_idx];
    other.gravity = gravity;
    if local != 0 {
        other.client_local_gravity = local;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::make_ctx;

    fn bump_count(ctx: &mut GameContext, self_idx: usize) {
        ctx.edicts[self_idx].count += 1;
    }

    #[test]
    fn test_register_appends_after_builtins() {
        let mut dispatch = Dispatch::default();
        let idx = dispatch.register_think(bump_count);
        assert_eq!(idx, THINK_TARGET_EXPLOSION + 1);
    }

    #[test]
    fn test_call_think_runs_registered_callback() {
        let mut ctx = make_ctx(1);
        let idx = ctx.dispatch.register_think(bump_count);
        ctx.edicts[3].think_fn = Some(idx);
        call_think(&mut ctx, 3);
        call_think(&mut ctx, 3);
        assert_eq!(ctx.edicts[3].count, 2);
    }

    #[test]
    fn test_missing_or_unknown_callback_is_skipped() {
        let mut ctx = make_ctx(1);
        call_think(&mut ctx, 3);
        ctx.edicts[3].think_fn = Some(999);
        call_think(&mut ctx, 3);
        call_touch(&mut ctx, 3, 1, None, None);
        assert_eq!(ctx.edicts[3].count, 0);
    }

    #[test]
    fn test_trigger_gravity_copies_onto_toucher() {
        let mut ctx = make_ctx(1);
        ctx.edicts[4].gravity = 0.25;
        ctx.edicts[4].client_local_gravity = 200;
        ctx.edicts[4].touch_fn = Some(TOUCH_TRIGGER_GRAVITY);
        ctx.edicts[1].gravity = 1.0;

        call_touch(&mut ctx, 4, 1, None, None);
        assert_eq!(ctx.edicts[1].gravity, 0.25);
        assert_eq!(ctx.edicts[1].client_local_gravity, 200);
    }

    #[test]
    fn test_player_start_think_clears_itself() {
        let mut ctx = make_ctx(1);
        ctx.edicts[5].think_fn = Some(THINK_PLAYER_START);
        call_think(&mut ctx, 5);
        assert_eq!(ctx.edicts[5].think_fn, None);
    }
}
