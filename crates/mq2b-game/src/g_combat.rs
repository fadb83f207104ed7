// g_combat.rs — damage entry points
//
// The combat model is not simulated: damage only routes to the target's
// pain or die callback so telefrags and scripted kills still work.

use crate::dispatch::{call_die, call_pain};
use crate::g_local::{Damage, GameContext, Vec3};

/// Route a kill to the target's die callback.
pub fn killed(
    ctx: &mut GameContext,
    targ: usize,
    inflictor: usize,
    attacker: usize,
    damage: i32,
    point: &Vec3,
) {
    if ctx.edicts[targ].health < -999 {
        ctx.edicts[targ].health = -999;
    }
    tracing::debug!(target = targ, attacker, damage, "killed");
    call_die(ctx, targ, inflictor, attacker, damage, *point);
}

/// Apply damage to `targ`. Targets already at or below zero health die,
/// everything else feels pain.
pub fn t_damage(
    ctx: &mut GameContext,
    targ: usize,
    inflictor: usize,
    attacker: usize,
    _dir: &Vec3,
    point: &Vec3,
    damage: i32,
    mod_: i32,
) {
    let ent = &ctx.edicts[targ];
    if ent.takedamage == Damage::No {
        return;
    }
    tracing::trace!(target = targ, damage, means_of_death = mod_, "damage");

    if ent.health <= 0 {
        if ent.die_fn.is_some() {
            killed(ctx, targ, inflictor, attacker, damage, point);
        }
        return;
    }

    // no knockback model: the kick handed to pain is always zero
    call_pain(ctx, targ, attacker, 0.0, damage);
}
