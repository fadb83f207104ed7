// g_phys.rs — entity physics

/*
Copyright (C) 1997-2001 Id Software, Inc.

This program is free software; you can redistribute it and/or
modify it under the terms of the GNU General Public License
as published by the Free Software Foundation; either version 2
of the License, or (at your option) any later version.

This program is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.

See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with this program; if not, write to the Free Software
Foundation, Inc., 59 Temple Place - Suite 330, Boston, MA  02111-1307, USA.
*/

/*
Players are moved by the movement integrator in p_client; everything else
goes through g_run_entity once per tick.

onground is set for toss objects when they come to rest on a surface that
faces mostly up. noclip objects ignore the world entirely.
*/

use crate::dispatch::{call_prethink, call_think, call_touch};
use crate::g_local::{GameContext, MoveType, Trace, FRAMETIME, MASK_SOLID, MASK_WATER, VEC3_ORIGIN};
use crate::game::Solid;
use mq2b_common::q_shared::{vector_add, vector_ma, vector_scale};

/// Bounds velocity to sv_maxvelocity.
pub fn sv_check_velocity(ctx: &mut GameContext, ent_idx: usize) {
    let max = ctx.cvars.sv_maxvelocity;
    let ent = &mut ctx.edicts[ent_idx];
    for v in ent.velocity.iter_mut() {
        *v = v.clamp(-max, max);
    }
}

/// Runs thinking code for this frame if necessary. Returns false if the
/// think removed the entity.
pub fn sv_run_think(ctx: &mut GameContext, ent_idx: usize) -> bool {
    let thinktime = ctx.edicts[ent_idx].nextthink;
    if thinktime <= 0.0 || thinktime > ctx.level.time + 0.001 {
        return true;
    }

    // cleared first so a think that doesn't re-arm runs exactly once
    ctx.edicts[ent_idx].nextthink = 0.0;
    call_think(ctx, ent_idx);

    ctx.edicts[ent_idx].inuse
}

/// Two entities have touched, so run their touch functions.
pub fn sv_impact(ctx: &mut GameContext, e1: usize, trace: &Trace) {
    if trace.ent_index < 0 {
        return;
    }
    let e2 = trace.ent_index as usize;

    if ctx.edicts[e1].touch_fn.is_some() && ctx.edicts[e1].solid != Solid::Not {
        call_touch(ctx, e1, e2, Some(&trace.plane), trace.surface.as_ref());
    }

    if ctx.edicts[e2].touch_fn.is_some() && ctx.edicts[e2].solid != Solid::Not {
        call_touch(ctx, e2, e1, None, None);
    }
}

pub fn sv_add_gravity(ctx: &mut GameContext, ent_idx: usize) {
    let sv_gravity = ctx.cvars.sv_gravity;
    let ent = &mut ctx.edicts[ent_idx];
    ent.velocity[2] -= ent.gravity * sv_gravity * FRAMETIME;
}

/// Moves the entity along `push` until blocked. Does not change velocity.
pub fn sv_push_entity(ctx: &mut GameContext, ent_idx: usize, push: &[f32; 3]) -> Trace {
    let ent = &ctx.edicts[ent_idx];
    let start = ent.s.origin;
    let end = vector_add(&start, push);
    let mask = if ent.clipmask != 0 { ent.clipmask } else { MASK_SOLID };

    let trace = ctx.gi.trace(&start, &ent.mins, &ent.maxs, &end, ent_idx as i32, mask);

    ctx.edicts[ent_idx].s.origin = trace.endpos;
    ctx.gi.linkentity(&mut ctx.edicts[ent_idx]);

    if trace.fraction != 1.0 {
        sv_impact(ctx, ent_idx, &trace);
    }

    trace
}

pub fn sv_physics_none(ctx: &mut GameContext, ent_idx: usize) {
    sv_run_think(ctx, ent_idx);
}

/// A moving object that doesn't obey physics.
pub fn sv_physics_noclip(ctx: &mut GameContext, ent_idx: usize) {
    if !sv_run_think(ctx, ent_idx) {
        return;
    }

    let ent = &mut ctx.edicts[ent_idx];
    ent.s.angles = vector_ma(&ent.s.angles, FRAMETIME, &ent.avelocity);
    ent.s.origin = vector_ma(&ent.s.origin, FRAMETIME, &ent.velocity);

    ctx.gi.linkentity(&mut ctx.edicts[ent_idx]);
}

/// Gravity-driven movement for tossed and stepping objects. When on the
/// ground, do nothing.
pub fn sv_physics_toss(ctx: &mut GameContext, ent_idx: usize) {
    if !sv_run_think(ctx, ent_idx) {
        return;
    }

    if ctx.edicts[ent_idx].velocity[2] > 0.0 {
        ctx.edicts[ent_idx].groundentity = None;
    }

    // check for the groundentity going away
    let ground = ctx.edicts[ent_idx].groundentity;
    if ground.is_some() && ctx.resolve(ground).is_none() {
        ctx.edicts[ent_idx].groundentity = None;
    }

    if ctx.edicts[ent_idx].groundentity.is_some() {
        return;
    }

    sv_check_velocity(ctx, ent_idx);
    sv_add_gravity(ctx, ent_idx);

    let ent = &mut ctx.edicts[ent_idx];
    ent.s.angles = vector_ma(&ent.s.angles, FRAMETIME, &ent.avelocity);

    let move_vec = vector_scale(&ctx.edicts[ent_idx].velocity, FRAMETIME);
    let trace = sv_push_entity(ctx, ent_idx, &move_vec);
    if !ctx.edicts[ent_idx].inuse {
        return;
    }

    // stop if on ground
    if trace.fraction < 1.0 && trace.ent_index >= 0 && trace.plane.normal[2] > 0.7 {
        let hit = trace.ent_index as usize;
        let hit_linkcount = ctx.edicts[hit].linkcount;
        let ground = ctx.entity_ref(hit);
        let ent = &mut ctx.edicts[ent_idx];
        ent.groundentity = Some(ground);
        ent.groundentity_linkcount = hit_linkcount;
        ent.velocity = VEC3_ORIGIN;
        ent.avelocity = VEC3_ORIGIN;
        tracing::trace!(entity = ent_idx, ground = hit, "came to rest");
    }

    // check for water transition
    let watertype = ctx.gi.pointcontents(&ctx.edicts[ent_idx].s.origin);
    let ent = &mut ctx.edicts[ent_idx];
    ent.watertype = watertype;
    ent.waterlevel = i32::from(watertype & MASK_WATER != 0);
}

/// Run one tick of an entity that is not a connected player.
pub fn g_run_entity(ctx: &mut GameContext, ent_idx: usize) {
    call_prethink(ctx, ent_idx);
    if !ctx.edicts[ent_idx].inuse {
        return;
    }

    match ctx.edicts[ent_idx].movetype {
        MoveType::None | MoveType::Walk => sv_physics_none(ctx, ent_idx),
        MoveType::Noclip => sv_physics_noclip(ctx, ent_idx),
        MoveType::Toss | MoveType::Step => sv_physics_toss(ctx, ent_idx),
    }
}
