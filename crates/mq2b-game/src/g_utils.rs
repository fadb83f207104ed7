// g_utils.rs — entity store utilities

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

use crate::dispatch::{call_touch, call_use, THINK_DELAY};
use crate::error::{GameError, GameResult};
use crate::g_combat::t_damage;
use crate::g_local::{Damage, Edict, GameContext, MOD_TELEFRAG, SVF_MONSTER};
use crate::game::Solid;
use mq2b_common::q_shared::{angle_vectors, AREA_TRIGGERS, MASK_PLAYERSOLID, MAX_EDICTS, VEC3_ORIGIN};
use mq2b_common::q_shared::Vec3;

fn field_value<'a>(e: &'a Edict, field: &str) -> Option<&'a str> {
    match field {
        "classname" => Some(&e.classname),
        "targetname" => Some(&e.targetname),
        _ => None,
    }
}

/// Search for the next in-use entity at or after `from` whose `field`
/// ("classname" or "targetname") matches `match_val`, ignoring case.
pub fn g_find(ctx: &GameContext, from: usize, field: &str, match_val: &str) -> Option<usize> {
    (from..ctx.num_edicts).find(|&i| {
        let ent = &ctx.edicts[i];
        ent.inuse
            && field_value(ent, field).is_some_and(|v| v.eq_ignore_ascii_case(match_val))
    })
}

/// Mark a slot as a fresh, live entity.
pub fn g_init_edict(e: &mut Edict, index: usize) {
    e.inuse = true;
    e.classname = "noclass".to_string();
    e.gravity = 1.0;
    e.s.number = index as i32;
}

/// Wipe a slot back to its empty state, keeping its identity fields.
pub(crate) fn reset_edict(ctx: &mut GameContext, index: usize) {
    let generation = ctx.edicts[index].generation;
    let client = ctx.edicts[index].client;
    ctx.edicts[index] = Edict {
        generation,
        client,
        ..Edict::default()
    };
    ctx.edicts[index].s.number = index as i32;
}

/// Either finds a free edict, or allocates a new one.
///
/// Recently freed slots are skipped for half a second so clients don't see
/// one entity morph into another.
pub fn g_spawn(ctx: &mut GameContext) -> GameResult<usize> {
    let time = ctx.level.time;
    let first = ctx.game.maxclients + 1;

    let reuse = (first..ctx.num_edicts).find(|&i| {
        let e = &ctx.edicts[i];
        !e.inuse && (e.freetime < 2.0 || time - e.freetime > 0.5)
    });

    let index = match reuse {
        Some(i) => {
            tracing::trace!(index = i, "reusing free edict");
            i
        }
        None => {
            if ctx.num_edicts >= ctx.game.maxentities {
                return Err(GameError::NoFreeEdicts {
                    max: ctx.game.maxentities,
                });
            }
            ctx.num_edicts += 1;
            ctx.num_edicts - 1
        }
    };

    reset_edict(ctx, index);
    g_init_edict(&mut ctx.edicts[index], index);
    Ok(index)
}

/// Marks the edict as free and clears it. The world and player slots are
/// never freed.
pub fn g_free_edict(ctx: &mut GameContext, ent_idx: usize) {
    if ent_idx == 0 || ctx.is_client_slot(ent_idx) || ent_idx >= ctx.edicts.len() {
        tracing::warn!(entity = ent_idx, "refusing to free a reserved edict");
        return;
    }

    ctx.gi.unlinkentity(&mut ctx.edicts[ent_idx]);

    reset_edict(ctx, ent_idx);
    let ent = &mut ctx.edicts[ent_idx];
    ent.generation = ent.generation.wrapping_add(1);
    ent.classname = "freed".to_string();
    ent.freetime = ctx.level.time;
    ent.inuse = false;
}

// editor angle shorthands for straight up and straight down
const VEC_UP: Vec3 = [0.0, -1.0, 0.0];
const MOVEDIR_UP: Vec3 = [0.0, 0.0, 1.0];
const VEC_DOWN: Vec3 = [0.0, -2.0, 0.0];
const MOVEDIR_DOWN: Vec3 = [0.0, 0.0, -1.0];

/// Movement direction for a set of editor angles.
pub fn g_set_movedir(angles: &Vec3) -> Vec3 {
    if *angles == VEC_UP {
        MOVEDIR_UP
    } else if *angles == VEC_DOWN {
        MOVEDIR_DOWN
    } else {
        angle_vectors(angles).0
    }
}

/// Fire everything named by the entity's `target`, after freeing whatever
/// its `killtarget` names.
///
/// With a `delay` set, a `DelayedUse` entity is spawned instead and does the
/// firing when it thinks. Every entity whose targetname matches has its use
/// callback called with `ent_idx` as the other and `activator_idx` as the
/// activator.
pub fn g_use_targets(ctx: &mut GameContext, ent_idx: usize, activator_idx: usize) -> GameResult<()> {
    let ent = &ctx.edicts[ent_idx];
    let delay = ent.delay;
    let target = ent.target.clone();
    let killtarget = ent.killtarget.clone();

    if delay > 0.0 {
        let t_idx = g_spawn(ctx)?;
        let activator = ctx.entity_ref(activator_idx);
        let time = ctx.level.time;
        let t = &mut ctx.edicts[t_idx];
        t.classname = "DelayedUse".to_string();
        t.nextthink = time + delay;
        t.think_fn = Some(THINK_DELAY);
        t.activator = Some(activator);
        t.target = target;
        t.killtarget = killtarget;
        return Ok(());
    }

    if !killtarget.is_empty() {
        let mut from = 0;
        while let Some(t_idx) = g_find(ctx, from, "targetname", &killtarget) {
            g_free_edict(ctx, t_idx);
            if !ctx.edicts[ent_idx].inuse {
                tracing::debug!(entity = ent_idx, "entity was removed while using killtargets");
                return Ok(());
            }
            from = t_idx + 1;
        }
    }

    if !target.is_empty() {
        let mut from = 0;
        while let Some(t_idx) = g_find(ctx, from, "targetname", &target) {
            if t_idx == ent_idx {
                tracing::warn!(entity = ent_idx, "entity used itself");
            } else {
                call_use(ctx, t_idx, ent_idx, activator_idx);
            }
            if !ctx.edicts[ent_idx].inuse {
                tracing::debug!(entity = ent_idx, "entity was removed while using targets");
                return Ok(());
            }
            from = t_idx + 1;
        }
    }

    Ok(())
}

/// Think for a `DelayedUse` entity: fire its targets, then go away.
pub(crate) fn think_delay(ctx: &mut GameContext, ent_idx: usize) {
    // a vanished activator falls back to the world
    let activator = ctx.resolve(ctx.edicts[ent_idx].activator).unwrap_or(0);
    if let Err(err) = g_use_targets(ctx, ent_idx, activator) {
        tracing::error!(entity = ent_idx, %err, "delayed use failed");
    }
    g_free_edict(ctx, ent_idx);
}

/// Touch every trigger volume the entity currently overlaps.
pub fn g_touch_triggers(ctx: &mut GameContext, ent_idx: usize) {
    let ent = &ctx.edicts[ent_idx];

    // dead things don't activate triggers
    let living_kind = ent.client.is_some() || (ent.svflags & SVF_MONSTER) != 0;
    if living_kind && ent.takedamage != Damage::No && ent.health <= 0 {
        return;
    }

    let touch = ctx.gi.box_edicts(&ent.absmin, &ent.absmax, MAX_EDICTS, AREA_TRIGGERS);

    for hit_idx in touch {
        let Some(hit) = ctx.edicts.get(hit_idx) else {
            continue;
        };
        if !hit.inuse || hit.touch_fn.is_none() {
            continue;
        }
        call_touch(ctx, hit_idx, ent_idx, None, None);
        if !ctx.edicts[ent_idx].inuse {
            break;
        }
    }
}

/// Kills all entities that would touch the proposed new positioning of ent.
/// Returns false if something is still in the way afterwards.
pub fn killbox(ctx: &mut GameContext, ent_idx: usize) -> bool {
    let origin = ctx.edicts[ent_idx].s.origin;
    let mins = ctx.edicts[ent_idx].mins;
    let maxs = ctx.edicts[ent_idx].maxs;

    let mut last_hit = None;
    loop {
        let tr = ctx.gi.trace(&origin, &mins, &maxs, &origin, ent_idx as i32, MASK_PLAYERSOLID);
        if tr.ent_index <= 0 {
            // nothing, or the world itself
            break;
        }
        let hit = tr.ent_index as usize;
        if last_hit == Some(hit) {
            tracing::warn!(entity = ent_idx, blocker = hit, "spatial index still reports a cleared occupant");
            return false;
        }
        last_hit = Some(hit);

        // nail it
        t_damage(ctx, hit, ent_idx, ent_idx, &VEC3_ORIGIN, &origin, 100_000, MOD_TELEFRAG);

        // if we didn't kill it, fail
        if ctx.edicts[hit].solid != Solid::Not {
            tracing::warn!(entity = ent_idx, blocker = hit, "spawn volume still occupied");
            return false;
        }

        // a die callback may drop solidity without relinking
        ctx.gi.unlinkentity(&mut ctx.edicts[hit]);
    }

    true
}
