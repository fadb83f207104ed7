// g_main.rs — game entry points and the per-tick frame loop

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

use crate::g_local::*;
use crate::g_phys::g_run_entity;
use crate::g_utils::reset_edict;
use crate::game_import::GameImport;
use crate::p_client::client_begin_server_frame;
use crate::p_view::client_end_server_frame;

// ============================================================
// InitGame / SpawnLevel / ShutdownGame
// ============================================================

fn read_cvars(gi: &dyn GameImport) -> GameCvars {
    GameCvars {
        gun_x: gi.cvar("gun_x", "0", CVAR_ZERO),
        gun_y: gi.cvar("gun_y", "0", CVAR_ZERO),
        gun_z: gi.cvar("gun_z", "0", CVAR_ZERO),

        sv_rollspeed: gi.cvar("sv_rollspeed", "200", CVAR_ZERO),
        sv_rollangle: gi.cvar("sv_rollangle", "2", CVAR_ZERO),
        sv_maxvelocity: gi.cvar("sv_maxvelocity", "2000", CVAR_ZERO),
        sv_gravity: gi.cvar("sv_gravity", "800", CVAR_ZERO),

        run_pitch: gi.cvar("run_pitch", "0.002", CVAR_ZERO),
        run_roll: gi.cvar("run_roll", "0.005", CVAR_ZERO),
        bob_up: gi.cvar("bob_up", "0.005", CVAR_ZERO),
        bob_pitch: gi.cvar("bob_pitch", "0.002", CVAR_ZERO),
        bob_roll: gi.cvar("bob_roll", "0.002", CVAR_ZERO),

        // latched vars
        maxclients: gi.cvar("maxclients", "4", CVAR_SERVERINFO | CVAR_LATCH),
        maxentities: gi.cvar("maxentities", "1024", CVAR_LATCH),
        deathmatch: gi.cvar("deathmatch", "0", CVAR_LATCH),

        // change anytime vars
        dmflags: gi.cvar("dmflags", "0", CVAR_SERVERINFO),
        password: gi.cvar_string("password", "", CVAR_USERINFO),
    }
}

/// This will be called when the game module is first loaded, and on a
/// restart of the host. Builds the world sized from the latched cvars.
pub fn init_game(gi: Box<dyn GameImport + Send + Sync>) -> GameContext {
    gi.dprintf("==== InitGame ====\n");

    let cvars = read_cvars(&*gi);
    let mut ctx = GameCtx::new(gi, cvars);
    ctx.snd_fry = ctx.gi.soundindex("player/fry.wav");

    tracing::info!(
        maxclients = ctx.game.maxclients,
        maxentities = ctx.game.maxentities,
        deathmatch = ctx.deathmatch(),
        "game initialized"
    );
    ctx
}

/// Clears the level for a new map. Client records keep their persistant
/// data; every entity slot but the world is emptied, so players are placed
/// again when they begin.
pub fn spawn_level(ctx: &mut GameContext, mapname: &str, spawnpoint: &str) {
    for i in 1..ctx.num_edicts {
        if ctx.edicts[i].inuse {
            ctx.gi.unlinkentity(&mut ctx.edicts[i]);
        }
        reset_edict(ctx, i);
        let ent = &mut ctx.edicts[i];
        ent.generation = ent.generation.wrapping_add(1);
    }
    ctx.num_edicts = ctx.game.maxclients + 1;

    ctx.level = LevelLocals {
        mapname: mapname.to_string(),
        ..LevelLocals::default()
    };
    ctx.game.spawnpoint = spawnpoint.to_string();

    tracing::info!(map = mapname, spawnpoint, "level spawned");
}

pub fn shutdown_game(ctx: &mut GameContext) {
    ctx.gi.dprintf("==== ShutdownGame ====\n");
    tracing::info!("game shut down");
}

// ============================================================
// G_RunFrame
// ============================================================

/// Builds the player state for every connected client, after all the
/// movement has been done for the tick.
pub fn client_end_server_frames(ctx: &mut GameContext) {
    for i in 1..=ctx.game.maxclients {
        if !ctx.edicts[i].inuse || !ctx.clients[i - 1].pers.connected {
            continue;
        }
        if let Err(err) = client_end_server_frame(ctx, i) {
            tracing::warn!(entity = i, %err, "view state pass failed");
        }
    }
}

/// Advances the world by one tick.
pub fn g_run_frame(ctx: &mut GameContext) {
    ctx.level.framenum += 1;
    ctx.level.time = ctx.level.framenum as f32 * FRAMETIME;

    ctx.level.gibs_this_frame = 0;
    ctx.level.debris_this_frame = 0;

    //
    // treat each object in turn
    // even the world gets a chance to think
    //
    let mut i = 0;
    while i < ctx.num_edicts {
        if !ctx.edicts[i].inuse {
            i += 1;
            continue;
        }

        ctx.level.current_entity = i;

        let ent = &mut ctx.edicts[i];
        ent.s.old_origin = ent.s.origin;
        // events last a single replicated frame
        ent.s.event = 0;

        // if the ground entity moved, make sure we are still on it
        if let Some(ground) = ctx.edicts[i].groundentity {
            let moved = match ctx.resolve(Some(ground)) {
                Some(g) => ctx.edicts[g].linkcount != ctx.edicts[i].groundentity_linkcount,
                None => true,
            };
            if moved {
                tracing::trace!(entity = i, ground = ground.index, "ground reference dropped");
                ctx.edicts[i].groundentity = None;
            }
        }

        if ctx.is_client_slot(i) {
            if let Err(err) = client_begin_server_frame(ctx, i) {
                tracing::warn!(entity = i, %err, "client frame start failed");
            }
        } else {
            g_run_entity(ctx, i);
        }
        i += 1;
    }

    // build the playerstate structures for all players
    client_end_server_frames(ctx);
}
