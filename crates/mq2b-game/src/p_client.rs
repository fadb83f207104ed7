// p_client.rs — player client lifecycle and movement

use crate::dispatch::call_touch;
use crate::error::GameResult;
use crate::g_local::*;
use crate::g_utils::{g_find, g_init_edict, g_spawn, g_touch_triggers, killbox};
use crate::game_import::GameImport;
use crate::p_view::client_end_server_frame;
use mq2b_common::pmove::{fixed_to_world, origin_to_fixed, velocity_to_fixed, PmoveCallbacks};

/// C-style integer prefix parse: leading digits only, anything else is 0.
fn atoi(s: &str) -> i32 {
    let s = s.trim_start();
    let (neg, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let n = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |acc, d| acc.saturating_mul(10).saturating_add(i32::from(d - b'0')));
    if neg {
        -n
    } else {
        n
    }
}

/// Field of view requested in a userinfo string, clamped to [1, 160].
fn fov_from_userinfo(userinfo: &str) -> f32 {
    let fov = atoi(&info_value_for_key(userinfo, "fov"));
    if fov < 1 {
        90.0
    } else if fov > 160 {
        160.0
    } else {
        fov as f32
    }
}

// ============================================================
// Client records
// ============================================================

/// This is only called when the game first initializes in single player,
/// but is called after each death and level change in deathmatch.
pub fn init_client_persistant(ctx: &mut GameContext, client_idx: usize) {
    let pers = &mut ctx.clients[client_idx].pers;
    *pers = ClientPersistant::default();
    pers.connected = true;
}

pub fn init_client_resp(ctx: &mut GameContext, client_idx: usize) {
    let id_state = ctx.clients[client_idx].resp.id_state;
    ctx.clients[client_idx].resp = ClientRespawn {
        enterframe: ctx.level.framenum,
        id_state,
        ..ClientRespawn::default()
    };
}

// ============================================================
// Spawn points
// ============================================================

/// Chooses a player start and returns the spawn origin and angles.
///
/// A marker whose targetname matches the requested spawn point wins; with
/// no request, an unnamed marker. Failing both, any player start will do.
pub fn select_spawn_point(ctx: &GameContext) -> (Vec3, Vec3) {
    let wanted = ctx.game.spawnpoint.as_str();
    let starts = || {
        let mut from = 0;
        std::iter::from_fn(move || {
            let found = g_find(ctx, from, "classname", "info_player_start")?;
            from = found + 1;
            Some(found)
        })
    };

    let spot = starts()
        .find(|&i| {
            let targetname = ctx.edicts[i].targetname.as_str();
            if wanted.is_empty() {
                targetname.is_empty()
            } else {
                targetname.eq_ignore_ascii_case(wanted)
            }
        })
        .or_else(|| {
            let any = starts().next();
            if any.is_some() {
                tracing::warn!(spawnpoint = wanted, "no matching spawn point, using the first player start");
            }
            any
        });

    match spot {
        Some(si) => {
            let mut origin = ctx.edicts[si].s.origin;
            origin[2] += 9.0;
            (origin, ctx.edicts[si].s.angles)
        }
        None => {
            tracing::warn!(spawnpoint = wanted, "no player start on the map");
            ctx.gi.dprintf(&format!("Couldn't find spawn point {}\n", wanted));
            ([0.0, 0.0, 9.0], VEC3_ORIGIN)
        }
    }
}

// ============================================================
// Spawning
// ============================================================

/// Called when a player connects to a server or respawns in a deathmatch.
pub fn put_client_in_server(ctx: &mut GameContext, ent_idx: usize) -> GameResult<()> {
    let ci = ctx.client_index(ent_idx)?;
    let mins: Vec3 = [-16.0, -16.0, -24.0];
    let maxs: Vec3 = [16.0, 16.0, 32.0];

    // find a spawn point
    let (spawn_origin, spawn_angles) = select_spawn_point(ctx);

    // deathmatch wipes most client data every spawn
    let resp = if ctx.deathmatch() {
        let resp = ctx.clients[ci].resp.clone();
        let userinfo = ctx.clients[ci].pers.userinfo.clone();
        init_client_persistant(ctx, ci);
        client_userinfo_changed(ctx, ent_idx, &userinfo)?;
        resp
    } else {
        ClientRespawn::default()
    };

    // clear everything but the persistant data
    let saved = std::mem::take(&mut ctx.clients[ci].pers);
    ctx.clients[ci] = GClient {
        pers: saved,
        ..GClient::default()
    };
    if !ctx.clients[ci].pers.connected {
        init_client_persistant(ctx, ci);
    }
    ctx.clients[ci].resp = resp;

    // clear entity values
    let ent = &mut ctx.edicts[ent_idx];
    ent.groundentity = None;
    ent.client = Some(ci);
    ent.movetype = MoveType::Walk;
    ent.viewheight = 22;
    ent.inuse = true;
    ent.classname = "player".to_string();
    ent.mass = 200;
    ent.solid = Solid::Bbox;
    ent.clipmask = MASK_PLAYERSOLID;
    ent.model = "players/male/tris.md2".to_string();
    ent.waterlevel = 0;
    ent.watertype = 0;
    ent.flags.remove(FL_NO_KNOCKBACK);
    ent.svflags &= !SVF_DEADMONSTER;

    ent.mins = mins;
    ent.maxs = maxs;
    ent.velocity = VEC3_ORIGIN;

    // clear playerstate values
    let client = &mut ctx.clients[ci];
    client.ps = PlayerState::default();
    client.ps.pmove.origin = origin_to_fixed(&spawn_origin);
    client.ps.fov = fov_from_userinfo(&client.pers.userinfo);

    // clear entity state values
    ent.s.effects = 0;
    ent.s.modelindex = 255; // will use the skin specified model
    ent.s.modelindex2 = 0;
    ent.s.skinnum = (ent_idx - 1) as i32;
    ent.s.frame = 0;
    ent.s.origin = spawn_origin;
    ent.s.origin[2] += 1.0; // make sure off ground
    ent.s.old_origin = ent.s.origin;

    // set the delta angle
    for i in 0..3 {
        client.ps.pmove.delta_angles[i] = angle2short(spawn_angles[i] - client.resp.cmd_angles[i]) as i16;
    }

    ent.s.angles = [0.0, spawn_angles[YAW], 0.0];
    client.ps.viewangles = ent.s.angles;
    client.v_angle = ent.s.angles;

    if !killbox(ctx, ent_idx) {
        // spawn anyway, the blocker keeps its place
        tracing::debug!(entity = ent_idx, "spawning into an occupied volume");
    }

    ctx.gi.linkentity(&mut ctx.edicts[ent_idx]);
    tracing::info!(entity = ent_idx, origin = %vtos(&spawn_origin), "player placed");
    Ok(())
}

/// Respawn a player. Only deathmatch puts the player back in the world;
/// otherwise the level has to be restarted by the host.
pub fn respawn(ctx: &mut GameContext, self_idx: usize) -> GameResult<()> {
    let ci = ctx.client_index(self_idx)?;
    if !ctx.deathmatch() {
        tracing::info!(entity = self_idx, "respawn outside deathmatch: level restart required");
        return Ok(());
    }

    ctx.edicts[self_idx].svflags &= !SVF_NOCLIENT;
    put_client_in_server(ctx, self_idx)?;

    // add a teleportation effect
    ctx.edicts[self_idx].s.event = EV_PLAYER_TELEPORT;

    // hold in place briefly
    let client = &mut ctx.clients[ci];
    client.ps.pmove.pm_flags = PMF_TIME_TELEPORT;
    client.ps.pmove.pm_time = 14;
    client.respawn_time = ctx.level.time;

    Ok(())
}

fn send_login_effect(ctx: &GameContext, ent_idx: usize, flash: i32) {
    let msg = ServerMessage::MuzzleFlash {
        entity: ent_idx as i32,
        flash,
    };
    ctx.gi.multicast(&ctx.edicts[ent_idx].s.origin, &msg, Multicast::Pvs);
}

// ============================================================
// ClientBegin
// ============================================================

/// A client has just connected to the server in deathmatch mode, so clear
/// everything out before starting them.
pub fn client_begin_deathmatch(ctx: &mut GameContext, ent_idx: usize) -> GameResult<()> {
    let ci = ctx.client_index(ent_idx)?;
    g_init_edict(&mut ctx.edicts[ent_idx], ent_idx);
    init_client_resp(ctx, ci);

    put_client_in_server(ctx, ent_idx)?;

    send_login_effect(ctx, ent_idx, MZ_LOGIN);
    ctx.gi.bprintf(
        PRINT_HIGH,
        &format!("{} entered the game\n", ctx.clients[ci].pers.netname),
    );
    tracing::info!(entity = ent_idx, name = %ctx.clients[ci].pers.netname, "client began");

    // make sure all view stuff is valid
    client_end_server_frame(ctx, ent_idx)
}

/// Called when a client has finished connecting and is ready to be placed
/// into the game. This happens every level load.
pub fn client_begin(ctx: &mut GameContext, ent_idx: usize) -> GameResult<()> {
    let ci = ctx.client_index(ent_idx)?;
    ctx.edicts[ent_idx].client = Some(ci);

    if ctx.deathmatch() {
        return client_begin_deathmatch(ctx, ent_idx);
    }

    // if there is already a body waiting for us (a loadgame), just take it
    if ctx.edicts[ent_idx].inuse {
        let client = &mut ctx.clients[ci];
        for i in 0..3 {
            client.ps.pmove.delta_angles[i] = angle2short(client.ps.viewangles[i]) as i16;
        }
    } else {
        g_init_edict(&mut ctx.edicts[ent_idx], ent_idx);
        ctx.edicts[ent_idx].classname = "player".to_string();
        init_client_resp(ctx, ci);
        put_client_in_server(ctx, ent_idx)?;
    }

    if ctx.game.maxclients > 1 {
        send_login_effect(ctx, ent_idx, MZ_LOGIN);
        ctx.gi.bprintf(
            PRINT_HIGH,
            &format!("{} entered the game\n", ctx.clients[ci].pers.netname),
        );
    }
    tracing::info!(entity = ent_idx, name = %ctx.clients[ci].pers.netname, "client began");

    // make sure all view stuff is valid
    client_end_server_frame(ctx, ent_idx)
}

// ============================================================
// ClientUserinfoChanged
// ============================================================

/// Called whenever the player updates a userinfo variable. The game can
/// override any of the settings in place.
pub fn client_userinfo_changed(ctx: &mut GameContext, ent_idx: usize, userinfo: &str) -> GameResult<()> {
    let ci = ctx.client_index(ent_idx)?;

    // check for malformed or illegal info strings
    let userinfo = if info_validate(userinfo) {
        userinfo.to_string()
    } else {
        "\\name\\badinfo\\skin\\male/grunt".to_string()
    };

    let client = &mut ctx.clients[ci];

    // set name
    client.pers.netname = info_value_for_key(&userinfo, "name");

    // set skin
    let skin = info_value_for_key(&userinfo, "skin");
    let playernum = ent_idx - 1;
    ctx.gi.configstring(
        CS_PLAYERSKINS + playernum,
        &format!("{}\\{}", client.pers.netname, skin),
    );

    // fov
    client.ps.fov = fov_from_userinfo(&userinfo);

    // handedness
    let hand = info_value_for_key(&userinfo, "hand");
    if !hand.is_empty() {
        client.pers.hand = atoi(&hand);
    }

    // save off the userinfo
    client.pers.userinfo = userinfo;
    Ok(())
}

// ============================================================
// ClientConnect
// ============================================================

/// Called when a player begins connecting to the server. Returns whether the
/// connection is allowed, along with the userinfo, which carries a `rejmsg`
/// key when it is not.
pub fn client_connect(ctx: &mut GameContext, ent_idx: usize, userinfo: &str) -> GameResult<(bool, String)> {
    let ci = ctx.client_index(ent_idx)?;
    let mut userinfo = userinfo.to_string();

    // check for a password
    let password = &ctx.cvars.password;
    if !password.is_empty() && password != "none" && *password != info_value_for_key(&userinfo, "password") {
        info_set_value_for_key(&mut userinfo, "rejmsg", "Password required or incorrect.");
        tracing::info!(entity = ent_idx, "connection refused: bad password");
        return Ok((false, userinfo));
    }

    // they can connect
    ctx.edicts[ent_idx].client = Some(ci);

    // if there is already a body waiting for us (a loadgame), just take it,
    // otherwise spawn one from scratch
    if !ctx.edicts[ent_idx].inuse {
        // clear the respawning variables
        ctx.clients[ci].resp.id_state = true;
        init_client_resp(ctx, ci);
        init_client_persistant(ctx, ci);
    }

    client_userinfo_changed(ctx, ent_idx, &userinfo)?;

    if ctx.game.maxclients > 1 {
        ctx.gi.dprintf(&format!("{} connected\n", ctx.clients[ci].pers.netname));
    }
    tracing::info!(entity = ent_idx, name = %ctx.clients[ci].pers.netname, "client connected");

    ctx.clients[ci].pers.connected = true;
    Ok((true, userinfo))
}

// ============================================================
// ClientDisconnect
// ============================================================

/// Called when a player drops from the server. Will not be called between levels.
pub fn client_disconnect(ctx: &mut GameContext, ent_idx: usize) -> GameResult<()> {
    let ci = ctx.client_index(ent_idx)?;

    ctx.gi.bprintf(
        PRINT_HIGH,
        &format!("{} disconnected\n", ctx.clients[ci].pers.netname),
    );
    tracing::info!(entity = ent_idx, name = %ctx.clients[ci].pers.netname, "client disconnected");

    // send effect
    send_login_effect(ctx, ent_idx, MZ_LOGOUT);

    ctx.gi.unlinkentity(&mut ctx.edicts[ent_idx]);
    let ent = &mut ctx.edicts[ent_idx];
    ent.s.modelindex = 0;
    ent.solid = Solid::Not;
    ent.inuse = false;
    ent.classname = "disconnected".to_string();
    ctx.clients[ci].pers.connected = false;

    let playernum = ent_idx - 1;
    ctx.gi.configstring(CS_PLAYERSKINS + playernum, "");
    Ok(())
}

// ============================================================
// ClientThink
// ============================================================

/// Collision for the movement integrator: every trace ignores the moving
/// player and clips against player-solid contents.
struct PmTrace<'a> {
    gi: &'a dyn GameImport,
    passent: i32,
}

impl PmoveCallbacks for PmTrace<'_> {
    fn trace(&self, start: &Vec3, mins: &Vec3, maxs: &Vec3, end: &Vec3) -> Trace {
        self.gi.trace(start, mins, maxs, end, self.passent, MASK_PLAYERSOLID)
    }

    fn pointcontents(&self, point: &Vec3) -> i32 {
        self.gi.pointcontents(point)
    }
}

/// This will be called once for each client frame, which will usually be a
/// couple times for each server frame.
pub fn client_think(ctx: &mut GameContext, ent_idx: usize, ucmd: &UserCmd) -> GameResult<()> {
    let ci = ctx.client_index(ent_idx)?;
    ctx.level.current_entity = ent_idx;

    let ent = &ctx.edicts[ent_idx];
    let client = &mut ctx.clients[ci];

    // set up for pmove
    client.ps.pmove.pm_type = if ent.movetype == MoveType::Noclip {
        PmType::Spectator
    } else if ent.s.modelindex != 255 {
        PmType::Gib
    } else {
        PmType::Normal
    };

    client.ps.pmove.gravity = if ent.client_local_gravity != 0 {
        ent.client_local_gravity as i16
    } else {
        ctx.cvars.sv_gravity as i16
    };

    let mut pm = PmoveData {
        s: client.ps.pmove,
        cmd: *ucmd,
        ..PmoveData::default()
    };
    pm.s.origin = origin_to_fixed(&ent.s.origin);
    pm.s.velocity = velocity_to_fixed(&ent.velocity);

    if client.old_pmove != pm.s {
        pm.snapinitial = true;
    }

    // perform a pmove
    let callbacks = PmTrace {
        gi: &*ctx.gi,
        passent: ent_idx as i32,
    };
    ctx.gi.pmove(&mut pm, &callbacks);

    // save results of pmove
    let was_airborne = ent.groundentity.is_none();
    client.ps.pmove = pm.s;
    client.old_pmove = pm.s;

    let ent = &mut ctx.edicts[ent_idx];
    ent.s.origin = fixed_to_world(&pm.s.origin);
    ent.velocity = fixed_to_world(&pm.s.velocity);
    ent.mins = pm.mins;
    ent.maxs = pm.maxs;

    for i in 0..3 {
        client.resp.cmd_angles[i] = short2angle(ucmd.angles[i]);
    }

    ent.viewheight = pm.viewheight as i32;
    ent.waterlevel = pm.waterlevel;
    ent.watertype = pm.watertype;
    client.v_angle = pm.viewangles;
    client.ps.viewangles = pm.viewangles;

    let grounded = pm.groundentity >= 0 && (pm.groundentity as usize) < ctx.edicts.len();
    if grounded {
        let g = pm.groundentity as usize;
        let linkcount = ctx.edicts[g].linkcount;
        let ground = ctx.entity_ref(g);
        ctx.edicts[ent_idx].groundentity = Some(ground);
        ctx.edicts[ent_idx].groundentity_linkcount = linkcount;
    } else {
        ctx.edicts[ent_idx].groundentity = None;
    }

    if was_airborne && grounded && pm.cmd.upmove >= 10 && pm.waterlevel == 0 {
        let snd = ctx.gi.soundindex("*jump1.wav");
        ctx.gi.sound(ent_idx as i32, CHAN_VOICE, snd, 1.0, ATTN_NORM, 0.0);
        let origin = ctx.edicts[ent_idx].s.origin;
        player_noise(ctx, ent_idx, &origin, PNOISE_SELF)?;
    }

    ctx.gi.linkentity(&mut ctx.edicts[ent_idx]);

    if ctx.edicts[ent_idx].movetype != MoveType::Noclip {
        g_touch_triggers(ctx, ent_idx);
    }

    // touch other objects, each one only once
    let touched = pm.touched();
    for (i, &other) in touched.iter().enumerate() {
        if touched[..i].contains(&other) {
            continue;
        }
        if other < 0 || other as usize >= ctx.edicts.len() {
            continue;
        }
        let other = other as usize;
        if ctx.edicts[other].touch_fn.is_none() {
            continue;
        }
        tracing::trace!(entity = ent_idx, other, "pmove touch");
        call_touch(ctx, other, ent_idx, None, None);
    }

    let client = &mut ctx.clients[ci];
    client.oldbuttons = client.buttons;
    client.buttons = ucmd.buttons;
    client.latched_buttons |= client.buttons & !client.oldbuttons;

    // save light level the player is standing on for monster sighting AI
    ctx.edicts[ent_idx].light_level = i32::from(ucmd.lightlevel);

    Ok(())
}

/// This will be called once for each server frame, before running any other
/// entities in the world.
pub fn client_begin_server_frame(ctx: &mut GameContext, ent_idx: usize) -> GameResult<()> {
    let ci = ctx.client_index(ent_idx)?;
    ctx.clients[ci].latched_buttons = 0;
    Ok(())
}

// ============================================================
// PlayerNoise
// ============================================================

fn spawn_noise(ctx: &mut GameContext, who_idx: usize) -> GameResult<EntityRef> {
    let idx = g_spawn(ctx)?;
    let owner = ctx.entity_ref(who_idx);
    let noise = &mut ctx.edicts[idx];
    noise.classname = "player_noise".to_string();
    noise.mins = [-8.0; 3];
    noise.maxs = [8.0; 3];
    noise.owner = Some(owner);
    noise.svflags = SVF_NOCLIENT;
    Ok(ctx.entity_ref(idx))
}

/// Each player can have two noise objects associated with it:
/// a personal noise (jumping, pain, weapon firing), and a weapon
/// target noise (bullet wall impacts).
///
/// Monsters that don't directly see the player can move
/// to a noise in hopes of seeing the player from there.
pub fn player_noise(ctx: &mut GameContext, who_idx: usize, where_pos: &Vec3, noise_type: i32) -> GameResult<()> {
    if ctx.deathmatch() {
        return Ok(());
    }

    if ctx.edicts[who_idx].flags.intersects(FL_NOTARGET) {
        return Ok(());
    }

    if ctx.resolve(ctx.edicts[who_idx].mynoise).is_none() || ctx.resolve(ctx.edicts[who_idx].mynoise2).is_none() {
        let noise = spawn_noise(ctx, who_idx)?;
        let noise2 = spawn_noise(ctx, who_idx)?;
        ctx.edicts[who_idx].mynoise = Some(noise);
        ctx.edicts[who_idx].mynoise2 = Some(noise2);
    }

    let noise_ref = if noise_type == PNOISE_SELF {
        let r = ctx.edicts[who_idx].mynoise;
        ctx.level.sound_entity = r;
        ctx.level.sound_entity_framenum = ctx.level.framenum;
        r
    } else {
        // PNOISE_WEAPON and PNOISE_IMPACT
        let r = ctx.edicts[who_idx].mynoise2;
        ctx.level.sound2_entity = r;
        ctx.level.sound2_entity_framenum = ctx.level.framenum;
        r
    };

    let Some(noise_idx) = ctx.resolve(noise_ref) else {
        return Ok(());
    };

    let time = ctx.level.time;
    let noise = &mut ctx.edicts[noise_idx];
    noise.s.origin = *where_pos;
    noise.absmin = vector_subtract(where_pos, &noise.maxs);
    noise.absmax = vector_add(where_pos, &noise.maxs);
    noise.last_sound_time = time;

    ctx.gi.linkentity(&mut ctx.edicts[noise_idx]);
    Ok(())
}
