// p_view.rs — player view calculations
//
// Copyright (C) 1997-2001 Id Software, Inc.
// Licensed under the GNU General Public License v2

use crate::error::GameResult;
use crate::g_local::*;
use crate::game_import::GameImport;
use crate::m_player_frames::{CROUCH_STAND, CROUCH_WALK, JUMP, LAND, RUN, STAND};
use mq2b_common::pmove::{origin_to_fixed, velocity_to_fixed};

/// Alpha below which a decaying screen flash counts as gone.
const BLEND_EPSILON: f32 = 1e-4;

/// Per-frame view calculation state shared by the steps of
/// [`client_end_server_frame`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewContext {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub xyspeed: f32,
    pub bobmove: f32,
    pub bobcycle: i32,
    pub bobfracsin: f32,
}

// ============================================================
// SV_CalcRoll
// ============================================================

pub fn sv_calc_roll(velocity: &Vec3, right: &Vec3, cvars: &GameCvars) -> f32 {
    let mut side = dot_product(velocity, right);
    let sign: f32 = if side < 0.0 { -1.0 } else { 1.0 };
    side = side.abs();

    let value = cvars.sv_rollangle;

    if side < cvars.sv_rollspeed {
        side = side * value / cvars.sv_rollspeed;
    } else {
        side = value;
    }

    side * sign
}

// ============================================================
// Bob cycle
// ============================================================

/// Calculate speed and cycle to be used for all cyclic walking effects.
pub fn sv_calc_bob(ent: &Edict, client: &mut GClient, vctx: &mut ViewContext) {
    vctx.xyspeed = (ent.velocity[0] * ent.velocity[0] + ent.velocity[1] * ent.velocity[1]).sqrt();

    if vctx.xyspeed < 5.0 {
        client.bobmove = 0.0;
        client.bobtime = 0.0; // start at beginning of cycle again
    } else if ent.groundentity.is_some() {
        // so bobbing only cycles when on ground
        client.bobmove = if vctx.xyspeed > 210.0 {
            0.25
        } else if vctx.xyspeed > 100.0 {
            0.125
        } else {
            0.0625
        };
    }
    vctx.bobmove = client.bobmove;

    client.bobtime += client.bobmove;
    let mut bobtime = client.bobtime;

    if (client.ps.pmove.pm_flags & PMF_DUCKED) != 0 {
        bobtime *= 4.0;
    }

    vctx.bobcycle = bobtime as i32;
    vctx.bobfracsin = (bobtime * std::f32::consts::PI).sin().abs();
}

// ============================================================
// SV_CalcViewOffset
//
// kick, bob and fall all go into the view offset
// ============================================================

pub fn sv_calc_view_offset(
    ent: &Edict,
    client: &mut GClient,
    time: f32,
    vctx: &ViewContext,
    cvars: &GameCvars,
) {
    //===================================
    // base angles

    // add angles based on weapon kick
    let mut angles = client.kick_angles;

    // add angles based on damage kick
    let mut ratio = (client.v_dmg_time - time) / DAMAGE_TIME;
    if ratio < 0.0 {
        ratio = 0.0;
        client.v_dmg_pitch = 0.0;
        client.v_dmg_roll = 0.0;
    }
    angles[PITCH] += ratio * client.v_dmg_pitch;
    angles[ROLL] += ratio * client.v_dmg_roll;

    // add pitch based on fall kick
    let ratio = ((client.fall_time - time) / FALL_TIME).max(0.0);
    angles[PITCH] += ratio * client.fall_value;

    // add angles based on velocity
    let delta = dot_product(&ent.velocity, &vctx.forward);
    angles[PITCH] += delta * cvars.run_pitch;

    let delta = dot_product(&ent.velocity, &vctx.right);
    angles[ROLL] += delta * cvars.run_roll;

    // add angles based on bob
    let ducked = (client.ps.pmove.pm_flags & PMF_DUCKED) != 0;
    let mut delta = vctx.bobfracsin * cvars.bob_pitch * vctx.xyspeed;
    if ducked {
        delta *= 6.0; // crouching
    }
    angles[PITCH] += delta;
    let mut delta = vctx.bobfracsin * cvars.bob_roll * vctx.xyspeed;
    if ducked {
        delta *= 6.0; // crouching
    }
    if (vctx.bobcycle & 1) != 0 {
        delta = -delta;
    }
    angles[ROLL] += delta;

    client.ps.kick_angles = angles;

    //===================================
    // base origin
    let mut v: Vec3 = [0.0; 3];

    // add view height
    v[2] += ent.viewheight as f32;

    // add fall height
    let ratio = ((client.fall_time - time) / FALL_TIME).max(0.0);
    v[2] -= ratio * client.fall_value * 0.4;

    // add bob height
    let bob = (vctx.bobfracsin * vctx.xyspeed * cvars.bob_up).min(6.0);
    v[2] += bob;

    // add kick offset
    let mut v = vector_add(&v, &client.kick_origin);

    // absolutely bound offsets
    // so the view can never be outside the player box
    v[0] = v[0].clamp(-14.0, 14.0);
    v[1] = v[1].clamp(-14.0, 14.0);
    v[2] = v[2].clamp(-22.0, 30.0);

    client.ps.viewoffset = v;
}

// ============================================================
// SV_AddBlend
// ============================================================

pub fn sv_add_blend(r: f32, g: f32, b: f32, a: f32, v_blend: &mut [f32; 4]) {
    if a <= 0.0 {
        return;
    }
    let a2 = v_blend[3] + (1.0 - v_blend[3]) * a; // new total alpha
    let a3 = v_blend[3] / a2; // fraction of color from old

    v_blend[0] = v_blend[0] * a3 + r * (1.0 - a3);
    v_blend[1] = v_blend[1] * a3 + g * (1.0 - a3);
    v_blend[2] = v_blend[2] * a3 + b * (1.0 - a3);
    v_blend[3] = a2;
}

fn decay_alpha(alpha: f32, step: f32) -> f32 {
    let a = alpha - step;
    if a < BLEND_EPSILON {
        0.0
    } else {
        a
    }
}

// ============================================================
// SV_CalcBlend
// ============================================================

pub fn sv_calc_blend(ent: &Edict, client: &mut GClient, gi: &dyn GameImport) {
    client.ps.blend = [0.0; 4];

    // add for contents
    let vieworg = vector_add(&ent.s.origin, &client.ps.viewoffset);
    let contents = gi.pointcontents(&vieworg);
    if (contents & (CONTENTS_LAVA | CONTENTS_SLIME | CONTENTS_WATER)) != 0 {
        client.ps.rdflags |= RDF_UNDERWATER;
    } else {
        client.ps.rdflags &= !RDF_UNDERWATER;
    }

    if (contents & (CONTENTS_SOLID | CONTENTS_LAVA)) != 0 {
        sv_add_blend(1.0, 0.3, 0.0, 0.6, &mut client.ps.blend);
    } else if (contents & CONTENTS_SLIME) != 0 {
        sv_add_blend(0.0, 0.1, 0.05, 0.6, &mut client.ps.blend);
    } else if (contents & CONTENTS_WATER) != 0 {
        sv_add_blend(0.5, 0.3, 0.2, 0.4, &mut client.ps.blend);
    }

    // add for damage
    if client.damage_alpha > 0.0 {
        sv_add_blend(
            client.damage_blend[0],
            client.damage_blend[1],
            client.damage_blend[2],
            client.damage_alpha,
            &mut client.ps.blend,
        );
    }

    if client.bonus_alpha > 0.0 {
        sv_add_blend(0.85, 0.7, 0.3, client.bonus_alpha, &mut client.ps.blend);
    }

    // drop the damage value
    client.damage_alpha = decay_alpha(client.damage_alpha, 0.06);

    // drop the bonus value
    client.bonus_alpha = decay_alpha(client.bonus_alpha, 0.1);
}

// ============================================================
// G_SetClientEvent
// ============================================================

pub fn g_set_client_event(ent: &mut Edict, client: &mut GClient, vctx: &ViewContext) {
    let stepped = vctx.bobcycle != client.old_bobcycle;
    client.old_bobcycle = vctx.bobcycle;

    if ent.s.event != 0 {
        return;
    }

    if ent.groundentity.is_some() && vctx.xyspeed > 225.0 && stepped {
        ent.s.event = EV_FOOTSTEP;
        tracing::trace!(entity = ent.s.number, bobcycle = vctx.bobcycle, "footstep");
    }
}

// ============================================================
// G_SetClientSound
// ============================================================

pub fn g_set_client_sound(ent: &mut Edict, snd_fry: i32) {
    if ent.waterlevel != 0 && (ent.watertype & (CONTENTS_LAVA | CONTENTS_SLIME)) != 0 {
        ent.s.sound = snd_fry;
    } else {
        ent.s.sound = 0;
    }
}

// ============================================================
// G_SetClientFrame
// ============================================================

pub fn g_set_client_frame(ent: &mut Edict, client: &mut GClient, vctx: &ViewContext) {
    if ent.s.modelindex != 255 {
        return; // not in the player model
    }

    let duck = (client.ps.pmove.pm_flags & PMF_DUCKED) != 0;
    let run = vctx.xyspeed != 0.0;
    let airborne = ent.groundentity.is_none();

    // check for stand/duck and stop/go transitions
    let newanim = (duck != client.anim_duck && client.anim_priority < ANIM_DEATH)
        || (run != client.anim_run && client.anim_priority == ANIM_BASIC)
        || (airborne && client.anim_priority <= ANIM_WAVE);

    if !newanim {
        if client.anim_priority == ANIM_REVERSE {
            if ent.s.frame > client.anim_end {
                ent.s.frame -= 1;
                return;
            }
        } else if ent.s.frame < client.anim_end {
            // continue an animation
            ent.s.frame += 1;
            return;
        }

        if client.anim_priority == ANIM_DEATH {
            return; // stay there
        }
        if client.anim_priority == ANIM_JUMP {
            if airborne {
                return; // stay there
            }
            client.anim_priority = ANIM_WAVE;
            ent.s.frame = LAND.first;
            client.anim_end = LAND.last;
            return;
        }
    }

    // return to either a running or standing frame
    client.anim_priority = ANIM_BASIC;
    client.anim_duck = duck;
    client.anim_run = run;

    let seq = if airborne {
        client.anim_priority = ANIM_JUMP;
        if ent.s.frame != JUMP.last {
            ent.s.frame = JUMP.first;
        }
        client.anim_end = JUMP.last;
        return;
    } else if run {
        if duck {
            CROUCH_WALK
        } else {
            RUN
        }
    } else if duck {
        CROUCH_STAND
    } else {
        STAND
    };
    ent.s.frame = seq.first;
    client.anim_end = seq.last;
}

// ============================================================
// ClientEndServerFrame
//
// Called for each player at the end of the server frame
// and right after spawning.
// ============================================================

pub fn client_end_server_frame(ctx: &mut GameContext, ent_idx: usize) -> GameResult<()> {
    let ci = ctx.client_index(ent_idx)?;
    let GameCtx {
        gi,
        edicts,
        clients,
        level,
        cvars,
        snd_fry,
        ..
    } = ctx;
    let ent = &mut edicts[ent_idx];
    let client = &mut clients[ci];
    let mut vctx = ViewContext::default();

    //
    // If the origin or velocity have changed since ClientThink(),
    // update the pmove values. This will happen when the client
    // is pushed by a bmodel or kicked by an explosion.
    //
    client.ps.pmove.origin = origin_to_fixed(&ent.s.origin);
    client.ps.pmove.velocity = velocity_to_fixed(&ent.velocity);

    (vctx.forward, vctx.right, vctx.up) = angle_vectors(&client.v_angle);

    //
    // set model angles from view angles so other things in
    // the world can tell which direction you are looking
    //
    if client.v_angle[PITCH] > 180.0 {
        ent.s.angles[PITCH] = (-360.0 + client.v_angle[PITCH]) / 3.0;
    } else {
        ent.s.angles[PITCH] = client.v_angle[PITCH] / 3.0;
    }
    ent.s.angles[YAW] = client.v_angle[YAW];
    ent.s.angles[ROLL] = sv_calc_roll(&ent.velocity, &vctx.right, cvars) * 4.0;

    sv_calc_bob(ent, client, &mut vctx);

    // determine the view offsets
    sv_calc_view_offset(ent, client, level.time, &vctx, cvars);

    // must be after viewoffset, so eye contents can be accurately determined
    sv_calc_blend(ent, client, &**gi);

    g_set_client_event(ent, client, &vctx);

    g_set_client_sound(ent, *snd_fry);

    g_set_client_frame(ent, client, &vctx);

    client.oldvelocity = ent.velocity;
    client.oldviewangles = client.ps.viewangles;

    // clear weapon kicks
    client.kick_origin = VEC3_ORIGIN;
    client.kick_angles = VEC3_ORIGIN;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GameError;
    use crate::test_support::{make_ctx, make_recorded_ctx};

    /// Player 1 standing on the world with the player model.
    fn standing_player(ctx: &mut GameContext) -> usize {
        let world = ctx.entity_ref(0);
        let ent = &mut ctx.edicts[1];
        ent.inuse = true;
        ent.s.modelindex = 255;
        ent.viewheight = 22;
        ent.groundentity = Some(world);
        1
    }

    /// One scheduler tick as far as the view is concerned: the pending
    /// event is cleared, then the view pass runs.
    fn tick(ctx: &mut GameContext, ent: usize) -> i32 {
        ctx.edicts[ent].s.event = 0;
        client_end_server_frame(ctx, ent).unwrap();
        ctx.edicts[ent].s.event
    }

    #[test]
    fn test_sv_add_blend() {
        let mut blend = [0.0f32; 4];
        sv_add_blend(1.0, 0.0, 0.0, 0.5, &mut blend);
        assert!((blend[0] - 1.0).abs() < 0.001);
        assert!((blend[3] - 0.5).abs() < 0.001);

        // blend another color on top
        sv_add_blend(0.0, 1.0, 0.0, 0.5, &mut blend);
        assert!((blend[3] - 0.75).abs() < 0.001);
        assert!((blend[0] - 2.0 / 3.0).abs() < 0.001);
        assert!((blend[1] - 1.0 / 3.0).abs() < 0.001);
    }

    #[test]
    fn test_sv_calc_roll_caps_at_rollangle() {
        let cvars = GameCvars::default();
        let right: Vec3 = [0.0, -1.0, 0.0];
        assert!((sv_calc_roll(&[0.0, -100.0, 0.0], &right, &cvars) - 1.0).abs() < 1e-5);
        assert_eq!(sv_calc_roll(&[0.0, -500.0, 0.0], &right, &cvars), 2.0);
        assert_eq!(sv_calc_roll(&[0.0, 500.0, 0.0], &right, &cvars), -2.0);
    }

    #[test]
    fn test_view_offset_stays_inside_hull() {
        let cvars = GameCvars::default();
        let extremes = [-10_000.0f32, -50.0, 0.0, 50.0, 10_000.0];
        let mut ent = Edict::default();
        for &k in &extremes {
            for &fall in &extremes {
                for &height in &[-100, 0, 22, 100] {
                    ent.viewheight = height;
                    ent.velocity = [k, -k, 0.0];
                    let mut client = GClient {
                        kick_origin: [k, -k, k],
                        fall_time: 1.0,
                        fall_value: fall,
                        ..GClient::default()
                    };
                    let vctx = ViewContext {
                        xyspeed: k.abs(),
                        bobfracsin: 1.0,
                        ..ViewContext::default()
                    };
                    sv_calc_view_offset(&ent, &mut client, 0.9, &vctx, &cvars);
                    let v = client.ps.viewoffset;
                    assert!((-14.0..=14.0).contains(&v[0]), "{v:?}");
                    assert!((-14.0..=14.0).contains(&v[1]), "{v:?}");
                    assert!((-22.0..=30.0).contains(&v[2]), "{v:?}");
                }
            }
        }
    }

    #[test]
    fn test_blend_alpha_decays_to_zero_in_bounded_ticks() {
        let ctx = make_ctx(1);
        let ent = Edict::default();
        for step in 1..=20 {
            let start = step as f32 * 0.05;
            let mut client = GClient {
                damage_alpha: start,
                bonus_alpha: start,
                damage_blend: [1.0, 0.0, 0.0],
                ..GClient::default()
            };
            let damage_bound = (start / 0.06).ceil() as usize;
            let bonus_bound = (start / 0.1).ceil() as usize;

            let mut damage_ticks = None;
            let mut bonus_ticks = None;
            for t in 1..=30 {
                sv_calc_blend(&ent, &mut client, &*ctx.gi);
                assert!(client.damage_alpha >= 0.0 && client.bonus_alpha >= 0.0);
                if client.damage_alpha == 0.0 && damage_ticks.is_none() {
                    damage_ticks = Some(t);
                }
                if client.bonus_alpha == 0.0 && bonus_ticks.is_none() {
                    bonus_ticks = Some(t);
                }
            }
            assert!(damage_ticks.is_some_and(|t| t <= damage_bound), "start {start}: {damage_ticks:?}");
            assert!(bonus_ticks.is_some_and(|t| t <= bonus_bound), "start {start}: {bonus_ticks:?}");
        }
    }

    #[test]
    fn test_blend_underwater_tint() {
        let (mut ctx, rec) = make_recorded_ctx(1);
        let p = standing_player(&mut ctx);
        *rec.contents.lock() = CONTENTS_WATER;
        client_end_server_frame(&mut ctx, p).unwrap();
        let ps = &ctx.clients[0].ps;
        assert_eq!(ps.rdflags & RDF_UNDERWATER, RDF_UNDERWATER);
        assert_eq!(ps.blend, [0.5, 0.3, 0.2, 0.4]);

        *rec.contents.lock() = 0;
        client_end_server_frame(&mut ctx, p).unwrap();
        assert_eq!(ctx.clients[0].ps.rdflags & RDF_UNDERWATER, 0);
        assert_eq!(ctx.clients[0].ps.blend, [0.0; 4]);
    }

    #[test]
    fn test_at_rest_never_bobs_or_steps() {
        let mut ctx = make_ctx(1);
        let p = standing_player(&mut ctx);
        ctx.clients[0].bobtime = 3.7;

        for _ in 0..3 {
            assert_eq!(tick(&mut ctx, p), 0);
            assert_eq!(ctx.clients[0].bobtime, 0.0);
            assert_eq!(ctx.clients[0].bobmove, 0.0);
        }

        let mut vctx = ViewContext::default();
        sv_calc_bob(&ctx.edicts[p], &mut ctx.clients[0], &mut vctx);
        assert_eq!(vctx.bobfracsin, 0.0);
        assert_eq!(vctx.bobcycle, 0);
    }

    #[test]
    fn test_running_steps_once_per_cycle() {
        let mut ctx = make_ctx(1);
        let p = standing_player(&mut ctx);
        ctx.edicts[p].velocity = [250.0, 0.0, 0.0];

        let events: Vec<i32> = (0..8).map(|_| tick(&mut ctx, p)).collect();
        assert_eq!(ctx.clients[0].bobmove, 0.25);
        assert_eq!(
            events,
            vec![0, 0, 0, EV_FOOTSTEP, 0, 0, 0, EV_FOOTSTEP]
        );
    }

    #[test]
    fn test_no_footstep_below_threshold_or_airborne() {
        let mut ctx = make_ctx(1);
        let p = standing_player(&mut ctx);
        ctx.edicts[p].velocity = [200.0, 0.0, 0.0];
        assert!((0..20).all(|_| tick(&mut ctx, p) == 0));

        ctx.edicts[p].velocity = [300.0, 0.0, 0.0];
        ctx.edicts[p].groundentity = None;
        assert!((0..20).all(|_| tick(&mut ctx, p) == 0));
    }

    #[test]
    fn test_pending_event_is_not_overwritten() {
        let mut ctx = make_ctx(1);
        let p = standing_player(&mut ctx);
        ctx.edicts[p].velocity = [250.0, 0.0, 0.0];
        for _ in 0..3 {
            tick(&mut ctx, p);
        }
        ctx.edicts[p].s.event = EV_PLAYER_TELEPORT;
        client_end_server_frame(&mut ctx, p).unwrap();
        assert_eq!(ctx.edicts[p].s.event, EV_PLAYER_TELEPORT);
    }

    #[test]
    fn test_model_angles_follow_view() {
        let mut ctx = make_ctx(1);
        let p = standing_player(&mut ctx);
        ctx.clients[0].v_angle = [330.0, 45.0, 0.0];
        client_end_server_frame(&mut ctx, p).unwrap();
        let angles = ctx.edicts[p].s.angles;
        assert!((angles[PITCH] + 10.0).abs() < 1e-4);
        assert_eq!(angles[YAW], 45.0);
        assert_eq!(angles[ROLL], 0.0);
        assert_eq!(ctx.clients[0].ps.pmove.origin, [0, 0, 0]);
    }

    #[test]
    fn test_pmove_shadow_resynced_from_entity() {
        let mut ctx = make_ctx(1);
        let p = standing_player(&mut ctx);
        ctx.edicts[p].s.origin = [10.5, -3.25, 64.0];
        ctx.edicts[p].velocity = [0.0, 0.0, -100.0];
        client_end_server_frame(&mut ctx, p).unwrap();
        assert_eq!(ctx.clients[0].ps.pmove.origin, [84, -26, 512]);
        assert_eq!(ctx.clients[0].ps.pmove.velocity, [0, 0, -800]);
    }

    #[test]
    fn test_fry_sound_in_lava() {
        let mut ent = Edict::default();
        ent.waterlevel = 1;
        ent.watertype = CONTENTS_LAVA;
        g_set_client_sound(&mut ent, 7);
        assert_eq!(ent.s.sound, 7);
        ent.watertype = CONTENTS_WATER;
        g_set_client_sound(&mut ent, 7);
        assert_eq!(ent.s.sound, 0);
    }

    #[test]
    fn test_kicks_are_one_shot() {
        let mut ctx = make_ctx(1);
        let p = standing_player(&mut ctx);
        ctx.clients[0].kick_origin = [1.0, 2.0, 3.0];
        ctx.clients[0].kick_angles = [4.0, 0.0, 0.0];
        client_end_server_frame(&mut ctx, p).unwrap();
        assert_eq!(ctx.clients[0].ps.kick_angles[PITCH], 4.0);
        assert_eq!(ctx.clients[0].kick_origin, VEC3_ORIGIN);
        assert_eq!(ctx.clients[0].kick_angles, VEC3_ORIGIN);
    }

    #[test]
    fn test_non_player_rejected() {
        let mut ctx = make_ctx(1);
        assert_eq!(
            client_end_server_frame(&mut ctx, 5),
            Err(GameError::NotAClient { index: 5 })
        );
    }

    // ---- animation ----

    fn anim(ent: &mut Edict, client: &mut GClient, xyspeed: f32) {
        let vctx = ViewContext {
            xyspeed,
            ..ViewContext::default()
        };
        g_set_client_frame(ent, client, &vctx);
    }

    fn grounded_model() -> (Edict, GClient) {
        let mut ent = Edict::default();
        ent.s.modelindex = 255;
        ent.groundentity = Some(EntityRef::default());
        (ent, GClient::default())
    }

    #[test]
    fn test_anim_stand_then_run() {
        let (mut ent, mut client) = grounded_model();
        anim(&mut ent, &mut client, 0.0);
        assert_eq!((ent.s.frame, client.anim_end), (STAND.first, STAND.last));
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(ent.s.frame, STAND.first + 1);

        anim(&mut ent, &mut client, 150.0);
        assert_eq!((ent.s.frame, client.anim_end), (RUN.first, RUN.last));
        assert!(client.anim_run);
    }

    #[test]
    fn test_anim_crouch_variants() {
        let (mut ent, mut client) = grounded_model();
        client.ps.pmove.pm_flags |= PMF_DUCKED;
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(ent.s.frame, CROUCH_STAND.first);
        anim(&mut ent, &mut client, 80.0);
        assert_eq!(ent.s.frame, CROUCH_WALK.first);
        assert_eq!(client.anim_end, CROUCH_WALK.last);
    }

    #[test]
    fn test_anim_jump_then_land() {
        let (mut ent, mut client) = grounded_model();
        anim(&mut ent, &mut client, 0.0);

        ent.groundentity = None;
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(client.anim_priority, ANIM_JUMP);
        assert_eq!(ent.s.frame, JUMP.first);
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(ent.s.frame, JUMP.last);
        // hangs on the last jump frame while airborne
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(ent.s.frame, JUMP.last);

        ent.groundentity = Some(EntityRef::default());
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(client.anim_priority, ANIM_WAVE);
        assert_eq!((ent.s.frame, client.anim_end), (LAND.first, LAND.last));
        for _ in 0..(LAND.last - LAND.first) {
            anim(&mut ent, &mut client, 0.0);
        }
        assert_eq!(ent.s.frame, LAND.last);
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(client.anim_priority, ANIM_BASIC);
        assert_eq!(ent.s.frame, STAND.first);
    }

    #[test]
    fn test_anim_death_is_terminal() {
        let (mut ent, mut client) = grounded_model();
        client.anim_priority = ANIM_DEATH;
        ent.s.frame = 183;
        client.anim_end = 183;
        anim(&mut ent, &mut client, 300.0);
        ent.groundentity = None;
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(ent.s.frame, 183);
        assert_eq!(client.anim_priority, ANIM_DEATH);
    }

    #[test]
    fn test_anim_reverse_counts_down() {
        let (mut ent, mut client) = grounded_model();
        client.anim_priority = ANIM_REVERSE;
        ent.s.frame = 10;
        client.anim_end = 8;
        anim(&mut ent, &mut client, 0.0);
        assert_eq!(ent.s.frame, 9);
    }

    #[test]
    fn test_anim_ignores_other_models() {
        let (mut ent, mut client) = grounded_model();
        ent.s.modelindex = 3;
        ent.s.frame = 5;
        anim(&mut ent, &mut client, 300.0);
        assert_eq!(ent.s.frame, 5);
    }
}
