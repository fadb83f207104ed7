// g_target.rs — point entities that produce effects when used

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

use crate::dispatch::{
    THINK_TARGET_EXPLOSION, USE_TARGET_EXPLOSION, USE_TARGET_SPLASH, USE_TARGET_TENT,
};
use crate::g_local::{GameContext, Multicast, ServerMessage, SVF_NOCLIENT};
use crate::g_utils::{g_set_movedir, g_use_targets};
use mq2b_common::q_shared::{TE_EXPLOSION1, TE_SPLASH};

// ============================================================
// target_temp_entity
// ============================================================

/// Fire an origin based temporary entity event to the clients.
/// `style` is the `TE_*` kind.
pub(crate) fn use_target_tent(ctx: &mut GameContext, self_idx: usize, _other: usize, _activator: usize) {
    let ent = &ctx.edicts[self_idx];
    let origin = ent.s.origin;
    let msg = ServerMessage::TempEntity { kind: ent.style, origin };
    ctx.gi.multicast(&origin, &msg, Multicast::Pvs);
}

pub fn sp_target_temp_entity(ctx: &mut GameContext, ent_idx: usize) {
    ctx.edicts[ent_idx].use_fn = Some(USE_TARGET_TENT);
}

// ============================================================
// target_explosion
// ============================================================

/// Spawns an explosion temporary entity when used, then fires its own
/// targets. A `delay` postpones the blast; the targets fire with it.
pub(crate) fn target_explosion_explode(ctx: &mut GameContext, self_idx: usize) {
    let origin = ctx.edicts[self_idx].s.origin;
    let msg = ServerMessage::TempEntity { kind: TE_EXPLOSION1, origin };
    ctx.gi.multicast(&origin, &msg, Multicast::Phs);

    let activator = ctx.resolve(ctx.edicts[self_idx].activator).unwrap_or(0);

    // the delay was already spent getting here
    let save = ctx.edicts[self_idx].delay;
    ctx.edicts[self_idx].delay = 0.0;
    if let Err(err) = g_use_targets(ctx, self_idx, activator) {
        tracing::error!(entity = self_idx, %err, "explosion targets failed");
    }
    ctx.edicts[self_idx].delay = save;
}

pub(crate) fn use_target_explosion(ctx: &mut GameContext, self_idx: usize, _other: usize, activator: usize) {
    let activator = ctx.entity_ref(activator);
    let time = ctx.level.time;
    let ent = &mut ctx.edicts[self_idx];
    ent.activator = Some(activator);

    if ent.delay == 0.0 {
        target_explosion_explode(ctx, self_idx);
        return;
    }

    ent.think_fn = Some(THINK_TARGET_EXPLOSION);
    ent.nextthink = time + ent.delay;
}

pub fn sp_target_explosion(ctx: &mut GameContext, ent_idx: usize) {
    let ent = &mut ctx.edicts[ent_idx];
    ent.use_fn = Some(USE_TARGET_EXPLOSION);
    ent.svflags = SVF_NOCLIENT;
}

// ============================================================
// target_splash
// ============================================================

/// Creates a particle splash effect when used. `count` is the particle
/// count, `sounds` the `SPLASH_*` color.
pub(crate) fn use_target_splash(ctx: &mut GameContext, self_idx: usize, _other: usize, _activator: usize) {
    let ent = &ctx.edicts[self_idx];
    let origin = ent.s.origin;
    let msg = ServerMessage::Splash {
        count: ent.count,
        origin,
        dir: ent.movedir,
        color: ent.sounds,
    };
    tracing::trace!(entity = self_idx, kind = TE_SPLASH, "splash");
    ctx.gi.multicast(&origin, &msg, Multicast::Pvs);
}

pub fn sp_target_splash(ctx: &mut GameContext, ent_idx: usize) {
    let ent = &mut ctx.edicts[ent_idx];
    ent.use_fn = Some(USE_TARGET_SPLASH);
    ent.movedir = g_set_movedir(&ent.s.angles);
    ent.s.angles = [0.0; 3];

    if ent.count == 0 {
        ent.count = 32;
    }

    ent.svflags = SVF_NOCLIENT;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{call_think, call_use};
    use crate::g_utils::g_spawn;
    use crate::test_support::{make_recorded_ctx, Recorded};
    use mq2b_common::q_shared::SPLASH_BLUE_WATER;

    fn multicasts(events: Vec<Recorded>) -> Vec<(ServerMessage, Multicast, [f32; 3])> {
        events
            .into_iter()
            .filter_map(|e| match e {
                Recorded::Multicast { origin, msg, to } => Some((msg, to, origin)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_temp_entity_multicasts_style_at_origin() {
        let (mut ctx, rec) = make_recorded_ctx(1);
        let t = g_spawn(&mut ctx).unwrap();
        ctx.edicts[t].s.origin = [64.0, -32.0, 16.0];
        ctx.edicts[t].style = TE_EXPLOSION1;
        sp_target_temp_entity(&mut ctx, t);
        rec.take();

        call_use(&mut ctx, t, 1, 1);

        let sent = multicasts(rec.take());
        assert_eq!(
            sent,
            vec![(
                ServerMessage::TempEntity { kind: TE_EXPLOSION1, origin: [64.0, -32.0, 16.0] },
                Multicast::Pvs,
                [64.0, -32.0, 16.0],
            )]
        );
    }

    #[test]
    fn test_explosion_without_delay_goes_to_hearing_set() {
        let (mut ctx, rec) = make_recorded_ctx(1);
        let t = g_spawn(&mut ctx).unwrap();
        ctx.edicts[t].s.origin = [0.0, 0.0, 128.0];
        sp_target_explosion(&mut ctx, t);
        assert_eq!(ctx.edicts[t].svflags, SVF_NOCLIENT);
        rec.take();

        call_use(&mut ctx, t, 1, 1);

        let sent = multicasts(rec.take());
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].0,
            ServerMessage::TempEntity { kind: TE_EXPLOSION1, origin: [0.0, 0.0, 128.0] }
        );
        assert_eq!(sent[0].1, Multicast::Phs);
        assert_eq!(ctx.edicts[t].think_fn, None);
    }

    #[test]
    fn test_delayed_explosion_waits_for_think_then_fires_targets() {
        let (mut ctx, rec) = make_recorded_ctx(1);
        ctx.level.time = 2.0;
        ctx.edicts[1].inuse = true;
        let boom = g_spawn(&mut ctx).unwrap();
        ctx.edicts[boom].s.origin = [8.0, 8.0, 8.0];
        ctx.edicts[boom].delay = 0.5;
        ctx.edicts[boom].target = "fx".to_string();
        sp_target_explosion(&mut ctx, boom);

        let fx = g_spawn(&mut ctx).unwrap();
        ctx.edicts[fx].targetname = "fx".to_string();
        ctx.edicts[fx].s.origin = [100.0, 0.0, 0.0];
        ctx.edicts[fx].style = TE_SPLASH;
        sp_target_temp_entity(&mut ctx, fx);
        rec.take();

        call_use(&mut ctx, boom, 1, 1);
        assert!(multicasts(rec.take()).is_empty());
        assert_eq!(ctx.edicts[boom].think_fn, Some(THINK_TARGET_EXPLOSION));
        assert!((ctx.edicts[boom].nextthink - 2.5).abs() < 1e-6);
        assert_eq!(ctx.resolve(ctx.edicts[boom].activator), Some(1));

        call_think(&mut ctx, boom);

        let sent = multicasts(rec.take());
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].1, Multicast::Phs);
        assert_eq!(sent[0].2, [8.0, 8.0, 8.0]);
        assert_eq!(
            sent[1],
            (
                ServerMessage::TempEntity { kind: TE_SPLASH, origin: [100.0, 0.0, 0.0] },
                Multicast::Pvs,
                [100.0, 0.0, 0.0],
            )
        );
        // the delay survives for the next use
        assert_eq!(ctx.edicts[boom].delay, 0.5);
    }

    #[test]
    fn test_splash_sends_count_direction_and_color() {
        let (mut ctx, rec) = make_recorded_ctx(1);
        let t = g_spawn(&mut ctx).unwrap();
        ctx.edicts[t].s.origin = [1.0, 2.0, 3.0];
        ctx.edicts[t].s.angles = [0.0, -1.0, 0.0];
        ctx.edicts[t].sounds = SPLASH_BLUE_WATER;
        sp_target_splash(&mut ctx, t);
        assert_eq!(ctx.edicts[t].count, 32);
        assert_eq!(ctx.edicts[t].s.angles, [0.0; 3]);
        rec.take();

        call_use(&mut ctx, t, 1, 1);

        let sent = multicasts(rec.take());
        assert_eq!(
            sent,
            vec![(
                ServerMessage::Splash {
                    count: 32,
                    origin: [1.0, 2.0, 3.0],
                    dir: [0.0, 0.0, 1.0],
                    color: SPLASH_BLUE_WATER,
                },
                Multicast::Pvs,
                [1.0, 2.0, 3.0],
            )]
        );
    }
}
