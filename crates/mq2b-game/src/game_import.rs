//! Game import interface: services the host engine provides to the game.
//!
//! Every host call the simulation makes goes through [`GameImport`]. The
//! world holds it as a boxed trait object, so a host, a test harness or a
//! headless tool can each plug in their own.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use mq2b_common::cvar::CvarContext;
use mq2b_common::pmove::{clamp_angles, fixed_to_world, PmoveCallbacks};
use mq2b_common::q_shared::{
    CPlane, PmoveData, Trace, Vec3, AREA_SOLID, AREA_TRIGGERS, PMF_DUCKED, PMF_ON_GROUND,
};

use crate::g_local::Edict;
use crate::game::{Multicast, ServerMessage, Solid};

/// Game import interface: functions provided by the engine to the game module.
pub trait GameImport {
    // Printing
    fn bprintf(&self, printlevel: i32, msg: &str);
    fn dprintf(&self, msg: &str);

    // Sound
    fn sound(&self, ent_idx: i32, channel: i32, soundindex: i32, volume: f32, attenuation: f32, timeofs: f32);

    // Config
    fn configstring(&self, num: usize, string: &str);

    // Indexing
    fn modelindex(&self, name: &str) -> i32;
    fn soundindex(&self, name: &str) -> i32;

    // Collision
    fn trace(&self, start: &Vec3, mins: &Vec3, maxs: &Vec3, end: &Vec3, passent: i32, contentmask: i32) -> Trace;
    fn pointcontents(&self, point: &Vec3) -> i32;

    // Entity linking
    /// Insert or refresh an entity in the spatial index. Implementations must
    /// set the absolute bounds and bump `linkcount`; [`set_link_bounds`] does both.
    fn linkentity(&self, ent: &mut Edict);
    fn unlinkentity(&self, ent: &mut Edict);
    fn box_edicts(&self, mins: &Vec3, maxs: &Vec3, maxcount: usize, areatype: i32) -> Vec<usize>;

    // Network messaging
    fn multicast(&self, origin: &Vec3, msg: &ServerMessage, to: Multicast);

    // Movement integrator
    fn pmove(&self, pm: &mut PmoveData, callbacks: &dyn PmoveCallbacks);

    // Cvars
    fn cvar(&self, var_name: &str, value: &str, flags: i32) -> f32;
    fn cvar_string(&self, var_name: &str, value: &str, flags: i32) -> String;
    fn cvar_set(&self, var_name: &str, value: &str);
}

/// Absolute bounds and link counter update shared by every `linkentity`.
pub fn set_link_bounds(ent: &mut Edict) {
    for i in 0..3 {
        ent.size[i] = ent.maxs[i] - ent.mins[i];
        // expand for epsilon so touching boxes count as overlapping
        ent.absmin[i] = ent.s.origin[i] + ent.mins[i] - 1.0;
        ent.absmax[i] = ent.s.origin[i] + ent.maxs[i] + 1.0;
    }
    ent.linkcount += 1;
}

fn boxes_overlap(amin: &Vec3, amax: &Vec3, bmin: &Vec3, bmax: &Vec3) -> bool {
    (0..3).all(|i| amin[i] <= bmax[i] && amax[i] >= bmin[i])
}

// ============================================================
// StubGameImport
// ============================================================

#[derive(Debug, Clone, Copy)]
struct LinkedBox {
    absmin: Vec3,
    absmax: Vec3,
    solid: Solid,
}

/// Headless host: an in-memory cvar registry, a flat spatial index over
/// linked entity boxes, and no world geometry.
///
/// Traces only collide with linked boxes and test the end position only; a
/// blocked sweep stays at its start. `pmove` leaves the player where it is
/// apart from angle clamping and a ground check.
#[derive(Debug, Default)]
pub struct StubGameImport {
    cvars: Mutex<CvarContext>,
    links: Mutex<BTreeMap<usize, LinkedBox>>,
    sounds: Mutex<Vec<String>>,
    models: Mutex<Vec<String>>,
}

impl StubGameImport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities currently in the spatial index.
    pub fn linked_count(&self) -> usize {
        self.links.lock().len()
    }

    fn register(list: &Mutex<Vec<String>>, name: &str) -> i32 {
        let mut list = list.lock();
        let pos = match list.iter().position(|n| n == name) {
            Some(pos) => pos,
            None => {
                list.push(name.to_string());
                list.len() - 1
            }
        };
        // index 0 means "none"
        pos as i32 + 1
    }
}

impl GameImport for StubGameImport {
    fn bprintf(&self, printlevel: i32, msg: &str) {
        tracing::info!(target: "console", printlevel, "{}", msg.trim_end());
    }

    fn dprintf(&self, msg: &str) {
        tracing::debug!(target: "console", "{}", msg.trim_end());
    }

    fn sound(&self, ent_idx: i32, channel: i32, soundindex: i32, _volume: f32, _attenuation: f32, _timeofs: f32) {
        tracing::trace!(ent_idx, channel, soundindex, "sound");
    }

    fn configstring(&self, num: usize, string: &str) {
        tracing::trace!(num, string, "configstring");
    }

    fn modelindex(&self, name: &str) -> i32 {
        Self::register(&self.models, name)
    }

    fn soundindex(&self, name: &str) -> i32 {
        Self::register(&self.sounds, name)
    }

    fn trace(&self, start: &Vec3, mins: &Vec3, maxs: &Vec3, end: &Vec3, passent: i32, _contentmask: i32) -> Trace {
        let mut bmin = [0.0; 3];
        let mut bmax = [0.0; 3];
        for i in 0..3 {
            bmin[i] = end[i] + mins[i];
            bmax[i] = end[i] + maxs[i];
        }

        let links = self.links.lock();
        let hit = links.iter().find(|&(&idx, link)| {
            idx as i32 != passent
                && matches!(link.solid, Solid::Bbox | Solid::Bsp)
                && boxes_overlap(&bmin, &bmax, &link.absmin, &link.absmax)
        });

        match hit {
            Some((&idx, link)) => {
                // a box that started on top of the blocker landed on it
                let mut plane = CPlane::default();
                if start[2] + mins[2] >= link.absmax[2] {
                    plane.normal = [0.0, 0.0, 1.0];
                }
                Trace {
                    startsolid: true,
                    fraction: 0.0,
                    endpos: *start,
                    plane,
                    ent_index: idx as i32,
                    ..Trace::default()
                }
            }
            None => Trace {
                endpos: *end,
                ..Trace::default()
            },
        }
    }

    fn pointcontents(&self, _point: &Vec3) -> i32 {
        0
    }

    fn linkentity(&self, ent: &mut Edict) {
        set_link_bounds(ent);
        self.links.lock().insert(
            ent.s.number as usize,
            LinkedBox {
                absmin: ent.absmin,
                absmax: ent.absmax,
                solid: ent.solid,
            },
        );
    }

    fn unlinkentity(&self, ent: &mut Edict) {
        self.links.lock().remove(&(ent.s.number as usize));
    }

    fn box_edicts(&self, mins: &Vec3, maxs: &Vec3, maxcount: usize, areatype: i32) -> Vec<usize> {
        let links = self.links.lock();
        links
            .iter()
            .filter(|(_, link)| match areatype {
                AREA_TRIGGERS => link.solid == Solid::Trigger,
                AREA_SOLID => matches!(link.solid, Solid::Bbox | Solid::Bsp),
                _ => false,
            })
            .filter(|(_, link)| boxes_overlap(mins, maxs, &link.absmin, &link.absmax))
            .map(|(&idx, _)| idx)
            .take(maxcount)
            .collect()
    }

    fn multicast(&self, origin: &Vec3, msg: &ServerMessage, to: Multicast) {
        tracing::trace!(?origin, ?msg, ?to, "multicast");
    }

    fn pmove(&self, pm: &mut PmoveData, callbacks: &dyn PmoveCallbacks) {
        clamp_angles(pm);

        pm.mins = [-16.0, -16.0, -24.0];
        if pm.s.pm_flags & PMF_DUCKED != 0 {
            pm.maxs = [16.0, 16.0, 4.0];
            pm.viewheight = -2.0;
        } else {
            pm.maxs = [16.0, 16.0, 32.0];
            pm.viewheight = 22.0;
        }

        // trace a quarter unit below the feet
        let origin = fixed_to_world(&pm.s.origin);
        let below = [origin[0], origin[1], origin[2] - 0.25];
        let trace = callbacks.trace(&origin, &pm.mins, &pm.maxs, &below);
        if trace.fraction < 1.0 && trace.ent_index >= 0 {
            pm.groundentity = trace.ent_index;
            pm.s.pm_flags |= PMF_ON_GROUND;
        } else {
            pm.groundentity = -1;
            pm.s.pm_flags &= !PMF_ON_GROUND;
        }
        pm.waterlevel = 0;
        pm.watertype = callbacks.pointcontents(&origin);
    }

    fn cvar(&self, var_name: &str, value: &str, flags: i32) -> f32 {
        let mut cvars = self.cvars.lock();
        cvars.get(var_name, value, flags).map_or(0.0, |v| v.value)
    }

    fn cvar_string(&self, var_name: &str, value: &str, flags: i32) -> String {
        let mut cvars = self.cvars.lock();
        cvars.get(var_name, value, flags).map(|v| v.string.clone()).unwrap_or_default()
    }

    fn cvar_set(&self, var_name: &str, value: &str) {
        self.cvars.lock().set(var_name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(number: i32, origin: Vec3, solid: Solid) -> Edict {
        let mut ent = Edict::default();
        ent.s.number = number;
        ent.s.origin = origin;
        ent.mins = [-16.0, -16.0, -24.0];
        ent.maxs = [16.0, 16.0, 32.0];
        ent.solid = solid;
        ent
    }

    #[test]
    fn test_linkentity_sets_bounds_and_linkcount() {
        let gi = StubGameImport::new();
        let mut ent = boxed(3, [100.0, 0.0, 0.0], Solid::Bbox);
        gi.linkentity(&mut ent);
        assert_eq!(ent.linkcount, 1);
        assert_eq!(ent.absmin, [83.0, -17.0, -25.0]);
        assert_eq!(ent.size, [32.0, 32.0, 56.0]);
        gi.linkentity(&mut ent);
        assert_eq!(ent.linkcount, 2);
        assert_eq!(gi.linked_count(), 1);
        gi.unlinkentity(&mut ent);
        assert_eq!(gi.linked_count(), 0);
    }

    #[test]
    fn test_box_edicts_filters_by_area() {
        let gi = StubGameImport::new();
        let mut trigger = boxed(5, [0.0; 3], Solid::Trigger);
        let mut solid = boxed(6, [0.0; 3], Solid::Bbox);
        let mut far = boxed(7, [500.0, 0.0, 0.0], Solid::Trigger);
        gi.linkentity(&mut trigger);
        gi.linkentity(&mut solid);
        gi.linkentity(&mut far);

        let mins = [-8.0; 3];
        let maxs = [8.0; 3];
        assert_eq!(gi.box_edicts(&mins, &maxs, 16, AREA_TRIGGERS), vec![5]);
        assert_eq!(gi.box_edicts(&mins, &maxs, 16, AREA_SOLID), vec![6]);
    }

    #[test]
    fn test_trace_hits_linked_solid_but_not_passent() {
        let gi = StubGameImport::new();
        let mut blocker = boxed(2, [0.0; 3], Solid::Bbox);
        gi.linkentity(&mut blocker);

        let mins = [-16.0, -16.0, -24.0];
        let maxs = [16.0, 16.0, 32.0];
        let tr = gi.trace(&[0.0; 3], &mins, &maxs, &[0.0; 3], 1, 0);
        assert_eq!(tr.ent_index, 2);
        assert!(tr.startsolid);

        let tr = gi.trace(&[0.0; 3], &mins, &maxs, &[0.0; 3], 2, 0);
        assert_eq!(tr.ent_index, -1);
        assert_eq!(tr.fraction, 1.0);
    }

    #[test]
    fn test_soundindex_is_stable() {
        let gi = StubGameImport::new();
        let a = gi.soundindex("player/fry.wav");
        let b = gi.soundindex("*jump1.wav");
        assert_ne!(a, b);
        assert_eq!(gi.soundindex("player/fry.wav"), a);
        assert!(a > 0);
    }

    #[test]
    fn test_cvar_registers_default() {
        let gi = StubGameImport::new();
        assert_eq!(gi.cvar("sv_gravity", "800", 0), 800.0);
        gi.cvar_set("sv_gravity", "400");
        assert_eq!(gi.cvar("sv_gravity", "800", 0), 400.0);
        assert_eq!(gi.cvar_string("password", "", 0), "");
    }
}
