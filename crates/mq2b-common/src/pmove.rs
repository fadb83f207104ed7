// pmove.rs — boundary of the player movement integrator
//
// The integrator itself lives in the host engine. The game module hands it a
// `PmoveData` plus collision callbacks, and reads the results back. Everything
// here is about agreeing on that contract: the callbacks and the fixed-point
// scale the integrator works in.

use crate::q_shared::{
    short2angle, PmoveData, Trace, Vec3, PITCH, PMF_TIME_TELEPORT, PMOVE_INV_SCALE, PMOVE_SCALE,
    ROLL, YAW,
};

// ============================================================
// Callbacks trait
// ============================================================

/// Trace and point-contents callbacks the integrator uses to resolve a step.
pub trait PmoveCallbacks {
    fn trace(&self, start: &Vec3, mins: &Vec3, maxs: &Vec3, end: &Vec3) -> Trace;
    fn pointcontents(&self, point: &Vec3) -> i32;
}

// ============================================================
// Fixed-point conversion
// ============================================================

/// World-space origin to the integrator's 1/8 unit grid.
pub fn origin_to_fixed(v: &Vec3) -> [i16; 3] {
    [
        (v[0] * PMOVE_SCALE) as i16,
        (v[1] * PMOVE_SCALE) as i16,
        (v[2] * PMOVE_SCALE) as i16,
    ]
}

/// World-space velocity to the integrator's 1/8 unit grid.
///
/// Goes through an `i32` first so an out-of-range speed wraps instead of
/// pinning at the `i16` limit.
pub fn velocity_to_fixed(v: &Vec3) -> [i16; 3] {
    [
        ((v[0] * PMOVE_SCALE) as i32) as i16,
        ((v[1] * PMOVE_SCALE) as i32) as i16,
        ((v[2] * PMOVE_SCALE) as i32) as i16,
    ]
}

/// Integrator grid back to world space.
pub fn fixed_to_world(s: &[i16; 3]) -> Vec3 {
    [
        s[0] as f32 * PMOVE_INV_SCALE,
        s[1] as f32 * PMOVE_INV_SCALE,
        s[2] as f32 * PMOVE_INV_SCALE,
    ]
}

// ============================================================
// View angle clamp
// ============================================================

/// Rebuild `viewangles` from the command angles and the stored deltas.
///
/// Pitch is kept within 89 degrees of level. While a teleport hold is active
/// only yaw follows the command.
pub fn clamp_angles(pm: &mut PmoveData) {
    if (pm.s.pm_flags & PMF_TIME_TELEPORT) != 0 {
        pm.viewangles[YAW] = short2angle(pm.cmd.angles[YAW].wrapping_add(pm.s.delta_angles[YAW]));
        pm.viewangles[PITCH] = 0.0;
        pm.viewangles[ROLL] = 0.0;
        return;
    }

    for i in 0..3 {
        let temp = pm.cmd.angles[i].wrapping_add(pm.s.delta_angles[i]);
        pm.viewangles[i] = short2angle(temp);
    }

    if pm.viewangles[PITCH] > 89.0 && pm.viewangles[PITCH] < 180.0 {
        pm.viewangles[PITCH] = 89.0;
    } else if pm.viewangles[PITCH] < 271.0 && pm.viewangles[PITCH] >= 180.0 {
        pm.viewangles[PITCH] = 271.0;
    }
}
