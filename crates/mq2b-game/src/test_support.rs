// test_support.rs — shared fixtures for the game module tests

use std::sync::Arc;

use parking_lot::Mutex;

use mq2b_common::pmove::PmoveCallbacks;
use mq2b_common::q_shared::{PmoveData, Trace, Vec3};

use crate::g_local::{Edict, GameContext, GameCtx, GameCvars};
use crate::game::{Multicast, ServerMessage};
use crate::game_import::{GameImport, StubGameImport};

/// Route `tracing` output through the test harness. Safe to call from
/// every test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn cvars_for(num_clients: i32) -> GameCvars {
    GameCvars {
        maxclients: num_clients as f32,
        maxentities: 64.0,
        ..GameCvars::default()
    }
}

/// A world on the headless host with `num_clients` player slots.
pub fn make_ctx(num_clients: i32) -> GameContext {
    init_tracing();
    GameCtx::new(Box::new(StubGameImport::new()), cvars_for(num_clients))
}

/// A world whose host records every outbound call.
pub fn make_recorded_ctx(num_clients: i32) -> (GameContext, Arc<RecordingImport>) {
    init_tracing();
    let rec = Arc::new(RecordingImport::default());
    let ctx = GameCtx::new(Box::new(Arc::clone(&rec)), cvars_for(num_clients));
    (ctx, rec)
}

/// One observable host call.
#[derive(Debug, Clone, PartialEq)]
pub enum Recorded {
    Bprint(i32, String),
    Dprint(String),
    Sound { ent: i32, channel: i32, soundindex: i32 },
    Configstring(usize, String),
    Multicast { origin: Vec3, msg: ServerMessage, to: Multicast },
    Link(usize),
    Unlink(usize),
}

type PmoveScript = Box<dyn FnMut(&mut PmoveData) + Send>;

/// Headless host that logs what the game asks of it. Collision, linking and
/// cvars are delegated to [`StubGameImport`].
#[derive(Default)]
pub struct RecordingImport {
    inner: StubGameImport,
    pub log: Mutex<Vec<Recorded>>,
    /// Value returned by every `pointcontents` query.
    pub contents: Mutex<i32>,
    /// Replaces the stub integrator when set.
    pub pmove_script: Mutex<Option<PmoveScript>>,
}

impl RecordingImport {
    fn push(&self, r: Recorded) {
        self.log.lock().push(r);
    }

    pub fn take(&self) -> Vec<Recorded> {
        std::mem::take(&mut *self.log.lock())
    }

    pub fn sounds(&self) -> Vec<i32> {
        self.log
            .lock()
            .iter()
            .filter_map(|r| match r {
                Recorded::Sound { soundindex, .. } => Some(*soundindex),
                _ => None,
            })
            .collect()
    }

    pub fn set_pmove(&self, f: impl FnMut(&mut PmoveData) + Send + 'static) {
        *self.pmove_script.lock() = Some(Box::new(f));
    }
}

impl GameImport for Arc<RecordingImport> {
    fn bprintf(&self, printlevel: i32, msg: &str) {
        self.push(Recorded::Bprint(printlevel, msg.to_string()));
    }

    fn dprintf(&self, msg: &str) {
        self.push(Recorded::Dprint(msg.to_string()));
    }

    fn sound(&self, ent_idx: i32, channel: i32, soundindex: i32, _volume: f32, _attenuation: f32, _timeofs: f32) {
        self.push(Recorded::Sound {
            ent: ent_idx,
            channel,
            soundindex,
        });
    }

    fn configstring(&self, num: usize, string: &str) {
        self.push(Recorded::Configstring(num, string.to_string()));
    }

    fn modelindex(&self, name: &str) -> i32 {
        self.inner.modelindex(name)
    }

    fn soundindex(&self, name: &str) -> i32 {
        self.inner.soundindex(name)
    }

    fn trace(&self, start: &Vec3, mins: &Vec3, maxs: &Vec3, end: &Vec3, passent: i32, contentmask: i32) -> Trace {
        self.inner.trace(start, mins, maxs, end, passent, contentmask)
    }

    fn pointcontents(&self, _point: &Vec3) -> i32 {
        *self.contents.lock()
    }

    fn linkentity(&self, ent: &mut Edict) {
        self.push(Recorded::Link(ent.s.number as usize));
        self.inner.linkentity(ent);
    }

    fn unlinkentity(&self, ent: &mut Edict) {
        self.push(Recorded::Unlink(ent.s.number as usize));
        self.inner.unlinkentity(ent);
    }

    fn box_edicts(&self, mins: &Vec3, maxs: &Vec3, maxcount: usize, areatype: i32) -> Vec<usize> {
        self.inner.box_edicts(mins, maxs, maxcount, areatype)
    }

    fn multicast(&self, origin: &Vec3, msg: &ServerMessage, to: Multicast) {
        self.push(Recorded::Multicast {
            origin: *origin,
            msg: msg.clone(),
            to,
        });
    }

    fn pmove(&self, pm: &mut PmoveData, callbacks: &dyn PmoveCallbacks) {
        let mut script = self.pmove_script.lock();
        match script.as_mut() {
            Some(f) => f(pm),
            None => self.inner.pmove(pm, callbacks),
        }
    }

    fn cvar(&self, var_name: &str, value: &str, flags: i32) -> f32 {
        self.inner.cvar(var_name, value, flags)
    }

    fn cvar_string(&self, var_name: &str, value: &str, flags: i32) -> String {
        self.inner.cvar_string(var_name, value, flags)
    }

    fn cvar_set(&self, var_name: &str, value: &str) {
        self.inner.cvar_set(var_name, value);
    }
}
