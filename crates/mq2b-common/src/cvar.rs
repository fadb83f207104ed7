// cvar.rs — console variable registry
//
// A plain name -> value table. Hosts that need to share it across threads wrap
// it in a lock; the registry itself carries no global state.

use crate::q_shared::{info_validate, CVAR_LATCH, CVAR_NOSET, CVAR_SERVERINFO, CVAR_USERINFO};

use std::collections::HashMap;

/// A console variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Cvar {
    pub name: String,
    pub string: String,
    pub latched_string: Option<String>,
    pub flags: i32,
    pub modified: bool,
    pub value: f32,
}

impl Cvar {
    fn assign(&mut self, value: &str) {
        self.string = value.to_string();
        self.value = parse_value(value);
        self.modified = true;
    }
}

/// Numeric view of a cvar string; anything unparsable reads as zero.
fn parse_value(s: &str) -> f32 {
    s.trim().parse::<f32>().unwrap_or(0.0)
}

#[derive(Debug, Default)]
pub struct CvarContext {
    cvar_vars: Vec<Cvar>,
    cvar_index: HashMap<String, usize>,
    pub userinfo_modified: bool,
}

impl CvarContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_var(&self, name: &str) -> Option<&Cvar> {
        self.cvar_index.get(name).map(|&idx| &self.cvar_vars[idx])
    }

    fn find_var_mut(&mut self, name: &str) -> Option<&mut Cvar> {
        let idx = *self.cvar_index.get(name)?;
        self.cvar_vars.get_mut(idx)
    }

    /// Float value of a cvar, 0 if it does not exist.
    pub fn variable_value(&self, name: &str) -> f32 {
        self.find_var(name).map_or(0.0, |v| v.value)
    }

    /// String value of a cvar, "" if it does not exist.
    pub fn variable_string(&self, name: &str) -> &str {
        self.find_var(name).map_or("", |v| v.string.as_str())
    }

    /// Get or create a cvar. An existing variable keeps its value but picks up
    /// the new flags.
    pub fn get(&mut self, name: &str, value: &str, flags: i32) -> Option<&Cvar> {
        if flags & (CVAR_USERINFO | CVAR_SERVERINFO) != 0
            && (!info_validate(name) || !info_validate(value))
        {
            tracing::warn!(cvar = name, "invalid info cvar");
            return None;
        }

        if let Some(&idx) = self.cvar_index.get(name) {
            self.cvar_vars[idx].flags |= flags;
            return self.cvar_vars.get(idx);
        }

        let idx = self.cvar_vars.len();
        self.cvar_vars.push(Cvar {
            name: name.to_string(),
            string: value.to_string(),
            latched_string: None,
            flags,
            modified: true,
            value: parse_value(value),
        });
        self.cvar_index.insert(name.to_string(), idx);
        self.cvar_vars.get(idx)
    }

    fn set2(&mut self, name: &str, value: &str, force: bool) {
        if self.find_var(name).is_none() {
            self.get(name, value, 0);
            return;
        }
        let Some(var) = self.find_var_mut(name) else {
            return;
        };

        if var.flags & (CVAR_USERINFO | CVAR_SERVERINFO) != 0 && !info_validate(value) {
            tracing::warn!(cvar = name, "invalid info cvar value");
            return;
        }

        if !force {
            if var.flags & CVAR_NOSET != 0 {
                tracing::warn!(cvar = name, "cvar is write protected");
                return;
            }
            if var.flags & CVAR_LATCH != 0 {
                let current = var.latched_string.as_deref().unwrap_or(&var.string);
                if current != value {
                    tracing::info!(cvar = name, value, "cvar will be changed for next game");
                    var.latched_string = Some(value.to_string());
                }
                return;
            }
        } else {
            var.latched_string = None;
        }

        if var.string == value {
            return;
        }

        let userinfo = var.flags & CVAR_USERINFO != 0;
        var.assign(value);
        if userinfo {
            self.userinfo_modified = true;
        }
    }

    /// Set a cvar value (respects NOSET and LATCH).
    pub fn set(&mut self, name: &str, value: &str) {
        self.set2(name, value, false);
    }

    /// Set a cvar value, ignoring NOSET and LATCH.
    pub fn force_set(&mut self, name: &str, value: &str) {
        self.set2(name, value, true);
    }

    /// Apply all latched changes, as on a map restart.
    pub fn get_latched_vars(&mut self) {
        for var in &mut self.cvar_vars {
            if let Some(latched) = var.latched_string.take() {
                var.assign(&latched);
            }
        }
    }

    /// Report and clear the modified flag of one variable.
    pub fn take_modified(&mut self, name: &str) -> bool {
        self.find_var_mut(name)
            .map(|v| std::mem::replace(&mut v.modified, false))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_creates_once() {
        let mut cvars = CvarContext::new();
        cvars.get("sv_gravity", "800", 0);
        cvars.get("sv_gravity", "100", CVAR_SERVERINFO);
        assert_eq!(cvars.variable_value("sv_gravity"), 800.0);
        assert_eq!(cvars.find_var("sv_gravity").map(|v| v.flags), Some(CVAR_SERVERINFO));
    }

    #[test]
    fn test_set_updates_value_and_modified() {
        let mut cvars = CvarContext::new();
        cvars.get("run_pitch", "0.002", 0);
        assert!(cvars.take_modified("run_pitch"));
        cvars.set("run_pitch", "0.01");
        assert!((cvars.variable_value("run_pitch") - 0.01).abs() < 1e-6);
        assert!(cvars.take_modified("run_pitch"));
        assert!(!cvars.take_modified("run_pitch"));
    }

    #[test]
    fn test_noset_blocks_plain_set() {
        let mut cvars = CvarContext::new();
        cvars.get("gamename", "mq2b", CVAR_NOSET);
        cvars.set("gamename", "other");
        assert_eq!(cvars.variable_string("gamename"), "mq2b");
        cvars.force_set("gamename", "other");
        assert_eq!(cvars.variable_string("gamename"), "other");
    }

    #[test]
    fn test_latch_applies_on_restart() {
        let mut cvars = CvarContext::new();
        cvars.get("maxclients", "4", CVAR_LATCH);
        cvars.set("maxclients", "8");
        assert_eq!(cvars.variable_value("maxclients"), 4.0);
        cvars.get_latched_vars();
        assert_eq!(cvars.variable_value("maxclients"), 8.0);
    }

    #[test]
    fn test_unparsable_value_reads_zero() {
        let mut cvars = CvarContext::new();
        cvars.get("password", "hunter2", 0);
        assert_eq!(cvars.variable_value("password"), 0.0);
        assert_eq!(cvars.variable_string("missing"), "");
    }
}
