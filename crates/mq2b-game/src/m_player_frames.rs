// m_player_frames.rs — player model animation sequences
//
// Copyright (C) 1997-2001 Id Software, Inc.
// Licensed under the GNU General Public License v2

/// First and last frame of one sequence in the player model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRange {
    pub first: i32,
    pub last: i32,
}

impl FrameRange {
    pub const fn contains(&self, frame: i32) -> bool {
        frame >= self.first && frame <= self.last
    }
}

pub const STAND: FrameRange = FrameRange { first: 0, last: 39 };
pub const RUN: FrameRange = FrameRange { first: 40, last: 45 };
pub const PAIN1: FrameRange = FrameRange { first: 54, last: 57 };

/// Takeoff and hang frames while airborne.
pub const JUMP: FrameRange = FrameRange { first: 66, last: 67 };
/// Landing frames, played once ground is reached.
pub const LAND: FrameRange = FrameRange { first: 68, last: 71 };

pub const WAVE: FrameRange = FrameRange { first: 112, last: 122 };
pub const CROUCH_STAND: FrameRange = FrameRange { first: 135, last: 153 };
pub const CROUCH_WALK: FrameRange = FrameRange { first: 154, last: 159 };
pub const DEATH1: FrameRange = FrameRange { first: 178, last: 183 };
