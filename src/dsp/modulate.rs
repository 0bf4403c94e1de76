//! LFO → stutter parameter routing.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{dsp::lfo::unipolar_to_bipolar, MAX_RATIO, MIN_RATIO};

/*
Modulation Routing
==================

One LFO value per block drives three stutter parameters. Each parameter has
a depth in [0, 1] and an ORIGINAL value: what the user set before the LFO
took over. The LFO moves the parameter around its original, and disarming
the LFO puts the original back.

The Formulas
------------

With LFO value v in [0, 1], depth d, original o:

  duration   max(v·d·o + o·(1 - d), floor)

             d = 0 → o (untouched). d = 1 → v·o, sweeping from the floor
             up to the original. The floor (10 ms) keeps the snapshot long
             enough to hold its fades.

  repeats    max(v·d·o, 1)

             Scales down from d·o. Never fewer than one play.

  ratio      clamp(o + (2v - 1)·d, -2, 2)

             Bipolar swing of ±d around the original. The swing may cross
             zero (forward ↔ reverse); a magnitude below 0.1 is pushed
             back out to 0.1 with the same sign, because a ratio of 0 has
             no defined playback rate.

Arming
------

  disabled ──arm──▶ armed     originals captured from the current targets
  armed ──disarm──▶ disabled  originals written back as targets

While armed, a user edit of a parameter becomes its new original. A depth
dropped to 0 while armed hands the parameter back at its original.

Targets are pushed once per block. The stutter engine ramps toward them
per sample, so a square-wave LFO still lands without clicks.
*/

/// The three stutter parameters the LFO can drive.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StutterParam {
    /// Loop length in samples
    Duration,
    /// Plays per snapshot before recapture
    Repeats,
    /// Stretch ratio; the sign picks the direction
    Ratio,
}

impl StutterParam {
    pub const ALL: [StutterParam; 3] = [
        StutterParam::Duration,
        StutterParam::Repeats,
        StutterParam::Ratio,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            StutterParam::Duration => 0,
            StutterParam::Repeats => 1,
            StutterParam::Ratio => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StutterParam::Duration => "duration",
            StutterParam::Repeats => "repeats",
            StutterParam::Ratio => "ratio",
        }
    }
}

/// Something whose parameters the router can read and retarget.
pub trait Modulatable {
    type Param: Copy;

    /// The value the parameter is heading to (its target, not its ramp position).
    fn get_param(&self, param: Self::Param) -> f32;

    /// Push a new target. The implementor clamps to its own valid range.
    fn set_param(&mut self, param: Self::Param, value: f32);
}

/// Depth and centre value for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModulationSlot {
    pub depth: f32,
    pub original: f32,
}

pub struct ModulationRouter {
    slots: [ModulationSlot; 3],
    armed: bool,
    duration_floor: f32,
}

impl ModulationRouter {
    /// `duration_floor` is the shortest duration (in samples) modulation may produce.
    pub fn new(duration_floor: f32) -> Self {
        Self {
            slots: [ModulationSlot {
                depth: 0.0,
                original: 0.0,
            }; 3],
            armed: false,
            duration_floor,
        }
    }

    pub fn set_duration_floor(&mut self, floor: f32) {
        self.duration_floor = floor;
    }

    /// Capture the originals. Only the disabled → enabled transition captures.
    pub fn arm<M: Modulatable<Param = StutterParam>>(&mut self, target: &M) {
        if self.armed {
            return;
        }
        for param in StutterParam::ALL {
            self.slots[param.index()].original = target.get_param(param);
        }
        self.armed = true;
        log::debug!(
            "modulation armed around duration={} repeats={} ratio={}",
            self.original(StutterParam::Duration),
            self.original(StutterParam::Repeats),
            self.original(StutterParam::Ratio)
        );
    }

    /// Hand every parameter back at its original value.
    pub fn disarm<M: Modulatable<Param = StutterParam>>(&mut self, target: &mut M) {
        if !self.armed {
            return;
        }
        for param in StutterParam::ALL {
            target.set_param(param, self.original(param));
        }
        self.armed = false;
        log::debug!("modulation disarmed, originals restored");
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn set_depth<M: Modulatable<Param = StutterParam>>(
        &mut self,
        param: StutterParam,
        depth: f32,
        target: &mut M,
    ) {
        let depth = depth.clamp(0.0, 1.0);
        let slot = &mut self.slots[param.index()];
        let released = slot.depth > 0.0 && depth == 0.0;
        slot.depth = depth;

        if released && self.armed {
            target.set_param(param, slot.original);
        }
    }

    /// A user edit while armed moves the centre the LFO swings around.
    pub fn set_original(&mut self, param: StutterParam, value: f32) {
        self.slots[param.index()].original = value;
    }

    #[inline]
    pub fn depth(&self, param: StutterParam) -> f32 {
        self.slots[param.index()].depth
    }

    #[inline]
    pub fn original(&self, param: StutterParam) -> f32 {
        self.slots[param.index()].original
    }

    pub fn slot(&self, param: StutterParam) -> ModulationSlot {
        self.slots[param.index()]
    }

    /// Push modulated targets for every parameter with a non-zero depth.
    pub fn route<M: Modulatable<Param = StutterParam>>(&self, lfo_value: f32, target: &mut M) {
        if !self.armed {
            return;
        }

        for param in StutterParam::ALL {
            let ModulationSlot { depth, original } = self.slots[param.index()];
            if depth <= 0.0 {
                continue;
            }

            let value = match param {
                StutterParam::Duration => {
                    modulated_duration(lfo_value, depth, original, self.duration_floor)
                }
                StutterParam::Repeats => modulated_repeats(lfo_value, depth, original),
                StutterParam::Ratio => modulated_ratio(lfo_value, depth, original),
            };
            target.set_param(param, value);
        }
    }
}

/// `max(v·d·o + o·(1 - d), floor)`
#[inline]
pub fn modulated_duration(lfo: f32, depth: f32, original: f32, floor: f32) -> f32 {
    (lfo * depth * original + original * (1.0 - depth)).max(floor)
}

/// `max(v·d·o, 1)`
#[inline]
pub fn modulated_repeats(lfo: f32, depth: f32, original: f32) -> f32 {
    (lfo * depth * original).max(1.0)
}

/// `clamp(o + (2v - 1)·d, -2, 2)`, magnitude kept at or above `MIN_RATIO`.
#[inline]
pub fn modulated_ratio(lfo: f32, depth: f32, original: f32) -> f32 {
    let ratio = (original + unipolar_to_bipolar(lfo) * depth).clamp(-MAX_RATIO, MAX_RATIO);
    away_from_zero(ratio, original)
}

/// Push `ratio` out to `MIN_RATIO` magnitude, keeping its sign (or `fallback`'s when 0).
#[inline]
pub fn away_from_zero(ratio: f32, fallback: f32) -> f32 {
    if ratio.abs() >= MIN_RATIO {
        return ratio;
    }
    let sign = if ratio != 0.0 {
        ratio.signum()
    } else if fallback < 0.0 {
        -1.0
    } else {
        1.0
    };
    MIN_RATIO * sign
}
