//! Linear per-block parameter ramps.

/*
Parameter Ramps
===============

A control change that lands on the audio all at once is a step, and a step
is a click. The stutter engine never applies a new duration, repeat count
or ratio directly. Instead each parameter is a ramp:

    current ──────────────▶ target
             increment × n

Once per block the engine asks every ramp for an increment spread across
the samples of that block:

    increment = (target - current) / block_size

and steps each ramp once per output sample. After exactly `block_size`
steps the ramp sits on its target (the last step snaps, so float drift
never leaves it a hair short).

Tolerance
---------

"Equal" means within a per-parameter tolerance. Without it, a duration that
differs from its target by 1e-4 samples would ramp forever. A set_target()
that lands within tolerance of the current value commits immediately: no
ramp, no increment.
*/

#[derive(Debug, Clone)]
pub struct ParamRamp {
    current: f32,
    target: f32,
    increment: f32,
    steps_remaining: u32,
    tolerance: f32,
}

impl ParamRamp {
    pub fn new(value: f32, tolerance: f32) -> Self {
        Self {
            current: value,
            target: value,
            increment: 0.0,
            steps_remaining: 0,
            tolerance: tolerance.abs(),
        }
    }

    /// Store a new target. A target within tolerance of `current` is committed at once.
    #[inline]
    pub fn set_target(&mut self, target: f32) {
        self.target = target;
        if self.approx_eq(self.current, target) {
            self.current = target;
            self.increment = 0.0;
            self.steps_remaining = 0;
        }
    }

    /// Jump straight to `value`, dropping any ramp in progress.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.increment = 0.0;
        self.steps_remaining = 0;
    }

    /// Spread the remaining distance over `samples` steps.
    ///
    /// Returns `true` when a ramp is armed.
    #[inline]
    pub fn compute_increment(&mut self, samples: usize) -> bool {
        if samples == 0 || self.approx_eq(self.current, self.target) {
            self.increment = 0.0;
            self.steps_remaining = 0;
            return false;
        }

        self.increment = (self.target - self.current) / samples as f32;
        self.steps_remaining = samples as u32;
        true
    }

    /// Advance one sample along the ramp. No-op once the ramp has landed.
    #[inline]
    pub fn step(&mut self) {
        if self.steps_remaining == 0 {
            return;
        }

        self.current += self.increment;
        self.steps_remaining -= 1;

        if self.steps_remaining == 0 {
            self.current = self.target;
        }
    }

    #[inline]
    pub fn current(&self) -> f32 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f32 {
        self.target
    }

    #[inline]
    pub fn increment(&self) -> f32 {
        self.increment
    }

    #[inline]
    pub fn is_ramping(&self) -> bool {
        self.steps_remaining > 0
    }

    #[inline]
    fn approx_eq(&self, a: f32, b: f32) -> bool {
        (a - b).abs() <= self.tolerance
    }
}
