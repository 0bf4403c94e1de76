//! The stutter engine: continuous capture, frozen snapshot, looped playback.

use crate::{
    config::{min_duration_samples, validate_layout, ConfigError},
    dsp::{
        modulate::{away_from_zero, Modulatable, StutterParam},
        ramp::ParamRamp,
        ring::RingBuffer,
    },
    FADE_SAMPLES, MAX_RATIO, MIN_RATIO, RING_HISTORY_FACTOR,
};

/*
Stutter Buffer
==============

Two buffers, one cursor each:

  ring      Everything that comes in, always. Four maximum stutters of
            history, written at `write_pos` and wrapping forever.

  snapshot  One frozen loop, copied out of the ring (the newest `duration`
            frames). Every later block appends what arrived after the
            capture point until the lane holds `max_duration` frames, so a
            loop that grows plays on into real audio instead of silence.

    ring:      ... ───────────────────────────────▶ write_pos
                              └──── duration ────┘
                                        │ copy, then append
    snapshot:  [ captured ............. | later blocks ...... ]

The samples are stored raw. Fades are applied on read, relative to the
duration in force at that frame, so they always sit at the loop's edges:

    gain(x) = min(x, duration - 1 - x) / fade        clamped to 1


State Machine
-------------

    ┌────────┐ enable  ┌───────────┐ copy  ┌─────────┐
    │ Bypass │───────▶ │ Capturing │─────▶ │ Looping │◀─┐ recapture
    └────────┘         └───────────┘       └─────────┘──┘ (request or
         ▲   disable         │ disable          │          repeats done)
         └───────────────────┴──────────────────┘

Bypass still writes the ring, so a snapshot is ready the instant the
stutter is enabled. In Bypass the block passes through untouched.

Capturing happens at the top of a block, after the ring write, and that
same block is already rendered from the new snapshot. Its first output
frame is the snapshot's faded-in start.


Reading the Snapshot
--------------------

`read_index` counts OUTPUT samples into the current loop iteration. The
snapshot position it maps to is stretched by the ratio:

    position = read_index / |ratio|

    ratio  2.0   half speed, the loop plays the first half of the window
    ratio  0.5   double speed, the loop holds the last sample once the
                 window runs out (which the fade-out has taken to 0)
    ratio -1.0   reverse: indices mirror to (duration - 1 - idx)

Positions are fractional, so we interpolate linearly between the floor and
ceiling samples.


Loop Seams
----------

The last `fade` output samples of every iteration except the final one
blend toward the start of the next iteration:

    t    = (read_index - (duration - fade)) / fade       0 → 1
    out  = main · (1 - t) + seam · t

where `seam` reads the snapshot at the position the next iteration starts
from. When the iteration ends, `read_index` jumps to `fade` (just past the
fade-in), exactly where the seam read had got to, so the handover is
continuous at any ratio.

The final iteration before a recapture blends toward silence instead:

    out  = main · (1 - t)

At |ratio| > 1 that tail is still mid-snapshot at full level, so the read
fades alone would not reach 0. The fresh snapshot then starts from 0.


Parameter Changes
-----------------

Duration, repeats and ratio are ParamRamps. Targets may change at any time;
at the top of each block every ramp computes an increment spread over the
block, then all three step once per output frame. While the stutter is not
looping, new values commit immediately: there is nothing audible to smooth.

Everything here is allocation-free after `configure`.
*/

/// Ramps closer than this (in samples) are considered arrived.
const DURATION_TOLERANCE: f32 = 0.5;
const REPEATS_TOLERANCE: f32 = 1e-3;
const RATIO_TOLERANCE: f32 = 1e-3;

const DEFAULT_REPEATS: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StutterState {
    Bypass,    // Capture only, input passes through
    Capturing, // Enabled, no valid snapshot yet
    Looping,   // Replaying the snapshot
}

pub struct StutterBuffer {
    ring: RingBuffer,
    snapshot: Box<[f32]>, // planar, `max_duration` frames per channel
    snapshot_len: usize,  // frames captured plus frames appended since

    channels: usize,
    sample_rate: f32,
    max_duration: usize,
    min_duration: usize,

    state: StutterState,
    recapture_pending: bool,

    duration: ParamRamp, // samples
    repeats: ParamRamp,
    ratio: ParamRamp,

    read_index: usize,
    repeat_counter: u32,

    capture_count: u64,
    wrap_count: u64,
}

impl StutterBuffer {
    /// Allocate buffers for `channels` × `max_duration_samples` (the ring gets four times that).
    ///
    /// The duration starts at the maximum, with 3 repeats at ratio 1.
    pub fn new(
        channels: usize,
        sample_rate: f32,
        max_duration_samples: usize,
    ) -> Result<Self, ConfigError> {
        let min_duration = Self::check_layout(channels, sample_rate, max_duration_samples)?;

        Ok(Self {
            ring: RingBuffer::new(channels, max_duration_samples * RING_HISTORY_FACTOR),
            snapshot: vec![0.0; channels * max_duration_samples].into_boxed_slice(),
            snapshot_len: 0,
            channels,
            sample_rate,
            max_duration: max_duration_samples,
            min_duration,
            state: StutterState::Bypass,
            recapture_pending: false,
            duration: ParamRamp::new(max_duration_samples as f32, DURATION_TOLERANCE),
            repeats: ParamRamp::new(DEFAULT_REPEATS, REPEATS_TOLERANCE),
            ratio: ParamRamp::new(1.0, RATIO_TOLERANCE),
            read_index: 0,
            repeat_counter: 0,
            capture_count: 0,
            wrap_count: 0,
        })
    }

    /// Resize for a new format and clear to silence. Not realtime-safe.
    ///
    /// An enabled stutter drops its snapshot and captures again on the next block.
    pub fn configure(
        &mut self,
        channels: usize,
        sample_rate: f32,
        max_duration_samples: usize,
    ) -> Result<(), ConfigError> {
        let min_duration = Self::check_layout(channels, sample_rate, max_duration_samples)?;

        let ring_capacity = max_duration_samples * RING_HISTORY_FACTOR;
        if channels != self.ring.channels() || ring_capacity != self.ring.capacity() {
            self.ring = RingBuffer::new(channels, ring_capacity);
        } else {
            self.ring.clear();
        }

        let snapshot_size = channels * max_duration_samples;
        if snapshot_size != self.snapshot.len() {
            self.snapshot = vec![0.0; snapshot_size].into_boxed_slice();
        } else {
            self.snapshot.fill(0.0);
        }

        self.channels = channels;
        self.sample_rate = sample_rate;
        self.max_duration = max_duration_samples;
        self.min_duration = min_duration;
        self.snapshot_len = 0;
        self.read_index = 0;
        self.repeat_counter = 0;
        self.recapture_pending = false;

        let duration = self.clamp_duration(self.duration.target());
        self.duration.set_immediate(duration);
        self.repeats.set_immediate(self.repeats.target());
        self.ratio.set_immediate(self.ratio.target());

        if self.state != StutterState::Bypass {
            self.state = StutterState::Capturing;
        }

        log::info!(
            "stutter buffer configured: {} ch @ {} Hz, max {} samples (ring {})",
            channels,
            sample_rate,
            max_duration_samples,
            ring_capacity
        );
        Ok(())
    }

    fn check_layout(
        channels: usize,
        sample_rate: f32,
        max_duration_samples: usize,
    ) -> Result<usize, ConfigError> {
        validate_layout(channels, sample_rate)?;
        let min = min_duration_samples(sample_rate);
        if max_duration_samples < min {
            return Err(ConfigError::MaxDurationTooShort {
                max: max_duration_samples,
                min,
            });
        }
        Ok(min)
    }

    /// Process one interleaved block in place.
    pub fn process(&mut self, block: &mut [f32]) {
        let frames = block.len() / self.channels;
        if frames == 0 {
            return;
        }

        // Capture first so a fresh snapshot includes this block
        self.ring.write_interleaved(block);

        if self.state == StutterState::Looping && !self.recapture_pending {
            self.extend_snapshot(frames);
        }

        match self.state {
            StutterState::Bypass => return,
            StutterState::Capturing => self.capture(),
            StutterState::Looping if self.recapture_pending => self.capture(),
            StutterState::Looping => {}
        }

        let ramping = self.compute_ramps(frames);

        for frame in block.chunks_exact_mut(self.channels) {
            if ramping {
                self.step_ramps();
            }
            self.render_frame(frame);
            self.advance_read_index();
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        match (enabled, self.state) {
            (true, StutterState::Bypass) => self.state = StutterState::Capturing,
            (false, _) => {
                self.state = StutterState::Bypass;
                self.recapture_pending = false;
            }
            _ => {}
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.state != StutterState::Bypass
    }

    /// Freeze a fresh snapshot at the start of the next block.
    pub fn request_recapture(&mut self) {
        if self.state == StutterState::Looping {
            self.recapture_pending = true;
        }
    }

    /// Target duration in samples, clamped to `[min, max]`.
    pub fn set_duration_samples(&mut self, samples: f32) {
        let samples = self.clamp_duration(samples);
        self.retarget(StutterParam::Duration, samples);
    }

    /// Target repeat count, floored at 1. Fractional counts round when compared.
    pub fn set_repeats(&mut self, repeats: f32) {
        self.retarget(StutterParam::Repeats, repeats.max(1.0));
    }

    /// Target stretch ratio, clamped to ±`MAX_RATIO`. Negative plays in reverse.
    pub fn set_ratio(&mut self, ratio: f32) {
        let ratio = away_from_zero(ratio.clamp(-MAX_RATIO, MAX_RATIO), self.ratio.target());
        self.retarget(StutterParam::Ratio, ratio);
    }

    fn retarget(&mut self, param: StutterParam, value: f32) {
        let looping = self.state == StutterState::Looping;
        let ramp = self.ramp_mut(param);
        if looping {
            ramp.set_target(value);
        } else {
            ramp.set_immediate(value);
        }
    }

    pub fn ramp(&self, param: StutterParam) -> &ParamRamp {
        match param {
            StutterParam::Duration => &self.duration,
            StutterParam::Repeats => &self.repeats,
            StutterParam::Ratio => &self.ratio,
        }
    }

    fn ramp_mut(&mut self, param: StutterParam) -> &mut ParamRamp {
        match param {
            StutterParam::Duration => &mut self.duration,
            StutterParam::Repeats => &mut self.repeats,
            StutterParam::Ratio => &mut self.ratio,
        }
    }

    #[inline]
    fn clamp_duration(&self, samples: f32) -> f32 {
        samples.clamp(self.min_duration as f32, self.max_duration as f32)
    }

    /// Loop length in samples at the current ramp position.
    #[inline]
    pub fn duration_samples(&self) -> usize {
        (self.duration.current().round() as usize).clamp(self.min_duration, self.max_duration)
    }

    /// Whole plays per snapshot at the current ramp position.
    #[inline]
    pub fn repeat_limit(&self) -> u32 {
        self.repeats.current().round().max(1.0) as u32
    }

    #[inline]
    pub fn ratio(&self) -> f32 {
        self.ratio.current()
    }

    #[inline]
    fn fade_len(len: usize) -> usize {
        FADE_SAMPLES.min(len / 2)
    }

    fn compute_ramps(&mut self, frames: usize) -> bool {
        // Non-short-circuit: every ramp needs its increment
        self.duration.compute_increment(frames)
            | self.repeats.compute_increment(frames)
            | self.ratio.compute_increment(frames)
    }

    #[inline]
    fn step_ramps(&mut self) {
        self.duration.step();
        self.repeats.step();
        self.ratio.step();
    }

    /// Copy the newest `duration` frames of every channel.
    fn capture(&mut self) {
        let len = self.duration_samples();
        let max = self.max_duration;

        for ch in 0..self.channels {
            let lane = &mut self.snapshot[ch * max..ch * max + len];
            self.ring.copy_latest(ch, lane);
        }

        self.snapshot_len = len;
        self.read_index = 0;
        self.repeat_counter = 0;
        self.recapture_pending = false;
        self.state = StutterState::Looping;
        self.capture_count += 1;
    }

    /// Append the frames this block wrote after the capture point, up to `max_duration`.
    fn extend_snapshot(&mut self, frames: usize) {
        let max = self.max_duration;
        let len = self.snapshot_len;
        let take = frames.min(max - len);
        if take == 0 {
            return;
        }

        // Anything past the room left is newer than the lane can hold
        let skip = frames - take;
        for ch in 0..self.channels {
            let tail = &mut self.snapshot[ch * max + len..ch * max + len + take];
            self.ring.copy_ending(ch, skip, tail);
        }
        self.snapshot_len = len + take;
    }

    fn render_frame(&self, frame: &mut [f32]) {
        let duration = self.duration_samples();
        let ratio = self.ratio.current();
        let magnitude = ratio.abs().max(MIN_RATIO);
        let reverse = ratio < 0.0;
        let position = self.read_index as f32 / magnitude;

        let fade = Self::fade_len(duration);
        let window_start = duration - fade;

        // (blend amount, seam position); no seam on the final iteration
        let tail = if fade > 0 && self.read_index >= window_start {
            let offset = (self.read_index - window_start) as f32;
            let t = (offset / fade as f32).min(1.0);
            let seam = (self.repeat_counter + 1 < self.repeat_limit())
                .then_some(offset / magnitude);
            Some((t, seam))
        } else {
            None
        };

        let window = LoopWindow {
            duration,
            fade,
            reverse,
        };
        for (ch, out) in frame.iter_mut().enumerate() {
            let main = self.read_window(ch, position, &window);
            *out = match tail {
                Some((t, Some(seam_position))) => {
                    let next = self.read_window(ch, seam_position, &window);
                    main * (1.0 - t) + next * t
                }
                Some((t, None)) => main * (1.0 - t),
                None => main,
            };
        }
    }

    /// Faded, interpolated read at a fractional position into the loop.
    ///
    /// Positions past the window hold its last sample, where the fade-out is 0.
    /// Reverse mirrors the position inside the current duration, not inside
    /// the stored lane.
    #[inline]
    fn read_window(&self, channel: usize, position: f32, window: &LoopWindow) -> f32 {
        let len = self.snapshot_len;
        if len == 0 || window.duration == 0 {
            return 0.0;
        }

        let last = (window.duration - 1) as f32;
        let position = position.min(last);
        let x = if window.reverse { last - position } else { position };

        let start = channel * self.max_duration;
        let lane = &self.snapshot[start..start + len];
        // A loop that outgrew the appended audio holds the newest frame
        let top = len - 1;

        let x1 = x as usize;
        let fraction = x - x1 as f32;
        let y1 = lane[x1.min(top)];
        let y2 = lane[(x1 + 1).min(top)];

        (y1 + fraction * (y2 - y1)) * edge_gain(x, last, window.fade)
    }

    fn advance_read_index(&mut self) {
        self.read_index += 1;

        let duration = self.duration_samples();
        if self.read_index < duration {
            return;
        }

        self.repeat_counter += 1;
        if self.repeat_counter >= self.repeat_limit() {
            self.wrap_count += 1;
            self.capture();
        } else {
            self.read_index = Self::fade_len(duration);
        }
    }

    #[inline]
    pub fn state(&self) -> StutterState {
        self.state
    }

    #[inline]
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    #[inline]
    pub fn repeat_counter(&self) -> u32 {
        self.repeat_counter
    }

    /// Snapshots taken since construction, the first one included.
    #[inline]
    pub fn capture_count(&self) -> u64 {
        self.capture_count
    }

    /// Times the repeat counter ran out and wrapped to 0.
    #[inline]
    pub fn wrap_count(&self) -> u64 {
        self.wrap_count
    }

    /// Raw snapshot frames for `channel`: the capture plus anything appended since.
    ///
    /// Fades are not stored; they are applied when the loop is read.
    pub fn snapshot(&self, channel: usize) -> &[f32] {
        let start = channel * self.max_duration;
        &self.snapshot[start..start + self.snapshot_len]
    }

    pub fn ring(&self) -> &RingBuffer {
        &self.ring
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn max_duration_samples(&self) -> usize {
        self.max_duration
    }

    pub fn min_duration_samples(&self) -> usize {
        self.min_duration
    }
}

impl Modulatable for StutterBuffer {
    type Param = StutterParam;

    fn get_param(&self, param: StutterParam) -> f32 {
        self.ramp(param).target()
    }

    fn set_param(&mut self, param: StutterParam, value: f32) {
        match param {
            StutterParam::Duration => self.set_duration_samples(value),
            StutterParam::Repeats => self.set_repeats(value),
            StutterParam::Ratio => self.set_ratio(value),
        }
    }
}

/// What one output frame reads from.
struct LoopWindow {
    duration: usize,
    fade: usize,
    reverse: bool,
}

/// Linear fade-in over the first `fade` samples of the window, fade-out over the last.
///
/// Position 0 and position `last` get exactly 0.
#[inline]
fn edge_gain(x: f32, last: f32, fade: usize) -> f32 {
    if fade == 0 {
        return 1.0;
    }
    (x.min(last - x) / fade as f32).clamp(0.0, 1.0)
}
