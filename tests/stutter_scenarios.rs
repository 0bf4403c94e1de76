use std::f64::consts::TAU;

use glitch_dsp::{
    dsp::ring::RingBuffer, processor, GlitchConfig, Lfo, StutterBuffer, StutterParam,
    FADE_SAMPLES,
};

const SR: f32 = 44_100.0;

/// Deterministic block sizes in 1..=max.
fn block_sizes(count: usize, max: usize) -> Vec<usize> {
    let mut state = 0x2545_f491u32;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as usize % max) + 1
        })
        .collect()
}

/// Largest absolute difference between neighbouring samples, and where it sits.
fn max_step(signal: &[f32]) -> (usize, f32) {
    signal
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .enumerate()
        .fold((0, 0.0), |max, (i, d)| if d > max.1 { (i, d) } else { max })
}

/// Longest run of samples quieter than `floor`.
fn longest_quiet_run(signal: &[f32], floor: f32) -> usize {
    let mut run = 0;
    let mut longest = 0;
    for s in signal {
        run = if s.abs() < floor { run + 1 } else { 0 };
        longest = longest.max(run);
    }
    longest
}

fn looping_mono(duration: f32, repeats: f32, ratio: f32) -> StutterBuffer {
    let mut stutter = StutterBuffer::new(1, SR, SR as usize).unwrap();
    stutter.set_duration_samples(duration);
    stutter.set_repeats(repeats);
    stutter.set_ratio(ratio);
    stutter.set_enabled(true);
    stutter
}

#[test]
fn ring_cursor_and_history_survive_arbitrary_blocks() {
    let capacity = 997;
    let mut ring = RingBuffer::new(2, capacity);
    let mut history: Vec<f32> = Vec::new();
    let mut total = 0;

    for size in block_sizes(200, 300) {
        let block: Vec<f32> = (0..size)
            .flat_map(|i| {
                let v = (history.len() + i) as f32;
                [v, -v]
            })
            .collect();
        ring.write_interleaved(&block);
        history.extend(block.chunks_exact(2).map(|f| f[0]));
        total += size;

        assert_eq!(ring.write_position(), total % capacity);
    }

    for k in [1, 64, 500, capacity] {
        let mut left = vec![0.0; k];
        let mut right = vec![0.0; k];
        ring.copy_latest(0, &mut left);
        ring.copy_latest(1, &mut right);

        let expected = &history[history.len() - k..];
        assert_eq!(&left[..], expected);
        assert!(right.iter().zip(expected).all(|(r, e)| *r == -*e));
    }
}

#[test]
fn snapshot_fades_each_channel_independently() {
    let mut stutter = StutterBuffer::new(2, SR, SR as usize).unwrap();
    stutter.set_duration_samples(4410.0);
    stutter.set_repeats(1.0);
    stutter.set_enabled(true);

    let mut block: Vec<f32> = (0..4410).flat_map(|_| [0.8, -0.6]).collect();
    stutter.process(&mut block);

    for (ch, level) in [(0, 0.8f32), (1, -0.6f32)] {
        assert!(stutter.snapshot(ch).iter().all(|&s| s == level));

        let played: Vec<f32> = block.chunks_exact(2).map(|f| f[ch]).collect();
        let len = played.len();
        assert_eq!(played[0], 0.0);
        assert_eq!(played[len - 1], 0.0);

        for i in 1..FADE_SAMPLES {
            assert!(played[i].abs() > played[i - 1].abs());
            assert!(played[len - 1 - i].abs() > played[len - i].abs());
        }
        assert!(played[FADE_SAMPLES..len - FADE_SAMPLES]
            .iter()
            .all(|&s| s == level));
    }
}

#[test]
fn opposite_ratios_play_time_reversed() {
    // (duration, |ratio|, step through the snapshot per output frame)
    for (duration, ratio, step) in [(2000usize, 1.0f32, 1usize), (2001, 0.5, 2)] {
        let sine: Vec<f32> = (0..duration)
            .map(|i| (TAU * 441.0 * i as f64 / SR as f64).sin() as f32 * 0.7)
            .collect();

        let mut forward = looping_mono(duration as f32, 4.0, ratio);
        let mut reverse = looping_mono(duration as f32, 4.0, -ratio);
        let mut out_fwd = sine.clone();
        let mut out_rev = sine.clone();
        forward.process(&mut out_fwd);
        reverse.process(&mut out_rev);

        assert_eq!(forward.snapshot(0), reverse.snapshot(0));

        // forward[i] reads index step·i, reverse[j] reads last - step·j.
        // Compare only frames outside the seam crossfade of both.
        let last = duration - 1;
        let window = duration - FADE_SAMPLES;
        let mut compared = 0;
        for i in 0..window {
            if step * i > last {
                break;
            }
            let j = (last - step * i) / step;
            if j >= window {
                continue;
            }
            assert!(
                (out_fwd[i] - out_rev[j]).abs() < 1e-6,
                "ratio {}: forward[{}] = {}, reverse[{}] = {}",
                ratio,
                i,
                out_fwd[i],
                j,
                out_rev[j]
            );
            compared += 1;
        }
        assert!(compared >= 900);
    }
}

#[test]
fn loop_seams_do_not_click() {
    let duration = 2205;
    let mut stutter = looping_mono(duration as f32, 8.0, 1.0);

    // A ramp from -0.8 to 0.8: looping it raw jumps by 1.6 at every seam
    let ramp: Vec<f32> = (0..duration)
        .map(|i| -0.8 + 1.6 * i as f32 / (duration - 1) as f32)
        .collect();
    assert!((ramp[duration - 1] - ramp[0]).abs() > 1.5);

    let mut output = Vec::new();
    let mut block = ramp.clone();
    stutter.process(&mut block);
    output.extend_from_slice(&block);
    for _ in 0..3 {
        let mut block = vec![0.0; duration];
        stutter.process(&mut block);
        output.extend_from_slice(&block);
    }

    // Several seams passed, no recapture yet
    assert!(stutter.repeat_counter() >= 4);
    assert_eq!(stutter.capture_count(), 1);

    let (at, step) = max_step(&output);
    assert!(step < 0.01, "largest sample step {} at {}", step, at);
}

#[test]
fn seams_and_recaptures_stay_smooth_at_every_ratio() {
    let duration = 2205;
    let sizes = block_sizes(60, 1024);

    for ratio in [0.5f32, -0.5, 1.0, -1.0, 2.0, -2.0] {
        let mut stutter = looping_mono(duration as f32, 2.0, ratio);
        let mut output = Vec::new();
        let mut n = 0usize;

        // A slow sine, so every recapture freezes different material
        for &size in &sizes {
            let mut block: Vec<f32> = (n..n + size)
                .map(|i| (TAU * 5.0 * i as f64 / SR as f64).sin() as f32 * 0.5)
                .collect();
            n += size;
            stutter.process(&mut block);
            output.extend_from_slice(&block);
        }

        // Each cycle is one full iteration plus one restarted past the fade-in
        let cycle = duration + (duration - FADE_SAMPLES);
        assert_eq!(stutter.wrap_count(), (n / cycle) as u64, "ratio {}", ratio);
        assert!(stutter.wrap_count() >= 3, "ratio {}", ratio);
        assert_eq!(stutter.capture_count(), stutter.wrap_count() + 1);

        let (at, step) = max_step(&output);
        assert!(step < 0.01, "ratio {}: step {} at {}", ratio, step, at);
    }
}

#[test]
fn lfo_swept_duration_keeps_playing() {
    let config = GlitchConfig {
        channels: 1,
        duration_ms: 500.0,
        repeats: 3,
        ..Default::default()
    };
    let (mut glitch, mut handle) = processor::build(&config).unwrap();

    // A second of history before the stutter engages
    for _ in 0..86 {
        let mut block = vec![0.5; 512];
        glitch.process(&mut block);
    }

    handle
        .set_modulation_depth(StutterParam::Duration, 1.0)
        .unwrap();
    handle.set_lfo_frequency(2.0).unwrap();
    handle.set_lfo_enabled(true).unwrap();
    handle.set_stutter_enabled(true).unwrap();

    let mut output = Vec::new();
    let (mut shortest, mut longest) = (usize::MAX, 0);
    for _ in 0..172 {
        let mut block = vec![0.5; 512];
        glitch.process(&mut block);
        output.extend_from_slice(&block);

        let duration = glitch.stutter().duration_samples();
        shortest = shortest.min(duration);
        longest = longest.max(duration);
    }

    // The loop really swept, up as well as down
    assert!(longest - shortest > 10_000, "{}..{}", shortest, longest);
    assert!(glitch.stutter().capture_count() >= 2);

    // Only the fade through a recapture gets near silence
    let quiet = longest_quiet_run(&output, 1e-3);
    assert!(quiet < 64, "{} quiet frames in a row", quiet);
    assert!(output.iter().all(|s| s.is_finite() && s.abs() <= 0.5 + 1e-6));

    let (at, step) = max_step(&output);
    assert!(step < 0.05, "step {} at {}", step, at);
}

#[test]
fn half_second_three_repeats_recaptures_once() {
    let config = GlitchConfig {
        channels: 2,
        sample_rate: SR,
        duration_ms: 500.0,
        repeats: 3,
        ratio: 1.0,
        ..Default::default()
    };
    let (mut glitch, mut handle) = processor::build(&config).unwrap();
    handle.set_stutter_enabled(true).unwrap();

    let duration = 22_050;
    // Iterations after the first start past the fade-in
    let cycle = duration + 2 * (duration - FADE_SAMPLES);

    let mut block = vec![0.1; 2 * (cycle - 1)];
    glitch.process(&mut block);
    assert_eq!(glitch.stutter().capture_count(), 1);
    assert_eq!(glitch.stutter().wrap_count(), 0);
    assert_eq!(glitch.stutter().repeat_counter(), 2);

    let mut block = vec![0.1; 2];
    glitch.process(&mut block);
    assert_eq!(glitch.stutter().capture_count(), 2);
    assert_eq!(glitch.stutter().wrap_count(), 1);
    assert_eq!(glitch.stutter().repeat_counter(), 0);

    // Run on to 3 × 22050 output samples in total
    let mut block = vec![0.1; 2 * (3 * duration - cycle)];
    glitch.process(&mut block);
    assert_eq!(glitch.stutter().capture_count(), 2);
    assert_eq!(glitch.stutter().wrap_count(), 1);
    assert_eq!(handle.monitor().capture_count(), 2);
    assert_eq!(handle.monitor().wrap_count(), 1);
}

#[test]
fn resending_held_ratio_changes_nothing() {
    let config = GlitchConfig {
        channels: 1,
        ..Default::default()
    };
    let (mut plain, mut plain_handle) = processor::build(&config).unwrap();
    let (mut resent, mut resent_handle) = processor::build(&config).unwrap();
    plain_handle.set_stutter_enabled(true).unwrap();
    resent_handle.set_stutter_enabled(true).unwrap();

    let input: Vec<f32> = (0..512).map(|i| (i as f32 * 0.03).sin()).collect();
    let mut a = input.clone();
    let mut b = input.clone();
    plain.process(&mut a);
    resent.process(&mut b);

    resent_handle.set_ratio(1.0).unwrap();
    let mut a = input.clone();
    let mut b = input.clone();
    plain.process(&mut a);
    resent.process(&mut b);

    assert_eq!(a, b);
    assert_eq!(resent.stutter().ramp(StutterParam::Ratio).increment(), 0.0);
}

#[test]
fn lfo_phase_wraps_after_one_second_of_blocks() {
    let mut lfo = Lfo::new(SR).with_frequency(1.0);
    let increment = TAU / (SR as f64 / 512.0);

    for _ in 0..86 {
        lfo.advance(512);
    }
    assert!((lfo.phase() - 86.0 * increment).abs() < 1e-9);
    assert!(lfo.phase() < TAU);

    lfo.advance(512);
    assert!((lfo.phase() - (87.0 * increment - TAU)).abs() < 1e-9);
}

#[test]
fn modulated_duration_never_drops_below_floor() {
    let config = GlitchConfig {
        channels: 1,
        duration_ms: 20.0,
        ..Default::default()
    };
    let (mut glitch, mut handle) = processor::build(&config).unwrap();
    handle
        .set_modulation_depth(StutterParam::Duration, 1.0)
        .unwrap();
    handle.set_lfo_frequency(5.0).unwrap();
    handle.set_lfo_enabled(true).unwrap();
    handle.set_stutter_enabled(true).unwrap();

    let floor = glitch.stutter().min_duration_samples();
    for _ in 0..200 {
        let mut block = vec![0.2; 256];
        glitch.process(&mut block);
        assert!(glitch.stutter().duration_samples() >= floor);
        assert!(block.iter().all(|s| s.is_finite() && s.abs() <= 0.2 + 1e-6));
    }
}
