// Speed multiplier - Fit a looping clip to a whole number of beats at the current tempo
//
// For a clip of natural length L, a loop spanning B beats, and tempo bpm:
//   D = (60 / bpm) * B       desired loop duration
//   speed = L / D            playback rate

use crate::sync::Tempo;

/// Default damping: the computed speed is reduced by 0.05% to offset frame-timing overshoot
/// Calibration constant, not a correctness requirement
pub const DEFAULT_SPEED_DAMPING: f64 = 0.0005;

/// Undamped playback rate that makes `clip_length` last `beats_per_loop` beats
/// None for unusable clip lengths or a zero-beat loop
pub fn speed_multiplier(clip_length: f64, beats_per_loop: u32, tempo: Tempo) -> Option<f64> {
    if !(clip_length.is_finite() && clip_length > 0.0) || beats_per_loop == 0 {
        return None;
    }
    let loop_duration = tempo.loop_duration_seconds(beats_per_loop);
    Some(clip_length / loop_duration)
}

/// Playback rate with the damping factor applied
pub fn damped_speed(clip_length: f64, beats_per_loop: u32, tempo: Tempo, damping: f64) -> Option<f64> {
    speed_multiplier(clip_length, beats_per_loop, tempo).map(|speed| speed * (1.0 - damping))
}

/// Clip position that puts a dance started on `current_beat` in phase with the group
/// Fraction of the clip = ((beat - 1) mod B) / B
pub fn phase_aligned_position(clip_length: f64, current_beat: u32, beats_per_loop: u32) -> f64 {
    if beats_per_loop == 0 || current_beat == 0 {
        return 0.0;
    }
    let beat_in_loop = (current_beat - 1) % beats_per_loop;
    clip_length * beat_in_loop as f64 / beats_per_loop as f64
}
