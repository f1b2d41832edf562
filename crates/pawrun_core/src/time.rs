//! Fixed-timestep frame clock.
//!
//! Wall-clock time feeds an accumulator; the simulation consumes it in equal
//! `fixed_dt` slices so every gameplay update sees the same `dt`. The
//! accumulator is capped so a long stall (window drag, breakpoint) cannot
//! queue up seconds of catch-up steps.

use std::time::Instant;

const FPS_SAMPLE_COUNT: usize = 60;

pub struct TimeState {
    pub fixed_dt: f32,
    pub max_accumulator: f32,
    accumulator: f32,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f32,
    last_instant: Instant,

    fps_samples: [f32; FPS_SAMPLE_COUNT],
    fps_sample_index: usize,
    pub smoothed_fps: f32,
    pub smoothed_frame_time_ms: f32,
}

impl TimeState {
    pub fn new(fixed_dt: f32) -> Self {
        Self {
            fixed_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            last_instant: Instant::now(),
            fps_samples: [fixed_dt; FPS_SAMPLE_COUNT],
            fps_sample_index: 0,
            smoothed_fps: 1.0 / fixed_dt,
            smoothed_frame_time_ms: fixed_dt * 1000.0,
        }
    }

    /// Measure wall-clock time since the previous frame and feed the accumulator.
    pub fn begin_frame(&mut self) {
        let now = Instant::now();
        let real_dt = now.duration_since(self.last_instant).as_secs_f32();
        self.last_instant = now;
        self.advance(real_dt);
    }

    /// Feed `real_dt` seconds into the accumulator.
    pub fn advance(&mut self, real_dt: f32) {
        self.real_dt = real_dt.max(0.0);
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping to {:.0}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator = (self.accumulator + self.real_dt).min(self.max_accumulator);
        self.steps_this_frame = 0;
        self.frame_count += 1;

        self.fps_samples[self.fps_sample_index] = self.real_dt;
        self.fps_sample_index = (self.fps_sample_index + 1) % FPS_SAMPLE_COUNT;
        let avg_dt = self.fps_samples.iter().sum::<f32>() / FPS_SAMPLE_COUNT as f32;
        self.smoothed_frame_time_ms = avg_dt * 1000.0;
        self.smoothed_fps = if avg_dt > 0.0 { 1.0 / avg_dt } else { 0.0 };
    }

    /// Consume one fixed slice if enough time has accumulated.
    pub fn should_step(&mut self) -> bool {
        if self.accumulator >= self.fixed_dt {
            self.accumulator -= self.fixed_dt;
            self.total_time += self.fixed_dt as f64;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(time: &mut TimeState) -> u32 {
        let mut steps = 0;
        while time.should_step() {
            steps += 1;
        }
        steps
    }

    #[test]
    fn exact_multiple_yields_whole_steps() {
        let mut time = TimeState::new(0.25);
        time.advance(0.5);
        // 0.25 cap applies to the accumulator, so only one slice fits.
        assert_eq!(drain(&mut time), 1);
    }

    #[test]
    fn leftover_time_carries_to_next_frame() {
        let mut time = TimeState::new(1.0 / 8.0);
        time.advance(0.1875);
        assert_eq!(drain(&mut time), 1);
        time.advance(0.0625);
        assert_eq!(drain(&mut time), 1);
        assert_eq!(time.fixed_step_count, 2);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut time = TimeState::new(1.0 / 60.0);
        time.advance(5.0);
        let steps = drain(&mut time);
        assert!(steps <= 15, "expected capped catch-up, got {steps}");
        assert_eq!(time.steps_this_frame, steps);
    }

    #[test]
    fn negative_dt_is_ignored() {
        let mut time = TimeState::new(1.0 / 60.0);
        time.advance(-1.0);
        assert_eq!(drain(&mut time), 0);
        assert_eq!(time.frame_count, 1);
    }
}
