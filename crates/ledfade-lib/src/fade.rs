//! Fade plan and sequencer: drives the strip through timed color segments.

use std::thread;
use std::time::Duration;

use crate::color::{Color, interpolate};
use crate::strip::LedStrip;

/// Interpolation steps per segment.
pub const STEPS: u32 = 40;

/// Wall-clock duration of one segment.
pub const SEGMENT: Duration = Duration::from_secs(1);

/// A validated sequence of fade waypoints.
///
/// The first color is where the fade starts; every following color is the
/// target of one segment. Fewer than two colors is not a fade and is
/// rejected here, before anything touches the lock or the hardware.
#[derive(Debug, Clone)]
pub struct FadePlan {
    waypoints: Vec<Color>,
}

impl FadePlan {
    pub fn new(waypoints: Vec<Color>) -> crate::error::Result<Self> {
        if waypoints.len() < 2 {
            return Err(crate::LedfadeError::Plan(format!(
                "need at least two colors to fade between, got {}",
                waypoints.len()
            )));
        }
        Ok(FadePlan { waypoints })
    }

    pub fn waypoints(&self) -> &[Color] {
        &self.waypoints
    }

    /// Number of transitions in the plan.
    pub fn segments(&self) -> usize {
        self.waypoints.len() - 1
    }
}

/// Step count and segment duration for a run.
///
/// Fixed deployment cadence, not a per-run knob. `steps` must be non-zero.
#[derive(Debug, Clone, Copy)]
pub struct FadeTiming {
    pub steps: u32,
    pub segment: Duration,
}

impl Default for FadeTiming {
    fn default() -> Self {
        FadeTiming {
            steps: STEPS,
            segment: SEGMENT,
        }
    }
}

impl FadeTiming {
    /// Suspension between consecutive frames.
    pub fn step_interval(&self) -> Duration {
        self.segment / self.steps
    }
}

/// Drives a [`FadePlan`] against a strip at a fixed cadence.
#[derive(Debug, Clone, Copy)]
pub struct Sequencer {
    timing: FadeTiming,
}

impl Sequencer {
    pub fn new(timing: FadeTiming) -> Self {
        Sequencer { timing }
    }

    pub fn with_defaults() -> Self {
        Sequencer::new(FadeTiming::default())
    }

    /// Render the plan, segment by segment, strictly in order.
    ///
    /// Each segment emits `steps` interpolated frames followed by one
    /// explicit frame of the exact target color (interpolation truncates and
    /// never lands on it). The process sleeps for one step interval after
    /// every frame. The first `display` error aborts the whole run; no
    /// further frames are emitted.
    pub fn run(&self, plan: &FadePlan, strip: &mut impl LedStrip) -> crate::strip::Result<()> {
        let interval = self.timing.step_interval();
        for (i, pair) in plan.waypoints().windows(2).enumerate() {
            let (from, to) = (pair[0], pair[1]);
            log::debug!("segment {}/{}: {from} to {to}", i + 1, plan.segments());
            for step in 0..self.timing.steps {
                let frame = interpolate(from, to, step as f32 / self.timing.steps as f32);
                strip.display(frame)?;
                thread::sleep(interval);
            }
            strip.display(to)?;
            thread::sleep(interval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::StripError;
    use crate::strip::mock::CaptureStrip;

    fn fast_timing(steps: u32) -> FadeTiming {
        FadeTiming {
            steps,
            segment: Duration::ZERO,
        }
    }

    fn plan(colors: &[u32]) -> FadePlan {
        FadePlan::new(colors.iter().copied().map(Color::from_rgb).collect()).unwrap()
    }

    // ── FadePlan ──

    #[test]
    fn plan_rejects_empty() {
        let err = FadePlan::new(vec![]).unwrap_err();
        assert!(err.to_string().contains("two colors"));
    }

    #[test]
    fn plan_rejects_single_color() {
        let err = FadePlan::new(vec![Color::BLACK]).unwrap_err();
        assert!(err.to_string().contains("got 1"));
    }

    #[test]
    fn plan_counts_segments() {
        assert_eq!(plan(&[0x000000, 0xFFFFFF]).segments(), 1);
        assert_eq!(plan(&[0x000000, 0xFF0000, 0x00FF00]).segments(), 2);
    }

    // ── FadeTiming ──

    #[test]
    fn default_timing_is_forty_steps_of_25ms() {
        let t = FadeTiming::default();
        assert_eq!(t.steps, 40);
        assert_eq!(t.segment, Duration::from_secs(1));
        assert_eq!(t.step_interval(), Duration::from_millis(25));
    }

    // ── Sequencer ──

    #[test]
    fn one_segment_emits_steps_plus_explicit_target() {
        let mut strip = CaptureStrip::new();
        let seq = Sequencer::new(fast_timing(40));
        seq.run(&plan(&[0x000000, 0xFFFFFF]), &mut strip).unwrap();

        assert_eq!(strip.frames.len(), 41);
        assert_eq!(strip.frames[0], Color::from_rgb(0x000000));
        assert_eq!(*strip.frames.last().unwrap(), Color::from_rgb(0xFFFFFF));
        // Frame 40 is the explicit target, not an interpolation artifact:
        // step 39 of 40 only reaches trunc(255 * 39/40) = 248
        assert_eq!(strip.frames[39], Color::from_rgb(0xF8F8F8));
    }

    #[test]
    fn interpolated_frames_never_reach_target() {
        let mut strip = CaptureStrip::new();
        let seq = Sequencer::new(fast_timing(40));
        seq.run(&plan(&[0x000000, 0xFFFFFF]), &mut strip).unwrap();

        let target = Color::from_rgb(0xFFFFFF);
        assert!(strip.frames[..40].iter().all(|&f| f != target));
    }

    #[test]
    fn segments_run_in_order_through_each_waypoint() {
        let mut strip = CaptureStrip::new();
        let seq = Sequencer::new(fast_timing(40));
        seq.run(&plan(&[0x000000, 0xFF0000, 0x00FF00]), &mut strip)
            .unwrap();

        assert_eq!(strip.frames.len(), 82);
        // Segment boundary: frame 40 is the first segment's exact target,
        // frame 41 restarts interpolation from it
        assert_eq!(strip.frames[40], Color::from_rgb(0xFF0000));
        assert_eq!(strip.frames[41], Color::from_rgb(0xFF0000));
        assert_eq!(*strip.frames.last().unwrap(), Color::from_rgb(0x00FF00));
    }

    #[test]
    fn display_failure_aborts_immediately() {
        let mut strip = CaptureStrip {
            fail_at: Some(5),
            ..CaptureStrip::new()
        };
        let seq = Sequencer::new(fast_timing(40));
        let err = seq
            .run(&plan(&[0x000000, 0xFFFFFF]), &mut strip)
            .unwrap_err();

        assert!(matches!(err, StripError::RenderFailed(_)));
        assert_eq!(strip.frames.len(), 5, "no frames after the failure");
    }

    #[test]
    fn failure_in_middle_segment_skips_later_segments() {
        // 3 segments of 41 displays each; fail inside segment 2
        let mut strip = CaptureStrip {
            fail_at: Some(50),
            ..CaptureStrip::new()
        };
        let seq = Sequencer::new(fast_timing(40));
        let err = seq
            .run(
                &plan(&[0x000000, 0xFF0000, 0x00FF00, 0x0000FF]),
                &mut strip,
            )
            .unwrap_err();

        assert!(matches!(err, StripError::RenderFailed(_)));
        assert_eq!(strip.frames.len(), 50);
        // Nothing from segment 3 was ever emitted
        let blue = Color::from_rgb(0x0000FF);
        assert!(strip.frames.iter().all(|f| f.b == 0), "{blue} never appears");
    }

    #[test]
    fn failure_on_explicit_target_frame_propagates() {
        let mut strip = CaptureStrip {
            fail_at: Some(40),
            ..CaptureStrip::new()
        };
        let seq = Sequencer::new(fast_timing(40));
        assert!(seq.run(&plan(&[0x000000, 0xFFFFFF]), &mut strip).is_err());
        assert_eq!(strip.frames.len(), 40);
    }

    #[test]
    fn identical_waypoints_hold_the_color() {
        let mut strip = CaptureStrip::new();
        let seq = Sequencer::new(fast_timing(10));
        let c = Color::from_rgb(0x123456);
        seq.run(&FadePlan::new(vec![c, c]).unwrap(), &mut strip)
            .unwrap();
        assert!(strip.frames.iter().all(|&f| f == c));
    }
}
