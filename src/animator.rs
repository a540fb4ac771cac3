//! Keyframe animator that eases the joints through a sequence of target poses.

use tracing::debug;

use crate::config::AnimationConfig;
use crate::keyframes::{Direction, KeyframeTable, KEYFRAME_COUNT};
use crate::kinematic_traits::Joints;

/// Whether the animator plays the other table after finishing a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Alternate forward and backward passes until stopped.
    Looping,
    /// Play one table once, then stop.
    SinglePass,
}

/// What a single animator tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorEvent {
    /// Not running, joints untouched.
    Idle,
    /// At least one joint is still easing towards the keyframe.
    Moving,
    /// All joints are on the keyframe, pausing before the next one.
    Dwelling,
    /// Moved on to the keyframe with this index.
    Advanced(usize),
    /// Looping mode finished a pass and now plays the table of this direction.
    CycleFlipped(Direction),
    /// Single pass finished; the animator stopped.
    Completed,
}

#[derive(Debug, Clone)]
pub struct Animator {
    running: bool,
    step: usize,
    dwell: u32,
    direction: Direction,
    mode: Mode,
    config: AnimationConfig,
    forward: KeyframeTable,
    backward: KeyframeTable,
}

impl Animator {
    pub fn new(config: AnimationConfig, forward: KeyframeTable, backward: KeyframeTable) -> Self {
        Animator {
            running: false,
            step: 0,
            dwell: 0,
            direction: Direction::Forward,
            mode: Mode::Looping,
            config,
            forward,
            backward,
        }
    }

    /// Start looping from the first forward keyframe. Returns false if already running.
    pub fn start(&mut self) -> bool {
        self.begin(Direction::Forward, Mode::Looping)
    }

    /// Play the forward table once (pick at A, drop at B).
    pub fn start_forward(&mut self) -> bool {
        self.begin(Direction::Forward, Mode::SinglePass)
    }

    /// Play the backward table once (pick at B, drop at A).
    pub fn start_backward(&mut self) -> bool {
        self.begin(Direction::Backward, Mode::SinglePass)
    }

    fn begin(&mut self, direction: Direction, mode: Mode) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.step = 0;
        self.dwell = 0;
        self.direction = direction;
        self.mode = mode;
        debug!(?direction, ?mode, "Animation started");
        true
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop and rewind to the first forward keyframe.
    pub fn reset(&mut self) {
        self.running = false;
        self.step = 0;
        self.dwell = 0;
        self.direction = Direction::Forward;
        self.mode = Mode::Looping;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn step_index(&self) -> usize {
        self.step
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The table of the current direction.
    pub fn table(&self) -> &KeyframeTable {
        match self.direction {
            Direction::Forward => &self.forward,
            Direction::Backward => &self.backward,
        }
    }

    /// Keyframe the joints are currently moving to.
    pub fn target(&self) -> &Joints {
        &self.table().0[self.step]
    }

    /// Ease every joint towards the current keyframe and advance through the
    /// table once all of them have arrived and the dwell has passed.
    pub fn tick(&mut self, joints: &mut Joints) -> AnimatorEvent {
        if !self.running {
            return AnimatorEvent::Idle;
        }

        let target = *self.target();
        let mut done = true;
        for i in 0..joints.len() {
            let diff = target[i] - joints[i];
            if diff.abs() > self.config.snap_tolerance {
                joints[i] += diff * self.config.ease_factor;
                done = false;
            } else {
                joints[i] = target[i];
            }
        }

        if !done {
            return AnimatorEvent::Moving;
        }

        self.dwell += 1;
        if self.dwell <= self.config.dwell_ticks {
            return AnimatorEvent::Dwelling;
        }

        self.dwell = 0;
        self.step += 1;
        if self.step < KEYFRAME_COUNT {
            debug!(step = self.step, direction = ?self.direction, "Next keyframe");
            return AnimatorEvent::Advanced(self.step);
        }

        self.step = 0;
        match self.mode {
            Mode::SinglePass => {
                self.running = false;
                debug!(direction = ?self.direction, "Sequence complete");
                AnimatorEvent::Completed
            }
            Mode::Looping => {
                self.direction = self.direction.flip();
                debug!(direction = ?self.direction, "Cycle flipped");
                AnimatorEvent::CycleFlipped(self.direction)
            }
        }
    }
}

impl Default for Animator {
    fn default() -> Self {
        Animator::new(AnimationConfig::default(), crate::keyframes::FORWARD, crate::keyframes::BACKWARD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyframes::{BACKWARD, FORWARD};

    #[test]
    fn test_idle_when_stopped() {
        let mut animator = Animator::default();
        let mut joints = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(animator.tick(&mut joints), AnimatorEvent::Idle);
        assert_eq!(joints, [1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_easing_is_exponential() {
        let mut animator = Animator::default();
        animator.start();
        let mut joints = FORWARD.0[0];
        joints[0] = 40.0; // 40 degrees away from the target 0
        assert_eq!(animator.tick(&mut joints), AnimatorEvent::Moving);
        assert!((joints[0] - 38.0).abs() < 1e-12);
        assert_eq!(animator.tick(&mut joints), AnimatorEvent::Moving);
        assert!((joints[0] - 36.1).abs() < 1e-12);
        // Other joints were already on target and stay there
        assert_eq!(&joints[1..], &FORWARD.0[0][1..]);
    }

    #[test]
    fn test_snap_within_tolerance() {
        let mut animator = Animator::default();
        animator.start();
        let mut joints = FORWARD.0[0];
        joints[2] += 0.5;
        assert_eq!(animator.tick(&mut joints), AnimatorEvent::Dwelling);
        assert_eq!(joints, FORWARD.0[0]);
    }

    #[test]
    fn test_dwell_before_advancing() {
        let config = AnimationConfig::default();
        let mut animator = Animator::default();
        animator.start();
        let mut joints = FORWARD.0[0];
        for _ in 0..config.dwell_ticks {
            assert_eq!(animator.tick(&mut joints), AnimatorEvent::Dwelling);
        }
        assert_eq!(animator.tick(&mut joints), AnimatorEvent::Advanced(1));
        assert_eq!(animator.step_index(), 1);
        assert_eq!(animator.target(), &FORWARD.0[1]);
    }

    #[test]
    fn test_start_is_noop_while_running() {
        let mut animator = Animator::default();
        assert!(animator.start_backward());
        assert!(!animator.start());
        assert_eq!(animator.direction(), Direction::Backward);
        assert_eq!(animator.mode(), Mode::SinglePass);
        assert_eq!(animator.table(), &BACKWARD);
    }

    #[test]
    fn test_restart_rewinds() {
        let mut animator = Animator::default();
        animator.start();
        let mut joints = FORWARD.0[0];
        for _ in 0..=AnimationConfig::default().dwell_ticks {
            animator.tick(&mut joints);
        }
        assert_eq!(animator.step_index(), 1);
        animator.stop();
        assert_eq!(animator.tick(&mut joints), AnimatorEvent::Idle);
        assert!(animator.start());
        assert_eq!(animator.step_index(), 0);
        assert_eq!(animator.direction(), Direction::Forward);
    }

    #[test]
    fn test_reset() {
        let mut animator = Animator::default();
        animator.start_backward();
        animator.reset();
        assert!(!animator.is_running());
        assert_eq!(animator.direction(), Direction::Forward);
        assert_eq!(animator.step_index(), 0);
        assert_eq!(animator.table(), &FORWARD);
    }
}
