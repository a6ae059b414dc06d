//! Shared Spawn → Active → Exiting → Disposed lifecycle for simulations.
//!
//! Durations are measured in simulation time, advanced once per frame, so a
//! teardown can never race with whatever starts next.

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Spawn,
    Active,
    Exiting,
    Disposed,
}

impl Phase {
    /// Spawn or Active: the effect is still presenting, not tearing down.
    pub fn is_live(self) -> bool {
        matches!(self, Phase::Spawn | Phase::Active)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Spawn => "spawn",
            Phase::Active => "active",
            Phase::Exiting => "exiting",
            Phase::Disposed => "disposed",
        };
        f.write_str(name)
    }
}

/// Length of a bounded phase.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Span {
    Frames(u32),
    Seconds(f32),
}

impl Span {
    pub const INSTANT: Span = Span::Frames(0);

    fn progress(self, frames: u32, seconds: f32) -> f32 {
        match self {
            Span::Frames(0) => 1.0,
            Span::Frames(n) => (frames as f32 / n as f32).min(1.0),
            Span::Seconds(s) if s <= 0.0 => 1.0,
            Span::Seconds(s) => (seconds / s).clamp(0.0, 1.0),
        }
    }
}

#[derive(Clone, Debug)]
pub struct PhaseMachine {
    phase: Phase,
    spawn: Span,
    exit: Span,
    frames_in_phase: u32,
    seconds_in_phase: f32,
}

impl PhaseMachine {
    /// A zero-length spawn starts directly in Active.
    pub fn new(spawn: Span, exit: Span) -> Self {
        let phase = if spawn.progress(0, 0.0) >= 1.0 {
            Phase::Active
        } else {
            Phase::Spawn
        };
        Self {
            phase,
            spawn,
            exit,
            frames_in_phase: 0,
            seconds_in_phase: 0.0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Fraction of the current bounded phase that has elapsed. Active and
    /// Disposed report 1.
    pub fn progress(&self) -> f32 {
        match self.phase {
            Phase::Spawn => self.spawn.progress(self.frames_in_phase, self.seconds_in_phase),
            Phase::Exiting => self.exit.progress(self.frames_in_phase, self.seconds_in_phase),
            Phase::Active | Phase::Disposed => 1.0,
        }
    }

    pub fn seconds_in_phase(&self) -> f32 {
        self.seconds_in_phase
    }

    pub fn frames_in_phase(&self) -> u32 {
        self.frames_in_phase
    }

    /// Count one frame of `dt` seconds and take any automatic transition.
    /// Returns the phase entered, if any.
    pub fn step(&mut self, dt: f32) -> Option<Phase> {
        if self.phase == Phase::Disposed {
            return None;
        }
        self.frames_in_phase = self.frames_in_phase.saturating_add(1);
        self.seconds_in_phase += dt.max(0.0);
        let next = match self.phase {
            Phase::Spawn if self.progress() >= 1.0 => Some(Phase::Active),
            Phase::Exiting if self.progress() >= 1.0 => Some(Phase::Disposed),
            _ => None,
        };
        if let Some(phase) = next {
            self.enter(phase);
        }
        next
    }

    /// End the spawn ramp early, for effects whose ramp is driven by their own
    /// state rather than by time.
    pub fn finish_spawn(&mut self) {
        if self.phase == Phase::Spawn {
            self.enter(Phase::Active);
        }
    }

    /// Enter Exiting from Spawn or Active. Returns false (and changes nothing)
    /// when already Exiting or Disposed.
    pub fn request_stop(&mut self) -> bool {
        if !self.phase.is_live() {
            return false;
        }
        self.enter(Phase::Exiting);
        true
    }

    fn enter(&mut self, phase: Phase) {
        log::debug!("[phase] {} -> {}", self.phase, phase);
        self.phase = phase;
        self.frames_in_phase = 0;
        self.seconds_in_phase = 0.0;
    }
}
