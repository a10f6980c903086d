#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave timeline that emits wave and enemy spawn commands.
//!
//! The system alternates between counting down to the next wave and walking
//! the active wave's spawn offsets. A wave's countdown only begins once every
//! entry of the previous wave has been emitted, so spawn cursors never overlap.

use std::time::Duration;

use horde_defence_core::{Command, Event, WaveSchedule};

/// Pure system that converts elapsed time into wave spawn commands.
#[derive(Debug)]
pub struct WaveSpawning {
    schedule: WaveSchedule,
    phase: Phase,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Countdown {
        wave: u32,
        remaining: Duration,
    },
    Spawning {
        wave: u32,
        elapsed: Duration,
        spawned: u32,
        count: u32,
        interval: Duration,
    },
    Exhausted,
}

impl WaveSpawning {
    /// Creates a timeline counting down to the first wave.
    #[must_use]
    pub fn new(schedule: WaveSchedule) -> Self {
        let phase = Phase::Countdown {
            wave: 1,
            remaining: schedule.first_wave_delay(),
        };
        Self { schedule, phase }
    }

    /// Rewinds the timeline to the countdown before the first wave.
    pub fn reset(&mut self) {
        self.phase = Phase::Countdown {
            wave: 1,
            remaining: self.schedule.first_wave_delay(),
        };
    }

    /// Time left until the next wave starts, if the timeline is counting down.
    #[must_use]
    pub fn next_wave_in(&self) -> Option<Duration> {
        match self.phase {
            Phase::Countdown { remaining, .. } => Some(remaining),
            Phase::Spawning { .. } | Phase::Exhausted => None,
        }
    }

    /// Wave whose entries are currently being emitted.
    #[must_use]
    pub fn spawning_wave(&self) -> Option<u32> {
        match self.phase {
            Phase::Spawning { wave, .. } => Some(wave),
            Phase::Countdown { .. } | Phase::Exhausted => None,
        }
    }

    /// Consumes time events and emits the wave commands that fell due.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.advance(accumulated, out);
    }

    fn advance(&mut self, dt: Duration, out: &mut Vec<Command>) {
        let mut budget = dt;

        loop {
            match self.phase {
                Phase::Exhausted => return,
                Phase::Countdown { wave, remaining } => {
                    if budget < remaining {
                        self.phase = Phase::Countdown {
                            wave,
                            remaining: remaining - budget,
                        };
                        return;
                    }
                    budget -= remaining;

                    let Some(plan) = self.schedule.plan(wave) else {
                        self.phase = Phase::Exhausted;
                        return;
                    };
                    out.push(Command::StartWave { wave });
                    self.phase = Phase::Spawning {
                        wave,
                        elapsed: Duration::ZERO,
                        spawned: 0,
                        count: plan.count,
                        interval: plan.interval,
                    };
                }
                Phase::Spawning {
                    wave,
                    elapsed,
                    mut spawned,
                    count,
                    interval,
                } => {
                    // Enemies created this frame are advanced by the whole frame,
                    // so their clocks start at the frame's beginning.
                    let consumed = dt.saturating_sub(budget);
                    let wave_now = elapsed.saturating_add(budget);

                    while spawned < count {
                        let offset = interval.saturating_mul(spawned);
                        if offset > wave_now {
                            break;
                        }
                        let lead = offset.saturating_add(consumed).saturating_sub(elapsed);
                        out.push(Command::SpawnEnemy {
                            wave,
                            spawn_delay: self.schedule.spawn_gate().saturating_add(lead),
                        });
                        spawned += 1;
                    }

                    if spawned < count {
                        self.phase = Phase::Spawning {
                            wave,
                            elapsed: wave_now,
                            spawned,
                            count,
                            interval,
                        };
                        return;
                    }

                    out.push(Command::EndWave { wave });
                    let last_offset = interval.saturating_mul(count.saturating_sub(1));
                    budget = wave_now.saturating_sub(last_offset);
                    self.phase = Phase::Countdown {
                        wave: wave.saturating_add(1),
                        remaining: self.schedule.inter_wave_pause(),
                    };
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(dt: Duration) -> [Event; 1] {
        [Event::TimeAdvanced { dt }]
    }

    #[test]
    fn countdown_runs_before_the_first_wave() {
        let schedule = WaveSchedule::default();
        let delay = schedule.first_wave_delay();
        let mut spawning = WaveSpawning::new(schedule);
        let mut out = Vec::new();

        spawning.handle(&tick(delay / 2), &mut out);
        assert!(out.is_empty());
        assert_eq!(spawning.next_wave_in(), Some(delay - delay / 2));
        assert_eq!(spawning.spawning_wave(), None);
    }

    #[test]
    fn events_without_time_are_ignored() {
        let mut spawning = WaveSpawning::new(WaveSchedule::default());
        let mut out = Vec::new();
        spawning.handle(&[Event::Restarted], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn reset_rewinds_to_the_first_countdown() {
        let schedule = WaveSchedule::default();
        let delay = schedule.first_wave_delay();
        let mut spawning = WaveSpawning::new(schedule);
        let mut out = Vec::new();

        spawning.handle(&tick(delay + Duration::from_millis(10)), &mut out);
        assert_eq!(spawning.spawning_wave(), Some(1));

        spawning.reset();
        assert_eq!(spawning.next_wave_in(), Some(delay));
    }
}
