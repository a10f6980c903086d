use std::time::Duration;

use horde_defence_core::{Command, Event, Roster, WaveConfig, WaveSchedule};
use horde_defence_system_spawning::WaveSpawning;

fn schedule(first_wave_delay_secs: f32, pause_secs: f32, waves: &[(&str, u32, f32)]) -> WaveSchedule {
    WaveSchedule {
        first_wave_delay_secs,
        inter_wave_pause_secs: pause_secs,
        spawn_gate_secs: 0.5,
        endless_speed_growth: 1.1,
        endless_health_growth: 1.2,
        waves: waves
            .iter()
            .map(|(roster, count, interval_secs)| WaveConfig {
                roster: Roster::parse(roster).expect("valid roster"),
                count: *count,
                interval_secs: *interval_secs,
                speed_multiplier: 1.0,
                health_multiplier: 1.0,
            })
            .collect(),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Record {
    Started { wave: u32, at: Duration },
    Moves { wave: u32, at: Duration },
    Ended { wave: u32, at: Duration },
}

/// Runs the timeline over the provided frames and records absolute times.
///
/// Spawned enemies are advanced by the whole frame they were created in, so
/// an enemy starts moving at the frame's start plus its spawn delay.
fn run(schedule: WaveSchedule, frames: impl IntoIterator<Item = Duration>) -> Vec<Record> {
    let mut spawning = WaveSpawning::new(schedule);
    let mut clock = Duration::ZERO;
    let mut records = Vec::new();

    for dt in frames {
        let mut commands = Vec::new();
        spawning.handle(&[Event::TimeAdvanced { dt }], &mut commands);
        let frame_start = clock;
        clock += dt;

        for command in commands {
            records.push(match command {
                Command::StartWave { wave } => Record::Started { wave, at: clock },
                Command::SpawnEnemy { wave, spawn_delay } => Record::Moves {
                    wave,
                    at: frame_start + spawn_delay,
                },
                Command::EndWave { wave } => Record::Ended { wave, at: clock },
                other => panic!("unexpected command emitted: {other:?}"),
            });
        }
    }

    records
}

fn frames(dt: Duration, total: Duration) -> impl Iterator<Item = Duration> {
    let count = (total.as_nanos() / dt.as_nanos()) as usize;
    std::iter::repeat(dt).take(count)
}

fn move_times(records: &[Record]) -> Vec<(u32, Duration)> {
    records
        .iter()
        .filter_map(|record| match record {
            Record::Moves { wave, at } => Some((*wave, *at)),
            _ => None,
        })
        .collect()
}

#[test]
fn single_large_frame_emits_every_due_entry_once() {
    let schedule = schedule(0.0, 1.0, &[("R", 4, 0.5)]);
    let mut spawning = WaveSpawning::new(schedule);
    let mut out = Vec::new();

    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_secs(1),
        }],
        &mut out,
    );

    assert_eq!(
        out,
        vec![
            Command::StartWave { wave: 1 },
            Command::SpawnEnemy {
                wave: 1,
                spawn_delay: Duration::from_millis(500),
            },
            Command::SpawnEnemy {
                wave: 1,
                spawn_delay: Duration::from_millis(1000),
            },
            Command::SpawnEnemy {
                wave: 1,
                spawn_delay: Duration::from_millis(1500),
            },
        ]
    );

    out.clear();
    spawning.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(500),
        }],
        &mut out,
    );
    assert_eq!(
        out,
        vec![
            Command::SpawnEnemy {
                wave: 1,
                spawn_delay: Duration::from_millis(500),
            },
            Command::EndWave { wave: 1 },
        ]
    );
}

#[test]
fn enemy_spacing_is_independent_of_frame_length() {
    let waves = [("RTQ", 6, 0.75), ("QQ", 3, 0.25)];
    let total = Duration::from_secs(9);

    let fine = run(schedule(1.0, 2.0, &waves), frames(Duration::from_millis(10), total));
    let coarse = run(schedule(1.0, 2.0, &waves), frames(Duration::from_millis(400), total));
    let uneven = run(
        schedule(1.0, 2.0, &waves),
        [30_u64, 170, 5, 795, 1200, 15, 85]
            .into_iter()
            .cycle()
            .map(Duration::from_millis)
            .take(40),
    );

    let expected = move_times(&fine);
    assert_eq!(expected.len(), 9, "both authored waves fully spawned");
    assert_eq!(move_times(&coarse), expected);
    let uneven = move_times(&uneven);
    assert!(uneven.len() >= expected.len());
    assert_eq!(uneven[..expected.len()], expected[..]);

    let first = expected[0].1;
    let second = expected[1].1;
    assert_eq!(first, Duration::from_millis(1500));
    assert_eq!(second - first, Duration::from_millis(750));
}

#[test]
fn next_wave_waits_for_the_previous_wave_to_finish() {
    let records = run(
        schedule(0.0, 2.0, &[("R", 3, 1.0), ("T", 1, 1.0)]),
        frames(Duration::from_millis(100), Duration::from_secs(5)),
    );

    let ended_first = records
        .iter()
        .find_map(|record| match record {
            Record::Ended { wave: 1, at } => Some(*at),
            _ => None,
        })
        .expect("first wave ends");
    let started_second = records
        .iter()
        .find_map(|record| match record {
            Record::Started { wave: 2, at } => Some(*at),
            _ => None,
        })
        .expect("second wave starts");

    assert_eq!(ended_first, Duration::from_millis(2000));
    assert_eq!(started_second, Duration::from_millis(4000));

    let spawned_before_second: usize = records
        .iter()
        .take_while(|record| !matches!(record, Record::Started { wave: 2, .. }))
        .filter(|record| matches!(record, Record::Moves { wave: 1, .. }))
        .count();
    assert_eq!(spawned_before_second, 3);
}

#[test]
fn waves_continue_past_the_authored_schedule() {
    let records = run(
        schedule(0.0, 0.5, &[("R", 2, 0.1)]),
        frames(Duration::from_millis(50), Duration::from_secs(3)),
    );

    let started: Vec<u32> = records
        .iter()
        .filter_map(|record| match record {
            Record::Started { wave, .. } => Some(*wave),
            _ => None,
        })
        .collect();
    assert!(started.len() >= 4, "endless waves keep starting: {started:?}");
    assert_eq!(&started[..4], &[1, 2, 3, 4]);

    for wave in 1..=3 {
        let spawned = move_times(&records)
            .iter()
            .filter(|(spawned_wave, _)| *spawned_wave == wave)
            .count();
        assert_eq!(spawned, 2, "wave {wave} spawns its full roster");
    }
}

#[test]
fn deterministic_replay_produces_identical_sequence() {
    let script = || {
        [16_u64, 16, 17, 250, 3, 1000, 16, 16, 4000, 33]
            .into_iter()
            .cycle()
            .take(60)
            .map(Duration::from_millis)
    };

    let first = run(WaveSchedule::default(), script());
    let second = run(WaveSchedule::default(), script());

    assert_eq!(first, second, "replay diverged between runs");
    assert!(matches!(first.first(), Some(Record::Started { wave: 1, .. })));
}
