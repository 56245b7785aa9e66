//! Simulation drivers
//!
//! One [`Engine`] value owns everything that persists across ticks: the
//! per-subject state map, the engine-side snapshot cache, the sleep-day
//! tracker and the injected noise source. [`Engine::live_tick`] advances the
//! whole roster by exactly one tick and is the unit an external scheduler
//! invokes; [`Engine::backfill`] replays the same per-tick logic over a past
//! window and commits the whole batch at the end.
//!
//! Per tick, per subject: trend transition -> vitals generation -> sleep
//! lookup -> scoring -> new DataPoint + assembled snapshot. Components return
//! values; only the driver writes them back.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::error::{ConfigError, EngineError};
use crate::rng::{NoiseSource, PrngNoise};
use crate::scoring::{classify_stress, wellness_index};
use crate::sleep::SleepModel;
use crate::state::SubjectState;
use crate::store::TelemetryStore;
use crate::transport::UpdateSink;
use crate::trend::TrendStateMachine;
use crate::types::{DataPoint, Subject, TickMode};
use crate::vitals::VitalsGenerator;

/// What happened during one live tick
#[derive(Debug, Clone)]
pub struct TickReport {
    /// DataPoints produced (one per subject in the roster)
    pub points: usize,
    /// Whether the batch reached storage; `false` leaves the in-memory state
    /// ahead of storage until the next successful tick
    pub committed: bool,
    /// Updates delivered to the transport after the commit
    pub delivered: usize,
}

/// What happened during one backfill run
#[derive(Debug, Clone)]
pub struct BackfillReport {
    /// Subjects replayed
    pub subjects: usize,
    /// Steps walked through the window
    pub steps: usize,
    /// DataPoints committed (subjects x steps)
    pub points: usize,
}

/// Stateful simulation engine hosting both drivers
pub struct Engine {
    config: EngineConfig,
    noise: Box<dyn NoiseSource>,
    states: BTreeMap<Uuid, SubjectState>,
    snapshots: BTreeMap<Uuid, Subject>,
    sleep: SleepModel,
}

impl Engine {
    /// Engine with entropy-seeded randomness
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Self::with_noise(config, Box::new(PrngNoise::from_entropy()))
    }

    /// Engine with a pinned seed; the same seed over the same roster and
    /// timestamps replays the same series
    pub fn with_seed(config: EngineConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_noise(config, Box::new(PrngNoise::seeded(seed)))
    }

    /// Engine with a caller-supplied noise source. Rejects a configuration
    /// whose sampling ranges are inverted.
    pub fn with_noise(
        config: EngineConfig,
        noise: Box<dyn NoiseSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            noise,
            states: BTreeMap::new(),
            snapshots: BTreeMap::new(),
            sleep: SleepModel::new(),
        })
    }

    /// Advance every subject in the roster by exactly one tick.
    ///
    /// Produces one DataPoint per subject, commits the batch and the updated
    /// snapshots as one unit, then pushes each snapshot through the sink.
    /// A commit failure is logged and reported, never propagated: the next
    /// tick retries forward with fresher values.
    pub fn live_tick(
        &mut self,
        store: &mut dyn TelemetryStore,
        sink: &mut dyn UpdateSink,
        now: DateTime<Utc>,
    ) -> TickReport {
        let roster = match store.list_subjects() {
            Ok(roster) => roster,
            Err(err) => {
                error!(%err, "could not load roster; skipping tick");
                return TickReport {
                    points: 0,
                    committed: false,
                    delivered: 0,
                };
            }
        };
        if roster.is_empty() {
            warn!("no subjects in roster; tick is a no-op");
            return TickReport {
                points: 0,
                committed: true,
                delivered: 0,
            };
        }

        self.roll_day(now.date_naive());

        let mut points = Vec::with_capacity(roster.len());
        let mut updated = Vec::with_capacity(roster.len());
        for subject in &roster {
            let (point, next) = self.tick_subject(subject, now, TickMode::Live);
            points.push(point);
            updated.push(next);
        }

        let committed = match store.commit_batch(&points, &updated) {
            Ok(()) => true,
            Err(err) => {
                error!(%err, "tick commit failed; storage catches up on the next successful tick");
                false
            }
        };

        let mut delivered = 0;
        if committed {
            for subject in &updated {
                match sink.push_update(subject) {
                    Ok(()) => delivered += 1,
                    Err(err) => {
                        warn!(subject = %subject.id, %err, "update delivery failed");
                    }
                }
            }
        }

        TickReport {
            points: points.len(),
            committed,
            delivered,
        }
    }

    /// Replay the tick logic over `[start, end)` at a fixed step, buffering
    /// DataPoints and committing everything (plus the final snapshots) as a
    /// single transaction. Resets all per-subject state first, so each run
    /// starts from a clean slate; storage is strictly additive.
    pub fn backfill(
        &mut self,
        store: &mut dyn TelemetryStore,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        step: Duration,
    ) -> Result<BackfillReport, EngineError> {
        if end <= start {
            return Err(EngineError::InvalidWindow { start, end });
        }
        if step <= Duration::zero() {
            return Err(EngineError::InvalidStep(step.num_seconds()));
        }

        let roster = store.list_subjects()?;
        if roster.is_empty() {
            warn!("no subjects in roster; nothing to backfill");
            return Ok(BackfillReport {
                subjects: 0,
                steps: 0,
                points: 0,
            });
        }

        self.reset();
        info!(
            %start,
            %end,
            step_secs = step.num_seconds(),
            subjects = roster.len(),
            "starting historical backfill"
        );

        let mut buffer = Vec::new();
        let mut steps = 0usize;
        let mut at = start;
        while at < end {
            self.roll_day(at.date_naive());
            for subject in &roster {
                let (point, _) = self.tick_subject(subject, at, TickMode::Backfill);
                buffer.push(point);
            }
            steps += 1;
            at = at + step;
        }

        let finals: Vec<Subject> = roster
            .iter()
            .map(|subject| {
                self.snapshots
                    .get(&subject.id)
                    .cloned()
                    .unwrap_or_else(|| subject.clone())
            })
            .collect();

        store.commit_batch(&buffer, &finals).map_err(|err| {
            error!(%err, "backfill commit failed; run aborted");
            EngineError::from(err)
        })?;

        info!(points = buffer.len(), steps, "backfill complete");
        Ok(BackfillReport {
            subjects: roster.len(),
            steps,
            points: buffer.len(),
        })
    }

    /// Forget all per-subject state, snapshots and the tracked simulation day
    pub fn reset(&mut self) {
        self.states.clear();
        self.snapshots.clear();
        self.sleep = SleepModel::new();
    }

    /// Redraw nightly sleep values for everyone when the observed day changes
    fn roll_day(&mut self, day: NaiveDate) {
        if self.sleep.advance_day_if_needed(day) {
            let noise = self.noise.as_mut();
            for state in self.states.values_mut() {
                state.resample_nightly(noise);
            }
        }
    }

    /// One subject, one tick: trend, vitals, sleep, scoring, assembly.
    fn tick_subject(
        &mut self,
        subject: &Subject,
        now: DateTime<Utc>,
        mode: TickMode,
    ) -> (DataPoint, Subject) {
        let restore_chance = self.config.stress_event_chance;
        let noise = self.noise.as_mut();
        let state = match self.states.entry(subject.id) {
            std::collections::btree_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::btree_map::Entry::Vacant(entry) => {
                info!(subject = %subject.id, name = %subject.name, "initialized simulation state");
                entry.insert(SubjectState::init(noise, &self.config))
            }
        };
        let prev = self
            .snapshots
            .get(&subject.id)
            .cloned()
            .unwrap_or_else(|| subject.clone());

        let impulse = TrendStateMachine::step(
            state,
            subject.id,
            prev.current_heart_rate,
            mode,
            restore_chance,
            noise,
        );
        let vitals = VitalsGenerator::generate(
            noise,
            state,
            prev.current_heart_rate,
            prev.current_hrv,
            impulse,
            mode,
        );
        let sleep_index = SleepModel::index_at(noise, now, state.nightly.index);
        let mwi = wellness_index(
            vitals.heart_rate,
            vitals.hrv,
            vitals.steadiness,
            state.nightly.hours,
        );
        let stress_level = classify_stress(vitals.heart_rate, vitals.hrv);
        let sleep_hours = state.nightly.hours;

        let point = DataPoint {
            subject_id: subject.id,
            timestamp: now,
            heart_rate: vitals.heart_rate,
            hrv: vitals.hrv,
            steadiness: vitals.steadiness,
            sleep_index,
            mwi,
            steps: vitals.steps,
        };
        let next = Subject {
            stress_level,
            current_heart_rate: vitals.heart_rate,
            current_hrv: vitals.hrv,
            sleep_hours_last_night: sleep_hours,
            current_steadiness: vitals.steadiness,
            current_sleep_index: sleep_index,
            mental_wellness_index: mwi,
            last_update: now,
            ..prev
        };
        self.snapshots.insert(subject.id, next.clone());

        (point, next)
    }
}
