//! Replay a seeded night shift and stream the snapshot updates as NDJSON

use chrono::{Duration, TimeZone, Utc};
use wardpulse::{populate_if_empty, sample_roster, Engine, EngineConfig, MemoryStore, NdjsonSink};

fn main() {
    let shift_start = Utc.with_ymd_and_hms(2024, 3, 4, 22, 0, 0).unwrap();
    let shift_end = shift_start + Duration::hours(8);

    let mut store = MemoryStore::new();
    if let Err(e) = populate_if_empty(&mut store, &sample_roster(), shift_start) {
        eprintln!("Error: {e}");
        return;
    }

    // same seed, same shift: rerunning this program reproduces every value
    let mut engine = match Engine::with_seed(EngineConfig::default(), 7) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            return;
        }
    };
    let mut sink = NdjsonSink::new(std::io::stdout());

    let mut now = shift_start;
    while now < shift_end {
        engine.live_tick(&mut store, &mut sink, now);
        now = now + Duration::minutes(1);
    }
}
