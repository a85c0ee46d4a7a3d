//! Trace replay demonstration
//!
//! Replays a recorded attitude stream through a shared session the way a live
//! viewer would: one thread delivers packets at the sensor rate while the main
//! thread renders at 60 Hz. Halfway through the operator re-zeroes yaw, and
//! near the end the link drops.
//!
//! Run with: `cargo run --example replay [config.toml]`
//! Set `RUST_LOG=quad_attitude=debug` to see dropped packets.

use std::error::Error;
use std::thread;
use std::time::{Duration, Instant};

use quad_attitude::{Connectivity, EulerAngles, KernelConfig, Session, SharedSession, packet};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
struct TraceRow {
    time: f64,
    r: f64,
    p: f64,
    y: f64,
}

const FRAME_PERIOD: Duration = Duration::from_micros(16_667);
const SPEEDUP: f64 = 4.0;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "quad_attitude=info".into()),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => KernelConfig::load(path)?,
        None => KernelConfig::default(),
    };

    let mut reader = csv::Reader::from_path("testdata/attitude_trace.csv")?;
    let mut rows = Vec::new();
    for result in reader.deserialize() {
        let row: TraceRow = result?;
        rows.push(row);
    }
    let duration = rows.last().map_or(0.0, |row| row.time) / SPEEDUP;
    info!(samples = rows.len(), seconds = duration, "replaying trace");

    let session = SharedSession::new(Session::with_config(&config));
    session.set_connectivity(Connectivity::Connected);

    let producer = session.clone();
    let sender = thread::spawn(move || {
        let start = Instant::now();
        for (i, row) in rows.iter().enumerate() {
            let due = Duration::from_secs_f64(row.time / SPEEDUP);
            if let Some(wait) = due.checked_sub(start.elapsed()) {
                thread::sleep(wait);
            }
            // A transport occasionally hands over a status line instead of a sample
            if i % 250 == 0 {
                producer.handle_packet("sensor ok");
            }
            producer.handle_packet(&packet::encode_euler(&EulerAngles::new(row.r, row.p, row.y)));
        }
    });

    let start = Instant::now();
    let mut last = start;
    let mut frames = 0u32;
    let mut yaw_reset = false;
    let mut link_dropped = false;

    while !sender.is_finished() {
        thread::sleep(FRAME_PERIOD);
        let now = Instant::now();
        let frame = session.tick(now - last);
        last = now;
        frames += 1;

        let elapsed = start.elapsed().as_secs_f64();
        if !yaw_reset && elapsed > duration / 2.0 {
            session.reset_yaw();
            yaw_reset = true;
        }
        if !link_dropped && elapsed > duration * 0.9 {
            session.set_connectivity(Connectivity::Disconnected);
            link_dropped = true;
        }

        if frames % 30 == 0 {
            println!(
                "{}  {}  duty {:?}",
                frame.orientation.euler,
                frame.command,
                frame.command.duty_cycles()
            );
        }
    }

    if sender.join().is_err() {
        return Err("packet thread panicked".into());
    }
    info!(frames, "replay finished");
    Ok(())
}
