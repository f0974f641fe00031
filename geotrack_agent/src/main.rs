use std::{
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use geotrack::{HttpTransport, LogIndicator, TickOutcome, Tracker};
use log::{debug, info};

mod cli;
mod serial;

use cli::{AgentConfig, Input};
use serial::{ByteSource, ReplaySource, SerialSource};

const READ_CHUNK: usize = 1024;
const IDLE_SLEEP: Duration = Duration::from_millis(10);

fn main() -> Result<()> {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .format_target(false)
        .filter_level(log::LevelFilter::Info)
        .parse_env("LOG_LEVEL")
        .init();

    let matches = cli::agent_args().get_matches();
    let config = AgentConfig::from_matches(&matches)?;

    let mut source: Box<dyn ByteSource> = match &config.input {
        Input::Serial { port, baud } => Box::new(SerialSource::open(port, *baud)?),
        Input::Replay { path, line_delay } => Box::new(ReplaySource::open(path, *line_delay)?),
    };

    info!(
        "Uploading to {} every {:?}",
        config.upload.endpoint, config.interval
    );
    let transport = HttpTransport::new(config.upload.clone())
        .with_context(|| format!("Invalid collector endpoint {}", config.upload.endpoint))?;
    let mut tracker = Tracker::new(transport, LogIndicator::new(), config.interval, Instant::now());

    run(source.as_mut(), &mut tracker)
}

/// Single-threaded control loop: read whatever is available, then give the scheduler a
/// chance to run. Uploads happen inline and are bounded by the transport timeouts.
fn run(source: &mut dyn ByteSource, tracker: &mut Tracker<HttpTransport, LogIndicator>) -> Result<()> {
    let mut buf = [0u8; READ_CHUNK];
    let mut input_done = false;
    loop {
        let nbytes = source
            .read_available(&mut buf)
            .context("Failed to read GPS data")?;
        if nbytes > 0 {
            tracker.ingest(&buf[..nbytes]);
        }

        match tracker.poll(Instant::now()) {
            TickOutcome::Waiting => {},
            outcome => debug!(
                "Evaluation: {:?}, {} fix(es) buffered",
                outcome,
                tracker.backlog().len()
            ),
        }

        if nbytes == 0 {
            if !input_done && source.is_finished() {
                info!("Input exhausted, uploads continue with the last fix");
                input_done = true;
            }
            thread::sleep(IDLE_SLEEP);
        }
    }
}
