use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches};
use geotrack::UploadConfig;

/// Where NMEA bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Serial { port: String, baud: u32 },
    /// Recorded NMEA log, fed one line every `line_delay`
    Replay { path: PathBuf, line_delay: Duration },
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub input: Input,
    pub upload: UploadConfig,
    pub interval: Duration,
}

pub fn agent_args() -> clap::Command {
    clap::Command::new("geotrack-agent")
        .about("Reads NMEA fixes from a GPS receiver and uploads them to a collector")
        .version(clap::crate_version!())
        .arg(
            Arg::new("port")
                .value_name("port")
                .short('p')
                .long("port")
                .required_unless_present("replay")
                .conflicts_with("replay")
                .help("Serial port the GPS receiver is connected to"),
        )
        .arg(
            Arg::new("baud")
                .value_name("baud")
                .short('s')
                .long("baud")
                .default_value("9600")
                .value_parser(value_parser!(u32))
                .help("Baud rate for the selected port"),
        )
        .arg(
            Arg::new("replay")
                .value_name("file")
                .long("replay")
                .value_parser(value_parser!(PathBuf))
                .help("Read NMEA sentences from a recorded log instead of a serial port"),
        )
        .arg(
            Arg::new("replay-line-ms")
                .value_name("ms")
                .long("replay-line-ms")
                .default_value("100")
                .value_parser(value_parser!(u64))
                .help("Delay between two replayed lines"),
        )
        .arg(
            Arg::new("endpoint")
                .value_name("url")
                .short('e')
                .long("endpoint")
                .env("GEOTRACK_ENDPOINT")
                .required(true)
                .help("Collector URL fixes are POSTed to"),
        )
        .arg(
            Arg::new("token")
                .value_name("token")
                .short('t')
                .long("token")
                .env("GEOTRACK_TOKEN")
                .hide_env_values(true)
                .required(true)
                .help("Value of the Authorization header"),
        )
        .arg(
            Arg::new("proxy")
                .value_name("url")
                .long("proxy")
                .env("GEOTRACK_PROXY")
                .help("HTTP proxy for uploads. HTTP_PROXY and friends are not consulted"),
        )
        .arg(
            Arg::new("interval-ms")
                .value_name("ms")
                .long("interval-ms")
                .default_value("10000")
                .value_parser(value_parser!(u64).range(1..))
                .help("Time between two upload evaluations"),
        )
        .arg(
            Arg::new("send-timeout-ms")
                .value_name("ms")
                .long("send-timeout-ms")
                .default_value("5000")
                .value_parser(value_parser!(u64).range(1..))
                .help("Upper bound on a single upload"),
        )
        .arg(
            Arg::new("probe-timeout-ms")
                .value_name("ms")
                .long("probe-timeout-ms")
                .default_value("1000")
                .value_parser(value_parser!(u64).range(1..))
                .help("Upper bound on the collector reachability check"),
        )
}

fn millis(matches: &ArgMatches, id: &str) -> Result<Duration> {
    matches
        .get_one::<u64>(id)
        .copied()
        .map(Duration::from_millis)
        .with_context(|| format!("Missing '{}' argument", id))
}

impl AgentConfig {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let input = match matches.get_one::<PathBuf>("replay") {
            Some(path) => Input::Replay {
                path: path.clone(),
                line_delay: millis(matches, "replay-line-ms")?,
            },
            None => Input::Serial {
                port: matches
                    .get_one::<String>("port")
                    .cloned()
                    .context("Expected 'port' or 'replay' argument")?,
                baud: matches.get_one::<u32>("baud").copied().unwrap_or(9600),
            },
        };

        let endpoint = matches
            .get_one::<String>("endpoint")
            .context("Missing collector endpoint")?;
        let token = matches
            .get_one::<String>("token")
            .context("Missing authorization token")?;
        let mut upload = UploadConfig::new(endpoint.as_str(), token.as_str());
        upload.send_timeout = millis(matches, "send-timeout-ms")?;
        upload.probe_timeout = millis(matches, "probe-timeout-ms")?;
        upload.proxy = matches.get_one::<String>("proxy").cloned();

        Ok(Self {
            input,
            upload,
            interval: millis(matches, "interval-ms")?,
        })
    }
}
