//! # geotrack
//!
//! Field telemetry for a GPS receiver: decode the NMEA stream coming off a serial port,
//! keep the latest fix, and upload it to an HTTP collector every few seconds. Fixes that
//! cannot be delivered are kept in an offline buffer and re-sent once the link is back.
//!
//! An agent built on this library can be found in the geotrack_agent subfolder of this project.
//!
//! Decoding Sentences
//! ==================
//!
//! Two sentence kinds are understood: `$GPGGA` carries the position, `$GPRMC` carries the
//! time and date. Each decodes into a [RawFragment] that is applied to a [CurrentState]:
//! ```
//! use geotrack::{decode, CurrentState};
//!
//! let mut state = CurrentState::new();
//! for line in [
//!     "$GPGGA,153045,4916.45,N,12311.12,W,1,08,0.9,545.4,M,46.9,M,,*47",
//!     "$GPRMC,153045,A,4916.45,N,12311.12,W,0.5,54.7,020324,,",
//! ] {
//!     if let Some(fragment) = decode(line) {
//!         state.apply(&fragment);
//!     }
//! }
//! assert!(state.is_valid());
//! assert_eq!(state.fix().timestamp, "2024-03-02T15:30:45Z");
//! ```
//!
//! Serial data rarely arrives a line at a time. A [LineParser] reassembles lines out of
//! arbitrary chunks, the same way as `consume()` works on any byte source:
//! ```
//! use geotrack::LineParser;
//!
//! let mut parser = LineParser::default();
//! assert_eq!(parser.consume(b"$GPGGA,1,49").count(), 0);
//! let lines: Vec<String> = parser.consume(b"16.45,N\r\n").collect();
//! assert_eq!(lines, vec!["$GPGGA,1,4916.45,N\r\n".to_string()]);
//! ```
//!
//! Uploading
//! =========
//!
//! A [Tracker] ties the pieces together. It is generic over a [Transport] (how fixes leave
//! the device) and a [StatusIndicator] (how health is reported). With the `http` feature,
//! enabled by default, `HttpTransport` posts each fix as
//! `{"timestamp":[..],"lat":[..],"long":[..]}`.
//!
//! The control loop owns the clock:
//! ```no_run
//! # #[cfg(feature = "http")] {
//! use std::time::{Duration, Instant};
//! use geotrack::{HttpTransport, LogIndicator, Tracker, UploadConfig};
//!
//! let transport = HttpTransport::new(UploadConfig::new("http://collector.local/geolinker", "token"))?;
//! let mut tracker = Tracker::new(transport, LogIndicator::new(), Duration::from_secs(10), Instant::now());
//! let serial_bytes = b"$GPGGA,153045,4916.45,N,12311.12,W,1,08\r\n";
//! loop {
//!     tracker.ingest(serial_bytes);
//!     tracker.poll(Instant::now());
//! }
//! # }
//! # Ok::<(), geotrack::UplinkError>(())
//! ```

pub use crate::{
    buffer::{FixedBuffer, UnderlyingBuffer},
    error::{DateTimeError, UplinkError},
    fix::{Applied, CurrentState, Fix},
    line::{LineIter, LineParser},
    offline::OfflineBuffer,
    payload::{round6, UploadPayload},
    scheduler::{TickOutcome, UploadScheduler},
    sentence::{decode, Coordinate, Hemisphere, PositionFix, RawFragment, TimeDateFix},
    status::{LogIndicator, StatusIndicator},
    tracker::Tracker,
    transport::Transport,
};

#[cfg(feature = "http")]
pub use crate::http::{HttpClient, HttpTransport, ReqwestClient, UploadConfig};

pub mod constants;

mod buffer;
mod error;
mod fix;
#[cfg(feature = "http")]
mod http;
mod line;
mod offline;
mod payload;
mod scheduler;
mod sentence;
mod status;
mod tracker;
mod transport;
