use log::{debug, warn};

use crate::sentence::{PositionFix, RawFragment, TimeDateFix};

/// One resolved observation, the unit of upload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Fix {
    /// Signed decimal degrees, positive north
    pub latitude: f64,
    /// Signed decimal degrees, positive east
    pub longitude: f64,
    /// `YYYY-MM-DDTHH:MM:SSZ`, empty until the first active time-date sentence
    pub timestamp: String,
}

impl Fix {
    /// Zero is the "no data" sentinel, so a fix sitting exactly on the equator or the
    /// prime meridian is reported invalid as well.
    pub fn has_position(&self) -> bool {
        self.latitude != 0.0 && self.longitude != 0.0
    }
}

/// What a fragment changed in the [CurrentState].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Position { valid: bool },
    Timestamp,
    /// Inactive time-date fragment, nothing was touched
    Discarded,
}

/// Latest fix as assembled from position and time-date fragments.
///
/// Each fragment kind overwrites only its own part of the fix, there is no rollback:
/// the fix may carry a fresh position with a stale (or empty) timestamp.
#[derive(Debug, Clone, Default)]
pub struct CurrentState {
    fix: Fix,
    valid: bool,
    satellites: u32,
    altitude: f64,
}

impl CurrentState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, fragment: &RawFragment) -> Applied {
        match fragment {
            RawFragment::PositionFix(position) => self.apply_position(position),
            RawFragment::TimeDateFix(time_date) => self.apply_time_date(time_date),
        }
    }

    fn apply_position(&mut self, position: &PositionFix) -> Applied {
        self.fix.latitude = position.latitude_degrees();
        self.fix.longitude = position.longitude_degrees();
        self.satellites = position.satellites;
        self.altitude = position.altitude;
        self.valid = self.fix.has_position();

        debug!(
            "Position lat={:.6} long={:.6} alt={} sats={} valid={}",
            self.fix.latitude, self.fix.longitude, self.altitude, self.satellites, self.valid
        );
        Applied::Position { valid: self.valid }
    }

    // Never touches validity, only position gates upload.
    fn apply_time_date(&mut self, time_date: &TimeDateFix) -> Applied {
        if !time_date.active {
            debug!("Ignoring inactive time-date sentence");
            return Applied::Discarded;
        }

        if let Err(e) = time_date.datetime() {
            warn!("Time-date sentence carries {}: {}", e, time_date.timestamp());
        }
        self.fix.timestamp = time_date.timestamp();
        debug!("Timestamp {}", self.fix.timestamp);
        Applied::Timestamp
    }

    pub fn fix(&self) -> &Fix {
        &self.fix
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn satellites(&self) -> u32 {
        self.satellites
    }

    pub fn altitude(&self) -> f64 {
        self.altitude
    }
}
