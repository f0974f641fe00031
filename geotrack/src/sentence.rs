//! Decoding of single NMEA text lines into fix fragments.
//!
//! The decoder never fails: truncated lines and unparsable tokens resolve to
//! empty/zero values, since corrupt data at line boundaries is expected on a
//! serial link. Zero coordinates are treated downstream as "no data".

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::{
    constants::{
        CENTURY_OFFSET, GGA_ALTITUDE, GGA_LATITUDE, GGA_LATITUDE_HEMISPHERE, GGA_LONGITUDE,
        GGA_LONGITUDE_HEMISPHERE, GGA_SATELLITES, NMEA_ACTIVE_STATUS, NMEA_FIELD_SEPARATOR,
        POSITION_FIX_TAG, RMC_DATE, RMC_STATUS, RMC_TIME, TIME_DATE_FIX_TAG,
    },
    error::DateTimeError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Reads the hemisphere from the first character of a token.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim_start().chars().next()? {
            'N' => Some(Hemisphere::North),
            'S' => Some(Hemisphere::South),
            'E' => Some(Hemisphere::East),
            'W' => Some(Hemisphere::West),
            _ => None,
        }
    }

    pub fn is_negative(self) -> bool {
        matches!(self, Hemisphere::South | Hemisphere::West)
    }
}

/// Coordinate as transmitted: `DDMM.MMMM` / `DDDMM.MMMM` plus hemisphere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Coordinate {
    pub magnitude: f64,
    pub hemisphere: Option<Hemisphere>,
}

impl Coordinate {
    pub fn new(magnitude: f64, hemisphere: Option<Hemisphere>) -> Self {
        Self {
            magnitude,
            hemisphere,
        }
    }

    /// Converts degrees-minutes to signed decimal degrees.
    pub fn to_decimal_degrees(self) -> f64 {
        let degrees = (self.magnitude / 100.0).trunc();
        let minutes = self.magnitude - degrees * 100.0;
        let decimal = degrees + minutes / 60.0;
        match self.hemisphere {
            Some(hemisphere) if hemisphere.is_negative() => -decimal,
            _ => decimal,
        }
    }
}

/// Fragment of a `GGA` sentence
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PositionFix {
    pub latitude: Coordinate,
    pub longitude: Coordinate,
    pub satellites: u32,
    pub altitude: f64,
}

impl PositionFix {
    /// Latitude in decimal degrees, or the 0 sentinel when out of [-90, 90].
    pub fn latitude_degrees(&self) -> f64 {
        within(self.latitude.to_decimal_degrees(), 90.0)
    }

    /// Longitude in decimal degrees, or the 0 sentinel when out of [-180, 180].
    pub fn longitude_degrees(&self) -> f64 {
        within(self.longitude.to_decimal_degrees(), 180.0)
    }
}

fn within(value: f64, bound: f64) -> f64 {
    if (-bound..=bound).contains(&value) {
        value
    } else {
        0.0
    }
}

/// Fragment of a `RMC` sentence. `year` is the raw two-digit field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeDateFix {
    pub active: bool,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub day: u32,
    pub month: u32,
    pub year: u32,
}

impl TimeDateFix {
    pub fn full_year(&self) -> u32 {
        CENTURY_OFFSET.saturating_add(self.year)
    }

    /// ISO-8601 UTC timestamp with second precision, e.g. `2024-03-02T15:30:45Z`.
    ///
    /// Fields are formatted as received, without calendar validation.
    pub fn timestamp(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
            self.full_year(),
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second
        )
    }

    pub fn datetime(&self) -> Result<NaiveDateTime, DateTimeError> {
        let year = i32::try_from(self.full_year()).map_err(|_| DateTimeError::InvalidDate)?;
        let date = NaiveDate::from_ymd_opt(year, self.month, self.day)
            .ok_or(DateTimeError::InvalidDate)?;
        let time = NaiveTime::from_hms_opt(self.hour, self.minute, self.second)
            .ok_or(DateTimeError::InvalidTime)?;
        Ok(NaiveDateTime::new(date, time))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawFragment {
    PositionFix(PositionFix),
    TimeDateFix(TimeDateFix),
}

/// Decodes one line. Returns `None` when the sentence kind is not recognized.
pub fn decode(line: &str) -> Option<RawFragment> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.starts_with(POSITION_FIX_TAG) {
        let fields = Fields::split(line);
        Some(RawFragment::PositionFix(decode_position_fix(&fields)))
    } else if line.starts_with(TIME_DATE_FIX_TAG) {
        let fields = Fields::split(line);
        Some(RawFragment::TimeDateFix(decode_time_date_fix(&fields)))
    } else {
        None
    }
}

fn decode_position_fix(fields: &Fields<'_>) -> PositionFix {
    PositionFix {
        latitude: Coordinate::new(
            fields.number(GGA_LATITUDE),
            Hemisphere::from_token(fields.get(GGA_LATITUDE_HEMISPHERE)),
        ),
        longitude: Coordinate::new(
            fields.number(GGA_LONGITUDE),
            Hemisphere::from_token(fields.get(GGA_LONGITUDE_HEMISPHERE)),
        ),
        satellites: fields.count(GGA_SATELLITES),
        altitude: fields.number(GGA_ALTITUDE),
    }
}

fn decode_time_date_fix(fields: &Fields<'_>) -> TimeDateFix {
    if fields.get(RMC_STATUS) != NMEA_ACTIVE_STATUS {
        return TimeDateFix::default();
    }

    let time = fields.get(RMC_TIME);
    let date = fields.get(RMC_DATE);
    TimeDateFix {
        active: true,
        hour: two_digits(time, 0),
        minute: two_digits(time, 2),
        second: two_digits(time, 4),
        day: two_digits(date, 0),
        month: two_digits(date, 2),
        year: two_digits(date, 4),
    }
}

/// Positional tokens of a sentence; missing tokens read as empty.
struct Fields<'a> {
    tokens: Vec<&'a str>,
}

impl<'a> Fields<'a> {
    fn split(line: &'a str) -> Self {
        Self {
            tokens: line.split(NMEA_FIELD_SEPARATOR).collect(),
        }
    }

    fn get(&self, index: usize) -> &'a str {
        self.tokens.get(index).copied().unwrap_or_default()
    }

    fn number(&self, index: usize) -> f64 {
        self.get(index)
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(0.0)
    }

    fn count(&self, index: usize) -> u32 {
        self.get(index).trim().parse().unwrap_or(0)
    }
}

/// Parses the two characters at `start`, a short slice parses what is left.
fn two_digits(token: &str, start: usize) -> u32 {
    let end = core::cmp::min(start + 2, token.len());
    token
        .get(start..end)
        .and_then(|digits| digits.parse().ok())
        .unwrap_or(0)
}
