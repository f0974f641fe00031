use core::time::Duration;

pub const POSITION_FIX_TAG: &str = "$GPGGA";
pub const TIME_DATE_FIX_TAG: &str = "$GPRMC";

pub const NMEA_FIELD_SEPARATOR: char = ',';
pub const NMEA_END_CHAR: u8 = 0x0a; // '\n' (<LF>)
pub(crate) const NMEA_ACTIVE_STATUS: &str = "A";

// Position-fix (GGA) token positions
pub(crate) const GGA_LATITUDE: usize = 2;
pub(crate) const GGA_LATITUDE_HEMISPHERE: usize = 3;
pub(crate) const GGA_LONGITUDE: usize = 4;
pub(crate) const GGA_LONGITUDE_HEMISPHERE: usize = 5;
pub(crate) const GGA_SATELLITES: usize = 7;
pub(crate) const GGA_ALTITUDE: usize = 9;

// Time-date-fix (RMC) token positions
pub(crate) const RMC_TIME: usize = 1;
pub(crate) const RMC_STATUS: usize = 2;
pub(crate) const RMC_DATE: usize = 9;

/// Two-digit years in time-date-fix sentences are offset from this century.
pub const CENTURY_OFFSET: u32 = 2000;

/// Longest line kept by the line accumulator, longer lines are dropped.
pub const MAX_LINE_LEN: usize = 256;

pub const DEFAULT_UPLOAD_INTERVAL: Duration = Duration::from_millis(10_000);
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(5_000);
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1_000);

pub const HTTP_OK: u16 = 200;
pub const HTTP_CREATED: u16 = 201;
