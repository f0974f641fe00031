use core::cmp::min;

use log::warn;

use crate::{
    buffer::UnderlyingBuffer,
    constants::{MAX_LINE_LEN, NMEA_END_CHAR},
};

/// Streaming line accumulator for serial input. The default constructor will build a
/// parser containing a Vec, but you can pass your own underlying buffer by passing it
/// to `LineParser::new()`.
///
/// Partial lines stay buffered between calls to `consume()`, so the caller may feed
/// whatever bytes the port has available and come back later for the rest.
pub struct LineParser<T = Vec<u8>>
where
    T: UnderlyingBuffer,
{
    buf: T,
    max_line_len: usize,
    // Set after an overlong line until its terminator shows up
    discarding: bool,
}

impl Default for LineParser<Vec<u8>> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: UnderlyingBuffer> LineParser<T> {
    pub fn new(underlying: T) -> Self {
        let max_line_len = min(MAX_LINE_LEN, underlying.max_capacity());
        Self {
            buf: underlying,
            max_line_len,
            discarding: false,
        }
    }

    /// Overrides the longest accepted line, terminator included. The limit never
    /// exceeds the capacity of the underlying buffer.
    pub fn with_max_line_len(mut self, max_line_len: usize) -> Self {
        self.max_line_len = min(max_line_len, self.buf.max_capacity());
        self
    }

    pub fn is_buffer_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn buffer_len(&self) -> usize {
        self.buf.len()
    }

    /// Adds `new_data` and returns an iterator over every line it completes.
    ///
    /// Bytes left unread when the iterator is dropped are lost, so drain it.
    pub fn consume<'a>(&'a mut self, new_data: &'a [u8]) -> LineIter<'a, T> {
        LineIter {
            parser: self,
            new_data,
        }
    }
}

/// Iterator over the complete lines of one `consume()` call, terminator included.
pub struct LineIter<'a, T: UnderlyingBuffer> {
    parser: &'a mut LineParser<T>,
    new_data: &'a [u8],
}

impl<T: UnderlyingBuffer> Iterator for LineIter<'_, T> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while !self.new_data.is_empty() {
            let data = self.new_data;
            let (chunk, terminated) = match data.iter().position(|b| *b == NMEA_END_CHAR) {
                Some(pos) => (&data[..=pos], true),
                None => (data, false),
            };
            self.new_data = &data[chunk.len()..];

            let parser = &mut *self.parser;
            if parser.discarding {
                parser.discarding = !terminated;
                continue;
            }

            let lost = parser.buf.extend_from_slice(chunk);
            if lost > 0 || parser.buf.len() > parser.max_line_len {
                warn!("Dropping line longer than {} bytes", parser.max_line_len);
                parser.buf.clear();
                parser.discarding = !terminated;
                continue;
            }

            if terminated {
                let line = String::from_utf8_lossy(parser.buf.as_slice()).into_owned();
                parser.buf.clear();
                return Some(line);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::FixedBuffer;

    const GGA: &[u8] = b"$GPGGA,123519,4916.45,N,12311.12,W,1,08,0.9,545.4,M,46.9,M,,*47\r\n";

    fn lines<T: UnderlyingBuffer>(parser: &mut LineParser<T>, data: &[u8]) -> Vec<String> {
        parser.consume(data).collect()
    }

    #[test]
    fn empty_input() {
        let mut parser = LineParser::default();
        assert!(parser.is_buffer_empty());
        assert!(lines(&mut parser, &[]).is_empty());
        assert!(parser.is_buffer_empty());
    }

    #[test]
    fn line_byte_by_byte() {
        let mut parser = LineParser::default();
        for b in GGA.iter().take(GGA.len() - 1) {
            assert!(lines(&mut parser, &[*b]).is_empty());
            assert!(!parser.is_buffer_empty());
        }
        let last_byte = GGA[GGA.len() - 1];
        assert_eq!(
            lines(&mut parser, &[last_byte]),
            vec![String::from_utf8_lossy(GGA).into_owned()]
        );
        assert!(parser.is_buffer_empty());
    }

    #[test]
    fn two_lines_in_one_go() {
        let mut parser = LineParser::default();
        let mut data = GGA.to_vec();
        data.extend_from_slice(b"$GPRMC,1\n$GPG");
        let got = lines(&mut parser, &data);
        assert_eq!(got.len(), 2);
        assert_eq!(got[1], "$GPRMC,1\n");
        assert_eq!(parser.buffer_len(), 4);

        assert_eq!(lines(&mut parser, b"SV\n"), vec!["$GPGSV\n".to_string()]);
    }

    #[test]
    fn overlong_line_dropped_until_newline() {
        let mut parser = LineParser::default().with_max_line_len(16);
        assert!(lines(&mut parser, b"$GPGGA,0123456789").is_empty());
        assert!(parser.is_buffer_empty());
        assert!(lines(&mut parser, b"0123456789").is_empty());
        assert_eq!(
            lines(&mut parser, b"tail\n$GPRMC\n"),
            vec!["$GPRMC\n".to_string()]
        );
    }

    #[test]
    fn fixed_buffer_overflow() {
        let mut parser = LineParser::new(FixedBuffer::<8>::new());
        assert_eq!(
            lines(&mut parser, b"$GPGGA,1,2,3\n$GP\n"),
            vec!["$GP\n".to_string()]
        );
        assert_eq!(lines(&mut parser, b"1234567\n"), vec!["1234567\n".to_string()]);
    }

    #[test]
    fn invalid_utf8_is_lossy() {
        let mut parser = LineParser::default();
        let got = lines(&mut parser, b"$GP\xffGGA\n");
        assert_eq!(got, vec!["$GP\u{fffd}GGA\n".to_string()]);
    }
}
