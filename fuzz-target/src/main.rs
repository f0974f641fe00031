#[macro_use]
extern crate afl;
extern crate geotrack;

use geotrack::{decode, CurrentState, FixedBuffer, LineParser};

fn parse(chunksize: usize, data: &[u8]) {
    let mut parser = LineParser::new(FixedBuffer::<256>::new());
    let mut state = CurrentState::new();
    for chunk in data.chunks(chunksize) {
        for line in parser.consume(chunk) {
            if let Some(fragment) = decode(&line) {
                state.apply(&fragment);
            }
        }
    }
    assert_eq!(state.is_valid(), state.fix().has_position());

    // Whatever came before, a complete sentence must still get through
    let mut lines = parser.consume(b"\n$GPGGA,1,4916.45,N,12311.12,W,1,08\r\n");
    let recovered = lines.by_ref().filter_map(|line| decode(&line)).count();
    assert!(recovered >= 1);
    assert!(lines.next().is_none());
}

fn main() {
    fuzz!(|data: &[u8]| {
        if data.len() > 1 {
            let chunksize = data[0] as usize;
            if chunksize != 0 {
                parse(chunksize, &data[1..]);
            }
        }
    });
}
