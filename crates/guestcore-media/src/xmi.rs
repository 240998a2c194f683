//! XMI to Standard MIDI Format 0 conversion.
//!
//! XMI interleaves note durations into the event stream instead of carrying
//! Note-Off events, and spaces events with runs of sub-0x80 delay bytes on a
//! fixed 120 Hz clock. Conversion schedules a synthetic Note-Off for every
//! Note-On in a min-heap, releases them in tick order as delays elapse, and
//! rescales every emitted delta to a 960 ticks-per-quarter SMF timebase
//! under the tempo in force at emission time.
//!
//! Output is running-status-free: every channel message carries its status
//! byte.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use byteorder::{BigEndian, ByteOrder};

use crate::error::{MediaError, MediaResult};

/// SMF output timebase, ticks per quarter note.
pub const SMF_TIMEBASE: u16 = 960;
/// Default tempo, microseconds per quarter note.
const DEFAULT_TEMPO: u64 = 500_000;
/// Fixed byte length of the XMI container preamble.
const PREAMBLE_LEN: usize = 4 * 12 + 2;

/// Scheduled synthetic Note-Off. Ordered by tick, then insertion order.
type OffEvent = (u64, u64, u8, u8);

/// Convert one XMI song into an SMF Format 0 byte stream.
pub fn convert_xmi(xmi: &[u8]) -> MediaResult<Vec<u8>> {
    let events = locate_event_stream(xmi)?;
    let track = convert_events(events)?;

    let mut out = Vec::with_capacity(track.len() + 22);
    out.extend_from_slice(b"MThd");
    out.extend_from_slice(&6u32.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes()); // format 0
    out.extend_from_slice(&1u16.to_be_bytes()); // one track
    out.extend_from_slice(&SMF_TIMEBASE.to_be_bytes());
    out.extend_from_slice(b"MTrk");
    out.extend_from_slice(&(track.len() as u32).to_be_bytes());
    out.extend_from_slice(&track);
    Ok(out)
}

/// Skip the preamble and the optional `TIMB`/`RBRN` tables, returning the
/// `EVNT` payload.
fn locate_event_stream(xmi: &[u8]) -> MediaResult<&[u8]> {
    let mut pos = PREAMBLE_LEN;
    if xmi.len() < pos {
        return Err(MediaError::XmiTruncated { offset: xmi.len() });
    }

    if xmi[pos..].starts_with(b"TIMB") {
        let len = read_chunk_len(xmi, pos + 4)? as usize;
        pos = checked_advance(xmi, pos + 8, len)?;
    }

    if xmi[pos..].starts_with(b"RBRN") {
        // Length-tagged like the others, but the table size comes from the
        // 16-bit branch count that follows the length field.
        let _len = read_chunk_len(xmi, pos + 4)?;
        if xmi.len() < pos + 10 {
            return Err(MediaError::XmiTruncated { offset: xmi.len() });
        }
        let branches = u16::from(xmi[pos + 8]) | (u16::from(xmi[pos + 9]) << 8);
        pos = checked_advance(xmi, pos + 10, usize::from(branches) * 6)?;
    }

    if !xmi[pos..].starts_with(b"EVNT") {
        return Err(MediaError::XmiBadContainer {
            reason: "missing EVNT chunk",
        });
    }
    let len = read_chunk_len(xmi, pos + 4)? as usize;
    let start = pos + 8;
    if xmi.len() < start + len {
        return Err(MediaError::XmiTruncated { offset: xmi.len() });
    }
    Ok(&xmi[start..start + len])
}

fn read_chunk_len(xmi: &[u8], at: usize) -> MediaResult<u32> {
    if xmi.len() < at + 4 {
        return Err(MediaError::XmiTruncated { offset: xmi.len() });
    }
    Ok(BigEndian::read_u32(&xmi[at..at + 4]))
}

fn checked_advance(xmi: &[u8], from: usize, by: usize) -> MediaResult<usize> {
    let to = from + by;
    if to > xmi.len() {
        return Err(MediaError::XmiTruncated { offset: xmi.len() });
    }
    Ok(to)
}

/// Emits the MTrk event bytes with tempo-scaled delta times.
struct TrackWriter {
    out: Vec<u8>,
    /// Microseconds per quarter note currently in force.
    tempo: u64,
    /// XMI tick where the current tempo segment began.
    seg_start_xmi: u64,
    /// SMF tick corresponding to `seg_start_xmi`.
    seg_start_smf: u64,
    /// SMF tick of the last emitted event.
    cursor_smf: u64,
}

impl TrackWriter {
    fn new() -> Self {
        Self {
            out: Vec::new(),
            tempo: DEFAULT_TEMPO,
            seg_start_xmi: 0,
            seg_start_smf: 0,
            cursor_smf: 0,
        }
    }

    /// Map an absolute XMI tick to an absolute SMF tick.
    ///
    /// `960 · 500000 / (tempo · 120)` reduces to `4_000_000 / tempo`.
    /// Scaling the cumulative position of each tempo segment (rather than
    /// each delta in isolation) keeps the emitted total equal to the
    /// rounded total.
    fn smf_tick(&self, xmi_tick: u64) -> u64 {
        let elapsed = xmi_tick - self.seg_start_xmi;
        self.seg_start_smf + (elapsed * 4_000_000 + self.tempo / 2) / self.tempo
    }

    /// Emit one event at the given absolute XMI tick.
    ///
    /// The cursor never moves backwards: when rounding under a fractional
    /// tempo maps the tick below the last emitted position, the event lands
    /// at the cursor with a zero delta.
    fn emit(&mut self, xmi_tick: u64, event: &[u8]) {
        let target = self.smf_tick(xmi_tick).max(self.cursor_smf);
        write_vlq(&mut self.out, target - self.cursor_smf);
        self.out.extend_from_slice(event);
        self.cursor_smf = target;
    }

    /// Emit the End-of-Track meta at the cursor, zero delta.
    fn end_of_track(&mut self) {
        write_vlq(&mut self.out, 0);
        self.out.extend_from_slice(&[0xFF, 0x2F, 0x00]);
    }

    /// Rebase the tempo segment after a tempo meta took effect.
    fn set_tempo(&mut self, xmi_tick: u64, tempo: u64) {
        self.seg_start_smf = self.smf_tick(xmi_tick);
        self.seg_start_xmi = xmi_tick;
        self.tempo = tempo.max(1);
    }
}

fn convert_events(events: &[u8]) -> MediaResult<Vec<u8>> {
    let mut writer = TrackWriter::new();
    let mut heap: BinaryHeap<Reverse<OffEvent>> = BinaryHeap::new();
    let mut seq = 0u64;
    let mut tick = 0u64;
    let mut pos = 0usize;
    let mut ended = false;

    fn take<'a>(events: &'a [u8], pos: &mut usize, n: usize) -> MediaResult<&'a [u8]> {
        if *pos + n > events.len() {
            return Err(MediaError::XmiTruncated { offset: events.len() });
        }
        let slice = &events[*pos..*pos + n];
        *pos += n;
        Ok(slice)
    }

    while pos < events.len() {
        let byte = events[pos];

        if byte < 0x80 {
            // Delay run: 0x7F bytes accumulate, the first sub-0x80 byte ends
            // the run.
            let mut delay = 0u64;
            while pos < events.len() && events[pos] == 0x7F {
                delay += 0x7F;
                pos += 1;
            }
            if pos >= events.len() {
                return Err(MediaError::XmiTruncated { offset: events.len() });
            }
            delay += u64::from(events[pos]);
            pos += 1;

            let target = tick + delay;
            drain_due(&mut writer, &mut heap, target);
            tick = target;
            continue;
        }

        pos += 1;
        match byte {
            0xFF => {
                let meta_type = take(events, &mut pos, 1)?[0];
                if meta_type == 0x2F {
                    drain_all(&mut writer, &mut heap);
                    writer.emit(tick, &[0xFF, 0x2F, 0x00]);
                    ended = true;
                    break;
                }
                let len = usize::from(take(events, &mut pos, 1)?[0]);
                let payload = take(events, &mut pos, len)?.to_vec();

                let mut event = vec![0xFF, meta_type, len as u8];
                event.extend_from_slice(&payload);
                writer.emit(tick, &event);

                if meta_type == 0x51 && len == 3 {
                    let tempo = u64::from(BigEndian::read_u24(&payload));
                    writer.set_tempo(tick, tempo);
                }
            }
            status if status & 0xF0 == 0x90 => {
                let data = take(events, &mut pos, 2)?;
                let (note, velocity) = (data[0], data[1]);
                writer.emit(tick, &[status, note, velocity]);

                let duration = read_vlq(events, &mut pos)?;
                heap.push(Reverse((tick + duration, seq, status & 0x8F, note)));
                seq += 1;
            }
            status if matches!(status & 0xF0, 0xC0 | 0xD0) => {
                let data = take(events, &mut pos, 1)?[0];
                writer.emit(tick, &[status, data]);
            }
            status if matches!(status & 0xF0, 0x80 | 0xA0 | 0xB0 | 0xE0) => {
                let data = take(events, &mut pos, 2)?.to_vec();
                writer.emit(tick, &[status, data[0], data[1]]);
            }
            // 0xF0..0xFE system messages do not occur in shipped songs;
            // skip the status byte the way the original player does.
            _ => {}
        }
    }

    if !ended {
        drain_all(&mut writer, &mut heap);
        writer.end_of_track();
    }

    Ok(writer.out)
}

/// Emit every scheduled Note-Off due at or before `target`, in tick order.
fn drain_due(writer: &mut TrackWriter, heap: &mut BinaryHeap<Reverse<OffEvent>>, target: u64) {
    while let Some(&Reverse((off_tick, _, status, note))) = heap.peek() {
        if off_tick > target {
            break;
        }
        heap.pop();
        writer.emit(off_tick, &[status, note, 0x7F]);
    }
}

/// Emit every remaining scheduled Note-Off at its scheduled tick.
fn drain_all(writer: &mut TrackWriter, heap: &mut BinaryHeap<Reverse<OffEvent>>) {
    while let Some(Reverse((off_tick, _, status, note))) = heap.pop() {
        writer.emit(off_tick, &[status, note, 0x7F]);
    }
}

/// Read a MIDI variable-length quantity.
fn read_vlq(bytes: &[u8], pos: &mut usize) -> MediaResult<u64> {
    let mut value = 0u64;
    loop {
        if *pos >= bytes.len() {
            return Err(MediaError::XmiTruncated { offset: bytes.len() });
        }
        let byte = bytes[*pos];
        *pos += 1;
        value = (value << 7) | u64::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            return Ok(value);
        }
    }
}

/// Write a MIDI variable-length quantity.
fn write_vlq(out: &mut Vec<u8>, mut value: u64) {
    let mut stack = [0u8; 10];
    let mut n = 0;
    stack[n] = (value & 0x7F) as u8;
    n += 1;
    value >>= 7;
    while value > 0 {
        stack[n] = (value & 0x7F) as u8 | 0x80;
        n += 1;
        value >>= 7;
    }
    while n > 0 {
        n -= 1;
        out.push(stack[n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Wrap an event stream in a minimal XMI container.
    pub(crate) fn container(events: &[u8]) -> Vec<u8> {
        let mut xmi = vec![0u8; PREAMBLE_LEN];
        xmi.extend_from_slice(b"EVNT");
        xmi.extend_from_slice(&(events.len() as u32).to_be_bytes());
        xmi.extend_from_slice(events);
        xmi
    }

    fn track_of(smf: &[u8]) -> &[u8] {
        assert_eq!(&smf[0..4], b"MThd");
        assert_eq!(&smf[14..18], b"MTrk");
        let len = u32::from_be_bytes(smf[18..22].try_into().unwrap()) as usize;
        let track = &smf[22..];
        assert_eq!(track.len(), len);
        track
    }

    #[test]
    fn header_declares_format_0_at_960_ticks() {
        let smf = convert_xmi(&container(&[])).unwrap();
        assert_eq!(&smf[4..8], &6u32.to_be_bytes());
        assert_eq!(&smf[8..10], &[0, 0]);
        assert_eq!(&smf[10..12], &[0, 1]);
        assert_eq!(&smf[12..14], &0x03C0u16.to_be_bytes());
    }

    #[test]
    fn minimal_note_schedules_its_off() {
        // Note-On ch0 note 60 vel 100, duration 120 XMI ticks.
        let smf = convert_xmi(&container(&[0x90, 60, 100, 120])).unwrap();
        let track = track_of(&smf);
        assert_eq!(
            track,
            &[
                0x00, 0x90, 0x3C, 0x64, // Note-On at delta 0
                0x87, 0x40, 0x80, 0x3C, 0x7F, // Note-Off at delta 960
                0x00, 0xFF, 0x2F, 0x00, // End-of-Track
            ]
        );
    }

    #[test]
    fn delay_runs_accumulate() {
        // 0x7F + 0x7F + 0x02 = 256 XMI ticks before the program change.
        let smf = convert_xmi(&container(&[0x7F, 0x7F, 0x02, 0xC0, 0x05])).unwrap();
        let track = track_of(&smf);
        // 256 * 8 = 2048 -> VLQ 0x90 0x00.
        assert_eq!(track, &[0x90, 0x00, 0xC0, 0x05, 0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn note_off_interleaves_with_delays() {
        // Note of duration 10, then a delay of 20 and a second note. The
        // scheduled off must be emitted between them, at its own tick.
        let events = [0x90, 60, 100, 10, 20, 0x90, 62, 100, 5];
        let smf = convert_xmi(&container(&events)).unwrap();
        let track = track_of(&smf);
        assert_eq!(
            track,
            &[
                0x00, 0x90, 0x3C, 0x64, // first note at 0
                0x80, 0x50, 0x80, 0x3C, 0x7F, // off at tick 10 -> delta 80
                0x80, 0x50, 0x90, 0x3E, 0x64, // second note at tick 20 -> delta 80
                0x28, 0x80, 0x3E, 0x7F, // its off at tick 25 -> delta 40
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn tempo_meta_rescales_following_deltas() {
        // Tempo 250000 doubles the tick rate: factor becomes 16.
        let events = [
            0xFF, 0x51, 0x03, 0x03, 0xD0, 0x90, // FF 51 03 250000
            0x0A, // delay 10
            0xC0, 0x01,
        ];
        let smf = convert_xmi(&container(&events)).unwrap();
        let track = track_of(&smf);
        assert_eq!(
            track,
            &[
                0x00, 0xFF, 0x51, 0x03, 0x03, 0xD0, 0x90,
                0x81, 0x20, 0xC0, 0x01, // 10 * 16 = 160 -> VLQ 0x81 0x20
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn cumulative_scaling_matches_rounded_total() {
        // Three delays of 1 tick under a tempo where the per-delta scale is
        // fractional; the emitted total must equal the rounded total.
        let tempo = 600_000u32; // factor 4e6/6e5 = 6.666..
        let events = [
            0xFF, 0x51, 0x03,
            (tempo >> 16) as u8, (tempo >> 8) as u8, tempo as u8,
            0x01, 0xC0, 0x00,
            0x01, 0xC0, 0x01,
            0x01, 0xC0, 0x02,
        ];
        let smf = convert_xmi(&container(&events)).unwrap();
        let track = track_of(&smf);

        // Sum the deltas back out of the track.
        let mut pos = 0usize;
        let mut total = 0u64;
        while pos < track.len() {
            total += read_vlq(track, &mut pos).unwrap();
            match track[pos] {
                0xFF => pos += 3 + usize::from(track[pos + 2]),
                s if s & 0xF0 == 0xC0 => pos += 2,
                _ => panic!("unexpected event"),
            }
        }
        // 3 ticks at 4e6/6e5 = 20.0 exactly.
        assert_eq!(total, 20);
    }

    #[test]
    fn fractional_tempo_end_of_track_lands_at_delta_zero() {
        // Tempo 600000 does not divide 4e6; the final Note-Off lands at a
        // rounded tick and End-of-Track must follow at delta 0 rather than
        // re-deriving a (lower) tick from the cursor.
        let events = [
            0xFF, 0x51, 0x03, 0x09, 0x27, 0xC0, // FF 51 03 600000
            0x90, 60, 100, 2,
        ];
        let expected = [
            0x00, 0xFF, 0x51, 0x03, 0x09, 0x27, 0xC0,
            0x00, 0x90, 0x3C, 0x64,
            0x0D, 0x80, 0x3C, 0x7F, // off at (2 * 4e6 + 3e5) / 6e5 = 13
            0x00, 0xFF, 0x2F, 0x00,
        ];

        let smf = convert_xmi(&container(&events)).unwrap();
        assert_eq!(track_of(&smf), &expected);

        // Same stream with an explicit End-of-Track at tick 0: the meta may
        // not precede the drained Note-Off.
        let mut explicit = events.to_vec();
        explicit.extend_from_slice(&[0xFF, 0x2F, 0x00]);
        let smf = convert_xmi(&container(&explicit)).unwrap();
        assert_eq!(track_of(&smf), &expected);
    }

    #[test]
    fn explicit_end_of_track_flushes_pending_offs() {
        let events = [0x90, 60, 100, 50, 0xFF, 0x2F, 0x00];
        let smf = convert_xmi(&container(&events)).unwrap();
        let track = track_of(&smf);
        assert_eq!(
            track,
            &[
                0x00, 0x90, 0x3C, 0x64,
                0x83, 0x10, 0x80, 0x3C, 0x7F, // off at 50 * 8 = 400
                0x00, 0xFF, 0x2F, 0x00,
            ]
        );
    }

    #[test]
    fn timb_and_rbrn_tables_are_skipped() {
        let mut xmi = vec![0u8; PREAMBLE_LEN];
        xmi.extend_from_slice(b"TIMB");
        xmi.extend_from_slice(&4u32.to_be_bytes());
        xmi.extend_from_slice(&[1, 0, 2, 0]);
        xmi.extend_from_slice(b"RBRN");
        xmi.extend_from_slice(&8u32.to_be_bytes());
        xmi.extend_from_slice(&[1, 0]); // one branch entry
        xmi.extend_from_slice(&[0; 6]);
        xmi.extend_from_slice(b"EVNT");
        xmi.extend_from_slice(&2u32.to_be_bytes());
        xmi.extend_from_slice(&[0xC0, 0x07]);

        let smf = convert_xmi(&xmi).unwrap();
        let track = track_of(&smf);
        assert_eq!(track, &[0x00, 0xC0, 0x07, 0x00, 0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn missing_evnt_is_a_container_error() {
        let xmi = vec![0u8; PREAMBLE_LEN + 8];
        let err = convert_xmi(&xmi).unwrap_err();
        assert!(matches!(err, MediaError::XmiBadContainer { .. }));
    }

    #[test]
    fn truncated_event_is_an_error() {
        let err = convert_xmi(&container(&[0x90, 60])).unwrap_err();
        assert!(matches!(err, MediaError::XmiTruncated { .. }));
    }

    #[test]
    fn vlq_round_trips() {
        for value in [0u64, 1, 127, 128, 960, 16383, 16384, 2_000_000] {
            let mut buf = Vec::new();
            write_vlq(&mut buf, value);
            let mut pos = 0;
            assert_eq!(read_vlq(&buf, &mut pos).unwrap(), value);
            assert_eq!(pos, buf.len());
        }
    }
}
