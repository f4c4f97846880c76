//! A trace of the dance resolver, meant to be read with a debugger.
//!
//! Every record packs into a single 32-bit word, so a probe can copy the
//! whole ring with word transfers and decode it on the host with
//! [`TraceRecord::unpack`].

use crate::dance::Dance;
use heapless::HistoryBuffer;
use log::warn;
use packed_struct::prelude::*;

/// Number of records kept, older ones are overwritten.
pub const LOG_LEN: usize = 64;

/// What happened to a dance channel.
#[derive(PrimitiveEnum_u8, Debug, Copy, Clone, PartialEq, Eq)]
pub enum TraceKind {
    Press = 0,
    Release = 1,
    Resolve = 2,
    Supersede = 3,
    Interrupt = 4,
}

/// A packed trace record.
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "4")]
pub struct TraceRecord {
    /// The low 16 bits of the millisecond clock.
    #[packed_field(bytes = "0..=1", endian = "msb")]
    pub timestamp: u16,
    #[packed_field(bits = "16..=20")]
    pub channel: Integer<u8, packed_bits::Bits<5>>,
    #[packed_field(bits = "21..=23", ty = "enum")]
    pub kind: TraceKind,
    /// 0 when the channel is not resolved, see [`TraceRecord::dance`].
    #[packed_field(bits = "24..=27")]
    pub dance: Integer<u8, packed_bits::Bits<4>>,
    /// Presses in the burst, saturating at 15.
    #[packed_field(bits = "28..=31")]
    pub count: Integer<u8, packed_bits::Bits<4>>,
}

fn dance_code(dance: Option<Dance>) -> u8 {
    match dance {
        None => 0,
        Some(Dance::SingleTap) => 1,
        Some(Dance::SingleHold) => 2,
        Some(Dance::DoubleTap) => 3,
        Some(Dance::DoubleHold) => 4,
        Some(Dance::DoubleTapThenHold) => 5,
        Some(Dance::TripleTap) => 6,
        Some(Dance::TripleHold) => 7,
        Some(Dance::Unknown) => 8,
    }
}

impl TraceRecord {
    pub fn new(now: u32, channel: usize, kind: TraceKind, dance: Option<Dance>, count: u8) -> Self {
        TraceRecord {
            timestamp: now as u16,
            channel: (channel as u8 & 0x1f).into(),
            kind,
            dance: dance_code(dance).into(),
            count: count.min(15).into(),
        }
    }

    /// The channel classification when the record was taken.
    pub fn dance(&self) -> Option<Dance> {
        match *self.dance {
            1 => Some(Dance::SingleTap),
            2 => Some(Dance::SingleHold),
            3 => Some(Dance::DoubleTap),
            4 => Some(Dance::DoubleHold),
            5 => Some(Dance::DoubleTapThenHold),
            6 => Some(Dance::TripleTap),
            7 => Some(Dance::TripleHold),
            8 => Some(Dance::Unknown),
            _ => None,
        }
    }
}

/// The ring of packed records.
pub struct Log {
    records: HistoryBuffer<[u8; 4], LOG_LEN>,
}

impl Default for Log {
    fn default() -> Self {
        Self::new()
    }
}

impl Log {
    pub const fn new() -> Self {
        Log {
            records: HistoryBuffer::new(),
        }
    }

    pub fn record(&mut self, record: TraceRecord) {
        match record.pack() {
            Ok(bytes) => self.records.write(bytes),
            Err(e) => warn!("dropping trace record {:?}: {:?}", record, e),
        }
    }

    /// Iterates on the records, oldest first.
    pub fn records(&self) -> impl Iterator<Item = TraceRecord> + '_ {
        self.records
            .oldest_ordered()
            .filter_map(|bytes| TraceRecord::unpack(bytes).ok())
    }

    /// The most recent record.
    pub fn last(&self) -> Option<TraceRecord> {
        self.records
            .recent()
            .and_then(|bytes| TraceRecord::unpack(bytes).ok())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.len() == 0
    }
}
