/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
/*! **TZX** file format utilities.

# TZX format

A **TZX** file starts with a 10 byte header:

| offset | size | description                      |
|--------|------|----------------------------------|
|    0   |    8 | signature `"ZXTape!"` + `0x1A`   |
|    8   |    1 | major revision number            |
|    9   |    1 | minor revision number            |

The header is followed by blocks, each one starting with a single byte block ID.
The layout of the rest of the block depends on its ID. All multi-byte numbers are
stored LSB first.

Only the following blocks are decoded:

* `0x10` *Standard Speed Data*: pause after the block in milliseconds (2 bytes),
  the length of data (2 bytes) and the data as found in a *TAP* chunk.
* `0x30` *Text Description*: the length of text (1 byte) and the text.
* `0x32` *Archive Info*: the length of the whole block (2 bytes), the number of text
  entries (1 byte) and for each entry: a text ID (1 byte), the length of text (1 byte)
  and the text.

Since the length of a block can't be determined without knowing its layout, any other
block makes the whole file unreadable and the parser returns [TzxError::UnsupportedBlock].

See: [TZX format](http://www.worldofspectrum.org/TZXformat.html).

## *TAPE* pulses

[TzxFile::pulse_iter] creates an iterator of [Pulse]s, each one is a signal level
and the number of T-states the signal is held at this level.

```no_run
use spectrusty_tzx::*;

let data = std::fs::read("some.tzx")?;
let tzx = parse_tzx(&data)?;
for block in tzx.blocks() {
    println!("{}", block);
}
let tstates: u64 = tzx.pulse_iter().map(|pulse| u64::from(pulse.duration.get())).sum();
println!("tape length: {} T-states", tstates);
# Ok::<(), Box<dyn std::error::Error>>(())
```
*/
use core::convert::TryFrom;
use core::fmt;
use std::borrow::Cow;

#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};

use crate::error::TzxError;

mod parse;
mod pulse;

pub use parse::*;
pub use pulse::*;

/// The *TZX* file signature.
pub const TZX_SIGNATURE: [u8;8] = *b"ZXTape!\x1a";
/// The major revision of the format this crate implements.
pub const TZX_MAJOR_REVISION: u8 = 1;
/// The *TZX* T-state clock frequency in Hz.
pub const TICKS_FREQ: u32 = 3_500_000;
/// The number of T-states in a millisecond.
pub const TICKS_PER_MS: u32 = TICKS_FREQ / 1000;

macro_rules! tzx_id {
    ($($id:ident = $n:literal : $name:literal),*) => {
        /// The *TZX* block IDs.
        #[repr(u8)]
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum TzxId {
            $($id = $n),*
        }

        impl TryFrom<u8> for TzxId {
            type Error = &'static str;
            fn try_from(id: u8) -> Result<Self, Self::Error> {
                match id {
                    $($n => Ok(TzxId::$id),)*
                    _ => Err("Unknown TZX ID")
                }
            }
        }

        impl TzxId {
            /// Returns the name of the block.
            pub fn name(self) -> &'static str {
                match self {
                    $(TzxId::$id => $name),*
                }
            }
        }
    };
}

tzx_id! {
    StandardSpeed    = 0x10 : "Standard Speed Data",
    TurboSpeed       = 0x11 : "Turbo Speed Data",
    PureTone         = 0x12 : "Pure Tone",
    SeqOfPulses      = 0x13 : "Pulse sequence",
    PureData         = 0x14 : "Pure Data",
    DirectRec        = 0x15 : "Direct Recording",
    CswRecording     = 0x18 : "CSW Recording",
    Generalized      = 0x19 : "Generalized Data",
    Pause            = 0x20 : "Pause",
    GroupStart       = 0x21 : "Group start",
    GroupEnd         = 0x22 : "Group end",
    Jump             = 0x23 : "Jump to block",
    LoopStart        = 0x24 : "Loop start",
    LoopEnd          = 0x25 : "Loop end",
    CallSeq          = 0x26 : "Call sequence",
    Return           = 0x27 : "Return from sequence",
    Select           = 0x28 : "Select block",
    StopIn48k        = 0x2A : "Stop the tape if in 48K mode",
    SetLevel         = 0x2B : "Set signal level",
    Text             = 0x30 : "Text Description",
    Message          = 0x31 : "Message",
    Archive          = 0x32 : "Archive Info",
    Hardware         = 0x33 : "Hardware type",
    Custom           = 0x35 : "Custom info",
    Glue             = 0x5A : "Glue"
}

impl From<TzxId> for u8 {
    fn from(id: TzxId) -> u8 {
        id as u8
    }
}

impl fmt::Display for TzxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The IDs of *Archive Info* text entries.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ArchiveInfoId {
    Title       = 0x00,
    Publisher   = 0x01,
    Authors     = 0x02,
    Year        = 0x03,
    Language    = 0x04,
    Category    = 0x05,
    Price       = 0x06,
    Protection  = 0x07,
    Origin      = 0x08,
    Comment     = 0xFF
}

impl ArchiveInfoId {
    /// Returns the description of the text entry.
    pub fn name(self) -> &'static str {
        match self {
            ArchiveInfoId::Title      => "Full title",
            ArchiveInfoId::Publisher  => "Software house/publisher",
            ArchiveInfoId::Authors    => "Author(s)",
            ArchiveInfoId::Year       => "Year of publication",
            ArchiveInfoId::Language   => "Language",
            ArchiveInfoId::Category   => "Game/utility type",
            ArchiveInfoId::Price      => "Price",
            ArchiveInfoId::Protection => "Protection scheme/loader",
            ArchiveInfoId::Origin     => "Origin",
            ArchiveInfoId::Comment    => "Comment(s)",
        }
    }
}

impl TryFrom<u8> for ArchiveInfoId {
    type Error = TzxError;
    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Ok(match id {
            0x00 => ArchiveInfoId::Title,
            0x01 => ArchiveInfoId::Publisher,
            0x02 => ArchiveInfoId::Authors,
            0x03 => ArchiveInfoId::Year,
            0x04 => ArchiveInfoId::Language,
            0x05 => ArchiveInfoId::Category,
            0x06 => ArchiveInfoId::Price,
            0x07 => ArchiveInfoId::Protection,
            0x08 => ArchiveInfoId::Origin,
            0xFF => ArchiveInfoId::Comment,
            id => return Err(TzxError::UnknownArchiveInfoId(id))
        })
    }
}

impl From<ArchiveInfoId> for u8 {
    fn from(id: ArchiveInfoId) -> u8 {
        id as u8
    }
}

impl fmt::Display for ArchiveInfoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The *TZX* file header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Header {
    /// Always equal to [TZX_SIGNATURE] in a parsed file.
    pub signature: [u8;8],
    pub major_revision: u8,
    pub minor_revision: u8,
}

/// A decoded *TZX* block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TzxBlock {
    /// *Standard Speed Data* block, ID `0x10`.
    StandardSpeedData {
        /// A pause after this block in milliseconds.
        pause_after_block_ms: u16,
        /// A *TAP* chunk data, starting with a flag byte and ending with a checksum.
        data: Box<[u8]>
    },
    /// *Text Description* block, ID `0x30`.
    TextDescription {
        /// The text as found in the file.
        text: Box<[u8]>
    },
    /// *Archive Info* block, ID `0x32`.
    ///
    /// Text entries are only reported to a [TzxSink][crate::TzxSink] while parsing.
    ArchiveInfo,
}

impl TzxBlock {
    /// Returns the ID of this block.
    pub fn id(&self) -> TzxId {
        match self {
            TzxBlock::StandardSpeedData {..} => TzxId::StandardSpeed,
            TzxBlock::TextDescription {..} => TzxId::Text,
            TzxBlock::ArchiveInfo => TzxId::Archive,
        }
    }
    /// Returns the data of the *Standard Speed Data* block.
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            TzxBlock::StandardSpeedData { data, .. } => Some(data),
            _ => None
        }
    }
    /// Returns a pause in milliseconds after the *Standard Speed Data* block.
    pub fn pause_after_block_ms(&self) -> Option<u16> {
        match self {
            TzxBlock::StandardSpeedData { pause_after_block_ms, .. } => Some(*pause_after_block_ms),
            _ => None
        }
    }
    /// Returns the text of the *Text Description* block, including invalid characters.
    pub fn text_lossy(&self) -> Option<Cow<'_, str>> {
        match self {
            TzxBlock::TextDescription { text } => Some(String::from_utf8_lossy(text)),
            _ => None
        }
    }
}

impl fmt::Display for TzxBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TzxBlock::StandardSpeedData { pause_after_block_ms, data } => write!(f,
                "{}: {} bytes, pause {} ms", self.id(), data.len(), pause_after_block_ms),
            TzxBlock::TextDescription { text } => write!(f,
                "{}: {}", self.id(), String::from_utf8_lossy(text)),
            TzxBlock::ArchiveInfo => write!(f, "{}", self.id())
        }
    }
}

/// A parsed *TZX* file.
///
/// Instances are created only by [parse_tzx] and friends and can't be modified.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TzxFile {
    header: Header,
    blocks: Box<[TzxBlock]>,
}

impl TzxFile {
    /// Returns a reference to the file header.
    pub fn header(&self) -> &Header {
        &self.header
    }
    /// Returns the `(major, minor)` revision of the file.
    pub fn version(&self) -> (u8, u8) {
        (self.header.major_revision, self.header.minor_revision)
    }
    /// Returns the decoded blocks in the file order.
    pub fn blocks(&self) -> &[TzxBlock] {
        &self.blocks
    }
    /// Returns the decoded blocks, dropping the header.
    pub fn into_blocks(self) -> Box<[TzxBlock]> {
        self.blocks
    }
}
