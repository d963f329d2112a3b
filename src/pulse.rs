/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
//! **TAPE** pulse encoding of the *Standard Speed Data* with the timings of the ROM routines.
use core::iter::FusedIterator;
use core::num::NonZeroU32;

use consts::*;

pub mod consts {
    use core::num::NonZeroU32;
    /// Length of the lead pulse in T-states.
    pub const LEAD_PULSE_LENGTH : NonZeroU32 = unsafe { NonZeroU32::new_unchecked(2168) };
    /// Length of the 1st sync pulse in T-states.
    pub const SYNC_PULSE1_LENGTH: NonZeroU32 = unsafe { NonZeroU32::new_unchecked(667)  };
    /// Length of the 2nd sync pulse in T-states.
    pub const SYNC_PULSE2_LENGTH: NonZeroU32 = unsafe { NonZeroU32::new_unchecked(735)  };
    /// Length of the bit value 0 pulse in T-states.
    pub const ZERO_PULSE_LENGTH : NonZeroU32 = unsafe { NonZeroU32::new_unchecked(855)  };
    /// Length of the bit value 1 pulse in T-states.
    pub const ONE_PULSE_LENGTH  : NonZeroU32 = unsafe { NonZeroU32::new_unchecked(1710) };

    /// The number of lead pulses when the flag byte is below `0x80`.
    pub const LEAD_PULSES_HEAD: u16 = 8063;
    /// The number of lead pulses when the flag byte is `0x80` or above.
    pub const LEAD_PULSES_DATA: u16 = 3223;
}

/// The phase of a [RomPulseIter].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Emitting lead pulses, `remaining` of them are left.
    Lead { remaining: u16 },
    /// Emitting the 1st sync pulse.
    Sync1,
    /// Emitting the 2nd sync pulse.
    Sync2,
    /// Emitting the pulses of the byte at `offset`, two per bit, most significant bit first.
    Bits { offset: usize, pulse: u8 },
    /// No more pulses.
    Done,
}

/// Returns the number of lead pulses for a block starting with `flag`.
#[inline]
pub fn lead_pulses(flag: u8) -> u16 {
    if flag < 0x80 { LEAD_PULSES_HEAD } else { LEAD_PULSES_DATA }
}

/// Encodes a block of bytes as *TAPE* T-state pulse intervals via an [Iterator] interface.
///
/// The first byte is a flag and determines the length of the lead tone, see [lead_pulses].
/// The lead is followed by two sync pulses and then by two pulses for each bit of every
/// byte in the block, flag byte included.
///
/// An empty block yields no pulses at all.
#[derive(Clone, Debug)]
pub struct RomPulseIter<'a> {
    data: &'a [u8],
    phase: Phase,
}

impl<'a> RomPulseIter<'a> {
    /// Creates a new encoder of the given block `data`.
    pub fn new(data: &'a [u8]) -> Self {
        let phase = match data.first() {
            Some(&flag) => Phase::Lead { remaining: lead_pulses(flag) },
            None => Phase::Done
        };
        RomPulseIter { data, phase }
    }
    /// Returns the current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }
    /// Returns the flag byte or `None` if the block is empty.
    pub fn flag(&self) -> Option<u8> {
        self.data.first().copied()
    }
    /// Returns `true` if there are no more pulses to emit.
    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
    /// Returns the encoded block.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

impl Iterator for RomPulseIter<'_> {
    type Item = NonZeroU32;

    fn next(&mut self) -> Option<NonZeroU32> {
        let (pulse, phase) = match self.phase {
            Phase::Lead { remaining: 1 } => (LEAD_PULSE_LENGTH, Phase::Sync1),
            Phase::Lead { remaining } => (LEAD_PULSE_LENGTH, Phase::Lead { remaining: remaining - 1 }),
            Phase::Sync1 => (SYNC_PULSE1_LENGTH, Phase::Sync2),
            Phase::Sync2 => (SYNC_PULSE2_LENGTH, Phase::Bits { offset: 0, pulse: 0 }),
            Phase::Bits { offset, pulse } => {
                let byte = self.data[offset];
                let length = if byte & (0x80 >> (pulse >> 1)) != 0 {
                    ONE_PULSE_LENGTH
                }
                else {
                    ZERO_PULSE_LENGTH
                };
                let phase = if pulse < 15 {
                    Phase::Bits { offset, pulse: pulse + 1 }
                }
                else if offset + 1 < self.data.len() {
                    Phase::Bits { offset: offset + 1, pulse: 0 }
                }
                else {
                    Phase::Done
                };
                (length, phase)
            }
            Phase::Done => return None
        };
        self.phase = phase;
        Some(pulse)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = match self.phase {
            Phase::Lead { remaining } => remaining as usize + 2 + self.data.len() * 16,
            Phase::Sync1 => 2 + self.data.len() * 16,
            Phase::Sync2 => 1 + self.data.len() * 16,
            Phase::Bits { offset, pulse } => (self.data.len() - offset) * 16 - pulse as usize,
            Phase::Done => 0
        };
        (len, Some(len))
    }
}

impl ExactSizeIterator for RomPulseIter<'_> {}
impl FusedIterator for RomPulseIter<'_> {}

/// Returns the number of pulses a [RomPulseIter] emits for the given block `data`.
pub fn standard_block_pulse_count(data: &[u8]) -> usize {
    RomPulseIter::new(data).len()
}
