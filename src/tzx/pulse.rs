/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
use core::iter::FusedIterator;
use core::num::NonZeroU32;
use core::slice;

#[cfg(feature = "serde")]
use serde::{Serialize, Deserialize};

use crate::pulse::RomPulseIter;
use crate::sink::{TzxSink, LogSink};
use super::{TzxFile, TzxBlock, TICKS_PER_MS};

/// A *TAPE* signal held at `level` for `duration` T-states before the next transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pulse {
    /// `true` if the signal is high.
    pub level: bool,
    /// The number of T-states.
    pub duration: NonZeroU32,
}

/// Encodes *Standard Speed Data* blocks as pulse intervals in T-states.
///
/// Implemented for [RomEncoder] and for closures `FnMut(&[u8], bool) -> I`
/// where `I` is an iterator of pulse intervals.
pub trait EncodeBlock<'a> {
    type PulseIter: Iterator<Item=NonZeroU32>;
    /// Creates an iterator of pulse intervals of the block `data`.
    ///
    /// `level` is the signal level of the first pulse.
    fn encode_block(&mut self, data: &'a [u8], level: bool) -> Self::PulseIter;
}

/// Encodes blocks with the timings expected by the ROM loading routines.
///
/// See [RomPulseIter]. The intervals don't depend on the signal level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RomEncoder;

impl<'a> EncodeBlock<'a> for RomEncoder {
    type PulseIter = RomPulseIter<'a>;

    fn encode_block(&mut self, data: &'a [u8], _level: bool) -> Self::PulseIter {
        RomPulseIter::new(data)
    }
}

impl<'a, F, I> EncodeBlock<'a> for F
    where F: FnMut(&'a [u8], bool) -> I,
          I: Iterator<Item=NonZeroU32>
{
    type PulseIter = I;

    fn encode_block(&mut self, data: &'a [u8], level: bool) -> I {
        self(data, level)
    }
}

/// Returns the length in T-states of a pause pulse after a *Standard Speed Data* block.
///
/// Returns `None` for a zero pause, which emits no pulse.
pub fn pause_pulse_length(pause_after_block_ms: u16) -> Option<NonZeroU32> {
    NonZeroU32::new(u32::from(pause_after_block_ms) * TICKS_PER_MS)
}

enum BlockPulses<I> {
    Idle,
    Data { pulses: I, pause_after_block_ms: u16 },
}

/// Composes *TAPE* [Pulse]s of the *TZX* file blocks via an [Iterator] interface.
///
/// The signal starts low and flips after each pulse. The level is carried over from
/// one block to the next.
///
/// Each *Standard Speed Data* block is followed by a single pause pulse unless its pause
/// is `0`, in which case the level is left intact. The pause pulse is emitted at the current
/// level: the signal isn't dropped low before the pause, as doing so breaks loading of
/// some tapes.
///
/// *Text Description* blocks are reported to the sink. *Archive Info* blocks are skipped.
///
/// Dropping the iterator early is always safe. To start over create a new iterator.
pub struct TzxPulseIter<'a, E: EncodeBlock<'a> = RomEncoder, S = LogSink> {
    blocks: slice::Iter<'a, TzxBlock>,
    encoder: E,
    sink: S,
    level: bool,
    block_index: usize,
    state: BlockPulses<E::PulseIter>,
}

impl TzxFile {
    /// Returns a pulse iterator over this file's blocks using [RomEncoder] and [LogSink].
    pub fn pulse_iter(&self) -> TzxPulseIter<'_> {
        TzxPulseIter::new(self.blocks(), RomEncoder, LogSink)
    }
    /// Returns a pulse iterator over this file's blocks with the custom `encoder` and `sink`.
    pub fn pulse_iter_with<'a, E, S>(&'a self, encoder: E, sink: S) -> TzxPulseIter<'a, E, S>
        where E: EncodeBlock<'a>, S: TzxSink
    {
        TzxPulseIter::new(self.blocks(), encoder, sink)
    }
}

impl<'a, E: EncodeBlock<'a>, S: TzxSink> TzxPulseIter<'a, E, S> {
    /// Creates a new pulse iterator over the given `blocks`.
    pub fn new(blocks: &'a [TzxBlock], encoder: E, sink: S) -> Self {
        TzxPulseIter {
            blocks: blocks.iter(),
            encoder, sink,
            level: false,
            block_index: 0,
            state: BlockPulses::Idle
        }
    }
    /// Returns the signal level of the next pulse.
    pub fn level(&self) -> bool {
        self.level
    }
    /// Returns the number of blocks entered so far.
    pub fn block_index(&self) -> usize {
        self.block_index
    }
    /// Returns a reference to the sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }
    /// Returns the sink.
    pub fn into_sink(self) -> S {
        self.sink
    }

    #[inline]
    fn emit(&mut self, duration: NonZeroU32) -> Pulse {
        let pulse = Pulse { level: self.level, duration };
        self.level = !self.level;
        pulse
    }
}

impl<'a, E: EncodeBlock<'a>, S: TzxSink> Iterator for TzxPulseIter<'a, E, S> {
    type Item = Pulse;

    fn next(&mut self) -> Option<Pulse> {
        loop {
            if let BlockPulses::Data { pulses, pause_after_block_ms } = &mut self.state {
                if let Some(duration) = pulses.next() {
                    return Some(self.emit(duration))
                }
                let pause = *pause_after_block_ms;
                self.state = BlockPulses::Idle;
                if let Some(duration) = pause_pulse_length(pause) {
                    return Some(self.emit(duration))
                }
            }
            match self.blocks.next()? {
                TzxBlock::StandardSpeedData { pause_after_block_ms, data } => {
                    let pulses = self.encoder.encode_block(data, self.level);
                    self.state = BlockPulses::Data {
                        pulses, pause_after_block_ms: *pause_after_block_ms
                    };
                }
                TzxBlock::TextDescription { text } => {
                    self.sink.report(&String::from_utf8_lossy(text));
                }
                TzxBlock::ArchiveInfo => {}
            }
            self.block_index += 1;
        }
    }
}

impl<'a, E: EncodeBlock<'a>, S: TzxSink> FusedIterator for TzxPulseIter<'a, E, S> {}
