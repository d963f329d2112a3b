/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
//! A sequential reader of fixed layout fields over a byte slice.
#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use nom::{IResult, Offset};
use nom::bytes::complete::take;

use crate::error::TzxError;

/// Reads fields and raw blocks of bytes from an immutable slice, front to back.
///
/// Layouts are given as [nom] parsers composed of fixed-width little-endian fields,
/// e.g. `tuple((le_u16, le_u16))`. The position only ever moves forward and never
/// exceeds the length of the slice.
#[derive(Clone, Debug)]
pub struct BinaryCursor<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> BinaryCursor<'a> {
    /// Creates a new cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        BinaryCursor { data, position: 0 }
    }
    /// Returns the current position.
    pub fn position(&self) -> usize {
        self.position
    }
    /// Returns the number of bytes left.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }
    /// Returns `true` if there are no more bytes left.
    pub fn is_eof(&self) -> bool {
        self.position == self.data.len()
    }
    /// Decodes a fixed `layout` at the current position and advances past it.
    ///
    /// `context` names the layout in a [TzxError::Truncated] error which is returned
    /// if fewer bytes are left than the layout requires. In this instance the position
    /// is left unchanged.
    pub fn parse<O, F>(&mut self, context: &'static str, mut layout: F) -> Result<O, TzxError>
        where F: FnMut(&'a [u8]) -> IResult<&'a [u8], O>
    {
        let input = &self.data[self.position..];
        match layout(input) {
            Ok((rest, value)) => {
                self.position += input.offset(rest);
                Ok(value)
            }
            Err(_) => Err(self.truncated(context))
        }
    }
    /// Decodes a single `field` named `name` and advances past it.
    ///
    /// This is the same as [BinaryCursor::parse] with the arguments swapped.
    pub fn parse_field<O, F>(&mut self, field: F, name: &'static str) -> Result<O, TzxError>
        where F: FnMut(&'a [u8]) -> IResult<&'a [u8], O>
    {
        self.parse(name, field)
    }
    /// Returns the next `len` bytes verbatim and advances past them.
    pub fn extract_block(&mut self, len: usize, context: &'static str) -> Result<&'a [u8], TzxError> {
        let block = self.parse(context, take(len))?;
        trace!("extracted {} bytes of {}", block.len(), context);
        Ok(block)
    }

    fn truncated(&self, context: &'static str) -> TzxError {
        TzxError::Truncated { context, offset: self.position, available: self.remaining() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::number::complete::{le_u8, le_u16};
    use nom::sequence::tuple;

    #[test]
    fn binary_cursor_works() {
        let data = [0x34, 0x12, 0x07, 0xAA, 0x55, 0x01];
        let mut cursor = BinaryCursor::new(&data);
        assert_eq!(false, cursor.is_eof());
        assert_eq!(Ok((0x1234, 7)), cursor.parse("header", tuple((le_u16, le_u8))));
        assert_eq!(3, cursor.position());
        assert_eq!(Ok(&[0xAA, 0x55][..]), cursor.extract_block(2, "data"));
        assert_eq!(1, cursor.remaining());
        assert_eq!(Ok(1), cursor.parse_field(le_u8, "flag"));
        assert_eq!(true, cursor.is_eof());
        assert_eq!(Ok(&[][..]), cursor.extract_block(0, "empty"));
        assert_eq!(true, cursor.is_eof());
    }

    #[test]
    fn binary_cursor_truncates() {
        let data = [0x34, 0x12, 0x07];
        let mut cursor = BinaryCursor::new(&data);
        assert_eq!(Err(TzxError::Truncated { context: "pair", offset: 0, available: 3 }),
                   cursor.parse("pair", tuple((le_u16, le_u16))));
        assert_eq!(0, cursor.position());
        assert_eq!(Ok(0x1234), cursor.parse_field(le_u16, "word"));
        assert_eq!(Err(TzxError::Truncated { context: "data", offset: 2, available: 1 }),
                   cursor.extract_block(2, "data"));
        assert_eq!(Err(TzxError::Truncated { context: "word", offset: 2, available: 1 }),
                   cursor.parse_field(le_u16, "word"));
        assert_eq!(2, cursor.position());
        assert_eq!(Ok(7), cursor.parse_field(le_u8, "byte"));
        assert_eq!(Err(TzxError::Truncated { context: "byte", offset: 3, available: 0 }),
                   cursor.parse_field(le_u8, "byte"));
    }
}
