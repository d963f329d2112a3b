/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
use core::convert::TryFrom;
use std::io::{self, Read};

#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

use nom::IResult;
use nom::bytes::complete::take;
use nom::combinator::map;
use nom::number::complete::{le_u8, le_u16};
use nom::sequence::tuple;

use crate::cursor::BinaryCursor;
use crate::error::TzxError;
use crate::sink::{TzxSink, LogSink};
use super::{
    Header, TzxFile, TzxBlock, TzxId, ArchiveInfoId,
    TZX_SIGNATURE, TZX_MAJOR_REVISION
};

/// Parses given `data` as a *TZX* file.
///
/// *Archive Info* entries are reported to the [LogSink].
pub fn parse_tzx(data: &[u8]) -> Result<TzxFile, TzxError> {
    parse_tzx_with_sink(data, LogSink)
}

/// Parses given `data` as a *TZX* file reporting *Archive Info* entries to the given `sink`.
///
/// Returns an error if the signature doesn't match, any of the blocks can't be decoded
/// or there is not enough data for the last block.
pub fn parse_tzx_with_sink<S: TzxSink>(data: &[u8], mut sink: S) -> Result<TzxFile, TzxError> {
    let mut cursor = BinaryCursor::new(data);
    let header = parse_header(&mut cursor)?;
    let mut blocks = Vec::new();
    while !cursor.is_eof() {
        blocks.push(parse_block(&mut cursor, &mut sink)?);
    }
    debug!("TZX: {} blocks", blocks.len());
    Ok(TzxFile { header, blocks: blocks.into_boxed_slice() })
}

/// Reads data from `rd` until EOF and parses it as a *TZX* file.
///
/// When there was a parse error returns `Err` with [TzxError] wrapped in [io::Error]
/// with [io::ErrorKind::InvalidData]. Use [IoErrorExt][crate::IoErrorExt] to get to it.
pub fn read_tzx<R: Read>(mut rd: R) -> io::Result<TzxFile> {
    let mut data = Vec::new();
    rd.read_to_end(&mut data)?;
    parse_tzx(&data).map_err(io::Error::from)
}

fn tzx_signature(input: &[u8]) -> IResult<&[u8], [u8;8]> {
    map(take(8usize), |sig: &[u8]| {
        let mut res = [0u8;8];
        res.copy_from_slice(sig);
        res
    })(input)
}

fn parse_header(cursor: &mut BinaryCursor<'_>) -> Result<Header, TzxError> {
    let (signature, major_revision, minor_revision) = cursor.parse("TZX header",
        tuple((tzx_signature, le_u8, le_u8))
    )?;
    if signature != TZX_SIGNATURE {
        return Err(TzxError::BadSignature { found: signature, expected: TZX_SIGNATURE })
    }
    if major_revision != TZX_MAJOR_REVISION {
        warn!("TZX: unexpected major revision: {}.{:02}", major_revision, minor_revision);
    }
    debug!("TZX revision: {}.{:02}", major_revision, minor_revision);
    Ok(Header { signature, major_revision, minor_revision })
}

fn parse_block<S: TzxSink>(cursor: &mut BinaryCursor<'_>, sink: &mut S) -> Result<TzxBlock, TzxError> {
    let offset = cursor.position();
    let id = cursor.parse_field(le_u8, "block ID")?;
    let block = match TzxId::try_from(id) {
        Ok(TzxId::StandardSpeed) => parse_standard_speed_data(cursor)?,
        Ok(TzxId::Text) => parse_text_description(cursor)?,
        Ok(TzxId::Archive) => parse_archive_info(cursor, sink)?,
        _ => return Err(TzxError::UnsupportedBlock(id))
    };
    debug!("TZX: {} at byte {}, size: {}", block.id(), offset, cursor.position() - offset);
    Ok(block)
}

fn parse_standard_speed_data(cursor: &mut BinaryCursor<'_>) -> Result<TzxBlock, TzxError> {
    let (pause_after_block_ms, data_size) = cursor.parse("Standard Speed Data header",
        tuple((le_u16, le_u16))
    )?;
    let data = cursor.extract_block(data_size.into(), "Standard Speed Data")?;
    Ok(TzxBlock::StandardSpeedData { pause_after_block_ms, data: data.into() })
}

fn parse_text_description(cursor: &mut BinaryCursor<'_>) -> Result<TzxBlock, TzxError> {
    let text_size = cursor.parse_field(le_u8, "Text Description size")?;
    let text = cursor.extract_block(text_size.into(), "Text Description")?;
    Ok(TzxBlock::TextDescription { text: text.into() })
}

fn parse_archive_info<S: TzxSink>(
        cursor: &mut BinaryCursor<'_>,
        sink: &mut S
    ) -> Result<TzxBlock, TzxError>
{
    let block_size = cursor.parse_field(le_u16, "Archive Info size")?;
    let start = cursor.position();
    let num_of_strings = cursor.parse_field(le_u8, "Archive Info number of strings")?;
    for _ in 0..num_of_strings {
        let (id, length) = cursor.parse("Archive Info string header", tuple((le_u8, le_u8)))?;
        let body = cursor.extract_block(length.into(), "Archive Info string")?;
        let info_id = ArchiveInfoId::try_from(id)?;
        sink.report(&format!("{}: {}", info_id, String::from_utf8_lossy(body)));
    }
    let size = cursor.position() - start;
    if size != usize::from(block_size) {
        warn!("TZX: Archive Info declared size: {} differs from its content size: {}", block_size, size);
    }
    Ok(TzxBlock::ArchiveInfo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand::rngs::SmallRng;

    const HEADER: &[u8] = b"ZXTape!\x1a\x01\x14";

    fn tzx(blocks: &[&[u8]]) -> Vec<u8> {
        let mut data = HEADER.to_vec();
        for block in blocks {
            data.extend_from_slice(block);
        }
        data
    }

    #[test]
    fn parse_tzx_works() {
        let tzx = parse_tzx(&tzx(&[b"\x10\x00\x00\x02\x00\xAA\x55"])).unwrap();
        assert_eq!(&Header {
            signature: TZX_SIGNATURE,
            major_revision: 1,
            minor_revision: 20
        }, tzx.header());
        assert_eq!((1, 20), tzx.version());
        assert_eq!(&[TzxBlock::StandardSpeedData {
            pause_after_block_ms: 0,
            data: vec![0xAA, 0x55].into_boxed_slice()
        }], tzx.blocks());

        let tzx = parse_tzx(HEADER).unwrap();
        assert_eq!(0, tzx.blocks().len());
    }

    #[test]
    fn parse_tzx_blocks_works() {
        let data = tzx(&[
            b"\x30\x06Side A",
            b"\x10\xe8\x03\x03\x00\x00\x03\x03",
            b"\x32\x0d\x00\x02\x00\x04Game\x02\x04Ivan",
            b"\x10\x00\x00\x00\x00",
        ]);
        let mut lines: Vec<String> = Vec::new();
        let tzx = parse_tzx_with_sink(&data, &mut lines).unwrap();
        assert_eq!(vec!["Full title: Game", "Author(s): Ivan"], lines);
        assert_eq!(4, tzx.blocks().len());
        assert_eq!(TzxBlock::TextDescription { text: b"Side A"[..].into() }, tzx.blocks()[0]);
        assert_eq!(TzxBlock::StandardSpeedData {
            pause_after_block_ms: 1000,
            data: vec![0x00, 0x03, 0x03].into_boxed_slice()
        }, tzx.blocks()[1]);
        assert_eq!(TzxBlock::ArchiveInfo, tzx.blocks()[2]);
        assert_eq!(TzxBlock::StandardSpeedData {
            pause_after_block_ms: 0,
            data: Vec::new().into_boxed_slice()
        }, tzx.blocks()[3]);
        let ids: Vec<_> = tzx.blocks().iter().map(TzxBlock::id).collect();
        assert_eq!(vec![TzxId::Text, TzxId::StandardSpeed, TzxId::Archive, TzxId::StandardSpeed], ids);
    }

    #[test]
    fn parse_tzx_accepts_other_revisions() {
        let mut data = tzx(&[b"\x30\x00"]);
        data[8] = 2;
        data[9] = 0;
        let tzx = parse_tzx(&data).unwrap();
        assert_eq!((2, 0), tzx.version());
        assert_eq!(TzxBlock::TextDescription { text: Box::default() }, tzx.blocks()[0]);
    }

    #[test]
    fn parse_tzx_ignores_archive_info_size() {
        let data = tzx(&[b"\x32\xff\xff\x01\xff\x03abc", b"\x30\x01!"]);
        let mut lines: Vec<String> = Vec::new();
        let tzx = parse_tzx_with_sink(&data, &mut lines).unwrap();
        assert_eq!(vec!["Comment(s): abc"], lines);
        assert_eq!(2, tzx.blocks().len());
    }

    #[test]
    fn parse_tzx_bad_signature() {
        let data = b"ZXTape?\x1a\x01\x14\x10\x00\x00\x00\x00";
        assert_eq!(Err(TzxError::BadSignature {
            found: *b"ZXTape?\x1a",
            expected: TZX_SIGNATURE
        }), parse_tzx(data));

        let mut rng = SmallRng::seed_from_u64(0x7a78);
        for _ in 0..1000 {
            let mut data = tzx(&[b"\x10\x00\x00\x02\x00\xAA\x55"]);
            let index = rng.gen_range(0..8);
            let byte = loop {
                let byte: u8 = rng.gen();
                if byte != data[index] { break byte }
            };
            data[index] = byte;
            let mut found = TZX_SIGNATURE;
            found[index] = byte;
            assert_eq!(Err(TzxError::BadSignature { found, expected: TZX_SIGNATURE }),
                       parse_tzx(&data));
        }
    }

    #[test]
    fn parse_tzx_truncated_header() {
        for len in 0..HEADER.len() {
            assert_eq!(Err(TzxError::Truncated {
                context: "TZX header", offset: 0, available: len
            }), parse_tzx(&HEADER[..len]));
        }
    }

    #[test]
    fn parse_tzx_unsupported_block() {
        for id in 0..=255u8 {
            if let 0x10|0x30|0x32 = id {
                continue
            }
            let data = tzx(&[&[id][..]]);
            assert_eq!(Err(TzxError::UnsupportedBlock(id)), parse_tzx(&data));
        }
        let data = tzx(&[b"\x10\x00\x00\x01\x00\xff", b"\x11"]);
        assert_eq!(Err(TzxError::UnsupportedBlock(0x11)), parse_tzx(&data));
    }

    #[test]
    fn parse_tzx_unknown_archive_info_id() {
        let data = tzx(&[b"\x32\x07\x00\x02\x00\x01A\xAB\x01B"]);
        let mut lines: Vec<String> = Vec::new();
        assert_eq!(Err(TzxError::UnknownArchiveInfoId(0xAB)), parse_tzx_with_sink(&data, &mut lines));
        assert_eq!(vec!["Full title: A"], lines);
        // truncation is detected first
        let data = tzx(&[b"\x32\x07\x00\x01\xAB\x02B"]);
        assert_eq!(Err(TzxError::Truncated {
            context: "Archive Info string", offset: 16, available: 1
        }), parse_tzx(&data));
    }

    #[test]
    fn parse_tzx_truncated_blocks() {
        let blocks: [&[u8];3] = [
            b"\x10\xe8\x03\x03\x00\xff\x01\xfe",
            b"\x30\x04Tape",
            b"\x32\x0b\x00\x01\x03\x08Ultimate",
        ];
        for (i, block) in blocks.iter().enumerate() {
            let data = tzx(&blocks[..=i]);
            let start = data.len() - block.len();
            for len in start + 1..data.len() {
                match parse_tzx(&data[..len]) {
                    Err(TzxError::Truncated { offset, available, .. }) => {
                        assert!(offset > start && offset <= len);
                        assert_eq!(len - offset, available);
                    }
                    res => panic!("unexpected result: {:?} at {}", res, len)
                }
            }
            assert_eq!(i + 1, parse_tzx(&data).unwrap().blocks().len());
        }
    }

    #[test]
    fn read_tzx_works() -> io::Result<()> {
        let data = tzx(&[b"\x30\x04Tape"]);
        let tzx = read_tzx(&data[..])?;
        assert_eq!(Some("Tape".into()), tzx.blocks()[0].text_lossy());
        let err = read_tzx(&data[..12]).unwrap_err();
        assert_eq!(io::ErrorKind::InvalidData, err.kind());
        assert_eq!(Some(&TzxError::Truncated {
            context: "Text Description", offset: 12, available: 0
        }), crate::IoErrorExt::tzx_error_ref(&err));
        Ok(())
    }
}
