/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
use core::convert::TryFrom;
use core::fmt;
use std::io;

use crate::tzx::TzxId;

/// The type of the error returned by the *TZX* parser.
///
/// Every error aborts the whole parse. A partially parsed file is never returned.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TzxError {
    /// The first 8 bytes of data are not the *TZX* signature.
    BadSignature {
        /// Signature bytes found in data.
        found: [u8;8],
        /// The expected signature.
        expected: [u8;8]
    },
    /// There were fewer bytes left than a field or a block required.
    Truncated {
        /// What was being read.
        context: &'static str,
        /// Position in data at which reading has failed.
        offset: usize,
        /// How many bytes were left at `offset`.
        available: usize
    },
    /// A block with this id can't be decoded.
    UnsupportedBlock(u8),
    /// An Archive Info block contains a text entry with this unknown id.
    UnknownArchiveInfoId(u8),
}

impl std::error::Error for TzxError {}

impl fmt::Display for TzxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TzxError::BadSignature { found, expected } => write!(f,
                "Bad TZX file signature \"{}\"; expected \"{}\"",
                    found.escape_ascii(), expected.escape_ascii()),
            TzxError::Truncated { context, offset, available } => write!(f,
                "TZX data truncated at byte {}: {} bytes left while reading {}",
                    offset, available, context),
            TzxError::UnsupportedBlock(id) => match TzxId::try_from(*id) {
                Ok(tzx_id) => write!(f, "Unsupported TZX block id 0x{:02x} ({})", id, tzx_id),
                Err(_) => write!(f, "Unknown TZX block id 0x{:02x}", id)
            },
            TzxError::UnknownArchiveInfoId(id) => write!(f,
                "Unknown TZX archive info string id 0x{:02x}", id)
        }
    }
}

impl From<TzxError> for io::Error {
    fn from(err: TzxError) -> Self {
        io::Error::new(io::ErrorKind::InvalidData, err)
    }
}

/// A trait with helpers for extracting [TzxError] from [io::Error].
pub trait IoErrorExt: Sized {
    fn is_tzx_error(&self) -> bool {
        self.tzx_error_ref().is_some()
    }
    fn into_tzx_error(self) -> Option<Box<TzxError>>;
    fn tzx_error_ref(&self) -> Option<&TzxError>;
}

impl IoErrorExt for io::Error {
    fn into_tzx_error(self) -> Option<Box<TzxError>> {
        if let Some(inner) = self.into_inner() {
            if let Ok(tzx_err) = inner.downcast::<TzxError>() {
                return Some(tzx_err)
            }
        }
        None
    }
    fn tzx_error_ref(&self) -> Option<&TzxError> {
        if let Some(inner) = self.get_ref() {
            if let Some(tzx_err) = inner.downcast_ref::<TzxError>() {
                return Some(tzx_err)
            }
        }
        None
    }
}
