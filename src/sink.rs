/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    For the full copyright notice, see the lib.rs file.
*/
#[allow(unused_imports)]
use log::{error, warn, info, debug, trace};

/// A receiver of human-readable descriptions found in *TZX* files.
///
/// The parser reports *Archive Info* entries and the pulse iterator reports
/// *Text Description* blocks as they are reached.
pub trait TzxSink {
    /// Receives a single line of text.
    fn report(&mut self, line: &str);
}

/// Forwards the reported lines to the [log] facade at the `info` level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogSink;

/// Discards the reported lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NullSink;

impl TzxSink for LogSink {
    fn report(&mut self, line: &str) {
        info!("{}", line);
    }
}

impl TzxSink for NullSink {
    fn report(&mut self, _line: &str) {}
}

/// Collects the reported lines.
impl TzxSink for Vec<String> {
    fn report(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

impl<S: TzxSink + ?Sized> TzxSink for &mut S {
    fn report(&mut self, line: &str) {
        (**self).report(line)
    }
}
