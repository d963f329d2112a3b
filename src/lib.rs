/*
    Copyright (C) 2020-2022  Rafal Michalski

    This file is part of SPECTRUSTY, a Rust library for building emulators.

    SPECTRUSTY is free software: you can redistribute it and/or modify it under
    the terms of the GNU Lesser General Public License (LGPL) as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    SPECTRUSTY is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Lesser General Public License for more details.

    You should have received a copy of the GNU Lesser General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.

    Author contact information: see Cargo.toml file, section [package.authors].
*/
//! **TZX** tape image parser and *TAPE* pulse composer.
//!
//! A *TZX* file is decoded by [parse_tzx] (or [read_tzx]) into a [TzxFile] holding a list of
//! [TzxBlock]s. Then [TzxFile::pulse_iter] turns the blocks into a lazy stream of signal
//! [Pulse]s which can be fed to the `EAR IN` of the emulated Spectrum.
//!
//! ```no_run
//! use spectrusty_tzx::*;
//!
//! let tapfile = std::fs::File::open("some.tzx")?;
//! let tzx = read_tzx(tapfile)?;
//! for pulse in tzx.pulse_iter().take(10) {
//!     println!("{} {}", if pulse.level { "HIGH" } else { "LOW " }, pulse.duration);
//! }
//! # Ok::<(), std::io::Error>(())
//! ```
// http://www.worldofspectrum.org/TZXformat.html
pub mod cursor;
pub mod pulse;
pub mod tzx;
mod error;
mod sink;

pub use error::*;
pub use sink::*;
pub use tzx::*;
