// Copyright (C) 2025 Michael Herstine <sp1ff@pobox.com>
//
// This file is part of tracing-nslogger.
//
// tracing-nslogger is free software: you can redistribute it and/or modify it under the terms of
// the GNU General Public License as published by the Free Software Foundation, either version 3 of
// the License, or (at your option) any later version.
//
// tracing-nslogger is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See
// the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with tracing-nslogger.
// If not, see <http://www.gnu.org/licenses/>.

//! Call-site formatting primitives.
//!
//! Every line that reaches the viewer has the same shape:
//!
//! ```text
//! [<basename>:<line>] -> <function> : <message>
//! ```
//!
//! Both functions here are total: odd input (empty paths, empty function names) produces odd
//! output, never a panic.

use crate::level::Severity;

/// Reduce `path` to its final component.
///
/// Splits on `/` & `\` and returns the last non-empty segment. A path with no separator (or with
/// nothing but separators) comes back unchanged.
pub fn basename(path: &str) -> &str {
    path.rsplit(['/', '\\'])
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}

/// Assemble the one-line representation of a record.
///
/// `level` doesn't appear in the output; the viewer displays it separately.
pub fn format(
    _level: Severity,
    basename: &str,
    line: u32,
    function: &str,
    message: &str,
) -> String {
    format!("[{}:{}] -> {} : {}", basename, line, function, message)
}
