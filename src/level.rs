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

//! Severity definitions & the mapping between them.
//!
//! Two independently-numbered taxonomies meet here:
//!
//! - [`Severity`]: the levels in which application code thinks; a superset of [`tracing::Level`]
//!   that adds `Severe` & the `None` sentinel
//!
//! - [`TransportLevel`]: the levels the log viewer filters on: 0 is the most important, 5 the
//!   least
//!
//! [`to_transport_level`] is the one & only place the two are reconciled.

type StdResult<T, E> = std::result::Result<T, E>;

/// Host-side severity levels, least to most severe.
///
/// `None` is not a severity at all: it means "don't filter this; always attempt to emit it". It
/// sorts above everything else so that no minimum-severity setting can exclude it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Verbose,
    Debug,
    Info,
    Warning,
    Error,
    Severe,
    None,
}

impl Severity {
    /// All levels, least severe first.
    pub const ALL: [Severity; 7] = [
        Severity::Verbose,
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Severe,
        Severity::None,
    ];

    /// The display name; this is also the tag under which records appear in the viewer.
    pub fn name(&self) -> &'static str {
        match self {
            Severity::Verbose => "Verbose",
            Severity::Debug => "Debug",
            Severity::Info => "Info",
            Severity::Warning => "Warning",
            Severity::Error => "Error",
            Severity::Severe => "Severe",
            Severity::None => "None",
        }
    }

    /// The [`tracing::Level`] at which events of this severity are dispatched.
    ///
    /// `tracing` has no level above `ERROR` & no "unfiltered" level, so `Severe` rides on `ERROR`
    /// and `None` on `INFO`; the exact severity travels alongside in the event's `severity` field.
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            Severity::Verbose => tracing::Level::TRACE,
            Severity::Debug => tracing::Level::DEBUG,
            Severity::Info | Severity::None => tracing::Level::INFO,
            Severity::Warning => tracing::Level::WARN,
            Severity::Error | Severity::Severe => tracing::Level::ERROR,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.name())
    }
}

impl From<&tracing::Level> for Severity {
    fn from(level: &tracing::Level) -> Self {
        match *level {
            tracing::Level::TRACE => Severity::Verbose,
            tracing::Level::DEBUG => Severity::Debug,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::ERROR => Severity::Error,
        }
    }
}

/// Returned when a string doesn't name a [`Severity`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseSeverityError(String);

impl std::fmt::Display for ParseSeverityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "'{}' is not a severity level", self.0)
    }
}

impl std::error::Error for ParseSeverityError {}

impl std::str::FromStr for Severity {
    type Err = ParseSeverityError;
    fn from_str(s: &str) -> StdResult<Self, Self::Err> {
        Severity::ALL
            .iter()
            .find(|level| level.name().eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| ParseSeverityError(s.to_string()))
    }
}

/// A log viewer severity: 0 (most important) through 5 (least).
///
/// The field is private; the only way to get one is [`to_transport_level`] (or conversion from a
/// [`Severity`]), so a [`TransportLevel`] is always in range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransportLevel(u8);

impl TransportLevel {
    /// The value as it goes out on the wire
    pub fn as_i32(&self) -> i32 {
        self.0 as i32
    }
}

impl std::fmt::Display for TransportLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> StdResult<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

impl From<Severity> for TransportLevel {
    fn from(level: Severity) -> Self {
        to_transport_level(level)
    }
}

/// Map back from the viewer's scale; the inverse of [`to_transport_level`] save for `None`, which
/// shares a slot with `Info` & so comes back as `Info`.
impl From<TransportLevel> for Severity {
    fn from(level: TransportLevel) -> Self {
        match level.0 {
            0 => Severity::Severe,
            1 => Severity::Error,
            2 => Severity::Warning,
            3 => Severity::Info,
            4 => Severity::Debug,
            _ => Severity::Verbose,
        }
    }
}

/// Map a host [`Severity`] onto the viewer's scale.
///
/// The viewer's scale is inverted relative to [`Severity`] (0 is the most important). `None` has
/// no slot of its own & shares `Info`'s.
pub fn to_transport_level(level: Severity) -> TransportLevel {
    TransportLevel(match level {
        Severity::Severe => 0,
        Severity::Error => 1,
        Severity::Warning => 2,
        Severity::Info => 3,
        Severity::Debug => 4,
        Severity::Verbose => 5,
        Severity::None => 3,
    })
}
