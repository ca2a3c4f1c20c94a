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

//! The logging façade, as seen from the [extensions](crate::extensions).
//!
//! The extensions need exactly two things from whatever logging façade the application uses: to
//! ask whether a given level would be emitted at all, and to push a line of text through the
//! façade's ordinary pipeline (so that every other sink sees it, too). [`Facade`] captures that;
//! [`TracingFacade`] is the implementation for [`tracing`].
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html

use crate::{level::Severity, record::CallSite};

/// Target of every event dispatched through [`TracingFacade`]
pub const FACADE_TARGET: &str = "tracing_nslogger::facade";

/// The capabilities the extensions require of a logging façade.
pub trait Facade {
    /// Would a record at `level` make it past the façade's filtering?
    fn enabled(&self, level: Severity) -> bool;
    /// Dispatch `message`, attributed to `site`, through the façade's pipeline at `level`.
    fn log(&self, level: Severity, site: &CallSite, message: &str);
}

/// [`Facade`] implementation for [`tracing`]: filtering is whatever the current subscriber says,
/// and records become events.
///
/// Each event carries the originating call site & exact severity in dedicated fields (see
/// [`record`](crate::record)), since the event's own metadata necessarily points here.
///
/// [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingFacade;

// `tracing`'s macros need the level at compile time, hence one arm per level.
macro_rules! facade_event {
    ($lvl:expr, $level:expr, $site:expr, $message:expr) => {
        tracing::event!(
            target: FACADE_TARGET,
            $lvl,
            severity = $level.name(),
            callsite.file = $site.file(),
            callsite.line = $site.line(),
            callsite.function = $site.function(),
            "{}",
            $message
        )
    };
}

impl Facade for TracingFacade {
    fn enabled(&self, level: Severity) -> bool {
        match level {
            Severity::None => true,
            Severity::Verbose => {
                tracing::enabled!(target: FACADE_TARGET, tracing::Level::TRACE)
            }
            Severity::Debug => {
                tracing::enabled!(target: FACADE_TARGET, tracing::Level::DEBUG)
            }
            Severity::Info => {
                tracing::enabled!(target: FACADE_TARGET, tracing::Level::INFO)
            }
            Severity::Warning => {
                tracing::enabled!(target: FACADE_TARGET, tracing::Level::WARN)
            }
            Severity::Error | Severity::Severe => {
                tracing::enabled!(target: FACADE_TARGET, tracing::Level::ERROR)
            }
        }
    }
    fn log(&self, level: Severity, site: &CallSite, message: &str) {
        match level.tracing_level() {
            tracing::Level::TRACE => facade_event!(tracing::Level::TRACE, level, site, message),
            tracing::Level::DEBUG => facade_event!(tracing::Level::DEBUG, level, site, message),
            tracing::Level::INFO => facade_event!(tracing::Level::INFO, level, site, message),
            tracing::Level::WARN => facade_event!(tracing::Level::WARN, level, site, message),
            tracing::Level::ERROR => facade_event!(tracing::Level::ERROR, level, site, message),
        }
    }
}
