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

//! Primitives for mapping [`tracing`] [`Event`]s to log records.
//!
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
//!
//! A [`Record`] is everything the viewer needs to know about one log line: its [`Severity`], its
//! message & the call site that produced it. Ordinarily all of that is available from the
//! [`Event`] & its [`Metadata`], but events dispatched on behalf of the
//! [extensions](crate::extensions) carry their originating call site (and their exact severity) in
//! dedicated fields, since the event's own metadata can only ever point inside this crate.
//!
//! [`Metadata`]: https://docs.rs/tracing/latest/tracing/struct.Metadata.html

use crate::{facade::FACADE_TARGET, level::Severity};

use std::{borrow::Cow, fmt::Write};

/// Field carrying the exact [`Severity`] of an event (by name)
pub const SEVERITY_FIELD: &str = "severity";
/// Field carrying the originating source file
pub const FILE_FIELD: &str = "callsite.file";
/// Field carrying the originating line number
pub const LINE_FIELD: &str = "callsite.line";
/// Field carrying the originating function
pub const FUNCTION_FIELD: &str = "callsite.function";

/// The (file, line, function) triple identifying where a log call originated.
///
/// Usually built by the [`callsite!`](crate::callsite) macro.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CallSite {
    file: Cow<'static, str>,
    line: u32,
    function: Cow<'static, str>,
}

impl CallSite {
    pub fn new<F, N>(file: F, line: u32, function: N) -> CallSite
    where
        F: Into<Cow<'static, str>>,
        N: Into<Cow<'static, str>>,
    {
        CallSite {
            file: file.into(),
            line,
            function: function.into(),
        }
    }
    pub fn file(&self) -> &str {
        &self.file
    }
    pub fn line(&self) -> u32 {
        self.line
    }
    pub fn function(&self) -> &str {
        &self.function
    }
}

/// One log line, as handed to [`Layer::output`](crate::layer::Layer::output).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Record {
    pub level: Severity,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub function: String,
}

impl Record {
    pub fn new(level: Severity, message: impl Into<String>, site: &CallSite) -> Record {
        Record {
            level,
            message: message.into(),
            file: site.file().to_string(),
            line: site.line(),
            function: site.function().to_string(),
        }
    }

    /// Build a [`Record`] from `event`.
    ///
    /// `meta` is usually just `event.metadata()`, but when the `tracing-log` feature is enabled
    /// the caller may pass normalized metadata so that records from the `log` crate keep their
    /// file & line. This never fails: an event with no "message" field simply yields a record
    /// whose message is made up of its other fields (possibly an empty string).
    ///
    /// The severity & call-site fields are only honored on events dispatched by
    /// [`TracingFacade`](crate::facade::TracingFacade); anywhere else they're ordinary fields.
    pub fn from_event(event: &tracing::Event<'_>, meta: &tracing_core::Metadata<'_>) -> Record {
        let mut visitor = RecordVisitor {
            from_facade: event.metadata().target() == FACADE_TARGET,
            ..RecordVisitor::default()
        };
        event.record(&mut visitor);

        let mut message = visitor.message.unwrap_or_default();
        if message.is_empty() {
            message = visitor.fields.trim_start().to_string();
        } else {
            message.push_str(&visitor.fields);
        }

        Record {
            level: visitor
                .severity
                .unwrap_or_else(|| Severity::from(meta.level())),
            message,
            file: visitor
                .file
                .or_else(|| meta.file().map(String::from))
                .unwrap_or_default(),
            line: visitor.line.or_else(|| meta.line()).unwrap_or(0),
            function: visitor.function.unwrap_or_else(|| {
                meta.module_path()
                    .unwrap_or_else(|| meta.target())
                    .to_string()
            }),
        }
    }
}

#[derive(Default)]
struct RecordVisitor {
    from_facade: bool,
    message: Option<String>,
    // everything else, pre-rendered as " key=value" pairs
    fields: String,
    severity: Option<Severity>,
    file: Option<String>,
    line: Option<u32>,
    function: Option<String>,
}

impl RecordVisitor {
    fn record_text(&mut self, field: &tracing::field::Field, text: String) {
        match field.name() {
            "message" => self.message = Some(text),
            SEVERITY_FIELD if self.from_facade => self.severity = text.parse().ok(),
            FILE_FIELD if self.from_facade => self.file = Some(text),
            LINE_FIELD if self.from_facade => self.line = text.parse().ok(),
            FUNCTION_FIELD if self.from_facade => self.function = Some(text),
            // tracing-log's bookkeeping; surfaced through normalized metadata instead
            name if name.starts_with("log.") => (),
            name => {
                let _ = write!(self.fields, " {}={}", name, text);
            }
        }
    }
}

impl tracing::field::Visit for RecordVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        match field.name() {
            "message" => self.record_text(field, value.to_string()),
            SEVERITY_FIELD | FILE_FIELD | FUNCTION_FIELD if self.from_facade => {
                self.record_text(field, value.to_string())
            }
            // other string fields are quoted, as tracing-subscriber's fmt layer does
            _ => self.record_text(field, format!("{:?}", value)),
        }
    }
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        // The tracing macros take care to "pre-format" the `message` field so that `value`
        // actually refers to a `std::fmt::Arguments` instance, which will print to a debug format
        // without enclosing double-quotes.
        self.record_text(field, format!("{:?}", value));
    }
}
