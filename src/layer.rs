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

//! [tracing-nslogger](crate) [`Layer`] implementation.
//!
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//!
//! The [`Layer`] is the log destination: it receives every [`Event`] the subscriber lets through,
//! turns it into a [`Record`], and hands the formatted line to a [`Transport`].
//!
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html

use crate::{
    formatter::{basename, format},
    level::{to_transport_level, Severity},
    record::Record,
    transport::{TcpTransport, Transport},
};

use tracing::Event;
use tracing_subscriber::layer::Context;

// When the tracing-log feature is enabled, use NormalizeEvent to extract file/line metadata
// from events that originated from the `log` crate. This follows the same pattern used by
// tracing-subscriber's fmt layer.
// See: https://github.com/tokio-rs/tracing/blob/master/tracing-subscriber/src/fmt/fmt_layer.rs
#[cfg(feature = "tracing-log")]
use tracing_log::NormalizeEvent;

/// Target for this crate's own diagnostics. The [`Layer`] ignores events on this target, so a
/// failing transport can't feed itself.
pub const INTERNAL_TARGET: &str = "tracing_nslogger::internal";

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          struct Layer                                          //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// A [`tracing-subscriber`]-compliant [`Layer`] implementation that will send [`Event`]s to a
/// log viewer.
///
/// [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
/// [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
///
/// There is no per-layer threshold: filter with the subscriber (a
/// [`LevelFilter`](tracing_subscriber::filter::LevelFilter), say) so that the
/// [extensions](crate::extensions) see the same threshold when deciding whether to send an image.
pub struct Layer<T: Transport> {
    identifier: String,
    transport: T,
}

impl Layer<TcpTransport> {
    /// Attempt to construct a [`Layer`] that will send messages over TCP to a viewer listening
    /// on port 50000 on localhost
    pub fn try_default() -> crate::error::Result<Self> {
        Ok(Layer::new("nslogger", TcpTransport::try_default()?))
    }
}

impl<T: Transport> Layer<T> {
    /// Construct a [`Layer`] named `identifier` that will send messages via `transport`.
    ///
    /// `identifier` distinguishes this destination from any others the application may have
    /// composed into its subscriber.
    pub fn new<S: Into<String>>(identifier: S, transport: T) -> Self {
        Layer {
            identifier: identifier.into(),
            transport,
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Format `record` & send it to the viewer.
    ///
    /// Records at [`Severity::None`] are dropped: that level is reserved for the
    /// [extensions](crate::extensions), which talk to the transport directly; forwarding them
    /// here as well would show them twice. Nothing in here can fail from the caller's point of
    /// view: transport errors are reported & the record is dropped.
    pub fn output(&self, record: &Record) {
        if record.level == Severity::None {
            return;
        }

        let text = format(
            record.level,
            basename(&record.file),
            record.line,
            &record.function,
            &record.message,
        );
        if let Err(err) =
            self.transport
                .emit_message(record.level.name(), to_transport_level(record.level), &text)
        {
            ::tracing::warn!(
                target: INTERNAL_TARGET,
                "{}: dropped a record: {}",
                self.identifier,
                err
            );
        }
    }
}

/// This is the Big Tuna-- the [`Layer`] implementation.
///
/// [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
impl<S, T> tracing_subscriber::layer::Layer<S> for Layer<T>
where
    S: tracing::Subscriber,
    T: Transport + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() == INTERNAL_TARGET {
            return;
        }

        // When the tracing-log feature is enabled, use normalized_metadata() to get
        // file/line info for events that originated from the `log` crate.
        // For native tracing events, normalized_metadata() returns None and we use
        // the event's own metadata.
        #[cfg(feature = "tracing-log")]
        let normalized_meta = event.normalized_metadata();
        #[cfg(feature = "tracing-log")]
        let meta = normalized_meta.as_ref().unwrap_or_else(|| event.metadata());
        #[cfg(not(feature = "tracing-log"))]
        let meta = event.metadata();

        self.output(&Record::from_event(event, meta));
    }
}

#[cfg(test)]
pub(crate) mod smoke {

    use super::*;

    use crate::{error::Error, level::TransportLevel, record::CallSite};

    use backtrace::Backtrace;
    use std::sync::{Arc, Mutex};
    use tracing::{debug, error, info, trace, warn};
    use tracing_subscriber::{layer::SubscriberExt, registry::Registry};

    /// One call to a [`Transport`] primitive
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub enum Call {
        Message {
            tag: String,
            level: i32,
            text: String,
        },
        Image {
            tag: String,
            level: i32,
            width: i32,
            height: i32,
            len: usize,
        },
    }

    /// A [`Transport`] that remembers what it was asked to do
    #[derive(Clone, Default)]
    pub struct RecordingTransport {
        pub calls: Arc<Mutex<Vec<Call>>>,
    }

    impl RecordingTransport {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
        pub fn messages(&self) -> Vec<(String, i32, String)> {
            self.calls()
                .into_iter()
                .filter_map(|call| match call {
                    Call::Message { tag, level, text } => Some((tag, level, text)),
                    _ => None,
                })
                .collect()
        }
    }

    impl Transport for RecordingTransport {
        fn emit_message(
            &self,
            tag: &str,
            level: TransportLevel,
            text: &str,
        ) -> crate::error::Result<()> {
            self.calls.lock().unwrap().push(Call::Message {
                tag: tag.to_string(),
                level: level.as_i32(),
                text: text.to_string(),
            });
            Ok(())
        }
        fn emit_image(
            &self,
            tag: &str,
            level: TransportLevel,
            width: i32,
            height: i32,
            png: &[u8],
        ) -> crate::error::Result<()> {
            self.calls.lock().unwrap().push(Call::Image {
                tag: tag.to_string(),
                level: level.as_i32(),
                width,
                height,
                len: png.len(),
            });
            Ok(())
        }
    }

    /// A [`Transport`] whose viewer has gone away
    struct DeadTransport;

    impl Transport for DeadTransport {
        fn emit_message(&self, _: &str, _: TransportLevel, _: &str) -> crate::error::Result<()> {
            Err(Error::Transport {
                source: Box::new(std::io::Error::from(std::io::ErrorKind::BrokenPipe)),
                back: Backtrace::new(),
            })
        }
        fn emit_image(
            &self,
            _: &str,
            _: TransportLevel,
            _: i32,
            _: i32,
            _: &[u8],
        ) -> crate::error::Result<()> {
            unreachable!()
        }
    }

    #[test]
    fn test_output() {
        let transport = RecordingTransport::default();
        let layer = Layer::new("nslogger.identifier", transport.clone());
        assert_eq!(layer.identifier(), "nslogger.identifier");

        let site = CallSite::new("/Users/markus/App/App.ext", 42, "run");
        layer.output(&Record::new(Severity::Info, "hello", &site));
        layer.output(&Record::new(Severity::Severe, "oh no", &site));
        assert_eq!(
            transport.messages(),
            vec![
                (
                    "Info".to_string(),
                    3,
                    "[App.ext:42] -> run : hello".to_string()
                ),
                (
                    "Severe".to_string(),
                    0,
                    "[App.ext:42] -> run : oh no".to_string()
                ),
            ]
        );
    }

    #[test]
    fn test_none_is_suppressed() {
        let transport = RecordingTransport::default();
        let layer = Layer::new("nslogger", transport.clone());
        layer.output(&Record::new(
            Severity::None,
            "[Database] hi",
            &CallSite::new("a.rs", 1, "f"),
        ));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_user_severity_field() {
        let transport = RecordingTransport::default();
        let subscriber = Registry::default().with(Layer::new("nslogger", transport.clone()));
        tracing::subscriber::with_default(subscriber, || {
            warn!(severity = "none", "user-level field");
            info!(severity = "error", "user-level field");
        });
        let messages = transport.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!((messages[0].0.as_str(), messages[0].1), ("Warning", 2));
        assert!(messages[0].2.ends_with(": user-level field severity=\"none\""));
        assert_eq!((messages[1].0.as_str(), messages[1].1), ("Info", 3));
    }

    #[test]
    fn test_transport_failure_is_swallowed() {
        let layer = Layer::new("nslogger", DeadTransport);
        layer.output(&Record::new(
            Severity::Error,
            "nobody's listening",
            &CallSite::new("a.rs", 1, "f"),
        ));
        // & through the subscriber, where the layer's own warning must not loop back to it
        let _guard = tracing::subscriber::set_default(Registry::default().with(layer));
        error!("nobody's listening");
    }

    #[test]
    fn test_via_subscriber() {
        let transport = RecordingTransport::default();
        let subscriber = Registry::default().with(Layer::new("nslogger", transport.clone()));
        tracing::subscriber::with_default(subscriber, || {
            trace!("Hello, 世界!");
            debug!("Hello, 世界!");
            info!("Hello, 世界!");
            warn!(user = "sp1ff", "Hello, 世界!");
            error!("Hello, 世界!");
        });

        let messages = transport.messages();
        let levels: Vec<(String, i32)> = messages
            .iter()
            .map(|(tag, level, _)| (tag.clone(), *level))
            .collect();
        assert_eq!(
            levels,
            vec![
                ("Verbose".to_string(), 5),
                ("Debug".to_string(), 4),
                ("Info".to_string(), 3),
                ("Warning".to_string(), 2),
                ("Error".to_string(), 1),
            ]
        );
        assert!(messages[2].2.starts_with("[layer.rs:"));
        assert!(messages[2]
            .2
            .ends_with(&format!("] -> {} : Hello, 世界!", module_path!())));
        assert!(messages[3].2.ends_with(": Hello, 世界! user=\"sp1ff\""));
    }
}
