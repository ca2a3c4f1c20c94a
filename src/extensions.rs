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

//! Logging entry points beyond what [`tracing`] offers.
//!
//! [`tracing`]: https://docs.rs/tracing/latest/tracing/index.html
//!
//! [`Extensions`] adds two families of entry points:
//!
//! 1. images, at every severity: `info_image()`, `error_image()` & so on; the image goes straight
//!    to the viewer, while a one-line description of it goes through the [`Facade`] like any other
//!    record (so every other sink sees a trace of it, too)
//!
//! 2. "custom label" entries, text or image, filed under an arbitrary tag (`"Database"`,
//!    `"facebook"`, ...) & sent to the viewer regardless of the subscriber's filtering
//!
//! Every entry point takes its payload as a producer closure, which is invoked at most once.
//! Severity-specific entry points check the façade first & don't invoke the producer at all if
//! the level is filtered out; custom-label entry points always invoke it.
//!
//! The macros [`info_image!`](crate::info_image), [`custom_label!`](crate::custom_label) & friends
//! wrap the payload expression in a closure & fill in the call site:
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracing_nslogger::{custom_label, info_image};
//! use tracing_nslogger::{extensions::Extensions, layer::Layer, transport::TcpTransport};
//! use tracing_subscriber::{layer::SubscriberExt, registry::Registry};
//!
//! let transport = Arc::new(TcpTransport::try_default().unwrap());
//! let subscriber = Registry::default().with(Layer::new("nslogger", transport.clone()));
//! let _guard = tracing::subscriber::set_default(subscriber);
//!
//! let log = Extensions::with_tracing(transport);
//! info_image!(log, image::open("avatar.png").ok());
//! custom_label!(log, label: "Database", Some(format!("Userdata: {}", "sp1ff")));
//! ```

use crate::{
    facade::{Facade, TracingFacade},
    formatter::{basename, format},
    layer::INTERNAL_TARGET,
    level::{to_transport_level, Severity},
    payload::{describe, encode, EncodedImage, Payload, IMAGE_LABEL, TEXT_LABEL},
    record::CallSite,
    transport::Transport,
};

use image::DynamicImage;

/// What's logged in place of an absent payload
pub const NIL: &str = "nil";

/// Extended logging entry points over a [`Facade`] & a [`Transport`].
///
/// The [`Transport`] is typically shared (via [`Arc`](std::sync::Arc)) with the
/// [`Layer`](crate::layer::Layer) installed in the subscriber.
pub struct Extensions<F: Facade, T: Transport> {
    facade: F,
    transport: T,
}

impl<T: Transport> Extensions<TracingFacade, T> {
    pub fn with_tracing(transport: T) -> Self {
        Extensions::new(TracingFacade, transport)
    }
}

impl<F: Facade, T: Transport> Extensions<F, T> {
    pub fn new(facade: F, transport: T) -> Self {
        Extensions { facade, transport }
    }

    pub fn facade(&self) -> &F {
        &self.facade
    }

    /// Log the image produced by `producer` at `level`.
    ///
    /// If the façade would suppress `level`, `producer` isn't invoked. Otherwise, an image is sent
    /// to the viewer tagged with the level's name, & "Image: <description>" goes through the
    /// façade. If `producer` comes up empty, only "Invalid Image: nil" goes through the façade.
    ///
    /// [`Severity::None`] isn't a filtering level; an image at that level is treated as a custom
    /// label entry under the default "image" label.
    pub fn image<P>(&self, level: Severity, producer: P, site: &CallSite)
    where
        P: FnOnce() -> Option<DynamicImage>,
    {
        if level == Severity::None {
            return self.custom_label_image(producer, None, site);
        }
        if !self.facade.enabled(level) {
            return;
        }

        match producer() {
            Some(image) => match encode(&image) {
                Ok(enc) => {
                    self.send_image(level.name(), level, &enc);
                    self.facade
                        .log(level, site, &format!("Image: {}", describe(&image)));
                }
                Err(err) => self.facade.log(
                    level,
                    site,
                    &format!("Invalid Image: {} ({})", describe(&image), err),
                ),
            },
            None => self
                .facade
                .log(level, site, &format!("Invalid Image: {}", NIL)),
        }
    }

    pub fn verbose_image<P>(&self, producer: P, site: &CallSite)
    where
        P: FnOnce() -> Option<DynamicImage>,
    {
        self.image(Severity::Verbose, producer, site)
    }

    pub fn debug_image<P>(&self, producer: P, site: &CallSite)
    where
        P: FnOnce() -> Option<DynamicImage>,
    {
        self.image(Severity::Debug, producer, site)
    }

    pub fn info_image<P>(&self, producer: P, site: &CallSite)
    where
        P: FnOnce() -> Option<DynamicImage>,
    {
        self.image(Severity::Info, producer, site)
    }

    pub fn warning_image<P>(&self, producer: P, site: &CallSite)
    where
        P: FnOnce() -> Option<DynamicImage>,
    {
        self.image(Severity::Warning, producer, site)
    }

    pub fn error_image<P>(&self, producer: P, site: &CallSite)
    where
        P: FnOnce() -> Option<DynamicImage>,
    {
        self.image(Severity::Error, producer, site)
    }

    pub fn severe_image<P>(&self, producer: P, site: &CallSite)
    where
        P: FnOnce() -> Option<DynamicImage>,
    {
        self.image(Severity::Severe, producer, site)
    }

    /// Send the text produced by `producer` to the viewer under `label` (default "string"),
    /// unfiltered.
    ///
    /// `producer` is always invoked. The viewer gets the formatted line whatever the subscriber's
    /// filtering; "[<label>] <text>" also goes through the façade at [`Severity::None`]. An empty
    /// producer is logged as "nil".
    pub fn custom_label_text<P, M>(&self, producer: P, label: Option<&str>, site: &CallSite)
    where
        P: FnOnce() -> Option<M>,
        M: std::fmt::Display,
    {
        let label = label.unwrap_or(TEXT_LABEL);
        let message = producer()
            .map(|m| m.to_string())
            .unwrap_or_else(|| NIL.to_string());
        self.send_message(label, site, &message);
        self.facade
            .log(Severity::None, site, &format!("[{}] {}", label, message));
    }

    /// Send the image produced by `producer` to the viewer under `label` (default "image"),
    /// unfiltered.
    ///
    /// `producer` is always invoked. An image is sent along with a line describing it; an empty
    /// producer yields just a "nil" line. Either way, the façade gets a description at
    /// [`Severity::None`].
    pub fn custom_label_image<P>(&self, producer: P, label: Option<&str>, site: &CallSite)
    where
        P: FnOnce() -> Option<DynamicImage>,
    {
        let label = label.unwrap_or(IMAGE_LABEL);
        match producer() {
            Some(image) => {
                let descriptor = describe(&image);
                match encode(&image) {
                    Ok(enc) => {
                        self.send_image(label, Severity::None, &enc);
                        self.send_message(label, site, &descriptor);
                        self.facade
                            .log(Severity::None, site, &format!("Image: {}", descriptor));
                    }
                    Err(err) => {
                        let text = format!("Invalid Image: {} ({})", descriptor, err);
                        self.send_message(label, site, &text);
                        self.facade.log(Severity::None, site, &text);
                    }
                }
            }
            None => {
                self.send_message(label, site, NIL);
                self.facade
                    .log(Severity::None, site, &format!("Invalid Image: {}", NIL));
            }
        }
    }

    /// Log an already-built [`Payload`].
    ///
    /// At [`Severity::None`] this is a custom label entry; at any other level, text goes through
    /// the façade (prefixed with "[<label>] " if a label is given) & images are handled as by
    /// [`image`](Extensions::image).
    pub fn payload(&self, level: Severity, payload: Payload, label: Option<&str>, site: &CallSite) {
        match (level, payload) {
            (Severity::None, Payload::Text(text)) => {
                self.custom_label_text(|| Some(text), label, site)
            }
            (Severity::None, Payload::Image(image)) => {
                self.custom_label_image(|| Some(image), label, site)
            }
            (level, Payload::Text(text)) => {
                if self.facade.enabled(level) {
                    match label {
                        Some(label) => {
                            self.facade
                                .log(level, site, &format!("[{}] {}", label, text))
                        }
                        None => self.facade.log(level, site, &text),
                    }
                }
            }
            (level, Payload::Image(image)) => self.image(level, || Some(image), site),
        }
    }

    fn send_message(&self, tag: &str, site: &CallSite, message: &str) {
        let text = format(
            Severity::None,
            basename(site.file()),
            site.line(),
            site.function(),
            message,
        );
        if let Err(err) = self
            .transport
            .emit_message(tag, to_transport_level(Severity::None), &text)
        {
            ::tracing::warn!(target: INTERNAL_TARGET, "dropped a message: {}", err);
        }
    }

    fn send_image(&self, tag: &str, level: Severity, image: &EncodedImage) {
        if let Err(err) = self.transport.emit_image(
            tag,
            to_transport_level(level),
            image.width,
            image.height,
            &image.png,
        ) {
            ::tracing::warn!(target: INTERNAL_TARGET, "dropped an image: {}", err);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::{
        layer::{
            smoke::{Call, RecordingTransport},
            Layer,
        },
        record::Record,
    };

    use image::{Rgba, RgbaImage};
    use std::{
        cell::Cell,
        sync::{Arc, Mutex},
    };
    use tracing_subscriber::{filter::LevelFilter, layer::SubscriberExt, registry::Registry};

    /// A [`Facade`] that lets through everything at or above `min` & remembers what it was asked
    /// to log
    #[derive(Default)]
    struct RecordingFacade {
        min: Option<Severity>,
        logged: Mutex<Vec<Record>>,
    }

    impl RecordingFacade {
        fn at_least(min: Severity) -> RecordingFacade {
            RecordingFacade {
                min: Some(min),
                logged: Mutex::new(Vec::new()),
            }
        }
        fn logged(&self) -> Vec<Record> {
            self.logged.lock().unwrap().clone()
        }
    }

    impl Facade for RecordingFacade {
        fn enabled(&self, level: Severity) -> bool {
            self.min.map(|min| level >= min).unwrap_or(true)
        }
        fn log(&self, level: Severity, site: &CallSite, message: &str) {
            self.logged
                .lock()
                .unwrap()
                .push(Record::new(level, message, site));
        }
    }

    fn site() -> CallSite {
        CallSite::new("/Users/markus/App/ViewController.swift", 42, "viewDidLoad")
    }

    fn magenta(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            width,
            height,
            Rgba([255, 0, 255, 255]),
        ))
    }

    #[test]
    fn test_missing_image() {
        let transport = RecordingTransport::default();
        let log = Extensions::new(RecordingFacade::default(), transport.clone());
        log.warning_image(|| None, &site());

        let logged = log.facade().logged();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].level, Severity::Warning);
        assert!(logged[0].message.starts_with("Invalid Image:"));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn test_image() {
        let transport = RecordingTransport::default();
        let log = Extensions::new(RecordingFacade::default(), transport.clone());
        log.severe_image(|| Some(magenta(4, 3)), &site());

        let calls = transport.calls();
        assert_eq!(calls.len(), 1);
        match &calls[0] {
            Call::Image {
                tag,
                level,
                width,
                height,
                len,
            } => {
                assert_eq!(tag, "Severe");
                assert_eq!(*level, 0);
                assert_eq!((*width, *height), (4, 3));
                assert!(*len > 0);
            }
            call => panic!("expected an image, got {:?}", call),
        }

        let logged = log.facade().logged();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].message, "Image: 4x3 Rgba8");
        assert_eq!(logged[0].level, Severity::Severe);
        assert_eq!(logged[0].line, 42);
    }

    #[test]
    fn test_filter_before_evaluate() {
        let transport = RecordingTransport::default();
        let log = Extensions::new(RecordingFacade::at_least(Severity::Error), transport.clone());

        let calls = Cell::new(0);
        log.info_image(
            || {
                calls.set(calls.get() + 1);
                Some(magenta(1, 1))
            },
            &site(),
        );
        assert_eq!(calls.get(), 0);
        assert!(log.facade().logged().is_empty());
        assert!(transport.calls().is_empty());

        log.error_image(
            || {
                calls.set(calls.get() + 1);
                Some(magenta(1, 1))
            },
            &site(),
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_custom_label_text() {
        let transport = RecordingTransport::default();
        // the most restrictive façade there is makes no difference to custom labels
        let log = Extensions::new(RecordingFacade::at_least(Severity::None), transport.clone());

        let calls = Cell::new(0);
        log.custom_label_text(
            || {
                calls.set(calls.get() + 1);
                Some("X")
            },
            Some("Database"),
            &site(),
        );
        assert_eq!(calls.get(), 1);

        let messages = transport.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "Database");
        assert_eq!(messages[0].1, 3);
        assert_eq!(
            messages[0].2,
            "[ViewController.swift:42] -> viewDidLoad : X"
        );
        assert!(messages[0].2.ends_with("-> viewDidLoad : X"));

        let logged = log.facade().logged();
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].level, Severity::None);
        assert_eq!(logged[0].message, "[Database] X");
    }

    #[test]
    fn test_custom_label_nil() {
        let transport = RecordingTransport::default();
        let log = Extensions::new(RecordingFacade::default(), transport.clone());
        log.custom_label_text(|| None::<String>, None, &site());

        assert_eq!(
            transport.messages(),
            vec![(
                "string".to_string(),
                3,
                "[ViewController.swift:42] -> viewDidLoad : nil".to_string()
            )]
        );
        assert_eq!(log.facade().logged()[0].message, "[string] nil");
    }

    #[test]
    fn test_custom_label_image() {
        let transport = RecordingTransport::default();
        let log = Extensions::new(RecordingFacade::default(), transport.clone());
        log.custom_label_image(|| Some(magenta(2, 2)), Some("facebook"), &site());
        log.custom_label_image(|| None, None, &site());

        let calls = transport.calls();
        assert_eq!(calls.len(), 3);
        assert!(matches!(
            &calls[0],
            Call::Image { tag, level: 3, width: 2, height: 2, .. } if tag == "facebook"
        ));
        assert_eq!(
            calls[1],
            Call::Message {
                tag: "facebook".to_string(),
                level: 3,
                text: "[ViewController.swift:42] -> viewDidLoad : 2x2 Rgba8".to_string(),
            }
        );
        assert_eq!(
            calls[2],
            Call::Message {
                tag: "image".to_string(),
                level: 3,
                text: "[ViewController.swift:42] -> viewDidLoad : nil".to_string(),
            }
        );

        let logged: Vec<String> = log
            .facade()
            .logged()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(
            logged,
            vec!["Image: 2x2 Rgba8".to_string(), "Invalid Image: nil".to_string()]
        );
    }

    #[test]
    fn test_payload() {
        let transport = RecordingTransport::default();
        let log = Extensions::new(RecordingFacade::at_least(Severity::Info), transport.clone());
        log.payload(Severity::Debug, Payload::from("hidden"), None, &site());
        log.payload(Severity::Info, Payload::from("shown"), Some("ui"), &site());
        log.payload(Severity::None, Payload::from("always"), Some("ui"), &site());

        let logged: Vec<String> = log
            .facade()
            .logged()
            .into_iter()
            .map(|r| r.message)
            .collect();
        assert_eq!(
            logged,
            vec!["[ui] shown".to_string(), "[ui] always".to_string()]
        );
        assert_eq!(transport.messages().len(), 1);
    }

    #[test]
    fn test_idempotent() {
        let transport = RecordingTransport::default();
        let log = Extensions::new(RecordingFacade::default(), transport.clone());
        log.custom_label_text(|| Some("same"), Some("tag"), &site());
        log.custom_label_text(|| Some("same"), Some("tag"), &site());
        let messages = transport.messages();
        assert_eq!(messages[0], messages[1]);
    }

    #[test]
    fn test_subscriber_threshold_covers_images() {
        let transport = Arc::new(RecordingTransport::default());
        let subscriber = Registry::default()
            .with(LevelFilter::ERROR)
            .with(Layer::new("nslogger", transport.clone()));
        let log = Extensions::with_tracing(transport.clone());

        let produced = Cell::new(0);
        tracing::subscriber::with_default(subscriber, || {
            crate::info_image!(log, {
                produced.set(produced.get() + 1);
                Some(magenta(2, 2))
            });
            assert_eq!(produced.get(), 0);
            assert!(transport.calls().is_empty());

            crate::error_image!(log, {
                produced.set(produced.get() + 1);
                Some(magenta(2, 2))
            });
        });

        assert_eq!(produced.get(), 1);
        let calls = transport.calls();
        assert_eq!(calls.len(), 2, "{:?}", calls);
        assert!(matches!(
            &calls[0],
            Call::Image { tag, level: 1, .. } if tag == "Error"
        ));
        assert!(matches!(
            &calls[1],
            Call::Message { tag, level: 1, text } if tag == "Error" && text.ends_with(" : Image: 2x2 Rgba8")
        ));
    }

    #[test]
    fn test_with_tracing() {
        let transport = Arc::new(RecordingTransport::default());
        let subscriber = Registry::default()
            .with(LevelFilter::INFO)
            .with(Layer::new("nslogger", transport.clone()));
        let log = Extensions::with_tracing(transport.clone());

        tracing::subscriber::with_default(subscriber, || {
            crate::custom_label!(log, label: "Database", Some("X"));
            crate::info_image!(log, Some(magenta(2, 2)));
            crate::debug_image!(log, Some(magenta(2, 2)));
        });

        let calls = transport.calls();
        // The custom label reaches the viewer exactly once (the layer drops the façade's copy),
        // the info image arrives along with the layer's line describing it, and the debug image
        // is filtered out.
        assert_eq!(calls.len(), 3, "{:?}", calls);
        match &calls[0] {
            Call::Message { tag, level, text } => {
                assert_eq!(tag, "Database");
                assert_eq!(*level, 3);
                assert!(text.starts_with("[extensions.rs:"));
                assert!(text.ends_with("::test_with_tracing : X"));
            }
            call => panic!("expected a message, got {:?}", call),
        }
        assert!(matches!(
            &calls[1],
            Call::Image { tag, level: 3, width: 2, height: 2, .. } if tag == "Info"
        ));
        match &calls[2] {
            Call::Message { tag, level, text } => {
                assert_eq!(tag, "Info");
                assert_eq!(*level, 3);
                assert!(text.starts_with("[extensions.rs:"));
                assert!(text.ends_with(" : Image: 2x2 Rgba8"));
            }
            call => panic!("expected a message, got {:?}", call),
        }
    }
}
