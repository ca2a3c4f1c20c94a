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
//! A [`tracing-subscriber`] [`Layer`] implementation for sending [`tracing`] [`Event`]s (and
//! images) to an [NSLogger] desktop viewer
//!
//! [`tracing-subscriber`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/index.html
//! [`Layer`]: https://docs.rs/tracing-subscriber/latest/tracing_subscriber/layer/trait.Layer.html
//! [`tracing`]: https://docs.rs/tracing/0.1.35/tracing/index.html
//! [`Event`]: https://docs.rs/tracing/0.1.35/tracing/struct.Event.html
//! [NSLogger]: https://github.com/fpillet/NSLogger
//!
//! # Introduction
//!
//! [NSLogger] is a network log viewer: applications ship their log records over a socket to a
//! desktop application that displays them live, filtered by tag & level, with images rendered
//! inline. This crate plugs that viewer into [`tracing`] in two ways:
//!
//! 1. a [`Layer`](crate::layer::Layer) that forwards ordinary events to the viewer, each formatted
//!    as `[file:line] -> function : message`
//!
//! 2. [`Extensions`](crate::extensions::Extensions), which adds entry points [`tracing`] lacks:
//!    logging images at any severity & logging "custom label" entries that reach the viewer under
//!    an arbitrary tag regardless of filtering
//!
//! Severities follow the viewer's vocabulary (see [`level`](crate::level)): Verbose, Debug, Info,
//! Warning, Error & Severe, plus None for the custom-label entries. They map onto [`tracing`]'s
//! five levels on the way in & onto the viewer's numeric levels (0 = most severe) on the way out.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tracing::info;
//! use tracing_nslogger::{custom_label, info_image};
//! use tracing_nslogger::{extensions::Extensions, layer::Layer, transport::TcpTransport};
//! use tracing_subscriber::registry::Registry;
//! use tracing_subscriber::layer::SubscriberExt; // Needed to get `with()`
//!
//! // Connect to a viewer listening on port 50000 on the localhost; the layer & the extensions
//! // share the connection.
//! let transport = Arc::new(TcpTransport::try_default().unwrap());
//! let subscriber = Registry::default().with(Layer::new("nslogger", transport.clone()));
//! tracing::subscriber::set_global_default(subscriber).unwrap();
//!
//! info!("Hello, world!");
//!
//! let log = Extensions::with_tracing(transport);
//! info_image!(log, image::open("avatar.png").ok());
//! custom_label!(log, label: "Database", Some("Userdata: sp1ff"));
//! ```
//!
//! The viewer will show something like:
//!
//! ```text
//! Info      [main.rs:14] -> app::main : Hello, world!
//! Info      <the image>
//! Info      [main.rs:17] -> app::main : Image: 64x64 Rgba8
//! Database  [main.rs:18] -> app::main : Userdata: sp1ff
//! ```

#[macro_use]
mod macros;

pub mod error;
pub mod extensions;
pub mod facade;
pub mod formatter;
pub mod layer;
pub mod level;
pub mod payload;
pub mod record;
pub mod transport;
