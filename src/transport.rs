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

//! The log viewer transport layer.
//!
//! This module defines the [`Transport`] trait that all implementations must support, as well
//! as a TCP implementation speaking the NSLogger binary message format.
//!
//! # Examples
//!
//! To send messages to a viewer listening on port 50000 on localhost:
//!
//! ```no_run
//! use tracing_nslogger::transport::TcpTransport;
//! let transpo = TcpTransport::try_default().unwrap();
//! ```
//!
//! On a non-standard port on another host:
//!
//! ```no_run
//! use tracing_nslogger::transport::TcpTransport;
//! let transpo = TcpTransport::builder()
//!     .address("some-host.domain.io:50001")
//!     .client_name("my-app")
//!     .build()
//!     .unwrap();
//! ```
//!
//! # Wire format
//!
//! Every message is a big-endian `u32` giving the size of the remainder of the message, a `u16`
//! part count, and then the parts. Each part is a one-byte key, a one-byte type & a value: strings,
//! binary blobs & images are prefixed with a `u32` length, integers are fixed-width.

use crate::{
    error::{Error, Result},
    level::TransportLevel,
};

use backtrace::Backtrace;
use bytes::{BufMut, Bytes, BytesMut};
use chrono::prelude::*;

use std::{
    io::Write,
    net::{SocketAddr, TcpStream, ToSocketAddrs},
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                      transport mechanisms                                      //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// Operations all transports must support.
///
/// Both primitives are fire-and-forget as far as callers are concerned: they may be invoked from
/// any thread, at any time, & ordering between threads is not preserved. An `Err` return is
/// advisory; the [`Layer`](crate::layer::Layer) & the [extensions](crate::extensions) report it &
/// move on.
pub trait Transport: Send + Sync {
    /// Send a line of text under `tag` at `level`.
    fn emit_message(&self, tag: &str, level: TransportLevel, text: &str) -> Result<()>;
    /// Send a PNG-encoded image of `width` x `height` pixels under `tag` at `level`.
    fn emit_image(
        &self,
        tag: &str,
        level: TransportLevel,
        width: i32,
        height: i32,
        png: &[u8],
    ) -> Result<()>;
}

/// A [`Transport`] is commonly shared between the [`Layer`](crate::layer::Layer) & an
/// [`Extensions`](crate::extensions::Extensions) instance.
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn emit_message(&self, tag: &str, level: TransportLevel, text: &str) -> Result<()> {
        (**self).emit_message(tag, level, text)
    }
    fn emit_image(
        &self,
        tag: &str,
        level: TransportLevel,
        width: i32,
        height: i32,
        png: &[u8],
    ) -> Result<()> {
        (**self).emit_image(tag, level, width, height, png)
    }
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                          wire format                                           //
////////////////////////////////////////////////////////////////////////////////////////////////////

const PART_KEY_MESSAGE_TYPE: u8 = 0;
const PART_KEY_TIMESTAMP_S: u8 = 1;
const PART_KEY_TIMESTAMP_US: u8 = 3;
const PART_KEY_THREAD_ID: u8 = 4;
const PART_KEY_TAG: u8 = 5;
const PART_KEY_LEVEL: u8 = 6;
const PART_KEY_MESSAGE: u8 = 7;
const PART_KEY_IMAGE_WIDTH: u8 = 8;
const PART_KEY_IMAGE_HEIGHT: u8 = 9;
const PART_KEY_MESSAGE_SEQ: u8 = 10;
const PART_KEY_CLIENT_NAME: u8 = 20;
const PART_KEY_CLIENT_VERSION: u8 = 21;
const PART_KEY_OS_NAME: u8 = 22;
const PART_KEY_UNIQUEID: u8 = 25;

const PART_TYPE_STRING: u8 = 0;
const PART_TYPE_INT32: u8 = 3;
const PART_TYPE_INT64: u8 = 4;
const PART_TYPE_IMAGE: u8 = 5;

const LOGMSG_TYPE_LOG: i32 = 0;
const LOGMSG_TYPE_CLIENTINFO: i32 = 3;

/// What a log message carries
enum Content<'a> {
    Text(&'a str),
    Image {
        width: i32,
        height: i32,
        png: &'a [u8],
    },
}

/// Accumulates the parts of a single message
struct MessageBuilder {
    count: u16,
    body: BytesMut,
}

impl MessageBuilder {
    fn new(kind: i32) -> MessageBuilder {
        let mut msg = MessageBuilder {
            count: 0,
            body: BytesMut::with_capacity(256),
        };
        msg.int32(PART_KEY_MESSAGE_TYPE, kind);
        msg
    }
    fn header(&mut self, key: u8, kind: u8) {
        self.count += 1;
        self.body.put_u8(key);
        self.body.put_u8(kind);
    }
    fn int32(&mut self, key: u8, value: i32) -> &mut Self {
        self.header(key, PART_TYPE_INT32);
        self.body.put_i32(value);
        self
    }
    fn int64(&mut self, key: u8, value: i64) -> &mut Self {
        self.header(key, PART_TYPE_INT64);
        self.body.put_i64(value);
        self
    }
    fn blob(&mut self, key: u8, kind: u8, value: &[u8]) -> Result<&mut Self> {
        let len = u32::try_from(value.len()).map_err(|_| Error::MessageTooLarge {
            len: value.len(),
            back: Backtrace::new(),
        })?;
        self.header(key, kind);
        self.body.put_u32(len);
        self.body.put_slice(value);
        Ok(self)
    }
    fn string(&mut self, key: u8, value: &str) -> Result<&mut Self> {
        self.blob(key, PART_TYPE_STRING, value.as_bytes())
    }
    fn build(self) -> Result<Bytes> {
        // The size prefix counts the part count & the parts, but not itself.
        let size = u32::try_from(self.body.len() + 2).map_err(|_| Error::MessageTooLarge {
            len: self.body.len(),
            back: Backtrace::new(),
        })?;
        let mut buf = BytesMut::with_capacity(self.body.len() + 6);
        buf.put_u32(size);
        buf.put_u16(self.count);
        buf.put_slice(&self.body);
        Ok(buf.freeze())
    }
}

fn thread_id() -> String {
    let thread = std::thread::current();
    match thread.name() {
        Some(name) => name.to_string(),
        None => format!("{:?}", thread.id()),
    }
}

fn encode_log_message(
    seq: u32,
    tag: &str,
    level: TransportLevel,
    content: Content<'_>,
    timestamp: DateTime<Utc>,
) -> Result<Bytes> {
    let mut msg = MessageBuilder::new(LOGMSG_TYPE_LOG);
    msg.int64(PART_KEY_TIMESTAMP_S, timestamp.timestamp())
        .int32(
            PART_KEY_TIMESTAMP_US,
            timestamp.timestamp_subsec_micros() as i32,
        )
        .int32(PART_KEY_MESSAGE_SEQ, seq as i32)
        .int32(PART_KEY_LEVEL, level.as_i32())
        .string(PART_KEY_THREAD_ID, &thread_id())?
        .string(PART_KEY_TAG, tag)?;
    match content {
        Content::Text(text) => {
            msg.string(PART_KEY_MESSAGE, text)?;
        }
        Content::Image { width, height, png } => {
            msg.int32(PART_KEY_IMAGE_WIDTH, width)
                .int32(PART_KEY_IMAGE_HEIGHT, height)
                .blob(PART_KEY_MESSAGE, PART_TYPE_IMAGE, png)?;
        }
    }
    msg.build()
}

fn encode_client_info(
    client_name: &str,
    client_version: Option<&str>,
    host: Option<&str>,
) -> Result<Bytes> {
    let mut msg = MessageBuilder::new(LOGMSG_TYPE_CLIENTINFO);
    msg.string(PART_KEY_CLIENT_NAME, client_name)?
        .string(PART_KEY_OS_NAME, std::env::consts::OS)?;
    if let Some(version) = client_version {
        msg.string(PART_KEY_CLIENT_VERSION, version)?;
    }
    if let Some(host) = host {
        msg.string(PART_KEY_UNIQUEID, host)?;
    }
    msg.build()
}

////////////////////////////////////////////////////////////////////////////////////////////////////
//                                         TCP transport                                          //
////////////////////////////////////////////////////////////////////////////////////////////////////

/// The port on which viewers conventionally listen for direct (i.e. non-Bonjour) connections
pub const DEFAULT_PORT: u16 = 50000;

/// How long a single write may stall before the message is dropped
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Sending log messages to a viewer over a TCP stream
///
/// Connection management is minimal: the connection is made once, at construction;
/// if the viewer goes away, sends fail (and the records are dropped) until a new [`TcpTransport`]
/// is built.
pub struct TcpTransport {
    socket: Mutex<TcpStream>,
    seq: AtomicU32,
}

pub struct TcpTransportBuilder {
    address: String,
    client_name: Option<String>,
    client_version: Option<String>,
    write_timeout: Option<Duration>,
}

impl TcpTransportBuilder {
    pub fn address<S: Into<String>>(mut self, address: S) -> Self {
        self.address = address.into();
        self
    }
    pub fn client_name<S: Into<String>>(mut self, name: S) -> Self {
        self.client_name = Some(name.into());
        self
    }
    pub fn client_version<S: Into<String>>(mut self, version: S) -> Self {
        self.client_version = Some(version.into());
        self
    }
    /// Give up on a write after `timeout` (default [`DEFAULT_WRITE_TIMEOUT`]); `None` means wait
    /// forever on a viewer that has stopped reading.
    pub fn write_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.write_timeout = timeout;
        self
    }
    /// Connect to the viewer & introduce ourselves.
    pub fn build(self) -> Result<TcpTransport> {
        let addrs: Vec<SocketAddr> = self
            .address
            .to_socket_addrs()
            .map_err(|_| Error::BadAddress {
                address: self.address.clone(),
                back: Backtrace::new(),
            })?
            .collect();
        let socket = TcpStream::connect(&addrs[..])
            .and_then(|socket| {
                socket.set_write_timeout(self.write_timeout)?;
                Ok(socket)
            })
            .map_err(|err| Error::Transport {
                source: Box::new(err),
                back: Backtrace::new(),
            })?;
        let transport = TcpTransport {
            socket: Mutex::new(socket),
            seq: AtomicU32::new(0),
        };

        let client_name = self.client_name.unwrap_or_else(default_client_name);
        let host = hostname::get()
            .ok()
            .map(|host| host.to_string_lossy().into_owned());
        transport.send(&encode_client_info(
            &client_name,
            self.client_version.as_deref(),
            host.as_deref(),
        )?)?;
        Ok(transport)
    }
}

/// The name of the current executable, or "-" if that can't be had
fn default_client_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|pbuf| {
            pbuf.file_name()
                .map(|os_str| os_str.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "-".to_string())
}

impl TcpTransport {
    pub fn builder() -> TcpTransportBuilder {
        TcpTransportBuilder {
            address: format!("localhost:{}", DEFAULT_PORT),
            client_name: None,
            client_version: None,
            write_timeout: Some(DEFAULT_WRITE_TIMEOUT),
        }
    }
    /// Construct a [`Transport`] implementation via TCP at `addr`.
    pub fn new<S: Into<String>>(addr: S) -> Result<TcpTransport> {
        TcpTransport::builder().address(addr).build()
    }
    /// Construct a [`Transport`] implementation via TCP at localhost:50000
    pub fn try_default() -> Result<TcpTransport> {
        TcpTransport::builder().build()
    }
    fn next_seq(&self) -> u32 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
    fn send(&self, buf: &[u8]) -> Result<()> {
        // A poisoned lock only means another thread panicked mid-write; the worst that can happen
        // is a garbled message, which the viewer will discard.
        let mut socket = self.socket.lock().unwrap_or_else(|err| err.into_inner());
        socket
            .write_all(buf)
            .and_then(|_| socket.flush())
            .map_err(|err| Error::Transport {
                source: Box::new(err),
                back: Backtrace::new(),
            })
    }
}

impl Transport for TcpTransport {
    fn emit_message(&self, tag: &str, level: TransportLevel, text: &str) -> Result<()> {
        self.send(&encode_log_message(
            self.next_seq(),
            tag,
            level,
            Content::Text(text),
            Utc::now(),
        )?)
    }
    fn emit_image(
        &self,
        tag: &str,
        level: TransportLevel,
        width: i32,
        height: i32,
        png: &[u8],
    ) -> Result<()> {
        self.send(&encode_log_message(
            self.next_seq(),
            tag,
            level,
            Content::Image { width, height, png },
            Utc::now(),
        )?)
    }
}
