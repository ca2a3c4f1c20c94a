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

//! [tracing-nslogger](crate) errors

use backtrace::Backtrace;

/// [tracing-nslogger](crate) error type
///
/// This crate eschews libraries like [thiserror] & [anyhow] in favor of a straightforward
/// enumeration with a few match arms chosen on the basis what the caller will need to respond.
/// In practice, callers of the logging entry points never see one of these: the [`Layer`] & the
/// extensions swallow them. They surface only when constructing a [`Transport`] or when driving
/// one directly.
///
/// [thiserror]: https://docs.rs/thiserror
/// [anyhow]: https://docs.rs/anyhow
/// [`Layer`]: crate::layer::Layer
/// [`Transport`]: crate::transport::Transport
#[non_exhaustive]
pub enum Error {
    /// The viewer address could not be resolved
    BadAddress {
        address: String,
        back: Backtrace,
    },
    /// An image payload could not be encoded to PNG
    ImageEncoding {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
    /// A message was too large to be framed (the wire format uses 32-bit lengths)
    MessageTooLarge {
        len: usize,
        back: Backtrace,
    },
    /// General transport layer error
    Transport {
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
        back: Backtrace,
    },
}

impl std::fmt::Display for Error {
    // `Error` is non-exhaustive so that adding variants won't be a breaking change to our
    // callers. That means the compiler won't catch us if we miss a variant here, so we
    // always include a `_` arm.
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadAddress { address, .. } => {
                write!(f, "Couldn't resolve the log viewer address '{}'", address)
            }
            Error::ImageEncoding { source, .. } => {
                write!(f, "While encoding an image as PNG, got {}", source)
            }
            Error::MessageTooLarge { len, .. } => {
                write!(f, "A {}-byte message is too large to send to the viewer", len)
            }
            Error::Transport { source, .. } => write!(f, "Transport error: {}", source),
            _ => write!(f, "Other tracing-nslogger error"),
        }
    }
}

impl std::fmt::Debug for Error {
    #[allow(unreachable_patterns)]
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::BadAddress { address: _, back } => write!(f, "{}\n{:#?}", self, back),
            Error::ImageEncoding { source: _, back } => write!(f, "{}\n{:#?}", self, back),
            Error::MessageTooLarge { len: _, back } => write!(f, "{}\n{:#?}", self, back),
            Error::Transport { source: _, back } => write!(f, "{}\n{:#?}", self, back),
            err => write!(f, "tracing-nslogger error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
