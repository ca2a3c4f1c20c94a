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

//! Log payloads: text or images.
//!
//! The viewer can display images inline, which `tracing` has no notion of. Images are shipped as
//! PNG (lossless, and something every viewer can decode) along with their pixel dimensions.

use crate::error::{Error, Result};

use backtrace::Backtrace;
use image::{DynamicImage, GenericImageView, ImageFormat};

use std::io::Cursor;

/// Default label for textual custom-label entries
pub const TEXT_LABEL: &str = "string";
/// Default label for image custom-label entries
pub const IMAGE_LABEL: &str = "image";

/// What a log call carries.
#[derive(Clone, Debug)]
pub enum Payload {
    Text(String),
    Image(DynamicImage),
}

impl Payload {
    /// The label used for custom-label entries when the caller doesn't supply one
    pub fn default_label(&self) -> &'static str {
        match self {
            Payload::Text(_) => TEXT_LABEL,
            Payload::Image(_) => IMAGE_LABEL,
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<DynamicImage> for Payload {
    fn from(image: DynamicImage) -> Self {
        Payload::Image(image)
    }
}

/// A short, human-readable description of `image`: its dimensions & pixel layout, e.g.
/// "640x480 Rgba8".
pub fn describe(image: &DynamicImage) -> String {
    let (width, height) = image.dimensions();
    format!("{}x{} {:?}", width, height, image.color())
}

/// An image, encoded & ready for the wire
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    pub width: i32,
    pub height: i32,
    pub png: Vec<u8>,
}

/// Encode `image` as PNG.
///
/// This is the one potentially expensive step in the whole pipeline, and it runs on the calling
/// thread.
pub fn encode(image: &DynamicImage) -> Result<EncodedImage> {
    let (width, height) = image.dimensions();
    let mut png = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|err| Error::ImageEncoding {
            source: Box::new(err),
            back: Backtrace::new(),
        })?;
    Ok(EncodedImage {
        width: i32::try_from(width).unwrap_or(i32::MAX),
        height: i32::try_from(height).unwrap_or(i32::MAX),
        png,
    })
}

#[cfg(test)]
mod test {
    use super::*;

    use image::{Rgba, RgbaImage};

    #[test]
    fn test_encode() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 2, Rgba([255, 0, 255, 255])));
        let enc = encode(&img).unwrap();
        assert_eq!((enc.width, enc.height), (3, 2));
        // PNG signature
        assert_eq!(&enc.png[..8], b"\x89PNG\r\n\x1a\n");

        let back = image::load_from_memory_with_format(&enc.png, ImageFormat::Png).unwrap();
        assert_eq!(back.dimensions(), (3, 2));
    }

    #[test]
    fn test_describe() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(640, 480));
        assert_eq!(describe(&img), "640x480 Rgba8");
    }

    #[test]
    fn test_default_labels() {
        assert_eq!(Payload::from("hi").default_label(), "string");
        assert_eq!(
            Payload::from(DynamicImage::new_rgb8(1, 1)).default_label(),
            "image"
        );
    }
}
