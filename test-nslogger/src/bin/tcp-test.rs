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

//! Test writing to a viewer on port 50000 on the local host (or the address given as the first
//! argument).

use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};
use tracing::{debug, error, info, trace, warn};
use tracing_nslogger::{
    custom_image, custom_label, error_image, extensions::Extensions, info_image, layer::Layer,
    transport::TcpTransport,
};
use tracing_subscriber::{
    layer::SubscriberExt, // Needed to get `with()`
    registry::Registry,
};

fn checkerboard(side: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_fn(side, side, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            Rgba([255, 0, 255, 255])
        } else {
            Rgba([0, 0, 0, 255])
        }
    }))
}

pub fn main() {
    let transport = Arc::new(match std::env::args().nth(1) {
        Some(addr) => TcpTransport::new(addr).unwrap(),
        None => TcpTransport::try_default().unwrap(),
    });
    // Setup the real subsriber...
    let subscriber = Registry::default().with(Layer::new("nslogger-test", transport.clone()));
    // and install it.
    let _guard = tracing::subscriber::set_default(subscriber);

    trace!("你好, TCP socket.");
    debug!("你好, TCP socket.");
    info!("你好, TCP socket.");
    warn!("你好, TCP socket.");
    error!("你好, TCP socket.");

    let log = Extensions::with_tracing(transport);
    info_image!(log, Some(checkerboard(64)));
    error_image!(log, None);
    custom_label!(log, label: "Database", Some("Userdata: sp1ff"));
    custom_label!(log, None::<String>);
    custom_image!(log, label: "facebook", Some(checkerboard(32)));
}
