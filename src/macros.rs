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

//! Call-site capture & convenience wrappers around [`Extensions`](crate::extensions::Extensions).

/// Expands to the fully-qualified path of the enclosing function, as a `&'static str`.
///
/// Closures are looked through, so invoking this inside `|| { ... }` in `app::run` still yields
/// "app::run".
#[macro_export]
macro_rules! function_name {
    () => {{
        fn f() {}
        fn type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = type_name_of(f);
        name.strip_suffix("::f")
            .unwrap_or(name)
            .trim_end_matches("::{{closure}}")
    }};
}

/// Expands to a [`CallSite`](crate::record::CallSite) describing the point of invocation.
#[macro_export]
macro_rules! callsite {
    () => {
        $crate::record::CallSite::new(file!(), line!(), $crate::function_name!())
    };
}

/// Log an `Option<DynamicImage>` at Verbose; the expression is only evaluated if that level is
/// enabled.
#[macro_export]
macro_rules! verbose_image {
    ($ext:expr, $image:expr) => {
        $ext.verbose_image(|| $image, &$crate::callsite!())
    };
}

#[macro_export]
macro_rules! debug_image {
    ($ext:expr, $image:expr) => {
        $ext.debug_image(|| $image, &$crate::callsite!())
    };
}

#[macro_export]
macro_rules! info_image {
    ($ext:expr, $image:expr) => {
        $ext.info_image(|| $image, &$crate::callsite!())
    };
}

#[macro_export]
macro_rules! warning_image {
    ($ext:expr, $image:expr) => {
        $ext.warning_image(|| $image, &$crate::callsite!())
    };
}

#[macro_export]
macro_rules! error_image {
    ($ext:expr, $image:expr) => {
        $ext.error_image(|| $image, &$crate::callsite!())
    };
}

#[macro_export]
macro_rules! severe_image {
    ($ext:expr, $image:expr) => {
        $ext.severe_image(|| $image, &$crate::callsite!())
    };
}

/// Send an `Option<impl Display>` to the viewer under a custom label, regardless of filtering.
///
/// A bare `None` leaves the payload type open; spell it `None::<String>` (or similar).
///
/// ```no_run
/// # use tracing_nslogger::{custom_label, extensions::Extensions, transport::TcpTransport};
/// let log = Extensions::with_tracing(TcpTransport::try_default().unwrap());
/// custom_label!(log, label: "Database", Some("Userdata: sp1ff"));
/// custom_label!(log, Some(42)); // filed under "string"
/// custom_label!(log, None::<String>); // logged as "nil"
/// ```
#[macro_export]
macro_rules! custom_label {
    ($ext:expr, label: $label:expr, $text:expr) => {
        $ext.custom_label_text(|| $text, Some($label), &$crate::callsite!())
    };
    ($ext:expr, $text:expr) => {
        $ext.custom_label_text(|| $text, None, &$crate::callsite!())
    };
}

/// Send an `Option<DynamicImage>` to the viewer under a custom label (default "image").
#[macro_export]
macro_rules! custom_image {
    ($ext:expr, label: $label:expr, $image:expr) => {
        $ext.custom_label_image(|| $image, Some($label), &$crate::callsite!())
    };
    ($ext:expr, $image:expr) => {
        $ext.custom_label_image(|| $image, None, &$crate::callsite!())
    };
}
