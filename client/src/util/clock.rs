//! Wall-clock access.
//!
//! Browser builds read `Date` through `js-sys` (the `time` crate cannot read
//! the clock on `wasm32-unknown-unknown`); native builds use `SystemTime`.

#[cfg(test)]
#[path = "clock_test.rs"]
mod clock_test;

use time::{OffsetDateTime, UtcOffset};

/// Current time as whole seconds since the Unix epoch.
#[allow(clippy::cast_possible_truncation)]
pub fn now_unix() -> i64 {
    #[cfg(feature = "hydrate")]
    {
        (js_sys::Date::now() / 1000.0).floor() as i64
    }
    #[cfg(not(feature = "hydrate"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

/// The viewer's UTC offset. UTC outside the browser.
#[allow(clippy::cast_possible_truncation)]
pub fn local_offset() -> UtcOffset {
    #[cfg(feature = "hydrate")]
    {
        // getTimezoneOffset is minutes *behind* UTC.
        let minutes = js_sys::Date::new_0().get_timezone_offset() as i32;
        UtcOffset::from_whole_seconds(-minutes * 60).unwrap_or(UtcOffset::UTC)
    }
    #[cfg(not(feature = "hydrate"))]
    {
        UtcOffset::UTC
    }
}

/// Current instant in the viewer's offset.
pub fn now_local() -> OffsetDateTime {
    at_offset(now_unix(), local_offset())
}

/// `unix` seconds expressed in `offset`; the epoch when out of range.
pub fn at_offset(unix: i64, offset: UtcOffset) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(unix)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(offset)
}
