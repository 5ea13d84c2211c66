// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Time related utils.

use crate::Error;
use chrono::Utc;

/// DateTime is the alias for `chrono::DateTime<Utc>`.
pub type DateTime = chrono::DateTime<Utc>;

/// The largest fractional-second precision the storage service accepts.
pub const MAX_FRACTION_DIGITS: usize = 7;

/// Create datetime of now.
pub fn now() -> DateTime {
    Utc::now()
}

/// Format time into http date: `Sun, 06 Nov 1994 08:49:37 GMT`
///
/// ## Note
///
/// HTTP date is slightly different from RFC2822.
///
/// - Timezone is fixed to GMT.
/// - Day must be 2 digit.
pub fn format_http_date(t: DateTime) -> String {
    t.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Format time into ISO 8601 with exactly `precision` fractional digits.
///
/// ```text
/// precision = 0 => 2022-03-13T07:20:04Z
/// precision = 7 => 2022-03-13T07:20:04.1234567Z
/// ```
///
/// Digits beyond `precision` are truncated, not rounded.
pub fn format_iso8601(t: DateTime, precision: usize) -> crate::Result<String> {
    if precision > MAX_FRACTION_DIGITS {
        return Err(Error::invalid_argument(format!(
            "fractional second precision must be between 0 and {MAX_FRACTION_DIGITS}, got {precision}"
        )));
    }

    let mut s = t.format("%Y-%m-%dT%H:%M:%S").to_string();
    if precision > 0 {
        // Leap seconds are reported as nanos >= 1_000_000_000.
        let nanos = t.timestamp_subsec_nanos().min(999_999_999);
        let digits = format!("{nanos:09}");
        s.push('.');
        s.push_str(&digits[..precision]);
    }
    s.push('Z');

    Ok(s)
}

/// Parse an RFC3339 (ISO 8601) timestamp into a UTC datetime.
pub fn parse_rfc3339(s: &str) -> crate::Result<DateTime> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|v| v.with_timezone(&Utc))
        .map_err(|e| {
            Error::invalid_argument(format!("'{s}' is not a valid ISO 8601 timestamp"))
                .with_source(e)
        })
}
