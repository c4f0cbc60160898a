//! PDF date strings (PDF Reference 1.3, section 3.8.2).
//!
//! Only the `D:YYYYMMDDHHmmSS` part is read; the timezone offset is not
//! parsed and the wall-clock fields are taken as UTC.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use super::string::decode_string;

const FIELD_WIDTHS: [usize; 6] = [4, 2, 2, 2, 2, 2];

/// Distiller 3 wrote the year 2000 as "19100": two century digits followed
/// by three digits of years since 1900.
const LEGACY_FIELD_WIDTHS: [usize; 7] = [2, 3, 2, 2, 2, 2, 2];
const LEGACY_YEAR_LIMIT: i32 = 1930;
const LEGACY_MIN_LEN: usize = 14;

/// Decode a raw date string object.
pub fn decode_date(bytes: &[u8]) -> Option<DateTime<Utc>> {
    parse_date(&decode_string(bytes)?)
}

/// Parse an already decoded date string.
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let s = text.strip_prefix("D:").unwrap_or(text);

    let fields = scan_fields(s, &FIELD_WIDTHS);
    if fields.len() != FIELD_WIDTHS.len() {
        return None;
    }

    if fields[0] < LEGACY_YEAR_LIMIT && s.len() > LEGACY_MIN_LEN {
        let legacy = scan_fields(s, &LEGACY_FIELD_WIDTHS);
        if legacy.len() != LEGACY_FIELD_WIDTHS.len() {
            return None;
        }
        let year = legacy[0] * 100 + legacy[1];
        return calendar(year, &legacy[2..]);
    }

    calendar(fields[0], &fields[1..])
}

/// Build a timestamp; `None` for dates that do not exist.
fn calendar(year: i32, rest: &[i32]) -> Option<DateTime<Utc>> {
    let [month, day, hour, minute, second] = *rest else {
        return None;
    };
    let field = |v: i32| u32::try_from(v).ok();

    let naive = NaiveDate::from_ymd_opt(year, field(month)?, field(day)?)?.and_hms_opt(
        field(hour)?,
        field(minute)?,
        field(second)?,
    )?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Read consecutive `%<width>d` fields, stopping at the first that fails.
fn scan_fields(s: &str, widths: &[usize]) -> Vec<i32> {
    let mut scanner = FieldScanner {
        bytes: s.as_bytes(),
        pos: 0,
    };
    widths
        .iter()
        .map_while(|&width| scanner.int(width))
        .collect()
}

struct FieldScanner<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl FieldScanner<'_> {
    /// Leading whitespace is skipped without counting toward `width`; an
    /// optional sign does count.
    fn int(&mut self, width: usize) -> Option<i32> {
        while self.bytes.get(self.pos).is_some_and(u8::is_ascii_whitespace) {
            self.pos += 1;
        }

        let start = self.pos;
        let end = (start + width).min(self.bytes.len());
        let mut cursor = start;
        let negative = match self.bytes.get(cursor) {
            Some(b'-') if cursor < end => {
                cursor += 1;
                true
            }
            Some(b'+') if cursor < end => {
                cursor += 1;
                false
            }
            _ => false,
        };

        let digits_start = cursor;
        let mut value: i32 = 0;
        while cursor < end && self.bytes[cursor].is_ascii_digit() {
            value = value * 10 + i32::from(self.bytes[cursor] - b'0');
            cursor += 1;
        }
        if cursor == digits_start {
            return None;
        }

        self.pos = cursor;
        Some(if negative { -value } else { value })
    }
}
