//! Timestamp formatting for `<t:EPOCH[:STYLE]>` tags.
//!
//! Absolute styles are fixed field sets rendered through chrono's locale
//! tables. Field order and the 12/24-hour clock come from the locale's own
//! short date and AM/PM strings, so `de_DE` reads `14. November 2023 22:13`
//! where `en_US` reads `November 14, 2023 10:13 PM`. The relative style (`R`) walks a threshold ladder and divides by the
//! previous rung, so `60s` becomes "1 minute" rather than "60 seconds".

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Locale, Offset, Utc};
use smol_str::SmolStr;

/// Display style of a timestamp tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimestampStyle {
    /// Short time, `4:20 PM`.
    ShortTime,
    /// Long time, `4:20:30 PM`.
    LongTime,
    /// Short date, `11/14/2023`.
    ShortDate,
    /// Long date, `November 14, 2023`.
    LongDate,
    /// Short date and time, `November 14, 2023 4:20 PM`.
    #[default]
    ShortDateTime,
    /// Long date and time with weekday.
    LongDateTime,
    /// Relative to "now", `in 3 hours` / `2 days ago`.
    Relative,
}

impl TimestampStyle {
    pub const ALL: [TimestampStyle; 7] = [
        Self::ShortTime,
        Self::LongTime,
        Self::ShortDate,
        Self::LongDate,
        Self::ShortDateTime,
        Self::LongDateTime,
        Self::Relative,
    ];

    /// Look up a style by its single-letter code (case sensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "t" => Some(Self::ShortTime),
            "T" => Some(Self::LongTime),
            "d" => Some(Self::ShortDate),
            "D" => Some(Self::LongDate),
            "f" => Some(Self::ShortDateTime),
            "F" => Some(Self::LongDateTime),
            "R" => Some(Self::Relative),
            _ => None,
        }
    }

    pub fn code(&self) -> char {
        match self {
            Self::ShortTime => 't',
            Self::LongTime => 'T',
            Self::ShortDate => 'd',
            Self::LongDate => 'D',
            Self::ShortDateTime => 'f',
            Self::LongDateTime => 'F',
            Self::Relative => 'R',
        }
    }
}

impl fmt::Display for TimestampStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown timestamp style `{0}` (expected one of t, T, d, D, f, F, R)")]
pub struct UnknownStyle(pub SmolStr);

impl FromStr for TimestampStyle {
    type Err = UnknownStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s).ok_or_else(|| UnknownStyle(SmolStr::new(s)))
    }
}

/// Ascending thresholds in seconds. The last rung is unbounded.
const LADDER: [(u64, &str); 6] = [
    (60, "second"),
    (3_600, "minute"),
    (86_400, "hour"),
    (2_592_000, "day"),
    (31_536_000, "month"),
    (u64::MAX, "year"),
];

/// Render a signed distance `epoch - now` as relative text.
pub fn format_relative(diff: i64) -> String {
    if diff == 0 {
        return "now".to_string();
    }
    let abs = diff.unsigned_abs();

    let mut divisor = 1;
    let mut unit = LADDER[LADDER.len() - 1].1;
    for (threshold, name) in LADDER {
        if threshold > abs {
            unit = name;
            break;
        }
        divisor = threshold;
    }

    let magnitude = abs / divisor;
    let plural = if magnitude == 1 { "" } else { "s" };
    if diff < 0 {
        format!("{magnitude} {unit}{plural} ago")
    } else {
        format!("in {magnitude} {unit}{plural}")
    }
}

/// chrono patterns for the locale-dependent fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LocalePatterns {
    short_time: &'static str,
    long_time: &'static str,
    long_date: &'static str,
}

impl LocalePatterns {
    const EN_US: Self = Self {
        short_time: "%-I:%M %p",
        long_time: "%-I:%M:%S %p",
        long_date: "%B %-d, %Y",
    };

    fn for_locale(locale: Locale) -> Self {
        // 2023-11-14T22:13:20Z: day, month and year digits are distinct.
        let Some(sample) = DateTime::from_timestamp(1_700_000_000, 0) else {
            return Self::EN_US;
        };
        let twelve_hour = !sample.format_localized("%p", locale).to_string().is_empty();
        let short_date = sample.format_localized("%x", locale).to_string();
        let (short_time, long_time) = if twelve_hour {
            ("%-I:%M %p", "%-I:%M:%S %p")
        } else {
            ("%H:%M", "%H:%M:%S")
        };
        Self {
            short_time,
            long_time,
            long_date: long_date_pattern(&short_date),
        }
    }
}

/// Spell the month out in the field order of the locale's short date.
fn long_date_pattern(short_date: &str) -> &'static str {
    let day = short_date.find("14");
    let month = short_date.find("11");
    let year = short_date.find("23");
    match (day, month, year) {
        (Some(day), Some(month), Some(year)) if year < month && month < day => {
            if short_date.contains('年') {
                "%Y年%-m月%-d日"
            } else if short_date.contains('년') {
                "%Y년 %-m월 %-d일"
            } else {
                "%Y %B %-d"
            }
        }
        (Some(day), Some(month), _) if day < month => {
            if short_date.contains('.') {
                "%-d. %B %Y"
            } else {
                "%-d %B %Y"
            }
        }
        _ => "%B %-d, %Y",
    }
}

/// Formats epochs for a fixed UTC offset and locale.
///
/// Formatting is a pure function of the inputs: the caller supplies `now`.
#[derive(Debug, Clone, Copy)]
pub struct TimestampFormatter {
    offset: FixedOffset,
    locale: Locale,
    patterns: LocalePatterns,
}

impl Default for TimestampFormatter {
    fn default() -> Self {
        Self {
            offset: Utc.fix(),
            locale: Locale::en_US,
            patterns: LocalePatterns::EN_US,
        }
    }
}

impl TimestampFormatter {
    pub fn new(offset: FixedOffset, locale: Locale) -> Self {
        Self {
            offset,
            locale,
            patterns: LocalePatterns::for_locale(locale),
        }
    }

    /// Build from an offset in minutes east of UTC and a POSIX locale name
    /// such as `en_US` or `de_DE`. Invalid values fall back to UTC / `en_US`.
    pub fn from_settings(utc_offset_minutes: i32, locale: &str) -> Self {
        let offset = utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::debug!(utc_offset_minutes, "invalid utc offset, using UTC");
                Utc.fix()
            });
        let locale = Locale::try_from(locale).unwrap_or_else(|_| {
            tracing::debug!(locale, "unknown locale, using en_US");
            Locale::en_US
        });
        Self::new(offset, locale)
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn format(&self, epoch: i64, style: TimestampStyle, now: i64) -> String {
        if style == TimestampStyle::Relative {
            return format_relative(epoch.saturating_sub(now));
        }
        let Some(utc) = DateTime::from_timestamp(epoch, 0) else {
            // Outside chrono's range; show the raw value.
            return epoch.to_string();
        };
        let local = utc.with_timezone(&self.offset);
        let field = |pattern: &str| local.format_localized(pattern, self.locale).to_string();
        let LocalePatterns {
            short_time,
            long_time,
            long_date,
        } = self.patterns;
        match style {
            TimestampStyle::ShortTime => field(short_time),
            TimestampStyle::LongTime => field(long_time),
            TimestampStyle::ShortDate => field("%x"),
            TimestampStyle::LongDate => field(long_date),
            TimestampStyle::ShortDateTime => {
                format!("{} {}", field(long_date), field(short_time))
            }
            TimestampStyle::LongDateTime => format!(
                "{}, {} {}",
                field("%A"),
                field(long_date),
                field(short_time)
            ),
            TimestampStyle::Relative => format_relative(epoch.saturating_sub(now)),
        }
    }
}

/// Format with UTC and `en_US`.
pub fn format_timestamp(epoch: i64, style: TimestampStyle, now: i64) -> String {
    TimestampFormatter::default().format(epoch, style, now)
}
