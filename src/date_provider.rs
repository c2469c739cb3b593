use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate};
use std::sync::Mutex;

/// Format used for daily scopes and the date set
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trait for providing the current date/time to the quiz and the stats
/// This allows for flexible date handling (system time, overrides, tests)
///
/// The returned instant carries its UTC offset, so subtracting two of them
/// gives real elapsed time even when the local offset changes in between.
pub trait DateProvider: Send + Sync {
    /// Get the current date/time in the local offset
    fn now(&self) -> DateTime<FixedOffset>;

    /// Today's local calendar date as `YYYY-MM-DD`
    fn today(&self) -> String {
        self.now().format(DATE_FORMAT).to_string()
    }
}

/// Default date provider that uses the system's local date/time
pub struct SystemDateProvider;

impl DateProvider for SystemDateProvider {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Date provider that uses an overridden date instead of system time
/// Preserves the current time of day from system time
pub struct OverrideDateProvider {
    override_date: NaiveDate,
}

impl OverrideDateProvider {
    pub fn new(override_date: NaiveDate) -> Self {
        Self { override_date }
    }
}

impl DateProvider for OverrideDateProvider {
    fn now(&self) -> DateTime<FixedOffset> {
        let now = Local::now().fixed_offset();
        let shift = self.override_date.signed_duration_since(now.date_naive());
        now.checked_add_signed(shift).unwrap_or(now)
    }
}

/// Hand-driven clock; time only moves when told to
pub struct ManualDateProvider {
    current: Mutex<DateTime<FixedOffset>>,
}

impl ManualDateProvider {
    /// Starts at UTC midnight of the given day
    pub fn at_date(year: i32, month: u32, day: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(0, 0, 0)?
            .and_utc()
            .fixed_offset();
        Some(Self {
            current: Mutex::new(start),
        })
    }

    pub fn advance_ms(&self, millis: i64) {
        if let Ok(mut current) = self.current.lock() {
            *current += Duration::milliseconds(millis);
        }
    }

    /// Moves the local UTC offset by `seconds` without moving the instant,
    /// the way a daylight-saving switch does
    pub fn shift_offset(&self, seconds: i32) {
        if let Ok(mut current) = self.current.lock() {
            let shifted = FixedOffset::east_opt(current.offset().local_minus_utc() + seconds);
            if let Some(offset) = shifted {
                *current = current.with_timezone(&offset);
            }
        }
    }
}

impl DateProvider for ManualDateProvider {
    fn now(&self) -> DateTime<FixedOffset> {
        match self.current.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Parses a `YYYY-MM-DD` string
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).ok()
}
