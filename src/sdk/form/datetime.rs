use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Meridiem {
    #[default]
    Am,
    Pm,
}

/// Converts a 24-hour clock hour to its 1-12 form. 0 is 12 AM and 12 is 12 PM.
pub fn twelve_hour(hour24: u32) -> (u32, Meridiem) {
    let meridiem = if hour24 < 12 { Meridiem::Am } else { Meridiem::Pm };
    match hour24 % 12 {
        0 => (12, meridiem),
        hour => (hour, meridiem),
    }
}

pub fn twenty_four_hour(hour12: u32, meridiem: Meridiem) -> u32 {
    let offset = match meridiem {
        Meridiem::Am => 0,
        Meridiem::Pm => 12,
    };
    hour12 % 12 + offset
}

/// Number of days in `month` (1-12) of `year`, or 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(0)
}

/// Positions of the date/time selectors, exactly as the form holds them.
///
/// `month_index` is 0-11, `day_index` is 0-based and `hour_index` 0-11 stands
/// for the hours 1-12. The year is never picked directly; see
/// [`DateTimeSelection::infer_year`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeSelection {
    pub month_index: u32,
    pub day_index: u32,
    pub hour_index: u32,
    pub minute: u32,
    pub meridiem: Meridiem,
    pub year: i32,
}

impl DateTimeSelection {
    /// Selection pointing at the wall-clock time `now`.
    pub fn seeded(now: NaiveDateTime) -> Self {
        let (hour12, meridiem) = twelve_hour(now.hour());
        Self {
            month_index: now.month0(),
            day_index: now.day0(),
            hour_index: hour12 - 1,
            minute: now.minute(),
            meridiem,
            year: now.year(),
        }
    }

    pub fn month(&self) -> u32 {
        self.month_index + 1
    }

    pub fn day(&self) -> u32 {
        self.day_index + 1
    }

    pub fn hour24(&self) -> u32 {
        twenty_four_hour(self.hour_index + 1, self.meridiem)
    }

    /// The current year when (month, day, hour) has not passed yet, else the next one.
    pub fn infer_year(&self, now: NaiveDateTime) -> i32 {
        if (self.month(), self.day(), self.hour24()) >= (now.month(), now.day(), now.hour()) {
            now.year()
        } else {
            now.year() + 1
        }
    }

    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month(), self.day())?.and_hms_opt(
            self.hour24(),
            self.minute,
            0,
        )
    }
}
