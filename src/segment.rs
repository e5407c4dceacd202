use std::{
    fmt::{Display, Formatter},
    ops::Range,
};

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Number of half-hour segments in a calendar day.
pub const SEGMENTS_PER_DAY: usize = 48;

/// One of the 48 half-hour intervals of a day, identified by its start.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct HalfHourSegment {
    hour_start: u32,
    minute_start: u32,
}

impl HalfHourSegment {
    /// The segment at the given position in the daily grid.
    ///
    /// # Panics
    ///
    /// Panics when `index >= 48`; the grid has no further segments.
    #[must_use]
    pub const fn at(index: usize) -> Self {
        assert!(index < SEGMENTS_PER_DAY, "a day has 48 half-hour segments");
        Self {
            hour_start: (index / 2) as u32,
            minute_start: if index % 2 == 0 { 0 } else { 30 },
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        (self.hour_start * 2 + self.minute_start / 30) as usize
    }

    #[must_use]
    pub const fn hour_start(self) -> u32 {
        self.hour_start
    }

    #[must_use]
    pub const fn minute_start(self) -> u32 {
        self.minute_start
    }

    #[must_use]
    pub fn start_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(self.hour_start, self.minute_start, 0)
            .expect("a segment start is always a valid time of day")
    }

    /// Derived end of the segment; the last segment wraps to midnight.
    #[must_use]
    pub fn end_time(self) -> NaiveTime {
        self.start_time() + chrono::TimeDelta::minutes(30)
    }
}

impl Display for HalfHourSegment {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let end = self.end_time();
        write!(
            f,
            "{:02}:{:02}-{:02}:{:02}",
            self.hour_start,
            self.minute_start,
            end.hour(),
            end.minute(),
        )
    }
}

/// The canonical ordered daily grid, shared by every component.
pub static DAY_SEGMENTS: [HalfHourSegment; SEGMENTS_PER_DAY] = build_day();

const fn build_day() -> [HalfHourSegment; SEGMENTS_PER_DAY] {
    let mut segments = [HalfHourSegment { hour_start: 0, minute_start: 0 }; SEGMENTS_PER_DAY];
    let mut index = 0;
    while index < SEGMENTS_PER_DAY {
        segments[index] = HalfHourSegment::at(index);
        index += 1;
    }
    segments
}

/// Segments whose starting hour falls within the range.
pub fn in_hours(hours: Range<u32>) -> impl Iterator<Item = HalfHourSegment> {
    DAY_SEGMENTS.iter().copied().filter(move |segment| hours.contains(&segment.hour_start))
}

#[must_use]
pub fn day_of_year(date: NaiveDate) -> u32 {
    chrono::Datelike::ordinal(&date)
}
