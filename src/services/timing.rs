use chrono::NaiveDateTime;

/// Display pattern for show times on detail pages: `MM/DD/YYYY, HH:MM`.
pub const SHOW_TIME_DISPLAY_FORMAT: &str = "%m/%d/%Y, %H:%M";

/// Pattern for show times in the show listing.
pub const SHOW_TIME_LISTING_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShowTiming {
    Past,
    Upcoming,
}

impl ShowTiming {
    /// The single comparison used by every detail view: a show starting
    /// exactly at `now` is already past.
    pub fn classify(start_time: NaiveDateTime, now: NaiveDateTime) -> Self {
        if start_time <= now {
            ShowTiming::Past
        } else {
            ShowTiming::Upcoming
        }
    }
}

pub fn format_show_time(start_time: NaiveDateTime) -> String {
    start_time.format(SHOW_TIME_DISPLAY_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2019, 5, 21)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn boundary_is_inclusive_on_the_past_side() {
        let now = at(21, 30);
        assert_eq!(ShowTiming::classify(now, now), ShowTiming::Past);
        assert_eq!(
            ShowTiming::classify(now - Duration::seconds(1), now),
            ShowTiming::Past
        );
        assert_eq!(
            ShowTiming::classify(now + Duration::seconds(1), now),
            ShowTiming::Upcoming
        );
    }

    #[test]
    fn formats_with_24_hour_clock() {
        assert_eq!(format_show_time(at(21, 5)), "05/21/2019, 21:05");
        assert_eq!(format_show_time(at(8, 0)), "05/21/2019, 08:00");
    }
}
