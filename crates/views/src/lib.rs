//! Pure, clock-injected views derived from the note list for the sidebar.

pub mod grouping;
pub mod presentation;

use chrono::{DateTime, LocalResult, NaiveDate, TimeDelta, TimeZone};

pub use grouping::{Bucket, NoteGroup, group_notes, group_notes_now};
pub use presentation::{
    MAX_PREVIEW_CHARS, preview_snippet, relative_date_label, relative_date_label_now,
    rename_title,
};

const GAP_STEP_MINUTES: i64 = 15;

/// Epoch milliseconds of the first instant of `date` in the zone of `now`.
///
/// Usually local midnight. When a DST change skips midnight the day starts at
/// the end of the gap.
pub(crate) fn day_start_ms<Tz: TimeZone>(now: &DateTime<Tz>, date: NaiveDate) -> i64 {
    let tz = now.timezone();
    let Some(midnight) = date.and_hms_opt(0, 0, 0) else {
        return i64::MIN;
    };
    (0..24 * 60 / GAP_STEP_MINUTES)
        .find_map(|step| {
            let local = midnight + TimeDelta::minutes(step * GAP_STEP_MINUTES);
            tz.from_local_datetime(&local).earliest()
        })
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
        .timestamp_millis()
}

/// Converts epoch milliseconds into the zone of `now`.
pub(crate) fn local_datetime<Tz: TimeZone>(now: &DateTime<Tz>, ms: i64) -> Option<DateTime<Tz>> {
    match now.timezone().timestamp_millis_opt(ms) {
        LocalResult::Single(value) => Some(value),
        LocalResult::Ambiguous(earliest, _) => Some(earliest),
        LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, NaiveDateTime, NaiveTime};
    use core_types::{Note, NoteId};

    use super::*;

    /// UTC-4 until 2024-09-08 04:00 UTC, then UTC-3: local midnight of
    /// September 8 never happens.
    #[derive(Debug, Clone, Copy)]
    struct SkipsMidnight;

    impl SkipsMidnight {
        fn switch() -> NaiveDateTime {
            NaiveDate::from_ymd_opt(2024, 9, 8)
                .and_then(|date| date.and_hms_opt(4, 0, 0))
                .expect("switch instant")
        }

        fn before() -> FixedOffset {
            FixedOffset::west_opt(4 * 3600).expect("offset")
        }

        fn after() -> FixedOffset {
            FixedOffset::west_opt(3 * 3600).expect("offset")
        }
    }

    impl TimeZone for SkipsMidnight {
        type Offset = FixedOffset;

        fn from_offset(_offset: &FixedOffset) -> Self {
            SkipsMidnight
        }

        fn offset_from_local_date(&self, local: &NaiveDate) -> LocalResult<FixedOffset> {
            self.offset_from_local_datetime(&local.and_time(NaiveTime::MIN))
        }

        fn offset_from_local_datetime(&self, local: &NaiveDateTime) -> LocalResult<FixedOffset> {
            let as_before = *local - TimeDelta::seconds(Self::before().local_minus_utc().into());
            let as_after = *local - TimeDelta::seconds(Self::after().local_minus_utc().into());
            match (as_before < Self::switch(), as_after >= Self::switch()) {
                (true, true) => LocalResult::Ambiguous(Self::after(), Self::before()),
                (true, false) => LocalResult::Single(Self::before()),
                (false, true) => LocalResult::Single(Self::after()),
                (false, false) => LocalResult::None,
            }
        }

        fn offset_from_utc_date(&self, utc: &NaiveDate) -> FixedOffset {
            self.offset_from_utc_datetime(&utc.and_time(NaiveTime::MIN))
        }

        fn offset_from_utc_datetime(&self, utc: &NaiveDateTime) -> FixedOffset {
            if *utc < Self::switch() {
                Self::before()
            } else {
                Self::after()
            }
        }
    }

    fn switch_ms() -> i64 {
        SkipsMidnight::switch().and_utc().timestamp_millis()
    }

    #[test]
    fn day_starts_at_midnight_in_fixed_zones() {
        let zone = FixedOffset::east_opt(2 * 3600).expect("offset");
        let now = zone
            .with_ymd_and_hms(2024, 6, 15, 10, 30, 0)
            .single()
            .expect("valid now");
        let expected = zone
            .with_ymd_and_hms(2024, 6, 15, 0, 0, 0)
            .single()
            .expect("midnight")
            .timestamp_millis();
        assert_eq!(day_start_ms(&now, now.date_naive()), expected);
    }

    #[test]
    fn day_skipping_midnight_starts_after_the_gap() {
        let now = SkipsMidnight
            .with_ymd_and_hms(2024, 9, 8, 12, 0, 0)
            .single()
            .expect("valid now");

        assert_eq!(day_start_ms(&now, now.date_naive()), switch_ms());
    }

    #[test]
    fn grouping_uses_the_shifted_day_start() {
        let now = SkipsMidnight
            .with_ymd_and_hms(2024, 9, 8, 12, 0, 0)
            .single()
            .expect("valid now");
        let at = |ms: i64| Note::new(NoteId::new_v4(), ms);
        let notes = vec![at(switch_ms()), at(switch_ms() - 60_000)];

        let groups = group_notes(&notes, &now);
        let labels: Vec<&str> = groups.iter().map(NoteGroup::label).collect();
        assert_eq!(labels, vec!["Today", "Yesterday"]);
    }
}
