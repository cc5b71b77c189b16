use chrono::{DateTime, Days, Local, NaiveDate, TimeZone};
use core_types::Note;
use serde::Serialize;

use crate::day_start_ms;

#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Pinned,
    Today,
    Yesterday,
    Previous7Days,
    Previous30Days,
    Older,
}

impl Bucket {
    /// Display order in the sidebar.
    pub const ALL: [Bucket; 6] = [
        Bucket::Pinned,
        Bucket::Today,
        Bucket::Yesterday,
        Bucket::Previous7Days,
        Bucket::Previous30Days,
        Bucket::Older,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Bucket::Pinned => "Pinned",
            Bucket::Today => "Today",
            Bucket::Yesterday => "Yesterday",
            Bucket::Previous7Days => "Previous 7 Days",
            Bucket::Previous30Days => "Previous 30 Days",
            Bucket::Older => "Older",
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NoteGroup<'a> {
    pub bucket: Bucket,
    pub items: Vec<&'a Note>,
}

impl NoteGroup<'_> {
    pub fn label(&self) -> &'static str {
        self.bucket.label()
    }
}

struct Boundaries {
    today: i64,
    yesterday: i64,
    week: i64,
    month: i64,
}

impl Boundaries {
    fn at<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        let today = now.date_naive();
        let start = |days: u64| {
            let date = today
                .checked_sub_days(Days::new(days))
                .unwrap_or(NaiveDate::MIN);
            day_start_ms(now, date)
        };
        Self {
            today: start(0),
            yesterday: start(1),
            week: start(7),
            month: start(30),
        }
    }

    fn classify(&self, note: &Note) -> Bucket {
        let updated = note.updated_at;
        if note.pinned {
            Bucket::Pinned
        } else if updated >= self.today {
            Bucket::Today
        } else if updated >= self.yesterday {
            Bucket::Yesterday
        } else if updated >= self.week {
            Bucket::Previous7Days
        } else if updated >= self.month {
            Bucket::Previous30Days
        } else {
            Bucket::Older
        }
    }
}

/// Partitions notes into sidebar sections relative to `now`.
///
/// Pinned notes only ever appear in the pinned section, empty sections are
/// omitted and each section is ordered by `updated_at`, newest first.
pub fn group_notes<'a, Tz: TimeZone>(notes: &'a [Note], now: &DateTime<Tz>) -> Vec<NoteGroup<'a>> {
    let boundaries = Boundaries::at(now);
    let mut groups: Vec<NoteGroup<'a>> = Bucket::ALL
        .into_iter()
        .map(|bucket| NoteGroup {
            bucket,
            items: Vec::new(),
        })
        .collect();

    for note in notes {
        let bucket = boundaries.classify(note);
        if let Some(group) = groups.iter_mut().find(|group| group.bucket == bucket) {
            group.items.push(note);
        }
    }

    groups.retain(|group| !group.items.is_empty());
    for group in &mut groups {
        group.items.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    }
    groups
}

pub fn group_notes_now(notes: &[Note]) -> Vec<NoteGroup<'_>> {
    group_notes(notes, &Local::now())
}
