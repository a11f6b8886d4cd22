//! Calendar occurrences - birthdays, anniversaries and church events on one timeline.
//!
//! The dashboard shows the next occurrence of every birthday and anniversary (never
//! in the past relative to "today"); the calendar view shows this year's and next
//! year's occurrences. Both merge in the stored church events and sort by date.
//! Occurrences on the same day are never merged, and windowing is left to callers
//! through [`within_days`] and [`on_date`].

use crate::entities::{event, member};
use chrono::{Datelike, Days, NaiveDate, NaiveTime};
use serde::Serialize;

/// What an occurrence celebrates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OccurrenceKind {
    /// A member's birthday
    Birthday,
    /// A couple's wedding anniversary
    Anniversary,
    /// A scheduled church event
    Event,
}

/// Contact details shown next to a birthday or anniversary
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberContact {
    /// Member id
    pub id: String,
    /// Full name
    pub name: String,
    /// Email address
    pub email: String,
    /// Phone number
    pub phone: String,
}

impl From<&member::Model> for MemberContact {
    fn from(member: &member::Model) -> Self {
        Self {
            id: member.id.clone(),
            name: member.full_name(),
            email: member.email.clone(),
            phone: member.phone.clone(),
        }
    }
}

/// One dated entry on the church calendar
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    /// Birthday, anniversary or event
    #[serde(rename = "type")]
    pub kind: OccurrenceKind,
    /// Day of the occurrence
    pub date: NaiveDate,
    /// Headline, e.g. `"John Doe's Birthday"`
    pub description: String,
    /// Time and place for church events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// The member for birthdays and anniversaries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberContact>,
    /// The event id for church events
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// Per-kind totals for the dashboard cards
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OccurrenceCounts {
    /// Number of birthdays
    pub birthdays: usize,
    /// Number of anniversaries
    pub anniversaries: usize,
    /// Number of church events
    pub events: usize,
}

/// The date's month and day in another year.
///
/// February 29 becomes March 1 in non-leap years. `None` when `year` is outside
/// the range chrono can represent.
#[must_use]
pub fn in_year(original: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, original.month(), original.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

/// The first yearly recurrence of `original` on or after `today`.
#[must_use]
pub fn next_recurrence(original: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let this_year = in_year(original, today.year())?;
    if this_year < today {
        in_year(original, today.year().checked_add(1)?)
    } else {
        Some(this_year)
    }
}

/// Formats `HH:MM` as a 12-hour clock time, e.g. `"15:00"` becomes `"3:00 PM"`.
///
/// Unparseable input is returned unchanged.
#[must_use]
pub fn format_time_12h(time: &str) -> String {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_or_else(|_| time.to_string(), |t| t.format("%-I:%M %p").to_string())
}

fn birthday(member: &member::Model, date: NaiveDate) -> Occurrence {
    Occurrence {
        kind: OccurrenceKind::Birthday,
        date,
        description: format!("{}'s Birthday", member.full_name()),
        details: None,
        member: Some(member.into()),
        event_id: None,
    }
}

fn anniversary(member: &member::Model, date: NaiveDate) -> Occurrence {
    let spouse = member.spouse_name.as_deref().unwrap_or_default();
    Occurrence {
        kind: OccurrenceKind::Anniversary,
        date,
        description: format!("{} & {} Anniversary", member.first_name, spouse),
        details: None,
        member: Some(member.into()),
        event_id: None,
    }
}

fn church_event(event: &event::Model) -> Occurrence {
    Occurrence {
        kind: OccurrenceKind::Event,
        date: event.date,
        description: event.title.clone(),
        details: Some(format!(
            "{} - {}, {}",
            format_time_12h(&event.start_time),
            format_time_12h(&event.end_time),
            event.location
        )),
        member: None,
        event_id: Some(event.id.clone()),
    }
}

fn merge_sorted(mut occurrences: Vec<Occurrence>, events: &[event::Model]) -> Vec<Occurrence> {
    occurrences.extend(events.iter().map(church_event));
    occurrences.sort_by_key(|occurrence| occurrence.date);
    occurrences
}

/// Next birthday and anniversary of every member, plus all church events, by date.
///
/// Each birthday appears exactly once, dated on or after `today`.
#[must_use]
pub fn upcoming_occurrences(
    members: &[member::Model],
    events: &[event::Model],
    today: NaiveDate,
) -> Vec<Occurrence> {
    let mut occurrences = Vec::with_capacity(members.len() * 2 + events.len());
    for member in members {
        if let Some(day) = next_recurrence(member.birth_date, today) {
            occurrences.push(birthday(member, day));
        }
        if let Some(day) = member
            .anniversary_date
            .and_then(|wedding| next_recurrence(wedding, today))
        {
            occurrences.push(anniversary(member, day));
        }
    }
    merge_sorted(occurrences, events)
}

/// Birthdays and anniversaries in `year` and `year + 1`, plus all church events, by date.
///
/// Years chrono cannot represent contribute no member dates.
#[must_use]
pub fn calendar_occurrences(
    members: &[member::Model],
    events: &[event::Model],
    year: i32,
) -> Vec<Occurrence> {
    let years: Vec<i32> = [Some(year), year.checked_add(1)].into_iter().flatten().collect();
    let mut occurrences = Vec::with_capacity(members.len() * 4 + events.len());
    for member in members {
        for &target in &years {
            if let Some(day) = in_year(member.birth_date, target) {
                occurrences.push(birthday(member, day));
            }
            if let Some(day) = member
                .anniversary_date
                .and_then(|wedding| in_year(wedding, target))
            {
                occurrences.push(anniversary(member, day));
            }
        }
    }
    merge_sorted(occurrences, events)
}

/// Occurrences from `today` through `today + days`, inclusive.
#[must_use]
pub fn within_days(occurrences: &[Occurrence], today: NaiveDate, days: u64) -> Vec<Occurrence> {
    let end = today.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);
    occurrences
        .iter()
        .filter(|occurrence| occurrence.date >= today && occurrence.date <= end)
        .cloned()
        .collect()
}

/// Occurrences falling on one day, for the calendar's selected-date panel.
#[must_use]
pub fn on_date(occurrences: &[Occurrence], date: NaiveDate) -> Vec<Occurrence> {
    occurrences
        .iter()
        .filter(|occurrence| occurrence.date == date)
        .cloned()
        .collect()
}

/// Tallies occurrences by kind.
#[must_use]
pub fn count_by_kind(occurrences: &[Occurrence]) -> OccurrenceCounts {
    occurrences
        .iter()
        .fold(OccurrenceCounts::default(), |mut counts, occurrence| {
            match occurrence.kind {
                OccurrenceKind::Birthday => counts.birthdays += 1,
                OccurrenceKind::Anniversary => counts.anniversaries += 1,
                OccurrenceKind::Event => counts.events += 1,
            }
            counts
        })
}
