//! Calendar routes for the admin dashboard and calendar page.

use super::AppState;
use crate::core::calendar::{self, Occurrence, OccurrenceCounts};
use crate::core::{event, member};
use crate::errors::{Error, Result};
use axum::Json;
use axum::extract::{Query, State};
use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

const DEFAULT_WINDOW_DAYS: u64 = 30;
const CALENDAR_YEARS: RangeInclusive<i32> = 1..=9999;

/// Query string for `/api/calendar`
#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    /// First year shown, defaults to the current year
    pub year: Option<i32>,
    /// Restrict to a single day
    pub date: Option<NaiveDate>,
}

/// Query string for `/api/calendar/upcoming`
#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    /// Window length in days, defaults to 30
    pub days: Option<u64>,
}

/// Dashboard payload: per-kind totals and the occurrences behind them.
#[derive(Debug, Serialize)]
pub struct Upcoming {
    /// Totals per occurrence kind
    pub counts: OccurrenceCounts,
    /// Occurrences in the window, by date
    pub occurrences: Vec<Occurrence>,
}

/// Birthdays and anniversaries across `year` and the following year, merged with events.
pub async fn calendar(
    State(state): State<AppState>,
    Query(query): Query<CalendarQuery>,
) -> Result<Json<Vec<Occurrence>>> {
    let year = query
        .year
        .or_else(|| query.date.map(|day| day.year()))
        .unwrap_or_else(|| Local::now().year());
    if !CALENDAR_YEARS.contains(&year) {
        return Err(Error::validation(
            "year",
            format!(
                "{year} is outside {}..={}",
                CALENDAR_YEARS.start(),
                CALENDAR_YEARS.end()
            ),
        ));
    }
    let members = member::list_members(&state.database).await?;
    let events = event::list_events(&state.database).await?;

    let occurrences = calendar::calendar_occurrences(&members, &events, year);
    Ok(Json(match query.date {
        Some(day) => calendar::on_date(&occurrences, day),
        None => occurrences,
    }))
}

/// Everything in the next `days` days (30 by default), today included.
pub async fn upcoming(
    State(state): State<AppState>,
    Query(query): Query<UpcomingQuery>,
) -> Result<Json<Upcoming>> {
    let today = Local::now().date_naive();
    let days = query.days.unwrap_or(DEFAULT_WINDOW_DAYS);
    let members = member::list_members(&state.database).await?;
    let events = event::list_events(&state.database).await?;

    let all = calendar::upcoming_occurrences(&members, &events, today);
    let occurrences = calendar::within_days(&all, today, days);
    Ok(Json(Upcoming {
        counts: calendar::count_by_kind(&occurrences),
        occurrences,
    }))
}
