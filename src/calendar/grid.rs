//! Month and week layouts for the calendar page.
//!
//! Everything here is pure. Calendar dates are local dates; conversion to and
//! from epoch milliseconds always goes through the caller's [`TimeZone`] so the
//! same code serves the daemon (`Local`) and tests (`Utc`, fixed offsets).

use crate::model::{CalendarEvent, Intervention, Millis, Timestamped};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Events and interventions at or above this count mark a day as busy.
pub const BUSY_THRESHOLD: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Month,
    Week,
}

impl ViewMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(Self::Month),
            "week" => Some(Self::Week),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Normal,
    Busy,
    Today,
}

/// An event as shown in a day cell, with its `HH:MM` label.
#[derive(Debug, Clone, Serialize)]
pub struct EventPill {
    #[serde(flatten)]
    pub event: CalendarEvent,
    pub time: String,
}

impl std::ops::Deref for EventPill {
    type Target = CalendarEvent;

    fn deref(&self) -> &CalendarEvent {
        &self.event
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub date: NaiveDate,
    /// Local midnight of `date`; drop target timestamp for this cell.
    pub start: Millis,
    pub events: Vec<EventPill>,
    pub interventions: Vec<Intervention>,
    pub intensity: Intensity,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GridCell {
    Blank,
    Day(DayCell),
}

impl GridCell {
    #[cfg(test)]
    pub fn as_day(&self) -> Option<&DayCell> {
        match self {
            GridCell::Blank => None,
            GridCell::Day(d) => Some(d),
        }
    }
}

/// Number of days in `month` (1-based): the day before the first of the next month.
/// Returns 0 for a month outside 1..=12.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(0)
}

/// Offset of the 1st of the month in a Monday-first week (Monday=0 … Sunday=6).
pub fn first_weekday_of_month(year: i32, month: u32) -> u32 {
    NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.weekday().num_days_from_monday())
        .unwrap_or(0)
}

/// Monday 00:00 of the week containing `at`.
pub fn start_of_week(at: NaiveDateTime) -> NaiveDateTime {
    let date = at.date();
    let back = i64::from(date.weekday().num_days_from_monday());
    (date - Duration::days(back)).and_time(NaiveTime::default())
}

/// Epoch milliseconds of a local wall-clock time. Wall times skipped by a DST
/// jump resolve one hour later; repeated ones take the earlier instant.
pub fn local_millis<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> Millis {
    tz.from_local_datetime(&local)
        .earliest()
        .or_else(|| {
            tz.from_local_datetime(&(local + Duration::hours(1)))
                .earliest()
        })
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| Utc.from_utc_datetime(&local).timestamp_millis())
}

pub fn local_datetime<Tz: TimeZone>(tz: &Tz, ms: Millis) -> Option<NaiveDateTime> {
    tz.timestamp_millis_opt(ms)
        .earliest()
        .map(|dt| dt.naive_local())
}

/// Inclusive `[00:00:00.000, 23:59:59.999]` window of `date` in epoch ms.
pub fn day_bounds<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> (Millis, Millis) {
    let start = local_millis(tz, date.and_time(NaiveTime::default()));
    let next = local_millis(tz, (date + Duration::days(1)).and_time(NaiveTime::default()));
    (start, next - 1)
}

pub fn bucket_by_day<'a, T, Tz>(items: &'a [T], tz: &Tz, date: NaiveDate) -> Vec<&'a T>
where
    T: Timestamped,
    Tz: TimeZone,
{
    let (start, end) = day_bounds(tz, date);
    items
        .iter()
        .filter(|it| {
            let ts = it.timestamp();
            ts >= start && ts <= end
        })
        .collect()
}

fn day_cell<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    events: &[CalendarEvent],
    interventions: &[Intervention],
    today: NaiveDate,
) -> DayCell {
    let mut day_events: Vec<EventPill> = bucket_by_day(events, tz, date)
        .into_iter()
        .map(|e| EventPill {
            event: e.clone(),
            time: time_label(tz, e.date),
        })
        .collect();
    day_events.sort_by_key(|e| e.date);
    let day_interventions: Vec<Intervention> = bucket_by_day(interventions, tz, date)
        .into_iter()
        .cloned()
        .collect();

    let intensity = if date == today {
        Intensity::Today
    } else if day_events.len() + day_interventions.len() >= BUSY_THRESHOLD {
        Intensity::Busy
    } else {
        Intensity::Normal
    };

    DayCell {
        date,
        start: day_bounds(tz, date).0,
        events: day_events,
        interventions: day_interventions,
        intensity,
    }
}

/// Leading blanks up to the first weekday, then one cell per day of the month.
pub fn month_grid<Tz: TimeZone>(
    tz: &Tz,
    reference: NaiveDate,
    events: &[CalendarEvent],
    interventions: &[Intervention],
    today: NaiveDate,
) -> Vec<GridCell> {
    let (year, month) = (reference.year(), reference.month());
    let blanks = first_weekday_of_month(year, month);
    let days = days_in_month(year, month);

    let mut cells: Vec<GridCell> = (0..blanks).map(|_| GridCell::Blank).collect();
    cells.extend(
        (1..=days)
            .filter_map(|d| NaiveDate::from_ymd_opt(year, month, d))
            .map(|date| GridCell::Day(day_cell(tz, date, events, interventions, today))),
    );
    cells
}

/// Seven cells, Monday through Sunday of the week containing `reference`.
pub fn week_grid<Tz: TimeZone>(
    tz: &Tz,
    reference: NaiveDateTime,
    events: &[CalendarEvent],
    interventions: &[Intervention],
    today: NaiveDate,
) -> Vec<DayCell> {
    let monday = start_of_week(reference).date();
    (0..7)
        .map(|i| day_cell(tz, monday + Duration::days(i), events, interventions, today))
        .collect()
}

/// Moves the reference by `delta` months (month view) or `delta` weeks (week view).
///
/// Month shifts keep day-of-month and time of day; a day past the end of the
/// target month rolls over into the following one (Jan 31 + 1 → Mar 2/3).
pub fn navigate(reference: NaiveDateTime, view: ViewMode, delta: i32) -> Option<NaiveDateTime> {
    match view {
        ViewMode::Month => shift_months(reference, delta),
        ViewMode::Week => reference.checked_add_signed(Duration::days(i64::from(delta) * 7)),
    }
}

fn shift_months(at: NaiveDateTime, delta: i32) -> Option<NaiveDateTime> {
    let total = at
        .year()
        .checked_mul(12)?
        .checked_add(at.month0() as i32)?
        .checked_add(delta)?;
    let first = NaiveDate::from_ymd_opt(total.div_euclid(12), total.rem_euclid(12) as u32 + 1, 1)?;
    let date = first.checked_add_signed(Duration::days(i64::from(at.day()) - 1))?;
    Some(date.and_time(at.time()))
}

/// `HH:MM`, zero padded.
pub fn time_label<Tz: TimeZone>(tz: &Tz, ms: Millis) -> String {
    local_datetime(tz, ms)
        .map(|dt| dt.format("%H:%M").to_string())
        .unwrap_or_default()
}

pub fn format_date_field(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn parse_date_field(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Strict `HH:MM`.
pub fn parse_time_field(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()
}

/// Lenient `HH:MM` for quick-add forms: unparseable parts count as zero.
pub fn parse_time_lenient(raw: &str) -> NaiveTime {
    let mut parts = raw.trim().split(':').map(|p| p.trim().parse::<u32>().unwrap_or(0));
    let hours = parts.next().unwrap_or(0);
    let mins = parts.next().unwrap_or(0);
    NaiveTime::from_hms_opt(hours, mins, 0).unwrap_or_default()
}
