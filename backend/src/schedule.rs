use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use shared::{RecurringSlot, Schedule};

/// Allowed slack, in both directions, when comparing two travel times.
pub const TOLERANCE_MINUTES: i64 = 10;

/// How far ahead recurring slots are projected to concrete dates.
pub const PROJECTION_HORIZON_DAYS: i64 = 30;

/// The requester's schedule, expanded once into the shapes the four overlap
/// checks need: explicit dates, recurring slots, and the recurring slots
/// projected forward to concrete occurrences over the horizon.
///
/// `matches` is the single boolean filter used to shortlist candidate
/// routes; the four comparison classes are independent and OR-ed together.
#[derive(Debug, Clone)]
pub struct ScheduleFilter {
    dates: Vec<DateTime<Utc>>,
    slots: Vec<RecurringSlot>,
    projected: Vec<DateTime<Utc>>,
}

impl ScheduleFilter {
    pub fn new(schedule: &Schedule, now: DateTime<Utc>) -> Self {
        Self {
            dates: schedule.dates.clone(),
            slots: schedule.periodic.clone(),
            projected: project_occurrences(&schedule.periodic, now),
        }
    }

    pub fn matches(&self, candidate: &Schedule) -> bool {
        self.explicit_vs_explicit(candidate)
            || self.explicit_vs_recurring(candidate)
            || self.recurring_vs_recurring(candidate)
            || self.recurring_vs_explicit(candidate)
    }

    /// Any requester one-off date within ±tolerance of any candidate one-off.
    fn explicit_vs_explicit(&self, candidate: &Schedule) -> bool {
        self.dates
            .iter()
            .any(|ours| candidate.dates.iter().any(|theirs| near(*ours, *theirs)))
    }

    /// Requester one-offs reduced to day-of-week and time-of-day against the
    /// candidate's weekly slots.
    fn explicit_vs_recurring(&self, candidate: &Schedule) -> bool {
        self.dates.iter().any(|date| {
            candidate
                .periodic
                .iter()
                .any(|slot| date.weekday() == slot.day && time_near(date.time(), slot.time))
        })
    }

    /// Weekly slots on the same day of week, within the time-of-day window.
    fn recurring_vs_recurring(&self, candidate: &Schedule) -> bool {
        self.slots.iter().any(|ours| {
            candidate
                .periodic
                .iter()
                .any(|theirs| ours.day == theirs.day && time_near(ours.time, theirs.time))
        })
    }

    /// Requester weekly slots, projected to concrete dates over the horizon,
    /// against the candidate's one-off dates.
    fn recurring_vs_explicit(&self, candidate: &Schedule) -> bool {
        self.projected
            .iter()
            .any(|ours| candidate.dates.iter().any(|theirs| near(*ours, *theirs)))
    }
}

/// Concrete occurrences of the given weekly slots across the projection
/// horizon, starting today.
fn project_occurrences(slots: &[RecurringSlot], now: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let mut occurrences = Vec::new();
    for offset in 0..PROJECTION_HORIZON_DAYS {
        let date = (now + Duration::days(offset)).date_naive();
        for slot in slots {
            if date.weekday() == slot.day {
                occurrences.push(date.and_time(slot.time).and_utc());
            }
        }
    }
    occurrences
}

fn near(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    (a - b).abs() <= Duration::minutes(TOLERANCE_MINUTES)
}

/// Time-of-day comparison on the shared reference day. The window never
/// wraps across midnight: 23:58 and 00:03 are a full day apart.
fn time_near(a: NaiveTime, b: NaiveTime) -> bool {
    (a - b).abs() <= Duration::minutes(TOLERANCE_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Weekday};

    fn t(hour: u32, minute: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
    }

    fn slot(day: Weekday, hour: u32, minute: u32) -> RecurringSlot {
        RecurringSlot {
            day,
            time: t(hour, minute),
        }
    }

    fn recurring(slots: Vec<RecurringSlot>) -> Schedule {
        Schedule {
            dates: Vec::new(),
            periodic: slots,
        }
    }

    fn one_off(dates: Vec<DateTime<Utc>>) -> Schedule {
        Schedule {
            dates,
            periodic: Vec::new(),
        }
    }

    // a Monday
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    #[test]
    fn recurring_slots_match_within_tolerance() {
        let filter = ScheduleFilter::new(&recurring(vec![slot(Weekday::Mon, 8, 5)]), now());
        assert!(filter.matches(&recurring(vec![slot(Weekday::Mon, 8, 0)])));
    }

    #[test]
    fn recurring_slots_outside_tolerance_do_not_match() {
        let filter = ScheduleFilter::new(&recurring(vec![slot(Weekday::Mon, 8, 20)]), now());
        assert!(!filter.matches(&recurring(vec![slot(Weekday::Mon, 8, 0)])));
    }

    #[test]
    fn recurring_slots_on_other_days_do_not_match() {
        let filter = ScheduleFilter::new(&recurring(vec![slot(Weekday::Tue, 8, 0)]), now());
        assert!(!filter.matches(&recurring(vec![slot(Weekday::Mon, 8, 0)])));
    }

    #[test]
    fn tolerance_boundary_is_inclusive() {
        let filter = ScheduleFilter::new(&recurring(vec![slot(Weekday::Mon, 8, 10)]), now());
        assert!(filter.matches(&recurring(vec![slot(Weekday::Mon, 8, 0)])));
        let filter = ScheduleFilter::new(&recurring(vec![slot(Weekday::Mon, 8, 11)]), now());
        assert!(!filter.matches(&recurring(vec![slot(Weekday::Mon, 8, 0)])));
    }

    #[test]
    fn time_window_does_not_wrap_midnight() {
        let filter = ScheduleFilter::new(&recurring(vec![slot(Weekday::Mon, 0, 3)]), now());
        assert!(!filter.matches(&recurring(vec![slot(Weekday::Mon, 23, 58)])));
    }

    #[test]
    fn explicit_dates_match_within_absolute_window() {
        let requester = one_off(vec![Utc.with_ymd_and_hms(2025, 6, 9, 8, 0, 0).unwrap()]);
        let filter = ScheduleFilter::new(&requester, now());

        let close = one_off(vec![Utc.with_ymd_and_hms(2025, 6, 9, 8, 9, 0).unwrap()]);
        assert!(filter.matches(&close));

        let same_time_next_day = one_off(vec![Utc.with_ymd_and_hms(2025, 6, 10, 8, 0, 0).unwrap()]);
        assert!(!filter.matches(&same_time_next_day));
    }

    #[test]
    fn explicit_date_matches_candidate_recurring_slot() {
        // Monday 2025-06-09 08:00 against a Monday 08:05 weekly slot
        let requester = one_off(vec![Utc.with_ymd_and_hms(2025, 6, 9, 8, 0, 0).unwrap()]);
        let filter = ScheduleFilter::new(&requester, now());
        assert!(filter.matches(&recurring(vec![slot(Weekday::Mon, 8, 5)])));
        assert!(!filter.matches(&recurring(vec![slot(Weekday::Sun, 8, 0)])));
    }

    #[test]
    fn recurring_slot_matches_candidate_explicit_date_within_horizon() {
        // requester rides every Monday 08:00; candidate has a one-off on a
        // Monday three weeks out
        let filter = ScheduleFilter::new(&recurring(vec![slot(Weekday::Mon, 8, 0)]), now());
        let candidate = one_off(vec![Utc.with_ymd_and_hms(2025, 6, 23, 8, 6, 0).unwrap()]);
        assert!(filter.matches(&candidate));
    }

    #[test]
    fn recurring_slot_ignores_explicit_dates_beyond_horizon() {
        let filter = ScheduleFilter::new(&recurring(vec![slot(Weekday::Mon, 8, 0)]), now());
        // first Monday after the 30-day horizon
        let candidate = one_off(vec![Utc.with_ymd_and_hms(2025, 7, 7, 8, 0, 0).unwrap()]);
        assert!(!filter.matches(&candidate));
    }

    #[test]
    fn empty_schedules_never_match() {
        let filter = ScheduleFilter::new(&Schedule::default(), now());
        assert!(!filter.matches(&recurring(vec![slot(Weekday::Mon, 8, 0)])));
        assert!(!filter.matches(&Schedule::default()));
    }

    #[test]
    fn projection_covers_each_weekday_over_the_horizon() {
        let occurrences = project_occurrences(&[slot(Weekday::Mon, 8, 0)], now());
        // 2025-06-02 is a Monday; 30 days starting there hold 5 Mondays
        assert_eq!(occurrences.len(), 5);
        assert_eq!(
            occurrences[0],
            Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
        );
        assert!(occurrences.iter().all(|d| d.weekday() == Weekday::Mon));
    }
}
