use chrono::{DateTime, Datelike, Duration, Months, Utc};

use super::AccountId;

/// Calendar math for the scheduled unlocks of the release-gated buckets.
/// Stateless: a timer collaborator asks what is due and drives the ledger;
/// the ledger's synchronous operations never consult the clock.
pub struct ReleaseSchedule;

impl ReleaseSchedule {
    /// The next unlock instant strictly after `after`, UTC.
    /// Weekly unlocks Sunday 00:00; Monthly on the 1st at 00:00.
    /// Daily and Savings are always liquid and have no scheduled release.
    pub fn next_release(account: AccountId, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match account {
            AccountId::Weekly => Some(next_sunday_midnight(after)),
            AccountId::Monthly => Some(first_of_next_month(after)),
            AccountId::Daily | AccountId::Savings => None,
        }
    }

    /// True when a release boundary has passed between `reference` (session
    /// start or last check) and `now`.
    pub fn is_due(account: AccountId, reference: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match Self::next_release(account, reference) {
            Some(release_at) => release_at <= now,
            None => false,
        }
    }
}

fn next_sunday_midnight(after: DateTime<Utc>) -> DateTime<Utc> {
    let date = after.date_naive();
    let days_ahead = (7 - date.weekday().num_days_from_sunday() as i64) % 7;
    let mut candidate = (date + Duration::days(days_ahead))
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc();
    if candidate <= after {
        candidate += Duration::days(7);
    }
    candidate
}

fn first_of_next_month(after: DateTime<Utc>) -> DateTime<Utc> {
    after
        .date_naive()
        .with_day(1)
        .unwrap()
        .checked_add_months(Months::new(1))
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}
