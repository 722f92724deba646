mod common;

use chrono::Duration;
use common::{parse_date, TEST_MSISDN};
use dailywallet::application::{HistoryFilter, ScriptedGateway, WalletService};
use dailywallet::domain::{AccountId, ReleaseSchedule, TransferKind, WalletLedger};

fn service_started_at(date: &str) -> WalletService {
    WalletService::new(
        WalletLedger::demo_profile(),
        Box::new(ScriptedGateway::new()),
        TEST_MSISDN,
    )
    .with_session_start(parse_date(date))
}

#[test]
fn test_nothing_due_before_boundaries() {
    // Wed Dec 18 2024; Sunday is the 22nd, month ends Jan 1
    let service = service_started_at("2024-12-18");

    let outcomes = service.run_releases(parse_date("2024-12-21"));
    assert!(outcomes.is_empty());

    let entries = service.balances();
    assert!(entries.iter().any(|e| e.account == AccountId::Weekly && e.locked));
    assert!(entries.iter().any(|e| e.account == AccountId::Monthly && e.locked));
}

#[test]
fn test_weekly_releases_on_sunday() {
    let service = service_started_at("2024-12-18");

    let outcomes = service.run_releases(parse_date("2024-12-22") + Duration::hours(8));

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].account, AccountId::Weekly);
    assert_eq!(outcomes[0].released, 375);

    let record = outcomes[0].record.as_ref().unwrap();
    assert_eq!(record.kind, TransferKind::Release);
    assert_eq!(record.amount, 375);

    // Weekly is now spendable
    assert!(service.send("weekly", 50, "+254 722 111 222", None).is_ok());
}

#[test]
fn test_monthly_releases_on_the_first() {
    let service = service_started_at("2024-12-18");

    let outcomes = service.run_releases(parse_date("2025-01-02"));

    // Both boundaries passed: Sunday Dec 22 and Jan 1
    assert_eq!(outcomes.len(), 2);
    let accounts: Vec<_> = outcomes.iter().map(|o| o.account).collect();
    assert!(accounts.contains(&AccountId::Weekly));
    assert!(accounts.contains(&AccountId::Monthly));
}

#[test]
fn test_releases_do_not_change_total() {
    let service = service_started_at("2024-12-18");
    let total_before = service.total();

    service.run_releases(parse_date("2025-01-02"));

    assert_eq!(service.total(), total_before);
}

#[test]
fn test_release_runs_only_once() {
    let service = service_started_at("2024-12-18");

    let first = service.run_releases(parse_date("2024-12-23"));
    assert_eq!(first.len(), 1);

    // Same boundary again: already unlocked, nothing to do
    let second = service.run_releases(parse_date("2024-12-24"));
    assert!(second.is_empty());

    let releases = service.history(&HistoryFilter {
        kind: Some(TransferKind::Release),
        ..Default::default()
    });
    assert_eq!(releases.len(), 1);
}

#[test]
fn test_empty_bucket_unlocks_without_record() {
    let service = WalletService::new(
        WalletLedger::seeded(100, 0, 0, 0),
        Box::new(ScriptedGateway::new()),
        TEST_MSISDN,
    )
    .with_session_start(parse_date("2024-12-18"));

    let outcomes = service.run_releases(parse_date("2024-12-23"));

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].released, 0);
    assert!(outcomes[0].record.is_none());
    assert!(service.history(&Default::default()).is_empty());
}

#[test]
fn test_balances_expose_next_release_only_while_locked() {
    let service = service_started_at("2024-12-18");

    for entry in service.balances() {
        match entry.account {
            AccountId::Weekly | AccountId::Monthly => {
                assert!(entry.locked);
                assert!(entry.next_release.is_some());
            }
            AccountId::Daily | AccountId::Savings => {
                assert!(!entry.locked);
                assert!(entry.next_release.is_none());
            }
        }
    }

    service.run_releases(parse_date("2025-01-02"));
    assert!(service.balances().iter().all(|e| e.next_release.is_none()));
}

#[test]
fn test_schedule_boundaries_are_utc_midnight() {
    let next = ReleaseSchedule::next_release(AccountId::Weekly, parse_date("2024-12-18")).unwrap();
    assert_eq!(next, parse_date("2024-12-22"));

    let next = ReleaseSchedule::next_release(AccountId::Monthly, parse_date("2024-12-18")).unwrap();
    assert_eq!(next, parse_date("2025-01-01"));
}
