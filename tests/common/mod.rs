// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use dailywallet::application::{ScriptedGateway, WalletService};
use dailywallet::domain::WalletLedger;

pub const TEST_MSISDN: &str = "+254 712 345 678";

/// Service over the demo profile (daily 100, weekly 375, monthly 1500,
/// savings 4525) with an approve-everything gateway.
pub fn demo_service() -> WalletService {
    WalletService::new(
        WalletLedger::demo_profile(),
        Box::new(ScriptedGateway::new()),
        TEST_MSISDN,
    )
}

/// Service over the demo profile with a pre-scripted gateway.
pub fn demo_service_with_gateway(gateway: ScriptedGateway) -> WalletService {
    WalletService::new(
        WalletLedger::demo_profile(),
        Box::new(gateway),
        TEST_MSISDN,
    )
}

/// Service over zero balances.
pub fn empty_service() -> WalletService {
    WalletService::new(
        WalletLedger::new(),
        Box::new(ScriptedGateway::new()),
        TEST_MSISDN,
    )
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}
