//! Eligibility and unit conversion invariants
//!
//! Withdraw/refund gating compares base-unit (wei) values, never parsed
//! floats, so a pool at exactly its goal counts as funded.

use alloy::primitives::utils::{format_ether, parse_ether};
use alloy::primitives::U256;

fn funded(goal: U256, total: U256) -> bool {
    total >= goal
}

fn can_withdraw(owner: &str, candidate: &str, goal: U256, total: U256) -> bool {
    owner.eq_ignore_ascii_case(candidate) && funded(goal, total)
}

fn can_refund(deadline_passed: bool, goal: U256, total: U256) -> bool {
    deadline_passed && !funded(goal, total)
}

#[test]
fn withdraw_and_refund_are_mutually_exclusive() {
    let goal = parse_ether("50").unwrap();
    let owner = "0x742d35Cc6634C0532925a3b8D4C0532925a3b8D4";

    // Funded pool, deadline passed: owner withdraws, nobody refunds.
    let total = parse_ether("50").unwrap();
    assert!(can_withdraw(owner, owner, goal, total));
    assert!(!can_refund(true, goal, total));

    // Under-funded pool, deadline passed: refund only.
    let total = parse_ether("49.999999999999999999").unwrap();
    assert!(!can_withdraw(owner, owner, goal, total));
    assert!(can_refund(true, goal, total));
}

#[test]
fn owner_match_is_case_insensitive() {
    let goal = parse_ether("1").unwrap();
    let total = parse_ether("2").unwrap();
    assert!(can_withdraw(
        "0x742d35Cc6634C0532925a3b8D4C0532925a3b8D4",
        "0x742d35cc6634c0532925a3b8d4c0532925a3b8d4",
        goal,
        total
    ));
}

#[test]
fn refund_waits_for_the_deadline() {
    let goal = parse_ether("10").unwrap();
    let total = parse_ether("1").unwrap();
    assert!(!can_refund(false, goal, total));
    assert!(can_refund(true, goal, total));
}

#[test]
fn one_wei_short_is_not_funded() {
    let goal = parse_ether("1").unwrap();
    assert!(!funded(goal, goal - U256::from(1)));
    assert!(funded(goal, goal));
    assert!(funded(goal, goal + U256::from(1)));
}

#[test]
fn trimmed_display_strings_round_trip_to_the_same_wei() {
    for text in ["0.5", "1", "1.5", "32.5", "78.2", "0.000000000000000001"] {
        let wei = parse_ether(text).unwrap();
        let formatted = format_ether(wei);
        // format_ether pads to 18 decimals; trimming must not change value.
        let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
        let display = if trimmed.is_empty() { "0" } else { trimmed };
        assert_eq!(parse_ether(display).unwrap(), wei, "round trip for {text}");
    }
}
