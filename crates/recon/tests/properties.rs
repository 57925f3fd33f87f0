// Property-based tests for reconciliation invariants.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use proptest::prelude::*;

use tally_recon::config::NormalizeOptions;
use tally_recon::normalize::normalize_str;
use tally_recon::{reconcile, MatchConfig, ReconResult, TransactionRecord, UnmatchedReason};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

fn base_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(10, 0, 0))
        .unwrap()
}

/// Small pools so keys collide often and groups hold several records.
fn arb_record() -> impl Strategy<Value = TransactionRecord> {
    (
        prop_oneof![
            2 => Just(None),
            1 => Just(Some("  ".to_string())),
            3 => "T[1-4]".prop_map(Some),
        ],
        prop::sample::select(vec!["Acme", "ACME", "Beta Corp", "beta  corp"]),
        prop::option::weighted(0.9, 0i64..900),
        prop::option::weighted(0.9, -3i64..4),
        prop::sample::select(vec!["Payment", "PAYMENT", "Refund", "Fee"]),
        prop::sample::select(vec!["DEDUCT", "REVERSAL"]),
        prop::option::of(1i32..3),
        prop::option::of(prop::sample::select(vec!["W1", "w1", "W2"])),
    )
        .prop_map(|(id, profile, secs, cents, narrative, description, kind, wallet)| TransactionRecord {
            profile_name: profile.to_string(),
            transaction_date: secs.map(|s| base_date() + Duration::seconds(s)),
            transaction_amount: cents.map(|c| BigDecimal::from(c * 25) / BigDecimal::from(100)),
            transaction_narrative: narrative.to_string(),
            transaction_description: description.to_string(),
            transaction_id: id,
            transaction_type: kind,
            wallet_reference: wallet.map(str::to_string),
        })
}

fn arb_side() -> impl Strategy<Value = Vec<TransactionRecord>> {
    proptest::collection::vec(arb_record(), 0..12)
}

fn run(left: &[TransactionRecord], right: &[TransactionRecord]) -> ReconResult {
    reconcile(left, right, &MatchConfig::default()).unwrap()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn every_record_is_accounted_for(left in arb_side(), right in arb_side()) {
        let result = run(&left, &right);
        let c = result.breakdown();
        prop_assert_eq!(
            2 * result.matched_count + 2 * (c.details_mismatch + c.not_identical) + c.missing(),
            left.len() + right.len()
        );
        prop_assert_eq!(result.unmatched_count, result.unmatched.len());
    }

    #[test]
    fn repeated_runs_agree(left in arb_side(), right in arb_side()) {
        prop_assert_eq!(run(&left, &right), run(&left, &right));
    }

    #[test]
    fn swapping_sides_swaps_missing(left in arb_side(), right in arb_side()) {
        let ab = run(&left, &right);
        let ba = run(&right, &left);
        let (x, y) = (ab.breakdown(), ba.breakdown());
        prop_assert_eq!(ab.matched_count, ba.matched_count);
        prop_assert_eq!(x.details_mismatch, y.details_mismatch);
        prop_assert_eq!(x.not_identical, y.not_identical);
        prop_assert_eq!(x.missing_left_only, y.missing_right_only);
        prop_assert_eq!(x.missing_right_only, y.missing_left_only);
    }

    #[test]
    fn amount_scale_never_matters(left in arb_side(), right in arb_side(), extra in 1u32..4) {
        let rescaled: Vec<TransactionRecord> = right
            .iter()
            .cloned()
            .map(|mut r| {
                if let Some(ref mut amount) = r.transaction_amount {
                    let (_, scale) = amount.as_bigint_and_exponent();
                    *amount = amount.with_scale(scale + i64::from(extra));
                }
                r
            })
            .collect();
        prop_assert_eq!(run(&left, &right), run(&left, &rescaled));
    }

    #[test]
    fn shared_id_always_pairs(a in arb_record(), b in arb_record(), id in "[A-Z]{2}[0-9]{4}") {
        let mut a = a;
        let mut b = b;
        a.transaction_id = Some(id.clone());
        b.transaction_id = Some(id);
        let result = run(&[a], &[b]);
        prop_assert!(result.matched_count + result.unmatched_count == 1);
        prop_assert!(result.unmatched.iter().all(|u| u.reason != UnmatchedReason::MissingInOtherFile));
    }

    #[test]
    fn a_side_against_itself_fully_matches(side in arb_side()) {
        let result = run(&side, &side);
        prop_assert_eq!(result.matched_count, side.len());
        prop_assert!(result.is_reconciled());
    }

    #[test]
    fn normalization_is_idempotent_without_stripping(
        s in r"[a-zA-Z0-9 \t\n.,;:!?-]{0,30}",
        case in any::<bool>(),
        ws in any::<bool>(),
    ) {
        let opts = NormalizeOptions { normalize_case: case, collapse_whitespace: ws, strip_punctuation: false };
        let once = normalize_str(&s, &opts);
        prop_assert_eq!(normalize_str(&once, &opts), once);
    }

    #[test]
    fn normalization_is_idempotent_for_word_tokens(
        tokens in proptest::collection::vec(r"[A-Za-z0-9][A-Za-z0-9.,!]{0,7}", 0..6),
        sep in r"[ \t]{1,3}",
    ) {
        let all = NormalizeOptions { normalize_case: true, collapse_whitespace: true, strip_punctuation: true };
        let s = tokens.join(sep.as_str());
        let once = normalize_str(&s, &all);
        prop_assert_eq!(normalize_str(&once, &all), once);
    }
}
