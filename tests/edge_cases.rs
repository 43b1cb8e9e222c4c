//! Edge-case tests: adversarial inputs to every public entry point.

use weightbook::{
    BreakdownBy, BucketMode, Constraints, Error, Omission, RawTarget, RebalanceRequest,
    RequestDefaults, SeedSource, Snapshot, Ticker, breakdown, rebalance, value_holdings,
};

fn base() -> Snapshot {
    Snapshot::new("USD")
        .with_holding("AAPL", 10.0, 100.0)
        .with_quote("AAPL", 150.0, "USD")
}

fn targets(pairs: &[(&str, f64)]) -> Vec<RawTarget> {
    pairs.iter().map(|(k, w)| RawTarget::new(k, *w)).collect()
}

// ============================================================================
// Empty inputs
// ============================================================================

#[test]
fn empty_portfolio_no_cash() {
    let req = RebalanceRequest::ticker(targets(&[("AAPL", 1.0)]), Constraints::default());
    let snap = Snapshot::new("USD")
        .with_quote("AAPL", 150.0, "USD")
        .with_watchlist(&["AAPL"]);
    let result = rebalance(&req, &snap).unwrap();
    assert_eq!(result.nav_with_cash, 0.0);
    assert!(result.suggestions.is_empty());
}

#[test]
fn empty_targets_move_everything_to_cash() {
    let req = RebalanceRequest::ticker(Vec::new(), Constraints::default());
    let result = rebalance(&req, &base()).unwrap();
    assert_eq!(result.suggestions.len(), 1);
    assert_eq!(result.suggestions[0].qty_delta, -10);
}

#[test]
fn zero_weight_target_liquidates() {
    let req = RebalanceRequest::ticker(targets(&[("AAPL", 0.0)]), Constraints::default());
    let result = rebalance(&req, &base()).unwrap();
    assert_eq!(result.suggestions[0].qty_delta, -10);
}

#[test]
fn empty_seed_source_is_an_omission() {
    let req = RebalanceRequest::ticker(targets(&[("AAPL", 1.0)]), Constraints::default());
    let result = rebalance(&req, &base()).unwrap();
    assert_eq!(
        result.omissions,
        vec![Omission::EmptySeedSource {
            seed_source: SeedSource::Watchlist
        }]
    );
}

// ============================================================================
// Invalid constraints
// ============================================================================

#[test]
fn zero_lot_size_rejected() {
    let c = Constraints {
        lot_size: 0,
        ..Default::default()
    };
    let err = rebalance(&RebalanceRequest::ticker(Vec::new(), c), &base()).unwrap_err();
    assert!(matches!(err, Error::InvalidLotSize(n) if n == 0.0));
    assert_eq!(err.field(), "lot_size");
}

#[test]
fn negative_lot_size_rejected_at_parse() {
    let err = RebalanceRequest::from_json(r#"{"targets": [], "lot_size": -5}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidLotSize(n) if n == -5.0));
}

#[test]
fn fractional_lot_size_rejected_as_lot_size() {
    let err = RebalanceRequest::from_json(r#"{"targets": [], "lot_size": 2.5}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidLotSize(n) if n == 2.5));
    assert_eq!(err.field(), "lot_size");
}

#[test]
fn negative_min_order_rejected() {
    let c = Constraints {
        min_order_value: -1.0,
        ..Default::default()
    };
    let err = rebalance(&RebalanceRequest::ticker(Vec::new(), c), &base()).unwrap_err();
    assert!(matches!(err, Error::InvalidMinOrder(_)));
}

#[test]
fn negative_cash_rejected() {
    let c = Constraints {
        extra_cash: -100.0,
        ..Default::default()
    };
    let err = rebalance(&RebalanceRequest::ticker(Vec::new(), c), &base()).unwrap_err();
    assert!(matches!(err, Error::InvalidCash(_)));
}

#[test]
fn unknown_seed_source_rejected() {
    let err = RebalanceRequest::from_json(r#"{"targets": [], "seed_source": "rumours"}"#)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidSeedSource(_)));
}

#[test]
fn unknown_bucket_mode_rejected() {
    let err = RebalanceRequest::from_json(r#"{"mode": "industry", "targets": []}"#).unwrap_err();
    assert!(matches!(err, Error::InvalidMode(_)));
}

#[test]
fn malformed_payload_is_a_parse_error() {
    let err = RebalanceRequest::from_json(r#"{"targets": 3}"#).unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
}

// ============================================================================
// Invalid targets
// ============================================================================

#[test]
fn non_numeric_weight_names_the_key() {
    let req = RebalanceRequest::from_json(
        r#"{"targets": [{"ticker": "AAPL", "target_weight": "lots"}]}"#,
    )
    .unwrap();
    let err = rebalance(&req, &base()).unwrap_err();
    match err {
        Error::InvalidTarget { key, .. } => assert_eq!(key, "AAPL"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn negative_weight_rejected() {
    let req = RebalanceRequest::ticker(targets(&[("AAPL", -0.1)]), Constraints::default());
    assert!(matches!(
        rebalance(&req, &base()).unwrap_err(),
        Error::InvalidTarget { .. }
    ));
}

#[test]
fn blank_key_rejected() {
    let req = RebalanceRequest::ticker(targets(&[("  ", 0.5)]), Constraints::default());
    assert!(matches!(
        rebalance(&req, &base()).unwrap_err(),
        Error::InvalidTarget { .. }
    ));
}

#[test]
fn duplicate_target_last_write_wins() {
    let req = RebalanceRequest::ticker(
        targets(&[("AAPL", 0.2), ("aapl", 1.0)]),
        Constraints::default(),
    );
    let result = rebalance(&req, &base()).unwrap();
    assert!(result.suggestions.is_empty());
}

// ============================================================================
// Missing market data
// ============================================================================

#[test]
fn missing_price_for_holding_fails_fast() {
    let snap = base().with_holding("MSFT", 1.0, 300.0);
    let req = RebalanceRequest::ticker(Vec::new(), Constraints::default());
    match rebalance(&req, &snap).unwrap_err() {
        Error::MissingPrice { ticker } => assert_eq!(ticker, Ticker::new("MSFT")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_price_for_seeded_candidate_fails_fast() {
    let snap = base().with_watchlist(&["MSFT"]);
    let req = RebalanceRequest::ticker(
        targets(&[("AAPL", 0.5), ("MSFT", 0.5)]),
        Constraints::default(),
    );
    assert!(matches!(
        rebalance(&req, &snap).unwrap_err(),
        Error::MissingPrice { .. }
    ));
}

#[test]
fn zero_price_is_invalid_quote() {
    let snap = Snapshot::new("USD")
        .with_holding("AAPL", 10.0, 100.0)
        .with_quote("AAPL", 0.0, "USD");
    let req = RebalanceRequest::ticker(Vec::new(), Constraints::default());
    assert!(matches!(
        rebalance(&req, &snap).unwrap_err(),
        Error::InvalidQuote { .. }
    ));
}

#[test]
fn missing_fx_rate_fails_fast() {
    let snap = base()
        .with_holding("SAP", 1.0, 100.0)
        .with_quote("SAP", 100.0, "EUR");
    let req = RebalanceRequest::ticker(Vec::new(), Constraints::default());
    match rebalance(&req, &snap).unwrap_err() {
        Error::MissingFxRate { currency, base } => {
            assert_eq!(currency, "EUR");
            assert_eq!(base, "USD");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unused_watchlist_ticker_without_price_is_ignored() {
    // MSFT is offered but nobody targets it
    let snap = base().with_watchlist(&["MSFT"]);
    let req = RebalanceRequest::ticker(targets(&[("AAPL", 1.0)]), Constraints::default());
    assert!(rebalance(&req, &snap).unwrap().suggestions.is_empty());
}

#[test]
fn sub_penny_quote_saturates_instead_of_overflowing() {
    let snap = Snapshot::new("USD")
        .with_quote("PENNY", 1e-15, "USD")
        .with_watchlist(&["PENNY"]);
    let c = Constraints {
        extra_cash: 100_000.0,
        lot_size: 10,
        ..Default::default()
    };
    let req = RebalanceRequest::ticker(targets(&[("PENNY", 1.0)]), c);
    let result = rebalance(&req, &snap).unwrap();
    assert_eq!(result.suggestions.len(), 1);
    let s = &result.suggestions[0];
    assert!(s.qty_delta > 0);
    assert_eq!(s.qty_delta % 10, 0);
    assert!(s.notional_delta <= 100_000.0);
}

// ============================================================================
// Bucket mode
// ============================================================================

#[test]
fn unpriced_candidate_of_a_held_bucket_is_ignored() {
    // NVDA joins Technology but gets no allocation while AAPL holds value
    let snap = base()
        .with_classification("AAPL", "Technology", "United States")
        .with_classification("NVDA", "Technology", "United States")
        .with_watchlist(&["NVDA"]);
    let req = RebalanceRequest::bucket(
        BucketMode::Sector,
        targets(&[("Technology", 1.0)]),
        Constraints::default(),
    );
    let result = rebalance(&req, &snap).unwrap();
    assert!(result.suggestions.is_empty());
}

#[test]
fn unpriced_candidate_of_an_empty_bucket_fails_fast() {
    let snap = base()
        .with_classification("AAPL", "Technology", "United States")
        .with_classification("NEE", "Utilities", "United States")
        .with_watchlist(&["NEE"]);
    let req = RebalanceRequest::bucket(
        BucketMode::Sector,
        targets(&[("Technology", 0.5), ("Utilities", 0.5)]),
        Constraints::default(),
    );
    assert!(matches!(
        rebalance(&req, &snap).unwrap_err(),
        Error::MissingPrice { .. }
    ));
}

#[test]
fn unclassified_holding_left_untouched_in_bucket_mode() {
    let snap = base()
        .with_holding("GLD", 10.0, 150.0)
        .with_quote("GLD", 180.0, "USD")
        .with_classification("AAPL", "Technology", "United States");
    let c = Constraints {
        seed_source: SeedSource::None,
        ..Default::default()
    };
    let req = RebalanceRequest::bucket(BucketMode::Sector, targets(&[("Technology", 0.5)]), c);
    let result = rebalance(&req, &snap).unwrap();
    assert!(result.suggestions.iter().all(|s| s.ticker.as_str() != "GLD"));
    assert!(result.omissions.contains(&Omission::Unclassified {
        ticker: Ticker::new("GLD")
    }));
}

#[test]
fn bucket_labels_are_case_sensitive() {
    let snap = base().with_classification("AAPL", "Technology", "United States");
    let c = Constraints {
        seed_source: SeedSource::None,
        ..Default::default()
    };
    let req = RebalanceRequest::bucket(BucketMode::Sector, targets(&[("technology", 1.0)]), c);
    let result = rebalance(&req, &snap).unwrap();
    // the "Technology" holding is untargeted and sold; "technology" is unresolved
    assert_eq!(result.suggestions[0].qty_delta, -10);
    assert!(result.omissions.contains(&Omission::UnresolvedBucket {
        bucket: "technology".into()
    }));
}

// ============================================================================
// Defaults and breakdown
// ============================================================================

#[test]
fn configured_defaults_fill_missing_fields() {
    let defaults = RequestDefaults {
        min_order_value: 250.0,
        lot_size: 10,
        seed_source: SeedSource::Signals,
    };
    let req = RebalanceRequest::from_json_with_defaults(r#"{"targets": []}"#, &defaults).unwrap();
    let c = req.constraints();
    assert_eq!(c.min_order_value, 250.0);
    assert_eq!(c.lot_size, 10);
    assert_eq!(c.seed_source, SeedSource::Signals);
    assert_eq!(c.extra_cash, 0.0);
}

#[test]
fn breakdown_of_unclassified_portfolio_is_unknown() {
    let snap = base();
    let valuation = value_holdings(&snap, 0.0).unwrap();
    let b = breakdown(&valuation, &snap, BreakdownBy::Region);
    assert_eq!(b.items.len(), 1);
    assert_eq!(b.items[0].label, "Unknown");
    assert_eq!(b.items[0].weight, 1.0);
}
