use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use investment_tracker_core::errors::CoreError;
use investment_tracker_core::models::investment::Investment;
use investment_tracker_core::models::quote::Quote;
use investment_tracker_core::models::settings::Settings;
use investment_tracker_core::models::statistics::PortfolioStatistics;
use investment_tracker_core::models::sync::{
    PriceUpdate, PriceUpdateResult, SkipReason, SkippedInvestment,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn apple() -> Investment {
    Investment::new(
        Uuid::new_v4(),
        "Apple Inc. (AAPL)",
        "Stock",
        dec!(10),
        dec!(100),
        d(2023, 5, 2),
        "eur",
    )
    .unwrap()
}

// ═══════════════════════════════════════════════════════════════════
//  Investment
// ═══════════════════════════════════════════════════════════════════

mod investment {
    use super::*;

    #[test]
    fn new_is_active_and_unsynced() {
        let inv = apple();
        assert!(inv.is_active);
        assert!(inv.current_price.is_none());
        assert_eq!(inv.currency, "EUR");
        assert_eq!(inv.created_at, inv.updated_at);
    }

    #[test]
    fn rejects_non_positive_quantity() {
        let err = Investment::new(
            Uuid::new_v4(),
            "X",
            "Stock",
            Decimal::ZERO,
            dec!(1),
            d(2024, 1, 1),
            "EUR",
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::ValidationError(_)));
    }

    #[test]
    fn rejects_non_positive_purchase_price() {
        let err = Investment::new(
            Uuid::new_v4(),
            "X",
            "Stock",
            dec!(1),
            dec!(-5),
            d(2024, 1, 1),
            "EUR",
        )
        .unwrap_err();
        assert!(err.to_string().contains("Purchase price"));
    }

    #[test]
    fn value_falls_back_to_purchase_price() {
        let inv = apple();
        assert_eq!(inv.cost_basis(), dec!(1000));
        assert_eq!(inv.current_value(), dec!(1000));
        assert_eq!(inv.reference_price(), dec!(100));

        let synced = inv.with_current_price(dec!(125.5));
        assert_eq!(synced.current_value(), dec!(1255));
        assert_eq!(synced.reference_price(), dec!(125.5));
    }

    #[test]
    fn apply_price_touches_timestamp() {
        let mut inv = apple();
        let later = inv.updated_at + chrono::Duration::minutes(5);
        inv.apply_price(dec!(99), later);
        assert_eq!(inv.current_price, Some(dec!(99)));
        assert_eq!(inv.updated_at, later);
        assert!(inv.created_at < inv.updated_at);
    }

    #[test]
    fn deserializes_without_optional_fields() {
        let inv = apple();
        let mut json = serde_json::to_value(&inv).unwrap();
        let obj = json.as_object_mut().unwrap();
        obj.remove("current_price");
        obj.remove("broker");
        obj.remove("description");

        let back: Investment = serde_json::from_value(json).unwrap();
        assert_eq!(back.id, inv.id);
        assert!(back.current_price.is_none());
        assert!(back.broker.is_none());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Quote
// ═══════════════════════════════════════════════════════════════════

mod quote {
    use super::*;

    fn q(price: f64, prev: f64, state: Option<&str>) -> Quote {
        Quote {
            symbol: "AAPL".into(),
            current_price: price,
            previous_close: prev,
            currency: Some("USD".into()),
            market_state: state.map(str::to_string),
            long_name: Some("Apple Inc.".into()),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn change_and_percent() {
        let quote = q(110.0, 100.0, None);
        assert_eq!(quote.change(), 10.0);
        assert!((quote.change_percent() - 10.0).abs() < 1e-9);
    }

    #[test]
    fn percent_is_zero_without_previous_close() {
        assert_eq!(q(110.0, 0.0, None).change_percent(), 0.0);
    }

    #[test]
    fn only_regular_session_is_open() {
        assert!(q(1.0, 1.0, Some("REGULAR")).is_market_open());
        assert!(!q(1.0, 1.0, Some("PRE")).is_market_open());
        assert!(!q(1.0, 1.0, None).is_market_open());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  PriceUpdateResult
// ═══════════════════════════════════════════════════════════════════

mod price_update_result {
    use super::*;

    fn update() -> PriceUpdate {
        PriceUpdate {
            investment_id: Uuid::new_v4(),
            name: "Apple Inc. (AAPL)".into(),
            symbol: "AAPL".into(),
            old_price: dec!(100),
            new_price: dec!(110),
            change: dec!(10),
            change_percent: dec!(10),
        }
    }

    #[test]
    fn failed_is_empty() {
        let result = PriceUpdateResult::failed("No active investments found");
        assert!(!result.success);
        assert_eq!(result.updated_count, 0);
        assert!(result.updates.is_empty());
        assert_eq!(result.message, "No active investments found");
    }

    #[test]
    fn completed_counts_updates() {
        let result = PriceUpdateResult::completed(3, vec![update(), update()], Vec::new());
        assert!(result.success);
        assert_eq!(result.updated_count, 2);
        assert_eq!(result.message, "Updated 2 of 3 investments");
    }

    #[test]
    fn completed_without_updates_is_not_success() {
        let skipped = vec![SkippedInvestment {
            investment_id: Uuid::new_v4(),
            name: "Gold".into(),
            reason: SkipReason::NoQuote,
        }];
        let result = PriceUpdateResult::completed(1, Vec::new(), skipped);
        assert!(!result.success);
        assert_eq!(result.message, "No investment prices were updated (1 checked)");
        assert_eq!(result.skipped.len(), 1);
    }

    #[test]
    fn skip_reason_display() {
        assert_eq!(SkipReason::NoSymbol.to_string(), "No resolvable symbol");
        assert_eq!(SkipReason::NoQuote.to_string(), "No quote data");
        assert_eq!(SkipReason::PersistenceFailed.to_string(), "Failed to save price");
    }

    #[test]
    fn skipped_defaults_when_absent() {
        let json = r#"{"success":true,"updated_count":0,"message":"m","updates":[]}"#;
        let result: PriceUpdateResult = serde_json::from_str(json).unwrap();
        assert!(result.skipped.is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  PortfolioStatistics
// ═══════════════════════════════════════════════════════════════════

mod statistics {
    use super::*;

    #[test]
    fn empty_is_default() {
        assert_eq!(PortfolioStatistics::empty(), PortfolioStatistics::default());
        assert_eq!(PortfolioStatistics::from_investments(&[]).investment_count, 0);
    }

    #[test]
    fn never_synced_portfolio_is_a_full_loss() {
        let stats = PortfolioStatistics::from_investments(&[apple()]);
        assert_eq!(stats.total_cost, dec!(1000));
        assert_eq!(stats.total_value, Decimal::ZERO);
        assert_eq!(stats.profit_loss_percent, dec!(-100));
        assert!(stats.best_performer.is_none());
        // No value means no share to distribute
        assert_eq!(stats.diversification["Stock"], Decimal::ZERO);
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Settings
// ═══════════════════════════════════════════════════════════════════

mod settings {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.base_currency, "EUR");
        assert_eq!(s.fx_fallback_rate, dec!(0.92));
        assert_eq!(s.fx_symbol, "EURUSD=X");
        assert_eq!(s.request_delay_ms, 500);
        assert_eq!(s.request_timeout_secs, 30);
        assert_eq!(s.max_search_results, 20);
        assert!(s.primary_quote_url.starts_with("https://query1."));
        assert!(s.secondary_quote_url.starts_with("https://query2."));
        assert!(s.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let s = Settings::from_json(r#"{"request_delay_ms": 1000}"#).unwrap();
        assert_eq!(s.request_delay_ms, 1000);
        assert_eq!(s.base_currency, "EUR");
        assert_eq!(s.fx_fallback_rate, dec!(0.92));
    }

    #[test]
    fn fallback_rate_from_json_number() {
        let s = Settings::from_json(r#"{"fx_fallback_rate": 0.9}"#).unwrap();
        assert_eq!(s.fx_fallback_rate, dec!(0.9));
    }

    #[test]
    fn malformed_json_is_deserialization_error() {
        let err = Settings::from_json("{not json").unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        for json in [
            r#"{"base_currency": "  "}"#,
            r#"{"fx_fallback_rate": 0}"#,
            r#"{"request_timeout_secs": 0}"#,
        ] {
            let err = Settings::from_json(json).unwrap_err();
            assert!(matches!(err, CoreError::ValidationError(_)), "{json}");
        }
    }
}
