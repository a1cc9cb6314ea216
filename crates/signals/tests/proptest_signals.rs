use common::{Signal, SymbolAggregate};
use proptest::prelude::*;
use signals::{SignalClassifier, SignalThresholds, SymbolInputs, SymbolMetrics};

fn symbol_inputs() -> impl Strategy<Value = (SymbolInputs, i64)> {
    (
        1i64..60,
        0.0f64..50_000_000.0,
        0.0f64..1.0,
        0.0f64..5_000_000.0,
        0.0f64..5_000_000.0,
        prop::option::of(-90.0f64..400.0),
    )
        .prop_flat_map(|(period, total, max_frac, v5, v30, pchg)| {
            (1i64..=period).prop_map(move |traded| {
                let input = SymbolInputs {
                    aggregate: SymbolAggregate {
                        symbol: "PROP".into(),
                        traded_days: traded,
                        total_value: total,
                        total_volume: 0,
                        avg_price: None,
                        max_day_value: total * max_frac,
                    },
                    avg_value_5d: v5,
                    avg_value_30d: v30,
                    price_change_pct: pchg,
                };
                (input, period)
            })
        })
}

proptest! {
    /// Ratios derived from a valid aggregate stay within [0, 1].
    #[test]
    fn consistency_and_pump_share_are_fractions((input, period) in symbol_inputs()) {
        let m = SymbolMetrics::derive(&input, period).unwrap();
        prop_assert!((0.0..=1.0).contains(&m.consistency));
        prop_assert!((0.0..=1.0).contains(&m.pump_share));
        prop_assert!(m.momentum_ratio.is_finite());
        prop_assert!(m.momentum_ratio >= 0.0);
    }

    /// Every emitted buy satisfies all buy criteria; every sell at least one.
    #[test]
    fn emitted_signals_satisfy_their_criteria((input, period) in symbol_inputs()) {
        let classifier = SignalClassifier::new(SignalThresholds::default());
        let m = SymbolMetrics::derive(&input, period).unwrap();
        let (buy, sell) = classifier.evaluate(&input, period);

        prop_assert_eq!(buy.is_some(), classifier.buy_checks(&m).all());
        prop_assert_eq!(sell.is_some(), classifier.sell_checks(&m).any());

        if let Some(Signal::Sell { reason, .. }) = &sell {
            prop_assert!(!reason.is_empty());
        }
        if let Some(buy) = &buy {
            prop_assert_eq!(buy.metrics().period_days, period);
            prop_assert_eq!(buy.metrics().traded_days, input.aggregate.traded_days);
        }
    }

    /// Buy list is ranked by momentum, sell list by pump share.
    #[test]
    fn lists_are_sorted(batch in prop::collection::vec(symbol_inputs(), 0..20)) {
        let classifier = SignalClassifier::default();
        // classify needs a shared period; use the largest so every input stays valid
        let period = batch.iter().map(|(_, p)| *p).max().unwrap_or(1);
        let inputs: Vec<SymbolInputs> = batch.into_iter().map(|(i, _)| i).collect();
        let book = classifier.classify(&inputs, period);

        for pair in book.buy.windows(2) {
            prop_assert!(pair[0].metrics().momentum_ratio >= pair[1].metrics().momentum_ratio);
        }
        for pair in book.sell.windows(2) {
            prop_assert!(pair[0].pump_share() >= pair[1].pump_share());
        }
    }
}
