use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use reform_readiness::readiness::{
    extract_features, score, Channel, Event, ReadinessClass, ScoringConfig,
};

const NAMES: [&str; 8] = [
    "page_view",
    "product_view",
    "add_to_cart",
    "begin_checkout",
    "submit_quote",
    "talk_to_consultant",
    "search",
    "scan_qr_service",
];

const CATEGORIES: [&str; 7] = ["floor", "baseboard", "paint", "filler", "tile", "grout", "door"];

fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
        .single()
        .expect("valid reference time")
}

prop_compose! {
    fn arb_event()(
        identity in 0usize..5,
        minutes_back in -2_880i64..64_800,
        name in 0usize..NAMES.len(),
        category in proptest::option::of(0usize..CATEGORIES.len()),
    ) -> Event {
        let event = Event::new(
            reference_time() - Duration::minutes(minutes_back),
            Channel::Web,
            format!("anon-{identity}"),
            NAMES[name],
        );
        match category {
            Some(index) => event.with_category(CATEGORIES[index]),
            None => event,
        }
    }
}

proptest! {
    #[test]
    fn window_counts_are_nested_and_bounded(events in proptest::collection::vec(arb_event(), 0..60)) {
        let records = extract_features(&events, reference_time());

        for record in &records {
            prop_assert!(record.freq_7d <= record.freq_14d);
            prop_assert!(record.freq_14d <= record.freq_30d);
            prop_assert!(record.high_intent_7d <= record.freq_7d);
            prop_assert!(record.category_diversity_14d <= record.freq_14d);
            if let Some(days) = record.recency_days {
                prop_assert!(days >= 0.0);
                prop_assert!(days < 30.0);
            }
        }
    }

    #[test]
    fn extraction_and_scoring_ignore_input_order(
        (events, shuffled) in proptest::collection::vec(arb_event(), 0..60)
            .prop_flat_map(|events| (Just(events.clone()), Just(events).prop_shuffle()))
    ) {
        let config = ScoringConfig::default();
        let original = extract_features(&events, reference_time());
        let permuted = extract_features(&shuffled, reference_time());

        prop_assert_eq!(
            score(&original, &config).expect("valid config"),
            score(&permuted, &config).expect("valid config")
        );
        prop_assert_eq!(original, permuted);
    }

    #[test]
    fn scores_are_bounded_and_consistent(events in proptest::collection::vec(arb_event(), 1..60)) {
        let config = ScoringConfig::default();
        let records = extract_features(&events, reference_time());
        let scores = score(&records, &config).expect("default config is valid");

        prop_assert_eq!(scores.len(), records.len());
        for (record, scored) in records.iter().zip(&scores) {
            prop_assert_eq!(&record.identity, &scored.identity);
            prop_assert!((0.0..=100.0).contains(&scored.score));
            prop_assert_eq!((scored.score * 100.0).round() / 100.0, scored.score);
            prop_assert!(scored.top_drivers.len() <= 3);
            prop_assert!(scored
                .top_drivers
                .windows(2)
                .all(|pair| pair[0].contribution >= pair[1].contribution));

            let expected = if scored.score >= config.thresholds.ready_floor {
                ReadinessClass::Ready
            } else if scored.score >= config.thresholds.nurture_floor {
                ReadinessClass::Nurture
            } else {
                ReadinessClass::DoNotApproach
            };
            prop_assert_eq!(scored.class_label, expected);
        }
    }

    #[test]
    fn fresher_activity_never_lowers_recency_score(
        earlier in 0i64..40,
        gap in 0i64..10,
    ) {
        let config = ScoringConfig::default();
        let at = |days: i64| {
            vec![Event::new(
                reference_time() - Duration::days(days),
                Channel::App,
                "anon-recency",
                "page_view",
            )]
        };

        let stale = extract_features(&at(earlier + gap), reference_time());
        let fresh = extract_features(&at(earlier), reference_time());
        let stale_score = score(&stale, &config).expect("valid config")[0].score;
        let fresh_score = score(&fresh, &config).expect("valid config")[0].score;

        prop_assert!(fresh_score >= stale_score);
    }
}
