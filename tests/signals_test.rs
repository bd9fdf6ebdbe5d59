/**
 * Signal Engine Tests
 *
 * End-to-end behavior of the analysis entry points:
 * - Tabular scoring on synthetic trends
 * - Error signals for malformed or short input
 * - Vote counting and price-target ordering properties
 * - Chart-image path with a fixed price source
 */

use proptest::prelude::*;
use scalper::services::preprocess::RawTable;
use scalper::services::signals::scoring::{cast_votes, score_indicators, PriceTargets, Tally};
use scalper::{
    analyze_csv, analyze_image, analyze_tabular, Action, AnalysisType, FixedPriceSource,
    IndicatorSet, Vote,
};

mod common {
    use scalper::services::preprocess::RawTable;

    /// Candles as (open, high, low, close).
    pub fn table(candles: &[(f64, f64, f64, f64)]) -> RawTable {
        RawTable::new(
            ["Date", "Open", "High", "Low", "Close", "Volume"]
                .iter()
                .map(|h| h.to_string())
                .collect(),
            candles
                .iter()
                .enumerate()
                .map(|(i, (o, h, l, c))| {
                    vec![
                        format!("2024-01-01T{:02}:00:00", i % 24),
                        o.to_string(),
                        h.to_string(),
                        l.to_string(),
                        c.to_string(),
                        "1000".to_string(),
                    ]
                })
                .collect(),
        )
    }

    /// Linear trend from `start` moving `step` per candle, wicks of 0.5.
    pub fn trend(count: usize, start: f64, step: f64) -> RawTable {
        let candles: Vec<_> = (0..count)
            .map(|i| {
                let close = start + step * i as f64;
                (close, close + 0.5, close - 0.5, close)
            })
            .collect();
        table(&candles)
    }

    pub fn to_csv(table: &RawTable) -> String {
        let mut out = table.headers.join(",");
        out.push('\n');
        for row in &table.rows {
            out.push_str(&row.join(","));
            out.push('\n');
        }
        out
    }
}

#[test]
fn test_uptrend_scores_exhaustion() {
    let signal = analyze_tabular(&common::trend(60, 100.0, 1.0), "1h");

    assert_eq!(signal.analysis_type, AnalysisType::TechnicalIndicators);
    // Trend and MACD buy; RSI, stochastic and resistance proximity sell
    assert_eq!(signal.action, Action::Sell);
    assert_eq!(signal.confidence.value(), 84);
    assert_eq!(signal.entry, 159.0);
    assert_eq!(signal.take_profit, 155.82);
    assert_eq!(signal.stop_loss, 159.5);
    assert_eq!(signal.timeframe, "1h");

    let report = signal.indicators().expect("indicator report");
    assert_eq!(report.values.rsi_14, 100.0);
    assert_eq!(report.values.support, 139.5);
    assert_eq!(report.values.resistance, 159.5);
    assert_eq!(report.votes.len(), 6);
}

#[test]
fn test_downtrend_scores_oversold() {
    let signal = analyze_tabular(&common::trend(60, 200.0, -1.0), "4h");

    assert_eq!(signal.action, Action::Buy);
    assert_eq!(signal.confidence.value(), 84);
    assert_eq!(signal.entry, 141.0);
    assert_eq!(signal.take_profit, 143.82);
    assert_eq!(signal.stop_loss, 140.5);
}

#[test]
fn test_short_history_abstains_on_long_windows() {
    let signal = analyze_tabular(&common::trend(30, 100.0, 1.0), "15m");

    assert_eq!(signal.analysis_type, AnalysisType::TechnicalIndicators);
    let report = signal.indicators().expect("indicator report");
    assert!(report.values.sma_50.is_nan());
    assert!(report.values.macd_signal.is_nan());

    let abstained: Vec<_> = report
        .votes
        .iter()
        .filter(|v| v.vote == Vote::Abstain)
        .map(|v| v.rule)
        .collect();
    assert!(abstained.contains(&scalper::Rule::Trend));
    assert!(abstained.contains(&scalper::Rule::Macd));
    assert_eq!(signal.action, Action::Sell);
    assert_eq!(signal.confidence.value(), 84);
}

#[test]
fn test_flat_series_holds() {
    let candles = vec![(100.0, 100.0, 100.0, 100.0); 40];
    let signal = analyze_tabular(&common::table(&candles), "1d");

    assert_eq!(signal.action, Action::Hold);
    assert_eq!(signal.confidence.value(), 50);
    assert_eq!(signal.entry, 100.0);
    assert_eq!(signal.take_profit, 100.0);
    assert_eq!(signal.stop_loss, 100.0);
}

#[test]
fn test_twenty_rows_is_enough() {
    let signal = analyze_tabular(&common::trend(20, 50.0, 0.25), "5m");
    assert_ne!(signal.analysis_type, AnalysisType::Error);
}

#[test]
fn test_nineteen_rows_is_insufficient() {
    let signal = analyze_tabular(&common::trend(19, 50.0, 0.25), "5m");

    assert!(signal.is_error());
    assert_eq!(signal.action, Action::Hold);
    assert_eq!(signal.entry, 0.0);
    assert_eq!(signal.confidence.to_string(), "0%");
    let message = signal.message.unwrap_or_default().to_lowercase();
    assert!(message.contains("insufficient data"));
}

#[test]
fn test_missing_low_column_is_invalid_format() {
    let mut table = common::trend(30, 100.0, 1.0);
    table.headers[3] = "Bottom".to_string();

    let signal = analyze_tabular(&table, "1h");
    assert!(signal.is_error());
    let message = signal.message.unwrap_or_default().to_lowercase();
    assert!(message.contains("invalid format"));
    assert!(message.contains("low"));
}

#[test]
fn test_tabular_analysis_is_idempotent() {
    let table = common::trend(45, 80.0, 0.7);
    let first = serde_json::to_string(&analyze_tabular(&table, "30m")).unwrap();
    let second = serde_json::to_string(&analyze_tabular(&table, "30m")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_csv_matches_table() {
    let table = common::trend(60, 100.0, 1.0);
    let csv = common::to_csv(&table);

    let from_csv = analyze_csv(csv.as_bytes(), "1h");
    let from_table = analyze_tabular(&table, "1h");
    assert_eq!(from_csv, from_table);
}

#[test]
fn test_csv_with_bad_cells_drops_rows() {
    let table = common::trend(22, 100.0, 1.0);
    let mut csv = common::to_csv(&table);
    csv.push_str("2024-01-02T00:00:00,oops,1,1,1,1\n");
    csv.push_str("2024-01-02T01:00:00,1,1,1,\n");

    let signal = analyze_csv(csv.as_bytes(), "1h");
    assert_eq!(signal.analysis_type, AnalysisType::TechnicalIndicators);
    assert_eq!(signal.entry, 121.0);
}

#[test]
fn test_two_buy_votes_confidence() {
    // Trend and RSI buy, MACD positive but under its signal
    let set = IndicatorSet {
        sma_20: 105.0,
        sma_50: 100.0,
        ema_12: 104.0,
        ema_26: 101.0,
        rsi_14: 25.0,
        macd_line: 0.5,
        macd_signal: 0.8,
        macd_histogram: -0.3,
        bollinger_upper: 110.0,
        bollinger_middle: 102.0,
        bollinger_lower: 95.0,
        stochastic_k: 50.0,
        stochastic_d: 50.0,
        support: 90.0,
        resistance: 115.0,
    };
    let signal = score_indicators(&set, 100.0, "1h");

    assert_eq!(signal.action, Action::Buy);
    assert_eq!(signal.confidence.value(), 76);
    assert_eq!(signal.take_profit, 102.0);
    assert_eq!(signal.stop_loss, 98.5);
}

#[test]
fn test_blank_image_holds() {
    let image = image::GrayImage::from_pixel(120, 80, image::Luma([255u8]));
    let mut png = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    let signal = analyze_image(&png, "1h", &FixedPriceSource(2000.0));

    assert_eq!(signal.analysis_type, AnalysisType::ChartPattern);
    assert_eq!(signal.action, Action::Hold);
    assert_eq!(signal.confidence.value(), 60);
    assert_eq!(signal.entry, 2000.0);
    assert_eq!(signal.patterns().map(|p| p.line_count), Some(0));
}

#[test]
fn test_undecodable_image_is_error() {
    let signal = analyze_image(b"\x89PNG but not really", "1h", &FixedPriceSource(2000.0));
    assert!(signal.is_error());
    assert!(signal
        .message
        .unwrap_or_default()
        .contains("Could not load image"));
}

/// White 600x400 chart with a 3px dark line of the given slope (image coordinates).
fn line_chart_png(slope: f64) -> Vec<u8> {
    let mut image = image::GrayImage::from_pixel(600, 400, image::Luma([255u8]));
    for x in 50..550u32 {
        let center = 200.0 + slope * (f64::from(x) - 300.0);
        let y = center.round() as u32;
        for dy in y - 1..=y + 1 {
            image.put_pixel(x, dy, image::Luma([0u8]));
        }
    }
    let mut png = Vec::new();
    image
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    png
}

#[test]
fn test_descending_line_image_buys() {
    // y grows downward, so a positive slope averages about +15 degrees
    let signal = analyze_image(&line_chart_png(0.27), "1h", &FixedPriceSource(2000.0));

    assert_eq!(signal.analysis_type, AnalysisType::ChartPattern);
    assert_eq!(signal.action, Action::Buy);
    assert_eq!(signal.confidence.value(), 75);
    assert_eq!(signal.take_profit, 2050.0);
    assert_eq!(signal.stop_loss, 1970.0);

    let flags = signal.patterns().copied().expect("pattern flags");
    assert!(flags.bullish && !flags.bearish);
    assert!(flags.line_count >= 1);
}

#[test]
fn test_ascending_line_image_sells() {
    let signal = analyze_image(&line_chart_png(-0.27), "1h", &FixedPriceSource(2000.0));

    assert_eq!(signal.action, Action::Sell);
    assert_eq!(signal.confidence.value(), 75);
    assert_eq!(signal.take_profit, 1950.0);
    assert_eq!(signal.stop_loss, 2030.0);

    let flags = signal.patterns().copied().expect("pattern flags");
    assert!(flags.bearish && !flags.bullish);
    assert!(flags.line_count >= 1);
}

/// Indicator values that make each rule vote as requested at price 100.
fn set_with_votes(votes: &[Vote; 6]) -> IndicatorSet {
    let mut set = IndicatorSet {
        sma_20: 100.0,
        sma_50: 100.0,
        ema_12: 100.0,
        ema_26: 100.0,
        rsi_14: 50.0,
        macd_line: 0.0,
        macd_signal: 0.0,
        macd_histogram: 0.0,
        bollinger_upper: 110.0,
        bollinger_middle: 100.0,
        bollinger_lower: 90.0,
        stochastic_k: 50.0,
        stochastic_d: 50.0,
        support: 50.0,
        resistance: 150.0,
    };

    match votes[0] {
        Vote::Buy => (set.sma_20, set.ema_12) = (101.0, 101.0),
        Vote::Sell => (set.sma_20, set.ema_12) = (99.0, 99.0),
        Vote::Abstain => {}
    }
    match votes[1] {
        Vote::Buy => set.rsi_14 = 25.0,
        Vote::Sell => set.rsi_14 = 75.0,
        Vote::Abstain => {}
    }
    match votes[2] {
        Vote::Buy => (set.macd_line, set.macd_signal) = (1.0, 0.5),
        Vote::Sell => (set.macd_line, set.macd_signal) = (-1.0, -0.5),
        Vote::Abstain => {}
    }
    match votes[3] {
        Vote::Buy => (set.bollinger_lower, set.bollinger_upper) = (101.0, 120.0),
        Vote::Sell => (set.bollinger_lower, set.bollinger_upper) = (80.0, 99.0),
        Vote::Abstain => {}
    }
    match votes[4] {
        Vote::Buy => (set.stochastic_k, set.stochastic_d) = (10.0, 10.0),
        Vote::Sell => (set.stochastic_k, set.stochastic_d) = (90.0, 90.0),
        Vote::Abstain => {}
    }
    match votes[5] {
        Vote::Buy => set.support = 99.5,
        Vote::Sell => set.resistance = 100.5,
        Vote::Abstain => {}
    }
    set
}

fn vote_strategy() -> impl Strategy<Value = Vote> {
    prop_oneof![Just(Vote::Buy), Just(Vote::Sell), Just(Vote::Abstain)]
}

fn candle_strategy() -> impl Strategy<Value = (f64, f64, f64, f64)> {
    (
        -1000.0f64..1000.0,
        -1000.0f64..1000.0,
        -1000.0f64..1000.0,
        -1000.0f64..1000.0,
    )
}

proptest! {
    #[test]
    fn prop_numeric_tables_never_error(
        candles in prop::collection::vec(candle_strategy(), 20..80),
    ) {
        let signal = analyze_tabular(&common::table(&candles), "1h");
        prop_assert_eq!(signal.analysis_type, AnalysisType::TechnicalIndicators);
        prop_assert!(signal.message.is_none());
    }

    #[test]
    fn prop_votes_follow_indicator_values(votes in prop::array::uniform6(vote_strategy())) {
        let cast: Vec<Vote> = cast_votes(&set_with_votes(&votes), 100.0)
            .into_iter()
            .map(|v| v.vote)
            .collect();
        prop_assert_eq!(cast, votes.to_vec());
    }

    #[test]
    fn prop_more_buy_votes_never_lower_confidence(
        votes in prop::array::uniform6(vote_strategy()),
        flip in 0usize..6,
    ) {
        prop_assume!(votes[flip] == Vote::Abstain);
        let mut more = votes;
        more[flip] = Vote::Buy;

        let before = score_indicators(&set_with_votes(&votes), 100.0, "1h");
        let after = score_indicators(&set_with_votes(&more), 100.0, "1h");

        if before.action == Action::Buy {
            prop_assert_eq!(after.action, Action::Buy);
            prop_assert!(after.confidence >= before.confidence);
        }
    }

    #[test]
    fn prop_confidence_depends_only_on_counts(buy in 0usize..7, sell in 0usize..7) {
        let (action, confidence) = Tally { buy, sell }.decide();
        let expected = match action {
            Action::Buy => (60 + 8 * buy).min(95),
            Action::Sell => (60 + 8 * sell).min(95),
            Action::Hold => 50,
        };
        prop_assert_eq!(usize::from(confidence.value()), expected);
    }

    #[test]
    fn prop_buy_targets_bracket_entry(
        entry in 100.0f64..10_000.0,
        below in 0.005f64..0.5,
        above in 0.005f64..0.5,
    ) {
        let targets = PriceTargets::from_levels(
            Action::Buy,
            entry,
            entry * (1.0 - below),
            entry * (1.0 + above),
        )
        .rounded();
        prop_assert!(targets.stop_loss < targets.entry);
        prop_assert!(targets.entry < targets.take_profit);
    }

    #[test]
    fn prop_sell_targets_bracket_entry(
        entry in 100.0f64..10_000.0,
        below in 0.005f64..0.5,
        above in 0.005f64..0.5,
    ) {
        let targets = PriceTargets::from_levels(
            Action::Sell,
            entry,
            entry * (1.0 - below),
            entry * (1.0 + above),
        )
        .rounded();
        prop_assert!(targets.take_profit < targets.entry);
        prop_assert!(targets.entry < targets.stop_loss);
    }
}

#[test]
fn test_raw_table_from_csv_round_trip() {
    let table = common::trend(3, 10.0, 1.0);
    let parsed = RawTable::from_csv(common::to_csv(&table).as_bytes()).unwrap();
    assert_eq!(parsed, table);
}
