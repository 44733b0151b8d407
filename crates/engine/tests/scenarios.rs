use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use trade_analytics_engine::{
    analyze, analyze_trades, compute_metrics, estimate_from_metrics, project, resample,
    BootstrapConfig, EquityPoint, MonteCarloConfig, Ratio, TradeOutcome,
};

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 8, 9, 0, 0).unwrap()
}

fn alternating_history(n: usize) -> Vec<TradeOutcome> {
    (0..n)
        .map(|i| {
            let pnl = if i % 2 == 0 { dec!(100) } else { dec!(-50) };
            let entry = start() + Duration::hours(i as i64 * 2);
            TradeOutcome::new(pnl, entry, entry + Duration::hours(1))
                .with_risk_percentage(dec!(1))
                .with_r_multiple(if i % 2 == 0 { dec!(2) } else { dec!(-1) })
        })
        .collect()
}

#[test]
fn alternating_history_end_to_end() {
    let history = alternating_history(20);

    let metrics = compute_metrics(&history);
    assert!((metrics.win_rate - 50.0).abs() < 1e-9);
    assert!((metrics.avg_win - 100.0).abs() < 1e-9);
    assert!((metrics.avg_loss - 50.0).abs() < 1e-9);
    assert_eq!(metrics.profit_factor, Ratio::Finite(2.0));
    assert_eq!(metrics.avg_rr, Ratio::Finite(2.0));
    assert!((metrics.avg_r_multiple.unwrap() - 0.5).abs() < 1e-9);

    let bootstrap = resample(
        &history,
        &BootstrapConfig::new(1_000).with_sample_size(20).with_seed(2024),
    )
    .unwrap();
    assert!((bootstrap.win_rate_ci.midpoint() - 50.0).abs() < 5.0);
    assert!((bootstrap.net_pnl_ci.midpoint() - 500.0).abs() < 100.0);

    let short_horizon = resample(
        &history,
        &BootstrapConfig::new(1_000).with_sample_size(5).with_seed(2024),
    )
    .unwrap();
    assert!(short_horizon.win_rate_ci.width() > bootstrap.win_rate_ci.width());

    let projection = project(
        &history,
        &MonteCarloConfig::new(1_000, 50, 10_000.0).with_seed(2024),
    )
    .unwrap();
    assert_eq!(projection.bands.len(), 50);
    assert!(projection.median_final_equity > 10_000.0);

    let ruin = estimate_from_metrics(&metrics, 1.0, 10.0).unwrap();
    assert!((ruin.edge - 0.5).abs() < 1e-9);
    assert!(ruin.ruin_probability_percent > 0.0 && ruin.ruin_probability_percent < 1.0);
}

#[test]
fn single_drawdown_scenario_on_explicit_curve() {
    let values = [
        dec!(1000),
        dec!(1100),
        dec!(900),
        dec!(950),
        dec!(1100),
        dec!(1200),
    ];
    let curve: Vec<EquityPoint> = values
        .iter()
        .enumerate()
        .map(|(i, &v)| EquityPoint::new(i, start() + Duration::hours(i as i64), v))
        .collect();

    let analysis = analyze(&curve).unwrap();

    assert_eq!(analysis.episodes.len(), 1);
    let episode = &analysis.episodes[0];
    assert_eq!(episode.start_index, 1);
    assert_eq!(episode.peak_equity, dec!(1100));
    assert_eq!(episode.trough_index, 2);
    assert_eq!(episode.trough_equity, dec!(900));
    assert_eq!(episode.end_index, Some(4));
    assert_eq!(episode.depth_currency, dec!(200));
    assert!((episode.depth_percent - 200.0 / 1100.0 * 100.0).abs() < 1e-9);
    assert_eq!(episode.trades_to_recover, Some(3));
}

#[test]
fn zero_seeded_metric_and_balance_seeded_episodes() {
    // Early losses: zero-seeded peak stays at 0, balance-seeded peak at 1000.
    let pnls = [dec!(-300), dec!(200), dec!(-100), dec!(400), dec!(-50)];
    let history: Vec<TradeOutcome> = pnls
        .iter()
        .enumerate()
        .map(|(i, &pnl)| {
            let entry = start() + Duration::days(i as i64);
            TradeOutcome::new(pnl, entry, entry + Duration::hours(4))
        })
        .collect();

    let metrics = compute_metrics(&history);
    let analysis = analyze_trades(dec!(1000), &history).unwrap();

    // Cumulative: -300, -100, -200, 200, 150
    assert_eq!(metrics.max_drawdown_currency, dec!(300));
    assert_eq!(analysis.stats.deepest_drawdown_currency, dec!(300));
    assert!((analysis.stats.deepest_drawdown_percent - 30.0).abs() < 1e-9);

    let current = analysis.stats.current_drawdown.as_ref().unwrap();
    assert_eq!(current.peak_equity, dec!(1200));
    assert_eq!(current.depth_currency, dec!(50));
}

#[test]
fn profit_factor_infinity_survives_the_pipeline() {
    let history: Vec<TradeOutcome> = (0..12)
        .map(|i| {
            let entry = start() + Duration::hours(i);
            TradeOutcome::new(Decimal::from(10 + i), entry, entry + Duration::minutes(30))
        })
        .collect();

    let metrics = compute_metrics(&history);
    let bootstrap = resample(&history, &BootstrapConfig::new(100).with_seed(1)).unwrap();

    assert!(metrics.profit_factor.is_infinite());
    assert!(bootstrap.original_profit_factor.is_infinite());
    assert!(bootstrap.profit_factor_ci.is_none());

    let json = serde_json::to_string(&metrics).unwrap();
    assert!(json.contains("\"profit_factor\":\"infinite\""));
}
