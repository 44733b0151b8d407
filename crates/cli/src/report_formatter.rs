#![allow(clippy::format_push_string)]
#![allow(clippy::uninlined_format_args)]

use trade_analytics_engine::{
    BootstrapResult, DrawdownAnalysis, DrawdownEpisode, MetricsResult, MonteCarloResult,
    RiskOfRuinResult,
};

use crate::commands::report::AnalyticsReport;

const HEAVY_RULE: &str = "═══════════════════════════════════════════════════════════════\n";
const LIGHT_RULE: &str = "───────────────────────────────────────────────────────────────\n";

/// Band rows shown before the Monte Carlo table is thinned out.
const MAX_BAND_ROWS: usize = 20;

pub struct ReportFormatter;

impl ReportFormatter {
    #[must_use]
    pub fn metrics(metrics: &MetricsResult) -> String {
        let mut output = banner("PERFORMANCE METRICS");
        Self::push_metrics(&mut output, metrics);
        output.push_str(HEAVY_RULE);
        output
    }

    #[must_use]
    pub fn drawdown(analysis: &DrawdownAnalysis) -> String {
        let mut output = banner("DRAWDOWN ANALYSIS");
        Self::push_drawdown(&mut output, analysis);
        output.push_str(HEAVY_RULE);
        output
    }

    #[must_use]
    pub fn monte_carlo(result: &MonteCarloResult) -> String {
        let mut output = banner("MONTE CARLO PROJECTION");
        Self::push_monte_carlo(&mut output, result);
        output.push_str(HEAVY_RULE);
        output
    }

    #[must_use]
    pub fn bootstrap(result: &BootstrapResult) -> String {
        let mut output = banner("BOOTSTRAP CONFIDENCE INTERVALS");
        Self::push_bootstrap(&mut output, result);
        output.push_str(HEAVY_RULE);
        output
    }

    #[must_use]
    pub fn risk_of_ruin(result: &RiskOfRuinResult) -> String {
        let mut output = banner("RISK OF RUIN");
        Self::push_risk_of_ruin(&mut output, result);
        output.push_str(HEAVY_RULE);
        output
    }

    #[must_use]
    pub fn report(report: &AnalyticsReport) -> String {
        let mut output = banner("TRADE ANALYTICS REPORT");

        Self::push_metrics(&mut output, &report.metrics);

        match &report.drawdown {
            Some(analysis) => Self::push_drawdown(&mut output, analysis),
            None => push_unavailable(&mut output, "Drawdowns"),
        }
        match &report.risk_of_ruin {
            Some(result) => Self::push_risk_of_ruin(&mut output, result),
            None => push_unavailable(&mut output, "Risk of Ruin"),
        }
        match &report.monte_carlo {
            Some(result) => Self::push_monte_carlo(&mut output, result),
            None => push_unavailable(&mut output, "Monte Carlo Projection"),
        }
        match &report.bootstrap {
            Some(result) => Self::push_bootstrap(&mut output, result),
            None => push_unavailable(&mut output, "Bootstrap"),
        }

        output.push_str(HEAVY_RULE);
        output
    }

    fn push_metrics(output: &mut String, m: &MetricsResult) {
        section(output, "Trade Statistics");
        output.push_str(&format!("Total Trades:          {}\n", m.total_trades));
        output.push_str(&format!(
            "Wins / Losses / Even:  {} / {} / {}\n",
            m.wins, m.losses, m.breakevens
        ));
        output.push_str(&format!("Win Rate:              {:.2}%\n", m.win_rate));
        output.push_str(&format!(
            "Longest Streaks:       {} wins, {} losses\n",
            m.max_consecutive_wins, m.max_consecutive_losses
        ));
        output.push_str(&format!(
            "Avg Hold Time:         {}\n",
            format_duration_ms(m.avg_hold_duration_ms)
        ));
        output.push('\n');

        section(output, "Profit and Loss");
        output.push_str(&format!("Net P/L:               ${:.2}\n", m.net_pnl));
        output.push_str(&format!("Gross Profit:          ${:.2}\n", m.gross_profit));
        output.push_str(&format!("Gross Loss:            ${:.2}\n", m.gross_loss));
        output.push_str(&format!("Profit Factor:         {:.2}\n", m.profit_factor));
        output.push_str(&format!("Average Win:           ${:.2}\n", m.avg_win));
        output.push_str(&format!("Average Loss:          ${:.2}\n", m.avg_loss));
        output.push_str(&format!("Avg Reward/Risk:       {:.2}\n", m.avg_rr));
        if let Some(r) = m.avg_r_multiple {
            output.push_str(&format!("Avg R-Multiple:        {:.2}R\n", r));
        }
        output.push_str(&format!("Expectancy:            ${:.2}\n", m.expectancy));
        output.push_str(&format!("Largest Win:           ${:.2}\n", m.largest_win));
        output.push_str(&format!("Largest Loss:          ${:.2}\n", m.largest_loss));
        output.push('\n');

        section(output, "Dispersion");
        output.push_str(&format!("Mean P/L:              ${:.2}\n", m.mean_pnl));
        output.push_str(&format!("Std Deviation:         ${:.2}\n", m.std_deviation));
        output.push_str(&format!("Sharpe-like Ratio:     {:.4}\n", m.sharpe_like));
        output.push_str(&format!(
            "Max Drawdown (P/L):    ${:.2}\n",
            m.max_drawdown_currency
        ));
        output.push('\n');
    }

    fn push_drawdown(output: &mut String, analysis: &DrawdownAnalysis) {
        let stats = &analysis.stats;

        section(output, "Drawdowns");
        output.push_str(&format!("Recovered Episodes:    {}\n", stats.closed_episodes));
        output.push_str(&format!(
            "Deepest Drawdown:      ${:.2} ({:.2}%)\n",
            stats.deepest_drawdown_currency, stats.deepest_drawdown_percent
        ));
        output.push_str(&format!(
            "Longest Drawdown:      {}\n",
            format_duration_ms(stats.longest_duration_ms)
        ));
        output.push_str(&format!(
            "Avg Drawdown Length:   {}\n",
            format_duration_ms(stats.avg_drawdown_duration_ms.round() as i64)
        ));
        output.push_str(&format!(
            "Avg Trades to Recover: {:.1}\n",
            stats.avg_trades_to_recover
        ));
        output.push_str(&format!(
            "Time Underwater:       {:.2}%\n",
            stats.percent_time_underwater
        ));

        match &stats.current_drawdown {
            Some(current) => output.push_str(&format!(
                "Current Drawdown:      ${:.2} ({:.2}%) since point {}\n",
                current.depth_currency, current.depth_percent, current.start_index
            )),
            None => output.push_str("Current Drawdown:      none\n"),
        }

        let closed: Vec<&DrawdownEpisode> = analysis.closed_episodes().collect();
        if !closed.is_empty() {
            output.push('\n');
            output.push_str("  Peak    Trough   Depth        Depth %   Duration       Trades\n");
            for episode in closed {
                output.push_str(&format!(
                    "  {:<7} {:<8} ${:<11.2} {:>7.2}%   {:<14} {}\n",
                    episode.start_index,
                    episode.trough_index,
                    episode.depth_currency,
                    episode.depth_percent,
                    format_duration_ms(episode.duration_ms.unwrap_or(0)),
                    episode.trades_to_recover.unwrap_or(0)
                ));
            }
        }
        output.push('\n');
    }

    fn push_monte_carlo(output: &mut String, r: &MonteCarloResult) {
        section(output, "Monte Carlo Projection");
        output.push_str(&format!(
            "Paths:                 {} x {} trades (seed {})\n",
            r.num_trials, r.path_length, r.seed
        ));
        output.push_str(&format!("Starting Capital:      ${:.2}\n", r.starting_capital));
        output.push_str(&format!("Median Final Equity:   ${:.2}\n", r.median_final_equity));
        output.push_str(&format!("Mean Final Equity:     ${:.2}\n", r.mean_final_equity));
        output.push_str(&format!("Mean Return:           {:.2}%\n", r.mean_return()));
        output.push_str(&format!("Best / Worst Case:     ${:.2} / ${:.2}\n", r.best_case, r.worst_case));
        output.push_str(&format!(
            "Probability of Profit: {:.2}%\n",
            r.probability_of_profit
        ));
        if let Some(ruin) = r.probability_of_ruin {
            output.push_str(&format!("Probability of Ruin:   {:.2}%\n", ruin));
        }

        output.push('\n');
        output.push_str(&format!(
            "  Step    P{:<10} P{:<10} P{:<10}\n",
            r.levels.lower, r.levels.median, r.levels.upper
        ));
        let stride = r.bands.len().div_ceil(MAX_BAND_ROWS).max(1);
        for (i, band) in r.bands.iter().enumerate() {
            if i % stride != 0 && i + 1 != r.bands.len() {
                continue;
            }
            output.push_str(&format!(
                "  {:<7} {:<11.2} {:<11.2} {:<11.2}\n",
                band.step_index, band.lower, band.median, band.upper
            ));
        }
        output.push('\n');
    }

    fn push_bootstrap(output: &mut String, r: &BootstrapResult) {
        section(output, "Bootstrap");
        output.push_str(&format!(
            "Resamples:             {} x {} trades (seed {})\n",
            r.num_trials, r.sample_size, r.seed
        ));
        output.push_str(&format!(
            "Win Rate:              {:.2}%  CI [{:.2}%, {:.2}%]\n",
            r.original_win_rate, r.win_rate_ci.lower, r.win_rate_ci.upper
        ));
        match &r.profit_factor_ci {
            Some(ci) => output.push_str(&format!(
                "Profit Factor:         {:.2}  CI [{:.2}, {:.2}]\n",
                r.original_profit_factor, ci.lower, ci.upper
            )),
            None => output.push_str(&format!(
                "Profit Factor:         {:.2}  CI n/a\n",
                r.original_profit_factor
            )),
        }
        if r.infinite_profit_factor_count > 0 {
            output.push_str(&format!(
                "Loss-free Resamples:   {}\n",
                r.infinite_profit_factor_count
            ));
        }
        output.push_str(&format!(
            "Net P/L:               mean ${:.2}  CI [${:.2}, ${:.2}]\n",
            r.mean_net_pnl, r.net_pnl_ci.lower, r.net_pnl_ci.upper
        ));
        output.push_str(&format!(
            "Net P/L Std Error:     ${:.2}\n",
            r.net_pnl_standard_error
        ));

        if !r.histogram.is_empty() {
            output.push('\n');
            let widest = r.histogram.iter().map(|b| b.count).max().unwrap_or(0).max(1);
            for bin in &r.histogram {
                let bar = "█".repeat(bin.count * 30 / widest);
                output.push_str(&format!(
                    "  {:>10.2} .. {:<10.2} {:>6} {}\n",
                    bin.bin_start, bin.bin_end, bin.count, bar
                ));
            }
        }
        output.push('\n');
    }

    fn push_risk_of_ruin(output: &mut String, r: &RiskOfRuinResult) {
        section(output, "Risk of Ruin");
        output.push_str(&format!("Edge per Unit Risked:  {:.4}\n", r.edge));
        output.push_str(&format!(
            "Probability of Ruin:   {:.4}%\n",
            r.ruin_probability_percent
        ));
        output.push('\n');
    }
}

fn banner(title: &str) -> String {
    let mut output = String::new();
    output.push('\n');
    output.push_str(HEAVY_RULE);
    output.push_str(&format!("{:^63}\n", title));
    output.push_str(HEAVY_RULE);
    output.push('\n');
    output
}

fn section(output: &mut String, title: &str) {
    output.push_str(title);
    output.push('\n');
    output.push_str(LIGHT_RULE);
}

fn push_unavailable(output: &mut String, title: &str) {
    section(output, title);
    output.push_str("Not enough trade history for this section.\n\n");
}

/// Formats milliseconds as days, hours and minutes.
fn format_duration_ms(ms: i64) -> String {
    let minutes = ms / 60_000;
    let days = minutes / (24 * 60);
    let hours = (minutes / 60) % 24;
    let mins = minutes % 60;

    if days > 0 {
        format!("{}d {}h {}m", days, hours, mins)
    } else if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
