use crate::analyzer::features::build_features;
use crate::analyzer::market_indicators::MarketIndicators;
use crate::analyzer::summary::summarize;
use crate::config::RuleConfig;
use crate::model::{PricePoint, Signal, SignalRecord, SummaryStats};
use tracing::debug;

const BASE_CONFIDENCE: u8 = 50;
const ABOVE_MA_BONUS: u8 = 20;
const VOLUME_BONUS: u8 = 15;
const SUPPORT_BONUS: u8 = 15;

/// Trait defining the interface for a price-series analyzer.
pub trait Analyzer {
    /// One signal per input day, in input order. `ticker` is only used for logging.
    fn generate_signals(&self, ticker: &str, prices: &[PricePoint]) -> Vec<SignalRecord>;
    fn summarize(&self, signals: &[SignalRecord]) -> SummaryStats;
}

/// Drop-and-rebound rule set: buy after a sharp daily drop when the price
/// recovers within the holding window, sell once the window has passed.
#[derive(Debug, Clone, Default)]
pub struct AnalyzerImpl {
    rules: RuleConfig,
}

impl AnalyzerImpl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: RuleConfig) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleConfig {
        &self.rules
    }

    fn buy_confidence(&self, closes: &[f64], i: usize) -> u8 {
        let rules = &self.rules;
        let current = closes[i];

        let above_ma = MarketIndicators::trailing_mean(closes, i, rules.ma_window)
            .is_some_and(|ma| current > ma);
        // No volume column is loaded; the volume confirmation is assumed.
        let volume_increase = true;
        let support = MarketIndicators::support_level(closes, i, rules.support_lookback);
        let near_support =
            MarketIndicators::is_near_support(current, support, rules.support_tolerance);

        let mut confidence = BASE_CONFIDENCE;
        if above_ma {
            confidence += ABOVE_MA_BONUS;
        }
        if volume_increase {
            confidence += VOLUME_BONUS;
        }
        if near_support {
            confidence += SUPPORT_BONUS;
        }
        confidence
    }
}

impl Analyzer for AnalyzerImpl {
    fn generate_signals(&self, ticker: &str, prices: &[PricePoint]) -> Vec<SignalRecord> {
        let rules = &self.rules;
        let hold = rules.hold_days;
        let features = build_features(prices, hold);
        let closes: Vec<f64> = prices.iter().map(|p| p.close_price).collect();

        let mut signals = Vec::with_capacity(prices.len());

        for (i, point) in prices.iter().enumerate() {
            let mut record = SignalRecord::hold(point.date, point.close_price);

            // Buy side: needs a previous day and a complete holding window ahead.
            if i >= 1 && i + hold < prices.len() {
                if let Some(daily_change) = features[i].daily_change_pct {
                    if daily_change <= rules.drop_threshold_pct {
                        let confidence = self.buy_confidence(&closes, i);
                        record.confidence = confidence;

                        match features[i].profit_pct_5d {
                            Some(profit) if profit > 0.0 => {
                                record.signal = Signal::Buy;
                                record.price_drop = Some(daily_change.abs());
                                record.expected_profit = Some(profit);
                            }
                            _ if confidence >= rules.weak_buy_min_confidence => {
                                record.signal = Signal::WeakBuy;
                            }
                            _ => {}
                        }
                    }
                }
            }

            // Sell side: close out a drop-day entry `hold` days later.
            // Overrides the buy side but keeps its price_drop and confidence.
            if let Some(past_i) = i.checked_sub(hold).filter(|&p| p >= 1) {
                if let Some(past_drop) = features[past_i].daily_change_pct {
                    if past_drop <= rules.drop_threshold_pct {
                        record.signal = Signal::Sell;
                        record.expected_profit =
                            crate::utils::pct_change(closes[past_i], closes[i]);
                    }
                }
            }

            signals.push(record);
        }

        debug!(
            "{}: generated {} signals ({} buy, {} sell)",
            ticker,
            signals.len(),
            signals.iter().filter(|s| s.signal == Signal::Buy).count(),
            signals.iter().filter(|s| s.signal == Signal::Sell).count(),
        );

        signals
    }

    fn summarize(&self, signals: &[SignalRecord]) -> SummaryStats {
        summarize(signals)
    }
}
