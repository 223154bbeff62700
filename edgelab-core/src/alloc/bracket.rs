//! Stop-loss / take-profit bracket computation.
//!
//! Distances start from configured bases (2% stop, 6% target), tighten or
//! widen with signal confidence, widen the stop as leverage rises, and are
//! clipped to sane bounds before being applied direction-aware to the entry.

use super::GOLDEN_RATIO;
use crate::config::{AllocConfig, BracketConfig};
use crate::domain::Direction;
use crate::features::math::clip;

/// Absolute stop and target prices for a position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Stop distance as a fraction of entry price.
pub(super) fn stop_distance(config: &AllocConfig, confidence: f64, leverage: f64) -> f64 {
    let b = &config.bracket;
    let mut stop = b.stop_base;
    if confidence > 0.8 {
        stop *= 0.7;
    } else if confidence < 0.5 {
        stop *= 1.5;
    }
    stop *= 1.0 + leverage * 0.1;
    stop *= 1.0 + 0.1 * (confidence * config.osc_freq_a).sin();
    clip(stop, b.stop_min, b.stop_max)
}

/// Target distance as a fraction of entry price.
pub(super) fn take_distance(b: &BracketConfig, confidence: f64) -> f64 {
    let mut take = b.take_base;
    if confidence > 0.8 {
        take *= 1.0 + confidence;
    }
    take *= 1.0 + 0.1 * GOLDEN_RATIO * (1.0 + confidence).ln();
    clip(take, b.take_min, b.take_max)
}

pub(super) fn bracket_for(
    config: &AllocConfig,
    entry_price: f64,
    direction: Direction,
    confidence: f64,
    leverage: f64,
) -> Bracket {
    let stop = stop_distance(config, confidence, leverage);
    let take = take_distance(&config.bracket, confidence);
    match direction {
        Direction::Long => Bracket {
            stop_loss: entry_price * (1.0 - stop),
            take_profit: entry_price * (1.0 + take),
        },
        Direction::Short => Bracket {
            stop_loss: entry_price * (1.0 + stop),
            take_profit: entry_price * (1.0 - take),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AllocConfig;

    #[test]
    fn long_bracket_straddles_entry() {
        let config = AllocConfig::default();
        let b = bracket_for(&config, 100.0, Direction::Long, 0.6, 5.0);
        assert!(b.stop_loss < 100.0);
        assert!(b.take_profit > 100.0);
    }

    #[test]
    fn short_bracket_mirrors_long() {
        let config = AllocConfig::default();
        let long = bracket_for(&config, 100.0, Direction::Long, 0.6, 5.0);
        let short = bracket_for(&config, 100.0, Direction::Short, 0.6, 5.0);
        // same distances, mirrored around the entry
        assert!(((100.0 - long.stop_loss) - (short.stop_loss - 100.0)).abs() < 1e-9);
        assert!(((long.take_profit - 100.0) - (100.0 - short.take_profit)).abs() < 1e-9);
        assert!(short.stop_loss > 100.0);
        assert!(short.take_profit < 100.0);
    }

    #[test]
    fn higher_leverage_widens_stop() {
        let config = AllocConfig::default();
        let low = stop_distance(&config, 0.6, 3.0);
        let high = stop_distance(&config, 0.6, 10.0);
        assert!(high > low);
    }

    #[test]
    fn high_confidence_tightens_stop_and_widens_target() {
        let config = AllocConfig::default();
        let timid = stop_distance(&config, 0.55, 5.0);
        let confident = stop_distance(&config, 0.9, 5.0);
        assert!(confident < timid);

        let timid_take = take_distance(&config.bracket, 0.55);
        let confident_take = take_distance(&config.bracket, 0.9);
        assert!(confident_take > timid_take);
    }

    #[test]
    fn distances_respect_clips() {
        let config = AllocConfig::default();
        for conf in [0.0, 0.3, 0.5, 0.8, 0.95, 1.0] {
            for lev in [1.0, 3.0, 10.0, 50.0] {
                let stop = stop_distance(&config, conf, lev);
                assert!((config.bracket.stop_min..=config.bracket.stop_max).contains(&stop));
            }
            let take = take_distance(&config.bracket, conf);
            assert!((config.bracket.take_min..=config.bracket.take_max).contains(&take));
        }
    }
}
