//! The four rule-based attribution models

use rust_decimal::Decimal;

use super::{AllocationModel, ModelId};
use crate::config::PositionSplit;

/// All revenue to the first touchpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstTouch;

impl AllocationModel for FirstTouch {
    fn id(&self) -> ModelId {
        ModelId::FirstTouch
    }

    fn credit(&self, revenue: Decimal, position: u32, _total: u32) -> Decimal {
        if position == 1 { revenue } else { Decimal::ZERO }
    }
}

/// All revenue to the last touchpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct LastTouch;

impl AllocationModel for LastTouch {
    fn id(&self) -> ModelId {
        ModelId::LastTouch
    }

    fn credit(&self, revenue: Decimal, position: u32, total: u32) -> Decimal {
        if position == total { revenue } else { Decimal::ZERO }
    }
}

/// Revenue split evenly over the journey
#[derive(Debug, Clone, Copy, Default)]
pub struct Linear;

impl AllocationModel for Linear {
    fn id(&self) -> ModelId {
        ModelId::Linear
    }

    fn credit(&self, revenue: Decimal, _position: u32, total: u32) -> Decimal {
        if total == 0 {
            return Decimal::ZERO;
        }
        revenue / Decimal::from(total)
    }
}

/// U-shaped split: heavy first and last touch, remainder across the middle
///
/// - one touchpoint takes everything
/// - two touchpoints share the endpoint weights (50/50 by default)
/// - three or more: first and last take their weights, the middle weight
///   is divided evenly over the `total - 2` touchpoints between them
#[derive(Debug, Clone, Default)]
pub struct PositionBased {
    split: PositionSplit,
}

impl PositionBased {
    pub fn new(split: PositionSplit) -> Self {
        Self { split }
    }
}

impl AllocationModel for PositionBased {
    fn id(&self) -> ModelId {
        ModelId::PositionBased
    }

    fn credit(&self, revenue: Decimal, position: u32, total: u32) -> Decimal {
        match total {
            0 => Decimal::ZERO,
            1 => revenue,
            2 => {
                let (first, last) = self.split.two_touch_shares();
                if position == 1 {
                    revenue * first
                } else {
                    revenue * last
                }
            }
            _ if position == 1 => revenue * self.split.first_touch,
            _ if position == total => revenue * self.split.last_touch,
            _ => revenue * self.split.middle / Decimal::from(total - 2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credits(model: &dyn AllocationModel, revenue: Decimal, total: u32) -> Vec<Decimal> {
        (1..=total).map(|p| model.credit(revenue, p, total)).collect()
    }

    fn sum(values: &[Decimal]) -> Decimal {
        values.iter().copied().sum()
    }

    #[test]
    fn test_single_touch_gets_everything() {
        let revenue = Decimal::new(4999, 2);
        let models: Vec<Box<dyn AllocationModel>> = vec![
            Box::new(FirstTouch),
            Box::new(LastTouch),
            Box::new(Linear),
            Box::new(PositionBased::default()),
        ];
        for model in &models {
            assert_eq!(credits(model.as_ref(), revenue, 1), vec![revenue]);
        }
    }

    #[test]
    fn test_two_touch_journey() {
        let revenue = Decimal::from(80);
        let forty = Decimal::from(40);
        assert_eq!(credits(&FirstTouch, revenue, 2), vec![revenue, Decimal::ZERO]);
        assert_eq!(credits(&LastTouch, revenue, 2), vec![Decimal::ZERO, revenue]);
        assert_eq!(credits(&Linear, revenue, 2), vec![forty, forty]);
        assert_eq!(
            credits(&PositionBased::default(), revenue, 2),
            vec![forty, forty]
        );
    }

    #[test]
    fn test_position_based_four_touch_example() {
        let c = credits(&PositionBased::default(), Decimal::from(100), 4);
        assert_eq!(
            c,
            vec![
                Decimal::from(40),
                Decimal::from(10),
                Decimal::from(10),
                Decimal::from(40)
            ]
        );
        assert_eq!(sum(&c), Decimal::from(100));
    }

    #[test]
    fn test_position_based_three_touch() {
        let c = credits(&PositionBased::default(), Decimal::from(250), 3);
        assert_eq!(
            c,
            vec![Decimal::from(100), Decimal::from(50), Decimal::from(100)]
        );
    }

    #[test]
    fn test_position_based_custom_split() {
        let model = PositionBased::new(PositionSplit {
            first_touch: Decimal::new(3, 1),
            last_touch: Decimal::new(5, 1),
            middle: Decimal::new(2, 1),
        });
        let c = credits(&model, Decimal::from(100), 5);
        assert_eq!(c[0], Decimal::from(30));
        assert_eq!(c[4], Decimal::from(50));
        assert!((sum(&c) - Decimal::from(100)).abs() <= Decimal::new(1, 2));
    }

    #[test]
    fn test_linear_thirds_stay_within_tolerance() {
        let revenue = Decimal::from(100);
        let c = credits(&Linear, revenue, 3);
        let diff = (sum(&c) - revenue).abs();
        assert!(diff <= Decimal::new(1, 2));
        // Unrounded: not truncated to cents mid-computation
        assert!(c[0].scale() > 2);
    }

    #[test]
    fn test_sums_hold_for_long_journeys() {
        let revenue = Decimal::new(47313, 2);
        let models: Vec<Box<dyn AllocationModel>> = vec![
            Box::new(FirstTouch),
            Box::new(LastTouch),
            Box::new(Linear),
            Box::new(PositionBased::default()),
        ];
        for total in 1..=40 {
            for model in &models {
                let diff = (sum(&credits(model.as_ref(), revenue, total)) - revenue).abs();
                assert!(
                    diff <= Decimal::new(1, 2),
                    "{} over {} touchpoints drifted by {}",
                    model.id(),
                    total,
                    diff
                );
            }
        }
    }

    #[test]
    fn test_zero_length_journey_credits_nothing() {
        assert_eq!(Linear.credit(Decimal::from(10), 1, 0), Decimal::ZERO);
        assert_eq!(
            PositionBased::default().credit(Decimal::from(10), 1, 0),
            Decimal::ZERO
        );
    }
}
