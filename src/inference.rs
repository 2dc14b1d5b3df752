use std::fmt;

use fixed_map::{Key, Map};

use crate::inputs::Inputs;
use crate::rules::{Consequence, EvaluatedRule, FuzzyRule, Outcome};
use crate::set::FuzzySet;
use crate::sweep::{Sweep, DEFAULT_STEP};

/// The closed label domain produced by rule aggregation.
#[derive(Clone, Copy, Debug, Eq, Hash, Key, PartialEq)]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low Priority",
            Self::Medium => "Medium Priority",
            Self::High => "High Priority",
            Self::Urgent => "Urgent",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Low Priority" => Some(Self::Low),
            "Medium Priority" => Some(Self::Medium),
            "High Priority" => Some(Self::High),
            "Urgent" => Some(Self::Urgent),
            _ => None,
        }
    }

    /// Buckets a weighted-average score back into a label via half-open
    /// thresholds at 0.5, 1.5 and 2.5.
    pub fn from_score(score: f64) -> Self {
        if score >= 2.5 {
            Self::Urgent
        } else if score >= 1.5 {
            Self::High
        } else if score >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn score_table() -> Map<Priority, f64> {
    let mut scores = Map::new();

    scores.insert(Priority::Low, 0.);
    scores.insert(Priority::Medium, 1.);
    scores.insert(Priority::High, 2.);
    scores.insert(Priority::Urgent, 3.);
    scores
}

/// Evaluates a fixed, ordered rule collection against crisp inputs.
///
/// Every operation is a pure function of its arguments plus the rules
/// captured at construction, so a shared engine is safe to read from
/// multiple threads.
pub struct InferenceEngine {
    rules: Vec<FuzzyRule>,
}

impl InferenceEngine {
    pub fn new(rules: Vec<FuzzyRule>) -> Self {
        Self { rules }
    }

    /// Weighted ordinal consensus across every rule that fires.
    ///
    /// Label outcomes are scored through the fixed priority table;
    /// fuzzy-set outcomes and unrecognized labels score 0 (those are meant
    /// for the defuzzification path, not the label consensus). If nothing
    /// fires, or the total weight is zero, the result is `Priority::Low`.
    /// Rule order never affects the result.
    pub fn infer(&self, inputs: &Inputs) -> Priority {
        let fired: Vec<EvaluatedRule> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(inputs))
            .collect();

        Self::aggregate(&fired)
    }

    fn aggregate(fired: &[EvaluatedRule]) -> Priority {
        if fired.is_empty() {
            return Priority::Low;
        }

        let scores = score_table();
        let mut weighted_sum = 0.;
        let mut total_weight = 0.;

        for rule in fired {
            let score = match &rule.result {
                Outcome::Label(label) => Priority::from_label(label)
                    .and_then(|priority| scores.get(priority).copied())
                    .unwrap_or(0.),
                Outcome::Set(_) => 0.,
            };

            weighted_sum += score * rule.weight;
            total_weight += rule.weight;
        }

        if total_weight > 0. {
            Priority::from_score(weighted_sum / total_weight)
        } else {
            Priority::Low
        }
    }

    /// The output sets among the rules' declared consequences. Label and
    /// derived consequences are skipped.
    pub fn fuzzy_set_consequences(&self) -> Vec<&FuzzySet> {
        self.rules
            .iter()
            .filter_map(|rule| match &rule.consequence {
                Consequence::Set(set) => Some(set),
                _ => None,
            })
            .collect()
    }

    /// Pointwise fuzzy-OR across all output sets, the Mamdani-style
    /// aggregated output curve sampled one point at a time.
    fn max_membership(sets: &[&FuzzySet], x: f64) -> f64 {
        sets.iter().map(|set| set.membership_degree(x)).fold(0., f64::max)
    }

    /// Center of gravity of the aggregated output curve over
    /// `[min_val, max_val]`. Returns 0 when no set has any membership in
    /// the range.
    ///
    /// If the step value is not provided, it defaults to 0.01.
    pub fn defuzzify_centroid(&self, min_val: f64, max_val: f64, step: Option<f64>) -> f64 {
        let step = step.unwrap_or(DEFAULT_STEP);
        let sets = self.fuzzy_set_consequences();
        let mut numerator = 0.;
        let mut denominator = 0.;

        for x in Sweep::new(min_val, max_val, step) {
            let mu = Self::max_membership(&sets, x);
            numerator += x * mu;
            denominator += mu;
        }

        if denominator == 0. {
            0.
        } else {
            numerator / denominator
        }
    }

    /// Mean of maximum: the average of every sampled `x` achieving the
    /// highest aggregated membership seen over the range. A strictly higher
    /// maximum resets the running mean; exact ties extend it. Returns 0 when
    /// the range yields no samples.
    ///
    /// If the step value is not provided, it defaults to 0.01.
    pub fn defuzzify_mom(&self, min_val: f64, max_val: f64, step: Option<f64>) -> f64 {
        let step = step.unwrap_or(DEFAULT_STEP);
        let sets = self.fuzzy_set_consequences();
        let mut max_mu = 0.;
        let mut sum_x = 0.;
        let mut count = 0usize;

        for x in Sweep::new(min_val, max_val, step) {
            let mu = Self::max_membership(&sets, x);

            if mu > max_mu {
                max_mu = mu;
                sum_x = x;
                count = 1;
            } else if mu == max_mu {
                sum_x += x;
                count += 1;
            }
        }

        if count == 0 {
            0.
        } else {
            sum_x / count as f64
        }
    }

    /// Bisector of area: the first sampled `x` at which the running left
    /// area reaches half the total area under the aggregated curve. Returns
    /// `min_val` when that threshold is never reached.
    ///
    /// If the step value is not provided, it defaults to 0.01.
    pub fn defuzzify_bisector(&self, min_val: f64, max_val: f64, step: Option<f64>) -> f64 {
        let step = step.unwrap_or(DEFAULT_STEP);
        let sets = self.fuzzy_set_consequences();
        let total_area: f64 = Sweep::new(min_val, max_val, step)
            .map(|x| Self::max_membership(&sets, x) * step)
            .sum();
        let mut left_area = 0.;

        for x in Sweep::new(min_val, max_val, step) {
            left_area += Self::max_membership(&sets, x) * step;

            if left_area >= total_area / 2. {
                return x;
            }
        }

        min_val
    }
}

#[cfg(test)]
fn task_inputs(urgency: f64, importance: f64) -> Inputs {
    [("urgency", urgency), ("importance", importance)]
        .into_iter()
        .collect()
}

/// Urgency/importance triage rules: triangular low/medium/high sets on both
/// axes, one rule per priority band.
#[cfg(test)]
fn task_priority_rules() -> Vec<FuzzyRule> {
    let low_urgency = FuzzySet::new("Low Urgency", |x: f64| (1. - x).max(0.));
    let medium_urgency = FuzzySet::new("Medium Urgency", |x: f64| {
        (1. - (x - 0.5).abs() * 2.).max(0.)
    });
    let high_urgency = FuzzySet::new("High Urgency", |x: f64| x.max(0.));
    let low_importance = FuzzySet::new("Low Importance", |x: f64| (1. - x).max(0.));
    let medium_importance = FuzzySet::new("Medium Importance", |x: f64| {
        (1. - (x - 0.5).abs() * 2.).max(0.)
    });
    let high_importance = FuzzySet::new("High Importance", |x: f64| x.max(0.));

    let (lu, li) = (low_urgency, low_importance);
    let (mu, mi) = (medium_urgency, medium_importance);
    let (hu, hi) = (high_urgency.clone(), high_importance.clone());

    vec![
        FuzzyRule::new(
            move |inputs: &Inputs| {
                lu.membership_degree(inputs.get("urgency").unwrap()) > 0.5
                    && li.membership_degree(inputs.get("importance").unwrap()) > 0.5
            },
            "Low Priority",
        ),
        FuzzyRule::new(
            move |inputs: &Inputs| {
                mu.membership_degree(inputs.get("urgency").unwrap()) > 0.5
                    && mi.membership_degree(inputs.get("importance").unwrap()) > 0.5
            },
            "Medium Priority",
        ),
        FuzzyRule::new(
            move |inputs: &Inputs| {
                hu.membership_degree(inputs.get("urgency").unwrap()) > 0.5
                    && hi.membership_degree(inputs.get("importance").unwrap()) > 0.5
            },
            "High Priority",
        ),
        FuzzyRule::new(
            move |inputs: &Inputs| {
                high_urgency.membership_degree(inputs.get("urgency").unwrap()) > 0.5
                    && high_importance.membership_degree(inputs.get("importance").unwrap()) > 0.5
            },
            "Urgent",
        ),
    ]
}

#[test]
fn test_task_priority_scenarios() {
    let engine = InferenceEngine::new(task_priority_rules());

    // Both high-band rules fire: (2 + 3) / 2 = 2.5, right on the Urgent cut
    assert_eq!(engine.infer(&task_inputs(0.8, 0.7)), Priority::Urgent);
    // Only the medium rule holds
    assert_eq!(engine.infer(&task_inputs(0.4, 0.6)), Priority::Medium);
    // Only the low rule holds
    assert_eq!(engine.infer(&task_inputs(0.1, 0.3)), Priority::Low);
}

#[test]
fn test_infer_defaults_low_when_nothing_fires() {
    let engine = InferenceEngine::new(vec![FuzzyRule::new(|_: &Inputs| false, "Urgent")]);

    assert_eq!(engine.infer(&Inputs::new()), Priority::Low);
}

#[test]
fn test_infer_defaults_low_on_zero_total_weight() {
    let engine = InferenceEngine::new(vec![
        FuzzyRule::weighted(|_: &Inputs| true, "Urgent", 0.),
        FuzzyRule::weighted(|_: &Inputs| true, "High Priority", 0.),
    ]);

    assert_eq!(engine.infer(&Inputs::new()), Priority::Low);
}

#[test]
fn test_infer_is_order_independent() {
    let forward = InferenceEngine::new(task_priority_rules());
    let reversed = InferenceEngine::new(task_priority_rules().into_iter().rev().collect());

    for (urgency, importance) in [(0.8, 0.7), (0.4, 0.6), (0.1, 0.3), (0.55, 0.55)] {
        let inputs = task_inputs(urgency, importance);

        assert_eq!(forward.infer(&inputs), reversed.infer(&inputs));
    }
}

#[test]
fn test_unmapped_outcomes_score_zero() {
    // A mistyped label contributes weight but no score
    let engine = InferenceEngine::new(vec![
        FuzzyRule::new(|_: &Inputs| true, "Urgent"),
        FuzzyRule::new(|_: &Inputs| true, "Critical"),
    ]);

    // (3 + 0) / 2 = 1.5
    assert_eq!(engine.infer(&Inputs::new()), Priority::High);

    // A fuzzy-set outcome is treated the same way
    let engine = InferenceEngine::new(vec![
        FuzzyRule::new(|_: &Inputs| true, "Urgent"),
        FuzzyRule::new(|_: &Inputs| true, FuzzySet::new("Out", |_| 1.)),
    ]);

    assert_eq!(engine.infer(&Inputs::new()), Priority::High);
}

#[test]
fn test_weighted_consensus() {
    let engine = InferenceEngine::new(vec![
        FuzzyRule::weighted(|_: &Inputs| true, "Urgent", 3.),
        FuzzyRule::weighted(|_: &Inputs| true, "Low Priority", 1.),
    ]);

    // (3 * 3 + 0 * 1) / 4 = 2.25
    assert_eq!(engine.infer(&Inputs::new()), Priority::High);
}

#[test]
fn test_fuzzy_set_consequences_filters_labels_and_derived() {
    let engine = InferenceEngine::new(vec![
        FuzzyRule::new(|_: &Inputs| true, "Urgent"),
        FuzzyRule::new(|_: &Inputs| true, FuzzySet::new("Out", |x: f64| x.clamp(0., 1.))),
        FuzzyRule::new(
            |_: &Inputs| true,
            Consequence::derived(|_| Outcome::Label("Urgent".to_owned())),
        ),
    ]);
    let sets = engine.fuzzy_set_consequences();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].name(), "Out");
}

#[test]
fn test_defuzzify_centroid_matches_single_set() {
    use approx::assert_relative_eq;

    let triangle = FuzzySet::new("Triangle", |x: f64| (1. - (x - 0.5).abs() * 2.).max(0.));
    let engine = InferenceEngine::new(vec![FuzzyRule::new(|_: &Inputs| true, triangle)]);

    assert_relative_eq!(engine.defuzzify_centroid(0., 1., None), 0.5, epsilon = 1e-9);
}

#[test]
fn test_defuzzify_centroid_zero_curve_is_zero() {
    let engine = InferenceEngine::new(vec![FuzzyRule::new(
        |_: &Inputs| true,
        FuzzySet::new("Empty", |_| 0.),
    )]);

    assert_eq!(engine.defuzzify_centroid(0., 1., None), 0.);
}

#[test]
fn test_defuzzify_uses_pointwise_maximum() {
    use approx::assert_relative_eq;

    // Two disjoint plateaus of equal width: the aggregated curve is their OR
    let left = FuzzySet::new("LeftBand", |x: f64| {
        if (0.1..=0.3).contains(&x) {
            1.
        } else {
            0.
        }
    });
    let right = FuzzySet::new("RightBand", |x: f64| {
        if (0.7..=0.9).contains(&x) {
            1.
        } else {
            0.
        }
    });
    let engine = InferenceEngine::new(vec![
        FuzzyRule::new(|_: &Inputs| true, left),
        FuzzyRule::new(|_: &Inputs| true, right),
    ]);

    // MOM averages both plateaus symmetrically around 0.5
    assert_relative_eq!(engine.defuzzify_mom(0., 1., None), 0.5, epsilon = 1e-9);
    assert_relative_eq!(engine.defuzzify_centroid(0., 1., None), 0.5, epsilon = 1e-9);
}

#[test]
fn test_defuzzify_bisector_on_symmetric_triangle() {
    let triangle = FuzzySet::new("Triangle", |x: f64| (1. - (x - 0.5).abs() * 2.).max(0.));
    let engine = InferenceEngine::new(vec![FuzzyRule::new(|_: &Inputs| true, triangle)]);
    let bisector = engine.defuzzify_bisector(0., 1., None);

    // Within one step of the true bisector
    assert!((bisector - 0.5).abs() <= 0.01 + 1e-12, "bisector = {bisector}");
}

#[test]
fn test_defuzzify_bisector_defaults_to_min_val() {
    // No set consequences at all: zero area, the threshold is met immediately
    let engine = InferenceEngine::new(vec![FuzzyRule::new(|_: &Inputs| true, "Urgent")]);

    assert_eq!(engine.defuzzify_bisector(0.2, 1., None), 0.2);
}

#[test]
fn test_defuzzify_mom_on_trapezoid_plateau() {
    use approx::assert_relative_eq;

    let trapezoid = FuzzySet::new("Trapezoid", |x: f64| {
        if x < 0.4 {
            ((x - 0.2) * 5.).clamp(0., 1.)
        } else if x > 0.6 {
            ((0.8 - x) * 5.).clamp(0., 1.)
        } else {
            1.
        }
    });
    let engine = InferenceEngine::new(vec![FuzzyRule::new(|_: &Inputs| true, trapezoid)]);

    // The mean of the plateau's x-range, not an endpoint
    assert_relative_eq!(engine.defuzzify_mom(0., 1., None), 0.5, epsilon = 1e-9);
}

#[test]
fn test_defuzzify_mom_empty_range_is_zero() {
    let engine = InferenceEngine::new(vec![FuzzyRule::new(
        |_: &Inputs| true,
        FuzzySet::new("Out", |_| 1.),
    )]);

    assert_eq!(engine.defuzzify_mom(1., 0., None), 0.);
}

#[test]
fn test_priority_score_round_trip() {
    assert_eq!(Priority::from_score(3.), Priority::Urgent);
    assert_eq!(Priority::from_score(2.5), Priority::Urgent);
    assert_eq!(Priority::from_score(2.49), Priority::High);
    assert_eq!(Priority::from_score(1.5), Priority::High);
    assert_eq!(Priority::from_score(1.49), Priority::Medium);
    assert_eq!(Priority::from_score(0.5), Priority::Medium);
    assert_eq!(Priority::from_score(0.49), Priority::Low);
    assert_eq!(Priority::from_score(-1.), Priority::Low);

    for priority in [Priority::Low, Priority::Medium, Priority::High, Priority::Urgent] {
        assert_eq!(Priority::from_label(priority.label()), Some(priority));
        assert_eq!(priority.to_string(), priority.label());
    }

    assert_eq!(Priority::from_label("Critical"), None);
}
