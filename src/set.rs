use std::fmt;
use std::sync::Arc;

use crate::sweep::{Sweep, DEFAULT_STEP};

type Membership = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// A named fuzzy set over the real line.
///
/// The membership function is expected to stay within `[0, 1]`; that bound
/// is the caller's responsibility and is not enforced here. Sets are
/// immutable once built. Combinators return new sets that share the operands'
/// membership functions.
#[derive(Clone)]
pub struct FuzzySet {
    name: String,
    membership: Membership,
}

impl FuzzySet {
    pub fn new(
        name: impl Into<String>,
        membership: impl Fn(f64) -> f64 + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            membership: Arc::new(membership),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn membership_degree(&self, x: f64) -> f64 {
        (self.membership)(x)
    }

    /// Pointwise maximum of the two membership functions (fuzzy OR).
    pub fn union(&self, other: &FuzzySet) -> FuzzySet {
        let f = Arc::clone(&self.membership);
        let g = Arc::clone(&other.membership);

        FuzzySet {
            name: format!("Union({}, {})", self.name, other.name),
            membership: Arc::new(move |x| f(x).max(g(x))),
        }
    }

    /// Pointwise minimum of the two membership functions (fuzzy AND).
    pub fn intersection(&self, other: &FuzzySet) -> FuzzySet {
        let f = Arc::clone(&self.membership);
        let g = Arc::clone(&other.membership);

        FuzzySet {
            name: format!("Intersection({}, {})", self.name, other.name),
            membership: Arc::new(move |x| f(x).min(g(x))),
        }
    }

    /// `1 - μ(x)`.
    pub fn complement(&self) -> FuzzySet {
        let f = Arc::clone(&self.membership);

        FuzzySet {
            name: format!("Complement({})", self.name),
            membership: Arc::new(move |x| 1. - f(x)),
        }
    }

    /// Rescales degrees above 1 back down to 1; degrees already within
    /// `[0, 1]` pass through unchanged. The `max(1, μ)` denominator is
    /// never zero.
    pub fn normalize(&self) -> FuzzySet {
        let f = Arc::clone(&self.membership);

        FuzzySet {
            name: format!("Normalized({})", self.name),
            membership: Arc::new(move |x| {
                let mu = f(x);
                mu / mu.max(1.)
            }),
        }
    }

    /// Center of gravity of the membership curve over `[min_val, max_val]`,
    /// sampled at fixed increments. Returns 0 when the curve is identically
    /// zero over the range.
    ///
    /// If the step value is not provided, it defaults to 0.01.
    pub fn centroid(&self, min_val: f64, max_val: f64, step: Option<f64>) -> f64 {
        let step = step.unwrap_or(DEFAULT_STEP);
        let mut numerator = 0.;
        let mut denominator = 0.;

        for x in Sweep::new(min_val, max_val, step) {
            let mu = self.membership_degree(x);
            numerator += x * mu;
            denominator += mu;
        }

        if denominator == 0. {
            0.
        } else {
            numerator / denominator
        }
    }
}

impl fmt::Debug for FuzzySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuzzySet")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

#[test]
fn test_set_algebra_is_pointwise() {
    let a = FuzzySet::new("A", |x: f64| (1. - x).clamp(0., 1.));
    let b = FuzzySet::new("B", |x: f64| x.clamp(0., 1.));
    let union = a.union(&b);
    let intersection = a.intersection(&b);
    let complement = a.complement();

    for x in [-0.5, 0., 0.25, 0.5, 0.75, 1., 1.5] {
        let mu_a = a.membership_degree(x);
        let mu_b = b.membership_degree(x);

        assert_eq!(union.membership_degree(x), mu_a.max(mu_b));
        assert_eq!(intersection.membership_degree(x), mu_a.min(mu_b));
        assert_eq!(complement.membership_degree(x), 1. - mu_a);
    }
}

#[test]
fn test_combinator_names() {
    let a = FuzzySet::new("A", |_| 0.);
    let b = FuzzySet::new("B", |_| 1.);

    assert_eq!(a.union(&b).name(), "Union(A, B)");
    assert_eq!(a.intersection(&b).name(), "Intersection(A, B)");
    assert_eq!(a.complement().name(), "Complement(A)");
    assert_eq!(a.normalize().name(), "Normalized(A)");
}

#[test]
fn test_normalize_caps_at_one() {
    let spiky = FuzzySet::new("Spiky", |x: f64| if x > 0.5 { 1.5 } else { 0.4 });
    let normalized = spiky.normalize();

    assert_eq!(normalized.membership_degree(0.8), 1.);
    // Degrees already below one are left alone
    assert_eq!(normalized.membership_degree(0.2), 0.4);
}

#[test]
fn test_centroid_of_symmetric_triangle() {
    use approx::assert_relative_eq;

    let triangle = FuzzySet::new("Triangle", |x: f64| (1. - (x - 0.5).abs() * 2.).max(0.));

    assert_relative_eq!(triangle.centroid(0., 1., None), 0.5, epsilon = 1e-9);
}

#[test]
fn test_centroid_of_zero_curve_is_zero() {
    let empty = FuzzySet::new("Empty", |_| 0.);

    assert_eq!(empty.centroid(0., 1., None), 0.);
    assert_eq!(empty.centroid(0., 1., Some(0.1)), 0.);
}
