use crate::inputs::Inputs;
use crate::set::FuzzySet;

/// Predicate over the named inputs deciding whether a rule fires.
pub type Condition = Box<dyn Fn(&Inputs) -> bool + Send + Sync>;

/// The resolved result of a fired rule.
#[derive(Clone, Debug)]
pub enum Outcome {
    Label(String),
    Set(FuzzySet),
}

/// What a rule concludes when its condition holds.
pub enum Consequence {
    /// A literal crisp label.
    Label(String),
    /// An output fuzzy set, picked up by the defuzzification methods.
    Set(FuzzySet),
    /// Computed from the inputs at evaluation time.
    Derived(Box<dyn Fn(&Inputs) -> Outcome + Send + Sync>),
}

impl Consequence {
    pub fn derived(f: impl Fn(&Inputs) -> Outcome + Send + Sync + 'static) -> Self {
        Self::Derived(Box::new(f))
    }
}

impl From<&str> for Consequence {
    fn from(label: &str) -> Self {
        Self::Label(label.to_owned())
    }
}

impl From<String> for Consequence {
    fn from(label: String) -> Self {
        Self::Label(label)
    }
}

impl From<FuzzySet> for Consequence {
    fn from(set: FuzzySet) -> Self {
        Self::Set(set)
    }
}

/// A weighted conditional rule over named crisp inputs. Immutable once built.
pub struct FuzzyRule {
    pub(crate) condition: Condition,
    pub(crate) consequence: Consequence,
    pub(crate) weight: f64,
}

/// Transient result of evaluating a single fired rule.
pub struct EvaluatedRule {
    pub result: Outcome,
    pub weight: f64,
}

impl FuzzyRule {
    pub fn new(
        condition: impl Fn(&Inputs) -> bool + Send + Sync + 'static,
        consequence: impl Into<Consequence>,
    ) -> Self {
        Self::weighted(condition, consequence, 1.)
    }

    /// Weights are assumed non-negative; aggregation treats a zero total
    /// weight the same as no rule firing at all.
    pub fn weighted(
        condition: impl Fn(&Inputs) -> bool + Send + Sync + 'static,
        consequence: impl Into<Consequence>,
        weight: f64,
    ) -> Self {
        Self {
            condition: Box::new(condition),
            consequence: consequence.into(),
            weight,
        }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// `None` when the condition does not hold on these inputs. Otherwise
    /// the consequence is resolved (a derived consequence is invoked with
    /// the inputs) and returned alongside the rule's weight. Panics from
    /// caller-supplied closures propagate unchanged.
    pub fn evaluate(&self, inputs: &Inputs) -> Option<EvaluatedRule> {
        if !(self.condition)(inputs) {
            return None;
        }

        let result = match &self.consequence {
            Consequence::Label(label) => Outcome::Label(label.clone()),
            Consequence::Set(set) => Outcome::Set(set.clone()),
            Consequence::Derived(f) => f(inputs),
        };

        Some(EvaluatedRule {
            result,
            weight: self.weight,
        })
    }
}

#[test]
fn test_rule_fires_on_condition() {
    let rule = FuzzyRule::new(
        |inputs: &Inputs| inputs.get("urgency").is_some_and(|u| u > 0.5),
        "Urgent",
    );
    let mut inputs = Inputs::new();

    inputs.add("urgency", 0.8);

    let evaluated = rule.evaluate(&inputs).expect("rule to fire");

    assert!(matches!(evaluated.result, Outcome::Label(ref label) if label == "Urgent"));
    assert_eq!(evaluated.weight, 1.);

    inputs.add("urgency", 0.2);

    assert!(rule.evaluate(&inputs).is_none());
}

#[test]
fn test_set_consequence_resolves_as_is() {
    let out = FuzzySet::new("Out", |x: f64| x.clamp(0., 1.));
    let rule = FuzzyRule::new(|_: &Inputs| true, out);
    let evaluated = rule.evaluate(&Inputs::new()).expect("rule to fire");

    match evaluated.result {
        Outcome::Set(set) => assert_eq!(set.name(), "Out"),
        Outcome::Label(_) => panic!("expected a set outcome"),
    }
}

#[test]
fn test_derived_consequence_sees_inputs() {
    let rule = FuzzyRule::new(
        |_: &Inputs| true,
        Consequence::derived(|inputs: &Inputs| {
            if inputs.get("urgency").is_some_and(|u| u > 0.5) {
                Outcome::Label("Urgent".to_owned())
            } else {
                Outcome::Label("Low Priority".to_owned())
            }
        }),
    );
    let mut inputs = Inputs::new();

    inputs.add("urgency", 0.9);

    let evaluated = rule.evaluate(&inputs).expect("rule to fire");

    assert!(matches!(evaluated.result, Outcome::Label(ref label) if label == "Urgent"));
}

#[test]
fn test_weighted_rule_carries_weight() {
    let rule = FuzzyRule::weighted(|_: &Inputs| true, "High Priority", 2.5);

    assert_eq!(rule.weight(), 2.5);
    assert_eq!(rule.evaluate(&Inputs::new()).expect("rule to fire").weight, 2.5);
}
