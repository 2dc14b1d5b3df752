//! A minimal Mamdani-style fuzzy inference engine: fuzzy sets as membership
//! closures, set algebra, weighted rules over named crisp inputs, and
//! centroid / mean-of-maximum / bisector defuzzification.

mod inference;
mod inputs;
mod rules;
mod set;
mod sweep;

pub use inference::{InferenceEngine, Priority};
pub use inputs::Inputs;
pub use rules::{Condition, Consequence, EvaluatedRule, FuzzyRule, Outcome};
pub use set::FuzzySet;
