use std::collections::HashMap;

/// A record of named crisp input values, read by rule conditions and
/// derived consequences.
#[derive(Debug, Default)]
pub struct Inputs(pub(crate) HashMap<String, f64>);

impl Inputs {
    pub fn new() -> Self {
        Inputs(HashMap::new())
    }

    pub fn add(&mut self, name: impl Into<String>, val: f64) {
        self.0.insert(name.into(), val);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for Inputs {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        Inputs(iter.into_iter().map(|(name, val)| (name.into(), val)).collect())
    }
}

#[test]
fn test_inputs_add_and_get() {
    let mut inputs = Inputs::new();

    inputs.add("urgency", 0.8);
    inputs.add("importance", 0.7);

    assert_eq!(inputs.get("urgency"), Some(0.8));
    assert_eq!(inputs.get("importance"), Some(0.7));
    assert_eq!(inputs.get("unknown"), None);
}

#[test]
fn test_inputs_from_iter() {
    let inputs: Inputs = [("urgency", 0.4), ("importance", 0.6)].into_iter().collect();

    assert_eq!(inputs.get("urgency"), Some(0.4));
    assert_eq!(inputs.get("importance"), Some(0.6));
}
