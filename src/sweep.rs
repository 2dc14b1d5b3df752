use num::Float;

/// Default sample spacing for centroid and defuzzification sweeps.
pub(crate) const DEFAULT_STEP: f64 = 0.01;

/// Fixed-step sweep over `[min, max]`, both endpoints inclusive.
///
/// Samples are computed as `min + step * i` rather than by repeated
/// addition, so positions don't accumulate floating-point drift over
/// long sweeps.
pub(crate) struct Sweep<F> {
    start: F,
    step: F,
    index: usize,
    len: usize,
}

impl<F: Float> Sweep<F> {
    pub fn new(min: F, max: F, step: F) -> Self {
        let len = if max < min {
            0
        } else {
            ((max - min) / step).floor().to_usize().unwrap_or(0) + 1
        };

        Sweep {
            start: min,
            step,
            index: 0,
            len,
        }
    }
}

impl<F: Float> Iterator for Sweep<F> {
    type Item = F;

    #[inline]
    fn next(&mut self) -> Option<F> {
        if self.index >= self.len {
            None
        } else {
            let i = self.index;
            self.index += 1;
            Some(self.start + self.step * F::from(i).expect("sample index to fit in a float"))
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.len - self.index;
        (n, Some(n))
    }
}

#[test]
fn test_sweep_samples() {
    let xs: Vec<f64> = Sweep::new(0., 1., 0.25).collect();

    assert_eq!(xs, vec![0., 0.25, 0.5, 0.75, 1.]);
    assert_eq!(Sweep::new(0.0f64, 1., 0.01).count(), 101);
}

#[test]
fn test_sweep_single_point() {
    let xs: Vec<f64> = Sweep::new(2., 2., 0.5).collect();

    assert_eq!(xs, vec![2.]);
}

#[test]
fn test_sweep_empty_when_inverted() {
    assert_eq!(Sweep::new(1.0f64, 0., 0.01).count(), 0);
}
