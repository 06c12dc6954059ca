//! Numeric Arrays
//!
//! [`Array`] is the one-dimensional value flowing between numeric nodes. It
//! is immutable and reference counted, so handing a cached array to several
//! dependents is a pointer copy.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// An immutable, cheaply clonable array of `f64`.
#[derive(Clone, PartialEq)]
pub struct Array(Arc<[f64]>);

impl Array {
    pub fn zeros(len: usize) -> Self {
        Self::from(vec![0.0; len])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.0.to_vec()
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        self.iter().map(|&x| f(x)).collect()
    }

    /// Largest absolute value, 0 for an empty array.
    pub fn peak(&self) -> f64 {
        self.iter().fold(0.0, |peak, &x| peak.max(x.abs()))
    }
}

impl Default for Array {
    fn default() -> Self {
        Self::from(Vec::new())
    }
}

impl Deref for Array {
    type Target = [f64];

    fn deref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for Array {
    fn from(values: Vec<f64>) -> Self {
        Self(values.into())
    }
}

impl From<&[f64]> for Array {
    fn from(values: &[f64]) -> Self {
        Self(values.into())
    }
}

impl<const N: usize> From<[f64; N]> for Array {
    fn from(values: [f64; N]) -> Self {
        Self(values.as_slice().into())
    }
}

impl FromIterator<f64> for Array {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Values that elementwise arithmetic nodes operate on.
pub trait Numeric: Clone + Send + Sync + 'static {
    /// Combine `self` and `other` element by element.
    fn zip_with(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Self;
}

impl Numeric for f64 {
    fn zip_with(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Self {
        op(*self, *other)
    }
}

impl Numeric for Array {
    /// Equal lengths combine pairwise and a length-1 side broadcasts.
    /// Otherwise the result is truncated to the shorter side.
    fn zip_with(&self, other: &Self, op: impl Fn(f64, f64) -> f64) -> Self {
        match (self.len(), other.len()) {
            (1, _) => other.iter().map(|&r| op(self[0], r)).collect(),
            (_, 1) => self.iter().map(|&l| op(l, other[0])).collect(),
            (left, right) => {
                if left != right {
                    tracing::warn!(left, right, "elementwise operands differ in length");
                }
                self.iter().zip(other.iter()).map(|(&l, &r)| op(l, r)).collect()
            }
        }
    }
}

/// A color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    /// Replace non-finite channels with 0 and clamp into `[0, 1]`.
    pub fn sanitized(self) -> Self {
        let fix = |c: f64| if c.is_finite() { c.clamp(0.0, 1.0) } else { 0.0 };
        Self::new(fix(self.r), fix(self.g), fix(self.b))
    }
}

/// One rendered frame, one color per LED.
pub type Frame = Arc<[Rgb]>;
