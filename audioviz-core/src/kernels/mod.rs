//! Numeric Kernels
//!
//! Pure functions over slices. Graph nodes are thin wrappers around these;
//! keeping them free of graph types makes each one testable on plain data.
//!
//! Conventions follow the usual array-library semantics: half-open ranges,
//! inclusive `linspace` endpoints, clamped interpolation and reflect-mode
//! filtering.

mod color;
mod sampling;
mod spectral;

pub use color::{hsv_to_rgb, ring_color};
pub use sampling::{
    fold_max, gaussian_filter, interp, linspace, mask_non_finite, mirror, resample, roll, slice,
};
pub use spectral::{a_weighting, hamming, rfft_frequencies, RealFft};
