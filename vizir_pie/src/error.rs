// Copyright 2025 the VizIR Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Configuration errors.
//!
//! Label layout itself never fails: crowded sides drop labels instead. Only a spec that
//! cannot describe a pie at all is rejected.

use kurbo::Rect;

/// Errors returned when resolving an [`OutsideLabelsSpec`](crate::OutsideLabelsSpec).
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum LayoutError {
    /// The plot bounds contain a non-finite coordinate.
    #[error("pie bounds must be finite, got {0:?}")]
    NonFiniteBounds(Rect),
    /// A length setting is negative or not finite.
    #[error("`{name}` must be a finite, non-negative length, got {value}")]
    InvalidLength {
        /// Name of the offending setting.
        name: &'static str,
        /// The raw configured value.
        value: f64,
    },
    /// The inner (donut) radius is larger than the outer radius.
    #[error("inner radius {inner} exceeds outer radius {outer}")]
    InnerRadiusExceedsOuter {
        /// Resolved inner radius.
        inner: f64,
        /// Resolved outer radius.
        outer: f64,
    },
    /// The critical angle is not finite.
    #[error("critical angle must be finite, got {0}")]
    InvalidCriticalAngle(f64),
}
