// fusion_core/src/utils/angles.rs

use num_traits::{Float, FloatConst};

/// Wraps an angle (radians) into the half-open interval `(-π, π]`.
///
/// The result differs from the input by an integer multiple of `2π`.
pub fn normalize_angle<T: Float + FloatConst>(angle: T) -> T {
    let pi = T::PI();
    let two_pi = T::TAU();

    let mut shifted = (angle + pi) % two_pi;
    if shifted < T::zero() {
        shifted = shifted + two_pi;
    }
    let wrapped = shifted - pi;

    if wrapped <= -pi {
        wrapped + two_pi
    } else {
        wrapped
    }
}
