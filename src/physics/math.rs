/// Scalar type for all numerical work (f64 for precision)
pub type Scalar = f64;

/// 3D vector type for states and derivatives
pub type Vector = bevy::math::DVec3;

/// Number of samples on a grid of `max_time` time units at the given density.
///
/// Rounds half away from zero, so `250 * 0.002 = 0.5` yields one sample.
/// Products beyond `usize::MAX` saturate; NaN and non-positive products give 0.
pub fn sample_count(samples_per_unit_time: u32, max_time: Scalar) -> usize {
    let raw = libm::round(samples_per_unit_time as Scalar * max_time);
    if raw > 0.0 { raw as usize } else { 0 }
}

/// Evenly spaced values from `start` to `stop`, both ends included.
///
/// The last value is written as `stop` exactly rather than accumulated, so the
/// grid always ends on the requested horizon.
pub fn linspace(start: Scalar, stop: Scalar, count: usize) -> Vec<Scalar> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as Scalar;
            let mut values: Vec<Scalar> = (0..count)
                .map(|i| start + step * i as Scalar)
                .collect();
            values[count - 1] = stop;
            values
        }
    }
}
