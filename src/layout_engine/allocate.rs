use crate::model::{SizeKind, SizeSpec};

/// Splits `axis_available` pixels between children.
///
/// Fixed (`px`) children are clamped and taken off the top; the remainder is
/// shared between `frac` children by weight, and each share is clamped on its
/// own. Clamped shares are not redistributed, so with restrictive `min_px` /
/// `max_px` the result may not sum to `axis_available`.
pub fn allocate_child_sizes(specs: &[SizeSpec], axis_available: f64) -> Vec<f64> {
    let specs: Vec<SizeSpec> = specs.iter().map(SizeSpec::normalized).collect();

    let mut px_total = 0.0;
    let mut weight_total = 0.0;
    for spec in &specs {
        match spec.kind {
            SizeKind::Px { value } => px_total += spec.clamp(value),
            _ => weight_total += weight(spec),
        }
    }

    let remaining = (axis_available - px_total).max(0.0);

    specs
        .iter()
        .map(|spec| match spec.kind {
            SizeKind::Px { value } => spec.clamp(value),
            _ => {
                let share = if weight_total > 0.0 {
                    remaining * weight(spec) / weight_total
                } else {
                    0.0
                };
                spec.clamp(share)
            }
        })
        .collect()
}

fn weight(spec: &SizeSpec) -> f64 {
    match spec.kind {
        SizeKind::Frac { value } => value,
        SizeKind::Auto => 1.0,
        SizeKind::Px { .. } => 0.0,
    }
}

/// Converts allocated lengths to whole pixels: floor everything, then hand
/// the pixels lost to flooring back one at a time in child order, so that
/// unclamped allocations sum to exactly `round(axis_available)`.
pub fn apply_rounding(sizes: &[f64], axis_available: f64) -> Vec<i64> {
    let mut rounded: Vec<i64> = sizes.iter().map(|s| s.max(0.0).floor() as i64).collect();
    let mut leftover = axis_available.max(0.0).round() as i64 - rounded.iter().sum::<i64>();
    for size in rounded.iter_mut() {
        if leftover <= 0 {
            break;
        }
        *size += 1;
        leftover -= 1;
    }
    rounded
}

/// [`allocate_child_sizes`] followed by [`apply_rounding`].
pub fn allocate_pixels(specs: &[SizeSpec], axis_available: f64) -> Vec<i64> {
    apply_rounding(&allocate_child_sizes(specs, axis_available), axis_available)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fracs(n: usize) -> Vec<SizeSpec> { vec![SizeSpec::frac(1.0); n] }

    #[test]
    fn px_then_frac() {
        let specs = [SizeSpec::px(300.0), SizeSpec::frac(1.0)];
        assert_eq!(allocate_pixels(&specs, 1000.0), vec![300, 700]);
    }

    #[test]
    fn odd_pixels_go_to_the_first_children() {
        assert_eq!(allocate_pixels(&fracs(3), 100.0), vec![34, 33, 33]);
        assert_eq!(allocate_pixels(&fracs(3), 101.0), vec![34, 34, 33]);
        assert_eq!(allocate_pixels(&fracs(7), 10.0), vec![2, 2, 2, 1, 1, 1, 1]);
    }

    #[test]
    fn rounded_sizes_always_sum_to_the_rounded_axis() {
        for n in 1..=9 {
            for tenths in 0..=2_000 {
                let axis = tenths as f64 / 10.0;
                let sizes = allocate_pixels(&fracs(n), axis);
                assert_eq!(
                    sizes.iter().sum::<i64>(),
                    axis.round() as i64,
                    "n={n} axis={axis} sizes={sizes:?}"
                );
            }
        }
    }

    #[test]
    fn uneven_weights_sum_exactly() {
        let specs = [SizeSpec::frac(1.0), SizeSpec::frac(2.5), SizeSpec::auto(), SizeSpec::frac(0.3)];
        for axis in [0.0, 1.0, 17.0, 333.3, 1919.5, 2560.0] {
            let sizes = allocate_pixels(&specs, axis);
            assert_eq!(sizes.iter().sum::<i64>(), axis.round() as i64, "axis={axis}");
        }
    }

    #[test]
    fn auto_counts_as_unit_weight() {
        let specs = [SizeSpec::auto(), SizeSpec::frac(1.0)];
        assert_eq!(allocate_child_sizes(&specs, 600.0), vec![300.0, 300.0]);
    }

    #[test]
    fn px_children_are_clamped_before_subtraction() {
        let specs = [SizeSpec::px(50.0).with_min(120.0), SizeSpec::frac(1.0)];
        assert_eq!(allocate_child_sizes(&specs, 1000.0), vec![120.0, 880.0]);
    }

    #[test]
    fn fixed_sizes_larger_than_the_axis_leave_nothing_for_fractions() {
        let specs = [SizeSpec::px(700.0), SizeSpec::px(600.0), SizeSpec::frac(1.0)];
        assert_eq!(allocate_child_sizes(&specs, 1000.0), vec![700.0, 600.0, 0.0]);
    }

    #[test]
    fn frac_clamps_are_single_pass() {
        // The capped child keeps 100, the others keep their unclamped shares.
        let specs = [
            SizeSpec::frac(1.0).with_max(100.0),
            SizeSpec::frac(1.0),
            SizeSpec::frac(1.0),
        ];
        let sizes = allocate_child_sizes(&specs, 900.0);
        assert_eq!(sizes, vec![100.0, 300.0, 300.0]);
        assert_eq!(apply_rounding(&sizes, 900.0), vec![101, 301, 301]);
    }

    #[test]
    fn zero_weights_and_zero_axis() {
        let specs = [SizeSpec::frac(0.0), SizeSpec::frac(0.0)];
        assert_eq!(allocate_pixels(&specs, 100.0), vec![1, 1]);
        assert_eq!(allocate_pixels(&fracs(2), 0.0), vec![0, 0]);
    }
}
