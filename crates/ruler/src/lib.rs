//! Ruler tick computation.
//!
//! Produces the full tick layout for one ruler draw: positions in device
//! pixels, a length tier per tick, and labels on whole-unit ticks. The
//! computation is a pure function of scale and scroll; ticks stay pinned
//! to absolute document positions because only the difference between the
//! page offset and the scroll position enters the math.

use paperview_doc_model::UnitSystem;

/// Centimeters per inch, for the metric branch.
const CM_PER_INCH: f32 = 2.54;

/// Metric resolution drops from centimeters to millimeters below this
/// many centimeters per device pixel.
const METRIC_MM_THRESHOLD: f32 = 0.02;

/// Which screen edge the ruler runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Tick length tier, coarsest to finest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickTier {
    WholeUnit,
    HalfUnit,
    QuarterUnit,
    EighthUnit,
    SixteenthUnit,
    Millimeter,
}

impl TickTier {
    /// Draw length in device pixels.
    pub fn length_px(self) -> f32 {
        match self {
            Self::WholeUnit => 18.0,
            Self::HalfUnit => 12.0,
            Self::QuarterUnit => 9.0,
            Self::EighthUnit => 6.0,
            Self::SixteenthUnit => 4.0,
            Self::Millimeter => 5.0,
        }
    }
}

/// One tick draw-op. Transient; recomputed per draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RulerTick {
    /// Position along the ruler in device pixels.
    pub device_pos: f32,
    pub tier: TickTier,
    /// Whole-unit count from the page origin, on whole-unit ticks only.
    pub label: Option<i32>,
}

/// Inputs for one ruler draw.
#[derive(Debug, Clone, Copy)]
pub struct TickParams {
    pub orientation: Orientation,
    pub unit_system: UnitSystem,
    /// Logical-to-device conversion: inches per device pixel.
    pub logical_scale: f32,
    /// Device position of the page origin along this axis.
    pub page_offset: f32,
    /// Current scroll position along this axis, device pixels.
    pub scroll_position: f32,
    /// Ruler length in device pixels; ticks past this are not emitted.
    pub ruler_length_px: f32,
}

/// Tick resolution in the active unit, plus how many resolution steps
/// make up one whole unit.
fn resolution(unit_system: UnitSystem, logical_scale: f32) -> (f32, i64) {
    match unit_system {
        UnitSystem::Imperial => {
            // Coarser at zoom-out (more inches per pixel), finer zoomed in.
            let res = if logical_scale > 0.05 {
                1.0
            } else if logical_scale > 0.025 {
                0.5
            } else if logical_scale > 0.0125 {
                0.25
            } else if logical_scale > 0.00625 {
                0.125
            } else {
                0.0625
            };
            (res, (1.0 / res).round() as i64)
        }
        UnitSystem::Metric => {
            let cm_per_px = logical_scale * CM_PER_INCH;
            if cm_per_px > METRIC_MM_THRESHOLD {
                (1.0, 1)
            } else {
                (0.1, 10)
            }
        }
    }
}

fn tier_for_index(unit_system: UnitSystem, whole_interval: i64, index: i64) -> TickTier {
    let rem = index.rem_euclid(whole_interval);
    if rem == 0 {
        return TickTier::WholeUnit;
    }

    match unit_system {
        UnitSystem::Metric => {
            if whole_interval == 10 && rem == 5 {
                TickTier::HalfUnit
            } else {
                TickTier::Millimeter
            }
        }
        UnitSystem::Imperial => {
            if whole_interval >= 2 && rem % (whole_interval / 2) == 0 {
                TickTier::HalfUnit
            } else if whole_interval >= 4 && rem % (whole_interval / 4) == 0 {
                TickTier::QuarterUnit
            } else if whole_interval >= 8 && rem % (whole_interval / 8) == 0 {
                TickTier::EighthUnit
            } else {
                TickTier::SixteenthUnit
            }
        }
    }
}

/// Compute every tick for one ruler draw.
///
/// The page origin sits at `page_offset - scroll_position` in device
/// space; tick index 0 is that origin and indexes count resolution steps
/// into the document, going negative left of it. Walking starts at the
/// first index whose device position is on the ruler and stops past
/// `ruler_length_px`, so ticks span the whole ruler even when the page
/// origin falls inside it; whole-unit labels left of the origin are
/// negative.
pub fn compute_ticks(params: &TickParams) -> Vec<RulerTick> {
    if params.logical_scale <= 0.0 || params.ruler_length_px <= 0.0 {
        return Vec::new();
    }

    let (res, whole_interval) = resolution(params.unit_system, params.logical_scale);
    let units_per_px = match params.unit_system {
        UnitSystem::Imperial => params.logical_scale,
        UnitSystem::Metric => params.logical_scale * CM_PER_INCH,
    };

    let step_px = res / units_per_px;
    if !step_px.is_finite() || step_px <= f32::EPSILON {
        return Vec::new();
    }

    // Negative indexes cover the ruler segment left of the page origin
    // when the page starts inside the ruler (a centered fit page).
    let origin_px = params.page_offset - params.scroll_position;
    let first_index = (-origin_px / step_px).ceil() as i64;

    let mut ticks = Vec::new();
    let mut index = first_index;
    loop {
        let device_pos = (origin_px + index as f32 * step_px).round();
        if device_pos > params.ruler_length_px {
            break;
        }

        let tier = tier_for_index(params.unit_system, whole_interval, index);
        let label = if tier == TickTier::WholeUnit {
            Some((index / whole_interval) as i32)
        } else {
            None
        };

        ticks.push(RulerTick { device_pos, tier, label });
        index += 1;
    }

    ticks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(unit_system: UnitSystem, logical_scale: f32) -> TickParams {
        TickParams {
            orientation: Orientation::Horizontal,
            unit_system,
            logical_scale,
            page_offset: 0.0,
            scroll_position: 0.0,
            ruler_length_px: 600.0,
        }
    }

    #[test]
    fn imperial_resolution_ladder() {
        assert_eq!(resolution(UnitSystem::Imperial, 0.06), (1.0, 1));
        assert_eq!(resolution(UnitSystem::Imperial, 0.03), (0.5, 2));
        assert_eq!(resolution(UnitSystem::Imperial, 0.02), (0.25, 4));
        assert_eq!(resolution(UnitSystem::Imperial, 0.01), (0.125, 8));
        assert_eq!(resolution(UnitSystem::Imperial, 0.005), (0.0625, 16));
    }

    #[test]
    fn metric_switches_to_millimeters_when_zoomed_in() {
        // 0.05 cm/px: centimeter ticks.
        let coarse = resolution(UnitSystem::Metric, 0.05 / CM_PER_INCH);
        assert_eq!(coarse, (1.0, 1));

        // 0.005 cm/px: millimeter ticks, ten per centimeter.
        let fine = resolution(UnitSystem::Metric, 0.005 / CM_PER_INCH);
        assert_eq!(fine, (0.1, 10));
    }

    #[test]
    fn ticks_are_periodic_in_device_space() {
        // 1/96 inch per pixel: 0.125in resolution, 12px steps.
        let ticks = compute_ticks(&params(UnitSystem::Imperial, 1.0 / 96.0));
        assert!(ticks.len() > 10);

        let step = ticks[1].device_pos - ticks[0].device_pos;
        assert!((step - 12.0).abs() <= 1.0);
        for pair in ticks.windows(2) {
            let gap = pair[1].device_pos - pair[0].device_pos;
            assert!((gap - step).abs() <= 1.0, "uneven gap {gap}");
        }
    }

    #[test]
    fn labels_count_whole_units_from_page_origin() {
        let ticks = compute_ticks(&params(UnitSystem::Imperial, 1.0 / 96.0));

        let labelled: Vec<(f32, i32)> = ticks
            .iter()
            .filter_map(|t| t.label.map(|l| (t.device_pos, l)))
            .collect();

        // 8 steps of 12px per inch: labels at 0, 96, 192, ...
        assert_eq!(labelled[0], (0.0, 0));
        assert_eq!(labelled[1], (96.0, 1));
        assert_eq!(labelled[2], (192.0, 2));
        for (pos, label) in &labelled {
            assert_eq!(*pos, *label as f32 * 96.0);
        }
    }

    #[test]
    fn only_the_offset_scroll_difference_matters() {
        let base = TickParams {
            page_offset: 40.0,
            scroll_position: 120.0,
            ..params(UnitSystem::Imperial, 1.0 / 96.0)
        };
        let shifted = TickParams {
            page_offset: base.page_offset + 777.0,
            scroll_position: base.scroll_position + 777.0,
            ..base
        };

        assert_eq!(compute_ticks(&base), compute_ticks(&shifted));
    }

    #[test]
    fn scrolled_past_origin_starts_at_first_visible_tick() {
        let p = TickParams {
            page_offset: 0.0,
            scroll_position: 100.0,
            ..params(UnitSystem::Imperial, 1.0 / 96.0)
        };
        let ticks = compute_ticks(&p);

        // Origin is at -100; first tick index is ceil(100/12) = 9,
        // at device position 8.
        assert_eq!(ticks[0].device_pos, 8.0);
        assert!(ticks.iter().all(|t| t.device_pos >= 0.0));

        // Labels keep counting from the page origin, not the ruler edge.
        let first_label = ticks.iter().find_map(|t| t.label).unwrap();
        assert_eq!(first_label, 2);
    }

    #[test]
    fn page_origin_inside_the_ruler_still_ticks_from_its_left_edge() {
        // A centered fit page: the origin sits 110px into the ruler.
        let p = TickParams {
            page_offset: 110.0,
            ..params(UnitSystem::Imperial, 1.0 / 96.0)
        };
        let ticks = compute_ticks(&p);

        // 12px steps from origin 110: first on-ruler index is -9, at 2px.
        assert_eq!(ticks[0].device_pos, 2.0);
        assert!(ticks.iter().all(|t| t.device_pos >= 0.0));

        // Whole-unit labels count from the page origin, negative left
        // of it: -1 at 14px, 0 at the origin itself.
        let labelled: Vec<(f32, i32)> = ticks
            .iter()
            .filter_map(|t| t.label.map(|l| (t.device_pos, l)))
            .collect();
        assert_eq!(labelled[0], (14.0, -1));
        assert_eq!(labelled[1], (110.0, 0));
        assert_eq!(labelled[2], (206.0, 1));
    }

    #[test]
    fn imperial_tiers_follow_submultiples() {
        let ticks = compute_ticks(&params(UnitSystem::Imperial, 1.0 / 96.0));
        // Eight steps per inch: whole, then eighth/quarter/half pattern.
        let tiers: Vec<TickTier> = ticks.iter().take(9).map(|t| t.tier).collect();
        assert_eq!(
            tiers,
            vec![
                TickTier::WholeUnit,
                TickTier::EighthUnit,
                TickTier::QuarterUnit,
                TickTier::EighthUnit,
                TickTier::HalfUnit,
                TickTier::EighthUnit,
                TickTier::QuarterUnit,
                TickTier::EighthUnit,
                TickTier::WholeUnit,
            ]
        );
    }

    #[test]
    fn metric_millimeter_tiers() {
        let ticks = compute_ticks(&params(UnitSystem::Metric, 0.005 / CM_PER_INCH));
        assert_eq!(ticks[0].tier, TickTier::WholeUnit);
        assert_eq!(ticks[1].tier, TickTier::Millimeter);
        assert_eq!(ticks[5].tier, TickTier::HalfUnit);
        assert_eq!(ticks[10].tier, TickTier::WholeUnit);
        assert_eq!(ticks[10].label, Some(1));
    }

    #[test]
    fn ticks_stop_at_ruler_length() {
        let mut p = params(UnitSystem::Imperial, 1.0 / 96.0);
        p.ruler_length_px = 100.0;
        let ticks = compute_ticks(&p);
        assert!(ticks.iter().all(|t| t.device_pos <= 100.0));
        assert!(!ticks.is_empty());
    }

    #[test]
    fn degenerate_inputs_produce_no_ticks() {
        assert!(compute_ticks(&params(UnitSystem::Imperial, 0.0)).is_empty());
        let mut p = params(UnitSystem::Metric, 1.0 / 96.0);
        p.ruler_length_px = 0.0;
        assert!(compute_ticks(&p).is_empty());
    }
}
