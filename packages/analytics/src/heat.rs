//! Heat map colors for the selected metric.
//!
//! A linear scale over the 9-class `ColorBrewer` `OrRd` palette, stretched
//! from the smallest to the largest metric value among the regions being
//! drawn.

use student_map_analytics_models::{AggregatedRegion, HeatLegend, Metric, RegionStyle};

/// `OrRd` palette stops, light to dark.
pub const ORRD_9: [[u8; 3]; 9] = [
    [0xff, 0xf7, 0xec],
    [0xfe, 0xe8, 0xc8],
    [0xfd, 0xd4, 0x9e],
    [0xfd, 0xbb, 0x84],
    [0xfc, 0x8d, 0x59],
    [0xef, 0x65, 0x48],
    [0xd7, 0x30, 0x1f],
    [0xb3, 0x00, 0x00],
    [0x7f, 0x00, 0x00],
];

/// Fill opacity of shaded regions.
pub const HEAT_OPACITY: f64 = 0.7;

/// Fill color when the overlay is off.
pub const PLAIN_FILL: &str = "#3388ff";

/// Fill opacity when the overlay is off.
pub const PLAIN_OPACITY: f64 = 0.2;

/// Fill color for a region whose metric is missing.
pub const MISSING_FILL: &str = "#cccccc";

/// A min..max color scale for one metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatScale {
    /// The metric being shaded.
    pub metric: Metric,
    /// Value mapped to the first stop.
    pub min: f64,
    /// Value mapped to the last stop.
    pub max: f64,
}

impl HeatScale {
    /// Fits a scale to the finite metric values of `regions`; `None` when
    /// there are none.
    #[must_use]
    pub fn fit(regions: &[AggregatedRegion], metric: Metric) -> Option<Self> {
        let mut values = regions
            .iter()
            .map(|r| metric.value(&r.estimate))
            .filter(|v| v.is_finite());

        let first = values.next()?;
        let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));

        Some(Self { metric, min, max })
    }

    /// The color for a value. Values outside the scale clamp to the end
    /// stops; a degenerate scale maps everything to the first stop.
    #[must_use]
    pub fn color(&self, value: f64) -> String {
        if value.is_nan() {
            return MISSING_FILL.to_string();
        }

        let span = self.max - self.min;
        let t = if span > 0.0 {
            ((value - self.min) / span).clamp(0.0, 1.0)
        } else {
            0.0
        };

        hex(interpolate(t))
    }

    /// Legend for the map.
    #[must_use]
    pub fn legend(&self) -> HeatLegend {
        HeatLegend {
            caption: self.metric.label().to_string(),
            min: self.min,
            max: self.max,
            colors: ORRD_9.iter().copied().map(hex).collect(),
        }
    }
}

/// Styles every region, in order. With the overlay off every region gets
/// the plain fill and no legend is produced.
#[must_use]
pub fn style_regions(
    regions: &[AggregatedRegion],
    metric: Metric,
    show_heat_overlay: bool,
) -> (Vec<RegionStyle>, Option<HeatLegend>) {
    let scale = show_heat_overlay
        .then(|| HeatScale::fit(regions, metric))
        .flatten();

    let Some(scale) = scale else {
        let plain = RegionStyle {
            fill_color: PLAIN_FILL.to_string(),
            fill_opacity: PLAIN_OPACITY,
        };
        return (vec![plain; regions.len()], None);
    };

    let styles = regions
        .iter()
        .map(|r| RegionStyle {
            fill_color: scale.color(metric.value(&r.estimate)),
            fill_opacity: HEAT_OPACITY,
        })
        .collect();

    (styles, Some(scale.legend()))
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn interpolate(t: f64) -> [u8; 3] {
    let last = ORRD_9.len() - 1;
    let position = t * last as f64;
    let lower = (position.floor() as usize).min(last);
    let upper = (lower + 1).min(last);
    let frac = position - lower as f64;

    let mut rgb = [0_u8; 3];
    for (channel, out) in rgb.iter_mut().enumerate() {
        let a = f64::from(ORRD_9[lower][channel]);
        let b = f64::from(ORRD_9[upper][channel]);
        *out = (b - a).mul_add(frac, a).round() as u8;
    }
    rgb
}

fn hex([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;
    use student_map_demographics_models::StudentEstimate;

    use super::*;

    fn region(total: f64) -> AggregatedRegion {
        AggregatedRegion {
            label: format!("r{total}"),
            neighborhood: None,
            geometry: MultiPolygon(Vec::new()),
            estimate: StudentEstimate {
                total,
                white: total / 2.0,
                non_white: total / 2.0,
            },
            tract_count: 1,
        }
    }

    #[test]
    fn ends_of_scale_hit_end_stops() {
        let regions = [region(2.0), region(7.0), region(12.0)];
        let scale = HeatScale::fit(&regions, Metric::Total).unwrap();
        assert!((scale.min - 2.0).abs() < f64::EPSILON);
        assert!((scale.max - 12.0).abs() < f64::EPSILON);
        assert_eq!(scale.color(2.0), "#fff7ec");
        assert_eq!(scale.color(12.0), "#7f0000");
        assert_eq!(scale.color(7.0), "#fc8d59");
    }

    #[test]
    fn interpolates_between_stops() {
        let scale = HeatScale {
            metric: Metric::Total,
            min: 0.0,
            max: 16.0,
        };
        // Halfway between #fff7ec and #fee8c8.
        assert_eq!(scale.color(1.0), "#fff0da");
    }

    #[test]
    fn degenerate_scale_uses_first_stop() {
        let regions = [region(5.0), region(5.0)];
        let scale = HeatScale::fit(&regions, Metric::Total).unwrap();
        assert_eq!(scale.color(5.0), "#fff7ec");
    }

    #[test]
    fn out_of_range_and_missing_values() {
        let scale = HeatScale {
            metric: Metric::Total,
            min: 0.0,
            max: 1.0,
        };
        assert_eq!(scale.color(-5.0), "#fff7ec");
        assert_eq!(scale.color(5.0), "#7f0000");
        assert_eq!(scale.color(f64::NAN), MISSING_FILL);
    }

    #[test]
    fn fit_ignores_nan_and_needs_a_value() {
        let scale = HeatScale::fit(&[region(f64::NAN), region(3.0)], Metric::White).unwrap();
        assert!((scale.min - 1.5).abs() < f64::EPSILON);
        assert!(HeatScale::fit(&[region(f64::NAN)], Metric::Total).is_none());
        assert!(HeatScale::fit(&[], Metric::Total).is_none());
    }

    #[test]
    fn overlay_off_uses_plain_fill() {
        let regions = [region(1.0), region(2.0)];
        let (styles, legend) = style_regions(&regions, Metric::Total, false);
        assert!(legend.is_none());
        assert_eq!(styles.len(), 2);
        assert!(styles.iter().all(|s| s.fill_color == PLAIN_FILL));
        assert!(styles.iter().all(|s| (s.fill_opacity - PLAIN_OPACITY).abs() < f64::EPSILON));
    }

    #[test]
    fn overlay_on_shades_and_captions() {
        let regions = [region(1.0), region(2.0)];
        let (styles, legend) = style_regions(&regions, Metric::NonWhite, true);
        let legend = legend.unwrap();
        assert_eq!(legend.caption, "Non-White Students");
        assert_eq!(legend.colors.len(), 9);
        assert_eq!(styles[0].fill_color, "#fff7ec");
        assert_eq!(styles[1].fill_color, "#7f0000");
        assert!((styles[0].fill_opacity - HEAT_OPACITY).abs() < f64::EPSILON);
    }
}
