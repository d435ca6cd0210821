//! Two-slice SLA pie chart as a static SVG.
//!
//! Slices start at twelve o'clock and run counter-clockwise, within first.

use crate::error::{AnalysisError, AnalysisResult};
use crate::model::ComplianceSummary;
use crate::templates::{self, CHART_TEMPLATE};
use crate::utils::format_percent;
use serde::Serialize;
use std::f64::consts::PI;

pub const CHART_WIDTH: u32 = 500;
pub const CHART_HEIGHT: u32 = 300;
pub const CHART_TITLE: &str = "SLA Compliance";
pub const BACKGROUND: &str = "#0e1117";

pub const WITHIN_LABEL: &str = "Within SLA";
pub const WITHIN_COLOR: &str = "#2ecc71";
pub const BREACHED_LABEL: &str = "Past SLA";
pub const BREACHED_COLOR: &str = "#e74c3c";

const CENTER_X: f64 = CHART_WIDTH as f64 / 2.0;
const CENTER_Y: f64 = 165.0;
const RADIUS: f64 = 110.0;
const TITLE_Y: f64 = 28.0;
const START_ANGLE_DEG: f64 = 90.0;
const PERCENT_RADIUS: f64 = 0.6;
const LABEL_RADIUS: f64 = 1.12;

#[derive(Debug, Clone, Serialize)]
struct SliceView {
    label: &'static str,
    color: &'static str,
    count: usize,
    percent: String,
    full: bool,
    path: Option<String>,
    label_x: String,
    label_y: String,
    label_anchor: &'static str,
    percent_x: String,
    percent_y: String,
}

#[derive(Debug, Clone, Serialize)]
struct ChartView {
    width: u32,
    height: u32,
    background: &'static str,
    title: &'static str,
    title_y: String,
    center_x: String,
    center_y: String,
    radius: String,
    slices: Vec<SliceView>,
}

fn coord(value: f64) -> String {
    format!("{value:.2}")
}

/// Point on the circle of `radius` at `degrees`, counter-clockwise from
/// three o'clock, in SVG (y-down) space.
fn point(radius: f64, degrees: f64) -> (f64, f64) {
    let radians = degrees * PI / 180.0;
    (CENTER_X + radius * radians.cos(), CENTER_Y - radius * radians.sin())
}

fn wedge_path(start_deg: f64, sweep_deg: f64) -> String {
    let (x0, y0) = point(RADIUS, start_deg);
    let (x1, y1) = point(RADIUS, start_deg + sweep_deg);
    let large_arc = if sweep_deg > 180.0 { 1 } else { 0 };
    format!(
        "M {} {} L {} {} A {} {} 0 {} 0 {} {} Z",
        coord(CENTER_X),
        coord(CENTER_Y),
        coord(x0),
        coord(y0),
        coord(RADIUS),
        coord(RADIUS),
        large_arc,
        coord(x1),
        coord(y1),
    )
}

fn slice_view(
    label: &'static str,
    color: &'static str,
    count: usize,
    total: usize,
    start_deg: f64,
) -> SliceView {
    let share = count as f64 / total as f64;
    let sweep = share * 360.0;
    let mid = start_deg + sweep / 2.0;
    let (label_x, label_y) = point(RADIUS * LABEL_RADIUS, mid);
    let (percent_x, percent_y) = if count == total {
        (CENTER_X, CENTER_Y)
    } else {
        point(RADIUS * PERCENT_RADIUS, mid)
    };
    let label_anchor = if label_x < CENTER_X - 1.0 {
        "end"
    } else if label_x > CENTER_X + 1.0 {
        "start"
    } else {
        "middle"
    };

    SliceView {
        label,
        color,
        count,
        percent: format_percent(share),
        full: count == total,
        path: (count > 0 && count < total).then(|| wedge_path(start_deg, sweep)),
        label_x: coord(label_x),
        label_y: coord(label_y),
        label_anchor,
        percent_x: coord(percent_x),
        percent_y: coord(percent_y),
    }
}

/// Renders the within/past proportions of `summary` as SVG markup.
pub fn render_chart(summary: &ComplianceSummary) -> AnalysisResult<String> {
    if summary.total == 0 {
        return Err(AnalysisError::EmptyWorkingSet);
    }

    let within = slice_view(
        WITHIN_LABEL,
        WITHIN_COLOR,
        summary.within_count,
        summary.total,
        START_ANGLE_DEG,
    );
    let within_sweep = summary.within_count as f64 / summary.total as f64 * 360.0;
    let breached = slice_view(
        BREACHED_LABEL,
        BREACHED_COLOR,
        summary.breached_count,
        summary.total,
        START_ANGLE_DEG + within_sweep,
    );

    let view = ChartView {
        width: CHART_WIDTH,
        height: CHART_HEIGHT,
        background: BACKGROUND,
        title: CHART_TITLE,
        title_y: coord(TITLE_Y),
        center_x: coord(CENTER_X),
        center_y: coord(CENTER_Y),
        radius: coord(RADIUS),
        slices: vec![within, breached],
    };

    templates::render(CHART_TEMPLATE, &view).map_err(|err| AnalysisError::Chart(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(within: usize, breached: usize) -> ComplianceSummary {
        let total = within + breached;
        let breached_rate = breached as f64 / total as f64;
        ComplianceSummary {
            total,
            within_count: within,
            breached_count: breached,
            average_elapsed_hours: 0.0,
            breached_rate,
            compliance_rate: 1.0 - breached_rate,
        }
    }

    #[test]
    fn half_and_half_has_two_wedges_and_labels() {
        let svg = render_chart(&summary(1, 1)).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("viewBox=\"0 0 500 300\""));
        assert!(svg.contains(CHART_TITLE));
        assert_eq!(svg.matches("<path").count(), 2);
        assert_eq!(svg.matches("50.00%").count(), 2);
        assert!(svg.contains(WITHIN_COLOR));
        assert!(svg.contains(BREACHED_COLOR));
        assert!(svg.contains(WITHIN_LABEL));
        assert!(svg.contains(BREACHED_LABEL));
    }

    #[test]
    fn shares_use_two_decimals() {
        let svg = render_chart(&summary(2, 1)).unwrap();
        assert!(svg.contains("66.67%"));
        assert!(svg.contains("33.33%"));
    }

    #[test]
    fn full_compliance_is_a_disc() {
        let svg = render_chart(&summary(4, 0)).unwrap();
        assert!(svg.contains("<circle"));
        assert_eq!(svg.matches("<path").count(), 0);
        assert!(svg.contains("100.00%"));
        assert!(!svg.contains(BREACHED_LABEL));
    }

    #[test]
    fn first_wedge_starts_at_twelve_o_clock() {
        let path = wedge_path(START_ANGLE_DEG, 90.0);
        assert!(path.starts_with("M 250.00 165.00 L 250.00 55.00"), "{path}");
        assert!(path.contains(" 0 0 0 140.00 165.00 Z"), "{path}");
    }

    #[test]
    fn rendering_is_deterministic() {
        let a = render_chart(&summary(7, 3)).unwrap();
        let b = render_chart(&summary(7, 3)).unwrap();
        assert_eq!(a, b);
    }
}
