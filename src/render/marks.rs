//! Mark helpers shared by the report drawers: step lines, scatter, error bars,
//! stacked bars, legends.

use plotters::prelude::*;

use crate::render::Panel;
use crate::utils::error::{ReportError, Result};

/// Series colours, picked by index and wrapping around.
pub const PALETTE: [RGBColor; 8] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
];

pub fn color(i: usize) -> RGBColor {
    PALETTE[i % PALETTE.len()]
}

/// Expands points into a post-step outline: each value holds until the next timestamp.
pub fn step_points(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(points.len() * 2);
    for (i, &(t, v)) in points.iter().enumerate() {
        if i > 0 {
            out.push((t, points[i - 1].1));
        }
        out.push((t, v));
    }
    out
}

pub fn line(panel: &mut Panel<'_, '_>, points: &[(f64, f64)], c: RGBColor, label: &str) -> Result<()> {
    panel
        .draw_series(LineSeries::new(points.iter().copied(), c.stroke_width(2)))
        .map_err(ReportError::render)?
        .label(label)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 16, y)], c.stroke_width(2)));
    Ok(())
}

pub fn step(panel: &mut Panel<'_, '_>, points: &[(f64, f64)], c: RGBColor, label: &str) -> Result<()> {
    line(panel, &step_points(points), c, label)
}

pub fn scatter(panel: &mut Panel<'_, '_>, points: &[(f64, f64)], c: RGBColor, label: &str) -> Result<()> {
    panel
        .draw_series(points.iter().map(|&p| Circle::new(p, 2, c.filled())))
        .map_err(ReportError::render)?
        .label(label)
        .legend(move |(x, y)| Circle::new((x + 8, y), 3, c.filled()));
    Ok(())
}

/// Vertical lines from zero up to each value.
pub fn stems(panel: &mut Panel<'_, '_>, points: &[(f64, f64)], c: RGBColor, label: &str) -> Result<()> {
    panel
        .draw_series(
            points
                .iter()
                .map(|&(t, v)| PathElement::new(vec![(t, 0.0), (t, v)], c.stroke_width(1))),
        )
        .map_err(ReportError::render)?
        .label(label)
        .legend(move |(x, y)| PathElement::new(vec![(x + 8, y - 6), (x + 8, y + 6)], c));
    Ok(())
}

/// `(x, mean, error)` triples drawn as `mean ± error`; rows with a NaN error are skipped.
pub fn error_bars(panel: &mut Panel<'_, '_>, rows: &[(f64, f64, f64)], c: RGBColor) -> Result<()> {
    panel
        .draw_series(
            rows.iter()
                .filter(|(_, m, e)| m.is_finite() && e.is_finite())
                .map(|&(x, m, e)| ErrorBar::new_vertical(x, (m - e).max(0.0), m, m + e, c.filled(), 6)),
        )
        .map_err(ReportError::render)?;
    Ok(())
}

/// Stacked bars of unit width starting at each x; `layers[i]` holds one
/// height per x, absent heights count as zero.
pub fn stacked_bars(
    panel: &mut Panel<'_, '_>,
    xs: &[f64],
    layers: &[(&str, &[Option<f64>])],
) -> Result<()> {
    let mut base = vec![0.0; xs.len()];
    for (i, (label, heights)) in layers.iter().enumerate() {
        let c = color(i);
        let bars: Vec<_> = xs
            .iter()
            .zip(heights.iter())
            .zip(base.iter_mut())
            .map(|((&x, h), b)| {
                let bottom = *b;
                *b += h.filter(|v| v.is_finite()).unwrap_or(0.0);
                Rectangle::new([(x, bottom), (x + 0.9, *b)], c.filled())
            })
            .collect();
        panel
            .draw_series(bars)
            .map_err(ReportError::render)?
            .label(*label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 4), (x + 12, y + 4)], c.filled()));
    }
    Ok(())
}

/// Series labels need the backend to outlive the chart borrow, hence `'b: 'a`.
pub fn legend<'a, 'b: 'a>(panel: &mut Panel<'a, 'b>) -> Result<()> {
    panel
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(ReportError::render)
}
