// src/visualisation.rs

use std::path::Path;

use plotters::prelude::*;

use crate::error::{Error, Result};

/// Default fractional margin added above and below the data.
pub const DEFAULT_PAD_FRAC: f64 = 0.05;

/// numpy-style `isclose(a, b)` with default tolerances.
fn is_close(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-8 + 1e-5 * b.abs()
}

/// Closed vertical (or horizontal) axis interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub lo: f64,
    pub hi: f64,
}

impl AxisRange {
    /// A caller-fixed range, used as is.
    pub const fn fixed(lo: f64, hi: f64) -> Self {
        Self { lo, hi }
    }

    /// Data-driven range.
    ///
    /// A degenerate interval (min ≈ max) is first widened by 1 when it sits
    /// at zero and by 10% of |max| otherwise; the result is then padded by
    /// `pad_frac` of its span on both sides.
    pub fn padded(min: f64, max: f64, pad_frac: f64) -> Self {
        let (mut lo, mut hi) = (min, max);
        if is_close(lo, hi) {
            let delta = if hi == 0.0 { 1.0 } else { 0.1 * hi.abs() };
            lo -= delta;
            hi += delta;
        }
        let pad = (hi - lo) * pad_frac;
        Self {
            lo: lo - pad,
            hi: hi + pad,
        }
    }

    /// Like [`AxisRange::padded`] but centred on zero: `[-m, m]` with
    /// `m = max(|min|, |max|)` before padding.
    pub fn symmetric(min: f64, max: f64, pad_frac: f64) -> Self {
        let m = min.abs().max(max.abs());
        Self::padded(-m, m, pad_frac)
    }

    /// Global range over several sample arrays; empty arrays and non-finite
    /// samples are ignored. `None` when nothing is left.
    pub fn from_series<'a, I>(series: I, pad_frac: f64, symmetric: bool) -> Option<Self>
    where
        I: IntoIterator<Item = &'a ndarray::Array1<f64>>,
    {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for s in series {
            if let Some((a, b)) = crate::field::min_max(s) {
                lo = lo.min(a);
                hi = hi.max(b);
            }
        }
        if !lo.is_finite() || !hi.is_finite() {
            return None;
        }
        Some(if symmetric {
            Self::symmetric(lo, hi, pad_frac)
        } else {
            Self::padded(lo, hi, pad_frac)
        })
    }
}

/// One line of a [`LinePlot`].
#[derive(Debug, Clone)]
pub struct Curve {
    /// Legend entry; unlabeled curves get none.
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
}

/// Horizontal reference line (e.g. a mean value).
#[derive(Debug, Clone)]
pub struct RefLine {
    pub y: f64,
    pub label: String,
}

/// Everything needed to draw one static line chart.
#[derive(Debug, Clone)]
pub struct LinePlot {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub curves: Vec<Curve>,
    /// Fixed y range; computed from the data when `None`.
    pub y_range: Option<AxisRange>,
    pub reference: Option<RefLine>,
    /// Draw a marker on every sample.
    pub markers: bool,
}

impl LinePlot {
    pub fn new(
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
            curves: Vec::new(),
            y_range: None,
            reference: None,
            markers: false,
        }
    }

    pub fn curve(mut self, label: Option<&str>, points: Vec<(f64, f64)>) -> Self {
        self.curves.push(Curve {
            label: label.map(str::to_string),
            points,
        });
        self
    }

    pub fn y_range(mut self, range: AxisRange) -> Self {
        self.y_range = Some(range);
        self
    }

    pub fn reference(mut self, y: f64, label: impl Into<String>) -> Self {
        self.reference = Some(RefLine {
            y,
            label: label.into(),
        });
        self
    }

    pub fn with_markers(mut self) -> Self {
        self.markers = true;
        self
    }

    fn finite_points(&self) -> impl Iterator<Item = &(f64, f64)> {
        self.curves
            .iter()
            .flat_map(|c| c.points.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
    }

    /// x extent of the data, padded only if it is degenerate.
    pub fn x_extent(&self) -> AxisRange {
        let (lo, hi) = self
            .finite_points()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| {
                (lo.min(x), hi.max(x))
            });
        if !lo.is_finite() {
            return AxisRange::fixed(0.0, 1.0);
        }
        if is_close(lo, hi) {
            return AxisRange::padded(lo, hi, 0.0);
        }
        AxisRange::fixed(lo, hi)
    }

    /// The y range the plot will be drawn with.
    pub fn effective_y_range(&self) -> AxisRange {
        if let Some(r) = self.y_range {
            return r;
        }
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &(_, y) in self.finite_points() {
            lo = lo.min(y);
            hi = hi.max(y);
        }
        if let Some(r) = &self.reference {
            lo = lo.min(r.y);
            hi = hi.max(r.y);
        }
        if !lo.is_finite() || !hi.is_finite() {
            return AxisRange::fixed(-1.0, 1.0);
        }
        AxisRange::padded(lo, hi, DEFAULT_PAD_FRAC)
    }
}

/// Sink for rendered figures.
///
/// The pipelines only ever talk to this trait, so tests can record what
/// would have been drawn without touching a font or a bitmap.
pub trait PlotRenderer {
    fn render(&mut self, path: &Path, plot: &LinePlot) -> Result<()>;
}

/// PNG output through plotters' bitmap backend.
#[derive(Debug, Clone, Copy)]
pub struct BitmapRenderer {
    /// Image size in pixels.
    pub size: (u32, u32),
}

impl BitmapRenderer {
    pub fn new(size: (u32, u32)) -> Self {
        Self { size }
    }
}

impl Default for BitmapRenderer {
    fn default() -> Self {
        Self::new((1260, 720))
    }
}

impl PlotRenderer for BitmapRenderer {
    fn render(&mut self, path: &Path, plot: &LinePlot) -> Result<()> {
        draw_line_plot(path, plot, self.size).map_err(|e| Error::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

const PALETTE: [RGBColor; 5] = [BLUE, RED, GREEN, MAGENTA, BLACK];

fn draw_line_plot(
    path: &Path,
    plot: &LinePlot,
    size: (u32, u32),
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let x = plot.x_extent();
    let y = plot.effective_y_range();

    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(&plot.title, ("sans-serif", 28))
        .set_left_and_bottom_label_area_size(60)
        .build_cartesian_2d(x.lo..x.hi, y.lo..y.hi)?;

    chart
        .configure_mesh()
        .x_desc(plot.x_label.as_str())
        .y_desc(plot.y_label.as_str())
        .label_style(("sans-serif", 16))
        .axis_desc_style(("sans-serif", 18))
        .draw()?;

    let mut any_legend = false;
    for (k, curve) in plot.curves.iter().enumerate() {
        let color = PALETTE[k % PALETTE.len()];
        let series = chart.draw_series(LineSeries::new(
            curve.points.iter().copied(),
            color.stroke_width(2),
        ))?;
        if let Some(label) = &curve.label {
            any_legend = true;
            series
                .label(label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
        }
        if plot.markers {
            chart.draw_series(
                curve
                    .points
                    .iter()
                    .map(|&(px, py)| Circle::new((px, py), 4, color.filled())),
            )?;
        }
    }

    if let Some(r) = &plot.reference {
        any_legend = true;
        let style = BLACK.mix(0.6);
        chart
            .draw_series(LineSeries::new(vec![(x.lo, r.y), (x.hi, r.y)], style))?
            .label(r.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
    }

    if any_legend {
        chart
            .configure_series_labels()
            .border_style(&BLACK)
            .background_style(&WHITE.mix(0.8))
            .label_font(("sans-serif", 16))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn padded_range_strictly_contains_data() {
        let cases = [(0.0, 1.0), (-3.5, -1.0), (0.99, 1.01), (-1e-3, 2e4), (1.0, 1.0 + 1e-3)];
        for &(lo, hi) in &cases {
            let r = AxisRange::padded(lo, hi, DEFAULT_PAD_FRAC);
            assert!(r.lo < lo && r.hi > hi, "{lo}..{hi} -> {r:?}");
        }
    }

    #[test]
    fn padded_range_pads_five_percent_of_span() {
        let r = AxisRange::padded(1.0, 3.0, 0.05);
        assert!((r.lo - 0.9).abs() < 1e-12);
        assert!((r.hi - 3.1).abs() < 1e-12);
    }

    #[test]
    fn degenerate_range_is_widened() {
        // at zero: +-1 then 5% of 2
        let r = AxisRange::padded(0.0, 0.0, 0.05);
        assert!((r.lo + 1.1).abs() < 1e-12);
        assert!((r.hi - 1.1).abs() < 1e-12);

        // elsewhere: +-10% of |max| then 5% of the widened span
        let r = AxisRange::padded(2.0, 2.0, 0.05);
        assert!((r.lo - (1.8 - 0.02)).abs() < 1e-12);
        assert!((r.hi - (2.2 + 0.02)).abs() < 1e-12);
    }

    #[test]
    fn symmetric_range_is_centred() {
        let r = AxisRange::symmetric(-0.2, 0.5, 0.0);
        assert_eq!(r, AxisRange::fixed(-0.5, 0.5));
    }

    #[test]
    fn series_range_ignores_empty_arrays() {
        let a = array![1.0, 2.0];
        let empty = ndarray::Array1::<f64>::zeros(0);
        let b = array![-1.0, 0.5];
        let r = AxisRange::from_series([&a, &empty, &b], 0.0, false).unwrap();
        assert_eq!(r, AxisRange::fixed(-1.0, 2.0));
        assert!(AxisRange::from_series([&empty], 0.05, false).is_none());
    }

    #[test]
    fn plot_falls_back_to_data_range() {
        let p = LinePlot::new("t", "x", "y").curve(None, vec![(0.0, 1.0), (1.0, 3.0)]);
        let r = p.effective_y_range();
        assert!(r.lo < 1.0 && r.hi > 3.0);
        assert_eq!(p.x_extent(), AxisRange::fixed(0.0, 1.0));

        let fixed = p.clone().y_range(AxisRange::fixed(-1.0, 1.0));
        assert_eq!(fixed.effective_y_range(), AxisRange::fixed(-1.0, 1.0));
    }

    #[test]
    #[ignore = "needs system fonts"]
    fn bitmap_renderer_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bz_t00.png");
        let plot = LinePlot::new("Bz(z) at t = 0", "z", "Bz")
            .curve(Some("Bz"), vec![(0.0, 1.0), (0.5, 1.01), (1.0, 0.99)])
            .reference(1.0, "B0 ~ 1 (mean)")
            .with_markers();

        BitmapRenderer::new((320, 200)).render(&path, &plot).unwrap();
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn single_point_plot_has_non_degenerate_x_extent() {
        let p = LinePlot::new("t", "x", "y").curve(None, vec![(4.0, 1.0)]);
        let r = p.x_extent();
        assert!(r.lo < 4.0 && r.hi > 4.0);
    }
}
