use std::ops::Range;

use itertools::{Itertools, MinMaxResult};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::error::{PlotResult, RenderError};

/// Default figure size in pixels (a 20x10 inch canvas at 100 dpi).
pub const DEFAULT_FIGURE_SIZE: (u32, u32) = (2000, 1000);

// ================================================================================================
// Series
// ================================================================================================

/// Colour of a series. Mapped onto the drawing backend's palette at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesColor {
    Red,
    Blue,
    Black,
    /// Index into a qualitative palette, for one-colour-per-series charts.
    Palette(usize),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, EnumString, Display, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
pub enum YAxis {
    #[default]
    Primary,
    /// Right-hand axis with its own value range.
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSeries {
    pub label: Option<String>,
    pub points: Vec<(f64, f64)>,
    pub color: SeriesColor,
    pub alpha: f64,
    pub axis: YAxis,
}

impl LineSeries {
    /// Opaque primary-axis line over `xs` / `ys`, truncated to the shorter of the two.
    pub fn new<X, Y>(xs: X, ys: Y, color: SeriesColor) -> Self
    where
        X: IntoIterator<Item = f64>,
        Y: IntoIterator<Item = f64>,
    {
        Self {
            label: None,
            points: xs.into_iter().zip(ys).collect(),
            color,
            alpha: 1.0,
            axis: YAxis::Primary,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn on_axis(mut self, axis: YAxis) -> Self {
        self.axis = axis;
        self
    }

    pub fn ys(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|&(_, y)| y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    /// Bar height: a count or a density depending on how the series was built.
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSeries {
    pub label: Option<String>,
    pub bins: Vec<HistogramBin>,
    pub color: SeriesColor,
    pub alpha: f64,
}

impl HistogramSeries {
    /// Density histogram with `n_bins` equal-width bins over the sample's range.
    ///
    /// Bar heights are `count / (n * width)`, so the bars integrate to one.
    /// Non-finite samples are dropped. An empty sample yields no bins.
    pub fn density(values: &[f64], n_bins: usize, color: SeriesColor) -> Self {
        let finite = values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .collect::<Vec<_>>();

        let (lo, hi) = match finite.iter().copied().minmax_by(f64::total_cmp) {
            MinMaxResult::NoElements => {
                return Self {
                    label: None,
                    bins: Vec::new(),
                    color,
                    alpha: 0.6,
                };
            }
            MinMaxResult::OneElement(v) => (v - 0.5, v + 0.5),
            MinMaxResult::MinMax(lo, hi) if hi - lo <= f64::EPSILON * hi.abs().max(1.0) => {
                (lo - 0.5, hi + 0.5)
            }
            MinMaxResult::MinMax(lo, hi) => (lo, hi),
        };

        let n_bins = n_bins.max(1);
        let width = (hi - lo) / n_bins as f64;
        let mut counts = vec![0usize; n_bins];
        for v in &finite {
            // The upper edge belongs to the last bin.
            let idx = (((v - lo) / width) as usize).min(n_bins - 1);
            counts[idx] += 1;
        }

        let norm = finite.len() as f64 * width;
        let bins = counts
            .into_iter()
            .enumerate()
            .map(|(i, c)| HistogramBin {
                start: lo + i as f64 * width,
                end: lo + (i + 1) as f64 * width,
                value: c as f64 / norm,
            })
            .collect();

        Self {
            label: None,
            bins,
            color,
            alpha: 0.6,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sum of `value * width` across bins.
    pub fn area(&self) -> f64 {
        self.bins.iter().map(|b| b.value * (b.end - b.start)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Series {
    Line(LineSeries),
    Histogram(HistogramSeries),
}

impl Series {
    pub fn label(&self) -> Option<&str> {
        match self {
            Series::Line(l) => l.label.as_deref(),
            Series::Histogram(h) => h.label.as_deref(),
        }
    }

    pub fn axis(&self) -> YAxis {
        match self {
            Series::Line(l) => l.axis,
            Series::Histogram(_) => YAxis::Primary,
        }
    }

    pub fn as_line(&self) -> Option<&LineSeries> {
        match self {
            Series::Line(l) => Some(l),
            Series::Histogram(_) => None,
        }
    }

    pub fn as_histogram(&self) -> Option<&HistogramSeries> {
        match self {
            Series::Histogram(h) => Some(h),
            Series::Line(_) => None,
        }
    }

    fn x_extent(&self) -> impl Iterator<Item = f64> + '_ {
        let (line, hist) = match self {
            Series::Line(l) => (Some(l.points.iter().map(|&(x, _)| x)), None),
            Series::Histogram(h) => (
                None,
                Some(h.bins.iter().flat_map(|b| [b.start, b.end])),
            ),
        };
        line.into_iter().flatten().chain(hist.into_iter().flatten())
    }

    fn y_extent(&self) -> impl Iterator<Item = f64> + '_ {
        let (line, hist) = match self {
            Series::Line(l) => (Some(l.ys()), None),
            // Bars grow from zero.
            Series::Histogram(h) => (
                None,
                Some(std::iter::once(0.0).chain(h.bins.iter().map(|b| b.value))),
            ),
        };
        line.into_iter().flatten().chain(hist.into_iter().flatten())
    }
}

impl From<LineSeries> for Series {
    fn from(l: LineSeries) -> Self {
        Series::Line(l)
    }
}

impl From<HistogramSeries> for Series {
    fn from(h: HistogramSeries) -> Self {
        Series::Histogram(h)
    }
}

// ================================================================================================
// Panel
// ================================================================================================

/// One subplot of a [`Figure`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub title: Option<String>,
    pub x_desc: Option<String>,
    pub y_desc: Option<String>,
    pub secondary_y_desc: Option<String>,
    pub legend: bool,
    series: Vec<Series>,
}

impl Panel {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn set_x_desc(&mut self, desc: impl Into<String>) -> &mut Self {
        self.x_desc = Some(desc.into());
        self
    }

    pub fn set_y_desc(&mut self, desc: impl Into<String>) -> &mut Self {
        self.y_desc = Some(desc.into());
        self
    }

    pub fn set_secondary_y_desc(&mut self, desc: impl Into<String>) -> &mut Self {
        self.secondary_y_desc = Some(desc.into());
        self
    }

    pub fn show_legend(&mut self) -> &mut Self {
        self.legend = true;
        self
    }

    pub fn push(&mut self, series: impl Into<Series>) -> &mut Self {
        self.series.push(series.into());
        self
    }

    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn has_secondary_axis(&self) -> bool {
        self.series.iter().any(|s| s.axis() == YAxis::Secondary)
    }

    pub fn x_range(&self) -> Range<f64> {
        padded_range(self.series.iter().flat_map(|s| s.x_extent()), 0.0)
    }

    pub fn y_range(&self, axis: YAxis) -> Range<f64> {
        let has_hist = self.series.iter().any(|s| s.as_histogram().is_some());
        let range = padded_range(
            self.series
                .iter()
                .filter(|s| s.axis() == axis)
                .flat_map(|s| s.y_extent()),
            0.05,
        );
        if has_hist && axis == YAxis::Primary {
            // Keep the bar baseline on the axis.
            range.start.max(0.0)..range.end
        } else {
            range
        }
    }
}

/// Finite min..max of `values`, widened by `pad` of its span.
///
/// Degenerate inputs widen to a unit interval so the backend always gets a
/// non-empty range.
fn padded_range(values: impl Iterator<Item = f64>, pad: f64) -> Range<f64> {
    match values.filter(|v| v.is_finite()).minmax_by(f64::total_cmp) {
        MinMaxResult::NoElements => 0.0..1.0,
        MinMaxResult::OneElement(v) => (v - 0.5)..(v + 0.5),
        MinMaxResult::MinMax(lo, hi) if hi - lo <= f64::EPSILON * hi.abs().max(1.0) => {
            (lo - 0.5)..(hi + 0.5)
        }
        MinMaxResult::MinMax(lo, hi) => {
            let margin = (hi - lo) * pad;
            (lo - margin)..(hi + margin)
        }
    }
}

// ================================================================================================
// Figure
// ================================================================================================

/// A grid of panels, rendered on demand.
///
/// Building a figure never touches a drawing backend; rendering happens in
/// [`Figure::save`], [`Figure::to_svg_string`] or through a [`Canvas`](crate::plot::Canvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Figure {
    pub title: Option<String>,
    pub size: (u32, u32),
    rows: usize,
    cols: usize,
    panels: Vec<Panel>,
}

impl Default for Figure {
    fn default() -> Self {
        Self::grid(1, 1)
    }
}

impl Figure {
    /// Empty `rows x cols` grid, panels in row-major order.
    pub fn grid(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            title: None,
            size: DEFAULT_FIGURE_SIZE,
            rows,
            cols,
            panels: vec![Panel::default(); rows * cols],
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn panels_mut(&mut self) -> &mut [Panel] {
        &mut self.panels
    }

    pub fn panel(&self, index: usize) -> PlotResult<&Panel> {
        self.panels.get(index).ok_or_else(|| {
            RenderError::PanelOutOfBounds {
                index,
                rows: self.rows,
                cols: self.cols,
            }
            .into()
        })
    }

    pub fn panel_mut(&mut self, index: usize) -> PlotResult<&mut Panel> {
        let (rows, cols) = (self.rows, self.cols);
        self.panels
            .get_mut(index)
            .ok_or_else(|| RenderError::PanelOutOfBounds { index, rows, cols }.into())
    }

    /// All series across every panel, in panel order.
    pub fn series(&self) -> impl Iterator<Item = &Series> {
        self.panels.iter().flat_map(|p| p.series.iter())
    }

    pub fn histogram_count(&self) -> usize {
        self.series().filter(|s| s.as_histogram().is_some()).count()
    }

    pub fn line_count(&self) -> usize {
        self.series().filter(|s| s.as_line().is_some()).count()
    }
}
