use std::{fs, path::Path};

use plotters::{
    coord::{Shift, types::RangedCoordf64},
    prelude::*,
};
use tracing::debug;

use crate::{
    config::OutputFormat,
    error::{IoError, PlotResult, RenderError},
    plot::figure::{Figure, Panel, Series, SeriesColor, YAxis},
};

type Cartesian = Cartesian2d<RangedCoordf64, RangedCoordf64>;

const FONT: &str = "sans-serif";

impl SeriesColor {
    fn rgb(self) -> RGBColor {
        match self {
            SeriesColor::Red => RED,
            SeriesColor::Blue => BLUE,
            SeriesColor::Black => BLACK,
            SeriesColor::Palette(i) => {
                let c = Palette99::pick(i).to_rgba();
                RGBColor(c.0, c.1, c.2)
            }
        }
    }
}

impl Figure {
    /// Render to `path`, picking the backend from the file extension.
    ///
    /// Parent directories are created as needed; an existing file is overwritten.
    pub fn save(&self, path: impl AsRef<Path>) -> PlotResult<()> {
        let path = path.as_ref();
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| IoError::UnsupportedFormat(path.display().to_string()))
            .and_then(|ext| {
                ext.to_ascii_lowercase()
                    .parse::<OutputFormat>()
                    .map_err(|_| IoError::UnsupportedFormat(ext.to_string()))
            })?;

        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            if !dir.exists() {
                fs::create_dir_all(dir).map_err(|e| {
                    IoError::FileSystem(format!(
                        "Failed to create directory {}: {}",
                        dir.display(),
                        e
                    ))
                })?;
            }
        }

        debug!(path = %path.display(), %format, "Rendering figure");
        match format {
            OutputFormat::Png => {
                let root = BitMapBackend::new(path, self.size).into_drawing_area();
                self.draw_on(&root)?;
                root.present()?;
            }
            OutputFormat::Svg => {
                let root = SVGBackend::new(path, self.size).into_drawing_area();
                self.draw_on(&root)?;
                root.present()?;
            }
        }
        Ok(())
    }

    /// Render to an in-memory SVG document.
    pub fn to_svg_string(&self) -> PlotResult<String> {
        let mut buf = String::new();
        {
            let root = SVGBackend::with_string(&mut buf, self.size).into_drawing_area();
            self.draw_on(&root)?;
            root.present()?;
        }
        Ok(buf)
    }

    /// Draw every panel onto `root`, split evenly into the figure's grid.
    pub fn draw_on<DB: DrawingBackend>(&self, root: &DrawingArea<DB, Shift>) -> PlotResult<()> {
        if self.panels().is_empty() {
            return Err(RenderError::EmptyFigure.into());
        }

        root.fill(&WHITE)?;
        let area = match &self.title {
            Some(title) => root.titled(title, (FONT, 28))?,
            None => root.clone(),
        };

        let (rows, cols) = self.shape();
        for (cell, panel) in area.split_evenly((rows, cols)).iter().zip(self.panels()) {
            draw_panel(cell, panel)?;
        }
        Ok(())
    }
}

fn draw_panel<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, panel: &Panel) -> PlotResult<()> {
    let x_range = panel.x_range();
    let y_range = panel.y_range(YAxis::Primary);

    let mut builder = ChartBuilder::on(area);
    builder
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60);
    if let Some(title) = &panel.title {
        builder.caption(title, (FONT, 20));
    }

    if panel.has_secondary_axis() {
        builder.right_y_label_area_size(60);
        let mut chart = builder
            .build_cartesian_2d(x_range.clone(), y_range)?
            .set_secondary_coord(x_range, panel.y_range(YAxis::Secondary));

        configure_mesh(&mut *chart, panel)?;
        {
            let mut secondary = chart.configure_secondary_axes();
            if let Some(desc) = &panel.secondary_y_desc {
                secondary.y_desc(desc);
            }
            secondary.draw()?;
        }

        for series in panel.series() {
            match (series, series.axis()) {
                (Series::Line(line), YAxis::Secondary) => {
                    let style = line.color.rgb().mix(line.alpha).stroke_width(2);
                    let anno = chart
                        .draw_secondary_series(LineSeries::new(line.points.iter().copied(), style))?;
                    if let Some(label) = &line.label {
                        anno.label(label)
                            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
                    }
                }
                _ => draw_series(&mut *chart, series)?,
            }
        }

        if panel.legend {
            draw_legend(&mut *chart)?;
        }
    } else {
        let mut chart = builder.build_cartesian_2d(x_range, y_range)?;
        configure_mesh(&mut chart, panel)?;
        for series in panel.series() {
            draw_series(&mut chart, series)?;
        }
        if panel.legend {
            draw_legend(&mut chart)?;
        }
    }

    Ok(())
}

fn configure_mesh<'a, DB: DrawingBackend + 'a>(
    chart: &mut ChartContext<'a, DB, Cartesian>,
    panel: &Panel,
) -> PlotResult<()> {
    let mut mesh = chart.configure_mesh();
    if let Some(desc) = &panel.x_desc {
        mesh.x_desc(desc);
    }
    if let Some(desc) = &panel.y_desc {
        mesh.y_desc(desc);
    }
    mesh.draw()?;
    Ok(())
}

fn draw_series<'a, DB: DrawingBackend + 'a>(
    chart: &mut ChartContext<'a, DB, Cartesian>,
    series: &Series,
) -> PlotResult<()> {
    match series {
        Series::Line(line) => {
            let style = line.color.rgb().mix(line.alpha).stroke_width(2);
            let anno = chart.draw_series(LineSeries::new(line.points.iter().copied(), style))?;
            if let Some(label) = &line.label {
                anno.label(label)
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], style));
            }
        }
        Series::Histogram(hist) => {
            let fill = hist.color.rgb().mix(hist.alpha).filled();
            let anno = chart.draw_series(
                hist.bins
                    .iter()
                    .map(|b| Rectangle::new([(b.start, 0.0), (b.end, b.value)], fill)),
            )?;
            if let Some(label) = &hist.label {
                anno.label(label)
                    .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], fill));
            }
        }
    }
    Ok(())
}

fn draw_legend<'a, DB: DrawingBackend + 'a>(
    chart: &mut ChartContext<'a, DB, Cartesian>,
) -> PlotResult<()> {
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    Ok(())
}
