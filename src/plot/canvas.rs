use std::path::PathBuf;

use tracing::info;

use crate::{config::PlotConfig, error::PlotResult, plot::figure::Figure};

/// Destination of figures that are "shown" rather than returned.
///
/// A canvas is the single rendering context of a plotting call; showing a
/// figure under a name that was used before replaces the earlier figure.
pub trait Canvas {
    /// Show `figure` under `name`.
    ///
    /// # Arguments
    ///
    /// * `name` - Stable figure name, e.g. `"trajectory"`. Doubles as the file stem
    ///   for canvases that write to disk.
    /// * `figure` - The figure to show. Only borrowed; canvases that keep it clone it.
    ///
    /// # Side Effects
    ///
    /// Replaces any figure previously shown under `name`.
    fn show(&mut self, name: &str, figure: &Figure) -> PlotResult<()>;
}

impl<C: Canvas + ?Sized> Canvas for &mut C {
    fn show(&mut self, name: &str, figure: &Figure) -> PlotResult<()> {
        (**self).show(name, figure)
    }
}

/// Renders each shown figure to `<output_dir>/<name>.<format>`.
#[derive(Debug, Clone, Default)]
pub struct FileCanvas {
    config: PlotConfig,
    written: Vec<PathBuf>,
}

impl FileCanvas {
    pub fn new(config: PlotConfig) -> Self {
        Self {
            config,
            written: Vec::new(),
        }
    }

    pub fn config(&self) -> &PlotConfig {
        &self.config
    }

    /// Paths written so far, in the order figures were shown.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Canvas for FileCanvas {
    fn show(&mut self, name: &str, figure: &Figure) -> PlotResult<()> {
        let path = self.config.path_for(name);
        figure.save(&path)?;
        info!(figure = name, path = %path.display(), "Figure written");
        if !self.written.contains(&path) {
            self.written.push(path);
        }
        Ok(())
    }
}

/// Keeps shown figures in memory, e.g. for embedding or inspection.
#[derive(Debug, Clone, Default)]
pub struct MemoryCanvas {
    figures: Vec<(String, Figure)>,
}

impl MemoryCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn figures(&self) -> &[(String, Figure)] {
        &self.figures
    }

    pub fn get(&self, name: &str) -> Option<&Figure> {
        self.figures
            .iter()
            .find_map(|(n, f)| (n == name).then_some(f))
    }

    pub fn into_figures(self) -> Vec<(String, Figure)> {
        self.figures
    }
}

impl Canvas for MemoryCanvas {
    fn show(&mut self, name: &str, figure: &Figure) -> PlotResult<()> {
        match self.figures.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = figure.clone(),
            None => self.figures.push((name.to_string(), figure.clone())),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_canvas_replaces_figures_shown_under_same_name() {
        let mut canvas = MemoryCanvas::new();
        canvas
            .show("pnl", &Figure::grid(1, 1))
            .expect("memory canvas never fails");
        canvas
            .show("pnl", &Figure::grid(2, 2))
            .expect("memory canvas never fails");
        canvas
            .show("actions", &Figure::grid(1, 1))
            .expect("memory canvas never fails");

        assert_eq!(canvas.figures().len(), 2);
        assert_eq!(canvas.get("pnl").map(Figure::shape), Some((2, 2)));
    }
}
