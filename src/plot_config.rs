use std::ops::Range;
use std::path::PathBuf;

pub const DEFAULT_TITLE: &str = "GG Experiment on SplitCifar100";

/// Legend labels for the three curves drawn in every subplot.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesLabels {
    pub regular: String,
    pub weighted: String,
    pub supervised: String,
}

impl Default for SeriesLabels {
    fn default() -> Self {
        Self {
            regular: "regular".to_string(),
            weighted: "weighted".to_string(),
            supervised: "upper bound".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Subplots per grid row.
    pub row_length: usize,
    pub y_range: Range<f64>,
    pub title: String,
    pub x_desc: String,
    pub y_desc: String,
    pub labels: SeriesLabels,
    /// Canvas size in pixels.
    pub size: (u32, u32),
    pub output_path: PathBuf,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            row_length: 3,
            y_range: 0.65..1.0,
            title: DEFAULT_TITLE.to_string(),
            x_desc: "Task ID".to_string(),
            y_desc: "Val Acc".to_string(),
            labels: SeriesLabels::default(),
            size: (2000, 2000),
            output_path: PathBuf::from("gg_experiment.png"),
        }
    }
}

impl PlotConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.row_length == 0 {
            return Err("row_length must be at least 1".to_string());
        }
        if self.size.0 == 0 || self.size.1 == 0 {
            return Err(format!(
                "canvas size must be non-zero, got {}x{}",
                self.size.0, self.size.1
            ));
        }
        if self.y_range.is_empty() {
            return Err(format!(
                "y range must be increasing, got {:?}",
                self.y_range
            ));
        }
        Ok(())
    }

    /// Sparsity subplot caption, e.g. `Sparsity - 50`.
    pub fn subplot_caption(&self, sparsity: u32) -> String {
        format!("Sparsity - {}", sparsity)
    }

    pub fn is_svg(&self) -> bool {
        self.output_path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plot_config_defaults() {
        let config = PlotConfig::default();

        assert_eq!(config.row_length, 3);
        assert_eq!(config.y_range, 0.65..1.0);
        assert_eq!(config.title, "GG Experiment on SplitCifar100");
        assert_eq!(config.x_desc, "Task ID");
        assert_eq!(config.y_desc, "Val Acc");
        assert_eq!(config.labels.supervised, "upper bound");
        assert_eq!(config.subplot_caption(50), "Sparsity - 50");
        assert!(config.validate().is_ok());
        assert!(!config.is_svg());
    }

    #[test]
    fn test_plot_config_rejects_degenerate_values() {
        let mut config = PlotConfig::default();
        config.row_length = 0;
        assert!(config.validate().is_err());

        let mut config = PlotConfig::default();
        config.y_range = 1.0..0.65;
        assert!(config.validate().is_err());

        let mut config = PlotConfig::default();
        config.size = (0, 800);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_svg_detection_by_extension() {
        let mut config = PlotConfig::default();
        config.output_path = PathBuf::from("figures/grid.SVG");
        assert!(config.is_svg());
    }
}
