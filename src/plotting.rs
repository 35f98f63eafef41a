use plotters::coord::Shift;
use plotters::prelude::*;
use std::ops::Range;
use tracing::{debug, info};

use crate::error::{PlotError, ShapeError};
use crate::plot_config::PlotConfig;
use crate::results::{ResultTable, BASELINE_SPARSITY};

/// Matplotlib's second default cycle colour.
const TAB_ORANGE: RGBColor = RGBColor(255, 127, 14);

/// Position of sparsity panels in a fixed-width grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    pub rows: usize,
    pub row_length: usize,
    pub panels: usize,
}

impl GridLayout {
    /// `ceil(panels / row_length)` grid rows; trailing cells stay empty.
    pub fn new(panels: usize, row_length: usize) -> Self {
        let row_length = row_length.max(1);
        Self {
            rows: panels.div_ceil(row_length),
            row_length,
            panels,
        }
    }

    pub fn cells(&self) -> usize {
        self.rows * self.row_length
    }

    /// (grid row, grid column) of the panel at `index`.
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.row_length, index % self.row_length)
    }

    pub fn empty_cells(&self) -> usize {
        self.cells() - self.panels
    }
}

/// One labelled curve of (task id, score) points, broken into runs at
/// missing cells so no line is drawn across a gap.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub runs: Vec<Vec<(f64, f64)>>,
}

impl Series {
    fn from_row(label: &str, table: &ResultTable, sparsity: u32) -> Self {
        let mut runs: Vec<Vec<(f64, f64)>> = Vec::new();
        let mut current = Vec::new();
        for (&task, score) in table.columns().iter().zip(table.row(sparsity)) {
            match score {
                Some(score) => current.push((f64::from(task), score)),
                None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        Self {
            label: label.to_string(),
            runs,
        }
    }

    pub fn point_count(&self) -> usize {
        self.runs.iter().map(Vec::len).sum()
    }
}

/// Subplot for one sparsity level: regular, weighted, upper bound.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub sparsity: u32,
    pub caption: String,
    pub series: Vec<Series>,
}

/// Everything needed to draw the figure, computed before any rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FigurePlan {
    pub title: String,
    pub layout: GridLayout,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
    pub panels: Vec<Panel>,
}

/// Check that the three tables can share one figure.
pub fn check_shapes(
    regular: &ResultTable,
    weighted: &ResultTable,
    supervised: &ResultTable,
) -> Result<(), ShapeError> {
    if regular.columns() != weighted.columns() {
        return Err(ShapeError::ColumnMismatch {
            left: "regular",
            right: "weighted",
            left_columns: regular.columns().to_vec(),
            right_columns: weighted.columns().to_vec(),
        });
    }
    if regular.columns() != supervised.columns() {
        return Err(ShapeError::ColumnMismatch {
            left: "regular",
            right: "supervised",
            left_columns: regular.columns().to_vec(),
            right_columns: supervised.columns().to_vec(),
        });
    }
    if regular.rows() != weighted.rows() {
        return Err(ShapeError::RowMismatch {
            left: "regular",
            right: "weighted",
            left_rows: regular.rows().to_vec(),
            right_rows: weighted.rows().to_vec(),
        });
    }
    match supervised.rows() {
        [BASELINE_SPARSITY] => Ok(()),
        [other] => Err(ShapeError::SupervisedNotBaseline(*other)),
        rows => Err(ShapeError::SupervisedRows(rows.len())),
    }
}

fn task_range(columns: &[u32]) -> Range<f64> {
    let min = columns.iter().copied().min().map(f64::from).unwrap_or(0.0);
    let max = columns.iter().copied().max().map(f64::from).unwrap_or(0.0);
    if max > min {
        min..max
    } else {
        (min - 0.5)..(max + 0.5)
    }
}

/// Build the panel grid: one panel per regular/weighted sparsity row, each
/// carrying the single supervised row as its upper bound.
pub fn plan_figure(
    regular: &ResultTable,
    weighted: &ResultTable,
    supervised: &ResultTable,
    config: &PlotConfig,
) -> Result<FigurePlan, ShapeError> {
    check_shapes(regular, weighted, supervised)?;

    let upper_bound = Series::from_row(&config.labels.supervised, supervised, BASELINE_SPARSITY);

    let panels: Vec<Panel> = regular
        .rows()
        .iter()
        .map(|&sparsity| Panel {
            sparsity,
            caption: config.subplot_caption(sparsity),
            series: vec![
                Series::from_row(&config.labels.regular, regular, sparsity),
                Series::from_row(&config.labels.weighted, weighted, sparsity),
                upper_bound.clone(),
            ],
        })
        .collect();

    let layout = GridLayout::new(panels.len(), config.row_length);
    debug!(
        panels = layout.panels,
        grid_rows = layout.rows,
        empty_cells = layout.empty_cells(),
        "planned figure grid"
    );

    Ok(FigurePlan {
        title: config.title.clone(),
        layout,
        x_range: task_range(regular.columns()),
        y_range: config.y_range.clone(),
        panels,
    })
}

type DrawResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    plan: &FigurePlan,
    config: &PlotConfig,
) -> DrawResult
where
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let body = root.titled(&plan.title, ("sans-serif", 60).into_font())?;
    let cells = body.split_evenly((plan.layout.rows, plan.layout.row_length));

    let colors = [&BLUE, &TAB_ORANGE, &GREEN];

    for (panel, area) in plan.panels.iter().zip(cells.iter()) {
        let mut chart = ChartBuilder::on(area)
            .caption(&panel.caption, ("sans-serif", 30).into_font())
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(plan.x_range.clone(), plan.y_range.clone())?;

        chart
            .configure_mesh()
            .x_desc(config.x_desc.as_str())
            .y_desc(config.y_desc.as_str())
            .draw()?;

        for (idx, series) in panel.series.iter().enumerate() {
            let color = colors[idx % colors.len()];
            // The legend entry hangs off the first run; an all-empty row still gets one.
            let mut runs = series.runs.iter();
            let first = runs.next().map(Vec::as_slice).unwrap_or(&[]);
            chart
                .draw_series(LineSeries::new(first.iter().copied(), color))?
                .label(series.label.as_str())
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
            for run in runs {
                chart.draw_series(LineSeries::new(run.iter().copied(), color))?;
            }
        }

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Render a planned figure to `config.output_path` (SVG for `.svg`, bitmap otherwise).
pub fn render_figure(plan: &FigurePlan, config: &PlotConfig) -> Result<(), PlotError> {
    let path = &config.output_path;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| PlotError::OutputDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let drawn = if config.is_svg() {
        draw_figure(&SVGBackend::new(path, config.size).into_drawing_area(), plan, config)
    } else {
        draw_figure(&BitMapBackend::new(path, config.size).into_drawing_area(), plan, config)
    };
    drawn.map_err(|source| PlotError::Render {
        path: path.clone(),
        source,
    })?;

    info!(path = %config.output_path.display(), "figure rendered");
    Ok(())
}

/// Plot regular vs weighted vs supervised accuracy, one subplot per sparsity.
/// Shapes are checked before anything is drawn.
pub fn plot_figure(
    regular: &ResultTable,
    weighted: &ResultTable,
    supervised: &ResultTable,
    config: &PlotConfig,
) -> Result<FigurePlan, PlotError> {
    config.validate().map_err(PlotError::Config)?;
    let plan = plan_figure(regular, weighted, supervised, config)?;
    render_figure(&plan, config)?;
    println!(
        "📊 Sparsity grid plot saved to: {}",
        config.output_path.display()
    );
    Ok(plan)
}
