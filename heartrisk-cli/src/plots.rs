use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use heartrisk::metrics::{ConfusionMatrix, ReceiverOperatingCharacteristic};
use heartrisk_datasets::Table;
use plotly::common::{ColorScale, ColorScalePalette, DashType, Line, Marker, Mode};
use plotly::layout::{Axis, GridPattern, Layout, LayoutGrid};
use plotly::{HeatMap, Histogram, Plot, Scatter};

/// Subplots per row of the histogram grid
const GRID_COLUMNS: usize = 4;

/// One histogram per column of the table, laid out in a grid
pub fn histograms(table: &Table, bins: usize) -> Plot {
    let mut plot = Plot::new();
    for (idx, name) in table.column_names().iter().enumerate() {
        let values = table
            .values()
            .column(idx)
            .iter()
            .copied()
            .filter(|x| !x.is_nan())
            .collect::<Vec<_>>();

        let trace = Histogram::new(values)
            .name(name)
            .n_bins_x(bins)
            .x_axis(&format!("x{}", idx + 1))
            .y_axis(&format!("y{}", idx + 1));
        plot.add_trace(trace);
    }

    let rows = (table.ncols() + GRID_COLUMNS - 1) / GRID_COLUMNS;
    plot.set_layout(
        Layout::new()
            .title("Distribution of the cleaned columns")
            .height(250 * rows.max(1))
            .grid(
                LayoutGrid::new()
                    .rows(rows.max(1))
                    .columns(GRID_COLUMNS)
                    .pattern(GridPattern::Independent),
            ),
    );
    plot
}

/// Number of patients per class of the target
pub fn target_histogram(targets: &[usize], target: &str) -> Plot {
    let trace = Histogram::new(targets.to_vec())
        .name(target)
        .marker(Marker::new().color("blue"));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(
        Layout::new()
            .title("Histogram of patients heart disease distribution")
            .x_axis(Axis::new().title(target))
            .y_axis(Axis::new().title("Number of Patients")),
    );
    plot
}

/// Heatmap of a confusion matrix, true classes as rows and predictions as columns
pub fn confusion_heatmap(cm: &ConfusionMatrix<usize>, title: &str) -> Plot {
    let predicted = cm
        .members()
        .iter()
        .map(|class| format!("Predicted:{}", class))
        .collect::<Vec<_>>();
    let actual = cm
        .members()
        .iter()
        .map(|class| format!("Actual:{}", class))
        .collect::<Vec<_>>();
    let counts = cm
        .matrix()
        .rows()
        .into_iter()
        .map(|row| row.to_vec())
        .collect::<Vec<_>>();

    let trace = HeatMap::new(predicted, actual, counts)
        .color_scale(ColorScale::Palette(ColorScalePalette::YlGnBu));

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(Layout::new().title(title));
    plot
}

/// Receiver operating characteristic together with the diagonal of a random classifier
pub fn roc_curve(roc: &ReceiverOperatingCharacteristic<f64>) -> Plot {
    let (fpr, tpr): (Vec<f64>, Vec<f64>) = roc.get_curve().into_iter().unzip();

    let curve = Scatter::new(fpr, tpr)
        .mode(Mode::Lines)
        .name(&format!("AUC = {:.3}", roc.area_under_curve()));
    let chance = Scatter::new(vec![0.0, 1.0], vec![0.0, 1.0])
        .mode(Mode::Lines)
        .name("chance")
        .line(Line::new().color("grey").dash(DashType::Dash));

    let mut plot = Plot::new();
    plot.add_trace(curve);
    plot.add_trace(chance);
    plot.set_layout(
        Layout::new()
            .title("ROC curve for Heart disease classifier")
            .x_axis(
                Axis::new()
                    .title("False positive rate (1-Specificity)")
                    .range(vec![0.0, 1.0])
                    .show_grid(true),
            )
            .y_axis(
                Axis::new()
                    .title("True positive rate (Sensitivity)")
                    .range(vec![0.0, 1.0])
                    .show_grid(true),
            ),
    );
    plot
}

/// Write `plot` as standalone HTML file `<dir>/<name>.html`
pub fn save(plot: &Plot, dir: &Path, name: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    let path = dir.join(format!("{}.html", name));
    plot.write_html(&path);
    log::info!("wrote {}", path.display());

    Ok(path)
}
