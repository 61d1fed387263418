//! Charts drawn before modelling: correlation heatmap and target histogram.

use std::path::PathBuf;

use appraise_stats::{CorrelationMatrix, Histogram};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontTransform, TextStyle};
use tracing::instrument;

use crate::palette::{BAR, diverging};
use crate::renderer::{CORRELATION_FILE, DISTRIBUTION_FILE};
use crate::{ChartRenderer, PlotError};

impl ChartRenderer {
    /// Render `matrix` as a blue-white-red heatmap with each coefficient
    /// printed in its cell.
    ///
    /// The first column is drawn in the top row. `NaN` cells are grey and
    /// labelled `NA`.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::EmptySeries`] for an empty matrix and
    /// [`PlotError::Render`] if drawing or writing the image fails.
    #[instrument(skip_all, fields(n_columns = matrix.len()))]
    pub fn correlation_heatmap(&self, matrix: &CorrelationMatrix) -> Result<PathBuf, PlotError> {
        if matrix.is_empty() {
            return Err(PlotError::EmptySeries {
                chart: CORRELATION_FILE,
            });
        }
        let style = self.style().clone();
        let k = matrix.len() as f64;
        let cell = move |i: usize, j: usize| (j as f64, k - 1.0 - i as f64);

        self.render(CORRELATION_FILE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption("Correlation Matrix", ("sans-serif", style.caption_size()))
                .margin(style.margin())
                .x_label_area_size(style.category_area())
                .y_label_area_size(style.category_area())
                .build_cartesian_2d(0f64..k, 0f64..k)?;

            chart.draw_series(matrix.values().iter().enumerate().flat_map(|(i, row)| {
                row.iter().enumerate().map(move |(j, &r)| {
                    let (x, y) = cell(i, j);
                    Rectangle::new([(x, y), (x + 1.0, y + 1.0)], diverging(r).filled())
                })
            }))?;

            let cell_font = style.label_size() * 0.8;
            chart.draw_series(matrix.values().iter().enumerate().flat_map(|(i, row)| {
                row.iter().enumerate().map(move |(j, &r)| {
                    let (x, y) = cell(i, j);
                    let text = if r.is_nan() {
                        "NA".to_string()
                    } else {
                        format!("{r:.2}")
                    };
                    let color = if r.abs() > 0.6 { &WHITE } else { &BLACK };
                    Text::new(
                        text,
                        (x + 0.5, y + 0.5),
                        ("sans-serif", cell_font)
                            .into_font()
                            .color(color)
                            .pos(Pos::new(HPos::Center, VPos::Center)),
                    )
                })
            }))?;

            // Column names sit outside the plotting area, so they are placed
            // in pixel space on the root canvas.
            let gap = style.margin() as i32 / 2;
            let font = ("sans-serif", style.label_size()).into_font();
            let row_style = TextStyle::from(font.clone()).pos(Pos::new(HPos::Right, VPos::Center));
            let col_style = TextStyle::from(font.transform(FontTransform::Rotate90))
                .pos(Pos::new(HPos::Left, VPos::Center));
            for (i, name) in matrix.names().iter().enumerate() {
                let (x, y) = cell(i, i);
                let (left, mid_y) = chart.backend_coord(&(0.0, y + 0.5));
                root.draw(&Text::new(name.as_str(), (left - gap, mid_y), row_style.clone()))?;
                let (mid_x, bottom) = chart.backend_coord(&(x + 0.5, 0.0));
                root.draw(&Text::new(name.as_str(), (mid_x, bottom + gap), col_style.clone()))?;
            }
            Ok(())
        })
    }

    /// Render `histogram` as adjacent bars, with `label` naming the binned column.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::EmptySeries`] for a histogram without bins and
    /// [`PlotError::Render`] if drawing or writing the image fails.
    #[instrument(skip_all, fields(n_bins = histogram.len()))]
    pub fn distribution(&self, histogram: &Histogram, label: &str) -> Result<PathBuf, PlotError> {
        let Some(span) = histogram.span() else {
            return Err(PlotError::EmptySeries {
                chart: DISTRIBUTION_FILE,
            });
        };
        let style = self.style().clone();
        let y_max = (histogram.max_count() as f64 * 1.1).max(1.0);

        self.render(DISTRIBUTION_FILE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption(
                    format!("Distribution of {label}"),
                    ("sans-serif", style.caption_size()),
                )
                .margin(style.margin())
                .x_label_area_size(style.label_area())
                .y_label_area_size(style.label_area())
                .build_cartesian_2d(span.start..span.end, 0f64..y_max)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .x_desc(label)
                .y_desc("Count")
                .label_style(("sans-serif", style.label_size()))
                .axis_desc_style(("sans-serif", style.label_size()))
                .draw()?;

            chart.draw_series(histogram.bins.iter().map(|bin| {
                Rectangle::new(
                    [(bin.range.start, 0.0), (bin.range.end, bin.count as f64)],
                    BAR.mix(0.85).filled(),
                )
            }))?;
            chart.draw_series(histogram.bins.iter().map(|bin| {
                Rectangle::new(
                    [(bin.range.start, 0.0), (bin.range.end, bin.count as f64)],
                    WHITE.stroke_width(1),
                )
            }))?;
            Ok(())
        })
    }
}
