//! Charts drawn after modelling: fit scatter, residuals, and importance bars.

use std::path::PathBuf;

use appraise_stats::TrendLine;
use plotters::prelude::*;
use plotters::style::TextStyle;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::{debug, instrument};

use crate::palette::{BAR, POINT, REFERENCE, TREND};
use crate::renderer::{
    ACTUAL_VS_PREDICTED_FILE, FEATURE_IMPORTANCE_FILE, RESIDUALS_FILE, padded_range,
};
use crate::{ChartRenderer, PlotError};

fn check_pairs(chart: &'static str, actual: &[f64], predicted: &[f64]) -> Result<(), PlotError> {
    if actual.len() != predicted.len() {
        return Err(PlotError::LengthMismatch {
            chart,
            left: actual.len(),
            right: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(PlotError::EmptySeries { chart });
    }
    Ok(())
}

impl ChartRenderer {
    /// Scatter actual (x) against predicted (y) values, with the identity
    /// line and a least-squares trend line.
    ///
    /// The trend line is omitted when it cannot be fitted.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PlotError::LengthMismatch`] | series differ in length |
    /// | [`PlotError::EmptySeries`] | no finite points |
    /// | [`PlotError::Render`] | drawing or writing the image fails |
    #[instrument(skip_all, fields(n_points = actual.len()))]
    pub fn actual_vs_predicted(
        &self,
        actual: &[f64],
        predicted: &[f64],
    ) -> Result<PathBuf, PlotError> {
        check_pairs(ACTUAL_VS_PREDICTED_FILE, actual, predicted)?;
        let (lo, hi) = padded_range(actual.iter().chain(predicted)).ok_or(
            PlotError::EmptySeries {
                chart: ACTUAL_VS_PREDICTED_FILE,
            },
        )?;
        let trend = TrendLine::fit(actual, predicted)
            .inspect_err(|e| debug!(error = %e, "trend line omitted"))
            .ok();
        let style = self.style().clone();

        self.render(ACTUAL_VS_PREDICTED_FILE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption("Actual vs Predicted", ("sans-serif", style.caption_size()))
                .margin(style.margin())
                .x_label_area_size(style.label_area())
                .y_label_area_size(style.label_area())
                .build_cartesian_2d(lo..hi, lo..hi)?;

            chart
                .configure_mesh()
                .x_desc("Actual")
                .y_desc("Predicted")
                .label_style(("sans-serif", style.label_size()))
                .axis_desc_style(("sans-serif", style.label_size()))
                .draw()?;

            let radius = style.point_size();
            chart.draw_series(
                actual
                    .iter()
                    .zip(predicted)
                    .map(|(&a, &p)| Circle::new((a, p), radius, POINT.mix(0.6).filled())),
            )?;

            let identity = REFERENCE.stroke_width(style.line_width());
            chart
                .draw_series(LineSeries::new([(lo, lo), (hi, hi)], identity))?
                .label("Perfect prediction")
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], identity));

            if let Some(line) = trend {
                let fitted = TREND.stroke_width(style.line_width());
                chart
                    .draw_series(LineSeries::new(
                        [(lo, line.at(lo)), (hi, line.at(hi))],
                        fitted,
                    ))?
                    .label("Least-squares fit")
                    .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 40, y)], fitted));
            }

            chart
                .configure_series_labels()
                .position(SeriesLabelPosition::UpperLeft)
                .label_font(("sans-serif", style.label_size()))
                .background_style(&WHITE.mix(0.8))
                .border_style(&BLACK)
                .draw()?;
            Ok(())
        })
    }

    /// Scatter residuals (`actual - predicted`) against predicted values
    /// with a zero reference line.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`PlotError::LengthMismatch`] | series differ in length |
    /// | [`PlotError::EmptySeries`] | no finite points |
    /// | [`PlotError::Render`] | drawing or writing the image fails |
    #[instrument(skip_all, fields(n_points = actual.len()))]
    pub fn residuals(&self, actual: &[f64], predicted: &[f64]) -> Result<PathBuf, PlotError> {
        check_pairs(RESIDUALS_FILE, actual, predicted)?;
        let residuals: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();
        let empty = || PlotError::EmptySeries {
            chart: RESIDUALS_FILE,
        };
        let (x_lo, x_hi) = padded_range(predicted).ok_or_else(empty)?;
        let (y_lo, y_hi) = padded_range(residuals.iter().chain([0.0].iter())).ok_or_else(empty)?;
        let style = self.style().clone();

        self.render(RESIDUALS_FILE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption("Residual Analysis", ("sans-serif", style.caption_size()))
                .margin(style.margin())
                .x_label_area_size(style.label_area())
                .y_label_area_size(style.label_area())
                .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

            chart
                .configure_mesh()
                .x_desc("Predicted")
                .y_desc("Residual (actual - predicted)")
                .label_style(("sans-serif", style.label_size()))
                .axis_desc_style(("sans-serif", style.label_size()))
                .draw()?;

            let radius = style.point_size();
            chart.draw_series(
                predicted
                    .iter()
                    .zip(&residuals)
                    .map(|(&p, &r)| Circle::new((p, r), radius, POINT.mix(0.6).filled())),
            )?;
            chart.draw_series(LineSeries::new(
                [(x_lo, 0.0), (x_hi, 0.0)],
                REFERENCE.stroke_width(style.line_width()),
            ))?;
            Ok(())
        })
    }

    /// Horizontal bar chart of `(feature, importance)` pairs, largest at the top.
    ///
    /// Negative importances extend left of zero.
    ///
    /// # Errors
    ///
    /// Returns [`PlotError::EmptySeries`] if `importances` is empty and
    /// [`PlotError::Render`] if drawing or writing the image fails.
    #[instrument(skip_all, fields(n_features = importances.len()))]
    pub fn feature_importance(&self, importances: &[(String, f64)]) -> Result<PathBuf, PlotError> {
        if importances.is_empty() {
            return Err(PlotError::EmptySeries {
                chart: FEATURE_IMPORTANCE_FILE,
            });
        }
        let mut ranked: Vec<(&str, f64)> = importances
            .iter()
            .map(|(name, v)| (name.as_str(), *v))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        let values: Vec<f64> = ranked.iter().map(|&(_, v)| v).collect();
        let (x_lo, x_hi) = padded_range(values.iter().chain([0.0].iter())).ok_or(
            PlotError::EmptySeries {
                chart: FEATURE_IMPORTANCE_FILE,
            },
        )?;
        let n = ranked.len() as f64;
        let style = self.style().clone();

        self.render(FEATURE_IMPORTANCE_FILE, |root| {
            let mut chart = ChartBuilder::on(root)
                .caption("Feature Importance", ("sans-serif", style.caption_size()))
                .margin(style.margin())
                .x_label_area_size(style.label_area())
                .y_label_area_size(style.category_area())
                .build_cartesian_2d(x_lo..x_hi, 0f64..n)?;

            chart
                .configure_mesh()
                .disable_y_mesh()
                .y_label_formatter(&|_: &f64| String::new())
                .x_desc("Mean increase in MSE when permuted")
                .label_style(("sans-serif", style.label_size()))
                .axis_desc_style(("sans-serif", style.label_size()))
                .draw()?;

            let top = |i: usize| n - i as f64;
            chart.draw_series(ranked.iter().enumerate().map(|(i, &(_, v))| {
                let (x0, x1) = if v < 0.0 { (v, 0.0) } else { (0.0, v) };
                Rectangle::new(
                    [(x0, top(i) - 0.85), (x1, top(i) - 0.15)],
                    BAR.filled(),
                )
            }))?;

            let gap = style.margin() as i32 / 2;
            let name_style = TextStyle::from(("sans-serif", style.label_size()).into_font())
                .pos(Pos::new(HPos::Right, VPos::Center));
            for (i, &(name, _)) in ranked.iter().enumerate() {
                let (left, mid_y) = chart.backend_coord(&(x_lo, top(i) - 0.5));
                root.draw(&Text::new(name, (left - gap, mid_y), name_style.clone()))?;
            }
            Ok(())
        })
    }
}
