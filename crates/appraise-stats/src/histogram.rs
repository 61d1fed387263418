use std::ops::Range;

use crate::StatsError;

/// Equal-width histogram over the observed range of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Bins in ascending order; consecutive ranges share their boundary.
    pub bins: Vec<HistogramBin>,
}

/// A single bin in a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// Values covered by this bin (inclusive start, exclusive end; the last
    /// bin also holds its end value).
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Bins `values` into `n_bins` equal-width bins spanning `[min, max]`.
    ///
    /// Non-finite values are ignored. The maximum lands in the last bin. When
    /// every finite value is equal, the bins span a unit interval centred on
    /// that value.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`StatsError::InvalidBinCount`] | `n_bins == 0` |
    /// | [`StatsError::EmptyInput`] | no finite values |
    ///
    /// # Examples
    ///
    /// ```
    /// # use appraise_stats::Histogram;
    /// let histogram = Histogram::equal_width(&[1.0, 2.0, 2.5, 4.0], 3).unwrap();
    /// let counts: Vec<u64> = histogram.bins.iter().map(|b| b.count).collect();
    /// assert_eq!(counts, vec![1, 2, 1]);
    /// ```
    pub fn equal_width(values: &[f64], n_bins: usize) -> Result<Self, StatsError> {
        if n_bins == 0 {
            return Err(StatsError::InvalidBinCount { n_bins });
        }
        let finite = || values.iter().copied().filter(|v| v.is_finite());
        let (min, max) = finite().fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or(StatsError::EmptyInput)?;

        let (lo, hi) = if max > min {
            (min, max)
        } else {
            (min - 0.5, max + 0.5)
        };
        let width = (hi - lo) / n_bins as f64;

        let mut bins: Vec<HistogramBin> = (0..n_bins)
            .map(|i| HistogramBin {
                range: lo + width * i as f64..lo + width * (i + 1) as f64,
                count: 0,
            })
            .collect();
        if let Some(last) = bins.last_mut() {
            last.range.end = hi;
        }

        for v in finite() {
            let index = (((v - lo) / width).floor() as usize).min(n_bins - 1);
            bins[index].count += 1;
        }

        Ok(Self { bins })
    }

    /// Number of bins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Total number of binned values.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum()
    }

    /// Count of the fullest bin.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }

    /// Lower edge of the first bin and upper edge of the last.
    #[must_use]
    pub fn span(&self) -> Option<Range<f64>> {
        let first = self.bins.first()?;
        let last = self.bins.last()?;
        Some(first.range.start..last.range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_value_lands_in_last_bin() {
        let values: Vec<f64> = (0..=30).map(f64::from).collect();
        let h = Histogram::equal_width(&values, 30).unwrap();
        assert_eq!(h.len(), 30);
        assert_eq!(h.total_count(), 31);
        assert_eq!(h.bins[29].count, 2);
        assert!(h.bins[..29].iter().all(|b| b.count == 1));
        assert_eq!(h.span(), Some(0.0..30.0));
    }

    #[test]
    fn bins_are_equal_width_and_contiguous() {
        let h = Histogram::equal_width(&[5.0, 50.0, 12.0, 33.3], 30).unwrap();
        let width = 45.0 / 30.0;
        for pair in h.bins.windows(2) {
            assert_eq!(pair[0].range.end, pair[1].range.start);
        }
        for bin in &h.bins {
            assert!((bin.range.end - bin.range.start - width).abs() < 1e-9);
        }
    }

    #[test]
    fn non_finite_values_ignored() {
        let h = Histogram::equal_width(&[1.0, f64::NAN, 3.0, f64::NEG_INFINITY], 2).unwrap();
        assert_eq!(h.total_count(), 2);
        assert_eq!(h.span(), Some(1.0..3.0));
    }

    #[test]
    fn constant_values_fill_middle_bin() {
        let h = Histogram::equal_width(&[7.0; 4], 3).unwrap();
        assert_eq!(h.span(), Some(6.5..7.5));
        assert_eq!(h.bins[1].count, 4);
        assert_eq!(h.max_count(), 4);
    }

    #[test]
    fn invalid_inputs_rejected() {
        assert!(matches!(
            Histogram::equal_width(&[1.0], 0),
            Err(StatsError::InvalidBinCount { n_bins: 0 })
        ));
        assert!(matches!(
            Histogram::equal_width(&[f64::NAN], 10),
            Err(StatsError::EmptyInput)
        ));
        assert!(matches!(
            Histogram::equal_width(&[], 10),
            Err(StatsError::EmptyInput)
        ));
    }
}
