//! Binned containers used to tabulate efficiencies, uncertainties and toy
//! Monte Carlo results
//!
//! All containers share the same binning convention: bins are half-open
//! `[low, high)` intervals delimited by strictly increasing edges, and values
//! falling outside of the binned range are silently dropped (there are no
//! underflow or overflow bins).

use crate::{numeric::Float, Result};
use eyre::{ensure, eyre};
use prefix_num_ops::real::*;
use serde::{Deserialize, Serialize};

/// Strictly increasing bin edges
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Float>", into = "Vec<Float>")]
pub struct Axis {
    edges: Vec<Float>,
}
//
impl Axis {
    /// Build an axis from bin edges, checking that they make sense
    pub fn new(edges: Vec<Float>) -> Result<Self> {
        ensure!(
            edges.len() >= 2,
            "A binned axis needs at least two edges, got {}",
            edges.len()
        );
        ensure!(
            edges.iter().all(|edge| edge.is_finite()),
            "Bin edges must be finite, got {:?}",
            edges
        );
        ensure!(
            edges.windows(2).all(|pair| pair[0] < pair[1]),
            "Bin edges must be strictly increasing, got {:?}",
            edges
        );
        Ok(Self { edges })
    }

    /// Build an axis of `num_bins` equal-width bins spanning `[low, high)`
    pub fn uniform(num_bins: usize, low: Float, high: Float) -> Result<Self> {
        ensure!(num_bins > 0, "A binned axis needs at least one bin");
        let width = (high - low) / (num_bins as Float);
        Self::new(
            (0..=num_bins)
                .map(|bin| low + (bin as Float) * width)
                .collect(),
        )
    }

    /// Bin edges
    pub fn edges(&self) -> &[Float] {
        &self.edges[..]
    }

    /// Number of bins
    pub fn num_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Index of the bin containing `value`, if it is within the binned range
    pub fn find_bin(&self, value: Float) -> Option<usize> {
        // NaN compares false with everything, so it lands in "underflow"
        let upper = self.edges.partition_point(|&edge| edge <= value);
        if upper == 0 || upper == self.edges.len() {
            None
        } else {
            Some(upper - 1)
        }
    }

    /// Index of the bin containing `value`, clamping out-of-range values to
    /// the first or last bin
    pub fn find_bin_clamped(&self, value: Float) -> usize {
        let upper = self.edges.partition_point(|&edge| edge <= value);
        upper.clamp(1, self.num_bins()) - 1
    }

    /// Lower edge of a bin
    pub fn bin_low_edge(&self, bin: usize) -> Float {
        self.edges[bin]
    }

    /// Upper edge of a bin
    pub fn bin_high_edge(&self, bin: usize) -> Float {
        self.edges[bin + 1]
    }

    /// Center of a bin
    pub fn bin_center(&self, bin: usize) -> Float {
        0.5 * (self.edges[bin] + self.edges[bin + 1])
    }
}
//
impl TryFrom<Vec<Float>> for Axis {
    type Error = eyre::Report;

    fn try_from(edges: Vec<Float>) -> Result<Self> {
        Self::new(edges)
    }
}
//
impl From<Axis> for Vec<Float> {
    fn from(axis: Axis) -> Self {
        axis.edges
    }
}

/// One-dimensional table of values indexed by bins of some quantity
///
/// This is used both as a counting histogram (via `fill`) and as a ratio or
/// uncertainty table (via `divide` and `lookup`). Bins can be flagged as
/// undefined, which happens when they result from a division by an empty bin.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BinnedTableData", into = "BinnedTableData")]
pub struct BinnedTable {
    /// Binning of the table
    axis: Axis,

    /// Per-bin values
    contents: Vec<Float>,

    /// Truth that each bin holds a meaningful value
    defined: Vec<bool>,
}
//
impl BinnedTable {
    // ### CONSTRUCTION ###

    /// Build an empty table with the specified bin edges
    pub fn new(edges: Vec<Float>) -> Result<Self> {
        Ok(Self::with_axis(Axis::new(edges)?))
    }

    /// Build an empty table with `num_bins` equal-width bins
    pub fn uniform(num_bins: usize, low: Float, high: Float) -> Result<Self> {
        Ok(Self::with_axis(Axis::uniform(num_bins, low, high)?))
    }

    /// Build an empty table over an existing axis
    pub fn with_axis(axis: Axis) -> Self {
        let num_bins = axis.num_bins();
        Self {
            axis,
            contents: vec![0.; num_bins],
            defined: vec![true; num_bins],
        }
    }

    /// Build a table from bin edges and per-bin values
    pub fn from_contents(edges: Vec<Float>, contents: Vec<Float>) -> Result<Self> {
        let axis = Axis::new(edges)?;
        ensure!(
            contents.len() == axis.num_bins(),
            "Expected {} bin contents, got {}",
            axis.num_bins(),
            contents.len()
        );
        let defined = vec![true; contents.len()];
        Ok(Self {
            axis,
            contents,
            defined,
        })
    }

    // ### ACCESSORS ###

    /// Binning of the table
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Bin edges
    pub fn edges(&self) -> &[Float] {
        self.axis.edges()
    }

    /// Per-bin values
    pub fn contents(&self) -> &[Float] {
        &self.contents[..]
    }

    /// Number of bins
    pub fn num_bins(&self) -> usize {
        self.axis.num_bins()
    }

    /// Index of the bin containing `value`, if any
    pub fn find_bin(&self, value: Float) -> Option<usize> {
        self.axis.find_bin(value)
    }

    /// Value stored in a bin
    pub fn bin_content(&self, bin: usize) -> Float {
        self.contents[bin]
    }

    /// Truth that a bin holds a meaningful value
    pub fn is_defined(&self, bin: usize) -> bool {
        self.defined[bin]
    }

    /// Lower edge of a bin
    pub fn bin_low_edge(&self, bin: usize) -> Float {
        self.axis.bin_low_edge(bin)
    }

    /// Upper edge of a bin
    pub fn bin_high_edge(&self, bin: usize) -> Float {
        self.axis.bin_high_edge(bin)
    }

    /// Value of the bin containing `value`
    ///
    /// Values below the first edge read the first bin, and values at or above
    /// the last edge read the last bin.
    ///
    pub fn lookup(&self, value: Float) -> Float {
        self.contents[self.axis.find_bin_clamped(value)]
    }

    /// Sum of all bin contents
    pub fn integral(&self) -> Float {
        self.contents.iter().sum()
    }

    // ### MODIFIERS ###

    /// Count one entry at `value`, dropping it if it is out of range
    pub fn fill(&mut self, value: Float) {
        self.fill_weighted(value, 1.);
    }

    /// Add `weight` to the bin containing `value`, if any
    pub fn fill_weighted(&mut self, value: Float, weight: Float) {
        if let Some(bin) = self.axis.find_bin(value) {
            self.contents[bin] += weight;
        }
    }

    /// Overwrite the value stored in a bin, marking it as defined
    pub fn set_bin_content(&mut self, bin: usize, value: Float) {
        self.contents[bin] = value;
        self.defined[bin] = true;
    }

    // ### BIN-WISE OPERATIONS ###

    /// Bin-wise quotient of this table by another table with identical binning
    ///
    /// Bins where the denominator is zero, or where either operand is
    /// undefined, hold a value of exactly zero and are flagged as undefined.
    /// The result therefore never contains NaN or infinity.
    ///
    pub fn divide(&self, denominator: &BinnedTable) -> Result<BinnedTable> {
        ensure!(
            self.axis == denominator.axis,
            "Cannot divide tables with different binnings ({:?} vs {:?})",
            self.edges(),
            denominator.edges()
        );
        let mut result = Self::with_axis(self.axis.clone());
        for bin in 0..self.num_bins() {
            let num = self.contents[bin];
            let denom = denominator.contents[bin];
            let defined = self.defined[bin] && denominator.defined[bin] && denom != 0.;
            let quotient = if defined { num / denom } else { 0. };
            if defined && quotient.is_finite() {
                result.contents[bin] = quotient;
            } else {
                result.contents[bin] = 0.;
                result.defined[bin] = false;
            }
        }
        Ok(result)
    }

    /// Per-bin absolute deviation from unity, in percent
    ///
    /// Undefined bins deviate by zero.
    ///
    pub fn abs_deviation_from_unity(&self) -> BinnedTable {
        let mut result = Self::with_axis(self.axis.clone());
        for bin in 0..self.num_bins() {
            if self.defined[bin] {
                result.contents[bin] = abs(self.contents[bin] - 1.) * 100.;
            }
        }
        result
    }
}

/// Entry of the maximum-deviation reduction
#[derive(Clone, Copy, Debug)]
pub enum DeviationEntry<'a> {
    /// Ratio table whose bins contribute `|value - 1| × 100`
    Ratio(&'a BinnedTable),

    /// Placeholder which contributes a deviation of exactly zero in every bin
    Zero,
}

/// Per-bin maximum of the absolute percent deviation from unity across a set
/// of ratio tables sharing the binning `axis`
pub fn max_abs_deviation_from_unity(
    axis: &Axis,
    entries: &[DeviationEntry],
) -> Result<BinnedTable> {
    ensure!(!entries.is_empty(), "Need at least one table to reduce");
    let mut result = BinnedTable::with_axis(axis.clone());
    for entry in entries {
        let DeviationEntry::Ratio(table) = entry else {
            continue;
        };
        ensure!(
            table.axis() == axis,
            "Cannot reduce tables with different binnings ({:?} vs {:?})",
            table.edges(),
            axis.edges()
        );
        let deviations = table.abs_deviation_from_unity();
        for (max, &dev) in result.contents.iter_mut().zip(deviations.contents()) {
            *max = max.max(dev);
        }
    }
    Ok(result)
}

/// Serialized form of a BinnedTable
#[derive(Serialize, Deserialize)]
struct BinnedTableData {
    edges: Vec<Float>,
    contents: Vec<Float>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    undefined_bins: Vec<usize>,
}
//
impl TryFrom<BinnedTableData> for BinnedTable {
    type Error = eyre::Report;

    fn try_from(data: BinnedTableData) -> Result<Self> {
        let mut table = Self::from_contents(data.edges, data.contents)?;
        for bin in data.undefined_bins {
            let flag = table
                .defined
                .get_mut(bin)
                .ok_or_else(|| eyre!("Undefined bin {} is out of range", bin))?;
            *flag = false;
        }
        Ok(table)
    }
}
//
impl From<BinnedTable> for BinnedTableData {
    fn from(table: BinnedTable) -> Self {
        let undefined_bins = (table.defined.iter().enumerate())
            .filter_map(|(bin, &defined)| (!defined).then_some(bin))
            .collect();
        Self {
            edges: table.axis.into(),
            contents: table.contents,
            undefined_bins,
        }
    }
}

/// Two-dimensional counting histogram
///
/// Alongside bin counts, the sum and sum of squares of the Y values are kept
/// for each X bin, so that the X profile is exact rather than computed from
/// Y bin centers.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Histogram2D {
    /// Binning along X
    x_axis: Axis,

    /// Binning along Y
    y_axis: Axis,

    /// Bin counts, indexed as `[x_bin][y_bin]`
    counts: Vec<Vec<Float>>,

    /// Number of entries in each X bin
    x_entries: Vec<Float>,

    /// Sum of the Y values in each X bin
    x_sum_y: Vec<Float>,

    /// Sum of the squared Y values in each X bin
    x_sum_y2: Vec<Float>,
}
//
impl Histogram2D {
    /// Build an empty histogram
    pub fn new(x_axis: Axis, y_axis: Axis) -> Self {
        let num_x_bins = x_axis.num_bins();
        let num_y_bins = y_axis.num_bins();
        Self {
            x_axis,
            y_axis,
            counts: vec![vec![0.; num_y_bins]; num_x_bins],
            x_entries: vec![0.; num_x_bins],
            x_sum_y: vec![0.; num_x_bins],
            x_sum_y2: vec![0.; num_x_bins],
        }
    }

    /// Binning along X
    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    /// Binning along Y
    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    /// Count of a bin
    pub fn bin_content(&self, x_bin: usize, y_bin: usize) -> Float {
        self.counts[x_bin][y_bin]
    }

    /// Number of in-range entries
    pub fn entries(&self) -> Float {
        self.x_entries.iter().sum()
    }

    /// Count one entry, dropping it if either coordinate is out of range
    pub fn fill(&mut self, x: Float, y: Float) {
        let (Some(x_bin), Some(y_bin)) = (self.x_axis.find_bin(x), self.y_axis.find_bin(y)) else {
            return;
        };
        self.counts[x_bin][y_bin] += 1.;
        self.x_entries[x_bin] += 1.;
        self.x_sum_y[x_bin] += y;
        self.x_sum_y2[x_bin] += y.powi(2);
    }

    /// Integrate the entries of another histogram with the same binning
    pub fn merge(&mut self, other: &Histogram2D) {
        assert_eq!(self.x_axis, other.x_axis, "Merged histograms must share binning");
        assert_eq!(self.y_axis, other.y_axis, "Merged histograms must share binning");
        for (row, other_row) in self.counts.iter_mut().zip(&other.counts) {
            for (count, other_count) in row.iter_mut().zip(other_row) {
                *count += other_count;
            }
        }
        let add_assign = |dst: &mut Vec<Float>, src: &Vec<Float>| {
            dst.iter_mut().zip(src).for_each(|(d, s)| *d += s)
        };
        add_assign(&mut self.x_entries, &other.x_entries);
        add_assign(&mut self.x_sum_y, &other.x_sum_y);
        add_assign(&mut self.x_sum_y2, &other.x_sum_y2);
    }

    /// Mean Y value (and its uncertainty) in each X bin
    pub fn profile_x(&self) -> Profile {
        let num_bins = self.x_axis.num_bins();
        let mut mean = vec![0.; num_bins];
        let mut error = vec![0.; num_bins];
        for bin in 0..num_bins {
            let n = self.x_entries[bin];
            if n > 0. {
                mean[bin] = self.x_sum_y[bin] / n;
                let variance = (self.x_sum_y2[bin] / n - mean[bin].powi(2)).max(0.);
                error[bin] = sqrt(variance / n);
            }
        }
        Profile {
            axis: self.x_axis.clone(),
            mean,
            error,
            entries: self.x_entries.clone(),
        }
    }
}

/// Mean of a quantity as a function of binned X
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Binning along X
    pub axis: Axis,

    /// Mean value in each bin, zero for empty bins
    pub mean: Vec<Float>,

    /// Uncertainty on the mean in each bin
    pub error: Vec<Float>,

    /// Number of entries in each bin
    pub entries: Vec<Float>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn table(edges: &[Float], contents: &[Float]) -> BinnedTable {
        BinnedTable::from_contents(edges.to_vec(), contents.to_vec()).unwrap()
    }

    #[test]
    fn edges_must_be_strictly_increasing() {
        assert!(BinnedTable::new(vec![0.]).is_err());
        assert!(BinnedTable::new(vec![0., 1., 1., 2.]).is_err());
        assert!(BinnedTable::new(vec![0., 2., 1.]).is_err());
        assert!(BinnedTable::new(vec![0., 1., 2.]).is_ok());
    }

    #[test]
    fn find_bin_edge_cases() {
        let axis = Axis::new(vec![0., 1., 2., 3.]).unwrap();
        assert_eq!(axis.find_bin(-0.5), None);
        assert_eq!(axis.find_bin(3.), None);
        assert_eq!(axis.find_bin(Float::NAN), None);
        assert_eq!(axis.find_bin(0.), Some(0));
        assert_eq!(axis.find_bin(1.), Some(1));
        assert_eq!(axis.find_bin(2.99), Some(2));
    }

    #[test]
    fn fill_drops_out_of_range_values() {
        let mut h = BinnedTable::new(vec![0., 1., 2.]).unwrap();
        for value in [0.5, 1.5, 1.7, -1., 2., 7.] {
            h.fill(value);
        }
        assert_eq!(h.contents(), &[1., 2.]);
        assert_eq!(h.integral(), 3.);
    }

    #[test]
    fn lookup_extrapolates_flatly() {
        let t = table(&[0.5, 1., 2.], &[3., 4.]);
        assert_eq!(t.lookup(0.1), 3.);
        assert_eq!(t.lookup(0.7), 3.);
        assert_eq!(t.lookup(1.5), 4.);
        assert_eq!(t.lookup(2.), 4.);
        assert_eq!(t.lookup(40.), 4.);
    }

    #[test]
    fn divide_by_zero_gives_zero() {
        let num = table(&[0., 1., 2., 3.], &[2., 5., 0.]);
        let denom = table(&[0., 1., 2., 3.], &[4., 0., 0.]);
        let ratio = num.divide(&denom).unwrap();
        assert_eq!(ratio.contents(), &[0.5, 0., 0.]);
        assert!(ratio.is_defined(0));
        assert!(!ratio.is_defined(1));
        assert!(!ratio.is_defined(2));
        assert!(ratio.contents().iter().all(|x| x.is_finite()));

        // Undefined bins propagate through further divisions
        let ones = table(&[0., 1., 2., 3.], &[1., 1., 1.]);
        let chained = ratio.divide(&ones).unwrap();
        assert!(!chained.is_defined(1));
    }

    #[test]
    fn divide_rejects_mismatched_binning() {
        let a = table(&[0., 1., 2.], &[1., 1.]);
        let b = table(&[0., 1., 3.], &[1., 1.]);
        assert!(a.divide(&b).is_err());
    }

    #[test]
    fn max_deviation_keeps_zero_placeholder_and_skips_undefined_bins() {
        let axis = Axis::new(vec![0., 1., 2., 3.]).unwrap();
        let mut a = table(&[0., 1., 2., 3.], &[1.1, 0.7, 1.]);
        let b = table(&[0., 1., 2., 3.], &[0.95, 1.2, 1.]);
        a.defined[2] = false;
        let max = max_abs_deviation_from_unity(
            &axis,
            &[DeviationEntry::Ratio(&a), DeviationEntry::Zero, DeviationEntry::Ratio(&b)],
        )
        .unwrap();
        assert_relative_eq!(max.bin_content(0), 10., max_relative = 1e-12);
        assert_relative_eq!(max.bin_content(1), 30., max_relative = 1e-12);
        assert_eq!(max.bin_content(2), 0.);
    }

    #[test]
    fn table_json_keeps_undefined_bins() {
        let ratio = table(&[0., 1., 2.], &[1., 0.])
            .divide(&table(&[0., 1., 2.], &[2., 0.]))
            .unwrap();
        let json = serde_json::to_string(&ratio).unwrap();
        let back: BinnedTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ratio);
        assert!(serde_json::from_str::<BinnedTable>(r#"{"edges":[1,0],"contents":[3]}"#).is_err());
    }

    #[test]
    fn profile_is_exact_mean_per_x_bin() {
        let mut h = Histogram2D::new(
            Axis::uniform(2, 0., 2.).unwrap(),
            Axis::uniform(10, 0., 10.).unwrap(),
        );
        h.fill(0.5, 1.25);
        h.fill(0.5, 2.75);
        h.fill(1.5, 0.);
        h.fill(5., 1.);
        let profile = h.profile_x();
        assert_relative_eq!(profile.mean[0], 2.);
        assert_relative_eq!(profile.error[0], 0.75 / Float::sqrt(2.));
        assert_eq!(profile.mean[1], 0.);
        assert_eq!(profile.entries, vec![2., 1.]);

        let mut sum = h.clone();
        sum.merge(&h);
        assert_eq!(sum.bin_content(0, 1), 2.);
        assert_relative_eq!(sum.profile_x().mean[0], 2.);
        assert_eq!(sum.entries(), 6.);
    }
}
