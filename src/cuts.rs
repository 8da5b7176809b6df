//! Track selection variations used to probe the TPC tracking efficiency

use crate::{numeric::Float, track::Track};
use std::fmt;

/// Baseline of the momentum-dependent crossed rows cut
const CROSSED_ROWS_BASE: Float = 120.;

/// Momentum slope of the momentum-dependent crossed rows cut (GeV/c)
const CROSSED_ROWS_PT_SLOPE: Float = 5.;

/// Minimal fraction of crossed rows which must carry a TPC cluster
const CLUSTERS_OVER_CROSSED_ROWS: Float = 0.75;

/// Minimal ratio of crossed rows to findable clusters
const CROSSED_ROWS_OVER_FINDABLE: Float = 0.9;

/// Minimal fraction of crossed rows which must carry a PID cluster
const PID_CLUSTERS_OVER_CROSSED_ROWS: Float = 0.5;

/// Variation of the track selection
///
/// Each variant tightens one aspect of the TPC track quality requirements. All
/// comparisons are strict, and the same variants apply to data and simulation.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CutVariant {
    /// Crossed rows > 120 - 5/pT
    PtDependentCrossedRows,

    /// TPC clusters > 0.75 × crossed rows
    ///
    /// This variation is poorly described by simulation in recent data
    /// taking periods, so it is still evaluated but does not enter the final
    /// uncertainty.
    ClustersOverCrossedRows,

    /// Crossed rows / findable clusters > 0.9
    CrossedRowsOverFindable,

    /// PID clusters > 0.5 × crossed rows
    PidClustersOverCrossedRows,

    /// PID clusters > 40
    PidClustersAbove40,

    /// PID clusters > 60
    PidClustersAbove60,
}
//
impl CutVariant {
    /// Every variant, in conventional order
    pub const ALL: [CutVariant; 6] = [
        Self::PtDependentCrossedRows,
        Self::ClustersOverCrossedRows,
        Self::CrossedRowsOverFindable,
        Self::PidClustersOverCrossedRows,
        Self::PidClustersAbove40,
        Self::PidClustersAbove60,
    ];

    /// Conventional 1-based number of the variant
    pub fn number(self) -> usize {
        Self::ALL
            .iter()
            .position(|&variant| variant == self)
            .map_or(0, |index| index + 1)
    }

    /// Truth that this variant enters the final uncertainty
    pub fn is_used_for_uncertainty(self) -> bool {
        self != Self::ClustersOverCrossedRows
    }

    /// Decide whether a track passes this selection variant
    pub fn keep(self, track: &Track) -> bool {
        let clusters = &track.clusters;
        match self {
            Self::PtDependentCrossedRows => {
                clusters.crossed_rows > CROSSED_ROWS_BASE - CROSSED_ROWS_PT_SLOPE / track.pt
            }
            Self::ClustersOverCrossedRows => {
                clusters.total > CLUSTERS_OVER_CROSSED_ROWS * clusters.crossed_rows
            }
            Self::CrossedRowsOverFindable => {
                clusters.crossed_rows / clusters.findable > CROSSED_ROWS_OVER_FINDABLE
            }
            Self::PidClustersOverCrossedRows => {
                clusters.pid > PID_CLUSTERS_OVER_CROSSED_ROWS * clusters.crossed_rows
            }
            Self::PidClustersAbove40 => clusters.pid > 40.,
            Self::PidClustersAbove60 => clusters.pid > 60.,
        }
    }
}
//
impl fmt::Display for CutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::PtDependentCrossedRows => "N_{crossed rows} > 120 - 5/p_{T}",
            Self::ClustersOverCrossedRows => "N_{clusters} > 0.75 N_{crossed rows}",
            Self::CrossedRowsOverFindable => "N_{crossed rows}/N_{findable} > 0.9",
            Self::PidClustersOverCrossedRows => "N_{PID clusters} > 0.5 N_{crossed rows}",
            Self::PidClustersAbove40 => "N_{PID clusters} > 40",
            Self::PidClustersAbove60 => "N_{PID clusters} > 60",
        };
        write!(f, "Cut{} ({})", self.number(), description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::{ClusterCounts, NSigma, TrackTags};

    fn track(pt: Float, total: Float, pid: Float, crossed_rows: Float, findable: Float) -> Track {
        Track {
            pt,
            clusters: ClusterCounts {
                total,
                pid,
                crossed_rows,
                findable,
            },
            tags: TrackTags::empty(),
            n_sigma: NSigma::default(),
        }
    }

    #[test]
    fn comparisons_are_strict() {
        // 120 - 5/1 = 115 crossed rows exactly
        assert!(!CutVariant::PtDependentCrossedRows.keep(&track(1., 0., 0., 115., 200.)));
        assert!(CutVariant::PtDependentCrossedRows.keep(&track(1., 0., 0., 116., 200.)));

        assert!(!CutVariant::ClustersOverCrossedRows.keep(&track(1., 75., 0., 100., 200.)));
        assert!(CutVariant::ClustersOverCrossedRows.keep(&track(1., 76., 0., 100., 200.)));

        assert!(!CutVariant::CrossedRowsOverFindable.keep(&track(1., 0., 0., 90., 100.)));
        assert!(CutVariant::CrossedRowsOverFindable.keep(&track(1., 0., 0., 91., 100.)));

        assert!(!CutVariant::PidClustersOverCrossedRows.keep(&track(1., 0., 50., 100., 200.)));
        assert!(CutVariant::PidClustersOverCrossedRows.keep(&track(1., 0., 51., 100., 200.)));

        assert!(!CutVariant::PidClustersAbove40.keep(&track(1., 0., 40., 0., 1.)));
        assert!(CutVariant::PidClustersAbove40.keep(&track(1., 0., 41., 0., 1.)));
        assert!(!CutVariant::PidClustersAbove60.keep(&track(1., 0., 60., 0., 1.)));
    }

    #[test]
    fn only_the_clusters_over_crossed_rows_variant_is_retired() {
        let retired = CutVariant::ALL
            .iter()
            .filter(|variant| !variant.is_used_for_uncertainty())
            .collect::<Vec<_>>();
        assert_eq!(retired, [&CutVariant::ClustersOverCrossedRows]);
        assert_eq!(CutVariant::ClustersOverCrossedRows.number(), 2);
    }
}
