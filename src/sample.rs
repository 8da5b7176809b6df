//! Loading of identified-track samples from disk
//!
//! A sample file is a JSON document which maps directory names (one per
//! trigger/centrality selection of the skimming task) to named track trees.
//! Trees are stored column-wise, using the compact integer encodings of the
//! skimmed trees: momentum in MeV/c, cluster counts as bytes, PID scores as
//! 16-bit integers and tags as a 32-bit word.

use crate::{
    numeric::Float,
    track::{ClusterCounts, NSigma, Track, TrackTags},
    Result,
};
use eyre::{ensure, eyre, WrapErr};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::{fs::File, io::BufReader, path::Path};
use tracing::{debug, info};

/// Name of the track tree inside of each sample directory
pub const TRACK_TREE_NAME: &str = "fPIDtree";

/// Interval at which track conversion progress is reported
const PROGRESS_INTERVAL: usize = 1_000_000;

/// Column-wise track tree
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackColumns {
    /// Transverse momenta (MeV/c)
    #[serde(rename = "pT")]
    pub pt_mev: Vec<u16>,

    /// TPC clusters
    #[serde(rename = "NclusterTPC")]
    pub n_cluster_tpc: Vec<u8>,

    /// TPC clusters used for PID
    #[serde(rename = "NclusterPIDTPC")]
    pub n_cluster_pid_tpc: Vec<u8>,

    /// Crossed TPC pad rows
    #[serde(rename = "NcrossedRowsTPC")]
    pub n_crossed_rows_tpc: Vec<u8>,

    /// Findable TPC clusters
    #[serde(rename = "NFindableTPC")]
    pub n_findable_tpc: Vec<u8>,

    /// TPC PID scores under the pion hypothesis
    #[serde(rename = "n_sigma_TPC_pi")]
    pub n_sigma_tpc_pi: Vec<i16>,

    /// TPC PID scores under the kaon hypothesis
    #[serde(rename = "n_sigma_TPC_K")]
    pub n_sigma_tpc_k: Vec<i16>,

    /// TPC PID scores under the proton hypothesis
    #[serde(rename = "n_sigma_TPC_p")]
    pub n_sigma_tpc_p: Vec<i16>,

    /// TOF PID scores under the pion hypothesis
    #[serde(rename = "n_sigma_TOF_pi")]
    pub n_sigma_tof_pi: Vec<i16>,

    /// TOF PID scores under the kaon hypothesis
    #[serde(rename = "n_sigma_TOF_K")]
    pub n_sigma_tof_k: Vec<i16>,

    /// TOF PID scores under the proton hypothesis
    #[serde(rename = "n_sigma_TOF_p")]
    pub n_sigma_tof_p: Vec<i16>,

    /// Raw identification tag words, see `TrackTags`
    pub tag: Vec<u32>,
}
//
impl TrackColumns {
    /// Number of tracks in the tree
    pub fn len(&self) -> usize {
        self.pt_mev.len()
    }

    /// Truth that the tree holds no track
    pub fn is_empty(&self) -> bool {
        self.pt_mev.is_empty()
    }

    /// Append a track, using the stored encodings
    pub fn push(&mut self, track: &Track) {
        self.pt_mev.push((track.pt * 1000.).round() as u16);
        self.n_cluster_tpc.push(track.clusters.total as u8);
        self.n_cluster_pid_tpc.push(track.clusters.pid as u8);
        self.n_crossed_rows_tpc.push(track.clusters.crossed_rows as u8);
        self.n_findable_tpc.push(track.clusters.findable as u8);
        self.n_sigma_tpc_pi.push(track.n_sigma.tpc_pion as i16);
        self.n_sigma_tpc_k.push(track.n_sigma.tpc_kaon as i16);
        self.n_sigma_tpc_p.push(track.n_sigma.tpc_proton as i16);
        self.n_sigma_tof_pi.push(track.n_sigma.tof_pion as i16);
        self.n_sigma_tof_k.push(track.n_sigma.tof_kaon as i16);
        self.n_sigma_tof_p.push(track.n_sigma.tof_proton as i16);
        self.tag.push(track.tags.bits());
    }

    /// Decode the stored columns into track records
    pub fn to_tracks(&self) -> Result<Vec<Track>> {
        let num_tracks = self.len();
        let lengths = [
            ("NclusterTPC", self.n_cluster_tpc.len()),
            ("NclusterPIDTPC", self.n_cluster_pid_tpc.len()),
            ("NcrossedRowsTPC", self.n_crossed_rows_tpc.len()),
            ("NFindableTPC", self.n_findable_tpc.len()),
            ("n_sigma_TPC_pi", self.n_sigma_tpc_pi.len()),
            ("n_sigma_TPC_K", self.n_sigma_tpc_k.len()),
            ("n_sigma_TPC_p", self.n_sigma_tpc_p.len()),
            ("n_sigma_TOF_pi", self.n_sigma_tof_pi.len()),
            ("n_sigma_TOF_K", self.n_sigma_tof_k.len()),
            ("n_sigma_TOF_p", self.n_sigma_tof_p.len()),
            ("tag", self.tag.len()),
        ];
        for (name, len) in lengths {
            ensure!(
                len == num_tracks,
                "Column {} has {} entries, but pT has {}",
                name,
                len,
                num_tracks
            );
        }

        (0..num_tracks)
            .map(|i| {
                if i % PROGRESS_INTERVAL == 0 {
                    debug!("Decoding track {}", i);
                }
                let tags = TrackTags::from_bits(self.tag[i])
                    .wrap_err_with(|| format!("Invalid tags on track {}", i))?;
                Ok(Track {
                    pt: Float::from(self.pt_mev[i]) / 1000.,
                    clusters: ClusterCounts {
                        total: Float::from(self.n_cluster_tpc[i]),
                        pid: Float::from(self.n_cluster_pid_tpc[i]),
                        crossed_rows: Float::from(self.n_crossed_rows_tpc[i]),
                        findable: Float::from(self.n_findable_tpc[i]),
                    },
                    tags,
                    n_sigma: NSigma {
                        tpc_pion: Float::from(self.n_sigma_tpc_pi[i]),
                        tpc_kaon: Float::from(self.n_sigma_tpc_k[i]),
                        tpc_proton: Float::from(self.n_sigma_tpc_p[i]),
                        tof_pion: Float::from(self.n_sigma_tof_pi[i]),
                        tof_kaon: Float::from(self.n_sigma_tof_k[i]),
                        tof_proton: Float::from(self.n_sigma_tof_p[i]),
                    },
                })
            })
            .collect()
    }
}

/// Fetch a named entry from a JSON object, listing the available entries if
/// it is not there
fn get_entry<'a>(object: &'a Map<String, Value>, name: &str, kind: &str) -> Result<&'a Value> {
    object.get(name).ok_or_else(|| {
        let available = object.keys().map(String::as_str).collect::<Vec<_>>();
        eyre!(
            "Can't find {} {}, available entries are: {}",
            kind,
            name,
            available.join(", ")
        )
    })
}

/// Load the track tree of a directory from a sample file
pub fn load_tracks(path: &Path, directory: &str) -> Result<Vec<Track>> {
    info!("Loading tracks from {}:{}", path.display(), directory);
    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open track sample {}", path.display()))?;
    let contents: Map<String, Value> = serde_json::from_reader(BufReader::new(file))
        .wrap_err_with(|| format!("Failed to parse track sample {}", path.display()))?;

    let directory_value = get_entry(&contents, directory, "directory")?;
    let directory_object = directory_value
        .as_object()
        .ok_or_else(|| eyre!("Entry {} is not a directory", directory))?;
    let tree = get_entry(directory_object, TRACK_TREE_NAME, "tree")?;
    let columns = TrackColumns::deserialize(tree)
        .wrap_err_with(|| format!("Malformed track tree in {}", directory))?;

    let tracks = columns.to_tracks()?;
    info!("Loaded {} tracks", tracks.len());
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mismatched_column_lengths_are_rejected() {
        let mut columns = TrackColumns::default();
        columns.push(&Track {
            pt: 1.234,
            clusters: ClusterCounts {
                total: 130.,
                pid: 90.,
                crossed_rows: 140.,
                findable: 150.,
            },
            tags: TrackTags::KAON_FROM_TOF,
            n_sigma: NSigma {
                tof_kaon: -2.,
                ..NSigma::default()
            },
        });
        let tracks = columns.to_tracks().unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].pt, 1.234);
        assert_eq!(tracks[0].clusters.pid, 90.);
        assert_eq!(tracks[0].n_sigma.tof_kaon, -2.);

        columns.tag.push(0);
        assert!(columns.to_tracks().is_err());
    }
}
