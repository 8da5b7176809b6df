//! End-to-end tests of the single-track uncertainty extraction

use serde_json::json;
use std::{fs, path::PathBuf};
use trackunc::{
    dataset::{Centrality, Dataset, RunSelection},
    numeric::Float,
    sample::{self, TrackColumns, TRACK_TREE_NAME},
    species::TrackSpecies,
    systematics::{ExtractionSettings, TrackingSystematicExtractor},
    track::{ClusterCounts, NSigma, Track, TrackTags},
};

/// Scratch directory which is cleaned up at the end of a test
struct ScratchDir(PathBuf);
//
impl ScratchDir {
    fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!("trackunc_{}_{}", name, std::process::id()));
        fs::create_dir_all(&path).unwrap();
        Self(path)
    }
}
//
impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.0);
    }
}

/// Tracks of every species, with a spread of momenta and cluster counts
fn synthetic_tracks() -> Vec<Track> {
    let tags = [
        TrackTags::PION_FROM_K0S,
        TrackTags::KAON_FROM_TOF,
        TrackTags::PROTON_FROM_LAMBDA,
        TrackTags::PION_FROM_TOF | TrackTags::POSITIVE_TRACK,
    ];
    (0..2000)
        .map(|i| Track {
            pt: 0.1 + 0.007 * (i as Float),
            clusters: ClusterCounts {
                total: 60. + (i % 100) as Float,
                pid: 40. + (i % 80) as Float,
                crossed_rows: 60. + (i % 100) as Float,
                findable: 150.,
            },
            tags: tags[i % tags.len()],
            n_sigma: NSigma {
                tpc_pion: (i % 7) as Float - 3.,
                tpc_proton: (i % 5) as Float - 2.,
                tof_pion: if i % 3 == 0 { 1. } else { 50. },
                tof_kaon: 50.,
                tof_proton: 50.,
                ..NSigma::default()
            },
        })
        .collect()
}

#[test]
fn identical_samples_have_no_uncertainty() {
    let scratch = ScratchDir::new("identical_samples");
    let run = RunSelection::new(Centrality::Central, Dataset::Lhc18r).unwrap();
    let mut columns = TrackColumns::default();
    for track in synthetic_tracks() {
        columns.push(&track);
    }
    let path = scratch.0.join("sample.json");
    let document = json!({
        (run.data_directory()): { (TRACK_TREE_NAME): &columns },
        (run.mc_directory()): { (TRACK_TREE_NAME): &columns },
    });
    fs::write(&path, document.to_string()).unwrap();

    let data = sample::load_tracks(&path, run.data_directory()).unwrap();
    let mc = sample::load_tracks(&path, run.mc_directory()).unwrap();
    assert_eq!(data.len(), 2000);

    let extractor = TrackingSystematicExtractor::new(ExtractionSettings::default()).unwrap();
    let results = extractor.extract(&data, &mc).unwrap();
    assert_eq!(results.len(), TrackSpecies::ALL.len());
    for species in &results {
        assert!(species.data.all.integral() > 0., "{:?}", species.species);
        for bin in 0..species.uncertainty.num_bins() {
            assert_eq!(
                species.uncertainty.bin_content(bin),
                0.,
                "{:?} bin {}",
                species.species,
                bin
            );
        }
    }
}

#[test]
fn missing_directories_are_reported() {
    let scratch = ScratchDir::new("missing_directory");
    let path = scratch.0.join("sample.json");
    let document = json!({ "SomeOtherDirectory": { (TRACK_TREE_NAME): TrackColumns::default() } });
    fs::write(&path, document.to_string()).unwrap();

    let err = sample::load_tracks(&path, "PWGHF_D2H_SystNsigmaPID_ppMB_kINT7")
        .unwrap_err()
        .to_string();
    assert!(err.contains("SomeOtherDirectory"), "{}", err);

    assert!(sample::load_tracks(&scratch.0.join("nowhere.json"), "dir").is_err());
}
