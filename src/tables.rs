//! Single-track uncertainty tables used by the toy Monte Carlo

use crate::{
    dataset::{Centrality, Dataset, RunSelection, SpeciesCutSet},
    histogram::BinnedTable,
    numeric::Float,
    species::TrackSpecies,
    Result,
};
use eyre::{bail, ensure, eyre, WrapErr};
use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};
use tracing::debug;

/// Transverse momentum binning of the ITS-TPC matching uncertainties (GeV/c)
pub const MATCHING_PT_EDGES: [Float; 15] = [
    0.5, 1., 2., 3., 4., 5., 6., 7., 8., 9., 10., 11., 12., 13., 14.,
];

// ITS-TPC matching uncertainties (%), per centrality class and period
const PION_MATCHING_010_Q: [Float; 14] = [3., 5., 6., 5., 4., 2., 3., 3., 3., 3., 2., 2., 1., 2.];
const PROTON_MATCHING_010_Q: [Float; 14] = [7., 4., 6., 7., 5., 3., 4., 2., 2., 2., 1., 1., 1., 1.];
const PION_MATCHING_010_R: [Float; 14] = [3., 5., 6., 5., 4., 2., 3., 2., 3., 2., 2., 2., 1., 1.];
const PROTON_MATCHING_010_R: [Float; 14] =
    [10., 4., 6., 7., 6., 3., 4., 2., 3., 2., 1., 2., 1., 1.];
const PION_MATCHING_3050_Q: [Float; 14] = [3., 4., 4., 4., 3., 2., 1., 1., 1., 1., 1., 1., 1., 1.];
const PROTON_MATCHING_3050_Q: [Float; 14] =
    [10., 4., 6., 5., 4., 2., 2., 1., 1., 1., 1., 1., 1., 1.];
const PION_MATCHING_3050_R: [Float; 14] = [3., 4., 4., 4., 3., 1., 2., 1., 2., 1., 1., 1., 1., 1.];
const PROTON_MATCHING_3050_R: [Float; 14] =
    [10., 4., 6., 5., 5., 2., 3., 1., 1., 1., 1., 1., 1., 1.];

/// Pion and proton uncertainties from one source
#[derive(Clone, Debug, PartialEq)]
pub struct PionProtonTables {
    /// Used for pions and kaons
    pub pion: BinnedTable,

    /// Used for protons
    pub proton: BinnedTable,
}
//
impl PionProtonTables {
    /// ITS-TPC matching uncertainties of a Pb-Pb run selection
    pub fn matching(run: &RunSelection) -> Result<Self> {
        ensure!(
            run.centrality.is_lead_lead(),
            "Matching uncertainties are only available for Pb-Pb, not {}",
            run.description()
        );
        let (pion, proton) = match (run.centrality, run.dataset) {
            (Centrality::Central, Dataset::Lhc18q) => (PION_MATCHING_010_Q, PROTON_MATCHING_010_Q),
            (Centrality::Central, Dataset::Lhc18r) => (PION_MATCHING_010_R, PROTON_MATCHING_010_R),
            (Centrality::SemiCentral, Dataset::Lhc18q) => {
                (PION_MATCHING_3050_Q, PROTON_MATCHING_3050_Q)
            }
            (Centrality::SemiCentral, Dataset::Lhc18r) => {
                (PION_MATCHING_3050_R, PROTON_MATCHING_3050_R)
            }
            _ => bail!(
                "No matching uncertainties are available for {}",
                run.description()
            ),
        };
        let table = |contents: [Float; 14]| {
            BinnedTable::from_contents(MATCHING_PT_EDGES.to_vec(), contents.to_vec())
        };
        Ok(Self {
            pion: table(pion)?,
            proton: table(proton)?,
        })
    }

    /// TPC uncertainties produced by the extraction for a run selection
    ///
    /// Pion uncertainties come from the extraction tuned for pions, proton
    /// uncertainties from the one tuned for protons.
    ///
    pub fn tpc(directory: &Path, run: &RunSelection) -> Result<Self> {
        let load = |cuts, species: TrackSpecies| -> Result<BinnedTable> {
            let path = tpc_table_path(directory, run, cuts);
            Ok(TableFile::load(&path)?
                .get(&species.uncertainty_key())?
                .clone())
        };
        Ok(Self {
            pion: load(SpeciesCutSet::PionCuts, TrackSpecies::Pion)?,
            proton: load(SpeciesCutSet::ProtonCuts, TrackSpecies::Proton)?,
        })
    }
}

/// Location of the TPC uncertainty file of a run selection and cut tuning
pub fn tpc_table_path(directory: &Path, run: &RunSelection, cuts: SpeciesCutSet) -> PathBuf {
    directory.join(format!(
        "TrackingTPCCutUnc{}{}_3sigmaTPC.json",
        run.file_suffix(),
        cuts.file_suffix()
    ))
}

/// Named tables, as stored in a JSON file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableFile {
    /// Where the tables were loaded from, for diagnostics
    path: PathBuf,

    /// Tables, by name
    tables: BTreeMap<String, BinnedTable>,
}
//
impl TableFile {
    /// Load a table file
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .wrap_err_with(|| format!("Could not open table file {}", path.display()))?;
        let tables: BTreeMap<String, BinnedTable> =
            serde_json::from_reader(BufReader::new(file))
                .wrap_err_with(|| format!("Could not parse table file {}", path.display()))?;
        debug!("Loaded {} tables from {}", tables.len(), path.display());
        Ok(Self {
            path: path.to_owned(),
            tables,
        })
    }

    /// Access a table, failing with the list of available tables if absent
    pub fn get(&self, name: &str) -> Result<&BinnedTable> {
        self.tables.get(name).ok_or_else(|| {
            eyre!(
                "No table \"{}\" in {}, available tables: {}",
                name,
                self.path.display(),
                self.tables.keys().cloned().collect::<Vec<_>>().join(", ")
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn matching_tables() {
        let run = RunSelection::new(Centrality::Central, Dataset::Lhc18r).unwrap();
        let tables = PionProtonTables::matching(&run).unwrap();
        assert_eq!(tables.proton.lookup(0.7), 10.);
        assert_eq!(tables.pion.lookup(1.5), 5.);
        assert_eq!(tables.pion.lookup(20.), 1.);

        let merged = RunSelection::new(Centrality::Central, Dataset::Lhc18qr).unwrap();
        assert!(PionProtonTables::matching(&merged).is_err());

        let pp = RunSelection::new(Centrality::Pp, Dataset::Lhc17pq).unwrap();
        let err = PionProtonTables::matching(&pp).unwrap_err().to_string();
        assert!(err.contains("only available for Pb-Pb"), "{}", err);
    }

    #[test]
    fn missing_tables_are_listed() {
        let dir = std::env::temp_dir().join(format!("trackunc_tables_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let run = RunSelection::new(Centrality::SemiCentral, Dataset::Lhc18q).unwrap();
        let table = BinnedTable::from_contents(vec![0., 1., 2.], vec![1., 2.]).unwrap();
        for cuts in [SpeciesCutSet::PionCuts, SpeciesCutSet::ProtonCuts] {
            let path = tpc_table_path(&dir, &run, cuts);
            let mut tables = BTreeMap::new();
            tables.insert("hunc_pion", &table);
            fs::write(&path, serde_json::to_string(&tables).unwrap()).unwrap();
        }
        assert_eq!(
            tpc_table_path(&dir, &run, SpeciesCutSet::PionCuts).file_name().unwrap(),
            "TrackingTPCCutUnc_semicent_18q_pionCuts_3sigmaTPC.json"
        );

        let err = PionProtonTables::tpc(&dir, &run).unwrap_err().to_string();
        assert!(err.contains("hunc_proton") && err.contains("hunc_pion"), "{}", err);
        fs::remove_dir_all(dir).unwrap();
    }
}
