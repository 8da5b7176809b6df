//! This module is in charge of outputting the final results to disk

use crate::{
    accumulate::ToyResults,
    config::{ExtractionConfiguration, ToyConfiguration},
    histogram::{BinnedTable, Profile},
    numeric::{reals, Float},
    systematics::SpeciesSystematics,
    toymc, Result,
};
use eyre::WrapErr;
use std::{
    collections::BTreeMap,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tracing::info;

// Number of significant digits in text output
const SIG_DIGITS: usize = (reals::DIGITS - 1) as usize;

/// Separator between sections of the text summaries
const SEPARATOR: &str = "---------------------------------------------";

/// Output the single-track uncertainties and intermediate tables to disk
pub fn dump_extraction(
    cfg: &ExtractionConfiguration,
    results: &[SpeciesSystematics],
    elapsed_time: Duration,
) -> Result<()> {
    // Every table is stored under a unique name, which is what later runs of
    // the toy Monte Carlo look up
    let tables = results
        .iter()
        .flat_map(SpeciesSystematics::named_tables)
        .collect::<BTreeMap<String, &BinnedTable>>();
    let json = serde_json::to_vec_pretty(&tables).wrap_err("Could not serialize the tables")?;

    let mut txt = Vec::new();
    let txt_ref = &mut txt;
    writeln_3p(txt_ref, &timestamp()?[..])?;
    writeln_3p(txt_ref, ("Run selection", &cfg.run.description()[..]))?;
    writeln_3p(txt_ref, ("Species cut tuning", &cfg.species_cuts.to_string()[..]))?;
    match cfg.settings.pid_gate {
        Some(gate) => writeln_3p(txt_ref, ("Proton PID gate", gate))?,
        None => writeln_3p(txt_ref, ("Proton PID gate", "disabled"))?,
    }
    writeln_3p(txt_ref, ("Proton minimal pT (GeV/c)", cfg.settings.proton_min_pt))?;
    writeln_3p(txt_ref, ("Elapsed time (s)", elapsed_time.as_secs_f64()))?;
    for species in results {
        writeln_3p(txt_ref, SEPARATOR)?;
        writeln_3p(txt_ref, ("Species", species.species.name()))?;
        write_table(txt_ref, &species.uncertainty)?;
    }

    let json_path = write_outputs(&cfg.output_dir, &cfg.output_stem(), json, txt)?;
    info!("Wrote uncertainty tables to {}", json_path.display());
    Ok(())
}

/// Output the toy Monte Carlo results to disk
pub fn dump_toy_results(
    cfg: &ToyConfiguration,
    results: &ToyResults,
    elapsed_time: Duration,
) -> Result<()> {
    let json = serde_json::to_vec_pretty(results).wrap_err("Could not serialize the results")?;

    let mut txt = Vec::new();
    let txt_ref = &mut txt;
    let acc = &results.accumulator;
    writeln_3p(txt_ref, &timestamp()?[..])?;
    writeln_3p(txt_ref, ("Decay channel", &cfg.channel.to_string()[..]))?;
    writeln_3p(txt_ref, ("Run selection", &cfg.run.description()[..]))?;
    writeln_3p(txt_ref, ("pT shape", &cfg.pt_shape.to_string()[..]))?;
    writeln_3p(txt_ref, ("Proton TPC uncertainty", &cfg.proton_tpc.to_string()[..]))?;
    writeln_3p(txt_ref, ("Random seed", &cfg.seed.to_string()[..]))?;
    writeln_3p(txt_ref, SEPARATOR)?;
    writeln_3p(txt_ref, ("Number of trials", acc.trials()))?;
    writeln_3p(txt_ref, ("... used", acc.accepted()))?;
    for (kind, &count) in acc.rejections() {
        writeln_3p(txt_ref, (&format!("... rejected ({})", kind)[..], count))?;
    }
    for (channel, count) in &results.resonant_channels {
        writeln_3p(txt_ref, (&format!("... through {:?}", channel)[..], *count))?;
    }
    let elapsed_secs = elapsed_time.as_secs_f64();
    writeln_3p(txt_ref, ("Elapsed time (s)", elapsed_secs))?;
    writeln_3p(txt_ref, ("Time per trial (s)", elapsed_secs / acc.trials() as Float))?;
    for (name, profile) in [
        ("Total uncertainty (%)", &results.binned_profiles.total),
        ("TPC uncertainty (%)", &results.binned_profiles.tpc),
        ("Matching uncertainty (%)", &results.binned_profiles.matching),
    ] {
        writeln_3p(txt_ref, SEPARATOR)?;
        writeln_3p(txt_ref, name)?;
        write_profile(txt_ref, profile)?;
    }

    let json_path = write_outputs(&cfg.output_dir, &toymc::output_stem(cfg), json, txt)?;
    info!("Wrote toy Monte Carlo results to {}", json_path.display());
    Ok(())
}

/// Write the JSON document and text summary of a run, or neither of them
///
/// Both documents must be fully rendered beforehand. If the second file cannot
/// be written, the first one is removed again. Returns the JSON file path.
///
fn write_outputs(directory: &Path, stem: &str, json: Vec<u8>, txt: Vec<u8>) -> Result<PathBuf> {
    fs::create_dir_all(directory)
        .wrap_err_with(|| format!("Could not create output directory {}", directory.display()))?;
    let json_path = directory.join(format!("{}.json", stem));
    let txt_path = directory.join(format!("{}.txt", stem));

    write_file(&json_path, &json)?;
    if let Err(e) = write_file(&txt_path, &txt) {
        // Never leave a lone JSON document behind
        let _ = fs::remove_file(&json_path);
        return Err(e);
    }
    Ok(json_path)
}

/// Write a rendered document into a file
fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).wrap_err_with(|| format!("Could not write output file {}", path.display()))
}

/// Timestamp of the end of the run
fn timestamp() -> Result<String> {
    Ok(OffsetDateTime::now_utc().format(&Rfc3339)?)
}

/// Write down the contents of a table, one bin per line
fn write_table(writer: &mut impl Write, table: &BinnedTable) -> io::Result<()> {
    for bin in 0..table.num_bins() {
        let label = bin_label(table.bin_low_edge(bin), table.bin_high_edge(bin));
        writeln_3p(writer, (&label[..], table.bin_content(bin)))?;
    }
    Ok(())
}

/// Write down the populated bins of a profile, one bin per line
fn write_profile(writer: &mut impl Write, profile: &Profile) -> io::Result<()> {
    for bin in 0..profile.axis.num_bins() {
        if profile.entries[bin] == 0. {
            continue;
        }
        let label = bin_label(profile.axis.bin_low_edge(bin), profile.axis.bin_high_edge(bin));
        write!(writer, " ")?;
        (&label[..], profile.mean[bin]).write(writer)?;
        write!(writer, " +/- ")?;
        profile.error[bin].write(writer)?;
        writeln!(writer)?;
    }
    Ok(())
}

/// Label of a transverse momentum bin
fn bin_label(low: Float, high: Float) -> String {
    let mut low_str = Vec::new();
    let mut high_str = Vec::new();
    // Writing to memory cannot fail
    let _ = write_engineering(&mut low_str, low, SIG_DIGITS);
    let _ = write_engineering(&mut high_str, high, SIG_DIGITS);
    format!(
        "pT {} - {} GeV/c",
        String::from_utf8_lossy(&low_str),
        String::from_utf8_lossy(&high_str)
    )
}

/// Text output facility that uses fixed-size columns for key-value pairs
fn writeln_3p(writer: &mut impl Write, data: impl WriteSummary) -> io::Result<()> {
    write!(writer, " ")?;
    data.write(writer)?;
    writeln!(writer)
}

/// Trait implemented by things which can be printed in text summaries
trait WriteSummary: Sized {
    /// Write down `self` to the output file in text summary style
    fn write(self, writer: &mut impl Write) -> io::Result<()>;
}

impl WriteSummary for &str {
    // Strings work in the usual way
    fn write(self, writer: &mut impl Write) -> io::Result<()> {
        write!(writer, "{}", self)
    }
}

impl WriteSummary for usize {
    // Integers work in the usual way too
    fn write(self, writer: &mut impl Write) -> io::Result<()> {
        write!(writer, "{}", self)
    }
}

impl WriteSummary for Float {
    // This is a close approximation of printf's %g
    fn write(self, writer: &mut impl Write) -> io::Result<()> {
        write_engineering(writer, self, SIG_DIGITS)
    }
}

impl<T: WriteSummary> WriteSummary for (&str, T) {
    // Key-value output that uses fixed-size columns for better readability
    fn write(self, writer: &mut impl Write) -> io::Result<()> {
        write!(writer, "{:<31}: ", self.0)?;
        self.1.write(writer)
    }
}

/// Write a floating-point number using "engineering" notation
///
/// Analogous to the %g format of the C printf function, this method switches
/// between naive and scientific notation for floating-point numbers when the
/// number being printed becomes so small that printing leading zeroes could end
/// up larger than the scientific notation, or so large that we would be forced
/// to print more significant digits than requested.
///
fn write_engineering(writer: &mut impl Write, x: Float, sig_digits: usize) -> io::Result<()> {
    let mut precision = sig_digits - 1;
    if x == 0. {
        // Zero is special because you can't take its log
        write!(writer, "0")
    } else {
        // Otherwise, use log to evaluate order of magnitude
        let log_x = x.abs().log10();
        if log_x >= -3. && log_x <= (sig_digits as Float) {
            // Print using naive notation, adjusting Rust's precision (which
            // counts digits after the decimal point) to the magnitude
            precision = precision.saturating_sub(log_x.trunc().max(0.) as usize)
                + (-log_x.trunc()).max(0.) as usize;

            // Numbers smaller than 1 must get one extra digit since the leading
            // zero does not count as a significant digit.
            if log_x < 0. {
                precision += 1
            }

            // Trailing zeros and decimal point are dropped, but integer
            // numbers have none to drop
            let str_with_zeros = format!("{:.1$}", x, precision);
            if str_with_zeros.contains('.') {
                write!(
                    writer,
                    "{}",
                    str_with_zeros.trim_end_matches('0').trim_end_matches('.')
                )
            } else {
                write!(writer, "{}", str_with_zeros)
            }
        } else {
            // Print using scientific notation
            write!(writer, "{:.1$e}", x, precision)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engineering(x: Float, sig_digits: usize) -> String {
        let mut buf = Vec::new();
        write_engineering(&mut buf, x, sig_digits).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn engineering_notation() {
        assert_eq!(engineering(0., 6), "0");
        assert_eq!(engineering(2.5, 6), "2.5");
        assert_eq!(engineering(100., 6), "100");
        assert_eq!(engineering(0.0125, 6), "0.0125");
        assert_eq!(engineering(1.5e-7, 3), "1.50e-7");
        assert_eq!(engineering(100., 2), "100");
    }

    #[test]
    fn failed_dumps_leave_nothing_behind() {
        use crate::{
            dataset::{Centrality, Dataset, RunSelection, SpeciesCutSet},
            systematics::ExtractionSettings,
        };

        let output_dir =
            std::env::temp_dir().join(format!("trackunc_failed_dump_{}", std::process::id()));
        let cfg = ExtractionConfiguration {
            data_path: PathBuf::from("data.json"),
            mc_path: PathBuf::from("mc.json"),
            run: RunSelection::new(Centrality::Central, Dataset::Lhc18q).unwrap(),
            species_cuts: SpeciesCutSet::PionCuts,
            settings: ExtractionSettings::default(),
            output_dir: output_dir.clone(),
        };
        let stem = cfg.output_stem();

        // A directory where the text summary should go makes it unwritable
        fs::create_dir_all(output_dir.join(format!("{}.txt", stem))).unwrap();
        assert!(dump_extraction(&cfg, &[], Duration::from_secs(1)).is_err());
        assert!(!output_dir.join(format!("{}.json", stem)).exists());

        // Once the obstacle is gone, both files are written
        fs::remove_dir(output_dir.join(format!("{}.txt", stem))).unwrap();
        dump_extraction(&cfg, &[], Duration::from_secs(1)).unwrap();
        assert!(output_dir.join(format!("{}.json", stem)).is_file());
        assert!(output_dir.join(format!("{}.txt", stem)).is_file());
        fs::remove_dir_all(output_dir).unwrap();
    }

    #[test]
    fn key_value_lines() {
        let mut buf = Vec::new();
        writeln_3p(&mut buf, ("Number of trials", 42usize)).unwrap();
        let line = String::from_utf8(buf).unwrap();
        assert_eq!(line, format!(" {:<31}: 42\n", "Number of trials"));
        assert_eq!(bin_label(0.5, 1.), "pT 0.5 - 1 GeV/c");
    }
}
