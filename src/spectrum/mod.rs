//! Transverse momentum spectra of generated parents

mod tabulated;

use crate::{
    config::{option_name, parse_option, UnknownOption},
    decay::DecayChannel,
    numeric::Float,
    random::RandomGenerator,
    Result,
};
use eyre::ensure;
use std::{fmt, str::FromStr};

/// Range over which parent transverse momenta are generated (GeV/c)
pub const PT_RANGE: (Float, Float) = (0., 40.);

/// Number of points at which analytical spectra are sampled
pub const FUNCTION_POINTS: usize = 10_000;

/// Transverse momentum spectrum model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PtShape {
    /// Uniform over the generated pT range
    Flat,
    /// FONLL, prompt, 8 TeV
    Fonll8TeV,
    /// FONLL, feed-down, 8 TeV
    Fonll8TeVFeedDown,
    /// FONLL, prompt, 7 TeV
    Fonll7TeV,
    /// PYTHIA, 7 TeV
    Pythia7TeV,
    /// FONLL, prompt, 5 TeV
    Fonll5TeV,
    /// FONLL, prompt, 13 TeV, tabulated
    Fonll13TeVPrompt,
    /// FONLL, feed-down, 13 TeV, tabulated
    Fonll13TeVFeedDown,
    /// PYTHIA, prompt, 13 TeV, tabulated
    Pythia13TeVPrompt,
    /// PYTHIA, feed-down, 13 TeV, tabulated
    Pythia13TeVFeedDown,
}
//
impl PtShape {
    const CHOICES: [(&'static str, Self); 10] = [
        ("flat", Self::Flat),
        ("fonll8", Self::Fonll8TeV),
        ("fonll8feeddown", Self::Fonll8TeVFeedDown),
        ("fonll7", Self::Fonll7TeV),
        ("pythia7", Self::Pythia7TeV),
        ("fonll5", Self::Fonll5TeV),
        ("fonll13prompt", Self::Fonll13TeVPrompt),
        ("fonll13feeddown", Self::Fonll13TeVFeedDown),
        ("pythia13prompt", Self::Pythia13TeVPrompt),
        ("pythia13feeddown", Self::Pythia13TeVFeedDown),
    ];

    /// Parameters (A, B, C, D) of the `A x / (1 + (x/B)^D)^C` parametrization
    fn power_law_parameters(self) -> Option<[Float; 4]> {
        match self {
            Self::Fonll8TeV => Some([0.518046, 3.01138, 3.38914, 1.75899]),
            Self::Fonll8TeVFeedDown => Some([0.398252, 3.9603, 3.915, 1.51853]),
            Self::Fonll7TeV => Some([0.322643, 2.96275, 2.30301, 2.5]),
            Self::Fonll5TeV => Some([0.302879, 2.9750, 3.68139, 1.68855]),
            Self::Pythia7TeV => Some([0.322643, 1.94635, 1.40463, 2.5]),
            _ => None,
        }
    }

    /// Tabulated spectrum used for a decay channel, with its name
    fn tabulated(self, channel: DecayChannel) -> Option<(&'static str, &'static [Float])> {
        use self::tabulated::*;
        use DecayChannel::*;
        match (self, channel) {
            (Self::Fonll13TeVPrompt, DplusKpipi) => Some(("promptDplus", &FONLL13_PROMPT_DPLUS[..])),
            (Self::Fonll13TeVPrompt, DstarD0pi) => Some(("promptDstar", &FONLL13_PROMPT_DSTAR[..])),
            (Self::Fonll13TeVPrompt, _) => Some(("promptD0", &FONLL13_PROMPT_D0[..])),
            (Self::Fonll13TeVFeedDown, DstarD0pi) => {
                Some(("feeddownDstar", &FONLL13_FEEDDOWN_DSTAR[..]))
            }
            (Self::Fonll13TeVFeedDown, _) => Some(("feeddownD", &FONLL13_FEEDDOWN_D[..])),
            (Self::Pythia13TeVPrompt, DplusKpipi) => Some(("promptDplus", &PYTHIA13_PROMPT_DPLUS[..])),
            (Self::Pythia13TeVPrompt, DstarD0pi) => Some(("promptDstar", &PYTHIA13_PROMPT_DSTAR[..])),
            (Self::Pythia13TeVPrompt, DsKKpi) => Some(("promptDs", &PYTHIA13_PROMPT_DS[..])),
            (Self::Pythia13TeVPrompt, _) => Some(("promptD0", &PYTHIA13_PROMPT_D0[..])),
            (Self::Pythia13TeVFeedDown, DplusKpipi) => {
                Some(("feeddownDplus", &PYTHIA13_FEEDDOWN_DPLUS[..]))
            }
            (Self::Pythia13TeVFeedDown, DstarD0pi) => {
                Some(("feeddownDstar", &PYTHIA13_FEEDDOWN_DSTAR[..]))
            }
            (Self::Pythia13TeVFeedDown, DsKKpi) => Some(("feeddownDs", &PYTHIA13_FEEDDOWN_DS[..])),
            (Self::Pythia13TeVFeedDown, _) => Some(("feeddownD0", &PYTHIA13_FEEDDOWN_D0[..])),
            _ => None,
        }
    }

    /// Suffix of the output file names for a decay channel
    pub fn file_suffix(self, channel: DecayChannel) -> String {
        match self {
            Self::Flat => "flatpt".to_owned(),
            Self::Fonll8TeV => "FONLL8ptshape".to_owned(),
            Self::Fonll8TeVFeedDown => "FONLL8ptshapeFeedDown".to_owned(),
            Self::Fonll7TeV => "FONLL7ptshape".to_owned(),
            Self::Pythia7TeV => "PYTHIA7ptshape".to_owned(),
            Self::Fonll5TeV => "FONLL5ptshape".to_owned(),
            Self::Fonll13TeVPrompt | Self::Fonll13TeVFeedDown => {
                let name = self.tabulated(channel).map_or("", |(name, _)| name);
                format!("{}FONLL13ptshape", name)
            }
            Self::Pythia13TeVPrompt | Self::Pythia13TeVFeedDown => {
                let name = self.tabulated(channel).map_or("", |(name, _)| name);
                format!("{}PYTHIA13ptshape", name)
            }
        }
    }

    /// Set up a sampler of this spectrum for a decay channel
    pub fn sampler(self, channel: DecayChannel) -> Result<PtSampler> {
        let (low, high) = PT_RANGE;
        if let Some([a, b, c, d]) = self.power_law_parameters() {
            PtSampler::from_function(low, high, FUNCTION_POINTS, |x| {
                a * x / (1. + (x / b).powf(d)).powf(c)
            })
        } else if let Some((_, contents)) = self.tabulated(channel) {
            PtSampler::from_histogram(low, high, contents)
        } else {
            PtSampler::from_function(low, high, FUNCTION_POINTS, |_| 1.)
        }
    }
}
//
impl FromStr for PtShape {
    type Err = UnknownOption;

    fn from_str(s: &str) -> std::result::Result<Self, UnknownOption> {
        parse_option("pT shape", s, &Self::CHOICES)
    }
}
//
impl fmt::Display for PtShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(option_name(self, &Self::CHOICES))
    }
}

/// Inverse-CDF sampler of a piecewise constant distribution
#[derive(Clone, Debug, PartialEq)]
pub struct PtSampler {
    /// Lower bound of the sampled range
    low: Float,

    /// Width of each piece
    width: Float,

    /// Normalized cumulative distribution at the upper edge of each piece
    cdf: Vec<Float>,
}
//
impl PtSampler {
    /// Sample a density evaluated at the center of `num_points` equal pieces
    pub fn from_function(
        low: Float,
        high: Float,
        num_points: usize,
        density: impl Fn(Float) -> Float,
    ) -> Result<Self> {
        ensure!(num_points > 0, "Need at least one sampling point");
        let width = (high - low) / (num_points as Float);
        let contents = (0..num_points)
            .map(|i| density(low + (i as Float + 0.5) * width))
            .collect::<Vec<_>>();
        Self::from_histogram(low, high, &contents)
    }

    /// Sample a histogram with equal-width bins spanning [low, high)
    pub fn from_histogram(low: Float, high: Float, contents: &[Float]) -> Result<Self> {
        ensure!(high > low, "Empty sampling range [{}, {})", low, high);
        ensure!(!contents.is_empty(), "Need at least one histogram bin");
        ensure!(
            contents.iter().all(|&c| c >= 0. && c.is_finite()),
            "Densities must be finite and non-negative"
        );
        let mut cdf = contents
            .iter()
            .scan(0., |sum, &c| {
                *sum += c;
                Some(*sum)
            })
            .collect::<Vec<_>>();
        let total = cdf[cdf.len() - 1];
        ensure!(total > 0., "Cannot sample a distribution of zero integral");
        cdf.iter_mut().for_each(|c| *c /= total);
        Ok(Self {
            low,
            width: (high - low) / (contents.len() as Float),
            cdf,
        })
    }

    /// Draw a value
    pub fn sample(&self, rng: &mut RandomGenerator) -> Float {
        let r = rng.random();
        let piece = self
            .cdf
            .partition_point(|&c| c <= r)
            .min(self.cdf.len() - 1);
        let below = if piece == 0 { 0. } else { self.cdf[piece - 1] };
        let fraction = if self.cdf[piece] > below {
            (r - below) / (self.cdf[piece] - below)
        } else {
            0.5
        };
        self.low + (piece as Float + fraction) * self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::DEFAULT_SEED;

    #[test]
    fn flat_samples_cover_the_range() {
        let sampler = PtShape::Flat.sampler(DecayChannel::D0Kpi).unwrap();
        let mut rng = RandomGenerator::new(DEFAULT_SEED);
        let samples = (0..10_000).map(|_| sampler.sample(&mut rng)).collect::<Vec<_>>();
        assert!(samples.iter().all(|&x| (0. ..40.).contains(&x)));
        let mean = samples.iter().sum::<Float>() / samples.len() as Float;
        assert!((mean - 20.).abs() < 0.5, "mean = {}", mean);
    }

    #[test]
    fn histogram_sampling_respects_empty_bins() {
        let sampler = PtSampler::from_histogram(0., 3., &[0., 1., 0.]).unwrap();
        let mut rng = RandomGenerator::new(DEFAULT_SEED);
        for _ in 0..1000 {
            let x = sampler.sample(&mut rng);
            assert!((1. ..2.).contains(&x), "{}", x);
        }
        assert!(PtSampler::from_histogram(0., 1., &[0., 0.]).is_err());
    }

    #[test]
    fn fonll_spectra_peak_at_low_pt() {
        let sampler = PtShape::Fonll5TeV.sampler(DecayChannel::LcpKpi).unwrap();
        let mut rng = RandomGenerator::new(DEFAULT_SEED);
        let below_5 = (0..10_000)
            .filter(|_| sampler.sample(&mut rng) < 5.)
            .count();
        assert!(below_5 > 5_000);
    }

    #[test]
    fn file_suffixes() {
        assert_eq!(
            PtShape::Fonll13TeVPrompt.file_suffix(DecayChannel::DstarD0pi),
            "promptDstarFONLL13ptshape"
        );
        assert_eq!(
            PtShape::Fonll13TeVFeedDown.file_suffix(DecayChannel::LcpKpi),
            "feeddownDFONLL13ptshape"
        );
        assert_eq!(
            PtShape::Pythia13TeVPrompt.file_suffix(DecayChannel::DsKKpi),
            "promptDsPYTHIA13ptshape"
        );
        assert_eq!(PtShape::Flat.file_suffix(DecayChannel::LcK0Sp), "flatpt");
        assert_eq!("FONLL8FeedDown".parse::<PtShape>().unwrap(), PtShape::Fonll8TeVFeedDown);
    }
}
