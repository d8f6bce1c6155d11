//! Closed selector sets whose cross-product defines one benchmark run.
//!
//! Every selector parses from its variant name (case-insensitive), is
//! serialised as that name, and rejects unknown values with a
//! [`GgiBenchError::Config`] listing what is accepted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::GgiBenchError;

/// Common surface of the selector enums.
pub trait Selector: Sized + Copy + 'static {
    /// Human-readable kind, used in error messages.
    const KIND: &'static str;

    /// Every variant, in declaration order.
    fn all() -> &'static [Self];

    /// Canonical variant name (e.g. `"SCALE_FREE"`).
    fn name(&self) -> &'static str;

    /// Additional accepted spellings.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }
}

fn parse_selector<T: Selector>(s: &str) -> Result<T, GgiBenchError> {
    let wanted = s.trim();
    T::all()
        .iter()
        .copied()
        .find(|v| {
            v.name().eq_ignore_ascii_case(wanted)
                || v.aliases().iter().any(|a| a.eq_ignore_ascii_case(wanted))
        })
        .ok_or_else(|| {
            let accepted: Vec<&str> = T::all().iter().map(|v| v.name()).collect();
            GgiBenchError::Config(format!(
                "unknown {} '{}', expected one of: {}",
                T::KIND,
                wanted,
                accepted.join(", ")
            ))
        })
}

/// Serde goes through [`FromStr`], so configuration files accept the same
/// spellings as the command line.
fn deserialize_selector<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Selector,
{
    let raw = String::deserialize(deserializer)?;
    parse_selector(&raw).map_err(serde::de::Error::custom)
}

// ── Conditions ───────────────────────────────────────────────────────────────

/// Disease condition (GEO data set) the benchmark runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConditionSelector {
    /// Amyotrophic lateral sclerosis
    Als,
    /// Lung cancer
    Lc,
    /// Ulcerative colitis
    Uc,
    /// Huntington's disease
    Hd,
}

impl ConditionSelector {
    /// GEO accession of the expression data set.
    pub fn accession(&self) -> &'static str {
        match self {
            Self::Als => "GSE112680",
            Self::Lc => "GSE30219",
            Self::Uc => "GSE75214",
            Self::Hd => "GSE3790",
        }
    }

    /// KEGG pathways associated with the condition.
    pub fn pathways(&self) -> &'static [&'static str] {
        match self {
            Self::Als => &["hsa05014"],
            Self::Lc => &["hsa05223"],
            Self::Uc => &["hsa04060", "hsa04630", "hsa05321"],
            Self::Hd => &["hsa05016"],
        }
    }
}

impl Selector for ConditionSelector {
    const KIND: &'static str = "condition";

    fn all() -> &'static [Self] {
        &[Self::Als, Self::Lc, Self::Uc, Self::Hd]
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Als => "ALS",
            Self::Lc => "LC",
            Self::Uc => "UC",
            Self::Hd => "HD",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Als => &["GSE112680"],
            Self::Lc => &["GSE30219"],
            Self::Uc => &["GSE75214"],
            Self::Hd => &["GSE3790"],
        }
    }
}

/// Displays the GEO accession, which is how conditions are laid out on disk.
impl fmt::Display for ConditionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.accession())
    }
}

impl FromStr for ConditionSelector {
    type Err = GgiBenchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

impl<'de> Deserialize<'de> for ConditionSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_selector(deserializer)
    }
}

// ── GGI networks ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GgiNetworkSelector {
    Biogrid,
    Hprd,
    String,
    Apid,
    Iid,
}

impl Selector for GgiNetworkSelector {
    const KIND: &'static str = "GGI network";

    fn all() -> &'static [Self] {
        &[Self::Biogrid, Self::Hprd, Self::String, Self::Apid, Self::Iid]
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Biogrid => "BIOGRID",
            Self::Hprd => "HPRD",
            Self::String => "STRING",
            Self::Apid => "APID",
            Self::Iid => "IID",
        }
    }
}

impl fmt::Display for GgiNetworkSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GgiNetworkSelector {
    type Err = GgiBenchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

impl<'de> Deserialize<'de> for GgiNetworkSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_selector(deserializer)
    }
}

// ── Network generators ───────────────────────────────────────────────────────

/// Strategy used to derive the network handed to the algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NetworkGeneratorSelector {
    /// The loaded network, untouched.
    Original,
    /// Degree-preserving edge swaps.
    Rewired,
    /// Same topology, gene identifiers permuted over nodes.
    Shuffled,
    /// Barabási–Albert preferential attachment.
    ScaleFree,
    /// Erdős–Rényi with the original node and edge counts.
    Uniform,
}

impl Selector for NetworkGeneratorSelector {
    const KIND: &'static str = "network generator";

    fn all() -> &'static [Self] {
        &[Self::Original, Self::Rewired, Self::Shuffled, Self::ScaleFree, Self::Uniform]
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Original => "ORIGINAL",
            Self::Rewired => "REWIRED",
            Self::Shuffled => "SHUFFLED",
            Self::ScaleFree => "SCALE_FREE",
            Self::Uniform => "UNIFORM",
        }
    }
}

impl fmt::Display for NetworkGeneratorSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NetworkGeneratorSelector {
    type Err = GgiBenchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

impl<'de> Deserialize<'de> for NetworkGeneratorSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_selector(deserializer)
    }
}

// ── Algorithms ───────────────────────────────────────────────────────────────

/// Network enrichment algorithm under benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlgorithmSelector {
    Diamond,
    Gxna,
    Clustex2,
    Hotnet,
}

impl Selector for AlgorithmSelector {
    const KIND: &'static str = "algorithm";

    fn all() -> &'static [Self] {
        &[Self::Diamond, Self::Gxna, Self::Clustex2, Self::Hotnet]
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Diamond => "DIAMOND",
            Self::Gxna => "GXNA",
            Self::Clustex2 => "CLUSTEX2",
            Self::Hotnet => "HOTNET",
        }
    }
}

impl fmt::Display for AlgorithmSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AlgorithmSelector {
    type Err = GgiBenchError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_selector(s)
    }
}

impl<'de> Deserialize<'de> for AlgorithmSelector {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_selector(deserializer)
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
