//! File protocols of the supported enrichment programs.

pub mod diamond;
pub mod gxna;
pub mod clustex2;
pub mod hotnet;

pub use diamond::Diamond;
pub use gxna::Gxna;
pub use clustex2::ClustEx2;
pub use hotnet::HotNet;

/// Name of the result file every tool writes into its working directory.
pub const OUTPUT_FILE: &str = "module.txt";
