//! ggibench-algorithms: Uniform invocation layer over network enrichment
//! algorithms.
//!
//! Every algorithm is reached through [`AlgorithmWrapper`]; the
//! [`AlgorithmRegistry`] maps an [`AlgorithmSelector`] to its wrapper.
//!
//! [`AlgorithmSelector`]: ggibench_common::AlgorithmSelector

pub mod wrapper;
pub mod registry;
pub mod external;
pub mod tools;
pub mod mock;

pub use wrapper::AlgorithmWrapper;
pub use registry::AlgorithmRegistry;
pub use external::{ExternalTool, ExternalToolWrapper, ToolInputs};
pub use mock::MockAlgorithmWrapper;
