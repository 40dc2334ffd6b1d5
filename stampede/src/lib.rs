#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod scenario;

pub mod check;
#[doc(hidden)]
pub mod request;

pub(crate) mod executor;
pub(crate) mod ramp;
pub(crate) mod thresholds;

pub use scenario::Scenario;
pub use stampede_macros::{request, scenario};

#[doc(hidden)]
pub mod core {
    pub use stampede_core::*;
}

pub mod prelude {
    pub use crate::check::check;
    pub use crate::scenario::ConfigurableScenario;
    pub use stampede_core::{RampStage, RunReport, Threshold};
    pub use stampede_macros::{request, scenario};
}
