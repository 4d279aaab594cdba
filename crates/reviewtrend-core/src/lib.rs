pub mod config;
pub mod dates_of_interest;
pub mod dual_band_filter;
pub mod error;
pub mod imputation;
pub mod logging;
pub mod pipelines;
pub mod resampler;
pub mod statistics;
pub mod timestamp_disambiguator;
pub mod types;
pub mod validation;

pub use config::{ConfigError, PipelineConfig, ResolvedConfig};
pub use error::{PipelineError, Result};
pub use pipelines::{run, run_resolved, run_text, PipelineOutput};
