pub mod config;
pub mod junction;
pub mod layers;
pub mod params;
pub mod pipeline;
pub mod profiles;
pub mod types;

pub use config::{BuildConfig, BuildTarget};
pub use junction::RunningBase;
pub use params::{DesignParams, LayerParams, ParamOverride};
pub use pipeline::{build, BuildOutput};
pub use types::*;
