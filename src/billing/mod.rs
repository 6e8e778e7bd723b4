pub mod budget;
pub mod consumption;
pub mod engine;
pub mod estimator;
pub mod recommendations;
pub mod tariff;

pub use budget::*;
pub use consumption::*;
pub use engine::*;
pub use estimator::*;
pub use recommendations::*;
pub use tariff::*;
