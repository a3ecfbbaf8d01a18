pub mod boq;
pub mod rate;

pub use boq::{EstimationResult, PricedItem, RateSource, RowDiagnostic, SourceRow};
pub use rate::RateRecord;
