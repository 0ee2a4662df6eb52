pub mod plan;
pub mod reports;
pub mod tester;

pub use plan::{BookingSpec, QuotePlan, QuoteSummary};
pub use tester::*;
