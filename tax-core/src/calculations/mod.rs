//! Tax computation: progressive brackets, deductions and credits, the
//! per-jurisdiction engines, and return settlement.

pub mod common;
pub mod credits;
pub mod engine;
pub mod progressive;
pub mod settlement;

pub use credits::{CreditOptions, CreditResolver, DeductionSelection};
pub use engine::{
    CaliforniaEngine, FederalEngine, JurisdictionEngine, JurisdictionResults, TaxEngine,
    TaxRequest,
};
pub use progressive::{ProgressiveTax, Surtax};
pub use settlement::ReturnSettlement;
