pub mod calculations;
pub mod models;
pub mod tables;

pub use calculations::{
    CaliforniaEngine, CreditOptions, DeductionSelection, FederalEngine, JurisdictionEngine,
    JurisdictionResults, ReturnSettlement, TaxEngine, TaxRequest,
};
pub use models::*;
pub use tables::{JurisdictionTables, TableOverrides, TaxTableStore};
