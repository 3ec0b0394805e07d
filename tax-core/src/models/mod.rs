mod bracket;
mod filing_status;
mod jurisdiction;
mod tax_result;
mod tax_return;
mod year_table;

pub use bracket::{Bracket, BracketSchedule, ScheduleError, UpperBound, validate_brackets};
pub use filing_status::{FilingStatus, deserialize_lenient as deserialize_filing_status};
pub use jurisdiction::Jurisdiction;
pub use tax_result::{CreditName, TaxResult};
pub use tax_return::{
    CalculatedTax, CaliforniaInfo, Deductions, FederalInfo, IncomeInfo, ItemizedDeductions,
    ReturnInput, TaxableIncome,
};
pub use year_table::{RentersCredit, StatusAmounts, YearTable, YearTableOverride};
