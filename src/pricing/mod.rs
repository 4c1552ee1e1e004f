//! Age-bracket pricing: bracket matching, quote compilation and discounts

pub mod bracket;
mod compiler;
pub mod discount;
mod result;

pub use bracket::{matches, BracketMatch, BracketRange};
pub use compiler::{compile, find_bracket, quote_plan};
pub use discount::{apply_discount, DiscountBreakdown};
pub use result::{BeneficiaryQuoteLine, PlanQuoteResult};
