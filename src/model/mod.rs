//! Types that represent the core data model, such as `Transaction` and `InputInvoice`.
mod amount;
mod category;
mod invoice;
mod period;
mod profile;
mod transaction;

pub use amount::{Vnd, VndError};
pub use category::{BusinessCategory, BusinessSector, ExpenseCategory};
pub use invoice::{InputInvoice, InvoiceDraft, LineItem};
pub use period::{today, Dated, Period};
pub use profile::{ProfileUpdate, UserProfile};
pub use transaction::{total, Transaction};
