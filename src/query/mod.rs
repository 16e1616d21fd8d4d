pub mod filter;
pub mod limits;
pub mod page;
pub mod sql;
pub mod validator;

pub use filter::{fold_case, Condition, FilterSet, Predicate};
pub use limits::QueryLimits;
pub use page::{PageError, PageRequest, Window};
pub use validator::QueryValidator;
