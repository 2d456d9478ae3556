//! Request parameter parsing shared by handlers.

pub mod dates;
pub mod pagination;

pub use dates::{day_or_timestamp, day_range, single_day, DayBounds};
pub use pagination::{PageMeta, PageParams, PageQuery};
