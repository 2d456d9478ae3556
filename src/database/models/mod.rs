pub mod item;
pub mod location;
pub mod user;

pub use item::{Item, NewItem};
pub use location::{Location, NewLocation};
pub use user::{NewUser, User, UserSummary};
