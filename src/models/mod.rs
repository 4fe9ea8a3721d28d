pub mod category;
pub mod item;
pub mod item_status_history;
pub mod rating;
pub mod user;
pub mod watchlist;

pub use category::CategoryDetails;
pub use item::{Category, Condition, Entity as Item, ItemStatus, Model as ItemModel};
pub use item_status_history::{Entity as ItemStatusHistory, Model as ItemStatusHistoryModel};
pub use rating::{Entity as Rating, Model as RatingModel};
pub use user::{Entity as User, MemberType, Model as UserModel};
pub use watchlist::Entity as Watchlist;
