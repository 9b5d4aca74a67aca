// Stores layer - Database access
pub mod order_store;
pub mod paginate;
pub mod product_store;
pub mod role_store;
pub mod user_store;

pub use order_store::{NewOrderItem, OrderStore, OrderWithItems};
pub use paginate::{Page, PageMeta, PAGE_SIZE};
pub use product_store::ProductStore;
pub use role_store::{RoleStore, RoleWithPermissions};
pub use user_store::{NewUser, UserChanges, UserStore};
