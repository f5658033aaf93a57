// storefront/src/models/mod.rs

//! Persisted entities and the read models built from them.

pub mod cart_line;
pub mod order;
pub mod order_item;
pub mod product;
pub mod user;

pub use cart_line::{CartLineView, CartView};
pub use order::Order;
pub use order_item::OrderItem;
pub use product::{Product, ProductInput};
pub use user::User;
