//! Domain types shared by the client, listing, sales and report layers.

mod money;
mod types;

pub use money::Money;
pub use types::{
    Category, CategoryId, CategoryRef, Customer, CustomerId, CustomerRef, Order, OrderId,
    OrderItem, OrderProduct, OrderRef, Product, ProductId, User,
};
