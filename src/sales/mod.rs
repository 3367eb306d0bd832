//! Sales entry: cart, customer selection and order submission.

mod cart;
mod checkout;
mod session;

pub use cart::{
    Cart, CartChange, CartError, CartLine, CartTotals, DEFAULT_ADD_DEBOUNCE,
    DEFAULT_SURCHARGE_PERCENT,
};
pub use checkout::{submit_order, CheckoutOutcome, CheckoutPolicy, FailurePolicy};
pub use session::{SalesSession, SessionSettings, SubmitError};

#[cfg(test)]
pub(crate) use cart::product;
