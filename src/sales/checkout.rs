//! Order submission
//!
//! A sale is written in two steps: create an empty order, then attach each
//! cart line one by one. The backend has no transaction spanning those
//! calls, so a failing line leaves a partial order behind. The policy below
//! decides what happens then: retry the line a few times, and if it still
//! fails either delete the order again or leave it and report it.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use crate::client::{Backend, ClientError, ClientResult, NewOrderItem};
use crate::domain::{CustomerId, OrderId, ProductId};

/// What to do with a partially written order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Delete the order
    Cancel,
    /// Keep the order and report which lines made it
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutPolicy {
    /// Extra attempts per failing line
    ///
    /// Only definite failures are retried: a backend rejection or a refused
    /// connection. After a timeout or an unreadable answer the line may
    /// already be on the order, so it is not sent again.
    pub line_retries: u32,
    pub retry_backoff: Duration,
    pub on_failure: FailurePolicy,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            line_retries: 1,
            retry_backoff: Duration::from_millis(250),
            on_failure: FailurePolicy::Cancel,
        }
    }
}

/// Result of a submission that got as far as creating the order
#[derive(Debug)]
pub enum CheckoutOutcome {
    /// Every line was attached
    Completed { order_id: OrderId, lines: usize },

    /// A line failed and the order was deleted again
    Compensated {
        order_id: OrderId,
        failed_product: ProductId,
        error: ClientError,
    },

    /// A line failed and the order is still on the backend
    PartiallyWritten {
        order_id: OrderId,
        written: Vec<ProductId>,
        failed_product: ProductId,
        error: ClientError,
        /// Set when a cancel was attempted and also failed
        cancel_error: Option<ClientError>,
    },
}

impl CheckoutOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CheckoutOutcome::Completed { .. })
    }

    pub fn order_id(&self) -> OrderId {
        match self {
            CheckoutOutcome::Completed { order_id, .. }
            | CheckoutOutcome::Compensated { order_id, .. }
            | CheckoutOutcome::PartiallyWritten { order_id, .. } => *order_id,
        }
    }

    /// One line suitable for a user notice
    pub fn summary(&self) -> String {
        match self {
            CheckoutOutcome::Completed { order_id, lines } => {
                format!("Sale #{} registered with {} line(s)", order_id, lines)
            }
            CheckoutOutcome::Compensated {
                order_id,
                failed_product,
                error,
            } => format!(
                "Sale #{} was cancelled: product {} could not be added ({})",
                order_id, failed_product, error
            ),
            CheckoutOutcome::PartiallyWritten {
                order_id,
                written,
                failed_product,
                error,
                cancel_error,
            } => {
                let mut text = format!(
                    "Sale #{} is incomplete: {} line(s) saved, product {} failed ({})",
                    order_id,
                    written.len(),
                    failed_product,
                    error
                );
                if let Some(cancel) = cancel_error {
                    text.push_str(&format!("; cancelling the order also failed ({})", cancel));
                }
                text
            }
        }
    }
}

/// Write a sale for `customer_id` with the given cart lines
///
/// An error means the order itself could not be created and nothing was
/// written. Every other result is reported through [`CheckoutOutcome`].
pub async fn submit_order<B>(
    backend: &B,
    customer_id: CustomerId,
    lines: &[CartLine],
    policy: &CheckoutPolicy,
) -> ClientResult<CheckoutOutcome>
where
    B: Backend + ?Sized,
{
    let order_id = backend.open_order(customer_id).await?;
    tracing::info!(order_id, customer_id, lines = lines.len(), "order created");

    let mut written = Vec::with_capacity(lines.len());

    for line in lines {
        let item = NewOrderItem {
            order_id,
            product_id: line.product.id,
            amount: line.quantity,
        };

        match attach_with_retry(backend, &item, policy).await {
            Ok(()) => written.push(item.product_id),
            Err(error) => {
                tracing::warn!(
                    order_id,
                    product_id = item.product_id,
                    error = %error,
                    "order line failed, applying {:?} policy",
                    policy.on_failure
                );
                return Ok(compensate(backend, order_id, written, item.product_id, error, policy).await);
            }
        }
    }

    Ok(CheckoutOutcome::Completed {
        order_id,
        lines: written.len(),
    })
}

async fn attach_with_retry<B>(backend: &B, item: &NewOrderItem, policy: &CheckoutPolicy) -> ClientResult<()>
where
    B: Backend + ?Sized,
{
    let mut attempt = 0;
    loop {
        match backend.attach_item(item).await {
            Ok(()) => return Ok(()),
            Err(e) if attempt < policy.line_retries && is_retryable(&e) => {
                attempt += 1;
                tracing::warn!(
                    order_id = item.order_id,
                    product_id = item.product_id,
                    attempt,
                    error = %e,
                    "retrying order line"
                );
                if !policy.retry_backoff.is_zero() {
                    tokio::time::sleep(policy.retry_backoff * attempt).await;
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Failures where the line is known not to have been written
fn is_retryable(err: &ClientError) -> bool {
    matches!(err, ClientError::ApiError { .. } | ClientError::Unavailable(_))
}

async fn compensate<B>(
    backend: &B,
    order_id: OrderId,
    written: Vec<ProductId>,
    failed_product: ProductId,
    error: ClientError,
    policy: &CheckoutPolicy,
) -> CheckoutOutcome
where
    B: Backend + ?Sized,
{
    match policy.on_failure {
        FailurePolicy::Leave => CheckoutOutcome::PartiallyWritten {
            order_id,
            written,
            failed_product,
            error,
            cancel_error: None,
        },
        FailurePolicy::Cancel => match backend.cancel_order(order_id).await {
            Ok(()) => {
                tracing::warn!(order_id, "partial order deleted");
                CheckoutOutcome::Compensated {
                    order_id,
                    failed_product,
                    error,
                }
            }
            Err(cancel_error) => {
                tracing::error!(order_id, error = %cancel_error, "could not delete partial order");
                CheckoutOutcome::PartiallyWritten {
                    order_id,
                    written,
                    failed_product,
                    error,
                    cancel_error: Some(cancel_error),
                }
            }
        },
    }
}
