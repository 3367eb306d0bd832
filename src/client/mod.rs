//! POS Backend REST Client
//!
//! Thin wrappers over the backend's collection-style CRUD endpoints for
//! categories, products, customers and orders, plus the auth endpoints.
//!
//! Every request carries the session's bearer token and an `X-Request-Id`.
//! A 401 answer drops the token from the [`SessionContext`] and surfaces
//! [`ClientError::Unauthorized`]; no call is retried.

mod backend;
mod dto;
mod error;
pub mod session;

pub use backend::Backend;
pub use dto::{
    CategoryUpdate, Credentials, CustomerUpdate, LoginResponse, NewCategory, NewCustomer,
    NewCustomerUser, NewOrder, NewOrderItem, NewProduct, ProductQuery, ProductUpdate,
    VerifyResponse,
};
pub use error::{ClientError, ClientResult, ErrorKind};
pub use session::{FileTokenStore, MemoryTokenStore, SessionContext, SessionError, TokenStore};

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::domain::{Category, CategoryId, Customer, CustomerId, Order, OrderId, Product, ProductId, User};
use crate::validation::Validate;
use dto::{Collection, CreatedOrder, ErrorBody};

/// Connection settings for the backend
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend API (e.g., "http://localhost:3000")
    pub base_url: String,
    /// Blanket timeout applied to every request, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// REST client for the POS backend
pub struct PosClient {
    client: Client,
    config: ClientConfig,
    session: Arc<SessionContext>,
}

impl PosClient {
    /// Create a client bound to an application session
    pub fn new(config: ClientConfig, session: Arc<SessionContext>) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .user_agent(concat!("pos-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            config,
            session,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Start a request with auth and request-id headers attached
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .client
            .request(method, self.url(path))
            .header("X-Request-Id", uuid::Uuid::new_v4().to_string());

        if let Some(token) = self.session.token() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send a request and hand back the successful response
    async fn send(&self, method: Method, path: &str, builder: RequestBuilder) -> ClientResult<reqwest::Response> {
        let response = builder.send().await.map_err(ClientError::from_transport)?;
        let status = response.status();

        tracing::debug!(%method, path, status = status.as_u16(), "backend call");

        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "backend rejected session token");
            self.session.invalidate();
            return Err(ClientError::Unauthorized);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.message.or(body.error))
            .unwrap_or(text);

        if status.is_server_error() {
            tracing::error!(%method, path, status = status.as_u16(), %message, "backend server error");
        }

        Err(ClientError::ApiError {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let builder = self.request(Method::GET, path);
        let response = self.send(Method::GET, path, builder).await?;
        response.json().await.map_err(ClientError::from_transport)
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        let collection: Collection<T> = self.get_json(path).await?;
        Ok(collection.into_vec())
    }

    /// Validate `body`, send it, and hand back the successful response
    async fn write<B>(&self, method: Method, path: &str, body: &B) -> ClientResult<reqwest::Response>
    where
        B: Serialize + Validate + ?Sized,
    {
        body.validate()?;
        let builder = self.request(method.clone(), path).json(body);
        self.send(method, path, builder).await
    }

    /// Write call whose response body must decode into `T`
    async fn write_json<B, T>(&self, method: Method, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Validate + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.write(method, path, body).await?;
        response.json().await.map_err(ClientError::from_transport)
    }

    /// Write call with an opaque answer
    ///
    /// An empty body reads as `Null` and a non-JSON body as a string.
    async fn write_opaque<B>(&self, method: Method, path: &str, body: &B) -> ClientResult<serde_json::Value>
    where
        B: Serialize + Validate + ?Sized,
    {
        let response = self.write(method, path, body).await?;
        let text = response.text().await.map_err(ClientError::from_transport)?;
        Ok(opaque_body(&text))
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, path);
        self.send(Method::DELETE, path, builder).await?;
        Ok(())
    }

    // ============================================
    // Auth
    // ============================================

    /// Log in and start the session with the returned token
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Option<User>> {
        let response: LoginResponse = self
            .write_json(Method::POST, "/auth/login", credentials)
            .await?;
        self.session.begin(&response.token, response.user.clone())?;
        tracing::info!("Logged in as {:?}", response.user.as_ref().and_then(|u| u.email.as_deref()));
        Ok(response.user)
    }

    /// Check the stored token with the backend
    ///
    /// Returns `None` when there is no token or the backend refuses it; in
    /// the latter case the token has already been dropped.
    pub async fn verify(&self) -> ClientResult<Option<User>> {
        if !self.session.is_authenticated() {
            return Ok(None);
        }

        match self.get_json::<VerifyResponse>("/auth/verify").await {
            Ok(response) => {
                self.session.set_user(response.user.clone());
                Ok(response.user)
            }
            Err(ClientError::Unauthorized) => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.session.end()?;
        Ok(())
    }

    // ============================================
    // Categories
    // ============================================

    pub async fn list_categories(&self) -> ClientResult<Vec<Category>> {
        self.list("/categories").await
    }

    pub async fn get_category(&self, id: CategoryId) -> ClientResult<Category> {
        self.get_json(&format!("/categories/{}", id)).await
    }

    pub async fn create_category(&self, payload: &NewCategory) -> ClientResult<serde_json::Value> {
        self.write_opaque(Method::POST, "/categories", payload).await
    }

    pub async fn update_category(
        &self,
        id: CategoryId,
        payload: &CategoryUpdate,
    ) -> ClientResult<serde_json::Value> {
        self.write_opaque(Method::PATCH, &format!("/categories/{}", id), payload)
            .await
    }

    pub async fn delete_category(&self, id: CategoryId) -> ClientResult<()> {
        self.delete(&format!("/categories/{}", id)).await
    }

    // ============================================
    // Products
    // ============================================

    pub async fn list_products(&self) -> ClientResult<Vec<Product>> {
        self.list("/products").await
    }

    /// Fetch products with server-side limit/offset/price parameters
    pub async fn query_products(&self, query: &ProductQuery) -> ClientResult<Vec<Product>> {
        query.validate()?;
        if query.is_empty() {
            return self.list_products().await;
        }
        self.list(&format!("/products?{}", query.to_query_string()))
            .await
    }

    pub async fn get_product(&self, id: ProductId) -> ClientResult<Product> {
        self.get_json(&format!("/products/{}", id)).await
    }

    pub async fn create_product(&self, payload: &NewProduct) -> ClientResult<serde_json::Value> {
        self.write_opaque(Method::POST, "/products", payload).await
    }

    pub async fn update_product(
        &self,
        id: ProductId,
        payload: &ProductUpdate,
    ) -> ClientResult<serde_json::Value> {
        self.write_opaque(Method::PATCH, &format!("/products/{}", id), payload)
            .await
    }

    pub async fn delete_product(&self, id: ProductId) -> ClientResult<()> {
        self.delete(&format!("/products/{}", id)).await
    }

    // ============================================
    // Customers
    // ============================================

    pub async fn list_customers(&self) -> ClientResult<Vec<Customer>> {
        self.list("/customers").await
    }

    pub async fn get_customer(&self, id: CustomerId) -> ClientResult<Customer> {
        self.get_json(&format!("/customers/{}", id)).await
    }

    pub async fn create_customer(&self, payload: &NewCustomer) -> ClientResult<serde_json::Value> {
        self.write_opaque(Method::POST, "/customers", payload).await
    }

    pub async fn update_customer(
        &self,
        id: CustomerId,
        payload: &CustomerUpdate,
    ) -> ClientResult<serde_json::Value> {
        self.write_opaque(Method::PATCH, &format!("/customers/{}", id), payload)
            .await
    }

    pub async fn delete_customer(&self, id: CustomerId) -> ClientResult<()> {
        self.delete(&format!("/customers/{}", id)).await
    }

    // ============================================
    // Orders
    // ============================================

    pub async fn list_orders(&self) -> ClientResult<Vec<Order>> {
        self.list("/orders").await
    }

    pub async fn get_order(&self, id: OrderId) -> ClientResult<Order> {
        self.get_json(&format!("/orders/{}", id)).await
    }

    pub async fn orders_by_customer(&self, customer_id: CustomerId) -> ClientResult<Vec<Order>> {
        self.list(&format!("/orders?customerId={}", customer_id))
            .await
    }

    /// Create an empty order for a customer and return its id
    pub async fn create_order(&self, customer_id: CustomerId) -> ClientResult<OrderId> {
        let created: CreatedOrder = self
            .write_json(Method::POST, "/orders", &NewOrder { customer_id })
            .await?;
        Ok(created.id())
    }

    /// Attach one product line to an existing order
    ///
    /// Any 2xx counts as written, whatever the body holds.
    pub async fn add_order_item(&self, item: &NewOrderItem) -> ClientResult<()> {
        self.write(Method::POST, "/orders/add-item", item).await?;
        Ok(())
    }

    /// Reassign an order to another customer
    pub async fn update_order(
        &self,
        id: OrderId,
        customer_id: CustomerId,
    ) -> ClientResult<serde_json::Value> {
        self.write_opaque(Method::PATCH, &format!("/orders/{}", id), &NewOrder { customer_id })
            .await
    }

    pub async fn delete_order(&self, id: OrderId) -> ClientResult<()> {
        self.delete(&format!("/orders/{}", id)).await
    }

    /// Backend-computed order statistics (opaque payload)
    pub async fn order_stats(&self, filters: &[(&str, &str)]) -> ClientResult<serde_json::Value> {
        let query = filters
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        let path = if query.is_empty() {
            "/orders/stats".to_string()
        } else {
            format!("/orders/stats?{}", query)
        };
        self.get_json(&path).await
    }
}

fn opaque_body(text: &str) -> serde_json::Value {
    if text.trim().is_empty() {
        return serde_json::Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| serde_json::Value::String(text.to_string()))
}
