//! Client-side state container.
//!
//! [`Store`] owns the state an embedding UI renders: the product list, the
//! cart, the user's custom requests and the logged-in user. Cart operations
//! are synchronous and local. Everything else goes through the backend and
//! updates local state from the result.
//!
//! Custom request submission and request status changes are optimistic: the
//! local list changes first and is rolled back if the backend call fails.

use chrono::Utc;
use layercraft_core::{CustomRequestId, ProductId, RequestStatus};
use tracing::{info, instrument};

use crate::cart::{Cart, CartSummary};
use crate::error::{AppError, Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::models::{CustomRequest, NewCustomRequest, Order, Product, ProductFilter, User};
use crate::services::Dashboard;
use crate::services::catalog;
use crate::state::Storefront;

/// Storefront state for one client session.
pub struct Store {
    storefront: Storefront,
    products: Vec<Product>,
    cart: Cart,
    custom_requests: Vec<CustomRequest>,
    user: Option<User>,
}

/// A custom request shown locally but not yet stored.
///
/// Returned by [`Store::begin_custom_request`].
#[derive(Debug)]
#[must_use = "pass to Store::commit_custom_request to store or roll back"]
pub struct ProvisionalRequest {
    id: CustomRequestId,
    request: NewCustomRequest,
}

impl ProvisionalRequest {
    /// Local ID of the provisional entry.
    #[must_use]
    pub const fn id(&self) -> &CustomRequestId {
        &self.id
    }
}

/// A request status change applied locally but not yet stored.
///
/// Returned by [`Store::begin_request_status`].
#[derive(Debug)]
#[must_use = "pass to Store::commit_request_status to store or roll back"]
pub struct StatusChange {
    id: CustomRequestId,
    status: RequestStatus,
    previous: Option<RequestStatus>,
}

impl Store {
    /// An empty store: no products loaded, empty cart, logged out.
    #[must_use]
    pub fn new(storefront: Storefront) -> Self {
        Self {
            storefront,
            products: Vec::new(),
            cart: Cart::new(),
            custom_requests: Vec::new(),
            user: None,
        }
    }

    #[must_use]
    pub const fn storefront(&self) -> &Storefront {
        &self.storefront
    }

    /// Products from the last [`Store::load_products`].
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Custom requests known to this session.
    #[must_use]
    pub fn custom_requests(&self) -> &[CustomRequest] {
        &self.custom_requests
    }

    /// The logged-in user.
    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    // =========================================================================
    // Cart
    // =========================================================================

    pub fn add_to_cart(&mut self, product: Product) {
        add_breadcrumb("cart", "Added to cart", Some(&[("product_id", product.id.as_str())]));
        self.cart.add(product);
    }

    pub fn remove_from_cart(&mut self, product_id: &ProductId) {
        add_breadcrumb("cart", "Removed from cart", Some(&[("product_id", product_id.as_str())]));
        self.cart.remove(product_id);
    }

    /// Set a line's quantity, clamped to at least 1.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        let quantity_str = quantity.to_string();
        add_breadcrumb(
            "cart",
            "Updated quantity",
            Some(&[("product_id", product_id.as_str()), ("quantity", quantity_str.as_str())]),
        );
        self.cart.update_quantity(product_id, quantity);
    }

    pub fn clear_cart(&mut self) {
        add_breadcrumb("cart", "Cleared cart", None);
        self.cart.clear();
    }

    /// Cart totals at the configured tax rate.
    #[must_use]
    pub fn cart_summary(&self) -> CartSummary {
        self.cart.summary(self.storefront.config().tax_rate)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch the catalog into the store.
    ///
    /// # Errors
    ///
    /// Returns the listing error; the previous product list is kept.
    #[instrument(skip(self))]
    pub async fn load_products(&mut self) -> Result<&[Product]> {
        self.products = reported(self.storefront.catalog().list_products().await)?;
        Ok(&self.products)
    }

    /// Loaded products passing `filter`.
    #[must_use]
    pub fn visible_products(&self, filter: &ProductFilter) -> Vec<&Product> {
        catalog::filter(&self.products, filter)
    }

    /// Categories of the loaded products, in first-seen order.
    #[must_use]
    pub fn categories(&self) -> Vec<&str> {
        catalog::categories(&self.products)
    }

    // =========================================================================
    // Custom requests
    // =========================================================================

    /// Fetch custom requests: every request for admins, otherwise the user's own.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when logged out.
    #[instrument(skip(self))]
    pub async fn load_custom_requests(&mut self) -> Result<&[CustomRequest]> {
        let user = self.require_user("view requests")?;
        let service = self.storefront.requests();
        let result = if user.is_admin() {
            service.all_requests().await
        } else {
            service.requests_for_user(&user.id).await
        };

        self.custom_requests = reported(result)?;
        Ok(&self.custom_requests)
    }

    /// Submit a custom request optimistically.
    ///
    /// Same as [`Store::begin_custom_request`] followed by
    /// [`Store::commit_custom_request`].
    ///
    /// # Errors
    ///
    /// Returns the validation or backend error.
    pub async fn submit_custom_request(
        &mut self,
        request: NewCustomRequest,
    ) -> Result<CustomRequest> {
        let provisional = self.begin_custom_request(request);
        self.commit_custom_request(provisional).await
    }

    /// Add a provisional pending entry for `request` to the local list.
    ///
    /// The entry is visible in [`Store::custom_requests`] until the returned
    /// handle is passed to [`Store::commit_custom_request`].
    pub fn begin_custom_request(&mut self, request: NewCustomRequest) -> ProvisionalRequest {
        let id = CustomRequestId::unique();
        self.custom_requests.push(CustomRequest::provisional(
            id.clone(),
            request.clone(),
            Utc::now(),
        ));
        ProvisionalRequest { id, request }
    }

    /// Store a provisional request.
    ///
    /// On success the provisional entry is replaced by the stored request;
    /// on failure it is removed and the error returned.
    ///
    /// # Errors
    ///
    /// Returns the validation or backend error.
    #[instrument(skip(self, provisional), fields(user_id = %provisional.request.user_id))]
    pub async fn commit_custom_request(
        &mut self,
        provisional: ProvisionalRequest,
    ) -> Result<CustomRequest> {
        let ProvisionalRequest { id, request } = provisional;
        let result = self.storefront.requests().submit(request).await;

        match result {
            Ok(stored) => {
                if let Some(slot) = self.custom_requests.iter_mut().find(|r| r.id == id) {
                    *slot = stored.clone();
                }
                add_breadcrumb("request", "Custom request submitted", Some(&[("request_id", stored.id.as_str())]));
                Ok(stored)
            }
            Err(e) => {
                self.custom_requests.retain(|r| r.id != id);
                e.report();
                Err(e)
            }
        }
    }

    /// Change a request's status (admins only), optimistically.
    ///
    /// Same as [`Store::begin_request_status`] followed by
    /// [`Store::commit_request_status`].
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when logged out, `AppError::Forbidden`
    /// for non-admins, and the backend error (after rolling back) otherwise.
    pub async fn set_request_status(
        &mut self,
        id: &CustomRequestId,
        status: RequestStatus,
    ) -> Result<CustomRequest> {
        let change = self.begin_request_status(id, status)?;
        self.commit_request_status(change).await
    }

    /// Apply a status change to the local list before it is stored.
    ///
    /// Any status may be set; changes outside the usual review flow are
    /// logged.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when logged out and
    /// `AppError::Forbidden` for non-admins. Local state is untouched then.
    pub fn begin_request_status(
        &mut self,
        id: &CustomRequestId,
        status: RequestStatus,
    ) -> Result<StatusChange> {
        if !self.require_user("update requests")?.is_admin() {
            return Err(AppError::Forbidden("update requests".to_string()));
        }

        let previous = self
            .custom_requests
            .iter_mut()
            .find(|r| &r.id == id)
            .map(|r| std::mem::replace(&mut r.status, status));

        if let Some(previous) = previous
            && !previous.can_transition_to(status)
        {
            info!(request_id = %id, from = %previous, to = %status, "Request status moved outside the usual flow");
        }

        Ok(StatusChange {
            id: id.clone(),
            status,
            previous,
        })
    }

    /// Store a status change, restoring the previous local status on failure.
    ///
    /// # Errors
    ///
    /// Returns the backend error after rolling back.
    #[instrument(skip(self, change), fields(request_id = %change.id, status = %change.status))]
    pub async fn commit_request_status(&mut self, change: StatusChange) -> Result<CustomRequest> {
        let StatusChange {
            id,
            status,
            previous,
        } = change;
        let result = self.storefront.requests().update_status(&id, status).await;

        match result {
            Ok(updated) => {
                if let Some(slot) = self.custom_requests.iter_mut().find(|r| r.id == id) {
                    *slot = updated.clone();
                }
                add_breadcrumb("request", "Request status updated", Some(&[("request_id", id.as_str())]));
                Ok(updated)
            }
            Err(e) => {
                if let Some(previous) = previous
                    && let Some(slot) = self.custom_requests.iter_mut().find(|r| r.id == id)
                {
                    slot.status = previous;
                }
                e.report();
                Err(e)
            }
        }
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Log in and remember the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email or password.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<&User> {
        let user = reported(self.storefront.auth().log_in(email, password).await)?;
        Ok(self.set_user(user))
    }

    /// Create an account, log in and remember the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserAlreadyExists` if the email is taken.
    pub async fn register(&mut self, email: &str, password: &str, name: &str) -> Result<&User> {
        let user = reported(self.storefront.auth().sign_up(email, password, name).await)?;
        Ok(self.set_user(user))
    }

    /// Log out. Local user state is cleared even if the backend call fails.
    ///
    /// # Errors
    ///
    /// Returns the backend error, after clearing local state.
    pub async fn logout(&mut self) -> Result<()> {
        let result = self.storefront.auth().log_out().await;

        self.user = None;
        self.custom_requests.clear();
        clear_sentry_user();
        add_breadcrumb("auth", "Logged out", None);

        reported(result)
    }

    /// Pick up an existing backend session, if any.
    pub async fn restore_session(&mut self) -> Option<&User> {
        let current = self.storefront.auth().current_user().await;
        match current {
            Some(user) => Some(self.set_user(user)),
            None => {
                self.user = None;
                None
            }
        }
    }

    // =========================================================================
    // Orders and admin
    // =========================================================================

    /// Place an order for the cart. The cart is cleared once the order is stored.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when logged out, or the checkout error
    /// with the cart left untouched.
    #[instrument(skip(self, shipping_address))]
    pub async fn checkout(&mut self, shipping_address: &str) -> Result<Order> {
        let user = self.require_user("checkout")?;
        let result = self
            .storefront
            .orders()
            .checkout(user, &self.cart, shipping_address)
            .await;

        let order = reported(result)?;
        self.cart.clear();
        add_breadcrumb("checkout", "Order placed", Some(&[("order_id", order.id.as_str())]));
        Ok(order)
    }

    /// Admin dashboard for the logged-in user.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when logged out and
    /// `AppError::Forbidden` for non-admins.
    pub async fn dashboard(&self) -> Result<Dashboard> {
        let user = self.require_user("admin dashboard")?;
        reported(self.storefront.admin().dashboard(user).await)
    }

    fn require_user(&self, action: &str) -> Result<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| AppError::Unauthorized(action.to_string()))
    }

    fn set_user(&mut self, user: User) -> &User {
        set_sentry_user(&user.id, Some(user.email.as_str()));
        add_breadcrumb("auth", "Logged in", Some(&[("user_id", user.id.as_str())]));
        info!(user_id = %user.id, "Session user set");
        self.user.insert(user)
    }
}

/// Report an error before handing it back.
fn reported<T, E: Into<AppError>>(result: std::result::Result<T, E>) -> Result<T> {
    result.map_err(|e| {
        let err = e.into();
        err.report();
        err
    })
}
