//! Storefront HTTP API.
//!
//! Catalog routes are read-only. Session routes hold one shopper's cart and
//! checkout in memory, keyed by the session segment of the path.

use axum::{extract::{Path, Query, State}, http::StatusCode, routing::{get, post, put}, Json, Router};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::catalog::{Catalog, Category, SiteSettings, ALL_CATEGORIES};
use crate::domain::aggregates::{AddOn, Cart, CartError, CartItem, Checkout, CheckoutDetails, CheckoutStep, MenuItem, PaymentMethod};
use crate::domain::transcript::OrderTranscript;
use crate::domain::value_objects::{LineId, Money};
use crate::handoff::{Handoff, MessengerHandoff};
use crate::session::{Selection, ShopperSession};
use crate::StorefrontError;

type ApiError = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub handoff: Arc<MessengerHandoff>,
    pub sessions: Arc<RwLock<HashMap<String, ShopperSession>>>,
}

impl AppState {
    pub fn new(catalog: Catalog, handoff: MessengerHandoff) -> Self {
        Self { catalog: Arc::new(catalog), handoff: Arc::new(handoff), sessions: Arc::default() }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(serde_json::json!({"status": "healthy", "service": "snackbar-storefront"})) }))
        .route("/api/v1/site", get(get_site))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/payment-methods", get(list_payment_methods))
        .route("/api/v1/menu", get(list_menu))
        .route("/api/v1/menu/:id", get(get_menu_item))
        .route("/api/v1/sessions/:session/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/sessions/:session/cart/:line", put(update_line).delete(remove_line))
        .route("/api/v1/sessions/:session/checkout", get(get_checkout).post(begin_checkout))
        .route("/api/v1/sessions/:session/checkout/details", put(update_details))
        .route("/api/v1/sessions/:session/checkout/advance", post(advance))
        .route("/api/v1/sessions/:session/checkout/back", post(back))
        .route("/api/v1/sessions/:session/checkout/payment-method", put(select_payment_method))
        .route("/api/v1/sessions/:session/checkout/confirm", post(confirm))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

// =============================================================================
// Views
// =============================================================================

#[derive(Debug, Serialize)]
pub struct MenuItemView {
    #[serde(flatten)]
    pub item: MenuItem,
    pub price: Money,
    pub price_display: String,
    pub limited_offer: bool,
    pub add_on_groups: Vec<AddOnGroupView>,
}

#[derive(Debug, Serialize)]
pub struct AddOnGroupView { pub label: String, pub add_ons: Vec<AddOn> }

impl From<&MenuItem> for MenuItemView {
    fn from(item: &MenuItem) -> Self {
        let add_on_groups = item.add_on_groups().into_iter()
            .map(|(label, add_ons)| AddOnGroupView { label: label.to_string(), add_ons: add_ons.into_iter().cloned().collect() })
            .collect();
        Self { price: item.price(), price_display: item.price().to_string(), limited_offer: item.is_discounted(), add_on_groups, item: item.clone() }
    }
}

#[derive(Debug, Serialize)]
pub struct CartView {
    pub id: String,
    pub lines: Vec<CartLineView>,
    pub item_count: u64,
    pub total: Money,
    pub total_display: String,
    pub can_checkout: bool,
}

#[derive(Debug, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartItem,
    pub line_total: Money,
    pub line_total_display: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let lines = cart.items().iter().map(|line| CartLineView {
            line_total: line.line_total(), line_total_display: line.line_total().to_string(), line: line.clone(),
        }).collect();
        Self {
            id: cart.id().to_string(), lines, item_count: cart.item_count(),
            total: cart.total(), total_display: cart.total().to_string(), can_checkout: !cart.is_empty(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CheckoutView {
    pub id: String,
    pub step: CheckoutStep,
    pub details: CheckoutDetails,
    pub can_advance: bool,
    pub missing: Vec<&'static str>,
    pub payment_method: Option<PaymentMethod>,
    pub total: Money,
    pub total_display: String,
}

impl CheckoutView {
    fn new(checkout: &Checkout, cart: &Cart, catalog: &Catalog) -> Self {
        Self {
            id: checkout.id().to_string(),
            step: checkout.step(),
            details: checkout.details().clone(),
            can_advance: checkout.can_advance(),
            missing: checkout.details().missing_fields(),
            payment_method: checkout.selected_payment_method(catalog.payment_methods()).cloned(),
            total: cart.total(),
            total_display: cart.total().to_string(),
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Deserialize)] pub struct MenuParams { pub category: Option<String>, pub popular: Option<bool> }

async fn get_site(State(s): State<AppState>) -> Json<SiteSettings> { Json(s.catalog.site().clone()) }

async fn list_categories(State(s): State<AppState>) -> Json<Vec<Category>> { Json(s.catalog.categories().to_vec()) }

async fn list_payment_methods(State(s): State<AppState>) -> Json<Vec<PaymentMethod>> { Json(s.catalog.payment_methods().to_vec()) }

async fn list_menu(State(s): State<AppState>, Query(p): Query<MenuParams>) -> Json<Vec<MenuItemView>> {
    let items = if p.popular.unwrap_or(false) { s.catalog.popular() } else { s.catalog.items_in(p.category.as_deref().unwrap_or(ALL_CATEGORIES)) };
    Json(items.into_iter().map(MenuItemView::from).collect())
}

async fn get_menu_item(State(s): State<AppState>, Path(id): Path<String>) -> Result<Json<MenuItemView>, ApiError> {
    s.catalog.item(&id).map(|i| Json(MenuItemView::from(i))).ok_or_else(|| api_error(StorefrontError::ItemNotFound(id)))
}

// =============================================================================
// Cart
// =============================================================================

#[derive(Debug, Deserialize)] pub struct QuantityRequest { pub quantity: i64 }

async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CartView>, ApiError> {
    with_session(&s, &session, |sess, _| Ok(CartView::from(sess.cart()))).await.map(Json)
}

async fn add_to_cart(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<Selection>) -> Result<(StatusCode, Json<CartView>), ApiError> {
    let view = with_session(&s, &session, |sess, catalog| {
        sess.add_to_cart(catalog, &r)?;
        Ok(CartView::from(sess.cart()))
    }).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn update_line(State(s): State<AppState>, Path((session, line)): Path<(String, Uuid)>, Json(r): Json<QuantityRequest>) -> Result<Json<CartView>, ApiError> {
    with_session(&s, &session, |sess, _| {
        sess.update_quantity(&LineId::from(line), r.quantity)?;
        Ok(CartView::from(sess.cart()))
    }).await.map(Json)
}

async fn remove_line(State(s): State<AppState>, Path((session, line)): Path<(String, Uuid)>) -> Result<StatusCode, ApiError> {
    with_session(&s, &session, |sess, _| sess.remove(&LineId::from(line))).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> Result<StatusCode, ApiError> {
    with_session(&s, &session, |sess, _| { sess.clear_cart(); Ok(()) }).await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Checkout
// =============================================================================

#[derive(Debug, Deserialize)] pub struct PaymentMethodRequest { pub method_id: String }

fn checkout_view(sess: &ShopperSession, catalog: &Catalog) -> crate::Result<CheckoutView> {
    let checkout = sess.checkout().ok_or(StorefrontError::CheckoutNotStarted)?;
    Ok(CheckoutView::new(checkout, sess.cart(), catalog))
}

async fn begin_checkout(State(s): State<AppState>, Path(session): Path<String>) -> Result<(StatusCode, Json<CheckoutView>), ApiError> {
    let view = with_session(&s, &session, |sess, catalog| {
        sess.begin_checkout()?;
        checkout_view(sess, catalog)
    }).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_checkout(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CheckoutView>, ApiError> {
    with_session(&s, &session, |sess, catalog| checkout_view(sess, catalog)).await.map(Json)
}

async fn update_details(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<CheckoutDetails>) -> Result<Json<CheckoutView>, ApiError> {
    with_session(&s, &session, |sess, catalog| {
        sess.update_details(r)?;
        checkout_view(sess, catalog)
    }).await.map(Json)
}

async fn advance(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CheckoutView>, ApiError> {
    with_session(&s, &session, |sess, catalog| {
        sess.advance(catalog)?;
        checkout_view(sess, catalog)
    }).await.map(Json)
}

async fn back(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<CheckoutView>, ApiError> {
    with_session(&s, &session, |sess, catalog| {
        sess.back()?;
        checkout_view(sess, catalog)
    }).await.map(Json)
}

async fn select_payment_method(State(s): State<AppState>, Path(session): Path<String>, Json(r): Json<PaymentMethodRequest>) -> Result<Json<CheckoutView>, ApiError> {
    with_session(&s, &session, |sess, catalog| {
        sess.select_payment_method(catalog, &r.method_id)?;
        checkout_view(sess, catalog)
    }).await.map(Json)
}

/// Renders the transcript and returns the deep link for the browser to open.
async fn confirm(State(s): State<AppState>, Path(session): Path<String>) -> Result<Json<Handoff>, ApiError> {
    let handoff = with_session(&s, &session, |sess, catalog| {
        let order = sess.confirm(catalog)?;
        Ok(s.handoff.prepare(OrderTranscript::render(&order, &catalog.site().site_name)))
    }).await?;
    tracing::info!(session = %session, endpoint = s.handoff.endpoint(), "order handed off");
    Ok(Json(handoff))
}

// =============================================================================
// Helpers
// =============================================================================

/// Runs `f` against the shopper's session, creating it on first use, and logs
/// the domain events it raised.
async fn with_session<T>(s: &AppState, key: &str, f: impl FnOnce(&mut ShopperSession, &Catalog) -> crate::Result<T>) -> Result<T, ApiError> {
    let mut sessions = s.sessions.write().await;
    let sess = sessions.entry(key.to_string()).or_insert_with(|| ShopperSession::new(s.catalog.currency()));
    let result = f(sess, &s.catalog);
    for event in sess.take_events() {
        tracing::info!(session = %key, event = ?event, "storefront event");
    }
    result.map_err(api_error)
}

fn api_error(e: StorefrontError) -> ApiError {
    let status = match &e {
        StorefrontError::ItemNotFound(_) | StorefrontError::Cart(CartError::LineNotFound(_)) => StatusCode::NOT_FOUND,
        StorefrontError::ItemUnavailable(_) | StorefrontError::Selection(_) | StorefrontError::Cart(CartError::CurrencyMismatch { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
        StorefrontError::CheckoutNotStarted | StorefrontError::Checkout(_) => StatusCode::CONFLICT,
        StorefrontError::Catalog(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() { tracing::error!(error = %e, "request failed"); } else { tracing::debug!(error = %e, "request refused"); }
    (status, e.to_string())
}
