//! Client-side shopping cart.
//!
//! The cart lives only in memory; checkout turns it into an order. Lines
//! are keyed by product ID and keep the order products were first added.

use layercraft_core::{CurrencyCode, Price, ProductId};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{OrderLine, Product};

/// Tax rate applied when none is configured (8%).
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// A product in the cart. `quantity` is always at least 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.price * self.quantity
    }
}

/// Totals shown on the cart page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    /// Number of units across all lines.
    pub item_count: u32,
    pub subtotal: Price,
    /// Shipping is free on every order.
    pub shipping: Price,
    /// Subtotal times the tax rate, rounded to cents.
    pub tax: Price,
    pub total: Price,
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Cart lines in the order they were added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Quantity of `product_id` in the cart, or 0.
    #[must_use]
    pub fn quantity_of(&self, product_id: &ProductId) -> u32 {
        self.items
            .iter()
            .find(|item| &item.product.id == product_id)
            .map_or(0, |item| item.quantity)
    }

    /// Add one unit of `product`: bump the existing line or append a new one.
    pub fn add(&mut self, product: Product) {
        match self
            .items
            .iter_mut()
            .find(|item| item.product.id == product.id)
        {
            Some(item) => item.quantity = item.quantity.saturating_add(1),
            None => self.items.push(CartItem {
                product,
                quantity: 1,
            }),
        }
    }

    /// Remove the line for `product_id`. Unknown IDs are ignored.
    pub fn remove(&mut self, product_id: &ProductId) {
        self.items.retain(|item| &item.product.id != product_id);
    }

    /// Set the quantity of a line, clamped to at least 1.
    ///
    /// Unknown IDs are ignored; use [`Cart::remove`] to drop a line.
    pub fn update_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if let Some(item) = self
            .items
            .iter_mut()
            .find(|item| &item.product.id == product_id)
        {
            item.quantity = quantity.max(1);
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Sum of line totals, before tax.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items
            .iter()
            .fold(Price::zero(CurrencyCode::USD), |acc, item| {
                acc + item.line_total()
            })
    }

    /// Totals at the given tax rate.
    #[must_use]
    pub fn summary(&self, tax_rate: Decimal) -> CartSummary {
        let subtotal = self.subtotal();
        let shipping = Price::zero(subtotal.currency_code);
        let tax = Price::new(subtotal.amount * tax_rate, subtotal.currency_code).round_to_cents();

        CartSummary {
            item_count: self.total_items(),
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Lines to store on an order, priced at the current unit price.
    #[must_use]
    pub fn to_order_lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                product_id: item.product.id.clone(),
                quantity: item.quantity,
                price: item.product.price.amount,
            })
            .collect()
    }
}
