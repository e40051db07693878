//! Invoice aggregation: validated items + customer → finalized totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use billforge_core::{
    InvoiceId, InvoiceNumber, Money, TaxRate, ValidationError, ValidationResult,
};

use crate::customer::{Customer, Merchant};
use crate::line_item::LineItem;

/// Identity and dating for one invoice.
///
/// All three values are explicit inputs: the number sequence and the clock
/// belong to the caller, never to the core (keeps aggregation a pure function).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceMeta {
    pub id: InvoiceId,
    pub number: InvoiceNumber,
    pub issued_on: NaiveDate,
}

/// How the invoice is (to be) settled.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Cash,
    Credit,
    Upi,
}

impl PaymentMode {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Credit => "CREDIT",
            PaymentMode::Upi => "UPI",
        }
    }
}

/// A finalized, immutable invoice.
///
/// Invariants, guaranteed by construction and checkable via
/// [`Invoice::totals_are_consistent`]:
/// - `subtotal` = sum of item amounts, in item order
/// - `tax_amount` = round_half_up(subtotal × rate / 100)
/// - `total` = subtotal − discount + tax_amount
/// - `discount` ∈ [0, subtotal], so every displayed figure is non-negative
///
/// Item order is display order and is preserved exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    number: InvoiceNumber,
    issued_on: NaiveDate,
    merchant: Merchant,
    customer: Customer,
    items: Vec<LineItem>,
    tax_rate: TaxRate,
    discount: Money,
    payment_mode: PaymentMode,
    notes: Option<String>,
    subtotal: Money,
    tax_amount: Money,
    total: Money,
}

impl Invoice {
    /// Combine customer info and validated items into a finalized invoice.
    ///
    /// Summation iterates in the supplied item order with decimal arithmetic,
    /// so the result is deterministic. Pure function: no side effects.
    #[allow(clippy::too_many_arguments)]
    pub fn aggregate(
        meta: InvoiceMeta,
        merchant: Merchant,
        customer: Customer,
        items: Vec<LineItem>,
        tax_rate: TaxRate,
        discount: Money,
        payment_mode: PaymentMode,
        notes: Option<String>,
    ) -> ValidationResult<Self> {
        if items.is_empty() {
            return Err(ValidationError::NoItems);
        }
        // Customer::new already enforces this; re-checked so a hand-built
        // customer value cannot slip through.
        if customer.name().trim().is_empty() {
            return Err(ValidationError::invalid_customer("name must not be empty"));
        }
        if discount.is_negative() {
            return Err(ValidationError::negative("discount"));
        }

        let mut subtotal = Money::zero();
        for item in &items {
            subtotal = subtotal
                .checked_add(item.amount())
                .ok_or_else(|| ValidationError::amount_overflow("subtotal"))?;
        }

        if discount > subtotal {
            return Err(ValidationError::DiscountExceedsSubtotal);
        }

        let tax_amount = tax_rate
            .tax_on(subtotal)
            .ok_or_else(|| ValidationError::amount_overflow("tax_amount"))?;

        let total = subtotal
            .checked_sub(discount)
            .and_then(|t| t.checked_add(tax_amount))
            .ok_or_else(|| ValidationError::amount_overflow("total"))?;

        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());

        Ok(Self {
            id: meta.id,
            number: meta.number,
            issued_on: meta.issued_on,
            merchant,
            customer,
            items,
            tax_rate,
            discount,
            payment_mode,
            notes,
            subtotal,
            tax_amount,
            total,
        })
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn number(&self) -> &InvoiceNumber {
        &self.number
    }

    pub fn issued_on(&self) -> NaiveDate {
        self.issued_on
    }

    pub fn merchant(&self) -> &Merchant {
        &self.merchant
    }

    pub fn customer(&self) -> &Customer {
        &self.customer
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn payment_mode(&self) -> PaymentMode {
        self.payment_mode
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn tax_amount(&self) -> Money {
        self.tax_amount
    }

    pub fn total(&self) -> Money {
        self.total
    }

    /// Invariant check: every stored figure recomputes from the items.
    ///
    /// Holds for any invoice produced by [`Invoice::aggregate`]; the renderer
    /// uses it as a defensive gate.
    pub fn totals_are_consistent(&self) -> bool {
        if self.items.is_empty() || !self.items.iter().all(LineItem::amount_is_consistent) {
            return false;
        }

        let mut subtotal = Money::zero();
        for item in &self.items {
            match subtotal.checked_add(item.amount()) {
                Some(s) => subtotal = s,
                None => return false,
            }
        }

        subtotal == self.subtotal
            && self.tax_rate.tax_on(subtotal) == Some(self.tax_amount)
            && subtotal
                .checked_sub(self.discount)
                .and_then(|t| t.checked_add(self.tax_amount))
                == Some(self.total)
    }
}

/// The mutable entry phase of an invoice.
///
/// Constructed empty; items are appended/removed while the user edits.
/// [`InvoiceDraft::finalize`] hands everything to the aggregator and is the
/// only way to obtain an [`Invoice`] — after that, nothing mutates.
#[derive(Debug, Default, Clone)]
pub struct InvoiceDraft {
    customer: Option<Customer>,
    items: Vec<LineItem>,
    tax_rate: TaxRate,
    discount: Money,
    payment_mode: PaymentMode,
    notes: Option<String>,
}

impl InvoiceDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_customer(&mut self, customer: Customer) {
        self.customer = Some(customer);
    }

    /// Validate one raw row and append it. Order of insertion is display order.
    pub fn add_item(
        &mut self,
        name: &str,
        quantity_raw: &str,
        unit_price_raw: &str,
    ) -> ValidationResult<()> {
        let item = LineItem::validate(name, quantity_raw, unit_price_raw)?;
        self.items.push(item);
        Ok(())
    }

    pub fn push_item(&mut self, item: LineItem) {
        self.items.push(item);
    }

    pub fn remove_item(&mut self, index: usize) -> Option<LineItem> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn set_tax_rate(&mut self, tax_rate: TaxRate) {
        self.tax_rate = tax_rate;
    }

    pub fn set_discount(&mut self, discount: Money) {
        self.discount = discount;
    }

    pub fn set_payment_mode(&mut self, payment_mode: PaymentMode) {
        self.payment_mode = payment_mode;
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = Some(notes.into());
    }

    /// Freeze the draft into a finalized invoice.
    pub fn finalize(self, meta: InvoiceMeta, merchant: Merchant) -> ValidationResult<Invoice> {
        let customer = self
            .customer
            .ok_or_else(|| ValidationError::invalid_customer("customer is required"))?;
        Invoice::aggregate(
            meta,
            merchant,
            customer,
            self.items,
            self.tax_rate,
            self.discount,
            self.payment_mode,
            self.notes,
        )
    }
}
