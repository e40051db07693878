//! PDF assembly with `lopdf`.
//!
//! The document is built object-by-object in a fixed order, with an explicit
//! `CreationDate` parameter instead of the ambient clock, so the emitted bytes
//! are a pure function of the invoice. Content streams stay uncompressed;
//! the byte stream itself is part of the rendering contract.

use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, dictionary};
use rust_decimal::Decimal;

use billforge_core::RenderError;
use billforge_invoicing::{Customer, Invoice, LineItem};

use crate::layout::{
    AMOUNT_COL_RIGHT, BODY_FONT_SIZE, CONT_PAGE_TABLE_TOP, CONTENT_RIGHT, CUSTOMER_BLOCK_TOP,
    FIRST_PAGE_TABLE_TOP, HEADER_META_X, HEADER_TOP, HEADING_FONT_SIZE, NAME_COL_X,
    NAME_MAX_CHARS, NOTES_MAX_CHARS, PAGE_HEIGHT, PAGE_NUMBER_Y, PAGE_WIDTH, PRICE_COL_RIGHT,
    QTY_COL_RIGHT, ROW_HEIGHT, TITLE_FONT_SIZE, TOTALS_BLOCK_HEIGHT, TOTALS_LABEL_X,
    right_aligned_x, rows_that_fit, sanitize, truncate,
};

/// Resource names of the three faces every page can use.
const TEXT_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";
const MONO_FONT: &str = "F3";

const CONTENT_TYPE_PDF: &str = "application/pdf";

/// The finished artifact: opaque bytes plus download metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    bytes: Vec<u8>,
    filename: String,
    content_type: &'static str,
}

impl RenderedDocument {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn content_type(&self) -> &'static str {
        self.content_type
    }
}

/// Render a finalized invoice into a print-ready PDF.
///
/// Deterministic: the same invoice content and the same `generated_at` yield
/// byte-identical output. The invoice is only read, never mutated, and no
/// partial document is ever returned.
pub fn render(
    invoice: &Invoice,
    generated_at: DateTime<Utc>,
) -> Result<RenderedDocument, RenderError> {
    // Defensive gate; unreachable for aggregator-produced invoices.
    if !invoice.totals_are_consistent() {
        return Err(RenderError::inconsistent_totals(format!(
            "stored totals for invoice {} do not recompute from its items",
            invoice.number()
        )));
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let text_font = doc.add_object(builtin_font("Helvetica"));
    let bold_font = doc.add_object(builtin_font("Helvetica-Bold"));
    let mono_font = doc.add_object(builtin_font("Courier"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            TEXT_FONT => text_font,
            BOLD_FONT => bold_font,
            MONO_FONT => mono_font,
        },
    });

    let plans = plan_pages(invoice.items().len());
    let total_pages = plans.len();
    let mut kids: Vec<Object> = Vec::with_capacity(total_pages);

    for (index, plan) in plans.iter().enumerate() {
        let operations = page_operations(invoice, plan, index + 1, total_pages);
        let encoded = Content { operations }
            .encode()
            .map_err(|e| RenderError::output(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => total_pages as i64,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal("billforge"),
        "Title" => Object::string_literal(format!("Invoice {}", invoice.number())),
        "CreationDate" => Object::string_literal(pdf_date(generated_at)),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::output(e.to_string()))?;

    Ok(RenderedDocument {
        bytes,
        filename: format!("invoice-{}.pdf", invoice.number()),
        content_type: CONTENT_TYPE_PDF,
    })
}

fn builtin_font(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
    }
}

fn pdf_date(at: DateTime<Utc>) -> String {
    format!("D:{}Z", at.format("%Y%m%d%H%M%S"))
}

/// What goes on one page: a slice of the item table and possibly the totals
/// footer.
#[derive(Debug, Clone)]
struct PagePlan {
    items: core::ops::Range<usize>,
    table_top: f32,
    with_footer: bool,
}

/// Split the item rows across pages and decide where the totals block lands.
///
/// The first page starts lower (the header blocks sit above the table);
/// continuation pages repeat the column header near the top. The totals block
/// goes on the last item page when there is room, otherwise on one more page.
fn plan_pages(item_count: usize) -> Vec<PagePlan> {
    let mut pages: Vec<PagePlan> = Vec::new();
    let mut index = 0;
    loop {
        let table_top = if pages.is_empty() {
            FIRST_PAGE_TABLE_TOP
        } else {
            CONT_PAGE_TABLE_TOP
        };
        let end = (index + rows_that_fit(table_top)).min(item_count);
        pages.push(PagePlan {
            items: index..end,
            table_top,
            with_footer: false,
        });
        index = end;
        if index >= item_count {
            break;
        }
    }

    let footer_fits = pages.last().is_some_and(|last| {
        let rows_used = last.items.len() + 1; // +1 for the column header
        let next_y = last.table_top - ROW_HEIGHT * rows_used as f32;
        next_y >= TOTALS_BLOCK_HEIGHT + PAGE_NUMBER_Y
    });

    if footer_fits {
        if let Some(last) = pages.last_mut() {
            last.with_footer = true;
        }
    } else {
        pages.push(PagePlan {
            items: item_count..item_count,
            table_top: CONT_PAGE_TABLE_TOP,
            with_footer: true,
        });
    }
    pages
}

fn page_operations(
    invoice: &Invoice,
    plan: &PagePlan,
    page_no: usize,
    total_pages: usize,
) -> Vec<Operation> {
    let mut ops = Vec::new();

    if page_no == 1 {
        header_block(&mut ops, invoice);
        customer_block(&mut ops, invoice.customer());
    }

    let mut y = plan.table_top;
    if !plan.items.is_empty() {
        table_header(&mut ops, y);
        y -= ROW_HEIGHT;
        for item in &invoice.items()[plan.items.clone()] {
            item_row(&mut ops, y, item);
            y -= ROW_HEIGHT;
        }
    }

    if plan.with_footer {
        totals_block(&mut ops, invoice, y - 8.0);
    }

    text(
        &mut ops,
        MONO_FONT,
        BODY_FONT_SIZE,
        NAME_COL_X,
        PAGE_NUMBER_Y,
        &format!("Page {page_no} of {total_pages}"),
    );

    ops
}

fn header_block(ops: &mut Vec<Operation>, invoice: &Invoice) {
    let merchant = invoice.merchant();
    text(
        ops,
        BOLD_FONT,
        TITLE_FONT_SIZE,
        NAME_COL_X,
        HEADER_TOP,
        &merchant.name,
    );
    let mut y = HEADER_TOP - 18.0;
    for line in [&merchant.address, &merchant.phone, &merchant.email] {
        if !line.is_empty() {
            text(ops, TEXT_FONT, BODY_FONT_SIZE, NAME_COL_X, y, line);
            y -= 14.0;
        }
    }

    text(
        ops,
        BOLD_FONT,
        HEADING_FONT_SIZE,
        HEADER_META_X,
        HEADER_TOP,
        "INVOICE",
    );
    text(
        ops,
        TEXT_FONT,
        BODY_FONT_SIZE,
        HEADER_META_X,
        HEADER_TOP - 18.0,
        &format!("No:   {}", invoice.number()),
    );
    text(
        ops,
        TEXT_FONT,
        BODY_FONT_SIZE,
        HEADER_META_X,
        HEADER_TOP - 32.0,
        &format!("Date: {}", invoice.issued_on().format("%Y-%m-%d")),
    );
}

fn customer_block(ops: &mut Vec<Operation>, customer: &Customer) {
    text(
        ops,
        BOLD_FONT,
        BODY_FONT_SIZE,
        NAME_COL_X,
        CUSTOMER_BLOCK_TOP,
        "BILLED TO",
    );
    text(
        ops,
        TEXT_FONT,
        BODY_FONT_SIZE,
        NAME_COL_X,
        CUSTOMER_BLOCK_TOP - 14.0,
        customer.name(),
    );
    let mut y = CUSTOMER_BLOCK_TOP - 28.0;
    for line in [customer.address(), customer.phone(), customer.email()] {
        if !line.is_empty() {
            text(ops, TEXT_FONT, BODY_FONT_SIZE, NAME_COL_X, y, line);
            y -= 14.0;
        }
    }
}

fn table_header(ops: &mut Vec<Operation>, y: f32) {
    text(ops, BOLD_FONT, BODY_FONT_SIZE, NAME_COL_X, y, "Item");
    text(ops, BOLD_FONT, BODY_FONT_SIZE, QTY_COL_RIGHT - 20.0, y, "Qty");
    text(
        ops,
        BOLD_FONT,
        BODY_FONT_SIZE,
        PRICE_COL_RIGHT - 52.0,
        y,
        "Unit Price",
    );
    text(
        ops,
        BOLD_FONT,
        BODY_FONT_SIZE,
        AMOUNT_COL_RIGHT - 42.0,
        y,
        "Amount",
    );
    hline(ops, NAME_COL_X, CONTENT_RIGHT, y - 5.0);
}

fn item_row(ops: &mut Vec<Operation>, y: f32, item: &LineItem) {
    text(
        ops,
        TEXT_FONT,
        BODY_FONT_SIZE,
        NAME_COL_X,
        y,
        &truncate(item.name(), NAME_MAX_CHARS),
    );
    mono_right(ops, QTY_COL_RIGHT, y, BODY_FONT_SIZE, &quantity_text(item.quantity()));
    mono_right(ops, PRICE_COL_RIGHT, y, BODY_FONT_SIZE, &item.unit_price().to_string());
    mono_right(ops, AMOUNT_COL_RIGHT, y, BODY_FONT_SIZE, &item.amount().to_string());
}

fn totals_block(ops: &mut Vec<Operation>, invoice: &Invoice, top: f32) {
    let mut y = top;
    totals_row(ops, y, "Subtotal", &invoice.subtotal().to_string());
    y -= ROW_HEIGHT;
    if !invoice.discount().is_zero() {
        totals_row(ops, y, "Discount", &format!("- {}", invoice.discount()));
        y -= ROW_HEIGHT;
    }
    if !invoice.tax_rate().is_zero() {
        totals_row(
            ops,
            y,
            &format!("Tax ({})", invoice.tax_rate()),
            &invoice.tax_amount().to_string(),
        );
        y -= ROW_HEIGHT;
    }

    hline(ops, TOTALS_LABEL_X, CONTENT_RIGHT, y + 10.0);
    text(ops, BOLD_FONT, HEADING_FONT_SIZE, TOTALS_LABEL_X, y - 4.0, "TOTAL");
    mono_right(
        ops,
        AMOUNT_COL_RIGHT,
        y - 4.0,
        HEADING_FONT_SIZE,
        &invoice.total().to_string(),
    );
    y -= 34.0;

    text(
        ops,
        TEXT_FONT,
        BODY_FONT_SIZE,
        NAME_COL_X,
        y,
        &format!("Payment: {}", invoice.payment_mode().label()),
    );
    if let Some(notes) = invoice.notes() {
        y -= 14.0;
        text(
            ops,
            TEXT_FONT,
            BODY_FONT_SIZE,
            NAME_COL_X,
            y,
            &format!("Notes: {}", truncate(notes, NOTES_MAX_CHARS)),
        );
    }
}

fn totals_row(ops: &mut Vec<Operation>, y: f32, label: &str, value: &str) {
    text(ops, BOLD_FONT, BODY_FONT_SIZE, TOTALS_LABEL_X, y, label);
    mono_right(ops, AMOUNT_COL_RIGHT, y, BODY_FONT_SIZE, value);
}

fn quantity_text(quantity: Decimal) -> String {
    quantity.normalize().to_string()
}

fn text(ops: &mut Vec<Operation>, font: &str, size: f32, x: f32, y: f32, content: &str) {
    ops.push(Operation::new("BT", vec![]));
    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
    ops.push(Operation::new("Td", vec![x.into(), y.into()]));
    ops.push(Operation::new(
        "Tj",
        vec![Object::string_literal(sanitize(content))],
    ));
    ops.push(Operation::new("ET", vec![]));
}

fn mono_right(ops: &mut Vec<Operation>, right_edge: f32, y: f32, size: f32, content: &str) {
    let sanitized = sanitize(content);
    let x = right_aligned_x(right_edge, &sanitized, size);
    text(ops, MONO_FONT, size, x, y, &sanitized);
}

fn hline(ops: &mut Vec<Operation>, x1: f32, x2: f32, y: f32) {
    ops.push(Operation::new("w", vec![0.5f32.into()]));
    ops.push(Operation::new("m", vec![x1.into(), y.into()]));
    ops.push(Operation::new("l", vec![x2.into(), y.into()]));
    ops.push(Operation::new("S", vec![]));
}

#[cfg(test)]
mod tests {
    use super::*;
    use billforge_core::{InvoiceId, InvoiceNumber, Money, TaxRate};
    use billforge_invoicing::{InvoiceMeta, Merchant, PaymentMode};
    use chrono::NaiveDate;

    fn test_meta() -> InvoiceMeta {
        InvoiceMeta {
            id: InvoiceId::new(),
            number: InvoiceNumber::from_parts(2026, 1),
            issued_on: NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        }
    }

    fn test_generated_at() -> DateTime<Utc> {
        NaiveDate::from_ymd_opt(2026, 8, 29)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn test_invoice(item_rows: Vec<(&str, &str, &str)>) -> Invoice {
        let customer =
            Customer::new("Jane Doe", "12 Main St", "", "jane@example.com").unwrap();
        let items = item_rows
            .into_iter()
            .map(|(name, qty, price)| LineItem::validate(name, qty, price).unwrap())
            .collect();
        Invoice::aggregate(
            test_meta(),
            Merchant::default(),
            customer,
            items,
            TaxRate::parse("10").unwrap(),
            Money::zero(),
            PaymentMode::Cash,
            None,
        )
        .unwrap()
    }

    fn position_of(haystack: &[u8], needle: &str) -> Option<usize> {
        haystack
            .windows(needle.len())
            .position(|w| w == needle.as_bytes())
    }

    #[test]
    fn renders_a_pdf_with_metadata() {
        let invoice = test_invoice(vec![("Widget", "2", "9.99")]);
        let doc = render(&invoice, test_generated_at()).unwrap();

        assert!(doc.bytes().starts_with(b"%PDF-1.5"));
        assert_eq!(doc.filename(), "invoice-INV-2026-0001.pdf");
        assert_eq!(doc.content_type(), "application/pdf");
    }

    #[test]
    fn rendering_is_byte_deterministic() {
        let invoice = test_invoice(vec![("Widget", "2", "9.99"), ("Gadget", "1", "19.50")]);
        let at = test_generated_at();

        let first = render(&invoice, at).unwrap();
        let second = render(&invoice, at).unwrap();
        assert_eq!(first.bytes(), second.bytes());
    }

    #[test]
    fn generated_at_is_the_only_timestamp_input() {
        let invoice = test_invoice(vec![("Widget", "2", "9.99")]);
        let first = render(&invoice, test_generated_at()).unwrap();
        let later = test_generated_at() + chrono::Duration::seconds(1);
        let second = render(&invoice, later).unwrap();
        assert_ne!(first.bytes(), second.bytes());
    }

    #[test]
    fn items_appear_in_supplied_order() {
        let invoice = test_invoice(vec![
            ("Zebra", "1", "5.00"),
            ("Apple", "1", "1.00"),
            ("Mango", "1", "3.00"),
        ]);
        let doc = render(&invoice, test_generated_at()).unwrap();

        let zebra = position_of(doc.bytes(), "Zebra").unwrap();
        let apple = position_of(doc.bytes(), "Apple").unwrap();
        let mango = position_of(doc.bytes(), "Mango").unwrap();
        assert!(zebra < apple && apple < mango);
    }

    #[test]
    fn totals_footer_carries_the_computed_figures() {
        let invoice = test_invoice(vec![("Widget", "2", "9.99"), ("Gadget", "1", "19.50")]);
        let doc = render(&invoice, test_generated_at()).unwrap();

        assert!(position_of(doc.bytes(), "Rs. 39.48").is_some());
        assert!(position_of(doc.bytes(), "Rs. 3.95").is_some());
        assert!(position_of(doc.bytes(), "Rs. 43.43").is_some());
        // lopdf escapes parens inside literal strings.
        assert!(position_of(doc.bytes(), "Tax \\(10%\\)").is_some());
    }

    #[test]
    fn long_invoices_paginate_with_repeated_table_header() {
        let rows: Vec<(String, String, String)> = (0..40)
            .map(|i| (format!("item-{i:03}"), "1".to_string(), "1.00".to_string()))
            .collect();
        let rows_ref: Vec<(&str, &str, &str)> = rows
            .iter()
            .map(|(n, q, p)| (n.as_str(), q.as_str(), p.as_str()))
            .collect();
        let invoice = test_invoice(rows_ref);
        let doc = render(&invoice, test_generated_at()).unwrap();

        assert!(position_of(doc.bytes(), "Page 1 of 2").is_some());
        assert!(position_of(doc.bytes(), "Page 2 of 2").is_some());
        assert!(position_of(doc.bytes(), "item-039").is_some());
        // Totals always land on the final page: 40.00 + 4.00 tax.
        let total = position_of(doc.bytes(), "Rs. 44.00").unwrap();
        let last_item = position_of(doc.bytes(), "item-039").unwrap();
        assert!(total > last_item);
    }

    #[test]
    fn tampered_totals_are_refused() {
        let invoice = test_invoice(vec![("Widget", "2", "9.99")]);
        let mut raw = serde_json::to_value(&invoice).unwrap();
        raw["total"] = serde_json::Value::String("999.00".to_string());
        let tampered: Invoice = serde_json::from_value(raw).unwrap();

        let err = render(&tampered, test_generated_at()).unwrap_err();
        assert!(matches!(err, RenderError::InconsistentTotals(_)));
    }

    #[test]
    fn non_ascii_input_degrades_to_placeholders_not_failures() {
        let invoice = test_invoice(vec![("Café ☕", "1", "3.00")]);
        let doc = render(&invoice, test_generated_at()).unwrap();
        assert!(position_of(doc.bytes(), "Caf? ?").is_some());
    }

    #[test]
    fn plan_pages_puts_footer_on_overflow_page_when_needed() {
        // Exactly fill the first page so the footer must move.
        let capacity = rows_that_fit(FIRST_PAGE_TABLE_TOP);
        let plans = plan_pages(capacity);
        assert_eq!(plans.len(), 2);
        assert!(!plans[0].with_footer);
        assert!(plans[1].with_footer);
        assert!(plans[1].items.is_empty());

        let small = plan_pages(3);
        assert_eq!(small.len(), 1);
        assert!(small[0].with_footer);
    }
}
