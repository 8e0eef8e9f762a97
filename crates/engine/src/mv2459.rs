//! MV2459 bill-of-sale rendering.
//!
//! Pure data-to-document transformation, no side effects. The fixed
//! section order is mandated by the form: seller, vehicle,
//! yard/dismantler, buyer, sale terms, signature blocks.

use crate::{MoneyCents, SaleRecord, VehicleRecord, YardSettings};

/// A rendered MV2459 bill of sale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Mv2459Document {
    /// `MV2459_<VIN>_<saleDate>`
    pub filename: String,
    pub html: String,
}

fn esc(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn field(label: &str, value: &str) -> String {
    format!(
        "<p class=\"field\"><span class=\"label\">{}</span> <span class=\"value\">{}</span></p>\n",
        esc(label),
        esc(value)
    )
}

fn opt(value: Option<&String>) -> &str {
    value.map(String::as_str).unwrap_or("")
}

/// Renders the fixed MV2459 field layout for one vehicle/sale pair.
pub fn render(vehicle: &VehicleRecord, sale: &SaleRecord, yard: &YardSettings) -> Mv2459Document {
    let sale_date = sale.sale_date.format("%Y-%m-%d").to_string();
    let filename = format!("MV2459_{}_{}", vehicle.vin, sale_date);

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<title>MV2459 Junked Vehicle Bill of Sale</title>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>MV2459 &mdash; Junked Vehicle Bill of Sale</h1>\n");

    html.push_str("<section id=\"seller\">\n<h2>Seller</h2>\n");
    html.push_str(&field("Name:", &vehicle.seller_name));
    html.push_str(&field("Address:", opt(vehicle.seller_address.as_ref())));
    html.push_str(&field("Phone:", opt(vehicle.seller_phone.as_ref())));
    html.push_str("</section>\n");

    html.push_str("<section id=\"vehicle\">\n<h2>Vehicle</h2>\n");
    html.push_str(&field("VIN:", &vehicle.vin));
    html.push_str(&field(
        "Year:",
        &vehicle.year.map(|y| y.to_string()).unwrap_or_default(),
    ));
    html.push_str(&field("Make:", opt(vehicle.make.as_ref())));
    html.push_str(&field(
        "Purchase date:",
        &vehicle.purchase_date.format("%Y-%m-%d").to_string(),
    ));
    html.push_str("</section>\n");

    html.push_str("<section id=\"yard\">\n<h2>Yard / Dismantler</h2>\n");
    html.push_str(&field("Name:", &yard.name));
    html.push_str(&field("Address:", opt(yard.address.as_ref())));
    html.push_str(&field("Phone:", opt(yard.phone.as_ref())));
    html.push_str(&field(
        "Dismantler license:",
        opt(yard.dismantler_license.as_ref()),
    ));
    html.push_str("</section>\n");

    html.push_str("<section id=\"buyer\">\n<h2>Buyer</h2>\n");
    html.push_str(&field("Name:", &sale.buyer_name));
    html.push_str(&field("Address:", opt(sale.buyer_address.as_ref())));
    html.push_str(&field("Phone:", opt(sale.buyer_phone.as_ref())));
    html.push_str(&field("License:", opt(sale.buyer_license.as_ref())));
    html.push_str("</section>\n");

    html.push_str("<section id=\"terms\">\n<h2>Sale terms</h2>\n");
    html.push_str(&field(
        "Sale price:",
        &MoneyCents::new(sale.sale_price_cents).to_string(),
    ));
    html.push_str(&field("Sale date:", &sale_date));
    html.push_str(&field("Disposition:", sale.disposition.as_str()));
    html.push_str(&field("Notes:", opt(sale.notes.as_ref())));
    html.push_str("</section>\n");

    html.push_str("<section id=\"signatures\">\n<h2>Signatures</h2>\n");
    html.push_str(&field("Seller signature:", "________________________"));
    html.push_str(&field("Buyer signature:", "________________________"));
    html.push_str(&field("Date:", "________________________"));
    html.push_str("</section>\n");

    html.push_str("</body>\n</html>\n");

    Mv2459Document { filename, html }
}
