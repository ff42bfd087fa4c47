use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::writer::{XmlResult, XmlWriter, format_decimal};
use super::{OPERATION_TYPE_INTERNAL_SALE, SUNAT_CUSTOMIZATION_ID, UBL_VERSION, ubl_ns};
use crate::core::*;

/// SUNAT file name for a document's XML: `{ruc}-{type}-{series}-{number}.xml`.
pub fn document_filename(document: &Document, issuer: &Issuer) -> String {
    format!(
        "{}-{}-{}-{}.xml",
        issuer.ruc,
        document.kind.type_code(),
        document.series,
        document.number
    )
}

/// Render `document` as UBL 2.1 XML.
///
/// `customer` adds the client's identity document to the customer party; the
/// document alone only carries the client's name.
pub fn to_ubl_xml(document: &Document, config: &IssuerConfig, customer: Option<&Client>) -> XmlResult {
    if !document.breakdown.is_consistent() {
        return Err(ComprobanteError::Xml(format!(
            "breakdown of {} does not add up",
            document.identifier()
        )));
    }

    let currency = document.currency.code();
    let issuer = &config.issuer;
    let breakdown = &document.breakdown;
    let mut w = XmlWriter::new()?;

    w.start_element_with_attrs(
        "Invoice",
        &[
            ("xmlns", ubl_ns::INVOICE),
            ("xmlns:cac", ubl_ns::CAC),
            ("xmlns:cbc", ubl_ns::CBC),
            ("xmlns:ext", ubl_ns::EXT),
            ("xmlns:ds", ubl_ns::DS),
        ],
    )?;

    // Filled by the signer
    w.start_element("ext:UBLExtensions")?;
    w.start_element("ext:UBLExtension")?;
    w.start_element("ext:ExtensionContent")?;
    w.end_element("ext:ExtensionContent")?;
    w.end_element("ext:UBLExtension")?;
    w.end_element("ext:UBLExtensions")?;

    w.text_element("cbc:UBLVersionID", UBL_VERSION)?;
    w.text_element("cbc:CustomizationID", SUNAT_CUSTOMIZATION_ID)?;
    w.text_element("cbc:ID", &document.identifier())?;
    w.text_element("cbc:IssueDate", &document.issued_at.date().to_string())?;
    w.text_element(
        "cbc:IssueTime",
        &document.issued_at.time().format("%H:%M:%S").to_string(),
    )?;
    w.text_element_with_attrs(
        "cbc:InvoiceTypeCode",
        document.kind.type_code(),
        &[("listID", OPERATION_TYPE_INTERNAL_SALE)],
    )?;
    if breakdown.retention_amount > Decimal::ZERO {
        w.text_element(
            "cbc:Note",
            &format!(
                "Retención de 4ta categoría ({}%)",
                percent(config.rates.retention_rate)
            ),
        )?;
    }
    w.text_element("cbc:DocumentCurrencyCode", currency)?;
    w.text_element("cbc:LineCountNumeric", &document.items.len().to_string())?;

    write_signature_reference(&mut w, issuer)?;
    write_supplier(&mut w, issuer)?;
    write_customer(&mut w, &document.client_name, customer)?;

    if breakdown.retention_amount > Decimal::ZERO {
        w.start_element("cac:WithholdingTaxTotal")?;
        w.amount_element("cbc:TaxAmount", breakdown.retention_amount, currency)?;
        w.start_element("cac:TaxSubtotal")?;
        w.amount_element("cbc:TaxableAmount", breakdown.subtotal, currency)?;
        w.amount_element("cbc:TaxAmount", breakdown.retention_amount, currency)?;
        w.start_element("cac:TaxCategory")?;
        w.text_element("cbc:Percent", &percent(config.rates.retention_rate))?;
        w.start_element("cac:TaxScheme")?;
        w.text_element("cbc:ID", "RET")?;
        w.text_element("cbc:Name", "RENTA 4TA")?;
        w.end_element("cac:TaxScheme")?;
        w.end_element("cac:TaxCategory")?;
        w.end_element("cac:TaxSubtotal")?;
        w.end_element("cac:WithholdingTaxTotal")?;
    }

    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", breakdown.tax_amount, currency)?;
    w.start_element("cac:TaxSubtotal")?;
    w.amount_element("cbc:TaxableAmount", breakdown.subtotal, currency)?;
    w.amount_element("cbc:TaxAmount", breakdown.tax_amount, currency)?;
    write_tax_category(&mut w, document.kind, &config.rates)?;
    w.end_element("cac:TaxSubtotal")?;
    w.end_element("cac:TaxTotal")?;

    w.start_element("cac:LegalMonetaryTotal")?;
    w.amount_element("cbc:LineExtensionAmount", breakdown.subtotal, currency)?;
    w.amount_element(
        "cbc:TaxInclusiveAmount",
        breakdown.subtotal + breakdown.tax_amount,
        currency,
    )?;
    w.amount_element("cbc:PayableAmount", breakdown.total_amount, currency)?;
    w.end_element("cac:LegalMonetaryTotal")?;

    for (i, item) in document.items.iter().enumerate() {
        write_line(&mut w, i + 1, item, document.kind, &config.rates, currency)?;
    }

    w.end_element("Invoice")?;
    w.into_string()
}

fn write_signature_reference(w: &mut XmlWriter, issuer: &Issuer) -> Result<(), ComprobanteError> {
    w.start_element("cac:Signature")?;
    w.text_element("cbc:ID", &issuer.ruc)?;
    w.start_element("cac:SignatoryParty")?;
    w.start_element("cac:PartyIdentification")?;
    w.text_element("cbc:ID", &issuer.ruc)?;
    w.end_element("cac:PartyIdentification")?;
    w.start_element("cac:PartyName")?;
    w.text_element("cbc:Name", &issuer.name)?;
    w.end_element("cac:PartyName")?;
    w.end_element("cac:SignatoryParty")?;
    w.start_element("cac:DigitalSignatureAttachment")?;
    w.start_element("cac:ExternalReference")?;
    w.text_element("cbc:URI", "#SignatureSP")?;
    w.end_element("cac:ExternalReference")?;
    w.end_element("cac:DigitalSignatureAttachment")?;
    w.end_element("cac:Signature")?;
    Ok(())
}

fn write_supplier(w: &mut XmlWriter, issuer: &Issuer) -> Result<(), ComprobanteError> {
    w.start_element("cac:AccountingSupplierParty")?;
    w.start_element("cac:Party")?;
    w.start_element("cac:PartyIdentification")?;
    w.text_element_with_attrs(
        "cbc:ID",
        &issuer.ruc,
        &[("schemeID", IdentityDocumentType::Ruc.code())],
    )?;
    w.end_element("cac:PartyIdentification")?;
    w.start_element("cac:PartyName")?;
    w.text_element("cbc:Name", &issuer.name)?;
    w.end_element("cac:PartyName")?;
    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", &issuer.name)?;
    w.start_element("cac:RegistrationAddress")?;
    w.start_element("cac:AddressLine")?;
    w.text_element("cbc:Line", &issuer.address)?;
    w.end_element("cac:AddressLine")?;
    w.end_element("cac:RegistrationAddress")?;
    w.end_element("cac:PartyLegalEntity")?;
    if issuer.email.is_some() || issuer.phone.is_some() {
        w.start_element("cac:Contact")?;
        if let Some(phone) = &issuer.phone {
            w.text_element("cbc:Telephone", phone)?;
        }
        if let Some(email) = &issuer.email {
            w.text_element("cbc:ElectronicMail", email)?;
        }
        w.end_element("cac:Contact")?;
    }
    w.end_element("cac:Party")?;
    w.end_element("cac:AccountingSupplierParty")?;
    Ok(())
}

fn write_customer(
    w: &mut XmlWriter,
    client_name: &str,
    customer: Option<&Client>,
) -> Result<(), ComprobanteError> {
    w.start_element("cac:AccountingCustomerParty")?;
    w.start_element("cac:Party")?;
    if let Some(client) = customer {
        w.start_element("cac:PartyIdentification")?;
        w.text_element_with_attrs(
            "cbc:ID",
            &client.document_number,
            &[("schemeID", client.document_type.code())],
        )?;
        w.end_element("cac:PartyIdentification")?;
    }
    w.start_element("cac:PartyLegalEntity")?;
    w.text_element("cbc:RegistrationName", client_name)?;
    if let Some(address) = customer.and_then(|c| c.address.as_deref()) {
        w.start_element("cac:RegistrationAddress")?;
        w.start_element("cac:AddressLine")?;
        w.text_element("cbc:Line", address)?;
        w.end_element("cac:AddressLine")?;
        w.end_element("cac:RegistrationAddress")?;
    }
    w.end_element("cac:PartyLegalEntity")?;
    w.end_element("cac:Party")?;
    w.end_element("cac:AccountingCustomerParty")?;
    Ok(())
}

/// Catalog 05 tax scheme and catalog 07 affectation code.
fn write_tax_category(
    w: &mut XmlWriter,
    kind: DocumentKind,
    rates: &TaxRates,
) -> Result<(), ComprobanteError> {
    let (rate, affectation, scheme_id, scheme_name, type_code) = match kind {
        DocumentKind::Sale => (rates.igv_rate, "10", "1000", "IGV", "VAT"),
        DocumentKind::ProfessionalFee => (Decimal::ZERO, "30", "9998", "INA", "FRE"),
    };
    w.start_element("cac:TaxCategory")?;
    w.text_element("cbc:Percent", &percent(rate))?;
    w.text_element("cbc:TaxExemptionReasonCode", affectation)?;
    w.start_element("cac:TaxScheme")?;
    w.text_element("cbc:ID", scheme_id)?;
    w.text_element("cbc:Name", scheme_name)?;
    w.text_element("cbc:TaxTypeCode", type_code)?;
    w.end_element("cac:TaxScheme")?;
    w.end_element("cac:TaxCategory")?;
    Ok(())
}

fn write_line(
    w: &mut XmlWriter,
    position: usize,
    item: &LineItem,
    kind: DocumentKind,
    rates: &TaxRates,
    currency: &str,
) -> Result<(), ComprobanteError> {
    let line_total = item.checked_line_total().ok_or_else(|| {
        ComprobanteError::Xml(format!("line {position}: amount exceeds representable range"))
    })?;
    let line_tax = match kind {
        DocumentKind::Sale => round_half_up(line_total * rates.igv_rate),
        DocumentKind::ProfessionalFee => Decimal::ZERO,
    };

    w.start_element("cac:InvoiceLine")?;
    w.text_element("cbc:ID", &position.to_string())?;
    w.quantity_element("cbc:InvoicedQuantity", item.quantity, &item.unit_code)?;
    w.amount_element("cbc:LineExtensionAmount", line_total, currency)?;

    w.start_element("cac:TaxTotal")?;
    w.amount_element("cbc:TaxAmount", line_tax, currency)?;
    w.start_element("cac:TaxSubtotal")?;
    w.amount_element("cbc:TaxableAmount", line_total, currency)?;
    w.amount_element("cbc:TaxAmount", line_tax, currency)?;
    write_tax_category(w, kind, rates)?;
    w.end_element("cac:TaxSubtotal")?;
    w.end_element("cac:TaxTotal")?;

    w.start_element("cac:Item")?;
    w.text_element("cbc:Description", &item.description)?;
    w.start_element("cac:SellersItemIdentification")?;
    w.text_element("cbc:ID", &item.product_code)?;
    w.end_element("cac:SellersItemIdentification")?;
    w.end_element("cac:Item")?;

    w.start_element("cac:Price")?;
    w.text_element_with_attrs(
        "cbc:PriceAmount",
        &format_decimal(item.unit_value),
        &[("currencyID", currency)],
    )?;
    w.end_element("cac:Price")?;
    w.end_element("cac:InvoiceLine")?;
    Ok(())
}

fn percent(rate: Decimal) -> String {
    format_decimal(rate * dec!(100))
}
