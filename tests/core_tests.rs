use chrono::NaiveDate;
use comprobante::core::*;
use rust_decimal_macros::dec;

fn product(id: u64, unit_price: rust_decimal::Decimal) -> Product {
    Product {
        id: ProductId(id),
        code: format!("P-{id:03}"),
        description: format!("Producto {id}"),
        unit_price,
        unit_code: "NIU".into(),
        active: true,
    }
}

fn document(id: u64, series: &str, number: u64, day: u32, status: DocumentStatus) -> Document {
    let items = vec![LineItem::snapshot(&product(1, dec!(100)), dec!(1), dec!(100)).unwrap()];
    let breakdown = compute_breakdown(&items, DocumentKind::Sale).unwrap();
    Document {
        id: DocumentId(id),
        series: series.into(),
        number,
        issued_at: NaiveDate::from_ymd_opt(2024, 6, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap(),
        currency: Currency::Pen,
        kind: DocumentKind::Sale,
        client_id: ClientId(1),
        client_name: "Comercial Andina S.A.C.".into(),
        items,
        breakdown,
        status,
    }
}

// --- Tax engine ---

#[test]
fn sale_of_one_hundred() {
    let mut draft = InvoiceDraft::new();
    draft.select_client(ClientId(1));
    draft.add_line(&product(1, dec!(100)), dec!(1), dec!(100.00)).unwrap();

    let b = draft.preview().unwrap();
    assert_eq!(b.subtotal, dec!(100.00));
    assert_eq!(b.tax_amount, dec!(18.00));
    assert_eq!(b.retention_amount, dec!(0));
    assert_eq!(b.total_amount, dec!(118.00));
}

#[test]
fn fee_at_threshold_has_no_retention() {
    let mut draft = InvoiceDraft::for_kind(DocumentKind::ProfessionalFee);
    draft.add_line(&product(2, dec!(1500)), dec!(1), dec!(1500.00)).unwrap();

    let b = draft.preview().unwrap();
    assert_eq!(b.tax_amount, dec!(0));
    assert_eq!(b.retention_amount, dec!(0));
    assert_eq!(b.total_amount, dec!(1500.00));
}

#[test]
fn fee_of_two_thousand() {
    let items = vec![LineItem::snapshot(&product(3, dec!(1000)), dec!(2), dec!(1000)).unwrap()];
    let b = compute_breakdown(&items, DocumentKind::ProfessionalFee).unwrap();
    assert_eq!(b.subtotal, dec!(2000.00));
    assert_eq!(b.tax_amount, dec!(0));
    assert_eq!(b.retention_amount, dec!(160.00));
    assert_eq!(b.total_amount, dec!(1840.00));
    assert!(b.is_consistent());
}

#[test]
fn multi_line_sale_rounds_once() {
    let items = vec![
        LineItem::snapshot(&product(1, dec!(0)), dec!(3), dec!(33.333)).unwrap(),
        LineItem::snapshot(&product(2, dec!(0)), dec!(1.5), dec!(12.35)).unwrap(),
    ];
    // 99.999 + 18.525 = 118.524 -> 118.52; IGV 21.3336 -> 21.33
    let b = compute_breakdown(&items, DocumentKind::Sale).unwrap();
    assert_eq!(b.subtotal, dec!(118.52));
    assert_eq!(b.tax_amount, dec!(21.33));
    assert_eq!(b.total_amount, dec!(139.85));
}

#[test]
fn breakdown_is_deterministic() {
    let items = vec![
        LineItem::snapshot(&product(1, dec!(0)), dec!(7), dec!(19.90)).unwrap(),
        LineItem::snapshot(&product(2, dec!(0)), dec!(1), dec!(0.01)).unwrap(),
    ];
    let first = compute_breakdown(&items, DocumentKind::Sale).unwrap();
    for _ in 0..10 {
        assert_eq!(compute_breakdown(&items, DocumentKind::Sale).unwrap(), first);
    }
}

#[test]
fn empty_items_rejected() {
    assert!(matches!(
        compute_breakdown(&[], DocumentKind::Sale),
        Err(ComprobanteError::InvalidLineItem(_))
    ));
}

// --- Draft builder ---

#[test]
fn client_without_items_is_incomplete() {
    let mut draft = InvoiceDraft::new();
    draft.select_client(ClientId(8));
    let err = draft.build_submission_request().unwrap_err();
    assert!(matches!(err, ComprobanteError::IncompleteDraft(_)));
    assert!(err.to_string().contains("line item"));
    assert!(!err.to_string().contains("client"));
}

#[test]
fn request_series_follows_kind() {
    let mut draft = InvoiceDraft::new();
    draft.select_client(ClientId(1));
    draft.add_line(&product(1, dec!(10)), dec!(1), dec!(10)).unwrap();
    assert_eq!(draft.build_submission_request().unwrap().series, config::SALE_SERIES);

    draft.set_kind(DocumentKind::ProfessionalFee);
    let request = draft.build_submission_request().unwrap();
    assert_eq!(request.series, config::FEE_SERIES);
    assert_eq!(request.kind, DocumentKind::ProfessionalFee);
}

#[test]
fn line_is_a_snapshot() {
    let mut catalog_entry = product(4, dec!(50));
    let mut draft = InvoiceDraft::new();
    draft.add_line(&catalog_entry, dec!(1), catalog_entry.unit_price).unwrap();

    catalog_entry.description = "Renamed".into();
    catalog_entry.unit_price = dec!(75);
    assert_eq!(draft.lines()[0].description, "Producto 4");
    assert_eq!(draft.lines()[0].unit_value, dec!(50));
}

#[test]
fn negative_price_rejected_zero_allowed() {
    let mut draft = InvoiceDraft::new();
    assert!(draft.add_line(&product(1, dec!(1)), dec!(1), dec!(-0.01)).is_err());
    assert!(draft.add_line(&product(1, dec!(1)), dec!(1), dec!(0)).is_ok());
    assert_eq!(draft.preview().unwrap().total_amount, dec!(0));
}

#[test]
fn validate_reports_unknown_unit_on_sales_only() {
    let mut odd = product(5, dec!(10));
    odd.unit_code = "XYZ".into();

    let mut draft = InvoiceDraft::new();
    draft.select_client(ClientId(1));
    draft.add_line(&odd, dec!(1), dec!(10)).unwrap();
    let errors = draft.validate();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "lines.0.unit_code");
    // Advisory only.
    assert!(draft.build_submission_request().is_ok());

    draft.set_kind(DocumentKind::ProfessionalFee);
    assert!(draft.validate().is_empty());
}

// --- Lifecycle and registry ---

#[test]
fn sent_then_sign_is_illegal() {
    let err = DocumentStatus::Sent.apply(Transition::Sign).unwrap_err();
    assert!(matches!(
        err,
        ComprobanteError::IllegalTransition {
            action: Transition::Sign,
            status: DocumentStatus::Sent,
        }
    ));
}

#[test]
fn legal_chain_and_reorderings() {
    let chain = [Transition::GenerateXml, Transition::Sign, Transition::Send];
    let mut status = DocumentStatus::Created;
    for t in chain {
        status = status.apply(t).unwrap();
    }
    assert_eq!(status, DocumentStatus::Sent);

    let reorderings = [
        [Transition::Sign, Transition::GenerateXml, Transition::Send],
        [Transition::Send, Transition::GenerateXml, Transition::Sign],
        [Transition::GenerateXml, Transition::Send, Transition::Sign],
    ];
    for order in reorderings {
        let mut status = DocumentStatus::Created;
        let mut failed_at = None;
        for (i, t) in order.iter().enumerate() {
            match status.apply(*t) {
                Ok(next) => status = next,
                Err(_) => {
                    failed_at = Some(i);
                    break;
                }
            }
        }
        let expected = order.iter().zip(chain.iter()).position(|(a, b)| a != b);
        assert_eq!(failed_at, expected, "{order:?}");
    }
}

#[test]
fn registry_rows_newest_first_with_next_action() {
    let docs = vec![
        document(1, "F001", 1, 1, DocumentStatus::Sent),
        document(2, "F001", 2, 3, DocumentStatus::Created),
        document(3, "F001", 3, 2, DocumentStatus::Signed),
    ];
    let rows = registry_view(&docs);
    let ids: Vec<u64> = rows.iter().map(|r| r.id.0).collect();
    assert_eq!(ids, vec![2, 3, 1]);
    assert_eq!(rows[0].identifier, "F001-00000002");
    assert_eq!(rows[0].next_action, Some(ActionKind::GenerateXml));
    assert_eq!(rows[1].next_action, Some(ActionKind::Send));
    assert_eq!(rows[2].next_action, None);
    assert_eq!(rows[2].total_amount, dec!(118.00));
}

#[test]
fn registry_rows_carry_display_labels() {
    let mut fee = document(4, "E001", 4, 4, DocumentStatus::XmlGenerated);
    fee.kind = DocumentKind::ProfessionalFee;
    let rows = registry_view(&[fee, document(5, "F001", 5, 1, DocumentStatus::Sent)]);

    assert_eq!(rows[0].title, "RECIBO POR HONORARIOS ELECTRÓNICO");
    assert_eq!(rows[0].next_action_label, Some("Firmar"));
    assert_eq!(rows[1].title, "FACTURA ELECTRÓNICA");
    assert_eq!(rows[1].next_action_label, None);
}

#[test]
fn next_action_is_recomputed_from_status() {
    let mut doc = document(1, "F001", 1, 1, DocumentStatus::Created);
    assert_eq!(doc.next_legal_action(), Some(ActionKind::GenerateXml));
    doc.status = DocumentStatus::XmlGenerated;
    assert_eq!(doc.next_legal_action(), Some(ActionKind::Sign));
    doc.status = DocumentStatus::Annulled;
    assert_eq!(doc.next_legal_action(), None);
}

// --- Configuration and wire enums ---

#[test]
fn issuer_config_fills_defaults() {
    let json = r#"{
        "issuer": {"ruc": "20601234567", "name": "Mi Empresa S.A.C.", "address": "Lima"},
        "series": {"sale": "F002"}
    }"#;
    let config: IssuerConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.rates, TaxRates::default());
    assert_eq!(config.series.sale, "F002");
    assert_eq!(config.series.professional_fee, "E001");
    assert!(config.issuer.email.is_none());
}

#[test]
fn status_and_role_wire_forms() {
    assert_eq!(
        serde_json::to_string(&DocumentStatus::Annulled).unwrap(),
        "\"ANULADA\""
    );
    assert_eq!(
        serde_json::from_str::<DocumentStatus>("\"XML_GENERATED\"").unwrap(),
        DocumentStatus::XmlGenerated
    );
    assert_eq!(serde_json::from_str::<Role>("\"ADMIN\"").unwrap(), Role::Admin);
    assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ROLE_ADMIN\"");
}

#[test]
fn product_status_field_maps_to_active() {
    let json = r#"{"id": 3, "code": "P-3", "description": "Silla", "unitPrice": 120.5,
                   "unitCode": "NIU", "status": false}"#;
    let p: Product = serde_json::from_str(json).unwrap();
    assert!(!p.active);
    assert_eq!(p.unit_price, dec!(120.5));
}

#[test]
fn currency_parsing() {
    assert_eq!("USD".parse::<Currency>().unwrap(), Currency::Usd);
    assert!(matches!(
        "EUR".parse::<Currency>(),
        Err(ComprobanteError::InvalidCurrency(c)) if c == "EUR"
    ));
}
