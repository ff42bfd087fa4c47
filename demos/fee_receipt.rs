use comprobante::core::*;
use rust_decimal_macros::dec;

fn main() {
    let consulting = Product {
        id: ProductId(20),
        code: "S-020".into(),
        description: "Asesoría tributaria".into(),
        unit_price: dec!(1000),
        unit_code: "ZZ".into(),
        active: true,
    };

    let mut draft = InvoiceDraft::for_kind(DocumentKind::ProfessionalFee);
    draft.select_client(ClientId(2));
    draft
        .add_line(&consulting, dec!(2), consulting.unit_price)
        .expect("valid line");

    for problem in draft.validate() {
        println!("warning: {problem}");
    }

    let breakdown = draft.preview().expect("draft has lines");
    println!("{}", DocumentKind::ProfessionalFee.title());
    println!("  Subtotal:  S/. {}", breakdown.subtotal);
    println!("  Retención: S/. {}", breakdown.retention_amount);
    println!("  Neto:      S/. {}", breakdown.total_amount);

    let request = draft.build_submission_request().expect("complete draft");
    println!(
        "Ready to submit: series {}, {} line(s), unit {}",
        request.series,
        request.items.len(),
        request.items[0].unit_code
    );
}
