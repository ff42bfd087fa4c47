#![no_main]

use comprobante::core::*;
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

fuzz_target!(|data: &[u8]| {
    // Each 17-byte chunk: quantity (i64, scale byte) + unit value (i64).
    let items: Vec<LineItem> = data
        .chunks_exact(17)
        .enumerate()
        .filter_map(|(i, chunk)| {
            let q = i64::from_le_bytes(chunk[0..8].try_into().ok()?);
            let p = i64::from_le_bytes(chunk[8..16].try_into().ok()?);
            let scale = u32::from(chunk[16] % 8);
            Some(LineItem {
                product_id: ProductId(i as u64),
                product_code: format!("F-{i}"),
                description: String::new(),
                unit_code: "NIU".into(),
                quantity: Decimal::new(q, scale),
                unit_value: Decimal::new(p, 2),
            })
        })
        .collect();

    for kind in [DocumentKind::Sale, DocumentKind::ProfessionalFee] {
        // Errors are fine; panics and broken identities are not.
        if let Ok(b) = compute_breakdown(&items, kind) {
            assert!(b.is_consistent());
            assert!(b.retention_amount >= Decimal::ZERO);
        }
    }
});
