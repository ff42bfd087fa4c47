use comprobante::core::*;
use comprobante::pipeline::*;
use rust_decimal_macros::dec;

#[tokio::main]
async fn main() -> Result<(), ComprobanteError> {
    let directory = InMemoryDirectory::new();
    directory
        .insert_client(Client {
            id: ClientId(1),
            document_type: IdentityDocumentType::Ruc,
            document_number: "20100070970".into(),
            name: "Comercial Andina S.A.C.".into(),
            email: "compras@andina.pe".into(),
            address: Some("Av. Ejército 101, Arequipa".into()),
            phone: None,
        })
        .await;
    directory
        .insert_product(Product {
            id: ProductId(10),
            code: "P-010".into(),
            description: "Impresora láser".into(),
            unit_price: dec!(450.00),
            unit_code: "NIU".into(),
            active: true,
        })
        .await;

    let config = IssuerConfig::new(Issuer {
        ruc: "20601234567".into(),
        name: "Servicios Digitales del Sur S.A.C.".into(),
        address: "Calle Mercaderes 210, Arequipa".into(),
        email: Some("facturacion@sds.pe".into()),
        phone: None,
    });
    let service = InMemoryProcessingService::new(config, directory.clone());
    let audit = InMemoryAuditLog::new();
    let pipeline = IssuancePipeline::new(service.clone(), Operator::new("ana.torres", Role::User))
        .with_audit(std::sync::Arc::new(audit.clone()));

    let mut draft = InvoiceDraft::new();
    draft.select_client(ClientId(1));
    add_catalog_line(&directory, &mut draft, ProductId(10), dec!(2), None).await?;

    let document = pipeline.create_document(&draft).await?;
    println!(
        "Created {} for {}: total S/. {}",
        document.identifier(),
        document.client_name,
        document.breakdown.total_amount
    );

    while let Some(action) = pipeline.next_action(document.id).await? {
        let updated = pipeline.perform(action, document.id).await?;
        println!("  {} -> {}", action.label(), updated.status);
    }

    if let Some(xml) = service.xml(document.id).await {
        println!("XML file: {} ({} bytes)", xml.filename, xml.content.len());
    }
    for row in pipeline.registry().await? {
        println!("{} {} {} {}", row.title, row.identifier, row.status, row.total_amount);
    }
    println!("{} audit record(s)", audit.records().await.len());
    Ok(())
}
