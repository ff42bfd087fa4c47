use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio::sync::RwLock;

use crate::core::{
    Client, ClientId, ComprobanteError, InvoiceDraft, LineItem, Product, ProductId, Result,
};

/// Catalog and client lookups used while drafting.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Fails with `UnknownProduct` when the id does not exist.
    async fn product(&self, id: ProductId) -> Result<Product>;

    /// Fails with `UnknownClient` when the id does not exist.
    async fn client(&self, id: ClientId) -> Result<Client>;
}

#[async_trait]
impl<T> Directory for Arc<T>
where
    T: Directory + ?Sized,
{
    async fn product(&self, id: ProductId) -> Result<Product> {
        (**self).product(id).await
    }

    async fn client(&self, id: ClientId) -> Result<Client> {
        (**self).client(id).await
    }
}

/// Look up `product_id` and append it to `draft`.
///
/// The price defaults to the catalog price. Inactive products stay readable
/// in the directory but cannot be added to new drafts.
pub async fn add_catalog_line<D>(
    directory: &D,
    draft: &mut InvoiceDraft,
    product_id: ProductId,
    quantity: Decimal,
    unit_price: Option<Decimal>,
) -> Result<LineItem>
where
    D: Directory + ?Sized,
{
    let product = directory.product(product_id).await?;
    if !product.active {
        return Err(ComprobanteError::InvalidLineItem(format!(
            "product {} ({}) is inactive",
            product.id, product.code
        )));
    }
    let price = unit_price.unwrap_or(product.unit_price);
    draft.add_line(&product, quantity, price)?;
    let line = LineItem::snapshot(&product, quantity, price)?;
    Ok(line)
}

/// A thread-safe in-memory catalog and client directory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    products: Arc<RwLock<HashMap<ProductId, Product>>>,
    clients: Arc<RwLock<HashMap<ClientId, Client>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: Product) {
        self.products.write().await.insert(product.id, product);
    }

    pub async fn insert_client(&self, client: Client) {
        self.clients.write().await.insert(client.id, client);
    }

    /// Active products ordered by code, as offered in the line picker.
    pub async fn active_products(&self) -> Vec<Product> {
        let products = self.products.read().await;
        let mut active: Vec<Product> = products.values().filter(|p| p.active).cloned().collect();
        active.sort_by(|a, b| a.code.cmp(&b.code));
        active
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn product(&self, id: ProductId) -> Result<Product> {
        let products = self.products.read().await;
        products
            .get(&id)
            .cloned()
            .ok_or(ComprobanteError::UnknownProduct(id))
    }

    async fn client(&self, id: ClientId) -> Result<Client> {
        let clients = self.clients.read().await;
        clients
            .get(&id)
            .cloned()
            .ok_or(ComprobanteError::UnknownClient(id))
    }
}
