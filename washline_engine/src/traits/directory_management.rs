use crate::{
    db_types::{Admin, Customer, NewAdmin, NewCustomer, NewShop, Shop, ShopId},
    traits::StoreError,
};

/// Read and write access to the shop/admin/customer directory.
///
/// The lookup methods return `None` rather than an error when a record is absent; callers decide
/// whether a missing record is fatal. The `fetch_admin_*` family exists for the recipient resolver,
/// which has to find a shop's admin through several generations of order shape.
#[allow(async_fn_in_trait)]
pub trait DirectoryManagement: Clone {
    async fn insert_shop(&self, shop: NewShop) -> Result<Shop, StoreError>;

    /// Inserts an admin and embeds the current document of the shop they own. Fails with
    /// [`StoreError::ShopNotFound`] if the shop does not exist yet.
    async fn insert_admin(&self, admin: NewAdmin) -> Result<Admin, StoreError>;

    async fn insert_customer(&self, customer: NewCustomer) -> Result<Customer, StoreError>;

    async fn fetch_shop(&self, shop_id: &ShopId) -> Result<Option<Shop>, StoreError>;

    /// Looks a shop up by its store-assigned record id. Only the resolver's compatibility fallbacks
    /// use this; new code carries public shop ids.
    async fn fetch_shop_by_record_id(&self, id: i64) -> Result<Option<Shop>, StoreError>;

    async fn fetch_admin(&self, admin_id: &str) -> Result<Option<Admin>, StoreError>;

    /// Finds the admin whose embedded shop has the given public shop id.
    async fn fetch_admin_for_shop(&self, shop_id: &ShopId) -> Result<Option<Admin>, StoreError>;

    /// Finds the admin whose embedded shop holds a copy of the order with record id `order_ref`.
    async fn fetch_admin_with_order(&self, order_ref: i64) -> Result<Option<Admin>, StoreError>;

    async fn fetch_customer(&self, customer_id: &str) -> Result<Option<Customer>, StoreError>;
}
