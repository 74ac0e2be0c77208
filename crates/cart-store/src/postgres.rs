use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    CartId, CartItemRecord, CartRecord, CartStoreError, CustomerId, ProductId, Result,
    store::{CartStore, CartTransaction},
};

const PK_SHOPPING_CARTS: &str = "pk_shopping_carts";
const PK_SHOPPING_CART_ITEMS: &str = "pk_shopping_cart_items";
const FK_SHOPPING_CART_ITEMS_CART: &str = "fk_shopping_cart_items_cart";

/// PostgreSQL-backed cart storage.
#[derive(Clone)]
pub struct PostgresCartStore {
    pool: PgPool,
}

impl PostgresCartStore {
    /// Creates a new PostgreSQL cart store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_item(row: PgRow) -> Result<CartItemRecord> {
        Ok(CartItemRecord {
            cart_id: CartId::from_uuid(row.try_get::<Uuid, _>("shopping_cart_id")?),
            product_id: ProductId::from_uuid(row.try_get::<Uuid, _>("product_id")?),
            quantity: row.try_get::<i32, _>("quantity")?,
            price: row.try_get::<Decimal, _>("price")?,
        })
    }
}

fn violated_constraint(e: &sqlx::Error) -> Option<&str> {
    match e {
        sqlx::Error::Database(db_err) => db_err.constraint(),
        _ => None,
    }
}

/// SQLSTATE `numeric_value_out_of_range`, raised when `quantity` overflows.
fn is_out_of_range(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("22003"),
        _ => false,
    }
}

#[async_trait]
impl CartStore for PostgresCartStore {
    type Transaction = PostgresCartTransaction;

    #[tracing::instrument(skip(self))]
    async fn fetch_cart(&self, cart_id: CartId) -> Result<Option<CartRecord>> {
        let row: Option<PgRow> = sqlx::query(
            r#"
            SELECT shopping_cart_id, customer_id
            FROM shopping_carts
            WHERE shopping_cart_id = $1
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(CartRecord {
                cart_id: CartId::from_uuid(row.try_get::<Uuid, _>("shopping_cart_id")?),
                customer_id: CustomerId::from_uuid(row.try_get::<Uuid, _>("customer_id")?),
            })),
            None => Ok(None),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn fetch_items(&self, cart_id: CartId) -> Result<Vec<CartItemRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT shopping_cart_id, product_id, quantity, price
            FROM shopping_cart_items
            WHERE shopping_cart_id = $1
            "#,
        )
        .bind(cart_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::row_to_item).collect()
    }

    async fn begin(&self) -> Result<PostgresCartTransaction> {
        let tx = self.pool.begin().await?;
        Ok(PostgresCartTransaction { tx })
    }
}

/// An open PostgreSQL transaction on the cart tables.
///
/// Dropping it without calling `commit` rolls the transaction back.
pub struct PostgresCartTransaction {
    tx: sqlx::Transaction<'static, Postgres>,
}

#[async_trait]
impl CartTransaction for PostgresCartTransaction {
    async fn insert_cart(&mut self, cart: &CartRecord) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO shopping_carts (shopping_cart_id, customer_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(cart.cart_id.as_uuid())
        .bind(cart.customer_id.as_uuid())
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some(PK_SHOPPING_CARTS) {
                return CartStoreError::DuplicateCart(cart.cart_id);
            }
            CartStoreError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn insert_item(&mut self, item: &CartItemRecord) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO shopping_cart_items (shopping_cart_id, product_id, quantity, price)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(item.cart_id.as_uuid())
        .bind(item.product_id.as_uuid())
        .bind(item.quantity)
        .bind(item.price)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            let constraint = violated_constraint(&e).map(str::to_owned);
            match constraint.as_deref() {
                Some(PK_SHOPPING_CART_ITEMS) => CartStoreError::DuplicateItem {
                    cart_id: item.cart_id,
                    product_id: item.product_id,
                },
                Some(FK_SHOPPING_CART_ITEMS_CART) => CartStoreError::CartNotFound(item.cart_id),
                _ => CartStoreError::Database(e),
            }
        })?;

        Ok(result.rows_affected())
    }

    async fn increment_quantity(
        &mut self,
        cart_id: CartId,
        product_id: ProductId,
        delta: i32,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE shopping_cart_items
            SET quantity = quantity + $3
            WHERE shopping_cart_id = $1 AND product_id = $2
            "#,
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .bind(delta)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            if is_out_of_range(&e) {
                return CartStoreError::QuantityOutOfRange {
                    cart_id,
                    product_id,
                };
            }
            CartStoreError::Database(e)
        })?;

        Ok(result.rows_affected())
    }

    async fn delete_item(&mut self, cart_id: CartId, product_id: ProductId) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM shopping_cart_items WHERE shopping_cart_id = $1 AND product_id = $2",
        )
        .bind(cart_id.as_uuid())
        .bind(product_id.as_uuid())
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_items(&mut self, cart_id: CartId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM shopping_cart_items WHERE shopping_cart_id = $1")
            .bind(cart_id.as_uuid())
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
