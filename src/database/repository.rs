use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::database::codec::RecipeCodec;
use crate::database::manager::DatabaseError;
use crate::database::models::drink::{seed_drink, Drink, DrinkPatch, DrinkRow, NewDrink};

/// CRUD operations over the drinks collection.
///
/// Implementations encode recipes with [`RecipeCodec`] before every write and
/// return drinks in id order.
#[async_trait]
pub trait DrinkStore: Send + Sync {
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError>;

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError>;

    /// Fails with `Conflict` when the title is already taken.
    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError>;

    /// Applies only the fields present in `patch`. An empty patch changes
    /// nothing and returns the current row.
    async fn update_by_id(&self, id: i32, patch: DrinkPatch) -> Result<Drink, DatabaseError>;

    /// Returns the deleted id.
    async fn delete_by_id(&self, id: i32) -> Result<i32, DatabaseError>;

    async fn health_check(&self) -> Result<(), DatabaseError>;

    /// Creates the drinks table if it does not exist.
    async fn ensure_schema(&self) -> Result<(), DatabaseError>;

    /// Drops every drink and leaves a single seed row.
    async fn reset(&self) -> Result<(), DatabaseError>;
}

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS drinks (
        id SERIAL PRIMARY KEY,
        title VARCHAR(80) NOT NULL UNIQUE,
        recipe TEXT NOT NULL
    )
"#;

pub struct PgDrinkStore {
    pool: PgPool,
}

impl PgDrinkStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrinkStore for PgDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError> {
        let rows = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(DrinkRow::into_drink).collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        let row = sqlx::query_as::<_, DrinkRow>("SELECT id, title, recipe FROM drinks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(DrinkRow::into_drink).transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let recipe = RecipeCodec::encode(&drink.recipe)?;

        let row = sqlx::query_as::<_, DrinkRow>(
            "INSERT INTO drinks (title, recipe) VALUES ($1, $2) RETURNING id, title, recipe",
        )
        .bind(&drink.title)
        .bind(&recipe)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?;

        debug!("Inserted drink {} ({})", row.id, row.title);
        row.into_drink()
    }

    async fn update_by_id(&self, id: i32, patch: DrinkPatch) -> Result<Drink, DatabaseError> {
        let recipe = patch
            .recipe
            .as_deref()
            .map(RecipeCodec::encode)
            .transpose()?;

        // NULL binds keep the stored column
        let row = sqlx::query_as::<_, DrinkRow>(
            "UPDATE drinks
             SET title = COALESCE($2, title), recipe = COALESCE($3, recipe)
             WHERE id = $1
             RETURNING id, title, recipe",
        )
        .bind(id)
        .bind(patch.title)
        .bind(recipe)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_write)?
        .ok_or_else(|| DatabaseError::drink_not_found(id))?;

        debug!("Updated drink {}", id);
        row.into_drink()
    }

    async fn delete_by_id(&self, id: i32) -> Result<i32, DatabaseError> {
        let deleted: Option<i32> = sqlx::query_scalar("DELETE FROM drinks WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let deleted = deleted.ok_or_else(|| DatabaseError::drink_not_found(id))?;
        debug!("Deleted drink {}", deleted);
        Ok(deleted)
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        info!("Drinks table ready");
        Ok(())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DROP TABLE IF EXISTS drinks").execute(&mut *tx).await?;
        sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;

        let seed = seed_drink();
        sqlx::query("INSERT INTO drinks (title, recipe) VALUES ($1, $2)")
            .bind(&seed.title)
            .bind(RecipeCodec::encode(&seed.recipe)?)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        info!("Drinks table reset with seed drink '{}'", seed.title);
        Ok(())
    }
}
