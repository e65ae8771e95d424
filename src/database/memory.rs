use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::database::codec::RecipeCodec;
use crate::database::manager::DatabaseError;
use crate::database::models::drink::{seed_drink, Drink, DrinkPatch, DrinkRow, NewDrink, MAX_TITLE_CHARS};
use crate::database::repository::DrinkStore;

/// Process-local drink storage, used when no `DATABASE_URL` is configured.
///
/// Rows are kept in their encoded form so reads and writes cross the same
/// codec boundary as the PostgreSQL store.
#[derive(Default)]
pub struct MemoryDrinkStore {
    state: RwLock<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    last_id: i32,
    rows: BTreeMap<i32, DrinkRow>,
}

/// Mirrors the `VARCHAR(80)` limit of the PostgreSQL column.
fn check_title_length(title: &str) -> Result<(), DatabaseError> {
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(DatabaseError::Invalid(format!(
            "title longer than {} characters",
            MAX_TITLE_CHARS
        )));
    }
    Ok(())
}

impl MemoryState {
    fn title_taken(&self, title: &str, except: Option<i32>) -> bool {
        self.rows
            .values()
            .any(|row| row.title == title && Some(row.id) != except)
    }

    fn insert(&mut self, drink: NewDrink) -> Result<DrinkRow, DatabaseError> {
        check_title_length(&drink.title)?;
        if self.title_taken(&drink.title, None) {
            return Err(DatabaseError::Conflict(format!("title '{}' already exists", drink.title)));
        }
        let recipe = RecipeCodec::encode(&drink.recipe)?;

        self.last_id += 1;
        let row = DrinkRow {
            id: self.last_id,
            title: drink.title,
            recipe,
        };
        self.rows.insert(row.id, row.clone());
        Ok(row)
    }
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    async fn list_all(&self) -> Result<Vec<Drink>, DatabaseError> {
        let state = self.state.read().await;
        state.rows.values().cloned().map(DrinkRow::into_drink).collect()
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Drink>, DatabaseError> {
        let state = self.state.read().await;
        state.rows.get(&id).cloned().map(DrinkRow::into_drink).transpose()
    }

    async fn insert(&self, drink: NewDrink) -> Result<Drink, DatabaseError> {
        let mut state = self.state.write().await;
        let row = state.insert(drink)?;
        debug!("Inserted drink {} ({})", row.id, row.title);
        row.into_drink()
    }

    async fn update_by_id(&self, id: i32, patch: DrinkPatch) -> Result<Drink, DatabaseError> {
        let mut state = self.state.write().await;

        if !state.rows.contains_key(&id) {
            return Err(DatabaseError::drink_not_found(id));
        }
        if let Some(title) = &patch.title {
            check_title_length(title)?;
            if state.title_taken(title, Some(id)) {
                return Err(DatabaseError::Conflict(format!("title '{}' already exists", title)));
            }
        }
        let recipe = patch
            .recipe
            .as_deref()
            .map(RecipeCodec::encode)
            .transpose()?;

        let row = state
            .rows
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::drink_not_found(id))?;
        if let Some(title) = patch.title {
            row.title = title;
        }
        if let Some(recipe) = recipe {
            row.recipe = recipe;
        }

        debug!("Updated drink {}", id);
        row.clone().into_drink()
    }

    async fn delete_by_id(&self, id: i32) -> Result<i32, DatabaseError> {
        let mut state = self.state.write().await;
        state
            .rows
            .remove(&id)
            .map(|row| row.id)
            .ok_or_else(|| DatabaseError::drink_not_found(id))
    }

    async fn health_check(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn reset(&self) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        *state = MemoryState::default();
        state.insert(seed_drink())?;
        Ok(())
    }
}
