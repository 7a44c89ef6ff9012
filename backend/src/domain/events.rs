//! Recipe change notifications and their wire representation.

use serde::Serialize;

use super::recipe::{IngredientId, RecipeId};

/// Topic exchange that carries recipe events.
pub const RECIPE_EVENTS_EXCHANGE: &str = "recipe_events";

/// Kind of recipe change, one routing key each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecipeEventKind {
    /// A recipe was created.
    RecipeCreated,
    /// A recipe's own fields changed.
    RecipeUpdated,
    /// An ingredient was associated with a recipe.
    IngredientAdded,
    /// An ingredient association was removed.
    IngredientRemoved,
}

impl RecipeEventKind {
    /// Every kind.
    pub const ALL: [Self; 4] = [
        Self::RecipeCreated,
        Self::RecipeUpdated,
        Self::IngredientAdded,
        Self::IngredientRemoved,
    ];

    /// Routing key used on [`RECIPE_EVENTS_EXCHANGE`].
    #[must_use]
    pub const fn routing_key(self) -> &'static str {
        match self {
            Self::RecipeCreated => "recipe.created",
            Self::RecipeUpdated => "recipe.updated",
            Self::IngredientAdded => "recipe.ingredient_added",
            Self::IngredientRemoved => "recipe.ingredient_removed",
        }
    }
}

/// A recipe change notification.
///
/// # Examples
/// ```
/// use recipe_backend::domain::{RecipeEvent, RecipeId};
///
/// let id: RecipeId = "3fa85f64-5717-4562-b3fc-2c963f66afa6".parse().expect("uuid");
/// let event = RecipeEvent::RecipeCreated { recipe_id: id };
/// assert_eq!(event.kind().routing_key(), "recipe.created");
/// assert_eq!(
///     event.payload(),
///     br#"{"recipeId":"3fa85f64-5717-4562-b3fc-2c963f66afa6"}"#.to_vec()
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipeEvent {
    /// See [`RecipeEventKind::RecipeCreated`].
    RecipeCreated {
        /// Created recipe.
        recipe_id: RecipeId,
    },
    /// See [`RecipeEventKind::RecipeUpdated`].
    RecipeUpdated {
        /// Updated recipe.
        recipe_id: RecipeId,
    },
    /// See [`RecipeEventKind::IngredientAdded`].
    IngredientAdded {
        /// Recipe gaining the ingredient.
        recipe_id: RecipeId,
        /// Added ingredient.
        ingredient_id: IngredientId,
    },
    /// See [`RecipeEventKind::IngredientRemoved`].
    IngredientRemoved {
        /// Recipe losing the ingredient.
        recipe_id: RecipeId,
        /// Removed ingredient.
        ingredient_id: IngredientId,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EventBody {
    recipe_id: RecipeId,
    #[serde(skip_serializing_if = "Option::is_none")]
    ingredient_id: Option<IngredientId>,
}

impl RecipeEvent {
    /// Kind of this event.
    #[must_use]
    pub const fn kind(&self) -> RecipeEventKind {
        match self {
            Self::RecipeCreated { .. } => RecipeEventKind::RecipeCreated,
            Self::RecipeUpdated { .. } => RecipeEventKind::RecipeUpdated,
            Self::IngredientAdded { .. } => RecipeEventKind::IngredientAdded,
            Self::IngredientRemoved { .. } => RecipeEventKind::IngredientRemoved,
        }
    }

    /// Recipe the event refers to.
    #[must_use]
    pub const fn recipe_id(&self) -> RecipeId {
        match self {
            Self::RecipeCreated { recipe_id }
            | Self::RecipeUpdated { recipe_id }
            | Self::IngredientAdded { recipe_id, .. }
            | Self::IngredientRemoved { recipe_id, .. } => *recipe_id,
        }
    }

    /// Ingredient the event refers to, for ingredient events.
    #[must_use]
    pub const fn ingredient_id(&self) -> Option<IngredientId> {
        match self {
            Self::IngredientAdded { ingredient_id, .. }
            | Self::IngredientRemoved { ingredient_id, .. } => Some(*ingredient_id),
            Self::RecipeCreated { .. } | Self::RecipeUpdated { .. } => None,
        }
    }

    /// UTF-8 JSON body.
    #[must_use]
    pub fn payload(&self) -> Vec<u8> {
        let body = EventBody {
            recipe_id: self.recipe_id(),
            ingredient_id: self.ingredient_id(),
        };
        // Two UUID fields always serialize.
        serde_json::to_vec(&body).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::{Value, json};

    const RECIPE: &str = "11111111-1111-4111-8111-111111111111";
    const INGREDIENT: &str = "22222222-2222-4222-8222-222222222222";

    fn ids() -> (RecipeId, IngredientId) {
        (
            RECIPE.parse().expect("recipe uuid"),
            INGREDIENT.parse().expect("ingredient uuid"),
        )
    }

    #[rstest]
    fn ingredient_events_carry_both_ids() {
        let (recipe_id, ingredient_id) = ids();
        let event = RecipeEvent::IngredientRemoved {
            recipe_id,
            ingredient_id,
        };
        let body: Value = serde_json::from_slice(&event.payload()).expect("json body");
        assert_eq!(body, json!({ "recipeId": RECIPE, "ingredientId": INGREDIENT }));
        assert_eq!(event.kind().routing_key(), "recipe.ingredient_removed");
    }

    #[rstest]
    fn recipe_events_omit_ingredient_id() {
        let (recipe_id, _) = ids();
        let body: Value =
            serde_json::from_slice(&RecipeEvent::RecipeUpdated { recipe_id }.payload())
                .expect("json body");
        assert_eq!(body, json!({ "recipeId": RECIPE }));
    }

    #[rstest]
    fn routing_keys_are_distinct() {
        let keys: std::collections::HashSet<_> = RecipeEventKind::ALL
            .iter()
            .map(|kind| kind.routing_key())
            .collect();
        assert_eq!(keys.len(), 4);
    }
}
