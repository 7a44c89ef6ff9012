//! Recipe aggregate and its ingredient associations.
//!
//! A [`Recipe`] owns an unordered set of [`RecipeIngredient`] associations.
//! Each association points at a shared [`Ingredient`] whose name is unique
//! system-wide, so two recipes that both use "Sugar" reference the same
//! ingredient row.

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use super::ids::define_uuid_id;
use super::user::UserId;

define_uuid_id! {
    /// Recipe identifier.
    RecipeId
}

define_uuid_id! {
    /// Ingredient identifier, stable across recipes.
    IngredientId
}

define_uuid_id! {
    /// Identifier of one recipe-ingredient association.
    RecipeIngredientId
}

/// Validation errors for recipe input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecipeValidationError {
    /// Recipe name was blank.
    #[error("recipe name must not be empty")]
    EmptyName,
    /// Ingredient name was blank.
    #[error("ingredient name must not be empty")]
    EmptyIngredientName,
    /// Ingredient amount was blank.
    #[error("ingredient amount must not be empty")]
    EmptyAmount,
}

/// A shared ingredient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    /// Identifier.
    pub id: IngredientId,
    /// Unique name.
    pub name: String,
}

/// An ingredient used by a recipe, with its amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeIngredient {
    /// Association identifier.
    pub id: RecipeIngredientId,
    /// Owning recipe.
    pub recipe_id: RecipeId,
    /// Referenced ingredient.
    pub ingredient: Ingredient,
    /// Free-text amount such as "200g".
    pub amount: String,
}

/// A recipe with its ingredients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Identifier.
    pub id: RecipeId,
    /// Display name.
    pub name: String,
    /// Optional long-form description.
    pub description: Option<String>,
    /// Author.
    pub author_id: UserId,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
    /// Ingredient associations; order carries no meaning.
    pub ingredients: Vec<RecipeIngredient>,
}

/// Validated ingredient name and amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngredientDraft {
    name: String,
    amount: String,
}

impl IngredientDraft {
    /// Validate an ingredient line.
    ///
    /// # Examples
    /// ```
    /// use recipe_backend::domain::IngredientDraft;
    ///
    /// let draft = IngredientDraft::new("Flour", "200g").expect("valid draft");
    /// assert_eq!(draft.name(), "Flour");
    /// assert!(IngredientDraft::new("Flour", " ").is_err());
    /// ```
    pub fn new(
        name: impl Into<String>,
        amount: impl Into<String>,
    ) -> Result<Self, RecipeValidationError> {
        let name = non_blank(name.into()).ok_or(RecipeValidationError::EmptyIngredientName)?;
        let amount = non_blank(amount.into()).ok_or(RecipeValidationError::EmptyAmount)?;
        Ok(Self { name, amount })
    }

    /// Ingredient name, trimmed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Amount, trimmed.
    pub fn amount(&self) -> &str {
        &self.amount
    }
}

/// Validated input for creating a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    name: String,
    description: Option<String>,
    author_id: UserId,
    ingredients: Vec<IngredientDraft>,
}

impl NewRecipe {
    /// Validate recipe input.
    pub fn new(
        name: impl Into<String>,
        description: Option<String>,
        author_id: UserId,
        ingredients: Vec<IngredientDraft>,
    ) -> Result<Self, RecipeValidationError> {
        let name = non_blank(name.into()).ok_or(RecipeValidationError::EmptyName)?;
        Ok(Self {
            name,
            description,
            author_id,
            ingredients,
        })
    }

    /// Recipe name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Author.
    pub fn author_id(&self) -> UserId {
        self.author_id
    }

    /// Ingredient lines in submission order.
    pub fn ingredients(&self) -> &[IngredientDraft] {
        &self.ingredients
    }
}

/// Partial update of a recipe's own fields. Absent fields are left as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    name: Option<String>,
    description: Option<String>,
}

impl RecipeChanges {
    /// Validate an update.
    pub fn new(
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Self, RecipeValidationError> {
        let name = match name {
            Some(raw) => Some(non_blank(raw).ok_or(RecipeValidationError::EmptyName)?),
            None => None,
        };
        Ok(Self { name, description })
    }

    /// New name, when changing.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// New description, when changing.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Whether no field changes.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }
}

fn non_blank(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "1 cup", RecipeValidationError::EmptyIngredientName)]
    #[case("Milk", "", RecipeValidationError::EmptyAmount)]
    #[case("  ", "  ", RecipeValidationError::EmptyIngredientName)]
    fn ingredient_drafts_require_name_and_amount(
        #[case] name: &str,
        #[case] amount: &str,
        #[case] expected: RecipeValidationError,
    ) {
        assert_eq!(IngredientDraft::new(name, amount), Err(expected));
    }

    #[rstest]
    fn new_recipe_trims_name_and_keeps_ingredient_order() {
        let ingredients = vec![
            IngredientDraft::new("Flour", "200g").expect("valid"),
            IngredientDraft::new("Sugar", "50g").expect("valid"),
        ];
        let recipe = NewRecipe::new(" Cake ", None, UserId::random(), ingredients)
            .expect("valid recipe");

        assert_eq!(recipe.name(), "Cake");
        let names: Vec<_> = recipe.ingredients().iter().map(IngredientDraft::name).collect();
        assert_eq!(names, ["Flour", "Sugar"]);
    }

    #[rstest]
    fn new_recipe_rejects_blank_name() {
        assert_eq!(
            NewRecipe::new(" ", None, UserId::random(), Vec::new()),
            Err(RecipeValidationError::EmptyName)
        );
    }

    #[rstest]
    fn changes_reject_blank_name_but_allow_empty_update() {
        assert_eq!(
            RecipeChanges::new(Some(String::new()), None),
            Err(RecipeValidationError::EmptyName)
        );
        assert!(RecipeChanges::new(None, None).expect("empty update").is_empty());
    }

    #[rstest]
    fn recipe_serializes_in_camel_case() {
        let recipe = Recipe {
            id: RecipeId::random(),
            name: "Soup".into(),
            description: None,
            author_id: UserId::random(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            ingredients: Vec::new(),
        };
        let json = serde_json::to_value(&recipe).expect("serialize");
        assert!(json.get("authorId").is_some());
        assert!(json.get("createdAt").is_some());
    }
}
