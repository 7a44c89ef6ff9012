//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Recipe authors.
    users (id) {
        id -> Uuid,
        name -> Varchar,
        /// Optional contact address.
        email -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    recipes (id) {
        id -> Uuid,
        name -> Varchar,
        description -> Nullable<Text>,
        /// Owning user.
        author_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Ingredients shared across recipes; `name` is unique.
    ingredients (id) {
        id -> Uuid,
        name -> Varchar,
    }
}

diesel::table! {
    /// Association of an ingredient with a recipe and an amount.
    recipe_ingredients (id) {
        id -> Uuid,
        recipe_id -> Uuid,
        ingredient_id -> Uuid,
        amount -> Varchar,
    }
}

diesel::joinable!(recipes -> users (author_id));
diesel::joinable!(recipe_ingredients -> recipes (recipe_id));
diesel::joinable!(recipe_ingredients -> ingredients (ingredient_id));

diesel::allow_tables_to_appear_in_same_query!(users, recipes, ingredients, recipe_ingredients);
