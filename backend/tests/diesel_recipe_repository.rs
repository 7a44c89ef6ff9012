//! Integration tests for `DieselRecipeRepository` against embedded PostgreSQL.
//!
//! Each test provisions its own migrated database. Async repository calls run
//! on a runtime owned by the test context, so fixtures and assertions stay
//! synchronous.

use std::sync::Arc;

use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use recipe_backend::domain::ports::{RecipeRepository, RecipeRepositoryError, UserRepository};
use recipe_backend::domain::{IngredientDraft, NewRecipe, NewUser, Recipe, User};
use recipe_backend::outbound::persistence::{
    DbPool, DieselRecipeRepository, DieselUserRepository, PoolConfig,
};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

mod support;

use support::{count_named, drop_table, handle_cluster_setup_failure, provision_database};

struct TestContext {
    runtime: Runtime,
    recipes: DieselRecipeRepository,
    author: User,
    database_url: String,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn new_recipe(&self, name: &str, lines: &[(&str, &str)]) -> NewRecipe {
        let drafts = lines
            .iter()
            .map(|(name, amount)| IngredientDraft::new(*name, *amount).expect("valid draft"))
            .collect();
        NewRecipe::new(name, None, self.author.id, drafts).expect("valid recipe")
    }

    fn create(&self, name: &str, lines: &[(&str, &str)]) -> Recipe {
        let input = self.new_recipe(name, lines);
        self.runtime
            .block_on(self.recipes.create(&input))
            .expect("recipe created")
    }

    fn ingredient_rows(&self, name: &str) -> i64 {
        count_named(&self.database_url, "ingredients", name).expect("ingredient count")
    }
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = provision_database()?;
    let database_url = database.url().to_string();

    let config = PoolConfig::new(database_url.as_str()).with_max_size(2);
    let pool = runtime
        .block_on(DbPool::new(config))
        .map_err(|err| err.to_string())?;

    let clock = Arc::new(DefaultClock);
    let users = DieselUserRepository::new(pool.clone(), clock.clone());
    let recipes = DieselRecipeRepository::new(pool, clock);

    let new_user = NewUser::new("Ada", Some("ada@example.com".to_owned()))
        .map_err(|err| err.to_string())?;
    let author = runtime
        .block_on(users.create(&new_user))
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        recipes,
        author,
        database_url,
        _database: database,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(context) => Some(context),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn recipes_sharing_an_ingredient_reuse_one_row(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };

    let cake = ctx.create("Cake", &[("Sugar", "200g"), ("Flour", "300g")]);
    let tea = ctx.create("Sweet tea", &[("Sugar", "1 tsp")]);

    let sugar_in = |recipe: &Recipe| {
        recipe
            .ingredients
            .iter()
            .find(|line| line.ingredient.name == "Sugar")
            .map(|line| line.ingredient.id)
            .expect("sugar line")
    };
    assert_eq!(sugar_in(&cake), sugar_in(&tea));
    assert_eq!(ctx.ingredient_rows("Sugar"), 1);
}

#[rstest]
fn created_recipe_reads_back_with_its_ingredients(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };

    let created = ctx.create("Pancakes", &[("Egg", "2"), ("Milk", "250ml")]);
    let found = ctx
        .runtime
        .block_on(ctx.recipes.find_by_id(&created.id))
        .expect("lookup succeeds")
        .expect("recipe exists");

    assert_eq!(found.author_id, ctx.author.id);
    let mut names: Vec<&str> = found
        .ingredients
        .iter()
        .map(|line| line.ingredient.name.as_str())
        .collect();
    names.sort_unstable();
    assert_eq!(names, ["Egg", "Milk"]);
}

#[rstest]
fn removing_an_ingredient_keeps_the_shared_row(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };

    let cake = ctx.create("Cake", &[("Sugar", "200g"), ("Flour", "300g")]);
    let sugar = cake
        .ingredients
        .iter()
        .find(|line| line.ingredient.name == "Sugar")
        .map(|line| line.ingredient.id)
        .expect("sugar line");

    ctx.runtime
        .block_on(ctx.recipes.remove_ingredient(&cake.id, &sugar))
        .expect("association removed");

    let reloaded = ctx
        .runtime
        .block_on(ctx.recipes.find_by_id(&cake.id))
        .expect("lookup succeeds")
        .expect("recipe exists");
    assert!(
        reloaded
            .ingredients
            .iter()
            .all(|line| line.ingredient.id != sugar)
    );
    assert_eq!(reloaded.ingredients.len(), 1);
    assert_eq!(ctx.ingredient_rows("Sugar"), 1);
}

#[rstest]
fn failed_create_leaves_no_partial_recipe(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };

    drop_table(&ctx.database_url, "recipe_ingredients").expect("association table dropped");
    let input = ctx.new_recipe("Paella", &[("Saffron", "1 pinch")]);

    let result = ctx.runtime.block_on(ctx.recipes.create(&input));

    assert!(matches!(result, Err(RecipeRepositoryError::Query { .. })));
    let authored = ctx
        .runtime
        .block_on(ctx.recipes.find_by_user(&ctx.author.id))
        .expect("recipe list loads");
    assert!(authored.is_empty());
    assert_eq!(
        count_named(&ctx.database_url, "recipes", "Paella").expect("recipe count"),
        0
    );
    assert_eq!(ctx.ingredient_rows("Saffron"), 0);
}
