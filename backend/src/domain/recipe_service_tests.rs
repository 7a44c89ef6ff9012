//! Tests for the recipe service.

use std::sync::Arc;

use chrono::Utc;
use mockall::Sequence;
use rstest::rstest;

use super::*;
use crate::config::LogLevel;
use crate::domain::ports::{MockRecipeEventPublisher, MockRecipeRepository};
use crate::domain::{ErrorCode, Ingredient, RecipeIngredientId};
use crate::test_support::LogBuffer;

fn recipe(id: RecipeId, author_id: UserId, ingredients: Vec<RecipeIngredient>) -> Recipe {
    Recipe {
        id,
        name: "Bread".into(),
        description: None,
        author_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        ingredients,
    }
}

fn association(recipe_id: RecipeId, name: &str, amount: &str) -> RecipeIngredient {
    RecipeIngredient {
        id: RecipeIngredientId::random(),
        recipe_id,
        ingredient: Ingredient {
            id: IngredientId::random(),
            name: name.into(),
        },
        amount: amount.into(),
    }
}

fn service(
    repo: MockRecipeRepository,
    publisher: MockRecipeEventPublisher,
) -> (RecipeServiceImpl<MockRecipeRepository, MockRecipeEventPublisher>, LogBuffer) {
    let buffer = LogBuffer::default();
    let logger = Logger::with_writer(LogLevel::Debug, buffer.make_writer());
    (
        RecipeServiceImpl::new(Arc::new(repo), Arc::new(publisher), logger),
        buffer,
    )
}

#[tokio::test]
async fn create_recipe_publishes_created_id_after_storing() {
    let recipe_id = RecipeId::random();
    let author_id = UserId::random();
    let stored = recipe(
        recipe_id,
        author_id,
        vec![association(recipe_id, "Flour", "200g")],
    );
    let mut seq = Sequence::new();

    let mut repo = MockRecipeRepository::new();
    repo.expect_create()
        .withf(|new_recipe| {
            new_recipe.ingredients().len() == 1
                && new_recipe.ingredients()[0].name() == "Flour"
                && new_recipe.ingredients()[0].amount() == "200g"
        })
        .times(1)
        .in_sequence(&mut seq)
        .return_once(move |_| Ok(stored));
    let mut publisher = MockRecipeEventPublisher::new();
    publisher
        .expect_publish_recipe_created()
        .withf(move |id| *id == recipe_id)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_| Ok(()));

    let (service, _) = service(repo, publisher);
    let input = NewRecipe::new(
        "Bread",
        None,
        author_id,
        vec![IngredientDraft::new("Flour", "200g").expect("valid draft")],
    )
    .expect("valid recipe");
    let created = service.create_recipe(input).await.expect("create succeeds");

    assert_eq!(created.id, recipe_id);
    assert_eq!(created.ingredients[0].ingredient.name, "Flour");
}

#[tokio::test]
async fn update_recipe_publishes_updated() {
    let recipe_id = RecipeId::random();
    let stored = recipe(recipe_id, UserId::random(), Vec::new());

    let mut repo = MockRecipeRepository::new();
    repo.expect_update()
        .withf(move |id, changes| *id == recipe_id && changes.name() == Some("Rye"))
        .times(1)
        .return_once(move |_, _| Ok(stored));
    let mut publisher = MockRecipeEventPublisher::new();
    publisher
        .expect_publish_recipe_updated()
        .withf(move |id| *id == recipe_id)
        .times(1)
        .return_once(|_| Ok(()));

    let (service, _) = service(repo, publisher);
    let changes = RecipeChanges::new(Some("Rye".into()), None).expect("valid changes");
    service
        .update_recipe(recipe_id, changes)
        .await
        .expect("update succeeds");
}

#[tokio::test]
async fn add_ingredient_publishes_ingredient_id() {
    let recipe_id = RecipeId::random();
    let added = association(recipe_id, "Salt", "1 tsp");
    let ingredient_id = added.ingredient.id;

    let mut repo = MockRecipeRepository::new();
    repo.expect_add_ingredient()
        .times(1)
        .return_once(move |_, _| Ok(added));
    let mut publisher = MockRecipeEventPublisher::new();
    publisher
        .expect_publish_ingredient_added()
        .withf(move |recipe, ingredient| *recipe == recipe_id && *ingredient == ingredient_id)
        .times(1)
        .return_once(|_, _| Ok(()));

    let (service, _) = service(repo, publisher);
    let result = service
        .add_ingredient_to_recipe(recipe_id, IngredientDraft::new("Salt", "1 tsp").expect("valid"))
        .await
        .expect("add succeeds");

    assert_eq!(result.ingredient.id, ingredient_id);
}

#[tokio::test]
async fn remove_ingredient_stores_then_publishes() {
    let recipe_id = RecipeId::random();
    let ingredient_id = IngredientId::random();
    let mut seq = Sequence::new();

    let mut repo = MockRecipeRepository::new();
    repo.expect_remove_ingredient()
        .withf(move |recipe, ingredient| *recipe == recipe_id && *ingredient == ingredient_id)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(()));
    let mut publisher = MockRecipeEventPublisher::new();
    publisher
        .expect_publish_ingredient_removed()
        .withf(move |recipe, ingredient| *recipe == recipe_id && *ingredient == ingredient_id)
        .times(1)
        .in_sequence(&mut seq)
        .return_once(|_, _| Ok(()));

    let (service, _) = service(repo, publisher);
    service
        .remove_ingredient_from_recipe(recipe_id, ingredient_id)
        .await
        .expect("remove succeeds");
}

#[tokio::test]
async fn publish_failure_is_logged_but_not_returned() {
    let recipe_id = RecipeId::random();
    let stored = recipe(recipe_id, UserId::random(), Vec::new());

    let mut repo = MockRecipeRepository::new();
    repo.expect_create().return_once(move |_| Ok(stored));
    let mut publisher = MockRecipeEventPublisher::new();
    publisher
        .expect_publish_recipe_created()
        .return_once(|_| Err(EventPublishError::publish("broker closed the channel")));

    let (service, buffer) = service(repo, publisher);
    let input = NewRecipe::new("Bread", None, UserId::random(), Vec::new()).expect("valid");
    let created = service.create_recipe(input).await.expect("mutation still succeeds");

    assert_eq!(created.id, recipe_id);
    let lines = buffer.lines();
    let line = lines
        .iter()
        .find(|line| line["message"] == "Failed to publish recipe event")
        .expect("publish failure is logged");
    assert_eq!(line["level"], "error");
    assert_eq!(line["routingKey"], "recipe.created");
    assert_eq!(line["recipeId"], recipe_id.to_string());
}

#[tokio::test]
async fn repository_failure_skips_publishing() {
    let mut repo = MockRecipeRepository::new();
    repo.expect_update()
        .return_once(|id, _| Err(RecipeRepositoryError::not_found(*id)));
    let mut publisher = MockRecipeEventPublisher::new();
    publisher.expect_publish_recipe_updated().times(0);

    let (service, _) = service(repo, publisher);
    let error = service
        .update_recipe(RecipeId::random(), RecipeChanges::default())
        .await
        .expect_err("missing recipe");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case::all(true)]
#[case::by_user(false)]
#[tokio::test]
async fn reads_never_publish(#[case] all: bool) {
    let author_id = UserId::random();
    let mut repo = MockRecipeRepository::new();
    repo.expect_find_all()
        .returning(move || Ok(vec![recipe(RecipeId::random(), author_id, Vec::new())]));
    repo.expect_find_by_user()
        .withf(move |user| *user == author_id)
        .returning(move |_| Ok(vec![recipe(RecipeId::random(), author_id, Vec::new())]));
    repo.expect_find_by_id().returning(|_| Ok(None));
    let publisher = MockRecipeEventPublisher::new();

    let (service, _) = service(repo, publisher);
    let recipes = if all {
        service.get_all_recipes().await
    } else {
        service.get_user_recipes(author_id).await
    }
    .expect("read succeeds");

    assert_eq!(recipes.len(), 1);
    assert!(
        service
            .get_recipe_by_id(RecipeId::random())
            .await
            .expect("lookup succeeds")
            .is_none()
    );
}

#[tokio::test]
async fn connection_failures_map_to_service_unavailable() {
    let mut repo = MockRecipeRepository::new();
    repo.expect_find_all()
        .return_once(|| Err(RecipeRepositoryError::connection("pool exhausted")));

    let (service, _) = service(repo, MockRecipeEventPublisher::new());
    let error = service.get_all_recipes().await.expect_err("read fails");

    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
}
