use mealmate_recipe::{RateInput, RecipeFilter, RecipeInput};
use mealmate_shared::{
    Pagination,
    recipe::{MealType, RecipeSource},
};
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn create_get_update_delete() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let albert = helpers::create_user(&state, "albert").await?;
    let cmd = mealmate_recipe::Command::new(state);

    let id = cmd
        .create(
            &john,
            RecipeInput {
                tags: vec!["Quick".to_owned(), "quick".to_owned()],
                ..helpers::recipe("  Garlic Pasta ")
            },
        )
        .await?;

    let view = cmd.get(&john, &id).await?;
    assert_eq!(view.recipe.name, "Garlic Pasta");
    assert_eq!(view.recipe.tags.0, vec!["quick"]);
    assert_eq!(view.recipe.ingredients.0.len(), 2);
    assert_eq!(view.recipe.source.0, RecipeSource::Manual);
    assert_eq!(view.average_rating, None);

    assert!(matches!(
        cmd.get(&albert, &id).await,
        Err(mealmate_shared::Error::NotFound(_))
    ));

    cmd.update(
        &john,
        &id,
        RecipeInput {
            servings: 4,
            meal_type: MealType::Lunch,
            ..helpers::recipe("Garlic Pasta")
        },
    )
    .await?;
    let view = cmd.get(&john, &id).await?;
    assert_eq!(view.recipe.servings, 4);
    assert_eq!(view.recipe.meal_type.0, MealType::Lunch);

    assert!(matches!(
        cmd.update(&albert, &id, helpers::recipe("Stolen")).await,
        Err(mealmate_shared::Error::NotFound(_))
    ));

    cmd.delete(&john, &id).await?;
    assert!(matches!(
        cmd.get(&john, &id).await,
        Err(mealmate_shared::Error::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn invalid_recipe_is_rejected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let cmd = mealmate_recipe::Command::new(state);

    let err = cmd
        .create(
            &john,
            RecipeInput {
                servings: 0,
                ingredients: vec![],
                ..helpers::recipe("Nothing")
            },
        )
        .await;

    let Err(mealmate_shared::Error::Validate(errors)) = err else {
        panic!("expected validation error");
    };
    assert!(errors.field_errors().contains_key("servings"));
    assert!(errors.field_errors().contains_key("ingredients"));

    Ok(())
}

#[tokio::test]
async fn list_filters_and_paginates() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let albert = helpers::create_user(&state, "albert").await?;
    let cmd = mealmate_recipe::Command::new(state);

    let pancakes = cmd
        .create(
            &john,
            RecipeInput {
                meal_type: MealType::Breakfast,
                tags: vec!["sweet".to_owned()],
                ..helpers::recipe("Pancakes")
            },
        )
        .await?;
    cmd.create(
        &john,
        RecipeInput {
            cuisine: Some("Italian".to_owned()),
            ..helpers::recipe("Lasagna")
        },
    )
    .await?;
    cmd.create(
        &john,
        RecipeInput {
            source: RecipeSource::Ai,
            ..helpers::recipe("Curry")
        },
    )
    .await?;
    cmd.create(&albert, helpers::recipe("Albert's Pie")).await?;
    cmd.set_favorite(&john, &pancakes, true).await?;

    let all = cmd.list(&john, RecipeFilter::default()).await?;
    assert_eq!(all.total, 3);

    let breakfast = cmd
        .list(
            &john,
            RecipeFilter {
                meal_type: Some(MealType::Breakfast),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(breakfast.items[0].recipe.id, pancakes);
    assert!(breakfast.items[0].recipe.is_favorite);

    let favorites = cmd
        .list(
            &john,
            RecipeFilter {
                favorite: Some(true),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(favorites.total, 1);

    let italian = cmd
        .list(
            &john,
            RecipeFilter {
                search: Some("ITALIAN".to_owned()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(italian.items[0].recipe.name, "Lasagna");

    let ai = cmd
        .list(
            &john,
            RecipeFilter {
                source: Some(RecipeSource::Ai),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(ai.items[0].recipe.name, "Curry");

    let sweet = cmd
        .list(
            &john,
            RecipeFilter {
                tag: Some("Sweet".to_owned()),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(sweet.total, 1);

    let page = cmd
        .list(
            &john,
            RecipeFilter {
                pagination: Pagination::new(Some(2), Some(2)),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);

    Ok(())
}

#[tokio::test]
async fn rating_upsert_and_remove() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let albert = helpers::create_user(&state, "albert").await?;
    let cmd = mealmate_recipe::Command::new(state);
    let id = cmd.create(&john, helpers::recipe("Pasta")).await?;

    let summary = cmd
        .rate(
            &john,
            &id,
            RateInput {
                score: 4,
                comment: Some(" tasty ".to_owned()),
            },
        )
        .await?;
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, Some(4.0));
    assert_eq!(
        summary.mine.as_ref().and_then(|r| r.comment.as_deref()),
        Some("tasty")
    );

    let summary = cmd
        .rate(
            &john,
            &id,
            RateInput {
                score: 5,
                comment: None,
            },
        )
        .await?;
    assert_eq!(summary.count, 1);
    assert_eq!(summary.average, Some(5.0));

    let view = cmd.get(&john, &id).await?;
    assert_eq!(view.rating_count, 1);
    assert_eq!(view.average_rating, Some(5.0));

    assert!(matches!(
        cmd.rate(&john, &id, RateInput { score: 6, comment: None }).await,
        Err(mealmate_shared::Error::Validate(_))
    ));
    assert!(matches!(
        cmd.rate(&albert, &id, RateInput { score: 3, comment: None }).await,
        Err(mealmate_shared::Error::NotFound(_))
    ));

    cmd.unrate(&john, &id).await?;
    let summary = cmd.ratings(&john, &id).await?;
    assert_eq!(summary.count, 0);
    assert_eq!(summary.mine, None);

    assert!(matches!(
        cmd.unrate(&john, &id).await,
        Err(mealmate_shared::Error::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn blank_names_are_rejected() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let cmd = mealmate_recipe::Command::new(state);

    let Err(mealmate_shared::Error::Validate(errors)) = cmd.create(&john, helpers::recipe("    ")).await
    else {
        panic!("expected validation error");
    };
    assert!(errors.field_errors().contains_key("name"));

    let id = cmd.create(&john, helpers::recipe("Garlic Pasta")).await?;
    assert!(matches!(
        cmd.update(&john, &id, helpers::recipe(" \t ")).await,
        Err(mealmate_shared::Error::Validate(_))
    ));

    let mut blank_ingredient = helpers::recipe("Soup");
    blank_ingredient.ingredients[0].name = "  ".to_owned();
    assert!(matches!(
        cmd.create(&john, blank_ingredient).await,
        Err(mealmate_shared::Error::Validate(_))
    ));

    assert_eq!(cmd.get(&john, &id).await?.recipe.name, "Garlic Pasta");

    Ok(())
}

#[tokio::test]
async fn rows_serialize_with_plain_enum_values() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let cmd = mealmate_recipe::Command::new(state);

    let id = cmd
        .create(
            &john,
            RecipeInput {
                meal_type: MealType::Dinner,
                ..helpers::recipe("Garlic Pasta")
            },
        )
        .await?;

    let json = serde_json::to_value(cmd.find(&john, &id).await?)?;
    assert_eq!(json["meal_type"], "dinner");
    assert_eq!(json["source"], "manual");
    assert_eq!(json["ingredients"][0]["name"], "pasta");
    assert!(json.get("user_id").is_none());

    Ok(())
}
