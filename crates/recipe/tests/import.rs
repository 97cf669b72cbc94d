use std::time::Duration;

use axum::{Router, response::Html, routing::get};
use mealmate_recipe::{RecipeInput, UrlImporter};
use mealmate_shared::recipe::RecipeSource;
use temp_dir::TempDir;

mod helpers;

#[tokio::test]
async fn json_export_import_between_users() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let albert = helpers::create_user(&state, "albert").await?;
    let cmd = mealmate_recipe::Command::new(state);

    cmd.create(&john, helpers::recipe("Pasta")).await?;
    cmd.create(&john, helpers::recipe("Soup")).await?;

    let exported = cmd.export_json(&john).await?;
    assert_eq!(exported.len(), 2);

    let mut recipes = exported
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    recipes.push(serde_json::to_value(RecipeInput {
        ingredients: vec![],
        ..helpers::recipe("Broken")
    })?);
    recipes.push(serde_json::json!({"name": "No ingredients field"}));
    recipes.push(serde_json::json!(42));

    let report = cmd.import_json(&albert, recipes).await?;
    assert_eq!(report.imported.len(), 2);
    let rows = report.errors.iter().map(|e| e.row).collect::<Vec<_>>();
    assert_eq!(rows, vec![3, 4, 5]);
    assert!(report.errors[1].message.contains("ingredients"));

    let imported = cmd.export_json(&albert).await?;
    let mut names = imported.iter().map(|r| r.name.as_str()).collect::<Vec<_>>();
    names.sort();
    assert_eq!(names, vec!["Pasta", "Soup"]);
    assert!(imported.iter().all(|r| r.source == RecipeSource::Imported));

    Ok(())
}

#[tokio::test]
async fn csv_export_import() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let albert = helpers::create_user(&state, "albert").await?;
    let cmd = mealmate_recipe::Command::new(state);

    cmd.create(
        &john,
        RecipeInput {
            tags: vec!["easy".to_owned(), "italian".to_owned()],
            ..helpers::recipe("Pasta")
        },
    )
    .await?;

    let text = cmd.export_csv(&john).await?;
    let report = cmd.import_csv(&albert, &text).await?;
    assert_eq!(report.imported.len(), 1);
    assert!(report.errors.is_empty());

    let imported = cmd.export_json(&albert).await?;
    let original = cmd.export_json(&john).await?;
    assert_eq!(imported[0].ingredients, original[0].ingredients);
    assert_eq!(imported[0].tags, original[0].tags);
    assert_eq!(imported[0].instructions, original[0].instructions);

    let report = cmd
        .import_csv(&albert, "name,ingredients,servings\n,1 egg,1\nOmelette,2 eggs,x\nToast,1 slice bread,1\n")
        .await?;
    assert_eq!(report.imported.len(), 1);
    assert_eq!(
        report.errors.iter().map(|e| e.row).collect::<Vec<_>>(),
        vec![1, 2]
    );

    assert!(matches!(
        cmd.import_csv(&albert, "  ").await,
        Err(mealmate_shared::Error::User(_))
    ));

    Ok(())
}

const RECIPE_PAGE: &str = r#"<html><head><script type="application/ld+json">
{"@context":"https://schema.org","@type":"Recipe","name":"Lemon Cake",
 "recipeYield":"8","cookTime":"PT40M","recipeCategory":"Dessert",
 "recipeIngredient":["200 g flour","2 lemons"],
 "recipeInstructions":[{"@type":"HowToStep","text":"Bake."}]}
</script></head></html>"#;

async fn serve_pages() -> anyhow::Result<String> {
    let app = Router::new()
        .route("/cake", get(|| async { Html(RECIPE_PAGE) }))
        .route("/blog", get(|| async { Html("<html><body>No recipe</body></html>") }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://{addr}"))
}

#[tokio::test]
async fn import_from_url() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let state = helpers::setup_test_state(dir.child("db.sqlite3")).await?;
    let john = helpers::create_user(&state, "john").await?;
    let cmd = mealmate_recipe::Command::new(state);
    let base = serve_pages().await?;
    let importer = UrlImporter::new(Duration::from_secs(5))?;

    let id = cmd
        .import_url(&john, &importer, &format!("{base}/cake"))
        .await?;
    let view = cmd.get(&john, &id).await?;
    assert_eq!(view.recipe.name, "Lemon Cake");
    assert_eq!(view.recipe.servings, 8);
    assert_eq!(view.recipe.cook_time_minutes, 40);
    assert_eq!(view.recipe.source.0, RecipeSource::Imported);
    assert_eq!(view.recipe.source_url, Some(format!("{base}/cake")));

    assert!(matches!(
        cmd.import_url(&john, &importer, &format!("{base}/blog")).await,
        Err(mealmate_shared::Error::User(_))
    ));
    assert!(matches!(
        cmd.import_url(&john, &importer, &format!("{base}/missing")).await,
        Err(mealmate_shared::Error::User(_))
    ));
    assert!(matches!(
        cmd.import_url(&john, &importer, "ftp://example.org/cake").await,
        Err(mealmate_shared::Error::User(_))
    ));

    Ok(())
}
