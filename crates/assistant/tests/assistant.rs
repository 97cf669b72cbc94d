use std::sync::{Arc, Mutex};

use mealmate_assistant::{
    Assistant, Completion, CompletionProvider, CompletionRequest, HouseholdContext,
    MealPlanIdeasInput, MemberProfile, NOT_CONFIGURED, Priority, RecommendInput, RequestQueue,
};
use mealmate_shared::recipe::{MealType, RecipeSource};

/// Replies with canned content and remembers every request.
struct FakeProvider {
    reply: String,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeProvider {
    fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_owned(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn last_prompt(&self) -> String {
        let requests = self.requests.lock().unwrap();
        requests.last().unwrap().messages.last().unwrap().content.to_owned()
    }
}

#[async_trait::async_trait]
impl CompletionProvider for FakeProvider {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, request: CompletionRequest) -> mealmate_shared::Result<Completion> {
        self.requests.lock().unwrap().push(request);

        Ok(Completion {
            model: self.model().to_owned(),
            content: self.reply.to_owned(),
        })
    }
}

fn household() -> HouseholdContext {
    HouseholdContext {
        household_size: 4,
        members: vec![MemberProfile {
            name: "Mia".to_owned(),
            allergies: vec!["sesame".to_owned()],
            ..Default::default()
        }],
        pantry: vec!["chickpeas (2 can)".to_owned()],
    }
}

const RECIPES: &str = r#"Here are some ideas:
```json
{"recipes": [
  {"name": "Chickpea Curry", "meal_type": "dinner", "servings": 4,
   "ingredients": [{"name": "chickpeas", "quantity": 2, "unit": "can"}, "1 onion"],
   "instructions": ["Fry onion", "Add chickpeas"], "tags": ["vegan"]},
  {"name": "Hummus Wrap", "ingredients": ["1 wrap"]},
  {"description": "no name, skipped"},
  {"name": "Falafel"}
]}
```"#;

#[tokio::test]
async fn recommends_recipes() -> anyhow::Result<()> {
    let provider = FakeProvider::new(RECIPES);
    let assistant = Assistant::new(Some(provider.clone()), RequestQueue::new(2));

    let recommendation = assistant
        .recommend_recipes(
            RecommendInput {
                meal_type: Some(MealType::Lunch),
                count: 2,
                use_pantry: true,
                ..Default::default()
            },
            &household(),
            Priority::High,
        )
        .await?;

    assert_eq!(recommendation.model, "fake-model");
    assert_eq!(recommendation.recipes.len(), 2);

    let curry = &recommendation.recipes[0];
    assert_eq!(curry.name, "Chickpea Curry");
    assert_eq!(curry.meal_type, MealType::Dinner);
    assert_eq!(curry.ingredients.len(), 2);
    assert_eq!(curry.ingredients[0].quantity, Some(2.0));

    let wrap = &recommendation.recipes[1];
    assert_eq!(wrap.meal_type, MealType::Lunch);
    assert_eq!(wrap.servings, 4);
    assert_eq!(wrap.clone().into_recipe_input().source, RecipeSource::Ai);

    let prompt = provider.last_prompt();
    assert!(prompt.contains("sesame"));
    assert!(prompt.contains("chickpeas (2 can)"));

    assert_eq!(assistant.queue().stats().pending, 0);

    Ok(())
}

#[tokio::test]
async fn suggests_meal_plan() -> anyhow::Result<()> {
    let provider = FakeProvider::new(
        r#"[{"day": 1, "meals": [{"meal_type": "breakfast", "name": "Oats"}, {"meal_type": "dinner", "name": "Risotto", "description": "Creamy"}]},
            {"day": 2, "meals": [{"meal_type": "dinner", "name": "Tacos"}]}]"#,
    );
    let assistant = Assistant::new(Some(provider.clone()), RequestQueue::new(1));

    let ideas = assistant
        .suggest_meal_plan(
            MealPlanIdeasInput {
                days: 2,
                meal_types: vec![MealType::Breakfast, MealType::Dinner],
                ..Default::default()
            },
            &household(),
            Priority::Normal,
        )
        .await?;

    assert_eq!(ideas.days.len(), 2);
    assert_eq!(ideas.days[0].meals.len(), 2);
    assert_eq!(
        ideas.text,
        "Day 1\n  breakfast: Oats\n  dinner: Risotto - Creamy\nDay 2\n  dinner: Tacos\n"
    );
    assert!(!provider.last_prompt().contains("chickpeas"));

    Ok(())
}

#[tokio::test]
async fn unparseable_reply_is_server_error() -> anyhow::Result<()> {
    let assistant = Assistant::new(
        Some(FakeProvider::new("Sorry, I cannot help with that.")),
        RequestQueue::new(1),
    );

    let err = assistant
        .recommend_recipes(RecommendInput::default(), &household(), Priority::Normal)
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Server(msg) if msg == "AI response could not be parsed"));

    let assistant = Assistant::new(Some(FakeProvider::new("[]")), RequestQueue::new(1));
    let err = assistant
        .recommend_recipes(RecommendInput::default(), &household(), Priority::Normal)
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Server(_)));

    Ok(())
}

#[tokio::test]
async fn unconfigured_and_invalid_requests() -> anyhow::Result<()> {
    let assistant = Assistant::new(None, RequestQueue::new(1));
    assert!(!assistant.is_configured());

    let err = assistant
        .recommend_recipes(RecommendInput::default(), &household(), Priority::Normal)
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Unavailable(msg) if msg == NOT_CONFIGURED));

    let err = assistant
        .recommend_recipes(
            RecommendInput {
                count: 6,
                ..Default::default()
            },
            &household(),
            Priority::Normal,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Validate(_)));

    let err = assistant
        .suggest_meal_plan(
            MealPlanIdeasInput {
                days: 0,
                ..Default::default()
            },
            &household(),
            Priority::Normal,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, mealmate_shared::Error::Validate(_)));

    Ok(())
}
