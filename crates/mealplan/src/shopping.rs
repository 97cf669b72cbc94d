use std::collections::{BTreeMap, BTreeSet, HashMap};

use mealmate_shared::{
    pantry::{Unit, normalize_name},
    recipe::RecipeIngredient,
};
use serde::Serialize;

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ShoppingItem {
    pub name: String,
    /// Base unit of the dimension, `None` for unquantified ingredients.
    pub unit: Option<Unit>,
    pub required: f64,
    pub in_pantry: f64,
    pub to_buy: f64,
    pub unquantified: bool,
    pub recipes: Vec<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct ShoppingList {
    pub meal_plan_id: String,
    pub items: Vec<ShoppingItem>,
}

/// One planned recipe: its name, ingredients and the serving scale factor.
pub struct PlannedRecipe<'a> {
    pub name: &'a str,
    pub ingredients: &'a [RecipeIngredient],
    pub factor: f64,
}

fn round(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Default)]
struct Group {
    required: f64,
    recipes: BTreeSet<String>,
}

/// Sums planned ingredients per name and unit dimension, then subtracts
/// pantry stock of the same dimension.
pub fn aggregate<'a>(
    planned: impl IntoIterator<Item = PlannedRecipe<'a>>,
    pantry: impl IntoIterator<Item = (&'a str, Unit, f64)>,
) -> Vec<ShoppingItem> {
    let mut groups: BTreeMap<(String, Option<Unit>), Group> = BTreeMap::new();

    for recipe in planned {
        for ingredient in recipe.ingredients {
            let name = normalize_name(&ingredient.name);
            if name.is_empty() {
                continue;
            }

            let (unit, required) = match ingredient.quantity {
                Some(quantity) => {
                    let (unit, base) = ingredient.unit.unwrap_or_default().to_base(quantity);
                    (Some(unit), base * recipe.factor)
                }
                None => (None, 0.0),
            };

            let group = groups.entry((name, unit)).or_default();
            group.required += required;
            group.recipes.insert(recipe.name.to_owned());
        }
    }

    let mut stock: HashMap<(String, Unit), f64> = HashMap::new();
    for (name, unit, quantity) in pantry {
        let (unit, base) = unit.to_base(quantity);
        *stock.entry((normalize_name(name), unit)).or_default() += base;
    }

    let quantified: BTreeSet<String> = groups
        .keys()
        .filter(|(_, unit)| unit.is_some())
        .map(|(name, _)| name.to_owned())
        .collect();

    let mut unquantified_recipes: HashMap<String, BTreeSet<String>> = HashMap::new();
    let mut items = vec![];

    for ((name, unit), group) in groups {
        let Some(unit) = unit else {
            if quantified.contains(&name) {
                unquantified_recipes.insert(name, group.recipes);
            } else {
                items.push(ShoppingItem {
                    name,
                    unit: None,
                    required: 0.0,
                    in_pantry: 0.0,
                    to_buy: 0.0,
                    unquantified: true,
                    recipes: group.recipes.into_iter().collect(),
                });
            }
            continue;
        };

        let in_pantry = stock.get(&(name.to_owned(), unit)).copied().unwrap_or(0.0);

        items.push(ShoppingItem {
            unit: Some(unit),
            required: round(group.required),
            in_pantry: round(in_pantry),
            to_buy: round((group.required - in_pantry).max(0.0)),
            unquantified: false,
            recipes: group.recipes.into_iter().collect(),
            name,
        });
    }

    // A name used both with and without quantity is listed once.
    for item in items.iter_mut() {
        if let Some(recipes) = unquantified_recipes.remove(&item.name) {
            let mut merged: BTreeSet<String> = item.recipes.drain(..).collect();
            merged.extend(recipes);
            item.recipes = merged.into_iter().collect();
        }
    }

    items.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.unit.map(|u| u.to_string()).cmp(&b.unit.map(|u| u.to_string())))
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, quantity: Option<f64>, unit: Option<Unit>) -> RecipeIngredient {
        RecipeIngredient::new(name, quantity, unit)
    }

    #[test]
    fn sums_across_units_of_same_dimension() {
        let pasta = [
            ingredient("Flour", Some(0.5), Some(Unit::Kg)),
            ingredient("milk", Some(1.0), Some(Unit::Cup)),
            ingredient("eggs", Some(2.0), None),
        ];
        let cake = [
            ingredient("flour", Some(200.0), Some(Unit::G)),
            ingredient("Milk", Some(100.0), Some(Unit::Ml)),
            ingredient("eggs", Some(3.0), Some(Unit::Piece)),
        ];

        let items = aggregate(
            [
                PlannedRecipe {
                    name: "Pasta",
                    ingredients: &pasta,
                    factor: 1.0,
                },
                PlannedRecipe {
                    name: "Cake",
                    ingredients: &cake,
                    factor: 2.0,
                },
            ],
            [("flour", Unit::Kg, 0.25), ("eggs", Unit::Piece, 10.0)],
        );

        let flour = items.iter().find(|i| i.name == "flour").unwrap();
        assert_eq!(flour.unit, Some(Unit::G));
        assert_eq!(flour.required, 900.0);
        assert_eq!(flour.in_pantry, 250.0);
        assert_eq!(flour.to_buy, 650.0);
        assert_eq!(flour.recipes, vec!["Cake", "Pasta"]);

        let milk = items.iter().find(|i| i.name == "milk").unwrap();
        assert_eq!(milk.unit, Some(Unit::Ml));
        assert_eq!(milk.required, 440.0);
        assert_eq!(milk.to_buy, 440.0);

        let eggs = items.iter().find(|i| i.name == "eggs").unwrap();
        assert_eq!(eggs.required, 8.0);
        assert_eq!(eggs.to_buy, 0.0);
    }

    #[test]
    fn keeps_incompatible_units_apart() {
        let soup = [
            ingredient("garlic", Some(3.0), Some(Unit::Clove)),
            ingredient("garlic", Some(10.0), Some(Unit::G)),
        ];

        let items = aggregate(
            [PlannedRecipe {
                name: "Soup",
                ingredients: &soup,
                factor: 1.0,
            }],
            [("garlic", Unit::Clove, 1.0)],
        );

        assert_eq!(items.len(), 2);
        let cloves = items.iter().find(|i| i.unit == Some(Unit::Clove)).unwrap();
        assert_eq!(cloves.to_buy, 2.0);
        let grams = items.iter().find(|i| i.unit == Some(Unit::G)).unwrap();
        assert_eq!(grams.to_buy, 10.0);
    }

    #[test]
    fn unquantified_listed_once() {
        let salad = [
            ingredient("salt", None, None),
            ingredient("pepper", None, None),
        ];
        let soup = [
            ingredient("Salt", None, None),
            ingredient("pepper", Some(1.0), Some(Unit::Pinch)),
        ];

        let items = aggregate(
            [
                PlannedRecipe {
                    name: "Salad",
                    ingredients: &salad,
                    factor: 1.0,
                },
                PlannedRecipe {
                    name: "Soup",
                    ingredients: &soup,
                    factor: 3.0,
                },
            ],
            Vec::<(&str, Unit, f64)>::new(),
        );

        assert_eq!(items.len(), 2);

        let salt = &items[1];
        assert_eq!(salt.name, "salt");
        assert!(salt.unquantified);
        assert_eq!(salt.recipes, vec!["Salad", "Soup"]);

        let pepper = &items[0];
        assert_eq!(pepper.name, "pepper");
        assert!(!pepper.unquantified);
        assert_eq!(pepper.required, 3.0);
        assert_eq!(pepper.recipes, vec!["Salad", "Soup"]);
    }
}
