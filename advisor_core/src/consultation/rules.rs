//! The recipe rule base.
//!
//! Stage facts sequence the consultation: ask ingredients, time and
//! preferences, collect candidate recipes, pick one, estimate its chance of
//! success, report, and close. Each stage rule retracts its own stage fact and
//! asserts the next one.

use recipe_book::{Evidence, RecipeDetails, TimeBudget, Variable};
use tracing::{debug, info, warn};

use super::input::{
    parse_choice, parse_ingredients, parse_minutes, parse_preferences, parse_refine_choice,
    parse_yes_no,
};
use super::Services;
use crate::collaborators::ask;
use crate::config::EstimateMode;
use crate::engine::{ActionContext, Condition, EngineError, Rule, RuleBase, RuleBuilder};
use crate::working_memory::{Estimate, Fact, Field, Stage};

type Ctx<'a> = ActionContext<'a, Services>;

const CANDIDATE_SALIENCE: i32 = 10;

/// Build the rule base, in declaration order.
pub fn recipe_rules() -> RuleBase<Services> {
    RuleBase::new()
        .with_rule(
            RuleBuilder::new("ask_ingredients")
                .when(stage(Stage::AskIngredients))
                .salience(100)
                .then(ask_ingredients),
        )
        .with_rule(
            RuleBuilder::new("ask_time")
                .when(stage(Stage::AskTime))
                .salience(90)
                .then(ask_time),
        )
        .with_rule(
            RuleBuilder::new("ask_preferences")
                .when(stage(Stage::AskPreferences))
                .salience(80)
                .then(ask_preferences),
        )
        .with_rule(candidate_rule(
            "suggest_pasta_pomodoro",
            "Pasta al Pomodoro",
            [
                Condition::equals(Field::Ingredient, "pasta"),
                Condition::equals(Field::Ingredient, "pomodoro"),
                Condition::any([
                    time_is(TimeBudget::Medium),
                    time_is(TimeBudget::Long),
                ]),
            ],
        ))
        .with_rule(candidate_rule(
            "suggest_scrambled_eggs",
            "Uova Strapazzate",
            [
                Condition::equals(Field::Ingredient, "uova"),
                time_is(TimeBudget::Short),
                Condition::not(Condition::equals(Field::Preference, "vegano")),
            ],
        ))
        .with_rule(candidate_rule(
            "suggest_mixed_salad",
            "Insalata Mista",
            [
                Condition::equals(Field::Ingredient, "lattuga"),
                Condition::equals(Field::Ingredient, "pomodoro"),
                time_is(TimeBudget::Short),
            ],
        ))
        .with_rule(
            RuleBuilder::new("choose_candidate")
                .when(stage(Stage::FindRecipe))
                .when(Condition::exists(Field::Candidate))
                .salience(5)
                .then(choose_candidate),
        )
        .with_rule(
            RuleBuilder::new("no_recipe_found")
                .when(stage(Stage::FindRecipe))
                .when(Condition::not(Condition::exists(Field::Candidate)))
                .salience(0)
                .then(no_recipe_found),
        )
        .with_rule(
            RuleBuilder::new("evaluate_recipe")
                .when(stage(Stage::Evaluate))
                .when(Condition::bind(Field::SuggestedRecipe, "recipe"))
                .salience(-5)
                .then(evaluate_recipe),
        )
        .with_rule(
            RuleBuilder::new("report_result")
                .when(stage(Stage::Report))
                .when(Condition::bind(Field::SuggestedRecipe, "recipe"))
                .when(Condition::bind(Field::Estimate, "estimate"))
                .salience(-10)
                .then(report_result),
        )
        .with_rule(
            RuleBuilder::new("close_consultation")
                .when(stage(Stage::Terminate))
                .salience(-100)
                .then(close_consultation),
        )
}

fn stage(stage: Stage) -> Condition {
    Condition::equals(Field::Stage, stage.as_str())
}

fn time_is(budget: TimeBudget) -> Condition {
    Condition::equals(Field::TimeAvailable, budget.as_str())
}

/// A rule proposing `recipe` while recipes are being looked for.
fn candidate_rule<const N: usize>(
    name: &str,
    recipe: &'static str,
    conditions: [Condition; N],
) -> Rule<Services> {
    conditions
        .into_iter()
        .fold(RuleBuilder::new(name).when(stage(Stage::FindRecipe)), RuleBuilder::when)
        .salience(CANDIDATE_SALIENCE)
        .then(move |ctx: &mut Ctx<'_>| {
            debug!(recipe, "candidate found");
            ctx.assert(Fact::candidate(recipe));
            Ok(())
        })
}

fn advance(ctx: &mut Ctx<'_>, from: Stage, to: Stage) -> Result<(), EngineError> {
    ctx.retract(&Fact::Stage(from))?;
    ctx.assert(Fact::Stage(to));
    Ok(())
}

fn tell(ctx: &mut Ctx<'_>, message: impl AsRef<str>) {
    ctx.services().prompter.tell(message.as_ref());
}

fn ask_ingredients(ctx: &mut Ctx<'_>) -> Result<(), EngineError> {
    tell(ctx, "Enter the ingredients you have, separated by commas.");
    let ingredients = ask(
        ctx.services().prompter.as_mut(),
        "(e.g. pasta, uova, pomodoro, lattuga):",
        parse_ingredients,
    )?;

    if ingredients.is_empty() {
        tell(ctx, "No ingredients given, so there is nothing to suggest.");
        return advance(ctx, Stage::AskIngredients, Stage::Terminate);
    }

    info!(?ingredients, "ingredients collected");
    for ingredient in ingredients {
        ctx.assert(Fact::ingredient(ingredient));
    }
    advance(ctx, Stage::AskIngredients, Stage::AskTime)
}

fn ask_time(ctx: &mut Ctx<'_>) -> Result<(), EngineError> {
    let minutes = ask(
        ctx.services().prompter.as_mut(),
        "How many minutes do you have? (e.g. 30):",
        parse_minutes,
    )?;
    let budget = ctx.services().settings.time.categorize(minutes);

    info!(minutes, %budget, "time budget set");
    ctx.assert(Fact::TimeAvailable(budget));
    advance(ctx, Stage::AskTime, Stage::AskPreferences)
}

fn ask_preferences(ctx: &mut Ctx<'_>) -> Result<(), EngineError> {
    tell(ctx, "Any dietary preferences? (e.g. vegetariano, vegano, none)");
    let preferences = ask(
        ctx.services().prompter.as_mut(),
        "Separate several with commas, or press Enter for none:",
        parse_preferences,
    )?;

    info!(?preferences, "preferences collected");
    for preference in preferences {
        ctx.assert(Fact::preference(preference));
    }
    advance(ctx, Stage::AskPreferences, Stage::FindRecipe)
}

fn choose_candidate(ctx: &mut Ctx<'_>) -> Result<(), EngineError> {
    let candidates = ctx.facts().texts(Field::Candidate);

    let chosen = match candidates.as_slice() {
        [] => {
            return Err(EngineError::Action {
                rule: ctx.rule().to_string(),
                message: "no candidate recipe in working memory".to_string(),
            })
        }
        [only] => only.clone(),
        several => {
            tell(ctx, "Several recipes fit what you have:");
            for (i, name) in several.iter().enumerate() {
                tell(ctx, format!("({}) {}", i + 1, name));
            }
            let count = several.len();
            let prompt = format!("Which recipe would you like to cook? (1-{}):", count);
            let index = ask(ctx.services().prompter.as_mut(), &prompt, |line| {
                parse_choice(line, count)
            })?;
            several[index].clone()
        }
    };

    info!(recipe = %chosen, candidates = candidates.len(), "recipe chosen");
    ctx.assert(Fact::suggested(chosen));
    advance(ctx, Stage::FindRecipe, Stage::Evaluate)
}

fn no_recipe_found(ctx: &mut Ctx<'_>) -> Result<(), EngineError> {
    let ingredients = ctx.facts().texts(Field::Ingredient);
    let matches = ctx.services().lookup.partial_match(&ingredients);

    tell(ctx, "No recipe fits all of your ingredients and constraints.");
    if matches.is_empty() {
        tell(ctx, "None of the known recipes uses your ingredients.");
    } else {
        tell(ctx, "These recipes use some of your ingredients:");
        for (recipe, used) in &matches {
            tell(ctx, format!("- {} (uses: {})", recipe, used.join(", ")));
        }
    }

    info!(?ingredients, partial_matches = matches.len(), "no recipe found");
    ctx.services().partial_matches = matches;
    advance(ctx, Stage::FindRecipe, Stage::Terminate)
}

fn evaluate_recipe(ctx: &mut Ctx<'_>) -> Result<(), EngineError> {
    let recipe = ctx.text("recipe")?;

    let mut evidence = Evidence::new();
    if let Some(time) = ctx.facts().texts(Field::TimeAvailable).first() {
        evidence.insert(
            Variable::Time.name().to_string(),
            TimeBudget::evidence_index_of(time),
        );
    }

    let mode = ctx.services().settings.estimate;
    let refine = match mode {
        EstimateMode::Default => false,
        EstimateMode::Dataset => true,
        EstimateMode::Ask => {
            tell(ctx, "Refine the estimate with the dataset, if one is available?");
            ask(
                ctx.services().prompter.as_mut(),
                "(1) Default estimate\n(2) Learn from the dataset\nAnswer:",
                parse_refine_choice,
            )?
        }
    };
    if refine {
        if let Err(error) = ctx.services().evaluator.refine() {
            warn!(%error, "dataset unavailable, using the default network");
            tell(ctx, format!("Dataset unavailable ({}); using the default estimate.", error));
        }
    } else {
        ctx.services().evaluator.use_default();
    }

    let estimate = match ctx.services().evaluator.estimate(&evidence) {
        Ok(probability) => Estimate::from_probability(probability),
        Err(error) => {
            warn!(%recipe, %error, "estimate failed");
            Estimate::Unavailable
        }
    };

    info!(%recipe, ?evidence, %estimate, "recipe evaluated");
    ctx.assert(Fact::Estimate(estimate));
    advance(ctx, Stage::Evaluate, Stage::Report)
}

fn report_result(ctx: &mut Ctx<'_>) -> Result<(), EngineError> {
    let recipe = ctx.text("recipe")?;
    let estimate = Estimate::from_value(ctx.var("estimate")?).ok_or_else(|| EngineError::Action {
        rule: ctx.rule().to_string(),
        message: "estimate fact holds an unexpected value".to_string(),
    })?;

    tell(ctx, format!("Suggested recipe: {}", recipe));
    tell(ctx, estimate.to_string());

    let Some(details) = ctx.services().lookup.details(&recipe) else {
        tell(ctx, "No further details are available for this recipe.");
        return advance(ctx, Stage::Report, Stage::Terminate);
    };
    describe(ctx, &details);

    if let Some(alternative) = details.alternative {
        tell(ctx, format!("A similar alternative exists: {}", alternative));
        let show = ask(
            ctx.services().prompter.as_mut(),
            "Would you like to see its details? (y/n):",
            parse_yes_no,
        )?;
        if show {
            match ctx.services().lookup.details(&alternative) {
                Some(other) => {
                    tell(ctx, format!("Alternative: {}", alternative));
                    describe(ctx, &other);
                }
                None => tell(ctx, "No details are available for the alternative."),
            }
        }
    }

    advance(ctx, Stage::Report, Stage::Terminate)
}

fn describe(ctx: &mut Ctx<'_>, details: &RecipeDetails) {
    if let Some(minutes) = details.estimated_minutes {
        tell(ctx, format!("Preparation time: about {} minutes", minutes));
    }
    if let Some(description) = &details.description {
        tell(ctx, format!("Description: {}", description));
    }
}

fn close_consultation(ctx: &mut Ctx<'_>) -> Result<(), EngineError> {
    tell(ctx, "Consultation finished. Enjoy your meal!");
    ctx.assert(Fact::Halt);
    Ok(())
}
