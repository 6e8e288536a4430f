//! Plain-data views of recipe totals plus a terminal renderer.
//!
//! Nothing here knows how the data is drawn; [`NutritionRenderer`] decides that.

use std::io::{self, Write};

use crate::recipe_aggregator::NutrientTotals;
use crate::recipe_store::SavedRecipe;

pub const WEBSITE_URL: &str = "https://nutrifind.fit/";
pub const WEBSITE_TITLE: &str = "NutriFind Recipe Calculator";

pub const CHART_TITLE: &str = "Macronutrient Split (by weight in grams)";
pub const MACRO_LABELS: [&str; 3] = ["Fat (g)", "Carbs (g)", "Protein (g)"];
pub const MACRO_COLORS: [&str; 3] = ["#FFC3A0", "#C6E2FF", "#D7FFC6"];

const PREVIEW_INGREDIENTS: usize = 3;

fn grams(value: f64) -> String {
    format!("{:.1} g", value)
}

fn milligrams(value: f64) -> String {
    format!("{} mg", value.round())
}

fn whole(value: f64) -> String {
    format!("{}", value.round())
}

#[derive(Debug, Clone, PartialEq)]
pub struct NutritionRow {
    pub label: &'static str,
    pub value: String,
    /// Sub-nutrient of the row above it.
    pub indented: bool,
}

/// Nutrition-facts table in label order.
#[derive(Debug, Clone, PartialEq)]
pub struct NutritionTable {
    pub rows: Vec<NutritionRow>,
}

impl NutritionTable {
    pub fn from_totals(totals: &NutrientTotals) -> Self {
        let row = |label: &'static str, value: String, indented: bool| NutritionRow {
            label,
            value,
            indented,
        };
        Self {
            rows: vec![
                row("Calories", whole(totals.calories), false),
                row("Total Fat", grams(totals.fat_g), false),
                row("Saturated Fat", grams(totals.saturated_fat_g), true),
                row("Sodium", milligrams(totals.sodium_mg), false),
                row("Total Carbohydrate", grams(totals.carbohydrates_g), false),
                row("Dietary Fiber", grams(totals.fiber_g), true),
                row("Total Sugars", grams(totals.sugar_g), true),
                row("Protein", grams(totals.protein_g), false),
            ],
        }
    }

    pub fn to_plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|r| format!("{} {}", r.label, r.value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Data contract for the macro-split doughnut chart.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroChart {
    pub title: &'static str,
    pub labels: [&'static str; 3],
    /// Fat, carbohydrates, protein in grams.
    pub values: [f64; 3],
    pub colors: [&'static str; 3],
}

impl MacroChart {
    pub fn from_totals(totals: &NutrientTotals) -> Self {
        Self {
            title: CHART_TITLE,
            labels: MACRO_LABELS,
            values: [totals.fat_g, totals.carbohydrates_g, totals.protein_g],
            colors: MACRO_COLORS,
        }
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Share of each macro in percent; all zero when there are no macros.
    pub fn percentages(&self) -> [f64; 3] {
        let total = self.total();
        if total > 0.0 {
            self.values.map(|v| v / total * 100.0)
        } else {
            [0.0; 3]
        }
    }

    /// Legend lines such as `Fat (g): 12.0g (30.0%)`.
    pub fn legend(&self) -> Vec<String> {
        let total = self.total();
        self.labels
            .iter()
            .zip(self.values.iter())
            .map(|(label, value)| {
                let pct = if total > 0.0 {
                    format!("{:.1}", value / total * 100.0)
                } else {
                    "0".to_string()
                };
                format!("{}: {:.1}g ({}%)", label, value, pct)
            })
            .collect()
    }
}

/// Payload handed to a native share sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub url: String,
}

pub fn share_text(totals: &NutrientTotals) -> SharePayload {
    let text = format!(
        "Check out my recipe nutrition facts from {title}.\n\n\
         *Calories - {cal}*\n\
         Total Fat - {fat:.1} g\n\
         Saturated Fat - {sat:.1} g\n\
         Sodium - {sodium} mg\n\
         Total Carbohydrate - {carb:.1} g\n\
         Dietary Fiber - {fiber:.1} g\n\
         Total Sugars - {sugar:.1} g\n\
         Protein - {protein:.1} g\n\n\
         Get started on your own recipes! ",
        title = WEBSITE_TITLE,
        cal = totals.calories.round(),
        fat = totals.fat_g,
        sat = totals.saturated_fat_g,
        sodium = totals.sodium_mg.round(),
        carb = totals.carbohydrates_g,
        fiber = totals.fiber_g,
        sugar = totals.sugar_g,
        protein = totals.protein_g,
    );
    SharePayload {
        title: format!("{} Results", WEBSITE_TITLE),
        text,
        url: WEBSITE_URL.to_string(),
    }
}

/// Clipboard text for the nutrition table, prefixed with the site header.
pub fn copy_table_text(table: &NutritionTable) -> String {
    format!(
        "[{}] - Recipe Summary\n{}\n---\n{}",
        WEBSITE_TITLE,
        WEBSITE_URL,
        table.to_plain_text()
    )
}

/// Non-empty ingredient rows, one per line. `None` when there is nothing to copy.
pub fn copy_ingredients_text<Q: AsRef<str>>(rows: &[Q]) -> Option<String> {
    let lines: Vec<&str> = rows
        .iter()
        .map(|r| r.as_ref().trim())
        .filter(|r| !r.is_empty())
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeSummary {
    pub id: u64,
    pub name: String,
    pub created_date: String,
    pub macros: String,
    pub ingredients_preview: String,
}

pub fn recipe_summary(recipe: &SavedRecipe) -> RecipeSummary {
    let t = &recipe.totals;
    let mut preview = recipe
        .ingredients
        .iter()
        .take(PREVIEW_INGREDIENTS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if recipe.ingredients.len() > PREVIEW_INGREDIENTS {
        preview.push_str("...");
    }
    RecipeSummary {
        id: recipe.id,
        name: recipe.name.clone(),
        created_date: recipe.created_date.clone(),
        macros: format!(
            "Cal: {} | Protein: {:.1}g | Carbs: {:.1}g | Fat: {:.1}g",
            t.calories.round(),
            t.protein_g,
            t.carbohydrates_g,
            t.fat_g
        ),
        ingredients_preview: preview,
    }
}

pub trait NutritionRenderer {
    fn render_table(&mut self, table: &NutritionTable) -> io::Result<()>;
    fn render_chart(&mut self, chart: &MacroChart) -> io::Result<()>;
    fn render_error(&mut self, message: &str) -> io::Result<()>;
    fn render_saved_recipes(&mut self, recipes: &[SavedRecipe]) -> io::Result<()>;
}

/// Draws tables and bar charts as plain text.
pub struct TerminalRenderer<W> {
    out: W,
    bar_width: usize,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, bar_width: 30 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> NutritionRenderer for TerminalRenderer<W> {
    fn render_table(&mut self, table: &NutritionTable) -> io::Result<()> {
        writeln!(self.out, "Nutrition Facts")?;
        writeln!(self.out, "{}", "=".repeat(36))?;
        for row in &table.rows {
            let label = if row.indented {
                format!("  {}", row.label)
            } else {
                row.label.to_string()
            };
            writeln!(self.out, "{:<24}{:>12}", label, row.value)?;
        }
        Ok(())
    }

    fn render_chart(&mut self, chart: &MacroChart) -> io::Result<()> {
        writeln!(self.out, "\n{}", chart.title)?;
        for (line, pct) in chart.legend().iter().zip(chart.percentages()) {
            let filled = ((pct / 100.0) * self.bar_width as f64).round() as usize;
            writeln!(
                self.out,
                "{:<width$} {}",
                "#".repeat(filled.min(self.bar_width)),
                line,
                width = self.bar_width
            )?;
        }
        Ok(())
    }

    fn render_error(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "Error: {}", message)
    }

    fn render_saved_recipes(&mut self, recipes: &[SavedRecipe]) -> io::Result<()> {
        if recipes.is_empty() {
            return writeln!(self.out, "No saved recipes.");
        }
        for summary in recipes.iter().map(recipe_summary) {
            writeln!(self.out, "[{}] {} ({})", summary.id, summary.name, summary.created_date)?;
            writeln!(self.out, "    {}", summary.macros)?;
            writeln!(self.out, "    Ingredients: {}", summary.ingredients_preview)?;
        }
        Ok(())
    }
}
