use anyhow::{Context, Result};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use nutrifind::api_connection::NutritionClient;
use nutrifind::cli::{parse_args, Command, RecipeAction, ThemeAction};
use nutrifind::config::AppConfig;
use nutrifind::presentation::{
    copy_ingredients_text, copy_table_text, MacroChart, NutritionRenderer, NutritionTable,
    TerminalRenderer,
};
use nutrifind::proxy::{build_proxy, ProxyState};
use nutrifind::recipe_aggregator::IngredientOutcome;
use nutrifind::recipe_store::{RecipeStore, RecipeStoreError};
use nutrifind::session::NutritionSession;
use nutrifind::storage::{FileStore, Theme, ThemeStore};
use nutrifind::unit_converter::format_conversion;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Logs go to stderr; stdout is reserved for results.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nutrifind=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = parse_args();
    let mut config = AppConfig::from_env();
    if let Some(url) = cli.proxy_url {
        config.proxy_url = url;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    let stdout = io::stdout();
    let mut renderer = TerminalRenderer::new(stdout.lock());
    let store = FileStore::new(&config.data_dir);

    match cli.command {
        Command::Calculate {
            ingredients,
            save,
            copy,
            share,
        } => {
            let client = NutritionClient::new(&config.proxy_url, config.retry)
                .with_context(|| format!("Invalid proxy URL '{}'", config.proxy_url))?;
            let mut session = NutritionSession::new(client, store);

            eprintln!("Calculating...");
            let calculation = match session.calculate(&ingredients).await {
                Ok(calculation) => calculation,
                Err(e) => {
                    renderer.render_error(&e.to_string())?;
                    return Ok(ExitCode::FAILURE);
                }
            };

            for outcome in &calculation.outcomes {
                match outcome {
                    IngredientOutcome::Skipped { query } => eprintln!("   -> skipped '{}' (too short)", query),
                    IngredientOutcome::NoData { query } => eprintln!("   -> no data for '{}'", query),
                    IngredientOutcome::Found { query, matched_name } => eprintln!(
                        "   -> '{}' matched {}",
                        query,
                        matched_name.as_deref().unwrap_or("an unnamed item")
                    ),
                }
            }

            let table = NutritionTable::from_totals(&calculation.totals);
            renderer.render_table(&table)?;
            renderer.render_chart(&MacroChart::from_totals(&calculation.totals))?;

            let mut out = renderer.into_inner();
            if copy {
                writeln!(out, "\n{}", copy_table_text(&table))?;
            }
            if share {
                let payload = session.share_current()?;
                writeln!(out, "\n{}\n{}\n{}", payload.title, payload.text, payload.url)?;
            }
            if let Some(name) = save {
                match session.save_current(&name) {
                    Ok(recipe) => writeln!(out, "\nRecipe \"{}\" saved successfully! (id {})", recipe.name, recipe.id)?,
                    Err(RecipeStoreError::Validation(e)) => {
                        writeln!(out, "Error: {}", e)?;
                        return Ok(ExitCode::FAILURE);
                    }
                    Err(e) => return Err(e).context("Failed to save recipe"),
                }
            }
        }
        Command::Recipes { action } => {
            let recipes = RecipeStore::new(store);
            match action {
                RecipeAction::List => renderer.render_saved_recipes(&recipes.list_recipes())?,
                RecipeAction::Show { id } => match recipes.get_recipe(id) {
                    Some(recipe) => {
                        renderer.render_saved_recipes(std::slice::from_ref(&recipe))?;
                        renderer.render_table(&NutritionTable::from_totals(&recipe.totals))?;
                        let mut out = renderer.into_inner();
                        writeln!(out, "\nIngredients:")?;
                        for ingredient in &recipe.ingredients {
                            writeln!(out, "  - {}", ingredient)?;
                        }
                    }
                    None => {
                        renderer.render_error(&format!("No saved recipe with id {}", id))?;
                        return Ok(ExitCode::FAILURE);
                    }
                },
                RecipeAction::Delete { id } => {
                    let remaining = recipes
                        .delete_recipe(id)
                        .with_context(|| format!("Failed to delete recipe {}", id))?;
                    println!("Recipe deleted successfully.");
                    renderer.render_saved_recipes(&remaining)?;
                }
                RecipeAction::CopyIngredients { id } => {
                    match recipes.get_recipe(id).and_then(|r| copy_ingredients_text(&r.ingredients)) {
                        Some(text) => println!("{}", text),
                        None => {
                            renderer.render_error(&format!("No saved recipe with id {}", id))?;
                            return Ok(ExitCode::FAILURE);
                        }
                    }
                }
            }
        }
        Command::Convert { amount, from, to } => {
            println!("{}", format_conversion(amount, from, to));
        }
        Command::Theme { action } => {
            let themes = ThemeStore::new(store);
            let theme = match action {
                None => themes.load(),
                Some(ThemeAction::Toggle) => themes.toggle().context("Failed to store theme")?,
                Some(ThemeAction::Light) => {
                    themes.save(Theme::Light).context("Failed to store theme")?;
                    Theme::Light
                }
                Some(ThemeAction::Dark) => {
                    themes.save(Theme::Dark).context("Failed to store theme")?;
                    Theme::Dark
                }
            };
            println!("{}", theme.as_str());
        }
        Command::Serve { host, port } => {
            let app = build_proxy(ProxyState::new(config.upstream_url.clone(), config.api_key.clone()));
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("Invalid listen address {}:{}", host, port))?;
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!(%addr, upstream = %config.upstream_url, "proxy listening");
            axum::serve(listener, app).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
