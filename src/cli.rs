use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::unit_converter::VolumeUnit;

#[derive(Parser, Debug)]
#[command(author, version, about = "Recipe nutrition calculator", long_about = None)]
pub struct Cli {
    /// Base URL of the nutrition lookup proxy (overrides NUTRIFIND_PROXY_URL)
    #[arg(long, global = true)]
    pub proxy_url: Option<String>,

    /// Directory for saved recipes and preferences (overrides NUTRIFIND_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Look up each ingredient line and print the recipe totals
    Calculate {
        /// Ingredient lines, e.g. "100g chicken breast"
        #[arg(required = true)]
        ingredients: Vec<String>,
        /// Save the result under this name
        #[arg(long)]
        save: Option<String>,
        /// Print the nutrition table in clipboard format
        #[arg(long)]
        copy: bool,
        /// Print the share-sheet text
        #[arg(long)]
        share: bool,
    },
    /// Manage saved recipes
    Recipes {
        #[command(subcommand)]
        action: RecipeAction,
    },
    /// Convert between kitchen volume units
    Convert {
        #[arg(allow_negative_numbers = true)]
        amount: f64,
        from: VolumeUnit,
        to: VolumeUnit,
    },
    /// Show or change the stored theme preference
    Theme {
        #[command(subcommand)]
        action: Option<ThemeAction>,
    },
    /// Run the lookup proxy in front of the upstream nutrition API
    Serve {
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

#[derive(Subcommand, Debug)]
pub enum RecipeAction {
    /// List saved recipes, newest first
    List,
    /// Show one recipe with its full ingredient list
    Show { id: u64 },
    /// Delete a recipe by id
    Delete { id: u64 },
    /// Print a recipe's ingredients in clipboard format
    CopyIngredients { id: u64 },
}

#[derive(Subcommand, Debug, Clone, Copy)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_calculate_with_save() {
        let cli = Cli::try_parse_from([
            "nutrifind",
            "calculate",
            "100g chicken breast",
            "2 cups rice",
            "--save",
            "Dinner",
        ])
        .unwrap();
        match cli.command {
            Command::Calculate { ingredients, save, copy, share } => {
                assert_eq!(ingredients, vec!["100g chicken breast", "2 cups rice"]);
                assert_eq!(save.as_deref(), Some("Dinner"));
                assert!(!copy && !share);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_convert_units() {
        let cli = Cli::try_parse_from(["nutrifind", "convert", "2", "l", "cup"]).unwrap();
        match cli.command {
            Command::Convert { amount, from, to } => {
                assert_eq!(amount, 2.0);
                assert_eq!(from, VolumeUnit::Liter);
                assert_eq!(to, VolumeUnit::Cup);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["nutrifind", "recipes", "delete", "12", "--data-dir", "/tmp/x"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/x")));
        assert!(matches!(cli.command, Command::Recipes { action: RecipeAction::Delete { id: 12 } }));
    }
}
