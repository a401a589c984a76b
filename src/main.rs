use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use recipekit::designer::{
    fallback_layout, serialize, SaveTemplateRequest, TemplateName, TemplateStore,
};
use recipekit::settings::default_config_path;
use recipekit::{init_logging, Config, JsonRecipeSource, Recipe, RecipeSource};

#[derive(Parser)]
#[command(
    name = "recipekit",
    version = concat!(env!("CARGO_PKG_VERSION"), " (built ", env!("BUILD_DATE"), ")"),
    about = "Render recipe cards from saved page templates"
)]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render recipe pages to a PDF, or a single preview page to PNG
    Render {
        /// JSON file of recipe records
        #[arg(long)]
        recipes: Option<PathBuf>,
        /// Recipe ids to render, in page order (default: all)
        #[arg(long = "id")]
        ids: Vec<String>,
        /// Template directory
        #[arg(long)]
        templates: Option<PathBuf>,
        /// Output file; `.png` renders one preview page
        #[arg(long, default_value = "recipes.pdf")]
        out: PathBuf,
    },
    /// Write the built-in layout as the default template
    InitTemplate {
        /// Template directory
        #[arg(long)]
        templates: Option<PathBuf>,
        /// Replace an existing default template
        #[arg(long)]
        force: bool,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => match default_config_path() {
            Ok(path) => Config::load_or_default(&path)
                .with_context(|| format!("Failed to load config from {}", path.display())),
            Err(_) => Ok(Config::default()),
        },
    }
}

async fn select_recipes(source: &JsonRecipeSource, ids: &[String]) -> anyhow::Result<Vec<Recipe>> {
    if ids.is_empty() {
        return Ok(source.list().await?);
    }
    let mut recipes = Vec::with_capacity(ids.len());
    for id in ids {
        match source.fetch(id).await? {
            Some(recipe) => recipes.push(recipe),
            None => bail!("Recipe '{id}' not found in {}", source.path().display()),
        }
    }
    Ok(recipes)
}

async fn render(
    mut config: Config,
    recipes: Option<PathBuf>,
    ids: Vec<String>,
    templates: Option<PathBuf>,
    out: PathBuf,
) -> anyhow::Result<()> {
    if let Some(dir) = templates {
        config.storage.template_dir = dir;
    }
    let Some(recipes_file) = recipes.or_else(|| config.storage.recipes_file.clone()) else {
        bail!("No recipe file given; pass --recipes or set storage.recipes_file");
    };

    let source = JsonRecipeSource::new(recipes_file);
    let recipes = select_recipes(&source, &ids).await?;
    let assembler = recipekit::batch_assembler(&config);

    let is_png = out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));

    let bytes = if is_png {
        let [recipe] = recipes.as_slice() else {
            bail!("PNG output renders exactly one recipe; got {}", recipes.len());
        };
        assembler
            .preview(recipe)
            .await
            .with_context(|| format!("Failed to render recipe '{}'", recipe.id))?
            .to_png()?
    } else {
        let document = assembler.generate(&recipes).await?;
        tracing::info!(pages = document.page_count(), "Rendered document");
        document.to_pdf()
    };

    tokio::fs::write(&out, bytes)
        .await
        .with_context(|| format!("Failed to write {}", out.display()))?;
    tracing::info!(path = %out.display(), "Wrote output");
    Ok(())
}

async fn init_template(mut config: Config, templates: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    if let Some(dir) = templates {
        config.storage.template_dir = dir;
    }
    let store = recipekit::template_store(&config);
    if !force && store.load(&TemplateName::Default).await.ok().flatten().is_some() {
        bail!(
            "A default template already exists in {}; use --force to replace it",
            store.dir().display()
        );
    }
    let mut document = serialize(&fallback_layout());
    document.touch();
    store
        .save(SaveTemplateRequest::new(&TemplateName::Default, document))
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Render {
            recipes,
            ids,
            templates,
            out,
        } => render(config, recipes, ids, templates, out).await,
        Command::InitTemplate { templates, force } => init_template(config, templates, force).await,
    }
}
