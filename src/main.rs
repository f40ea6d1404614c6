use clap::{Parser, Subcommand};
use polyglot_pages::client::{DEFAULT_MODEL, OpenAiClient, RetryPolicy};
use polyglot_pages::generate::GenerateOptions;
use polyglot_pages::{config, generate, naming, output, render, sitemap, verify};
use std::path::PathBuf;
use std::process::ExitCode;

/// Shared flags for content generation.
#[derive(clap::Args, Clone)]
struct GenerateArgs {
    /// Disable the prompt cache — regenerate every concept
    #[arg(long)]
    no_cache: bool,

    /// Maximum completion tokens per concept
    #[arg(long, default_value_t = 2000)]
    max_tokens: u32,
}

/// Crate version on release tags, `dev@<short-hash>` everywhere else.
fn version_string() -> &'static str {
    if env!("ON_RELEASE_TAG") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("GIT_HASH") {
        "" => "dev@unknown",
        // clap wants &'static str; one small leak at startup is fine.
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "polyglot-pages")]
#[command(about = "Static site generator for AI-written language concept pages")]
#[command(long_about = "\
Static site generator for AI-written language concept pages

Two YAML files drive everything: a language list and a nested mapping of
concept category → subconcept → prompt template. Generated text is cached
per language; editing a prompt template regenerates exactly that concept.

Docs directory layout:

  docs/
  ├── prog_langs.yaml              # Language list (under 'Programming Languages')
  ├── prog_lang_concepts.yaml      # category → subconcept → prompt template
  ├── index.html                   # Hand-maintained comparison index (not generated)
  ├── content-autogen/
  │   └── gpt_3_5_turbo/           # One JSON content document per language
  │       ├── Python_3_10.json
  │       └── Rust.json
  ├── concepts/
  │   ├── python-310.html          # Language landing page
  │   └── python-310/
  │       └── datatypes_primitives.html
  └── sitemap.xml

Generation needs OPENAI_API_KEY in the environment; OPENAI_API_URL may
point at any chat-completions-compatible endpoint.")]
#[command(version = version_string())]
struct Cli {
    /// Docs directory holding config, content and the rendered site
    #[arg(long, default_value = "docs", global = true)]
    docs_dir: PathBuf,

    /// Directory for per-language prompt caches
    #[arg(long, default_value = ".cache", global = true)]
    cache_dir: PathBuf,

    /// Base URL the site is deployed under
    #[arg(
        long,
        default_value = "https://prog-lang-compare.netlify.app",
        global = true
    )]
    base_url: String,

    /// Completion model (also names the content subdirectory)
    #[arg(long, default_value = DEFAULT_MODEL, global = true)]
    model: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate missing or stale concept text via the completions API
    Generate(GenerateArgs),
    /// Render concept and landing pages from the content documents
    Render,
    /// Write sitemap.xml covering the rendered site
    Sitemap,
    /// Render the site, then write the sitemap
    Build,
    /// Check that every sitemap URL resolves to a file on disk
    Verify,
}

impl Cli {
    fn languages_path(&self) -> PathBuf {
        self.docs_dir.join("prog_langs.yaml")
    }

    fn concepts_path(&self) -> PathBuf {
        self.docs_dir.join("prog_lang_concepts.yaml")
    }

    fn content_dir(&self) -> PathBuf {
        self.docs_dir
            .join("content-autogen")
            .join(naming::safe_name(&self.model))
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Generate(args) => {
            let languages = config::load_languages(&cli.languages_path())?;
            let concepts = config::ConceptSet::load(&cli.concepts_path())?;
            let client = OpenAiClient::from_env(&cli.model, RetryPolicy::default())?;
            let options = GenerateOptions {
                use_cache: !args.no_cache,
                max_tokens: args.max_tokens,
            };
            let summary = generate::generate(
                &languages,
                &concepts,
                &client,
                &cli.cache_dir,
                &cli.content_dir(),
                &options,
            );
            output::print_generate_summary(&summary);
            // Per-concept failures are warnings, not a failed run: the text
            // already generated is persisted and the next run retries the
            // rest. Only a run where every language aborted exits non-zero.
            Ok(exit_status(!summary.all_aborted()))
        }
        Command::Render => {
            let summary = run_render(&cli)?;
            Ok(exit_status(summary.total_pages() > 0))
        }
        Command::Sitemap => {
            run_sitemap(&cli)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Build => {
            println!("==> Stage 1: Rendering pages → {}", cli.docs_dir.display());
            let summary = run_render(&cli)?;

            println!("==> Stage 2: Writing sitemap");
            run_sitemap(&cli)?;

            println!("==> Build complete: {}", cli.docs_dir.display());
            Ok(exit_status(summary.total_pages() > 0))
        }
        Command::Verify => {
            let sitemap_path = cli.docs_dir.join(sitemap::SITEMAP_FILENAME);
            let report = verify::verify(&sitemap_path, &cli.docs_dir, &cli.base_url)?;
            output::print_verify_report(&report);
            Ok(exit_status(report.is_clean()))
        }
    }
}

fn run_render(cli: &Cli) -> Result<render::RenderSummary, Box<dyn std::error::Error>> {
    let languages = config::load_languages(&cli.languages_path())?;
    let concepts = config::ConceptSet::load(&cli.concepts_path())?;
    let summary = render::render_site(
        &languages,
        &concepts,
        &cli.content_dir(),
        &cli.docs_dir,
        &cli.base_url,
    )?;
    output::print_render_summary(&summary);
    Ok(summary)
}

fn run_sitemap(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let count = sitemap::write_sitemap(&cli.docs_dir, &cli.base_url)?;
    let sitemap_path = cli.docs_dir.join(sitemap::SITEMAP_FILENAME);
    output::print_sitemap_output(count, &sitemap_path);
    Ok(())
}

fn exit_status(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}
