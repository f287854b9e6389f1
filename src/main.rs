//! covent recipe CLI
//!
//! Resolves the covent recipe's options, requirements and toolchain
//! variables for a build environment.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use config::{ConfigLoader, Overrides};
use package::settings::{BuildType, Compiler, CompilerKind, CppStd, Settings};
use package::{CMakeLayout, CMakeToolchain, Layout, Pipeline, Recipe, RecordingIndex, Resolution};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Configuration resolver for the covent library recipe
#[derive(Parser, Debug)]
#[clap(name = "covent-recipe", author, version, about, long_about = None)]
struct Cli {
    /// Directory holding profile.toml and recipe-data.toml
    #[clap(long, global = true, env = "COVENT_RECIPE_ROOT")]
    root: Option<PathBuf>,

    /// Enable verbose output
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the recipe's options
    Options,
    /// Resolve requirements, dependency options and toolchain variables
    Resolve {
        #[clap(flatten)]
        input: InputArgs,

        /// Print the result as JSON
        #[clap(long)]
        json: bool,
    },
    /// Write the CMake toolchain file
    Generate {
        #[clap(flatten)]
        input: InputArgs,

        /// Folder for the toolchain file; defaults to the layout's generators folder
        #[clap(long = "output-folder")]
        output_folder: Option<PathBuf>,

        /// Use the multi-config build folder layout
        #[clap(long = "multi-config")]
        multi_config: bool,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Option override, `name=value` or `pattern:name=value`
    #[clap(short = 'o', long = "option", value_name = "[PATTERN:]NAME=VALUE")]
    options: Vec<String>,

    /// Option profile (TOML)
    #[clap(long, env = "COVENT_PROFILE")]
    profile: Option<PathBuf>,

    /// Recipe data file with the base requirements (TOML)
    #[clap(long)]
    data: Option<PathBuf>,

    #[clap(flatten)]
    settings: SettingsArgs,
}

#[derive(Args, Debug)]
struct SettingsArgs {
    /// Target operating system
    #[clap(long)]
    os: Option<String>,

    /// Target architecture
    #[clap(long)]
    arch: Option<String>,

    /// Build type
    #[clap(long = "build-type", default_value = "Release")]
    build_type: String,

    /// Compiler family (gcc, clang, apple-clang, msvc)
    #[clap(long, default_value = "gcc")]
    compiler: String,

    /// Compiler version
    #[clap(long = "compiler-version", default_value = "13")]
    compiler_version: String,

    /// C++ standard, e.g. 20 or gnu20; the compiler default applies when unset
    #[clap(long)]
    cppstd: Option<String>,
}

impl SettingsArgs {
    fn to_settings(&self) -> Result<Settings> {
        let kind: CompilerKind = self.compiler.parse()?;
        let build_type: BuildType = self.build_type.parse()?;

        let mut settings =
            Settings::new(Compiler::new(kind, &self.compiler_version)).with_build_type(build_type);
        if let Some(os) = &self.os {
            settings.os = os.clone();
        }
        if let Some(arch) = &self.arch {
            settings.arch = arch.clone();
        }
        if let Some(cppstd) = &self.cppstd {
            let cppstd: CppStd = cppstd.parse()?;
            settings = settings.with_cppstd(cppstd);
        }
        Ok(settings)
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let loader = match &cli.root {
        Some(root) => ConfigLoader::new(root),
        None => ConfigLoader::from_env(),
    };

    let result = match cli.command {
        Commands::Options => cmd_options(),
        Commands::Resolve { input, json } => cmd_resolve(loader, input, json),
        Commands::Generate {
            input,
            output_folder,
            multi_config,
        } => cmd_generate(loader, input, output_folder, multi_config),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_options() -> Result<()> {
    let recipe = Recipe::covent()?;
    println!("{} ({})", recipe.reference(), recipe.package_type());
    for decl in recipe.registry().iter() {
        println!(
            "  {:<10} {:<16} default {}",
            decl.name,
            decl.domain.to_string(),
            decl.default
        );
    }
    Ok(())
}

fn run(loader: ConfigLoader, input: &InputArgs) -> Result<(Resolution, Settings)> {
    let mut loader = loader;
    if let Some(profile) = &input.profile {
        loader = loader.profile(profile);
    }
    if let Some(data) = &input.data {
        loader = loader.data(data);
    }

    let profile = loader
        .load_profile()
        .with_context(|| format!("failed to load profile {}", loader.profile_path().display()))?;
    let data = loader
        .load_data()
        .with_context(|| format!("failed to load recipe data {}", loader.data_path().display()))?;

    let mut overrides = profile.to_overrides();
    overrides.merge(&Overrides::parse_all(&input.options)?);
    debug!("{} option overrides", overrides.len());

    let settings = input.settings.to_settings()?;
    let recipe = Recipe::covent()?;
    let resolution = Pipeline::new(&recipe)
        .run_with_data(&overrides, &data, &settings)
        .with_context(|| format!("failed to configure {}", recipe.reference()))?;
    Ok((resolution, settings))
}

fn cmd_resolve(loader: ConfigLoader, input: InputArgs, json: bool) -> Result<()> {
    let (resolution, _) = run(loader, &input)?;

    if json {
        println!("{}", resolution.to_json_pretty()?);
        return Ok(());
    }

    let mut index = RecordingIndex::new();
    resolution.hand_off(&mut index)?;
    println!("Dependency index calls:");
    for call in index.calls() {
        println!("  {}", call);
    }

    println!("Toolchain variables:");
    for (name, value) in resolution.toolchain_vars().iter() {
        println!("  {} = {}", name, value);
    }

    println!("Libraries: {}", resolution.artifact().library_names.join(", "));
    Ok(())
}

fn cmd_generate(
    loader: ConfigLoader,
    input: InputArgs,
    output_folder: Option<PathBuf>,
    multi_config: bool,
) -> Result<()> {
    let root = loader.root().to_path_buf();
    let (resolution, settings) = run(loader, &input)?;

    let folder = output_folder.unwrap_or_else(|| {
        CMakeLayout::new(root, settings.build_type)
            .multi_config(multi_config)
            .generators_folder()
    });
    let path = resolution
        .generate(&CMakeToolchain::new(&folder), &settings)
        .with_context(|| format!("failed to write toolchain into {}", folder.display()))?;

    println!("{}", path.display());
    Ok(())
}
