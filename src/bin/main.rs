//! lkml2cube CLI - Translate LookML models to Cube and back
//!
//! Usage:
//!   lkml2cube cubes <pattern> [--outputdir <dir>] [--rootdir <dir>] [--parseonly] [--printonly]
//!   lkml2cube views <pattern> [--use-explores-name] [...]
//!   lkml2cube explores <metaurl> --token <token> [...]
//!
//! Examples:
//!   lkml2cube cubes "lookml/views/*.view.lkml" --outputdir model/
//!   lkml2cube views lookml/explores/orders.explore.lkml --rootdir lookml --printonly
//!   lkml2cube explores https://cube.example.com/cubejs-api/v1/meta --token $CUBE_TOKEN

use clap::{Args, Parser, Subcommand};
use lkml2cube::config::Settings;
use lkml2cube::convert::{self, ConvertError, ConvertOptions};
use lkml2cube::model::{CubeModel, Namespace};
use lkml2cube::output::{self, Summary};
use lkml2cube::{logging, meta};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "lkml2cube")]
#[command(about = "lkml2cube - Translate LookML models to Cube semantic layer models and back")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Cube cubes from LookML views
    Cubes {
        /// Glob pattern of LookML files to load
        pattern: String,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate Cube cubes and views from LookML explores
    Views {
        /// Glob pattern of LookML files to load
        pattern: String,

        /// Name Cube views after explores instead of their labels
        #[arg(long = "use-explores-name")]
        use_explores_name: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Generate LookML views and explores from a Cube meta API
    Explores {
        /// URL of the Cube meta endpoint (falls back to the settings file)
        metaurl: Option<String>,

        /// Bearer token for the meta API (falls back to the settings file)
        #[arg(short, long)]
        token: Option<String>,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Directory generated files are written under
    #[arg(short, long)]
    outputdir: Option<PathBuf>,

    /// Directory absolute include paths resolve against
    #[arg(short, long)]
    rootdir: Option<PathBuf>,

    /// Print the loaded input model and stop
    #[arg(long)]
    parseonly: bool,

    /// Print the generated output instead of writing files
    #[arg(long)]
    printonly: bool,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Cubes { pattern, common } => cmd_cubes(&pattern, &common, &settings),
        Commands::Views {
            pattern,
            use_explores_name,
            common,
        } => cmd_views(&pattern, use_explores_name, &common, &settings),
        Commands::Explores {
            metaurl,
            token,
            common,
        } => cmd_explores(metaurl, token, &common, &settings),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn convert_options(common: &CommonArgs, settings: &Settings) -> ConvertOptions {
    let root_dir = common
        .rootdir
        .clone()
        .or_else(|| settings.loader.root_dir.as_ref().map(PathBuf::from));
    ConvertOptions {
        root_dir,
        use_explore_names: settings.views.use_explore_names,
    }
}

fn output_dir(common: &CommonArgs, settings: &Settings) -> PathBuf {
    common
        .outputdir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&settings.output.dir))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serialising model: {}", e),
    }
}

fn print_summary(summary: &Summary) {
    if summary.is_empty() {
        println!("Nothing to write");
    } else {
        print!("{}", summary);
    }
}

fn emit_cube_model(
    model: &CubeModel,
    common: &CommonArgs,
    settings: &Settings,
) -> Result<(), ConvertError> {
    if common.printonly {
        match model.to_yaml() {
            Ok(yaml) => print!("{}", yaml),
            Err(e) => eprintln!("Error serialising model: {}", e),
        }
        return Ok(());
    }
    let summary = output::write_cube_files(model, &output_dir(common, settings))?;
    print_summary(&summary);
    Ok(())
}

fn cmd_cubes(pattern: &str, common: &CommonArgs, settings: &Settings) -> Result<(), ConvertError> {
    let options = convert_options(common, settings);
    let namespace = convert::load(pattern, &options)?;
    if common.parseonly {
        print_json(&namespace);
        return Ok(());
    }
    let model = convert::cubes_from(&namespace)?;
    emit_cube_model(&model, common, settings)
}

fn cmd_views(
    pattern: &str,
    use_explores_name: bool,
    common: &CommonArgs,
    settings: &Settings,
) -> Result<(), ConvertError> {
    let options = convert_options(common, settings)
        .with_explore_names(use_explores_name || settings.views.use_explore_names);
    let namespace = convert::load(pattern, &options)?;
    if common.parseonly {
        print_json(&namespace);
        return Ok(());
    }
    let model = convert::views_from(&namespace, &options)?;
    emit_cube_model(&model, common, settings)
}

fn cmd_explores(
    metaurl: Option<String>,
    token: Option<String>,
    common: &CommonArgs,
    settings: &Settings,
) -> Result<(), ConvertError> {
    let url = metaurl.or_else(|| settings.meta.url.clone()).unwrap_or_default();
    let token = token.or_else(|| settings.meta.token.clone()).unwrap_or_default();

    let document = meta::fetch_meta(&url, &token)?;
    if common.parseonly {
        print_json(&document);
        return Ok(());
    }

    let namespace: Namespace = convert::explores(&document)?;
    if common.printonly {
        print!("{}", output::render_lookml(&namespace));
        return Ok(());
    }
    let summary = output::write_lookml_files(&namespace, &output_dir(common, settings))?;
    print_summary(&summary);
    Ok(())
}
