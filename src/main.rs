//! pipeline-codegen - Main Entry Point
//!
//! Compiles pipeline descriptions exported by the visual editor into Python
//! training scripts.

use clap::Parser;
use pipeline_codegen::{
    CompileError, CompilerConfig, PipelineCompiler, PipelineDescription, ResultExt,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "pipeline-codegen")]
#[command(about = "Compile visual ML pipeline graphs into Python training scripts", long_about = None)]
struct Args {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Compile a pipeline description to a script
    Compile {
        /// Pipeline description (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output file (defaults to stdout)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
        /// Compiler config (TOML or JSON)
        #[arg(short, long, value_name = "CFG")]
        config: Option<PathBuf>,
        /// Reject unknown model and optimizer names at compile time
        #[arg(long)]
        strict: bool,
    },

    /// Check a pipeline description and print its execution order
    Validate {
        /// Pipeline description (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the top-level packages the generated script imports
    Packages {
        /// Pipeline description (JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Compiler config (TOML or JSON)
        #[arg(short, long, value_name = "CFG")]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so a compiled script on stdout stays clean
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,pipeline_codegen=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Command::Compile {
            file,
            output,
            config,
            strict,
        } => {
            let mut config = load_config(config.as_deref())?;
            if strict {
                config.strict_models = true;
            }
            let description = PipelineDescription::load(&file)?;
            let script = PipelineCompiler::new(config)
                .compile(&description)
                .with_context(|| format!("Failed to compile {}", file.display()))?;

            match output {
                Some(path) => {
                    script.write_to(&path)?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => print!("{}", script.text),
            }
            Ok(())
        }
        Command::Validate { file } => {
            let description = PipelineDescription::load(&file)?;
            let order = PipelineCompiler::default().validate(&description)?;
            for (position, node) in order.iter().enumerate() {
                println!("{}. {}", position + 1, node);
            }
            Ok(())
        }
        Command::Packages { file, config } => {
            let config = load_config(config.as_deref())?;
            let description = PipelineDescription::load(&file)?;
            let script = PipelineCompiler::new(config)
                .compile(&description)
                .with_context(|| format!("Failed to compile {}", file.display()))?;
            for package in script.packages() {
                println!("{}", package);
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CompilerConfig> {
    match path {
        Some(path) => Ok(CompilerConfig::load(path)?),
        None => Ok(CompilerConfig::default()),
    }
}

fn report(err: &anyhow::Error) {
    if let Some(compile_error) = err.downcast_ref::<CompileError>() {
        eprintln!("error[{}]: {}", compile_error.kind(), compile_error);
    } else if let Some(err) = err.downcast_ref::<pipeline_codegen::Error>() {
        // Crate errors already print their context chain
        match err.compile_error() {
            Some(compile_error) => eprintln!("error[{}]: {}", compile_error.kind(), compile_error),
            None => eprintln!("error: {}", err),
        }
    } else {
        eprintln!("error: {:#}", err);
    }
}
