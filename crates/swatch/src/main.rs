//! Command-line inspector for style-variable definition files.
//!
//! Parses a definition file and shows what the engine sees: sections and
//! their components, the serialized base artifact, dependency queries,
//! and, when an external compiler is available, which variables resolve
//! to colours.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use console::Style;
use swatch_vars::{parse_file, Classifier, CommandCompiler, VarStore};

#[derive(Parser)]
#[command(name = "swatch")]
#[command(about = "Inspect, resolve, and colour-classify style-variable definition files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List sections and their components
    Sections {
        /// Definition file (e.g. _variables.scss)
        file: PathBuf,
    },

    /// Print the serialized base artifact as JSON
    Json {
        /// Definition file (e.g. _variables.scss)
        file: PathBuf,
        /// Pretty-print instead of the compact artifact encoding
        #[arg(long)]
        pretty: bool,
    },

    /// Show which variables reference the given one
    Deps {
        /// Definition file (e.g. _variables.scss)
        file: PathBuf,
        /// Variable name, without the `$` sigil
        name: String,
    },

    /// Classify variables as colours via an external compiler
    Colours {
        /// Definition file (e.g. _variables.scss)
        file: PathBuf,
        /// Compiler command reading source from stdin
        #[arg(long, default_value = "sass --stdin")]
        compiler: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Sections { file } => sections(&file),
        Commands::Json { file, pretty } => json(&file, pretty),
        Commands::Deps { file, name } => deps(&file, &name),
        Commands::Colours { file, compiler } => colours(&file, &compiler),
    }
}

fn load(file: &PathBuf) -> Result<VarStore> {
    parse_file(file).with_context(|| format!("loading {}", file.display()))
}

fn sections(file: &PathBuf) -> Result<()> {
    let store = load(file)?;
    let header = Style::new().bold().cyan();
    let doc = Style::new().dim();
    let name_style = Style::new().green();

    for section in store.sections() {
        println!("{}", header.apply_to(section.name()));
        if !section.info().is_empty() {
            println!("  {}", doc.apply_to(section.info()));
        }
        for comp in section.components() {
            println!("  {}: {}", name_style.apply_to(comp.name()), comp.value());
            if !comp.info().is_empty() {
                println!("      {}", doc.apply_to(comp.info()));
            }
        }
        println!();
    }

    let loose: Vec<_> = store.nonsectioned().collect();
    if !loose.is_empty() {
        println!("{}", header.apply_to("(ungrouped)"));
        for comp in loose {
            println!("  {}: {}", name_style.apply_to(comp.name()), comp.value());
        }
    }
    Ok(())
}

fn json(file: &PathBuf, pretty: bool) -> Result<()> {
    let store = load(file)?;
    if pretty {
        println!("{}", serde_json::to_string_pretty(&store.to_value())?);
    } else {
        println!("{}", store.base_to_json());
    }
    Ok(())
}

fn deps(file: &PathBuf, name: &str) -> Result<()> {
    let store = load(file)?;
    if store.component(name).is_none() {
        bail!("no variable named '{}' in {}", name, file.display());
    }
    for dependent in store.dependencies(name) {
        println!("{}", dependent);
    }
    Ok(())
}

fn colours(file: &PathBuf, compiler: &str) -> Result<()> {
    let mut store = load(file)?;

    let mut words = compiler.split_whitespace();
    let Some(program) = words.next() else {
        bail!("empty compiler command");
    };
    let mut command = CommandCompiler::new(program);
    for arg in words {
        command = command.arg(arg);
    }

    Classifier::new(&command)
        .classify(&mut store)
        .with_context(|| format!("classifying {} with `{}`", file.display(), compiler))?;

    let name_style = Style::new().green();
    let colour_style = Style::new().bold();
    for comp in store.colour_components() {
        println!(
            "{}: {} {}",
            name_style.apply_to(comp.name()),
            comp.value(),
            colour_style.apply_to(format!("=> {}", comp.colour_value())),
        );
    }
    Ok(())
}
