use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use propsheet::builtin;
use propsheet::io::{
    DocumentFormat, OutputDestination, OutputOptions, parse_document_file, write_document,
};
use propsheet::{EditingContext, NodeId, Selection};

#[derive(Debug, Parser)]
#[command(
    name = "propsheet",
    version,
    about = "Inspect and edit node-document properties"
)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Print the assembled property groups for a selected node as JSON
    Groups {
        /// Document file (json, or yaml/toml with the matching feature)
        #[arg(long = "doc", value_name = "FILE")]
        doc: PathBuf,

        /// Id of the node to select
        #[arg(long = "select", value_name = "ID")]
        select: String,
    },
    /// Apply one edit through the engine and write the document back
    Set {
        #[arg(long = "doc", value_name = "FILE")]
        doc: PathBuf,

        #[arg(long = "select", value_name = "ID")]
        select: String,

        /// Group id containing the entry
        #[arg(long = "group", value_name = "ID")]
        group: String,

        /// Entry id within the group
        #[arg(long = "entry", value_name = "ID")]
        entry: String,

        /// New value; parsed as JSON when possible, as a string otherwise
        #[arg(long = "value", value_name = "VALUE")]
        value: String,

        /// Output destinations ("-" writes to stdout, the default)
        #[arg(short = 'o', long = "output", value_name = "DEST")]
        outputs: Vec<String>,

        /// Emit compact rather than pretty output
        #[arg(long = "no-pretty")]
        no_pretty: bool,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Groups { doc, select } => {
            let (context, node) = load_session(&doc, &select)?;
            let groups = context.assemble(&Selection::Single(node));
            let description: Vec<Value> = groups
                .iter()
                .map(|group| group.describe(context.document(), node))
                .collect();
            println!("{}", serde_json::to_string_pretty(&Value::Array(description))?);
        }
        CliCommand::Set {
            doc,
            select,
            group,
            entry,
            value,
            outputs,
            no_pretty,
        } => {
            let (mut context, node) = load_session(&doc, &select)?;
            let groups = context.assemble(&Selection::Single(node));
            let target = groups
                .iter()
                .find(|candidate| candidate.id == group)
                .ok_or_else(|| eyre!("no group `{group}` for node `{select}`"))?;
            let target = target
                .entry(&entry)
                .ok_or_else(|| eyre!("no entry `{entry}` in group `{group}`"))?
                .clone();
            target.set(&mut context, node, Some(parse_value(&value)))?;

            let format = DocumentFormat::from_path(&doc);
            let destinations = if outputs.is_empty() {
                vec![OutputDestination::Stdout]
            } else {
                outputs
                    .iter()
                    .map(|dest| match dest.as_str() {
                        "-" => OutputDestination::Stdout,
                        path => OutputDestination::file(path),
                    })
                    .collect()
            };
            let options = OutputOptions::new(format)
                .with_pretty(!no_pretty)
                .with_destinations(destinations);
            write_document(context.document(), &options).map_err(|err| eyre!(err))?;
        }
    }
    Ok(())
}

fn load_session(doc: &Path, select: &str) -> Result<(EditingContext, NodeId)> {
    let document = parse_document_file(doc).map_err(|err| eyre!(err))?;
    let node = document
        .lookup(select)
        .ok_or_else(|| eyre!("document has no node with id `{select}`"))?;
    let context = EditingContext::new(document).with_registry(builtin::default_registry());
    Ok((context, node))
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
