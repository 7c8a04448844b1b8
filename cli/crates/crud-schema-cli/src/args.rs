use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use crud_schema::{type_graph::SdlSource, CrudConfig, Request};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

mod log;

pub(crate) use self::log::{LogLevel, LogStyle};

pub(crate) fn parse() -> Args {
    Args::parse()
}

#[derive(Debug, Parser)]
#[command(name = "crud-schema", version)]
#[command(arg_required_else_help = true)]
/// Generates CRUD fields and input types for every node type of a GraphQL schema
pub(crate) struct Args {
    #[command(subcommand)]
    pub command: Command,
    /// Set the logging level
    #[arg(long = "log", env = "CRUD_SCHEMA_LOG", global = true)]
    pub log_level: Option<LogLevel>,
    /// Set the style of log output
    #[arg(long, env = "CRUD_SCHEMA_LOG_STYLE", default_value_t = LogStyle::Text, global = true)]
    pub log_style: LogStyle,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Print the generated schema
    Print(SchemaArgs),
    /// Run one operation against a fresh in-memory storage and print the response
    Execute(ExecuteArgs),
}

#[derive(Debug, clap::Args)]
pub(crate) struct SchemaArgs {
    /// Path to the SDL of the type schema
    #[arg(long, short, env = "CRUD_SCHEMA_PATH")]
    pub schema: PathBuf,
    /// Path to the TOML configuration file
    #[arg(long, short, env = "CRUD_SCHEMA_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
pub(crate) struct ExecuteArgs {
    #[command(flatten)]
    pub schema: SchemaArgs,
    /// The GraphQL operation, or `@<path>` to read it from a file
    #[arg(long, short)]
    pub query: String,
    /// Variables of the operation, as a JSON object
    #[arg(long)]
    pub variables: Option<String>,
    /// Name of the operation to run when the document holds several
    #[arg(long)]
    pub operation_name: Option<String>,
}

impl Args {
    pub fn schema(&self) -> &SchemaArgs {
        match &self.command {
            Command::Print(schema) => schema,
            Command::Execute(execute) => &execute.schema,
        }
    }

    /// Installs the global subscriber. Logs go to stderr, stdout is kept for the command output.
    pub fn init_logging(&self) {
        let filter = EnvFilter::new(self.log_level.unwrap_or_default().as_filter_str());
        let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

        let layer: Box<dyn Layer<Registry> + Send + Sync> = match self.log_style {
            // for interactive terminals we provide colored output
            LogStyle::Text if atty::is(atty::Stream::Stderr) => layer.with_ansi(true).boxed(),
            LogStyle::Text => layer.with_ansi(false).boxed(),
            LogStyle::Json => layer.json().boxed(),
        };

        tracing_subscriber::registry().with(layer).with(filter).init();
    }
}

impl SchemaArgs {
    pub fn source(&self) -> SdlSource {
        SdlSource::File(self.schema.clone())
    }

    pub fn config(&self) -> anyhow::Result<CrudConfig> {
        let Some(path) = &self.config else {
            return Ok(CrudConfig::default());
        };

        let config = fs::read_to_string(path).map_err(|e| anyhow!("error loading config:\n{e}"))?;

        CrudConfig::from_toml(&config).with_context(|| format!("invalid configuration in {}", path.display()))
    }
}

impl ExecuteArgs {
    pub fn request(&self) -> anyhow::Result<Request> {
        let query = match self.query.strip_prefix('@') {
            Some(path) => fs::read_to_string(path).map_err(|e| anyhow!("error loading query from {path}:\n{e}"))?,
            None => self.query.clone(),
        };

        let variables = match &self.variables {
            Some(variables) => serde_json::from_str(variables).context("the variables must be a JSON object")?,
            None => Default::default(),
        };

        let request = Request::new(query).variables(variables);

        Ok(match &self.operation_name {
            Some(operation_name) => request.operation_name(operation_name),
            None => request,
        })
    }
}
