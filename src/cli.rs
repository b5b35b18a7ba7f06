use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Directory holding the stored catalog (default: $LINKCART_DATA_DIR or `.linkcart`).
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Metadata resolve endpoint (default: $LINKCART_RESOLVER_URL).
    #[arg(long, global = true)]
    pub resolver_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Add(AddArgs),
    List(ListArgs),
    Remove(RemoveArgs),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add(_) => "add",
            Self::List(_) => "list",
            Self::Remove(_) => "remove",
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    /// Product link to resolve and store.
    pub link: String,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only show products whose title contains this text (case-insensitive).
    #[arg(long, default_value = "")]
    pub search: String,

    /// Print the visible products as a JSON array.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Position in the list printed by `list` with the same `--search`.
    pub index: usize,

    /// Search term the index refers to.
    #[arg(long, default_value = "")]
    pub search: String,
}
