use clap::Parser;

use crate::transport::{Params, params};

#[derive(Parser, Debug)]
#[command(name = "remote-collection")]
#[command(version)]
#[command(about = "Browse paginated REST collections", long_about = None)]
#[command(after_help = "Examples:\n  \
  remote-collection /accounts                      list all accounts\n  \
  remote-collection -n 10 /accounts/1/lists        list the first 10 lists\n  \
  remote-collection -i 150 -j /accounts/1/lists    print the list at offset 150\n  \
  remote-collection -f name=weekly /accounts/1/lists   find lists by name")]
pub struct Cli {
    /// Collection URL, relative to the API base or absolute
    #[arg(value_name = "URL")]
    pub url: String,

    /// Stop listing after N entries
    #[arg(short = 'n', value_name = "N")]
    pub limit: Option<usize>,

    /// Print the entry at OFFSET
    #[arg(short = 'i', value_name = "OFFSET")]
    pub offset: Option<usize>,

    /// Print the entry with this id
    #[arg(long = "id", value_name = "ID")]
    pub id: Option<String>,

    /// Find entries matching KEY=VALUE (repeatable)
    #[arg(short = 'f', value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub find: Vec<(String, String)>,

    /// Create an entry with fields KEY=VALUE (repeatable)
    #[arg(short = 'c', value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub create: Vec<(String, String)>,

    /// Print the parent entry of the collection
    #[arg(short = 'P')]
    pub parent: bool,

    /// Override the API base URL
    #[arg(long = "api-base", value_name = "URL")]
    pub api_base: Option<String>,

    /// Print full JSON payloads
    #[arg(short = 'j')]
    pub json: bool,

    /// Verbose logging
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Quiet mode
    #[arg(short = 'q')]
    pub quiet: bool,
}

impl Cli {
    pub fn find_criteria(&self) -> Params {
        params(self.find.iter().cloned())
    }

    pub fn create_fields(&self) -> Params {
        params(self.create.iter().cloned())
    }

    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        }
    }
}

fn parse_key_value(arg: &str) -> Result<(String, String), String> {
    arg.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, got `{arg}`"))
}
