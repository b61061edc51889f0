mod output;
mod query;

use anyhow::Context;
use anyhow::Result;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use imds_core::ImdsClient;
use imds_core::ImdsConfig;
use imds_core::Namespace;
use imds_core::docs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

pub use query::QueryOptions;

/// Query the Amazon EC2 Instance Metadata Service (IMDS).
///
/// https://docs.aws.amazon.com/AWSEC2/latest/UserGuide/ec2-instance-metadata.html
#[derive(Debug, Parser)]
#[command(
    name = "imds",
    version,
    args_conflicts_with_subcommands = true,
    after_help = "Examples:\n  imds meta-data/placement/region\n  imds region\n  imds /meta-data/network --recurse\n  imds md placement -r -w"
)]
pub struct Cli {
    #[command(subcommand)]
    pub namespace: Option<NamespaceCommand>,

    /// Metadata path, or a bare key name such as `region`.
    #[arg(value_name = "PATH", num_args = 0..)]
    pub path: Vec<String>,

    #[clap(flatten)]
    pub options: GlobalOptions,
}

#[derive(Debug, Subcommand)]
pub enum NamespaceCommand {
    /// Retrieve meta-data information.
    #[command(name = "meta-data", visible_alias = "md")]
    MetaData(PathArgs),

    /// Retrieve dynamic data.
    #[command(name = "dynamic", visible_alias = "dyn")]
    Dynamic(PathArgs),

    /// Retrieve user-data.
    #[command(name = "user-data", visible_alias = "ud")]
    UserData(PathArgs),
}

impl NamespaceCommand {
    fn namespace(&self) -> Namespace {
        match self {
            Self::MetaData(_) => Namespace::MetaData,
            Self::Dynamic(_) => Namespace::Dynamic,
            Self::UserData(_) => Namespace::UserData,
        }
    }

    fn path(&self) -> &[String] {
        match self {
            Self::MetaData(args) | Self::Dynamic(args) | Self::UserData(args) => &args.path,
        }
    }
}

#[derive(Debug, Args)]
pub struct PathArgs {
    /// Path below the namespace.
    #[arg(value_name = "PATH", num_args = 0..)]
    pub path: Vec<String>,
}

#[derive(Debug, Args)]
pub struct GlobalOptions {
    /// Recurse down metadata paths and print every sub-path as one JSON document.
    #[arg(short = 'r', long = "recurse", global = true)]
    pub recurse: bool,

    /// Keep polling the recursed path and print each change.
    #[arg(short = 'w', long = "watch", global = true, requires = "recurse")]
    pub watch: bool,

    /// List the documented paths instead of querying the service.
    #[arg(short = 'p', long = "paths", global = true)]
    pub paths: bool,

    /// Metadata service endpoint. Overrides the config file and environment.
    #[arg(short = 'e', long = "endpoint", value_name = "URL", global = true)]
    pub endpoint: Option<String>,

    /// Config file to load instead of `$IMDS_HOME/config.toml`.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Log request details to stderr.
    #[arg(long = "verbose", global = true)]
    pub verbose: bool,
}

impl Cli {
    /// The requested path with the subcommand's namespace prepended and
    /// surrounding slashes removed.
    pub fn requested_path(&self) -> String {
        match &self.namespace {
            Some(command) => {
                let rest = join_path(command.path());
                if rest.is_empty() {
                    command.namespace().to_string()
                } else {
                    format!("{}/{rest}", command.namespace())
                }
            }
            None => join_path(&self.path),
        }
    }
}

fn join_path(parts: &[String]) -> String {
    parts.join("/").trim_matches('/').to_string()
}

/// Routes logs to stderr so stdout stays machine readable. `RUST_LOG` picks
/// the filter unless `verbose` forces `debug`.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

pub fn load_config(options: &GlobalOptions) -> Result<ImdsConfig> {
    let config = ImdsConfig::load(options.config.as_deref())?;
    Ok(match &options.endpoint {
        Some(endpoint) => config.with_endpoint(endpoint.clone()),
        None => config,
    })
}

pub async fn run(cli: Cli) -> Result<()> {
    if cli.options.paths {
        let docs = match &cli.namespace {
            Some(command) => docs::docs_for(command.namespace()),
            None => docs::all_docs(),
        };
        return output::print_paths(&docs);
    }

    let config = load_config(&cli.options)?;
    let endpoint = config.endpoint.clone();
    let client = ImdsClient::new(config)
        .with_context(|| format!("unable to create metadata client for {endpoint}"))?;
    let options = QueryOptions {
        recurse: cli.options.recurse,
        watch: cli.options.watch,
        bare_key_lookup: cli.namespace.is_none(),
    };
    query::run(&client, &cli.requested_path(), options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("imds").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn positional_parts_are_joined() {
        assert_eq!(
            parse(&["/meta-data/", "placement", "region"]).requested_path(),
            "meta-data/placement/region"
        );
        assert_eq!(parse(&[]).requested_path(), "");
    }

    #[test]
    fn subcommands_prefix_their_namespace() {
        assert_eq!(
            parse(&["md", "placement", "region"]).requested_path(),
            "meta-data/placement/region"
        );
        assert_eq!(parse(&["dyn"]).requested_path(), "dynamic");
        assert_eq!(parse(&["user-data"]).requested_path(), "user-data");
    }

    #[test]
    fn global_flags_follow_subcommands() {
        let cli = parse(&["md", "network", "-r", "-w", "-e", "http://localhost:1338"]);
        assert!(cli.options.recurse);
        assert!(cli.options.watch);
        assert_eq!(cli.options.endpoint.as_deref(), Some("http://localhost:1338"));
    }

    #[test]
    fn watch_requires_recurse() {
        assert!(Cli::try_parse_from(["imds", "meta-data", "--watch"]).is_err());
    }

    #[test]
    fn endpoint_flag_overrides_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "endpoint = \"http://from-file:80\"\nmax_suggestions = 3\n").unwrap();
        let cli = parse(&[
            "--config",
            path.to_str().unwrap(),
            "-e",
            "http://from-flag:80",
        ]);
        let config = load_config(&cli.options).unwrap();
        assert_eq!(config.endpoint, "http://from-flag:80");
        assert_eq!(config.max_suggestions, 3);
    }
}
