use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tower_credential_type::params::{parse_flag, parse_structured_arg};
use tower_credential_type::{DesiredState, ReconcileParams, ReconcileReport};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Create, update, or destroy an Ansible Tower / AWX credential type
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file holding the full configuration object. Flags override its values.
    #[arg(long, value_name = "FILE")]
    params_file: Option<PathBuf>,

    /// Name of the credential type
    #[arg(short, long)]
    name: Option<String>,

    /// Arbitrary description
    #[arg(short, long)]
    description: Option<String>,

    /// Desired state of the resource [default: present]
    #[arg(short, long, value_enum)]
    state: Option<DesiredState>,

    /// Kind of credential type: ssh, vault, net, scm, cloud or insights
    #[arg(short, long)]
    kind: Option<String>,

    /// Input schema as inline JSON, or @path to a JSON file
    #[arg(long, value_name = "JSON")]
    inputs: Option<String>,

    /// Injector definitions as inline JSON, or @path to a JSON file
    #[arg(long, value_name = "JSON")]
    injectors: Option<String>,

    /// Only check that Tower is reachable; change nothing
    #[arg(long)]
    check: bool,

    /// Tower host, with or without scheme
    #[arg(long, env = "TOWER_HOST")]
    tower_host: Option<String>,

    #[arg(long, env = "TOWER_USERNAME")]
    tower_username: Option<String>,

    #[arg(long, env = "TOWER_PASSWORD", hide_env_values = true)]
    tower_password: Option<String>,

    /// OAuth2 token; takes precedence over username/password
    #[arg(long, env = "TOWER_OAUTH_TOKEN", hide_env_values = true)]
    tower_oauthtoken: Option<String>,

    /// Verify the server's TLS certificate
    #[arg(
        long,
        env = "TOWER_VERIFY_SSL",
        alias = "tower-verify-ssl",
        value_parser = parse_flag
    )]
    validate_certs: Option<bool>,

    /// tower-cli config file; when given it is the only source of connection settings
    #[arg(long, value_name = "FILE")]
    tower_config_file: Option<PathBuf>,

    /// Increase log verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    async fn into_params(self) -> anyhow::Result<ReconcileParams> {
        let base = match &self.params_file {
            Some(path) => ReconcileParams::from_file(path).await?,
            None => ReconcileParams::default(),
        };

        let inputs = match &self.inputs {
            Some(raw) => Some(parse_structured_arg("inputs", raw).await?),
            None => None,
        };
        let injectors = match &self.injectors {
            Some(raw) => Some(parse_structured_arg("injectors", raw).await?),
            None => None,
        };

        Ok(base.overlay(ReconcileParams {
            name: self.name,
            description: self.description,
            state: self.state,
            kind: self.kind,
            inputs,
            injectors,
            check_mode: self.check,
            tower_host: self.tower_host,
            tower_username: self.tower_username,
            tower_password: self.tower_password,
            tower_oauthtoken: self.tower_oauthtoken,
            validate_certs: self.validate_certs,
            tower_config_file: self.tower_config_file,
        }))
    }
}

fn init_tracing(verbose: u8) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout is reserved for the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

async fn run(args: Args) -> anyhow::Result<ReconcileReport> {
    let params = args.into_params().await?;
    Ok(tower_credential_type::run(params).await?)
}

/// Bad flags or env values still produce a JSON failure record.
/// Help and version requests are printed by clap as usual.
fn parse_args<I, T>(argv: I) -> Result<Args, ReconcileReport>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Args::try_parse_from(argv).map_err(|e| match e.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayVersion
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => e.exit(),
        _ => ReconcileReport::failure(e.to_string().trim().to_string()),
    })
}

fn print_report(report: &ReconcileReport) -> ExitCode {
    match serde_json::to_string(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Failed to serialize result: {}", e);
            return ExitCode::FAILURE;
        }
    }

    if report.is_failure() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = match parse_args(std::env::args_os()) {
        Ok(args) => args,
        Err(report) => return print_report(&report),
    };

    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let report = match run(args).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Aborting");
            ReconcileReport::failure(format!("{:#}", e))
        }
    };

    print_report(&report)
}
