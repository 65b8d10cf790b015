//! CLI command definitions and execution
//!
//! Every command resolves a profile, builds an [`S3Client`] for the URLs it
//! was given, and maps library errors onto process exit codes.

use clap::{Parser, Subcommand};

use s3kit_client::S3Client;
use s3kit_core::s3url::region_from_endpoint;
use s3kit_core::{
    ClientConfig, Config, ConfigManager, Credentials, Error, Location, Profile, Result, S3Url,
    friendly_error_code, parse_location, sanitize_url,
};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod cat;
pub mod completions;
mod cp;
mod ls;
mod mb;
mod presign;
mod profile;
mod rb;
mod rm;
mod sql;
mod stat;
mod tag;
mod version;

/// Profile used when none is named and no default is configured
pub const DEFAULT_PROFILE: &str = "default";

/// s3kit - command-line client for S3 and S3-compatible storage
///
/// Paths are `s3://[access_key:secret_key:][endpoint/]bucket/key` URLs or
/// local paths.
#[derive(Parser, Debug)]
#[command(name = "s3kit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    /// Connection profile to use
    #[arg(short, long, global = true, env = "S3KIT_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage connection profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// List buckets and objects
    Ls(ls::LsArgs),

    /// Create a bucket
    Mb(mb::MbArgs),

    /// Remove a bucket
    Rb(rb::RbArgs),

    /// Display object contents
    Cat(cat::CatArgs),

    /// Show bucket or object metadata
    Stat(stat::StatArgs),

    /// Copy files and objects (local<->S3, S3<->S3)
    Cp(cp::CpArgs),

    /// Remove objects
    Rm(rm::RmArgs),

    /// Generate a presigned URL
    Presign(presign::PresignArgs),

    /// Run an S3 Select query over an object
    Sql(sql::SqlArgs),

    /// Manage bucket and object tags
    #[command(subcommand)]
    Tag(tag::TagCommands),

    /// Manage bucket versioning
    #[command(subcommand)]
    Version(version::VersionCommands),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Settings shared by every command
#[derive(Debug, Clone, Default)]
pub struct Context {
    pub output: OutputConfig,
    pub profile: Option<String>,
}

impl Context {
    pub fn formatter(&self) -> Formatter {
        Formatter::new(self.output.clone())
    }

    fn load_config() -> Result<Config> {
        ConfigManager::new()?.load()
    }

    /// Client for bucket-independent calls such as ListBuckets
    pub async fn client(&self) -> Result<S3Client> {
        let profile = select_profile(&Self::load_config()?, self.profile.as_deref())?;
        S3Client::from_profile(&profile).await
    }

    /// Client for a URL; the URL's endpoint and credentials win over the profile's
    pub async fn client_for(&self, url: &S3Url) -> Result<S3Client> {
        let profile = select_profile(&Self::load_config()?, self.profile.as_deref())?;
        let (credentials, config) = apply_url(profile, url)?;
        tracing::debug!(url = %url, endpoint = ?config.endpoint, "connecting");
        S3Client::new(credentials, config).await
    }
}

/// The named profile, else the configured default, else `default`, else an
/// unnamed profile using credentials from the environment
pub fn select_profile(config: &Config, requested: Option<&str>) -> Result<Profile> {
    let named = requested
        .map(str::to_string)
        .or_else(|| config.defaults.profile.clone());

    if let Some(name) = named {
        return config
            .profiles
            .iter()
            .find(|p| p.name == name)
            .cloned()
            .ok_or_else(|| Error::Config(format!("profile not found: {name}")));
    }

    Ok(config
        .profiles
        .iter()
        .find(|p| p.name == DEFAULT_PROFILE)
        .cloned()
        .unwrap_or_else(|| Profile {
            name: DEFAULT_PROFILE.to_string(),
            credentials: Credentials::from_env(),
            client: ClientConfig::default(),
        }))
}

/// Overlay what a URL carries onto a profile
pub fn apply_url(profile: Profile, url: &S3Url) -> Result<(Option<Credentials>, ClientConfig)> {
    let mut config = profile.client;
    if let Some(endpoint) = &url.endpoint {
        config.set_endpoint(endpoint)?;
        if endpoint.contains("amazonaws.com") {
            config.region = region_from_endpoint(endpoint);
        }
    }
    let credentials = url.credentials.clone().or(profile.credentials);
    Ok((credentials, config))
}

/// Report an error and turn it into an exit code
pub(crate) fn fail(formatter: &Formatter, context: &str, error: &Error) -> ExitCode {
    formatter.error(&failure_message(context, error));
    ExitCode::from_error(error)
}

/// Service errors collapse to their S3 error code when one is recognised
fn failure_message(context: &str, error: &Error) -> String {
    let full = error.to_string();
    match error {
        Error::Auth(_) | Error::NotFound(_) | Error::Network(_) | Error::Service { .. } => {
            let code = friendly_error_code(&full);
            if code == full {
                format!("{context}: {full}")
            } else {
                format!("{context}: {code}")
            }
        }
        _ => format!("{context}: {full}"),
    }
}

/// Parse a path that must be an `s3://` URL
pub(crate) fn parse_remote(path: &str) -> Result<S3Url> {
    match parse_location(path)? {
        Location::Remote(url) => Ok(url),
        Location::Local(_) => Err(Error::InvalidUrl(format!(
            "expected an s3:// URL, got '{}'",
            sanitize_url(path)
        ))),
    }
}

/// Parse a path that must name an object
pub(crate) fn parse_object(path: &str) -> Result<S3Url> {
    let url = parse_remote(path)?;
    if url.key.is_empty() {
        return Err(Error::InvalidUrl(format!("{url} names a bucket, not an object")));
    }
    Ok(url)
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let ctx = Context {
        output: OutputConfig {
            json: cli.json,
            no_color: cli.no_color,
            no_progress: cli.no_progress,
            quiet: cli.quiet,
        },
        profile: cli.profile,
    };

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, &ctx).await,
        Commands::Ls(args) => ls::execute(args, &ctx).await,
        Commands::Mb(args) => mb::execute(args, &ctx).await,
        Commands::Rb(args) => rb::execute(args, &ctx).await,
        Commands::Cat(args) => cat::execute(args, &ctx).await,
        Commands::Stat(args) => stat::execute(args, &ctx).await,
        Commands::Cp(args) => cp::execute(args, &ctx).await,
        Commands::Rm(args) => rm::execute(args, &ctx).await,
        Commands::Presign(args) => presign::execute(args, &ctx).await,
        Commands::Sql(args) => sql::execute(args, &ctx).await,
        Commands::Tag(cmd) => tag::execute(cmd, &ctx).await,
        Commands::Version(cmd) => version::execute(cmd, &ctx).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(profiles: Vec<Profile>, default: Option<&str>) -> Config {
        let mut config = Config::default();
        config.profiles = profiles;
        config.defaults.profile = default.map(str::to_string);
        config
    }

    fn profile(name: &str, endpoint: &str) -> Profile {
        Profile::new(name, endpoint, "AKID", "secret").unwrap()
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from(["s3kit", "--json", "-p", "minio", "ls", "s3://bucket"]).unwrap();
        assert!(cli.json);
        assert_eq!(cli.profile.as_deref(), Some("minio"));
        assert!(matches!(cli.command, Commands::Ls(_)));
    }

    #[test]
    fn test_failure_message_uses_service_code() {
        let error = Error::from_service("NoSuchKey", "The specified key does not exist.", 404);
        assert_eq!(
            failure_message("Failed to read s3://bucket/a.txt", &error),
            "Failed to read s3://bucket/a.txt: NoSuchKey"
        );

        let error = Error::from_service("Forbidden", "", 400);
        assert!(
            failure_message("Failed to list s3://bucket", &error)
                .starts_with("Failed to list s3://bucket: 403 Forbidden.")
        );

        let error = Error::Network("request for bucket timed out".into());
        assert_eq!(
            failure_message("Failed to stat s3://bucket", &error),
            "Failed to stat s3://bucket: Network error: request for bucket timed out"
        );

        // Local errors keep their full text
        let error = Error::InvalidUrl("NoSuchKey".into());
        assert_eq!(failure_message("ls", &error), "ls: Invalid URL: NoSuchKey");
    }

    #[test]
    fn test_select_profile_order() {
        let config = config_with(
            vec![
                profile("default", "http://localhost:9000"),
                profile("other", "http://other:9000"),
            ],
            None,
        );
        assert_eq!(select_profile(&config, None).unwrap().name, "default");
        assert_eq!(select_profile(&config, Some("other")).unwrap().name, "other");
        assert!(matches!(
            select_profile(&config, Some("missing")),
            Err(Error::Config(_))
        ));

        let config = config_with(vec![profile("other", "http://other:9000")], Some("other"));
        assert_eq!(select_profile(&config, None).unwrap().name, "other");
    }

    #[test]
    fn test_select_profile_without_config() {
        let profile = select_profile(&Config::default(), None).unwrap();
        assert_eq!(profile.client, ClientConfig::default());
    }

    #[test]
    fn test_apply_url_overrides() {
        let base = profile("default", "http://localhost:9000");

        let url = S3Url::parse("s3://bucket/key").unwrap();
        let (creds, config) = apply_url(base.clone(), &url).unwrap();
        assert_eq!(creds.unwrap().access_key_id, "AKID");
        assert_eq!(config.endpoint.as_deref(), Some("localhost:9000"));

        let url = S3Url::parse("s3://KEY:SECRET:s3.eu-west-2.amazonaws.com/bucket/key").unwrap();
        let (creds, config) = apply_url(base, &url).unwrap();
        assert_eq!(creds.unwrap().access_key_id, "KEY");
        assert_eq!(config.endpoint.as_deref(), Some("s3.eu-west-2.amazonaws.com"));
        assert_eq!(config.region, "eu-west-2");
    }

    #[test]
    fn test_parse_object() {
        assert!(parse_object("s3://bucket/key").is_ok());
        assert!(matches!(parse_object("s3://bucket"), Err(Error::InvalidUrl(_))));
        assert!(matches!(parse_remote("./local"), Err(Error::InvalidUrl(_))));
    }
}
