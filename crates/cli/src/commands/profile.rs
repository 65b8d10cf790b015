//! Profile management commands
//!
//! A profile names an endpoint together with the credentials and client
//! settings used to reach it.

use clap::Subcommand;
use serde::Serialize;

use s3kit_core::profile::AddressingStyle;
use s3kit_core::{ConfigManager, Error, Profile, ProfileManager};

use super::{Context, fail};
use crate::exit_code::ExitCode;

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List(ListArgs),

    /// Remove a profile
    Remove(RemoveArgs),
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "default", "minio", "aws")
    pub name: String,

    /// Endpoint URL (e.g., "http://localhost:9000", "https://s3.amazonaws.com")
    pub endpoint: String,

    /// Access key ID
    pub access_key: String,

    /// Secret access key
    pub secret_key: String,

    /// Region used for signing
    #[arg(long, default_value = "us-east-1")]
    pub region: String,

    /// Bucket addressing: auto, path, or virtual (alias: dns)
    #[arg(long, default_value = "auto")]
    pub addressing_style: String,

    /// Make this the default profile
    #[arg(long)]
    pub default: bool,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Show region and addressing style
    #[arg(short, long)]
    pub long: bool,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

/// Profile information for output; credentials are never included
#[derive(Debug, Serialize)]
struct ProfileInfo {
    name: String,
    endpoint: String,
    region: String,
    addressing_style: String,
    default: bool,
}

impl ProfileInfo {
    fn new(profile: &Profile, default: Option<&str>) -> Self {
        Self {
            name: profile.name.clone(),
            endpoint: profile
                .client
                .endpoint_url()
                .unwrap_or_else(|| "(aws)".to_string()),
            region: profile.client.region.clone(),
            addressing_style: format!("{:?}", profile.client.addressing_style).to_lowercase(),
            default: default == Some(profile.name.as_str()),
        }
    }
}

#[derive(Debug, Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Build the profile described by `profile set`
fn build_profile(args: &SetArgs) -> Result<Profile, Error> {
    if args.name.is_empty() {
        return Err(Error::InvalidArgument("profile name cannot be empty".into()));
    }
    let mut profile = Profile::new(&args.name, &args.endpoint, &args.access_key, &args.secret_key)?;
    profile.client.region = args.region.clone();
    profile.client.addressing_style = args.addressing_style.parse::<AddressingStyle>()?;
    Ok(profile)
}

pub async fn execute(cmd: ProfileCommands, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let config_manager = match ConfigManager::new() {
        Ok(manager) => manager,
        Err(e) => return fail(&formatter, "Failed to locate configuration", &e),
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, config_manager, ctx),
        ProfileCommands::List(args) => execute_list(args, config_manager, ctx),
        ProfileCommands::Remove(args) => execute_remove(args, config_manager, ctx),
    }
}

fn execute_set(args: SetArgs, config_manager: ConfigManager, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let profile = match build_profile(&args) {
        Ok(profile) => profile,
        Err(e) => return fail(&formatter, "Invalid profile", &e),
    };

    let result = (|| {
        let mut config = config_manager.load()?;
        config.profiles.retain(|p| p.name != profile.name);
        config.profiles.push(profile);
        if args.default {
            config.defaults.profile = Some(args.name.clone());
        }
        config_manager.save(&config)
    })();

    match result {
        Ok(()) => {
            let message = format!("Profile '{}' configured successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Failed to save profile", &e),
    }
}

fn execute_list(args: ListArgs, config_manager: ConfigManager, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let config = match config_manager.load() {
        Ok(config) => config,
        Err(e) => return fail(&formatter, "Failed to load profiles", &e),
    };
    let default = config.defaults.profile.as_deref();
    let infos: Vec<ProfileInfo> = config
        .profiles
        .iter()
        .map(|p| ProfileInfo::new(p, default))
        .collect();

    if formatter.is_json() {
        formatter.json(&serde_json::json!({ "profiles": infos }));
    } else if infos.is_empty() {
        formatter.println("No profiles configured.");
    } else {
        let marker = |info: &ProfileInfo| {
            if info.default {
                format!("{} *", info.name)
            } else {
                info.name.clone()
            }
        };
        let table = if args.long {
            formatter.table(
                &["NAME", "ENDPOINT", "REGION", "ADDRESSING"],
                infos.iter().map(|i| {
                    vec![
                        marker(i),
                        i.endpoint.clone(),
                        i.region.clone(),
                        i.addressing_style.clone(),
                    ]
                }),
            )
        } else {
            formatter.table(
                &["NAME", "ENDPOINT"],
                infos.iter().map(|i| vec![marker(i), i.endpoint.clone()]),
            )
        };
        formatter.println(&table);
    }
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, config_manager: ConfigManager, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let manager = ProfileManager::with_config_manager(config_manager);

    match manager.remove(&args.name) {
        Ok(()) => {
            let message = format!("Profile '{}' removed successfully", args.name);
            if formatter.is_json() {
                formatter.json(&ProfileOperationOutput {
                    success: true,
                    profile: args.name,
                    message,
                });
            } else {
                formatter.success(&message);
            }
            ExitCode::Success
        }
        Err(Error::Config(_)) => {
            formatter.error(&format!("Profile '{}' not found", args.name));
            ExitCode::NotFound
        }
        Err(e) => fail(&formatter, "Failed to remove profile", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(addressing_style: &str) -> SetArgs {
        SetArgs {
            name: "minio".to_string(),
            endpoint: "http://localhost:9000".to_string(),
            access_key: "accesskey".to_string(),
            secret_key: "secretkey".to_string(),
            region: "eu-central-1".to_string(),
            addressing_style: addressing_style.to_string(),
            default: false,
        }
    }

    #[test]
    fn test_build_profile() {
        let profile = build_profile(&args("dns")).unwrap();
        assert_eq!(profile.name, "minio");
        assert_eq!(profile.client.region, "eu-central-1");
        assert_eq!(profile.client.addressing_style, AddressingStyle::Virtual);
        assert_eq!(profile.client.endpoint.as_deref(), Some("localhost:9000"));
    }

    #[test]
    fn test_build_profile_rejects_bad_style() {
        assert!(matches!(
            build_profile(&args("sideways")),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_profile_info_hides_credentials() {
        let profile = build_profile(&args("path")).unwrap();
        let info = ProfileInfo::new(&profile, Some("minio"));
        assert!(info.default);
        assert_eq!(info.endpoint, "http://localhost:9000");
        assert_eq!(info.addressing_style, "path");

        let json = serde_json::to_string(&info).unwrap();
        assert!(!json.contains("secretkey"));
    }
}
