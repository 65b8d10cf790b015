//! tag command - Manage bucket and object tags
//!
//! `s3://bucket` addresses the bucket's tag set, `s3://bucket/key` an
//! object's.

use clap::Subcommand;
use serde::Serialize;

use s3kit_core::model::{
    BucketRequest, ObjectRequest, PutBucketTaggingRequest, PutObjectTaggingRequest, Tag, parse_tag,
};
use s3kit_core::{Result, S3Api as _, S3Url};

use super::{Context, fail, parse_remote};
use crate::exit_code::ExitCode;
use crate::output::Formatter;

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Show tags
    Get(TagPathArgs),

    /// Replace the tag set
    Set(SetArgs),

    /// Remove all tags
    Clear(TagPathArgs),
}

#[derive(clap::Args, Debug)]
pub struct TagPathArgs {
    /// s3://bucket or s3://bucket/key
    pub path: String,

    /// Object version
    #[arg(long)]
    pub version_id: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// s3://bucket or s3://bucket/key
    pub path: String,

    /// Tags as KEY=VALUE
    #[arg(required = true, value_name = "KEY=VALUE")]
    pub tags: Vec<String>,

    /// Object version
    #[arg(long)]
    pub version_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct TagOutput {
    path: String,
    tags: Vec<Tag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version_id: Option<String>,
}

fn object_request(url: &S3Url, version_id: Option<&String>) -> ObjectRequest {
    let request = ObjectRequest::new(&url.bucket, &url.key);
    match version_id {
        Some(version) => request.version(version),
        None => request,
    }
}

fn parse_tags(pairs: &[String]) -> Result<Vec<Tag>> {
    pairs.iter().map(|pair| parse_tag(pair)).collect()
}

pub async fn execute(cmd: TagCommands, ctx: &Context) -> ExitCode {
    let formatter = ctx.formatter();
    let path = match &cmd {
        TagCommands::Get(args) | TagCommands::Clear(args) => &args.path,
        TagCommands::Set(args) => &args.path,
    };
    let url = match parse_remote(path) {
        Ok(url) => url,
        Err(e) => return fail(&formatter, "Invalid path", &e),
    };

    let result = match cmd {
        TagCommands::Get(args) => get_tags(&url, args.version_id.as_ref(), ctx).await,
        TagCommands::Set(args) => set_tags(&url, &args, ctx).await,
        TagCommands::Clear(args) => clear_tags(&url, args.version_id.as_ref(), ctx).await,
    };

    match result {
        Ok(output) => {
            print_tags(&formatter, &output);
            ExitCode::Success
        }
        Err(e) => fail(&formatter, &format!("Tagging {url} failed"), &e),
    }
}

async fn get_tags(url: &S3Url, version_id: Option<&String>, ctx: &Context) -> Result<TagOutput> {
    let client = ctx.client_for(url).await?;
    if url.key.is_empty() {
        let output = client.get_bucket_tagging(BucketRequest::new(&url.bucket)).await?;
        Ok(TagOutput {
            path: url.to_string(),
            tags: output.tags,
            version_id: None,
        })
    } else {
        let output = client.get_object_tagging(object_request(url, version_id)).await?;
        Ok(TagOutput {
            path: url.to_string(),
            tags: output.tags,
            version_id: output.version_id,
        })
    }
}

async fn set_tags(url: &S3Url, args: &SetArgs, ctx: &Context) -> Result<TagOutput> {
    let tags = parse_tags(&args.tags)?;
    let client = ctx.client_for(url).await?;

    let version_id = if url.key.is_empty() {
        let request = PutBucketTaggingRequest {
            bucket: url.bucket.clone(),
            tags: tags.clone(),
        };
        request.validate()?;
        client.put_bucket_tagging(request).await?;
        None
    } else {
        let request = PutObjectTaggingRequest {
            bucket: url.bucket.clone(),
            key: url.key.clone(),
            version_id: args.version_id.clone(),
            tags: tags.clone(),
        };
        request.validate()?;
        client.put_object_tagging(request).await?.version_id
    };

    Ok(TagOutput {
        path: url.to_string(),
        tags,
        version_id,
    })
}

async fn clear_tags(url: &S3Url, version_id: Option<&String>, ctx: &Context) -> Result<TagOutput> {
    let client = ctx.client_for(url).await?;
    let version_id = if url.key.is_empty() {
        client.delete_bucket_tagging(BucketRequest::new(&url.bucket)).await?;
        None
    } else {
        client
            .delete_object_tagging(object_request(url, version_id))
            .await?
            .version_id
    };
    Ok(TagOutput {
        path: url.to_string(),
        tags: Vec::new(),
        version_id,
    })
}

fn print_tags(formatter: &Formatter, output: &TagOutput) {
    if formatter.is_json() {
        formatter.json(output);
    } else if output.tags.is_empty() {
        formatter.println(&format!("{}: no tags", output.path));
    } else {
        let table = formatter.table(
            &["KEY", "VALUE"],
            output.tags.iter().map(|t| vec![t.key.clone(), t.value.clone()]),
        );
        formatter.println(&table);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        let tags = parse_tags(&["env=prod".into(), "team=".into(), "flag".into()]).unwrap();
        assert_eq!(
            tags,
            vec![Tag::new("env", "prod"), Tag::new("team", ""), Tag::new("flag", "")]
        );
        assert!(parse_tags(&["=x".into()]).is_err());
    }

    #[test]
    fn test_object_request_version() {
        let url = S3Url::parse("s3://bucket/key").unwrap();
        let version = "v2".to_string();
        let request = object_request(&url, Some(&version));
        assert_eq!(request.version_id.as_deref(), Some("v2"));
        assert_eq!(object_request(&url, None).version_id, None);
    }
}
