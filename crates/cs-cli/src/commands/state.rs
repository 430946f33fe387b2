//! State token commands.

use std::sync::Arc;

use cs_state::{AuthenticationProperties, ProtectedPropertiesFormat, SecureDataFormat};
use serde::Serialize;
use tabled::Tabled;

use super::{build_codec, open_cache, protection_provider};
use crate::cli::{PropertiesArgs, StateCommand};
use crate::config::{Backend, CliConfig, OutputFormat};
use crate::output::{output, output_value, warning};
use crate::CliError;

/// A single property.
#[derive(Debug, Serialize, Tabled)]
pub struct PropertyRow {
    /// Item key.
    pub key: String,
    /// Item value.
    pub value: String,
}

/// Token length for one format.
#[derive(Debug, Serialize, Tabled)]
pub struct SizeRow {
    /// Format name.
    pub format: &'static str,
    /// Token length in characters.
    pub length: usize,
}

/// Runs a state command.
pub async fn run_state(
    cmd: StateCommand,
    config: &CliConfig,
    backend: Option<Backend>,
    redis_url: Option<&str>,
    format: OutputFormat,
) -> crate::CliResult<()> {
    match cmd {
        StateCommand::Encode(args) => {
            if config.effective_backend(backend) == Backend::Memory {
                warning("memory backend: the token will not decode in another invocation");
            }
            encode(config, backend, redis_url, &args, format).await
        }
        StateCommand::Decode { token, purpose } => {
            decode(config, backend, redis_url, &token, purpose.as_deref(), format).await
        }
        StateCommand::Roundtrip(args) => roundtrip(config, backend, redis_url, &args, format).await,
    }
}

/// Builds properties from command-line arguments.
pub fn properties_from_args(args: &PropertiesArgs) -> AuthenticationProperties {
    let mut props: AuthenticationProperties = args.items.iter().cloned().collect();
    if let Some(uri) = &args.redirect_uri {
        props.set_redirect_uri(Some(uri.clone()));
    }
    props
}

/// Converts properties into display rows.
pub fn property_rows(props: &AuthenticationProperties) -> Vec<PropertyRow> {
    props
        .items()
        .iter()
        .map(|(key, value)| PropertyRow {
            key: key.clone(),
            value: value.clone(),
        })
        .collect()
}

async fn encode(
    config: &CliConfig,
    backend: Option<Backend>,
    redis_url: Option<&str>,
    args: &PropertiesArgs,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let provider = protection_provider(config)?;
    let cache = open_cache(config, backend, redis_url).await?;
    let codec = build_codec(config, &provider, cache);

    let token = codec
        .encode(&properties_from_args(args), args.purpose.as_deref())
        .await?;
    output_value("token", &token, format)
}

async fn decode(
    config: &CliConfig,
    backend: Option<Backend>,
    redis_url: Option<&str>,
    token: &str,
    purpose: Option<&str>,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let provider = protection_provider(config)?;
    let cache = open_cache(config, backend, redis_url).await?;
    let codec = build_codec(config, &provider, cache);

    let props = codec.decode(token, purpose).await?;
    print_properties(&props, format)
}

async fn roundtrip(
    config: &CliConfig,
    backend: Option<Backend>,
    redis_url: Option<&str>,
    args: &PropertiesArgs,
    format: OutputFormat,
) -> crate::CliResult<()> {
    let provider = protection_provider(config)?;
    let cache = open_cache(config, backend, redis_url).await?;
    let codec = build_codec(config, &provider, cache);
    let full = ProtectedPropertiesFormat::new(Arc::new(
        provider.create_protector_chain(&config.state.purposes),
    ));

    let props = properties_from_args(args);
    let purpose = args.purpose.as_deref();
    let sizes = compare_sizes(&codec, &full, &props, purpose).await?;
    output(&sizes, format)
}

/// Round-trips `props` through both formats and reports token lengths.
pub async fn compare_sizes(
    cached: &dyn SecureDataFormat<AuthenticationProperties>,
    full: &dyn SecureDataFormat<AuthenticationProperties>,
    props: &AuthenticationProperties,
    purpose: Option<&str>,
) -> crate::CliResult<Vec<SizeRow>> {
    let mut rows = Vec::with_capacity(2);
    for (name, format) in [("cached", cached), ("full payload", full)] {
        let token = format.protect(props, purpose).await?;
        let restored = format.unprotect(&token, purpose).await?;
        if &restored != props {
            return Err(CliError::Verification(format!(
                "{name} format returned different properties"
            )));
        }
        tracing::debug!(format = name, length = token.len(), "round trip ok");
        rows.push(SizeRow {
            format: name,
            length: token.len(),
        });
    }
    Ok(rows)
}

fn print_properties(props: &AuthenticationProperties, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(props.items())?);
            Ok(())
        }
        _ => output(&property_rows(props), format),
    }
}
