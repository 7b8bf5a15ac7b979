//! generate rust declarations from a graphql schema and operation documents
//!
//! the schema comes from a live endpoint (`--endpoint`, introspection) or an
//! sdl file (`--schema`). operations are read from every file matching
//! `--operations`. nothing is written unless the whole run succeeds.

use clap::Parser;
use gqlcodegen::{
    codegen, Client, ClientConfig, Error, Generator, GeneratorConfig, Result, ScalarNullability,
    TypeNameMapper,
};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// generate typed rust declarations from a graphql schema and operations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// graphql endpoint to introspect
    #[arg(short = 'E', long, conflicts_with = "schema", required_unless_present = "schema")]
    endpoint: Option<String>,

    /// extra request header as `Name: value` (repeatable)
    #[arg(short = 'H', long = "header", requires = "endpoint")]
    headers: Vec<String>,

    /// request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// schema definition language file
    #[arg(long)]
    schema: Option<PathBuf>,

    /// glob matching operation documents, e.g. 'queries/**/*.graphql'
    #[arg(long)]
    operations: Option<String>,

    /// generated rust file
    #[arg(long, default_value = "schema.rs")]
    out: PathBuf,

    /// also write the canonical schema sdl here
    #[arg(long)]
    schema_out: Option<PathBuf>,

    /// emit every schema type, not only the ones operations use
    #[arg(long)]
    full: bool,

    /// print builtin scalars, directives, and `__` types in the sdl
    #[arg(long)]
    emit_builtins: bool,

    /// keep `__` introspection types when building the schema
    #[arg(long)]
    include_builtins: bool,

    /// map a scalar to a rust type as `NAME=TYPE` (repeatable)
    #[arg(long = "scalar", value_parser = parse_scalar)]
    scalars: Vec<(String, String)>,

    /// rust type for scalars without a mapping
    #[arg(long)]
    fallback: Option<String>,

    /// treat bare introspected scalar leaves as non-null
    #[arg(long)]
    non_null_scalars: bool,
}

fn parse_scalar(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, target) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TYPE, got {raw:?}"))?;
    let (name, target) = (name.trim(), target.trim());
    if name.is_empty() || target.is_empty() {
        return Err(format!("expected NAME=TYPE, got {raw:?}"));
    }
    Ok((name.to_string(), target.to_string()))
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("gqlcodegen: {err}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = generator_config(&cli);
    let generator = Generator::new(config.clone());

    let schema = match (&cli.schema, &cli.endpoint) {
        (Some(path), _) => {
            debug!(path = %path.display(), "reading schema");
            let sdl = fs::read_to_string(path)?;
            generator.schema_from_sdl(&sdl)?
        }
        (None, Some(endpoint)) => {
            let mut client_config =
                ClientConfig::new(endpoint).with_timeout(Duration::from_secs(cli.timeout));
            for header in &cli.headers {
                client_config = client_config.with_raw_header(header)?;
            }
            let payload = Client::new(client_config)?.introspect().await?;
            generator.schema_from_introspection(payload)?
        }
        (None, None) => {
            return Err(Error::Config(
                "either --endpoint or --schema is required".to_string(),
            ))
        }
    };

    let sources = read_operations(cli.operations.as_deref())?;
    let document = generator.parse_documents(&sources)?;
    let generation = generator.generate(schema, &document)?;
    let rust = codegen::emit(&generation, &config)?;

    let mut outputs = vec![(cli.out.as_path(), rust.as_str())];
    if let Some(path) = &cli.schema_out {
        outputs.push((path.as_path(), generation.schema_text.as_str()));
    }
    write_outputs(&outputs)?;
    if let Some(path) = &cli.schema_out {
        info!(path = %path.display(), "wrote schema");
    }
    info!(
        path = %cli.out.display(),
        operations = generation.operations.len(),
        "wrote rust declarations"
    );
    Ok(())
}

fn generator_config(cli: &Cli) -> GeneratorConfig {
    let mut type_map = TypeNameMapper::default();
    if let Some(fallback) = &cli.fallback {
        type_map = type_map.with_fallback(fallback.clone());
    }
    for (name, target) in &cli.scalars {
        type_map = type_map.with_mapping(name.clone(), target.clone());
    }

    let scalars = if cli.non_null_scalars {
        ScalarNullability::NonNull
    } else {
        ScalarNullability::Nullable
    };

    GeneratorConfig::default()
        .with_full_schema(cli.full)
        .with_emit_builtins(cli.emit_builtins)
        .with_include_builtins(cli.include_builtins)
        .with_scalar_nullability(scalars)
        .with_type_map(type_map)
}

/// write every file beside its target, then rename them all into place
fn write_outputs(outputs: &[(&Path, &str)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(outputs.len());
    for (path, contents) in outputs {
        let tmp = staging_path(path);
        if let Err(err) = fs::write(&tmp, contents) {
            for (tmp, _) in &staged {
                let _ = fs::remove_file(tmp);
            }
            return Err(err.into());
        }
        staged.push((tmp, *path));
    }
    for (tmp, path) in &staged {
        fs::rename(tmp, path)?;
    }
    Ok(())
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_operations(pattern: Option<&str>) -> Result<Vec<String>> {
    let Some(pattern) = pattern else {
        return Ok(Vec::new());
    };
    let paths = glob::glob(pattern)
        .map_err(|err| Error::Config(format!("invalid operations pattern {pattern:?}: {err}")))?;

    let mut sources = Vec::new();
    for entry in paths {
        let path = entry.map_err(|err| Error::Io(err.into_error()))?;
        debug!(path = %path.display(), "reading operations");
        sources.push(fs::read_to_string(&path)?);
    }
    if sources.is_empty() {
        warn!(pattern, "no operation documents matched");
    }
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        assert_eq!(
            parse_scalar("DateTime = chrono::NaiveDateTime").unwrap(),
            ("DateTime".to_string(), "chrono::NaiveDateTime".to_string())
        );
        assert!(parse_scalar("DateTime").is_err());
        assert!(parse_scalar("=String").is_err());
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "gqlcodegen",
            "-E",
            "https://example.com/graphql",
            "-H",
            "Authorization: Bearer x",
            "--scalar",
            "JSON=serde_json::Value",
            "--non-null-scalars",
            "--full",
        ])
        .unwrap();
        assert_eq!(cli.out, PathBuf::from("schema.rs"));
        assert_eq!(cli.headers.len(), 1);

        let config = generator_config(&cli);
        assert!(config.include_full_schema);
        assert_eq!(config.scalar_nullability, ScalarNullability::NonNull);
        assert_eq!(config.type_map.map("JSON"), "serde_json::Value");
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("gqlcodegen-{name}-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_outputs_are_written_together() {
        let dir = scratch_dir("write");
        let out = dir.join("schema.rs");
        let sdl = dir.join("schema.graphql");
        write_outputs(&[
            (out.as_path(), "rust"),
            (sdl.as_path(), "type Query { a: Int }"),
        ])
        .unwrap();

        assert_eq!(fs::read_to_string(&out).unwrap(), "rust");
        assert_eq!(fs::read_to_string(&sdl).unwrap(), "type Query { a: Int }");
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 2);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = scratch_dir("fail");
        let out = dir.join("schema.rs");
        let sdl = dir.join("missing").join("schema.graphql");
        assert!(write_outputs(&[(out.as_path(), "rust"), (sdl.as_path(), "sdl")]).is_err());

        assert!(!out.exists());
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_source_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["gqlcodegen"]).is_err());
        assert!(Cli::try_parse_from([
            "gqlcodegen",
            "--schema",
            "schema.graphql",
            "--endpoint",
            "http://localhost/graphql",
        ])
        .is_err());
        assert!(Cli::try_parse_from(["gqlcodegen", "--schema", "schema.graphql"]).is_ok());
    }
}
