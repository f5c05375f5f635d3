mod config;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use config::{CliOverrides, ConfigMerger};
use fs_err as fs;
use stampkit_core::ShellGitPort;
use stampkit_core::adapters::FsWritePort;
use stampkit_core::pipeline::{ToolError, run_describe, run_stamp, write_stamp_artifacts};
use stampkit_core::report::{StampStatus, ToolInfo};
use stampkit_core::settings::StampSettings;
use stampkit_identity::{Provider, UserInfo, parse_user_info};
use std::io::Read;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Parser)]
#[command(
    name = "stampkit",
    version,
    about = "Stamp git-tag versions into Cargo manifests before a build."
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run pre-build hooks: replace the version placeholder with the git version (default: dry-run).
    Stamp(StampArgs),
    /// Print the version resolved from git tags.
    Describe(DescribeArgs),
    /// Print username, full name and email from an identity provider's userinfo document.
    Userinfo(UserinfoArgs),
}

#[derive(Debug, Args)]
struct ResolveArgs {
    /// Repository root (default: current directory).
    #[arg(long, default_value = ".")]
    repo_root: Utf8PathBuf,

    /// Prefix stripped from tags before parsing (default: "v").
    #[arg(long)]
    tag_prefix: Option<String>,

    /// Glob for `git describe --match` (default: "<prefix>[0-9]*").
    #[arg(long = "match")]
    match_pattern: Option<String>,

    /// Pre-release identifier appended when the work tree has local changes.
    #[arg(long)]
    dirty_suffix: Option<String>,
}

#[derive(Debug, Args)]
struct StampArgs {
    #[command(flatten)]
    resolve: ResolveArgs,

    /// Manifest to stamp, relative to the repository root (default: Cargo.toml).
    #[arg(long)]
    manifest: Option<Utf8PathBuf>,

    /// Placeholder token to replace, matched case-insensitively (default: "$git").
    #[arg(long)]
    placeholder: Option<String>,

    /// Output directory for stamp artifacts (default: <repo_root>/artifacts/stampkit).
    #[arg(long)]
    out_dir: Option<Utf8PathBuf>,

    /// Write the stamped version to the manifest. If omitted, only emits artifacts.
    #[arg(long, default_value_t = false)]
    apply: bool,
}

#[derive(Debug, Args)]
struct DescribeArgs {
    #[command(flatten)]
    resolve: ResolveArgs,
}

#[derive(Debug, Args)]
struct UserinfoArgs {
    /// Identity provider that produced the document (oidc, github).
    #[arg(long)]
    provider: Provider,

    /// Userinfo JSON document (default: stdin).
    file: Option<Utf8PathBuf>,

    /// Output format (text, json).
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> ExitCode {
    match real_main() {
        Ok(code) => code,
        Err(e) => {
            error!("{:?}", e);
            ExitCode::from(1)
        }
    }
}

fn real_main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Stamp(args) => cmd_stamp(args),
        Command::Describe(args) => cmd_describe(args),
        Command::Userinfo(args) => cmd_userinfo(args),
    }
}

fn merged_settings(
    resolve: ResolveArgs,
    overrides: impl FnOnce(CliOverrides) -> CliOverrides,
) -> anyhow::Result<StampSettings> {
    let file_config =
        config::load_or_default(&resolve.repo_root).context("load stampkit.toml config")?;
    let cli = overrides(CliOverrides {
        repo_root: resolve.repo_root,
        tag_prefix: resolve.tag_prefix,
        match_pattern: resolve.match_pattern,
        dirty_suffix: resolve.dirty_suffix,
        ..Default::default()
    });
    let settings = ConfigMerger::new(file_config).merge(cli);
    debug!(
        "merged config: manifest={}, placeholder={}, tag_prefix={}, match={:?}, dirty_suffix={:?}, dry_run={}",
        settings.manifest,
        settings.placeholder,
        settings.tag_prefix,
        settings.match_pattern,
        settings.dirty_suffix,
        settings.dry_run
    );
    Ok(settings)
}

fn cmd_stamp(args: StampArgs) -> anyhow::Result<ExitCode> {
    let settings = merged_settings(args.resolve, |cli| CliOverrides {
        manifest: args.manifest,
        out_dir: args.out_dir,
        placeholder: args.placeholder,
        apply: args.apply,
        ..cli
    })?;

    let outcome = match run_stamp(&settings, &ShellGitPort, tool_info()) {
        Ok(outcome) => outcome,
        Err(ToolError::PolicyBlock(msg)) => {
            error!("policy block: {}", msg);
            return Ok(ExitCode::from(2));
        }
        Err(ToolError::Internal(e)) => return Err(e),
    };

    write_stamp_artifacts(&outcome, &settings.out_dir, &FsWritePort)?;
    info!("wrote stamp artifacts to {}", settings.out_dir);

    let report = &outcome.report;
    let before = &report.build.version_before;
    let after = &report.build.version_after;
    match report.status {
        StampStatus::Unchanged => println!(
            "{}: version {} has no {} placeholder; nothing to stamp",
            report.manifest, before, settings.placeholder
        ),
        StampStatus::Stamped if report.written => {
            println!("{}: {} -> {}", report.manifest, before, after)
        }
        StampStatus::Stamped => println!(
            "{}: {} -> {} (dry-run; pass --apply to write)",
            report.manifest, before, after
        ),
        StampStatus::Warn => println!(
            "{}: could not resolve a version; left at {}",
            report.manifest, before
        ),
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_describe(args: DescribeArgs) -> anyhow::Result<ExitCode> {
    let settings = merged_settings(args.resolve, |cli| cli)?;
    let version = run_describe(&settings, &ShellGitPort).context("resolve version from git")?;
    println!("{}", version);
    Ok(ExitCode::SUCCESS)
}

fn cmd_userinfo(args: UserinfoArgs) -> anyhow::Result<ExitCode> {
    let json = match &args.file {
        Some(path) => fs::read_to_string(path).with_context(|| format!("read {}", path))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("read userinfo from stdin")?;
            buf
        }
    };

    let info = parse_user_info(args.provider, &json)?;
    match args.format {
        OutputFormat::Text => {
            println!("username:  {}", info.username());
            println!("full name: {}", info.full_name());
            println!("email:     {}", info.email());
        }
        OutputFormat::Json => {
            let out = serde_json::json!({
                "provider": args.provider.as_str(),
                "username": info.username(),
                "full_name": info.full_name(),
                "email": info.email(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn tool_info() -> ToolInfo {
    ToolInfo {
        name: "stampkit".to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    }
}
