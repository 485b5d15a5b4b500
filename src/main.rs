use anyhow::Result;
use clap::Parser;
use ghbi::install::{InstallRequest, assets, install};
use ghbi::platform::{Platform, detect};
use std::path::PathBuf;

/// ghbi - GitHub Binary Installer
///
/// Find the release asset built for this machine, unpack the executable
/// inside it and drop it into a bin directory.
///
/// If the GITHUB_TOKEN environment variable is set, it will be used for authentication.
/// This is useful for accessing private repositories or avoiding rate limits.
///
/// Examples:
///   ghbi install cli/cli                 # Latest gh from cli/cli
///   ghbi install sops --tag v3.9.0       # Search for the repository by name
///   ghbi detect trivy_0.53.0_Linux-64bit.tar.gz
#[derive(Parser, Debug)]
#[command(author, version = env!("GHBI_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory executables are installed into (default: ~/.local/bin)
    #[arg(
        long = "dir",
        short = 'd',
        env = "GHBI_INSTALL_DIR",
        value_name = "PATH",
        global = true
    )]
    pub install_dir: Option<PathBuf>,

    /// GitHub API URL (defaults to https://api.github.com)
    #[arg(long = "api-url", value_name = "URL", global = true)]
    pub api_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Install the executable from a release
    Install(InstallArgs),

    /// Print the platform detected from asset file names
    Detect(DetectArgs),

    /// List a release's assets and the one that would be installed
    Assets(AssetsArgs),
}

#[derive(clap::Args, Debug)]
pub struct ReleaseArgs {
    /// "owner/repo", or a project name to search for
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Release tag (default: latest release)
    #[arg(long)]
    pub tag: Option<String>,

    /// Target platform as os/arch (default: this machine)
    #[arg(long, value_name = "OS/ARCH")]
    pub platform: Option<Platform>,
}

#[derive(clap::Args, Debug)]
pub struct InstallArgs {
    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Executable name inside the asset
    #[arg(long, value_name = "NAME")]
    pub exe: Option<String>,

    /// Glob selecting the asset by file name
    #[arg(long = "asset", value_name = "GLOB")]
    pub asset_pattern: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DetectArgs {
    #[arg(value_name = "FILE_NAME", required = true)]
    pub names: Vec<String>,
}

#[derive(clap::Args, Debug)]
pub struct AssetsArgs {
    #[command(flatten)]
    pub release: ReleaseArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ReleaseArgs {
    fn into_request(self) -> InstallRequest {
        InstallRequest {
            name: self.name,
            tag: self.tag,
            platform: self.platform,
            ..Default::default()
        }
    }
}

impl From<InstallArgs> for InstallRequest {
    fn from(args: InstallArgs) -> Self {
        InstallRequest {
            exe: args.exe,
            asset_pattern: args.asset_pattern,
            ..args.release.into_request()
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let runtime = ghbi::runtime::RealRuntime;

    match cli.command {
        Commands::Install(args) => {
            install(runtime, &args.into(), cli.install_dir, cli.api_url).await?
        }
        Commands::Detect(args) => {
            for name in &args.names {
                println!("{}\t{}", name, detect(name));
            }
        }
        Commands::Assets(args) => {
            let json = args.json;
            assets(runtime, &args.release.into_request(), json, cli.api_url).await?
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_install_parsing() {
        let cli = Cli::try_parse_from(["ghbi", "install", "cli/cli"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                let request = InstallRequest::from(args);
                assert_eq!(request.name, "cli/cli");
                assert_eq!(request.tag, None);
                assert_eq!(request.platform, None);
            }
            _ => panic!("Expected Install command"),
        }
        assert_eq!(cli.install_dir, None);
    }

    #[test]
    fn test_cli_install_options() {
        let cli = Cli::try_parse_from([
            "ghbi",
            "install",
            "argo-cd",
            "--tag",
            "v2.11.0",
            "--platform",
            "macos/aarch64",
            "--exe",
            "argocd",
            "--asset",
            "*darwin*",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                let request = InstallRequest::from(args);
                assert_eq!(request.tag.as_deref(), Some("v2.11.0"));
                assert_eq!(request.platform, Some(Platform::new("darwin", "arm64")));
                assert_eq!(request.exe.as_deref(), Some("argocd"));
                assert_eq!(request.asset_pattern.as_deref(), Some("*darwin*"));
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_invalid_platform_fails() {
        let result = Cli::try_parse_from(["ghbi", "install", "cli/cli", "--platform", "plan9"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_global_dir_parsing() {
        let cli = Cli::try_parse_from(["ghbi", "--dir", "/tmp", "install", "cli/cli"]).unwrap();
        assert_eq!(cli.install_dir, Some(PathBuf::from("/tmp")));

        let cli = Cli::try_parse_from(["ghbi", "install", "cli/cli", "-d", "/opt"]).unwrap();
        assert_eq!(cli.install_dir, Some(PathBuf::from("/opt")));
    }

    #[test]
    fn test_cli_detect_parsing() {
        let cli = Cli::try_parse_from(["ghbi", "detect", "a.tar.gz", "b.zip"]).unwrap();
        match cli.command {
            Commands::Detect(args) => assert_eq!(args.names, vec!["a.tar.gz", "b.zip"]),
            _ => panic!("Expected Detect command"),
        }
        assert!(Cli::try_parse_from(["ghbi", "detect"]).is_err());
    }

    #[test]
    fn test_cli_assets_parsing() {
        let cli = Cli::try_parse_from(["ghbi", "assets", "sops", "--json"]).unwrap();
        match cli.command {
            Commands::Assets(args) => {
                assert!(args.json);
                assert_eq!(args.release.name, "sops");
            }
            _ => panic!("Expected Assets command"),
        }
    }

    #[test]
    fn test_cli_no_subcommand_fails() {
        assert!(Cli::try_parse_from(["ghbi", "cli/cli"]).is_err());
    }
}
