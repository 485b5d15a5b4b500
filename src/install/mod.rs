//! Installing a release binary: find the repository and release, pick the
//! asset, unpack the executable and place it in the install directory.

use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use crate::{
    archive::{ArchiveFile, FileName},
    asset::{AssetPicker, AssetSummary, PatternAssetPicker, PlatformAssetPicker},
    error::Error,
    extract::extract_executable,
    platform::{Platform, detect},
    runtime::Runtime,
    source::{Release, ReleaseHost, RepoId},
};

pub mod config;

use config::Config;

/// Permission bits of an installed executable.
const EXECUTABLE_MODE: u32 = 0o755;

/// What the user asked to install.
#[derive(Debug, Clone, Default)]
pub struct InstallRequest {
    /// `owner/repo` or an approximate project name.
    pub name: String,
    pub tag: Option<String>,
    /// Target platform; the host platform when absent.
    pub platform: Option<Platform>,
    /// Name of the executable inside the asset.
    pub exe: Option<String>,
    /// Glob selecting the asset by name instead of by platform.
    pub asset_pattern: Option<String>,
}

/// Outcome of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installed {
    pub repo: RepoId,
    pub tag: String,
    pub asset: String,
    pub path: PathBuf,
}

#[tracing::instrument(skip(runtime, install_dir, api_url))]
pub async fn install<R: Runtime>(
    runtime: R,
    request: &InstallRequest,
    install_dir: Option<PathBuf>,
    api_url: Option<String>,
) -> Result<()> {
    let config = Config::new(runtime, install_dir, api_url)?;
    let installer = Installer::new(config.runtime, config.host, config.install_dir);

    let installed = installer.install(request).await?;
    println!(
        "installed {} {} -> {}",
        installed.repo,
        installed.tag,
        installed.path.display()
    );
    Ok(())
}

/// Prints a release's assets with their detected platforms, marking the one
/// that would be installed.
#[tracing::instrument(skip(runtime, api_url))]
pub async fn assets<R: Runtime>(
    runtime: R,
    request: &InstallRequest,
    json: bool,
    api_url: Option<String>,
) -> Result<()> {
    // The install directory is irrelevant for listing.
    let config = Config::new(runtime, Some(PathBuf::new()), api_url)?;
    let installer = Installer::new(config.runtime, config.host, config.install_dir);

    let (repo, release, summaries) = installer.describe_assets(request).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{} {}", repo, release.tag);
    for summary in &summaries {
        let marker = if summary.selected { "*" } else { " " };
        println!("{} {:<16} {}", marker, summary.platform, summary.name);
    }
    Ok(())
}

pub struct Installer<R: Runtime, H: ReleaseHost> {
    runtime: R,
    host: H,
    install_dir: PathBuf,
}

impl<R: Runtime, H: ReleaseHost> Installer<R, H> {
    pub fn new(runtime: R, host: H, install_dir: PathBuf) -> Self {
        Self {
            runtime,
            host,
            install_dir,
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn install(&self, request: &InstallRequest) -> Result<Installed> {
        let platform = resolve_platform(request.platform.as_ref())?;
        let repo = self.host.find_repository(&request.name).await?;
        let release = self.host.get_release(&repo, request.tag.clone()).await?;
        info!("Installing {} {} for {}", repo, release.tag, platform);

        let picker = build_picker(request, &platform)?;
        let asset = picker.pick(&release.assets)?;
        info!("Selected asset {}", asset.name);

        let bytes = self.host.download(&asset.download_url).await?;
        let downloaded = ArchiveFile::new(asset.name.clone(), bytes);

        let names = executable_names(request.exe.as_deref(), &repo, &asset.name, &platform);
        let (name, executable) = extract_first(downloaded, &names)?;
        warn_if_not_native(&executable);

        let path = self.place(&name, &executable.content)?;
        Ok(Installed {
            repo,
            tag: release.tag,
            asset: asset.name.to_string(),
            path,
        })
    }

    /// Lists every asset of the requested release with its detected platform.
    #[tracing::instrument(skip(self))]
    pub async fn describe_assets(
        &self,
        request: &InstallRequest,
    ) -> Result<(RepoId, Release, Vec<AssetSummary>)> {
        let platform = resolve_platform(request.platform.as_ref())?;
        let repo = self.host.find_repository(&request.name).await?;
        let release = self.host.get_release(&repo, request.tag.clone()).await?;

        let picker = build_picker(request, &platform)?;
        let selected = match picker.pick(&release.assets) {
            Ok(asset) => Some(asset.name.clone()),
            Err(e) => {
                warn!("{}", e);
                None
            }
        };

        let summaries = release
            .assets
            .iter()
            .map(|asset| AssetSummary {
                name: asset.name.to_string(),
                platform: detect(asset.name.as_str()).to_string(),
                selected: selected.as_ref() == Some(&asset.name),
            })
            .collect();

        Ok((repo, release, summaries))
    }

    /// Writes `content` next to its destination and renames it into place.
    /// On any failure the staging file is removed.
    fn place(&self, name: &str, content: &[u8]) -> Result<PathBuf> {
        self.runtime
            .create_dir_all(&self.install_dir)
            .with_context(|| format!("Failed to create install directory {:?}", self.install_dir))?;

        let dest = self.install_dir.join(name);
        if self.runtime.is_dir(&dest) {
            anyhow::bail!("{:?} is a directory", dest);
        }
        if self.runtime.exists(&dest) {
            info!("Replacing existing {:?}", dest);
        }

        let staging = self.install_dir.join(format!(".{}.download", name));
        debug!("Staging {:?} for {:?}", staging, dest);

        if let Err(e) = self.commit(&staging, &dest, content) {
            if let Err(cleanup) = self.runtime.remove_file(&staging) {
                warn!("Failed to remove {:?}: {}", staging, cleanup);
            }
            return Err(e);
        }

        info!("Installed {:?}", dest);
        Ok(dest)
    }

    fn commit(&self, staging: &Path, dest: &Path, content: &[u8]) -> Result<()> {
        self.runtime.write(staging, content)?;
        self.runtime.set_permissions(staging, EXECUTABLE_MODE)?;
        self.runtime.rename(staging, dest)
    }
}

fn resolve_platform(requested: Option<&Platform>) -> Result<Platform, Error> {
    let platform = requested.cloned().unwrap_or_else(Platform::host);
    if !platform.is_known() {
        return Err(Error::PlatformUndetected(platform.to_string()));
    }
    Ok(platform)
}

fn build_picker(request: &InstallRequest, platform: &Platform) -> Result<Box<dyn AssetPicker>> {
    Ok(match &request.asset_pattern {
        Some(pattern) => Box::new(
            PatternAssetPicker::new(pattern)
                .with_context(|| format!("Invalid asset pattern {:?}", pattern))?,
        ),
        None => Box::new(PlatformAssetPicker::new(platform.clone())),
    })
}

/// Candidate names for the executable, most likely first: the explicit name,
/// or the repository name followed by the name the asset starts with.
fn executable_names(
    explicit: Option<&str>,
    repo: &RepoId,
    asset: &FileName,
    platform: &Platform,
) -> Vec<String> {
    let mut names: Vec<String> = match explicit {
        Some(name) => vec![name.to_string()],
        None => std::iter::once(repo.repo.clone())
            .chain(infer_executable_name(asset))
            .collect(),
    };

    if platform.os == "windows" {
        for name in names.iter_mut() {
            if !name.to_lowercase().ends_with(".exe") {
                name.push_str(".exe");
            }
        }
    }

    names.dedup();
    names
}

/// `gh_2.52.0_linux_amd64.tar.gz` -> `gh`
fn infer_executable_name(asset: &FileName) -> Option<String> {
    let prefix = asset.as_str().split(['_', '-', '.']).next()?;
    (!prefix.is_empty()).then(|| prefix.to_string())
}

/// Extracts the first of `names` present in the asset. Only a missing archive
/// member moves on to the next name.
fn extract_first(downloaded: ArchiveFile, names: &[String]) -> Result<(String, ArchiveFile)> {
    let mut last_missing = None;

    for name in names {
        match extract_executable(downloaded.clone(), name) {
            Ok(file) => return Ok((name.clone(), file)),
            Err(e @ Error::MemberNotFound { .. }) => {
                debug!("{}", e);
                last_missing = Some(e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(last_missing
        .map(anyhow::Error::from)
        .unwrap_or_else(|| anyhow::anyhow!("No executable name to look for")))
}

/// Naming decides what is executable; this only flags payloads that no
/// loader would accept.
fn warn_if_not_native(file: &ArchiveFile) {
    match goblin::Object::parse(&file.content) {
        Ok(goblin::Object::Elf(_)) | Ok(goblin::Object::Mach(_)) | Ok(goblin::Object::PE(_)) => {}
        _ => warn!(
            "{} is not an ELF, Mach-O or PE binary; installing anyway",
            file.name
        ),
    }
}
