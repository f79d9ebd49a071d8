//! Version control operations on the vendored toolchain.

use std::path::Path;

use anyhow::{Context, Result};
use git2::build::CheckoutBuilder;
use git2::{FetchOptions, Repository, ResetType};
use url::Url;

/// Clone and update operations the toolchain manager needs.
pub trait Vcs {
    /// Clone `branch` of `url` into `dest` with a history depth of one.
    ///
    /// `dest` must not exist.
    fn shallow_clone(&self, url: &Url, branch: &str, dest: &Path) -> Result<()>;

    /// Bring an existing checkout to the latest `origin/<branch>`.
    fn pull(&self, checkout: &Path, branch: &str) -> Result<()>;
}

/// [`Vcs`] backed by libgit2.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitVcs;

fn shallow_fetch_options<'a>() -> FetchOptions<'a> {
    let mut options = FetchOptions::new();
    options.depth(1);
    options
}

/// Refspec tracking only `branch` of `origin`.
fn branch_refspec(branch: &str) -> String {
    format!("+refs/heads/{0}:refs/remotes/origin/{0}", branch)
}

/// Clone only `branch` of `url` into `dest` and check it out.
fn clone_branch(
    url: &str,
    branch: &str,
    dest: &Path,
    mut options: FetchOptions<'_>,
) -> Result<()> {
    let repo = Repository::init(dest)
        .with_context(|| format!("failed to create repository: {}", dest.display()))?;

    let refspec = branch_refspec(branch);
    let mut remote = repo.remote_with_fetch("origin", url, &refspec)?;
    remote
        .fetch(&[refspec.as_str()], Some(&mut options), None)
        .with_context(|| format!("failed to fetch origin/{}", branch))?;

    let tip = repo
        .find_reference(&format!("refs/remotes/origin/{}", branch))
        .with_context(|| format!("branch `{}` not found on origin", branch))?
        .peel_to_commit()?;

    let mut local = repo.branch(branch, &tip, false)?;
    local.set_upstream(Some(format!("origin/{}", branch).as_str()))?;
    repo.set_head(&format!("refs/heads/{}", branch))?;
    repo.checkout_head(Some(CheckoutBuilder::new().force()))?;

    Ok(())
}

impl Vcs for GitVcs {
    fn shallow_clone(&self, url: &Url, branch: &str, dest: &Path) -> Result<()> {
        tracing::info!("Cloning {} ({}) into {}", url, branch, dest.display());

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory: {}", parent.display()))?;
        }

        clone_branch(url.as_str(), branch, dest, shallow_fetch_options())
            .with_context(|| format!("failed to clone {}", url))
    }

    fn pull(&self, checkout: &Path, branch: &str) -> Result<()> {
        tracing::info!("Updating {} to origin/{}", checkout.display(), branch);

        let repo = Repository::open(checkout)
            .with_context(|| format!("failed to open git repository: {}", checkout.display()))?;

        // No depth here: the fetch extends the existing shallow history so the
        // new tip still descends from the local one.
        let refspec = branch_refspec(branch);
        let mut remote = repo
            .find_remote("origin")
            .context("checkout has no `origin` remote")?;
        remote
            .fetch(&[refspec.as_str()], None, None)
            .with_context(|| format!("failed to fetch origin/{}", branch))?;

        let tip = repo
            .find_reference(&format!("refs/remotes/origin/{}", branch))
            .with_context(|| format!("branch `{}` not found on origin", branch))?
            .peel_to_commit()?;

        let head = repo.head().ok().and_then(|h| h.target());
        if head == Some(tip.id()) {
            tracing::info!("Already up to date");
            return Ok(());
        }

        // The checkout is managed: local edits are discarded.
        let refname = format!("refs/heads/{}", branch);
        repo.reference(&refname, tip.id(), true, "macbuild: update")?;
        repo.set_head(&refname)?;
        repo.reset(tip.as_object(), ResetType::Hard, Some(CheckoutBuilder::new().force()))?;

        tracing::info!("Updated to {}", tip.id());
        Ok(())
    }
}
