//! Build identity: package version plus the git state it was built from.
//!
//! Source tarball builds carry no git metadata; every git field then
//! reads "unknown".

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Git branch at build time.
pub const GIT_BRANCH: &str = match option_env!("VERGEN_GIT_BRANCH") {
    Some(branch) => branch,
    None => "unknown",
};

/// Git commit SHA at build time.
pub const GIT_SHA: &str = match option_env!("VERGEN_GIT_SHA") {
    Some(sha) => sha,
    None => "unknown",
};

pub fn git_dirty() -> bool {
    option_env!("VERGEN_GIT_DIRTY") == Some("true")
}

fn short_sha() -> String {
    GIT_SHA.chars().take(7).collect()
}

/// `{version}+{branch}.{sha}`, with a `.dirty` suffix for modified trees,
/// e.g. `0.3.0+main.abc1234`.
pub fn version_string() -> String {
    let dirty_suffix = if git_dirty() { ".dirty" } else { "" };
    format!("{PKG_VERSION}+{GIT_BRANCH}.{}{dirty_suffix}", short_sha())
}

/// `User-Agent` sent to the row store: `courtside/{version} ({sha})`.
pub fn user_agent() -> String {
    format!("courtside/{PKG_VERSION} ({})", short_sha())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_string_starts_with_pkg_version() {
        assert!(version_string().starts_with(PKG_VERSION));
        assert!(version_string().contains(GIT_BRANCH));
    }

    #[test]
    fn user_agent_names_crate_and_version() {
        let agent = user_agent();
        assert!(agent.starts_with("courtside/"));
        assert!(agent.contains(PKG_VERSION));
    }
}
