//! `tripsheet profile` and profile resolution shared by every command.

use std::fmt;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use tripsheet_reconcile::Profile;

use crate::exit_codes::EXIT_PROFILE_INVALID;
use crate::CliError;

/// File name looked up under `<config_dir>/tripsheet/`.
const USER_PROFILE_FILE: &str = "profile.toml";

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// Print the effective profile as TOML
    #[command(after_help = "\
Examples:
  tripsheet profile show
  tripsheet profile show > ~/.config/tripsheet/profile.toml")]
    Show {
        /// Profile file to print instead of the default lookup
        #[arg(long, env = "TRIPSHEET_PROFILE")]
        profile: Option<PathBuf>,
    },

    /// Parse and validate a profile without merging anything
    #[command(after_help = "\
Examples:
  tripsheet profile validate custom.toml")]
    Validate {
        /// Path to the profile TOML file
        file: PathBuf,
    },
}

/// Where the effective profile came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileSource {
    Explicit(PathBuf),
    User(PathBuf),
    Builtin,
}

impl fmt::Display for ProfileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileSource::Explicit(p) | ProfileSource::User(p) => write!(f, "{}", p.display()),
            ProfileSource::Builtin => write!(f, "built-in"),
        }
    }
}

pub fn cmd_profile(cmd: ProfileCommands) -> Result<(), CliError> {
    match cmd {
        ProfileCommands::Show { profile } => cmd_profile_show(profile),
        ProfileCommands::Validate { file } => cmd_profile_validate(file),
    }
}

/// Resolve the effective profile: an explicit path, then the user profile
/// under the platform config directory, then the built-in profile.
pub fn load_profile(explicit: Option<&Path>) -> Result<(Profile, ProfileSource), CliError> {
    if let Some(path) = explicit {
        let profile = read_profile(path)?;
        return Ok((profile, ProfileSource::Explicit(path.to_path_buf())));
    }

    if let Some(path) = user_profile_path().filter(|p| p.is_file()) {
        let profile = read_profile(&path)?;
        return Ok((profile, ProfileSource::User(path)));
    }

    let profile = Profile::builtin().map_err(|e| profile_err(format!("built-in profile: {e}")))?;
    Ok((profile, ProfileSource::Builtin))
}

fn user_profile_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tripsheet").join(USER_PROFILE_FILE))
}

fn read_profile(path: &Path) -> Result<Profile, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| profile_err(format!("cannot read profile {}: {e}", path.display())))?;
    Profile::from_toml(&text).map_err(|e| {
        profile_err(format!("{}: {e}", path.display()))
            .with_hint("run `tripsheet profile show` for a working starting point")
    })
}

fn profile_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_PROFILE_INVALID, message: msg.into(), hint: None }
}

fn cmd_profile_show(explicit: Option<PathBuf>) -> Result<(), CliError> {
    let (profile, source) = load_profile(explicit.as_deref())?;
    let text = profile.to_toml().map_err(|e| CliError::general(e.to_string()))?;
    eprintln!("# profile: {source}");
    print!("{text}");
    Ok(())
}

fn cmd_profile_validate(file: PathBuf) -> Result<(), CliError> {
    let profile = read_profile(&file)?;
    eprintln!(
        "{}: ok (profile '{}', {} categories, {} families)",
        file.display(),
        profile.name,
        profile.sheet_order.len(),
        profile.families.len(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn explicit_profile_wins() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.toml");
        let mut profile = Profile::builtin().unwrap();
        profile.name = "custom".into();
        std::fs::write(&path, profile.to_toml().unwrap()).unwrap();

        let (loaded, source) = load_profile(Some(&path)).unwrap();
        assert_eq!(loaded.name, "custom");
        assert_eq!(source, ProfileSource::Explicit(path));
    }

    #[test]
    fn missing_explicit_profile_is_a_profile_error() {
        let dir = tempdir().unwrap();
        let err = load_profile(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert_eq!(err.code, EXIT_PROFILE_INVALID);
        assert!(err.message.contains("cannot read profile"), "{}", err.message);
    }

    #[test]
    fn invalid_profile_carries_hint() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "name = \"x\"\n").unwrap();

        let err = load_profile(Some(&path)).unwrap_err();
        assert_eq!(err.code, EXIT_PROFILE_INVALID);
        assert!(err.hint.is_some());
    }

    #[test]
    fn source_display() {
        assert_eq!(ProfileSource::Builtin.to_string(), "built-in");
        assert_eq!(
            ProfileSource::User(PathBuf::from("/home/u/.config/tripsheet/profile.toml")).to_string(),
            "/home/u/.config/tripsheet/profile.toml"
        );
    }
}
