//! Path expression expansion
//!
//! A path expression goes through `~` expansion, then environment variable
//! expansion, then (source side only) glob matching.

use glob::{MatchOptions, Pattern};
use nix::unistd::User;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::env;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    // `*` skips dotfiles, like the shell does
    require_literal_leading_dot: true,
};

/// Expand a path expression into concrete paths.
///
/// Without `allow_globs` the result is always the single expanded path,
/// metacharacters and all. With `allow_globs` the expanded string is a
/// pattern and every existing match is returned; no match means an empty
/// result. Relative patterns are matched under `base`.
///
/// # Example
/// ```
/// use dotsync::paths::expand;
/// use std::path::Path;
///
/// let paths = expand("config/*.toml", false, Path::new("/srv/dotfiles"));
/// assert_eq!(paths, vec!["config/*.toml".to_string()]);
/// ```
pub fn expand(expression: &str, allow_globs: bool, base: &Path) -> Vec<String> {
    let expanded = expand_vars(&expand_home(expression)).into_owned();
    if !allow_globs {
        return vec![expanded];
    }

    let pattern = if Path::new(&expanded).is_absolute() {
        expanded.clone()
    } else {
        let escaped_base = Pattern::escape(&base.to_string_lossy());
        format!("{}/{}", escaped_base.trim_end_matches('/'), expanded)
    };

    match glob::glob_with(&pattern, GLOB_OPTIONS) {
        Ok(matches) => matches
            .filter_map(Result::ok)
            .map(|path| path.to_string_lossy().into_owned())
            .collect(),
        Err(err) => {
            tracing::debug!(pattern = %pattern, error = %err, "Not a valid glob, using it literally");
            let literal = base.join(&expanded);
            if literal.symlink_metadata().is_ok() {
                vec![literal.to_string_lossy().into_owned()]
            } else {
                Vec::new()
            }
        }
    }
}

/// Expand a leading `~` or `~user`; unknown users are left untouched.
pub fn expand_home(path: &str) -> Cow<'_, str> {
    let Some(rest) = path.strip_prefix('~') else {
        return Cow::Borrowed(path);
    };
    let (user, tail) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    let home = if user.is_empty() {
        dirs::home_dir()
    } else {
        User::from_name(user).ok().flatten().map(|u| u.dir)
    };

    match home {
        Some(home) => {
            let home = home.to_string_lossy();
            let home = if tail.is_empty() {
                home.as_ref()
            } else {
                home.trim_end_matches('/')
            };
            Cow::Owned(format!("{home}{tail}"))
        }
        None => Cow::Borrowed(path),
    }
}

/// Expand `$NAME` and `${NAME}`; unset variables are left literal.
pub fn expand_vars(path: &str) -> Cow<'_, str> {
    if !path.contains('$') {
        return Cow::Borrowed(path);
    }
    var_pattern().replace_all(path, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map_or("", |m| m.as_str());
        env::var(name).unwrap_or_else(|_| caps[0].to_string())
    })
}

fn var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(?:(\w+)|\{([^}]*)\})").expect("variable pattern is a valid regex")
    })
}

/// Absolute, lexically normalized parent of `path`.
///
/// Relative paths are taken relative to `base`. A trailing separator does
/// not count as a level: the parent of `a/b/` is `a`.
pub fn absolute_parent(path: &Path, base: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    normalize(&absolute.join(".."))
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
