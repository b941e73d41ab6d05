//! Directory layout resolution for a scope.
//!
//! Pure path construction over an explicit [`Scope`]; no I/O and no
//! environment lookups, so the same scope always yields the same paths.

use std::path::PathBuf;

use crate::types::Scope;

/// Canonical skill storage for a scope: `<base>/.agents/skills`.
pub fn skills_dir(scope: &Scope) -> PathBuf {
    scope.base().join(".agents").join("skills")
}

/// Agent storage for a scope: `<base>/.claude/agents`.
pub fn agents_dir(scope: &Scope) -> PathBuf {
    scope.base().join(".claude").join("agents")
}

/// A platform's configuration directory, whose existence signals the
/// platform is installed at this scope.
pub fn platform_config_dir(scope: &Scope, platform_name: &str) -> PathBuf {
    scope.base().join(format!(".{platform_name}"))
}

/// The directory a platform reads skill links from.
pub fn platform_skills_dir(scope: &Scope, platform_name: &str) -> PathBuf {
    platform_config_dir(scope, platform_name).join("skills")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn layout_contract_holds_for_both_scopes() {
        let global = Scope::Global(PathBuf::from("/home/u"));
        let local = Scope::Local(PathBuf::from("/work/app"));

        assert_eq!(skills_dir(&global), Path::new("/home/u/.agents/skills"));
        assert_eq!(skills_dir(&local), Path::new("/work/app/.agents/skills"));
        assert_eq!(agents_dir(&global), Path::new("/home/u/.claude/agents"));
        assert_eq!(
            platform_skills_dir(&local, "gemini"),
            Path::new("/work/app/.gemini/skills")
        );
        assert_eq!(
            platform_config_dir(&global, "codex"),
            Path::new("/home/u/.codex")
        );
    }

    #[test]
    fn resolution_is_deterministic() {
        let scope = Scope::Local(PathBuf::from("/p"));
        assert_eq!(skills_dir(&scope), skills_dir(&scope));
        assert_eq!(
            platform_skills_dir(&scope, "claude"),
            platform_skills_dir(&scope, "claude")
        );
    }
}
