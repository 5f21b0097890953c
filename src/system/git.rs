use git2::Repository;
use std::path::Path;

/// Git情報（リポジトリ名とブランチ）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    /// 作業ツリーのルート名。Gitリポジトリでなければ cwd のディレクトリ名
    pub repository_name: Option<String>,
    pub branch: Option<String>,
}

impl GitInfo {
    pub fn lookup(cwd: &str) -> Self {
        let path = Path::new(cwd);
        let repo = Repository::discover(path).ok();

        let repository_name = repo
            .as_ref()
            .and_then(|r| r.workdir())
            .and_then(dir_name)
            .or_else(|| dir_name(path));
        let branch = repo.as_ref().and_then(current_branch);

        Self {
            repository_name,
            branch,
        }
    }
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().to_string())
}

/// 現在のブランチ名を取得（detached HEAD は短縮ハッシュ）
fn current_branch(repo: &Repository) -> Option<String> {
    let head = repo.head().ok()?;
    if head.is_branch() {
        head.shorthand().map(|s| s.to_string())
    } else {
        head.target().map(|oid| format!("{:.7}", oid.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;
    use tempfile::tempdir;

    fn commit_initial(repo: &Repository) {
        let sig = Signature::now("peekaboo", "peekaboo@example.com").unwrap();
        let tree_id = repo.index().unwrap().write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
            .unwrap();
    }

    #[test]
    fn test_repository_root_name_and_branch() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("myproject");
        std::fs::create_dir_all(root.join("src/deep")).unwrap();
        let repo = Repository::init(&root).unwrap();
        commit_initial(&repo);

        let head = repo.head().unwrap().peel_to_commit().unwrap();
        repo.branch("feature/x", &head, false).unwrap();
        repo.set_head("refs/heads/feature/x").unwrap();

        let info = GitInfo::lookup(root.join("src/deep").to_str().unwrap());
        assert_eq!(info.repository_name.as_deref(), Some("myproject"));
        assert_eq!(info.branch.as_deref(), Some("feature/x"));
    }

    #[test]
    fn test_plain_directory_uses_basename() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("notes");
        std::fs::create_dir_all(&plain).unwrap();

        let info = GitInfo::lookup(plain.to_str().unwrap());
        assert_eq!(info.repository_name.as_deref(), Some("notes"));
        assert_eq!(info.branch, None);
    }

    #[test]
    fn test_detached_head_is_short_hash() {
        let dir = tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        commit_initial(&repo);
        let oid = repo.head().unwrap().target().unwrap();
        repo.set_head_detached(oid).unwrap();

        let info = GitInfo::lookup(dir.path().to_str().unwrap());
        assert_eq!(info.branch, Some(oid.to_string()[..7].to_string()));
    }
}
