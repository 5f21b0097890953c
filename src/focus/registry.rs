//! Known terminal and IDE applications
//!
//! Maps `TERM_PROGRAM` style names (what callers report as `callerApp`) to
//! application bundle identifiers used by the window raisers.

/// ターミナルアプリ: TERM_PROGRAM名 → バンドルID
const TERMINALS: &[(&str, &str)] = &[
    ("vscode", "com.microsoft.VSCode"),
    ("VSCode", "com.microsoft.VSCode"),
    ("iTerm.app", "com.googlecode.iterm2"),
    ("Apple_Terminal", "com.apple.Terminal"),
    ("WarpTerminal", "dev.warp.Warp-Stable"),
    ("Hyper", "co.zeit.hyper"),
    ("Alacritty", "org.alacritty"),
    ("kitty", "net.kovidgoyal.kitty"),
    ("Tabby", "org.tabby"),
    ("ghostty", "com.mitchellh.ghostty"),
    ("Ghostty", "com.mitchellh.ghostty"),
    ("tmux", "com.apple.Terminal"),
];

/// JetBrains IDE: TERM_PROGRAM名 → バンドルID
const JETBRAINS: &[(&str, &str)] = &[
    ("idea", "com.jetbrains.intellij"),
    ("appcode", "com.jetbrains.AppCode"),
    ("clion", "com.jetbrains.CLion"),
    ("webstorm", "com.jetbrains.WebStorm"),
    ("pycharm", "com.jetbrains.pycharm"),
    ("phpstorm", "com.jetbrains.PhpStorm"),
    ("goland", "com.jetbrains.goland"),
    ("rubymine", "com.jetbrains.rubymine"),
    ("rider", "com.jetbrains.rider"),
    ("datagrip", "com.jetbrains.datagrip"),
    ("fleet", "com.jetbrains.fleet"),
];

/// Bundle ids not reachable through a TERM_PROGRAM name but still worth trying
const EXTRA_BUNDLE_IDS: &[&str] = &[
    "com.microsoft.VSCodeInsiders",
    "com.jetbrains.intellij.ce",
    "com.jetbrains.pycharm.ce",
];

fn all_mappings() -> impl Iterator<Item = &'static (&'static str, &'static str)> {
    TERMINALS.iter().chain(JETBRAINS.iter())
}

/// Bundle id for an exact TERM_PROGRAM name
pub fn bundle_id_for(term_program: &str) -> Option<&'static str> {
    all_mappings()
        .find(|(name, _)| *name == term_program)
        .map(|(_, id)| *id)
}

/// Candidate bundle ids for a caller: the exact mapping first, then every
/// case-insensitive match, without duplicates
pub fn candidates_for(caller_app: &str) -> Vec<&'static str> {
    let mut ids = Vec::new();
    if let Some(id) = bundle_id_for(caller_app) {
        ids.push(id);
    }
    let lower = caller_app.to_lowercase();
    for (name, id) in all_mappings() {
        if name.to_lowercase() == lower && !ids.contains(id) {
            ids.push(*id);
        }
    }
    ids
}

/// Every known terminal and IDE bundle id, deduplicated, in registry order
pub fn all_bundle_ids() -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = Vec::new();
    for id in all_mappings().map(|(_, id)| *id).chain(EXTRA_BUNDLE_IDS.iter().copied()) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Whether a process name belongs to a known terminal or IDE
///
/// Used by caller detection when walking the process tree.
pub fn term_program_for_process(process_name: &str) -> Option<&'static str> {
    const PROCESS_NAMES: &[(&str, &str)] = &[
        ("Code", "vscode"),
        ("Code Helper", "vscode"),
        ("code", "vscode"),
        ("iTerm2", "iTerm.app"),
        ("Terminal", "Apple_Terminal"),
        ("Warp", "WarpTerminal"),
        ("stable", "WarpTerminal"),
        ("Hyper", "Hyper"),
        ("alacritty", "Alacritty"),
        ("kitty", "kitty"),
        ("Tabby", "Tabby"),
        ("ghostty", "ghostty"),
        ("tmux", "tmux"),
        ("idea", "idea"),
        ("clion", "clion"),
        ("webstorm", "webstorm"),
        ("pycharm", "pycharm"),
        ("phpstorm", "phpstorm"),
        ("goland", "goland"),
        ("rubymine", "rubymine"),
        ("rider", "rider"),
        ("datagrip", "datagrip"),
    ];

    let base = process_name.rsplit('/').next().unwrap_or(process_name);
    PROCESS_NAMES
        .iter()
        .find(|(name, _)| base.eq_ignore_ascii_case(name))
        .map(|(_, program)| *program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_and_case_insensitive_candidates() {
        assert_eq!(candidates_for("iTerm.app"), vec!["com.googlecode.iterm2"]);
        assert_eq!(candidates_for("ITERM.APP"), vec!["com.googlecode.iterm2"]);
        assert_eq!(candidates_for("VSCode"), vec!["com.microsoft.VSCode"]);
        assert!(candidates_for("emacs").is_empty());
    }

    #[test]
    fn test_all_bundle_ids_are_unique() {
        let ids = all_bundle_ids();
        let mut sorted = ids.clone();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.len(), ids.len());
        assert!(ids.contains(&"com.jetbrains.fleet"));
        assert!(ids.contains(&"com.microsoft.VSCodeInsiders"));
    }

    #[test]
    fn test_process_names() {
        assert_eq!(
            term_program_for_process("/Applications/iTerm.app/Contents/MacOS/iTerm2"),
            Some("iTerm.app")
        );
        assert_eq!(term_program_for_process("Alacritty"), Some("Alacritty"));
        assert_eq!(term_program_for_process("zsh"), None);
    }
}
