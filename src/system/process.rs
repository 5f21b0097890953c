use std::collections::HashSet;
use std::process::Command;

use tracing::debug;

use crate::focus::registry;

/// 最大20階層まで遡る
const MAX_DEPTH: usize = 20;

/// 親プロセスを遡って呼び出し元のターミナル/エディタを検出
///
/// Returns a TERM_PROGRAM style name. Falls back to `$TERM_PROGRAM` when no
/// known application is found in the ancestry.
pub fn detect_caller_app() -> Option<String> {
    walk_ancestors(std::process::id(), read_process_entry)
        .or_else(|| std::env::var("TERM_PROGRAM").ok().filter(|s| !s.is_empty()))
}

/// One `ps` row: parent pid and command name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub ppid: u32,
    pub comm: String,
}

fn read_process_entry(pid: u32) -> Option<ProcessEntry> {
    let output = Command::new("ps")
        .args(["-o", "ppid=,comm=", "-p", &pid.to_string()])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    parse_ps_line(&String::from_utf8_lossy(&output.stdout))
}

fn parse_ps_line(line: &str) -> Option<ProcessEntry> {
    let line = line.trim();
    let (ppid, comm) = line.split_once(char::is_whitespace)?;
    Some(ProcessEntry {
        ppid: ppid.trim().parse().ok()?,
        comm: comm.trim().to_string(),
    })
}

/// `lookup` で親を辿り、既知のアプリ名に当たったら返す
fn walk_ancestors<F>(start: u32, lookup: F) -> Option<String>
where
    F: Fn(u32) -> Option<ProcessEntry>,
{
    let mut visited = HashSet::new();
    let mut pid = start;

    for _ in 0..MAX_DEPTH {
        if !visited.insert(pid) {
            break;
        }
        let parent_pid = lookup(pid)?.ppid;
        if parent_pid <= 1 {
            break;
        }
        let parent = lookup(parent_pid)?;
        if let Some(program) = registry::term_program_for_process(&parent.comm) {
            debug!("Caller detected: {} (pid {})", program, parent_pid);
            return Some(program.to_string());
        }
        pid = parent_pid;
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn table(rows: &[(u32, u32, &str)]) -> HashMap<u32, ProcessEntry> {
        rows.iter()
            .map(|(pid, ppid, comm)| {
                (
                    *pid,
                    ProcessEntry {
                        ppid: *ppid,
                        comm: comm.to_string(),
                    },
                )
            })
            .collect()
    }

    #[test]
    fn test_parse_ps_line() {
        assert_eq!(
            parse_ps_line("  4242 /Applications/iTerm.app/Contents/MacOS/iTerm2\n"),
            Some(ProcessEntry {
                ppid: 4242,
                comm: "/Applications/iTerm.app/Contents/MacOS/iTerm2".to_string()
            })
        );
        assert_eq!(parse_ps_line(""), None);
        assert_eq!(parse_ps_line("abc zsh"), None);
    }

    #[test]
    fn test_walk_finds_terminal() {
        let procs = table(&[
            (100, 90, "peekaboo"),
            (90, 80, "zsh"),
            (80, 70, "tmux"),
            (70, 1, "kitty"),
        ]);
        let found = walk_ancestors(100, |pid| procs.get(&pid).cloned());
        assert_eq!(found.as_deref(), Some("tmux"));
    }

    #[test]
    fn test_walk_stops_at_init_and_cycles() {
        let procs = table(&[(100, 90, "peekaboo"), (90, 1, "zsh")]);
        assert_eq!(walk_ancestors(100, |pid| procs.get(&pid).cloned()), None);

        let cyclic = table(&[(10, 20, "sh"), (20, 10, "sh")]);
        assert_eq!(walk_ancestors(10, |pid| cyclic.get(&pid).cloned()), None);
    }
}
