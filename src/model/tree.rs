use std::collections::HashMap;

use crate::config::UNKNOWN_REPO;
use crate::model::session::{status_key, Session, Window};
use crate::model::status::{rollup_status, Status};

/// A session with its windows and rolled-up status.
#[derive(Debug, Clone, PartialEq)]
pub struct WorktreeSession {
    pub name: String,
    pub status: Status,
    pub windows: Vec<Window>,
    pub expanded: bool,
}

/// Sessions sharing the same repository.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoGroup {
    pub name: String,
    pub sessions: Vec<WorktreeSession>,
    pub expanded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Repo,
    Session,
    Window,
}

/// One visible row of the flattened tree, addressed by indices into the
/// `RepoGroup` slice it was built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeNode {
    Repo {
        repo: usize,
    },
    Session {
        repo: usize,
        session: usize,
    },
    Window {
        repo: usize,
        session: usize,
        window: usize,
    },
}

impl TreeNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Repo { .. } => NodeKind::Repo,
            Self::Session { .. } => NodeKind::Session,
            Self::Window { .. } => NodeKind::Window,
        }
    }

    pub fn repo_index(&self) -> usize {
        match *self {
            Self::Repo { repo } | Self::Session { repo, .. } | Self::Window { repo, .. } => repo,
        }
    }

    pub fn session_index(&self) -> Option<usize> {
        match *self {
            Self::Repo { .. } => None,
            Self::Session { session, .. } | Self::Window { session, .. } => Some(session),
        }
    }

    pub fn window_index(&self) -> Option<usize> {
        match *self {
            Self::Window { window, .. } => Some(window),
            _ => None,
        }
    }
}

/// Flatten the hierarchy into visible rows, depth-first pre-order.
///
/// Every group yields a repo row. Session rows follow only when the group is
/// expanded, window rows only when the session is expanded too. Must be
/// re-run after any change to `groups` or to an expand flag.
pub fn build_nodes(groups: &[RepoGroup]) -> Vec<TreeNode> {
    let mut nodes = Vec::new();

    for (ri, group) in groups.iter().enumerate() {
        nodes.push(TreeNode::Repo { repo: ri });
        if !group.expanded {
            continue;
        }
        for (si, session) in group.sessions.iter().enumerate() {
            nodes.push(TreeNode::Session {
                repo: ri,
                session: si,
            });
            if !session.expanded {
                continue;
            }
            for wi in 0..session.windows.len() {
                nodes.push(TreeNode::Window {
                    repo: ri,
                    session: si,
                    window: wi,
                });
            }
        }
    }

    nodes
}

/// Carry expand flags from the displayed tree into a freshly fetched one.
///
/// Membership and order come from `fresh`. A repo or session that also
/// existed in `previous` (matched by name) keeps its old flag; anything new
/// keeps the fresh default. Sessions are matched by name across all repos,
/// so a session whose repo changed keeps its flag too.
pub fn merge_expand_state(previous: &[RepoGroup], mut fresh: Vec<RepoGroup>) -> Vec<RepoGroup> {
    let repo_flags: HashMap<&str, bool> = previous
        .iter()
        .map(|g| (g.name.as_str(), g.expanded))
        .collect();
    let session_flags: HashMap<&str, bool> = previous
        .iter()
        .flat_map(|g| g.sessions.iter())
        .map(|s| (s.name.as_str(), s.expanded))
        .collect();

    for group in &mut fresh {
        if let Some(&expanded) = repo_flags.get(group.name.as_str()) {
            group.expanded = expanded;
        }
        for session in &mut group.sessions {
            if let Some(&expanded) = session_flags.get(session.name.as_str()) {
                session.expanded = expanded;
            }
        }
    }

    fresh
}

/// Group polled sessions by repository, in order of first appearance.
///
/// Each session carries only its monitored windows, in listing order; its
/// status is the rollup of those windows. A monitored window missing from `statuses`
/// counts as `Done`. Sessions without a repo entry land in `"Unknown"`.
pub fn group_by_repo(
    sessions: &[Session],
    repo_names: &HashMap<String, String>,
    windows: &HashMap<String, Vec<Window>>,
    statuses: &HashMap<String, Status>,
) -> Vec<RepoGroup> {
    let mut groups: Vec<RepoGroup> = Vec::new();

    for session in sessions {
        let repo = repo_names
            .get(&session.name)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_REPO);
        let wins: Vec<Window> = windows
            .get(&session.name)
            .map(|all| all.iter().filter(|w| w.is_monitored()).cloned().collect())
            .unwrap_or_default();

        let status = rollup_status(wins.iter().map(|w| {
            statuses
                .get(&status_key(&session.name, &w.name))
                .copied()
                .unwrap_or(Status::Done)
        }));

        let entry = WorktreeSession {
            name: session.name.clone(),
            status,
            windows: wins,
            expanded: true,
        };

        match groups.iter_mut().find(|g| g.name == repo) {
            Some(group) => group.sessions.push(entry),
            None => groups.push(RepoGroup {
                name: repo.to_string(),
                sessions: vec![entry],
                expanded: true,
            }),
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn session(name: &str, expanded: bool, windows: Vec<Window>) -> WorktreeSession {
        WorktreeSession {
            name: name.to_string(),
            status: Status::Done,
            windows,
            expanded,
        }
    }

    fn repo(name: &str, expanded: bool, sessions: Vec<WorktreeSession>) -> RepoGroup {
        RepoGroup {
            name: name.to_string(),
            sessions,
            expanded,
        }
    }

    fn sample_groups() -> Vec<RepoGroup> {
        vec![
            repo(
                "my-project",
                true,
                vec![
                    session(
                        "cb:feat-auth",
                        true,
                        vec![Window::new(0, "shell", true), Window::new(1, "claude", false)],
                    ),
                    session("cb:refactor", false, vec![Window::new(0, "shell", true)]),
                ],
            ),
            repo(
                "other-project",
                false,
                vec![session("cb:fix-login", true, vec![Window::new(0, "shell", true)])],
            ),
        ]
    }

    #[test]
    fn build_nodes_pre_order() {
        let nodes = build_nodes(&sample_groups());
        assert_eq!(
            nodes,
            vec![
                TreeNode::Repo { repo: 0 },
                TreeNode::Session { repo: 0, session: 0 },
                TreeNode::Window { repo: 0, session: 0, window: 0 },
                TreeNode::Window { repo: 0, session: 0, window: 1 },
                TreeNode::Session { repo: 0, session: 1 },
                TreeNode::Repo { repo: 1 },
            ]
        );
        let kinds: Vec<NodeKind> = nodes.iter().map(TreeNode::kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Repo,
                NodeKind::Session,
                NodeKind::Window,
                NodeKind::Window,
                NodeKind::Session,
                NodeKind::Repo,
            ]
        );
    }

    #[test]
    fn build_nodes_all_collapsed() {
        let groups = vec![repo("repo-a", false, vec![]), repo("repo-b", false, vec![])];
        assert_eq!(build_nodes(&groups).len(), 2);
    }

    #[test]
    fn build_nodes_empty() {
        assert!(build_nodes(&[]).is_empty());
    }

    #[test]
    fn collapsed_session_still_listed_under_expanded_repo() {
        let groups = vec![repo(
            "r",
            true,
            vec![session("cb:a", false, vec![Window::new(0, "claude", true)])],
        )];
        assert_eq!(
            build_nodes(&groups),
            vec![TreeNode::Repo { repo: 0 }, TreeNode::Session { repo: 0, session: 0 }]
        );
    }

    #[test]
    fn expanded_session_hidden_by_collapsed_repo() {
        let groups = vec![repo(
            "r",
            false,
            vec![session("cb:a", true, vec![Window::new(0, "claude", true)])],
        )];
        assert_eq!(build_nodes(&groups), vec![TreeNode::Repo { repo: 0 }]);
    }

    #[test]
    fn build_nodes_is_idempotent() {
        let groups = sample_groups();
        assert_eq!(build_nodes(&groups), build_nodes(&groups));
    }

    #[test]
    fn node_indices_resolve() {
        let groups = sample_groups();
        for node in build_nodes(&groups) {
            let g = &groups[node.repo_index()];
            if let Some(si) = node.session_index() {
                let s = &g.sessions[si];
                if let Some(wi) = node.window_index() {
                    assert!(wi < s.windows.len());
                }
            }
        }
    }

    #[test]
    fn merge_keeps_collapsed_repo_and_defaults_new_ones() {
        let previous = vec![repo("my-project", false, vec![])];
        let fresh = vec![repo("my-project", true, vec![]), repo("new-project", true, vec![])];

        let merged = merge_expand_state(&previous, fresh);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].name, "my-project");
        assert!(!merged[0].expanded);
        assert_eq!(merged[1].name, "new-project");
        assert!(merged[1].expanded);
    }

    #[test]
    fn merge_keeps_session_flags_and_drops_vanished_entities() {
        let previous = vec![repo(
            "my-project",
            true,
            vec![session("cb:a", false, vec![]), session("cb:gone", false, vec![])],
        )];
        let fresh = vec![repo(
            "my-project",
            true,
            vec![session("cb:a", true, vec![]), session("cb:b", true, vec![])],
        )];

        let merged = merge_expand_state(&previous, fresh);
        let names: Vec<(&str, bool)> = merged[0]
            .sessions
            .iter()
            .map(|s| (s.name.as_str(), s.expanded))
            .collect();
        assert_eq!(names, vec![("cb:a", false), ("cb:b", true)]);
    }

    #[test]
    fn merge_follows_session_into_new_repo() {
        let previous = vec![repo("old", true, vec![session("cb:a", false, vec![])])];
        let fresh = vec![repo("new", true, vec![session("cb:a", true, vec![])])];
        let merged = merge_expand_state(&previous, fresh);
        assert!(merged[0].expanded);
        assert!(!merged[0].sessions[0].expanded);
    }

    #[test]
    fn merge_takes_fresh_data_and_order() {
        let previous = vec![repo("b", true, vec![]), repo("a", false, vec![])];
        let mut fresh_session = session("cb:x", true, vec![Window::new(0, "claude", true)]);
        fresh_session.status = Status::Idle;
        let fresh = vec![repo("a", true, vec![fresh_session.clone()]), repo("b", true, vec![])];

        let merged = merge_expand_state(&previous, fresh);
        assert_eq!(merged[0].name, "a");
        assert!(!merged[0].expanded);
        assert_eq!(merged[0].sessions, vec![fresh_session]);
        assert_eq!(merged[1].name, "b");
    }

    #[test]
    fn group_by_repo_end_to_end() {
        let sessions = vec![
            Session { name: "cb:feat-auth".to_string() },
            Session { name: "cb:refactor".to_string() },
            Session { name: "cb:fix-login".to_string() },
        ];
        let repo_names: HashMap<String, String> = [
            ("cb:feat-auth", "my-project"),
            ("cb:refactor", "my-project"),
            ("cb:fix-login", "other-project"),
        ]
        .into_iter()
        .map(|(s, r)| (s.to_string(), r.to_string()))
        .collect();
        let windows: HashMap<String, Vec<Window>> = [
            (
                "cb:feat-auth",
                vec![
                    Window::new(0, "shell", true),
                    Window::new(1, "claude", false),
                    Window::new(2, "claude:research", false),
                ],
            ),
            ("cb:refactor", vec![Window::new(0, "shell", true)]),
            (
                "cb:fix-login",
                vec![Window::new(0, "shell", true), Window::new(1, "claude", false)],
            ),
        ]
        .into_iter()
        .map(|(s, w)| (s.to_string(), w))
        .collect();
        let statuses: HashMap<String, Status> = [
            ("cb:feat-auth:claude", Status::Working),
            ("cb:feat-auth:claude:research", Status::Idle),
            ("cb:fix-login:claude", Status::Done),
        ]
        .into_iter()
        .map(|(k, s)| (k.to_string(), s))
        .collect();

        let groups = group_by_repo(&sessions, &repo_names, &windows, &statuses);

        let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["my-project", "other-project"]);
        assert_eq!(groups[0].sessions.len(), 2);
        assert_eq!(groups[0].sessions[0].name, "cb:feat-auth");
        assert_eq!(groups[0].sessions[0].status, Status::Working);
        let window_names: Vec<&str> = groups[0].sessions[0]
            .windows
            .iter()
            .map(|w| w.name.as_str())
            .collect();
        assert_eq!(window_names, vec!["claude", "claude:research"]);
        assert_eq!(groups[0].sessions[1].status, Status::Done);
        assert!(groups[0].sessions[1].windows.is_empty());
        assert_eq!(groups[1].sessions[0].windows, vec![Window::new(1, "claude", false)]);
        assert_eq!(groups[1].sessions.len(), 1);
        assert_eq!(groups[1].sessions[0].status, Status::Done);
        assert!(groups.iter().all(|g| g.expanded));
        assert!(groups.iter().flat_map(|g| &g.sessions).all(|s| s.expanded));
    }

    #[test]
    fn group_by_repo_unknown_repo() {
        let sessions = vec![Session { name: "cb:orphan".to_string() }];
        let groups = group_by_repo(&sessions, &HashMap::new(), &HashMap::new(), &HashMap::new());
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].name, "Unknown");
        assert_eq!(groups[0].sessions[0].status, Status::Done);
        assert!(groups[0].sessions[0].windows.is_empty());
    }

    #[test]
    fn group_by_repo_ignores_unmonitored_statuses() {
        let sessions = vec![Session { name: "cb:a".to_string() }];
        let windows: HashMap<String, Vec<Window>> =
            [("cb:a".to_string(), vec![Window::new(0, "shell", true)])].into();
        let statuses: HashMap<String, Status> = [("cb:a:shell".to_string(), Status::Working)].into();
        let groups = group_by_repo(&sessions, &HashMap::new(), &windows, &statuses);
        assert_eq!(groups[0].sessions[0].status, Status::Done);
        assert!(groups[0].sessions[0].windows.is_empty());
    }

    #[test]
    fn shell_windows_produce_no_rows() {
        let sessions = vec![Session { name: "cb:a".to_string() }];
        let windows: HashMap<String, Vec<Window>> = [(
            "cb:a".to_string(),
            vec![
                Window::new(0, "shell", true),
                Window::new(1, "claude", false),
                Window::new(2, "claude:research", false),
                Window::new(3, "claudette", false),
            ],
        )]
        .into();
        let groups = group_by_repo(&sessions, &HashMap::new(), &windows, &HashMap::new());
        let nodes = build_nodes(&groups);
        assert_eq!(nodes.len(), 4);
        let rows: Vec<&str> = nodes
            .iter()
            .filter_map(|n| Some(groups[0].sessions[0].windows[n.window_index()?].name.as_str()))
            .collect();
        assert_eq!(rows, vec!["claude", "claude:research"]);
    }

    #[test]
    fn group_by_repo_missing_status_counts_as_done() {
        let sessions = vec![Session { name: "cb:a".to_string() }];
        let windows: HashMap<String, Vec<Window>> = [(
            "cb:a".to_string(),
            vec![Window::new(1, "claude", false), Window::new(2, "claude:b", false)],
        )]
        .into();
        let statuses: HashMap<String, Status> = [("cb:a:claude:b".to_string(), Status::Idle)].into();
        let groups = group_by_repo(&sessions, &HashMap::new(), &windows, &statuses);
        assert_eq!(groups[0].sessions[0].status, Status::Idle);
    }
}
