use serde::Serialize;

/// Activity of a monitored window, or the rollup of a session's windows.
///
/// Variants are declared in ascending precedence so the derived `Ord`
/// gives `Working > Idle > Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Done,
    Idle,
    Working,
}

impl Status {
    pub fn icon(&self) -> &'static str {
        match self {
            Self::Working => "●",
            Self::Idle => "○",
            Self::Done => "◌",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Working => "WORKING",
            Self::Idle => "IDLE",
            Self::Done => "DONE",
        }
    }

    pub fn badge(&self) -> String {
        format!("{} {}", self.icon(), self.label())
    }
}

/// Roll a set of window statuses up into one session status.
///
/// `Working` if any window is working, else `Idle` if any is idle, else
/// `Done`. An empty set is `Done`.
pub fn rollup_status<I>(statuses: I) -> Status
where
    I: IntoIterator<Item = Status>,
{
    statuses.into_iter().max().unwrap_or(Status::Done)
}

/// Classify a pane by its foreground command (`#{pane_current_command}`).
///
/// A bare shell means the monitored process has exited. A command naming
/// the monitored process means it is running; the foreground command alone
/// can't tell busy from waiting, so a running process is reported `Idle`.
/// Anything else is `Done`.
pub fn classify_pane_command(command: &str, monitored: &str) -> Status {
    let command = command.trim();
    match command {
        "zsh" | "bash" | "sh" => Status::Done,
        c if !monitored.is_empty() && c.contains(monitored) => Status::Idle,
        _ => Status::Done,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Status::*;

    #[test]
    fn rollup_precedence() {
        let cases: &[(&str, &[Status], Status)] = &[
            ("empty", &[], Done),
            ("single done", &[Done], Done),
            ("single idle", &[Idle], Idle),
            ("single working", &[Working], Working),
            ("all done", &[Done, Done, Done], Done),
            ("all idle", &[Idle, Idle], Idle),
            ("one working", &[Idle, Working], Working),
            ("idle beats done", &[Done, Idle, Done], Idle),
            ("mixed", &[Done, Idle, Working], Working),
            ("working first", &[Working, Done, Idle], Working),
        ];
        for (name, input, expected) in cases {
            assert_eq!(rollup_status(input.iter().copied()), *expected, "{}", name);
        }
    }

    #[test]
    fn rollup_is_order_independent() {
        let a = [Done, Idle, Working, Idle];
        let mut b = a;
        b.reverse();
        assert_eq!(rollup_status(a), rollup_status(b));
    }

    #[test]
    fn classify_shells_as_done() {
        for shell in ["zsh", "bash", "sh", "bash\n"] {
            assert_eq!(classify_pane_command(shell, "claude"), Done, "{:?}", shell);
        }
    }

    #[test]
    fn classify_monitored_process_as_idle() {
        assert_eq!(classify_pane_command("claude", "claude"), Idle);
        assert_eq!(classify_pane_command("node-claude", "claude"), Idle);
    }

    #[test]
    fn classify_other_commands_as_done() {
        assert_eq!(classify_pane_command("vim", "claude"), Done);
        assert_eq!(classify_pane_command("", "claude"), Done);
    }

    #[test]
    fn badges() {
        assert_eq!(Working.badge(), "● WORKING");
        assert_eq!(Idle.badge(), "○ IDLE");
        assert_eq!(Done.badge(), "◌ DONE");
    }

    #[test]
    fn serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Working).unwrap(), "\"WORKING\"");
    }
}
