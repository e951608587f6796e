//! Classifies the user-visible change between two pull request snapshots.

use crate::pull_request::{PullRequestSnapshot, ReviewerVote};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ChangeKind` values.
pub enum ChangeKind {
    None,
    StatusChanged,
    DraftChanged,
    ReviewerChanged,
}

impl ChangeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::StatusChanged => "status",
            Self::DraftChanged => "draft",
            Self::ReviewerChanged => "reviewer",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of [`compare_snapshots`]: the change kind and its chat message.
pub struct PullRequestChange {
    pub kind: ChangeKind,
    pub message: String,
}

impl PullRequestChange {
    fn none() -> Self {
        Self {
            kind: ChangeKind::None,
            message: String::new(),
        }
    }

    fn new(kind: ChangeKind, message: String) -> Self {
        Self { kind, message }
    }

    pub fn has_change(&self) -> bool {
        self.kind != ChangeKind::None
    }
}

/// Compares the stored snapshot with an incoming one.
///
/// Rules are checked in priority order (status, draft flag, reviewer
/// membership, reviewer votes) and only the first difference is reported.
/// Votes are compared by position in the reviewer list, so a source that
/// reorders reviewers between notifications can attribute a vote change to
/// the wrong reviewer.
pub fn compare_snapshots(
    previous: &PullRequestSnapshot,
    incoming: &PullRequestSnapshot,
) -> PullRequestChange {
    if previous.status != incoming.status {
        return PullRequestChange::new(
            ChangeKind::StatusChanged,
            format!("Status has changed to: *{}*", incoming.status),
        );
    }

    if previous.is_draft != incoming.is_draft {
        let message = if incoming.is_draft {
            "PR has now been marked as a draft"
        } else {
            "PR has been unmarked as a draft"
        };
        return PullRequestChange::new(ChangeKind::DraftChanged, message.to_string());
    }

    if previous.reviewers.len() != incoming.reviewers.len() {
        // Removals alone, or an addition masked by a removal, report nothing.
        return match first_added_reviewer(&previous.reviewers, &incoming.reviewers) {
            Some(added) => PullRequestChange::new(
                ChangeKind::ReviewerChanged,
                format!(
                    "*{}* has *{}* this PR",
                    added.display_name,
                    added.vote_label()
                ),
            ),
            None => PullRequestChange::none(),
        };
    }

    for (before, after) in previous.reviewers.iter().zip(&incoming.reviewers) {
        if before.vote == after.vote {
            continue;
        }
        let message = if before.is_required {
            format!(
                "A required reviewer - *{}* has *{}* your PR",
                after.display_name,
                after.vote_label()
            )
        } else {
            format!(
                "*{}* has changed their review from *{}* to *{}*",
                after.display_name,
                before.vote_label(),
                after.vote_label()
            )
        };
        return PullRequestChange::new(ChangeKind::ReviewerChanged, message);
    }

    PullRequestChange::none()
}

fn first_added_reviewer<'a>(
    previous: &[ReviewerVote],
    incoming: &'a [ReviewerVote],
) -> Option<&'a ReviewerVote> {
    incoming.iter().find(|candidate| {
        !previous
            .iter()
            .any(|existing| existing.unique_name == candidate.unique_name)
    })
}

#[cfg(test)]
mod tests {
    use super::{compare_snapshots, ChangeKind};
    use crate::pull_request::{vote_label, PullRequestSnapshot, ReviewerVote};

    fn reviewer(name: &str, vote: i32, is_required: bool) -> ReviewerVote {
        ReviewerVote {
            vote,
            display_name: name.to_string(),
            unique_name: format!("{}@example.com", name.to_lowercase()),
            is_required,
        }
    }

    fn snapshot(status: &str, is_draft: bool, reviewers: Vec<ReviewerVote>) -> PullRequestSnapshot {
        PullRequestSnapshot {
            status: status.to_string(),
            is_draft,
            reviewers,
        }
    }

    #[test]
    fn unit_vote_label_maps_known_codes_and_blanks_unknown() {
        assert_eq!(vote_label(10), "approved");
        assert_eq!(vote_label(5), "approved (with suggestions)");
        assert_eq!(vote_label(0), "reset");
        assert_eq!(vote_label(-10), "rejected");
        assert_eq!(vote_label(3), "");
        assert_eq!(vote_label(i32::MIN), "");
    }

    #[test]
    fn unit_identical_snapshots_report_no_change() {
        let previous = snapshot("active", false, vec![reviewer("Lee", 0, false)]);
        let change = compare_snapshots(&previous, &previous.clone());
        assert_eq!(change.kind, ChangeKind::None);
        assert!(!change.has_change());
        assert!(change.message.is_empty());
    }

    #[test]
    fn unit_status_change_wins_over_draft_change() {
        let previous = snapshot("active", true, Vec::new());
        let incoming = snapshot("completed", false, Vec::new());
        let change = compare_snapshots(&previous, &incoming);
        assert_eq!(change.kind, ChangeKind::StatusChanged);
        assert_eq!(change.message, "Status has changed to: *completed*");
    }

    #[test]
    fn unit_draft_change_messages_depend_on_direction() {
        let ready = compare_snapshots(
            &snapshot("active", true, Vec::new()),
            &snapshot("active", false, Vec::new()),
        );
        assert_eq!(ready.kind, ChangeKind::DraftChanged);
        assert_eq!(ready.message, "PR has been unmarked as a draft");

        let drafted = compare_snapshots(
            &snapshot("active", false, Vec::new()),
            &snapshot("active", true, Vec::new()),
        );
        assert_eq!(drafted.kind, ChangeKind::DraftChanged);
        assert_eq!(drafted.message, "PR has now been marked as a draft");
    }

    #[test]
    fn unit_draft_change_wins_over_reviewer_change() {
        let previous = snapshot("active", true, Vec::new());
        let incoming = snapshot("active", false, vec![reviewer("Lee", 10, false)]);
        assert_eq!(
            compare_snapshots(&previous, &incoming).kind,
            ChangeKind::DraftChanged
        );
    }

    #[test]
    fn unit_added_reviewer_is_named_with_vote() {
        let previous = snapshot("active", false, vec![reviewer("Lee", 0, false)]);
        let incoming = snapshot(
            "active",
            false,
            vec![reviewer("Lee", 0, false), reviewer("Sam", 10, false)],
        );
        let change = compare_snapshots(&previous, &incoming);
        assert_eq!(change.kind, ChangeKind::ReviewerChanged);
        assert_eq!(change.message, "*Sam* has *approved* this PR");
    }

    #[test]
    fn unit_removed_reviewer_reports_no_change() {
        let previous = snapshot(
            "active",
            false,
            vec![reviewer("Lee", 0, false), reviewer("Sam", 10, false)],
        );
        let incoming = snapshot("active", false, vec![reviewer("Lee", 0, false)]);
        assert!(!compare_snapshots(&previous, &incoming).has_change());
    }

    #[test]
    fn regression_count_change_does_not_fall_through_to_vote_comparison() {
        let previous = snapshot(
            "active",
            false,
            vec![reviewer("Lee", 0, false), reviewer("Sam", 0, false)],
        );
        let incoming = snapshot("active", false, vec![reviewer("Lee", 10, false)]);
        assert!(!compare_snapshots(&previous, &incoming).has_change());
    }

    #[test]
    fn unit_vote_change_reports_old_and_new_labels() {
        let previous = snapshot("active", false, vec![reviewer("Lee", 0, false)]);
        let incoming = snapshot("active", false, vec![reviewer("Lee", -10, false)]);
        let change = compare_snapshots(&previous, &incoming);
        assert_eq!(change.kind, ChangeKind::ReviewerChanged);
        assert_eq!(
            change.message,
            "*Lee* has changed their review from *reset* to *rejected*"
        );
    }

    #[test]
    fn unit_required_reviewer_vote_change_uses_required_wording() {
        let previous = snapshot("active", false, vec![reviewer("Kai", 5, true)]);
        let incoming = snapshot("active", false, vec![reviewer("Kai", 10, true)]);
        let change = compare_snapshots(&previous, &incoming);
        assert_eq!(change.kind, ChangeKind::ReviewerChanged);
        assert_eq!(
            change.message,
            "A required reviewer - *Kai* has *approved* your PR"
        );
    }

    #[test]
    fn unit_only_first_vote_mismatch_is_reported() {
        let previous = snapshot(
            "active",
            false,
            vec![reviewer("Lee", 0, false), reviewer("Sam", 0, false)],
        );
        let incoming = snapshot(
            "active",
            false,
            vec![reviewer("Lee", 5, false), reviewer("Sam", 10, false)],
        );
        let change = compare_snapshots(&previous, &incoming);
        assert_eq!(
            change.message,
            "*Lee* has changed their review from *reset* to *approved (with suggestions)*"
        );
    }

    #[test]
    fn regression_unknown_vote_code_renders_empty_label() {
        let previous = snapshot("active", false, vec![reviewer("Lee", 0, false)]);
        let incoming = snapshot("active", false, vec![reviewer("Lee", 3, false)]);
        let change = compare_snapshots(&previous, &incoming);
        assert_eq!(
            change.message,
            "*Lee* has changed their review from *reset* to **"
        );
    }

    #[test]
    fn regression_vote_comparison_is_positional() {
        let previous = snapshot(
            "active",
            false,
            vec![reviewer("Lee", 0, false), reviewer("Sam", 10, false)],
        );
        let incoming = snapshot(
            "active",
            false,
            vec![reviewer("Sam", 10, false), reviewer("Lee", 0, false)],
        );
        let change = compare_snapshots(&previous, &incoming);
        assert_eq!(change.kind, ChangeKind::ReviewerChanged);
        assert_eq!(
            change.message,
            "*Sam* has changed their review from *reset* to *approved*"
        );
    }
}
