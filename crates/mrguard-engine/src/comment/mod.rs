//! The bot-authored policy violation comment.

mod detailed;
mod legacy;
mod markers;
mod synchronizer;

pub use detailed::{error_message, DetailedCommentBuilder};
pub use legacy::LegacyCommentBuilder;
pub use markers::CommentMarkers;
pub use synchronizer::{CommentRequest, CommentSyncOutcome, ViolationCommentSynchronizer};

/// Note body posted when every violation has been resolved.
pub const RESOLVED_NOTE: &str = ":white_check_mark: **Security policy violations have been resolved.**";

/// Text shown when every violated report only has optional approvals.
pub(crate) const OPTIONAL_APPROVALS_NOTE: &str = "Consider including optional reviewers based on the policy rules in the MR widget.";
