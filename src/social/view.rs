use std::collections::{BTreeMap, HashMap};

use crate::api::{Comment, Post, Reaction};

/// A top-level comment with its direct replies.
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub comment: Comment,
    pub replies: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionCount {
    pub kind: String,
    pub count: usize,
}

/// How the user's own reaction changed between two aggregates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionChange {
    Added(String),
    Replaced { from: String, to: String },
    Removed(String),
    Unchanged,
}

/// Rebuild the thread view from the flat comment list: newest top-level
/// comment first, replies oldest first. Replies to a missing parent are
/// left out.
pub fn organize_comments(comments: &[Comment]) -> Vec<CommentThread> {
    let mut replies: HashMap<&str, Vec<&Comment>> = HashMap::new();
    let mut top: Vec<&Comment> = Vec::new();
    for comment in comments {
        match comment.parent_comment.as_deref() {
            Some(parent) => replies.entry(parent).or_default().push(comment),
            None => top.push(comment),
        }
    }

    top.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let threads: Vec<CommentThread> = top
        .into_iter()
        .map(|comment| {
            let mut children = replies.remove(comment.id.as_str()).unwrap_or_default();
            children.sort_by(|a, b| a.created_at.cmp(&b.created_at));
            CommentThread {
                comment: comment.clone(),
                replies: children.into_iter().cloned().collect(),
            }
        })
        .collect();

    if !replies.is_empty() {
        log::debug!(
            "{} reply group(s) without a visible parent",
            replies.len()
        );
    }
    threads
}

/// Count reactions per type, most used first.
pub fn reaction_histogram(reactions: &[Reaction]) -> Vec<ReactionCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for reaction in reactions {
        *counts.entry(reaction.kind.as_str()).or_default() += 1;
    }
    let mut histogram: Vec<ReactionCount> = counts
        .into_iter()
        .map(|(kind, count)| ReactionCount {
            kind: kind.to_string(),
            count,
        })
        .collect();
    // BTreeMap order breaks ties by type.
    histogram.sort_by(|a, b| b.count.cmp(&a.count));
    histogram
}

pub fn user_reaction<'a>(reactions: &'a [Reaction], user_id: &str) -> Option<&'a str> {
    reactions
        .iter()
        .find(|r| r.user.id() == user_id)
        .map(|r| r.kind.as_str())
}

pub fn reaction_change(before: Option<&str>, after: Option<&str>) -> ReactionChange {
    match (before, after) {
        (None, Some(to)) => ReactionChange::Added(to.to_string()),
        (Some(from), None) => ReactionChange::Removed(from.to_string()),
        (Some(from), Some(to)) if from != to => ReactionChange::Replaced {
            from: from.to_string(),
            to: to.to_string(),
        },
        _ => ReactionChange::Unchanged,
    }
}

/// Top-level comments plus replies.
pub fn comment_count(post: &Post) -> usize {
    post.comments.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserRef;
    use chrono::{TimeZone, Utc};

    fn comment(id: &str, parent: Option<&str>, t: i64) -> Comment {
        Comment {
            id: id.to_string(),
            author: UserRef::Id("u1".to_string()),
            content: format!("comment {}", id),
            parent_comment: parent.map(str::to_string),
            reactions: vec![],
            created_at: Utc.timestamp_opt(t, 0).unwrap(),
        }
    }

    fn reaction(user: &str, kind: &str) -> Reaction {
        Reaction {
            user: UserRef::Id(user.to_string()),
            kind: kind.to_string(),
        }
    }

    fn count(kind: &str, count: usize) -> ReactionCount {
        ReactionCount {
            kind: kind.to_string(),
            count,
        }
    }

    fn shape(threads: &[CommentThread]) -> Vec<(&str, Vec<&str>)> {
        threads
            .iter()
            .map(|t| {
                (
                    t.comment.id.as_str(),
                    t.replies.iter().map(|r| r.id.as_str()).collect(),
                )
            })
            .collect()
    }

    #[test]
    fn newest_top_level_first_with_replies() {
        let comments = vec![
            comment("1", None, 10),
            comment("2", Some("1"), 12),
            comment("3", None, 20),
        ];
        let threads = organize_comments(&comments);
        assert_eq!(shape(&threads), vec![("3", vec![]), ("1", vec!["2"])]);
    }

    #[test]
    fn replies_are_chronological_regardless_of_input_order() {
        let comments = vec![
            comment("r3", Some("p"), 40),
            comment("p", None, 5),
            comment("r1", Some("p"), 10),
            comment("r2", Some("p"), 20),
            comment("orphan", Some("gone"), 15),
        ];
        let threads = organize_comments(&comments);
        assert_eq!(shape(&threads), vec![("p", vec!["r1", "r2", "r3"])]);
    }

    #[test]
    fn equal_timestamps_keep_server_order() {
        let comments = vec![comment("a", None, 10), comment("b", None, 10)];
        let threads = organize_comments(&comments);
        assert_eq!(shape(&threads), vec![("a", vec![]), ("b", vec![])]);
    }

    #[test]
    fn histogram_counts_per_type() {
        let reactions = vec![
            reaction("u1", "like"),
            reaction("u2", "love"),
            reaction("u3", "like"),
            reaction("u4", "haha"),
        ];
        let histogram = reaction_histogram(&reactions);
        assert_eq!(
            histogram,
            vec![count("like", 2), count("haha", 1), count("love", 1)]
        );
        assert_eq!(user_reaction(&reactions, "u2"), Some("love"));
        assert_eq!(user_reaction(&reactions, "u9"), None);
    }

    #[test]
    fn infers_reaction_change() {
        assert_eq!(
            reaction_change(None, Some("like")),
            ReactionChange::Added("like".into())
        );
        assert_eq!(
            reaction_change(Some("like"), None),
            ReactionChange::Removed("like".into())
        );
        assert_eq!(
            reaction_change(Some("like"), Some("love")),
            ReactionChange::Replaced {
                from: "like".into(),
                to: "love".into(),
            }
        );
        assert_eq!(
            reaction_change(Some("wow"), Some("wow")),
            ReactionChange::Unchanged
        );
        assert_eq!(reaction_change(None, None), ReactionChange::Unchanged);
    }
}
