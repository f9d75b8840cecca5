use crate::models::Node;

/// Prompt material reconstructed from an ancestor path.
#[derive(Debug, Clone)]
pub struct BuiltContext {
    /// The root node's own context, sent as the system instruction.
    pub system: String,
    /// Full transcript (root context, completed turns, new query) joined by
    /// blank lines. Stored as the new node's `context`.
    pub transcript: String,
    /// The user-turn payload sent to the completion engine: everything except
    /// the root context, joined by newlines, with the new query appended.
    pub user_payload: String,
}

/// Build the linear prompt for a new branch from the parent's ancestor path
/// (root first) and the new user query.
///
/// An ancestor contributes its `User:`/`Assistant:` pair only when both the
/// query and the response are present; a node whose streaming never completed
/// is skipped entirely rather than leaving a dangling query.
pub fn build_context(ancestors: &[Node], query: &str) -> BuiltContext {
    let system = ancestors
        .first()
        .map(|root| root.context.clone())
        .unwrap_or_default();

    let mut fragments = vec![system.clone()];
    for ancestor in ancestors.iter().skip(1) {
        if let (Some(q), Some(r)) = (ancestor.query.as_deref(), ancestor.response.as_deref()) {
            if !q.is_empty() && !r.is_empty() {
                fragments.push(format!("User: {}", q));
                fragments.push(format!("Assistant: {}", r));
            }
        }
    }
    fragments.push(format!("User: {}", query));

    let transcript = fragments.join("\n\n");
    let user_payload = format!("{}\n\nUser: {}", fragments[1..].join("\n"), query)
        .trim()
        .to_string();

    BuiltContext {
        system,
        transcript,
        user_payload,
    }
}
