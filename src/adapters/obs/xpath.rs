//! Compile [`RequestQuery`] into the build service's XPath search syntax

use crate::core::models::{ProjectFilter, RequestQuery, Reviewer};

/// Quote `value` as an XPath string literal
pub fn literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

fn review_clause(reviewer: &Reviewer) -> String {
    match reviewer {
        Reviewer::User(user) => format!("@by_user={} and @state='new'", literal(user)),
        Reviewer::Group(group) => format!("@by_group={} and @state='new'", literal(group)),
        Reviewer::Project(project) => format!("@by_project={} and @state='new'", literal(project)),
        Reviewer::Package { project, package } => format!(
            "@by_project={} and @by_package={} and @state='new'",
            literal(project),
            literal(package)
        ),
    }
}

/// The `match` expression for `query`
pub fn compile(query: &RequestQuery) -> String {
    let mut clauses = Vec::new();

    if !query.states.is_empty() {
        let states: Vec<String> = query
            .states
            .iter()
            .map(|s| format!("state/@name={}", literal(s.as_str())))
            .collect();
        clauses.push(format!("({})", states.join(" or ")));
    }

    let reviewers = query.reviewers();
    if !reviewers.is_empty() {
        let reviews: Vec<String> = reviewers.iter().map(|r| format!("({})", review_clause(r))).collect();
        clauses.push(format!("review[{}]", reviews.join(" or ")));
    }

    let mut action = Vec::new();
    match &query.target_project {
        Some(ProjectFilter::Exact(project)) => action.push(format!("target/@project={}", literal(project))),
        Some(ProjectFilter::Prefix(prefix)) => {
            action.push(format!("starts-with(target/@project,{})", literal(prefix)));
        },
        None => {},
    }
    if let Some(action_type) = &query.action_type {
        action.push(format!("@type={}", literal(action_type.name())));
    }
    if !action.is_empty() {
        clauses.push(format!("action[{}]", action.join(" and ")));
    }

    if let Some(since) = query.since {
        clauses.push(format!("state/@when>={}", literal(&since.format("%Y-%m-%dT%H:%M:%S").to_string())));
    }

    clauses.join(" and ")
}
