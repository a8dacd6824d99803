use std::fmt::Write;

use axum::response::Html;

use crate::auth::CurrentUser;
use crate::db::operations::statistics::{LanguageCount, MistakeCount};
use crate::services::statistics::AgeRangeCount;

pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// `csrf` is only rendered into the logout form, so anonymous pages may pass "".
pub fn page(title: &str, user: Option<&CurrentUser>, csrf: &str, body: &str) -> Html<String> {
    let nav = match user {
        Some(user) => format!(
            r#"<a href="/stats">Statistics</a> <a href="/local_stats">My mistakes</a> <a href="/token">Token</a> <span>{} {}</span> <form method="post" action="/logout">{}<button type="submit">Logout</button></form>"#,
            escape(&user.name),
            escape(&user.surname),
            csrf_field(csrf)
        ),
        None => r#"<a href="/stats">Statistics</a> <a href="/register">Register</a> <a href="/login">Login</a>"#
            .to_string(),
    };

    Html(format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n<header><a href=\"/\">Ortho</a> {nav}</header>\n<main>\n{body}\n</main>\n</body>\n</html>\n",
        title = escape(title),
    ))
}

pub fn message(text: Option<&str>) -> String {
    match text {
        Some(text) => format!(r#"<p class="message">{}</p>"#, escape(text)),
        None => String::new(),
    }
}

pub fn csrf_field(token: &str) -> String {
    format!(
        r#"<input type="hidden" name="csrf_token" value="{}">"#,
        escape(token)
    )
}

pub fn mistakes_table(rows: &[MistakeCount]) -> String {
    if rows.is_empty() {
        return "<p>No mistakes yet.</p>".to_string();
    }
    let mut out = String::from("<table>\n<tr><th>Word</th><th>Count</th><th>Language</th></tr>\n");
    for row in rows {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&row.name),
            row.count,
            escape(&row.language)
        );
    }
    out.push_str("</table>");
    out
}

pub fn language_table(rows: &[LanguageCount]) -> String {
    count_table(
        "Language",
        rows.iter().map(|row| (row.language.as_str(), row.count)),
    )
}

pub fn age_table(rows: &[AgeRangeCount]) -> String {
    count_table(
        "Age",
        rows.iter().map(|row| (row.age_range.as_str(), row.count)),
    )
}

fn count_table<'a>(label: &str, rows: impl Iterator<Item = (&'a str, i64)>) -> String {
    let mut out = format!("<table>\n<tr><th>{}</th><th>Count</th></tr>\n", escape(label));
    for (key, count) in rows {
        let _ = writeln!(out, "<tr><td>{}</td><td>{}</td></tr>", escape(key), count);
    }
    out.push_str("</table>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn logged_in_nav_posts_logout_with_csrf_field() {
        let user = CurrentUser {
            id: 1,
            email: "anna@example.com".to_string(),
            name: "Anna".to_string(),
            surname: "Petrova".to_string(),
            age: 27,
            token: None,
        };
        let Html(markup) = page("Ortho", Some(&user), "tok123", "");
        assert!(markup.contains(r#"<form method="post" action="/logout">"#));
        assert!(markup.contains(r#"name="csrf_token" value="tok123""#));
        assert!(!markup.contains(r#"href="/logout""#));
    }

    #[test]
    fn empty_listing_has_placeholder() {
        assert_eq!(mistakes_table(&[]), "<p>No mistakes yet.</p>");
    }
}
