//! Server-side HTML for the single listing page. Markup is built with plain
//! string formatting; everything user-supplied goes through `html_escape`.

use chrono::NaiveDateTime;

use crate::flash::Flash;
use crate::model::Task;

/// Simple HTML escaping for user-supplied text
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Percent-encode a string for use in a URL query value.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn render_page(tasks: &[Task], now: NaiveDateTime, flash: Option<&Flash>) -> String {
    let mut out = String::new();
    out.push_str(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Taskboard</title>
<link rel="stylesheet" href="/static/app.css">
</head>
<body>
<h1>Taskboard</h1>
"#,
    );

    if let Some(flash) = flash {
        out.push_str(&format!(
            r#"<div class="flash flash-{}">{}</div>
"#,
            flash.level.as_str(),
            html_escape(&flash.message)
        ));
    }

    out.push_str(
        r#"<form class="add-form" method="post" action="/add">
<input type="text" name="task_content" placeholder="What needs doing?" required>
<input type="text" name="task_category" placeholder="Category">
<input type="date" name="task_date" required>
<input type="time" name="task_time">
<input type="text" name="task_location" placeholder="Location">
<button type="submit">Add</button>
</form>
"#,
    );

    if tasks.is_empty() {
        out.push_str("<p class=\"empty\">No tasks yet.</p>\n");
    } else {
        out.push_str("<ul class=\"tasks\">\n");
        for task in tasks {
            out.push_str(&render_task_row(task, now));
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}

fn render_task_row(task: &Task, now: NaiveDateTime) -> String {
    let row_class = if task.completed {
        "task done"
    } else if task.is_overdue(now) {
        "task overdue"
    } else if task.is_due_today(now) {
        "task due-today"
    } else {
        "task"
    };

    let deadline = task
        .deadline
        .map(|d| {
            format!(
                r#" <span class="deadline">due {}</span>"#,
                d.format("%Y-%m-%d %H:%M")
            )
        })
        .unwrap_or_default();

    let location = task
        .location
        .as_deref()
        .map(|loc| {
            format!(
                r#" <a class="location" href="https://www.openstreetmap.org/search?query={}">{}</a>"#,
                urlencode(loc),
                html_escape(loc)
            )
        })
        .unwrap_or_default();

    let toggle_label = if task.completed { "Undo" } else { "Done" };

    format!(
        r#"<li class="{row_class}">
<form class="toggle" method="post" action="/complete/{id}"><button type="submit">{toggle_label}</button></form>
<span class="content">{content}</span>
<span class="category">{category}</span>{deadline}{location}
<a class="delete" href="/delete/{id}">Delete</a>
</li>
"#,
        id = task.id,
        content = html_escape(&task.content),
        category = html_escape(&task.category),
    )
}
