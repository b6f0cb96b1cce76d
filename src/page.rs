use crate::spaceflightnow::Launch;

pub const STYLE_CSS: &str = include_str!("../www/style.css");

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn render_launch(launch: &Launch) -> String {
    format!(
        r#"<article class="launch">
        <header>
            <span class="date">{date}</span>
            <h2 class="mission">{mission}</h2>
        </header>
        <dl>
            <dt>Launch time</dt><dd>{time}</dd>
            <dt>Launch site</dt><dd>{site}</dd>
        </dl>
        <p class="description">{description}</p>
        <p class="updated">{last_updated}</p>
    </article>
    "#,
        date = escape_html(&launch.date),
        mission = escape_html(&launch.mission),
        time = escape_html(&launch.time),
        site = escape_html(&launch.site),
        description = escape_html(&launch.description),
        last_updated = escape_html(&launch.last_updated),
    )
}

/// Renders the schedule page.
///
/// `time_remaining` is the `HH:MM:SS` countdown to the next refresh and
/// `last_refresh` the already formatted time of the last attempt.
pub fn render_index(launches: &[Launch], time_remaining: &str, last_refresh: &str) -> String {
    let items = if launches.is_empty() {
        r#"<p class="empty">No upcoming launches from the Space Coast.</p>"#.to_string()
    } else {
        launches.iter().map(render_launch).collect::<String>()
    };

    let app_name = env!("CARGO_PKG_NAME");
    let app_version = env!("CARGO_PKG_VERSION");

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Space Coast Launch Schedule</title>
    <link rel="stylesheet" href="/style.css">
</head>
<body>
    <h1>Space Coast Launch Schedule</h1>
    <main>
    {items}
    </main>
    <footer>
        <p>Next refresh in <span class="countdown">{time_remaining}</span>
        (last checked {last_refresh})</p>
        <p>Data from <a href="https://spaceflightnow.com/launch-schedule/">Spaceflight Now</a>.
        {app_name} v{app_version}</p>
    </footer>
</body>
</html>"#,
        items = items,
        time_remaining = escape_html(time_remaining),
        last_refresh = escape_html(last_refresh),
        app_name = app_name,
        app_version = app_version,
    )
}
