//! HTML templates for web interface
//!
//! Simple inline HTML templates without a template engine.

use trade_manual::{
    Document,
    access::{AccessLevel, Operation},
    credentials::UserSummary,
};
use url::form_urlencoded;

const TITLE: &str = "Manual do Trade";

/// Common CSS styles for all pages
const COMMON_STYLES: &str = r#"
    body {
        font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif;
        max-width: 1000px;
        margin: 40px auto;
        padding: 0 20px;
        background: #f5f5f5;
    }
    .container {
        background: white;
        padding: 30px;
        border-radius: 8px;
        box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    .banner {
        text-align: center;
        color: white;
        background: #a10d28;
        padding: 18px;
        border-radius: 8px;
        margin: 0 0 20px 0;
    }
    h2 {
        color: #555;
        margin-top: 30px;
    }
    .tabs a {
        display: inline-block;
        padding: 10px 16px;
        margin-right: 4px;
        color: #a10d28;
        text-decoration: none;
        border-bottom: 3px solid transparent;
    }
    .tabs a.active {
        border-bottom-color: #a10d28;
        font-weight: bold;
    }
    .form-group {
        margin: 15px 0;
    }
    label {
        display: block;
        font-weight: bold;
        margin-bottom: 5px;
        color: #333;
    }
    input[type="text"],
    input[type="password"],
    input[type="search"],
    select {
        width: 100%;
        padding: 10px;
        border: 1px solid #ddd;
        border-radius: 4px;
        font-size: 14px;
        box-sizing: border-box;
    }
    button {
        background: #a10d28;
        color: white;
        padding: 10px 20px;
        border: none;
        border-radius: 4px;
        cursor: pointer;
        font-size: 14px;
        font-weight: bold;
    }
    .logout-btn {
        background: #999;
        float: right;
    }
    .delete-btn {
        background: #d9534f;
        padding: 4px 10px;
    }
    table {
        width: 100%;
        border-collapse: collapse;
        margin: 20px 0;
    }
    th, td {
        text-align: left;
        padding: 12px;
        border-bottom: 1px solid #ddd;
    }
    th {
        background: #f0f0f0;
    }
    .error { color: #a94442; background: #f2dede; padding: 10px; border-radius: 4px; }
    .warning { color: #8a6d3b; background: #fcf8e3; padding: 10px; border-radius: 4px; }
    .success { color: #3c763d; background: #dff0d8; padding: 10px; border-radius: 4px; }
    .info { color: #31708f; background: #d9edf7; padding: 10px; border-radius: 4px; }
    embed {
        width: 100%;
        height: 800px;
        border: 1px solid #ddd;
    }
"#;

/// Portal page tabs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Tab {
    #[default]
    Search,
    All,
    Admin,
}

impl Tab {
    /// Parse the `tab` query parameter, falling back to search.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("all") => Tab::All,
            Some("admin") => Tab::Admin,
            _ => Tab::Search,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::Search => "search",
            Tab::All => "all",
            Tab::Admin => "admin",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Tab::Search => "Search",
            Tab::All => "All documents",
            Tab::Admin => "User access",
        }
    }
}

/// Feedback shown above the tab content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    fn render(&self) -> String {
        let (class, message) = match self {
            Notice::Success(m) => ("success", m),
            Notice::Warning(m) => ("warning", m),
            Notice::Error(m) => ("error", m),
        };
        format!(r#"<div class="{class}">{}</div>"#, html_escape(message))
    }
}

/// Everything the portal page shows
pub struct PortalView<'a> {
    pub username: &'a str,
    pub level: AccessLevel,
    pub tab: Tab,
    pub query: &'a str,
    /// Matches for `query`; empty when the query is blank
    pub results: &'a [Document],
    pub documents: &'a [Document],
    /// Accounts, listed only on the admin tab
    pub users: &'a [UserSummary],
    pub notice: Option<&'a Notice>,
}

impl PortalView<'_> {
    fn tabs(&self) -> Vec<Tab> {
        let mut tabs = vec![Tab::Search, Tab::All];
        if self.level.allows(Operation::ManageUsers.required_level()) {
            tabs.push(Tab::Admin);
        }
        tabs
    }
}

/// Render the login page
pub fn login_page(error: Option<&str>) -> String {
    let error_html = error.map_or(String::new(), |e| {
        format!(r#"<div class="error">{}</div>"#, html_escape(e))
    });

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{TITLE} - Login</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        <h1 class="banner">{TITLE}</h1>
        {error_html}
        <form method="POST" action="/login">
            <div class="form-group">
                <label for="username">Username:</label>
                <input type="text" id="username" name="username" required autofocus>
            </div>
            <div class="form-group">
                <label for="password">Password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <button type="submit">Login</button>
        </form>
        <p class="info" style="margin-top: 20px; text-align: center;">
            Use your username and password to access the manual.
        </p>
    </div>
</body>
</html>"#
    )
}

/// Render the portal page for a logged-in session
pub fn portal_page(view: &PortalView<'_>) -> String {
    let tabs_html: String = view
        .tabs()
        .into_iter()
        .map(|tab| {
            let class = if tab == view.tab { "active" } else { "" };
            format!(
                r#"<a class="{class}" href="/portal?tab={}">{}</a>"#,
                tab.as_str(),
                tab.label()
            )
        })
        .collect();

    let notice_html = view.notice.map(Notice::render).unwrap_or_default();

    let body = match view.tab {
        Tab::Search => search_tab(view),
        Tab::All => all_documents_tab(view),
        Tab::Admin => admin_tab(view),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{TITLE}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        <form method="POST" action="/logout" style="display: inline;">
            <button type="submit" class="logout-btn">Logout</button>
        </form>
        <p>Signed in as <strong>{}</strong> ({})</p>
        <h1 class="banner">{TITLE}</h1>
        <nav class="tabs">{tabs_html}</nav>
        {notice_html}
        {body}
    </div>
</body>
</html>"#,
        html_escape(view.username),
        html_escape(&view.level.to_string()),
    )
}

fn search_tab(view: &PortalView<'_>) -> String {
    let results_html = if !view.results.is_empty() {
        let items: String = view
            .results
            .iter()
            .map(|doc| format!("<li>{}</li>", view_link(doc, Tab::Search)))
            .collect();
        format!("<h2>Documents found</h2><ul>{items}</ul>")
    } else if !view.query.trim().is_empty() {
        format!(
            r#"<p class="warning">No documents match '{}'.</p>"#,
            html_escape(view.query)
        )
    } else {
        r#"<p class="info">Type a term to search, or use the All documents tab.</p>"#.to_string()
    };

    format!(
        r#"<h2>Find a process</h2>
        <form method="GET" action="/portal">
            <input type="hidden" name="tab" value="search">
            <div class="form-group">
                <input type="search" name="q" value="{}" placeholder="Search by name" autofocus>
            </div>
            <button type="submit">Search</button>
        </form>
        {results_html}"#,
        html_escape(view.query)
    )
}

fn all_documents_tab(view: &PortalView<'_>) -> String {
    let upload_html = if view.level.allows(Operation::Upload.required_level()) {
        r#"<h2>Add a document</h2>
        <form method="POST" action="/documents/upload" enctype="multipart/form-data">
            <div class="form-group">
                <label for="name">Process or document name:</label>
                <input type="text" id="name" name="name" required>
            </div>
            <div class="form-group">
                <label for="file">PDF file:</label>
                <input type="file" id="file" name="file" accept=".pdf,application/pdf" required>
            </div>
            <button type="submit">Save document</button>
        </form>"#
    } else {
        ""
    };

    if view.documents.is_empty() {
        return format!(
            r#"{upload_html}<p class="warning">No documents in the document folder.</p>"#
        );
    }

    let can_delete = view.level.allows(Operation::Delete.required_level());
    let rows: String = view
        .documents
        .iter()
        .map(|doc| {
            let delete_html = if can_delete {
                format!(
                    r#"<form method="POST" action="/documents/delete" style="display: inline;">
                        <input type="hidden" name="path" value="{}">
                        <button type="submit" class="delete-btn">Delete</button>
                    </form>"#,
                    html_escape(&doc.path.display().to_string())
                )
            } else {
                String::new()
            };
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                view_link(doc, Tab::All),
                html_escape(&doc.file_name),
                delete_html
            )
        })
        .collect();

    format!(
        r#"{upload_html}
        <h2>All documents</h2>
        <table>
            <tr><th>Name</th><th>File</th><th></th></tr>
            {rows}
        </table>"#
    )
}

fn admin_tab(view: &PortalView<'_>) -> String {
    let options: String = AccessLevel::ALL
        .iter()
        .map(|level| {
            format!(
                r#"<option value="{}">{}</option>"#,
                level.value(),
                html_escape(&level.to_string())
            )
        })
        .collect();

    let rows: String = view
        .users
        .iter()
        .map(|user| {
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                html_escape(&user.username),
                html_escape(&user.level.to_string())
            )
        })
        .collect();

    format!(
        r#"<h2>New user</h2>
        <form method="POST" action="/admin/users">
            <div class="form-group">
                <label for="username">Username (login):</label>
                <input type="text" id="username" name="username" required>
            </div>
            <div class="form-group">
                <label for="password">Initial password:</label>
                <input type="password" id="password" name="password" required>
            </div>
            <div class="form-group">
                <label for="level">Access level:</label>
                <select id="level" name="level">{options}</select>
            </div>
            <button type="submit">Create user</button>
        </form>
        <h2>Accounts</h2>
        <table>
            <tr><th>Username</th><th>Level</th></tr>
            {rows}
        </table>"#
    )
}

/// Render the viewer for the selected document
pub fn viewer_page(doc: &Document, back: Tab) -> String {
    let file_href = document_href("/documents/file", doc, None);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{TITLE} - {name}</title>
    <style>{COMMON_STYLES}</style>
</head>
<body>
    <div class="container">
        <p><a href="/portal?tab={back}">&larr; Back to the menu</a></p>
        <h2>Viewing: {name}</h2>
        <p class="info">The PDF is embedded below.
            If it does not display, <a href="{file_href}&amp;download=1">download it</a>.</p>
        <embed src="{file_href}" type="application/pdf">
    </div>
</body>
</html>"#,
        name = html_escape(&doc.display_name),
        back = back.as_str(),
    )
}

fn view_link(doc: &Document, from: Tab) -> String {
    format!(
        r#"<a href="{}">{}</a>"#,
        document_href("/documents/view", doc, Some(from)),
        html_escape(&doc.display_name)
    )
}

/// Link to `route` for `doc`, escaped for use in an HTML attribute.
pub fn document_href(route: &str, doc: &Document, from: Option<Tab>) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query.append_pair("path", &doc.path.display().to_string());
    if let Some(tab) = from {
        query.append_pair("tab", tab.as_str());
    }
    html_escape(&format!("{route}?{}", query.finish()))
}

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
