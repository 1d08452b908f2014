use std::borrow::Cow;

use chrono::{Datelike, Utc};

pub use crate::catalog::sanitize::encode_segment;

pub const SITE_NAME: &str = "Class Notes";
pub const ADMIN_SITE_NAME: &str = "Class Notes Hub";

const PAGE_BASE_STYLES: &str = r#"
        :root { color-scheme: light; }
        body { font-family: "Helvetica Neue", Arial, sans-serif; margin: 0; background: #f8fafc; color: #0f172a; min-height: 100vh; display: flex; flex-direction: column; }
        header { background: #ffffff; padding: 2rem 1.5rem; border-bottom: 1px solid #e2e8f0; }
        .header-bar { display: flex; justify-content: space-between; align-items: center; flex-wrap: wrap; gap: 1rem; max-width: 960px; margin: 0 auto; }
        .header-bar h1 { margin: 0; font-size: clamp(1.6rem, 3vw, 2.1rem); }
        .nav { display: flex; gap: 0.75rem; align-items: center; flex-wrap: wrap; }
        .nav a { display: inline-flex; align-items: center; gap: 0.4rem; color: #1d4ed8; text-decoration: none; font-weight: 600; background: #e0f2fe; padding: 0.5rem 0.95rem; border-radius: 999px; border: 1px solid #bfdbfe; }
        .nav a:hover { background: #bfdbfe; border-color: #93c5fd; }
        main { flex: 1; padding: 2rem 1.5rem; max-width: 960px; margin: 0 auto; width: 100%; box-sizing: border-box; }
        .panel { background: #ffffff; border-radius: 12px; border: 1px solid #e2e8f0; padding: 1.5rem; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); margin-bottom: 2rem; }
        .panel h2 { margin-top: 0; }
        .flash-message { padding: 1rem 1.25rem; border-radius: 10px; margin-bottom: 1.5rem; font-weight: 600; border: 1px solid transparent; }
        .flash-message.success { background: #ecfdf3; border-color: #bbf7d0; color: #166534; }
        .flash-message.info { background: #eff6ff; border-color: #bfdbfe; color: #1d4ed8; }
        .flash-message.warning { background: #fffbeb; border-color: #fde68a; color: #92400e; }
        .flash-message.danger { background: #fef2f2; border-color: #fecaca; color: #b91c1c; }
        .subject-grid { display: grid; gap: 1.25rem; grid-template-columns: repeat(auto-fit, minmax(220px, 1fr)); }
        .subject-card { display: block; background: #ffffff; padding: 1.5rem; border-radius: 16px; text-decoration: none; color: inherit; border: 1px solid #e2e8f0; box-shadow: 0 18px 40px rgba(15, 23, 42, 0.08); font-weight: 600; }
        .subject-card:hover { border-color: #bfdbfe; }
        label { display: block; margin-bottom: 0.5rem; font-weight: 600; color: #0f172a; }
        input[type="text"], input[type="password"], select { width: 100%; padding: 0.75rem; border-radius: 8px; border: 1px solid #cbd5f5; background: #f8fafc; color: #0f172a; box-sizing: border-box; margin-bottom: 1rem; }
        button { padding: 0.75rem 1.2rem; border: none; border-radius: 8px; background: #2563eb; color: #ffffff; font-weight: 600; cursor: pointer; }
        button:hover { background: #1d4ed8; }
        button.danger { background: #dc2626; }
        button.danger:hover { background: #b91c1c; }
        table { width: 100%; border-collapse: collapse; background: #ffffff; border: 1px solid #e2e8f0; border-radius: 12px; overflow: hidden; }
        th, td { padding: 0.75rem 1rem; border-bottom: 1px solid #e2e8f0; text-align: left; }
        th { background: #f1f5f9; font-weight: 600; }
        td.actions { display: flex; gap: 0.5rem; flex-wrap: wrap; align-items: center; }
        td.actions form { margin: 0; }
        .file-badge { display: inline-block; min-width: 3rem; text-align: center; padding: 0.2rem 0.5rem; border-radius: 999px; background: #f1f5f9; font-size: 0.8rem; font-weight: 600; text-transform: uppercase; }
        .note { color: #475569; font-size: 0.95rem; line-height: 1.6; }
        .file-label { display: block; color: #475569; margin: 0.5rem 0 1rem; }
        .app-footer { margin-top: 3rem; text-align: center; font-size: 0.85rem; color: #94a3b8; }
        @media (max-width: 768px) {
            header { padding: 1.5rem 1rem; }
            main { padding: 1.5rem 1rem; }
            th, td { padding: 0.5rem; }
        }
"#;

const CLIENT_SCRIPT: &str = r#"<script>
document.addEventListener("DOMContentLoaded", function() {
    const flash = document.querySelector(".flash-message");
    if (flash) {
        setTimeout(() => { flash.style.display = "none"; }, 3000);
    }
});

function confirmDelete(subjectName) {
    return confirm(`Are you sure you want to delete "${subjectName}"?`);
}

function previewFile(inputId, labelId) {
    const input = document.getElementById(inputId);
    const label = document.getElementById(labelId);
    if (input.files.length > 0) {
        label.textContent = input.files[0].name;
    } else {
        label.textContent = "Choose file...";
    }
}
</script>"#;

pub struct NavLink<'a> {
    pub href: &'a str,
    pub label: &'a str,
}

pub struct PageLayout<'a> {
    pub meta_title: &'a str,
    pub page_heading: &'a str,
    pub nav_links: Vec<NavLink<'a>>,
    pub flash_html: Cow<'a, str>,
    pub body_html: Cow<'a, str>,
}

pub fn render_page(layout: PageLayout<'_>) -> String {
    let PageLayout {
        meta_title,
        page_heading,
        nav_links,
        flash_html,
        body_html,
    } = layout;

    let nav_html = nav_links
        .iter()
        .map(|link| {
            format!(
                r#"<a href="{href}">{label}</a>"#,
                href = link.href,
                label = escape_html(link.label),
            )
        })
        .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{meta_title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <style>
{styles}
    </style>
</head>
<body>
    <header>
        <div class="header-bar">
            <h1>{page_heading}</h1>
            <nav class="nav">{nav_html}</nav>
        </div>
    </header>
    <main>
        {flash_html}
{body_html}
        {footer}
    </main>
{scripts}
</body>
</html>"#,
        meta_title = escape_html(meta_title),
        page_heading = escape_html(page_heading),
        styles = PAGE_BASE_STYLES,
        nav_html = nav_html,
        flash_html = flash_html,
        body_html = body_html,
        footer = render_footer(),
        scripts = CLIENT_SCRIPT,
    )
}

pub fn render_login_page(flash_html: &str) -> String {
    let body = r#"        <section class="panel">
            <h2>Admin login</h2>
            <form method="post" action="/admin/login">
                <label for="username">Username</label>
                <input id="username" type="text" name="username" required>
                <label for="password">Password</label>
                <input id="password" type="password" name="password" required>
                <button type="submit">Log in</button>
            </form>
        </section>"#;

    render_page(PageLayout {
        meta_title: ADMIN_SITE_NAME,
        page_heading: ADMIN_SITE_NAME,
        nav_links: vec![NavLink {
            href: "/",
            label: "← Back to subjects",
        }],
        flash_html: Cow::Borrowed(flash_html),
        body_html: Cow::Borrowed(body),
    })
}

pub fn render_footer() -> String {
    let current_year = Utc::now().year();
    format!(
        r#"<footer class="app-footer">© {year} {site}</footer>"#,
        year = current_year,
        site = SITE_NAME,
    )
}

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}


/// Escapes a value for a single-quoted JavaScript string inside an HTML attribute.
pub fn escape_js_attr(input: &str) -> String {
    let js = input.replace('\\', "\\\\").replace('\'', "\\'");
    escape_html(&js)
}
