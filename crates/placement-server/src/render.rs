//! HTML rendering for the portal pages

use std::fmt::Write;

use axum::response::Html;

use placement_core::{CompanyRecord, ControllerState, LoginForm, ValidationErrors};

/// Landing menu targets: (label, path)
pub const MENU: [(&str, &str); 3] = [
    ("Students", "/students"),
    ("Recruiters", "/recruiters"),
    ("Admin", "/admin"),
];

/// Escape text for HTML element and attribute content
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
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

fn layout(title: &str, body: &str, auto_refresh: bool) -> Html<String> {
    let refresh = if auto_refresh {
        r#"<meta http-equiv="refresh" content="1">"#
    } else {
        ""
    };
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{refresh}
<title>{title}</title>
<link rel="manifest" href="/manifest.json">
<link rel="icon" href="/icons/icon.svg">
<link rel="stylesheet" href="/styles.css">
</head>
<body>
{body}
<script>
if ("serviceWorker" in navigator) {{
  navigator.serviceWorker.register("/service-worker.js");
}}
</script>
</body>
</html>
"#,
        refresh = refresh,
        title = escape(title),
        body = body,
    ))
}

const LOGO: &str =
    r#"<img class="logo" src="/icons/icon.svg" alt="placement_logo" height="150" width="150">"#;
const BACK: &str = r#"<a class="back-arrow" href="/" aria-label="Back">&larr;</a>"#;

pub fn landing() -> Html<String> {
    let mut buttons = String::new();
    for (label, path) in MENU {
        let _ = write!(
            buttons,
            r#"<div class="btn"><a href="{}">{}</a></div>"#,
            path, label
        );
    }
    layout(
        "Placement Portal",
        &format!(
            r#"<main class="main">{LOGO}<div class="btns-section">{buttons}</div></main>"#
        ),
        false,
    )
}

/// Page that is not built yet (admin, recruiters)
pub fn coming_soon(title: &str) -> Html<String> {
    layout(
        title,
        &format!(
            r#"<main class="main">{BACK}{LOGO}<div class="form-title">{}</div><div class="desc">coming soon...</div></main>"#,
            escape(title)
        ),
        false,
    )
}

pub fn not_found(path: &str) -> Html<String> {
    layout(
        "Not Found",
        &format!(
            r#"<main class="main">{BACK}<div class="form-title">Not Found</div><div class="desc">{}</div></main>"#,
            escape(path)
        ),
        false,
    )
}

/// Student login form; the password is never echoed back
pub fn login_page(form: &LoginForm, errors: &ValidationErrors, alert: Option<&str>) -> Html<String> {
    let alert = alert
        .map(|msg| format!(r#"<div class="alert" role="alert">{}</div>"#, escape(msg)))
        .unwrap_or_default();
    let field_error = |error: Option<&str>| {
        error
            .map(|msg| format!(r#"<div class="error-text">{}</div>"#, escape(msg)))
            .unwrap_or_default()
    };

    let body = format!(
        r#"<main class="main">{BACK}{LOGO}{alert}
<form class="form" method="post" action="/students/login">
<div class="form-title">Student Login</div>
<div class="text-field"><label for="rollNumber">Roll Number</label>
<input id="rollNumber" name="rollNumber" value="{roll}" autocomplete="username"></div>
{roll_error}
<div class="text-field"><label for="studentPassword">Password</label>
<input id="studentPassword" name="studentPassword" type="password" autocomplete="current-password"></div>
{password_error}
<button class="btn" type="submit">Submit</button>
</form></main>"#,
        alert = alert,
        roll = escape(&form.roll_number),
        roll_error = field_error(errors.roll_number),
        password_error = field_error(errors.student_password),
    );
    layout("Student Login", &body, false)
}

/// Logged-in dashboard. Refreshes itself while a fetch or countdown is running.
pub fn dashboard(state: &ControllerState) -> Html<String> {
    let mut body = String::new();

    if let Some(session) = &state.session {
        let _ = write!(
            body,
            r#"<div class="user-info"><div><div class="user-name">Hi, {}</div><div class="user-roll">({})</div></div>
<form method="post" action="/students/logout"><button class="btn" type="submit">Log Out</button></form></div>"#,
            escape(&session.greeting_name()),
            escape(&session.roll_number)
        );
    }

    if let Some(alert) = &state.alert {
        let _ = write!(body, r#"<div class="alert" role="alert">{}</div>"#, escape(alert));
    }
    if let Some(status) = state.status_message() {
        let _ = write!(body, r#"<div class="error-text center">{}</div>"#, escape(&status));
    }
    if state.loading {
        body.push_str(r#"<div class="loader">Loading Companies...</div>"#);
    }

    if !state.companies.is_empty() {
        body.push_str(r#"<div class="companies-table">"#);
        for company in &state.companies {
            body.push_str(&company_card(company));
        }
        body.push_str("</div>");
    }

    let busy = state.loading || state.backoff.active;
    layout("Student Dashboard", &body, busy)
}

fn company_card(company: &CompanyRecord) -> String {
    let cell = |title: &str, value: &str| {
        format!(
            r#"<div class="rd-cell"><div class="rd-title">{}</div><div class="rd">{}</div></div>"#,
            title,
            escape(value)
        )
    };

    format!(
        r#"<div class="company"><div class="company-name">{name}</div><div class="company-profile">{profile}</div>
<div class="rd-container"><div class="rd-title">Resume Deadline : </div><div class="rd">{deadline}</div></div>
<div class="rd-container">{ppt}{test}</div>
<div class="rd-container">{gd}{interview}</div></div>"#,
        name = escape(&company.company_name),
        profile = escape(&company.profile_name),
        deadline = escape(company.resume_deadline()),
        ppt = cell("PPT", &company.ppt().display()),
        test = cell("Test", &company.test().display()),
        gd = cell("GD", &company.group_discussion().display()),
        interview = cell("Interview", &company.interview().display()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::{BackoffState, Phase, Session};

    #[test]
    fn escape_neutralizes_markup() {
        assert_eq!(
            escape(r#"<b>"A&B"</b>"#),
            "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn login_page_shows_field_errors_but_not_password() {
        let form = LoginForm::new("ee19", "hunter2");
        let errors = form.validate().unwrap_err();
        let Html(page) = login_page(&form, &errors, None);

        assert!(page.contains("Invalid Roll Number"));
        assert!(page.contains(r#"value="ee19""#));
        assert!(!page.contains("hunter2"));
    }

    #[test]
    fn dashboard_shows_countdown_and_refreshes_while_backing_off() {
        let mut state = ControllerState::default();
        state.phase = Phase::Backoff;
        state.session = Some(Session::new("Asha", "EE19B001", "T"));
        state.backoff = BackoffState::counting(7_000);
        let Html(page) = dashboard(&state);

        assert!(page.contains("Hi, Asha"));
        assert!(page.contains("(EE19B001)"));
        assert!(page.contains("Status 429, retrying in 7s..."));
        assert!(page.contains(r#"http-equiv="refresh""#));
    }

    #[test]
    fn dashboard_lists_companies_in_order() {
        let mut state = ControllerState::default();
        state.phase = Phase::Idle;
        state.session = Some(Session::new("Asha", "EE19B001", "T"));
        state.companies = vec![
            CompanyRecord {
                company_name: "Acme".to_string(),
                ppt_date: Some("1 Aug".to_string()),
                ppt_time: Some("10:00".to_string()),
                ..Default::default()
            },
            CompanyRecord {
                company_name: "Globex".to_string(),
                ..Default::default()
            },
        ];
        let Html(page) = dashboard(&state);

        let acme = page.find("Acme").unwrap();
        let globex = page.find("Globex").unwrap();
        assert!(acme < globex);
        assert!(page.contains("1 Aug, 10:00"));
        assert!(!page.contains(r#"http-equiv="refresh""#));
    }
}
