//! `placement students`: log in and follow the company listing
//!
//! Renders controller state changes as plain lines: the backoff countdown,
//! the loading notice, then one card per company.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::watch;

use placement_core::{
    CompanyRecord, ControllerState, HttpPlacementApi, Phase, PortalConfig, Session, SessionError,
    StudentController,
};

pub async fn run(roll_number: String) -> Result<()> {
    let config = PortalConfig::load().context("Failed to load configuration")?;
    let password = read_password()?;

    let api = HttpPlacementApi::new(&config).context("Failed to build HTTP client")?;
    let controller = Arc::new(StudentController::new(Arc::new(api), config));

    let result = tokio::select! {
        result = log_in_and_follow(&controller, &roll_number, &password) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl+c")?;
            println!("\n  Logging out...");
            Ok(())
        }
    };

    controller.logout();
    result
}

fn read_password() -> Result<String> {
    print!("  Password: ");
    io::stdout().flush()?;

    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    Ok(password.trim_end_matches(['\r', '\n']).to_string())
}

async fn log_in_and_follow(
    controller: &Arc<StudentController>,
    roll_number: &str,
    password: &str,
) -> Result<()> {
    let mut rx = controller.subscribe();

    let session = match controller.submit(roll_number, password).await {
        Ok(session) => session,
        Err(SessionError::Validation(errors)) => {
            if let Some(message) = errors.roll_number {
                println!("  Roll Number: \x1b[31m{}\x1b[0m", message);
            }
            if let Some(message) = errors.student_password {
                println!("  Password: \x1b[31m{}\x1b[0m", message);
            }
            anyhow::bail!("Login form is incomplete");
        }
        Err(err) => {
            println!("  \x1b[31m{}\x1b[0m", err);
            return Err(err.into());
        }
    };

    print_greeting(&session);
    follow(&mut rx).await
}

async fn follow(rx: &mut watch::Receiver<ControllerState>) -> Result<()> {
    let mut view = DashboardView::default();
    loop {
        let state = rx.borrow_and_update().clone();
        let (lines, done) = view.update(&state);
        for line in lines {
            println!("{}", line);
        }
        if done {
            return Ok(());
        }
        if rx.changed().await.is_err() {
            return Ok(());
        }
    }
}

fn print_greeting(session: &Session) {
    println!();
    println!(
        "  Hi, \x1b[1m{}\x1b[0m ({})",
        session.greeting_name(),
        session.roll_number
    );
    println!("  ─────────────────────────────────────");
}

/// Turns successive state snapshots into new output lines
#[derive(Debug, Default)]
struct DashboardView {
    last_status: Option<String>,
    announced_loading: bool,
}

impl DashboardView {
    /// Lines to print for this snapshot, and whether the session is settled
    fn update(&mut self, state: &ControllerState) -> (Vec<String>, bool) {
        let mut lines = Vec::new();

        let status = state.status_message();
        if status.is_some() && status != self.last_status {
            if let Some(status) = &status {
                lines.push(format!("  {}", status));
            }
            self.announced_loading = false;
        }
        self.last_status = status;

        if state.loading && state.backoff.remaining_ms == 0 && !self.announced_loading {
            lines.push("  Loading Companies...".to_string());
            self.announced_loading = true;
        }

        match state.phase {
            Phase::Idle => {
                if let Some(alert) = &state.alert {
                    lines.push(format!("  {}", alert));
                }
                if state.companies.is_empty() {
                    lines.push("  No companies listed yet.".to_string());
                }
                for company in &state.companies {
                    lines.extend(company_card(company));
                }
                (lines, true)
            }
            Phase::LoggedOut => {
                if let Some(alert) = &state.alert {
                    lines.push(format!("  {}", alert));
                }
                (lines, true)
            }
            Phase::Authenticating | Phase::FetchingCompanies | Phase::Backoff => (lines, false),
        }
    }
}

fn company_card(company: &CompanyRecord) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "  \x1b[1m{}\x1b[0m ({})",
            company.company_name, company.profile_name
        ),
        format!("    Resume Deadline : {}", company.resume_deadline()),
        format!(
            "    PPT: {}    Test: {}",
            company.ppt().display(),
            company.test().display()
        ),
        format!(
            "    GD: {}    Interview: {}",
            company.group_discussion().display(),
            company.interview().display()
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::BackoffState;

    fn logged_in(phase: Phase) -> ControllerState {
        let mut state = ControllerState::default();
        state.phase = phase;
        state.session = Some(Session::new("Asha", "EE19B001", "T"));
        state.loading = phase == Phase::FetchingCompanies;
        state
    }

    #[test]
    fn countdown_prints_each_second_once() {
        let mut view = DashboardView::default();

        let (lines, done) = view.update(&logged_in(Phase::FetchingCompanies));
        assert_eq!(lines, vec!["  Loading Companies..."]);
        assert!(!done);

        let mut backoff = logged_in(Phase::Backoff);
        backoff.backoff = BackoffState::counting(10_000);
        let (lines, _) = view.update(&backoff);
        assert_eq!(lines, vec!["  Status 429, retrying in 10s..."]);

        let (lines, _) = view.update(&backoff);
        assert!(lines.is_empty());

        backoff.backoff = BackoffState::counting(9_000);
        let (lines, _) = view.update(&backoff);
        assert_eq!(lines, vec!["  Status 429, retrying in 9s..."]);

        let (lines, _) = view.update(&logged_in(Phase::FetchingCompanies));
        assert_eq!(lines, vec!["  Loading Companies..."]);
    }

    #[test]
    fn idle_listing_finishes_with_cards() {
        let mut view = DashboardView::default();
        let mut state = logged_in(Phase::Idle);
        state.companies = vec![CompanyRecord {
            company_name: "Acme".to_string(),
            profile_name: "Analyst".to_string(),
            ..Default::default()
        }];

        let (lines, done) = view.update(&state);
        assert!(done);
        assert!(lines.iter().any(|line| line.contains("Acme")));
        assert!(lines.iter().any(|line| line.contains("Resume Deadline : -")));
    }

    #[test]
    fn logout_finishes_with_alert() {
        let mut view = DashboardView::default();
        let mut state = ControllerState::default();
        state.alert = Some("Invalid credentials!".to_string());

        let (lines, done) = view.update(&state);
        assert!(done);
        assert_eq!(lines, vec!["  Invalid credentials!"]);
    }
}
