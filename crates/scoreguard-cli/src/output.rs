//! Plain-text panels for each portal

use colored::Colorize;
use scoreguard_client::{
    AuditPage, BankAssessment, BatchAssessment, BatchEntry, Decision, RiskThresholds,
    SystemHealth, SystemStats, UserDirectory,
};
use scoreguard_core::{color_tier, Navigation, ScoreResult, Session, Trend};

use crate::gauge::paint;

fn heading(title: &str) {
    println!();
    println!("{}", title.bold());
}

fn trend_label(trend: Trend) -> String {
    match trend {
        Trend::Improving => "↑ improving".green().to_string(),
        Trend::Declining => "↓ declining".red().to_string(),
        Trend::Stable => "→ stable".normal().to_string(),
    }
}

pub fn session(session: Option<&Session>) {
    match session {
        Some(s) => {
            println!(
                "{} {} <{}>",
                "Signed in as".dimmed(),
                s.user.display_name().bold(),
                s.user.email
            );
            println!("  Portal:  {}", s.role().portal_title());
            println!("  Since:   {}", s.established_at.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        None => println!("{}", "Not logged in".yellow()),
    }
}

pub fn navigation(nav: &Navigation, resolved: &str) {
    match nav {
        Navigation::Render(path) => println!("{} {}", "render".green(), path),
        Navigation::Redirect(path) => {
            println!("{} {}", "redirect".yellow(), path);
            if resolved != path {
                println!("  settles on {}", resolved);
            }
        }
    }
}

pub fn score_details(result: &ScoreResult) {
    let tier = result.tier();
    println!(
        "{}  {}",
        paint(&result.category, tier).bold(),
        trend_label(result.trend)
    );
    if let Some(points) = result.points_to_next_tier() {
        if let Some(next) = tier.next() {
            println!("{} points to {}", points, next.category());
        }
    }
    if result.sample_data {
        println!("{}", "Sample data".dimmed());
    }
    if result.reward_eligible {
        println!("{}", "Eligible for the good-standing reward".green());
    }

    if !result.explanations.positive.is_empty() {
        heading("Working in your favour");
        for line in &result.explanations.positive {
            println!("  {} {}", "+".green(), line);
        }
    }
    if !result.explanations.negative.is_empty() {
        heading("Holding you back");
        for line in &result.explanations.negative {
            println!("  {} {}", "-".red(), line);
        }
    }

    if !result.improvements.is_empty() {
        heading("How to improve");
        for item in &result.improvements {
            println!("  • {} ({})", item.action, item.impact.cyan());
            if let Some(detail) = &item.detail {
                println!("    {}", detail.dimmed());
            }
        }
    }

    let recs = &result.recommendations;
    if !recs.narrative.is_empty() {
        heading("Summary");
        println!("  {}", recs.narrative);
    }
    for tip in &recs.tips {
        println!("  - {}", tip);
    }
}

fn decision_label(decision: Decision) -> String {
    match decision {
        Decision::Approve => "APPROVE".green().bold().to_string(),
        Decision::ApproveWithConditions => "APPROVE WITH CONDITIONS".yellow().bold().to_string(),
        Decision::ManualReview => "MANUAL REVIEW".red().bold().to_string(),
        Decision::Unknown => "UNKNOWN".dimmed().to_string(),
    }
}

pub fn bank_assessment(assessment: &BankAssessment) {
    let tier = color_tier(assessment.score);
    println!(
        "Applicant {}: {} ({})",
        assessment.applicant_id.bold(),
        paint(&assessment.score.to_string(), tier).bold(),
        assessment.risk_level
    );
    let rec = &assessment.recommendation;
    println!("  Decision:        {}", decision_label(rec.decision));
    println!("  Default risk:    {:.1}%", assessment.probability_of_default * 100.0);
    println!("  Suggested limit: {:.0}", rec.suggested_limit);
    println!("  Rate tier:       {}", rec.interest_rate_tier);
    println!("  Confidence:      {:.0}%", rec.confidence * 100.0);

    if !rec.conditions.is_empty() {
        heading("Conditions");
        for c in &rec.conditions {
            println!("  - {}", c);
        }
    }
    if !assessment.risk_factors.is_empty() {
        heading("Risk factors");
        for f in &assessment.risk_factors {
            println!("  {} {}", "-".red(), f);
        }
    }
    if !assessment.positive_factors.is_empty() {
        heading("Positive factors");
        for f in &assessment.positive_factors {
            println!("  {} {}", "+".green(), f);
        }
    }
    if !rec.monitoring_flags.is_empty() {
        println!();
        println!("Monitoring: {}", rec.monitoring_flags.join(", "));
    }
}

pub fn batch(assessment: &BatchAssessment) {
    for entry in &assessment.results {
        match entry {
            BatchEntry::Scored {
                applicant_id,
                score,
                decision,
                suggested_limit,
                ..
            } => println!(
                "  {:<16} {:>4}  {:<28} {:>12.0}",
                applicant_id,
                paint(&score.to_string(), color_tier(*score)),
                decision_label(*decision),
                suggested_limit
            ),
            BatchEntry::Failed {
                applicant_id,
                error,
            } => println!("  {:<16} {}", applicant_id, error.red()),
        }
    }
    let s = assessment.summary;
    println!();
    println!(
        "{} total, {} approved, {} conditional, {} for review",
        s.total, s.approved, s.conditional, s.review
    );
}

pub fn thresholds(thresholds: &RiskThresholds) {
    heading("Score ranges");
    for (name, (low, high)) in &thresholds.score_ranges {
        println!("  {:<12} {}-{}", name, low, high);
    }
    for (title, table) in [
        ("Decision criteria", &thresholds.decision_criteria),
        ("Rate tiers", &thresholds.rate_tiers),
        ("Limit multipliers", &thresholds.limit_multipliers),
    ] {
        if table.is_empty() {
            continue;
        }
        heading(title);
        for (k, v) in table {
            println!("  {:<24} {}", k, v);
        }
    }
}

pub fn audit(page: &AuditPage) {
    if page.logs.is_empty() {
        println!("{}", "No audit entries".dimmed());
        return;
    }
    for entry in &page.logs {
        let when = entry
            .logged_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.timestamp.clone());
        let score = entry
            .score
            .map(|s| paint(&s.to_string(), color_tier(s)).to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  {}  {:<24} {:<8} {:<20} {}",
            when.dimmed(),
            entry.user,
            entry.role,
            entry.action,
            score
        );
    }
}

pub fn stats(stats: &SystemStats) {
    println!("Total requests: {}", stats.total_requests);
    if let Some(avg) = stats.avg_score {
        println!("Average score:  {:.0}", avg);
    }
    if let (Some(min), Some(max)) = (stats.min_score, stats.max_score) {
        println!("Score range:    {}-{}", min, max);
    }
    if let Some(recent) = stats.requests_last_24h {
        println!("Last 24h:       {}", recent);
    }
    if !stats.requests_by_role.is_empty() {
        heading("Requests by role");
        for (role, count) in &stats.requests_by_role {
            println!("  {:<10} {}", role, count);
        }
    }
}

pub fn users(directory: &UserDirectory) {
    for user in &directory.users {
        println!(
            "  {:<28} {:<8} {}",
            user.email,
            user.role.as_str(),
            user.name.as_deref().unwrap_or("")
        );
    }
}

pub fn health(health: &SystemHealth) {
    let status = if health.is_healthy() {
        health.status.green()
    } else {
        health.status.red()
    };
    println!("Status: {}", status.bold());
    for (component, state) in &health.components {
        println!("  {:<20} {}", component, state);
    }
}
