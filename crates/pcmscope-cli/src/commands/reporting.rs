//! Colored human-readable reporting shared by the commands.

use colored::Colorize;
use pcmscope_core::{volume_percent, AudioStats, ValidationIssue, ValidationReport, VolumeLevel};

/// Print every finding of a validation report, grouped by severity.
pub(crate) fn print_validation(report: &ValidationReport) {
    if report.total_issues() == 0 {
        println!("\n{} No issues found", "PASSED".green().bold());
        return;
    }

    if !report.errors.is_empty() {
        println!("\n{}", "Errors:".red().bold());
        for issue in &report.errors {
            print_issue(issue, "x".red());
        }
    }

    if !report.warnings.is_empty() {
        println!("\n{}", "Warnings:".yellow().bold());
        for issue in &report.warnings {
            print_issue(issue, "!".yellow());
        }
    }

    if !report.info.is_empty() {
        println!("\n{}", "Info:".blue().bold());
        for issue in &report.info {
            print_issue(issue, "i".blue());
        }
    }
}

/// Print one validation finding.
pub(crate) fn print_issue(issue: &ValidationIssue, marker: colored::ColoredString) {
    let location = issue
        .byte_offset
        .map(|offset| format!(" at byte {}", offset))
        .unwrap_or_default();

    let mut lines = issue.message.lines();
    println!(
        "  {} [{}]{}: {}",
        marker,
        issue.code.cyan(),
        location.dimmed(),
        lines.next().unwrap_or_default()
    );
    for line in lines {
        println!("      {}", line);
    }

    if let Some(actual) = &issue.actual_value {
        if let Some(expected) = &issue.expected_range {
            println!("    {} actual={}, expected={}", "->".dimmed(), actual, expected);
        } else {
            println!("    {} actual={}", "->".dimmed(), actual);
        }
    }

    println!("    {} {}", "suggestion:".dimmed(), issue.suggestion);
}

/// Print signal statistics.
pub(crate) fn print_stats(stats: &AudioStats, samples: &[f32]) {
    println!("\n{}", "Statistics:".cyan().bold());
    println!("  {:<16} {:.2} dBFS ({:.4})", "Peak:", stats.peak_db, stats.peak_level);
    println!("  {:<16} {:.2} dBFS", "RMS:", stats.rms_db);
    println!("  {:<16} {:.6}", "DC offset:", stats.dc_offset);
    println!("  {:<16} {:.2}", "Crest factor:", stats.crest_factor);
    println!(
        "  {:<16} {} ({:.2}/s)",
        "Zero crossings:",
        stats.zero_crossings,
        stats.zero_crossing_rate
    );
    let clipped = format!("{}", stats.clipped_samples);
    if stats.is_clipped() {
        println!("  {:<16} {}", "Clipped:", clipped.red());
    } else {
        println!("  {:<16} {}", "Clipped:", clipped);
    }
    println!("  {:<16} {:.1}%", "Silence:", stats.silence_ratio * 100.0);

    let percent = volume_percent(samples);
    println!("  {:<16} {}", "Volume:", volume_label(percent));
}

/// Meter reading such as `63% (medium)`, coloured like the meter.
pub(crate) fn volume_label(percent: f64) -> colored::ColoredString {
    let level = VolumeLevel::from_percent(percent);
    let name = match level {
        VolumeLevel::Low => "low",
        VolumeLevel::Medium => "medium",
        VolumeLevel::High => "high",
    };
    let [r, g, b] = level.rgb();
    format!("{:.0}% ({})", percent, name).truecolor(r, g, b)
}
