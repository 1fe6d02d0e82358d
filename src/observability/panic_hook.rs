//! Crash report printed when smellscope panics.

use super::context::{get_current_context, get_progress, StageContext};
use std::panic::PanicHookInfo;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WIDTH: usize = 76;

/// Replace the default panic output with a boxed report naming the stage,
/// the file and how far the run got. Call once, early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!();
        eprintln!("{}", crash_report(info));
    }));
}

fn crash_report(info: &PanicHookInfo<'_>) -> String {
    let (processed, total) = get_progress();
    let mut lines = vec![
        format!("SMELLSCOPE CRASH REPORT (v{VERSION}, {})", std::env::consts::OS),
        format!("Time: {}", chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")),
        format!("PANIC: {}", panic_message(info)),
    ];
    if let Some(location) = info.location() {
        lines.push(format!(
            "Location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ));
    }
    lines.extend(context_lines(&get_current_context(), processed, total));
    if std::env::var("RUST_BACKTRACE").is_err() {
        lines.push("Run with RUST_BACKTRACE=1 for a stack trace".to_string());
    }

    let mut report = boxed(&lines);
    if std::env::var("RUST_BACKTRACE").is_ok() {
        report.push('\n');
        report.push_str(&std::backtrace::Backtrace::capture().to_string());
    }
    report
}

fn context_lines(context: &StageContext, processed: usize, total: usize) -> Vec<String> {
    let mut lines = vec![match &context.stage {
        Some(stage) => format!("Stage: {stage}"),
        None => "Stage: (not set, crash occurred before the run started)".to_string(),
    }];
    if let Some(file) = &context.current_file {
        lines.push(format!("File: {}", file.display()));
    }
    if total > 0 {
        let pct = processed * 100 / total;
        lines.push(format!("Progress: {processed} / {total} files ({pct}%)"));
    }
    lines
}

fn boxed(lines: &[String]) -> String {
    let rule = "═".repeat(WIDTH + 2);
    let mut out = format!("╔{rule}╗\n");
    for line in lines {
        out.push_str(&format!("║ {:<width$} ║\n", truncate(line, WIDTH), width = WIDTH));
    }
    out.push_str(&format!("╚{rule}╝"));
    out
}

fn panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observability::context::Stage;
    use std::path::PathBuf;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        let long = truncate("this is a long string that needs truncation", 20);
        assert_eq!(long.chars().count(), 20);
        assert!(long.ends_with("..."));
    }

    #[test]
    fn test_context_lines() {
        let context = StageContext {
            stage: Some(Stage::Parsing),
            current_file: Some(PathBuf::from("pkg/mod.py")),
        };
        let lines = context_lines(&context, 5, 20);
        assert_eq!(
            lines,
            vec![
                "Stage: parsing".to_string(),
                "File: pkg/mod.py".to_string(),
                "Progress: 5 / 20 files (25%)".to_string(),
            ]
        );
    }

    #[test]
    fn test_boxed_lines_have_equal_width() {
        let report = boxed(&["a".to_string(), "bb".to_string()]);
        let widths: Vec<usize> = report.lines().map(|l| l.chars().count()).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
    }
}
