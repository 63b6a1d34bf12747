use reaper_core::ReconcileReport;
use serde::Serialize;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

pub fn print_report(report: &ReconcileReport) {
    print!("{}", render_report(report));
}

fn render_report(report: &ReconcileReport) -> String {
    let (verb, names) = if report.dry_run {
        ("would delete", &report.candidates)
    } else {
        ("deleted", &report.deleted)
    };

    if names.is_empty() {
        return "Nothing to delete.\n".to_string();
    }
    let mut out = format!("{verb} {} namespace(s):\n", names.len());
    for name in names {
        out.push_str(&format!("  {name}\n"));
    }
    out
}
