use fleetscale_core::ScalingReport;

const RULE: &str = "------------------------------------------------";

/// Human-readable report: one header per failing region, one block per failure.
pub fn format_report(report: &ScalingReport) -> String {
    if !report.has_failures() {
        return "all services scaled successfully\n".to_string();
    }

    let mut out = String::new();
    for (region, failures) in &report.failures_by_region {
        out.push_str(&format!("----------region: {region}------------\n"));
        for (i, failure) in failures.iter().enumerate() {
            if i > 0 {
                out.push_str(RULE);
                out.push('\n');
            }
            out.push_str(&format!("service: {}\n", failure.service_kind));
            out.push_str(&format!("identifier: {}\n", failure.resource_id));
            out.push_str(&format!("error: {}\n", failure.cause));
        }
        out.push('\n');
    }

    let total = report.failure_count();
    let regions = report.failures_by_region.len();
    out.push_str(&format!("{total} failure(s) across {regions} region(s)\n"));
    out
}
