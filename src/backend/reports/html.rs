/**
 * HTML Report Rendering
 *
 * Renders the stored reports as a standalone HTML table for printing or
 * forwarding. Every user-supplied field is escaped; only the first
 * attached image is shown, inline as a data URI.
 */

use chrono::Utc;
use std::fmt::Write;

use crate::shared::Report;

const NOT_AVAILABLE: &str = "N/A";

/// Escape text for use in HTML element content and attribute values
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn cell(value: &str) -> String {
    if value.trim().is_empty() {
        NOT_AVAILABLE.to_string()
    } else {
        escape_html(value)
    }
}

fn image_cell(report: &Report) -> String {
    match report.payload.images.first() {
        Some(image) => format!(
            r#"<img src="data:image/jpeg;base64,{}" alt="Report image" width="200">"#,
            escape_html(image)
        ),
        None => "No image".to_string(),
    }
}

/// Render all reports as an HTML document
pub fn render_reports(reports: &[Report]) -> String {
    let mut rows = String::new();
    for report in reports {
        // writing to a String cannot fail
        let _ = writeln!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&report.id),
            cell(&report.payload.title),
            cell(&report.payload.reporter_name),
            report.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            cell(&report.payload.location),
            cell(&report.status),
            escape_html(report.payload.category.label()),
            cell(&report.payload.description),
            image_cell(report),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Incident Reports</title>
  <style>
    body {{ font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; margin: 2em; color: #333; }}
    h1 {{ color: #1a73e8; }}
    table {{ width: 100%; border-collapse: collapse; margin-top: 20px; }}
    th, td {{ border: 1px solid #ddd; padding: 12px; text-align: left; vertical-align: middle; }}
    th {{ background-color: #f2f2f2; font-weight: 600; }}
    tr:nth-child(even) {{ background-color: #f9f9f9; }}
    img {{ max-width: 200px; height: auto; border-radius: 4px; }}
  </style>
</head>
<body>
  <h1>Incident Reports</h1>
  <p>Generated {generated} ({count} report(s))</p>
  <table>
    <thead>
      <tr><th>Report ID</th><th>Title</th><th>Reporter</th><th>Date</th><th>Location</th><th>Status</th><th>Category</th><th>Description</th><th>Image</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
</body>
</html>
"#,
        generated = Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
        count = reports.len(),
        rows = rows,
    )
}
