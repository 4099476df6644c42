use std::fmt::Write;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::models::{HourlyLoad, LoadProfile, SynthesisMethod};
use crate::present::{self, ProfileSummary, TimeWindow};

const SPREADSHEET_FILE: &str = "load_profile_out.csv";
const JSON_FILE: &str = "load_profile_out.json";
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

#[derive(Serialize)]
struct SpreadsheetRow {
    timestamp: String,
    #[serde(rename = "Electricity kW")]
    electricity_kw: f64,
    #[serde(rename = "Natural Gas kW")]
    natural_gas_kw: Option<f64>,
    #[serde(rename = "Elec Heating kW")]
    electric_heating_kw: Option<f64>,
    #[serde(rename = "Gas Heating kW")]
    gas_heating_kw: Option<f64>,
    #[serde(rename = "Cooling kW")]
    cooling_kw: Option<f64>,
}

impl From<&HourlyLoad> for SpreadsheetRow {
    fn from(hour: &HourlyLoad) -> Self {
        Self {
            timestamp: present::timestamp_key(hour),
            electricity_kw: hour.electricity_kw,
            natural_gas_kw: hour.natural_gas_kw,
            electric_heating_kw: hour.conditioning.map(|c| c.electric_heating_kw),
            gas_heating_kw: hour.conditioning.map(|c| c.gas_heating_kw),
            cooling_kw: hour.conditioning.map(|c| c.cooling_kw),
        }
    }
}

/// Writes every hourly row as a CSV spreadsheet.
pub fn write_spreadsheet(profile: &LoadProfile, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = out_dir.join(SPREADSHEET_FILE);
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;

    for hour in &profile.hours {
        writer.serialize(SpreadsheetRow::from(hour))?;
    }
    writer.flush()?;

    Ok(path)
}

pub fn write_json(summary: &ProfileSummary<'_>, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let path = out_dir.join(JSON_FILE);
    let file =
        File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    std::io::Write::flush(&mut writer)?;
    Ok(path)
}

/// Writes one HTML line chart per time window.
pub fn write_charts(profile: &LoadProfile, out_dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(TimeWindow::ALL.len());

    for window in TimeWindow::ALL {
        let hours = present::slice(&profile.hours, window);
        let html = build_chart(profile.method, window, hours)?;
        let path = out_dir.join(format!("profile_{}.html", window.label()));
        std::fs::write(&path, html).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

#[derive(Serialize)]
struct Trace<'a> {
    name: &'a str,
    x: Vec<String>,
    y: Vec<f64>,
    mode: &'static str,
    line: TraceLine,
}

#[derive(Serialize)]
struct TraceLine {
    width: u32,
}

pub fn build_chart(
    method: SynthesisMethod,
    window: TimeWindow,
    hours: &[HourlyLoad],
) -> anyhow::Result<String> {
    let x: Vec<String> = hours.iter().map(present::timestamp_key).collect();
    let mut traces = vec![Trace {
        name: "Electricity kW",
        x: x.clone(),
        y: hours.iter().map(|h| h.electricity_kw).collect(),
        mode: "lines",
        line: TraceLine { width: 3 },
    }];

    if method == SynthesisMethod::Doe {
        traces.push(Trace {
            name: "Natural Gas kW",
            x,
            y: hours.iter().map(|h| h.natural_gas_kw.unwrap_or(0.0)).collect(),
            mode: "lines",
            line: TraceLine { width: 3 },
        });
    }

    let layout = serde_json::json!({
        "title": { "text": window.title() },
        "xaxis": { "title": { "text": "Time (hours)" } },
        "yaxis": { "title": { "text": "Load (kW)" } },
        "font": { "family": "Courier New, monospace", "size": 18 },
    });

    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html>");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"utf-8\">");
    let _ = writeln!(output, "<title>{} ({})</title>", window.title(), method.as_str());
    let _ = writeln!(output, "<script src=\"{PLOTLY_CDN}\"></script>");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<div id=\"profile\"></div>");
    let _ = writeln!(output, "<script>");
    let _ = writeln!(
        output,
        "Plotly.newPlot(\"profile\", {}, {});",
        serde_json::to_string(&traces)?,
        serde_json::to_string(&layout)?
    );
    let _ = writeln!(output, "</script>");
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");

    Ok(output)
}
