use std::{io,fs};
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::naive::NaiveDate;
use serde_json::{Value,json};
use tracing::info;

use super::aggregate::{self,AggregatedSeries};
use super::normalize::NormalizedRecord;
use super::regions::{self,Region};
use super::error::Result;


const CASES_COLOR : &str = "#1F77B4";
const DEATHS_COLOR : &str = "red";


fn date_str(date: NaiveDate) -> String {
    format!("{}", date.format("%Y-%m-%d"))
}

fn footer(date: NaiveDate) -> String {
    format!("Fonte: Brasil.IO em: {}", date.format("%d/%m/%Y"))
}


/// Writes the full chart set for one run.
pub fn all_graphs(graph_path: &Path, national: &AggregatedSeries,
		  regional: &[(Region,AggregatedSeries)], snapshot: &[&NormalizedRecord],
		  last_available_date: NaiveDate) -> Result<()> {

    national_acc_graph(graph_path, national, last_available_date)?;
    national_daily_graph(graph_path, national, last_available_date)?;
    epidemiological_weeks_graph(graph_path, national, last_available_date)?;
    state_acc_graph(graph_path, snapshot, last_available_date)?;
    state_daily_graph(graph_path, snapshot, last_available_date)?;
    regional_acc_graph(graph_path, regional, last_available_date)?;
    regional_daily_graph(graph_path, regional, last_available_date)?;

    info!(path = %graph_path.display(), "Plots generated");
    Ok(())

}


pub fn national_acc_graph(graph_path: &Path, data: &AggregatedSeries,
			  date: NaiveDate) -> Result<()> {
    let title = format!("Números de casos e óbitos acumulados de COVID-19 no Brasil até {}",
			date.format("%d/%m/%Y"));
    graph(graph_path, "01_national_acc.html", &title, &footer(date), vec![
	line_panel("Número de casos confirmados (acumulados)", "Nº de Casos", CASES_COLOR,
		   &[("Casos Acumulados".to_string(), data.points.iter().map(
		       |p| (p.date, p.accumulated_cases)).collect::<Vec<_>>())]),
	line_panel("Número de óbitos confirmados (acumulados)", "Nº de Óbitos", DEATHS_COLOR,
		   &[("Óbitos Acumulados".to_string(), data.points.iter().map(
		       |p| (p.date, p.accumulated_deaths)).collect::<Vec<_>>())])
    ])
}

pub fn national_daily_graph(graph_path: &Path, data: &AggregatedSeries,
			    date: NaiveDate) -> Result<()> {
    let title = format!("Números de casos e óbitos diários de COVID-19 no Brasil até {}",
			date.format("%d/%m/%Y"));
    graph(graph_path, "02_national_new.html", &title, &footer(date), vec![
	line_panel("Número de casos confirmados (diários)", "Nº de Casos", CASES_COLOR,
		   &[("Casos Diários".to_string(), data.points.iter().map(
		       |p| (p.date, p.new_cases)).collect::<Vec<_>>())]),
	line_panel("Número de óbitos confirmados (diários)", "Nº de Óbitos", DEATHS_COLOR,
		   &[("Óbitos Diários".to_string(), data.points.iter().map(
		       |p| (p.date, p.new_deaths)).collect::<Vec<_>>())])
    ])
}

/// Week labels are rendered as `WW-YYYY`.
fn week_label(week: u32) -> String {
    format!("{:02}-{}", week % 100, week / 100)
}

pub fn epidemiological_weeks_graph(graph_path: &Path, data: &AggregatedSeries,
				   date: NaiveDate) -> Result<()> {
    let weeks = aggregate::weekly_totals(data);
    let current = weeks.last().map_or(String::new(), |w| format!(
	"Semana atual: {:02} de {} | ", w.epidemiological_week % 100, w.epidemiological_week / 100));
    graph(graph_path, "03_epidemiological_weeks.html",
	  "Número de Casos e Óbitos de COVID-19 p/ Semana Epidemiológica no Brasil",
	  &format!("{}{}", current, footer(date)), vec![
	      bar_panel("Número de casos p/ semana", "Nº de Casos", CASES_COLOR, "Semana",
			&weeks.iter().map(|w| (week_label(w.epidemiological_week), w.new_cases)).collect::<Vec<_>>()),
	      bar_panel("Número de óbitos p/ semana", "Nº de Óbitos", DEATHS_COLOR, "Semana",
			&weeks.iter().map(|w| (week_label(w.epidemiological_week), w.new_deaths)).collect::<Vec<_>>())
	  ])
}

/// States whose latest report predates the reporting date.
pub fn not_updated(snapshot: &[&NormalizedRecord], date: NaiveDate) -> Vec<String> {
    snapshot.iter().filter(|r| r.last_available_date != date)
	.map(|r| r.state.clone()).collect()
}

fn state_subtitle(snapshot: &[&NormalizedRecord], date: NaiveDate) -> String {
    match not_updated(snapshot, date) {
	states if states.is_empty() => footer(date),
	states => format!("Estados ainda não atualizados: {} | {}", states.join(" "), footer(date))
    }
}

fn state_label(record: &NormalizedRecord) -> String {
    regions::state_name(&record.state).map_or(record.state.clone(),
					       |name| format!("{} ({})", record.state, name))
}

pub fn state_acc_graph(graph_path: &Path, snapshot: &[&NormalizedRecord],
		       date: NaiveDate) -> Result<()> {
    let title = format!("Número de Casos e Óbitos acumulados de COVID-19 nos Estados do Brasil até {}",
			date.format("%d/%m/%Y"));
    graph(graph_path, "04_state_acc.html", &title, &state_subtitle(snapshot, date), vec![
	bar_panel("Número de casos confirmados (acumulados)", "Nº de Casos", CASES_COLOR, "Estado",
		  &snapshot.iter().map(|r| (state_label(r), r.accumulated_cases)).collect::<Vec<_>>()),
	bar_panel("Número de óbitos confirmados (acumulados)", "Nº de Óbitos", DEATHS_COLOR, "Estado",
		  &snapshot.iter().map(|r| (state_label(r), r.accumulated_deaths)).collect::<Vec<_>>())
    ])
}

pub fn state_daily_graph(graph_path: &Path, snapshot: &[&NormalizedRecord],
			 date: NaiveDate) -> Result<()> {
    let title = format!("Número de Casos e Óbitos de HOJE de COVID-19 nos Estados do Brasil até {}",
			date.format("%d/%m/%Y"));
    graph(graph_path, "05_state_new.html", &title, &state_subtitle(snapshot, date), vec![
	bar_panel("Número de casos confirmados (diário)", "Nº de Casos", CASES_COLOR, "Estado",
		  &snapshot.iter().map(|r| (state_label(r), r.new_cases)).collect::<Vec<_>>()),
	bar_panel("Número de óbitos confirmados (diário)", "Nº de Óbitos", DEATHS_COLOR, "Estado",
		  &snapshot.iter().map(|r| (state_label(r), r.new_deaths)).collect::<Vec<_>>())
    ])
}

pub fn regional_acc_graph(graph_path: &Path, data: &[(Region,AggregatedSeries)],
			  date: NaiveDate) -> Result<()> {
    let title = format!("Número de Casos e Óbitos acumulados de COVID-19 nas Regiões do Brasil até {}",
			date.format("%d/%m/%Y"));
    let series = |f: fn(&aggregate::Point) -> i64| data.iter().map(
	|(region,series)| (format!("Região {}", region), series.points.iter().map(
	    |p| (p.date, f(p))).collect::<Vec<_>>())
    ).collect::<Vec<_>>();
    graph(graph_path, "06_regional_acc.html", &title, &footer(date), vec![
	line_panel("Número de casos confirmados (acumulados)", "Nº de Casos", CASES_COLOR,
		   &series(|p| p.accumulated_cases)),
	line_panel("Número de óbitos confirmados (acumulados)", "Nº de Óbitos", DEATHS_COLOR,
		   &series(|p| p.accumulated_deaths))
    ])
}

pub fn regional_daily_graph(graph_path: &Path, data: &[(Region,AggregatedSeries)],
			    date: NaiveDate) -> Result<()> {
    let title = format!("Número de Casos e Óbitos de HOJE de COVID-19 nas Regiões do Brasil até {}",
			date.format("%d/%m/%Y"));
    let latest = |f: fn(&aggregate::Point) -> i64| data.iter().map(
	|(region,series)| (region.name().to_string(), series.latest().map_or(0, f))
    ).collect::<Vec<_>>();
    graph(graph_path, "07_regional_new.html", &title, &footer(date), vec![
	arc_panel("Número de casos confirmados (diário)", &latest(|p| p.new_cases)),
	arc_panel("Número de óbitos confirmados (diário)", &latest(|p| p.new_deaths))
    ])
}


fn line_panel(title: &str, ytitle: &str, color: &str,
	      data: &[(String,Vec<(NaiveDate,i64)>)]) -> Value {
    let color = match data.len() {
	1 => json!({"value": color}),
	_ => json!({"field": "Series", "type": "nominal", "sort": null})
    };
    json!({
	"title": title,
	"width": "container",
	"data": {
	    "values": data.iter().flat_map(
		|(name,vals)| vals.iter().map(
		    move |(date,val)| json!({
			"Date": date_str(*date),
			"Series": name,
			"Value": val
		    }))
	    ).collect::<Vec<_>>()
	},
	"encoding": {
	    "color": color,
	    "x": {
		"field": "Date",
		"timeUnit": "utcyearmonthdate",
		"title": "Data",
		"type": "temporal"
	    },
	    "y": {
		"field": "Value",
		"title": ytitle,
		"type": "quantitative",
		"axis": {"format": ",d"}
	    }
	},
	"layer": [
	    {
		"mark": "line",
		"selection": {
		    "Highlight": {"bind": "legend", "type": "multi", "fields": ["Series"]},
		    "Grid": {"bind": "scales", "type": "interval"}
		},
		"encoding": {
		    "opacity": {"value": 0.1, "condition": {"value": 1, "selection": "Highlight"}}
		}
	    },
	    {
		"mark": "point",
		"selection": {
		    "Hover": {
			"nearest": true,
			"empty": "none",
			"clear": "mouseout",
			"type": "single",
			"on": "mouseover",
			"fields": ["Date"]
		    }
		},
		"encoding": {
		    "opacity": {"value": 0, "condition": {"value": 1, "selection": "Hover"}},
		    "tooltip": [
			{"field": "Date", "type": "temporal"},
			{"field": "Series", "type": "nominal"},
			{"field": "Value", "type": "quantitative", "format": ",d"}
		    ]
		}
	    }
	]
    })
}

fn bar_panel(title: &str, ytitle: &str, color: &str, xtitle: &str, data: &[(String,i64)]) -> Value {
    json!({
	"title": title,
	"width": "container",
	"data": {
	    "values": data.iter().map(|(key,val)| json!({"Key": key, "Value": val})).collect::<Vec<_>>()
	},
	"mark": {"type": "bar", "color": color, "tooltip": {"content": "data"}},
	"encoding": {
	    "x": {"field": "Key", "type": "ordinal", "title": xtitle, "sort": null},
	    "y": {"field": "Value", "type": "quantitative", "title": ytitle, "axis": {"format": ",d"}}
	}
    })
}

fn arc_panel(title: &str, data: &[(String,i64)]) -> Value {
    let total : i64 = data.iter().map(|(_,v)| *v).sum();
    json!({
	"title": title,
	"data": {
	    "values": data.iter().map(|(key,val)| json!({
		"Region": key,
		"Value": val,
		"Share": match total { 0 => 0.0, t => *val as f64 / t as f64 }
	    })).collect::<Vec<_>>()
	},
	"mark": {"type": "arc", "tooltip": {"content": "data"}},
	"encoding": {
	    "theta": {"field": "Value", "type": "quantitative", "stack": true},
	    "color": {"field": "Region", "type": "nominal", "sort": null}
	}
    })
}


fn graph(graph_path: &Path, path: &str, title: &str, subtitle: &str,
	 panels: Vec<Value>) -> Result<()> {

    fs::create_dir_all(graph_path)?;
    let mut out = io::BufWriter::new(File::create(graph_path.join(path))?);

    write!(out, "<!DOCTYPE html><html><head>")?;
    write!(out, "<meta charset=\"UTF-8\">")?;
    write!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    write!(out, "<title>{}</title>", title)?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega@5\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-lite@4\"></script>")?;
    write!(out, "<script src=\"https://cdn.jsdelivr.net/npm/vega-embed\"></script>")?;
    write!(out, "</head>")?;
    write!(out, "<body>")?;
    write!(out, "<div id=\"vis\" style=\"width: 100%;\"></div>")?;
    write!(out, "<script type=\"text/javascript\">")?;
    write!(out, "var spec = ")?;

    serde_json::to_writer_pretty(out.by_ref(), &json!({
	"$schema": "https://vega.github.io/schema/vega-lite/v4.json",
	"title": {"text": title, "subtitle": subtitle},
	"autosize": {"type": "fit-x", "contains": "padding"},
	"vconcat": panels
    }))?;

    write!(out, ";vegaEmbed('#vis', spec,{{}}).then(function(result) {{")?;
    write!(out, "}}).catch(console.error);")?;
    write!(out, "</script>")?;
    write!(out, "</body></html>")?;

    out.flush()?;
    Ok(())

}
