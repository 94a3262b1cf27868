use std::fs;
use std::fmt::Write;
use std::path::{Path,PathBuf};

use chrono::naive::NaiveDate;
use tracing::info;

use super::aggregate::AggregatedSeries;
use super::error::{Result,Error};


pub const SOURCE : &str = "Fonte dos dados: http://brasil.io / Secretarias de Saúde";
pub const REPOSITORY : &str = "https://github.com/evnrodr/covid19-brazil";


/// Formats a count with `.` as the thousands separator, e.g. 1.234.567.
pub fn thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::new();
    if n < 0 {
	out.push('-');
    }
    for (i,c) in digits.chars().enumerate() {
	if i > 0 && (digits.len() - i) % 3 == 0 {
	    out.push('.');
	}
	out.push(c);
    }
    out
}

pub fn report_path(report_path: &Path, date: NaiveDate) -> PathBuf {
    report_path.join(date.format("%m-%Y").to_string())
	.join(format!("report_{}.txt", date.format("%d%m%Y")))
}

pub fn build_report(national: &AggregatedSeries, last_available_date: NaiveDate) -> Result<String> {

    let latest = national.latest().ok_or(Error::EmptyInput("empty national series"))?;
    let separator = "=================================";
    let mut out = String::new();

    writeln!(out, "Atualização COVID-19 no Brasil [{}]", last_available_date.format("%d/%m/%Y"))?;
    writeln!(out)?;
    writeln!(out, "| Casos Acumulados: {}", thousands(latest.accumulated_cases))?;
    writeln!(out, "| Óbitos Acumulados: {}", thousands(latest.accumulated_deaths))?;
    writeln!(out)?;
    writeln!(out, "| Qntd. de NOVOS Casos: {}", thousands(latest.new_cases))?;
    writeln!(out, "| Qntd. de NOVOS Óbitos: {}", thousands(latest.new_deaths))?;
    writeln!(out)?;
    writeln!(out, "{}", SOURCE)?;
    writeln!(out, "#ficaemcasa #DataScience #COVID19")?;
    write!(out, "\n\n{}\n\n", separator)?;
    write!(out, "Visualização por Semanas Epidemiológicas e visualizações Regionais:")?;
    write!(out, "\n\n{}\n\n", separator)?;
    writeln!(out, "Repositório do GitHub:")?;
    write!(out, "{}", REPOSITORY)?;

    Ok(out)

}

pub fn write_report(report_dir: &Path, national: &AggregatedSeries,
		    last_available_date: NaiveDate) -> Result<PathBuf> {
    let report = build_report(national, last_available_date)?;
    let path = report_path(report_dir, last_available_date);
    if let Some(parent) = path.parent() {
	fs::create_dir_all(parent)?;
    }
    fs::write(&path, report)?;
    info!(path = %path.display(), "Report generated");
    Ok(path)
}
