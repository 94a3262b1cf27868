use std::{io,fs};
use std::fs::File;
use std::path::Path;

use serde::Serialize;
use chrono::naive::NaiveDate;
use tracing::{info,debug};

use super::aggregate::{Point,AggregatedSeries};
use super::fanout::{self,Fanout};
use super::normalize::NormalizedRecord;
use super::regions::Region;
use super::error::Result;


pub const COUNTRY : &str = "Brazil";


#[derive(Serialize)]
struct NationalRow {
    date: NaiveDate,
    country: &'static str,
    epidemiological_week: Option<u32>,
    accumulated_num_cases: i64,
    accumulated_num_deaths: i64,
    new_num_cases: i64,
    new_num_deaths: i64
}

#[derive(Serialize)]
struct RegionalRow {
    date: NaiveDate,
    region: Region,
    accumulated_num_cases: i64,
    accumulated_num_deaths: i64,
    new_num_cases: i64,
    new_num_deaths: i64
}

#[derive(Serialize)]
struct StateRow<'a> {
    date: NaiveDate,
    state: &'a str,
    accumulated_num_cases: i64,
    accumulated_num_deaths: i64,
    new_num_cases: i64,
    new_num_deaths: i64
}

fn national_rows(series: &AggregatedSeries) -> Vec<NationalRow> {
    series.points.iter().map(|p| NationalRow {
	date: p.date,
	country: COUNTRY,
	epidemiological_week: p.epidemiological_week,
	accumulated_num_cases: p.accumulated_cases,
	accumulated_num_deaths: p.accumulated_deaths,
	new_num_cases: p.new_cases,
	new_num_deaths: p.new_deaths
    }).collect()
}

fn regional_row(region: Region, p: &Point) -> RegionalRow {
    RegionalRow {
	date: p.date,
	region,
	accumulated_num_cases: p.accumulated_cases,
	accumulated_num_deaths: p.accumulated_deaths,
	new_num_cases: p.new_cases,
	new_num_deaths: p.new_deaths
    }
}

fn state_rows<'a>(state: &'a str, series: &AggregatedSeries) -> Vec<StateRow<'a>> {
    series.points.iter().map(|p| StateRow {
	date: p.date,
	state,
	accumulated_num_cases: p.accumulated_cases,
	accumulated_num_deaths: p.accumulated_deaths,
	new_num_cases: p.new_cases,
	new_num_deaths: p.new_deaths
    }).collect()
}


/// Writes the cleaned dataset and every aggregated series below `data_path`.
pub fn save_all(data_path: &Path, records: &[NormalizedRecord], data: &Fanout) -> Result<()> {

    save_csv(&data_path.join("covid19-dataset-brasil-io_cleaned.csv"), records)?;

    let national = national_rows(&data.country);
    save_csv(&data_path.join("national/covid19-dataset-brasil.csv"), &national)?;
    save_json(&data_path.join("jsons/national_data.json"), &national)?;

    let combined = fanout::concat_regions(&data.regions);
    let regional : Vec<_> = combined.iter().map(|row| regional_row(row.region, &row.point)).collect();
    save_csv(&data_path.join("regions/covid19-regions.csv"), &regional)?;

    for (region,series) in &fanout::split_by_region(&combined) {
	let rows : Vec<_> = series.points.iter().map(|p| regional_row(*region, p)).collect();
	save_csv(&data_path.join(format!("regions/covid19-{}.csv", region.name())), &rows)?;
	save_json(&data_path.join(format!("jsons/region_{}.json", region.slug())), &rows)?;
    }

    for (state,series) in &data.states {
	let rows = state_rows(state, series);
	save_csv(&data_path.join(format!("states/{}/covid19-dataset-{}.csv", state, state)), &rows)?;
	save_json(&data_path.join(format!("jsons/state_{}_data.json", state.to_lowercase())), &rows)?;
    }

    info!(path = %data_path.display(), "Datasets saved");
    Ok(())

}


fn save_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
	fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
	writer.serialize(row)?;
    }
    writer.flush()?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote CSV");
    Ok(())
}

fn save_json<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
	fs::create_dir_all(parent)?;
    }
    serde_json::to_writer(io::BufWriter::new(File::create(path)?), rows)?;
    debug!(path = %path.display(), rows = rows.len(), "Wrote JSON");
    Ok(())
}
