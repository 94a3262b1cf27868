use serde::Serialize;
use chrono::naive::NaiveDate;
use tracing::info;

use super::brasilio::{RawRecord,PlaceType};
use super::regions::{self,Region};
use super::error::{Result,Error};


#[derive(Serialize,Clone,PartialEq,Debug)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub last_available_date: NaiveDate,
    pub is_last: bool,
    pub region: Region,
    pub state: String,
    pub epidemiological_week: u32,
    pub accumulated_cases: i64,
    pub accumulated_deaths: i64,
    pub new_cases: i64,
    pub new_deaths: i64
}


pub fn normalize(raw: Vec<RawRecord>) -> Result<Vec<NormalizedRecord>> {

    if raw.is_empty() {
	return Err(Error::EmptyInput("no raw records"));
    }

    let total = raw.len();
    let records = raw.into_iter()
	.filter(|r| r.place_type == PlaceType::State)
	.map(|r| Ok(NormalizedRecord {
	    region: regions::region_of(&r.state).ok_or_else(
		|| Error::Schema(format!("state {:?} on {} has no region", r.state, r.date)))?,
	    date: r.date,
	    last_available_date: r.last_available_date,
	    is_last: r.is_last,
	    state: r.state,
	    epidemiological_week: r.epidemiological_week,
	    accumulated_cases: r.last_available_confirmed,
	    accumulated_deaths: r.last_available_deaths,
	    new_cases: r.new_confirmed,
	    new_deaths: r.new_deaths
	}))
	.collect::<Result<Vec<_>>>()?;

    if records.is_empty() {
	return Err(Error::EmptyInput("no state-level records"));
    }

    info!(kept = records.len(), dropped = total - records.len(), "Dataset cleaned");
    Ok(records)

}
