use chrono::naive::NaiveDate;
use tracing::info;

use super::aggregate::{self,Scope,Point,AggregatedSeries};
use super::axis::DateAxis;
use super::normalize::NormalizedRecord;
use super::regions::{self,Region,REGIONS};
use super::error::Result;


pub struct Fanout {
    pub country: AggregatedSeries,
    pub regions: Vec<(Region,AggregatedSeries)>,
    pub states: Vec<(&'static str,AggregatedSeries)>
}

pub fn fanout(records: &[NormalizedRecord], axis: &DateAxis,
	      last_available_date: NaiveDate) -> Result<Fanout> {

    let country = aggregate::aggregate(records, &Scope::Country, axis, last_available_date)?;
    info!(points = country.points.len(), "National data aggregated");

    let regions = REGIONS.iter().map(
	|region| Ok((*region, aggregate::aggregate(records, &Scope::Region(*region),
						   axis, last_available_date)?))
    ).collect::<Result<Vec<_>>>()?;
    info!(regions = regions.len(), "Regional data aggregated");

    let states = regions::states().map(
	|state| Ok((state, aggregate::aggregate(records, &Scope::State(state.to_string()),
						axis, last_available_date)?))
    ).collect::<Result<Vec<_>>>()?;
    info!(states = states.len(), "State data aggregated");

    Ok(Fanout { country, regions, states })

}


#[derive(Clone,Copy,PartialEq,Eq,Debug)]
pub struct RegionalPoint {
    pub region: Region,
    pub point: Point
}

/// Flattens the regional series into one region-tagged list, in region order.
pub fn concat_regions(regions: &[(Region,AggregatedSeries)]) -> Vec<RegionalPoint> {
    regions.iter().flat_map(
	|(region,series)| series.points.iter().map(
	    move |point| RegionalPoint { region: *region, point: *point })
    ).collect()
}

/// Inverse of [`concat_regions`].
pub fn split_by_region(rows: &[RegionalPoint]) -> Vec<(Region,AggregatedSeries)> {
    let mut regions : Vec<(Region,AggregatedSeries)> = Vec::new();
    for row in rows {
	match regions.iter_mut().find(|(region,_)| *region == row.region) {
	    Some((_,series)) => series.points.push(row.point),
	    None => regions.push((row.region, AggregatedSeries {
		scope: Scope::Region(row.region),
		points: vec![row.point]
	    }))
	}
    }
    regions
}


/// Per-state records dated on the reporting date, in region order.
pub fn state_snapshot(records: &[NormalizedRecord], date: NaiveDate) -> Vec<&NormalizedRecord> {
    let mut snapshot : Vec<_> = records.iter().filter(|r| r.date == date).collect();
    snapshot.sort_by_key(|r| regions::states().position(|s| s == r.state));
    snapshot
}
