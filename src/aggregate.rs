use std::fmt;
use std::collections::{BTreeMap,BTreeSet};

use serde::Serialize;
use chrono::naive::NaiveDate;
use tracing::warn;

use super::axis::DateAxis;
use super::normalize::NormalizedRecord;
use super::regions::Region;
use super::error::{Result,Error};


#[derive(Clone,PartialEq,Eq,Debug)]
pub enum Scope {
    Country,
    Region(Region),
    State(String)
}

impl Scope {

    pub fn matches(&self, record: &NormalizedRecord) -> bool {
	match self {
	    Self::Country => true,
	    Self::Region(region) => record.region == *region,
	    Self::State(state) => record.state == *state
	}
    }

    /// Only the national series carries epidemiological week labels.
    fn tracks_week(&self) -> bool {
	*self == Self::Country
    }

}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match self {
	    Self::Country => write!(f, "country"),
	    Self::Region(region) => write!(f, "region {}", region),
	    Self::State(state) => write!(f, "state {}", state)
	}
    }
}


#[derive(Serialize,Clone,Copy,PartialEq,Eq,Debug)]
pub struct Point {
    pub date: NaiveDate,
    pub epidemiological_week: Option<u32>,
    pub accumulated_cases: i64,
    pub accumulated_deaths: i64,
    pub new_cases: i64,
    pub new_deaths: i64
}

#[derive(Clone,PartialEq,Debug)]
pub struct AggregatedSeries {
    pub scope: Scope,
    pub points: Vec<Point>
}

impl AggregatedSeries {

    pub fn latest(&self) -> Option<&Point> {
	self.points.last()
    }

}


#[derive(Default)]
struct Totals {
    accumulated_cases: i64,
    accumulated_deaths: i64,
    new_cases: i64,
    new_deaths: i64,
    weeks: BTreeSet<u32>
}

impl Totals {

    fn add(&mut self, record: &NormalizedRecord) {
	self.accumulated_cases += record.accumulated_cases;
	self.accumulated_deaths += record.accumulated_deaths;
	self.new_cases += record.new_cases;
	self.new_deaths += record.new_deaths;
	self.weeks.insert(record.epidemiological_week);
    }

    fn point(&self, date: NaiveDate, week: Option<u32>) -> Point {
	Point {
	    date,
	    epidemiological_week: week,
	    accumulated_cases: self.accumulated_cases,
	    accumulated_deaths: self.accumulated_deaths,
	    new_cases: self.new_cases,
	    new_deaths: self.new_deaths
	}
    }

}

fn week_of(scope: &Scope, date: NaiveDate, weeks: &BTreeSet<u32>) -> Option<u32> {
    if weeks.len() > 1 {
	warn!(scope = %scope, date = %date, weeks = ?weeks,
	      "Records disagree on the epidemiological week, using the latest");
    }
    weeks.iter().next_back().copied()
}


/// Rolls the records matching `scope` onto the date axis.
///
/// Every axis date but the last sums the records dated exactly on that day.
/// The last entry instead sums the `is_last` records, so that states that
/// report with a delay still contribute their most recent values.
pub fn aggregate(records: &[NormalizedRecord], scope: &Scope,
		 axis: &DateAxis, last_available_date: NaiveDate) -> Result<AggregatedSeries> {

    let (final_date, history) = axis.dates().split_last()
	.ok_or(Error::EmptyInput("empty date axis"))?;
    let first_date = history.first().unwrap_or(final_date);

    let mut by_date : BTreeMap<NaiveDate,Totals> = BTreeMap::new();
    let mut latest = Totals::default();
    let mut matched = 0usize;

    for record in records.iter().filter(|r| scope.matches(r)) {
	if record.is_last || (record.date >= *first_date && record.date <= *final_date) {
	    matched += 1;
	}
	by_date.entry(record.date).or_default().add(record);
	if record.is_last {
	    latest.add(record);
	}
    }

    if matched == 0 {
	return Err(Error::ScopeMismatch(scope.to_string()));
    }

    let empty = Totals::default();
    let mut points : Vec<Point> = history.iter().map(|date| {
	let totals = by_date.get(date).unwrap_or(&empty);
	let week = match scope.tracks_week() {
	    true => week_of(scope, *date, &totals.weeks),
	    false => None
	};
	totals.point(*date, week)
    }).collect();

    // Week label of the records dated on the reporting date.
    let week = match scope.tracks_week() {
	true => by_date.get(&last_available_date)
	    .and_then(|totals| week_of(scope, last_available_date, &totals.weeks)),
	false => None
    };
    points.push(latest.point(*final_date, week));

    Ok(AggregatedSeries { scope: scope.clone(), points })

}


#[derive(Serialize,Clone,Copy,PartialEq,Eq,Debug)]
pub struct WeekTotals {
    pub epidemiological_week: u32,
    pub new_cases: i64,
    pub new_deaths: i64
}

/// Sums daily new cases and deaths per epidemiological week, in the order the
/// weeks first appear. Days without a week label are skipped.
pub fn weekly_totals(series: &AggregatedSeries) -> Vec<WeekTotals> {
    let mut weeks : Vec<WeekTotals> = Vec::new();
    for point in &series.points {
	let week = match point.epidemiological_week {
	    Some(week) => week,
	    None => continue
	};
	match weeks.iter_mut().find(|w| w.epidemiological_week == week) {
	    Some(totals) => {
		totals.new_cases += point.new_cases;
		totals.new_deaths += point.new_deaths;
	    },
	    None => weeks.push(WeekTotals {
		epidemiological_week: week,
		new_cases: point.new_cases,
		new_deaths: point.new_deaths
	    })
	}
    }
    weeks
}


#[cfg(test)]
mod tests {

    use super::*;
    use crate::axis::{epoch,build_axis};
    use crate::normalize::tests::record;

    fn date(s: &str) -> NaiveDate {
	NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn sums_states_of_a_region_on_a_date() {
	let records = vec![
	    record("SP", "2020-02-25", false, 10),
	    record("RJ", "2020-02-25", false, 15),
	    record("RS", "2020-02-25", false, 100),
	    record("SP", "2020-02-26", true, 12),
	    record("RJ", "2020-02-26", true, 16),
	    record("RS", "2020-02-26", true, 101),
	];
	let (axis, last) = build_axis(&records).unwrap();
	let series = aggregate(&records, &Scope::Region(Region::Sudeste), &axis, last).unwrap();
	assert_eq!(series.points.len(), 2);
	assert_eq!(series.points[0].accumulated_cases, 25);
	assert_eq!(series.points[0].accumulated_deaths, 2);
	assert_eq!(series.points[0].new_cases, 2);
	assert_eq!(series.points[0].epidemiological_week, None);
	assert_eq!(series.points[1].accumulated_cases, 28);
    }

    #[test]
    fn dates_without_records_are_zero() {
	let records = vec![
	    record("SP", "2020-02-25", false, 1),
	    record("SP", "2020-02-28", true, 3),
	];
	let (axis, last) = build_axis(&records).unwrap();
	let series = aggregate(&records, &Scope::Country, &axis, last).unwrap();
	assert_eq!(series.points.len(), 4);
	assert_eq!(series.points[1], Point {
	    date: date("2020-02-26"),
	    epidemiological_week: None,
	    accumulated_cases: 0,
	    accumulated_deaths: 0,
	    new_cases: 0,
	    new_deaths: 0
	});
	assert_eq!(series.points[2].accumulated_cases, 0);
	assert_eq!(series.points[3].accumulated_cases, 3);
    }

    #[test]
    fn final_entry_uses_each_states_latest_record() {
	// RJ has not reported for the reporting date yet
	let records = vec![
	    record("SP", "2020-02-25", false, 5),
	    record("RJ", "2020-02-25", true, 7),
	    record("SP", "2020-02-26", true, 9),
	];
	let (axis, last) = build_axis(&records).unwrap();
	assert_eq!(last, date("2020-02-26"));
	let series = aggregate(&records, &Scope::Country, &axis, last).unwrap();
	assert_eq!(series.points[0].accumulated_cases, 12);
	assert_eq!(series.latest().unwrap().accumulated_cases, 16);
	assert_eq!(series.latest().unwrap().date, last);
	let region = aggregate(&records, &Scope::Region(Region::Sudeste), &axis, last).unwrap();
	assert_eq!(region.latest().unwrap().accumulated_cases, 16);
    }

    #[test]
    fn country_series_carries_epidemiological_weeks() {
	let mut late = record("SP", "2020-03-01", true, 4);
	late.epidemiological_week = 202010;
	let mut early = record("RJ", "2020-02-29", true, 2);
	early.epidemiological_week = 202009;
	let records = vec![record("SP", "2020-02-25", false, 1), early, late];
	let (axis, last) = build_axis(&records).unwrap();
	let series = aggregate(&records, &Scope::Country, &axis, last).unwrap();
	assert_eq!(series.points[0].epidemiological_week, Some(202009));
	assert_eq!(series.points[4].epidemiological_week, Some(202009));
	assert_eq!(series.latest().unwrap().epidemiological_week, Some(202010));
	assert_eq!(series.latest().unwrap().accumulated_cases, 6);
    }

    #[test]
    fn conflicting_weeks_resolve_to_the_latest() {
	let mut other = record("RJ", "2020-02-25", false, 1);
	other.epidemiological_week = 202010;
	let records = vec![record("SP", "2020-02-25", false, 1), other,
			   record("SP", "2020-02-26", true, 1)];
	let (axis, last) = build_axis(&records).unwrap();
	let series = aggregate(&records, &Scope::Country, &axis, last).unwrap();
	assert_eq!(series.points[0].epidemiological_week, Some(202010));
    }

    #[test]
    fn scope_without_records_is_an_error() {
	let records = vec![record("SP", "2020-02-25", true, 1)];
	let (axis, last) = build_axis(&records).unwrap();
	let res = aggregate(&records, &Scope::Region(Region::Sul), &axis, last);
	assert!(matches!(res, Err(Error::ScopeMismatch(_))));
	let res = aggregate(&records, &Scope::State("XX".to_string()), &axis, last);
	assert!(matches!(res, Err(Error::ScopeMismatch(_))));
    }

    #[test]
    fn scope_with_only_off_axis_records_is_an_error() {
	let records = vec![
	    record("SP", "2020-02-25", false, 1),
	    record("SP", "2020-02-26", true, 2),
	    record("RS", "2020-01-10", false, 3),
	];
	let (axis, last) = build_axis(&records).unwrap();
	assert_eq!(axis.len(), 2);
	let res = aggregate(&records, &Scope::Region(Region::Sul), &axis, last);
	assert!(matches!(res, Err(Error::ScopeMismatch(_))));
	let res = aggregate(&records, &Scope::State("RS".to_string()), &axis, last);
	assert!(matches!(res, Err(Error::ScopeMismatch(_))));
	let country = aggregate(&records, &Scope::Country, &axis, last).unwrap();
	assert_eq!(country.points[0].accumulated_cases, 1);
    }

    #[test]
    fn final_week_comes_from_records_on_the_reporting_date() {
	let mut stale = record("RJ", "2020-02-25", true, 7);
	stale.epidemiological_week = 202008;
	let mut current = record("SP", "2020-02-26", true, 9);
	current.epidemiological_week = 202009;
	let records = vec![stale, current];
	let (axis, last) = build_axis(&records).unwrap();
	let series = aggregate(&records, &Scope::Country, &axis, last).unwrap();
	assert_eq!(series.points[0].epidemiological_week, Some(202008));
	assert_eq!(series.latest().unwrap().epidemiological_week, Some(202009));
	assert_eq!(series.latest().unwrap().accumulated_cases, 16);
	let region = aggregate(&records, &Scope::Region(Region::Sudeste), &axis, last).unwrap();
	assert_eq!(region.latest().unwrap().epidemiological_week, None);
    }

    #[test]
    fn empty_axis_is_an_error() {
	let records = vec![record("SP", "2020-02-25", true, 1)];
	let axis = DateAxis::new(epoch(), date("2020-01-01"));
	let res = aggregate(&records, &Scope::Country, &axis, epoch());
	assert!(matches!(res, Err(Error::EmptyInput(_))));
    }

    #[test]
    fn weekly_totals_in_order_of_appearance() {
	let point = |d: &str, week, new_cases| Point {
	    date: date(d),
	    epidemiological_week: week,
	    accumulated_cases: 0,
	    accumulated_deaths: 0,
	    new_cases,
	    new_deaths: 1
	};
	let series = AggregatedSeries { scope: Scope::Country, points: vec![
	    point("2020-02-25", Some(202009), 1),
	    point("2020-02-26", None, 0),
	    point("2020-02-27", Some(202009), 2),
	    point("2020-03-01", Some(202010), 5),
	]};
	assert_eq!(weekly_totals(&series), vec![
	    WeekTotals { epidemiological_week: 202009, new_cases: 3, new_deaths: 2 },
	    WeekTotals { epidemiological_week: 202010, new_cases: 5, new_deaths: 1 },
	]);
    }

}
