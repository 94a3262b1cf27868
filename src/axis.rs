use chrono::naive::NaiveDate;

use super::normalize::NormalizedRecord;
use super::error::{Result,Error};


/// Day of the first confirmed case in Brazil.
pub fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 2, 25).expect("valid epoch date")
}


#[derive(Clone,Debug)]
pub struct NaiveDateRange(pub NaiveDate,pub Option<NaiveDate>);

impl Iterator for NaiveDateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<NaiveDate> {
	match self.1.map_or(true, |end| self.0 <= end) {
	    false => None,
	    true => {
		let current = self.0;
		match self.0.succ_opt() {
		    Some(next) => self.0 = next,
		    None => self.1 = self.0.pred_opt()
		}
		Some(current)
	    }
	}
    }
}


#[derive(Clone,PartialEq,Debug)]
pub struct DateAxis(Vec<NaiveDate>);

impl DateAxis {

    pub fn new(first: NaiveDate, last: NaiveDate) -> Self {
	Self(NaiveDateRange(first, Some(last)).collect())
    }

    pub fn dates(&self) -> &[NaiveDate] {
	&self.0
    }

    pub fn len(&self) -> usize {
	self.0.len()
    }

    pub fn is_empty(&self) -> bool {
	self.0.is_empty()
    }

}


/// Returns the axis from the epoch through the reporting date, which is the
/// latest date among the records flagged `is_last`.
pub fn build_axis(records: &[NormalizedRecord]) -> Result<(DateAxis, NaiveDate)> {

    let last_available_date = records.iter()
	.filter(|r| r.is_last)
	.map(|r| r.date)
	.max()
	.ok_or(Error::EmptyInput("no records flagged is_last"))?;

    let axis = DateAxis::new(epoch(), last_available_date);
    if axis.is_empty() {
	return Err(Error::EmptyInput("reporting date precedes the first case"));
    }

    Ok((axis, last_available_date))

}
