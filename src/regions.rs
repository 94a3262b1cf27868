use std::fmt;
use std::collections::HashMap;

use serde::{Serialize,Deserialize};
use lazy_static::lazy_static;
use unidecode::unidecode;


#[derive(Serialize,Deserialize,Clone,Copy,PartialEq,Eq,PartialOrd,Ord,Hash,Debug)]
pub enum Region {
    Norte,
    Nordeste,
    #[serde(rename = "Centro-Oeste")]
    CentroOeste,
    Sudeste,
    Sul
}

pub static REGIONS : [Region; 5] = [
    Region::Norte,
    Region::Nordeste,
    Region::CentroOeste,
    Region::Sudeste,
    Region::Sul
];

static ESTADOS : [(Region, &[(&str, &str)]); 5] = [
    (Region::Norte, &[("AC", "Acre"),
		      ("AP", "Amapá"),
		      ("AM", "Amazonas"),
		      ("TO", "Tocantins"),
		      ("PA", "Pará"),
		      ("RR", "Roraima"),
		      ("RO", "Rondônia")]),
    (Region::Nordeste, &[("AL", "Alagoas"),
			 ("BA", "Bahia"),
			 ("PB", "Paraíba"),
			 ("PE", "Pernambuco"),
			 ("SE", "Sergipe"),
			 ("PI", "Piauí"),
			 ("CE", "Ceará"),
			 ("MA", "Maranhão"),
			 ("RN", "Rio Grande do Norte")]),
    (Region::CentroOeste, &[("MT", "Mato Grosso"),
			    ("GO", "Goiás"),
			    ("MS", "Mato Grosso do Sul"),
			    ("DF", "Distrito Federal")]),
    (Region::Sudeste, &[("SP", "São Paulo"),
			("ES", "Espírito Santo"),
			("RJ", "Rio de Janeiro"),
			("MG", "Minas Gerais")]),
    (Region::Sul, &[("SC", "Santa Catarina"),
		    ("RS", "Rio Grande do Sul"),
		    ("PR", "Paraná")])
];

lazy_static! {
    static ref BY_STATE : HashMap<&'static str, (Region, &'static str)> = ESTADOS.iter()
	.flat_map(|&(region,estados)| estados.iter().map(move |&(code,name)| (code, (region, name))))
	.collect();
}


impl Region {

    pub fn name(&self) -> &'static str {
	match self {
	    Self::Norte => "Norte",
	    Self::Nordeste => "Nordeste",
	    Self::CentroOeste => "Centro-Oeste",
	    Self::Sudeste => "Sudeste",
	    Self::Sul => "Sul"
	}
    }

    /// ASCII file name component, e.g. "centrooeste".
    pub fn slug(&self) -> String {
	unidecode(self.name()).to_lowercase().replace('-', "")
    }

    pub fn states(&self) -> impl Iterator<Item = &'static str> {
	let region = *self;
	ESTADOS.iter().filter(move |(r,_)| *r == region)
	    .flat_map(|&(_,estados)| estados.iter().map(|&(code,_)| code))
    }

}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	write!(f, "{}", self.name())
    }
}


pub fn region_of(state: &str) -> Option<Region> {
    BY_STATE.get(state).map(|(region,_)| *region)
}

pub fn state_name(state: &str) -> Option<&'static str> {
    BY_STATE.get(state).map(|(_,name)| *name)
}

/// All 27 state codes, grouped in region order.
pub fn states() -> impl Iterator<Item = &'static str> {
    REGIONS.iter().flat_map(|region| region.states())
}


#[cfg(test)]
mod tests {

    use std::collections::HashSet;
    use super::*;

    #[test]
    fn regions_partition_the_27_states() {
	let all : Vec<_> = REGIONS.iter().flat_map(|r| r.states()).collect();
	let unique : HashSet<_> = all.iter().collect();
	assert_eq!(all.len(), 27);
	assert_eq!(unique.len(), 27);
	for code in all {
	    assert!(REGIONS.iter().filter(|r| r.states().any(|s| s == code)).count() == 1);
	}
    }

    #[test]
    fn lookup() {
	assert_eq!(region_of("SP"), Some(Region::Sudeste));
	assert_eq!(region_of("DF"), Some(Region::CentroOeste));
	assert_eq!(region_of("RN"), Some(Region::Nordeste));
	assert_eq!(state_name("AP"), Some("Amapá"));
    }

    #[test]
    fn unknown_code_is_a_miss() {
	assert_eq!(region_of("XX"), None);
	assert_eq!(region_of("sp"), None);
	assert_eq!(state_name(""), None);
    }

    #[test]
    fn slugs() {
	assert_eq!(Region::CentroOeste.slug(), "centrooeste");
	assert_eq!(Region::Nordeste.slug(), "nordeste");
    }

    #[test]
    fn serializes_with_display_names() {
	assert_eq!(serde_json::to_string(&Region::CentroOeste).unwrap(), "\"Centro-Oeste\"");
	assert_eq!(serde_json::to_string(&Region::Sul).unwrap(), "\"Sul\"");
    }

}
