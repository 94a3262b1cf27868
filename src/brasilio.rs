use std::{io,fs};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize,Deserializer};
use serde::de::Error as _;
use chrono::naive::NaiveDate;
use flate2::read::GzDecoder;
use encoding_rs::UTF_8;
use tracing::{info,debug};

use super::error::{Result,Error};


pub const CASO_FULL_URL : &str = "https://data.brasil.io/dataset/covid19/caso_full.csv.gz";


#[derive(Deserialize,Clone,Copy,PartialEq,Eq,Debug)]
#[serde(rename_all = "lowercase")]
pub enum PlaceType {
    State,
    City
}

/// One row of `caso_full.csv`. Columns not listed here are skipped.
#[derive(Deserialize,Clone,Debug)]
pub struct RawRecord {
    pub date: NaiveDate,
    pub state: String,
    pub place_type: PlaceType,
    #[serde(deserialize_with = "python_bool")]
    pub is_last: bool,
    pub epidemiological_week: u32,
    pub last_available_date: NaiveDate,
    pub last_available_confirmed: i64,
    pub last_available_deaths: i64,
    pub new_confirmed: i64,
    pub new_deaths: i64
}

fn python_bool<'de, D: Deserializer<'de>>(de: D) -> std::result::Result<bool, D::Error> {
    let val = String::deserialize(de)?;
    match val.as_str() {
	"True" | "true" | "1" => Ok(true),
	"False" | "false" | "0" => Ok(false),
	other => Err(D::Error::custom(format!("invalid boolean: {:?}", other)))
    }
}


pub fn caso_full(source: &str, cache_path: &Path, max_age: Duration) -> Result<Vec<RawRecord>> {

    let bytes = match source.starts_with("http://") || source.starts_with("https://") {
	true => cached_download(source, cache_path, max_age)?,
	false => {
	    info!(path = source, "Reading local dataset");
	    fs::read(source)?
	}
    };

    parse(&bytes)

}


fn cached_download(url: &str, cache_path: &Path, max_age: Duration) -> Result<Vec<u8>> {

    let cache_path = cache_path.join("brasilio");
    let cache_file = cache_path.join("caso_full.csv.gz");

    if cache_file.exists() {
	let age = fs::metadata(&cache_file)?.modified()?.elapsed().unwrap_or(Duration::MAX);
	debug!(file = %cache_file.display(), age_secs = age.as_secs(), "Found cached dataset");
	if age < max_age {
	    return Ok(fs::read(&cache_file)?);
	}
    }

    let data = download(url)?;
    fs::create_dir_all(&cache_path)?;
    fs::write(&cache_file, &data)?;
    Ok(data)

}


fn download(url: &str) -> Result<Vec<u8>> {

    info!(url, "Downloading caso_full.csv.gz");

    let res = reqwest::blocking::Client::new()
	.get(url)
	.header(reqwest::header::USER_AGENT, "covid19-brazil-rs")
	.send()?;

    match res.status().as_u16() {
	200 => {
	    let bytes = res.bytes()?.to_vec();
	    info!(bytes = bytes.len(), "Download completed");
	    Ok(bytes)
	},
	_ => Err(Error::HttpError(res.status())),
    }

}


/// Parses a gzip-compressed or plain `caso_full.csv` payload.
pub fn parse(bytes: &[u8]) -> Result<Vec<RawRecord>> {

    let mut raw = Vec::new();
    match bytes.starts_with(&[0x1f, 0x8b]) {
	true => { GzDecoder::new(bytes).read_to_end(&mut raw)?; },
	false => raw.extend_from_slice(bytes)
    }

    let (text, malformed) = UTF_8.decode_with_bom_removal(&raw);
    if malformed {
	return Err(Error::IO(io::Error::new(io::ErrorKind::InvalidData,
					    "caso_full.csv is not valid UTF-8")));
    }

    let records = csv::Reader::from_reader(text.as_bytes())
	.into_deserialize()
	.collect::<std::result::Result<Vec<RawRecord>,_>>()?;

    info!(records = records.len(), "Parsed raw dataset");
    Ok(records)

}


#[cfg(test)]
mod tests {

    use std::io::Write;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use super::*;

    const SAMPLE : &str = "\
city,city_ibge_code,date,epidemiological_week,estimated_population,estimated_population_2019,is_last,is_repeated,last_available_confirmed,last_available_confirmed_per_100k_inhabitants,last_available_date,last_available_death_rate,last_available_deaths,order_for_place,place_type,state,new_confirmed,new_deaths
São Paulo,3550308,2020-02-25,202009,12325232,12252023,False,False,1,0.00816,2020-02-25,0.0,0,1,city,SP,1,0
,35,2020-02-25,202009,46289333,45919049,False,False,1,0.00218,2020-02-25,0.0,0,1,state,SP,1,0
,35,2020-02-26,202009,46289333,45919049,True,False,1,0.00218,2020-02-26,0.0,0,2,state,SP,0,0
";

    #[test]
    fn parses_plain_csv() {
	let records = parse(SAMPLE.as_bytes()).unwrap();
	assert_eq!(records.len(), 3);
	assert_eq!(records[0].place_type, PlaceType::City);
	assert_eq!(records[1].place_type, PlaceType::State);
	assert_eq!(records[1].state, "SP");
	assert_eq!(records[1].epidemiological_week, 202009);
	assert!(!records[1].is_last);
	assert!(records[2].is_last);
	assert_eq!(records[2].date, NaiveDate::from_ymd_opt(2020, 2, 26).unwrap());
    }

    #[test]
    fn parses_gzip_with_bom() {
	let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
	encoder.write_all(b"\xEF\xBB\xBF").unwrap();
	encoder.write_all(SAMPLE.as_bytes()).unwrap();
	let records = parse(&encoder.finish().unwrap()).unwrap();
	assert_eq!(records.len(), 3);
	assert_eq!(records[0].last_available_confirmed, 1);
    }

    #[test]
    fn missing_column_is_a_schema_error() {
	let csv = "date,state,place_type,is_last\n2020-02-25,SP,state,True\n";
	match parse(csv.as_bytes()) {
	    Err(Error::Schema(_)) => (),
	    other => panic!("expected schema error, got {:?}", other.map(|r| r.len()))
	}
    }

    #[test]
    fn invalid_boolean_is_a_schema_error() {
	let csv = SAMPLE.replace("True", "maybe");
	assert!(matches!(parse(csv.as_bytes()), Err(Error::Schema(_))));
    }

    #[test]
    fn reads_local_file() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("caso_full.csv");
	fs::write(&path, SAMPLE).unwrap();
	let records = caso_full(path.to_str().unwrap(), dir.path(), Duration::from_secs(60)).unwrap();
	assert_eq!(records.len(), 3);
    }

}
