use chrono::{NaiveDate, NaiveTime};
use log::debug;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::error::SourceError;
use crate::models::RawPrayerTimes;
use crate::prayer_times::TimingsSource;

pub const DEFAULT_BASE_URL: &str = "https://api.aladhan.com/v1";

#[derive(Debug, Deserialize)]
struct TimingsResponse {
    data: TimingsData,
}

#[derive(Debug, Deserialize)]
struct TimingsData {
    timings: Timings,
}

#[derive(Debug, Deserialize)]
struct Timings {
    #[serde(rename = "Fajr")]
    fajr: Option<String>,
    #[serde(rename = "Dhuhr")]
    dhuhr: Option<String>,
    #[serde(rename = "Asr")]
    asr: Option<String>,
    #[serde(rename = "Maghrib")]
    maghrib: Option<String>,
    #[serde(rename = "Isha")]
    isha: Option<String>,
}

/// Blocking client for the Aladhan `timings` endpoint.
pub struct AladhanClient {
    client: Client,
    base_url: String,
    latitude: f64,
    longitude: f64,
    method: u8,
}

impl AladhanClient {
    pub fn new(
        base_url: &str,
        latitude: f64,
        longitude: f64,
        method: u8,
        timeout_secs: u64,
    ) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            latitude,
            longitude,
            method,
        })
    }

    fn url_for(&self, date: NaiveDate) -> String {
        format!("{}/timings/{}", self.base_url, date.format("%d-%m-%Y"))
    }
}

impl TimingsSource for AladhanClient {
    fn fetch_timings(&self, date: NaiveDate) -> Result<RawPrayerTimes, SourceError> {
        let url = self.url_for(date);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", self.latitude.to_string()),
                ("longitude", self.longitude.to_string()),
                ("method", self.method.to_string()),
            ])
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;
        timings_from_response(status, &body)
    }
}

/// Any non-2xx status is a failure regardless of what the body says.
fn timings_from_response(status: u16, body: &str) -> Result<RawPrayerTimes, SourceError> {
    if !(200..300).contains(&status) {
        return Err(SourceError::Status(status));
    }
    parse_timings_body(body)
}

/// Pull the five times out of a `timings` response body.
pub fn parse_timings_body(body: &str) -> Result<RawPrayerTimes, SourceError> {
    let parsed: TimingsResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;
    let t = parsed.data.timings;
    Ok(RawPrayerTimes {
        fajr: field("Fajr", t.fajr.as_deref())?,
        dhuhr: field("Dhuhr", t.dhuhr.as_deref())?,
        asr: field("Asr", t.asr.as_deref())?,
        maghrib: field("Maghrib", t.maghrib.as_deref())?,
        isha: field("Isha", t.isha.as_deref())?,
    })
}

fn field(name: &str, value: Option<&str>) -> Result<NaiveTime, SourceError> {
    let value = value.ok_or_else(|| SourceError::Malformed(format!("missing {}", name)))?;
    parse_hhmm(value)
        .ok_or_else(|| SourceError::Malformed(format!("bad {} time '{}'", name, value)))
}

/// Accepts "HH:mm" with an optional trailing zone note such as "05:12 (EET)".
fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let token = value.split_whitespace().next()?;
    NaiveTime::parse_from_str(token, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "code": 200,
        "status": "OK",
        "data": {
            "timings": {
                "Fajr": "04:31",
                "Sunrise": "05:58",
                "Dhuhr": "11:55",
                "Asr": "15:10 (EET)",
                "Sunset": "17:52",
                "Maghrib": "17:52",
                "Isha": "19:09",
                "Imsak": "04:21",
                "Midnight": "23:55"
            },
            "date": { "readable": "10 Mar 2024" }
        }
    }"#;

    #[test]
    fn parses_timings_and_strips_zone_suffix() {
        let raw = parse_timings_body(BODY).unwrap();
        assert_eq!(raw.fajr, NaiveTime::from_hms_opt(4, 31, 0).unwrap());
        assert_eq!(raw.asr, NaiveTime::from_hms_opt(15, 10, 0).unwrap());
        assert_eq!(raw.isha, NaiveTime::from_hms_opt(19, 9, 0).unwrap());
    }

    #[test]
    fn missing_field_is_malformed() {
        let body = r#"{"data":{"timings":{"Fajr":"04:31","Dhuhr":"11:55","Asr":"15:10","Maghrib":"17:52"}}}"#;
        match parse_timings_body(body) {
            Err(SourceError::Malformed(msg)) => assert!(msg.contains("Isha")),
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn garbage_time_is_malformed() {
        let body = r#"{"data":{"timings":{"Fajr":"soon","Dhuhr":"11:55","Asr":"15:10","Maghrib":"17:52","Isha":"19:09"}}}"#;
        assert!(matches!(parse_timings_body(body), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn error_envelope_is_malformed() {
        let body = r#"{"code":400,"status":"BAD_REQUEST","data":"Invalid date"}"#;
        assert!(matches!(parse_timings_body(body), Err(SourceError::Malformed(_))));
    }

    #[test]
    fn non_success_status_is_reported_with_its_code() {
        match timings_from_response(503, "Service Unavailable") {
            Err(SourceError::Status(code)) => assert_eq!(code, 503),
            other => panic!("expected status error, got {:?}", other),
        }
        // a well-formed body does not rescue an error status
        assert!(matches!(timings_from_response(404, BODY), Err(SourceError::Status(404))));
    }

    #[test]
    fn success_status_parses_the_body() {
        let raw = timings_from_response(200, BODY).unwrap();
        assert_eq!(raw.dhuhr, NaiveTime::from_hms_opt(11, 55, 0).unwrap());
    }

    #[test]
    fn url_uses_day_first_date() {
        let client = AladhanClient::new("https://example.test/v1/", 30.0, 31.0, 5, 5).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(client.url_for(date), "https://example.test/v1/timings/09-03-2024");
    }
}
