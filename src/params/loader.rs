//! Load behavioral profiles from CSV
//!
//! Two columns, `Variable` and `Value`. The value is either a multiplier
//! (`1.1`) or a preset label (`single_parent`). Variables not listed stay
//! at 1.0.

use csv::Reader;
use log::debug;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::behavior::{BehavioralProfile, BehavioralVariable};
use crate::error::{Result, SimulationError};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Variable")]
    variable: String,
    #[serde(rename = "Value")]
    value: String,
}

impl CsvRow {
    fn apply(self, profile: &mut BehavioralProfile) -> Result<()> {
        let variable: BehavioralVariable = self.variable.parse()?;
        let raw = self.value.trim();

        let value = match raw.parse::<f64>() {
            Ok(v) => v,
            Err(_) => variable.preset_value(raw).ok_or_else(|| {
                SimulationError::invalid(
                    variable.key(),
                    format!("`{}` is neither a number nor a preset level", raw),
                )
            })?,
        };

        profile.set(variable, value);
        Ok(())
    }
}

/// Load a profile from any CSV reader
pub fn load_profile_from_reader<R: Read>(reader: R) -> Result<BehavioralProfile> {
    let mut csv_reader = Reader::from_reader(reader);
    let mut profile = BehavioralProfile::neutral();

    for result in csv_reader.deserialize::<CsvRow>() {
        result?.apply(&mut profile)?;
    }

    profile.validate()?;
    debug!("loaded behavioral profile {:?}", profile);
    Ok(profile)
}

/// Load a profile from a CSV file
pub fn load_profile(path: &Path) -> Result<BehavioralProfile> {
    let file = File::open(path)?;
    load_profile_from_reader(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_preset_values() {
        let data = "Variable,Value\n\
                    family_burden,single_parent\n\
                    inflation_expectation,1.05\n";
        let profile = load_profile_from_reader(data.as_bytes()).unwrap();

        assert_eq!(profile.family_burden, 1.25);
        assert_eq!(profile.inflation_expectation, 1.05);
        assert_eq!(profile.income_expectation, 1.0);
    }

    #[test]
    fn test_header_only_is_neutral() {
        let profile = load_profile_from_reader("Variable,Value\n".as_bytes()).unwrap();
        assert_eq!(profile, BehavioralProfile::neutral());
    }

    #[test]
    fn test_unknown_variable() {
        let data = "Variable,Value\nmood,1.0\n";
        let err = load_profile_from_reader(data.as_bytes()).unwrap_err();
        assert!(matches!(err, SimulationError::UnknownVariable(ref name) if name == "mood"));
    }

    #[test]
    fn test_unknown_preset_label() {
        let data = "Variable,Value\njob_stability,permanent\n";
        assert!(matches!(
            load_profile_from_reader(data.as_bytes()),
            Err(SimulationError::InvalidInput { field: "job_stability", .. })
        ));
    }

    #[test]
    fn test_rejects_zero_multiplier() {
        let data = "Variable,Value\ntime_preference,0\n";
        assert!(load_profile_from_reader(data.as_bytes()).is_err());
    }

    #[test]
    fn test_shipped_profiles_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/profiles");
        let mut loaded = 0;
        for entry in std::fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                load_profile(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
                loaded += 1;
            }
        }
        assert!(loaded >= 2);

        assert_eq!(load_profile(&dir.join("neutral.csv")).unwrap(), BehavioralProfile::neutral());

        let family = load_profile(&dir.join("young_family.csv")).unwrap();
        assert_eq!(family.family_burden, 1.20);
        assert_eq!(family.job_stability, 0.95);
        assert_eq!(family.interest_rate_expectation, 1.0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_profile(Path::new("does/not/exist.csv")).unwrap_err();
        assert!(matches!(err, SimulationError::Io(_)));
    }
}
