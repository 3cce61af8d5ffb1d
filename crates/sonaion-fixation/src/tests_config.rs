#[cfg(test)]
mod tests {
    use crate::config::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LEGACY_TOML: &str = r#"
        xres = 1920.0
        yres = 1080.0
        missingx = -1920.0
        missingy = -1080.0
        freq = 300.0
        windowtimeInterp = 0.1
        edgeSampInterp = 2
        maxdisp = 543.0
        windowtime = 0.2
        steptime = 0.02
        maxerrors = 100
        downsamples = [2, 5, 10]
        downsampFilter = false
        cutoffstd = 2.0
        onoffsetThresh = 3.0
        maxMergeDist = 30.0
        maxMergeTime = 30.0
        minFixDur = 40.0
    "#;

    fn defaults() -> Options {
        Options::with_defaults(1920.0, 1080.0, 300.0)
    }

    #[test]
    fn test_default_options_valid() {
        let options = defaults();
        assert!(options.validate().is_ok());
        assert_eq!(options.missing_x, -1920.0);
        assert_eq!(options.error_budget(), options.max_errors);
        assert!((options.max_disp - 1920.0 * 0.2 * 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_validation_rejects_bad_rates() {
        let mut options = defaults();
        options.freq = 0.0;
        assert!(options.validate().is_err());

        let mut options = defaults();
        options.windowtime = -0.1;
        assert!(options.validate().is_err());

        let mut options = defaults();
        options.steptime = f64::NAN;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validation_downsample_factors() {
        // 7 does not divide 300 Hz
        let mut options = defaults();
        options.downsamples = vec![2, 7];
        assert!(matches!(options.validate(), Err(ConfigError::Validation(_))));

        let mut options = defaults();
        options.downsamples = vec![0];
        assert!(options.validate().is_err());

        // 0.2 s at 300 Hz / 60 is a single sample
        let mut options = defaults();
        options.downsamples = vec![60];
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_validation_thresholds() {
        let mut options = defaults();
        options.cutoff_std = -1.0;
        assert!(options.validate().is_err());

        let mut options = defaults();
        options.min_fix_dur = f64::INFINITY;
        assert!(options.validate().is_err());

        let mut options = defaults();
        options.edge_samp_interp = 0;
        assert!(options.validate().is_err());

        let mut options = defaults();
        options.max_errors = 0;
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_from_toml_legacy_keys() {
        let options = Options::from_toml_str(LEGACY_TOML).unwrap();

        assert_eq!(options.freq, 300.0);
        assert_eq!(options.windowtime_interp, 0.1);
        assert_eq!(options.edge_samp_interp, 2);
        assert_eq!(options.max_disp, 543.0);
        assert_eq!(options.downsamples, vec![2, 5, 10]);
        assert_eq!(options.max_merge_dist, 30.0);
        assert_eq!(options.min_fix_dur, 40.0);
        assert_eq!(options.error_budget, None);
    }

    #[test]
    fn test_from_json_legacy_keys() {
        let json = r#"{
            "xres": 1280, "yres": 1024, "missingx": -1280, "missingy": -1024,
            "freq": 500, "windowtimeInterp": 0.1, "edgeSampInterp": 2,
            "maxdisp": 362.0, "windowtime": 0.2, "steptime": 0.02,
            "maxerrors": 50, "downsamples": [2, 5, 10], "downsampFilter": true,
            "cutoffstd": 2, "onoffsetThresh": 3, "maxMergeDist": 40,
            "maxMergeTime": 60, "minFixDur": 90, "error_budget": 7
        }"#;
        let options = Options::from_json_str(json).unwrap();

        assert_eq!(options.xres, 1280.0);
        assert!(options.downsamp_filter);
        assert_eq!(options.max_errors, 50);
        assert_eq!(options.error_budget(), 7);
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let partial = LEGACY_TOML.replace("minFixDur = 40.0", "");
        assert!(matches!(
            Options::from_toml_str(&partial),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_loaded_options_are_validated() {
        let bad = LEGACY_TOML.replace("freq = 300.0", "freq = 0.0");
        assert!(matches!(
            Options::from_toml_str(&bad),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_from_file_by_extension() {
        let mut toml_file = NamedTempFile::new().unwrap();
        toml_file.write_all(LEGACY_TOML.as_bytes()).unwrap();
        let from_toml = Options::from_file(toml_file.path()).unwrap();
        assert_eq!(from_toml.freq, 300.0);

        let mut json_file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        let json = serde_json::to_string(&defaults()).unwrap();
        json_file.write_all(json.as_bytes()).unwrap();
        let from_json = Options::from_file(json_file.path()).unwrap();
        assert_eq!(from_json, defaults());

        assert!(matches!(
            Options::from_file("/nonexistent/options.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn test_toml_string_round_trip() {
        let mut options = defaults();
        options.error_budget = Some(12);
        let toml_str = options.to_toml_string().unwrap();

        assert!(toml_str.contains("windowtime_interp"));
        assert!(toml_str.contains("error_budget = 12"));
        assert_eq!(Options::from_toml_str(&toml_str).unwrap(), options);
    }
}
