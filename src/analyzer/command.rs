//! Analyzer command-line construction.

use std::path::PathBuf;

use crate::config::AnalyzerConfig;

/// Full path of the configured user dictionary, if any.
pub fn user_dict_path(config: &AnalyzerConfig) -> Option<PathBuf> {
    config
        .user_dict
        .as_ref()
        .map(|dict| PathBuf::from(&config.dict_dir).join(dict))
}

/// Arguments passed to the analyzer binary.
pub fn build_args(config: &AnalyzerConfig) -> Vec<String> {
    let mut args = config.base_args.clone();

    if config.homonyms_detection {
        args.push("-d".to_string());
    }
    if config.glue_grammemes {
        args.push("-g".to_string());
    }
    if let Some(path) = user_dict_path(config) {
        args.push(format!("--fixlist={}", path.display()));
    }

    args
}
