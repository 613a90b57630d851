use std::fs;
use std::path::Path;
use anyhow::Context;
use serde::Deserialize;
use crate::common::RecordFamily;

/// Extra column names appended to the built-in column profile of a family
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct ColumnOverrides {
    pub(crate) date: Vec<String>,
    pub(crate) currency: Vec<String>,
    pub(crate) number: Vec<String>,
    pub(crate) ignored: Vec<String>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(default)]
pub(crate) struct Config {
    /// Overrides the number of documents written per batch
    pub(crate) batch_size: Option<usize>,
    pub(crate) nota: ColumnOverrides,
    pub(crate) folha: ColumnOverrides,
}

impl Config {
    pub(crate) fn empty() -> Config {
        Config::default()
    }

    /// Load config from a TOML file. A missing file gives the empty config.
    pub(crate) fn load_from_file(file_path: &str) -> anyhow::Result<Config> {
        let path = Path::new(file_path);
        if path.exists() && path.is_file() {
            let content = fs::read_to_string(path).with_context(|| format!("Unable to read config file {file_path}"))?;
            let config: Config = toml::from_str(&content).with_context(|| format!("Invalid config file {file_path}"))?;
            Ok(config)
        } else {
            Ok(Config::empty())
        }
    }

    pub(crate) fn overrides(&self, family: RecordFamily) -> &ColumnOverrides {
        match family {
            RecordFamily::Nota => &self.nota,
            RecordFamily::Folha => &self.folha,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use super::*;

    #[test]
    fn test_load_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "batch_size = 200\n[nota]\nignored = [\"EXTRA\"]\n[folha]\nnumber = [\"DEPENDENTES\"]").unwrap();

        let config = Config::load_from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.batch_size, Some(200));
        assert_eq!(config.overrides(RecordFamily::Nota).ignored, vec!["EXTRA".to_string()]);
        assert_eq!(config.overrides(RecordFamily::Folha).number, vec!["DEPENDENTES".to_string()]);
        assert!(config.folha.currency.is_empty());
    }

    #[test]
    fn test_missing_config_is_empty() {
        let config = Config::load_from_file("/definitely/not/here.toml").unwrap();
        assert_eq!(config, Config::empty());
    }
}
