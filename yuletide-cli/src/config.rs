use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,
}

impl CliConfig {
    pub fn new(data_dir: Option<PathBuf>) -> Self {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("yuletide")
        });
        Self { data_dir }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.json")
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("yuletide.db")
    }
}
