use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

/// Locate `<crate>/config` whether the process runs from the workspace root
/// or from inside the crate directory.
pub fn configuration_directory(base_path: &Path, crate_dir: &str) -> PathBuf {
    if base_path.ends_with(crate_dir) {
        base_path.join("config")
    } else {
        base_path.join(crate_dir).join("config")
    }
}

/// Load settings from `config/base.yaml` overridden by `APP_`-prefixed
/// environment variables (`APP_SERVER__PORT=9000`).
pub fn load_settings<T: DeserializeOwned>(crate_dir: &str) -> Result<T, AppError> {
    dotenvy::dotenv().ok();

    let base_path = std::env::current_dir()?;
    let directory = configuration_directory(&base_path, crate_dir);

    load_settings_from(&directory.join("base.yaml"))
}

pub fn load_settings_from<T: DeserializeOwned>(file: &Path) -> Result<T, AppError> {
    let settings = Cfg::builder()
        .add_source(File::from(file).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    Ok(settings.try_deserialize::<T>()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::io::Write;

    #[derive(Debug, Deserialize)]
    struct Sample {
        server: SampleServer,
    }

    #[derive(Debug, Deserialize)]
    struct SampleServer {
        host: String,
        port: u16,
    }

    #[test]
    fn configuration_directory_handles_both_layouts() {
        let root = Path::new("/srv/app");
        assert_eq!(
            configuration_directory(root, "marketplace-frontend"),
            PathBuf::from("/srv/app/marketplace-frontend/config")
        );

        let inside = Path::new("/srv/app/marketplace-frontend");
        assert_eq!(
            configuration_directory(inside, "marketplace-frontend"),
            PathBuf::from("/srv/app/marketplace-frontend/config")
        );
    }

    #[test]
    fn loads_yaml_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(file, "server:\n  host: 127.0.0.1\n  port: 3100").unwrap();

        let sample: Sample = load_settings_from(file.path()).unwrap();
        assert_eq!(sample.server.host, "127.0.0.1");
        assert_eq!(sample.server.port, 3100);
    }
}
