use bevy_log::info;
use liquid::LiquidConfig;
use std::path::Path;

/// Reads a liquid description from disk, falling back to the default liquid
/// when the file does not exist.
pub fn load_liquid_config(path: &Path) -> Result<LiquidConfig, Box<dyn std::error::Error>> {
    if !path.exists() {
        info!(
            "Liquid config file not found: {}. Using the default liquid.",
            path.display()
        );
        return Ok(LiquidConfig::default());
    }

    let config = LiquidConfig::load(path)?;

    info!("Found liquid config file on disk: {}", path.display());

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("liquid_host_{}_{}", std::process::id(), name));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_missing_file_gives_default() {
        let config = load_liquid_config(Path::new("/nonexistent/liquid.ron")).unwrap();
        assert_eq!(config, LiquidConfig::default());
    }

    #[test]
    fn test_reads_partial_file() {
        let path = temp_file("partial.ron", "(resolution: 32, wave_speed: 0.8)");
        let config = load_liquid_config(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(config.resolution, 32);
        assert_eq!(config.wave_speed, 0.8);
        assert_eq!(config.depth, LiquidConfig::default().depth);
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("liquid.ron");
        let config = load_liquid_config(&path).unwrap();
        assert_eq!(config.resolution, 128);
        assert_eq!(config.wave_speed, 0.6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let path = temp_file("broken.ron", "(resolution: \"many\")");
        let result = load_liquid_config(&path);
        fs::remove_file(&path).unwrap();
        assert!(result.is_err());
    }
}
