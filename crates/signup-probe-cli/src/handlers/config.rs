//! Config command handler

use crate::commands::ConfigArgs;
use crate::error::CliResult;
use signup_probe::SuiteConfig;

/// Execute the config command
pub fn execute_config(args: &ConfigArgs) -> CliResult<()> {
    let config = if args.defaults {
        SuiteConfig::default()
    } else {
        args.source.load()?
    };
    print!("{}", render_config(&config)?);
    Ok(())
}

/// YAML form of a configuration, loadable again with `--config`
pub fn render_config(config: &SuiteConfig) -> CliResult<String> {
    Ok(config.to_yaml()?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_rendered_defaults_load_back() {
        let yaml = render_config(&SuiteConfig::default()).unwrap();
        assert!(yaml.contains("base_url"));
        assert!(yaml.contains("chromium"));
        assert_eq!(SuiteConfig::from_yaml(&yaml).unwrap(), SuiteConfig::default());
    }
}
